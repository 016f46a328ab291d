use clap::Parser;
use client::network::Client;
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value_t = format!("{}:{}", shared::DEFAULT_HOST, shared::DEFAULT_PORT))]
    server: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Connecting to: {}", args.server);
    info!("Commands: UP, DOWN, LEFT, RIGHT, DIG");

    let client = Client::connect(&args.server).await?;

    tokio::select! {
        result = client.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, leaving the game");
        }
    }

    Ok(())
}
