use clap::Parser;
use log::{error, info};
use server::config::{ServerConfig, TreasurePlacement, DEFAULT_OUTBOX_CAPACITY};
use server::network::Server;
use shared::Position;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = shared::DEFAULT_HOST)]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value_t = shared::DEFAULT_PORT)]
    port: u16,

    /// Width and height of the square grid
    #[arg(short, long, default_value_t = shared::GRID_SIZE)]
    grid_size: i32,

    /// Treasure cell as `x,y`; repeat for several
    #[arg(short, long = "treasure", value_parser = parse_position, conflicts_with = "random_treasure")]
    treasures: Vec<Position>,

    /// Bury a single treasure on a random cell
    #[arg(long)]
    random_treasure: bool,

    /// Messages buffered per client before the oldest are dropped
    #[arg(long, default_value_t = DEFAULT_OUTBOX_CAPACITY)]
    outbox_capacity: usize,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        let treasures = if self.random_treasure {
            TreasurePlacement::Random
        } else if !self.treasures.is_empty() {
            TreasurePlacement::Fixed(self.treasures)
        } else {
            TreasurePlacement::default()
        };

        ServerConfig {
            bind_addr: format!("{}:{}", self.host, self.port),
            grid_size: self.grid_size,
            treasures,
            outbox_capacity: self.outbox_capacity,
        }
    }
}

fn parse_position(s: &str) -> Result<Position, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got {:?}", s))?;
    let x = x.trim().parse().map_err(|e| format!("bad x in {:?}: {}", s, e))?;
    let y = y.trim().parse().map_err(|e| format!("bad y in {:?}: {}", s, e))?;
    Ok(Position::new(x, y))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = Args::parse().into_config();

    let server = match Server::bind(&config).await {
        Ok(server) => server,
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    };

    tokio::select! {
        _ = server.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
