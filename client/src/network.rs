//! TCP connection to the server and the terminal pump.

use crate::view::{ClientView, ViewEvent};
use log::{debug, info, warn};
use std::io;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

pub struct Client {
    stream: TcpStream,
    view: ClientView,
}

impl Client {
    pub async fn connect(server_addr: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let stream = TcpStream::connect(server_addr).await?;
        info!("Connected to {}", stream.peer_addr()?);
        Ok(Self {
            stream,
            view: ClientView::new(),
        })
    }

    /// Pumps stdin to the server and server lines to stdout.
    pub async fn run(self) -> io::Result<()> {
        self.run_with(tokio::io::stdin(), tokio::io::stdout())
            .await
            .map(|_| ())
    }

    /// Pumps `input` to the server and server lines to `output` until either
    /// side reaches EOF. Returns the final view.
    pub async fn run_with<I, O>(self, input: I, mut output: O) -> io::Result<ClientView>
    where
        I: AsyncRead + Unpin,
        O: AsyncWrite + Unpin,
    {
        let Client { stream, mut view } = self;
        let (reader, mut writer) = stream.into_split();
        let mut server_lines = BufReader::new(reader).lines();
        let mut input_lines = BufReader::new(input).lines();

        loop {
            tokio::select! {
                line = server_lines.next_line() => {
                    let Some(line) = line? else {
                        info!("Server closed the connection");
                        break;
                    };
                    output.write_all(line.as_bytes()).await?;
                    output.write_all(b"\n").await?;
                    output.flush().await?;
                    if let Some(event) = view.apply(&line) {
                        log_event(&view, &event);
                    }
                }
                line = input_lines.next_line() => {
                    let Some(line) = line? else {
                        debug!("Input closed, leaving");
                        writer.shutdown().await?;
                        break;
                    };
                    if view.awaiting_name() {
                        view.set_name(&line);
                    }
                    writer.write_all(line.as_bytes()).await?;
                    writer.write_all(b"\n").await?;
                }
            }
        }

        Ok(view)
    }
}

fn log_event(view: &ClientView, event: &ViewEvent) {
    match event {
        ViewEvent::Rejected(reason) => warn!("Rejected by server: {}", reason),
        ViewEvent::SnapshotUpdated => {
            if let Some(position) = view.own_position() {
                debug!("Now at {}", position);
            }
        }
        ViewEvent::TreasureFound(name) => info!("Treasure found by {}", name),
        other => debug!("{:?}", other),
    }
}
