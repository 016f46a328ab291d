//! Per-connection session actor.
//!
//! A session walks `Connecting -> Registered -> Active -> Disconnected`.
//! Its read loop runs in the task that calls [`Session::run`]; writes happen
//! in a separate task that drains the session's [`Outbox`], so a slow socket
//! write never stalls the read loop and no broadcaster ever waits on a
//! client.

use crate::broadcast::Broadcaster;
use crate::codec::{self, LineReader};
use crate::commands::CommandProcessor;
use crate::error::{RegisterError, SessionError};
use crate::outbox::Outbox;
use crate::world::SharedWorld;
use log::{debug, error, info, warn};
use shared::ServerMessage;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

/// How long a closing session waits for its writer to flush queued output.
const WRITER_LINGER: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Registered,
    Active,
    Disconnected,
}

pub struct Session {
    label: String,
    world: SharedWorld,
    outbox: Outbox,
    state: SessionState,
    name: Option<String>,
}

impl Session {
    pub fn new(label: impl Into<String>, world: SharedWorld, outbox_capacity: usize) -> Self {
        let label = label.into();
        Self {
            outbox: Outbox::new(label.clone(), outbox_capacity),
            label,
            world,
            state: SessionState::Connecting,
            name: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Runs the session to completion.
    ///
    /// Always unregisters the player and stops the writer before returning.
    /// `Ok` means the client closed the connection in an orderly way.
    pub async fn run<R, W>(mut self, reader: R, writer: W) -> Result<(), SessionError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let mut writer_task = tokio::spawn(drain_outbox(
            self.label.clone(),
            self.outbox.clone(),
            writer,
        ));

        let mut lines = LineReader::new(reader);
        let result = self.serve(&mut lines).await;
        self.disconnect().await;

        match tokio::time::timeout(WRITER_LINGER, &mut writer_task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("Writer task for {} failed: {}", self.label, e),
            Err(_) => {
                warn!("Writer for {} did not flush in time, aborting", self.label);
                writer_task.abort();
            }
        }
        result
    }

    async fn serve<R>(&mut self, lines: &mut LineReader<R>) -> Result<(), SessionError>
    where
        R: AsyncRead + Unpin,
    {
        Broadcaster::send(&self.outbox, &ServerMessage::Welcome);

        let Some(name) = self.next_line(lines).await? else {
            debug!("{} left before choosing a name", self.label);
            return Ok(());
        };
        let name = self.register(&name).await?;

        while let Some(line) = self.next_line(lines).await? {
            let mut world = self.world.lock().await;
            CommandProcessor::handle_line(&mut world, &name, &line);
        }
        Ok(())
    }

    /// Next inbound line, or `None` once the client or our writer is gone.
    async fn next_line<R>(&self, lines: &mut LineReader<R>) -> Result<Option<String>, SessionError>
    where
        R: AsyncRead + Unpin,
    {
        tokio::select! {
            line = lines.read_line() => line,
            _ = self.outbox.closed() => Ok(None),
        }
    }

    async fn register(&mut self, name: &str) -> Result<String, SessionError> {
        let name = name.trim();
        let mut world = self.world.lock().await;

        match world.register(name, self.outbox.clone()) {
            Ok(position) => {
                self.state = SessionState::Registered;
                self.name = Some(name.to_string());
                info!("{} registered as {} at {}", self.label, name, position);

                Broadcaster::broadcast(
                    &world,
                    &ServerMessage::Joined {
                        name: name.to_string(),
                    },
                );
                Broadcaster::broadcast_snapshot(&world);
                self.state = SessionState::Active;
                Ok(name.to_string())
            }
            Err(e) => {
                warn!("Rejecting {}: {}", self.label, e);
                let reply = match &e {
                    RegisterError::NameConflict(name) => ServerMessage::NameTaken {
                        name: name.clone(),
                    },
                    RegisterError::InvalidName => ServerMessage::InvalidName,
                };
                Broadcaster::send(&self.outbox, &reply);
                Err(e.into())
            }
        }
    }

    async fn disconnect(&mut self) {
        if let Some(name) = self.name.take() {
            let mut world = self.world.lock().await;
            if world.unregister(&name).is_some() {
                Broadcaster::broadcast(&world, &ServerMessage::Left { name });
                Broadcaster::broadcast_snapshot(&world);
            }
        }

        self.outbox.close();
        self.state = SessionState::Disconnected;

        let dropped = self.outbox.dropped();
        if dropped > 0 {
            info!("{} dropped {} outbound messages", self.label, dropped);
        }
    }
}

/// Writes queued messages until the outbox is closed and empty.
async fn drain_outbox<W>(label: String, outbox: Outbox, mut writer: W)
where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = outbox.next().await {
        if let Err(e) = codec::write_line(&mut writer, &message).await {
            warn!("Write to {} failed: {}", label, e);
            outbox.close();
            break;
        }
    }
    if let Err(e) = writer.shutdown().await {
        debug!("Shutdown of {} failed: {}", label, e);
    }
}
