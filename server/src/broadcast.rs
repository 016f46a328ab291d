//! Fan-out of rendered messages to session outboxes.
//!
//! All functions take the world by reference, so callers must hold the world
//! lock; the set of recipients is therefore exactly the set of players
//! registered at that point of the mutation history.

use crate::outbox::{Message, Outbox};
use crate::world::WorldState;
use log::debug;
use shared::ServerMessage;

pub struct Broadcaster;

impl Broadcaster {
    pub fn render(message: &ServerMessage) -> Message {
        Message::from(message.to_string())
    }

    /// Renders once and enqueues onto every registered player's outbox.
    pub fn broadcast(world: &WorldState, message: &ServerMessage) -> usize {
        let rendered = Self::render(message);
        let mut delivered = 0;
        for outbox in world.outboxes() {
            if outbox.push(rendered.clone()) {
                delivered += 1;
            }
        }
        debug!("Broadcast to {} players: {:?}", delivered, message);
        delivered
    }

    /// Broadcasts the current world snapshot.
    pub fn broadcast_snapshot(world: &WorldState) -> usize {
        Self::broadcast(world, &ServerMessage::Snapshot(world.snapshot()))
    }

    /// Sends a message to one player only. Returns false if it wasn't queued.
    pub fn send_to(world: &WorldState, name: &str, message: &ServerMessage) -> bool {
        match world.outbox_of(name) {
            Some(outbox) => Self::send(outbox, message),
            None => false,
        }
    }

    /// Queues a message on an outbox that may not belong to a registered
    /// player yet (handshake prompts and rejections).
    pub fn send(outbox: &Outbox, message: &ServerMessage) -> bool {
        outbox.push(Self::render(message))
    }
}
