//! Translation of command lines into world mutations and their messages.

use crate::broadcast::Broadcaster;
use crate::world::{DigOutcome, WorldState};
use log::debug;
use shared::{Command, Position, ServerMessage};

/// What a single command did to the world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Moved(Position),
    TreasureFound,
    NoTreasure,
    Unknown(String),
}

impl CommandOutcome {
    /// Whether the world changed and a fresh snapshot is due.
    pub fn changes_world(&self) -> bool {
        matches!(self, CommandOutcome::Moved(_) | CommandOutcome::TreasureFound)
    }
}

pub struct CommandProcessor;

impl CommandProcessor {
    /// Applies a parsed command for `player`. Does not send anything.
    pub fn apply(world: &mut WorldState, player: &str, command: Command) -> CommandOutcome {
        match command.delta() {
            Some((dx, dy)) => match world.move_player(player, dx, dy) {
                Some(position) => CommandOutcome::Moved(position),
                None => CommandOutcome::Unknown(format!("{:?}", command)),
            },
            None => match world.dig(player) {
                DigOutcome::Found => CommandOutcome::TreasureFound,
                DigOutcome::Absent => CommandOutcome::NoTreasure,
            },
        }
    }

    /// Parses and applies one command line, then delivers the result.
    ///
    /// Treasure finds are announced publicly; a fruitless dig or an unknown
    /// command is answered privately and triggers no broadcast. Every
    /// world-changing command is followed by one snapshot broadcast.
    pub fn handle_line(world: &mut WorldState, player: &str, line: &str) -> CommandOutcome {
        let outcome = match line.parse::<Command>() {
            Ok(command) => Self::apply(world, player, command),
            Err(e) => {
                debug!("{} sent an invalid command: {}", player, e);
                CommandOutcome::Unknown(e.0)
            }
        };

        match &outcome {
            CommandOutcome::Moved(_) => {}
            CommandOutcome::TreasureFound => {
                Broadcaster::broadcast(
                    world,
                    &ServerMessage::TreasureFound {
                        name: player.to_string(),
                    },
                );
            }
            CommandOutcome::NoTreasure => {
                Broadcaster::send_to(world, player, &ServerMessage::NoTreasure);
            }
            CommandOutcome::Unknown(_) => {
                Broadcaster::send_to(world, player, &ServerMessage::InvalidCommand);
            }
        }

        if outcome.changes_world() {
            Broadcaster::broadcast_snapshot(world);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridState;
    use crate::outbox::Outbox;

    fn drain(outbox: &Outbox) -> Vec<String> {
        std::iter::from_fn(|| outbox.try_next())
            .map(|m| m.to_string())
            .collect()
    }

    fn setup() -> (WorldState, Outbox, Outbox) {
        let mut world = WorldState::new(GridState::new(10), [Position::new(2, 2)]);
        let alice = Outbox::new("Alice", 32);
        let bob = Outbox::new("Bob", 32);
        world.register("Alice", alice.clone()).unwrap();
        world.register("Bob", bob.clone()).unwrap();
        (world, alice, bob)
    }

    #[test]
    fn test_apply_movement() {
        let (mut world, _, _) = setup();
        assert_eq!(
            CommandProcessor::apply(&mut world, "Alice", Command::Right),
            CommandOutcome::Moved(Position::new(1, 0))
        );
        assert_eq!(
            CommandProcessor::apply(&mut world, "Alice", Command::Down),
            CommandOutcome::Moved(Position::new(1, 1))
        );
        assert_eq!(
            CommandProcessor::apply(&mut world, "Alice", Command::Left),
            CommandOutcome::Moved(Position::new(0, 1))
        );
        assert_eq!(
            CommandProcessor::apply(&mut world, "Alice", Command::Up),
            CommandOutcome::Moved(Position::new(0, 0))
        );
        assert_eq!(
            CommandProcessor::apply(&mut world, "Alice", Command::Up),
            CommandOutcome::Moved(Position::new(0, 0))
        );
    }

    #[test]
    fn test_walk_to_treasure_and_dig() {
        let (mut world, alice, bob) = setup();
        for line in ["RIGHT", "right", "DOWN", "Down"] {
            let outcome = CommandProcessor::handle_line(&mut world, "Alice", line);
            assert!(outcome.changes_world());
        }
        assert_eq!(world.position_of("Alice"), Some(Position::new(2, 2)));
        // One snapshot per move, to everyone.
        assert_eq!(drain(&alice).len(), 4);
        assert_eq!(drain(&bob).len(), 4);

        let outcome = CommandProcessor::handle_line(&mut world, "Alice", "DIG");
        assert_eq!(outcome, CommandOutcome::TreasureFound);
        let expected_snapshot = "Active players: 2\n\
                                 Alice is at position: (2, 2)\n\
                                 Bob is at position: (0, 0)\n\
                                 Treasures remaining: 0";
        assert_eq!(
            drain(&alice),
            vec!["Alice has found the treasure!", expected_snapshot]
        );
        assert_eq!(
            drain(&bob),
            vec!["Alice has found the treasure!", expected_snapshot]
        );

        let outcome = CommandProcessor::handle_line(&mut world, "Alice", "dig");
        assert_eq!(outcome, CommandOutcome::NoTreasure);
        assert_eq!(drain(&alice), vec!["No treasure here."]);
        assert!(drain(&bob).is_empty());
    }

    #[test]
    fn test_unknown_command_is_private() {
        let (mut world, alice, bob) = setup();
        let before = world.snapshot();

        let outcome = CommandProcessor::handle_line(&mut world, "Alice", "JUMP");
        assert_eq!(outcome, CommandOutcome::Unknown("JUMP".to_string()));
        assert!(!outcome.changes_world());
        assert_eq!(drain(&alice), vec!["Invalid command!"]);
        assert!(drain(&bob).is_empty());
        assert_eq!(world.snapshot(), before);
    }

    #[test]
    fn test_empty_line_is_invalid() {
        let (mut world, alice, _) = setup();
        CommandProcessor::handle_line(&mut world, "Alice", "");
        assert_eq!(drain(&alice), vec!["Invalid command!"]);
    }

    #[test]
    fn test_second_digger_gets_nothing() {
        let (mut world, alice, bob) = setup();
        world.move_player("Alice", 2, 2);
        world.move_player("Bob", 2, 2);

        assert_eq!(
            CommandProcessor::handle_line(&mut world, "Bob", "DIG"),
            CommandOutcome::TreasureFound
        );
        assert_eq!(
            CommandProcessor::handle_line(&mut world, "Alice", "DIG"),
            CommandOutcome::NoTreasure
        );

        let alice_lines = drain(&alice);
        assert_eq!(alice_lines.first().map(String::as_str), Some("Bob has found the treasure!"));
        assert_eq!(alice_lines.last().map(String::as_str), Some("No treasure here."));
        assert!(!drain(&bob).iter().any(|l| l == "No treasure here."));
    }
}
