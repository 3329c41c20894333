use super::detection::{DetectionSnapshot, Signal};
use super::edge::{ConsumerId, EdgeSet};
use super::keyboard::Key;

/// Navigation command for list menus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuCommand {
    Previous,
    Next,
    Confirm,
    Back,
}

impl MenuCommand {
    pub fn from_key(key: Key) -> Self {
        match key {
            Key::Up => MenuCommand::Previous,
            Key::Down => MenuCommand::Next,
            Key::Activate => MenuCommand::Confirm,
            Key::Pause => MenuCommand::Back,
        }
    }
}

/// Menu consumer of the detection state.
///
/// Looks at the state at most once per poll interval. Between looks the
/// latches are untouched, so a level that stays high across looks still
/// yields a single command.
#[derive(Debug, Clone)]
pub struct MenuInput {
    edges: EdgeSet,
    interval_us: i64,
    last_poll_us: i64,
}

impl MenuInput {
    pub fn new(consumer: ConsumerId, interval_us: i64, now_us: i64) -> Self {
        Self {
            edges: EdgeSet::new(consumer),
            interval_us,
            last_poll_us: now_us,
        }
    }

    /// Latch whatever is already held so it does not count as a command.
    pub fn prime(&mut self, snapshot: &DetectionSnapshot) {
        self.edges.rising(snapshot);
    }

    pub fn poll(&mut self, now_us: i64, snapshot: &DetectionSnapshot) -> Vec<MenuCommand> {
        if now_us - self.last_poll_us < self.interval_us {
            return Vec::new();
        }
        self.last_poll_us = now_us;

        let rising = self.edges.rising(snapshot);
        let mut commands: Vec<MenuCommand> = Vec::new();
        let mut push = |command: MenuCommand| {
            if !commands.contains(&command) {
                commands.push(command);
            }
        };
        for signal in rising {
            match signal {
                Signal::LeftHandUp | Signal::RightHandUp => push(MenuCommand::Previous),
                Signal::LeftHandDown | Signal::RightHandDown => push(MenuCommand::Next),
                Signal::Clapped => push(MenuCommand::Confirm),
                Signal::CrossArm => push(MenuCommand::Back),
            }
        }
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::detection::PoseLevels;

    fn hands_up() -> DetectionSnapshot {
        DetectionSnapshot {
            pose: PoseLevels {
                left_hand_up: true,
                right_hand_up: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn throttles_to_interval() {
        let mut menu = MenuInput::new(ConsumerId("menu"), 1_000_000, 0);
        assert!(menu.poll(500_000, &hands_up()).is_empty());
        assert_eq!(menu.poll(1_000_000, &hands_up()), vec![MenuCommand::Previous]);
        assert!(menu.poll(2_000_000, &hands_up()).is_empty());
        menu.poll(3_000_000, &DetectionSnapshot::default());
        assert_eq!(menu.poll(4_000_000, &hands_up()), vec![MenuCommand::Previous]);
    }

    #[test]
    fn clap_confirms() {
        let mut menu = MenuInput::new(ConsumerId("menu"), 0, 0);
        let snap = DetectionSnapshot {
            clapped: true,
            ..Default::default()
        };
        assert_eq!(menu.poll(0, &snap), vec![MenuCommand::Confirm]);
    }

    #[test]
    fn primed_levels_are_ignored() {
        let mut menu = MenuInput::new(ConsumerId("menu"), 0, 0);
        menu.prime(&hands_up());
        assert!(menu.poll(0, &hands_up()).is_empty());
    }

    #[test]
    fn keys_map_to_commands() {
        assert_eq!(MenuCommand::from_key(Key::Pause), MenuCommand::Back);
        assert_eq!(MenuCommand::from_key(Key::Down), MenuCommand::Next);
    }
}
