use tracing::debug;

use crate::input::MenuCommand;

/// What the player picked from the pause menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PauseChoice {
    Resume,
    Restart,
    LevelSelect,
    Title,
}

impl PauseChoice {
    pub const ITEMS: [PauseChoice; 4] = [
        PauseChoice::Resume,
        PauseChoice::Restart,
        PauseChoice::LevelSelect,
        PauseChoice::Title,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PauseChoice::Resume => "Resume",
            PauseChoice::Restart => "Restart",
            PauseChoice::LevelSelect => "Level Select",
            PauseChoice::Title => "Title",
        }
    }
}

/// Cyclic pause menu selection.
#[derive(Debug, Clone, Default)]
pub struct PauseMenu {
    selected: usize,
}

impl PauseMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> PauseChoice {
        PauseChoice::ITEMS[self.selected]
    }

    /// Apply one command; returns a choice on Confirm or Back.
    pub fn apply(&mut self, command: MenuCommand) -> Option<PauseChoice> {
        let count = PauseChoice::ITEMS.len();
        match command {
            MenuCommand::Previous => {
                self.selected = (self.selected + count - 1) % count;
                debug!(selected = self.selected().label(), "Pause menu moved");
                None
            }
            MenuCommand::Next => {
                self.selected = (self.selected + 1) % count;
                debug!(selected = self.selected().label(), "Pause menu moved");
                None
            }
            MenuCommand::Confirm => Some(self.selected()),
            MenuCommand::Back => Some(PauseChoice::Resume),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_wraps() {
        let mut menu = PauseMenu::new();
        assert_eq!(menu.apply(MenuCommand::Previous), None);
        assert_eq!(menu.selected(), PauseChoice::Title);
        menu.apply(MenuCommand::Next);
        assert_eq!(menu.selected(), PauseChoice::Resume);
    }

    #[test]
    fn confirm_returns_selection() {
        let mut menu = PauseMenu::new();
        menu.apply(MenuCommand::Next);
        assert_eq!(menu.apply(MenuCommand::Confirm), Some(PauseChoice::Restart));
    }

    #[test]
    fn back_resumes() {
        let mut menu = PauseMenu::new();
        menu.apply(MenuCommand::Next);
        menu.apply(MenuCommand::Next);
        assert_eq!(menu.apply(MenuCommand::Back), Some(PauseChoice::Resume));
    }
}
