// Screens driving the gameplay engine.

mod pause_menu;
mod play_screen;

pub use pause_menu::{PauseChoice, PauseMenu};
pub use play_screen::{PlayScreen, ScreenExit};
