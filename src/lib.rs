pub mod config;
pub mod database;
pub mod input;
pub mod model;
pub mod play;
pub mod sensor;
pub mod state;
pub mod traits;
pub mod util;
