//! Core of a timed tile matching game: boards of colored tiles, pair matching, staged runs against a countdown and
//! per difficulty score lists.

pub use board::*;
pub use config::*;
pub use countdown::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use palette::*;
pub use run::*;
pub use scheduler::*;
pub use score::*;
pub use session::*;
pub use tile::*;
pub use types::*;

mod board;
mod config;
mod countdown;
mod engine;
mod error;
mod generator;
mod palette;
mod run;
mod scheduler;
mod score;
mod session;
mod tile;
mod types;
