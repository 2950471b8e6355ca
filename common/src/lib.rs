mod constants;
mod grid;
mod leaderboard;
mod level;
mod simulation;
mod status;
mod storage;
mod store;
mod sync;

pub mod util;

pub use constants::*;
pub use grid::*;
pub use leaderboard::*;
pub use level::*;
pub use simulation::*;
pub use status::*;
pub use storage::*;
pub use store::*;
pub use sync::*;
pub use util::PseudoRandom;
