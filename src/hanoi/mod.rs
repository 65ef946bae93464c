pub mod app;
pub mod board;
pub mod layout;
pub mod particles;
pub mod scoreboard;
pub mod session;
pub mod solver;
pub mod state;

pub use app::HanoiApp;
pub use board::{IllegalMove, Towers, TOWER_COUNT};
pub use session::{DropOutcome, GameResult, GameSession};
pub use solver::{generate_moves, minimum_moves, Move};
pub use state::{Event, Screen};
