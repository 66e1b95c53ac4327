pub mod bank;
pub mod grid;
pub mod logger;
pub mod solver;
pub mod technique;
mod techniques;

pub use grid::{Grid, Pos};
pub use solver::{grade_puzzle, normalize_score, Graded, SolveStep};
pub use technique::Technique;
