pub mod brain;
pub mod context;
pub mod goals;
pub mod perception;
pub mod states;

pub use brain::decide;
pub use context::AIContext;
