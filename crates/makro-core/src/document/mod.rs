//! Document state and logic (UI-agnostic).

mod io;
mod ops;
mod state;

pub use ops::CopyMode;
pub use state::Document;
