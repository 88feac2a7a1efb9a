//! Application module: the view model used by the TUI and runtime.
//!
//! `App` lives in `app::model` and tracks the visible screen, the cursor of
//! each screen and any pending text input.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;
