//! Session library: tracks opened by the user and the key lookup over them.

mod model;
mod scan;

pub use model::*;
pub use scan::scan;

#[cfg(test)]
mod tests;
