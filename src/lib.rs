//! lazydotnet library exports for testing

pub mod app;
pub mod core;
pub mod probe;
pub mod tui;

#[cfg(test)]
pub mod test_support;
