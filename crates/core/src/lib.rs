//! Business logic for the founders board.

pub mod services;

pub use services::*;
