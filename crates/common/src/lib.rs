//! Common utilities and shared types for the founders board.
//!
//! This crate provides foundational components used across all crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Tokens**: Bearer token signing and verification via [`TokenSigner`]
//!
//! # Example
//!
//! ```no_run
//! use founders_common::{Config, IdGenerator, AppResult, TokenSigner};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let signer = TokenSigner::from_config(&config.auth);
//!     let id = IdGenerator::new().generate();
//!     let token = signer.issue(&id, "ada@example.com", "Ada")?;
//!     println!("Issued token for {id}: {token}");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod token;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use token::{Claims, TokenSigner};
