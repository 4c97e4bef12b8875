//! Error types for the Vermeer snapshot library.
//!
//! This crate provides the foundation error types used throughout the Vermeer
//! workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Error Classes
//!
//! Failures during a capture or restore run fall into distinct classes with
//! different blast radii:
//! - [`StructuralError`] — missing target, malformed configuration, missing
//!   snapshot. Fatal to the whole run or the single call that raised it.
//! - [`EntityError`] — one create/edit/delete call failed. Logged at the call
//!   site; the run continues without that entity.
//! - [`DirectoryError`] with [`DirectoryErrorKind::OversizePayload`] — the
//!   distinguished payload-too-large failure, handled specially by message
//!   replay.
//! - [`StorageError`] with [`StorageErrorKind::NotFound`] — the requested
//!   snapshot id does not exist; fatal to that fetch/delete only.
//!
//! # Examples
//!
//! ```
//! use vermeer_error::{VermeerResult, HttpError};
//!
//! fn fetch_data() -> VermeerResult<String> {
//!     Err(HttpError::new("Connection refused"))?
//! }
//!
//! match fetch_data() {
//!     Ok(data) => println!("Got: {}", data),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod http;
mod json;
mod config;
mod storage;
mod structural;
mod entity;
mod directory;
mod error;

pub use http::HttpError;
pub use json::JsonError;
pub use config::ConfigError;
pub use storage::{StorageError, StorageErrorKind};
pub use structural::{StructuralError, StructuralErrorKind};
pub use entity::{EntityError, EntityErrorKind};
pub use directory::{DirectoryError, DirectoryErrorKind};
pub use error::{VermeerError, VermeerErrorKind, VermeerResult};
