//! `ordercheck-core` — shared building blocks for the order checking crates.
//!
//! This crate only carries the error model for decoding order documents; it
//! has no knowledge of orders themselves.

pub mod error;

pub use error::{DocumentError, DocumentResult};
