// crates/client/src/lib.rs
//! Sync client for the wikidex index server.
//!
//! Embedded in the owning application: after each authoritative document
//! commit it pushes the current state to the index server, and on delete it
//! removes the entry. Both are best effort — a down or slow index must
//! never fail the primary write path. The search path is fallible by
//! design, so the caller can degrade to its own local full-text search and
//! show a non-fatal notice.

mod client;
mod error;

pub use client::{IndexClient, DEFAULT_TIMEOUT, INDEX_URL_ENV};
pub use error::{ClientError, Result};
