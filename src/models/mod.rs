//! Data models representing database entities.
//!
//! This module contains all data structures that map to database tables,
//! plus the request/response types derived from them.

/// API key record and lifecycle request/response types
pub mod api_key;
/// Append-only usage (audit) record types
pub mod usage;
