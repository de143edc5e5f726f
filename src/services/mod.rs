//! Business logic services.
//!
//! Services contain core logic separated from HTTP handlers: credential
//! generation, scope shape checks, the validation engine, and the
//! best-effort audit recorder.

/// Secret/salt generation and scrypt verifier derivation
pub mod credentials;
/// `resource:action` scope shape check
pub mod scope;
/// Best-effort audit writes
pub mod usage_recorder;
/// Allow/deny decision engine
pub mod validation;
