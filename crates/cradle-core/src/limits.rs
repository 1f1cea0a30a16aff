//! # Validation Limits
//!
//! Hardcoded input bounds for the Cradle core.
//!
//! These limits are compiled into the binary and are immutable at runtime.
//! Everything that crosses the persistence boundary is validated against
//! them first; nothing unvalidated reaches a store.

/// Maximum length for the startup name.
pub const MAX_NAME_LENGTH: usize = 120;

/// Maximum length for short profile fields (founder, email, phone, sector,
/// stage-of-idea, website).
pub const MAX_PROFILE_FIELD_LENGTH: usize = 256;

/// Maximum length for free text (feedback, descriptions, rejection reasons).
///
/// Longer input is rejected to prevent memory exhaustion from malicious or
/// malformed payloads.
pub const MAX_TEXT_LENGTH: usize = 4096;

/// Maximum number of intake forms accepted in a single batch.
pub const MAX_INTAKE_BATCH: usize = 1000;
