//! Ad consent state.
//!
//! A single [`ConsentRecord`] per installation decides whether ads may be
//! requested at all and whether they must be non-personalized.

mod manager;
mod record;

pub use manager::ConsentManager;
pub use record::{ConsentRecord, ConsentStatus, CONSENT_MAX_AGE_MS, CONSENT_VERSION};

/// Storage key holding the JSON-encoded [`ConsentRecord`].
pub const CONSENT_KEY: &str = "user_consent_status";
/// Storage key holding the schema version the record was written with.
pub const CONSENT_VERSION_KEY: &str = "consent_version";
