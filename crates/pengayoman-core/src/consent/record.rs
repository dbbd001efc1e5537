use serde::{Deserialize, Serialize};

/// Current consent schema version. Records written with any other version
/// are regenerated.
pub const CONSENT_VERSION: &str = "1.0";

/// Records older than this are regenerated (365 days).
pub const CONSENT_MAX_AGE_MS: u64 = 365 * 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentStatus {
    Unknown,
    Required,
    NotRequired,
    Obtained,
}

impl ConsentStatus {
    /// Personalized ads are only requested with explicit consent.
    pub fn allows_personalized_ads(self) -> bool {
        self == ConsentStatus::Obtained
    }
}

impl std::fmt::Display for ConsentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConsentStatus::Unknown => "unknown",
            ConsentStatus::Required => "required",
            ConsentStatus::NotRequired => "not_required",
            ConsentStatus::Obtained => "obtained",
        };
        f.write_str(s)
    }
}

/// Persisted consent state. Always replaced as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentRecord {
    pub status: ConsentStatus,
    /// Cached at write time from `status`.
    pub can_request_ads: bool,
    #[serde(rename = "isPrivacyOptionsRequired")]
    pub privacy_options_required: bool,
    #[serde(rename = "version")]
    pub schema_version: String,
    /// Epoch milliseconds of the write.
    #[serde(rename = "timestamp")]
    pub updated_at: u64,
}

impl ConsentRecord {
    fn new(status: ConsentStatus, can_request_ads: bool, privacy_options_required: bool, now_ms: u64) -> Self {
        Self {
            status,
            can_request_ads,
            privacy_options_required,
            schema_version: CONSENT_VERSION.to_string(),
            updated_at: now_ms,
        }
    }

    /// Default for a fresh installation: consent is assumed not legally required.
    pub fn not_required(now_ms: u64) -> Self {
        Self::new(ConsentStatus::NotRequired, true, false, now_ms)
    }

    pub fn obtained(now_ms: u64) -> Self {
        Self::new(ConsentStatus::Obtained, true, true, now_ms)
    }

    /// Consent withdrawn; non-personalized ads remain allowed.
    pub fn required(now_ms: u64) -> Self {
        Self::new(ConsentStatus::Required, true, true, now_ms)
    }

    /// Used when stored state cannot be read. Never requests ads.
    pub fn fail_closed(now_ms: u64) -> Self {
        Self::new(ConsentStatus::Unknown, false, true, now_ms)
    }

    /// Version mismatch is checked before age; either forces regeneration.
    pub fn is_stale(&self, now_ms: u64) -> bool {
        if self.schema_version != CONSENT_VERSION {
            return true;
        }
        self.updated_at < now_ms.saturating_sub(CONSENT_MAX_AGE_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_760_000_000_000;

    #[test]
    fn json_uses_stored_field_names() {
        let json = serde_json::to_value(ConsentRecord::obtained(NOW)).unwrap();
        assert_eq!(json["status"], "obtained");
        assert_eq!(json["canRequestAds"], true);
        assert_eq!(json["isPrivacyOptionsRequired"], true);
        assert_eq!(json["version"], "1.0");
        assert_eq!(json["timestamp"], NOW);
    }

    #[test]
    fn parses_record_written_by_previous_installs() {
        let raw = r#"{"status":"not_required","canRequestAds":true,"isPrivacyOptionsRequired":false,"version":"1.0","timestamp":1760000000000}"#;
        let record: ConsentRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record, ConsentRecord::not_required(NOW));
    }

    #[test]
    fn staleness_boundaries() {
        let record = ConsentRecord::not_required(NOW);
        assert!(!record.is_stale(NOW));
        assert!(!record.is_stale(NOW + CONSENT_MAX_AGE_MS));
        assert!(record.is_stale(NOW + CONSENT_MAX_AGE_MS + 1));

        let mut old_version = record.clone();
        old_version.schema_version = "0.9".into();
        assert!(old_version.is_stale(NOW));
    }

    #[test]
    fn only_obtained_allows_personalization() {
        assert!(ConsentStatus::Obtained.allows_personalized_ads());
        assert!(!ConsentStatus::Required.allows_personalized_ads());
        assert!(!ConsentStatus::NotRequired.allows_personalized_ads());
        assert!(!ConsentStatus::Unknown.allows_personalized_ads());
    }
}
