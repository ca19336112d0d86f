//! Conference display metadata.

use serde::{Deserialize, Serialize};

/// Conference-wide display settings shown on every view and export.
///
/// Stored as a single JSON object; saving always overwrites the whole record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceSettings {
    /// Conference title.
    pub conference_name: String,
    /// Village (track) hosting the challenge.
    pub village_name: String,
    /// Free-form date text.
    pub conference_date: String,
    /// Conference URL, also encoded into share-card QR codes.
    pub conference_url: String,
}

impl Default for ConferenceSettings {
    fn default() -> Self {
        Self {
            conference_name: "WhiteHatDesert Conference 2025".to_string(),
            village_name: "Hospitalizing Malware Village".to_string(),
            conference_date: "15th November 2025".to_string(),
            conference_url: "https://whitehatdesert.com".to_string(),
        }
    }
}
