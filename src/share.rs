//! Social share text and links.

use serde::Serialize;

use crate::{settings::ConferenceSettings, types::Score};

/// Supported share targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareTarget {
    /// X / Twitter tweet intent.
    Twitter,
    /// Facebook sharer.
    Facebook,
    /// LinkedIn share-offsite.
    LinkedIn,
}

/// `Just ranked #<rank> at <conference> with a score of <score>! 🏆`
pub fn share_text(rank: usize, settings: &ConferenceSettings, score: Score) -> String {
    format!(
        "Just ranked #{rank} at {} with a score of {score}! 🏆",
        settings.conference_name
    )
}

/// Share URL for `target` pointing at the conference URL.
pub fn share_url(target: ShareTarget, text: &str, settings: &ConferenceSettings) -> String {
    let url = urlencoding::encode(&settings.conference_url);
    let text = urlencoding::encode(text);
    match target {
        ShareTarget::Twitter => {
            format!("https://twitter.com/intent/tweet?text={text}&url={url}")
        }
        ShareTarget::Facebook => {
            format!("https://www.facebook.com/sharer/sharer.php?u={url}&quote={text}")
        }
        ShareTarget::LinkedIn => {
            format!("https://www.linkedin.com/sharing/share-offsite/?url={url}")
        }
    }
}

/// Text plus one link per target for a ranked entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareLinks {
    /// Share message.
    pub text: String,
    /// Twitter intent URL.
    pub twitter: String,
    /// Facebook sharer URL.
    pub facebook: String,
    /// LinkedIn share URL.
    pub linkedin: String,
}

impl ShareLinks {
    /// Builds every link for `rank` and `score`.
    pub fn new(rank: usize, score: Score, settings: &ConferenceSettings) -> Self {
        let text = share_text(rank, settings, score);
        Self {
            twitter: share_url(ShareTarget::Twitter, &text, settings),
            facebook: share_url(ShareTarget::Facebook, &text, settings),
            linkedin: share_url(ShareTarget::LinkedIn, &text, settings),
            text,
        }
    }
}
