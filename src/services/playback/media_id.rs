//! Media identifier extraction.
//!
//! Embeds report what they have loaded as a full watch URL, not a bare
//! identifier. The extraction pattern recognizes the common hosting URL
//! shapes and captures the identifier that follows.

use std::sync::OnceLock;

use regex::Regex;

use super::types::MediaId;

const MEDIA_URL_PATTERN: &str = r"(?:youtu\.be/|v/|u/\w/|embed/|watch\?v=|&v=|\?v=)([^#&?]*)";

fn media_url_regex() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(MEDIA_URL_PATTERN).ok())
        .as_ref()
}

impl MediaId {
    /// Extract a media identifier from a hosting URL.
    ///
    /// Returns the empty identifier when the URL matches none of the known
    /// shapes, which is also what embeds report before anything is loaded.
    pub fn from_url(url: &str) -> Self {
        let id = media_url_regex()
            .and_then(|re| re.captures(url))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .unwrap_or_default();

        Self::new(id)
    }
}
