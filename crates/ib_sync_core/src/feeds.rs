use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kinds of per-customer data pulled from the reporting API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    /// Install base: the customer's owned product instances.
    Installs,
    /// Service requests.
    Srs,
}

impl FeedKind {
    pub const ALL: [FeedKind; 2] = [FeedKind::Installs, FeedKind::Srs];

    /// Path segment under `/api/` on the reporting API.
    pub fn api_path(self) -> &'static str {
        match self {
            Self::Installs => "installs",
            Self::Srs => "srs",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedListError {
    #[error("unknown feed '{0}' (expected one of: installs, srs)")]
    Unknown(String),
    #[error("feed '{0}' is listed more than once")]
    Duplicate(FeedKind),
    #[error("at least one feed must be configured")]
    Empty,
}

impl FromStr for FeedKind {
    type Err = FeedListError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        FeedKind::ALL
            .into_iter()
            .find(|kind| kind.api_path().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| FeedListError::Unknown(wanted.to_string()))
    }
}

/// Checks an ordered feed list: non-empty, no repeats, order preserved.
pub fn validate_feed_order(feeds: &[FeedKind]) -> Result<(), FeedListError> {
    if feeds.is_empty() {
        return Err(FeedListError::Empty);
    }

    for (index, feed) in feeds.iter().enumerate() {
        if feeds[..index].contains(feed) {
            return Err(FeedListError::Duplicate(*feed));
        }
    }

    Ok(())
}
