//! Object models shared by the storage backends and the bot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Read permission on a single object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessPolicy {
    #[serde(rename = "public-read")]
    PublicRead,
    #[serde(rename = "private")]
    Private,
}

impl AccessPolicy {
    /// Canned ACL name as understood by S3-compatible providers.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessPolicy::PublicRead => "public-read",
            AccessPolicy::Private => "private",
        }
    }
}

impl Display for AccessPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public-read" => Ok(AccessPolicy::PublicRead),
            "private" => Ok(AccessPolicy::Private),
            _ => Err(anyhow::anyhow!("Invalid access policy: {}", s)),
        }
    }
}

/// Object metadata fetched on demand with a HEAD request. Never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub key: String,
    pub size: u64,
    pub content_type: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub etag: Option<String>,
    /// `None` when the provider has no object-level ACLs.
    pub access_policy: Option<AccessPolicy>,
}

/// One row of a prefix listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectEntry {
    pub key: String,
    pub size: Option<u64>,
    pub last_modified: Option<DateTime<Utc>>,
}
