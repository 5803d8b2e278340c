//! Per-user persisted record model.
//!
//! # Responsibility
//! - Define the opaque document created for every signed-in user.
//! - Validate user identifiers before they become document keys.
//!
//! # Invariants
//! - Records are keyed `routines/{user_id}`.
//! - `user_id` never contains `/` or whitespace and is at most 128 chars.
//! - Core only ever reads or creates records; it never updates them.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Collection segment used for per-user routine documents.
pub const RECORD_COLLECTION: &str = "routines";

const DEFAULT_RECORD_MESSAGE: &str = "routine record created";
const MAX_USER_ID_CHARS: usize = 128;

static USER_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^/\s]+$").expect("valid user id regex"));

/// Rejected user identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidUserId(pub String);

impl Display for InvalidUserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid user id `{}`: expected 1..={MAX_USER_ID_CHARS} chars without `/` or whitespace",
            self.0
        )
    }
}

impl Error for InvalidUserId {}

/// Identity-provider user identifier, validated for use as a key segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn parse(value: impl Into<String>) -> Result<Self, InvalidUserId> {
        let value = value.into();
        if value.chars().count() > MAX_USER_ID_CHARS || !USER_ID_RE.is_match(&value) {
            return Err(InvalidUserId(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Document key of this user's routine record.
    pub fn record_key(&self) -> String {
        format!("{RECORD_COLLECTION}/{}", self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = InvalidUserId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque per-user document owned by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: UserId,
    /// Arbitrary JSON fields; the core only writes a placeholder on creation.
    pub data: Map<String, Value>,
}

impl UserRecord {
    /// Minimal record written the first time a user is seen.
    pub fn default_for(user_id: UserId) -> Self {
        let mut data = Map::new();
        data.insert(
            "message".to_string(),
            Value::String(DEFAULT_RECORD_MESSAGE.to_string()),
        );
        Self { user_id, data }
    }

    pub fn key(&self) -> String {
        self.user_id.record_key()
    }
}
