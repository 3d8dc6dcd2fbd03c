//! The secret entity and its expiry predicate.
//!
//! A [`Secret`] is created exactly once, never updated, and removed either by
//! an explicit delete or by the background prune of expired records. The
//! `expire_at == created_at + TTL` invariant is stamped at creation time and
//! never recomputed.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Fixed system-wide time-to-live for every secret, in seconds (3 hours).
/// Not configurable per secret.
pub const TTL_SECONDS: i64 = 3 * 60 * 60;

/// The secret TTL as a [`chrono::Duration`].
pub fn ttl() -> Duration {
    Duration::seconds(TTL_SECONDS)
}

/// The sole persisted entity: an opaque text body with string metadata and a
/// fixed expiry window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    /// Opaque unique identifier assigned by the repository at creation
    pub id: String,
    /// Arbitrary caller-supplied text payload
    pub body: String,
    /// Caller-supplied string key/value metadata
    #[serde(rename = "fields")]
    pub meta: HashMap<String, String>,
    /// Timestamp assigned by the repository at creation
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    /// Always `created_at + TTL`
    #[serde(rename = "expireAt")]
    pub expire_at: DateTime<Utc>,
}

impl Secret {
    /// Assemble a secret expiring `TTL` after `created_at`.
    pub fn new(
        id: String,
        body: String,
        meta: HashMap<String, String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let expire_at = created_at + ttl();
        Self { id, body, meta, created_at, expire_at }
    }

    /// A secret is expired iff `now >= expire_at`. Expired secrets must
    /// behave as absent to readers even before they are physically pruned.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expire_at
    }

    /// [`Secret::is_expired_at`] against the current wall clock.
    pub fn expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}
