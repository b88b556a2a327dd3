//! Audit Trail
//!
//! Bounded, in-memory record of state-changing events for diagnostics.
//! Entries are mirrored to `tracing` as they are written. The buffer is not
//! persisted and is not tamper-evident.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Default number of entries kept before the oldest is evicted
pub const DEFAULT_AUDIT_CAPACITY: usize = 200;

/// Types of auditable events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    CertGranted,
    CertRevoked,
    CertExpired,
    FactionChanged,
    PermissionDenied,
    ProfileReset,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::CertGranted => "CERT_GRANTED",
            AuditAction::CertRevoked => "CERT_REVOKED",
            AuditAction::CertExpired => "CERT_EXPIRED",
            AuditAction::FactionChanged => "FACTION_CHANGED",
            AuditAction::PermissionDenied => "PERMISSION_DENIED",
            AuditAction::ProfileReset => "PROFILE_RESET",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single audit log entry. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub player_id: String,
    pub faction: String,
    pub action: AuditAction,
    /// Compact JSON object text
    pub payload: String,
}

impl AuditEntry {
    pub fn new(
        timestamp: DateTime<Utc>,
        player_id: impl Into<String>,
        faction: impl Into<String>,
        action: AuditAction,
    ) -> Self {
        Self {
            timestamp,
            player_id: player_id.into(),
            faction: faction.into(),
            action,
            payload: "{}".to_string(),
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload.to_string();
        self
    }

    /// Payload parsed back into structured form
    pub fn payload_value(&self) -> serde_json::Value {
        serde_json::from_str(&self.payload).unwrap_or(serde_json::Value::Null)
    }
}

/// Fixed-capacity FIFO of audit entries
#[derive(Debug, Clone)]
pub struct AuditLog {
    entries: VecDeque<AuditEntry>,
    capacity: usize,
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_AUDIT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, evicting the oldest ones beyond capacity
    pub fn log(&mut self, entry: AuditEntry) {
        match entry.action {
            AuditAction::PermissionDenied => tracing::debug!(
                player_id = %entry.player_id,
                payload = %entry.payload,
                "AUDIT: {}",
                entry.action
            ),
            AuditAction::CertExpired => tracing::warn!(
                player_id = %entry.player_id,
                payload = %entry.payload,
                "AUDIT: {}",
                entry.action
            ),
            _ => tracing::info!(
                player_id = %entry.player_id,
                payload = %entry.payload,
                "AUDIT: {}",
                entry.action
            ),
        }

        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Append a new entry built from its parts
    pub fn add(
        &mut self,
        timestamp: DateTime<Utc>,
        player_id: &str,
        faction: &str,
        action: AuditAction,
        payload: serde_json::Value,
    ) {
        self.log(AuditEntry::new(timestamp, player_id, faction, action).with_payload(payload));
    }

    /// All retained entries, oldest first
    pub fn entries(&self) -> impl ExactSizeIterator<Item = &AuditEntry> + DoubleEndedIterator {
        self.entries.iter()
    }

    /// Most recent entries, newest first
    pub fn recent(&self, count: usize) -> Vec<AuditEntry> {
        self.entries.iter().rev().take(count).cloned().collect()
    }

    pub fn by_action(&self, action: AuditAction) -> Vec<AuditEntry> {
        self.entries
            .iter()
            .filter(|e| e.action == action)
            .cloned()
            .collect()
    }

    pub fn count_of(&self, action: AuditAction) -> usize {
        self.entries.iter().filter(|e| e.action == action).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ts(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn test_ring_buffer_evicts_oldest() {
        let mut log = AuditLog::with_capacity(3);
        for i in 0..5 {
            log.add(ts(i), "p1", "Neutral", AuditAction::CertGranted, json!({ "seq": i }));
        }

        assert_eq!(log.len(), 3);
        let seqs: Vec<i64> = log
            .entries()
            .map(|e| e.payload_value()["seq"].as_i64().unwrap())
            .collect();
        assert_eq!(seqs, vec![2, 3, 4]);
    }

    #[test]
    fn test_default_capacity() {
        let mut log = AuditLog::default();
        assert_eq!(log.capacity(), DEFAULT_AUDIT_CAPACITY);
        for i in 0..(DEFAULT_AUDIT_CAPACITY as i64 + 25) {
            log.add(ts(i), "p1", "Neutral", AuditAction::PermissionDenied, json!({}));
        }
        assert_eq!(log.len(), DEFAULT_AUDIT_CAPACITY);
        assert_eq!(log.entries().next().unwrap().timestamp, ts(25));
    }

    #[test]
    fn test_recent_is_newest_first() {
        let mut log = AuditLog::new();
        log.add(ts(1), "p1", "Neutral", AuditAction::CertGranted, json!({}));
        log.add(ts(2), "p1", "Neutral", AuditAction::CertRevoked, json!({}));
        log.add(ts(3), "p1", "Neutral", AuditAction::CertGranted, json!({}));

        let recent = log.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].timestamp, ts(3));
        assert_eq!(recent[1].action, AuditAction::CertRevoked);

        assert_eq!(log.by_action(AuditAction::CertGranted).len(), 2);
        assert_eq!(log.count_of(AuditAction::CertExpired), 0);
    }

    #[test]
    fn test_action_tags() {
        assert_eq!(AuditAction::CertExpired.as_str(), "CERT_EXPIRED");
        assert_eq!(
            serde_json::to_string(&AuditAction::PermissionDenied).unwrap(),
            "\"PERMISSION_DENIED\""
        );
    }

    #[test]
    fn test_payload_is_compact_text() {
        let entry = AuditEntry::new(ts(0), "p1", "Neutral", AuditAction::FactionChanged)
            .with_payload(json!({ "from": "Neutral", "to": "Vanguard" }));
        assert_eq!(entry.payload, r#"{"from":"Neutral","to":"Vanguard"}"#);
    }
}
