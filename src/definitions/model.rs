//! Definition data types as supplied by the definitions provider.

use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Globally unique certification identifier.
///
/// Serialized as a bare string so external definition and snapshot files stay
/// plain JSON strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CertId(String);

impl CertId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl Borrow<str> for CertId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CertId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for CertId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// How a tier's credentials age out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryMode {
    /// Never expires by time (version bumps still invalidate)
    #[default]
    None,
    /// Expires a fixed number of days after it was earned
    Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryPolicy {
    #[serde(default)]
    pub mode: ExpiryMode,

    /// Lifetime in days for `Duration` mode. Older data files carry this as a
    /// numeric string, which is still accepted.
    #[serde(
        default,
        deserialize_with = "deserialize_days",
        skip_serializing_if = "Option::is_none"
    )]
    pub days: Option<u32>,
}

impl ExpiryPolicy {
    pub fn never() -> Self {
        Self::default()
    }

    pub fn after_days(days: u32) -> Self {
        Self {
            mode: ExpiryMode::Duration,
            days: Some(days),
        }
    }

    /// Effective lifetime in days, if this policy expires by time at all
    pub fn duration_days(&self) -> Option<u32> {
        match (self.mode, self.days) {
            (ExpiryMode::Duration, Some(days)) if days > 0 => Some(days),
            _ => None,
        }
    }
}

fn deserialize_days<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDays {
        Number(u32),
        Text(String),
    }

    match Option::<RawDays>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawDays::Number(days)) => Ok(Some(days)),
        Some(RawDays::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawDays::Text(text)) => text
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|e| {
                serde::de::Error::custom(format!("invalid expiry days {:?}: {}", text, e))
            }),
    }
}

/// One rung of a certification ladder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificationTier {
    pub tier: u32,

    pub cert_id: CertId,

    #[serde(default)]
    pub display_name: String,

    /// Permission strings unlocked while this credential is held and valid
    #[serde(default)]
    pub permissions: Vec<String>,

    /// Opaque earning requirements, owned by mission/reward systems
    #[serde(default)]
    pub requirements: serde_json::Value,

    /// Bumping this invalidates every record earned under an older version
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub expiry_policy: ExpiryPolicy,
}

fn default_version() -> u32 {
    1
}

impl CertificationTier {
    pub fn new(tier: u32, cert_id: impl Into<CertId>) -> Self {
        let cert_id = cert_id.into();
        Self {
            tier,
            display_name: cert_id.to_string(),
            cert_id,
            permissions: Vec::new(),
            requirements: serde_json::Value::Null,
            version: 1,
            expiry_policy: ExpiryPolicy::never(),
        }
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_expiry(mut self, policy: ExpiryPolicy) -> Self {
        self.expiry_policy = policy;
        self
    }
}

/// A named, ordered track of tiers within one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificationLadder {
    pub ladder_id: String,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub tiers: Vec<CertificationTier>,
}

impl CertificationLadder {
    pub fn new(ladder_id: impl Into<String>, category: impl Into<String>) -> Self {
        let ladder_id = ladder_id.into();
        Self {
            display_name: ladder_id.clone(),
            ladder_id,
            category: category.into(),
            tiers: Vec::new(),
        }
    }

    pub fn with_tier(mut self, tier: CertificationTier) -> Self {
        self.tiers.push(tier);
        self
    }
}

/// Minimum trust score for a rank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankThreshold {
    pub rank_id: String,

    #[serde(default)]
    pub display_name: String,

    pub min_trust: i64,

    /// Free-form grouping tag (enlisted, officer, ...)
    #[serde(default)]
    pub track: String,
}

impl RankThreshold {
    pub fn new(rank_id: impl Into<String>, min_trust: i64) -> Self {
        let rank_id = rank_id.into();
        Self {
            display_name: rank_id.clone(),
            rank_id,
            min_trust,
            track: String::new(),
        }
    }

    pub fn on_track(mut self, track: impl Into<String>) -> Self {
        self.track = track.into();
        self
    }
}
