//! Service tiers and named permissions.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use sintrix_ratelimit::WindowLimits;

use crate::constants::FREE_DEFAULT_DAILY_LIMIT;
use crate::constants::FREE_HOUR_LIMIT;
use crate::constants::FREE_KEY_PREFIX;
use crate::constants::FREE_MINUTE_LIMIT;
use crate::constants::PRO_DEFAULT_DAILY_LIMIT;
use crate::constants::PRO_HOUR_LIMIT;
use crate::constants::PRO_KEY_PREFIX;
use crate::constants::PRO_MINUTE_LIMIT;
use crate::error::AuthError;

/// A key's service class, determining its fixed rate ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Free tier: 60/min, 1000/hr.
    Free,
    /// Pro tier: 300/min, 5000/hr.
    Pro,
}

impl Tier {
    /// Minute-window ceiling for this tier.
    pub fn minute_limit(&self) -> u32 {
        match self {
            Tier::Free => FREE_MINUTE_LIMIT,
            Tier::Pro => PRO_MINUTE_LIMIT,
        }
    }

    /// Hour-window ceiling for this tier.
    pub fn hour_limit(&self) -> u32 {
        match self {
            Tier::Free => FREE_HOUR_LIMIT,
            Tier::Pro => PRO_HOUR_LIMIT,
        }
    }

    /// Daily limit applied when issuance does not specify one.
    pub fn default_daily_limit(&self) -> u32 {
        match self {
            Tier::Free => FREE_DEFAULT_DAILY_LIMIT,
            Tier::Pro => PRO_DEFAULT_DAILY_LIMIT,
        }
    }

    /// Human-inspectable prefix for issued keys of this tier.
    ///
    /// Triage only - nothing in the system trusts the prefix as a tier
    /// claim; tier is read from the stored record.
    pub fn key_prefix(&self) -> &'static str {
        match self {
            Tier::Free => FREE_KEY_PREFIX,
            Tier::Pro => PRO_KEY_PREFIX,
        }
    }

    /// Window ceilings for a key of this tier with the given daily limit.
    pub fn window_limits(&self, daily_limit: u32) -> WindowLimits {
        WindowLimits {
            per_minute: self.minute_limit(),
            per_hour: self.hour_limit(),
            per_day: daily_limit,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Free => write!(f, "free"),
            Tier::Pro => write!(f, "pro"),
        }
    }
}

impl FromStr for Tier {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Tier::Free),
            "pro" => Ok(Tier::Pro),
            other => Err(AuthError::InvalidTier { value: other.to_string() }),
        }
    }
}

/// A named capability a key may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Run predictions against a trained model.
    Predict,
    /// Mutate training data and trigger training runs.
    Train,
    /// Administrative key and model management.
    Manage,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Predict => write!(f, "predict"),
            Permission::Train => write!(f, "train"),
            Permission::Manage => write!(f, "manage"),
        }
    }
}

impl FromStr for Permission {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "predict" => Ok(Permission::Predict),
            "train" => Ok(Permission::Train),
            "manage" => Ok(Permission::Manage),
            other => Err(AuthError::InvalidPermission { value: other.to_string() }),
        }
    }
}
