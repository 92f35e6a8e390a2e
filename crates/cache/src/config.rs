//! Cache configuration: capacity and active eviction policy

use dyntool_core::{Error, Result, DEFAULT_CAPACITY};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Eviction policy selecting which resident unit makes room when the
/// cache is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CachePolicy {
    /// Evict the unit that has gone the longest without being accessed
    Recency,
    /// Evict the unit with the lowest access count, ties broken by the
    /// oldest last access
    Frequency,
}

impl CachePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CachePolicy::Recency => "recency",
            CachePolicy::Frequency => "frequency",
        }
    }
}

impl fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CachePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        // The original service spoke in "lru"/"lfu"; both spellings stay valid.
        match s.to_lowercase().as_str() {
            "recency" | "lru" => Ok(CachePolicy::Recency),
            "frequency" | "lfu" => Ok(CachePolicy::Frequency),
            other => Err(Error::invalid_policy(other)),
        }
    }
}

/// Configuration for the working-set cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of simultaneously resident units
    pub capacity: usize,
    /// Active eviction policy
    pub policy: CachePolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            policy: CachePolicy::Frequency,
        }
    }
}

impl CacheConfig {
    pub fn new(capacity: usize, policy: CachePolicy) -> Self {
        Self { capacity, policy }
    }

    /// Validate configuration values before the cache is constructed
    pub fn validate(&self) -> Result<()> {
        if self.capacity < 1 {
            return Err(Error::invalid_capacity(
                self.capacity,
                "capacity must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parsing() {
        assert_eq!("recency".parse::<CachePolicy>().unwrap(), CachePolicy::Recency);
        assert_eq!("LRU".parse::<CachePolicy>().unwrap(), CachePolicy::Recency);
        assert_eq!("frequency".parse::<CachePolicy>().unwrap(), CachePolicy::Frequency);
        assert_eq!("lfu".parse::<CachePolicy>().unwrap(), CachePolicy::Frequency);
        assert!("arc".parse::<CachePolicy>().is_err());
    }

    #[test]
    fn test_policy_round_trips_through_display() {
        for policy in [CachePolicy::Recency, CachePolicy::Frequency] {
            assert_eq!(policy.to_string().parse::<CachePolicy>().unwrap(), policy);
        }
    }

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.capacity, DEFAULT_CAPACITY);
        assert_eq!(config.policy, CachePolicy::Frequency);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = CacheConfig::new(0, CachePolicy::Recency);
        assert!(config.validate().is_err());
    }
}
