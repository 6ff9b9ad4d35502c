//! Mapper and cache configuration.
//!
//! Configuration is plain data with sensible defaults. Callers that keep their
//! settings in JSON can deserialize these structs directly; reading files is left
//! to the embedding application.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for plan cache growth control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Run a collection pass every this many insertions.
    pub collect_every: usize,

    /// Entries whose hit count is at or below this value are removed by a
    /// collection pass.
    pub min_hits: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            collect_every: 1000,
            min_hits: 0,
        }
    }
}

impl CacheConfig {
    /// Set the collection interval.
    pub fn collect_every(mut self, insertions: usize) -> Self {
        self.collect_every = insertions;
        self
    }

    /// Set the hit threshold at or below which entries are collected.
    pub fn min_hits(mut self, hits: u64) -> Self {
        self.min_hits = hits;
        self
    }

    /// Check the configuration for values the cache cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.collect_every == 0 {
            return Err(Error::InvalidArgument(
                "collect_every must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration for the row mapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Plan cache settings.
    pub cache: CacheConfig,

    /// Fail compilation when a result column binds to no member.
    /// Unbound columns are skipped otherwise.
    pub strict_columns: bool,

    /// Fall back to case-insensitive member matching when no member has the
    /// exact column name.
    pub case_insensitive_members: bool,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            strict_columns: false,
            case_insensitive_members: true,
        }
    }
}

impl MapperConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::InvalidArgument(format!("invalid mapper config: {e}")))?;
        config.cache.validate()?;
        Ok(config)
    }

    /// Set the cache configuration.
    pub fn cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Set strict column binding.
    pub fn strict_columns(mut self, strict: bool) -> Self {
        self.strict_columns = strict;
        self
    }

    /// Set case-insensitive member matching.
    pub fn case_insensitive_members(mut self, enabled: bool) -> Self {
        self.case_insensitive_members = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MapperConfig::default();
        assert_eq!(config.cache.collect_every, 1000);
        assert_eq!(config.cache.min_hits, 0);
        assert!(!config.strict_columns);
        assert!(config.case_insensitive_members);
    }

    #[test]
    fn test_from_json_partial() {
        let config = MapperConfig::from_json(r#"{"cache": {"collect_every": 50}}"#).unwrap();
        assert_eq!(config.cache.collect_every, 50);
        assert_eq!(config.cache.min_hits, 0);
        assert!(config.case_insensitive_members);
    }

    #[test]
    fn test_from_json_rejects_zero_interval() {
        let err = MapperConfig::from_json(r#"{"cache": {"collect_every": 0}}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
