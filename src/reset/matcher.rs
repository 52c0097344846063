//! Key matchers
//!
//! Decide which keys of a shared store belong to notification scheduling.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key fragments written by the notification plugin into the shared store
pub const NOTIFICATION_KEY_FRAGMENTS: &[&str] =
    &["scheduled_notifications", "flutter_local_notifications"];

static NOTIFICATION_MATCHERS: Lazy<MatcherSet> = Lazy::new(|| MatcherSet {
    matchers: NOTIFICATION_KEY_FRAGMENTS
        .iter()
        .map(|fragment| CompiledMatcher::Substring(fragment.to_string()))
        .collect(),
});

/// A configured key predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "pattern", rename_all = "snake_case")]
pub enum KeyMatcher {
    Substring(String),
    Prefix(String),
    Exact(String),
    Glob(String),
    Regex(String),
}

/// Matcher configuration errors
#[derive(Debug, Error)]
pub enum MatcherError {
    #[error("Invalid regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        source: regex::Error,
    },
    #[error("Invalid glob '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        source: glob::PatternError,
    },
}

pub fn default_key_matchers() -> Vec<KeyMatcher> {
    NOTIFICATION_KEY_FRAGMENTS
        .iter()
        .map(|fragment| KeyMatcher::Substring(fragment.to_string()))
        .collect()
}

impl KeyMatcher {
    fn compile(&self) -> Result<CompiledMatcher, MatcherError> {
        Ok(match self {
            KeyMatcher::Substring(p) => CompiledMatcher::Substring(p.clone()),
            KeyMatcher::Prefix(p) => CompiledMatcher::Prefix(p.clone()),
            KeyMatcher::Exact(p) => CompiledMatcher::Exact(p.clone()),
            KeyMatcher::Glob(p) => {
                let pattern = glob::Pattern::new(p).map_err(|source| MatcherError::InvalidGlob {
                    pattern: p.clone(),
                    source,
                })?;
                CompiledMatcher::Glob(pattern)
            }
            KeyMatcher::Regex(p) => {
                let regex = Regex::new(p).map_err(|source| MatcherError::InvalidRegex {
                    pattern: p.clone(),
                    source,
                })?;
                CompiledMatcher::Regex(regex)
            }
        })
    }
}

#[derive(Debug, Clone)]
enum CompiledMatcher {
    Substring(String),
    Prefix(String),
    Exact(String),
    Glob(glob::Pattern),
    Regex(Regex),
}

impl CompiledMatcher {
    fn matches(&self, key: &str) -> bool {
        match self {
            CompiledMatcher::Substring(p) => key.contains(p.as_str()),
            CompiledMatcher::Prefix(p) => key.starts_with(p.as_str()),
            CompiledMatcher::Exact(p) => key == p,
            CompiledMatcher::Glob(p) => p.matches(key),
            CompiledMatcher::Regex(r) => r.is_match(key),
        }
    }
}

/// Compiled set of key matchers. A key matches when any matcher accepts it.
#[derive(Debug, Clone)]
pub struct MatcherSet {
    matchers: Vec<CompiledMatcher>,
}

impl MatcherSet {
    pub fn compile(matchers: &[KeyMatcher]) -> Result<Self, MatcherError> {
        let matchers = matchers
            .iter()
            .map(KeyMatcher::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { matchers })
    }

    /// Substring matchers for the plugin's key fragments
    pub fn notification_defaults() -> Self {
        NOTIFICATION_MATCHERS.clone()
    }

    pub fn matches(&self, key: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(key))
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}
