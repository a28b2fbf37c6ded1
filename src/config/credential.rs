use anyhow::anyhow;
use std::fmt;

/// Static API key for the feed service, captured once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    #[cfg(test)]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Reads the key through `lookup`, failing when the variable is unset or empty.
    pub fn from_lookup<F>(var: &str, lookup: F) -> anyhow::Result<Self>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        match lookup(var) {
            Some(key) if !key.is_empty() => Ok(Self(key)),
            _ => Err(anyhow!("{var} is not set")),
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}
