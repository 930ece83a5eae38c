/// Connection parameters for the hosted data platform.
use crate::{Result, StorageError};

pub const ENDPOINT_VAR: &str = "SUPABASE_URL";
pub const ACCESS_KEY_VAR: &str = "SUPABASE_ANON_KEY";

/// The only ambient configuration the core needs: endpoint + access key,
/// supplied at process start. Missing either is fatal.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub endpoint: String,
    pub access_key: String,
}

impl StoreConfig {
    pub fn new(endpoint: impl Into<String>, access_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            access_key: access_key.into(),
        }
    }

    pub fn from_env() -> Result<Self> {
        let endpoint =
            std::env::var(ENDPOINT_VAR).map_err(|_| StorageError::MissingConfig(ENDPOINT_VAR))?;
        let access_key = std::env::var(ACCESS_KEY_VAR)
            .map_err(|_| StorageError::MissingConfig(ACCESS_KEY_VAR))?;
        Ok(Self::new(endpoint, access_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_stripped() {
        let config = StoreConfig::new("https://proj.supabase.co/", "key");
        assert_eq!(config.endpoint, "https://proj.supabase.co");
    }
}
