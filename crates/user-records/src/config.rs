//! Service configuration.
//!
//! Values come from environment variables with defaults; a `Config` can also
//! be deserialized from any serde source.

use std::path::PathBuf;
use std::sync::Arc;

use envelope_crypto::KeyPair;
use serde::{Deserialize, Serialize};

use crate::error::UserError;

pub const PUBLIC_KEY_ENV: &str = "USER_RECORDS_PUBLIC_KEY";
pub const PRIVATE_KEY_ENV: &str = "USER_RECORDS_PRIVATE_KEY";
pub const MEDIA_FOLDER_ENV: &str = "USER_RECORDS_MEDIA_FOLDER";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// PEM-encoded RSA public key (SPKI or PKCS#1).
    pub public_key_path: PathBuf,
    /// PEM-encoded RSA private key (PKCS#8 or PKCS#1).
    pub private_key_path: PathBuf,
    /// Folder uploaded user images are stored under.
    pub media_folder: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            public_key_path: PathBuf::from("keys/public.pem"),
            private_key_path: PathBuf::from("keys/private.pem"),
            media_folder: "users".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable lookup. Unset or blank
    /// variables fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            public_key_path: get(PUBLIC_KEY_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.public_key_path),
            private_key_path: get(PRIVATE_KEY_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.private_key_path),
            media_folder: get(MEDIA_FOLDER_ENV).unwrap_or(defaults.media_folder),
        }
    }

    /// Loads the keypair once at startup. Any problem here is fatal.
    pub fn load_keys(&self) -> Result<Arc<KeyPair>, UserError> {
        KeyPair::load(&self.public_key_path, &self.private_key_path)
            .map(Arc::new)
            .map_err(|e| UserError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../envelope-crypto/testdata")
            .join(name)
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(Config::from_lookup(|_| None), Config::default());
    }

    #[test]
    fn reads_variables_and_ignores_blank() {
        let vars: HashMap<&str, &str> = [
            (PUBLIC_KEY_ENV, "/etc/keys/pub.pem"),
            (PRIVATE_KEY_ENV, "  "),
            (MEDIA_FOLDER_ENV, "avatars"),
        ]
        .into_iter()
        .collect();
        let config = Config::from_lookup(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.public_key_path, PathBuf::from("/etc/keys/pub.pem"));
        assert_eq!(config.private_key_path, PathBuf::from("keys/private.pem"));
        assert_eq!(config.media_folder, "avatars");
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: Config = serde_json::from_str(r#"{ "media_folder": "avatars" }"#).unwrap();
        assert_eq!(config.media_folder, "avatars");
        assert_eq!(config.public_key_path, PathBuf::from("keys/public.pem"));
    }

    #[test]
    fn load_keys_from_fixtures() {
        let config = Config {
            public_key_path: fixture("test_public.pem"),
            private_key_path: fixture("test_private.pem"),
            media_folder: "users".into(),
        };
        let keys = config.load_keys().unwrap();
        assert_eq!(keys.modulus_bits(), 2048);
    }

    #[test]
    fn missing_key_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            public_key_path: dir.path().join("absent.pem"),
            private_key_path: fixture("test_private.pem"),
            media_folder: "users".into(),
        };
        let err = config.load_keys().unwrap_err();
        assert!(matches!(err, UserError::Config(msg) if msg.contains("absent.pem")));
    }

    #[test]
    fn mismatched_halves_rejected() {
        let config = Config {
            public_key_path: fixture("other_public.pem"),
            private_key_path: fixture("test_private.pem"),
            media_folder: "users".into(),
        };
        assert!(matches!(config.load_keys(), Err(UserError::Config(_))));
    }
}
