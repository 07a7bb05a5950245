//! Secure types for handling resolved credentials.
//!
//! Nothing in this module prints a secret value: `Debug`, `Display` and
//! `Serialize` all redact, and the backing memory is zeroed on drop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::error::{Result, SecretsError};

/// Placeholder emitted wherever a secret value would otherwise appear.
pub const REDACTED: &str = "[REDACTED]";

/// Maximum secret name length accepted by Azure Key Vault.
const MAX_SECRET_NAME_LEN: usize = 127;

/// A string wrapper that redacts its contents in Debug, Display, and serialization.
///
/// The value is only reachable through [`SecretString::expose_secret`].
/// Deserialization accepts real values so credentials can be read from
/// configuration files.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl SecretString {
    /// Creates a new SecretString from a string value.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Exposes the underlying secret value.
    ///
    /// Only call this at the point the value goes on the wire.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// Returns the length of the secret without exposing the value.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(REDACTED)
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(SecretString(value))
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString({})", REDACTED)
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

/// Name of a credential held by the secret store.
///
/// Names follow the Key Vault rules (1-127 ASCII alphanumerics or `-`), which
/// every supported backend can address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SecretReference(String);

impl SecretReference {
    /// Create a validated secret reference.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();

        if name.is_empty() {
            return Err(SecretsError::invalid_name(name, "secret name cannot be empty"));
        }

        if name.len() > MAX_SECRET_NAME_LEN {
            return Err(SecretsError::invalid_name(
                name,
                format!("secret name exceeds {} characters", MAX_SECRET_NAME_LEN),
            ));
        }

        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(SecretsError::invalid_name(
                name,
                "only ASCII letters, digits and '-' are allowed",
            ));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SecretReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SecretReference {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        SecretReference::new(name).map_err(serde::de::Error::custom)
    }
}

/// A secret value fetched from the store, with the metadata the store reported.
///
/// Read-only once obtained, so a caller may clone and share it between cases.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedSecret {
    reference: SecretReference,
    value: SecretString,
    version: Option<String>,
    resolved_at: DateTime<Utc>,
}

impl ResolvedSecret {
    /// Wrap a freshly fetched value, stamped with the current time.
    pub fn new(reference: SecretReference, value: SecretString) -> Self {
        Self { reference, value, version: None, resolved_at: Utc::now() }
    }

    /// Set the version reported by the store.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn reference(&self) -> &SecretReference {
        &self.reference
    }

    pub fn value(&self) -> &SecretString {
        &self.value
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn resolved_at(&self) -> DateTime<Utc> {
        self.resolved_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_string_redacts() {
        let secret = SecretString::new("ABC123");
        assert_eq!(format!("{:?}", secret), "SecretString([REDACTED])");
        assert_eq!(secret.to_string(), REDACTED);
        assert_eq!(serde_json::to_string(&secret).unwrap(), "\"[REDACTED]\"");
        assert_eq!(secret.expose_secret(), "ABC123");
        assert_eq!(secret.len(), 6);
    }

    #[test]
    fn test_secret_string_deserializes_real_value() {
        let secret: SecretString = serde_json::from_str("\"from-config\"").unwrap();
        assert_eq!(secret.expose_secret(), "from-config");
    }

    #[test]
    fn test_reference_validation() {
        assert!(SecretReference::new("apim-master-subscription-key").is_ok());
        assert!(SecretReference::new("").is_err());
        assert!(SecretReference::new("has space").is_err());
        assert!(SecretReference::new("under_score").is_err());
        assert!(SecretReference::new("a".repeat(128)).is_err());
        assert!(SecretReference::new("a".repeat(127)).is_ok());
    }

    #[test]
    fn test_reference_deserialize_validates() {
        let ok: std::result::Result<SecretReference, _> = serde_json::from_str("\"valid-name\"");
        assert!(ok.is_ok());
        let bad: std::result::Result<SecretReference, _> = serde_json::from_str("\"bad/name\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_resolved_secret_debug_hides_value() {
        let reference = SecretReference::new("apim-master-subscription-key").unwrap();
        let resolved =
            ResolvedSecret::new(reference, SecretString::new("ABC123")).with_version("7f3c");

        let debug = format!("{:?}", resolved);
        assert!(!debug.contains("ABC123"));
        assert!(debug.contains("apim-master-subscription-key"));

        let json = serde_json::to_string(&resolved).unwrap();
        assert!(!json.contains("ABC123"));
        assert_eq!(resolved.version(), Some("7f3c"));
    }
}
