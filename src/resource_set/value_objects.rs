//! Validated identifiers for resource sets and their members.
//!
//! Both types enforce their rules at construction time, so any
//! [`ResourceSetId`] or [`ResourceUrl`] in the system is known to be usable
//! in a request path or patch payload.

use crate::error::{ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Opaque identifier assigned by the remote system when a resource set is created.
///
/// ## Validation Rules
///
/// - Must not be empty or whitespace
///
/// ```rust
/// use resource_set_reconciler::resource_set::ResourceSetId;
///
/// let id = ResourceSetId::new("iamoJDFKaJxGIr0oamd9g").unwrap();
/// assert_eq!(id.as_str(), "iamoJDFKaJxGIr0oamd9g");
/// assert!(ResourceSetId::new("  ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceSetId(String);

impl ResourceSetId {
    pub fn new(value: impl Into<String>) -> ValidationResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::EmptyId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ResourceSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceSetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ResourceSetId {
    type Error = ValidationError;

    fn try_from(value: String) -> ValidationResult<Self> {
        Self::new(value)
    }
}

impl From<ResourceSetId> for String {
    fn from(id: ResourceSetId) -> Self {
        id.0
    }
}

/// An API-addressable resource URL that can be a member of a resource set.
///
/// The URL must be absolute, use `http` or `https`, and carry a host. The
/// original text is kept verbatim: membership is compared by exact string,
/// which is how the remote system reports members back.
///
/// ```rust
/// use resource_set_reconciler::resource_set::ResourceUrl;
///
/// let url = ResourceUrl::new("https://org.example.com/api/v1/groups").unwrap();
/// assert_eq!(url.as_str(), "https://org.example.com/api/v1/groups");
/// assert!(ResourceUrl::new("/api/v1/groups").is_err());
/// assert!(ResourceUrl::new("ftp://org.example.com/api/v1/groups").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceUrl(String);

impl ResourceUrl {
    pub fn new(value: impl Into<String>) -> ValidationResult<Self> {
        let value = value.into();
        Self::validate(&value)?;
        Ok(Self(value))
    }

    fn validate(value: &str) -> ValidationResult<()> {
        if value.trim() != value {
            return Err(ValidationError::invalid_url(
                value,
                "leading or trailing whitespace",
            ));
        }

        let parsed =
            Url::parse(value).map_err(|e| ValidationError::invalid_url(value, e.to_string()))?;

        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ValidationError::invalid_url(
                    value,
                    format!("unsupported scheme '{}'", other),
                ));
            }
        }

        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(ValidationError::invalid_url(value, "missing host"));
        }

        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ResourceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ResourceUrl {
    type Error = ValidationError;

    fn try_from(value: String) -> ValidationResult<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ResourceUrl {
    type Error = ValidationError;

    fn try_from(value: &str) -> ValidationResult<Self> {
        Self::new(value)
    }
}

impl From<ResourceUrl> for String {
    fn from(url: ResourceUrl) -> Self {
        url.0
    }
}
