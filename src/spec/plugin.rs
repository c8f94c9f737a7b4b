//! Editor extension identifiers
//!
//! A plugin is written `vendor.name-version`, the same form marketplaces
//! use for VSIX file names. The canonical string is both the cache key and
//! the install directory name.

use crate::error::{EnvGraphError, EnvGraphResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A versioned editor extension reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PluginRef {
    vendor: String,
    name: String,
    version: String,
}

impl PluginRef {
    /// Build a reference from its parts, validating each one
    pub fn new(
        vendor: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> EnvGraphResult<Self> {
        let plugin = Self {
            vendor: vendor.into(),
            name: name.into(),
            version: version.into(),
        };
        plugin.validate()?;
        Ok(plugin)
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// `vendor.name`, identifying the extension regardless of version
    pub fn identity(&self) -> String {
        format!("{}.{}", self.vendor, self.name)
    }

    fn validate(&self) -> EnvGraphResult<()> {
        let input = self.to_string();
        let invalid = |reason: &str| EnvGraphError::InvalidPluginRef {
            input: input.clone(),
            reason: reason.to_string(),
        };

        for (part, label) in [(&self.vendor, "vendor"), (&self.name, "name")] {
            if part.is_empty() {
                return Err(invalid(&format!("{} cannot be empty", label)));
            }
            if !part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            {
                return Err(invalid(&format!(
                    "{} must contain only alphanumeric characters, hyphens, or underscores",
                    label
                )));
            }
        }

        if !self.version.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(invalid("version must start with a digit"));
        }
        if self.version.contains(['/', '\\', '\0']) || self.version.contains("..") {
            return Err(invalid("version must not contain path separators or '..'"));
        }

        Ok(())
    }
}

impl fmt::Display for PluginRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}-{}", self.vendor, self.name, self.version)
    }
}

impl FromStr for PluginRef {
    type Err = EnvGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| EnvGraphError::InvalidPluginRef {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let (vendor, rest) = s
            .split_once('.')
            .ok_or_else(|| invalid("expected vendor.name-version"))?;
        let (name, version) = rest
            .rsplit_once('-')
            .ok_or_else(|| invalid("missing version suffix"))?;

        Self::new(vendor, name, version)
    }
}

impl Serialize for PluginRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PluginRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
