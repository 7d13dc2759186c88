//! Holder identity loaded once per invocation.

use crate::errors::ConfigurationError;
use std::fmt;

/// The locally configured certificate holder.
///
/// Immutable for the lifetime of one command invocation and never cached
/// across invocations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityContext {
    holder_id: String,
}

impl IdentityContext {
    /// Configuration key the holder id is read from.
    pub const HOLDER_ID_KEY: &'static str = "scalar.dl.client.cert_holder_id";

    /// Create an identity context. The holder id must be non-empty.
    pub fn new(holder_id: impl Into<String>) -> Result<Self, ConfigurationError> {
        let holder_id = holder_id.into();
        if holder_id.is_empty() {
            return Err(ConfigurationError::MissingKey(Self::HOLDER_ID_KEY));
        }
        Ok(Self { holder_id })
    }

    /// The configured holder id.
    #[must_use]
    pub fn holder_id(&self) -> &str {
        &self.holder_id
    }
}

impl fmt::Display for IdentityContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.holder_id)
    }
}
