//! # Client Configuration
//!
//! Loads `client.properties` from a fixed location (the working directory by
//! default) and exposes the settings the ledger client needs.
//!
//! ## Keys
//!
//! | Key | Default |
//! |-----|---------|
//! | `scalar.dl.client.cert_holder_id` | required |
//! | `scalar.dl.client.cert_version` | `1` |
//! | `scalar.dl.client.server.host` | `localhost` |
//! | `scalar.dl.client.server.port` | `50051` |
//! | `scalar.dl.client.tls.enabled` | `false` |
//! | `scalar.dl.client.authorization.credential` | none |
//!
//! Unknown keys are kept and ignored.

use crate::domain::IdentityContext;
use crate::errors::ConfigurationError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Conventional configuration file name.
pub const CLIENT_PROPERTIES: &str = "client.properties";

/// Configuration keys.
pub mod keys {
    use crate::domain::IdentityContext;

    pub const CERT_HOLDER_ID: &str = IdentityContext::HOLDER_ID_KEY;
    pub const CERT_VERSION: &str = "scalar.dl.client.cert_version";
    pub const SERVER_HOST: &str = "scalar.dl.client.server.host";
    pub const SERVER_PORT: &str = "scalar.dl.client.server.port";
    pub const TLS_ENABLED: &str = "scalar.dl.client.tls.enabled";
    pub const AUTHORIZATION_CREDENTIAL: &str = "scalar.dl.client.authorization.credential";
}

/// Where configuration is loaded from.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum ConfigLocation {
    /// `client.properties` in the process working directory, resolved per load.
    #[default]
    CurrentDir,
    /// `client.properties` in the given directory.
    Dir(PathBuf),
}

impl ConfigLocation {
    /// Resolve the full path of the configuration file.
    pub fn resolve(&self) -> Result<PathBuf, ConfigurationError> {
        match self {
            Self::CurrentDir => std::env::current_dir()
                .map(|dir| dir.join(CLIENT_PROPERTIES))
                .map_err(ConfigurationError::WorkingDirectory),
            Self::Dir(dir) => Ok(dir.join(CLIENT_PROPERTIES)),
        }
    }

    /// Load the configuration from this location.
    pub fn load(&self) -> Result<ClientConfig, ConfigurationError> {
        ClientConfig::load_from_path(&self.resolve()?)
    }
}

/// Ledger client configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Certificate holder id scoping every derived identifier.
    pub cert_holder_id: String,
    /// Certificate version registered with the ledger.
    pub cert_version: u32,
    /// Ledger server host.
    pub server_host: String,
    /// Ledger server port.
    pub server_port: u16,
    /// Use `https` when talking to the server.
    pub tls_enabled: bool,
    /// Optional credential sent as the `Authorization` header.
    pub authorization_credential: Option<String>,
    properties: HashMap<String, String>,
}

impl ClientConfig {
    /// Default server host.
    pub const DEFAULT_HOST: &'static str = "localhost";
    /// Default server port.
    pub const DEFAULT_PORT: u16 = 50051;
    /// Default certificate version.
    pub const DEFAULT_CERT_VERSION: u32 = 1;

    /// Load `client.properties` from the working directory.
    pub fn load_from_current_dir() -> Result<Self, ConfigurationError> {
        ConfigLocation::CurrentDir.load()
    }

    /// Load `client.properties` from `dir`.
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        Self::load_from_path(&dir.as_ref().join(CLIENT_PROPERTIES))
    }

    /// Load a properties file at an explicit path.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigurationError> {
        let contents = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigurationError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigurationError::Unreadable {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        debug!(path = %path.display(), "loaded client configuration");
        Self::from_properties(parse_properties(&contents))
    }

    /// Build a configuration from already-parsed properties.
    pub fn from_properties(properties: HashMap<String, String>) -> Result<Self, ConfigurationError> {
        let cert_holder_id = properties
            .get(keys::CERT_HOLDER_ID)
            .filter(|value| !value.is_empty())
            .cloned()
            .ok_or(ConfigurationError::MissingKey(keys::CERT_HOLDER_ID))?;

        let cert_version = parse_or(&properties, keys::CERT_VERSION, Self::DEFAULT_CERT_VERSION)?;
        let server_port = parse_or(&properties, keys::SERVER_PORT, Self::DEFAULT_PORT)?;
        let tls_enabled = parse_or(&properties, keys::TLS_ENABLED, false)?;

        let server_host = properties
            .get(keys::SERVER_HOST)
            .filter(|value| !value.is_empty())
            .cloned()
            .unwrap_or_else(|| Self::DEFAULT_HOST.to_string());

        let authorization_credential = properties
            .get(keys::AUTHORIZATION_CREDENTIAL)
            .filter(|value| !value.is_empty())
            .cloned();

        Ok(Self {
            cert_holder_id,
            cert_version,
            server_host,
            server_port,
            tls_enabled,
            authorization_credential,
            properties,
        })
    }

    /// A minimal configuration for `holder_id` with every default applied.
    #[must_use]
    pub fn for_holder(holder_id: impl Into<String>) -> Self {
        Self {
            cert_holder_id: holder_id.into(),
            cert_version: Self::DEFAULT_CERT_VERSION,
            server_host: Self::DEFAULT_HOST.to_string(),
            server_port: Self::DEFAULT_PORT,
            tls_enabled: false,
            authorization_credential: None,
            properties: HashMap::new(),
        }
    }

    /// The identity context this configuration describes.
    pub fn identity(&self) -> Result<IdentityContext, ConfigurationError> {
        IdentityContext::new(self.cert_holder_id.clone())
    }

    /// Base URL of the ledger server.
    #[must_use]
    pub fn endpoint(&self) -> String {
        let scheme = if self.tls_enabled { "https" } else { "http" };
        format!("{scheme}://{}:{}", self.server_host, self.server_port)
    }

    /// Raw property lookup, including keys this client does not interpret.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

fn parse_or<T: std::str::FromStr>(
    properties: &HashMap<String, String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigurationError> {
    match properties.get(key) {
        None => Ok(default),
        Some(value) if value.is_empty() => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigurationError::InvalidValue {
                key,
                value: value.clone(),
            }),
    }
}

/// Parse Java-style properties text.
///
/// Supports `=`, `:` and whitespace separators, `#`/`!` comments, backslash
/// line continuation, and the escapes `\t`, `\n`, `\r`, `\f`, `\uXXXX` and
/// `\<char>` in keys and values. Trailing value whitespace is trimmed. Later
/// duplicates win.
#[must_use]
pub fn parse_properties(contents: &str) -> HashMap<String, String> {
    let mut properties = HashMap::new();
    let mut logical = String::new();

    for raw in contents.lines() {
        let line = raw.trim_start();

        if logical.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!')) {
            continue;
        }

        if let Some(stripped) = continued(line) {
            logical.push_str(stripped);
            continue;
        }

        logical.push_str(line);
        if let Some((key, value)) = split_entry(&logical) {
            properties.insert(key, value);
        }
        logical.clear();
    }

    if !logical.is_empty() {
        if let Some((key, value)) = split_entry(&logical) {
            properties.insert(key, value);
        }
    }

    properties
}

/// Strip a continuation backslash. An escaped backslash (`\\`) does not continue.
fn continued(line: &str) -> Option<&str> {
    let trailing = line.chars().rev().take_while(|c| *c == '\\').count();
    (trailing % 2 == 1).then(|| &line[..line.len() - 1])
}

fn split_entry(line: &str) -> Option<(String, String)> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return None;
    }
    let (key, rest) = match separator(line) {
        Some(idx) => (&line[..idx], &line[idx..]),
        None => (line, ""),
    };
    let rest = rest.trim_start();
    let value = rest
        .strip_prefix('=')
        .or_else(|| rest.strip_prefix(':'))
        .unwrap_or(rest)
        .trim_start();
    Some((unescape(key), unescape(value.trim_end())))
}

/// Byte offset of the first unescaped key terminator.
fn separator(line: &str) -> Option<usize> {
    let mut escaped = false;
    for (idx, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || c.is_whitespace() {
            return Some(idx);
        }
    }
    None
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if hex.len() == 4 => out.push(decoded),
                    // Malformed escapes are kept verbatim.
                    _ => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

// =============================================================================
// TESTS
// =============================================================================
