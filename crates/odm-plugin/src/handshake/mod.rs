//! Handshake descriptor and version greeting.
//!
//! Host and plugin must agree on a [`HandshakeConfig`] before any call is
//! dispatched. The cookie travels host to plugin through the child's
//! environment; the plugin answers with a one-line JSON [`Greeting`]
//! advertising its protocol version. A mismatch on either side aborts
//! connection establishment before any `Execute` call can complete.

use serde::{Deserialize, Serialize};

use crate::error::PluginError;

/// Protocol version both sides of this contract speak.
pub const PROTOCOL_VERSION: u32 = 1;

/// Default environment variable name carrying the magic cookie.
pub const MAGIC_COOKIE_KEY: &str = "magic";

/// Default magic cookie value.
pub const MAGIC_COOKIE_VALUE: &str = "cookie";

/// Handshake descriptor shared by host and plugin.
///
/// Fixed at build time on both sides and compared literally; constructed as
/// an immutable value at process start rather than as an implicit global.
///
/// # Example
///
/// ```
/// use odm_plugin::HandshakeConfig;
///
/// let handshake = HandshakeConfig::default();
/// assert_eq!(handshake.protocol_version(), 1);
/// assert_eq!(handshake.magic_cookie_key(), "magic");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeConfig {
    protocol_version: u32,
    magic_cookie_key: String,
    magic_cookie_value: String,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            magic_cookie_key: MAGIC_COOKIE_KEY.to_owned(),
            magic_cookie_value: MAGIC_COOKIE_VALUE.to_owned(),
        }
    }
}

impl HandshakeConfig {
    /// Creates a descriptor with an explicit version and cookie pair.
    #[must_use]
    pub fn new(
        protocol_version: u32,
        magic_cookie_key: impl Into<String>,
        magic_cookie_value: impl Into<String>,
    ) -> Self {
        Self {
            protocol_version,
            magic_cookie_key: magic_cookie_key.into(),
            magic_cookie_value: magic_cookie_value.into(),
        }
    }

    /// Overrides the cookie value, keeping version and key.
    #[must_use]
    pub fn with_cookie_value(mut self, value: impl Into<String>) -> Self {
        self.magic_cookie_value = value.into();
        self
    }

    /// Returns the protocol version.
    #[must_use]
    pub const fn protocol_version(&self) -> u32 {
        self.protocol_version
    }

    /// Returns the environment variable name carrying the cookie.
    #[must_use]
    pub const fn magic_cookie_key(&self) -> &str {
        self.magic_cookie_key.as_str()
    }

    /// Returns the expected cookie value.
    #[must_use]
    pub const fn magic_cookie_value(&self) -> &str {
        self.magic_cookie_value.as_str()
    }

    /// Compares a cookie value found in the environment against this
    /// descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::CookieMissing`] when no value was found and
    /// [`PluginError::CookieMismatch`] when the value differs.
    pub fn check_cookie(&self, found: Option<&str>) -> Result<(), PluginError> {
        match found {
            None => Err(PluginError::CookieMissing {
                key: self.magic_cookie_key.clone(),
            }),
            Some(value) if value == self.magic_cookie_value => Ok(()),
            Some(_) => Err(PluginError::CookieMismatch {
                key: self.magic_cookie_key.clone(),
            }),
        }
    }

    /// Reads the cookie variable from the process environment and compares
    /// it against this descriptor.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`HandshakeConfig::check_cookie`].
    pub fn check_cookie_env(&self) -> Result<(), PluginError> {
        let found = std::env::var(&self.magic_cookie_key).ok();
        self.check_cookie(found.as_deref())
    }
}

/// First frame a plugin writes on stdout after the cookie gate passes.
///
/// Serialised as a single JSON line. The host reads exactly one greeting
/// before issuing any request frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Greeting {
    protocol_version: u32,
}

impl Greeting {
    /// Builds the greeting a plugin sends for the given descriptor.
    #[must_use]
    pub const fn for_config(config: &HandshakeConfig) -> Self {
        Self {
            protocol_version: config.protocol_version,
        }
    }

    /// Returns the advertised protocol version.
    #[must_use]
    pub const fn protocol_version(&self) -> u32 {
        self.protocol_version
    }

    /// Validates the greeting against the host's descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::ProtocolVersion`] when the advertised version
    /// differs from the descriptor's.
    pub fn validate(&self, config: &HandshakeConfig) -> Result<(), PluginError> {
        if self.protocol_version == config.protocol_version {
            Ok(())
        } else {
            Err(PluginError::ProtocolVersion {
                expected: config.protocol_version,
                actual: self.protocol_version,
            })
        }
    }
}
