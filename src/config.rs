//! Static configuration, loaded once at startup and shared read-only.
//!
//! ```toml
//! debug = true
//! debug_mode_logging = true
//!
//! [auth]
//! secret_key = "hubspot-issued-secret-key-here"
//!
//! [mock]
//! slug = "yourappslug"
//! safety_env = "ALLOW_MARKETPLACE_MOCK"
//!
//! [mock.app]
//! name = "YourAppName"
//! callback_url = "http://localhost:8000"
//!
//! [mock.user]
//! id = 9999999
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Error;
use crate::secret::SecretKey;

/// Top-level configuration for the marketplace layer.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MarketplaceConfig {
    /// Enables debug-only helpers such as error-page reformatting
    pub debug: bool,
    /// In debug mode, log 5xx responses at error level; set `false` to silence
    pub debug_mode_logging: bool,
    /// Signature verification settings
    pub auth: AuthConfig,
    /// Local canvas simulation; absent in production
    pub mock: Option<MockSimulationConfig>,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            debug: false,
            debug_mode_logging: true,
            auth: AuthConfig::default(),
            mock: None,
        }
    }
}

impl MarketplaceConfig {
    /// Creates a configuration with authentication keyed by `secret`.
    pub fn with_secret(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            auth: AuthConfig {
                secret_key: Some(SecretKey::new(secret)),
                ..AuthConfig::default()
            },
            ..Self::default()
        }
    }

    /// Enables the canvas mock.
    pub fn mock(mut self, mock: MockSimulationConfig) -> Self {
        self.mock = Some(mock);
        self
    }

    /// Enables debug helpers.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Parses TOML configuration text.
    ///
    /// # Examples
    ///
    /// ```
    /// use marketplace_canvas::MarketplaceConfig;
    ///
    /// let config = MarketplaceConfig::from_toml_str(r#"
    ///     [auth]
    ///     secret_key = "shh"
    /// "#).unwrap();
    /// assert!(config.auth.activate);
    /// assert!(config.mock.is_none());
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// The configured secret, ignoring an empty string.
    pub fn secret_key(&self) -> Option<&SecretKey> {
        self.auth.secret_key.as_ref().filter(|key| !key.is_empty())
    }
}

/// Signature verification settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Key issued by the marketplace for this app
    pub secret_key: Option<SecretKey>,
    /// Set to `false` to switch authentication off deliberately
    pub activate: bool,
    /// Answer 401 at the gate instead of deferring to guarded handlers
    pub enforce: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            activate: true,
            enforce: false,
        }
    }
}

/// Describes the fake marketplace host used during local development.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MockSimulationConfig {
    /// Canvas slug registered for the app
    pub slug: String,
    /// Value of the `caller` parameter
    pub caller: String,
    /// Fake app details
    pub app: MockApp,
    /// Fake user details
    pub user: MockUser,
    /// Environment variable that must be set for the mock to activate
    pub safety_env: Option<String>,
    /// Replacement for the embedded canvas wrapper template
    pub template_path: Option<PathBuf>,
    /// Also re-wrap `<a href="/...">` links in mocked responses
    pub rewrite_anchors: bool,
}

impl MockSimulationConfig {
    /// Creates a mock description for `slug` with default app and user.
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            ..Self::default()
        }
    }

    /// Whether the safety environment variable, if any, allows activation.
    pub fn safety_gate_open(&self) -> bool {
        match &self.safety_env {
            Some(var) => std::env::var(var).map(|v| !v.is_empty()).unwrap_or(false),
            None => true,
        }
    }
}

impl Default for MockSimulationConfig {
    fn default() -> Self {
        Self {
            slug: String::new(),
            caller: "Hubspot Marketplace".to_string(),
            app: MockApp::default(),
            user: MockUser::default(),
            safety_env: None,
            template_path: None,
            rewrite_anchors: false,
        }
    }
}

/// Fake app details for the mock.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MockApp {
    /// App display name
    pub name: String,
    /// Where the app is served locally
    pub callback_url: String,
    /// Static page URL, sent ahead of the request path (which wins on lookup)
    pub page_url: Option<String>,
}

impl Default for MockApp {
    fn default() -> Self {
        Self {
            name: "MyAppName".to_string(),
            callback_url: "http://localhost:8000".to_string(),
            page_url: None,
        }
    }
}

/// Fake user details for the mock.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MockUser {
    /// HubSpot user id
    pub id: i64,
    /// Email address
    pub email: Option<String>,
    /// Given name
    pub first_name: Option<String>,
    /// Family name
    pub last_name: Option<String>,
}

impl Default for MockUser {
    fn default() -> Self {
        Self {
            id: 9_999_999,
            email: None,
            first_name: None,
            last_name: None,
        }
    }
}
