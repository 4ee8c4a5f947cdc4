//! Configuration management
//!
//! 設定は以下の優先順位で読み込まれます:
//! 1. 環境変数
//! 2. instadm.toml 設定ファイル
//! 3. デフォルト値
//!
//! 設定ファイル内では `${VAR_NAME}` 形式で環境変数を展開できます。

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::error::Error;
use crate::session::SessionCredential;

/// Default config file looked up by [`Config::load`]
pub const DEFAULT_CONFIG_FILE: &str = "instadm.toml";

/// How the pacing delay after a successful send is applied
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DelayMode {
    /// Only report the delay; the caller paces itself
    #[default]
    Advisory,
    /// Sleep inside the handler before responding
    Blocking,
}

impl FromStr for DelayMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "advisory" => Ok(Self::Advisory),
            "blocking" | "sync" => Ok(Self::Blocking),
            other => Err(Error::Config(format!("Unknown delay mode: {}", other))),
        }
    }
}

/// Session / authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session credential (`SESSION_ID`). Required at first acquisition.
    #[serde(skip_serializing)]
    pub session_id: Option<SessionCredential>,

    /// Path of the persisted session state file
    #[serde(default = "default_state_path")]
    pub state_path: String,

    /// Optional outbound proxy URL
    pub proxy: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: None,
            state_path: default_state_path(),
            proxy: None,
        }
    }
}

/// HTTP API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Bind host
    #[serde(default = "default_api_host")]
    pub host: String,

    /// Port for HTTP API server
    #[serde(default = "default_api_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
        }
    }
}

/// Pacing delay applied after each sent message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelayConfig {
    /// Lower bound in seconds (inclusive)
    #[serde(default = "default_delay_min")]
    pub min: u64,

    /// Upper bound in seconds (inclusive)
    #[serde(default = "default_delay_max")]
    pub max: u64,

    /// Largest upper bound a caller may request
    #[serde(default = "default_delay_limit")]
    pub limit: u64,

    #[serde(default)]
    pub mode: DelayMode,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            min: default_delay_min(),
            max: default_delay_max(),
            limit: default_delay_limit(),
            mode: DelayMode::default(),
        }
    }
}

/// Instagram client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstagramConfig {
    /// API base URL
    #[serde(default = "default_instagram_base_url")]
    pub base_url: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for InstagramConfig {
    fn default() -> Self {
        Self {
            base_url: default_instagram_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Main configuration for instadm-gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub delay: DelayConfig,

    #[serde(default)]
    pub instagram: InstagramConfig,
}

fn default_state_path() -> String {
    "session.json".to_string()
}

fn default_api_host() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    5001
}

fn default_delay_min() -> u64 {
    5
}

fn default_delay_max() -> u64 {
    15
}

fn default_delay_limit() -> u64 {
    300
}

fn default_instagram_base_url() -> String {
    "https://i.instagram.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

// ============================================================================
// TOML structure
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct TomlConfig {
    session: Option<TomlSession>,
    api: Option<TomlApi>,
    delay: Option<TomlDelay>,
    instagram: Option<TomlInstagram>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlSession {
    session_id: Option<String>,
    state_path: Option<String>,
    proxy: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlApi {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlDelay {
    min: Option<u64>,
    max: Option<u64>,
    limit: Option<u64>,
    mode: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlInstagram {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl Config {
    /// 設定ファイルから環境変数を展開する
    ///
    /// `${VAR_NAME}` 形式の文字列を環境変数の値に置換します。
    /// 環境変数が存在しない場合は空文字列になります。
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next(); // '{' を消費

                let mut var_name = String::new();
                while let Some(c) = chars.next() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// 環境変数のみから設定を読み込む
    pub fn from_env() -> crate::Result<Self> {
        let mut cfg = Self::default();
        cfg.apply_env_overrides()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// TOML 設定ファイルから設定を読み込む
    ///
    /// 設定ファイル内の `${VAR_NAME}` は環境変数の値に置換され、
    /// その後環境変数による上書きが適用されます。
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();

        let toml_content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let mut cfg = Self::from_toml_str(&Self::expand_env_vars(&toml_content))?;
        cfg.apply_env_overrides()?;
        cfg.validate()?;

        Ok(cfg)
    }

    /// デフォルトパスから設定を読み込む
    ///
    /// `./instadm.toml` があればそれを使い、なければ環境変数のみ。
    pub fn load() -> crate::Result<Self> {
        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::from_toml_file(DEFAULT_CONFIG_FILE);
        }

        Self::from_env()
    }

    /// Parse TOML content without environment overrides
    fn from_toml_str(content: &str) -> crate::Result<Self> {
        let toml: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        let session = toml.session.unwrap_or_default();
        let api = toml.api.unwrap_or_default();
        let delay = toml.delay.unwrap_or_default();
        let instagram = toml.instagram.unwrap_or_default();

        let mode = match delay.mode {
            Some(mode) => mode.parse()?,
            None => DelayMode::default(),
        };

        Ok(Config {
            session: SessionConfig {
                session_id: session
                    .session_id
                    .filter(|s| !s.is_empty())
                    .map(SessionCredential::new),
                state_path: session.state_path.unwrap_or_else(default_state_path),
                proxy: session.proxy.filter(|p| !p.is_empty()),
            },
            api: ApiConfig {
                host: api.host.unwrap_or_else(default_api_host),
                port: api.port.unwrap_or_else(default_api_port),
            },
            delay: DelayConfig {
                min: delay.min.unwrap_or_else(default_delay_min),
                max: delay.max.unwrap_or_else(default_delay_max),
                limit: delay.limit.unwrap_or_else(default_delay_limit),
                mode,
            },
            instagram: InstagramConfig {
                base_url: instagram.base_url.unwrap_or_else(default_instagram_base_url),
                timeout_secs: instagram.timeout_secs.unwrap_or_else(default_timeout_secs),
            },
        })
    }

    /// 環境変数で設定を上書きする
    fn apply_env_overrides(&mut self) -> crate::Result<()> {
        if let Ok(session_id) = std::env::var("SESSION_ID") {
            if !session_id.is_empty() {
                self.session.session_id = Some(SessionCredential::new(session_id));
            }
        }
        if let Ok(proxy) = std::env::var("PROXY") {
            if !proxy.is_empty() {
                self.session.proxy = Some(proxy);
            }
        }
        if let Ok(path) = std::env::var("SESSION_FILE") {
            if !path.is_empty() {
                self.session.state_path = path;
            }
        }

        if let Ok(host) = std::env::var("API_HOST") {
            if !host.is_empty() {
                self.api.host = host;
            }
        }
        if let Ok(port) = std::env::var("API_PORT") {
            self.api.port = port
                .parse()
                .map_err(|_| Error::Config(format!("Invalid API_PORT: {}", port)))?;
        }

        if let Ok(min) = std::env::var("DM_DELAY_MIN") {
            self.delay.min = min
                .parse()
                .map_err(|_| Error::Config(format!("Invalid DM_DELAY_MIN: {}", min)))?;
        }
        if let Ok(max) = std::env::var("DM_DELAY_MAX") {
            self.delay.max = max
                .parse()
                .map_err(|_| Error::Config(format!("Invalid DM_DELAY_MAX: {}", max)))?;
        }
        if let Ok(limit) = std::env::var("DM_DELAY_LIMIT") {
            self.delay.limit = limit
                .parse()
                .map_err(|_| Error::Config(format!("Invalid DM_DELAY_LIMIT: {}", limit)))?;
        }
        if let Ok(mode) = std::env::var("DM_DELAY_MODE") {
            if !mode.is_empty() {
                self.delay.mode = mode.parse()?;
            }
        }

        if let Ok(base_url) = std::env::var("INSTAGRAM_BASE_URL") {
            if !base_url.is_empty() {
                self.instagram.base_url = base_url;
            }
        }

        Ok(())
    }

    /// Reject settings that can never work
    pub fn validate(&self) -> crate::Result<()> {
        if self.delay.min > self.delay.max {
            return Err(Error::Config(format!(
                "Delay range is empty: min {} > max {}",
                self.delay.min, self.delay.max
            )));
        }
        if self.delay.max > self.delay.limit {
            return Err(Error::Config(format!(
                "Delay max {} exceeds the delay limit {}",
                self.delay.max, self.delay.limit
            )));
        }
        Ok(())
    }
}
