// ABOUTME: Configuration loading and validation for the linkstash server.
// ABOUTME: Reads environment variables once at startup; no ambient lookups later.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("LINKSTASH_BIND is not a valid socket address: {0}")]
    InvalidBind(String),

    #[error("LINKSTASH_JWT_SECRET is not set; refusing to start without a signing secret")]
    MissingJwtSecret,

    #[error("LINKSTASH_TOKEN_TTL_SECS is not a valid number of seconds: {0}")]
    InvalidTokenTtl(String),
}

/// Server configuration loaded from environment variables. Constructed
/// once at startup and passed by reference into the token service and
/// sharing workflow.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub home: PathBuf,
    pub bind: SocketAddr,
    pub jwt_secret: String,
    pub public_base_url: String,
    /// Token lifetime in seconds. `None` means tokens never expire.
    pub token_ttl_secs: Option<i64>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - LINKSTASH_HOME: data directory (default: ~/.linkstash)
    /// - LINKSTASH_BIND: socket address to bind (default: 127.0.0.1:3000)
    /// - LINKSTASH_JWT_SECRET: token signing secret (required)
    /// - LINKSTASH_PUBLIC_BASE_URL: base for shareable links (default: http://<bind>)
    /// - LINKSTASH_TOKEN_TTL_SECS: token lifetime in seconds (optional)
    pub fn from_env() -> Result<Self, ConfigError> {
        let home = std::env::var("LINKSTASH_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                std::env::var("HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("/tmp"))
                    .join(".linkstash")
            });

        let bind_str =
            std::env::var("LINKSTASH_BIND").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
        let bind: SocketAddr = bind_str
            .parse()
            .map_err(|_| ConfigError::InvalidBind(bind_str))?;

        let jwt_secret = std::env::var("LINKSTASH_JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingJwtSecret)?;

        let public_base_url = std::env::var("LINKSTASH_PUBLIC_BASE_URL")
            .ok()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| format!("http://{}", bind));

        let token_ttl_secs = match std::env::var("LINKSTASH_TOKEN_TTL_SECS") {
            Ok(raw) if !raw.is_empty() => Some(
                raw.parse::<i64>()
                    .map_err(|_| ConfigError::InvalidTokenTtl(raw))?,
            ),
            _ => None,
        };

        Ok(Self {
            home,
            bind,
            jwt_secret,
            public_base_url,
            token_ttl_secs,
        })
    }

    /// Compose the externally visible link for a shareable id.
    pub fn shareable_link(&self, shareable_id: &str) -> String {
        format!(
            "{}/share/{}",
            self.public_base_url.trim_end_matches('/'),
            shareable_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Serializes tests that mutate process-wide environment variables.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() {
        // SAFETY: test-only code, single-threaded test execution
        unsafe {
            std::env::remove_var("LINKSTASH_HOME");
            std::env::remove_var("LINKSTASH_BIND");
            std::env::remove_var("LINKSTASH_JWT_SECRET");
            std::env::remove_var("LINKSTASH_PUBLIC_BASE_URL");
            std::env::remove_var("LINKSTASH_TOKEN_TTL_SECS");
        }
    }

    #[test]
    fn config_requires_jwt_secret() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();

        let result = ServerConfig::from_env();

        assert!(result.is_err(), "should refuse to start without a secret");
        let err = result.unwrap_err();
        assert!(
            err.to_string().contains("LINKSTASH_JWT_SECRET"),
            "error should mention the secret: {}",
            err
        );
    }

    #[test]
    fn config_loads_defaults_with_secret() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        // SAFETY: test-only code, single-threaded test execution
        unsafe {
            std::env::set_var("LINKSTASH_JWT_SECRET", "test-secret");
        }

        let config = ServerConfig::from_env().unwrap();

        // SAFETY: test-only code, single-threaded test execution
        unsafe {
            std::env::remove_var("LINKSTASH_JWT_SECRET");
        }

        assert_eq!(config.bind, "127.0.0.1:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.jwt_secret, "test-secret");
        assert_eq!(config.public_base_url, "http://127.0.0.1:3000");
        assert!(config.token_ttl_secs.is_none());
        assert!(config.home.to_string_lossy().contains(".linkstash"));
    }

    #[test]
    fn shareable_link_trims_trailing_slash() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        // SAFETY: test-only code, single-threaded test execution
        unsafe {
            std::env::set_var("LINKSTASH_JWT_SECRET", "test-secret");
            std::env::set_var("LINKSTASH_PUBLIC_BASE_URL", "https://stash.example.com/");
        }

        let config = ServerConfig::from_env().unwrap();

        // SAFETY: test-only code, single-threaded test execution
        unsafe {
            std::env::remove_var("LINKSTASH_JWT_SECRET");
            std::env::remove_var("LINKSTASH_PUBLIC_BASE_URL");
        }

        assert_eq!(
            config.shareable_link("abc-123"),
            "https://stash.example.com/share/abc-123"
        );
    }
}
