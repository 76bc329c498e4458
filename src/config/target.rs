// ABOUTME: Deploy target: a host reached over SSH, or an image registry.
// ABOUTME: Parses "user@host:port" shorthands and builds SSH session settings.

use super::error::ConfigError;
use crate::ssh::SessionConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Where published images go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployTarget {
    Ssh(SshTarget),
    Registry(RegistryTarget),
}

impl DeployTarget {
    pub fn kind(&self) -> &'static str {
        match self {
            DeployTarget::Ssh(_) => "ssh",
            DeployTarget::Registry(_) => "registry",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshTarget {
    pub host: String,
    pub user: Option<String>,
    pub port: u16,
    pub identity_file: Option<PathBuf>,
    pub trust_first_connection: bool,
}

impl SshTarget {
    /// Parse `[user@]host[:port]`.
    pub fn parse(s: &str, default_port: u16) -> Result<Self, ConfigError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ConfigError::InvalidAddress(
                "server address cannot be empty".to_string(),
            ));
        }

        let (user, rest) = match s.split_once('@') {
            Some((user, rest)) => (Some(user), rest),
            None => (None, s),
        };

        let (host, port) = match rest.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| ConfigError::InvalidAddress(format!("invalid port: {}", port)))?;
                (host, port)
            }
            None => (rest, default_port),
        };

        if host.is_empty() {
            return Err(ConfigError::InvalidAddress(
                "hostname cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            host: host.to_string(),
            user: user.filter(|u| !u.is_empty()).map(str::to_string),
            port,
            identity_file: None,
            trust_first_connection: true,
        })
    }

    /// SSH session settings for this target.
    ///
    /// Without a configured user, `$USER` is used, then `root`.
    pub fn session_config(&self) -> SessionConfig {
        let user = self
            .user
            .clone()
            .unwrap_or_else(|| std::env::var("USER").unwrap_or_else(|_| "root".to_string()));

        let mut config = SessionConfig::new(&self.host, user)
            .port(self.port)
            .trust_on_first_use(self.trust_first_connection);
        if let Some(ref identity) = self.identity_file {
            config = config.key_path(identity.clone());
        }
        config
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryTarget {
    pub registry_url: Option<String>,
    pub repository: String,
    pub timeout: Duration,
}

impl RegistryTarget {
    /// Registry host as used in image references: no scheme, no trailing slash.
    pub fn host(&self) -> Option<&str> {
        self.registry_url.as_deref().map(|url| {
            url.strip_prefix("https://")
                .or_else(|| url.strip_prefix("http://"))
                .unwrap_or(url)
                .trim_end_matches('/')
        })
    }

    /// Base URL for the registry HTTP API, defaulting to https.
    pub fn api_base(&self) -> Option<String> {
        let url = self.registry_url.as_deref()?.trim_end_matches('/');
        if url.starts_with("http://") || url.starts_with("https://") {
            Some(url.to_string())
        } else {
            Some(format!("https://{}", url))
        }
    }
}

/// Expand a leading `~/` against `home`.
pub fn expand_user_path(path: &str, home: Option<&str>) -> PathBuf {
    match (path.strip_prefix("~/"), home) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(path),
    }
}
