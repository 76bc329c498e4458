// ABOUTME: SSH session to the deploy host using russh.
// ABOUTME: Host key checking against known_hosts, identity selection and channel setup.

use super::error::{Error, Result};
use russh::client::{self, Handle, Msg};
use russh::keys::agent::client::AgentClient;
use russh::keys::known_hosts::{
    check_known_hosts, check_known_hosts_path, learn_known_hosts, learn_known_hosts_path,
};
use russh::keys::{PrivateKeyWithHashAlg, load_secret_key, ssh_key};
use russh::{Channel, Disconnect};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::UnixStream;

/// Keys tried from `~/.ssh` when neither an identity file nor an agent is available.
const DEFAULT_KEYS: [&str; 3] = ["id_ed25519", "id_ecdsa", "id_rsa"];

/// How to reach and authenticate against the deploy host.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    /// Identity file. Without one the agent is used, then the default keys.
    pub key_path: Option<PathBuf>,
    /// Accept and remember a host key that is not in known_hosts yet.
    pub trust_on_first_use: bool,
    /// Defaults to `~/.ssh/known_hosts`.
    pub known_hosts_path: Option<PathBuf>,
}

impl SessionConfig {
    pub fn new(host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            user: user.into(),
            key_path: None,
            trust_on_first_use: false,
            known_hosts_path: None,
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.key_path = Some(path.into());
        self
    }

    pub fn trust_on_first_use(mut self, trust: bool) -> Self {
        self.trust_on_first_use = trust;
        self
    }

    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }
}

/// russh handler that verifies the server key.
pub(crate) struct HostKeys {
    host: String,
    port: u16,
    trust_on_first_use: bool,
    known_hosts: Option<PathBuf>,
}

impl HostKeys {
    fn new(config: &SessionConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            trust_on_first_use: config.trust_on_first_use,
            known_hosts: config.known_hosts_path.clone(),
        }
    }

    fn check(&self, key: &ssh_key::PublicKey) -> std::result::Result<bool, russh::keys::Error> {
        match &self.known_hosts {
            Some(path) => check_known_hosts_path(&self.host, self.port, key, path),
            None => check_known_hosts(&self.host, self.port, key),
        }
    }

    fn learn(&self, key: &ssh_key::PublicKey) {
        let learned = match &self.known_hosts {
            Some(path) => learn_known_hosts_path(&self.host, self.port, key, path),
            None => learn_known_hosts(&self.host, self.port, key),
        };
        if let Err(e) = learned {
            tracing::warn!("could not record host key for {}: {}", self.host, e);
        }
    }
}

impl client::Handler for HostKeys {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &ssh_key::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        match self.check(server_public_key) {
            Ok(true) => Ok(true),
            Err(russh::keys::Error::KeyChanged { line }) => {
                tracing::error!(
                    "host key for {} does not match known_hosts line {}",
                    self.host,
                    line
                );
                Ok(false)
            }
            Ok(false) | Err(_) if self.trust_on_first_use => {
                tracing::warn!(
                    "trusting unknown host key for {}:{} on first use",
                    self.host,
                    self.port
                );
                self.learn(server_public_key);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// The credential offered to the server.
enum Identity {
    Agent(AgentClient<UnixStream>),
    Key(Arc<ssh_key::PrivateKey>),
}

impl Identity {
    /// Identity file first, then the agent, then the default keys.
    async fn resolve(config: &SessionConfig) -> Result<Self> {
        if let Some(path) = &config.key_path {
            let key = load_secret_key(path, None).map_err(|source| Error::KeyLoad {
                path: path.clone(),
                source,
            })?;
            return Ok(Identity::Key(Arc::new(key)));
        }

        match AgentClient::connect_env().await {
            Ok(agent) => return Ok(Identity::Agent(agent)),
            Err(e) => tracing::debug!("no SSH agent: {}", e),
        }

        let home = std::env::var("HOME")
            .map_err(|_| Error::NoIdentity("no SSH agent and HOME is not set".to_string()))?;
        default_key_paths(Path::new(&home))
            .iter()
            .find_map(|path| load_secret_key(path, None).ok())
            .map(|key| Identity::Key(Arc::new(key)))
            .ok_or_else(|| Error::NoIdentity("no SSH agent and no key in ~/.ssh".to_string()))
    }

    /// Offer the identity for `user`. `false` when the server refused it.
    async fn authenticate(self, handle: &mut Handle<HostKeys>, user: &str) -> Result<bool> {
        match self {
            Identity::Agent(mut agent) => {
                let keys = agent
                    .request_identities()
                    .await
                    .map_err(|e| Error::NoIdentity(format!("failed to list agent keys: {}", e)))?;
                if keys.is_empty() {
                    return Err(Error::NoIdentity("SSH agent holds no keys".to_string()));
                }

                for key in keys {
                    let result = handle
                        .authenticate_publickey_with(user, key, None, &mut agent)
                        .await;
                    if matches!(result, Ok(ref auth) if auth.success()) {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Identity::Key(key) => {
                let hash_alg = handle.best_supported_rsa_hash().await?.flatten();
                let result = handle
                    .authenticate_publickey(user, PrivateKeyWithHashAlg::new(key, hash_alg))
                    .await?;
                Ok(result.success())
            }
        }
    }
}

fn default_key_paths(home: &Path) -> Vec<PathBuf> {
    DEFAULT_KEYS
        .iter()
        .map(|name| home.join(".ssh").join(name))
        .collect()
}

/// An authenticated connection to the deploy host.
pub struct Session {
    config: SessionConfig,
    handle: Handle<HostKeys>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("user", &self.config.user)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub async fn connect(config: SessionConfig) -> Result<Self> {
        let identity = Identity::resolve(&config).await?;

        let mut handle = client::connect(
            Arc::new(client::Config::default()),
            (config.host.as_str(), config.port),
            HostKeys::new(&config),
        )
        .await
        .map_err(|e| Error::Unreachable {
            host: config.host.clone(),
            port: config.port,
            reason: e.to_string(),
        })?;

        if !identity.authenticate(&mut handle, &config.user).await? {
            return Err(Error::Rejected {
                user: config.user.clone(),
                host: config.host.clone(),
            });
        }

        tracing::debug!("connected to {}@{}:{}", config.user, config.host, config.port);
        Ok(Self { config, handle })
    }

    pub fn host(&self) -> &str {
        &self.config.host
    }

    /// Open a channel and request `command` on it.
    ///
    /// Once this returns the remote process exists and reads whatever is
    /// sent on the channel.
    pub(crate) async fn open_exec(&self, command: &str) -> Result<Channel<Msg>> {
        let channel = self.handle.channel_open_session().await.map_err(Error::Exec)?;
        channel.exec(true, command).await.map_err(Error::Exec)?;

        tracing::debug!("remote exec on {}: {}", self.config.host, command);
        Ok(channel)
    }

    pub async fn disconnect(self) -> Result<()> {
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await?;
        Ok(())
    }
}
