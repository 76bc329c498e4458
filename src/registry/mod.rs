// ABOUTME: Registry capability: query the tags stored for a repository.
// ABOUTME: HttpRegistry speaks the registry v2 API over reqwest with a request timeout.

use crate::config::RegistryTarget;
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry_url is required to list remote tags")]
    MissingUrl,

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("registry returned {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("invalid tag list from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Body of `GET /v2/<repository>/tags/list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TagList {
    #[serde(default)]
    pub name: String,
    /// Registries return `null` for a repository without tags.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Lists tags in an image registry.
#[async_trait]
pub trait RegistryApi: Send + Sync {
    async fn list_tags(&self, repository: &str) -> Result<TagList, RegistryError>;
}

/// `RegistryApi` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRegistry {
    client: reqwest::Client,
    base: String,
}

impl HttpRegistry {
    /// Client for the target's registry, bounded by its timeout.
    pub fn for_target(target: &RegistryTarget) -> Result<Self, RegistryError> {
        let base = target.api_base().ok_or(RegistryError::MissingUrl)?;
        let client = reqwest::Client::builder()
            .timeout(target.timeout)
            .build()
            .map_err(RegistryError::Client)?;
        Ok(Self { client, base })
    }

    /// Use a preconfigured client against `base` (scheme included).
    pub fn from_client(client: reqwest::Client, base: impl Into<String>) -> Self {
        Self {
            client,
            base: base.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl RegistryApi for HttpRegistry {
    async fn list_tags(&self, repository: &str) -> Result<TagList, RegistryError> {
        let url = format!("{}/v2/{}/tags/list", self.base, repository);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| RegistryError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response
            .json::<TagList>()
            .await
            .map_err(|source| RegistryError::Decode { url, source })
    }
}
