// ABOUTME: FakeRegistry answers tag list queries from memory.
// ABOUTME: Records the repositories asked for.

use async_trait::async_trait;
use parking_lot::Mutex;
use skiff::registry::{RegistryApi, RegistryError, TagList};

pub struct FakeRegistry {
    tags: Option<Vec<String>>,
    queried: Mutex<Vec<String>>,
}

impl FakeRegistry {
    pub fn with_tags(tags: &[&str]) -> Self {
        Self {
            tags: Some(tags.iter().map(|t| t.to_string()).collect()),
            queried: Mutex::new(Vec::new()),
        }
    }

    /// Every query fails with a 404.
    pub fn missing() -> Self {
        Self {
            tags: None,
            queried: Mutex::new(Vec::new()),
        }
    }

    pub fn queried(&self) -> Vec<String> {
        self.queried.lock().clone()
    }
}

#[async_trait]
impl RegistryApi for FakeRegistry {
    async fn list_tags(&self, repository: &str) -> Result<TagList, RegistryError> {
        self.queried.lock().push(repository.to_string());
        match &self.tags {
            Some(tags) => Ok(TagList {
                name: repository.to_string(),
                tags: tags.clone(),
            }),
            None => Err(RegistryError::Status {
                url: format!("http://registry.test/v2/{}/tags/list", repository),
                status: 404,
            }),
        }
    }
}
