// ABOUTME: Tag resolution: one explicit or derived suffix applied across all images.
// ABOUTME: Derived suffixes are a UTC minute timestamp plus the short source revision.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use snafu::{ResultExt, ensure};

use crate::config::ConfigError;
use crate::types::ImageName;
use crate::vcs::RevisionSource;

use super::error::{EmptyRevisionSnafu, QualifiedTagSnafu, ResolveError, RevisionSnafu};

/// Timestamp layout of derived suffixes.
pub const SUFFIX_TIME_FORMAT: &str = "%Y%m%d-%H%M";

/// Full image tag per image, e.g. `api` → `api:20250101-1200-abc1234`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet(BTreeMap<ImageName, String>);

impl TagSet {
    pub fn get(&self, image: &str) -> Option<&str> {
        self.0.get(image).map(String::as_str)
    }

    /// Tags in sorted image order.
    pub fn iter(&self) -> impl Iterator<Item = (&ImageName, &str)> {
        self.0.iter().map(|(image, tag)| (image, tag.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn insert(&mut self, image: ImageName, tag: impl Into<String>) {
        self.0.insert(image, tag.into());
    }
}

impl FromIterator<(ImageName, String)> for TagSet {
    fn from_iter<T: IntoIterator<Item = (ImageName, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Resolve the tag of every image at the current time.
pub async fn resolve(
    images: &[ImageName],
    explicit: Option<&str>,
    revision: &dyn RevisionSource,
) -> Result<TagSet, ResolveError> {
    resolve_at(images, explicit, revision, Utc::now()).await
}

/// Resolve the tag of every image, deriving suffixes from `now`.
///
/// - no explicit tag: one suffix is derived and applied to every image;
/// - a tag containing `:` is used verbatim, which requires a single image;
/// - any other tag is used as the suffix of every image.
pub async fn resolve_at(
    images: &[ImageName],
    explicit: Option<&str>,
    revision: &dyn RevisionSource,
    now: DateTime<Utc>,
) -> Result<TagSet, ResolveError> {
    if images.is_empty() {
        return Err(ResolveError::Config {
            source: ConfigError::NoImages,
        });
    }

    match explicit.map(str::trim).filter(|tag| !tag.is_empty()) {
        None => {
            let suffix = derive_suffix(revision, now).await?;
            tracing::debug!("derived tag suffix {}", suffix);
            Ok(apply_suffix(images, &suffix))
        }
        Some(tag) if tag.contains(':') => {
            ensure!(images.len() == 1, QualifiedTagSnafu { tag });
            Ok(images
                .iter()
                .map(|image| (image.clone(), tag.to_string()))
                .collect())
        }
        Some(suffix) => Ok(apply_suffix(images, suffix)),
    }
}

/// `<image>:<suffix>` for every image.
pub fn apply_suffix(images: &[ImageName], suffix: &str) -> TagSet {
    images
        .iter()
        .map(|image| (image.clone(), format!("{}:{}", image, suffix)))
        .collect()
}

/// Text after the last `:`, or the whole tag when it has none.
pub fn extract_suffix(tag: &str) -> &str {
    match tag.rsplit_once(':') {
        Some((_, suffix)) => suffix,
        None => tag,
    }
}

/// `<yyyymmdd-hhmm>-<revision>` with the timestamp in UTC.
pub async fn derive_suffix(
    revision: &dyn RevisionSource,
    now: DateTime<Utc>,
) -> Result<String, ResolveError> {
    let rev = revision.short_revision().await.context(RevisionSnafu)?;
    let rev = rev.trim();
    ensure!(!rev.is_empty(), EmptyRevisionSnafu);
    Ok(format!("{}-{}", now.format(SUFFIX_TIME_FORMAT), rev))
}
