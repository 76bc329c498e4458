// ABOUTME: Validated local image name used as the repository part of a tag.
// ABOUTME: Lowercase alphanumerics plus '-', '_' and '.', never containing ':'.

use std::borrow::Borrow;
use std::fmt;
use thiserror::Error;

const MAX_LEN: usize = 128;

#[derive(Debug, Error)]
pub enum ImageNameError {
    #[error("image name cannot be empty")]
    Empty,

    #[error("image name exceeds maximum length of {MAX_LEN} characters")]
    TooLong,

    #[error("image name must start with a lowercase letter or digit")]
    InvalidStart,

    #[error("image name must be lowercase")]
    NotLowercase,

    #[error("invalid character in image name: '{0}'")]
    InvalidChar(char),
}

/// Name of a configured image, e.g. `api` in `api:20250101-1200-abcd1`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageName(String);

impl ImageName {
    pub fn new(value: &str) -> Result<Self, ImageNameError> {
        if value.is_empty() {
            return Err(ImageNameError::Empty);
        }

        if value.len() > MAX_LEN {
            return Err(ImageNameError::TooLong);
        }

        for c in value.chars() {
            if c.is_ascii_uppercase() {
                return Err(ImageNameError::NotLowercase);
            }
            if !c.is_ascii_lowercase() && !c.is_ascii_digit() && !matches!(c, '-' | '_' | '.') {
                return Err(ImageNameError::InvalidChar(c));
            }
        }

        if !value.starts_with(|c: char| c.is_ascii_alphanumeric()) {
            return Err(ImageNameError::InvalidStart);
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ImageName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
