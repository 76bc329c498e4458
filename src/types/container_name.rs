// ABOUTME: Validated container name as accepted by `docker run --name`.
// ABOUTME: Must match [a-zA-Z0-9][a-zA-Z0-9_.-]*.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContainerNameError {
    #[error("container name cannot be empty")]
    Empty,

    #[error("container name must start with a letter or digit")]
    InvalidStart,

    #[error("invalid character in container name: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerName(String);

impl ContainerName {
    pub fn new(value: &str) -> Result<Self, ContainerNameError> {
        let mut chars = value.chars();
        match chars.next() {
            None => return Err(ContainerNameError::Empty),
            Some(c) if !c.is_ascii_alphanumeric() => return Err(ContainerNameError::InvalidStart),
            Some(_) => {}
        }

        if let Some(c) = chars.find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '_' | '.' | '-')) {
            return Err(ContainerNameError::InvalidChar(c));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_mixed_case_and_punctuation() {
        assert!(ContainerName::new("Shop_api.1-blue").is_ok());
    }

    #[test]
    fn rejects_shell_metacharacters() {
        assert!(matches!(
            ContainerName::new("api;rm"),
            Err(ContainerNameError::InvalidChar(';'))
        ));
        assert!(matches!(ContainerName::new(""), Err(ContainerNameError::Empty)));
        assert!(matches!(ContainerName::new("_api"), Err(ContainerNameError::InvalidStart)));
    }
}
