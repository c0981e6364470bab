//! Identity wrappers for the target repository, credential, and endpoint.

use url::Url;

use super::error::ExtractError;

/// Repository owner wrapper to avoid stringly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOwner(String);

impl RepositoryOwner {
    pub(crate) fn new(value: &str) -> Result<Self, ExtractError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ExtractError::Configuration {
                message: "repository owner must not be empty".to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the owner value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Repository name wrapper to prevent parameter mix-ups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryName(String);

impl RepositoryName {
    pub(crate) fn new(value: &str) -> Result<Self, ExtractError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ExtractError::Configuration {
                message: "repository name must not be empty".to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the repository name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// The owner/name pair identifying the repository to extract from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryId {
    owner: RepositoryOwner,
    name: RepositoryName,
}

impl RepositoryId {
    /// Validates and wraps an owner/name pair.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Configuration`] when either part is blank.
    pub fn new(owner: &str, name: &str) -> Result<Self, ExtractError> {
        Ok(Self {
            owner: RepositoryOwner::new(owner)?,
            name: RepositoryName::new(name)?,
        })
    }

    /// Borrow the owner.
    #[must_use]
    pub const fn owner(&self) -> &RepositoryOwner {
        &self.owner
    }

    /// Borrow the repository name.
    #[must_use]
    pub const fn name(&self) -> &RepositoryName {
        &self.name
    }

    /// Returns the `owner/name` form used in search expressions.
    #[must_use]
    pub fn qualified(&self) -> String {
        format!("{}/{}", self.owner.as_str(), self.name.as_str())
    }
}

/// Personal access token wrapper enforcing presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::MissingToken`] when the supplied string is
    /// blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, ExtractError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ExtractError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

/// Validated GraphQL API endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoint(Url);

impl ApiEndpoint {
    /// Parses and validates an endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidUrl`] when the value cannot be parsed
    /// or lacks a host.
    pub fn parse(value: &str) -> Result<Self, ExtractError> {
        let parsed =
            Url::parse(value).map_err(|error| ExtractError::InvalidUrl(error.to_string()))?;
        if parsed.host_str().is_none() {
            return Err(ExtractError::InvalidUrl(
                "endpoint URL must include a host".to_owned(),
            ));
        }
        Ok(Self(parsed))
    }

    /// Borrow the underlying URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.0
    }

    /// Borrow the endpoint as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{ApiEndpoint, ExtractError, PersonalAccessToken, RepositoryId};

    #[rstest]
    #[case("", "repo")]
    #[case("owner", "")]
    #[case("   ", "repo")]
    fn repository_id_rejects_blank_parts(#[case] owner: &str, #[case] name: &str) {
        let result = RepositoryId::new(owner, name);
        assert!(matches!(result, Err(ExtractError::Configuration { .. })));
    }

    #[test]
    fn repository_id_builds_qualified_form() {
        let repository =
            RepositoryId::new("microsoft", "vscode").expect("repository id should be valid");
        assert_eq!(repository.qualified(), "microsoft/vscode");
    }

    #[test]
    fn token_trims_whitespace() {
        let token = PersonalAccessToken::new("  ghp_example  ").expect("token should be valid");
        assert_eq!(token.value(), "ghp_example");
    }

    #[test]
    fn blank_token_is_rejected() {
        assert_eq!(
            PersonalAccessToken::new("   "),
            Err(ExtractError::MissingToken)
        );
    }

    #[test]
    fn endpoint_requires_a_host() {
        assert!(matches!(
            ApiEndpoint::parse("not a url"),
            Err(ExtractError::InvalidUrl(_))
        ));
        let endpoint = ApiEndpoint::parse("https://api.github.com/graphql")
            .expect("endpoint should be valid");
        assert_eq!(endpoint.as_str(), "https://api.github.com/graphql");
    }
}
