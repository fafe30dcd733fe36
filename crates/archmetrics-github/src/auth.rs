use crate::GitHubError;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Environment variables consulted for a token, highest priority first.
pub const CREDENTIAL_ENV_VARS: [&str; 3] = ["GITHUB_TOKEN", "GH_TOKEN", "GITHUB_PAT"];

/// Fine-grained personal access tokens carry this prefix.
const FINE_GRAINED_PREFIX: &str = "github_pat_";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>`
    Bearer,
    /// `Authorization: token <token>`
    Token,
}

impl AuthScheme {
    pub fn for_token(token: &str) -> Self {
        if token.starts_with(FINE_GRAINED_PREFIX) {
            AuthScheme::Bearer
        } else {
            AuthScheme::Token
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            AuthScheme::Bearer => "Bearer",
            AuthScheme::Token => "token",
        }
    }
}

#[derive(Clone)]
pub struct Credential {
    token: SecretString,
    scheme: AuthScheme,
    source: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("scheme", &self.scheme)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl Credential {
    pub fn new(token: SecretString, source: impl Into<String>) -> Self {
        let scheme = AuthScheme::for_token(token.expose_secret());
        Self {
            token,
            scheme,
            source: source.into(),
        }
    }

    /// Resolves from an explicitly configured token, then the process environment.
    pub fn resolve(configured: Option<&SecretString>) -> Result<Self, GitHubError> {
        Self::resolve_with(configured, |name| std::env::var(name).ok())
    }

    /// Like [`Credential::resolve`] with a custom variable lookup. Blank values are skipped.
    pub fn resolve_with<F>(configured: Option<&SecretString>, lookup: F) -> Result<Self, GitHubError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = configured.filter(|t| !t.expose_secret().trim().is_empty()) {
            return Ok(Self::new(token.clone(), "config"));
        }

        for name in CREDENTIAL_ENV_VARS {
            if let Some(value) = lookup(name) {
                let value = value.trim();
                if !value.is_empty() {
                    return Ok(Self::new(SecretString::from(value.to_string()), name));
                }
            }
        }

        Err(GitHubError::MissingCredential {
            checked: CREDENTIAL_ENV_VARS.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn scheme(&self) -> AuthScheme {
        self.scheme
    }

    /// Where the token came from: `config` or an environment variable name.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn header_value(&self) -> String {
        format!("{} {}", self.scheme.as_str(), self.token.expose_secret())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn fine_grained_tokens_use_bearer() {
        let cred = Credential::resolve_with(None, env(&[("GITHUB_TOKEN", "github_pat_11AB")]))
            .unwrap();
        assert_eq!(cred.scheme(), AuthScheme::Bearer);
        assert_eq!(cred.header_value(), "Bearer github_pat_11AB");
    }

    #[test]
    fn classic_tokens_use_token_scheme() {
        let cred = Credential::resolve_with(None, env(&[("GITHUB_TOKEN", "ghp_abc")])).unwrap();
        assert_eq!(cred.scheme(), AuthScheme::Token);
        assert_eq!(cred.header_value(), "token ghp_abc");
    }

    #[test]
    fn variables_are_checked_in_priority_order() {
        let cred = Credential::resolve_with(
            None,
            env(&[("GITHUB_PAT", "ghp_pat"), ("GH_TOKEN", "ghp_gh")]),
        )
        .unwrap();
        assert_eq!(cred.source(), "GH_TOKEN");

        let cred = Credential::resolve_with(
            None,
            env(&[("GITHUB_TOKEN", "  "), ("GITHUB_PAT", "ghp_pat")]),
        )
        .unwrap();
        assert_eq!(cred.source(), "GITHUB_PAT");
    }

    #[test]
    fn configured_token_wins() {
        let configured = SecretString::from("ghp_config".to_string());
        let cred =
            Credential::resolve_with(Some(&configured), env(&[("GITHUB_TOKEN", "ghp_env")]))
                .unwrap();
        assert_eq!(cred.source(), "config");
        assert_eq!(cred.header_value(), "token ghp_config");
    }

    #[test]
    fn missing_credential_names_every_variable() {
        let err = Credential::resolve_with(None, env(&[])).unwrap_err();
        let message = err.to_string();
        for name in CREDENTIAL_ENV_VARS {
            assert!(message.contains(name), "{message} should mention {name}");
        }
        assert!(err.is_missing_credential());
    }

    #[test]
    fn debug_output_hides_token() {
        let cred = Credential::resolve_with(None, env(&[("GH_TOKEN", "ghp_hidden")])).unwrap();
        assert!(!format!("{cred:?}").contains("ghp_hidden"));
    }
}
