//! Session token verification.
//!
//! The identity provider signs a short-lived JWT and stores it in a cookie
//! (`__session` by default). API clients may send the same token as
//! `Authorization: Bearer`. Tokens are verified locally; nothing here calls
//! the provider.

use axum::http::{HeaderMap, header};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use uniq_core::Role;

use crate::config::{IdentityConfig, IdentityKey};

/// Errors that can occur while verifying identities.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The configured verification key could not be loaded.
    #[error("invalid verification key: {0}")]
    InvalidKey(#[source] jsonwebtoken::errors::Error),

    /// The token failed signature, expiry or issuer checks.
    #[error("invalid session token: {0}")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),
}

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Provider-assigned subject id.
    pub subject: String,
    pub role: Role,
}

impl Identity {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[derive(Debug, Deserialize)]
struct SessionClaims {
    sub: String,
    #[serde(default)]
    metadata: ClaimsMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct ClaimsMetadata {
    role: Option<String>,
}

/// Verifies session tokens against the provider's key.
#[derive(Clone)]
pub struct IdentityVerifier {
    key: DecodingKey,
    validation: Validation,
    session_cookie: String,
    sign_in_url: String,
    sign_out_url: String,
}

impl IdentityVerifier {
    /// Build a verifier from configuration.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::InvalidKey` if the PEM key cannot be parsed.
    pub fn from_config(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let (key, algorithm) = match &config.key {
            IdentityKey::RsaPublicPem(pem) => (
                DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(IdentityError::InvalidKey)?,
                Algorithm::RS256,
            ),
            IdentityKey::Shared(secret) => (
                DecodingKey::from_secret(secret.expose_secret().as_bytes()),
                Algorithm::HS256,
            ),
        };

        let mut validation = Validation::new(algorithm);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.validate_aud = false;
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }

        Ok(Self {
            key,
            validation,
            session_cookie: config.session_cookie.clone(),
            sign_in_url: config.sign_in_url.clone(),
            sign_out_url: config
                .sign_out_url
                .clone()
                .unwrap_or_else(|| "/".to_string()),
        })
    }

    /// Verify a raw token.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::InvalidToken` for bad signatures, expired
    /// tokens, or an unexpected issuer.
    pub fn verify(&self, token: &str) -> Result<Identity, IdentityError> {
        let data = decode::<SessionClaims>(token, &self.key, &self.validation)
            .map_err(IdentityError::InvalidToken)?;

        Ok(Identity {
            subject: data.claims.sub,
            role: Role::from_claim(data.claims.metadata.role.as_deref()),
        })
    }

    /// Pull the session token from the cookie, falling back to a bearer header.
    #[must_use]
    pub fn token_from_headers(&self, headers: &HeaderMap) -> Option<String> {
        CookieJar::from_headers(headers)
            .get(&self.session_cookie)
            .map(|cookie| cookie.value().to_string())
            .or_else(|| {
                headers
                    .get(header::AUTHORIZATION)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.strip_prefix("Bearer "))
                    .map(str::to_owned)
            })
            .filter(|token| !token.is_empty())
    }

    /// Resolve the caller of a request, if any.
    ///
    /// Invalid tokens are treated as anonymous.
    #[must_use]
    pub fn identify(&self, headers: &HeaderMap) -> Option<Identity> {
        let token = self.token_from_headers(headers)?;
        match self.verify(&token) {
            Ok(identity) => Some(identity),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid session token");
                None
            }
        }
    }

    /// Provider sign-in page.
    #[must_use]
    pub fn sign_in_url(&self) -> &str {
        &self.sign_in_url
    }

    /// Where the browser goes after signing out.
    #[must_use]
    pub fn sign_out_url(&self) -> &str {
        &self.sign_out_url
    }

    /// Name of the cookie carrying the session token.
    #[must_use]
    pub fn session_cookie(&self) -> &str {
        &self.session_cookie
    }
}
