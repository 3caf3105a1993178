use crate::config::{AdminSettings, AuthSettings};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Auth is misconfigured: {0}")]
    Misconfigured(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FirebaseClaims {
    #[serde(default)]
    pub sign_in_provider: Option<String>,
}

/// Claims read from an ID token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: usize,
    #[serde(default)]
    pub firebase: FirebaseClaims,
}

/// The caller behind a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
    pub is_anonymous: bool,
}

/// Verifies ID tokens issued by the auth provider
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
    admin: AdminSettings,
}

impl TokenVerifier {
    pub fn new(settings: &AuthSettings, admin: AdminSettings) -> Result<Self, AuthError> {
        let key = match settings.algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                let secret = settings
                    .secret
                    .as_deref()
                    .ok_or_else(|| AuthError::Misconfigured("auth.secret is required for HMAC tokens".into()))?;
                DecodingKey::from_secret(secret.as_bytes())
            }
            Algorithm::RS256 | Algorithm::RS384 | Algorithm::RS512 => {
                let pem = settings
                    .public_key_pem
                    .as_deref()
                    .ok_or_else(|| AuthError::Misconfigured("auth.public_key_pem is required for RSA tokens".into()))?;
                DecodingKey::from_rsa_pem(pem.as_bytes())?
            }
            other => {
                return Err(AuthError::Misconfigured(format!("unsupported algorithm {:?}", other)));
            }
        };

        let mut validation = Validation::new(settings.algorithm);
        if let Some(issuer) = &settings.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &settings.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Ok(Self { key, validation, admin })
    }

    pub fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        let claims = data.claims;
        Ok(AuthUser {
            is_anonymous: claims.firebase.sign_in_provider.as_deref() == Some("anonymous"),
            uid: claims.sub,
            email: claims.email,
        })
    }

    /// Verify the token in an `Authorization: Bearer` header value
    pub fn verify_header(&self, header: Option<&str>) -> Result<AuthUser, AuthError> {
        let token = header
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;
        self.verify(token)
    }

    /// Admins are signed-in, non-anonymous users on the allow-list
    pub fn is_admin(&self, user: &AuthUser) -> bool {
        !user.is_anonymous
            && user
                .email
                .as_deref()
                .map(|email| self.admin.is_admin_email(email))
                .unwrap_or(false)
    }
}
