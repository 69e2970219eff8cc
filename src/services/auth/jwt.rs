use std::path::{Path, PathBuf};
use std::time::Duration;

use josekit::jwk::alg::rsa::RsaKeyPair;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::services::auth::access::AccessEntry;
use crate::services::auth::key_id;

#[derive(Debug, Error)]
pub enum SignError {
    #[error("failed to read signing key {}: {source}", .path.display())]
    ReadKey {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    #[error("token expiry out of range: {0:?}")]
    InvalidExpiry(Duration),

    #[error("failed to sign token: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),
}

/// Signs a set of access entries into a bearer token valid for `expiry`.
pub trait TokenSigner: Send + Sync {
    fn sign(&self, access: &[AccessEntry], expiry: Duration) -> Result<String, SignError>;
}

/// Claims carried by every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    pub jti: String,
    pub access: Vec<AccessEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct TokenGeneratorOptions {
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub add_kid_header: bool,
}

#[derive(Clone)]
pub struct JwtTokenGenerator {
    issuer: Option<String>,
    audience: Option<String>,
    kid: Option<String>,
    encoding_key: EncodingKey,
}

impl std::fmt::Debug for JwtTokenGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenGenerator")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("kid", &self.kid)
            .finish()
    }
}

impl JwtTokenGenerator {
    /// `private_key_pem` must be an RSA private key (PKCS#1 or PKCS#8 PEM).
    pub fn new(private_key_pem: &[u8], options: TokenGeneratorOptions) -> Result<Self, SignError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_key_pem).map_err(|e| {
            warn!(error = %e, "failed to parse token signing key (expected RSA PEM)");
            SignError::InvalidKey(e.to_string())
        })?;

        let kid = if options.add_kid_header {
            Some(public_key_id(private_key_pem)?)
        } else {
            None
        };

        Ok(Self {
            issuer: options.issuer,
            audience: options.audience,
            kid,
            encoding_key,
        })
    }

    pub fn from_key_file(path: &Path, options: TokenGeneratorOptions) -> Result<Self, SignError> {
        let pem = std::fs::read(path).map_err(|source| SignError::ReadKey {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(&pem, options)
    }

    pub fn kid(&self) -> Option<&str> {
        self.kid.as_deref()
    }
}

impl TokenSigner for JwtTokenGenerator {
    fn sign(&self, access: &[AccessEntry], expiry: Duration) -> Result<String, SignError> {
        let ttl = i64::try_from(expiry.as_secs()).map_err(|_| SignError::InvalidExpiry(expiry))?;
        let now = chrono::Utc::now().timestamp();

        let claims = TokenClaims {
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now,
            nbf: now,
            exp: now + ttl,
            jti: Uuid::new_v4().to_string(),
            access: access.to_vec(),
        };

        let mut header = Header::new(Algorithm::RS256);
        header.typ = Some("JWT".to_string());
        header.kid = self.kid.clone();

        debug!(jti = %claims.jti, exp = claims.exp, entries = access.len(), "signing token");

        jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign token");
            SignError::Sign(e)
        })
    }
}

fn public_key_id(private_key_pem: &[u8]) -> Result<String, SignError> {
    let key_pair = RsaKeyPair::from_pem(private_key_pem)
        .map_err(|e| SignError::InvalidKey(e.to_string()))?;
    Ok(key_id::from_public_key_der(&key_pair.to_der_public_key()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_rsa_pem() {
        let err = JwtTokenGenerator::new(b"-----BEGIN NOTHING-----", Default::default())
            .unwrap_err();
        assert!(matches!(err, SignError::InvalidKey(_)));
    }

    const FIXTURE_KEY: &[u8] = include_bytes!("../../../tests/fixtures/kid_signing_key.pem");

    #[test]
    fn kid_matches_public_key_fingerprint() {
        // openssl pkey -pubout -outform DER | sha256 | head -c 30 | base32
        let signer = JwtTokenGenerator::new(
            FIXTURE_KEY,
            TokenGeneratorOptions {
                add_kid_header: true,
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(
            signer.kid(),
            Some("WFMC:ULXW:LN7P:3CV7:IDX3:VZZB:JEAP:XZ32:PBQP:SNNC:DEHF:UFYG")
        );
    }

    #[test]
    fn no_kid_unless_requested() {
        let signer = JwtTokenGenerator::new(FIXTURE_KEY, Default::default()).unwrap();
        assert_eq!(signer.kid(), None);
    }

    #[test]
    fn missing_key_file_reports_path() {
        let err = JwtTokenGenerator::from_key_file(
            Path::new("/definitely/not/here/server.key"),
            Default::default(),
        )
        .unwrap_err();

        assert!(matches!(err, SignError::ReadKey { .. }));
        assert!(err.to_string().contains("/definitely/not/here/server.key"));
    }
}
