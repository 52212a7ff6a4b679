//! Token issuance and verification.
//!
//! [`JwtSigner`] owns the RS256 key pair for the process. The key pair is
//! generated at construction and held only in memory: a restart invalidates
//! every outstanding token, which is the accepted operational tradeoff for
//! this deployment. For externalized key material, construct via
//! [`JwtSigner::from_rsa_der`] instead.
//!
//! Verification results are memoized per exact token string so repeated
//! requests with the same cookie skip the signature check. Expiry is
//! rechecked on every cache hit; only the cryptographic work is memoized.
//! Failures are never cached.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rsa::pkcs1::{EncodeRsaPrivateKey, EncodeRsaPublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use thiserror::Error;

use crate::claims::{TokenClaims, UserClaims};

/// Issuer claim stamped into every token.
pub const ISSUER: &str = "projector";

const KEY_BITS: usize = 2048;

/// Key-pair construction failure.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("rsa key generation failed: {0}")]
    Generate(#[from] rsa::Error),

    #[error("rsa key encoding failed: {0}")]
    Encode(#[from] rsa::pkcs1::Error),
}

/// Token issuance failure.
#[derive(Debug, Error)]
pub enum IssueError {
    #[error("claims serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("token signing failed: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),
}

/// Token verification failure. Terminal for the presenting request; nothing
/// here is retried and failures are never cached.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token signature is invalid")]
    BadSignature,

    #[error("token algorithm is not supported")]
    UnsupportedAlgorithm,

    #[error("token is malformed")]
    Malformed,

    #[error("token could not be decoded")]
    Decode,
}

impl From<&jsonwebtoken::errors::Error> for TokenError {
    fn from(err: &jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                TokenError::UnsupportedAlgorithm
            }
            ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => TokenError::Decode,
            _ => TokenError::Malformed,
        }
    }
}

/// Issues and verifies signed, time-bounded tokens.
pub struct JwtSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    cache: RwLock<HashMap<String, Arc<TokenClaims>>>,
}

impl JwtSigner {
    /// Generate a fresh RS256 key pair for this process.
    pub fn generate() -> Result<Self, KeyError> {
        let mut rng = rand::rngs::OsRng;
        let private = RsaPrivateKey::new(&mut rng, KEY_BITS)?;
        let public = RsaPublicKey::from(&private);

        let private_der = private.to_pkcs1_der()?;
        let public_der = public.to_pkcs1_der()?;

        tracing::info!("jwt key pair generated");
        Ok(Self::from_rsa_der(
            private_der.as_bytes(),
            public_der.as_bytes(),
        ))
    }

    /// Build a signer from PKCS#1 DER key material supplied by the caller.
    ///
    /// This is the seam for multi-instance deployments where keys come from
    /// a shared secret store.
    pub fn from_rsa_der(private_der: &[u8], public_der: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        // Expiry is a hard boundary: no leeway.
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_rsa_der(private_der),
            decoding_key: DecodingKey::from_rsa_der(public_der),
            validation,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Issue a signed token carrying `claims` as its subject payload, valid
    /// for `lifetime` from now.
    pub fn issue(&self, claims: &UserClaims, lifetime: Duration) -> Result<String, IssueError> {
        let now = Utc::now().timestamp();
        let token_claims = TokenClaims {
            sub: claims.to_subject()?,
            iss: ISSUER.to_string(),
            iat: now,
            exp: now + lifetime.num_seconds(),
        };

        Ok(encode(
            &Header::new(Algorithm::RS256),
            &token_claims,
            &self.encoding_key,
        )?)
    }

    /// Verify a token's signature and expiry, returning its decoded claims.
    ///
    /// Successful parses are memoized per exact token string: concurrent
    /// callers presenting the same string converge on one cached result
    /// (first-writer-wins; a narrow duplicate computation before the first
    /// entry lands is acceptable).
    pub fn verify(&self, token: &str) -> Result<Arc<TokenClaims>, TokenError> {
        let now = Utc::now().timestamp();

        if let Some(hit) = self.cache.read().unwrap().get(token) {
            if hit.exp > now {
                return Ok(Arc::clone(hit));
            }
            return Err(TokenError::Expired);
        }

        let decoded = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|err| TokenError::from(&err))?;

        let mut cache = self.cache.write().unwrap();
        // Entries whose token has expired can never be served again; dropping
        // them here keeps the map bounded by token turnover.
        cache.retain(|_, entry| entry.exp > now);
        let entry = cache
            .entry(token.to_owned())
            .or_insert_with(|| Arc::new(decoded.claims));

        Ok(Arc::clone(entry))
    }

    /// Number of memoized verifications currently held.
    pub fn cached_verifications(&self) -> usize {
        self.cache.read().unwrap().len()
    }
}
