//! Google ID token verification for sign-in.
//!
//! Tokens are RS256 JWTs signed with one of Google's rotating keys. The key set
//! is fetched from the JWKS endpoint and cached for as long as Google's
//! `Cache-Control: max-age` allows.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Context;
use axum::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::header::CACHE_CONTROL;
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::config::GoogleConfig;

const JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
const GOOGLE_ISSUERS: [&str; 2] = ["https://accounts.google.com", "accounts.google.com"];
const HTTP_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);
const CLOCK_SKEW_SECS: u64 = 60;

/// Identity claims taken from a verified Google ID token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleIdentity {
    pub google_id: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum VerifyError {
    /// Token is malformed, expired, or issued for someone else.
    #[error("identity token rejected: {0}")]
    Rejected(String),
    /// Google's key set could not be fetched.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Verifies an external identity token presented at login.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<GoogleIdentity, VerifyError>;
}

enum KeySource {
    Jwks,
    Static {
        kid: String,
        key: Arc<DecodingKey>,
    },
}

struct JwksCache {
    keys_by_kid: HashMap<String, Arc<DecodingKey>>,
    expires_at: Instant,
}

pub struct GoogleVerifier {
    http: reqwest::Client,
    client_id: String,
    source: KeySource,
    cache: RwLock<Option<JwksCache>>,
    refresh_lock: Mutex<()>,
}

impl GoogleVerifier {
    pub fn new(config: &GoogleConfig) -> anyhow::Result<Self> {
        info!(client_id = %config.client_id, "google id token verifier ready");
        Self::with_source(config, KeySource::Jwks)
    }

    /// Verifier that trusts a single fixed key. Used by tests.
    pub fn new_with_static_key(
        config: &GoogleConfig,
        kid: impl Into<String>,
        key: DecodingKey,
    ) -> anyhow::Result<Self> {
        let kid = kid.into();
        anyhow::ensure!(!kid.trim().is_empty(), "static kid must not be empty");
        Self::with_source(
            config,
            KeySource::Static {
                kid,
                key: Arc::new(key),
            },
        )
    }

    fn with_source(config: &GoogleConfig, source: KeySource) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("build JWKS http client")?;
        Ok(Self {
            http,
            client_id: config.client_id.clone(),
            source,
            cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        })
    }

    async fn key_for(&self, kid: &str) -> Result<Arc<DecodingKey>, VerifyError> {
        if let KeySource::Static { kid: known, key } = &self.source {
            return if kid == known {
                Ok(key.clone())
            } else {
                Err(VerifyError::Rejected(format!("unknown kid: {kid}")))
            };
        }

        if let Some(key) = self.cached_key(kid).await {
            return Ok(key);
        }
        // Keys rotate; an unknown kid gets one forced refetch.
        for force in [false, true] {
            self.refresh_jwks(force).await?;
            if let Some(key) = self.cached_key(kid).await {
                return Ok(key);
            }
        }
        Err(VerifyError::Rejected(format!("unknown kid: {kid}")))
    }

    async fn cached_key(&self, kid: &str) -> Option<Arc<DecodingKey>> {
        let cache = self.cache.read().await;
        cache
            .as_ref()
            .filter(|c| c.expires_at > Instant::now())
            .and_then(|c| c.keys_by_kid.get(kid))
            .cloned()
    }

    async fn refresh_jwks(&self, force: bool) -> Result<(), VerifyError> {
        let _guard = self.refresh_lock.lock().await;
        if !force
            && self
                .cache
                .read()
                .await
                .as_ref()
                .is_some_and(|c| c.expires_at > Instant::now())
        {
            return Ok(());
        }

        let response = self
            .http
            .get(JWKS_URL)
            .send()
            .await
            .map_err(|e| VerifyError::Unavailable(format!("JWKS request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(VerifyError::Unavailable(format!(
                "JWKS request returned {}",
                response.status()
            )));
        }

        let ttl = response
            .headers()
            .get(CACHE_CONTROL)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_max_age)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_CACHE_TTL);

        let jwks: Jwks = response
            .json()
            .await
            .map_err(|e| VerifyError::Unavailable(format!("invalid JWKS json: {e}")))?;

        let mut keys_by_kid = HashMap::new();
        for jwk in jwks.keys {
            if jwk.kty != "RSA" || jwk.alg.as_deref().is_some_and(|a| a != "RS256") {
                continue;
            }
            match DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
                Ok(key) => {
                    keys_by_kid.insert(jwk.kid, Arc::new(key));
                }
                Err(e) => warn!(error = %e, kid = %jwk.kid, "skipping unusable JWKS key"),
            }
        }
        if keys_by_kid.is_empty() {
            return Err(VerifyError::Unavailable("JWKS had no usable RSA keys".into()));
        }

        debug!(keys = keys_by_kid.len(), ttl_secs = ttl.as_secs(), "JWKS cache refreshed");
        *self.cache.write().await = Some(JwksCache {
            keys_by_kid,
            expires_at: Instant::now() + ttl,
        });
        Ok(())
    }
}

#[async_trait]
impl IdentityVerifier for GoogleVerifier {
    async fn verify(&self, credential: &str) -> Result<GoogleIdentity, VerifyError> {
        let header = decode_header(credential)
            .map_err(|e| VerifyError::Rejected(format!("invalid header: {e}")))?;
        if header.alg != Algorithm::RS256 {
            return Err(VerifyError::Rejected(format!(
                "unexpected alg: {:?}",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| VerifyError::Rejected("missing kid".into()))?;
        let key = self.key_for(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.set_issuer(&GOOGLE_ISSUERS);
        validation.set_audience(&[self.client_id.as_str()]);
        validation.leeway = CLOCK_SKEW_SECS;

        let claims = decode::<GoogleClaims>(credential, &key, &validation)
            .map_err(|e| VerifyError::Rejected(e.to_string()))?
            .claims;

        if claims.email_verified == Some(false) {
            return Err(VerifyError::Rejected("email not verified".into()));
        }
        let email = claims
            .email
            .filter(|e| !e.is_empty())
            .ok_or_else(|| VerifyError::Rejected("missing email claim".into()))?;

        Ok(GoogleIdentity {
            google_id: claims.sub,
            name: claims
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| email.clone()),
            email,
            picture: claims.picture,
        })
    }
}

#[derive(Debug, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    alg: Option<String>,
    n: String,
    e: String,
}

#[derive(Debug, Deserialize)]
struct GoogleClaims {
    sub: String,
    email: Option<String>,
    email_verified: Option<bool>,
    name: Option<String>,
    picture: Option<String>,
}

fn parse_max_age(value: &str) -> Option<u64> {
    value
        .split(',')
        .filter_map(|d| d.trim().strip_prefix("max-age="))
        .find_map(|raw| raw.trim_matches('"').parse().ok())
}
