//! Request signature verification.

use std::sync::Arc;

use appcycle_sdk::config::{AppDefinition, DispatcherConfig};
use appcycle_sdk::context::{AUTHORIZATION_HEADER, DATE_HEADER, RequestContext};
use appcycle_sdk::signature::{
    DIGEST_HEADER, SignatureError, SignatureHeader, check_clock_skew, parse_http_date,
    verify_digest,
};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::debug;

use crate::keys::{KeyCache, KeyError};

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Signature(#[from] SignatureError),
    #[error(transparent)]
    Key(#[from] KeyError),
}

/// Checks the HTTP signature of a request against the signer's public key.
///
/// There is no unsigned path: a request without signature or date headers
/// fails like any other mismatch. The signature must cover `date` and
/// `digest`, and the digest must match the body.
#[derive(Clone)]
pub struct SignatureVerifier {
    keys: Arc<KeyCache>,
}

impl SignatureVerifier {
    pub fn new(keys: Arc<KeyCache>) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &Arc<KeyCache> {
        &self.keys
    }

    pub async fn verify(
        &self,
        context: &RequestContext,
        config: &DispatcherConfig,
        definition: &AppDefinition,
    ) -> Result<(), VerifyError> {
        self.verify_at(context, config, definition, OffsetDateTime::now_utc())
            .await
    }

    /// [`verify`](Self::verify) with an explicit current instant.
    pub async fn verify_at(
        &self,
        context: &RequestContext,
        config: &DispatcherConfig,
        definition: &AppDefinition,
        now: OffsetDateTime,
    ) -> Result<(), VerifyError> {
        let authorization = context
            .signature()
            .ok_or_else(|| SignatureError::MissingHeader(AUTHORIZATION_HEADER.to_string()))?;
        let date = context
            .date()
            .ok_or_else(|| SignatureError::MissingHeader(DATE_HEADER.to_string()))?;

        let header = SignatureHeader::parse(authorization)?;
        header.require_coverage()?;
        check_clock_skew(parse_http_date(date)?, now, config.clock_skew_secs)?;

        let key = self.keys.get(&header.key_id).await?;

        let signing_string = header.signing_string(context, &definition.target_url)?;
        debug!(
            correlation_id = ?context.correlation_id(),
            key_id = %header.key_id,
            signing_string = %signing_string,
            "Verifying signature"
        );
        let digest = context
            .header(DIGEST_HEADER)
            .ok_or_else(|| SignatureError::MissingHeader(DIGEST_HEADER.to_string()))?;
        verify_digest(digest, context.body().as_bytes())?;
        key.verify(signing_string.as_bytes(), &header.signature_bytes()?)?;
        Ok(())
    }
}
