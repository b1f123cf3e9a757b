//! HTTP request signatures for lifecycle callbacks.
//!
//! The platform signs every callback with the Joyent HTTP signature scheme,
//! always with `rsa-sha256`. The wire format for the header is:
//!
//! ```text
//! Authorization: Signature keyId="/pl/useast1/abc",algorithm="rsa-sha256",headers="(request-target) digest date",signature="<base64>"
//! ```
//!
//! The signed content is one `name: value` line per listed header, joined by
//! `\n`. `(request-target)` is rendered as `post <path>?<query>` and taken from
//! the application's configured target URL rather than from the inbound
//! request, because proxies may rewrite the path.
//!
//! A signature is only accepted when it covers both `date` and `digest`, so the
//! body is always authenticated through its digest.
//!
//! This module only holds the pure pieces. Fetching keys and running the full
//! check is done by `appcycle-core`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ring::digest::{SHA256, digest};
use ring::signature::{RSA_PKCS1_1024_8192_SHA256_FOR_LEGACY_USE_ONLY, UnparsedPublicKey};
use rustls_pki_types::pem::{self, PemObject};
use rustls_pki_types::{CertificateDer, SubjectPublicKeyInfoDer};
use spki::ObjectIdentifier;
use spki::der::Decode;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::context::{DATE_HEADER, RequestContext};

/// Prefix of an `Authorization` header carrying a signature.
pub const SIGNATURE_SCHEME: &str = "Signature ";

/// The only supported algorithm.
pub const SUPPORTED_ALGORITHM: &str = "rsa-sha256";

/// Pseudo-header naming the request method and path.
pub const REQUEST_TARGET: &str = "(request-target)";

pub const DIGEST_HEADER: &str = "digest";

/// Callbacks are always POSTed.
pub const REQUEST_METHOD: &str = "post";

/// Signed headers when the signature does not list any.
const DEFAULT_SIGNED_HEADERS: &str = "date";

/// Headers every accepted signature must cover.
pub const REQUIRED_SIGNED_HEADERS: [&str; 2] = [DATE_HEADER, DIGEST_HEADER];

/// rsaEncryption
const RSA_ENCRYPTION: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");

/// `05 Jan 2014 21:31:40 GMT`, after the weekday has been removed.
const HTTP_DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!(
    "[day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
);

/// Errors produced by signature operations.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("Authorization header is not a signature")]
    NotASignature,
    #[error("Signature does not contain: {0}")]
    MissingAttribute(&'static str),
    #[error("Algorithm not supported: {0}")]
    UnsupportedAlgorithm(String),
    #[error("Header not found: {0}")]
    MissingHeader(String),
    #[error("Signature does not cover header: {0}")]
    UnsignedHeader(&'static str),
    #[error("Invalid date header: {0}")]
    InvalidDate(String),
    #[error("Request date is not current, skew of {skew} seconds")]
    ClockSkew { skew: i64, allowed: u64 },
    #[error("invalid base64 encoding")]
    InvalidBase64,
    #[error("invalid public key: {0}")]
    InvalidKey(String),
    #[error("Body digest does not match")]
    DigestMismatch,
    #[error("Signature is not valid")]
    SignatureMismatch,
}

impl From<ring::error::Unspecified> for SignatureError {
    fn from(_: ring::error::Unspecified) -> Self {
        Self::SignatureMismatch
    }
}

impl From<base64::DecodeError> for SignatureError {
    fn from(_: base64::DecodeError) -> Self {
        Self::InvalidBase64
    }
}

impl From<pem::Error> for SignatureError {
    fn from(e: pem::Error) -> Self {
        Self::InvalidKey(e.to_string())
    }
}

impl From<spki::der::Error> for SignatureError {
    fn from(e: spki::der::Error) -> Self {
        Self::InvalidKey(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Authorization header
// ---------------------------------------------------------------------------

/// Parsed attributes of a `Signature` authorization header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub key_id: String,
    pub algorithm: String,
    /// Lower-cased names of the signed headers, in signing order.
    pub headers: Vec<String>,
    /// Base64 signature.
    pub signature: String,
}

impl SignatureHeader {
    pub fn parse(value: &str) -> Result<Self, SignatureError> {
        let params = value
            .strip_prefix(SIGNATURE_SCHEME)
            .ok_or(SignatureError::NotASignature)?;

        let mut key_id = None;
        let mut algorithm = None;
        let mut headers = None;
        let mut signature = None;

        let mut rest = params;
        loop {
            rest = rest.trim_start_matches([',', ' ']);
            if rest.is_empty() {
                break;
            }
            let (name, after) = rest.split_once('=').ok_or(SignatureError::NotASignature)?;
            let after = after
                .strip_prefix('"')
                .ok_or(SignatureError::NotASignature)?;
            let (attr, after) = after.split_once('"').ok_or(SignatureError::NotASignature)?;
            match name.trim() {
                "keyId" => key_id = Some(attr),
                "algorithm" => algorithm = Some(attr),
                "headers" => headers = Some(attr),
                "signature" => signature = Some(attr),
                _ => {}
            }
            rest = after;
        }

        let key_id = key_id
            .filter(|v| !v.is_empty())
            .ok_or(SignatureError::MissingAttribute("keyId"))?;
        let algorithm = algorithm
            .filter(|v| !v.is_empty())
            .ok_or(SignatureError::MissingAttribute("algorithm"))?;
        if algorithm != SUPPORTED_ALGORITHM {
            return Err(SignatureError::UnsupportedAlgorithm(algorithm.to_string()));
        }
        let signature = signature
            .filter(|v| !v.is_empty())
            .ok_or(SignatureError::MissingAttribute("signature"))?;
        let headers = headers
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(DEFAULT_SIGNED_HEADERS)
            .split_whitespace()
            .map(str::to_ascii_lowercase)
            .collect();

        Ok(Self {
            key_id: key_id.to_string(),
            algorithm: algorithm.to_string(),
            headers,
            signature: signature.to_string(),
        })
    }

    /// Whether `name` is covered by the signature.
    pub fn signs(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h.eq_ignore_ascii_case(name))
    }

    /// Fail unless the date and the body digest are both signed.
    pub fn require_coverage(&self) -> Result<(), SignatureError> {
        match REQUIRED_SIGNED_HEADERS.into_iter().find(|name| !self.signs(name)) {
            Some(name) => Err(SignatureError::UnsignedHeader(name)),
            None => Ok(()),
        }
    }

    pub fn signature_bytes(&self) -> Result<Vec<u8>, SignatureError> {
        Ok(STANDARD.decode(&self.signature)?)
    }

    /// Rebuild the exact string the platform signed.
    ///
    /// `target_url` is the application's configured URL; every other listed
    /// header must be present in `context`.
    pub fn signing_string(
        &self,
        context: &RequestContext,
        target_url: &str,
    ) -> Result<String, SignatureError> {
        let lines = self
            .headers
            .iter()
            .map(|name| {
                if name == REQUEST_TARGET {
                    Ok(format!("{REQUEST_TARGET}: {}", request_target(target_url)))
                } else {
                    context
                        .header(name)
                        .map(|value| format!("{name}: {value}"))
                        .ok_or_else(|| SignatureError::MissingHeader(name.clone()))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lines.join("\n"))
    }
}

/// `post <path>[?<query>]` for the configured target URL.
pub fn request_target(target_url: &str) -> String {
    let path = match url::Url::parse(target_url) {
        Ok(url) => match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        },
        Err(_) => target_url.to_string(),
    };
    format!("{REQUEST_METHOD} {path}")
}

// ---------------------------------------------------------------------------
// Date and digest
// ---------------------------------------------------------------------------

/// Parse a `Date` header such as `Thu, 05 Jan 2014 21:31:40 GMT`.
///
/// The weekday is ignored.
pub fn parse_http_date(value: &str) -> Result<OffsetDateTime, SignatureError> {
    let trimmed = value.trim();
    let without_weekday = trimmed
        .split_once(", ")
        .map_or(trimmed, |(_, rest)| rest);
    PrimitiveDateTime::parse(without_weekday, HTTP_DATE_FORMAT)
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|_| SignatureError::InvalidDate(value.to_string()))
}

/// Fail when `date` is more than `allowed` seconds away from `now`.
/// `None` accepts any skew.
pub fn check_clock_skew(
    date: OffsetDateTime,
    now: OffsetDateTime,
    allowed: Option<u64>,
) -> Result<(), SignatureError> {
    let Some(allowed) = allowed else {
        return Ok(());
    };
    let skew = (now - date).whole_seconds().abs();
    if skew.unsigned_abs() > allowed {
        return Err(SignatureError::ClockSkew { skew, allowed });
    }
    Ok(())
}

/// `SHA-256=<base64>` digest header value for a body.
pub fn body_digest(body: &[u8]) -> String {
    format!("SHA-256={}", STANDARD.encode(digest(&SHA256, body)))
}

/// Check a `Digest` header against the body.
pub fn verify_digest(value: &str, body: &[u8]) -> Result<(), SignatureError> {
    let (algorithm, encoded) = value
        .trim()
        .split_once('=')
        .ok_or(SignatureError::DigestMismatch)?;
    if !algorithm.eq_ignore_ascii_case("SHA-256") {
        return Err(SignatureError::DigestMismatch);
    }
    let expected = STANDARD.decode(encoded)?;
    if digest(&SHA256, body).as_ref() != expected.as_slice() {
        return Err(SignatureError::DigestMismatch);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Public keys
// ---------------------------------------------------------------------------

/// An RSA public key, held as PKCS#1 DER.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    der: Vec<u8>,
}

impl PublicKey {
    /// Load an RSA key from a PEM `PUBLIC KEY` or `CERTIFICATE` block.
    pub fn from_pem(pem: &str) -> Result<Self, SignatureError> {
        let bytes = pem.as_bytes();
        let der = match SubjectPublicKeyInfoDer::from_pem_slice(bytes) {
            Ok(spki) => {
                let spki = spki::SubjectPublicKeyInfoRef::from_der(spki.as_ref())?;
                rsa_key(spki.algorithm.oid, spki.subject_public_key.raw_bytes())?
            }
            Err(pem::Error::NoItemsFound) => {
                let certificate = CertificateDer::from_pem_slice(bytes)?;
                let certificate = x509_cert::Certificate::from_der(certificate.as_ref())?;
                let spki = &certificate.tbs_certificate.subject_public_key_info;
                rsa_key(spki.algorithm.oid, spki.subject_public_key.raw_bytes())?
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { der })
    }

    /// Verify an RSASSA-PKCS1-v1_5 SHA-256 signature over `message`.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), SignatureError> {
        UnparsedPublicKey::new(&RSA_PKCS1_1024_8192_SHA256_FOR_LEGACY_USE_ONLY, &self.der)
            .verify(message, signature)?;
        Ok(())
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicKey")
            .field("len", &self.der.len())
            .finish()
    }
}

/// PKCS#1 `RSAPublicKey` bytes out of an SPKI's algorithm and key bits.
fn rsa_key(algorithm: ObjectIdentifier, key: &[u8]) -> Result<Vec<u8>, SignatureError> {
    if algorithm != RSA_ENCRYPTION {
        return Err(SignatureError::InvalidKey(format!(
            "not an RSA key: {algorithm}"
        )));
    }
    pkcs1::RsaPublicKey::from_der(key)?;
    Ok(key.to_vec())
}
