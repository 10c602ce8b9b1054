//! Untrusted decode of a compact JWS.
//!
//! Only used to pick the verification key (`kid`) and to reject unsupported
//! algorithms early. Nothing decoded here reaches handlers.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("expected 3 dot-separated segments, got {0}")]
    SegmentCount(usize),
    #[error("{0} segment is not base64url")]
    Base64(&'static str),
    #[error("{0} segment is not a JSON object")]
    Json(&'static str),
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnverifiedHeader {
    pub alg: String,
    #[serde(default)]
    pub kid: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UnverifiedToken {
    pub header: UnverifiedHeader,
    pub payload: serde_json::Map<String, serde_json::Value>,
}

impl UnverifiedToken {
    pub fn decode(token: &str) -> Result<Self, DecodeError> {
        let segments: Vec<&str> = token.split('.').collect();
        let [header, payload, signature] = segments.as_slice() else {
            return Err(DecodeError::SegmentCount(segments.len()));
        };

        let header_bytes = URL_SAFE_NO_PAD
            .decode(header)
            .map_err(|_| DecodeError::Base64("header"))?;
        let payload_bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| DecodeError::Base64("payload"))?;
        if signature.is_empty() || URL_SAFE_NO_PAD.decode(signature).is_err() {
            return Err(DecodeError::Base64("signature"));
        }

        let header: UnverifiedHeader =
            serde_json::from_slice(&header_bytes).map_err(|_| DecodeError::Json("header"))?;
        let payload = serde_json::from_slice(&payload_bytes).map_err(|_| DecodeError::Json("payload"))?;

        Ok(Self { header, payload })
    }

    /// Key identifier from the header; empty strings count as absent.
    pub fn kid(&self) -> Option<&str> {
        self.header.kid.as_deref().filter(|k| !k.trim().is_empty())
    }
}
