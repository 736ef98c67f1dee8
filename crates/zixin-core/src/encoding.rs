//! Terminal results and their oracle return encoding.
//!
//! Strings (metadata URIs and informational messages) are returned as raw
//! UTF-8 bytes. Flags use the oracle's uint256 convention: 32 bytes,
//! big-endian.

use serde::{Deserialize, Serialize};

/// File name of the metadata document under its CID.
pub const METADATA_DOCUMENT: &str = "metadata.json";

/// Width of an encoded unsigned integer.
pub const UINT256_WIDTH: usize = 32;

/// Flag returned by check-only invocations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum EligibilityFlag {
    Eligible = 0,
    Ineligible = 1,
}

impl EligibilityFlag {
    pub fn from_eligible(eligible: bool) -> Self {
        if eligible {
            EligibilityFlag::Eligible
        } else {
            EligibilityFlag::Ineligible
        }
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }
}

/// The single value an invocation hands back to the calling contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PipelineResult {
    /// Metadata was stored; this is its URI.
    Uri(String),
    /// The gate failed in URI mode; the message explains why.
    Ineligible(String),
    /// Check-only outcome.
    Flag(EligibilityFlag),
}

impl PipelineResult {
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineResult::Uri(_) => "uri",
            PipelineResult::Ineligible(_) => "ineligible",
            PipelineResult::Flag(_) => "flag",
        }
    }

    /// Oracle return bytes.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            PipelineResult::Uri(text) | PipelineResult::Ineligible(text) => {
                ResultEncoder::encode_string(text)
            }
            PipelineResult::Flag(flag) => ResultEncoder::encode_uint256(u64::from(flag.code())),
        }
    }
}

impl std::fmt::Display for PipelineResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineResult::Uri(text) | PipelineResult::Ineligible(text) => f.write_str(text),
            PipelineResult::Flag(flag) => write!(f, "{}", flag.code()),
        }
    }
}

/// Encoding helpers for the terminal stage.
pub struct ResultEncoder;

impl ResultEncoder {
    /// `https://<cid>.<gateway_suffix>/metadata.json`
    pub fn metadata_uri(cid: &str, gateway_suffix: &str) -> String {
        format!("https://{cid}.{gateway_suffix}/{METADATA_DOCUMENT}")
    }

    pub fn encode_string(text: &str) -> Vec<u8> {
        text.as_bytes().to_vec()
    }

    /// Left-pad `value` to a 32-byte big-endian word.
    pub fn encode_uint256(value: u64) -> Vec<u8> {
        let mut word = vec![0u8; UINT256_WIDTH];
        word[UINT256_WIDTH - 8..].copy_from_slice(&value.to_be_bytes());
        word
    }
}
