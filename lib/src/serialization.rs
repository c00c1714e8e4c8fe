//! Serialization of fitted model parameters.
//!
//! Parameter structs are plain data (`Vec<f64>`, indices, strings) and are
//! turned into bytes through [`SerializableParams`]. A complete model is
//! wrapped in a self-describing artifact envelope:
//!
//! ```text
//! 0..8    magic "FMACHINE"
//! 8..12   format version, u32 LE
//! 12..20  payload length, u64 LE
//! 20..52  SHA-256 of the payload
//! 52..    payload (bincode)
//! ```
//!
//! [`decode_artifact`] rejects anything that does not match this layout
//! before the payload is decoded.

use sha2::{Digest, Sha256};
use std::error::Error;
use thiserror::Error;

/// Magic bytes at the start of every artifact.
pub const ARTIFACT_MAGIC: &[u8; 8] = b"FMACHINE";
/// Current artifact format version.
pub const ARTIFACT_VERSION: u32 = 1;

const CHECKSUM_LEN: usize = 32;
const HEADER_LEN: usize = 8 + 4 + 8 + CHECKSUM_LEN;

/// A trait for parameter representations that can be serialized to and from bytes.
///
/// Implementors should contain only plain numerical data, not live model
/// objects.
pub trait SerializableParams: Sized {
    /// The error type returned during (de)serialization.
    type Error: Error + Send + Sync + 'static;

    /// Serialize the parameters into a byte buffer.
    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error>;

    /// Deserialize the parameters from a byte buffer.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error>;
}

impl<T> SerializableParams for T
where
    T: serde::Serialize + for<'de> serde::Deserialize<'de>,
{
    type Error = bincode::Error;

    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error> {
        bincode::serialize(self)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error> {
        bincode::deserialize(bytes)
    }
}

/// Reasons an artifact envelope is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArtifactError {
    #[error("artifact is {len} bytes, shorter than the artifact header")]
    TooShort { len: usize },
    #[error("bad magic bytes")]
    BadMagic,
    #[error("unsupported format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("payload length {actual} does not match declared {declared}")]
    LengthMismatch { declared: u64, actual: u64 },
    #[error("payload checksum mismatch")]
    ChecksumMismatch,
    #[error("payload decode failed: {0}")]
    Decode(String),
}

/// Wrap serialized parameters in a versioned, checksummed envelope.
pub fn encode_artifact<P: SerializableParams>(params: &P) -> Result<Vec<u8>, P::Error> {
    let payload = params.to_bytes()?;
    let checksum: [u8; CHECKSUM_LEN] = Sha256::digest(&payload).into();

    let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
    buf.extend_from_slice(ARTIFACT_MAGIC);
    buf.extend_from_slice(&ARTIFACT_VERSION.to_le_bytes());
    buf.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    buf.extend_from_slice(&checksum);
    buf.extend_from_slice(&payload);
    Ok(buf)
}

/// Validate an envelope and decode its payload.
pub fn decode_artifact<P: SerializableParams>(bytes: &[u8]) -> Result<P, ArtifactError> {
    if bytes.len() < HEADER_LEN {
        return Err(ArtifactError::TooShort { len: bytes.len() });
    }
    let (header, payload) = bytes.split_at(HEADER_LEN);
    if &header[0..8] != ARTIFACT_MAGIC {
        return Err(ArtifactError::BadMagic);
    }

    let version = u32::from_le_bytes(read_array(&header[8..12]));
    if version != ARTIFACT_VERSION {
        return Err(ArtifactError::UnsupportedVersion {
            found: version,
            expected: ARTIFACT_VERSION,
        });
    }

    let declared = u64::from_le_bytes(read_array(&header[12..20]));
    if declared != payload.len() as u64 {
        return Err(ArtifactError::LengthMismatch {
            declared,
            actual: payload.len() as u64,
        });
    }

    let expected: [u8; CHECKSUM_LEN] = read_array(&header[20..HEADER_LEN]);
    let actual: [u8; CHECKSUM_LEN] = Sha256::digest(payload).into();
    if expected != actual {
        return Err(ArtifactError::ChecksumMismatch);
    }

    P::from_bytes(payload).map_err(|e| ArtifactError::Decode(e.to_string()))
}

fn read_array<const N: usize>(slice: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(slice);
    out
}
