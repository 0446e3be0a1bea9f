//! Error taxonomy for the binary codec, model loader and inference entry
//! points.
//!
//! Three enums cover the three places this crate can fail: decoding a
//! persisted artifact (`CodecError`), assembling a `Model` from a data
//! directory (`LoadError`), and running inference against a loaded model
//! (`ParseError`).

use std::path::PathBuf;

use thiserror::Error;

/// Failure while reading a big-endian primitive, array, trie, CSR matrix or
/// dense matrix from a byte stream.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("unexpected end of data: needed {needed} bytes, {available} available")]
    EndOfData { needed: usize, available: usize },

    #[error("bad file signature: expected {expected:#010x}, found {found:#010x}")]
    BadSignature { expected: u32, found: u32 },

    #[error("stream truncated before expected content was read")]
    Truncated,

    #[error("corrupt model data: {0}")]
    CorruptModel(String),

    #[error("unsupported trie payload width (only u32/i32 reinterpretation is supported)")]
    UnsupportedPayloadWidth,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure while composing a [`crate::model::Model`] from a data directory.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("model file missing: {0}")]
    MissingModel(PathBuf),

    #[error("failed to decode {path}: {source}")]
    Codec {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure while running inference against a loaded model.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    #[error("model is not ready for inference")]
    ModelNotReady,

    #[error("invalid input: null or empty where disallowed")]
    InvalidInput,
}
