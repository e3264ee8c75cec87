//! Byte sequences carried in a textual encoding.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use sha2::{Digest, Sha256};

use crate::error::{InvalidSchemaError, MarshalError};
use crate::example::{Example, ExampleSource};
use crate::literal::Literal;
use crate::schema::{BinaryInfo, LengthInfo, Schema, SchemaInfo, check_length, finalize_length};

/// Length of generated examples when no minimum is configured.
const DEFAULT_EXAMPLE_SIZE: usize = 16;

/// A reversible mapping between raw bytes and a literal.
pub trait Encoding: fmt::Debug + Send + Sync {
    /// Short name shown in documentation, e.g. `hex`.
    fn name(&self) -> &'static str;

    fn encode(&self, data: &[u8]) -> String;

    fn decode(&self, literal: &str) -> Result<Vec<u8>, String>;

    /// Length of the literal produced for `raw_len` bytes.
    fn encoded_len(&self, raw_len: usize) -> usize;
}

/// Lowercase hexadecimal, two characters per byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hex;

impl Encoding for Hex {
    fn name(&self) -> &'static str {
        "hex"
    }

    fn encode(&self, data: &[u8]) -> String {
        hex::encode(data)
    }

    fn decode(&self, literal: &str) -> Result<Vec<u8>, String> {
        hex::decode(literal).map_err(|e| format!("expected hex-encoded data: {e}"))
    }

    fn encoded_len(&self, raw_len: usize) -> usize {
        raw_len * 2
    }
}

/// Standard base64 alphabet with padding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64;

impl Encoding for Base64 {
    fn name(&self) -> &'static str {
        "base64"
    }

    fn encode(&self, data: &[u8]) -> String {
        BASE64.encode(data)
    }

    fn decode(&self, literal: &str) -> Result<Vec<u8>, String> {
        BASE64
            .decode(literal)
            .map_err(|e| format!("expected base64-encoded data: {e}"))
    }

    fn encoded_len(&self, raw_len: usize) -> usize {
        raw_len.div_ceil(3) * 4
    }
}

/// Schema for binary values, bounded by their decoded length.
///
/// # Examples
///
/// ```
/// use envspec_core::{BinarySchema, Hex, Literal, Schema};
///
/// let key = BinarySchema::new(Hex).with_min_length(2).with_max_length(2);
/// assert_eq!(key.unmarshal(&Literal::new("beef")).unwrap(), vec![0xbe, 0xef]);
/// assert!(key.unmarshal(&Literal::new("be")).is_err());
/// assert!(key.unmarshal(&Literal::new("zz")).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct BinarySchema<E> {
    encoding: E,
    length: LengthInfo,
}

impl<E: Encoding> BinarySchema<E> {
    pub fn new(encoding: E) -> Self {
        Self {
            encoding,
            length: LengthInfo::default(),
        }
    }

    /// Sets the minimum decoded length in bytes.
    pub fn with_min_length(mut self, min: usize) -> Self {
        self.length.min = Some(min);
        self
    }

    /// Sets the maximum decoded length in bytes.
    pub fn with_max_length(mut self, max: usize) -> Self {
        self.length.max = Some(max);
        self
    }

    pub fn encoding(&self) -> &E {
        &self.encoding
    }

    fn example_size(&self) -> usize {
        match (self.length.min, self.length.max) {
            (Some(min), _) => min,
            (None, Some(max)) => DEFAULT_EXAMPLE_SIZE.min(max),
            (None, None) => DEFAULT_EXAMPLE_SIZE,
        }
    }
}

impl<E: Encoding> Schema<Vec<u8>> for BinarySchema<E> {
    fn describe(&self) -> SchemaInfo {
        SchemaInfo::Binary(BinaryInfo {
            encoding: self.encoding.name(),
            length: self.length.clone(),
            literal_length: LengthInfo {
                min: self.length.min.map(|n| self.encoding.encoded_len(n)),
                max: self.length.max.map(|n| self.encoding.encoded_len(n)),
            },
        })
    }

    fn finalize(&self) -> Result<(), InvalidSchemaError> {
        finalize_length(&self.length)
    }

    fn marshal(&self, value: &Vec<u8>) -> Result<Literal, MarshalError> {
        check_length(&self.length, value.len())?;
        Ok(Literal::new(self.encoding.encode(value)))
    }

    fn unmarshal(&self, literal: &Literal) -> Result<Vec<u8>, MarshalError> {
        let data = self
            .encoding
            .decode(literal.as_str())
            .map_err(MarshalError::Malformed)?;
        check_length(&self.length, data.len())?;
        Ok(data)
    }

    fn examples(&self, conservative: bool) -> Vec<Example> {
        if conservative {
            return Vec::new();
        }
        let size = self.example_size();
        if size == 0 {
            return Vec::new();
        }
        let data = deterministic_bytes(size);
        vec![Example::new(
            self.encoding.encode(&data),
            format!("{size} bytes of {}-encoded data", self.encoding.name()),
            ExampleSource::Schema,
        )]
    }
}

/// Pseudo-random bytes keyed only by `size`, identical on every run.
///
/// SHA-256 in counter mode: block `i` is `sha256(size || i)`.
fn deterministic_bytes(size: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(size);
    let mut counter: u64 = 0;
    while out.len() < size {
        let mut hasher = Sha256::new();
        hasher.update((size as u64).to_le_bytes());
        hasher.update(counter.to_le_bytes());
        out.extend_from_slice(&hasher.finalize());
        counter += 1;
    }
    out.truncate(size);
    out
}
