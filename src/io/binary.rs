//! VW binary model format.
//!
//! # Layout
//!
//! Little-endian throughout. Strings are a `u32` byte length followed by the
//! bytes, which VW terminates with a NUL.
//!
//! ```text
//! Field            Type            Checksummed
//! -----            ----            -----------
//! version          string          no
//! id               string          yes
//! model character  u8              no
//! min label        f32             yes
//! max label        f32             yes
//! num bits         u32             yes
//! lda              u32             yes
//! ngram length     u32             yes   (must be 0)
//! skip length      u32             yes   (must be 0)
//! options          string          yes
//! checksum length  u32             no    (must be 4)
//! checksum         u32             no
//! gd resume        u8              no    (must be 0)
//! weights          (u32, f32)*     no    until end of input
//! ```
//!
//! The checksum chains [`hash32`] over the raw bytes of each checksummed
//! field, seeding every step with the running value (starting at 0).

use std::io::{Read, Write};

use crate::hash::hash32;
use crate::model::{check_num_bits, Model, ModelHeader, OptionConfig};

use super::LoadError;

/// Model character VW writes after the id.
const MODEL_CHARACTER: u8 = b'm';

/// The only checksum width VW writes.
const CHECKSUM_LEN: u32 = 4;

// =============================================================================
// Options
// =============================================================================

/// Options for reading binary models.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BinaryReadOptions {
    /// Reject models whose stored header checksum disagrees with the computed
    /// one. Off by default, as in VW's own slim scorers.
    pub verify_checksum: bool,
}

impl BinaryReadOptions {
    pub fn verified() -> Self {
        Self {
            verify_checksum: true,
        }
    }
}

// =============================================================================
// Checksum
// =============================================================================

/// Whether a field participates in the header checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sum {
    Fold,
    Skip,
}

/// Running header checksum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Checksum(i32);

impl Checksum {
    #[inline]
    fn fold(self, bytes: &[u8]) -> Self {
        Self(hash32(bytes, self.0))
    }

    #[inline]
    fn value(self) -> u32 {
        self.0 as u32
    }
}

// =============================================================================
// Reader
// =============================================================================

/// Cursor over the model bytes that folds checksummed fields as it goes.
struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    checksum: Checksum,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            checksum: Checksum::default(),
        }
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, field: &'static str, len: usize, sum: Sum) -> Result<&'a [u8], LoadError> {
        let available = self.remaining();
        if len > available {
            return Err(LoadError::Truncated {
                field,
                needed: len,
                available,
            });
        }
        let bytes = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        if sum == Sum::Fold {
            self.checksum = self.checksum.fold(bytes);
        }
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self, field: &'static str, sum: Sum) -> Result<[u8; N], LoadError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(field, N, sum)?);
        Ok(out)
    }

    fn u8(&mut self, field: &'static str, sum: Sum) -> Result<u8, LoadError> {
        Ok(self.array::<1>(field, sum)?[0])
    }

    fn u32(&mut self, field: &'static str, sum: Sum) -> Result<u32, LoadError> {
        self.array(field, sum).map(u32::from_le_bytes)
    }

    fn f32(&mut self, field: &'static str, sum: Sum) -> Result<f32, LoadError> {
        self.array(field, sum).map(f32::from_le_bytes)
    }

    /// Length-prefixed string. Only the contents are checksummed.
    fn string(&mut self, field: &'static str, sum: Sum) -> Result<String, LoadError> {
        let len = self.u32(field, Sum::Skip)? as usize;
        let bytes = self.take(field, len, sum)?;
        let text = std::str::from_utf8(bytes)
            .map_err(|e| LoadError::invalid(field, e.to_string()))?;
        Ok(text.trim_end_matches('\0').to_string())
    }
}

/// Load a binary model with default options (no checksum verification).
pub fn load_binary(bytes: &[u8]) -> Result<Model, LoadError> {
    load_binary_with(bytes, &BinaryReadOptions::default())
}

/// Load a binary model.
pub fn load_binary_with(bytes: &[u8], options: &BinaryReadOptions) -> Result<Model, LoadError> {
    let mut reader = ByteReader::new(bytes);

    let version = reader.string("version", Sum::Skip)?;
    let id = reader.string("id", Sum::Fold)?;
    reader.u8("model_character", Sum::Skip)?;
    let min_label = reader.f32("min_label", Sum::Fold)?;
    let max_label = reader.f32("max_label", Sum::Fold)?;
    let num_bits = reader.u32("num_bits", Sum::Fold)?;
    check_num_bits(num_bits)?;
    reader.u32("lda", Sum::Fold)?;

    let ngram_len = reader.u32("ngram_len", Sum::Fold)?;
    if ngram_len != 0 {
        return Err(LoadError::unsupported(format!("ngram ({ngram_len} entries)")));
    }
    let skip_len = reader.u32("skip_len", Sum::Fold)?;
    if skip_len != 0 {
        return Err(LoadError::unsupported(format!("skip ({skip_len} entries)")));
    }

    let options_text = reader.string("options", Sum::Fold)?;
    let computed = reader.checksum.value();

    let checksum_len = reader.u32("checksum_len", Sum::Skip)?;
    if checksum_len != CHECKSUM_LEN {
        return Err(LoadError::MalformedHeader(format!(
            "checksum length must be {CHECKSUM_LEN}, found {checksum_len}"
        )));
    }
    let stored = reader.u32("checksum", Sum::Skip)?;
    if options.verify_checksum && stored != computed {
        return Err(LoadError::ChecksumMismatch {
            expected: stored,
            computed,
        });
    }

    if reader.u8("gd_resume", Sum::Skip)? != 0 {
        return Err(LoadError::unsupported("gd resume state"));
    }

    let config = OptionConfig::parse(&options_text)?;
    let header = ModelHeader {
        version,
        id,
        min_label,
        max_label,
        num_bits,
        options: options_text,
    };

    let mut weights = vec![0.0f32; header.table_size()];
    while reader.remaining() > 0 {
        let bucket = reader.u32("weights", Sum::Skip)?;
        let value = reader.f32("weights", Sum::Skip)?;
        let slot = weights
            .get_mut(bucket as usize)
            .ok_or(LoadError::BucketOutOfRange {
                bucket: bucket as u64,
                table_size: header.table_size(),
            })?;
        *slot = value;
    }

    let model = Model::with_config(header, config, weights)?;
    super::log_loaded("binary", &model);
    Ok(model)
}

/// Read a complete binary model from `reader`.
pub fn read_binary<R: Read>(mut reader: R, options: &BinaryReadOptions) -> Result<Model, LoadError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    load_binary_with(&bytes, options)
}

// =============================================================================
// Writer
// =============================================================================

#[derive(Default)]
struct ByteWriter {
    bytes: Vec<u8>,
    checksum: Checksum,
}

impl ByteWriter {
    fn put(&mut self, bytes: &[u8], sum: Sum) {
        if sum == Sum::Fold {
            self.checksum = self.checksum.fold(bytes);
        }
        self.bytes.extend_from_slice(bytes);
    }

    fn string(&mut self, text: &str, sum: Sum) {
        let mut contents = Vec::with_capacity(text.len() + 1);
        contents.extend_from_slice(text.as_bytes());
        contents.push(0);
        self.put(&(contents.len() as u32).to_le_bytes(), Sum::Skip);
        self.put(&contents, sum);
    }
}

/// Header bytes up to and including the options string, plus their checksum.
fn header_bytes(model: &Model) -> ByteWriter {
    let mut w = ByteWriter::default();
    w.string(model.version(), Sum::Skip);
    w.string(model.id(), Sum::Fold);
    w.put(&[MODEL_CHARACTER], Sum::Skip);
    w.put(&model.min_label().to_le_bytes(), Sum::Fold);
    w.put(&model.max_label().to_le_bytes(), Sum::Fold);
    w.put(&model.num_bits().to_le_bytes(), Sum::Fold);
    w.put(&0u32.to_le_bytes(), Sum::Fold); // lda
    w.put(&0u32.to_le_bytes(), Sum::Fold); // ngram
    w.put(&0u32.to_le_bytes(), Sum::Fold); // skip
    w.string(model.options(), Sum::Fold);
    w
}

/// Header checksum `model` would carry in binary form.
pub fn header_checksum(model: &Model) -> u32 {
    header_bytes(model).checksum.value()
}

/// Serialize `model` to the binary format.
///
/// Only non-zero weights are written, in ascending bucket order.
pub fn write_binary(model: &Model) -> Vec<u8> {
    let mut w = header_bytes(model);
    let checksum = w.checksum.value();
    w.put(&CHECKSUM_LEN.to_le_bytes(), Sum::Skip);
    w.put(&checksum.to_le_bytes(), Sum::Skip);
    w.put(&[0], Sum::Skip); // gd resume
    for (bucket, value) in model.non_zero_weights() {
        w.put(&bucket.to_le_bytes(), Sum::Skip);
        w.put(&value.to_le_bytes(), Sum::Skip);
    }
    w.bytes
}

/// Write `model` in binary form to `writer`.
pub fn write_binary_to<W: Write>(model: &Model, mut writer: W) -> std::io::Result<()> {
    writer.write_all(&write_binary(model))
}
