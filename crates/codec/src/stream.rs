//! Compression stream: frequency pass, canonical tree, bit-packed
//! payload (spec.md §4.6). Wire layout (§4.6.6):
//!
//! ```text
//! "ZCX"                    3 bytes, compression magic
//! u16 num_entries          big-endian
//! repeat num_entries:      {u8 byte, u32 freq big-endian}
//! u8 pad_bits              0..7
//! ... packed code bits ...
//! ```

use crate::bitio::{BitReader, BitWriter};
use crate::error::CodecError;
use crate::tree::{build_code_table, build_tree, canonical_entries, Node};
use std::collections::HashMap;
use std::io::{Read, Write};

pub const MAGIC: &[u8; 3] = b"ZCX";

/// Scan `input` once, producing a mapping from byte to count (spec.md
/// §4.6.1's whole-buffer variant; the 64 KiB chunked streaming variant
/// the spec also names folds into the same table via repeated calls).
pub fn count_frequencies(input: &[u8]) -> HashMap<u8, u64> {
    let mut freqs = HashMap::new();
    for &b in input {
        *freqs.entry(b).or_insert(0u64) += 1;
    }
    freqs
}

/// Count frequencies from a `Read` in fixed 64 KiB chunks, bounding
/// memory for large inputs (spec.md §4.6.1's stream variant).
pub fn count_frequencies_reader<R: Read>(mut reader: R) -> Result<HashMap<u8, u64>, CodecError> {
    let mut freqs = HashMap::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        for &b in &buf[..n] {
            *freqs.entry(b).or_insert(0u64) += 1;
        }
    }
    Ok(freqs)
}

/// Compress `input` into the stream layout above. Deterministic:
/// compressing the same bytes twice produces bit-identical output
/// (spec.md §8's canonical-determinism property), since the tree is
/// always rebuilt from the canonical sorted entry list.
pub fn compress(input: &[u8]) -> Vec<u8> {
    let freqs = count_frequencies(input);
    let entries = canonical_entries(&freqs);
    tracing::debug!(input_len = input.len(), symbols = entries.len(), "compressing buffer");
    let mut out = Vec::with_capacity(input.len() / 2 + 16);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&(entries.len() as u16).to_be_bytes());
    for &(byte, freq) in &entries {
        out.push(byte);
        out.extend_from_slice(&(freq as u32).to_be_bytes());
    }

    let tree = build_tree(&entries);
    let table = tree.as_ref().map(build_code_table).unwrap_or_default();

    // Single-symbol and empty inputs emit zero code bits (spec.md
    // §4.6.8): pad is 0 and there is no payload to pack.
    if table.is_empty() {
        out.push(0);
        return out;
    }

    let mut writer = BitWriter::new();
    for &b in input {
        writer.push_code(&table[&b]);
    }
    let (payload, pad) = writer.finish();
    out.push(pad);
    out.extend_from_slice(&payload);
    out
}

/// Inverse of [`compress`]. Fails with [`CodecError::InvalidFileFormat`]
/// if the magic doesn't match `"ZCX"` (spec.md §8's magic-rejection
/// property covers `"ZAX"` too — callers that might receive either
/// stream should check the magic themselves and dispatch to
/// [`crate::archive::extract`] before calling this).
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    tracing::debug!(stream_len = data.len(), "decompressing stream");
    if data.len() < 3 || &data[0..3] != MAGIC {
        return Err(CodecError::InvalidFileFormat("expected ZCX magic".to_string()));
    }
    let mut pos = 3;
    let num_entries = read_u16(data, &mut pos)?;
    let mut entries = Vec::with_capacity(num_entries as usize);
    for _ in 0..num_entries {
        let byte = read_u8(data, &mut pos)?;
        let freq = read_u32(data, &mut pos)? as u64;
        entries.push((byte, freq));
    }
    // Re-sort defensively so the decoder's tree is built from exactly
    // the canonical order the encoder used, regardless of how the
    // entries were laid out on the wire (spec.md §4.6.3/§9).
    entries.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));
    let total_symbols: u64 = entries.iter().map(|&(_, f)| f).sum();

    let pad_bits = read_u8(data, &mut pos)?;
    if pad_bits >= 8 {
        return Err(CodecError::InvalidPadding(pad_bits));
    }

    if entries.is_empty() {
        return Ok(Vec::new());
    }

    let tree = build_tree(&entries).expect("non-empty entries build a tree");
    if let Node::Leaf { byte, .. } = tree {
        return Ok(vec![byte; total_symbols as usize]);
    }

    let payload = &data[pos..];
    let mut reader = BitReader::new(payload);
    let mut out = Vec::with_capacity(total_symbols as usize);
    while (out.len() as u64) < total_symbols {
        let mut node = &tree;
        loop {
            match node {
                Node::Leaf { byte, .. } => {
                    out.push(*byte);
                    break;
                }
                Node::Internal { left, right, .. } => {
                    let bit = reader.next_bit().ok_or(CodecError::MalformedTree)?;
                    node = if bit == 0 { left } else { right };
                }
            }
        }
    }
    Ok(out)
}

/// Compress `input` directly onto a writer — the shape the archive
/// encoder (spec.md §4.7) needs for each per-file entry.
pub fn compress_to<W: Write>(input: &[u8], mut writer: W) -> Result<(), CodecError> {
    writer.write_all(&compress(input))?;
    Ok(())
}

fn read_u8(data: &[u8], pos: &mut usize) -> Result<u8, CodecError> {
    let b = *data.get(*pos).ok_or_else(|| CodecError::InvalidFileFormat("truncated stream".to_string()))?;
    *pos += 1;
    Ok(b)
}

fn read_u16(data: &[u8], pos: &mut usize) -> Result<u16, CodecError> {
    let bytes = data
        .get(*pos..*pos + 2)
        .ok_or_else(|| CodecError::InvalidFileFormat("truncated stream".to_string()))?;
    *pos += 2;
    Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
}

fn read_u32(data: &[u8], pos: &mut usize) -> Result<u32, CodecError> {
    let bytes = data
        .get(*pos..*pos + 4)
        .ok_or_else(|| CodecError::InvalidFileFormat("truncated stream".to_string()))?;
    *pos += 4;
    Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_matches_spec_example_bytes() {
        assert_eq!(compress(b""), vec![0x5A, 0x43, 0x58, 0x00, 0x00, 0x00]);
        assert_eq!(decompress(&compress(b"")).unwrap(), b"");
    }

    #[test]
    fn uniform_input_matches_spec_example_bytes() {
        let compressed = compress(b"aaaaaa");
        let mut expected = vec![0x5A, 0x43, 0x58, 0x00, 0x01, b'a'];
        expected.extend_from_slice(&6u32.to_be_bytes());
        expected.push(0x00);
        assert_eq!(compressed, expected);
        assert_eq!(decompress(&compressed).unwrap(), b"aaaaaa");
    }

    #[test]
    fn pangram_round_trips() {
        let text = b"the quick brown fox jumps over the lazy dog";
        let compressed = compress(text);
        assert_eq!(decompress(&compressed).unwrap(), text);
    }

    #[test]
    fn compressing_twice_is_bit_identical() {
        let text = b"canonical determinism matters";
        assert_eq!(compress(text), compress(text));
    }

    #[test]
    fn magic_mismatch_is_rejected() {
        let err = decompress(b"not-a-stream").unwrap_err();
        assert!(matches!(err, CodecError::InvalidFileFormat(_)));
    }

    #[test]
    fn frequency_sum_equals_input_length() {
        let text = b"mississippi";
        let freqs = count_frequencies(text);
        let total: u64 = freqs.values().sum();
        assert_eq!(total, text.len() as u64);
    }

    #[test]
    fn reader_based_frequency_counting_agrees_with_buffer_variant() {
        let text = b"the quick brown fox jumps over the lazy dog".repeat(10);
        let from_buffer = count_frequencies(&text);
        let from_reader = count_frequencies_reader(text.as_slice()).unwrap();
        assert_eq!(from_buffer, from_reader);
    }
}
