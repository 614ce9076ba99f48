//! Multi-file archive format (C7, spec.md §4.7): concatenated
//! per-file records, each wrapping an embedded compression stream.
//!
//! ```text
//! "ZAX"                    3 bytes, archive magic
//! repeat until EOF:
//!   u16 path_len           big-endian
//!   path_len bytes         UTF-8-ish path, forward-slash separated
//!   u64 original_size      big-endian
//!   u64 compressed_size    big-endian
//!   compressed_size bytes  embedded compression stream (starts with "ZCX")
//! ```

use crate::error::CodecError;
use crate::stream::{compress, decompress};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const MAGIC: &[u8; 3] = b"ZAX";

/// Walk `root`, emitting one record per regular file (directories and
/// symlinks are skipped, per spec.md §4.7's "Encode" step) onto
/// `writer`.
pub fn encode<W: Write>(root: &Path, writer: &mut W) -> Result<(), CodecError> {
    writer.write_all(MAGIC)?;
    let mut files = Vec::new();
    collect_files(root, root, &mut files)?;
    files.sort();
    tracing::debug!(root = %root.display(), file_count = files.len(), "encoding archive");
    for rel in files {
        let abs = root.join(&rel);
        let original = fs::read(&abs)?;
        let compressed = compress(&original);

        let path_str = rel.to_string_lossy().replace('\\', "/");
        let path_bytes = path_str.as_bytes();
        writer.write_all(&(path_bytes.len() as u16).to_be_bytes())?;
        writer.write_all(path_bytes)?;
        writer.write_all(&(original.len() as u64).to_be_bytes())?;
        writer.write_all(&(compressed.len() as u64).to_be_bytes())?;
        writer.write_all(&compressed)?;
    }
    Ok(())
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), CodecError> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_symlink() {
            continue;
        }
        let path = entry.path();
        if file_type.is_dir() {
            collect_files(root, &path, out)?;
        } else if file_type.is_file() {
            let rel = path.strip_prefix(root).expect("walked path is under root").to_path_buf();
            out.push(rel);
        }
    }
    Ok(())
}

/// Inverse of [`encode`]: read records until a clean EOF at a record
/// boundary (spec.md §4.7's "Decode" step — any EOF mid-record is a
/// hard error), recreating files under `out_dir`.
pub fn decode<R: Read>(reader: &mut R, out_dir: &Path) -> Result<(), CodecError> {
    tracing::debug!(out_dir = %out_dir.display(), "decoding archive");
    let mut magic = [0u8; 3];
    read_exact_or_fail(reader, &mut magic, "reading archive magic")?;
    if &magic != MAGIC {
        return Err(CodecError::InvalidFileFormat("expected ZAX magic".to_string()));
    }

    loop {
        let mut len_buf = [0u8; 2];
        // EOF here, with zero bytes read, is the only clean termination.
        let n = read_partial(reader, &mut len_buf)?;
        if n == 0 {
            return Ok(());
        }
        if n != 2 {
            return Err(CodecError::InvalidFileFormat("truncated path length".to_string()));
        }
        let path_len = u16::from_be_bytes(len_buf) as usize;

        let mut path_buf = vec![0u8; path_len];
        read_exact_or_fail(reader, &mut path_buf, "reading archive entry path")?;
        let rel_path = String::from_utf8_lossy(&path_buf).into_owned();

        let mut size_buf = [0u8; 8];
        read_exact_or_fail(reader, &mut size_buf, "reading original size")?;
        let _original_size = u64::from_be_bytes(size_buf);

        read_exact_or_fail(reader, &mut size_buf, "reading compressed size")?;
        let compressed_size = u64::from_be_bytes(size_buf) as usize;

        let mut compressed = vec![0u8; compressed_size];
        read_exact_or_fail(reader, &mut compressed, "reading compressed payload")?;

        let original = decompress(&compressed)?;

        let out_path = out_dir.join(&rel_path);
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|_| CodecError::DirectoryCreation(parent.display().to_string()))?;
        }
        fs::write(&out_path, original)?;
    }
}

fn read_exact_or_fail<R: Read>(reader: &mut R, buf: &mut [u8], context: &str) -> Result<(), CodecError> {
    reader
        .read_exact(buf)
        .map_err(|_| CodecError::InvalidFileFormat(format!("unexpected end of archive while {context}")))
}

/// Reads into `buf`, returning how many bytes were actually read
/// before EOF (unlike `read_exact`, a short read here is not an error
/// by itself — the caller decides whether zero bytes is a clean
/// termination or a truncated record).
fn read_partial<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, CodecError> {
    let mut total = 0;
    while total < buf.len() {
        let n = reader.read(&mut buf[total..])?;
        if n == 0 {
            break;
        }
        total += n;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trips_two_files_with_identical_contents() {
        let src = tempfile::tempdir().unwrap();
        fs::write(src.path().join("hello.txt"), "hello world").unwrap();
        fs::create_dir_all(src.path().join("b")).unwrap();
        fs::write(src.path().join("b").join("data.txt"), "zig is awesome").unwrap();

        let mut archive_bytes = Vec::new();
        encode(src.path(), &mut archive_bytes).unwrap();

        let dst = tempfile::tempdir().unwrap();
        decode(&mut Cursor::new(archive_bytes), dst.path()).unwrap();

        assert_eq!(fs::read_to_string(dst.path().join("hello.txt")).unwrap(), "hello world");
        assert_eq!(fs::read_to_string(dst.path().join("b").join("data.txt")).unwrap(), "zig is awesome");
    }

    #[test]
    fn empty_files_round_trip() {
        let src = tempfile::tempdir().unwrap();
        fs::write(src.path().join("empty.txt"), "").unwrap();

        let mut archive_bytes = Vec::new();
        encode(src.path(), &mut archive_bytes).unwrap();

        let dst = tempfile::tempdir().unwrap();
        decode(&mut Cursor::new(archive_bytes), dst.path()).unwrap();

        assert_eq!(fs::read(dst.path().join("empty.txt")).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn archive_magic_mismatch_is_rejected() {
        let dst = tempfile::tempdir().unwrap();
        let err = decode(&mut Cursor::new(b"ZCXnope".to_vec()), dst.path()).unwrap_err();
        assert!(matches!(err, CodecError::InvalidFileFormat(_)));
    }
}
