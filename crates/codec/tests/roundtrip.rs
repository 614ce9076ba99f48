//! End-to-end codec and archive round-trips through the public API
//! only, independent of the unit tests colocated with each module.

use std::fs;
use std::io::Cursor;
use zima_codec::{archive, compress, decompress};

#[test]
fn compresses_and_decompresses_natural_language_text() {
    let text = "the quick brown fox jumps over the lazy dog. \
                the lazy dog does not care about the quick brown fox.";
    let compressed = compress(text.as_bytes());
    let restored = decompress(&compressed).unwrap();
    assert_eq!(restored, text.as_bytes());
}

#[test]
fn compressed_output_is_smaller_for_skewed_byte_frequencies() {
    let skewed: Vec<u8> = std::iter::repeat(b'a').take(1000).chain(std::iter::once(b'b')).collect();
    let compressed = compress(&skewed);
    assert!(compressed.len() < skewed.len());
    assert_eq!(decompress(&compressed).unwrap(), skewed);
}

#[test]
fn archive_round_trips_a_nested_directory_tree() {
    let src = tempfile::tempdir().unwrap();
    fs::create_dir_all(src.path().join("src").join("nested")).unwrap();
    fs::write(src.path().join("README.md"), "top level readme").unwrap();
    fs::write(src.path().join("src").join("main.rs"), "fn main() {}").unwrap();
    fs::write(src.path().join("src").join("nested").join("deep.txt"), "deep file contents").unwrap();

    let mut archive_bytes = Vec::new();
    archive::encode(src.path(), &mut archive_bytes).unwrap();

    let dst = tempfile::tempdir().unwrap();
    archive::decode(&mut Cursor::new(archive_bytes), dst.path()).unwrap();

    assert_eq!(fs::read_to_string(dst.path().join("README.md")).unwrap(), "top level readme");
    assert_eq!(fs::read_to_string(dst.path().join("src").join("main.rs")).unwrap(), "fn main() {}");
    assert_eq!(
        fs::read_to_string(dst.path().join("src").join("nested").join("deep.txt")).unwrap(),
        "deep file contents"
    );
}

#[test]
fn archive_skips_symlinks() {
    let src = tempfile::tempdir().unwrap();
    fs::write(src.path().join("real.txt"), "real file").unwrap();
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(src.path().join("real.txt"), src.path().join("link.txt")).unwrap();
    }

    let mut archive_bytes = Vec::new();
    archive::encode(src.path(), &mut archive_bytes).unwrap();

    let dst = tempfile::tempdir().unwrap();
    archive::decode(&mut Cursor::new(archive_bytes), dst.path()).unwrap();

    assert!(dst.path().join("real.txt").exists());
    assert!(!dst.path().join("link.txt").exists());
}
