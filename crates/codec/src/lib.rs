//! Huffman codec (C6) and multi-file archive format (C7).
//!
//! No teacher counterpart — grounded on the corpus's Huffman reference
//! implementations for the canonical tie-break / bit-buffer idiom
//! (`tree.rs`'s doc comment names the specific files), written in the
//! rest of this workspace's manual-error-enum, module-doc-comment
//! style.

pub mod archive;
pub mod bitio;
pub mod error;
pub mod stream;
pub mod tree;

pub use error::CodecError;
pub use stream::{compress, compress_to, count_frequencies, count_frequencies_reader, decompress};
