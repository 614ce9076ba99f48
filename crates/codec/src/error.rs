//! Error kinds the codec and archive reader/writer can produce.
//!
//! A manual `...Error` enum, matching the teacher's own
//! `seq_compiler::codegen::CodeGenError` style (no `thiserror`/
//! `anyhow` in the dependency tree to reach for).

use std::fmt;

#[derive(Debug)]
pub enum CodecError {
    InvalidFileFormat(String),
    InvalidPadding(u8),
    MalformedTree,
    MalformedFrequencies(String),
    FileNotFound(String),
    Io(std::io::Error),
    DirectoryCreation(String),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::InvalidFileFormat(msg) => write!(f, "invalid file format: {msg}"),
            CodecError::InvalidPadding(p) => write!(f, "invalid padding byte: {p}"),
            CodecError::MalformedTree => write!(f, "malformed huffman tree"),
            CodecError::MalformedFrequencies(msg) => write!(f, "malformed frequency table: {msg}"),
            CodecError::FileNotFound(path) => write!(f, "file not found: {path}"),
            CodecError::Io(e) => write!(f, "io failure: {e}"),
            CodecError::DirectoryCreation(path) => {
                write!(f, "could not create directory: {path}")
            }
        }
    }
}

impl std::error::Error for CodecError {}

impl From<std::io::Error> for CodecError {
    fn from(e: std::io::Error) -> Self {
        CodecError::Io(e)
    }
}
