//! Runtime error kinds
//!
//! One manual enum for every failure mode the evaluator, builtin
//! registry, container library and codec can produce. No language-level
//! `catch` exists (spec.md §7): an `EvalError` propagates unchanged up
//! through statement blocks until it reaches the driver.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    ArityMismatch { expected: usize, got: usize, context: String },
    TypeMismatch { expected: String, got: String, context: String },
    OutOfBounds { index: i64, len: usize, context: String },
    UnboundName(String),
    ImmutableReassign(String),

    MalformedInstance(String),
    MissingInternalField(String),

    InvalidFileFormat(String),
    InvalidPadding(u8),
    MalformedTree,
    MalformedFrequencies,
    MissingHuffmanCode(u8),

    FileNotFound(String),
    IoFailure(String),
    DirectoryCreationError(String),

    DivisionByZero(String),
    VectorSizeMismatch { a: usize, b: usize },
    MatrixSizeMismatch { a: usize, b: usize },

    SqliteOpenFailed(String),
    SqlitePrepareFailed(String),
    SqliteExecFailed(String),
    SqliteStepFailed(String),
    UnsupportedColumnType(String),
    UnsupportedBindValue(String),

    /// A module name passed to `import` with no registered loader.
    UnknownModule(String),
    /// `new T(...)` where `T` is not a registered std-struct type.
    UnknownType(String),
    /// break/continue used outside of a loop body.
    BreakOutsideLoop,
    ContinueOutsideLoop,
    /// return used outside of a function body (tolerated at top level as an exit value).
    NotCallable(String),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::ArityMismatch { expected, got, context } => {
                write!(f, "{context}: expected {expected} argument(s), got {got}")
            }
            EvalError::TypeMismatch { expected, got, context } => {
                write!(f, "{context}: expected {expected}, got {got}")
            }
            EvalError::OutOfBounds { index, len, context } => {
                write!(f, "{context}: index {index} out of bounds (len {len})")
            }
            EvalError::UnboundName(name) => write!(f, "unbound name '{name}'"),
            EvalError::ImmutableReassign(name) => {
                write!(f, "cannot reassign const binding '{name}'")
            }
            EvalError::MalformedInstance(ty) => write!(f, "malformed instance of '{ty}'"),
            EvalError::MissingInternalField(ty) => {
                write!(f, "instance of '{ty}' is missing its __internal field")
            }
            EvalError::InvalidFileFormat(msg) => write!(f, "invalid file format: {msg}"),
            EvalError::InvalidPadding(p) => write!(f, "invalid padding byte: {p}"),
            EvalError::MalformedTree => write!(f, "malformed huffman tree"),
            EvalError::MalformedFrequencies => write!(f, "malformed frequency table"),
            EvalError::MissingHuffmanCode(b) => write!(f, "no huffman code for byte {b}"),
            EvalError::FileNotFound(p) => write!(f, "file not found: {p}"),
            EvalError::IoFailure(msg) => write!(f, "io failure: {msg}"),
            EvalError::DirectoryCreationError(p) => {
                write!(f, "could not create directory: {p}")
            }
            EvalError::DivisionByZero(context) => write!(f, "{context}: division by zero"),
            EvalError::VectorSizeMismatch { a, b } => {
                write!(f, "vector size mismatch: {a} vs {b}")
            }
            EvalError::MatrixSizeMismatch { a, b } => {
                write!(f, "matrix size mismatch: {a} vs {b}")
            }
            EvalError::SqliteOpenFailed(msg) => write!(f, "sqlite open failed: {msg}"),
            EvalError::SqlitePrepareFailed(msg) => write!(f, "sqlite prepare failed: {msg}"),
            EvalError::SqliteExecFailed(msg) => write!(f, "sqlite exec failed: {msg}"),
            EvalError::SqliteStepFailed(msg) => write!(f, "sqlite step failed: {msg}"),
            EvalError::UnsupportedColumnType(msg) => write!(f, "unsupported column type: {msg}"),
            EvalError::UnsupportedBindValue(msg) => write!(f, "unsupported bind value: {msg}"),
            EvalError::UnknownModule(name) => write!(f, "unknown module '{name}'"),
            EvalError::UnknownType(name) => write!(f, "unknown type '{name}'"),
            EvalError::BreakOutsideLoop => write!(f, "'break' used outside of a loop"),
            EvalError::ContinueOutsideLoop => write!(f, "'continue' used outside of a loop"),
            EvalError::NotCallable(what) => write!(f, "value is not callable: {what}"),
        }
    }
}

impl std::error::Error for EvalError {}

impl From<std::io::Error> for EvalError {
    fn from(e: std::io::Error) -> Self {
        EvalError::IoFailure(e.to_string())
    }
}
