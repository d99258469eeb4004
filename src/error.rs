use std::{
    fmt::{self, Display},
    ops::{Deref, DerefMut},
};

use thiserror::Error;

use crate::Direction;

/// Errors raised while reading a serialized board.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The stream ended before the last point was read.
    #[error("board data ended unexpectedly at byte {offset}")]
    UnexpectedEnd { offset: usize },

    /// Bytes remain after the point flagged as last.
    #[error("unexpected data after the last point at byte {offset}")]
    TrailingBytes { offset: usize },

    /// A point byte that sets both the chain and the last flag.
    #[error("invalid point byte {byte:#04x} at byte {offset}")]
    InvalidPointByte { offset: usize, byte: u8 },

    #[error("board of width 0 cannot hold points")]
    ZeroWidth,

    #[error("board exceeds the addressable grid")]
    TooLarge,

    /// A decoded direction points at a cell that holds no point.
    #[error("point ({x}, {y}) links {direction:?} to an empty cell")]
    MissingNeighbor { x: i32, y: i32, direction: Direction },

    #[error("unknown part id {id}")]
    UnknownPart { id: u8 },

    #[error("part {part} has no configuration {index}")]
    UnknownConfiguration { part: String, index: u8 },

    /// A part whose footprint does not fit the decoded grid.
    #[error("part {part} at ({x}, {y}) does not fit the board")]
    PartDoesNotFit { part: String, x: i32, y: i32 },

    #[error("corrupt compressed data: {0}")]
    Compression(#[from] std::io::Error),

    #[error("invalid base64 text: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// A single invalid part definition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("part {0} has no configurations")]
    NoConfigurations(String),

    #[error("configuration {configuration} of part {part} has no footprint points")]
    EmptyFootprint { part: String, configuration: usize },

    #[error("pin ({x}, {y}) of part {part} is not on a footprint point")]
    PinOffFootprint { part: String, x: i32, y: i32 },

    #[error("part {0} is defined more than once")]
    DuplicateName(String),

    #[error("part {0} exceeds the limit of 128 part types")]
    TooManyParts(String),
}

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("malformed part library: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed editor configuration: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("undo capacity must be at least 1")]
    ZeroUndoCapacity,

    #[error("compression level {0} is outside 0..=9")]
    CompressionLevel(u32),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Library(#[from] LibraryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to compress board data: {0}")]
    Compress(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Non-fatal errors collected while loading, grouped by nested context.
#[derive(Default)]
pub struct ErrorList {
    errors: Vec<Box<dyn Display + Send + Sync>>,
    contexts: Vec<(String, ErrorList)>,
}

/// Collects errors for one context of a parent list. The context is filed
/// with the parent on drop, and only if something was pushed.
pub struct ErrorContextGuard<'a, F: FnOnce() -> String> {
    parent: &'a mut ErrorList,
    list: ErrorList,
    context: Option<F>,
}

impl<F: FnOnce() -> String> Drop for ErrorContextGuard<'_, F> {
    fn drop(&mut self) {
        if self.list.is_empty() {
            return;
        }
        if let Some(context) = self.context.take() {
            let list = std::mem::take(&mut self.list);
            self.parent.contexts.push((context(), list));
        }
    }
}

impl<F: FnOnce() -> String> Deref for ErrorContextGuard<'_, F> {
    type Target = ErrorList;

    fn deref(&self) -> &ErrorList {
        &self.list
    }
}

impl<F: FnOnce() -> String> DerefMut for ErrorContextGuard<'_, F> {
    fn deref_mut(&mut self) -> &mut ErrorList {
        &mut self.list
    }
}

impl ErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_context<F: FnOnce() -> String>(&mut self, context: F) -> ErrorContextGuard<'_, F> {
        ErrorContextGuard {
            parent: self,
            list: ErrorList::new(),
            context: Some(context),
        }
    }

    pub fn push_error(&mut self, error: impl Display + Send + Sync + 'static) {
        self.errors.push(Box::new(error));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.contexts.is_empty()
    }

    /// Total number of errors, including nested contexts.
    pub fn count(&self) -> usize {
        self.errors.len() + self.contexts.iter().map(|(_, l)| l.count()).sum::<usize>()
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = depth * 2;
        for (context, list) in &self.contexts {
            writeln!(f, "{:indent$}{context}:", "")?;
            list.write_indented(f, depth + 1)?;
        }
        for error in &self.errors {
            writeln!(f, "{:indent$}{error}", "")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

pub trait ResultReport<T> {
    /// Moves the error into `list`, keeping only the success value.
    fn report_error(self, list: &mut ErrorList) -> Option<T>;
}

impl<T, E: Display + Send + Sync + 'static> ResultReport<T> for std::result::Result<T, E> {
    fn report_error(self, list: &mut ErrorList) -> Option<T> {
        self.map_err(|e| list.push_error(e)).ok()
    }
}
