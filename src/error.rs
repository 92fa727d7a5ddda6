//! Error types for layout mutation, queries, and drawing.

use core::fmt;

/// Failure reported by [`TextLayout`](crate::TextLayout) operations.
///
/// Every failure is reported before any state is touched, so a rejected
/// mutation leaves the layout exactly as it was.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutError {
    /// An offset or line index fell outside its legal bounds.
    InvalidRange {
        /// Which query rejected the value.
        what: &'static str,
        /// The rejected value.
        value: usize,
        /// Exclusive upper bound of the legal range.
        limit: usize,
    },
    /// An argument was structurally invalid (disposed font, bad width, ...).
    InvalidArgument(&'static str),
    /// The layout was disposed and can no longer be used.
    Disposed,
}

impl LayoutError {
    pub(crate) fn range(what: &'static str, value: usize, limit: usize) -> Self {
        Self::InvalidRange { what, value, limit }
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRange { what, value, limit } => {
                write!(f, "invalid range: {}={} [limit={}]", what, value, limit)
            }
            Self::InvalidArgument(reason) => write!(f, "invalid argument: {}", reason),
            Self::Disposed => f.write_str("text layout is disposed"),
        }
    }
}

impl std::error::Error for LayoutError {}

/// Failure reported by [`TextLayout::draw`](crate::TextLayout::draw).
#[derive(Debug)]
pub enum DrawError<E> {
    /// The layout rejected the call before any drawing happened.
    Layout(LayoutError),
    /// The drawing surface failed part-way through.
    Surface(E),
}

impl<E> From<LayoutError> for DrawError<E> {
    fn from(err: LayoutError) -> Self {
        Self::Layout(err)
    }
}

impl<E: fmt::Debug> fmt::Display for DrawError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layout(err) => write!(f, "layout: {}", err),
            Self::Surface(err) => write!(f, "surface: {:?}", err),
        }
    }
}

impl<E: fmt::Debug> std::error::Error for DrawError<E> {}
