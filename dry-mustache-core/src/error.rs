// MIT License
//
// Copyright (c) 2024 Jerome Johnson
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! Error types for template compilation and rendering
//!
//! Compilation and rendering fail in different ways, so each has its own type.
//! Neither carries a line or column; syntax errors quote a short snippet of the
//! source around the failure instead.

use std::io;

use thiserror::Error;

/// Returns the last 32 bytes of the source for error context
pub(crate) fn rcap(src: &[u8]) -> String {
    static CAP_AT: usize = 32;

    let tail = if src.len() > CAP_AT {
        &src[src.len() - CAP_AT..]
    } else {
        src
    };
    String::from_utf8_lossy(tail).into_owned()
}

/// Error raised while compiling a template
///
/// Compilation is all or nothing: when one of these is returned no template exists.
#[derive(Debug, Error)]
pub enum SyntaxError {
    /// An unexpected byte inside a tag
    #[error("malformed tag near \"{near}\"")]
    MalformedTag { near: String },

    /// The source ended inside a tag
    #[error("unterminated tag near \"{near}\"")]
    UnterminatedTag { near: String },

    /// A section or inverted section was never closed
    #[error("unterminated section \"{key}\"")]
    UnterminatedSection { key: String },

    /// A closing tag names a different block than the one it closes
    #[error("section \"{open}\" closed by \"{close}\"")]
    MismatchedClose { open: String, close: String },

    /// A closing tag with no open block
    #[error("unexpected closing tag \"{key}\"")]
    UnexpectedClose { key: String },

    /// A partial could not be read or compiled
    #[error("partial \"{path}\": {source}")]
    Partial {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Sections and partials nest deeper than the configured limit
    #[error("nesting exceeds the limit of {limit}")]
    TooDeep { limit: usize },
}

impl SyntaxError {
    pub(crate) fn malformed(consumed: &[u8]) -> Self {
        Self::MalformedTag {
            near: rcap(consumed),
        }
    }

    pub(crate) fn unterminated(consumed: &[u8]) -> Self {
        Self::UnterminatedTag {
            near: rcap(consumed),
        }
    }

    pub(crate) fn partial_io(path: &str, err: io::Error) -> Self {
        Self::Partial {
            path: path.to_string(),
            source: Box::new(err),
        }
    }

    pub(crate) fn partial_nested(path: &str, err: SyntaxError) -> Self {
        match err {
            // depth is a property of the whole compilation, not of the partial
            Self::TooDeep { limit } => Self::TooDeep { limit },
            err => Self::Partial {
                path: path.to_string(),
                source: Box::new(err),
            },
        }
    }
}

/// Error raised while rendering a compiled template
///
/// A failed render never reaches the output sink.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A value tag resolved to something with no textual form
    #[error("unsupported type {found} for \"{key}\"")]
    UnsupportedType { key: String, found: &'static str },

    /// The data handed to render matches no adapter
    #[error("unsupported data of type {found}")]
    UnsupportedData { found: &'static str },
}

/// Result type for template compilation
pub type Result<T> = std::result::Result<T, SyntaxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rcap_keeps_short_input() {
        assert_eq!(rcap(b"{{#a}}"), "{{#a}}");
    }

    #[test]
    fn rcap_cuts_to_tail() {
        let src = [b'x'; 40];
        assert_eq!(rcap(&src).len(), 32);
    }

    #[test]
    fn nested_depth_error_is_not_wrapped() {
        let err = SyntaxError::partial_nested("a", SyntaxError::TooDeep { limit: 3 });
        assert!(matches!(err, SyntaxError::TooDeep { limit: 3 }));
    }

    #[test]
    fn partial_error_mentions_path() {
        let err = SyntaxError::partial_io(
            "header",
            io::Error::new(io::ErrorKind::NotFound, "missing"),
        );
        assert_eq!(err.to_string(), "partial \"header\": missing");
    }
}
