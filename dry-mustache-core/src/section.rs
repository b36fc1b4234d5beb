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

//! Section boundary matching
//!
//! When the lexer meets `{{#key}}` or `{{^key}}` it hands the bytes that follow
//! to [`find_section_end`], which finds where the block body stops and where
//! scanning resumes. Opening tags of either kind raise the nesting level and
//! every well formed closing tag lowers it; the tag that brings the level back
//! to zero closes the block and must carry the same key.

use crate::{
    error::{Result, SyntaxError},
    lexer::{is_key_byte, is_whitespace},
};

/// Where a block body ends within the scanned bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SectionEnd {
    /// Length of the body, up to the `{{` of the closing tag
    pub body: usize,
    /// Bytes consumed including the closing tag
    pub consumed: usize,
}

#[derive(Debug, Clone, Copy)]
enum Scan {
    Text,
    Brace,
    Marker,
    CloseStart,
    CloseKey,
    CloseEnd,
    Closing,
}

/// Finds the end of the block opened by `key` in `src`
pub(crate) fn find_section_end(src: &[u8], key: &str) -> Result<SectionEnd> {
    let mut state = Scan::Text;
    let mut level = 1usize;
    let mut tag_start = 0;
    let mut key_start = 0;
    let mut key_end = 0;

    for (i, &b) in src.iter().enumerate() {
        state = match state {
            Scan::Text if b == b'{' => {
                tag_start = i;
                Scan::Brace
            }
            Scan::Text => Scan::Text,
            Scan::Brace if b == b'{' => Scan::Marker,
            Scan::Brace => Scan::Text,
            Scan::Marker => match b {
                b'#' | b'^' => {
                    level += 1;
                    Scan::Text
                }
                b'/' => Scan::CloseStart,
                _ if is_whitespace(b) => Scan::Marker,
                _ => Scan::Text,
            },
            Scan::CloseStart => {
                if is_key_byte(b) {
                    key_start = i;
                    Scan::CloseKey
                } else if is_whitespace(b) {
                    Scan::CloseStart
                } else {
                    Scan::Text
                }
            }
            Scan::CloseKey => {
                if is_key_byte(b) {
                    Scan::CloseKey
                } else if is_whitespace(b) {
                    key_end = i;
                    Scan::CloseEnd
                } else if b == b'}' {
                    key_end = i;
                    Scan::Closing
                } else {
                    Scan::Text
                }
            }
            Scan::CloseEnd => match b {
                b'}' => Scan::Closing,
                _ if is_whitespace(b) => Scan::CloseEnd,
                _ => Scan::Text,
            },
            Scan::Closing if b == b'}' => {
                level -= 1;
                if level == 0 {
                    let close = String::from_utf8_lossy(&src[key_start..key_end]);
                    if close != key {
                        return Err(SyntaxError::MismatchedClose {
                            open: key.to_string(),
                            close: close.into_owned(),
                        });
                    }
                    return Ok(SectionEnd {
                        body: tag_start,
                        consumed: i + 1,
                    });
                }
                Scan::Text
            }
            Scan::Closing => Scan::Text,
        };
    }

    Err(SyntaxError::UnterminatedSection {
        key: key.to_string(),
    })
}
