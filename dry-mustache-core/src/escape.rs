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

//! HTML escaping
//!
//! Replaces the five characters with special meaning in markup by entities.
//! Only escaped value tags go through here; literals and `{{{raw}}}` values are
//! written untouched.

use std::{borrow::Cow, sync::OnceLock};

use regex::bytes::{Captures, Regex};

static RESERVED: OnceLock<Regex> = OnceLock::new();

fn reserved() -> &'static Regex {
    RESERVED.get_or_init(|| Regex::new("[&<>\"']").expect("escape pattern is valid"))
}

/// Escapes markup characters, borrowing the input when nothing needs replacing
pub fn escape(content: &[u8]) -> Cow<'_, [u8]> {
    reserved().replace_all(content, |captures: &Captures| match &captures[0] {
        b"&" => &b"&amp;"[..],
        b"<" => &b"&lt;"[..],
        b">" => &b"&gt;"[..],
        b"\"" => &b"&#34;"[..],
        _ => &b"&#39;"[..],
    })
}

/// Escapes `content` straight into `out`
pub(crate) fn escape_into(content: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(&escape(content));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_tags() {
        assert_eq!(&*escape(b"<a>"), b"&lt;a&gt;");
    }

    #[test]
    fn escapes_quotes_and_ampersand() {
        assert_eq!(
            &*escape(br#"<script src="x.com/?a=1&b='2'"/>"#),
            &b"&lt;script src=&#34;x.com/?a=1&amp;b=&#39;2&#39;&#34;/&gt;"[..]
        );
    }

    #[test]
    fn borrows_clean_input() {
        assert!(matches!(escape(b"Panda"), Cow::Borrowed(_)));
    }

    #[test]
    fn appends_to_existing_output() {
        let mut out = b"x".to_vec();
        escape_into(b"&", &mut out);
        assert_eq!(out, b"x&amp;");
    }
}
