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

//! Template tokenizer
//!
//! A byte oriented state machine that turns template source into a flat list of
//! [`Token`]s. Literal text is recorded as byte ranges into the source, tags are
//! parsed one byte at a time, and block bodies are located with the section
//! matcher and compiled recursively into their own [`Template`].
//!
//! # Tags
//!
//! - `{{key}}` escaped value
//! - `{{{key}}}` raw value
//! - `{{#key}}...{{/key}}` section
//! - `{{^key}}...{{/key}}` inverted section
//! - `{{>path}}` partial, loaded and compiled immediately
//!
//! Whitespace between the delimiters and the key is ignored. A `{` that does not
//! start a tag is plain text.

use crate::{
    error::{Result, SyntaxError},
    loader::PartialLoader,
    options::Options,
    section::find_section_end,
    template::{Template, Token},
};

#[inline]
pub(crate) fn is_whitespace(b: u8) -> bool {
    b == b' ' || b == b'\n' || b == b'\t'
}

/// Bytes a key may start with
#[inline]
pub(crate) fn is_key_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'.'
}

/// Bytes a key may contain
#[inline]
pub(crate) fn is_key_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b'.'
}

/// Bytes a partial path may contain
#[inline]
pub(crate) fn is_path_byte(b: u8) -> bool {
    is_key_byte(b) || b == b'/'
}

/// Kind of tag being parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Value,
    Raw,
    Section,
    Inverted,
    Partial,
}

impl Tag {
    fn accepts(self, b: u8) -> bool {
        match self {
            Tag::Partial => is_path_byte(b),
            _ => is_key_byte(b),
        }
    }

    fn starts(self, b: u8) -> bool {
        match self {
            Tag::Partial => is_path_byte(b),
            _ => is_key_start(b),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Plain text
    Literal,
    /// One `{` seen
    Open,
    /// `{{` seen, waiting for the byte that selects the tag kind
    Dispatch,
    /// Whitespace before the key
    KeyStart(Tag),
    Key(Tag),
    /// Whitespace after the key
    KeyEnd(Tag),
    /// First `}` seen
    Closing(Tag),
    /// `}}` of a raw value seen, waiting for the third
    RawClosing,
}

struct Lexer<'a> {
    src: &'a [u8],
    loader: &'a dyn PartialLoader,
    options: Options,
    depth: usize,

    idx: usize,
    /// Start of the pending literal
    start: usize,
    /// Offset of the `{{` of the current tag
    tag_start: usize,
    key_start: usize,
    key_end: usize,
    tokens: Vec<Token>,
}

/// Compiles `src` at nesting `depth`
pub(crate) fn compile(
    src: &[u8],
    loader: &dyn PartialLoader,
    options: Options,
    depth: usize,
) -> Result<Template> {
    if depth > options.max_depth {
        return Err(SyntaxError::TooDeep {
            limit: options.max_depth,
        });
    }
    Lexer {
        src,
        loader,
        options,
        depth,
        idx: 0,
        start: 0,
        tag_start: 0,
        key_start: 0,
        key_end: 0,
        tokens: Vec::new(),
    }
    .run()
}

impl<'a> Lexer<'a> {
    fn run(mut self) -> Result<Template> {
        let mut state = State::Literal;
        while self.idx < self.src.len() {
            let b = self.src[self.idx];
            self.idx += 1;
            state = self.step(state, b)?;
        }

        match state {
            State::Literal | State::Open => self.flush(self.src.len()),
            _ => return Err(SyntaxError::unterminated(self.src)),
        }

        Ok(Template {
            source: self.src.into(),
            tokens: self.tokens,
            options: self.options,
        })
    }

    /// Advances the state machine by one byte; `self.idx` already points past `b`
    fn step(&mut self, state: State, b: u8) -> Result<State> {
        Ok(match state {
            State::Literal if b == b'{' => {
                self.tag_start = self.idx - 1;
                State::Open
            }
            State::Literal => State::Literal,
            State::Open if b == b'{' => {
                self.flush(self.tag_start);
                State::Dispatch
            }
            State::Open => State::Literal,
            State::Dispatch => match b {
                b'{' => State::KeyStart(Tag::Raw),
                b'#' => State::KeyStart(Tag::Section),
                b'^' => State::KeyStart(Tag::Inverted),
                b'>' => State::KeyStart(Tag::Partial),
                b'/' => {
                    return Err(SyntaxError::UnexpectedClose {
                        key: close_key(&self.src[self.idx..]),
                    });
                }
                _ if is_whitespace(b) => State::Dispatch,
                _ if is_key_start(b) => self.begin_key(Tag::Value),
                _ => return Err(self.malformed()),
            },
            State::KeyStart(tag) => {
                if is_whitespace(b) {
                    state
                } else if tag.starts(b) {
                    self.begin_key(tag)
                } else {
                    return Err(self.malformed());
                }
            }
            State::Key(tag) => {
                if tag.accepts(b) {
                    state
                } else if is_whitespace(b) {
                    self.key_end = self.idx - 1;
                    State::KeyEnd(tag)
                } else if b == b'}' {
                    self.key_end = self.idx - 1;
                    State::Closing(tag)
                } else {
                    return Err(self.malformed());
                }
            }
            State::KeyEnd(tag) => match b {
                b'}' => State::Closing(tag),
                _ if is_whitespace(b) => state,
                _ => return Err(self.malformed()),
            },
            State::Closing(tag) if b == b'}' => match tag {
                Tag::Raw => State::RawClosing,
                Tag::Value => self.value(true),
                Tag::Section | Tag::Inverted => self.block(tag)?,
                Tag::Partial => self.partial()?,
            },
            State::RawClosing if b == b'}' => self.value(false),
            State::Closing(_) | State::RawClosing => return Err(self.malformed()),
        })
    }

    fn begin_key(&mut self, tag: Tag) -> State {
        self.key_start = self.idx - 1;
        State::Key(tag)
    }

    fn key(&self) -> String {
        String::from_utf8_lossy(&self.src[self.key_start..self.key_end]).into_owned()
    }

    fn malformed(&self) -> SyntaxError {
        SyntaxError::malformed(&self.src[..self.idx])
    }

    /// Emits the literal running up to `end`, if any
    fn flush(&mut self, end: usize) {
        if end > self.start {
            self.tokens.push(Token::Literal {
                start: self.start,
                end,
            });
        }
    }

    /// Closes the current tag and resumes literal scanning at `self.idx`
    fn resume(&mut self, token: Token) -> State {
        self.tokens.push(token);
        self.start = self.idx;
        State::Literal
    }

    fn value(&mut self, escape: bool) -> State {
        let key = self.key();
        self.resume(Token::Value { key, escape })
    }

    fn block(&mut self, tag: Tag) -> Result<State> {
        let key = self.key();
        let rest = &self.src[self.idx..];
        let end = find_section_end(rest, &key)?;
        let body = compile(
            &rest[..end.body],
            self.loader,
            self.options,
            self.depth + 1,
        )?;
        tracing::trace!(key = %key, body = end.body, "compiled block");
        self.idx += end.consumed;
        Ok(self.resume(match tag {
            Tag::Inverted => Token::InvertedSection { key, body },
            _ => Token::Section { key, body },
        }))
    }

    fn partial(&mut self) -> Result<State> {
        let path = self.key();
        if path.starts_with('/') || path.split('/').any(|segment| segment == "..") {
            return Err(SyntaxError::Partial {
                path,
                source: "partial paths must be relative".into(),
            });
        }
        let bytes = self
            .loader
            .load(&path)
            .map_err(|err| SyntaxError::partial_io(&path, err))?;
        tracing::debug!(path = %path, bytes = bytes.len(), "loaded partial");
        let body = compile(&bytes, self.loader, self.options, self.depth + 1)
            .map_err(|err| SyntaxError::partial_nested(&path, err))?;
        Ok(self.resume(Token::Partial { path, body }))
    }
}

/// Key of a stray closing tag, for the error message
fn close_key(rest: &[u8]) -> String {
    let end = rest.iter().position(|&b| b == b'}').unwrap_or(rest.len());
    String::from_utf8_lossy(&rest[..end]).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::MemoryLoader;

    fn lex(src: &str) -> Result<Template> {
        let loader = MemoryLoader::new()
            .with("header", "Hi")
            .with("nested/footer", "by {{>header}}")
            .with("self", "{{>self}}");
        compile(src.as_bytes(), &loader, Options::default(), 0)
    }

    fn tokens(src: &str) -> Vec<Token> {
        lex(src).unwrap().tokens
    }

    fn value(key: &str, escape: bool) -> Token {
        Token::Value {
            key: key.to_string(),
            escape,
        }
    }

    #[test]
    fn literal_only() {
        assert_eq!(tokens("<p>hello</p>"), vec![Token::Literal { start: 0, end: 12 }]);
    }

    #[test]
    fn empty_source() {
        assert!(tokens("").is_empty());
    }

    #[test]
    fn values() {
        assert_eq!(
            tokens("<p>{{ name }}</p>"),
            vec![
                Token::Literal { start: 0, end: 3 },
                value("name", true),
                Token::Literal { start: 13, end: 17 },
            ]
        );
    }

    #[test]
    fn raw_value() {
        assert_eq!(tokens("{{{ html }}}"), vec![value("html", false)]);
        assert_eq!(tokens("{{{html}}}"), vec![value("html", false)]);
    }

    #[test]
    fn adjacent_tags() {
        assert_eq!(tokens("{{a}}{{b}}"), vec![value("a", true), value("b", true)]);
    }

    #[test]
    fn key_characters() {
        assert_eq!(tokens("{{user_name-2}}"), vec![value("user_name-2", true)]);
        assert_eq!(tokens("{{.}}"), vec![value(".", true)]);
    }

    #[test]
    fn lone_braces_are_text() {
        assert_eq!(
            tokens("if (x) { y } {"),
            vec![Token::Literal { start: 0, end: 14 }]
        );
        assert_eq!(tokens("a{b{{c}}").len(), 2);
    }

    #[test]
    fn section_body_is_nested() {
        let toks = tokens("<ul>{{#users}}<li>{{name}}</li>{{/users}}</ul>");
        assert_eq!(toks.len(), 3);
        match &toks[1] {
            Token::Section { key, body } => {
                assert_eq!(key, "users");
                assert_eq!(body.source(), b"<li>{{name}}</li>");
                assert_eq!(body.tokens().len(), 3);
            }
            other => panic!("expected section, got {:?}", other),
        }
        assert_eq!(toks[2], Token::Literal { start: 41, end: 46 });
    }

    #[test]
    fn inverted_section() {
        let toks = tokens("{{^ items }}none{{/ items }}");
        assert!(matches!(&toks[0], Token::InvertedSection { key, .. } if key == "items"));
    }

    #[test]
    fn nested_sections_compile() {
        assert!(lex("{{#a}}{{#b}}{{/b}}{{/a}}").is_ok());
        assert!(lex("{{#a}}{{^a}}{{/a}}{{/a}}").is_ok());
    }

    #[test]
    fn wrong_close_fails() {
        assert!(matches!(
            lex("{{#a}}{{/b}}").unwrap_err(),
            SyntaxError::MismatchedClose { .. }
        ));
        assert!(matches!(
            lex("{{#a}}{{#b}}{{/c}}{{/a}}").unwrap_err(),
            SyntaxError::MismatchedClose { .. }
        ));
    }

    #[test]
    fn unterminated_section() {
        assert!(matches!(
            lex("{{#a}}x").unwrap_err(),
            SyntaxError::UnterminatedSection { key } if key == "a"
        ));
    }

    #[test]
    fn stray_close() {
        assert!(matches!(
            lex("x{{/ a }}").unwrap_err(),
            SyntaxError::UnexpectedClose { key } if key == "a"
        ));
    }

    #[test]
    fn malformed_tags() {
        for src in ["{{ 1a }}", "{{a b}}", "{{a}x", "{{#}}", "{{&a}}", "{{a!}}"] {
            assert!(
                matches!(lex(src).unwrap_err(), SyntaxError::MalformedTag { .. }),
                "{src}"
            );
        }
    }

    #[test]
    fn unterminated_tags() {
        for src in ["{{", "{{a", "{{a}", "{{{a}}", "{{#a"] {
            assert!(
                matches!(lex(src).unwrap_err(), SyntaxError::UnterminatedTag { .. }),
                "{src}"
            );
        }
    }

    #[test]
    fn partials_are_inlined() {
        let toks = tokens("{{> header }}!");
        match &toks[0] {
            Token::Partial { path, body } => {
                assert_eq!(path, "header");
                assert_eq!(body.source(), b"Hi");
            }
            other => panic!("expected partial, got {:?}", other),
        }
    }

    #[test]
    fn partials_may_include_partials() {
        assert!(lex("{{>nested/footer}}").is_ok());
    }

    #[test]
    fn missing_partial_fails() {
        assert!(matches!(
            lex("{{>nope}}").unwrap_err(),
            SyntaxError::Partial { path, .. } if path == "nope"
        ));
    }

    #[test]
    fn escaping_partial_paths_fail() {
        assert!(matches!(lex("{{>../x}}").unwrap_err(), SyntaxError::Partial { .. }));
        assert!(matches!(lex("{{>/etc/x}}").unwrap_err(), SyntaxError::Partial { .. }));
    }

    #[test]
    fn recursive_partial_is_bounded() {
        assert!(matches!(lex("{{>self}}").unwrap_err(), SyntaxError::TooDeep { .. }));
    }

    #[test]
    fn depth_limit() {
        let options = Options::default().with_max_depth(1);
        let loader = MemoryLoader::new();
        assert!(compile(b"{{#a}}{{/a}}", &loader, options, 0).is_ok());
        assert!(matches!(
            compile(b"{{#a}}{{#b}}{{/b}}{{/a}}", &loader, options, 0).unwrap_err(),
            SyntaxError::TooDeep { limit: 1 }
        ));
    }
}
