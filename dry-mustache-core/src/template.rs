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

//! Compiled templates
//!
//! A [`Template`] is the immutable result of compilation: the source bytes plus
//! a flat list of [`Token`]s. Sections and partials own their nested template,
//! so a compiled template is a tree that can be shared freely between threads
//! and rendered concurrently.
//!
//! # Examples
//!
//! ```rust
//! use std::collections::HashMap;
//! use dry_mustache_core::Template;
//!
//! let template = Template::compile(b"<p>{{name}}</p>", ".").unwrap();
//! let data = HashMap::from([("name".to_string(), "Panda".to_string())]);
//! assert_eq!(template.render_to_string(&data).unwrap(), "<p>Panda</p>");
//! ```

use std::{fmt, path::Path};

use crate::{
    error::{RenderError, Result},
    lexer,
    loader::{FsLoader, PartialLoader},
    options::Options,
    render,
    value::ToValue,
};

/// One compiled instruction
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Bytes `start..end` of the owning template's source, copied verbatim
    Literal { start: usize, end: usize },
    /// `{{key}}` when `escape` is set, `{{{key}}}` otherwise
    Value { key: String, escape: bool },
    /// `{{#key}}...{{/key}}`
    Section { key: String, body: Template },
    /// `{{^key}}...{{/key}}`
    InvertedSection { key: String, body: Template },
    /// `{{>path}}`, resolved at compile time and rendered against `"."`
    Partial { path: String, body: Template },
}

/// A parsed template
#[derive(Clone, PartialEq)]
pub struct Template {
    pub(crate) source: Box<[u8]>,
    pub(crate) tokens: Vec<Token>,
    pub(crate) options: Options,
}

impl Template {
    /// Compiles `src`, reading partials from files under `base`
    pub fn compile(src: impl AsRef<[u8]>, base: impl AsRef<Path>) -> Result<Self> {
        Self::compile_with(src, &FsLoader::new(base), Options::default())
    }

    /// Compiles `src` with an explicit partial loader and options
    pub fn compile_with(
        src: impl AsRef<[u8]>,
        loader: &dyn PartialLoader,
        options: Options,
    ) -> Result<Self> {
        let template = lexer::compile(src.as_ref(), loader, options, 0)?;
        tracing::debug!(
            bytes = template.source.len(),
            tokens = template.tokens.len(),
            "compiled template"
        );
        Ok(template)
    }

    /// Renders against `data`, handing the complete output to `sink` once
    ///
    /// On error the sink is never called and any partial output is discarded.
    pub fn render<D, F>(&self, data: &D, sink: F) -> std::result::Result<(), RenderError>
    where
        D: ToValue + ?Sized,
        F: FnOnce(&[u8]),
    {
        render::render(self, data.to_value(), sink)
    }

    /// Renders into a fresh byte vector
    pub fn render_to_vec<D: ToValue + ?Sized>(
        &self,
        data: &D,
    ) -> std::result::Result<Vec<u8>, RenderError> {
        let mut out = Vec::new();
        self.render(data, |bytes| out.extend_from_slice(bytes))?;
        Ok(out)
    }

    /// Renders into a string, replacing invalid UTF-8 sequences
    pub fn render_to_string<D: ToValue + ?Sized>(
        &self,
        data: &D,
    ) -> std::result::Result<String, RenderError> {
        let mut out = String::new();
        self.render(data, |bytes| out.push_str(&String::from_utf8_lossy(bytes)))?;
        Ok(out)
    }

    /// The bytes this template was compiled from
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn options(&self) -> Options {
        self.options
    }

    /// Bytes of a literal token
    pub(crate) fn literal(&self, start: usize, end: usize) -> &[u8] {
        &self.source[start..end]
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("source", &String::from_utf8_lossy(&self.source))
            .field("tokens", &self.tokens)
            .finish()
    }
}
