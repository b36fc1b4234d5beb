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

//! Mustache template compiler and renderer
//!
//! This crate provides the core of `dry-mustache`: a byte oriented tokenizer that
//! compiles template source into an immutable [`Template`], and an interpreter
//! that renders a template against dynamically typed data.
//!
//! # Features
//!
//! - `{{name}}` escaped values and `{{{name}}}` raw values
//! - `{{#name}}...{{/name}}` sections over booleans, lists, objects and scalars
//! - `{{^name}}...{{/name}}` inverted sections
//! - `{{>path}}` partials, inlined at compile time
//! - `{{.}}` for the current subject, e.g. elements of a list of strings
//! - pooled output buffers
//! - `serde_json` values as data, with the `json` feature
//!
//! # Example
//!
//! ```rust
//! use dry_mustache_core::{Data, Template};
//!
//! let template = Template::compile(
//!     "<ul>{{#users}}<li>{{name}}</li>{{/users}}</ul>",
//!     "templates/",
//! ).unwrap();
//!
//! let users = Data::List(vec![
//!     [("name", "A")].into_iter().collect(),
//!     [("name", "B")].into_iter().collect(),
//! ]);
//! let data: Data = [("users", users)].into_iter().collect();
//!
//! assert_eq!(
//!     template.render_to_string(&data).unwrap(),
//!     "<ul><li>A</li><li>B</li></ul>"
//! );
//! ```
//!
//! # Module Structure
//!
//! - `lexer.rs`: tokenizer state machine
//! - `section.rs`: block boundary matching
//! - `template.rs`: compiled templates and tokens
//! - `render.rs`: the interpreter
//! - `adapter.rs`: data adapters
//! - `value.rs`: dynamic values
//! - `escape.rs`: HTML escaping
//! - `loader.rs`: partial loaders
//! - `pool.rs`: output buffer pool
//! - `options.rs`: compiler options
//! - `error.rs`: error types

mod adapter;
mod error;
mod escape;
mod lexer;
mod loader;
mod options;
pub mod pool;
mod render;
mod section;
mod template;
mod value;

pub use adapter::{Mustache, Scalar};
pub use error::{RenderError, Result, SyntaxError};
pub use escape::escape;
pub use loader::{FsLoader, MemoryLoader, PartialLoader};
pub use options::{DEFAULT_CAPACITY_FACTOR, DEFAULT_MAX_DEPTH, Options};
pub use pool::BufferPool;
pub use render::Frame;
pub use template::{Template, Token};
pub use value::{Data, Sequence, ToValue, Value};

/// Compiles `src`, resolving partials relative to `base`
pub fn compile(src: impl AsRef<[u8]>, base: impl AsRef<std::path::Path>) -> Result<Template> {
    Template::compile(src, base)
}

/// Renders `template` against `data`, passing the output to `sink` on success
pub fn render<D, F>(template: &Template, data: &D, sink: F) -> std::result::Result<(), RenderError>
where
    D: ToValue + ?Sized,
    F: FnOnce(&[u8]),
{
    template.render(data, sink)
}
