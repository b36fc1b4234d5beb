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

//! Template rendering
//!
//! Rendering walks a compiled template's tokens against the current subject.
//! Literals are copied, values are looked up and written (escaped unless the
//! tag was a triple mustache), and sections recurse into their nested template
//! once per subject they resolve to. All output of one render goes into a
//! single pooled buffer, handed to the caller's sink only when the whole render
//! succeeded.
//!
//! # Sections
//!
//! - `true` renders the body once against the enclosing subject
//! - a list renders the body once per element, each element as the subject
//! - an object or any other truthy value renders the body once with it as subject
//! - falsy values render nothing
//!
//! Inverted sections render their body against the enclosing subject exactly
//! when the value is falsy. Partials always render against the current subject.

use crate::{
    adapter::{Mustache, Scalar},
    error::RenderError,
    escape::escape_into,
    pool,
    template::{Template, Token},
    value::Value,
};

/// A pending render of one template against one subject
///
/// Handed to [`Mustache::marshal`]; rendering happens when the adapter calls
/// [`Frame::for_each`].
pub struct Frame<'r, 's> {
    template: &'r Template,
    out: &'r mut Vec<u8>,
    subject: Value<'s>,
}

impl<'r, 's> Frame<'r, 's> {
    fn new(template: &'r Template, out: &'r mut Vec<u8>, subject: Value<'s>) -> Self {
        Self {
            template,
            out,
            subject,
        }
    }

    /// Installs `lookup` as this frame's field lookup and renders the frame
    ///
    /// `lookup` returns [`Value::Null`] for keys it does not know. The key `"."`
    /// never reaches it; it always means the subject itself.
    pub fn for_each<F>(self, lookup: F) -> Result<(), RenderError>
    where
        F: Fn(&str) -> Value<'s>,
    {
        let scope = Scope {
            lookup: &lookup,
            subject: self.subject,
        };
        walk(self.template, &scope, self.out)
    }

    /// Replaces the subject that `"."` resolves to
    pub(crate) fn rebind(self, subject: Value<'s>) -> Self {
        Self { subject, ..self }
    }

    /// The value being rendered against
    pub fn subject(&self) -> Value<'s> {
        self.subject
    }
}

/// Lookup state shared by every token of one frame
struct Scope<'l, 's> {
    lookup: &'l dyn Fn(&str) -> Value<'s>,
    subject: Value<'s>,
}

impl<'s> Scope<'_, 's> {
    fn resolve(&self, key: &str) -> Value<'s> {
        if key == "." {
            self.subject
        } else {
            (self.lookup)(key)
        }
    }
}

fn walk<'s>(template: &Template, scope: &Scope<'_, 's>, out: &mut Vec<u8>) -> Result<(), RenderError> {
    for token in &template.tokens {
        match token {
            Token::Literal { start, end } => out.extend_from_slice(template.literal(*start, *end)),
            Token::Value { key, escape } => {
                let text = scope
                    .resolve(key)
                    .text()
                    .map_err(|found| RenderError::UnsupportedType {
                        key: key.clone(),
                        found,
                    })?;
                if *escape {
                    escape_into(&text, out);
                } else {
                    out.extend_from_slice(&text);
                }
            }
            Token::Section { key, body } => match scope.resolve(key) {
                Value::Bool(true) => walk(body, scope, out)?,
                Value::List(seq) => {
                    tracing::trace!(key = %key, len = seq.len(), "section over list");
                    for index in 0..seq.len() {
                        enter(body, seq.item(index), out)?;
                    }
                }
                value if value.is_truthy() => enter(body, value, out)?,
                _ => {}
            },
            Token::InvertedSection { key, body } => {
                if !scope.resolve(key).is_truthy() {
                    walk(body, scope, out)?;
                }
            }
            Token::Partial { body, .. } => walk(body, scope, out)?,
        }
    }
    Ok(())
}

/// Renders `body` with `subject` as the new subject
fn enter(body: &Template, subject: Value<'_>, out: &mut Vec<u8>) -> Result<(), RenderError> {
    match subject {
        Value::Object(obj) => obj.marshal(Frame::new(body, out, subject)),
        _ => {
            let scalar = Scalar(subject);
            scalar.marshal(Frame::new(body, out, subject))
        }
    }
}

/// Renders `template` against top level `data`
pub(crate) fn render<F>(template: &Template, data: Value<'_>, sink: F) -> Result<(), RenderError>
where
    F: FnOnce(&[u8]),
{
    // reject unusable data before writing anything
    match data {
        Value::Object(_) => {}
        Value::List(seq) => {
            if let Some(item) = (0..seq.len())
                .map(|index| seq.item(index))
                .find(|item| !matches!(item, Value::Object(_)))
            {
                return Err(RenderError::UnsupportedData {
                    found: item.type_name(),
                });
            }
        }
        other => {
            return Err(RenderError::UnsupportedData {
                found: other.type_name(),
            });
        }
    }

    let mut buf = pool::global().take(template.options.capacity_for(template.source.len()));
    let result = match data {
        Value::List(seq) => (0..seq.len()).try_for_each(|index| enter(template, seq.item(index), &mut buf)),
        _ => enter(template, data, &mut buf),
    };

    match result {
        Ok(()) => {
            sink(&buf);
            Ok(())
        }
        Err(err) => {
            tracing::debug!(%err, discarded = buf.len(), "render aborted");
            Err(err)
        }
    }
}
