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

//! Data adapters
//!
//! A value with named fields takes part in rendering by implementing
//! [`Mustache`]. The renderer hands the adapter a [`Frame`]; the adapter answers
//! by installing a lookup callback with [`Frame::for_each`], which renders the
//! frame on the spot. The frame is consumed by that call, so a callback can be
//! installed at most once.
//!
//! Adapters are provided for string keyed `HashMap`s and `BTreeMap`s of any
//! [`ToValue`] (which covers maps of strings, of byte vectors and of [`Data`]),
//! for [`Scalar`] values that only answer `"."`, and with the `json` feature for
//! `serde_json` objects.
//!
//! # Examples
//!
//! ```rust
//! use dry_mustache_core::{Frame, Mustache, RenderError, Template, ToValue, Value};
//!
//! struct User {
//!     name: String,
//!     admin: bool,
//! }
//!
//! impl Mustache for User {
//!     fn marshal<'s>(&'s self, frame: Frame<'_, 's>) -> Result<(), RenderError> {
//!         frame.for_each(|key| match key {
//!             "name" => self.name.to_value(),
//!             "admin" => Value::Bool(self.admin),
//!             _ => Value::Null,
//!         })
//!     }
//! }
//!
//! impl ToValue for User {
//!     fn to_value(&self) -> Value<'_> {
//!         Value::Object(self)
//!     }
//! }
//!
//! let template = Template::compile("{{name}}{{#admin}} (admin){{/admin}}", ".").unwrap();
//! let user = User { name: "Panda".into(), admin: true };
//! assert_eq!(template.render_to_string(&user).unwrap(), "Panda (admin)");
//! ```
//!
//! [`Data`]: crate::Data

use std::{
    borrow::Borrow,
    collections::{BTreeMap, HashMap},
    hash::{BuildHasher, Hash},
};

use crate::{
    error::RenderError,
    render::Frame,
    value::{ToValue, Value},
};

/// Something that exposes named fields to a template
pub trait Mustache {
    /// Renders `frame` by installing a lookup for this value's fields
    fn marshal<'s>(&'s self, frame: Frame<'_, 's>) -> Result<(), RenderError>;

    /// Empty values are falsy in sections
    fn is_empty(&self) -> bool {
        false
    }
}

/// Wrapper that exposes a single value under `"."`
///
/// Used for list elements and section values that have no fields of their own.
#[derive(Debug, Clone, Copy)]
pub struct Scalar<'a>(pub Value<'a>);

impl Mustache for Scalar<'_> {
    fn marshal<'s>(&'s self, frame: Frame<'_, 's>) -> Result<(), RenderError> {
        // "." is answered from the subject, which is the wrapped value itself
        frame.rebind(self.0).for_each(|_| Value::Null)
    }
}

impl ToValue for Scalar<'_> {
    fn to_value(&self) -> Value<'_> {
        Value::Object(self)
    }
}

impl<K, V, S> Mustache for HashMap<K, V, S>
where
    K: Borrow<str> + Hash + Eq,
    V: ToValue,
    S: BuildHasher,
{
    fn marshal<'s>(&'s self, frame: Frame<'_, 's>) -> Result<(), RenderError> {
        frame.for_each(|key| self.get(key).map_or(Value::Null, |value| value.to_value()))
    }

    fn is_empty(&self) -> bool {
        HashMap::is_empty(self)
    }
}

impl<K, V, S> ToValue for HashMap<K, V, S>
where
    K: Borrow<str> + Hash + Eq,
    V: ToValue,
    S: BuildHasher,
{
    fn to_value(&self) -> Value<'_> {
        Value::Object(self)
    }
}

impl<K, V> Mustache for BTreeMap<K, V>
where
    K: Borrow<str> + Ord,
    V: ToValue,
{
    fn marshal<'s>(&'s self, frame: Frame<'_, 's>) -> Result<(), RenderError> {
        frame.for_each(|key| self.get(key).map_or(Value::Null, |value| value.to_value()))
    }

    fn is_empty(&self) -> bool {
        BTreeMap::is_empty(self)
    }
}

impl<K, V> ToValue for BTreeMap<K, V>
where
    K: Borrow<str> + Ord,
    V: ToValue,
{
    fn to_value(&self) -> Value<'_> {
        Value::Object(self)
    }
}

impl<'a> ToValue for dyn Mustache + 'a {
    fn to_value(&self) -> Value<'_> {
        Value::Object(self)
    }
}

impl<'a> ToValue for dyn Mustache + Send + Sync + 'a {
    fn to_value(&self) -> Value<'_> {
        Value::Object(self)
    }
}

#[cfg(feature = "json")]
mod json {
    use super::*;

    impl ToValue for serde_json::Value {
        fn to_value(&self) -> Value<'_> {
            match self {
                serde_json::Value::Null => Value::Null,
                serde_json::Value::Bool(b) => Value::Bool(*b),
                serde_json::Value::Number(n) => {
                    if let Some(n) = n.as_i64() {
                        Value::Int(n)
                    } else if let Some(n) = n.as_u64() {
                        Value::UInt(n)
                    } else {
                        n.as_f64().map_or(Value::Null, Value::Float)
                    }
                }
                serde_json::Value::String(s) => Value::Str(s),
                serde_json::Value::Array(items) => Value::List(items),
                serde_json::Value::Object(map) => Value::Object(map),
            }
        }
    }

    impl Mustache for serde_json::Map<String, serde_json::Value> {
        fn marshal<'s>(&'s self, frame: Frame<'_, 's>) -> Result<(), RenderError> {
            frame.for_each(|key| self.get(key).map_or(Value::Null, |value| value.to_value()))
        }

        fn is_empty(&self) -> bool {
            serde_json::Map::is_empty(self)
        }
    }

    impl ToValue for serde_json::Map<String, serde_json::Value> {
        fn to_value(&self) -> Value<'_> {
            Value::Object(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{Data, Template};

    fn render<D: ToValue + ?Sized>(src: &str, data: &D) -> String {
        Template::compile(src, ".")
            .unwrap()
            .render_to_string(data)
            .unwrap()
    }

    struct Point {
        x: i32,
        y: i32,
    }

    impl Mustache for Point {
        fn marshal<'s>(&'s self, frame: Frame<'_, 's>) -> Result<(), RenderError> {
            frame.for_each(|key| match key {
                "x" => self.x.to_value(),
                "y" => self.y.to_value(),
                _ => Value::Null,
            })
        }
    }

    impl ToValue for Point {
        fn to_value(&self) -> Value<'_> {
            Value::Object(self)
        }
    }

    /// Never installs a lookup, so renders nothing
    struct Silent;

    impl Mustache for Silent {
        fn marshal<'s>(&'s self, _frame: Frame<'_, 's>) -> Result<(), RenderError> {
            Ok(())
        }
    }

    #[test]
    fn string_map() {
        let data = HashMap::from([("name".to_string(), "Panda".to_string())]);
        assert_eq!(render("<p>{{name}}</p>", &data), "<p>Panda</p>");
    }

    #[test]
    fn str_keyed_map() {
        let data = HashMap::from([("name", "Panda")]);
        assert_eq!(render("{{name}}{{missing}}", &data), "Panda");
    }

    #[test]
    fn bytes_map() {
        let data = HashMap::from([("raw".to_string(), b"<b>".to_vec())]);
        assert_eq!(render("{{raw}} {{{raw}}}", &data), "&lt;b&gt; <b>");
    }

    #[test]
    fn btree_map() {
        let data = BTreeMap::from([("n".to_string(), 1.25f64)]);
        assert_eq!(render("{{n}}", &data), "1.25");
    }

    #[test]
    fn user_adapter() {
        assert_eq!(render("({{x}}, {{y}})", &Point { x: 1, y: -2 }), "(1, -2)");
    }

    #[test]
    fn adapter_inside_data() {
        let data: Data = [("p", Data::object(Point { x: 3, y: 4 }))]
            .into_iter()
            .collect();
        assert_eq!(render("{{#p}}{{x}}:{{y}}{{/p}}", &data), "3:4");
    }

    #[test]
    fn adapter_behind_arc() {
        let point: Arc<dyn Mustache + Send + Sync> = Arc::new(Point { x: 5, y: 6 });
        assert_eq!(render("{{x}}{{y}}", &point), "56");
    }

    #[test]
    fn adapter_without_lookup_renders_nothing() {
        let silent: &dyn Mustache = &Silent;
        assert_eq!(render("text {{x}}", silent), "");
    }

    #[test]
    fn scalar_answers_dot_only() {
        let data = HashMap::from([("items", vec!["a", "b"])]);
        assert_eq!(render("{{#items}}[{{.}}{{other}}]{{/items}}", &data), "[a][b]");
    }

    #[test]
    fn empty_maps_are_falsy() {
        let empty: HashMap<String, String> = HashMap::new();
        let data = HashMap::from([("m", Data::Map(HashMap::new()))]);
        assert!(Mustache::is_empty(&empty));
        assert_eq!(render("{{#m}}yes{{/m}}{{^m}}no{{/m}}", &data), "no");
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_values() {
        let data = serde_json::json!({
            "title": "Hello world!",
            "count": 3,
            "ratio": 0.5,
            "tags": ["a", "b"],
            "basic": { "errMsg": "Oh gosh" },
        });
        assert_eq!(
            render(
                "{{title}} {{count}} {{ratio}} {{#tags}}{{.}}{{/tags}} {{#basic}}{{errMsg}}{{/basic}}",
                &data
            ),
            "Hello world! 3 0.5 ab Oh gosh"
        );
    }
}
