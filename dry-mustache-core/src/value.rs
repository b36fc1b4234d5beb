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

//! Dynamic values
//!
//! Rendering works on [`Value`], a borrowed view of whatever the caller passed
//! in. Host types take part by implementing [`ToValue`]; maps and user types
//! that expose named fields become [`Value::Object`] through the
//! [`Mustache`](crate::Mustache) trait, collections become [`Value::List`]
//! through [`Sequence`].
//!
//! [`Data`] is an owned dynamic value for callers that build their data at
//! runtime rather than from typed structs.

use std::{
    borrow::Cow,
    collections::HashMap,
    fmt,
    rc::Rc,
    sync::Arc,
};

use crate::adapter::Mustache;

/// A borrowed dynamic value
#[derive(Clone, Copy)]
pub enum Value<'a> {
    /// Absent, renders as nothing
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Float32(f32),
    Str(&'a str),
    Bytes(&'a [u8]),
    List(&'a dyn Sequence),
    /// Anything exposing named fields
    Object(&'a dyn Mustache),
}

impl<'a> Value<'a> {
    /// Whether a section over this value renders
    ///
    /// Absent, `false`, empty strings, empty maps and empty lists are falsy.
    /// Numbers are always truthy, zero included.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(_) | Value::UInt(_) | Value::Float(_) | Value::Float32(_) => true,
            Value::Str(s) => !s.is_empty(),
            Value::Bytes(b) => !b.is_empty(),
            Value::List(seq) => !seq.is_empty(),
            Value::Object(obj) => !obj.is_empty(),
        }
    }

    /// Human readable type name for errors
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) | Value::Float32(_) => "float",
            Value::Str(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Object(_) => "object",
        }
    }

    /// The text a value tag writes, or the type name when there is none
    ///
    /// Floats use the shortest representation that round trips, without an
    /// exponent.
    pub(crate) fn text(&self) -> Result<Cow<'a, [u8]>, &'static str> {
        Ok(match *self {
            Value::Null => Cow::Borrowed(&[][..]),
            Value::Bool(true) => Cow::Borrowed(&b"true"[..]),
            Value::Bool(false) => Cow::Borrowed(&b"false"[..]),
            Value::Int(n) => Cow::Owned(n.to_string().into_bytes()),
            Value::UInt(n) => Cow::Owned(n.to_string().into_bytes()),
            Value::Float(n) => Cow::Owned(n.to_string().into_bytes()),
            Value::Float32(n) => Cow::Owned(n.to_string().into_bytes()),
            Value::Str(s) => Cow::Borrowed(s.as_bytes()),
            Value::Bytes(b) => Cow::Borrowed(b),
            Value::List(_) | Value::Object(_) => return Err(self.type_name()),
        })
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Value::UInt(n) => f.debug_tuple("UInt").field(n).finish(),
            Value::Float(n) => f.debug_tuple("Float").field(n).finish(),
            Value::Float32(n) => f.debug_tuple("Float32").field(n).finish(),
            Value::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Value::Bytes(b) => f.debug_tuple("Bytes").field(b).finish(),
            Value::List(seq) => write!(f, "List(len={})", seq.len()),
            Value::Object(_) => f.write_str("Object"),
        }
    }
}

/// Conversion of host values into [`Value`]
pub trait ToValue {
    fn to_value(&self) -> Value<'_>;
}

/// An indexable list of values
pub trait Sequence {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index`, which is always below `len()`
    fn item(&self, index: usize) -> Value<'_>;
}

impl<T: ToValue> Sequence for Vec<T> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn item(&self, index: usize) -> Value<'_> {
        self[index].to_value()
    }
}

impl<T: ToValue, const N: usize> Sequence for [T; N] {
    fn len(&self) -> usize {
        N
    }

    fn item(&self, index: usize) -> Value<'_> {
        self[index].to_value()
    }
}

impl<T: ToValue> Sequence for &[T] {
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn item(&self, index: usize) -> Value<'_> {
        self[index].to_value()
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value<'_> {
        Value::List(self)
    }
}

impl<T: ToValue, const N: usize> ToValue for [T; N] {
    fn to_value(&self) -> Value<'_> {
        Value::List(self)
    }
}

// borrowed slices are lists, except `&[u8]` which the blanket `&T` impl
// treats as text
impl<T: ToValue> ToValue for &[T] {
    fn to_value(&self) -> Value<'_> {
        Value::List(self)
    }
}

// byte vectors are text, not lists of numbers
impl ToValue for Vec<u8> {
    fn to_value(&self) -> Value<'_> {
        Value::Bytes(self)
    }
}

impl ToValue for [u8] {
    fn to_value(&self) -> Value<'_> {
        Value::Bytes(self)
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value<'_> {
        Value::Str(self)
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value<'_> {
        Value::Str(self)
    }
}

impl ToValue for Cow<'_, str> {
    fn to_value(&self) -> Value<'_> {
        Value::Str(self)
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value<'_> {
        Value::Bool(*self)
    }
}

macro_rules! int_to_value {
    ($variant:ident, $wide:ty: $($t:ty),*) => {
        $(
            impl ToValue for $t {
                fn to_value(&self) -> Value<'_> {
                    Value::$variant(*self as $wide)
                }
            }
        )*
    };
}

int_to_value!(Int, i64: i8, i16, i32, i64, isize);
int_to_value!(UInt, u64: u16, u32, u64, usize);

impl ToValue for f64 {
    fn to_value(&self) -> Value<'_> {
        Value::Float(*self)
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Value<'_> {
        Value::Float32(*self)
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value<'_> {
        match self {
            Some(value) => value.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value<'_> {
        (**self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for Box<T> {
    fn to_value(&self) -> Value<'_> {
        (**self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for Rc<T> {
    fn to_value(&self) -> Value<'_> {
        (**self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for Arc<T> {
    fn to_value(&self) -> Value<'_> {
        (**self).to_value()
    }
}

impl ToValue for Value<'_> {
    fn to_value(&self) -> Value<'_> {
        *self
    }
}

/// An owned dynamic value
#[derive(Clone, Default)]
pub enum Data {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<Data>),
    Map(HashMap<String, Data>),
    Object(Arc<dyn Mustache + Send + Sync>),
}

impl Data {
    /// Wraps a user adapter
    pub fn object(adapter: impl Mustache + Send + Sync + 'static) -> Self {
        Data::Object(Arc::new(adapter))
    }
}

impl ToValue for Data {
    fn to_value(&self) -> Value<'_> {
        match self {
            Data::Null => Value::Null,
            Data::Bool(b) => Value::Bool(*b),
            Data::Int(n) => Value::Int(*n),
            Data::UInt(n) => Value::UInt(*n),
            Data::Float(n) => Value::Float(*n),
            Data::String(s) => Value::Str(s),
            Data::Bytes(b) => Value::Bytes(b),
            Data::List(list) => Value::List(list),
            Data::Map(map) => Value::Object(map),
            Data::Object(obj) => Value::Object(&**obj),
        }
    }
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Data::List(list) => f.debug_list().entries(list).finish(),
            Data::Map(map) => f.debug_map().entries(map).finish(),
            other => fmt::Debug::fmt(&other.to_value(), f),
        }
    }
}

impl From<bool> for Data {
    fn from(value: bool) -> Self {
        Data::Bool(value)
    }
}

impl From<i64> for Data {
    fn from(value: i64) -> Self {
        Data::Int(value)
    }
}

impl From<i32> for Data {
    fn from(value: i32) -> Self {
        Data::Int(value.into())
    }
}

impl From<u8> for Data {
    fn from(value: u8) -> Self {
        Data::UInt(value.into())
    }
}

impl From<u64> for Data {
    fn from(value: u64) -> Self {
        Data::UInt(value)
    }
}

impl From<f64> for Data {
    fn from(value: f64) -> Self {
        Data::Float(value)
    }
}

impl From<&str> for Data {
    fn from(value: &str) -> Self {
        Data::String(value.to_string())
    }
}

impl From<String> for Data {
    fn from(value: String) -> Self {
        Data::String(value)
    }
}

impl From<Vec<u8>> for Data {
    fn from(value: Vec<u8>) -> Self {
        Data::Bytes(value)
    }
}

impl From<Vec<Data>> for Data {
    fn from(value: Vec<Data>) -> Self {
        Data::List(value)
    }
}

impl From<HashMap<String, Data>> for Data {
    fn from(value: HashMap<String, Data>) -> Self {
        Data::Map(value)
    }
}

impl<T: Into<Data>> From<Option<T>> for Data {
    fn from(value: Option<T>) -> Self {
        value.map_or(Data::Null, Into::into)
    }
}

impl<K: Into<String>, V: Into<Data>> FromIterator<(K, V)> for Data {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Data::Map(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: Value<'_>) -> String {
        String::from_utf8(value.text().unwrap().into_owned()).unwrap()
    }

    #[test]
    fn truthiness() {
        let empty: Vec<String> = Vec::new();
        let empty_map: HashMap<String, String> = HashMap::new();
        for falsy in [
            Value::Null,
            Value::Bool(false),
            Value::Str(""),
            Value::Bytes(b""),
            empty.to_value(),
            empty_map.to_value(),
        ] {
            assert!(!falsy.is_truthy(), "{:?}", falsy);
        }

        let list = vec![1, 2];
        let map = HashMap::from([("a".to_string(), 1)]);
        for truthy in [
            Value::Bool(true),
            Value::Int(0),
            Value::Float(0.0),
            Value::Str("x"),
            list.to_value(),
            map.to_value(),
        ] {
            assert!(truthy.is_truthy(), "{:?}", truthy);
        }
    }

    #[test]
    fn textual_forms() {
        assert_eq!(text(Value::Null), "");
        assert_eq!(text(Value::Bool(true)), "true");
        assert_eq!(text(Value::Bool(false)), "false");
        assert_eq!(text((-42i32).to_value()), "-42");
        assert_eq!(text(7usize.to_value()), "7");
        assert_eq!(text(1.5f64.to_value()), "1.5");
        assert_eq!(text(1.0f64.to_value()), "1");
        assert_eq!(text(0.1f32.to_value()), "0.1");
        assert_eq!(text(1e21f64.to_value()), "1000000000000000000000");
        assert_eq!(text(b"raw".to_vec().to_value()), "raw");
        assert_eq!(text("s".to_value()), "s");
    }

    #[test]
    fn containers_have_no_text() {
        let list = vec!["a"];
        assert_eq!(list.to_value().text().unwrap_err(), "list");
        let map: HashMap<String, String> = HashMap::new();
        assert_eq!(map.to_value().text().unwrap_err(), "object");
    }

    #[test]
    fn options_and_pointers() {
        let none: Option<String> = None;
        assert!(matches!(none.to_value(), Value::Null));
        assert!(matches!(Some(3u32).to_value(), Value::UInt(3)));
        assert!(matches!(Arc::new("x".to_string()).to_value(), Value::Str("x")));
    }

    #[test]
    fn data_from_iter() {
        let data: Data = [("name", Data::from("Panda")), ("age", Data::from(3))]
            .into_iter()
            .collect();
        match &data {
            Data::Map(map) => assert_eq!(map.len(), 2),
            other => panic!("expected map, got {:?}", other),
        }
        assert!(matches!(data.to_value(), Value::Object(_)));
    }

    #[test]
    fn slices_are_lists() {
        let numbers = [1i32, 2, 3];
        let slice = &numbers[..];
        match slice.to_value() {
            Value::List(seq) => {
                assert_eq!(seq.len(), 3);
                assert!(matches!(seq.item(2), Value::Int(3)));
            }
            other => panic!("expected list, got {:?}", other),
        }
        let empty: &[String] = &[];
        assert!(!empty.to_value().is_truthy());
        // byte slices stay text
        assert_eq!(text((&b"raw"[..]).to_value()), "raw");
    }

    #[test]
    fn small_unsigned_through_data() {
        assert!(matches!(Data::from(7u8).to_value(), Value::UInt(7)));
        assert_eq!(text(Data::from(255u8).to_value()), "255");
    }
}
