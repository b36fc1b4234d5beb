//! Mustache templates that are checked when your crate is built and rendered
//! against dynamic data at run time.
//!
//! ```rust
//! mod templates {
//!     dry_mustache::str!("hello", "<p>Hello {{name}}</p>");
//! }
//!
//! let data = std::collections::HashMap::from([("name", "King Tubby")]);
//! assert_eq!(
//!     templates::hello().render_to_string(&data).unwrap(),
//!     "<p>Hello King Tubby</p>"
//! );
//! ```
//!
//! `file!` and `directory!` do the same for `*.mustache` files, relative to the
//! crate's `Cargo.toml`. A template that fails to compile, or names a partial
//! that does not exist, is reported as a compile error.

extern crate self as dry_mustache;

pub use dry_mustache_core::*;
pub use dry_mustache_macros::dry_mustache_directory as directory;
pub use dry_mustache_macros::dry_mustache_file as file;
pub use dry_mustache_macros::dry_mustache_str as str;

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::{Data, Mustache, RenderError, Value};

    #[test]
    fn basic_usage() {
        mod template {
            crate::str!("test", r#"<p>{{firstname}} {{lastname}}</p>"#);
        }
        let data = HashMap::from([("firstname", "King"), ("lastname", "Tubby")]);
        assert_eq!(
            template::test().render_to_string(&data).unwrap(),
            "<p>King Tubby</p>"
        );
    }

    #[test]
    fn accessor_is_shared() {
        mod template {
            crate::str!("test", "{{a}}");
        }
        assert!(std::ptr::eq(template::test(), template::test()));
    }

    struct Person {
        firstname: String,
        lastname: String,
    }

    impl Mustache for Person {
        fn marshal<'s>(&'s self, frame: crate::Frame<'_, 's>) -> Result<(), RenderError> {
            frame.for_each(|key| match key {
                "firstname" => Value::Str(&self.firstname),
                "lastname" => Value::Str(&self.lastname),
                _ => Value::Null,
            })
        }
    }

    #[test]
    fn sections_over_adapters() {
        mod template {
            crate::str!(
                "test",
                //language=mustache
                r#"{{#person}}{{firstname}} {{lastname}}{{/person}}"#,
            );
        }
        let data: Data = [(
            "person",
            Data::object(Person {
                firstname: "King".to_string(),
                lastname: "Tubby".to_string(),
            }),
        )]
        .into_iter()
        .collect();
        assert_eq!(template::test().render_to_string(&data).unwrap(), "King Tubby");
    }

    #[test]
    fn inverted_sections() {
        mod template {
            crate::str!(
                "test",
                //language=mustache
                r#"<div>{{#author}}<h1>{{name}}</h1>{{/author}}{{^author}}<h1>Unknown</h1>{{/author}}</div>"#
            );
        }
        let known: Data = [("author", Data::from_iter([("name", "King")]))]
            .into_iter()
            .collect();
        let unknown: Data = [("author", Data::Null)].into_iter().collect();
        assert_eq!(
            template::test().render_to_string(&known).unwrap(),
            "<div><h1>King</h1></div>"
        );
        assert_eq!(
            template::test().render_to_string(&unknown).unwrap(),
            "<div><h1>Unknown</h1></div>"
        );
    }

    #[test]
    fn escaped_and_raw() {
        mod template {
            crate::str!("test", "{{html}} {{{html}}}");
        }
        let data = HashMap::from([("html", "<b>")]);
        assert_eq!(
            template::test().render_to_string(&data).unwrap(),
            "&lt;b&gt; <b>"
        );
    }

    #[test]
    fn file_with_partial() {
        mod template {
            crate::file!("templates/greeting.mustache");
        }
        let data = HashMap::from([("title", "Hi"), ("name", "Panda")]);
        assert_eq!(
            template::greeting().render_to_string(&data).unwrap(),
            "<h1>Hi</h1><p>Hello Panda!</p>\n"
        );
    }

    #[test]
    fn directory() {
        mod templates {
            crate::directory!("templates/");
        }
        let items: Data = [("items", Data::List(vec!["a".into(), "b".into()]))]
            .into_iter()
            .collect();
        assert_eq!(
            templates::list().render_to_string(&items).unwrap(),
            "<ul><li>a</li><li>b</li></ul>"
        );
        let empty: Data = [("items", Data::List(Vec::new()))].into_iter().collect();
        assert_eq!(
            templates::list().render_to_string(&empty).unwrap(),
            "<ul><li>none</li></ul>"
        );
        // partials are templates too
        let data = HashMap::from([("title", "Hi")]);
        assert_eq!(templates::header().render_to_string(&data).unwrap(), "<h1>Hi</h1>");
    }
}
