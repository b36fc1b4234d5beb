use dry_mustache_core::{FsLoader, Options, PartialLoader, Template};
use proc_macro::TokenStream;
use quote::{format_ident, quote};
use regex::Regex;
use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use syn::{LitStr, Token, parse::Parse, parse::ParseStream, parse_macro_input};
use walkdir::WalkDir;

const EXTENSION: &str = "mustache";

/// Reads partials from disk and remembers every file it served, so the
/// generated code can embed exactly those files
struct RecordingLoader {
    inner: FsLoader,
    seen: RefCell<BTreeMap<String, PathBuf>>,
}

impl RecordingLoader {
    fn new(base: &Path) -> Self {
        Self {
            inner: FsLoader::new(base).with_extension(EXTENSION),
            seen: RefCell::new(BTreeMap::new()),
        }
    }

    fn into_partials(self) -> BTreeMap<String, PathBuf> {
        self.seen.into_inner()
    }
}

impl PartialLoader for RecordingLoader {
    fn load(&self, path: &str) -> io::Result<Cow<'_, [u8]>> {
        let source = self.inner.load(path)?;
        self.seen
            .borrow_mut()
            .insert(path.to_string(), self.inner.resolve(path));
        Ok(source)
    }
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_lower = false;
    for c in s.chars() {
        if c.is_uppercase() {
            if prev_lower {
                result.push('_');
            }
            result.extend(c.to_lowercase());
            prev_lower = false;
        } else {
            result.push(c);
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    result
}

/// Turns a template name into a function name: `nav-Bar.v2` -> `nav_bar_v2`
fn accessor_name(name: &str) -> String {
    let re_invalid = Regex::new(r"[^A-Za-z0-9_]+").unwrap();
    let mut ident = re_invalid.replace_all(&to_snake_case(name), "_").into_owned();
    if ident.is_empty() || ident == "_" {
        return "template".to_string();
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

/// Where the template text comes from in the generated code
enum Source<'a> {
    Inline(&'a LitStr),
    File(&'a Path),
}

fn generate_accessor(
    name: &str,
    content: &[u8],
    source: Source<'_>,
    partial_base: &Path,
) -> Result<proc_macro2::TokenStream, String> {
    // Compile now so that template errors fail the build
    let loader = RecordingLoader::new(partial_base);
    Template::compile_with(content, &loader, Options::default())
        .map_err(|err| format!("template `{}`: {}", name, err))?;

    let partials = loader.into_partials();
    let partial_names = partials.keys();
    let partial_files = partials.values().map(|p| p.to_string_lossy().into_owned());

    let source_expr = match source {
        Source::Inline(lit) => quote! { #lit },
        Source::File(path) => {
            let path_str = path.to_string_lossy().into_owned();
            // include_bytes! also makes edits to the file trigger a rebuild
            quote! { include_bytes!(#path_str) }
        }
    };

    let fn_name = format_ident!("{}", accessor_name(name));

    Ok(quote! {
        pub fn #fn_name() -> &'static ::dry_mustache::Template {
            static TEMPLATE: ::std::sync::OnceLock<::dry_mustache::Template> =
                ::std::sync::OnceLock::new();
            TEMPLATE.get_or_init(|| {
                let loader = ::dry_mustache::MemoryLoader::new()
                    #(.with(#partial_names, &include_bytes!(#partial_files)[..]))*;
                ::dry_mustache::Template::compile_with(
                    #source_expr,
                    &loader,
                    ::dry_mustache::Options::default(),
                )
                .expect("template was checked when the crate was built")
            })
        }
    })
}

fn generate_for_file(path: &Path, partial_base: &Path) -> Result<proc_macro2::TokenStream, String> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| format!("no file name in {:?}", path))?;
    let content = fs::read(path).map_err(|err| format!("failed to read {:?}: {}", path, err))?;
    generate_accessor(&stem, &content, Source::File(path), partial_base)
}

fn manifest_dir() -> PathBuf {
    std::env::var_os("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .unwrap_or_default()
}

fn into_output(span: proc_macro2::Span, result: Result<proc_macro2::TokenStream, String>) -> TokenStream {
    match result {
        Ok(tokens) => tokens.into(),
        Err(message) => syn::Error::new(span, message).to_compile_error().into(),
    }
}

struct StrInput {
    name: LitStr,
    content: LitStr,
}

impl Parse for StrInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let name: LitStr = input.parse()?;
        input.parse::<Token![,]>()?;
        let content: LitStr = input.parse()?;
        // allow a trailing comma
        input.parse::<Option<Token![,]>>()?;
        Ok(StrInput { name, content })
    }
}

/// Generates one accessor per `*.mustache` file found under the directory.
/// Partials resolve relative to the directory itself.
#[proc_macro]
pub fn dry_mustache_directory(input: TokenStream) -> TokenStream {
    let dir_lit = parse_macro_input!(input as LitStr);
    let root_path = manifest_dir().join(dir_lit.value());

    if !root_path.is_dir() {
        return syn::Error::new(dir_lit.span(), format!("Directory not found: {:?}", root_path))
            .to_compile_error()
            .into();
    }

    let mut accessors = Vec::new();
    let mut names = HashSet::new();

    for entry in WalkDir::new(&root_path).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                return syn::Error::new(dir_lit.span(), err.to_string())
                    .to_compile_error()
                    .into();
            }
        };

        let path = entry.path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != EXTENSION) {
            continue;
        }

        let stem = path.file_stem().map(|s| accessor_name(&s.to_string_lossy()));
        if let Some(stem) = stem
            && !names.insert(stem.clone())
        {
            return syn::Error::new(
                dir_lit.span(),
                format!("more than one template is named `{}` (at {:?})", stem, path),
            )
            .to_compile_error()
            .into();
        }

        match generate_for_file(path, &root_path) {
            Ok(tokens) => accessors.push(tokens),
            Err(message) => {
                return syn::Error::new(dir_lit.span(), message)
                    .to_compile_error()
                    .into();
            }
        }
    }

    TokenStream::from(quote! {
        #(#accessors)*
    })
}

/// Generates one accessor for a single template file.
/// Partials resolve relative to the file's directory.
#[proc_macro]
pub fn dry_mustache_file(input: TokenStream) -> TokenStream {
    let file_lit = parse_macro_input!(input as LitStr);
    let path = manifest_dir().join(file_lit.value());

    if !path.is_file() {
        return syn::Error::new(file_lit.span(), format!("File not found: {:?}", path))
            .to_compile_error()
            .into();
    }

    let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
    into_output(file_lit.span(), generate_for_file(&path, &base))
}

/// Generates one accessor named by the first argument for the inline template
/// in the second. Partials resolve relative to the crate root.
#[proc_macro]
pub fn dry_mustache_str(input: TokenStream) -> TokenStream {
    let StrInput { name, content } = parse_macro_input!(input as StrInput);
    let text = content.value();
    let result = generate_accessor(
        &name.value(),
        text.as_bytes(),
        Source::Inline(&content),
        &manifest_dir(),
    );
    into_output(content.span(), result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessor_names() {
        assert_eq!(accessor_name("button"), "button");
        assert_eq!(accessor_name("navBar"), "nav_bar");
        assert_eq!(accessor_name("nav-bar.v2"), "nav_bar_v2");
        assert_eq!(accessor_name("404"), "_404");
        assert_eq!(accessor_name("HTML"), "html");
        assert_eq!(accessor_name("-"), "template");
    }

    #[test]
    fn records_partials() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        fs::create_dir(dir.join("parts")).unwrap();
        fs::write(dir.join("parts/header.mustache"), "<h1>{{title}}</h1>{{>parts/logo}}").unwrap();
        fs::write(dir.join("parts/logo.mustache"), "<img>").unwrap();

        let loader = RecordingLoader::new(dir);
        Template::compile_with("{{>parts/header}}", &loader, Options::default()).unwrap();
        let partials = loader.into_partials();
        assert_eq!(
            partials.keys().collect::<Vec<_>>(),
            vec!["parts/header", "parts/logo"]
        );
        assert_eq!(partials["parts/logo"], dir.join("parts/logo.mustache"));
    }
}
