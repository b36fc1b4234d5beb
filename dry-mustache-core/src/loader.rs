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

//! Partial loaders
//!
//! Partials are resolved while compiling, so the lexer needs something that
//! turns `{{>path}}` into bytes. [`FsLoader`] reads files under a base directory,
//! [`MemoryLoader`] serves bytes registered up front.

use std::{
    borrow::Cow,
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

/// Source of partial templates
pub trait PartialLoader {
    /// Returns the source of the partial named `path`
    fn load(&self, path: &str) -> io::Result<Cow<'_, [u8]>>;
}

/// Loads partials from files relative to a base directory
#[derive(Debug, Clone)]
pub struct FsLoader {
    base: PathBuf,
    extension: Option<String>,
}

impl FsLoader {
    pub fn new(base: impl AsRef<Path>) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
            extension: None,
        }
    }

    /// Appends `extension` to partial paths that have none
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// The file a partial path resolves to
    pub fn resolve(&self, path: &str) -> PathBuf {
        let mut file = self.base.join(path);
        if let Some(extension) = &self.extension
            && file.extension().is_none()
        {
            file.set_extension(extension);
        }
        file
    }
}

impl PartialLoader for FsLoader {
    fn load(&self, path: &str) -> io::Result<Cow<'_, [u8]>> {
        fs::read(self.resolve(path)).map(Cow::Owned)
    }
}

/// Serves partials from memory
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    partials: HashMap<String, Vec<u8>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, source: impl Into<Vec<u8>>) {
        self.partials.insert(path.into(), source.into());
    }

    pub fn with(mut self, path: impl Into<String>, source: impl Into<Vec<u8>>) -> Self {
        self.insert(path, source);
        self
    }
}

impl PartialLoader for MemoryLoader {
    fn load(&self, path: &str) -> io::Result<Cow<'_, [u8]>> {
        self.partials
            .get(path)
            .map(|source| Cow::Borrowed(source.as_slice()))
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("no partial named {}", path))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_loader_reads_relative_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("parts")).unwrap();
        fs::write(dir.path().join("parts/header"), "Hi").unwrap();

        let loader = FsLoader::new(dir.path());
        assert_eq!(loader.base(), dir.path());
        assert_eq!(&*loader.load("parts/header").unwrap(), b"Hi");
        assert_eq!(
            loader.load("missing").unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }

    #[test]
    fn fs_loader_appends_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("header.mustache"), "Hi").unwrap();

        let loader = FsLoader::new(dir.path()).with_extension("mustache");
        assert_eq!(loader.resolve("header"), dir.path().join("header.mustache"));
        assert_eq!(loader.resolve("x.html"), dir.path().join("x.html"));
        assert_eq!(&*loader.load("header").unwrap(), b"Hi");
    }

    #[test]
    fn memory_loader() {
        let loader = MemoryLoader::new().with("a", "A").with("b", b"B".to_vec());
        assert_eq!(&*loader.load("a").unwrap(), b"A");
        assert_eq!(&*loader.load("b").unwrap(), b"B");
        assert!(loader.load("c").is_err());
    }
}
