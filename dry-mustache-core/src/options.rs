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

//! Compiler options

/// Default limit on nested sections and partials
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default ratio of initial output buffer size to source length
pub const DEFAULT_CAPACITY_FACTOR: usize = 2;

/// Compiler options
///
/// Options are fixed when a template is compiled and travel with it, so every
/// render of a template sizes its buffers the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// How deep sections, inverted sections and partials may nest
    pub max_depth: usize,
    /// Initial output buffer size as a multiple of the source length
    pub capacity_factor: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            capacity_factor: DEFAULT_CAPACITY_FACTOR,
        }
    }
}

impl Options {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_capacity_factor(mut self, capacity_factor: usize) -> Self {
        self.capacity_factor = capacity_factor;
        self
    }

    /// Output buffer size hint for a template of `len` source bytes
    pub(crate) fn capacity_for(&self, len: usize) -> usize {
        len.saturating_mul(self.capacity_factor)
    }
}
