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

//! Output buffer pool
//!
//! Rendering writes into a single growable buffer. Buffers are recycled through
//! free lists keyed by power of two size class to save allocations on hot
//! templates. Nothing depends on reuse: a fresh buffer behaves the same, it is
//! only slower to get.

use std::{
    ops::{Deref, DerefMut},
    sync::{Mutex, OnceLock},
};

/// Smallest size class, as a power of two
const MIN_CLASS: u32 = 6;
/// Largest size class, as a power of two
const MAX_CLASS: u32 = 20;
const CLASSES: usize = (MAX_CLASS - MIN_CLASS + 1) as usize;

/// Default number of idle buffers kept per size class
pub const DEFAULT_PER_CLASS: usize = 16;

static GLOBAL: OnceLock<BufferPool> = OnceLock::new();

/// The process wide pool used by `Template::render`
pub fn global() -> &'static BufferPool {
    GLOBAL.get_or_init(|| BufferPool::new(DEFAULT_PER_CLASS))
}

/// Size class a buffer for `hint` bytes is drawn from
fn class_for(hint: usize) -> usize {
    let bits = hint
        .max(1)
        .checked_next_power_of_two()
        .map_or(MAX_CLASS, usize::trailing_zeros);
    bits.clamp(MIN_CLASS, MAX_CLASS) as usize - MIN_CLASS as usize
}

/// Size class a buffer of `capacity` bytes is returned to, if any
fn class_of(capacity: usize) -> Option<usize> {
    if capacity < 1 << MIN_CLASS || capacity > 1 << MAX_CLASS {
        return None;
    }
    let bits = usize::BITS - 1 - capacity.leading_zeros();
    Some(bits as usize - MIN_CLASS as usize)
}

/// Free lists of byte buffers by size class
#[derive(Debug)]
pub struct BufferPool {
    classes: [Mutex<Vec<Vec<u8>>>; CLASSES],
    per_class: usize,
}

impl BufferPool {
    /// Creates a pool keeping at most `per_class` idle buffers in each class
    pub fn new(per_class: usize) -> Self {
        Self {
            classes: std::array::from_fn(|_| Mutex::new(Vec::new())),
            per_class,
        }
    }

    /// Takes an empty buffer with room for at least `hint` bytes
    pub fn take(&self, hint: usize) -> PooledBuffer<'_> {
        let class = class_for(hint);
        let reused = self.classes[class]
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop();
        let buf = reused.unwrap_or_else(|| Vec::with_capacity(1 << (class + MIN_CLASS as usize)));
        PooledBuffer { pool: self, buf }
    }

    fn give_back(&self, mut buf: Vec<u8>) {
        let Some(class) = class_of(buf.capacity()) else {
            return;
        };
        buf.clear();
        let mut free = self.classes[class]
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if free.len() < self.per_class {
            free.push(buf);
        }
    }

    /// Number of idle buffers across all classes
    pub fn idle(&self) -> usize {
        self.classes
            .iter()
            .map(|class| {
                class
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .len()
            })
            .sum()
    }
}

/// A buffer that returns to its pool when dropped
#[derive(Debug)]
pub struct PooledBuffer<'a> {
    pool: &'a BufferPool,
    buf: Vec<u8>,
}

impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.give_back(std::mem::take(&mut self.buf));
    }
}
