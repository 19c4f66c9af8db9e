// Copyright 2023 Strixpyrr
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Positioned cursors for reading and writing fixed-width binary values.
//!
//! ## How it works
//!
//! Every cursor tracks a *position*, the offset of its next access, and a
//! *length*, the extent of the data it addresses. Reads decode primitives from
//! the position and advance it by their width; writes encode and advance the
//! same way. Integers and floats come in little and big endian flavors, and a
//! "safe" 64-bit read rejects values a double-precision float can't represent
//! exactly.
//!
//! Cursors share one contract, [`Seekable`], [`BinaryRead`], and [`BinaryWrite`],
//! over several kinds of storage:
//!
//! - [`memory::BufferReader`] reads a borrowed slice without copying.
//! - [`memory::BufferWriter`] writes into an owned region, growing it in fixed
//!   allocation steps when a write reaches past the end.
//! - [`memory::AlignedBufferReader`] and [`memory::AlignedBufferWriter`] round
//!   each multi-byte access up to its natural alignment first.
//! - [`file::BufferedFileReader`] and [`file::BufferedFileWriter`] keep a cache
//!   window in front of a file, refilling or flushing it as the position moves.
//! - [`file::FileReader`] and [`file::FileWriter`] access the file directly on
//!   every call.
//!
//! With the `async` feature (on by default), the file cursors have asynchronous
//! counterparts implementing [`AsyncBinaryRead`] and [`AsyncBinaryWrite`]. These
//! run one operation at a time; overlapping calls fail fast with a busy error.
//!
//! ### Errors
//!
//! Out-of-range accesses fail with an end-of-data error carrying the attempted
//! position and the length. A failed operation leaves the position where it
//! was, except where noted.

mod error;
mod codec;
mod cursor;
mod traits;
pub mod memory;
pub mod file;

pub use error::*;
pub use codec::{Endian, Primitive, MAX_SAFE_INTEGER, safe_integer};
pub use cursor::*;
pub use traits::*;

/// The default initial capacity of a memory writer.
pub const DEFAULT_CAPACITY: usize = 1024;
/// The default number of bytes a memory writer grows by.
pub const DEFAULT_ALLOCATE_SIZE: usize = 1024;
/// The default capacity of a buffered file cursor's cache window.
pub const DEFAULT_WINDOW_SIZE: usize = 4096;

#[cfg(test)]
#[ctor::ctor]
fn init_logger() {
	let _ = env_logger::builder().is_test(true).try_init();
}
