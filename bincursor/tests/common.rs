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

#![allow(dead_code, unused_macros)]

use std::cell::RefCell;
use std::fmt::{Arguments, Debug};
use std::io;
use std::rc::Rc;
use bincursor::file::FileIo;

#[ctor::ctor]
fn init_logger() {
	let _ = env_logger::builder().is_test(true).try_init();
}

macro_rules! qc_assert_eq {
	($left:expr,$right:expr) => {{
		let left = $left;
		let right = $right;
		if left == right {
			TestResult::passed()
		} else {
			TestResult::error(
				common::format_qc_assert_error(&left, &right, None)
			)
		}
	}};
	($left:expr,$right:expr,$($arg:tt)+) => {{
		let left = $left;
		let right = $right;
		if left == right {
			TestResult::passed()
		} else {
			TestResult::error(
				common::format_qc_assert_error(&left, &right, Some(format_args!($($arg)+)))
			)
		}
	}};
}

pub fn format_qc_assert_error<L: Debug, R: Debug>(left: &L, right: &R, msg: Option<Arguments>) -> String {
	if let Some(msg) = msg {
		format!(
			"assertion failed `(left == right)`: {msg}\n \
			left: `{left:?}`,\nright: `{right:?}`",
		)
	} else {
		format!(
			"assertion failed `(left == right)`:\n \
			left: `{left:?}`,\nright: `{right:?}`",
		)
	}
}

/// Deterministic test data: `len` bytes counting up from `0`, wrapping at 251
/// so the pattern doesn't line up with power-of-two window sizes.
pub fn pattern(len: usize) -> Vec<u8> {
	(0..len).map(|i| (i % 251) as u8).collect()
}

#[derive(Debug, Default)]
struct Inner {
	data: Vec<u8>,
	reads: usize,
	writes: usize,
	write_limit: Option<usize>,
	read_limit: Option<usize>,
}

/// An in-memory file that counts calls to it. Clones share the same file, so a
/// test can keep a handle while a cursor owns another.
#[derive(Clone, Debug, Default)]
pub struct MemoryFile {
	inner: Rc<RefCell<Inner>>,
}

impl MemoryFile {
	pub fn new(data: Vec<u8>) -> Self {
		Self {
			inner: Rc::new(RefCell::new(Inner { data, ..Inner::default() }))
		}
	}

	/// Returns a copy of the file contents.
	pub fn data(&self) -> Vec<u8> { self.inner.borrow().data.clone() }

	/// Returns the number of `read_at` calls so far.
	pub fn reads(&self) -> usize { self.inner.borrow().reads }

	/// Returns the number of `write_at` calls so far.
	pub fn writes(&self) -> usize { self.inner.borrow().writes }

	/// Makes every write accept at most `limit` bytes.
	pub fn limit_writes(&self, limit: usize) {
		self.inner.borrow_mut().write_limit = Some(limit);
	}

	/// Makes every read after the first `count` fail.
	pub fn fail_reads_after(&self, count: usize) {
		self.inner.borrow_mut().read_limit = Some(count);
	}

	/// Truncates the file behind the back of any open cursor.
	pub fn truncate(&self, len: usize) {
		self.inner.borrow_mut().data.truncate(len);
	}

	fn read(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
		let mut inner = self.inner.borrow_mut();
		inner.reads += 1;
		if inner.read_limit.is_some_and(|limit| inner.reads > limit) {
			return Err(io::Error::other("read failed"))
		}

		let offset = offset as usize;
		let len = inner.data.len();
		if offset >= len {
			return Ok(0)
		}

		let count = buf.len().min(len - offset);
		buf[..count].copy_from_slice(&inner.data[offset..offset + count]);
		Ok(count)
	}

	fn write(&self, buf: &[u8], offset: u64) -> usize {
		let mut inner = self.inner.borrow_mut();
		inner.writes += 1;
		let count = inner.write_limit.map_or(buf.len(), |limit| limit.min(buf.len()));
		let offset = offset as usize;
		let end = offset + count;
		if inner.data.len() < end {
			inner.data.resize(end, 0);
		}

		inner.data[offset..end].copy_from_slice(&buf[..count]);
		count
	}
}

impl FileIo for MemoryFile {
	fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
		self.read(buf, offset)
	}

	fn write_at(&mut self, buf: &[u8], offset: u64) -> io::Result<usize> {
		Ok(self.write(buf, offset))
	}

	fn size(&mut self) -> io::Result<u64> {
		Ok(self.inner.borrow().data.len() as u64)
	}
}

/// Each call suspends once before completing, so a test can observe a cursor
/// mid-operation.
#[cfg(feature = "async")]
impl bincursor::file::AsyncFileIo for MemoryFile {
	async fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
		tokio::task::yield_now().await;
		self.read(buf, offset)
	}

	async fn write_at(&mut self, buf: &[u8], offset: u64) -> io::Result<usize> {
		tokio::task::yield_now().await;
		Ok(self.write(buf, offset))
	}

	async fn size(&mut self) -> io::Result<u64> {
		Ok(self.inner.borrow().data.len() as u64)
	}
}
