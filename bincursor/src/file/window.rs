// SPDX-License-Identifier: Apache-2.0

//! Cache window state shared by the blocking and asynchronous file cursors.
//! Nothing here touches the file.

use all_asserts::debug_assert_le;

/// A read-ahead window: a copy of `filled` bytes of the file starting at file
/// offset `start`, with a `head` marking the next unread byte.
#[derive(Debug)]
pub(crate) struct ReadWindow {
	data: Box<[u8]>,
	start: usize,
	head: usize,
	filled: usize,
}

impl ReadWindow {
	pub fn new(capacity: usize, start: usize) -> Self {
		Self {
			data: vec![0; capacity].into_boxed_slice(),
			start,
			head: 0,
			filled: 0,
		}
	}

	#[inline]
	pub fn capacity(&self) -> usize { self.data.len() }

	/// Returns the number of cached bytes after the head.
	#[inline]
	pub fn available(&self) -> usize { self.filled - self.head }

	/// Empties the window and returns the first `count` bytes of it to be filled
	/// from file offset `start`. Follow with [`filled`](Self::filled).
	pub fn prepare(&mut self, start: usize, count: usize) -> &mut [u8] {
		debug_assert_le!(count, self.capacity());
		self.start = start;
		self.head = 0;
		self.filled = 0;
		&mut self.data[..count]
	}

	/// Marks `count` bytes as filled after [`prepare`](Self::prepare).
	#[inline]
	pub fn filled(&mut self, count: usize) {
		debug_assert_le!(count, self.capacity());
		self.filled = count;
	}

	/// Consumes `count` cached bytes, returning them.
	pub fn take(&mut self, count: usize) -> &[u8] {
		debug_assert_le!(count, self.available());
		let head = self.head;
		self.head += count;
		&self.data[head..head + count]
	}

	/// Moves the head to file offset `pos` if it's within the cached range,
	/// returning whether it was.
	pub fn reposition(&mut self, pos: usize) -> bool {
		match pos.checked_sub(self.start) {
			Some(head) if head <= self.filled => {
				self.head = head;
				true
			}
			_ => false
		}
	}
}

/// A write-behind window: `pending` bytes not yet written to the file, which
/// belong at file offset `start`.
#[derive(Debug)]
pub(crate) struct WriteWindow {
	data: Box<[u8]>,
	start: usize,
	pending: usize,
}

impl WriteWindow {
	pub fn new(capacity: usize, start: usize) -> Self {
		Self {
			data: vec![0; capacity].into_boxed_slice(),
			start,
			pending: 0,
		}
	}

	#[inline]
	pub fn start(&self) -> usize { self.start }

	#[inline]
	pub fn is_empty(&self) -> bool { self.pending == 0 }

	/// Returns `true` if `count` more bytes fit in the window.
	#[inline]
	pub fn fits(&self, count: usize) -> bool {
		self.pending
			.checked_add(count)
			.is_some_and(|end| end <= self.data.len())
	}

	/// Appends `bytes` to the pending data. An empty window is moved to `pos`
	/// first; otherwise `pos` must follow the pending data.
	pub fn push(&mut self, pos: usize, bytes: &[u8]) {
		if self.is_empty() {
			self.start = pos;
		}
		debug_assert_eq!(self.start + self.pending, pos, "write must follow the pending data");
		let end = self.pending + bytes.len();
		self.data[self.pending..end].copy_from_slice(bytes);
		self.pending = end;
	}

	/// Returns the pending data.
	#[inline]
	pub fn pending(&self) -> &[u8] { &self.data[..self.pending] }

	/// Drops the pending data and moves the window to `start`.
	#[inline]
	pub fn reset(&mut self, start: usize) {
		self.start = start;
		self.pending = 0;
	}
}
