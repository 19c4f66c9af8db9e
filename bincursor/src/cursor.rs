// SPDX-License-Identifier: Apache-2.0

use crate::{Error, Result};
use crate::OperationKind::{self, Seek};

/// Position and length bookkeeping shared by every reader and writer.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Cursor {
	pos: usize,
	len: usize,
}

impl Cursor {
	/// Creates a cursor at `pos` over `len` bytes of addressable data.
	#[inline]
	pub const fn new(pos: usize, len: usize) -> Self {
		Self { pos, len }
	}

	/// Returns the position of the next operation.
	#[inline]
	pub const fn position(&self) -> usize { self.pos }

	/// Returns the logical length of the addressable data.
	#[inline]
	pub const fn len(&self) -> usize { self.len }

	/// Returns `true` if there is no addressable data.
	#[inline]
	pub const fn is_empty(&self) -> bool { self.len == 0 }

	/// Returns the number of bytes between the position and the end.
	#[inline]
	pub const fn remaining(&self) -> usize { self.len.saturating_sub(self.pos) }

	/// Fails with an end-of-data error unless `count` bytes are addressable at
	/// `pos`.
	#[inline]
	pub fn check(&self, op: OperationKind, pos: usize, count: usize) -> Result {
		match pos.checked_add(count) {
			Some(end) if end <= self.len => Ok(()),
			_ => Err(Error::eod(op, pos, self.len))
		}
	}

	/// Moves the position, failing if it lies past the length. Returns the
	/// previous position.
	pub fn seek(&mut self, pos: usize) -> Result<usize> {
		if pos > self.len {
			return Err(Error::eod(Seek, pos, self.len))
		}
		Ok(self.seek_unbounded(pos))
	}

	/// Moves the position without a bound check. Returns the previous position.
	#[inline]
	pub fn seek_unbounded(&mut self, pos: usize) -> usize {
		std::mem::replace(&mut self.pos, pos)
	}

	/// Resolves a relative move from the current position, failing if it would
	/// leave the position negative.
	pub fn offset(&self, delta: isize) -> Result<usize> {
		self.pos
			.checked_add_signed(delta)
			.ok_or_else(|| Error::eod(Seek, self.pos, self.len))
	}

	/// Sets the position to `pos` and extends the length to cover it.
	#[inline]
	pub fn set_extending(&mut self, pos: usize) {
		self.pos = pos;
		self.len = self.len.max(pos);
	}

	/// Advances the position by `count` without touching the length.
	#[inline]
	pub fn advance(&mut self, count: usize) {
		self.pos += count;
	}

	/// Advances the position by `count`, extending the length to cover it.
	#[inline]
	pub fn advance_extending(&mut self, count: usize) {
		self.set_extending(self.pos + count);
	}

	/// Sets the length.
	#[inline]
	pub fn set_len(&mut self, len: usize) {
		self.len = len;
	}
}

/// A seek target.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SeekOffset {
	/// Reset the cursor to the start. Equivalent to `FromStart(0)`.
	Reset,
	/// Move forward by an offset.
	Forward(usize),
	/// Move back by an offset.
	Back(usize),
	/// Seek a position from the start of the data.
	FromStart(usize),
	/// Seek a position from the end of the data. A positive offset seeks beyond
	/// the end, which only unbounded cursors accept.
	FromEnd(isize),
}

impl SeekOffset {
	/// Converts to a start-based position given a current `pos` and `len`.
	/// Positions that would be negative resolve to `None`.
	pub fn to_pos(self, pos: usize, len: usize) -> Option<usize> {
		match self {
			SeekOffset::Reset => Some(0),
			SeekOffset::Forward(off) => pos.checked_add(off),
			SeekOffset::Back   (off) => pos.checked_sub(off),
			SeekOffset::FromStart(pos) => Some(pos),
			SeekOffset::FromEnd  (off) => len.checked_add_signed(off),
		}
	}
}

/// The position-tracking contract every cursor implements.
///
/// Bounded cursors (readers, and writers with growth disabled) reject positions
/// past [`len`](Self::len) with an end-of-data error. Unbounded cursors
/// (growable memory writers and file writers) accept any position; the next
/// write extends the length.
pub trait Seekable {
	/// Returns the position of the next operation.
	fn position(&self) -> usize;

	/// Returns the logical length of the addressable data.
	fn len(&self) -> usize;

	/// Returns `true` if there is no addressable data.
	fn is_empty(&self) -> bool { self.len() == 0 }

	/// Moves to `pos`, returning the previous position.
	fn seek(&mut self, pos: usize) -> Result<usize>;

	/// Moves by `delta` relative to the current position, returning the previous
	/// position.
	fn seek_relative(&mut self, delta: isize) -> Result<usize> {
		let pos = Cursor::new(self.position(), self.len()).offset(delta)?;
		self.seek(pos)
	}
}

/// A convenience extension for [`Seekable`].
pub trait SeekableExt: Seekable {
	/// Seeks to `offset`, returning the previous position.
	fn seek_to(&mut self, offset: SeekOffset) -> Result<usize> {
		let (pos, len) = (self.position(), self.len());
		let target = offset.to_pos(pos, len)
						   .ok_or_else(|| Error::eod(Seek, pos, len))?;
		self.seek(target)
	}

	/// Resets to the start. Shorthand for `seek_to(SeekOffset::Reset)`.
	fn rewind(&mut self) -> Result {
		self.seek_to(SeekOffset::Reset)?;
		Ok(())
	}

	/// Seeks forward `offset` bytes, returning the previous position.
	fn seek_forward(&mut self, offset: usize) -> Result<usize> {
		self.seek_to(SeekOffset::Forward(offset))
	}

	/// Seeks back `offset` bytes, returning the previous position.
	fn seek_back(&mut self, offset: usize) -> Result<usize> {
		self.seek_to(SeekOffset::Back(offset))
	}

	/// Seeks `offset` bytes relative to the end, returning the previous position.
	fn seek_from_end(&mut self, offset: isize) -> Result<usize> {
		self.seek_to(SeekOffset::FromEnd(offset))
	}

	/// Returns the number of bytes between the position and the end.
	fn remaining(&self) -> usize {
		self.len().saturating_sub(self.position())
	}
}

impl<S: Seekable + ?Sized> SeekableExt for S { }
