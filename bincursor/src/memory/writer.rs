// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use log::trace;
use crate::{BinaryWrite, Cursor, Endian, Error, Primitive, Result, Seekable};
use crate::OperationKind::{self, Allocate, Write};
use super::{Align, Unaligned, WriterOptions};

/// Writes values into an owned byte region, growing it as needed.
///
/// The writer's [length](Seekable::len) is the capacity of its region, which
/// grows when a write reaches past the end (see [`WriterOptions`]). Growth
/// allocates a new region and copies the old one into it; nothing borrowed
/// from the writer survives this, which the borrow checker enforces.
#[derive(Clone)]
pub struct BufferWriter<A: Align = Unaligned> {
	buf: Vec<u8>,
	cursor: Cursor,
	options: WriterOptions,
	_align: PhantomData<A>,
}

impl<A: Align> Default for BufferWriter<A> {
	fn default() -> Self { Self::new() }
}

impl<A: Align> From<WriterOptions> for BufferWriter<A> {
	fn from(options: WriterOptions) -> Self {
		Self::with_options(options)
	}
}

impl<A: Align> Debug for BufferWriter<A> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("BufferWriter")
			.field("position", &self.cursor.position())
			.field("capacity", &self.buf.len())
			.field("options", &self.options)
			.finish_non_exhaustive()
	}
}

impl<A: Align> BufferWriter<A> {
	/// Creates a writer with the default options.
	pub fn new() -> Self {
		Self::with_options(WriterOptions::default())
	}

	/// Creates a writer with `options`.
	pub fn with_options(options: WriterOptions) -> Self {
		let buf = vec![0; options.initial_capacity];
		Self::from_parts(buf, 0, options)
	}

	/// Creates a writer adopting `buf` as its region, starting at `pos`. Fails
	/// if `pos` is past the end of `buf`.
	pub fn from_vec(buf: Vec<u8>, pos: usize) -> Result<Self> {
		Self::from_vec_with_options(buf, pos, WriterOptions::default())
	}

	/// Creates a writer adopting `buf` as its region, starting at `pos`, with
	/// `options`. The initial capacity option is ignored.
	pub fn from_vec_with_options(buf: Vec<u8>, pos: usize, options: WriterOptions) -> Result<Self> {
		let mut writer = Self::from_parts(buf, 0, options);
		writer.cursor.seek(pos)?;
		Ok(writer)
	}

	fn from_parts(buf: Vec<u8>, pos: usize, options: WriterOptions) -> Self {
		let cursor = Cursor::new(pos, buf.len());
		Self {
			buf,
			cursor,
			options,
			_align: PhantomData,
		}
	}

	/// Returns the writer options.
	#[inline]
	pub fn options(&self) -> WriterOptions { self.options }

	/// Sets whether writes past the end grow the region.
	#[inline]
	pub fn set_auto_allocate(&mut self, value: bool) {
		self.options.auto_allocate = value;
	}

	/// Sets the allocation size.
	#[inline]
	pub fn set_auto_allocate_size(&mut self, value: usize) {
		self.options.auto_allocate_size = value;
	}

	/// Returns the capacity of the region.
	#[inline]
	pub fn capacity(&self) -> usize { self.buf.len() }

	/// Returns the written bytes, from the start to the position.
	#[inline]
	pub fn truncate(&self) -> &[u8] {
		let end = self.cursor.position().min(self.buf.len());
		&self.buf[..end]
	}

	/// Consumes the writer, returning the written bytes from the start to the
	/// position.
	pub fn into_bytes(self) -> Vec<u8> {
		let end = self.cursor.position().min(self.buf.len());
		let mut buf = self.buf;
		buf.truncate(end);
		buf
	}

	/// Extends the region by exactly `count` bytes. A new region is allocated,
	/// the old contents copied into it, and the old region dropped. Fails with
	/// an end-of-data error if the new region can't be allocated.
	pub fn allocate(&mut self, count: usize) -> Result {
		let old_capacity = self.buf.len();
		let Some(capacity) = old_capacity.checked_add(count) else {
			return Err(self.region_full(Allocate))
		};

		let mut buf = Vec::new();
		buf.try_reserve_exact(capacity)
		   .map_err(|err| self.region_full(Allocate).with_source(err))?;
		buf.extend_from_slice(&self.buf);
		buf.resize(capacity, 0);
		trace!("growing buffer from {old_capacity} to {capacity} bytes");
		self.buf = buf;
		self.cursor.set_len(capacity);
		Ok(())
	}

	fn region_full(&self, op: OperationKind) -> Error {
		Error::eod(op, self.cursor.position(), self.buf.len())
	}

	/// Returns the position a primitive of `size` bytes is written at.
	fn aligned_position(&self, size: usize) -> Result<usize> {
		A::align(self.cursor.position(), size).ok_or_else(|| self.region_full(Write))
	}

	/// Makes room for `count` bytes at `pos`, growing the region if allowed.
	/// Returns the end of the reserved range.
	fn reserve_at(&mut self, pos: usize, count: usize) -> Result<usize> {
		let capacity = self.buf.len();
		let Some(end) = pos.checked_add(count) else {
			return Err(Error::eod(Write, pos, capacity))
		};

		if end <= capacity {
			return Ok(end)
		}

		if !self.options.grows() {
			return Err(Error::eod(Write, pos, capacity))
		}

		let Some(growth) = self.options.growth(count, end - capacity) else {
			return Err(Error::eod(Write, pos, capacity))
		};
		self.allocate(growth).map_err(|err| err.with_operation(Write))?;
		Ok(end)
	}
}

impl<A: Align> Seekable for BufferWriter<A> {
	#[inline]
	fn position(&self) -> usize { self.cursor.position() }

	#[inline]
	fn len(&self) -> usize { self.cursor.len() }

	/// Moves to `pos`. A growing writer accepts any position, growing on the
	/// next write; a fixed writer fails past the end of its region.
	fn seek(&mut self, pos: usize) -> Result<usize> {
		if self.options.grows() {
			Ok(self.cursor.seek_unbounded(pos))
		} else {
			self.cursor.seek(pos)
		}
	}
}

impl<A: Align> BinaryWrite for BufferWriter<A> {
	fn write_bytes(&mut self, bytes: &[u8]) -> Result {
		let pos = self.cursor.position();
		let end = self.reserve_at(pos, bytes.len())?;
		self.buf[pos..end].copy_from_slice(bytes);
		self.cursor.seek_unbounded(end);
		Ok(())
	}

	fn write<T: Primitive>(&mut self, value: T, endian: Endian) -> Result {
		let pos = self.aligned_position(T::SIZE)?;
		let end = self.reserve_at(pos, T::SIZE)?;
		value.encode(&mut self.buf[pos..end], endian);
		self.cursor.seek_unbounded(end);
		Ok(())
	}
}
