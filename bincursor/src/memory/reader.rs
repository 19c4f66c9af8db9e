// SPDX-License-Identifier: Apache-2.0

use std::borrow::Cow;
use std::marker::PhantomData;
use crate::{BinaryRead, Cursor, Endian, Error, Primitive, Result, Seekable};
use crate::OperationKind::Read;
use super::{Align, Unaligned};

/// Reads values from a borrowed, fixed slice of bytes. Every access is bounds
/// checked against the slice length.
#[derive(Clone, Debug)]
pub struct BufferReader<'a, A: Align = Unaligned> {
	data: &'a [u8],
	cursor: Cursor,
	_align: PhantomData<A>,
}

impl<'a, A: Align> BufferReader<'a, A> {
	/// Creates a reader at the start of `data`.
	pub fn new(data: &'a [u8]) -> Self {
		Self {
			data,
			cursor: Cursor::new(0, data.len()),
			_align: PhantomData,
		}
	}

	/// Creates a reader at `pos` in `data`, failing if `pos` is past the end.
	pub fn at(data: &'a [u8], pos: usize) -> Result<Self> {
		let mut reader = Self::new(data);
		reader.cursor.seek(pos)?;
		Ok(reader)
	}

	/// Returns the underlying slice.
	#[inline]
	pub fn get_ref(&self) -> &'a [u8] { self.data }

	/// Returns the bytes from the position to the end.
	#[inline]
	pub fn remaining_slice(&self) -> &'a [u8] {
		&self.data[self.cursor.position()..]
	}

	/// Reads `count` raw bytes without copying. The slice borrows the underlying
	/// data rather than the reader, so it outlives further reads.
	pub fn read_slice(&mut self, count: usize) -> Result<&'a [u8]> {
		let pos = self.cursor.position();
		self.cursor.check(Read, pos, count)?;
		self.cursor.advance(count);
		Ok(&self.data[pos..pos + count])
	}
}

impl<A: Align> Seekable for BufferReader<'_, A> {
	#[inline]
	fn position(&self) -> usize { self.cursor.position() }

	#[inline]
	fn len(&self) -> usize { self.cursor.len() }

	fn seek(&mut self, pos: usize) -> Result<usize> {
		self.cursor.seek(pos)
	}
}

impl<A: Align> BinaryRead for BufferReader<'_, A> {
	fn read_bytes(&mut self, count: usize) -> Result<Cow<'_, [u8]>> {
		self.read_slice(count).map(Cow::Borrowed)
	}

	fn read_vec(&mut self, count: usize) -> Result<Vec<u8>> {
		self.read_slice(count).map(<[u8]>::to_vec)
	}

	fn read<T: Primitive>(&mut self, endian: Endian) -> Result<T> {
		let start = self.cursor.position();
		let Some(pos) = A::align(start, T::SIZE) else {
			return Err(Error::eod(Read, start, self.cursor.len()))
		};
		self.cursor.check(Read, pos, T::SIZE)?;
		let value = T::decode(&self.data[pos..], endian);
		self.cursor.seek_unbounded(pos + T::SIZE);
		Ok(value)
	}
}

impl<'a, A: Align> From<&'a [u8]> for BufferReader<'a, A> {
	fn from(value: &'a [u8]) -> Self {
		Self::new(value)
	}
}
