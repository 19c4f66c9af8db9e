// SPDX-License-Identifier: Apache-2.0

use std::borrow::Cow;
use std::fs::File;
use std::path::Path;
use log::{debug, trace};
use crate::{BinaryRead, Cursor, Endian, Error, Primitive, Result, ResultContext, Seekable};
use crate::OperationKind::{self, Open, Read, Seek};
use super::{FileIo, FileOptions, OpenMode};
use super::io::to_position;
use super::window::ReadWindow;

/// Reads values from a file through a read-ahead cache window.
///
/// The window holds up to [`buffer_size`](FileOptions::buffer_size) bytes of the
/// file from around the position. Reads served by the window borrow from it;
/// reads the window can't serve refill it at the position with one call to the
/// file. Reads larger than the window go to the file directly. Seeking within
/// the cached range never touches the file.
///
/// The length is the file size when the reader was created.
#[derive(Debug)]
pub struct BufferedFileReader<F: FileIo = File> {
	io: F,
	cursor: Cursor,
	window: ReadWindow,
}

impl BufferedFileReader {
	/// Opens the file at `path`, in [`Read`](OpenMode::Read) mode unless set
	/// otherwise by `options`.
	pub fn open(path: impl AsRef<Path>, options: FileOptions) -> Result<Self> {
		let file = options.mode_or(OpenMode::Read).open(path)?;
		Self::with_options(file, options)
	}
}

impl<F: FileIo> BufferedFileReader<F> {
	/// Creates a reader over `io` with the default options.
	pub fn new(io: F) -> Result<Self> {
		Self::with_options(io, FileOptions::default())
	}

	/// Creates a reader over `io` with `options`. Fails if the starting position
	/// is past the end of the file.
	pub fn with_options(mut io: F, options: FileOptions) -> Result<Self> {
		let len = to_position(io.size().context(Open)?)?;
		let mut cursor = Cursor::new(0, len);
		cursor.seek(options.position).map_err(|err| err.with_operation(Open))?;
		debug!("opened buffered file reader at {} of {len} bytes", options.position);
		Ok(Self {
			io,
			cursor,
			window: ReadWindow::new(options.buffer_size, options.position),
		})
	}

	/// Returns a reference to the underlying file.
	pub fn get_ref(&self) -> &F { &self.io }

	/// Returns the capacity of the cache window.
	pub fn buffer_size(&self) -> usize { self.window.capacity() }

	/// Closes the reader, dropping the window and the file.
	pub fn close(self) {
		debug!("closing buffered file reader at {}", self.cursor.position());
	}

	/// Refills the window from `pos`, reading as much of the file after it as
	/// fits.
	fn refill_at(&mut self, op: OperationKind, pos: usize) -> Result {
		let count = self.window.capacity().min(self.cursor.len().saturating_sub(pos));
		let target = self.window.prepare(pos, count);
		if count == 0 {
			return Ok(())
		}

		let filled = self.io.read_at(target, pos as u64).context(op)?;
		self.window.filled(filled);
		trace!("refilled read window with {filled} bytes at {pos}");
		Ok(())
	}

	/// Refills the window at `pos` after a read emptied it. A failed refill
	/// leaves the window empty for the next read to retry, and doesn't fail the
	/// read that came before it.
	fn read_ahead(&mut self, pos: usize) {
		if let Err(err) = self.refill_at(Read, pos) {
			debug!("read-ahead at {pos} failed: {err}");
		}
	}

	/// Reads `buf.len()` bytes from the file at the position, bypassing the
	/// window. The range must be checked first.
	fn read_direct(&mut self, buf: &mut [u8]) -> Result {
		let pos = self.cursor.position();
		read_exact_at(&mut self.io, buf, pos, self.cursor.len())?;
		trace!("read {} bytes directly at {pos}", buf.len());
		self.cursor.advance(buf.len());
		self.read_ahead(pos + buf.len());
		Ok(())
	}
}

impl<F: FileIo> Seekable for BufferedFileReader<F> {
	#[inline]
	fn position(&self) -> usize { self.cursor.position() }

	#[inline]
	fn len(&self) -> usize { self.cursor.len() }

	/// Moves to `pos`. Within the cached range only the window head moves;
	/// elsewhere up to the end of the file, the window is refilled at `pos`.
	fn seek(&mut self, pos: usize) -> Result<usize> {
		if pos == self.cursor.position() {
			return Ok(pos)
		}

		if !self.window.reposition(pos) {
			if pos > self.cursor.len() {
				return Err(Error::eod(Seek, pos, self.cursor.len()))
			}
			self.refill_at(Seek, pos)?;
		}
		Ok(self.cursor.seek_unbounded(pos))
	}
}

impl<F: FileIo> BinaryRead for BufferedFileReader<F> {
	fn read_bytes(&mut self, count: usize) -> Result<Cow<'_, [u8]>> {
		let pos = self.cursor.position();
		self.cursor.check(Read, pos, count)?;
		if count == 0 {
			return Ok(Cow::Borrowed(&[]))
		}

		if count > self.window.capacity() {
			let mut buf = vec![0; count];
			self.read_direct(&mut buf)?;
			return Ok(Cow::Owned(buf))
		}

		if count > self.window.available() {
			self.refill_at(Read, pos)?;
			if count > self.window.available() {
				// The file shrank after it was opened.
				return Err(Error::eod(Read, pos + self.window.available(), self.cursor.len()))
			}
		}

		self.cursor.advance(count);
		if count == self.window.available() {
			let bytes = self.window.take(count).to_vec();
			self.read_ahead(pos + count);
			Ok(Cow::Owned(bytes))
		} else {
			Ok(Cow::Borrowed(self.window.take(count)))
		}
	}

	fn read_into(&mut self, buf: &mut [u8]) -> Result {
		let count = buf.len();
		if count > self.window.capacity() {
			self.cursor.check(Read, self.cursor.position(), count)?;
			return self.read_direct(buf)
		}

		let bytes = self.read_bytes(count)?;
		buf.copy_from_slice(&bytes);
		Ok(())
	}

	fn read<T: Primitive>(&mut self, endian: Endian) -> Result<T> {
		let bytes = self.read_bytes(T::SIZE)?;
		Ok(T::decode(&bytes, endian))
	}
}

/// Reads values from a file, accessing the file on every call.
#[derive(Debug)]
pub struct FileReader<F: FileIo = File> {
	io: F,
	cursor: Cursor,
}

impl FileReader {
	/// Opens the file at `path`, in [`Read`](OpenMode::Read) mode unless set
	/// otherwise by `options`.
	pub fn open(path: impl AsRef<Path>, options: FileOptions) -> Result<Self> {
		let file = options.mode_or(OpenMode::Read).open(path)?;
		Self::with_options(file, options)
	}
}

impl<F: FileIo> FileReader<F> {
	/// Creates a reader over `io` at the start of the file.
	pub fn new(io: F) -> Result<Self> {
		Self::with_options(io, FileOptions::default())
	}

	/// Creates a reader over `io` with `options`. Fails if the starting position
	/// is past the end of the file.
	pub fn with_options(mut io: F, options: FileOptions) -> Result<Self> {
		let len = to_position(io.size().context(Open)?)?;
		let mut cursor = Cursor::new(0, len);
		cursor.seek(options.position).map_err(|err| err.with_operation(Open))?;
		debug!("opened file reader at {} of {len} bytes", options.position);
		Ok(Self { io, cursor })
	}

	/// Returns a reference to the underlying file.
	pub fn get_ref(&self) -> &F { &self.io }

	/// Closes the reader, dropping the file.
	pub fn close(self) {
		debug!("closing file reader at {}", self.cursor.position());
	}
}

impl<F: FileIo> Seekable for FileReader<F> {
	#[inline]
	fn position(&self) -> usize { self.cursor.position() }

	#[inline]
	fn len(&self) -> usize { self.cursor.len() }

	fn seek(&mut self, pos: usize) -> Result<usize> {
		self.cursor.seek(pos)
	}
}

impl<F: FileIo> BinaryRead for FileReader<F> {
	fn read_bytes(&mut self, count: usize) -> Result<Cow<'_, [u8]>> {
		self.read_vec(count).map(Cow::Owned)
	}

	fn read_vec(&mut self, count: usize) -> Result<Vec<u8>> {
		let mut buf = vec![0; count];
		self.read_into(&mut buf)?;
		Ok(buf)
	}

	fn read_into(&mut self, buf: &mut [u8]) -> Result {
		let pos = self.cursor.position();
		self.cursor.check(Read, pos, buf.len())?;
		if buf.is_empty() {
			return Ok(())
		}
		read_exact_at(&mut self.io, buf, pos, self.cursor.len())?;
		self.cursor.advance(buf.len());
		Ok(())
	}

	fn read<T: Primitive>(&mut self, endian: Endian) -> Result<T> {
		let mut buf = [0; 8];
		let buf = &mut buf[..T::SIZE];
		self.read_into(buf)?;
		Ok(T::decode(buf, endian))
	}
}

/// Reads `buf.len()` bytes at `pos` in one call, failing with an end-of-data
/// error if the file returns fewer.
fn read_exact_at(io: &mut impl FileIo, buf: &mut [u8], pos: usize, len: usize) -> Result {
	let count = io.read_at(buf, pos as u64).context(Read)?;
	if count < buf.len() {
		return Err(Error::eod(Read, pos + count, len))
	}
	Ok(())
}
