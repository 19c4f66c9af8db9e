// SPDX-License-Identifier: Apache-2.0

use std::fs::File;
use std::path::Path;
use log::{debug, trace, warn};
use crate::{BinaryWrite, Cursor, Endian, Error, Primitive, Result, ResultContext, Seekable};
use crate::OperationKind::{self, Close, Flush, Open, Seek, Write};
use super::{FileIo, FileOptions, OpenMode};
use super::io::to_position;
use super::window::WriteWindow;

/// Writes values to a file through a write-behind cache window.
///
/// Writes that fit in the window's free space are collected there, then
/// written to the file in one call when the window fills, the cursor seeks,
/// or the writer is flushed or closed. Larger writes flush the window and go to
/// the file directly. Pending data is flushed on drop, logging any error; call
/// [`close`](Self::close) to observe it instead.
///
/// The length starts as the file size and grows as writes pass the end.
/// Seeking past the end is allowed; the gap is filled by the file system when
/// the next write lands.
#[derive(Debug)]
pub struct BufferedFileWriter<F: FileIo = File> {
	io: F,
	cursor: Cursor,
	window: WriteWindow,
	closed: bool,
}

impl BufferedFileWriter {
	/// Opens the file at `path`, in [`Write`](OpenMode::Write) mode unless set
	/// otherwise by `options`.
	pub fn open(path: impl AsRef<Path>, options: FileOptions) -> Result<Self> {
		let file = options.mode_or(OpenMode::Write).open(path)?;
		Self::with_options(file, options)
	}
}

impl<F: FileIo> BufferedFileWriter<F> {
	/// Creates a writer over `io` with the default options.
	pub fn new(io: F) -> Result<Self> {
		Self::with_options(io, FileOptions::default())
	}

	/// Creates a writer over `io` with `options`.
	pub fn with_options(mut io: F, options: FileOptions) -> Result<Self> {
		let len = to_position(io.size().context(Open)?)?;
		let position = options.position;
		debug!("opened buffered file writer at {position} of {len} bytes");
		Ok(Self {
			io,
			cursor: Cursor::new(position, len),
			window: WriteWindow::new(options.buffer_size, position),
			closed: false,
		})
	}

	/// Returns a reference to the underlying file.
	pub fn get_ref(&self) -> &F { &self.io }

	/// Returns the number of bytes waiting to be flushed.
	pub fn pending(&self) -> usize { self.window.pending().len() }

	/// Flushes pending data and closes the writer.
	pub fn close(mut self) -> Result {
		self.close_inner()
	}

	fn close_inner(&mut self) -> Result {
		if self.closed {
			return Ok(())
		}

		self.closed = true;
		debug!("closing buffered file writer at {}", self.cursor.position());
		self.flush_window(Close)
	}

	/// Writes the pending data at the window start, then moves the empty window
	/// to the position.
	fn flush_window(&mut self, op: OperationKind) -> Result {
		if !self.window.is_empty() {
			let start = self.window.start();
			let pending = self.window.pending();
			write_exact_at(&mut self.io, op, pending, start)?;
			trace!("flushed {} bytes at {start}", pending.len());
		}

		self.window.reset(self.cursor.position());
		Ok(())
	}
}

impl<F: FileIo> Drop for BufferedFileWriter<F> {
	fn drop(&mut self) {
		if let Err(err) = self.close_inner() {
			warn!("buffered file writer dropped with unflushed data: {err}");
		}
	}
}

impl<F: FileIo> Seekable for BufferedFileWriter<F> {
	#[inline]
	fn position(&self) -> usize { self.cursor.position() }

	#[inline]
	fn len(&self) -> usize { self.cursor.len() }

	/// Flushes pending data, then moves to `pos`. Any position is accepted.
	fn seek(&mut self, pos: usize) -> Result<usize> {
		self.flush_window(Seek)?;
		self.window.reset(pos);
		Ok(self.cursor.seek_unbounded(pos))
	}
}

impl<F: FileIo> BinaryWrite for BufferedFileWriter<F> {
	fn write_bytes(&mut self, bytes: &[u8]) -> Result {
		let pos = self.cursor.position();
		if self.window.fits(bytes.len()) {
			self.window.push(pos, bytes);
		} else {
			self.flush_window(Write)?;
			write_exact_at(&mut self.io, Write, bytes, pos)?;
			trace!("wrote {} bytes directly at {pos}", bytes.len());
		}

		self.cursor.advance_extending(bytes.len());
		Ok(())
	}

	fn write<T: Primitive>(&mut self, value: T, endian: Endian) -> Result {
		let mut buf = [0; 8];
		let buf = &mut buf[..T::SIZE];
		value.encode(buf, endian);
		self.write_bytes(buf)
	}

	fn flush(&mut self) -> Result {
		self.flush_window(Flush)
	}
}

/// Writes values to a file, accessing the file on every call.
#[derive(Debug)]
pub struct FileWriter<F: FileIo = File> {
	io: F,
	cursor: Cursor,
}

impl FileWriter {
	/// Opens the file at `path`, in [`Write`](OpenMode::Write) mode unless set
	/// otherwise by `options`.
	pub fn open(path: impl AsRef<Path>, options: FileOptions) -> Result<Self> {
		let file = options.mode_or(OpenMode::Write).open(path)?;
		Self::with_options(file, options)
	}
}

impl<F: FileIo> FileWriter<F> {
	/// Creates a writer over `io` at the start of the file.
	pub fn new(io: F) -> Result<Self> {
		Self::with_options(io, FileOptions::default())
	}

	/// Creates a writer over `io` with `options`.
	pub fn with_options(mut io: F, options: FileOptions) -> Result<Self> {
		let len = to_position(io.size().context(Open)?)?;
		debug!("opened file writer at {} of {len} bytes", options.position);
		Ok(Self { io, cursor: Cursor::new(options.position, len) })
	}

	/// Returns a reference to the underlying file.
	pub fn get_ref(&self) -> &F { &self.io }

	/// Closes the writer, dropping the file.
	pub fn close(self) {
		debug!("closing file writer at {}", self.cursor.position());
	}
}

impl<F: FileIo> Seekable for FileWriter<F> {
	#[inline]
	fn position(&self) -> usize { self.cursor.position() }

	#[inline]
	fn len(&self) -> usize { self.cursor.len() }

	/// Moves to `pos`. Any position is accepted.
	fn seek(&mut self, pos: usize) -> Result<usize> {
		Ok(self.cursor.seek_unbounded(pos))
	}
}

impl<F: FileIo> BinaryWrite for FileWriter<F> {
	fn write_bytes(&mut self, bytes: &[u8]) -> Result {
		let pos = self.cursor.position();
		write_exact_at(&mut self.io, Write, bytes, pos)?;
		self.cursor.advance_extending(bytes.len());
		Ok(())
	}

	fn write<T: Primitive>(&mut self, value: T, endian: Endian) -> Result {
		let mut buf = [0; 8];
		let buf = &mut buf[..T::SIZE];
		value.encode(buf, endian);
		self.write_bytes(buf)
	}
}

/// Writes `bytes` at `pos` in one call, failing with an incomplete write error
/// if the file accepts fewer.
fn write_exact_at(io: &mut impl FileIo, op: OperationKind, bytes: &[u8], pos: usize) -> Result {
	let written = io.write_at(bytes, pos as u64).context(op)?;
	if written < bytes.len() {
		return Err(Error::incomplete_write(op, bytes.len(), written))
	}
	Ok(())
}
