// SPDX-License-Identifier: Apache-2.0

//! Asynchronous file cursors.
//!
//! Each cursor keeps its state behind a [`Mutex`] and claims it with
//! [`Mutex::try_lock`] for the duration of every operation. A call made while
//! another operation holds the state fails with [`Error::busy`] without
//! touching the position, the window, or the file.

use std::path::Path;
use log::{debug, trace, warn};
use tokio::sync::{Mutex, MutexGuard};
use crate::{AsyncBinaryRead, AsyncBinaryWrite, AsyncSeekable, Cursor, Endian, Error, Primitive, Result, ResultContext};
use crate::codec::safe_integer;
use crate::OperationKind::{self, Close, Flush, Open, Read, Seek, Write};
use super::{AsyncFile, AsyncFileIo, FileOptions, OpenMode};
use super::io::to_position;
use super::window::{ReadWindow, WriteWindow};

const QUERY: OperationKind = OperationKind::Other("query");

fn claim<S>(state: &Mutex<S>, op: OperationKind) -> Result<MutexGuard<'_, S>> {
	state.try_lock().map_err(|_| Error::busy(op))
}

async fn read_exact_at(io: &mut impl AsyncFileIo, buf: &mut [u8], pos: usize, len: usize) -> Result {
	let count = io.read_at(buf, pos as u64).await.context(Read)?;
	if count < buf.len() {
		return Err(Error::eod(Read, pos + count, len))
	}
	Ok(())
}

async fn write_exact_at(io: &mut impl AsyncFileIo, op: OperationKind, bytes: &[u8], pos: usize) -> Result {
	let written = io.write_at(bytes, pos as u64).await.context(op)?;
	if written < bytes.len() {
		return Err(Error::incomplete_write(op, bytes.len(), written))
	}
	Ok(())
}

trait ReadState {
	fn cursor(&self) -> &Cursor;

	async fn seek(&mut self, pos: usize) -> Result<usize>;

	async fn read_into(&mut self, buf: &mut [u8]) -> Result;
}

trait WriteState {
	fn cursor(&self) -> &Cursor;

	async fn seek(&mut self, pos: usize) -> Result<usize>;

	async fn write_bytes(&mut self, bytes: &[u8]) -> Result;

	async fn flush(&mut self) -> Result;
}

macro_rules! seekable {
	($($ty:ident)+) => {
		$(
		impl<F: AsyncFileIo> AsyncSeekable for $ty<F> {
			fn position(&self) -> Result<usize> {
				Ok(claim(&self.state, QUERY)?.cursor().position())
			}

			fn len(&self) -> Result<usize> {
				Ok(claim(&self.state, QUERY)?.cursor().len())
			}

			async fn seek(&self, pos: usize) -> Result<usize> {
				let mut state = claim(&self.state, Seek)?;
				let prev = state.seek(pos).await?;
				Ok(prev)
			}

			async fn seek_relative(&self, delta: isize) -> Result<usize> {
				let mut state = claim(&self.state, Seek)?;
				let pos = state.cursor().offset(delta)?;
				let prev = state.seek(pos).await?;
				Ok(prev)
			}
		}
		)+
	};
}

macro_rules! binary_read {
	($($ty:ident)+) => {
		$(
		impl<F: AsyncFileIo> AsyncBinaryRead for $ty<F> {
			async fn read_vec(&self, count: usize) -> Result<Vec<u8>> {
				let mut state = claim(&self.state, Read)?;
				let mut buf = vec![0; count];
				state.read_into(&mut buf).await?;
				Ok(buf)
			}

			async fn read_into(&self, buf: &mut [u8]) -> Result {
				let mut state = claim(&self.state, Read)?;
				state.read_into(buf).await?;
				Ok(())
			}

			async fn read<T: Primitive>(&self, endian: Endian) -> Result<T> {
				let mut state = claim(&self.state, Read)?;
				let mut buf = [0; 8];
				let buf = &mut buf[..T::SIZE];
				state.read_into(buf).await?;
				Ok(T::decode(buf, endian))
			}

			async fn read_safe_uint(&self, endian: Endian) -> Result<u64> {
				let mut state = claim(&self.state, Read)?;
				let start = state.cursor().position();
				let mut buf = [0; 8];
				state.read_into(&mut buf).await?;
				match safe_integer(u64::decode(&buf, endian)) {
					Some(value) => Ok(value),
					None => {
						let rewind = state.seek(start).await;
						let err = Error::unsafe_integer(Read, start);
						match rewind {
							Ok(_) => Err(err),
							Err(seek) => Err(err.with_source(seek))
						}
					}
				}
			}
		}
		)+
	};
}

macro_rules! binary_write {
	($($ty:ident)+) => {
		$(
		impl<F: AsyncFileIo> AsyncBinaryWrite for $ty<F> {
			async fn write_bytes(&self, bytes: &[u8]) -> Result {
				let mut state = claim(&self.state, Write)?;
				state.write_bytes(bytes).await?;
				Ok(())
			}

			async fn write<T: Primitive>(&self, value: T, endian: Endian) -> Result {
				let mut state = claim(&self.state, Write)?;
				let mut buf = [0; 8];
				let buf = &mut buf[..T::SIZE];
				value.encode(buf, endian);
				state.write_bytes(buf).await?;
				Ok(())
			}

			async fn flush(&self) -> Result {
				let mut state = claim(&self.state, Flush)?;
				state.flush().await?;
				Ok(())
			}
		}
		)+
	};
}

seekable! {
	AsyncBufferedFileReader
	AsyncFileReader
	AsyncBufferedFileWriter
	AsyncFileWriter
}

binary_read! {
	AsyncBufferedFileReader
	AsyncFileReader
}

binary_write! {
	AsyncBufferedFileWriter
	AsyncFileWriter
}

async fn open_reader_state<F: AsyncFileIo>(mut io: F, options: &FileOptions) -> Result<(F, Cursor)> {
	let len = to_position(io.size().await.context(Open)?)?;
	let mut cursor = Cursor::new(0, len);
	cursor.seek(options.position).map_err(|err| err.with_operation(Open))?;
	Ok((io, cursor))
}

async fn open_writer_state<F: AsyncFileIo>(mut io: F, options: &FileOptions) -> Result<(F, Cursor)> {
	let len = to_position(io.size().await.context(Open)?)?;
	Ok((io, Cursor::new(options.position, len)))
}

/// Reads values from a file through a read-ahead cache window, asynchronously.
/// See [`BufferedFileReader`](super::BufferedFileReader) for how the window
/// behaves.
#[derive(Debug)]
pub struct AsyncBufferedFileReader<F: AsyncFileIo = AsyncFile> {
	state: Mutex<BufferedReadState<F>>,
}

#[derive(Debug)]
struct BufferedReadState<F> {
	io: F,
	cursor: Cursor,
	window: ReadWindow,
}

impl AsyncBufferedFileReader {
	/// Opens the file at `path`, in [`Read`](OpenMode::Read) mode unless set
	/// otherwise by `options`.
	pub async fn open(path: impl AsRef<Path>, options: FileOptions) -> Result<Self> {
		let file = AsyncFile::open(path, options.mode_or(OpenMode::Read)).await?;
		Self::with_options(file, options).await
	}
}

impl<F: AsyncFileIo> AsyncBufferedFileReader<F> {
	/// Creates a reader over `io` with the default options.
	pub async fn new(io: F) -> Result<Self> {
		Self::with_options(io, FileOptions::default()).await
	}

	/// Creates a reader over `io` with `options`. Fails if the starting position
	/// is past the end of the file.
	pub async fn with_options(io: F, options: FileOptions) -> Result<Self> {
		let (io, cursor) = open_reader_state(io, &options).await?;
		debug!("opened asynchronous buffered file reader at {} of {} bytes", cursor.position(), cursor.len());
		let window = ReadWindow::new(options.buffer_size, options.position);
		Ok(Self {
			state: Mutex::new(BufferedReadState { io, cursor, window })
		})
	}

	/// Closes the reader. Fails if an operation is in progress.
	pub async fn close(self) -> Result {
		let state = claim(&self.state, Close)?;
		debug!("closing asynchronous buffered file reader at {}", state.cursor.position());
		Ok(())
	}

	/// Consumes the reader, returning the underlying file.
	pub fn into_inner(self) -> F {
		self.state.into_inner().io
	}
}

impl<F: AsyncFileIo> BufferedReadState<F> {
	async fn refill_at(&mut self, op: OperationKind, pos: usize) -> Result {
		let count = self.window.capacity().min(self.cursor.len().saturating_sub(pos));
		let target = self.window.prepare(pos, count);
		if count == 0 {
			return Ok(())
		}

		let filled = self.io.read_at(target, pos as u64).await.context(op)?;
		self.window.filled(filled);
		trace!("refilled read window with {filled} bytes at {pos}");
		Ok(())
	}

	/// Refills the window at `pos` after a read emptied it. A failed refill
	/// leaves the window empty for the next read to retry.
	async fn read_ahead(&mut self, pos: usize) {
		if let Err(err) = self.refill_at(Read, pos).await {
			debug!("read-ahead at {pos} failed: {err}");
		}
	}
}

impl<F: AsyncFileIo> ReadState for BufferedReadState<F> {
	fn cursor(&self) -> &Cursor { &self.cursor }

	async fn seek(&mut self, pos: usize) -> Result<usize> {
		if pos == self.cursor.position() {
			return Ok(pos)
		}

		if !self.window.reposition(pos) {
			if pos > self.cursor.len() {
				return Err(Error::eod(Seek, pos, self.cursor.len()))
			}
			self.refill_at(Seek, pos).await?;
		}
		Ok(self.cursor.seek_unbounded(pos))
	}

	async fn read_into(&mut self, buf: &mut [u8]) -> Result {
		let count = buf.len();
		let pos = self.cursor.position();
		self.cursor.check(Read, pos, count)?;
		if count == 0 {
			return Ok(())
		}

		if count > self.window.capacity() {
			read_exact_at(&mut self.io, buf, pos, self.cursor.len()).await?;
			trace!("read {count} bytes directly at {pos}");
			self.cursor.advance(count);
			self.read_ahead(pos + count).await;
			return Ok(())
		}

		if count > self.window.available() {
			self.refill_at(Read, pos).await?;
			if count > self.window.available() {
				return Err(Error::eod(Read, pos + self.window.available(), self.cursor.len()))
			}
		}

		buf.copy_from_slice(self.window.take(count));
		self.cursor.advance(count);
		if self.window.available() == 0 {
			self.read_ahead(pos + count).await;
		}
		Ok(())
	}
}

/// Reads values from a file asynchronously, accessing the file on every call.
#[derive(Debug)]
pub struct AsyncFileReader<F: AsyncFileIo = AsyncFile> {
	state: Mutex<ReadStateUnbuffered<F>>,
}

#[derive(Debug)]
struct ReadStateUnbuffered<F> {
	io: F,
	cursor: Cursor,
}

impl AsyncFileReader {
	/// Opens the file at `path`, in [`Read`](OpenMode::Read) mode unless set
	/// otherwise by `options`.
	pub async fn open(path: impl AsRef<Path>, options: FileOptions) -> Result<Self> {
		let file = AsyncFile::open(path, options.mode_or(OpenMode::Read)).await?;
		Self::with_options(file, options).await
	}
}

impl<F: AsyncFileIo> AsyncFileReader<F> {
	/// Creates a reader over `io` at the start of the file.
	pub async fn new(io: F) -> Result<Self> {
		Self::with_options(io, FileOptions::default()).await
	}

	/// Creates a reader over `io` with `options`. Fails if the starting position
	/// is past the end of the file.
	pub async fn with_options(io: F, options: FileOptions) -> Result<Self> {
		let (io, cursor) = open_reader_state(io, &options).await?;
		debug!("opened asynchronous file reader at {} of {} bytes", cursor.position(), cursor.len());
		Ok(Self {
			state: Mutex::new(ReadStateUnbuffered { io, cursor })
		})
	}

	/// Closes the reader. Fails if an operation is in progress.
	pub async fn close(self) -> Result {
		let state = claim(&self.state, Close)?;
		debug!("closing asynchronous file reader at {}", state.cursor.position());
		Ok(())
	}

	/// Consumes the reader, returning the underlying file.
	pub fn into_inner(self) -> F {
		self.state.into_inner().io
	}
}

impl<F: AsyncFileIo> ReadState for ReadStateUnbuffered<F> {
	fn cursor(&self) -> &Cursor { &self.cursor }

	async fn seek(&mut self, pos: usize) -> Result<usize> {
		self.cursor.seek(pos)
	}

	async fn read_into(&mut self, buf: &mut [u8]) -> Result {
		let pos = self.cursor.position();
		self.cursor.check(Read, pos, buf.len())?;
		if buf.is_empty() {
			return Ok(())
		}
		read_exact_at(&mut self.io, buf, pos, self.cursor.len()).await?;
		self.cursor.advance(buf.len());
		Ok(())
	}
}

/// Writes values to a file through a write-behind cache window, asynchronously.
/// See [`BufferedFileWriter`](super::BufferedFileWriter) for how the window
/// behaves.
///
/// Pending data can't be flushed on drop, as that would block. Dropping the
/// writer with unflushed data logs a warning and loses the data; call
/// [`close`](Self::close) first.
#[derive(Debug)]
pub struct AsyncBufferedFileWriter<F: AsyncFileIo = AsyncFile> {
	state: Mutex<BufferedWriteState<F>>,
}

#[derive(Debug)]
struct BufferedWriteState<F> {
	io: F,
	cursor: Cursor,
	window: WriteWindow,
	closed: bool,
}

impl AsyncBufferedFileWriter {
	/// Opens the file at `path`, in [`Write`](OpenMode::Write) mode unless set
	/// otherwise by `options`.
	pub async fn open(path: impl AsRef<Path>, options: FileOptions) -> Result<Self> {
		let file = AsyncFile::open(path, options.mode_or(OpenMode::Write)).await?;
		Self::with_options(file, options).await
	}
}

impl<F: AsyncFileIo> AsyncBufferedFileWriter<F> {
	/// Creates a writer over `io` with the default options.
	pub async fn new(io: F) -> Result<Self> {
		Self::with_options(io, FileOptions::default()).await
	}

	/// Creates a writer over `io` with `options`.
	pub async fn with_options(io: F, options: FileOptions) -> Result<Self> {
		let (io, cursor) = open_writer_state(io, &options).await?;
		debug!("opened asynchronous buffered file writer at {} of {} bytes", cursor.position(), cursor.len());
		let window = WriteWindow::new(options.buffer_size, options.position);
		Ok(Self {
			state: Mutex::new(BufferedWriteState { io, cursor, window, closed: false })
		})
	}

	/// Returns the number of bytes waiting to be flushed.
	pub fn pending(&self) -> Result<usize> {
		Ok(claim(&self.state, QUERY)?.window.pending().len())
	}

	/// Flushes pending data and closes the writer. Fails if an operation is in
	/// progress.
	pub async fn close(self) -> Result {
		let mut state = claim(&self.state, Close)?;
		state.closed = true;
		debug!("closing asynchronous buffered file writer at {}", state.cursor.position());
		state.flush_window(Close).await?;
		Ok(())
	}
}

impl<F: AsyncFileIo> Drop for AsyncBufferedFileWriter<F> {
	fn drop(&mut self) {
		let state = self.state.get_mut();
		if !state.closed && !state.window.is_empty() {
			warn!(
				"asynchronous buffered file writer dropped with {} unflushed bytes",
				state.window.pending().len()
			);
		}
	}
}

impl<F: AsyncFileIo> BufferedWriteState<F> {
	async fn flush_window(&mut self, op: OperationKind) -> Result {
		if !self.window.is_empty() {
			let start = self.window.start();
			let pending = self.window.pending();
			write_exact_at(&mut self.io, op, pending, start).await?;
			trace!("flushed {} bytes at {start}", pending.len());
		}

		self.window.reset(self.cursor.position());
		Ok(())
	}
}

impl<F: AsyncFileIo> WriteState for BufferedWriteState<F> {
	fn cursor(&self) -> &Cursor { &self.cursor }

	async fn seek(&mut self, pos: usize) -> Result<usize> {
		self.flush_window(Seek).await?;
		self.window.reset(pos);
		Ok(self.cursor.seek_unbounded(pos))
	}

	async fn write_bytes(&mut self, bytes: &[u8]) -> Result {
		let pos = self.cursor.position();
		if self.window.fits(bytes.len()) {
			self.window.push(pos, bytes);
		} else {
			self.flush_window(Write).await?;
			write_exact_at(&mut self.io, Write, bytes, pos).await?;
			trace!("wrote {} bytes directly at {pos}", bytes.len());
		}

		self.cursor.advance_extending(bytes.len());
		Ok(())
	}

	async fn flush(&mut self) -> Result {
		self.flush_window(Flush).await
	}
}

/// Writes values to a file asynchronously, accessing the file on every call.
#[derive(Debug)]
pub struct AsyncFileWriter<F: AsyncFileIo = AsyncFile> {
	state: Mutex<WriteStateUnbuffered<F>>,
}

#[derive(Debug)]
struct WriteStateUnbuffered<F> {
	io: F,
	cursor: Cursor,
}

impl AsyncFileWriter {
	/// Opens the file at `path`, in [`Write`](OpenMode::Write) mode unless set
	/// otherwise by `options`.
	pub async fn open(path: impl AsRef<Path>, options: FileOptions) -> Result<Self> {
		let file = AsyncFile::open(path, options.mode_or(OpenMode::Write)).await?;
		Self::with_options(file, options).await
	}
}

impl<F: AsyncFileIo> AsyncFileWriter<F> {
	/// Creates a writer over `io` at the start of the file.
	pub async fn new(io: F) -> Result<Self> {
		Self::with_options(io, FileOptions::default()).await
	}

	/// Creates a writer over `io` with `options`.
	pub async fn with_options(io: F, options: FileOptions) -> Result<Self> {
		let (io, cursor) = open_writer_state(io, &options).await?;
		debug!("opened asynchronous file writer at {} of {} bytes", cursor.position(), cursor.len());
		Ok(Self {
			state: Mutex::new(WriteStateUnbuffered { io, cursor })
		})
	}

	/// Closes the writer. Fails if an operation is in progress.
	pub async fn close(self) -> Result {
		let state = claim(&self.state, Close)?;
		debug!("closing asynchronous file writer at {}", state.cursor.position());
		Ok(())
	}

	/// Consumes the writer, returning the underlying file.
	pub fn into_inner(self) -> F {
		self.state.into_inner().io
	}
}

impl<F: AsyncFileIo> WriteState for WriteStateUnbuffered<F> {
	fn cursor(&self) -> &Cursor { &self.cursor }

	async fn seek(&mut self, pos: usize) -> Result<usize> {
		Ok(self.cursor.seek_unbounded(pos))
	}

	async fn write_bytes(&mut self, bytes: &[u8]) -> Result {
		let pos = self.cursor.position();
		write_exact_at(&mut self.io, Write, bytes, pos).await?;
		self.cursor.advance_extending(bytes.len());
		Ok(())
	}

	async fn flush(&mut self) -> Result { Ok(()) }
}
