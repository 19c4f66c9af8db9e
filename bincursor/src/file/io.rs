// SPDX-License-Identifier: Apache-2.0

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use log::debug;
use crate::{Error, Result, ResultContext};
use crate::OperationKind::Open;

/// Positional file I/O. Every call names its file offset explicitly.
pub trait FileIo {
	/// Reads up to `buf.len()` bytes at `offset`, returning the number of bytes
	/// read.
	fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize>;

	/// Writes up to `buf.len()` bytes at `offset`, returning the number of bytes
	/// written.
	fn write_at(&mut self, buf: &[u8], offset: u64) -> io::Result<usize>;

	/// Returns the size of the file.
	fn size(&mut self) -> io::Result<u64>;
}

cfg_if::cfg_if! {
	if #[cfg(unix)] {
		use std::os::unix::fs::FileExt;

		pub(crate) fn pread(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
			FileExt::read_at(file, buf, offset)
		}

		pub(crate) fn pwrite(file: &File, buf: &[u8], offset: u64) -> io::Result<usize> {
			FileExt::write_at(file, buf, offset)
		}
	} else if #[cfg(windows)] {
		use std::os::windows::fs::FileExt;

		pub(crate) fn pread(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
			FileExt::seek_read(file, buf, offset)
		}

		pub(crate) fn pwrite(file: &File, buf: &[u8], offset: u64) -> io::Result<usize> {
			FileExt::seek_write(file, buf, offset)
		}
	} else {
		use std::io::{Read, Seek, SeekFrom, Write};

		pub(crate) fn pread(mut file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
			file.seek(SeekFrom::Start(offset))?;
			file.read(buf)
		}

		pub(crate) fn pwrite(mut file: &File, buf: &[u8], offset: u64) -> io::Result<usize> {
			file.seek(SeekFrom::Start(offset))?;
			file.write(buf)
		}
	}
}

impl FileIo for File {
	#[inline]
	fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
		pread(self, buf, offset)
	}

	#[inline]
	fn write_at(&mut self, buf: &[u8], offset: u64) -> io::Result<usize> {
		pwrite(self, buf, offset)
	}

	fn size(&mut self) -> io::Result<u64> {
		Ok(self.metadata()?.len())
	}
}

impl<F: FileIo + ?Sized> FileIo for &mut F {
	fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
		(**self).read_at(buf, offset)
	}

	fn write_at(&mut self, buf: &[u8], offset: u64) -> io::Result<usize> {
		(**self).write_at(buf, offset)
	}

	fn size(&mut self) -> io::Result<u64> {
		(**self).size()
	}
}

/// How a file is opened.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum OpenMode {
	/// Open an existing file for reading.
	#[default]
	Read,
	/// Create the file, or truncate it if it exists, for writing.
	Write,
	/// Open an existing file for reading and writing, keeping its contents.
	ReadWrite,
	/// Create the file if it doesn't exist, for reading and writing, keeping
	/// existing contents.
	Update,
}

impl OpenMode {
	/// Returns the matching [`OpenOptions`].
	pub fn options(self) -> OpenOptions {
		let mut options = OpenOptions::new();
		match self {
			Self::Read      => options.read(true),
			Self::Write     => options.write(true).create(true).truncate(true),
			Self::ReadWrite => options.read(true).write(true),
			Self::Update    => options.read(true).write(true).create(true),
		};
		options
	}

	/// Opens the file at `path` in this mode.
	pub fn open(self, path: impl AsRef<Path>) -> Result<File> {
		let path = path.as_ref();
		debug!("opening {} in {self:?} mode", path.display());
		self.options().open(path).context(Open)
	}
}

/// Converts a file size or offset to a position.
pub(crate) fn to_position(size: u64) -> Result<usize> {
	usize::try_from(size).map_err(|_|
		Error::other(Open, "file size exceeds the addressable range", None)
	)
}

#[cfg(feature = "async")]
pub use self::nonblocking::*;

#[cfg(feature = "async")]
mod nonblocking {
	use std::sync::Arc;
	use tokio::task::spawn_blocking;
	use super::*;

	/// Positional asynchronous file I/O. Every call names its file offset
	/// explicitly.
	#[allow(async_fn_in_trait)]
	pub trait AsyncFileIo {
		/// Reads up to `buf.len()` bytes at `offset`, returning the number of
		/// bytes read.
		async fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize>;

		/// Writes up to `buf.len()` bytes at `offset`, returning the number of
		/// bytes written.
		async fn write_at(&mut self, buf: &[u8], offset: u64) -> io::Result<usize>;

		/// Returns the size of the file.
		async fn size(&mut self) -> io::Result<u64>;
	}

	/// A file whose positional reads and writes run on the blocking thread pool,
	/// suspending the calling task until they complete.
	#[derive(Clone, Debug)]
	pub struct AsyncFile {
		file: Arc<File>,
	}

	impl From<File> for AsyncFile {
		fn from(value: File) -> Self {
			Self { file: Arc::new(value) }
		}
	}

	impl AsyncFile {
		/// Opens the file at `path` in `mode`.
		pub async fn open(path: impl AsRef<Path>, mode: OpenMode) -> Result<Self> {
			let path = path.as_ref();
			debug!("opening {} in {mode:?} mode", path.display());
			let file = tokio::fs::OpenOptions::from(mode.options())
				.open(path)
				.await
				.context(Open)?;
			Ok(file.into_std().await.into())
		}

		/// Returns the underlying file.
		pub fn get_ref(&self) -> &File { &self.file }
	}

	fn join_error(error: tokio::task::JoinError) -> io::Error {
		io::Error::other(error)
	}

	impl AsyncFileIo for AsyncFile {
		async fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
			let file = Arc::clone(&self.file);
			let len = buf.len();
			let (data, count) = spawn_blocking(move || {
				let mut data = vec![0; len];
				pread(&file, &mut data, offset).map(|count| (data, count))
			}).await.map_err(join_error)??;
			buf[..count].copy_from_slice(&data[..count]);
			Ok(count)
		}

		async fn write_at(&mut self, buf: &[u8], offset: u64) -> io::Result<usize> {
			let file = Arc::clone(&self.file);
			let data = buf.to_vec();
			spawn_blocking(move || pwrite(&file, &data, offset))
				.await
				.map_err(join_error)?
		}

		async fn size(&mut self) -> io::Result<u64> {
			let file = Arc::clone(&self.file);
			spawn_blocking(move || Ok(file.metadata()?.len()))
				.await
				.map_err(join_error)?
		}
	}

	impl<F: AsyncFileIo + ?Sized> AsyncFileIo for &mut F {
		async fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
			(**self).read_at(buf, offset).await
		}

		async fn write_at(&mut self, buf: &[u8], offset: u64) -> io::Result<usize> {
			(**self).write_at(buf, offset).await
		}

		async fn size(&mut self) -> io::Result<u64> {
			(**self).size().await
		}
	}
}
