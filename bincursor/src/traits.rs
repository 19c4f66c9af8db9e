// SPDX-License-Identifier: Apache-2.0

use std::borrow::Cow;
use crate::codec::{for_each_accessor, safe_integer, Endian, Primitive};
use crate::cursor::Seekable;
use crate::{Error, OperationKind, Result};

macro_rules! read_accessors {
	($($ty:ident $read:ident $write:ident $endian:ident,)+) => {
		$(
		#[doc = concat!("Reads a `", stringify!($ty), "` in ", stringify!($endian), " endian order.")]
		#[inline]
		fn $read(&mut self) -> Result<$ty> {
			self.read::<$ty>(Endian::$endian)
		}
		)+
	};
}

macro_rules! write_accessors {
	($($ty:ident $read:ident $write:ident $endian:ident,)+) => {
		$(
		#[doc = concat!("Writes a `", stringify!($ty), "` in ", stringify!($endian), " endian order.")]
		#[inline]
		fn $write(&mut self, value: $ty) -> Result {
			self.write::<$ty>(value, Endian::$endian)
		}
		)+
	};
}

/// A cursor that decodes values from its position.
pub trait BinaryRead: Seekable {
	/// Reads `count` raw bytes. The bytes are borrowed from the cursor's storage
	/// when possible, or copied when the storage cannot lend them.
	fn read_bytes(&mut self, count: usize) -> Result<Cow<'_, [u8]>>;

	/// Decodes a primitive value.
	fn read<T: Primitive>(&mut self, endian: Endian) -> Result<T>;

	/// Reads `count` raw bytes into a new vector.
	fn read_vec(&mut self, count: usize) -> Result<Vec<u8>> {
		Ok(self.read_bytes(count)?.into_owned())
	}

	/// Fills `buf` with raw bytes. Nothing is read if fewer than `buf.len()`
	/// bytes remain.
	fn read_into(&mut self, buf: &mut [u8]) -> Result {
		let bytes = self.read_bytes(buf.len())?;
		buf.copy_from_slice(&bytes);
		Ok(())
	}

	/// Reads an unsigned 64-bit integer, failing if it cannot be represented
	/// exactly by a double-precision float. The position is left unchanged on
	/// failure, so the value can be re-read with [`read_u64_le`] or
	/// [`read_u64_be`]. If moving back fails, the unsafe integer error is still
	/// returned, with the seek error as its source.
	///
	/// [`read_u64_le`]: Self::read_u64_le
	/// [`read_u64_be`]: Self::read_u64_be
	fn read_safe_uint(&mut self, endian: Endian) -> Result<u64> {
		let start = self.position();
		let value = self.read::<u64>(endian)?;
		match safe_integer(value) {
			Some(value) => Ok(value),
			None => {
				let end = self.position();
				let err = Error::unsafe_integer(OperationKind::Read, end - u64::SIZE);
				match self.seek(start) {
					Ok(_) => Err(err),
					Err(seek) => Err(err.with_source(seek))
				}
			}
		}
	}

	/// Reads a little-endian safe integer. See [`read_safe_uint`](Self::read_safe_uint).
	#[inline]
	fn read_safe_uint_le(&mut self) -> Result<u64> {
		self.read_safe_uint(Endian::Little)
	}

	/// Reads a big-endian safe integer. See [`read_safe_uint`](Self::read_safe_uint).
	#[inline]
	fn read_safe_uint_be(&mut self) -> Result<u64> {
		self.read_safe_uint(Endian::Big)
	}

	for_each_accessor! { read_accessors }
}

/// A cursor that encodes values at its position.
pub trait BinaryWrite: Seekable {
	/// Writes raw bytes.
	fn write_bytes(&mut self, bytes: &[u8]) -> Result;

	/// Encodes a primitive value.
	fn write<T: Primitive>(&mut self, value: T, endian: Endian) -> Result;

	/// Writes any pending data to its final target.
	fn flush(&mut self) -> Result { Ok(()) }

	for_each_accessor! { write_accessors }
}

#[cfg(feature = "async")]
pub use self::nonblocking::*;

#[cfg(feature = "async")]
mod nonblocking {
	use super::*;

	macro_rules! async_read_accessors {
		($($ty:ident $read:ident $write:ident $endian:ident,)+) => {
			$(
			#[doc = concat!("Reads a `", stringify!($ty), "` in ", stringify!($endian), " endian order.")]
			async fn $read(&self) -> Result<$ty> {
				self.read::<$ty>(Endian::$endian).await
			}
			)+
		};
	}

	macro_rules! async_write_accessors {
		($($ty:ident $read:ident $write:ident $endian:ident,)+) => {
			$(
			#[doc = concat!("Writes a `", stringify!($ty), "` in ", stringify!($endian), " endian order.")]
			async fn $write(&self, value: $ty) -> Result {
				self.write::<$ty>(value, Endian::$endian).await
			}
			)+
		};
	}

	/// The position-tracking contract of asynchronous cursors. Each call claims
	/// the cursor for its duration; a call made while another is in flight fails
	/// with a busy error.
	#[allow(async_fn_in_trait)]
	pub trait AsyncSeekable {
		/// Returns the position of the next operation.
		fn position(&self) -> Result<usize>;

		/// Returns the logical length of the addressable data.
		fn len(&self) -> Result<usize>;

		/// Moves to `pos`, returning the previous position.
		async fn seek(&self, pos: usize) -> Result<usize>;

		/// Moves by `delta` relative to the current position, returning the
		/// previous position.
		async fn seek_relative(&self, delta: isize) -> Result<usize>;
	}

	/// An asynchronous cursor that decodes values from its position.
	#[allow(async_fn_in_trait)]
	pub trait AsyncBinaryRead: AsyncSeekable {
		/// Reads `count` raw bytes into a new vector.
		async fn read_vec(&self, count: usize) -> Result<Vec<u8>>;

		/// Fills `buf` with raw bytes. Nothing is read if fewer than `buf.len()`
		/// bytes remain.
		async fn read_into(&self, buf: &mut [u8]) -> Result;

		/// Decodes a primitive value.
		async fn read<T: Primitive>(&self, endian: Endian) -> Result<T>;

		/// Reads an unsigned 64-bit integer, failing if it cannot be represented
		/// exactly by a double-precision float. The position is left unchanged on
		/// failure. If moving back fails, the unsafe integer error is still
		/// returned, with the seek error as its source.
		async fn read_safe_uint(&self, endian: Endian) -> Result<u64>;

		/// Reads a little-endian safe integer.
		async fn read_safe_uint_le(&self) -> Result<u64> {
			self.read_safe_uint(Endian::Little).await
		}

		/// Reads a big-endian safe integer.
		async fn read_safe_uint_be(&self) -> Result<u64> {
			self.read_safe_uint(Endian::Big).await
		}

		for_each_accessor! { async_read_accessors }
	}

	/// An asynchronous cursor that encodes values at its position.
	#[allow(async_fn_in_trait)]
	pub trait AsyncBinaryWrite: AsyncSeekable {
		/// Writes raw bytes.
		async fn write_bytes(&self, bytes: &[u8]) -> Result;

		/// Encodes a primitive value.
		async fn write<T: Primitive>(&self, value: T, endian: Endian) -> Result;

		/// Writes any pending data to its final target.
		async fn flush(&self) -> Result;

		for_each_accessor! { async_write_accessors }
	}
}
