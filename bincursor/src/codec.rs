// SPDX-License-Identifier: Apache-2.0

//! The fixed-width byte codec cursors call into once bounds and alignment are
//! settled. Nothing here checks bounds; slices passed in must hold at least
//! [`Primitive::SIZE`] bytes.

use std::mem;

/// The largest integer a double-precision float represents exactly, `2^53 - 1`.
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Byte order of a multi-byte value.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Endian {
	#[default]
	Little,
	Big,
}

impl Endian {
	/// The byte order of the target platform.
	#[cfg(target_endian = "little")]
	pub const NATIVE: Self = Self::Little;
	/// The byte order of the target platform.
	#[cfg(target_endian = "big")]
	pub const NATIVE: Self = Self::Big;

	/// Returns `true` if the order is [`Little`](Self::Little).
	#[inline]
	pub fn is_little(self) -> bool {
		matches!(self, Self::Little)
	}
}

mod sealed {
	pub trait Sealed { }
}

/// A fixed-width value with a natural size of [`SIZE`](Self::SIZE) bytes.
pub trait Primitive: Copy + sealed::Sealed {
	const SIZE: usize;

	/// Decodes a value from the first `SIZE` bytes of `bytes`.
	fn decode(bytes: &[u8], endian: Endian) -> Self;

	/// Encodes the value into the first `SIZE` bytes of `bytes`.
	fn encode(self, bytes: &mut [u8], endian: Endian);
}

macro_rules! gen_primitive {
	($($ty:ident)+) => {
		$(
		impl sealed::Sealed for $ty { }

		impl Primitive for $ty {
			const SIZE: usize = mem::size_of::<$ty>();

			#[inline]
			fn decode(bytes: &[u8], endian: Endian) -> Self {
				let mut arr = [0; mem::size_of::<$ty>()];
				arr.copy_from_slice(&bytes[..Self::SIZE]);
				if endian.is_little() {
					$ty::from_le_bytes(arr)
				} else {
					$ty::from_be_bytes(arr)
				}
			}

			#[inline]
			fn encode(self, bytes: &mut [u8], endian: Endian) {
				let arr = if endian.is_little() {
					self.to_le_bytes()
				} else {
					self.to_be_bytes()
				};
				bytes[..Self::SIZE].copy_from_slice(&arr);
			}
		}
		)+
	};
}

gen_primitive! { u8 i8 u16 i16 u32 i32 u64 i64 f32 f64 }

/// Returns `value` if it is within [`MAX_SAFE_INTEGER`]. Equivalent to checking
/// that the high 32-bit word is at most `0x1FFFFF`.
#[inline]
pub fn safe_integer(value: u64) -> Option<u64> {
	(value <= MAX_SAFE_INTEGER).then_some(value)
}

/// Invokes `$callback!` with the full list of named scalar accessors, one line
/// per accessor: `type read_name write_name endian`. Every reader and writer
/// surface generates its named methods from this one list.
macro_rules! for_each_accessor {
	($callback:ident) => {
		$callback! {
			u8  read_u8     write_u8     Little,
			i8  read_i8     write_i8     Little,
			u16 read_u16_le write_u16_le Little,
			u16 read_u16_be write_u16_be Big,
			i16 read_i16_le write_i16_le Little,
			i16 read_i16_be write_i16_be Big,
			u32 read_u32_le write_u32_le Little,
			u32 read_u32_be write_u32_be Big,
			i32 read_i32_le write_i32_le Little,
			i32 read_i32_be write_i32_be Big,
			u64 read_u64_le write_u64_le Little,
			u64 read_u64_be write_u64_be Big,
			i64 read_i64_le write_i64_le Little,
			i64 read_i64_be write_i64_be Big,
			f32 read_f32_le write_f32_le Little,
			f32 read_f32_be write_f32_be Big,
			f64 read_f64_le write_f64_le Little,
			f64 read_f64_be write_f64_be Big,
		}
	};
}

pub(crate) use for_each_accessor;
