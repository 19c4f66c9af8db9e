// SPDX-License-Identifier: Apache-2.0

use crate::{DEFAULT_ALLOCATE_SIZE, DEFAULT_CAPACITY};

/// Options for tuning [`BufferWriter`](super::BufferWriter)'s growth.
///
/// # Initial capacity
///
/// The size of the region allocated when the writer is created. Defaults to
/// `1024B`.
///
/// # Auto-allocation
///
/// When a write reaches past the end of the region, the writer allocates a
/// larger one, copies the existing bytes over and drops the old region. The
/// region grows in multiples of the allocation size, `1024B` by default, by
/// at least enough multiples to hold the value being written. With
/// auto-allocation disabled, or an allocation size of zero, such writes fail
/// with an end-of-data error instead.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct WriterOptions {
	pub initial_capacity: usize,
	pub auto_allocate: bool,
	pub auto_allocate_size: usize,
}

impl Default for WriterOptions {
	fn default() -> Self { Self::new() }
}

impl WriterOptions {
	/// Creates a new set of writer options.
	pub const fn new() -> Self {
		Self {
			initial_capacity: DEFAULT_CAPACITY,
			auto_allocate: true,
			auto_allocate_size: DEFAULT_ALLOCATE_SIZE,
		}
	}

	/// Presets the options to create a fixed-size writer, which never grows past
	/// its initial capacity.
	#[inline]
	pub const fn fixed(capacity: usize) -> Self {
		Self {
			initial_capacity: capacity,
			auto_allocate: false,
			..Self::new()
		}
	}

	/// Returns `true` if writes past the end grow the region.
	#[inline]
	pub const fn grows(&self) -> bool {
		self.auto_allocate && self.auto_allocate_size > 0
	}

	/// Returns the number of bytes to extend a region by, for a write of `count`
	/// bytes that reaches `extra` bytes past its end. This is `count` rounded up
	/// to a multiple of the allocation size, or `extra` rounded up if the
	/// position already lies past the end. Returns `None` if the growth doesn't
	/// fit in a `usize`.
	///
	/// # Panics
	///
	/// Panics if the allocation size is zero; check [`grows`](Self::grows)
	/// first.
	#[inline]
	pub const fn growth(&self, count: usize, extra: usize) -> Option<usize> {
		let size = self.auto_allocate_size;
		let units = count.div_ceil(size);
		let extra_units = extra.div_ceil(size);
		let units = if extra_units > units { extra_units } else { units };
		units.checked_mul(size)
	}

	/// Sets the initial capacity.
	#[inline]
	pub const fn with_initial_capacity(mut self, value: usize) -> Self {
		self.initial_capacity = value;
		self
	}

	/// Sets whether writes past the end grow the region.
	#[inline]
	pub const fn with_auto_allocate(mut self, value: bool) -> Self {
		self.auto_allocate = value;
		self
	}

	/// Sets the allocation size.
	#[inline]
	pub const fn with_auto_allocate_size(mut self, value: usize) -> Self {
		self.auto_allocate_size = value;
		self
	}
}
