// SPDX-License-Identifier: Apache-2.0

//! Cursors over in-memory byte regions.
//!
//! [`BufferReader`] reads from a borrowed, fixed slice; [`BufferWriter`] owns a
//! region it grows on demand. Both are generic over an [`Align`] policy: the
//! default, [`Unaligned`], accesses values at the position as-is, while
//! [`Aligned`] rounds the position up to a multiple of each value's natural
//! size first. Alignment applies to multi-byte primitives only; single bytes
//! and raw byte slices are never aligned.

mod options;
mod reader;
mod writer;

pub use options::*;
pub use reader::*;
pub use writer::*;

/// Decides where a primitive of `size` bytes is accessed, given the current
/// position.
pub trait Align {
	/// Returns the position the access starts at, or `None` if it would lie
	/// beyond `usize::MAX`.
	fn align(pos: usize, size: usize) -> Option<usize>;
}

/// Accesses values at the position as-is.
#[derive(Copy, Clone, Debug, Default)]
pub struct Unaligned;

/// Rounds the position up to the next multiple of the value's natural size.
/// Skipped bytes are padding with unspecified content.
#[derive(Copy, Clone, Debug, Default)]
pub struct Aligned;

impl Align for Unaligned {
	#[inline(always)]
	fn align(pos: usize, _: usize) -> Option<usize> { Some(pos) }
}

impl Align for Aligned {
	#[inline(always)]
	fn align(pos: usize, size: usize) -> Option<usize> {
		pos.checked_add((size - pos % size) % size)
	}
}

/// A reader rounding multi-byte accesses to their natural alignment.
pub type AlignedBufferReader<'a> = BufferReader<'a, Aligned>;

/// A growable writer rounding multi-byte accesses to their natural alignment.
pub type AlignedBufferWriter = BufferWriter<Aligned>;
