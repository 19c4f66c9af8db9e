// SPDX-License-Identifier: Apache-2.0

use crate::DEFAULT_WINDOW_SIZE;
use super::OpenMode;

/// Options for file cursors.
///
/// # Position
///
/// The position the cursor starts at. Defaults to `0`. Readers fail to open if
/// it lies past the end of the file; writers accept any position.
///
/// # Buffer size
///
/// The capacity of a buffered cursor's cache window, `4096B` by default.
/// Reads and writes larger than the window bypass it. Unbuffered cursors ignore
/// this option.
///
/// # Mode
///
/// How a file is opened by the `open` constructors. When unset, readers open in
/// [`Read`](OpenMode::Read) mode and writers in [`Write`](OpenMode::Write) mode.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct FileOptions {
	pub position: usize,
	pub buffer_size: usize,
	pub mode: Option<OpenMode>,
}

impl Default for FileOptions {
	fn default() -> Self { Self::new() }
}

impl FileOptions {
	/// Creates a new set of file options.
	pub const fn new() -> Self {
		Self {
			position: 0,
			buffer_size: DEFAULT_WINDOW_SIZE,
			mode: None,
		}
	}

	/// Returns the open mode, or `default` if unset.
	#[inline]
	pub const fn mode_or(&self, default: OpenMode) -> OpenMode {
		match self.mode {
			Some(mode) => mode,
			None => default
		}
	}

	/// Sets the starting position.
	#[inline]
	pub const fn with_position(mut self, value: usize) -> Self {
		self.position = value;
		self
	}

	/// Sets the cache window capacity.
	#[inline]
	pub const fn with_buffer_size(mut self, value: usize) -> Self {
		self.buffer_size = value;
		self
	}

	/// Sets the open mode.
	#[inline]
	pub const fn with_mode(mut self, value: OpenMode) -> Self {
		self.mode = Some(value);
		self
	}
}
