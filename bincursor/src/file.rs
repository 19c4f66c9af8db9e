// SPDX-License-Identifier: Apache-2.0

//! Cursors over files.
//!
//! Every file access goes through a positional I/O collaborator, [`FileIo`] or
//! [`AsyncFileIo`], passing an explicit offset; the kernel file offset is never
//! used. The buffered cursors keep a fixed-size cache window in front of the
//! collaborator: readers fill it ahead of the position, writers collect writes
//! in it and flush them in one call. The unbuffered cursors call the
//! collaborator once per access.
//!
//! The asynchronous cursors allow one operation in flight at a time. A second
//! call made while one is running fails immediately with a busy error rather
//! than waiting its turn.

mod io;
mod options;
mod window;
mod reader;
mod writer;
#[cfg(feature = "async")]
mod nonblocking;

pub use io::*;
pub use options::*;
pub use reader::*;
pub use writer::*;
#[cfg(feature = "async")]
pub use nonblocking::*;
