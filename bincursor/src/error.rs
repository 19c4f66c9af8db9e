// Copyright 2023 Strixpyrr
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{fmt, io, result};
use std::error::Error as StdError;
use std::fmt::{Display, Formatter};
use amplify_derive::Display;

pub type ErrorBox = Box<dyn StdError + Send + Sync>;
pub type Result<T = ()> = result::Result<T, Error>;

/// The cursor operation that failed.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Display)]
pub enum OperationKind {
	#[default]
	#[display("unknown operation")]
	Unknown,
	#[display("read")]
	Read,
	#[display("write")]
	Write,
	#[display("seek")]
	Seek,
	#[display("flush")]
	Flush,
	#[display("close")]
	Close,
	#[display("open")]
	Open,
	#[display("allocate")]
	Allocate,
	#[display("{0}")]
	Other(&'static str),
}

/// The reason an operation failed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ErrorKind {
	/// An access would reach past the addressable length.
	#[error("end of data (position {position}, length {length})")]
	Eod {
		position: usize,
		length: usize,
	},
	/// A 64-bit value read as a safe integer exceeds `2^53 - 1`.
	#[error("integer at position {position} exceeds the safe integer range")]
	UnsafeInteger {
		position: usize,
	},
	/// The file layer wrote fewer bytes than requested.
	#[error("incomplete write, {written} of {expected} bytes written")]
	IncompleteWrite {
		expected: usize,
		written: usize,
	},
	/// Another operation is in flight on the same cursor.
	#[error("cursor is busy")]
	Busy,
	/// The underlying file layer failed.
	#[error("IO error")]
	Io,
	#[error("{0}")]
	Other(&'static str),
}

#[derive(Debug)]
pub struct Error {
	op: OperationKind,
	kind: ErrorKind,
	source: Option<ErrorBox>,
}

impl Display for Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let Self { op, kind, source } = self;
		if let Some(source) = source {
			write!(f, "{op} failed; {kind} ({source})")
		} else {
			write!(f, "{op} failed; {kind}")
		}
	}
}

impl StdError for Error {
	fn source(&self) -> Option<&(dyn StdError + 'static)> {
		if let Some(ref source) = self.source {
			Some(source.as_ref())
		} else {
			None
		}
	}
}

impl Error {
	pub(crate) fn new(
		op: OperationKind,
		kind: ErrorKind,
		source: Option<ErrorBox>
	) -> Self {
		Self { op, kind, source }
	}

	/// Creates a new error with a custom message.
	pub fn other(
		op: OperationKind,
		message: &'static str,
		source: Option<ErrorBox>
	) -> Self {
		Self::new(op, ErrorKind::Other(message), source)
	}

	/// Creates a new "end-of-data" error for an access at `position` on data of
	/// `length` bytes.
	pub fn eod(op: OperationKind, position: usize, length: usize) -> Self {
		Self::new(op, ErrorKind::Eod { position, length }, None)
	}

	/// Creates a new "unsafe integer" error.
	pub fn unsafe_integer(op: OperationKind, position: usize) -> Self {
		Self::new(op, ErrorKind::UnsafeInteger { position }, None)
	}

	/// Creates a new "incomplete write" error.
	pub fn incomplete_write(op: OperationKind, expected: usize, written: usize) -> Self {
		Self::new(op, ErrorKind::IncompleteWrite { expected, written }, None)
	}

	/// Creates a new "busy" error.
	pub fn busy(op: OperationKind) -> Self {
		Self::new(op, ErrorKind::Busy, None)
	}

	/// Creates a new IO error.
	pub fn io(op: OperationKind, error: io::Error) -> Self {
		Self::new(op, ErrorKind::Io, Some(error.into()))
	}

	/// Returns the operation kind.
	pub fn operation(&self) -> OperationKind { self.op }

	/// Sets the operation kind.
	pub fn with_operation(mut self, op: OperationKind) -> Self {
		self.op = op;
		self
	}

	/// Sets the source error.
	pub fn with_source(mut self, source: impl Into<ErrorBox>) -> Self {
		self.source = Some(source.into());
		self
	}

	/// Returns the error kind.
	pub fn kind(&self) -> ErrorKind { self.kind }

	/// Returns `true` if the error is an end-of-data error.
	pub fn is_eod(&self) -> bool {
		matches!(self.kind, ErrorKind::Eod { .. })
	}

	/// Returns `true` if the error is a busy error.
	pub fn is_busy(&self) -> bool {
		matches!(self.kind, ErrorKind::Busy)
	}

	/// Returns `true` if the error is an unsafe integer error.
	pub fn is_unsafe_integer(&self) -> bool {
		matches!(self.kind, ErrorKind::UnsafeInteger { .. })
	}

	/// Returns `true` if the error is an incomplete write error.
	pub fn is_incomplete_write(&self) -> bool {
		matches!(self.kind, ErrorKind::IncompleteWrite { .. })
	}

	/// Returns the source downcast into an IO Error, if possible.
	pub fn io_source(&self) -> Option<&io::Error> {
		self.source.as_ref()?.downcast_ref()
	}
}

impl From<io::Error> for Error {
	fn from(value: io::Error) -> Self {
		Self::io(OperationKind::Unknown, value)
	}
}

/// Tags a fallible result with the operation it belongs to.
pub trait ResultContext<T> {
	fn context(self, op: OperationKind) -> Result<T>;
}

impl<T> ResultContext<T> for io::Result<T> {
	fn context(self, op: OperationKind) -> Result<T> {
		self.map_err(|err| Error::io(op, err))
	}
}

impl<T> ResultContext<T> for Result<T> {
	fn context(self, op: OperationKind) -> Result<T> {
		self.map_err(|err| err.with_operation(op))
	}
}
