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

use pretty_assertions::assert_eq;
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use bincursor::{BinaryRead, BinaryWrite, Endian, ErrorKind, OperationKind, Result, Seekable, SeekableExt, MAX_SAFE_INTEGER};
use bincursor::memory::{AlignedBufferReader, AlignedBufferWriter, BufferReader, BufferWriter, WriterOptions};

#[macro_use]
mod common;

#[test]
fn write_then_read() -> Result {
	let mut writer: BufferWriter = BufferWriter::new();
	writer.write_u8(240)?;
	writer.write_u32_le(12345678)?;
	writer.write_u64_le(2939239193332)?;

	let data = writer.truncate();
	assert_eq!(data.len(), 13);

	let mut reader: BufferReader = BufferReader::new(data);
	assert_eq!(reader.read_u8()?, 240);
	assert_eq!(reader.read_u32_le()?, 12345678);
	assert_eq!(reader.read_safe_uint_le()?, 2939239193332);
	assert_eq!(reader.remaining(), 0);
	Ok(())
}

mod primitive {
	use quickcheck::TestResult;
	use quickcheck_macros::quickcheck;
	use bincursor::{BinaryRead, BinaryWrite};
	use bincursor::memory::{AlignedBufferReader, AlignedBufferWriter, BufferReader, BufferWriter};

	use super::common;

	// Compared as bytes so NaN payloads round-trip too.
	macro_rules! gen {
		($($ty:ident $read:ident $write:ident,)+) => {
			$(
			#[quickcheck]
			fn $read(v: $ty) -> TestResult {
				let mut writer: BufferWriter = BufferWriter::new();
				writer.write_u8(0xFF).unwrap();
				writer.$write(v).unwrap();
				let mut reader: BufferReader = BufferReader::new(writer.truncate());
				reader.read_u8().unwrap();
				qc_assert_eq!(reader.$read().unwrap().to_le_bytes(), v.to_le_bytes())
			}
			)+

			mod aligned {
				use super::*;

				$(
				#[quickcheck]
				fn $read(v: $ty) -> TestResult {
					let mut writer = AlignedBufferWriter::new();
					writer.write_u8(0xFF).unwrap();
					writer.$write(v).unwrap();
					let mut reader = AlignedBufferReader::new(writer.truncate());
					reader.read_u8().unwrap();
					qc_assert_eq!(reader.$read().unwrap().to_le_bytes(), v.to_le_bytes())
				}
				)+
			}
			};
	}

	gen! {
		i8  read_i8     write_i8,
		u16 read_u16_le write_u16_le,
		u16 read_u16_be write_u16_be,
		i16 read_i16_le write_i16_le,
		i16 read_i16_be write_i16_be,
		u32 read_u32_le write_u32_le,
		u32 read_u32_be write_u32_be,
		i32 read_i32_le write_i32_le,
		i32 read_i32_be write_i32_be,
		u64 read_u64_le write_u64_le,
		u64 read_u64_be write_u64_be,
		i64 read_i64_le write_i64_le,
		i64 read_i64_be write_i64_be,
		f32 read_f32_le write_f32_le,
		f32 read_f32_be write_f32_be,
		f64 read_f64_le write_f64_le,
		f64 read_f64_be write_f64_be,
	}
}

#[quickcheck]
fn safe_uint(value: u64, big: bool) -> TestResult {
	let endian = if big { Endian::Big } else { Endian::Little };
	let mut writer: BufferWriter = BufferWriter::new();
	writer.write(value, endian).unwrap();
	let mut reader: BufferReader = BufferReader::new(writer.truncate());
	match reader.read_safe_uint(endian) {
		Ok(read) => qc_assert_eq!(read, value),
		Err(err) if value > MAX_SAFE_INTEGER => {
			if !err.is_unsafe_integer() {
				return TestResult::error(format!("unexpected error: {err}"))
			}
			qc_assert_eq!(reader.position(), 0, "position should be restored")
		}
		Err(err) => TestResult::error(format!("safe value {value} rejected: {err}"))
	}
}

#[test]
fn unsafe_uint_can_be_reread() -> Result {
	let value = MAX_SAFE_INTEGER + 1;
	let mut writer: BufferWriter = BufferWriter::new();
	writer.write_u64_le(value)?;
	writer.write_u64_be(MAX_SAFE_INTEGER)?;

	let mut reader: BufferReader = BufferReader::new(writer.truncate());
	let err = reader.read_safe_uint_le().unwrap_err();
	assert_eq!(err.kind(), ErrorKind::UnsafeInteger { position: 0 });
	assert_eq!(reader.position(), 0);
	assert_eq!(reader.read_u64_le()?, value);
	assert_eq!(reader.read_safe_uint_be()?, MAX_SAFE_INTEGER);
	Ok(())
}

#[test]
fn big_endian_u64_reverses_bytes() -> Result {
	let mut writer: BufferWriter = BufferWriter::new();
	writer.write_u64_be(0x0102030405060708)?;
	writer.write_i64_be(-2)?;
	assert_eq!(
		writer.truncate(),
		[1, 2, 3, 4, 5, 6, 7, 8, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE]
	);
	Ok(())
}

#[test]
fn aligned_positions() -> Result {
	let mut writer = AlignedBufferWriter::new();
	writer.write_u8(1)?;
	writer.write_u32_le(0xDEADBEEF)?;
	assert_eq!(writer.position(), 8);
	writer.write_u16_be(7)?;
	assert_eq!(writer.position(), 10);
	writer.write_u64_le(42)?;
	assert_eq!(writer.position(), 24);
	writer.write_u8(9)?;
	writer.write_bytes(b"xy")?;
	assert_eq!(writer.position(), 27, "bytes are never aligned");

	let data = writer.truncate();
	assert_eq!(&data[1..4], [0, 0, 0]);
	assert_eq!(&data[4..8], 0xDEADBEEFu32.to_le_bytes());

	let mut reader = AlignedBufferReader::new(data);
	assert_eq!(reader.read_u8()?, 1);
	assert_eq!(reader.read_u32_le()?, 0xDEADBEEF);
	assert_eq!(reader.position() % 4, 0);
	assert_eq!(reader.read_u16_be()?, 7);
	assert_eq!(reader.position() % 2, 0);
	assert_eq!(reader.read_u64_le()?, 42);
	assert_eq!(reader.position(), 24);
	assert_eq!(reader.read_u8()?, 9);
	assert_eq!(reader.read_slice(2)?, b"xy");
	Ok(())
}

#[quickcheck]
fn aligned_write_lands_on_multiple(lead: u8) -> TestResult {
	let lead = lead as usize % 16;
	let mut writer = AlignedBufferWriter::new();
	writer.write_bytes(&vec![0; lead]).unwrap();
	writer.write_u32_be(1).unwrap();
	qc_assert_eq!(writer.position(), lead.div_ceil(4) * 4 + 4)
}

#[test]
fn aligned_read_past_end() -> Result {
	let data = [1, 0, 0, 0, 0, 0];
	let mut reader = AlignedBufferReader::new(&data);
	reader.read_u8()?;
	let err = reader.read_u32_le().unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Eod { position: 4, length: 6 });
	assert_eq!(reader.position(), 1);
	assert_eq!(reader.read_u16_le()?, 0);
	Ok(())
}

#[test]
fn aligned_safe_uint_after_padding() -> Result {
	let mut writer = AlignedBufferWriter::new();
	writer.write_u8(1)?;
	writer.write_u64_le(MAX_SAFE_INTEGER)?;
	writer.write_u8(2)?;
	writer.write_u64_be(MAX_SAFE_INTEGER + 1)?;

	let mut reader = AlignedBufferReader::new(writer.truncate());
	reader.read_u8()?;
	assert_eq!(reader.read_safe_uint_le()?, MAX_SAFE_INTEGER);
	assert_eq!(reader.position(), 16);
	assert_eq!(reader.read_u8()?, 2);

	let err = reader.read_safe_uint_be().unwrap_err();
	assert_eq!(err.kind(), ErrorKind::UnsafeInteger { position: 24 });
	assert_eq!(reader.position(), 17, "restored to before the padding");
	assert_eq!(reader.read_u64_be()?, MAX_SAFE_INTEGER + 1);
	Ok(())
}

#[test]
fn aligned_growth() -> Result {
	let options = WriterOptions::new()
		.with_initial_capacity(10)
		.with_auto_allocate_size(4);
	let mut writer = AlignedBufferWriter::with_options(options);
	writer.write_u8(0xAB)?;
	writer.write_u64_le(0x0102030405060708)?;
	assert_eq!(writer.position(), 16);
	assert_eq!(writer.capacity(), 18);
	let data = writer.truncate();
	assert_eq!(data[0], 0xAB);
	assert_eq!(&data[1..8], [0; 7]);
	assert_eq!(&data[8..], 0x0102030405060708u64.to_le_bytes());

	// The padding itself reaches past the end.
	let options = WriterOptions::new()
		.with_initial_capacity(6)
		.with_auto_allocate_size(4);
	let mut writer = AlignedBufferWriter::with_options(options);
	writer.write_u8(0xAB)?;
	writer.write_u64_le(u64::MAX)?;
	assert_eq!(writer.capacity(), 18);
	assert_eq!(writer.truncate()[0], 0xAB);
	assert_eq!(&writer.truncate()[8..], [0xFF; 8]);
	Ok(())
}

#[test]
fn writes_near_address_limit_fail() -> Result {
	let mut writer = AlignedBufferWriter::new();
	writer.write_u8(7)?;
	writer.seek(usize::MAX)?;
	let err = writer.write_u16_le(1).unwrap_err();
	assert!(err.is_eod());
	assert_eq!(err.operation(), OperationKind::Write);
	assert_eq!(writer.position(), usize::MAX);

	let mut writer: BufferWriter = BufferWriter::new();
	writer.write_u8(7)?;
	for pos in [usize::MAX, usize::MAX - 8, usize::MAX / 2] {
		writer.seek(pos)?;
		let err = writer.write_u32_le(1).unwrap_err();
		assert!(err.is_eod(), "write at {pos}: {err}");
		assert_eq!(err.operation(), OperationKind::Write);
		assert_eq!(writer.position(), pos);
		assert_eq!(writer.capacity(), 1024);
	}

	let err = writer.allocate(usize::MAX).unwrap_err();
	assert_eq!(err.operation(), OperationKind::Allocate);
	writer.seek(1)?;
	writer.write_u8(8)?;
	assert_eq!(writer.truncate(), [7, 8]);
	Ok(())
}

#[test]
fn growth_in_allocation_steps() -> Result {
	let options = WriterOptions::new()
		.with_initial_capacity(4)
		.with_auto_allocate_size(16);
	let mut writer: BufferWriter = BufferWriter::with_options(options);
	writer.write_u16_le(0x0102)?;
	writer.write_u32_be(0x03040506)?;
	assert_eq!(writer.capacity(), 20);
	assert_eq!(writer.truncate(), [2, 1, 3, 4, 5, 6]);

	writer.write_bytes(&[0xAA; 40])?;
	assert_eq!(writer.capacity(), 68);
	assert_eq!(&writer.truncate()[..6], [2, 1, 3, 4, 5, 6]);
	assert_eq!(writer.position(), 46);

	writer.allocate(10)?;
	assert_eq!(writer.capacity(), 78);
	assert_eq!(writer.len(), 78);
	Ok(())
}

#[test]
fn growth_after_seek_past_end() -> Result {
	let options = WriterOptions::new()
		.with_initial_capacity(0)
		.with_auto_allocate_size(16);
	let mut writer: BufferWriter = BufferWriter::with_options(options);
	assert_eq!(writer.seek(100)?, 0);
	writer.write_u8(1)?;
	assert_eq!(writer.capacity(), 112);

	let data = writer.into_bytes();
	assert_eq!(data.len(), 101);
	assert!(data[..100].iter().all(|&b| b == 0));
	assert_eq!(data[100], 1);
	Ok(())
}

#[test]
fn fixed_writer_rejects_overflow() -> Result {
	let mut writer: BufferWriter = BufferWriter::with_options(WriterOptions::fixed(4));
	writer.write_u32_le(7)?;
	let err = writer.write_u8(1).unwrap_err();
	assert!(err.is_eod());
	assert_eq!(writer.position(), 4);
	assert_eq!(writer.capacity(), 4);
	assert!(writer.seek(5).is_err());
	assert_eq!(writer.seek(4)?, 4);
	Ok(())
}

#[test]
fn disabled_growth() -> Result {
	let mut writer: BufferWriter = BufferWriter::new();
	writer.set_auto_allocate(false);
	writer.seek(1020)?;
	assert!(writer.write_u64_le(1).unwrap_err().is_eod());
	assert_eq!(writer.position(), 1020);
	assert_eq!(writer.capacity(), 1024);

	writer.set_auto_allocate(true);
	writer.set_auto_allocate_size(0);
	assert!(writer.write_u64_le(1).is_err());

	writer.set_auto_allocate_size(8);
	writer.write_u64_le(1)?;
	assert_eq!(writer.capacity(), 1032);
	Ok(())
}

#[test]
fn adopt_existing_region() -> Result {
	assert!(BufferWriter::<bincursor::memory::Unaligned>::from_vec(vec![0; 8], 9).is_err());

	let mut writer: BufferWriter = BufferWriter::from_vec(vec![1, 2, 3, 4], 2)?;
	writer.write_u8(9)?;
	assert_eq!(writer.into_bytes(), [1, 2, 9]);
	Ok(())
}

#[test]
fn reader_boundaries() -> Result {
	let data = common::pattern(16);
	let mut reader: BufferReader = BufferReader::new(&data);
	reader.seek(12)?;
	assert_eq!(reader.read_slice(4)?, &data[12..]);

	reader.seek(12)?;
	let err = reader.read_vec(5).unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Eod { position: 12, length: 16 });
	assert_eq!(reader.position(), 12);

	assert_eq!(reader.seek(16)?, 12);
	assert!(reader.read_u8().is_err());
	assert!(reader.seek(17).is_err());
	assert_eq!(reader.position(), 16);
	Ok(())
}

#[test]
fn relative_seeks() -> Result {
	let data = common::pattern(16);
	let mut reader: BufferReader = BufferReader::at(&data, 8)?;
	assert_eq!(reader.seek_relative(-3)?, 8);
	assert_eq!(reader.read_u8()?, 5);
	assert!(reader.seek_relative(-7).is_err());
	assert_eq!(reader.seek_from_end(-2)?, 6);
	assert_eq!(reader.read_u16_be()?, 0x0E0F);
	reader.rewind()?;
	assert_eq!(reader.seek_forward(3)?, 0);
	assert_eq!(reader.seek_back(1)?, 3);
	assert_eq!(reader.remaining_slice(), &data[2..]);
	Ok(())
}

#[test]
fn read_into_caller_buffer() -> Result {
	let data = common::pattern(10);
	let mut reader: BufferReader = BufferReader::new(&data);
	let mut buf = [0; 4];
	reader.read_into(&mut buf)?;
	assert_eq!(buf, [0, 1, 2, 3]);
	reader.read_into(&mut buf)?;
	assert_eq!(buf, [4, 5, 6, 7]);

	let err = reader.read_into(&mut buf).unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Eod { position: 8, length: 10 });
	assert_eq!(buf, [4, 5, 6, 7]);
	assert_eq!(reader.position(), 8);
	reader.read_into(&mut buf[..2])?;
	assert_eq!(buf, [8, 9, 6, 7]);
	Ok(())
}

#[test]
fn borrowed_slices_outlive_reads() -> Result {
	let data = common::pattern(8);
	let mut reader: BufferReader = BufferReader::new(&data);
	let head = reader.read_slice(4)?;
	let tail = reader.read_slice(4)?;
	assert_eq!(head, [0, 1, 2, 3]);
	assert_eq!(tail, [4, 5, 6, 7]);
	Ok(())
}
