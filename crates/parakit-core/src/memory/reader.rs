use crate::error::{Error, Result};
use crate::memory::ProcessHandle;
use crate::memory::decode_shift_jis_to_string;

/// Primitive reads from a foreign address space.
///
/// Implementors only provide raw byte access and the base module address;
/// every typed read is derived from [`ReadMemory::read_bytes`]. All values
/// are little-endian.
pub trait ReadMemory {
    /// Read `size` bytes starting at `address`.
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>>;

    /// Load address of the target's main module.
    fn base_address(&self) -> u64;

    /// Turn a module-relative offset into an absolute address.
    fn resolve(&self, address: u64, relative: bool) -> u64 {
        if relative {
            self.base_address().wrapping_add(address)
        } else {
            address
        }
    }

    /// Read a signed integer of `size` bytes (1, 2, 4 or 8), sign-extended.
    fn read_int(&self, address: u64, size: usize, relative: bool) -> Result<i64> {
        let address = self.resolve(address, relative);
        match size {
            1 => Ok(self.read_bytes(address, 1)?[0] as i8 as i64),
            2 => self.read_i16(address).map(i64::from),
            4 => self.read_i32(address).map(i64::from),
            8 => {
                let bytes = self.read_bytes(address, 8)?;
                Ok(i64::from_le_bytes(fixed(&bytes, address)?))
            }
            other => Err(Error::InvalidReadSize(other)),
        }
    }

    fn read_float(&self, address: u64, relative: bool) -> Result<f32> {
        self.read_f32(self.resolve(address, relative))
    }

    /// Read a NUL-terminated Shift-JIS string of at most `max_len` bytes.
    fn read_string(&self, address: u64, max_len: usize, relative: bool) -> Result<String> {
        let bytes = self.read_bytes(self.resolve(address, relative), max_len)?;
        Ok(decode_shift_jis_to_string(&bytes))
    }

    fn read_i16(&self, address: u64) -> Result<i16> {
        let bytes = self.read_bytes(address, 2)?;
        Ok(i16::from_le_bytes(fixed(&bytes, address)?))
    }

    fn read_u16(&self, address: u64) -> Result<u16> {
        let bytes = self.read_bytes(address, 2)?;
        Ok(u16::from_le_bytes(fixed(&bytes, address)?))
    }

    fn read_i32(&self, address: u64) -> Result<i32> {
        let bytes = self.read_bytes(address, 4)?;
        Ok(i32::from_le_bytes(fixed(&bytes, address)?))
    }

    fn read_u32(&self, address: u64) -> Result<u32> {
        let bytes = self.read_bytes(address, 4)?;
        Ok(u32::from_le_bytes(fixed(&bytes, address)?))
    }

    fn read_f32(&self, address: u64) -> Result<f32> {
        let bytes = self.read_bytes(address, 4)?;
        Ok(f32::from_le_bytes(fixed(&bytes, address)?))
    }

    /// Read a pointer stored by the (32-bit) target.
    fn read_ptr(&self, address: u64) -> Result<u64> {
        self.read_u32(address).map(u64::from)
    }

    /// Read two consecutive floats, e.g. an `(x, y)` position.
    fn read_pair(&self, address: u64) -> Result<(f32, f32)> {
        let bytes = self.read_bytes(address, 8)?;
        let x: [u8; 4] = fixed(&bytes[..4], address)?;
        let y: [u8; 4] = fixed(&bytes[4..], address + 4)?;
        Ok((f32::from_le_bytes(x), f32::from_le_bytes(y)))
    }

    /// Read an `i32` field whose offset may be unknown; no read happens
    /// without one.
    fn read_i32_at(&self, record: u64, offset: Option<u64>) -> Result<Option<i32>> {
        offset.map(|offset| self.read_i32(record + offset)).transpose()
    }

    fn read_f32_at(&self, record: u64, offset: Option<u64>) -> Result<Option<f32>> {
        offset.map(|offset| self.read_f32(record + offset)).transpose()
    }
}

fn fixed<const N: usize>(bytes: &[u8], address: u64) -> Result<[u8; N]> {
    bytes.try_into().map_err(|_| Error::MemoryReadFailed {
        address,
        message: format!("short read: expected {} bytes, got {}", N, bytes.len()),
    })
}

/// Reads memory of a live target through its [`ProcessHandle`].
pub struct MemoryReader<'a> {
    process: &'a ProcessHandle,
}

impl<'a> MemoryReader<'a> {
    pub fn new(process: &'a ProcessHandle) -> Self {
        Self { process }
    }

    pub fn process(&self) -> &ProcessHandle {
        self.process
    }
}

impl ReadMemory for MemoryReader<'_> {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; size];
        self.process.read_into(address, &mut buffer)?;
        Ok(buffer)
    }

    fn base_address(&self) -> u64 {
        self.process.base_address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MockMemoryBuilder;

    #[test]
    fn test_read_int_sizes_sign_extend() {
        let reader = MockMemoryBuilder::new()
            .write_bytes(0x1000, &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF])
            .build();

        assert_eq!(reader.read_int(0x1000, 1, false).unwrap(), -1);
        assert_eq!(reader.read_int(0x1000, 2, false).unwrap(), -1);
        assert_eq!(reader.read_int(0x1000, 4, false).unwrap(), -1);
        assert_eq!(reader.read_int(0x1000, 8, false).unwrap(), -1);
        assert!(matches!(
            reader.read_int(0x1000, 3, false),
            Err(Error::InvalidReadSize(3))
        ));
    }

    #[test]
    fn test_relative_reads_use_base_address() {
        let reader = MockMemoryBuilder::new()
            .base_address(0x40_0000)
            .write_i32(0x40_0010, 1234)
            .write_f32(0x40_0020, 2.5)
            .build();

        assert_eq!(reader.read_int(0x10, 4, true).unwrap(), 1234);
        assert_eq!(reader.read_float(0x20, true).unwrap(), 2.5);
        assert_eq!(reader.read_int(0x40_0010, 4, false).unwrap(), 1234);
    }

    #[test]
    fn test_read_string_shift_jis() {
        let reader = MockMemoryBuilder::new()
            .base_address(0x40_0000)
            .write_bytes(0x40_1000, b"th15_01.rpy\0\0\0\0\0")
            .build();

        assert_eq!(reader.read_string(0x1000, 16, true).unwrap(), "th15_01.rpy");
    }

    #[test]
    fn test_read_ptr_and_pair() {
        let reader = MockMemoryBuilder::new()
            .write_u32(0x2000, 0x0123_4567)
            .write_f32(0x3000, -16.0)
            .write_f32(0x3004, 400.5)
            .build();

        assert_eq!(reader.read_ptr(0x2000).unwrap(), 0x0123_4567);
        assert_eq!(reader.read_pair(0x3000).unwrap(), (-16.0, 400.5));
    }

    #[test]
    fn test_optional_offset_reads() {
        let reader = MockMemoryBuilder::new()
            .write_i32(0x5010, 42)
            .write_f32(0x5014, 2.5)
            .build();

        assert_eq!(reader.read_i32_at(0x5000, Some(0x10)).unwrap(), Some(42));
        assert_eq!(reader.read_f32_at(0x5000, Some(0x14)).unwrap(), Some(2.5));
        assert_eq!(reader.read_i32_at(0x5000, None).unwrap(), None);
        assert_eq!(reader.reads().len(), 2);
        assert!(reader.read_i32_at(0x6000, Some(0)).unwrap_err().is_memory_read());
    }

    #[test]
    fn test_unmapped_read_fails() {
        let reader = MockMemoryBuilder::new().write_i32(0x1000, 1).build();
        let err = reader.read_i32(0x1002).unwrap_err();
        assert!(err.is_memory_read());
    }
}
