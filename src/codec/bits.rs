//! Bit reader for H.264 RBSP payloads.

use super::errors::BitError;

/// MSB-first bit reader with Exp-Golomb support
pub struct BitReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub fn bits_consumed(&self) -> usize {
        self.position
    }

    pub fn bits_remaining(&self) -> usize {
        (self.data.len() * 8).saturating_sub(self.position)
    }

    pub fn read_bit(&mut self) -> Result<bool, BitError> {
        let byte = self
            .data
            .get(self.position / 8)
            .ok_or(BitError::EndOfData {
                consumed: self.position,
            })?;
        let bit = (byte >> (7 - (self.position % 8))) & 1;
        self.position += 1;
        Ok(bit == 1)
    }

    pub fn read_flag(&mut self) -> Result<bool, BitError> {
        self.read_bit()
    }

    /// Read up to 32 bits as an unsigned value
    pub fn read_bits(&mut self, count: u8) -> Result<u32, BitError> {
        if count > 32 {
            return Err(BitError::TooManyBits { requested: count });
        }
        if usize::from(count) > self.bits_remaining() {
            return Err(BitError::EndOfData {
                consumed: self.position,
            });
        }

        let mut value: u64 = 0;
        for _ in 0..count {
            value = (value << 1) | u64::from(self.read_bit()?);
        }
        Ok(value as u32)
    }

    pub fn skip_bits(&mut self, count: usize) -> Result<(), BitError> {
        if count > self.bits_remaining() {
            return Err(BitError::EndOfData {
                consumed: self.position,
            });
        }
        self.position += count;
        Ok(())
    }

    /// ue(v): unsigned Exp-Golomb
    pub fn read_ue(&mut self) -> Result<u32, BitError> {
        let mut leading_zeros: u8 = 0;
        while !self.read_bit()? {
            leading_zeros += 1;
            if leading_zeros > 31 {
                return Err(BitError::ExpGolombOverflow);
            }
        }

        let suffix = u64::from(self.read_bits(leading_zeros)?);
        let value = (1u64 << leading_zeros) - 1 + suffix;
        u32::try_from(value).map_err(|_| BitError::ExpGolombOverflow)
    }

    /// se(v): signed Exp-Golomb
    pub fn read_se(&mut self) -> Result<i32, BitError> {
        let code = i64::from(self.read_ue()?);
        let value = if code % 2 == 1 {
            (code + 1) / 2
        } else {
            -(code / 2)
        };
        i32::try_from(value).map_err(|_| BitError::ExpGolombOverflow)
    }
}

/// Strip emulation prevention bytes (`00 00 03` becomes `00 00`) to recover
/// the RBSP from a NAL unit payload.
pub fn strip_emulation_prevention(payload: &[u8]) -> Vec<u8> {
    let mut rbsp = Vec::with_capacity(payload.len());
    let mut zeros = 0usize;

    for &byte in payload {
        if zeros >= 2 && byte == 0x03 {
            zeros = 0;
            continue;
        }
        rbsp.push(byte);
        zeros = if byte == 0 { zeros + 1 } else { 0 };
    }

    rbsp
}
