use crc::{Crc, Digest, CRC_16_IBM_SDLC};
use postcard::ser_flavors::Flavor;

/// Largest supported checksum length in bytes
const MAX_LEN: usize = 8;

/// Failed checksum verification of received data
#[derive(Debug, PartialEq, Eq)]
pub struct ChecksumError;

/// Checksum generator used to protect packet data
pub trait ChecksumGen {
    /// Number of checksum bytes appended after packet data (at most [`MAX_LEN`])
    const LEN: usize;

    /// Feed the next chunk of data
    fn push(&mut self, data: &[u8]);

    /// Write the checksum of all data fed so far to `out` and reset state
    ///
    /// `out` must be exactly [`Self::LEN`] bytes long.
    fn finish(&mut self, out: &mut [u8]);

    /// Verify data with a trailing checksum, returning the payload
    fn verify<'a>(&mut self, data: &'a [u8]) -> Result<&'a [u8], ChecksumError> {
        if data.len() < Self::LEN {
            return Err(ChecksumError);
        }
        let (payload, received) = data.split_at(data.len() - Self::LEN);
        let mut scratch = [0; MAX_LEN];
        let expected = &mut scratch[..Self::LEN];
        self.push(payload);
        self.finish(expected);
        if &expected[..] == received {
            Ok(payload)
        } else {
            Err(ChecksumError)
        }
    }
}

/// Serialization flavor feeding all data through a checksum generator
///
/// Wraps another flavor (in this protocol: COBS over a slice); on
/// finalization the checksum is appended to the wrapped flavor, so with
/// COBS the checksum lands inside the frame, before the sentinel.
pub struct ChecksumEncoder<'a, F, C> {
    flavor: F,
    checksum: &'a mut C,
}

impl<'a, F: Flavor, C: ChecksumGen> ChecksumEncoder<'a, F, C> {
    pub fn new(flavor: F, checksum: &'a mut C) -> Self {
        Self { flavor, checksum }
    }
}

impl<'a, F: Flavor, C: ChecksumGen> Flavor for ChecksumEncoder<'a, F, C> {
    type Output = F::Output;

    fn try_push(&mut self, data: u8) -> postcard::Result<()> {
        self.checksum.push(&[data]);
        self.flavor.try_push(data)
    }

    fn finalize(mut self) -> postcard::Result<Self::Output> {
        let mut scratch = [0; MAX_LEN];
        let out = &mut scratch[..C::LEN];
        self.checksum.finish(out);
        self.flavor.try_extend(out)?;
        self.flavor.finalize()
    }
}

static CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_SDLC);

/// Software CRC-16 of packet data, appended to frames in little endian
pub struct Crc16 {
    digest: Option<Digest<'static, u16>>,
}

impl Crc16 {
    pub const fn new() -> Self {
        Self { digest: None }
    }
}

impl Default for Crc16 {
    fn default() -> Self {
        Self::new()
    }
}

impl ChecksumGen for Crc16 {
    const LEN: usize = 2;

    fn push(&mut self, data: &[u8]) {
        self.digest.get_or_insert_with(|| CRC16.digest()).update(data);
    }

    fn finish(&mut self, out: &mut [u8]) {
        let digest = self.digest.take().unwrap_or_else(|| CRC16.digest());
        out.copy_from_slice(&digest.finalize().to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checksum_of(data: &[u8]) -> [u8; 2] {
        let mut out = [0; 2];
        let mut crc = Crc16::new();
        crc.push(data);
        crc.finish(&mut out);
        out
    }

    #[test]
    fn finish_resets_state() {
        let mut crc = Crc16::new();
        let mut first = [0; 2];
        crc.push(b"some data");
        crc.finish(&mut first);
        // Same data fed again must give the same checksum
        assert_eq!(checksum_of(b"some data"), first);
    }

    #[test]
    fn chunked_push_equals_single_push() {
        let mut crc = Crc16::new();
        let mut out = [0; 2];
        crc.push(b"some");
        crc.push(b" ");
        crc.push(b"data");
        crc.finish(&mut out);
        assert_eq!(checksum_of(b"some data"), out);
    }

    #[test]
    fn verify_accepts_valid_trailer() {
        let payload = b"\x01\x02\x03";
        let trailer = checksum_of(payload);
        let mut data = std::vec::Vec::from(&payload[..]);
        data.extend_from_slice(&trailer);

        let mut crc = Crc16::new();
        assert_eq!(crc.verify(&data), Ok(&payload[..]));
    }

    #[test]
    fn verify_rejects_corruption() {
        let payload = b"\x01\x02\x03";
        let trailer = checksum_of(payload);
        let mut data = std::vec::Vec::from(&payload[..]);
        data.extend_from_slice(&trailer);
        data[1] ^= 0x10;

        let mut crc = Crc16::new();
        assert_eq!(crc.verify(&data), Err(ChecksumError));
    }

    #[test]
    fn verify_rejects_short_data() {
        let mut crc = Crc16::new();
        assert_eq!(crc.verify(&[0xaa]), Err(ChecksumError));
    }
}
