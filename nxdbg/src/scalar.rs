//! Fixed-width little-endian accessors.

use crate::client::Client;
use crate::error::Result;
use crate::transport::Transport;

impl<T: Transport> Client<T> {
    /// Reads `N` bytes at `address` into an array.
    fn read_array<const N: usize>(&mut self, address: u32) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        // `read` returns exactly `N` bytes on success.
        out.copy_from_slice(&self.read(address, N)?);
        Ok(out)
    }

    /// Reads a byte.
    pub fn read_u8(&mut self, address: u32) -> Result<u8> {
        self.read_array(address).map(u8::from_le_bytes)
    }

    /// Reads a little-endian `u16`.
    pub fn read_u16(&mut self, address: u32) -> Result<u16> {
        self.read_array(address).map(u16::from_le_bytes)
    }

    /// Reads a little-endian `u32`.
    pub fn read_u32(&mut self, address: u32) -> Result<u32> {
        self.read_array(address).map(u32::from_le_bytes)
    }

    /// Writes a byte.
    pub fn write_u8(&mut self, address: u32, value: u8) -> Result<()> {
        self.write(address, &value.to_le_bytes())
    }

    /// Writes a little-endian `u16`.
    pub fn write_u16(&mut self, address: u32, value: u16) -> Result<()> {
        self.write(address, &value.to_le_bytes())
    }

    /// Writes a little-endian `u32`.
    pub fn write_u32(&mut self, address: u32, value: u32) -> Result<()> {
        self.write(address, &value.to_le_bytes())
    }
}

#[cfg(test)]
mod tests {
    use nxdbg_proto::Request;

    use crate::config::Config;
    use crate::fake::FakeStub;
    use crate::{Client, Error};

    const AT: u32 = 0x8000_4000;

    fn client() -> Client<FakeStub> {
        Client::with_transport(FakeStub::new(), Config::default())
    }

    #[test]
    fn u32_is_little_endian() {
        let mut xbox = client();
        xbox.write_u32(AT, 0x1234_5678).unwrap();
        assert_eq!(xbox.transport().peek(AT, 4), vec![0x78, 0x56, 0x34, 0x12]);
        assert_eq!(xbox.read_u32(AT).unwrap(), 0x1234_5678);
    }

    #[test]
    fn scalars_round_trip() {
        let mut xbox = client();
        for value in [0u32, 1, 0x5a, 0xffff_ffff, 0x8000_0001] {
            xbox.write_u32(AT, value).unwrap();
            assert_eq!(xbox.read_u32(AT).unwrap(), value);
        }
        for value in [0u16, 0x5a5a, 0xff00, u16::MAX] {
            xbox.write_u16(AT + 8, value).unwrap();
            assert_eq!(xbox.read_u16(AT + 8).unwrap(), value);
        }
        for value in [0u8, 0x5a, u8::MAX] {
            xbox.write_u8(AT + 16, value).unwrap();
            assert_eq!(xbox.read_u8(AT + 16).unwrap(), value);
        }
    }

    #[test]
    fn u16_write_touches_only_two_bytes() {
        let mut xbox = client();
        xbox.write_u32(AT, 0xaaaa_aaaa).unwrap();
        xbox.write_u16(AT, 0x0102).unwrap();
        assert_eq!(xbox.read_u32(AT).unwrap(), 0xaaaa_0102);
    }

    #[test]
    fn scalar_access_is_one_exchange() {
        let mut xbox = client();
        xbox.read_u32(AT).unwrap();
        assert_eq!(
            xbox.transport().requests,
            vec![Request::MemRead {
                address: AT,
                size: 4
            }]
        );
    }

    #[test]
    fn scalar_read_propagates_target_error() {
        let stub = FakeStub::new().fail_at(0, "bad address");
        let mut xbox = Client::with_transport(stub, Config::default());
        let err = xbox.read_u16(0).unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }
}
