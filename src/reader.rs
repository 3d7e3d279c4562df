//! This module provides a struct for reading the length-prefixed SSH wire
//! encoding found inside the base64 blob of an authorized key.

use crate::errors::*;

use byteorder::{BigEndian, ByteOrder};

pub struct BlobReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> BlobReader<'a> {
    pub fn new(data: &'a [u8]) -> BlobReader<'a> {
        BlobReader { data, offset: 0 }
    }

    fn remaining(&self) -> &'a [u8] {
        &self.data[self.offset..]
    }

    pub fn peek_len(&self) -> Result<usize> {
        let cur = self.remaining();
        if cur.len() < 4 {
            return Err(AuthorizedKeysError::InvalidFormat);
        }
        Ok(BigEndian::read_u32(&cur[..4]) as usize)
    }

    pub fn read_bytes(&mut self) -> Result<&'a [u8]> {
        let cur = self.remaining();
        let len = self.peek_len()?;
        if cur.len() - 4 < len {
            return Err(AuthorizedKeysError::InvalidFormat);
        }
        self.offset += len + 4;
        Ok(&cur[4..len + 4])
    }

    pub fn read_string(&mut self) -> Result<&'a str> {
        Ok(std::str::from_utf8(self.read_bytes()?)?)
    }
}

/// Returns the key type every public key blob starts with, e.g. `ssh-rsa`.
pub fn embedded_key_type(blob: &[u8]) -> Result<&str> {
    BlobReader::new(blob).read_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_empty() {
        let data = vec![];
        let mut rd = BlobReader::new(data.as_ref());
        assert!(rd.peek_len().is_err());
        assert!(rd.read_bytes().is_err());
        assert!(rd.read_string().is_err());
    }

    #[test]
    fn reader_truncated() {
        // claims 16 bytes, carries 3
        let data = [0, 0, 0, 16, b'a', b'b', b'c'];
        let mut rd = BlobReader::new(&data);
        assert_eq!(rd.peek_len().unwrap(), 16);
        assert!(matches!(
            rd.read_bytes(),
            Err(AuthorizedKeysError::InvalidFormat)
        ));
    }

    #[test]
    fn reader_sequence() {
        let data = [0, 0, 0, 3, b'f', b'o', b'o', 0, 0, 0, 1, 0xff];
        let mut rd = BlobReader::new(&data);
        assert_eq!(rd.read_string().unwrap(), "foo");
        assert_eq!(rd.read_bytes().unwrap(), &[0xff]);
        assert!(rd.read_bytes().is_err());
    }

    #[test]
    fn key_type_from_blob() {
        let data = [0, 0, 0, 7, b's', b's', b'h', b'-', b'r', b's', b'a', 0, 0, 0, 1, 3];
        assert_eq!(embedded_key_type(&data).unwrap(), "ssh-rsa");
    }

    #[test]
    fn key_type_not_utf8() {
        let data = [0, 0, 0, 2, 0xc3, 0x28];
        assert!(matches!(
            embedded_key_type(&data),
            Err(AuthorizedKeysError::Utf8(_))
        ));
    }
}
