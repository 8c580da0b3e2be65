use std::{
    io::{self, Read, Write},
    mem::size_of,
};

use super::{Decode, Encode};

impl Encode for &str {
    type Error = io::Error;

    fn encode<W>(&self, writer: &mut W) -> Result<(), Self::Error>
    where
        W: Write,
    {
        let len = u32::try_from(self.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "string too long"))?;
        len.encode(writer)?;
        writer.write_all(self.as_bytes())
    }

    fn size(&self) -> usize {
        size_of::<u32>() + self.len()
    }
}

impl Encode for String {
    type Error = io::Error;

    fn encode<W>(&self, writer: &mut W) -> Result<(), Self::Error>
    where
        W: Write,
    {
        self.as_str().encode(writer)
    }

    fn size(&self) -> usize {
        self.as_str().size()
    }
}

impl Decode for String {
    type Error = io::Error;

    fn decode<R: Read>(reader: &mut R) -> Result<Self, Self::Error> {
        let len = u32::decode(reader)?;
        // grows with the bytes actually present, not the declared length
        let mut buf = Vec::new();
        reader.take(u64::from(len)).read_to_end(&mut buf)?;
        if buf.len() != len as usize {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("string declares {len} bytes, {} present", buf.len()),
            ));
        }

        String::from_utf8(buf).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }
}
