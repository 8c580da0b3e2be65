use std::io::{self, Read, Write};

use super::{Decode, Encode};

impl<V> Encode for Option<V>
where
    V: Encode,
{
    type Error = V::Error;

    fn encode<W>(&self, writer: &mut W) -> Result<(), Self::Error>
    where
        W: Write,
    {
        match self {
            None => writer.write_all(&[0])?,
            Some(v) => {
                writer.write_all(&[1])?;
                v.encode(writer)?;
            }
        }
        Ok(())
    }

    fn size(&self) -> usize {
        match self {
            None => 1,
            Some(v) => 1 + v.size(),
        }
    }
}

impl<V> Decode for Option<V>
where
    V: Decode,
{
    type Error = V::Error;

    fn decode<R: Read>(reader: &mut R) -> Result<Self, Self::Error> {
        let mut o = [0];
        reader.read_exact(&mut o)?;
        match o[0] {
            0 => Ok(None),
            1 => Ok(Some(V::decode(reader)?)),
            tag => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid option tag {tag}"),
            )
            .into()),
        }
    }
}
