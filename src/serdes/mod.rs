mod boolean;
mod num;
mod option;
mod string;

use std::io::{self, Read, Write};

pub trait Encode {
    type Error: From<io::Error> + std::error::Error + Send + Sync + 'static;

    fn encode<W>(&self, writer: &mut W) -> Result<(), Self::Error>
    where
        W: Write;

    fn size(&self) -> usize;
}

impl<T: Encode> Encode for &T {
    type Error = T::Error;

    fn encode<W>(&self, writer: &mut W) -> Result<(), Self::Error>
    where
        W: Write,
    {
        Encode::encode(*self, writer)
    }

    fn size(&self) -> usize {
        Encode::size(*self)
    }
}

pub trait Decode: Sized {
    type Error: From<io::Error> + std::error::Error + Send + Sync + 'static;

    fn decode<R>(reader: &mut R) -> Result<Self, Self::Error>
    where
        R: Read;
}
