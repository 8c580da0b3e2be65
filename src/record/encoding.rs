use std::{
    io::{self, Cursor, Read, Write},
    mem::size_of,
    sync::Arc,
};

use bytes::Bytes;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, Timelike};
use rust_decimal::Decimal;

use super::GenericRecord;
use crate::{
    error::UpsertError,
    schema::{FieldKind, SchemaLookup, TypeSchema},
    serdes::{Decode, Encode},
    types::Value,
};

const NANOS_PER_SECOND: i64 = 1_000_000_000;

fn invalid_data(message: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message.into())
}

fn mismatch(kind: FieldKind, value: &Value) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("cannot store {} in a {kind} field", value.kind_name()),
    )
}

/// Layout: schema fingerprint, then every field in schema order as an
/// option-tagged payload whose shape is fixed by the field kind. Nested
/// records carry their own fingerprint.
impl Encode for GenericRecord {
    type Error = io::Error;

    fn encode<W>(&self, writer: &mut W) -> Result<(), Self::Error>
    where
        W: Write,
    {
        self.schema.fingerprint().encode(writer)?;
        for (field, value) in self.schema.fields().iter().zip(&self.values) {
            u8::from(!value.is_null()).encode(writer)?;
            if !value.is_null() {
                encode_value(field.kind(), value, writer)?;
            }
        }
        Ok(())
    }

    fn size(&self) -> usize {
        size_of::<u32>()
            + self
                .values
                .iter()
                .map(|value| 1 + value_size(value))
                .sum::<usize>()
    }
}

fn encode_value<W: Write>(kind: FieldKind, value: &Value, writer: &mut W) -> io::Result<()> {
    match (kind, value) {
        (FieldKind::String, Value::Varchar(v)) => v.encode(writer),
        (FieldKind::NullableBoolean | FieldKind::Boolean, Value::Boolean(v)) => v.encode(writer),
        (FieldKind::NullableInt8 | FieldKind::Int8, Value::TinyInt(v)) => v.encode(writer),
        (FieldKind::NullableInt16 | FieldKind::Int16, Value::SmallInt(v)) => v.encode(writer),
        (FieldKind::NullableInt32 | FieldKind::Int32, Value::Int(v)) => v.encode(writer),
        (FieldKind::NullableInt64 | FieldKind::Int64, Value::BigInt(v)) => v.encode(writer),
        (FieldKind::NullableFloat32 | FieldKind::Float32, Value::Real(v)) => v.encode(writer),
        (FieldKind::NullableFloat64 | FieldKind::Float64, Value::Double(v)) => v.encode(writer),
        (FieldKind::Decimal, Value::Decimal(v)) => writer.write_all(&v.serialize()),
        (FieldKind::Date, Value::Date(v)) => v.num_days_from_ce().encode(writer),
        (FieldKind::Time, Value::Time(v)) => {
            let nanos = v.num_seconds_from_midnight() as i64 * NANOS_PER_SECOND
                + v.nanosecond() as i64;
            nanos.encode(writer)
        }
        (FieldKind::Timestamp, Value::Timestamp(v)) => {
            let utc = v.and_utc();
            utc.timestamp().encode(writer)?;
            utc.timestamp_subsec_nanos().encode(writer)
        }
        (FieldKind::TimestampWithTimezone, Value::TimestampTz(v)) => {
            v.timestamp().encode(writer)?;
            v.timestamp_subsec_nanos().encode(writer)?;
            v.offset().local_minus_utc().encode(writer)
        }
        (FieldKind::Compact, Value::Record(record)) => record.encode(writer),
        (kind, value) => Err(mismatch(kind, value)),
    }
}

fn value_size(value: &Value) -> usize {
    match value {
        Value::Null => 0,
        Value::Varchar(v) => v.size(),
        Value::Boolean(_) | Value::TinyInt(_) => 1,
        Value::SmallInt(_) => 2,
        Value::Int(_) | Value::Real(_) | Value::Date(_) => 4,
        Value::BigInt(_) | Value::Double(_) | Value::Time(_) => 8,
        Value::Decimal(_) => 16,
        Value::Timestamp(_) => 12,
        Value::TimestampTz(_) => 16,
        Value::Record(record) => record.size(),
        // not encodable, rejected by `encode`
        _ => 0,
    }
}

impl GenericRecord {
    /// Decodes a record, resolving its schema and every nested schema by
    /// fingerprint.
    pub fn decode<R, L>(reader: &mut R, lookup: &L) -> io::Result<Self>
    where
        R: Read,
        L: SchemaLookup + ?Sized,
    {
        let fingerprint = u32::decode(reader)?;
        let schema = lookup
            .schema_by_fingerprint(fingerprint)
            .ok_or_else(|| {
                invalid_data(format!("unknown schema fingerprint {fingerprint:#010x}"))
            })?;
        decode_fields(reader, schema, lookup)
    }

    /// Encodes the record into a standalone buffer.
    pub fn to_bytes(&self) -> Result<Bytes, UpsertError> {
        let mut buf = Vec::with_capacity(self.size());
        self.encode(&mut buf)?;
        Ok(Bytes::from(buf))
    }

    pub fn from_bytes<L>(bytes: &[u8], lookup: &L) -> Result<Self, UpsertError>
    where
        L: SchemaLookup + ?Sized,
    {
        Ok(Self::decode(&mut Cursor::new(bytes), lookup)?)
    }
}

fn decode_fields<R, L>(
    reader: &mut R,
    schema: Arc<TypeSchema>,
    lookup: &L,
) -> io::Result<GenericRecord>
where
    R: Read,
    L: SchemaLookup + ?Sized,
{
    let mut values = Vec::with_capacity(schema.len());
    for field in schema.fields() {
        let value = match u8::decode(reader)? {
            0 => Value::Null,
            1 => decode_value(field.kind(), reader, lookup)?,
            tag => return Err(invalid_data(format!("invalid option tag {tag}"))),
        };
        values.push(value);
    }
    Ok(GenericRecord { schema, values })
}

fn decode_value<R, L>(kind: FieldKind, reader: &mut R, lookup: &L) -> io::Result<Value>
where
    R: Read,
    L: SchemaLookup + ?Sized,
{
    let value = match kind {
        FieldKind::String => Value::Varchar(String::decode(reader)?),
        FieldKind::NullableBoolean | FieldKind::Boolean => Value::Boolean(bool::decode(reader)?),
        FieldKind::NullableInt8 | FieldKind::Int8 => Value::TinyInt(i8::decode(reader)?),
        FieldKind::NullableInt16 | FieldKind::Int16 => Value::SmallInt(i16::decode(reader)?),
        FieldKind::NullableInt32 | FieldKind::Int32 => Value::Int(i32::decode(reader)?),
        FieldKind::NullableInt64 | FieldKind::Int64 => Value::BigInt(i64::decode(reader)?),
        FieldKind::NullableFloat32 | FieldKind::Float32 => Value::Real(f32::decode(reader)?),
        FieldKind::NullableFloat64 | FieldKind::Float64 => Value::Double(f64::decode(reader)?),
        FieldKind::Decimal => {
            let mut buf = [0u8; 16];
            reader.read_exact(&mut buf)?;
            Value::Decimal(Decimal::deserialize(buf))
        }
        FieldKind::Date => {
            let days = i32::decode(reader)?;
            NaiveDate::from_num_days_from_ce_opt(days)
                .map(Value::Date)
                .ok_or_else(|| invalid_data(format!("date out of range: {days}")))?
        }
        FieldKind::Time => {
            let nanos = i64::decode(reader)?;
            u32::try_from(nanos / NANOS_PER_SECOND)
                .ok()
                .and_then(|secs| {
                    NaiveTime::from_num_seconds_from_midnight_opt(
                        secs,
                        (nanos % NANOS_PER_SECOND) as u32,
                    )
                })
                .map(Value::Time)
                .ok_or_else(|| invalid_data(format!("time out of range: {nanos}")))?
        }
        FieldKind::Timestamp => {
            let secs = i64::decode(reader)?;
            let nanos = u32::decode(reader)?;
            DateTime::from_timestamp(secs, nanos)
                .map(|v| Value::Timestamp(v.naive_utc()))
                .ok_or_else(|| invalid_data(format!("timestamp out of range: {secs}")))?
        }
        FieldKind::TimestampWithTimezone => {
            let secs = i64::decode(reader)?;
            let nanos = u32::decode(reader)?;
            let offset = i32::decode(reader)?;
            FixedOffset::east_opt(offset)
                .zip(DateTime::from_timestamp(secs, nanos))
                .map(|(offset, v)| Value::TimestampTz(v.with_timezone(&offset)))
                .ok_or_else(|| invalid_data(format!("timestamp out of range: {secs}{offset:+}")))?
        }
        FieldKind::Compact => Value::Record(GenericRecord::decode(reader, lookup)?),
        FieldKind::ArrayOfString | FieldKind::ArrayOfInt64 | FieldKind::ArrayOfCompact => {
            return Err(invalid_data(format!("{kind} fields carry no payload")))
        }
    };
    Ok(value)
}
