use std::sync::Arc;

use serde::{ser, Serialize, Serializer};

use crate::value::utils::SerializationFailed;
use crate::value::{Map, Value};

/// Builds a [`Value`] out of anything serde can serialize.
pub struct ValueSerializer;

type Result<T> = std::result::Result<T, SerializationFailed>;

/// Every number widens to one of the three 64 bits variants.
macro_rules! widen {
    ($($method:ident: $ty:ty => $variant:ident as $target:ty),* $(,)?) => {
        $(
            fn $method(self, v: $ty) -> Result<Value> {
                Ok(Value::$variant(v as $target))
            }
        )*
    };
}

impl Serializer for ValueSerializer {
    type Ok = Value;
    type Error = SerializationFailed;

    type SerializeSeq = SerializeSeq;
    type SerializeTuple = SerializeSeq;
    type SerializeTupleStruct = SerializeSeq;
    type SerializeTupleVariant = Variant<SerializeSeq>;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = Variant<SerializeMap>;

    widen! {
        serialize_i8: i8 => I64 as i64,
        serialize_i16: i16 => I64 as i64,
        serialize_i32: i32 => I64 as i64,
        serialize_i64: i64 => I64 as i64,
        serialize_u8: u8 => U64 as u64,
        serialize_u16: u16 => U64 as u64,
        serialize_u32: u32 => U64 as u64,
        serialize_u64: u64 => U64 as u64,
        serialize_f32: f32 => F64 as f64,
        serialize_f64: f64 => F64 as f64,
    }

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    /// Too large for an i64: keep the magnitude as a float
    fn serialize_i128(self, v: i128) -> Result<Value> {
        Ok(i64::try_from(v).map_or(Value::F64(v as f64), Value::I64))
    }

    fn serialize_u128(self, v: u128) -> Result<Value> {
        Ok(u64::try_from(v).map_or(Value::F64(v as f64), Value::U64))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::from(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::from(v))
    }

    /// Bytes are a list of numbers, which is what `{{#each}}` can walk
    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::from(v.iter().map(|b| u64::from(*b)).collect::<Vec<_>>()))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Value> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(self, _name: &'static str, _index: u32, variant: &'static str) -> Result<Value> {
        Ok(Value::from(variant))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(self, _name: &'static str, value: &T) -> Result<Value> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value> {
        Ok(tagged(variant, value.serialize(self)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeSeq> {
        Ok(SerializeSeq(Vec::with_capacity(len.unwrap_or(0))))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeSeq> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeSeq> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Variant<SerializeSeq>> {
        Ok(Variant {
            name: variant,
            inner: self.serialize_seq(Some(len))?,
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap {
            entries: Map::with_capacity(len.unwrap_or(0)),
            key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<SerializeMap> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Variant<SerializeMap>> {
        Ok(Variant {
            name: variant,
            inner: self.serialize_map(Some(len))?,
        })
    }
}

/// Enum variants with data become `{variant: data}`, same as serde_json does it
fn tagged(variant: &str, value: Value) -> Value {
    let mut map = Map::with_capacity(1);
    map.insert(variant.to_string(), value);
    Value::from(map)
}

/// Map keys end up as strings, the same way JSON object keys do.
fn map_key<T: Serialize + ?Sized>(key: &T) -> Result<String> {
    match key.serialize(ValueSerializer)? {
        Value::String(s) => Ok(s.to_string()),
        v @ (Value::Bool(_) | Value::U64(_) | Value::I64(_)) => Ok(v.to_string()),
        v => Err(SerializationFailed(format!(
            "map key must be string, integer, or bool, got {}",
            v.name()
        ))),
    }
}

pub struct SerializeSeq(Vec<Value>);

impl ser::SerializeSeq for SerializeSeq {
    type Ok = Value;
    type Error = SerializationFailed;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.0.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Array(Arc::new(self.0)))
    }
}

impl ser::SerializeTuple for SerializeSeq {
    type Ok = Value;
    type Error = SerializationFailed;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeSeq {
    type Ok = Value;
    type Error = SerializationFailed;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

/// Collects both maps and structs: struct fields are map entries in declaration order.
pub struct SerializeMap {
    entries: Map,
    key: Option<String>,
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = SerializationFailed;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<()> {
        self.key = Some(map_key(key)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let Some(key) = self.key.take() else {
            return Err(SerializationFailed("map value serialized before its key".to_string()));
        };
        self.entries.insert(key, value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::from(self.entries))
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Value;
    type Error = SerializationFailed;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.entries.insert(key.to_string(), value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        ser::SerializeMap::end(self)
    }
}

/// The data of a tuple or struct variant, wrapped in `{variant: ...}` once done.
pub struct Variant<S> {
    name: &'static str,
    inner: S,
}

impl ser::SerializeTupleVariant for Variant<SerializeSeq> {
    type Ok = Value;
    type Error = SerializationFailed;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        ser::SerializeSeq::serialize_element(&mut self.inner, value)
    }

    fn end(self) -> Result<Value> {
        Ok(tagged(self.name, ser::SerializeSeq::end(self.inner)?))
    }
}

impl ser::SerializeStructVariant for Variant<SerializeMap> {
    type Ok = Value;
    type Error = SerializationFailed;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()> {
        ser::SerializeStruct::serialize_field(&mut self.inner, key, value)
    }

    fn end(self) -> Result<Value> {
        Ok(tagged(self.name, ser::SerializeStruct::end(self.inner)?))
    }
}
