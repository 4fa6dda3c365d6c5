//! JSON serializer
//!
//! Decodes response bodies into payload types and encodes request payloads,
//! honoring a [`SerializerContext`].

use crate::utils::error::{ApiError, ApiResult};
use serde::de::{DeserializeOwned, Error as _, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The only supported format
pub const JSON_FORMAT: &str = "json";

/// Context key listing attributes that are never populated or emitted
pub const IGNORED_ATTRIBUTES: &str = "ignored_attributes";

/// Per-call serialization options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializerContext {
    /// Top-level attribute names to skip
    pub ignored_attributes: Vec<String>,
}

impl SerializerContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignoring<S: Into<String>>(attributes: impl IntoIterator<Item = S>) -> Self {
        Self {
            ignored_attributes: attributes.into_iter().map(Into::into).collect(),
        }
    }
}

/// Converts between JSON text and typed values
pub trait Serializer: Send + Sync {
    /// Decode `content` into `T`
    fn deserialize<T: DeserializeOwned>(
        &self,
        content: &str,
        format: &str,
        context: &SerializerContext,
    ) -> ApiResult<T>;

    /// Encode `value`
    fn serialize<T: Serialize>(
        &self,
        value: &T,
        format: &str,
        context: &SerializerContext,
    ) -> ApiResult<String>;
}

/// Default serde_json based [`Serializer`]
///
/// Unknown keys are ignored. Payload types should derive `Default` and use
/// `#[serde(default)]` so that missing keys keep their defaults.
/// Arrays of objects are handled element-wise.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl JsonSerializer {
    pub fn new() -> Self {
        Self
    }

    fn check_format(format: &str) -> ApiResult<()> {
        if format.eq_ignore_ascii_case(JSON_FORMAT) {
            Ok(())
        } else {
            Err(ApiError::Serialization(serde_json::Error::custom(format!(
                "Unsupported format: {}",
                format
            ))))
        }
    }
}

impl Serializer for JsonSerializer {
    fn deserialize<T: DeserializeOwned>(
        &self,
        content: &str,
        format: &str,
        context: &SerializerContext,
    ) -> ApiResult<T> {
        Self::check_format(format)?;

        let mut value: Value = serde_json::from_str(content)?;
        strip_ignored(&mut value, &context.ignored_attributes);

        Ok(T::deserialize(ObjectsOnly(value))?)
    }

    fn serialize<T: Serialize>(
        &self,
        value: &T,
        format: &str,
        context: &SerializerContext,
    ) -> ApiResult<String> {
        Self::check_format(format)?;

        let mut value = serde_json::to_value(value)?;
        strip_ignored(&mut value, &context.ignored_attributes);

        Ok(serde_json::to_string(&value)?)
    }
}

/// Top-level deserializer that maps only JSON objects onto structs
///
/// serde-derived structs also accept arrays positionally; a body that is not an object must not
/// populate a struct payload. Every other target is handed to the inner value unchanged.
struct ObjectsOnly(Value);

macro_rules! forward_to_value {
    ($($method:ident)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
                self.0.$method(visitor)
            }
        )*
    };
}

impl<'de> Deserializer<'de> for ObjectsOnly {
    type Error = serde_json::Error;

    forward_to_value! {
        deserialize_any deserialize_bool
        deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64
        deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64
        deserialize_f32 deserialize_f64 deserialize_char deserialize_str deserialize_string
        deserialize_bytes deserialize_byte_buf deserialize_option deserialize_unit
        deserialize_seq deserialize_map deserialize_identifier deserialize_ignored_any
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.0.deserialize_unit_struct(name, visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.0.deserialize_newtype_struct(name, visitor)
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value, Self::Error> {
        self.0.deserialize_tuple(len, visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.0.deserialize_tuple_struct(name, len, visitor)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.0.deserialize_enum(name, variants, visitor)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self.0 {
            value @ Value::Object(_) => value.deserialize_struct(name, fields, visitor),
            other => Err(serde_json::Error::invalid_type(unexpected(&other), &"a JSON object")),
        }
    }
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(n) => n.as_f64().map(Unexpected::Float).unwrap_or(Unexpected::Other("number")),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}

fn strip_ignored(value: &mut Value, ignored: &[String]) {
    if ignored.is_empty() {
        return;
    }
    match value {
        Value::Object(map) => {
            for attribute in ignored {
                map.remove(attribute);
            }
        }
        Value::Array(items) => {
            for item in items {
                if let Value::Object(map) = item {
                    for attribute in ignored {
                        map.remove(attribute);
                    }
                }
            }
        }
        _ => {}
    }
}
