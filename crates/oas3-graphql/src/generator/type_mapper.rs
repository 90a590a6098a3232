use std::{fmt, str::FromStr, sync::LazyLock};

use oas3::spec::{ObjectSchema, SchemaType, SchemaTypeSet};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use strum::{Display, EnumIter, IntoStaticStr};

const DATE_TIME_FORMAT: &str = "date-time";

/// GraphQL scalar a generated field is typed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, EnumIter)]
pub enum ScalarTag {
  #[strum(to_string = "ID!")]
  Id,
  #[strum(to_string = "DateTime")]
  DateTime,
  #[strum(to_string = "String")]
  String,
  #[strum(to_string = "Float")]
  Float,
  #[strum(to_string = "Boolean")]
  Boolean,
  #[strum(to_string = "BigInt")]
  BigInt,
}

/// Maps an OpenAPI property onto the scalar used for its GraphQL field.
///
/// The `id` property is always a non-null `ID`. Anything that is not a string,
/// number, boolean or integer yields `None` and is left out of the type.
pub fn graphql_type(property_name: &str, property_format: &str, property_type: Option<SchemaType>) -> Option<ScalarTag> {
  if property_name == "id" {
    return Some(ScalarTag::Id);
  }

  match property_type? {
    SchemaType::String if property_format == DATE_TIME_FORMAT => Some(ScalarTag::DateTime),
    SchemaType::String => Some(ScalarTag::String),
    SchemaType::Number => Some(ScalarTag::Float),
    SchemaType::Boolean => Some(ScalarTag::Boolean),
    SchemaType::Integer => Some(ScalarTag::BigInt),
    _ => None,
  }
}

/// Primitive type of a property schema, looking through a `[T, null]` pair.
pub(crate) fn property_type(schema: &ObjectSchema) -> Option<SchemaType> {
  match &schema.schema_type {
    Some(SchemaTypeSet::Single(t)) => Some(*t),
    Some(SchemaTypeSet::Multiple(types)) => {
      let mut non_null = types.iter().filter(|t| **t != SchemaType::Null);
      match (non_null.next(), non_null.next()) {
        (Some(t), None) => Some(*t),
        _ => None,
      }
    }
    None => None,
  }
}

static BIG_INT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+$").unwrap());

/// Value of the `BigInt` scalar.
///
/// Keeps the decimal digits verbatim so integers wider than 64 bits survive a
/// round trip. Serialized as a JSON string; accepts strings or JSON integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BigInt(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a valid integer")]
pub struct ParseBigIntError(String);

impl BigInt {
  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn is_negative(&self) -> bool {
    self.0.starts_with('-')
  }
}

impl FromStr for BigInt {
  type Err = ParseBigIntError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let trimmed = s.trim();
    if !BIG_INT_RE.is_match(trimmed) {
      return Err(ParseBigIntError(s.to_string()));
    }

    let (sign, digits) = match trimmed.as_bytes()[0] {
      b'-' => ("-", &trimmed[1..]),
      b'+' => ("", &trimmed[1..]),
      _ => ("", trimmed),
    };
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
      return Ok(Self("0".to_string()));
    }
    Ok(Self(format!("{sign}{digits}")))
  }
}

impl fmt::Display for BigInt {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<i64> for BigInt {
  fn from(value: i64) -> Self {
    Self(value.to_string())
  }
}

impl From<u64> for BigInt {
  fn from(value: u64) -> Self {
    Self(value.to_string())
  }
}

impl Serialize for BigInt {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&self.0)
  }
}

impl<'de> Deserialize<'de> for BigInt {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    struct BigIntVisitor;

    impl de::Visitor<'_> for BigIntVisitor {
      type Value = BigInt;

      fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer or a string of decimal digits")
      }

      fn visit_i64<E: de::Error>(self, v: i64) -> Result<BigInt, E> {
        Ok(BigInt::from(v))
      }

      fn visit_u64<E: de::Error>(self, v: u64) -> Result<BigInt, E> {
        Ok(BigInt::from(v))
      }

      fn visit_str<E: de::Error>(self, v: &str) -> Result<BigInt, E> {
        v.parse().map_err(E::custom)
      }
    }

    deserializer.deserialize_any(BigIntVisitor)
  }
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator;

  use super::*;

  const ALL_TYPES: [Option<SchemaType>; 8] = [
    Some(SchemaType::String),
    Some(SchemaType::Number),
    Some(SchemaType::Integer),
    Some(SchemaType::Boolean),
    Some(SchemaType::Object),
    Some(SchemaType::Array),
    Some(SchemaType::Null),
    None,
  ];

  #[test]
  fn test_id_ignores_format_and_type() {
    for property_type in ALL_TYPES {
      for format in ["", "date-time", "uuid"] {
        assert_eq!(graphql_type("id", format, property_type), Some(ScalarTag::Id));
      }
    }
  }

  #[test]
  fn test_string_formats() {
    assert_eq!(
      graphql_type("created_at", "date-time", Some(SchemaType::String)),
      Some(ScalarTag::DateTime)
    );
    assert_eq!(graphql_type("name", "", Some(SchemaType::String)), Some(ScalarTag::String));
    assert_eq!(graphql_type("day", "date", Some(SchemaType::String)), Some(ScalarTag::String));
  }

  #[test]
  fn test_numeric_and_boolean() {
    assert_eq!(graphql_type("ratio", "", Some(SchemaType::Number)), Some(ScalarTag::Float));
    assert_eq!(graphql_type("enabled", "", Some(SchemaType::Boolean)), Some(ScalarTag::Boolean));
    assert_eq!(graphql_type("size", "int32", Some(SchemaType::Integer)), Some(ScalarTag::BigInt));
  }

  #[test]
  fn test_unmapped_types_are_dropped() {
    assert_eq!(graphql_type("tenant", "", Some(SchemaType::Object)), None);
    assert_eq!(graphql_type("tags", "", Some(SchemaType::Array)), None);
    assert_eq!(graphql_type("nothing", "", Some(SchemaType::Null)), None);
    assert_eq!(graphql_type("untyped", "", None), None);
  }

  #[test]
  fn test_scalar_sdl_names() {
    let names: Vec<String> = ScalarTag::iter().map(|tag| tag.to_string()).collect();
    assert_eq!(names, ["ID!", "DateTime", "String", "Float", "Boolean", "BigInt"]);
  }

  #[test]
  fn test_nullable_property_type() {
    let schema: ObjectSchema = serde_json::from_value(serde_json::json!({ "type": ["integer", "null"] })).unwrap();
    assert_eq!(property_type(&schema), Some(SchemaType::Integer));

    let schema: ObjectSchema = serde_json::from_value(serde_json::json!({ "type": ["integer", "string"] })).unwrap();
    assert_eq!(property_type(&schema), None);
  }

  #[test]
  fn test_big_int_keeps_precision_beyond_i64() {
    let raw = "170141183460469231731687303715884105727";
    let value: BigInt = raw.parse().unwrap();
    assert_eq!(value.to_string(), raw);

    let json = serde_json::to_string(&value).unwrap();
    assert_eq!(json, format!("\"{raw}\""));
    let back: BigInt = serde_json::from_str(&json).unwrap();
    assert_eq!(back, value);
  }

  #[test]
  fn test_big_int_normalizes_and_rejects() {
    assert_eq!("+0042".parse::<BigInt>().unwrap().as_str(), "42");
    assert_eq!("-000".parse::<BigInt>().unwrap().as_str(), "0");
    assert!("-17".parse::<BigInt>().unwrap().is_negative());
    assert!("12.5".parse::<BigInt>().is_err());
    assert!("".parse::<BigInt>().is_err());

    let from_number: BigInt = serde_json::from_str("18446744073709551615").unwrap();
    assert_eq!(from_number.as_str(), "18446744073709551615");
  }
}
