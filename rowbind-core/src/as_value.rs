use crate::{Error, Result, Value, consume_while, truncate_long};
use anyhow::Context;
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use std::{any, str::FromStr};
use time::{PrimitiveDateTime, format_description::parse_borrowed};
use uuid::Uuid;

/// Conversion between native Rust types and the dynamically typed [`Value`].
///
/// Records use it to expose their fields by name, drivers use it to bind
/// parameters, and the materializer uses it to write scanned values back into
/// fields.
///
/// # Conversion rules
/// - The canonical variant of a type is always accepted (`Value::Int32` for `i32`).
/// - Integers accept every other integer width, range checked.
/// - Floats accept every integer, text accepts numbers and uuids.
/// - Text columns are parsed when the database has no native type for the
///   destination (dates, uuids and decimals stored as text).
/// - Nulls convert only into `Option<T>`.
///
/// ```rust
/// use rowbind_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert_eq!(v, Value::Int32(Some(42)));
/// let n: i64 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    /// Typed null of the variant this type maps to.
    fn as_empty_value() -> Value;
    fn as_value(self) -> Value;
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
    /// Parse a full string into `Self`, failing on trailing input.
    fn parse(input: impl AsRef<str>) -> Result<Self>
    where
        Self: Sized,
    {
        let mut value = input.as_ref();
        let result = Self::extract(&mut value)?;
        if !value.trim_end().is_empty() {
            return Err(Error::msg(format!(
                "Value `{}` parsed correctly as {} but it did not consume all the input (remaining: `{}`)",
                truncate_long!(input.as_ref()),
                any::type_name::<Self>(),
                truncate_long!(value),
            )));
        }
        Ok(result)
    }
    /// Parse a prefix of `value`, advancing it only on success.
    fn extract(value: &mut &str) -> Result<Self>
    where
        Self: Sized,
    {
        Err(Error::msg(format!(
            "Cannot parse '{value}' as {}",
            any::type_name::<Self>()
        )))
    }
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(Some(value.into()))
    }
}

macro_rules! impl_as_value {
    ($source:ty, $destination:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self as _))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                #[allow(unreachable_patterns)]
                let wide: i128 = match value {
                    $destination(Some(v)) => return Ok(v as _),
                    Value::Int8(Some(v)) => v as _,
                    Value::Int16(Some(v)) => v as _,
                    Value::Int32(Some(v)) => v as _,
                    Value::Int64(Some(v)) => v as _,
                    Value::UInt8(Some(v)) => v as _,
                    Value::UInt16(Some(v)) => v as _,
                    Value::UInt32(Some(v)) => v as _,
                    Value::UInt64(Some(v)) => v as _,
                    Value::Boolean(Some(v)) => v as _,
                    Value::Decimal(Some(v)) => {
                        let error = Error::msg(format!(
                            "Value {v}: Decimal does not fit into {}",
                            any::type_name::<Self>()
                        ));
                        if !v.is_integer() {
                            return Err(error.context("The value is not a integer"));
                        }
                        v.to_i128().ok_or(error)?
                    }
                    Value::Varchar(Some(ref v)) => return Self::parse(v),
                    _ => {
                        return Err(Error::msg(format!(
                            "Cannot convert {value:?} to {}",
                            any::type_name::<Self>(),
                        )));
                    }
                };
                <$source>::try_from(wide).map_err(|_| {
                    Error::msg(format!(
                        "Value {wide} is out of range for {}",
                        any::type_name::<Self>(),
                    ))
                })
            }
            fn extract(input: &mut &str) -> Result<Self> {
                let mut value = *input;
                let sign = if value.starts_with(['-', '+']) {
                    &value[..1]
                } else {
                    ""
                };
                value = &value[sign.len()..];
                let digits = consume_while(&mut value, char::is_ascii_digit);
                if digits.is_empty() {
                    return Err(Error::msg(format!(
                        "Cannot extract {} from `{}`",
                        any::type_name::<Self>(),
                        truncate_long!(input),
                    )));
                }
                let literal = &input[..sign.len() + digits.len()];
                let result = literal.parse::<$source>().with_context(|| {
                    format!(
                        "Value {literal} is out of range for {}",
                        any::type_name::<Self>()
                    )
                })?;
                *input = value;
                Ok(result)
            }
        }
    };
}
impl_as_value!(i8, Value::Int8);
impl_as_value!(i16, Value::Int16);
impl_as_value!(i32, Value::Int32);
impl_as_value!(i64, Value::Int64);
impl_as_value!(isize, Value::Int64);
impl_as_value!(u8, Value::UInt8);
impl_as_value!(u16, Value::UInt16);
impl_as_value!(u32, Value::UInt32);
impl_as_value!(u64, Value::UInt64);
impl_as_value!(usize, Value::UInt64);

macro_rules! impl_as_value {
    ($source:ty, $destination:path, $extract:expr $(, $pat_rest:pat => $expr_rest:expr)* $(,)?) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self.into()))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v)) => Ok(v.into()),
                    $($pat_rest => $expr_rest,)*
                    #[allow(unreachable_patterns)]
                    Value::Varchar(Some(ref v)) => <Self as AsValue>::parse(v),
                    _ => Err(Error::msg(format!(
                        "Cannot convert {value:?} to {}",
                        any::type_name::<Self>(),
                    ))),
                }
            }
            fn extract(value: &mut &str) -> Result<Self> {
                $extract(value)
            }
        }
    };
}
impl_as_value!(
    bool,
    Value::Boolean,
    |input: &mut &str| {
        let mut value = *input;
        let result = consume_while(&mut value, |v| v.is_alphanumeric() || *v == '_');
        let result = match result {
            x if x.eq_ignore_ascii_case("true") || x.eq_ignore_ascii_case("t") || x == "1" => {
                Ok(true)
            }
            x if x.eq_ignore_ascii_case("false") || x.eq_ignore_ascii_case("f") || x == "0" => {
                Ok(false)
            }
            _ => return Err(Error::msg(format!("Cannot parse boolean from '{input}'")))
        };
        *input = value;
        result
    },
    Value::Int8(Some(v)) => Ok(v != 0),
    Value::Int16(Some(v)) => Ok(v != 0),
    Value::Int32(Some(v)) => Ok(v != 0),
    Value::Int64(Some(v)) => Ok(v != 0),
    Value::UInt8(Some(v)) => Ok(v != 0),
    Value::UInt16(Some(v)) => Ok(v != 0),
    Value::UInt32(Some(v)) => Ok(v != 0),
    Value::UInt64(Some(v)) => Ok(v != 0),
);

macro_rules! extract_float {
    ($input:expr, $source:ty) => {{
        let mut value = *$input;
        let number = consume_while(&mut value, |c| {
            c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E')
        });
        let result = number.parse::<$source>().with_context(|| {
            format!(
                "Cannot extract a floating point value from `{}`",
                truncate_long!($input)
            )
        })?;
        *$input = value;
        Ok(result)
    }};
}
impl_as_value!(
    f32,
    Value::Float32,
    |input: &mut &str| extract_float!(input, f32),
    Value::Float64(Some(v)) => Ok(v as _),
    Value::Int8(Some(v)) => Ok(v as _),
    Value::Int16(Some(v)) => Ok(v as _),
    Value::Int32(Some(v)) => Ok(v as _),
    Value::Int64(Some(v)) => Ok(v as _),
    Value::UInt8(Some(v)) => Ok(v as _),
    Value::UInt16(Some(v)) => Ok(v as _),
    Value::UInt32(Some(v)) => Ok(v as _),
    Value::UInt64(Some(v)) => Ok(v as _),
    Value::Decimal(Some(v)) => v
        .to_f32()
        .ok_or_else(|| Error::msg(format!("Value {v}: Decimal does not fit into f32"))),
);
impl_as_value!(
    f64,
    Value::Float64,
    |input: &mut &str| extract_float!(input, f64),
    Value::Float32(Some(v)) => Ok(v as _),
    Value::Int8(Some(v)) => Ok(v as _),
    Value::Int16(Some(v)) => Ok(v as _),
    Value::Int32(Some(v)) => Ok(v as _),
    Value::Int64(Some(v)) => Ok(v as _),
    Value::UInt8(Some(v)) => Ok(v as _),
    Value::UInt16(Some(v)) => Ok(v as _),
    Value::UInt32(Some(v)) => Ok(v as _),
    Value::UInt64(Some(v)) => Ok(v as _),
    Value::Decimal(Some(v)) => v
        .to_f64()
        .ok_or_else(|| Error::msg(format!("Value {v}: Decimal does not fit into f64"))),
);
impl_as_value!(
    String,
    Value::Varchar,
    |input: &mut &str| {
        let result = input.to_string();
        *input = "";
        Ok(result)
    },
    Value::Blob(Some(v)) => String::from_utf8(v.into_vec()).context("Blob is not valid UTF-8"),
    Value::Int8(Some(v)) => Ok(v.to_string()),
    Value::Int16(Some(v)) => Ok(v.to_string()),
    Value::Int32(Some(v)) => Ok(v.to_string()),
    Value::Int64(Some(v)) => Ok(v.to_string()),
    Value::UInt8(Some(v)) => Ok(v.to_string()),
    Value::UInt16(Some(v)) => Ok(v.to_string()),
    Value::UInt32(Some(v)) => Ok(v.to_string()),
    Value::UInt64(Some(v)) => Ok(v.to_string()),
    Value::Float32(Some(v)) => Ok(v.to_string()),
    Value::Float64(Some(v)) => Ok(v.to_string()),
    Value::Decimal(Some(v)) => Ok(v.to_string()),
    Value::Uuid(Some(v)) => Ok(v.hyphenated().to_string()),
);
impl_as_value!(
    Box<[u8]>,
    Value::Blob,
    |input: &mut &str| {
        let result = input.as_bytes().into();
        *input = "";
        Ok(result)
    },
);
impl_as_value!(
    Vec<u8>,
    Value::Blob,
    |input: &mut &str| {
        let result = input.as_bytes().to_vec();
        *input = "";
        Ok(result)
    },
);
impl_as_value!(
    Uuid,
    Value::Uuid,
    |input: &mut &str| {
        let mut value = *input;
        let text = consume_while(&mut value, |c| c.is_ascii_hexdigit() || *c == '-');
        let uuid = Uuid::parse_str(text).with_context(|| {
            format!("Cannot extract a uuid value from `{}`", truncate_long!(input))
        })?;
        *input = value;
        Ok(uuid)
    },
    Value::Blob(Some(v)) => Uuid::from_slice(&v).context("Blob is not a valid uuid"),
);

macro_rules! parse_time {
    ($value: ident, $($formats:literal),+ $(,)?) => {
        'value: {
            for format in [$($formats,)+] {
                let format = parse_borrowed::<2>(format)?;
                let mut parsed = time::parsing::Parsed::new();
                let remaining = parsed.parse_items($value.as_bytes(), &format);
                if let Ok(remaining) = remaining {
                    let result = parsed.try_into()?;
                    *$value = &$value[($value.len() - remaining.len())..];
                    break 'value Ok(result);
                }
            }
            Err(Error::msg(format!(
                "Cannot extract from `{}` as {}",
                $value,
                any::type_name::<Self>()
            )))
        }
    }
}

impl_as_value!(
    time::Date,
    Value::Date,
    |v: &mut &str| {
        let result: time::Date = parse_time!(v, "[year]-[month]-[day]")?;
        Ok(result)
    },
);
impl_as_value!(
    time::Time,
    Value::Time,
    |v: &mut &str| {
        let result: time::Time = parse_time!(
            v,
            "[hour]:[minute]:[second].[subsecond]",
            "[hour]:[minute]:[second]",
            "[hour]:[minute]",
        )?;
        Ok(result)
    },
);
impl_as_value!(
    time::PrimitiveDateTime,
    Value::Timestamp,
    |v: &mut &str| {
        let result: time::PrimitiveDateTime = parse_time!(
            v,
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]",
            "[year]-[month]-[day]T[hour]:[minute]:[second]",
            "[year]-[month]-[day]T[hour]:[minute]",
            "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]",
            "[year]-[month]-[day] [hour]:[minute]:[second]",
            "[year]-[month]-[day] [hour]:[minute]",
        )?;
        Ok(result)
    },
    Value::TimestampWithTimezone(Some(v)) => {
        Ok(PrimitiveDateTime::new(v.date(), v.time()))
    }
);
impl_as_value!(
    time::OffsetDateTime,
    Value::TimestampWithTimezone,
    |v: &mut &str| {
        let result: time::OffsetDateTime = parse_time!(
            v,
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory]:[offset_minute]",
            "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]",
            "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory]:[offset_minute]",
            "[year]-[month]-[day] [hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]",
        ).or_else(|_: Error| <PrimitiveDateTime as AsValue>::extract(v).map(|v| v.assume_utc()))?;
        Ok(result)
    },
    Value::Timestamp(Some(timestamp)) => Ok(timestamp.assume_utc()),
);

impl AsValue for Decimal {
    fn as_empty_value() -> Value {
        Value::Decimal(None)
    }
    fn as_value(self) -> Value {
        Value::Decimal(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Decimal(Some(v)) => Ok(v),
            Value::Int8(Some(v)) => Ok(Decimal::from(v)),
            Value::Int16(Some(v)) => Ok(Decimal::from(v)),
            Value::Int32(Some(v)) => Ok(Decimal::from(v)),
            Value::Int64(Some(v)) => Ok(Decimal::from(v)),
            Value::UInt8(Some(v)) => Ok(Decimal::from(v)),
            Value::UInt16(Some(v)) => Ok(Decimal::from(v)),
            Value::UInt32(Some(v)) => Ok(Decimal::from(v)),
            Value::UInt64(Some(v)) => Ok(Decimal::from(v)),
            Value::Float32(Some(v)) => Decimal::from_f32(v)
                .ok_or_else(|| Error::msg(format!("Cannot convert {value:?} to Decimal"))),
            Value::Float64(Some(v)) => Decimal::from_f64(v)
                .ok_or_else(|| Error::msg(format!("Cannot convert {value:?} to Decimal"))),
            Value::Varchar(Some(ref v)) => Self::parse(v),
            _ => Err(Error::msg(format!("Cannot convert {value:?} to Decimal"))),
        }
    }
    fn extract(input: &mut &str) -> Result<Self> {
        let mut value = *input;
        let number = consume_while(&mut value, |c| {
            c.is_ascii_digit() || matches!(c, '-' | '+' | '.')
        });
        let result = Decimal::from_str(number).with_context(|| {
            format!("Cannot extract a decimal from `{}`", truncate_long!(input))
        })?;
        *input = value;
        Ok(result)
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(if value.is_null() {
            None
        } else {
            Some(<T as AsValue>::try_from_value(value)?)
        })
    }
    fn extract(input: &mut &str) -> Result<Self>
    where
        Self: Sized,
    {
        let mut value = *input;
        let result = consume_while(&mut value, |v| v.is_alphanumeric() || *v == '_');
        if result.eq_ignore_ascii_case("null") {
            *input = value;
            return Ok(None);
        };
        T::extract(input).map(Some)
    }
}

impl<T: AsValue> AsValue for Box<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        (*self).as_value()
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(Self::new(<T as AsValue>::try_from_value(value)?))
    }
    fn extract(value: &mut &str) -> Result<Self>
    where
        Self: Sized,
    {
        T::extract(value).map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime, time};

    #[test]
    fn integers_are_range_checked() {
        assert_eq!(i8::try_from_value(Value::Int64(Some(-5))).unwrap(), -5);
        assert!(i8::try_from_value(Value::Int64(Some(300))).is_err());
        assert!(u32::try_from_value(Value::Int64(Some(-1))).is_err());
        assert_eq!(u64::try_from_value(Value::Int64(Some(77))).unwrap(), 77);
        assert_eq!(i64::try_from_value(Value::Varchar(Some("-12".into()))).unwrap(), -12);
        assert!(i32::try_from_value(Value::Varchar(Some("12a".into()))).is_err());
        assert!(i32::try_from_value(Value::Null).is_err());
    }

    #[test]
    fn lenient_conversions() {
        assert!(bool::try_from_value(Value::Int64(Some(1))).unwrap());
        assert!(!bool::try_from_value(Value::Varchar(Some("f".into()))).unwrap());
        assert_eq!(f64::try_from_value(Value::Int64(Some(3))).unwrap(), 3.0);
        assert_eq!(f64::try_from_value(Value::UInt8(Some(7))).unwrap(), 7.0);
        assert_eq!(f32::try_from_value(Value::Int16(Some(-2))).unwrap(), -2.0);
        assert_eq!(String::try_from_value(Value::Int64(Some(12))).unwrap(), "12");
        assert_eq!(String::try_from_value(Value::UInt32(Some(4))).unwrap(), "4");
        assert_eq!(
            String::try_from_value(Value::Decimal(Some(Decimal::new(1250, 2)))).unwrap(),
            "12.50"
        );
        assert_eq!(String::try_from_value(Value::Float64(Some(0.5))).unwrap(), "0.5");
        assert_eq!(
            Decimal::try_from_value(Value::Varchar(Some("12.50".into()))).unwrap(),
            Decimal::new(1250, 2)
        );
        assert_eq!(
            time::Date::try_from_value(Value::Varchar(Some("2024-02-29".into()))).unwrap(),
            date!(2024 - 02 - 29)
        );
        assert_eq!(
            time::Time::try_from_value(Value::Varchar(Some("08:30:15.25".into()))).unwrap(),
            time!(8:30:15.25)
        );
        assert_eq!(
            PrimitiveDateTime::try_from_value(Value::Varchar(Some(
                "2023-11-05 10:00:00".into()
            )))
            .unwrap(),
            datetime!(2023-11-05 10:00:00)
        );
        let id = Uuid::from_u128(0x1234_5678_9abc_def0_1234_5678_9abc_def0);
        assert_eq!(
            Uuid::try_from_value(Value::Varchar(Some(id.to_string()))).unwrap(),
            id
        );
    }

    #[test]
    fn options_and_nulls() {
        assert_eq!(Option::<i32>::try_from_value(Value::Null).unwrap(), None);
        assert_eq!(Option::<i32>::try_from_value(Value::Int64(None)).unwrap(), None);
        assert_eq!(Option::<i32>::try_from_value(Value::Int64(Some(9))).unwrap(), Some(9));
        assert_eq!(None::<String>.as_value(), Value::Varchar(None));
        assert_eq!(Option::<String>::parse("NULL").unwrap(), None);
    }

    #[test]
    fn parse_rejects_trailing_input() {
        assert_eq!(i32::parse("42").unwrap(), 42);
        assert!(i32::parse("42 apples").is_err());
        assert!(bool::parse("maybe").is_err());
    }
}
