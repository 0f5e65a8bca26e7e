use rowbind_core::{AsValue, Value};
use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

pub(crate) fn extract_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => v.as_value(),
        ValueRef::Real(v) => v.as_value(),
        ValueRef::Text(v) => match std::str::from_utf8(v) {
            Ok(v) => v.to_string().as_value(),
            Err(..) => Value::Blob(Some(v.into())),
        },
        ValueRef::Blob(v) => Value::Blob(Some(v.into())),
    }
}

fn write_date(out: &mut String, date: &Date) {
    out.push_str(&format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        date.month() as u8,
        date.day()
    ));
}

fn write_time(out: &mut String, time: &Time) {
    out.push_str(&format!(
        "{:02}:{:02}:{:02}",
        time.hour(),
        time.minute(),
        time.second()
    ));
    if time.nanosecond() != 0 {
        let fraction = format!("{:09}", time.nanosecond());
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
}

fn timestamp_text(value: &PrimitiveDateTime) -> String {
    let mut out = String::with_capacity(32);
    write_date(&mut out, &value.date());
    out.push(' ');
    write_time(&mut out, &value.time());
    out
}

fn offset_timestamp_text(value: &OffsetDateTime) -> String {
    let mut out = timestamp_text(&PrimitiveDateTime::new(value.date(), value.time()));
    let (hours, minutes, _) = value.offset().as_hms();
    out.push_str(&format!(
        "{}{:02}:{:02}",
        if value.offset().is_negative() { '-' } else { '+' },
        hours.unsigned_abs(),
        minutes.unsigned_abs()
    ));
    out
}

type Sql = rusqlite::types::Value;

fn owned(value: Sql) -> rusqlite::Result<ToSqlOutput<'static>> {
    Ok(ToSqlOutput::Owned(value))
}

/// Binds a [`Value`] as a SQLite parameter.
///
/// SQLite has no native types for decimals, dates and uuids: they are stored
/// as text and parsed back by `AsValue`.
pub(crate) struct SqliteValue<'a>(pub(crate) &'a Value);

impl ToSql for SqliteValue<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        if self.0.is_null() {
            return owned(Sql::Null);
        }
        match self.0 {
            Value::Boolean(Some(v)) => owned(Sql::Integer(*v as i64)),
            Value::Int8(Some(v)) => owned(Sql::Integer(*v as i64)),
            Value::Int16(Some(v)) => owned(Sql::Integer(*v as i64)),
            Value::Int32(Some(v)) => owned(Sql::Integer(*v as i64)),
            Value::Int64(Some(v)) => owned(Sql::Integer(*v)),
            Value::UInt8(Some(v)) => owned(Sql::Integer(*v as i64)),
            Value::UInt16(Some(v)) => owned(Sql::Integer(*v as i64)),
            Value::UInt32(Some(v)) => owned(Sql::Integer(*v as i64)),
            Value::UInt64(Some(v)) => i64::try_from(*v)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
                .and_then(|v| owned(Sql::Integer(v))),
            Value::Float32(Some(v)) => owned(Sql::Real(*v as f64)),
            Value::Float64(Some(v)) => owned(Sql::Real(*v)),
            Value::Decimal(Some(v)) => owned(Sql::Text(v.to_string())),
            Value::Varchar(Some(v)) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes()))),
            Value::Blob(Some(v)) => Ok(ToSqlOutput::Borrowed(ValueRef::Blob(v))),
            Value::Date(Some(v)) => {
                let mut out = String::with_capacity(10);
                write_date(&mut out, v);
                owned(Sql::Text(out))
            }
            Value::Time(Some(v)) => {
                let mut out = String::with_capacity(18);
                write_time(&mut out, v);
                owned(Sql::Text(out))
            }
            Value::Timestamp(Some(v)) => owned(Sql::Text(timestamp_text(v))),
            Value::TimestampWithTimezone(Some(v)) => owned(Sql::Text(offset_timestamp_text(v))),
            Value::Uuid(Some(v)) => owned(Sql::Text(v.hyphenated().to_string())),
            _ => owned(Sql::Null),
        }
    }
}
