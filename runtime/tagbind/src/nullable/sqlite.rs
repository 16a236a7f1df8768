//! `rusqlite` integration: every nullable type can be used as a query parameter
//! and read back from a column.
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

use super::{Nullable, NullableList, ScanTarget, Scannable};
use crate::value::Value;

fn from_column(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Bytes(b.to_vec()),
    }
}

fn to_column(value: Value) -> rusqlite::Result<rusqlite::types::Value> {
    use rusqlite::types::Value as Sql;

    Ok(match value {
        Value::Null => Sql::Null,
        Value::Bool(b) => Sql::Integer(i64::from(b)),
        Value::Int(i) => Sql::Integer(i),
        Value::Float(f) => Sql::Real(f),
        Value::Bytes(b) => Sql::Blob(b),
        // Lists are stored as a JSON array.
        list @ Value::List(_) => Sql::Text(
            serde_json::to_string(&list)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?,
        ),
        other => Sql::Text(other.as_text().unwrap_or_default().into_owned()),
    })
}

impl<T: ScanTarget> ToSql for Nullable<T> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::Owned(to_column(self.value())?))
    }
}

impl<T: ScanTarget> FromSql for Nullable<T> {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let mut scanned = Self::null();
        scanned
            .scan(from_column(value))
            .map_err(|e| FromSqlError::Other(Box::new(e)))?;
        Ok(scanned)
    }
}

impl<T: ScanTarget> ToSql for NullableList<T> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::Owned(to_column(self.value())?))
    }
}

impl<T: ScanTarget> FromSql for NullableList<T> {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = match value {
            ValueRef::Text(text) => serde_json::from_slice::<Value>(text)
                .map_err(|e| FromSqlError::Other(Box::new(e)))?,
            other => from_column(other),
        };
        let mut scanned = Self::null();
        scanned
            .scan(raw)
            .map_err(|e| FromSqlError::Other(Box::new(e)))?;
        Ok(scanned)
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use rusqlite::Connection;

    use crate::nullable::{NullDate, NullInt64, NullString, NullStrings};

    #[test]
    fn round_trips_through_sqlite() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE people (name TEXT, age INTEGER, born TEXT, tags TEXT)")
            .unwrap();
        conn.execute(
            "INSERT INTO people VALUES (?1, ?2, ?3, ?4)",
            (
                NullString::new("Ada".into()),
                NullInt64::null(),
                NullDate::new(date(1815, 12, 10)),
                NullStrings::new(vec!["math".into(), "poetry".into()]),
            ),
        )
        .unwrap();

        let (name, age, born, tags): (NullString, NullInt64, NullDate, NullStrings) = conn
            .query_row("SELECT name, age, born, tags FROM people", [], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })
            .unwrap();

        assert_eq!(name.get().map(String::as_str), Some("Ada"));
        assert!(!age.valid);
        assert_eq!(born.get(), Some(&date(1815, 12, 10)));
        assert_eq!(tags.val, vec!["math", "poetry"]);
    }
}
