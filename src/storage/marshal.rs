//! Row marshalling between entity values and table rows
//!
//! Every entity implements [`Record`]: its column names in field order, how to
//! produce the values in that same order, and how to scan a row back. The
//! statement builders here are the only place that turns a record into SQL, so
//! placeholders always line up with values.
//!
//! Complex fields use these column encodings:
//!
//! | Field | Column |
//! |-------|--------|
//! | `Vec<String>` | JSON array text |
//! | [`Attrs`] | `key: value` lines |
//! | `Option<DateTime<Utc>>` | RFC 3339 UTC text, [`ZERO_TIME`] for `None` |

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::{FromSql, Type, Value};
use rusqlite::{Connection, OptionalExtension, Params, Row};

use super::batch::Statement;
use crate::domain::{Attrs, GroupId, TaskId, UnitId, VersionId};
use crate::error::Result;

/// Stored in time columns for "unset"
pub const ZERO_TIME: &str = "0001-01-01T00:00:00Z";

/// An entity backed by one table
pub trait Record: Sized {
    const TABLE: &'static str;

    /// Column names in field declaration order, primary key columns first
    const COLUMNS: &'static [&'static str];

    /// Number of leading [`Self::COLUMNS`] that form the primary key
    const KEY_LEN: usize;

    /// Column values, in [`Self::COLUMNS`] order
    fn values(&self) -> Vec<Value>;

    /// Scans a row selected with [`select_columns`]
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    fn key_columns() -> &'static [&'static str] {
        &Self::COLUMNS[..Self::KEY_LEN]
    }
}

/// Values addressing a row by primary key, in key column order
pub trait RowKey {
    fn key_values(&self) -> Vec<Value>;
}

impl RowKey for str {
    fn key_values(&self) -> Vec<Value> {
        vec![text(self)]
    }
}

impl RowKey for GroupId {
    fn key_values(&self) -> Vec<Value> {
        vec![text(&self.show), text(&self.group)]
    }
}

impl RowKey for UnitId {
    fn key_values(&self) -> Vec<Value> {
        vec![
            text(&self.show),
            text(self.category.as_str()),
            text(&self.group),
            text(&self.unit),
        ]
    }
}

impl RowKey for TaskId {
    fn key_values(&self) -> Vec<Value> {
        let mut values = self.unit_id().key_values();
        values.push(text(&self.task));
        values
    }
}

impl RowKey for VersionId {
    fn key_values(&self) -> Vec<Value> {
        let mut values = self.task_id().key_values();
        values.push(text(&self.version));
        values
    }
}

/// Parallel column names, placeholders and values for one record
#[derive(Debug, Clone, PartialEq)]
pub struct Marshalled {
    pub columns: Vec<&'static str>,
    pub placeholders: Vec<String>,
    pub values: Vec<Value>,
}

impl Marshalled {
    /// Appends a column that is not part of the record (e.g. a password hash)
    pub fn with(mut self, column: &'static str, value: Value) -> Self {
        self.columns.push(column);
        self.placeholders.push(format!("?{}", self.placeholders.len() + 1));
        self.values.push(value);
        self
    }

    /// Comma separated column names
    pub fn keys(&self) -> String {
        self.columns.join(", ")
    }

    /// Comma separated placeholders
    pub fn idxs(&self) -> String {
        self.placeholders.join(", ")
    }

    pub fn into_insert(self, table: &str) -> Statement {
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            self.keys(),
            self.idxs()
        );
        Statement::new(sql, self.values)
    }
}

pub fn marshal<R: Record>(record: &R) -> Marshalled {
    let values = record.values();
    debug_assert_eq!(values.len(), R::COLUMNS.len(), "{} values", R::TABLE);
    Marshalled {
        columns: R::COLUMNS.to_vec(),
        placeholders: (1..=values.len()).map(|i| format!("?{}", i)).collect(),
        values,
    }
}

/// `INSERT` of every column
pub fn insert<R: Record>(record: &R) -> Statement {
    marshal(record).into_insert(R::TABLE)
}

/// `UPDATE` overwriting every non-key column of the row addressed by the record's key
pub fn update<R: Record>(record: &R) -> Statement {
    let m = marshal(record);
    let (key_values, set_values) = m.values.split_at(R::KEY_LEN);

    let set = R::COLUMNS[R::KEY_LEN..]
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = ?{}", c, i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE {} SET {} WHERE {}",
        R::TABLE,
        set,
        where_key(R::key_columns(), set_values.len() + 1)
    );

    let mut params = set_values.to_vec();
    params.extend_from_slice(key_values);
    Statement::new(sql, params)
}

/// `col1 = ?n AND col2 = ?n+1 ...`
pub fn where_key(columns: &[&str], first: usize) -> String {
    columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = ?{}", c, first + i))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Column list for a `SELECT`, optionally qualified by a table name for joins
pub fn select_columns<R: Record>(table: Option<&str>) -> String {
    match table {
        Some(t) => R::COLUMNS
            .iter()
            .map(|c| format!("{}.{}", t, c))
            .collect::<Vec<_>>()
            .join(", "),
        None => R::COLUMNS.join(", "),
    }
}

/// Fetches the row addressed by `key`
pub fn select_by_key<R: Record, K: RowKey + ?Sized>(conn: &Connection, key: &K) -> Result<Option<R>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE {}",
        select_columns::<R>(None),
        R::TABLE,
        where_key(R::key_columns(), 1)
    );
    let row = conn
        .query_row(&sql, rusqlite::params_from_iter(key.key_values()), R::from_row)
        .optional()?;
    Ok(row)
}

pub fn exists<R: Record, K: RowKey + ?Sized>(conn: &Connection, key: &K) -> Result<bool> {
    let sql = format!(
        "SELECT 1 FROM {} WHERE {}",
        R::TABLE,
        where_key(R::key_columns(), 1)
    );
    let found = conn
        .query_row(&sql, rusqlite::params_from_iter(key.key_values()), |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

/// Fetches every row matching `tail` (`WHERE ... ORDER BY ...`)
pub fn select_where<R: Record, P: Params>(conn: &Connection, tail: &str, params: P) -> Result<Vec<R>> {
    let sql = format!("SELECT {} FROM {} {}", select_columns::<R>(None), R::TABLE, tail);
    query(conn, &sql, params)
}

/// Runs a full query whose columns are `select_columns::<R>(..)`, e.g. a join
pub fn query<R: Record, P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<R>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, R::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

pub fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

pub fn list(items: &[String]) -> Value {
    Value::Text(serde_json::Value::from(items.to_vec()).to_string())
}

pub fn time(t: &Option<DateTime<Utc>>) -> Value {
    match t {
        Some(t) => Value::Text(t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        None => text(ZERO_TIME),
    }
}

pub fn attrs(a: &Attrs) -> Value {
    Value::Text(a.encode())
}

/// Reads a row's columns in order
pub struct Scan<'a, 'r> {
    row: &'a Row<'r>,
    idx: usize,
}

impl<'a, 'r> Scan<'a, 'r> {
    pub fn new(row: &'a Row<'r>) -> Self {
        Self { row, idx: 0 }
    }

    fn advance(&mut self) -> usize {
        let idx = self.idx;
        self.idx += 1;
        idx
    }

    pub fn next<T: FromSql>(&mut self) -> rusqlite::Result<T> {
        let idx = self.advance();
        self.row.get(idx)
    }

    pub fn string(&mut self) -> rusqlite::Result<String> {
        self.next()
    }

    /// Parses a text column through `FromStr` (statuses, categories)
    pub fn parse<T>(&mut self) -> rusqlite::Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let idx = self.advance();
        let s: String = self.row.get(idx)?;
        s.parse()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    }

    /// Like [`Self::parse`] but maps an empty column to `None`
    pub fn parse_opt<T>(&mut self) -> rusqlite::Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let idx = self.advance();
        let s: String = self.row.get(idx)?;
        if s.is_empty() {
            return Ok(None);
        }
        s.parse()
            .map(Some)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    }

    pub fn list(&mut self) -> rusqlite::Result<Vec<String>> {
        let idx = self.advance();
        let s: String = self.row.get(idx)?;
        serde_json::from_str(&s)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    }

    pub fn time(&mut self) -> rusqlite::Result<Option<DateTime<Utc>>> {
        let idx = self.advance();
        let s: String = self.row.get(idx)?;
        if s == ZERO_TIME {
            return Ok(None);
        }
        DateTime::parse_from_rfc3339(&s)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    }

    pub fn attrs(&mut self) -> rusqlite::Result<Attrs> {
        let s = self.string()?;
        Ok(Attrs::decode(&s))
    }
}
