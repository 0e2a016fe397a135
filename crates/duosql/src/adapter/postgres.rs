//! Remote engine adapter over a `deadpool-postgres` pool.

use super::{Adapter, log_statement};
use crate::config::{BackendKind, RemoteConfig};
use crate::error::{DbError, DbResult};
use crate::placeholder::PlaceholderStyle;
use crate::row::Row;
use crate::template::Statement;
use crate::value::Value;
use bytes::BytesMut;
use deadpool_postgres::Pool;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::error::Error;
use std::sync::Arc;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};

type BoxError = Box<dyn Error + Sync + Send>;

fn cannot_bind(value: &Value, ty: &Type) -> BoxError {
    format!("cannot bind {} value to parameter of type {ty}", value.kind()).into()
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => match *ty {
                Type::BOOL => b.to_sql(ty, out),
                _ => Err(cannot_bind(self, ty)),
            },
            Value::Int(i) => match *ty {
                Type::INT2 => i16::try_from(*i)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*i)?.to_sql(ty, out),
                Type::INT8 => i.to_sql(ty, out),
                Type::OID => u32::try_from(*i)?.to_sql(ty, out),
                Type::FLOAT4 => (*i as f32).to_sql(ty, out),
                Type::FLOAT8 => (*i as f64).to_sql(ty, out),
                Type::NUMERIC => Decimal::from(*i).to_sql(ty, out),
                _ if <&str as ToSql>::accepts(ty) => i.to_string().to_sql(ty, out),
                _ => Err(cannot_bind(self, ty)),
            },
            Value::Float(f) => match *ty {
                Type::FLOAT4 => (*f as f32).to_sql(ty, out),
                Type::FLOAT8 => f.to_sql(ty, out),
                Type::NUMERIC => Decimal::try_from(*f)?.to_sql(ty, out),
                _ if <&str as ToSql>::accepts(ty) => f.to_string().to_sql(ty, out),
                _ => Err(cannot_bind(self, ty)),
            },
            Value::Text(s) => match *ty {
                Type::JSON | Type::JSONB => {
                    serde_json::from_str::<serde_json::Value>(s)?.to_sql(ty, out)
                }
                Type::UUID => uuid::Uuid::parse_str(s)?.to_sql(ty, out),
                Type::TIMESTAMPTZ => chrono::DateTime::parse_from_rfc3339(s)?
                    .with_timezone(&chrono::Utc)
                    .to_sql(ty, out),
                Type::TIMESTAMP => s
                    .parse::<chrono::NaiveDateTime>()?
                    .to_sql(ty, out),
                Type::DATE => s.parse::<chrono::NaiveDate>()?.to_sql(ty, out),
                Type::NUMERIC => s.parse::<Decimal>()?.to_sql(ty, out),
                _ if <&str as ToSql>::accepts(ty) => s.as_str().to_sql(ty, out),
                _ => Err(cannot_bind(self, ty)),
            },
            Value::Blob(b) => match *ty {
                Type::BYTEA => b.as_slice().to_sql(ty, out),
                _ => Err(cannot_bind(self, ty)),
            },
        }
    }

    fn accepts(_ty: &Type) -> bool {
        // Compatibility is decided per value in `to_sql`.
        true
    }

    to_sql_checked!();
}

/// Integral numerics become `Int` when they fit, the rest `Float`. Values
/// `f64` cannot hold are kept as text.
fn numeric_value(d: Decimal) -> Value {
    if d.fract().is_zero() {
        if let Some(i) = d.to_i64() {
            return Value::Int(i);
        }
    }
    d.to_f64()
        .map_or_else(|| Value::Text(d.to_string()), Value::Float)
}

fn decode_column(row: &tokio_postgres::Row, idx: usize) -> DbResult<Value> {
    let column = &row.columns()[idx];
    let ty = column.type_();

    macro_rules! get {
        ($t:ty) => {
            row.try_get::<_, Option<$t>>(idx)
                .map_err(|e| DbError::decode(column.name(), e.to_string()))?
        };
    }

    let value = match *ty {
        Type::BOOL => get!(bool).map(Value::Bool),
        Type::INT2 => get!(i16).map(Value::from),
        Type::INT4 => get!(i32).map(Value::from),
        Type::INT8 => get!(i64).map(Value::Int),
        Type::OID => get!(u32).map(Value::from),
        Type::FLOAT4 => get!(f32).map(Value::from),
        Type::FLOAT8 => get!(f64).map(Value::Float),
        Type::NUMERIC => get!(Decimal).map(numeric_value),
        Type::BYTEA => get!(Vec<u8>).map(Value::Blob),
        Type::TIMESTAMP => get!(chrono::NaiveDateTime).map(|t| Value::Text(t.to_string())),
        Type::TIMESTAMPTZ => {
            get!(chrono::DateTime<chrono::Utc>).map(|t| Value::Text(t.to_rfc3339()))
        }
        Type::DATE => get!(chrono::NaiveDate).map(|d| Value::Text(d.to_string())),
        Type::UUID => get!(uuid::Uuid).map(|u| Value::Text(u.to_string())),
        Type::JSON | Type::JSONB => get!(serde_json::Value).map(|j| Value::Text(j.to_string())),
        _ if <String as tokio_postgres::types::FromSql<'_>>::accepts(ty) => {
            get!(String).map(Value::Text)
        }
        _ => {
            return Err(DbError::decode(
                column.name(),
                format!("unsupported column type {ty}"),
            ));
        }
    };
    Ok(value.unwrap_or(Value::Null))
}

fn convert_rows(rows: Vec<tokio_postgres::Row>) -> DbResult<Vec<Row>> {
    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };
    let columns: Arc<[String]> = first
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    rows.iter()
        .map(|row| {
            let values = (0..columns.len())
                .map(|i| decode_column(row, i))
                .collect::<DbResult<Vec<_>>>()?;
            Ok(Row::new(Arc::clone(&columns), values))
        })
        .collect()
}

/// Postgres adapter. Each call checks a connection out of the pool, so
/// consecutive calls may run on different server sessions.
#[derive(Clone)]
pub struct PostgresAdapter {
    pool: Pool,
    statement_cache: bool,
}

impl PostgresAdapter {
    /// Build a pool from `config`. No connection is opened yet.
    pub fn connect(config: &RemoteConfig) -> DbResult<Self> {
        let pool = crate::pool::create_pool(config)?;
        Ok(Self::from_pool(pool).statement_cache(config.statement_cache))
    }

    /// Wrap an existing pool, e.g. one built with a TLS connector.
    pub fn from_pool(pool: Pool) -> Self {
        Self {
            pool,
            statement_cache: true,
        }
    }

    /// Toggle per-connection prepared statement caching.
    pub fn statement_cache(mut self, enabled: bool) -> Self {
        self.statement_cache = enabled;
        self
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }
}

fn params_ref(values: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    values.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

impl Adapter for PostgresAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::Postgres
    }

    fn style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Numbered
    }

    async fn query(&self, stmt: &Statement) -> DbResult<Vec<Row>> {
        log_statement(self.kind(), "query", stmt);
        let client = self.pool.get().await?;
        let params = params_ref(&stmt.values);
        let rows = if self.statement_cache {
            let prepared = client.prepare_cached(&stmt.sql).await?;
            client.query(&prepared, &params).await?
        } else {
            client.query(stmt.sql.as_str(), &params).await?
        };
        convert_rows(rows)
    }

    async fn execute(&self, stmt: &Statement) -> DbResult<u64> {
        log_statement(self.kind(), "execute", stmt);
        let client = self.pool.get().await?;
        let params = params_ref(&stmt.values);
        let affected = if self.statement_cache {
            let prepared = client.prepare_cached(&stmt.sql).await?;
            client.execute(&prepared, &params).await?
        } else {
            client.execute(stmt.sql.as_str(), &params).await?
        };
        Ok(affected)
    }
}
