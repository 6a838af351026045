//! PostgreSQL landing store

use crate::db::connection::DatabaseConnector;
use crate::db::statement::InsertStatement;
use crate::db::store::{ColumnInfo, LandingStore};
use crate::db::table::TableName;
use crate::db::value::SqlValue;
use crate::error::Result;
use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgConnection};
use sqlx::query::Query;
use sqlx::Postgres;
use tracing::{debug, info, warn};

const COLUMNS_BY_SCHEMA_AND_TABLE: &str = r#"
    SELECT column_name::text, udt_name::text
    FROM information_schema.columns
    WHERE table_schema = $1 AND table_name = $2
    ORDER BY ordinal_position
"#;

const COLUMNS_BY_TABLE: &str = r#"
    SELECT column_name::text, udt_name::text
    FROM information_schema.columns
    WHERE table_name = $1
    ORDER BY ordinal_position
"#;

pub struct PostgresStore {
    connector: DatabaseConnector,
}

impl PostgresStore {
    pub fn new(connector: DatabaseConnector) -> Self {
        Self { connector }
    }

    pub fn connector(&self) -> &DatabaseConnector {
        &self.connector
    }

    fn bind_values<'q>(sql: &'q str, values: &'q [SqlValue]) -> Query<'q, Postgres, PgArguments> {
        values
            .iter()
            .fold(sqlx::query(sql), |query, value| query.bind(value.to_sql_text()))
    }

    async fn truncate_with(conn: &mut PgConnection, table: &TableName) -> Result<()> {
        let sql = format!("TRUNCATE TABLE {}", table.quoted());
        sqlx::query(&sql).execute(&mut *conn).await?;
        info!("Successfully truncated table {}", table);
        Ok(())
    }

    async fn insert_each(
        conn: &mut PgConnection,
        statement: &InsertStatement,
        rows: &[Vec<SqlValue>],
    ) -> Result<u64> {
        let sql = statement.render(1);
        debug!("Executing per-row insert: {}", sql);

        let mut inserted = 0;
        for row in rows {
            Self::bind_values(&sql, row).execute(&mut *conn).await?;
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn append_chunked(
        conn: &mut PgConnection,
        statement: &InsertStatement,
        rows: &[Vec<SqlValue>],
    ) -> Result<u64> {
        let mut appended = 0;
        for chunk in rows.chunks(statement.max_rows_per_statement()) {
            let sql = statement.render(chunk.len());
            let values: Vec<SqlValue> = chunk.iter().flatten().cloned().collect();
            let result = Self::bind_values(&sql, &values).execute(&mut *conn).await?;
            appended += result.rows_affected();
        }
        Ok(appended)
    }
}

#[async_trait]
impl LandingStore for PostgresStore {
    async fn table_columns(&self, table: &TableName) -> Result<Vec<ColumnInfo>> {
        let pool = self.connector.pool().await?;

        let rows: Vec<(String, Option<String>)> = match table.schema() {
            Some(schema) => {
                info!("Querying columns for schema: {}, table: {}", schema, table.name());
                sqlx::query_as(COLUMNS_BY_SCHEMA_AND_TABLE)
                    .bind(schema)
                    .bind(table.name())
                    .fetch_all(&pool)
                    .await?
            }
            None => {
                info!("Querying columns for table: {}", table.name());
                sqlx::query_as(COLUMNS_BY_TABLE)
                    .bind(table.name())
                    .fetch_all(&pool)
                    .await?
            }
        };

        Ok(rows
            .into_iter()
            .map(|(name, udt_name)| ColumnInfo { name, udt_name })
            .collect())
    }

    async fn insert_rows(
        &self,
        statement: &InsertStatement,
        rows: &[Vec<SqlValue>],
        truncate_first: bool,
    ) -> Result<u64> {
        let pool = self.connector.pool().await?;
        let mut tx = pool.begin().await?;

        let outcome = async {
            if truncate_first {
                Self::truncate_with(&mut tx, statement.table()).await?;
            }
            Self::insert_each(&mut tx, statement, rows).await
        }
        .await;

        match outcome {
            Ok(inserted) => {
                tx.commit().await?;
                Ok(inserted)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!("Rollback failed for {}: {}", statement.table(), rollback_err);
                }
                Err(e)
            }
        }
    }

    async fn truncate(&self, table: &TableName) -> Result<()> {
        let pool = self.connector.pool().await?;
        let mut conn = pool.acquire().await?;
        Self::truncate_with(&mut conn, table).await
    }

    async fn append_rows(&self, statement: &InsertStatement, rows: &[Vec<SqlValue>]) -> Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let pool = self.connector.pool().await?;
        let mut tx = pool.begin().await?;
        match Self::append_chunked(&mut tx, statement, rows).await {
            Ok(appended) => {
                tx.commit().await?;
                Ok(appended)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!("Rollback failed for {}: {}", statement.table(), rollback_err);
                }
                Err(e)
            }
        }
    }

    async fn replace_rows(&self, statement: &InsertStatement, rows: &[Vec<SqlValue>]) -> Result<u64> {
        let pool = self.connector.pool().await?;
        let mut tx = pool.begin().await?;

        let outcome = async {
            Self::truncate_with(&mut tx, statement.table()).await?;
            Self::append_chunked(&mut tx, statement, rows).await
        }
        .await;

        match outcome {
            Ok(appended) => {
                tx.commit().await?;
                Ok(appended)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!("Rollback failed for {}: {}", statement.table(), rollback_err);
                }
                Err(e)
            }
        }
    }

    async fn close(&self) {
        self.connector.close().await;
    }
}
