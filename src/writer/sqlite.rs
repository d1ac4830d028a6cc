use rusqlite::{Connection, Transaction};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

use super::rows::TableRow;
use super::schema_gen::{
    generate_create_staging, generate_drop_table, generate_drop_view, generate_indexes,
    generate_insert, generate_rebuild,
};
use crate::error::{EtlError, Result, SchemaPhase};
use crate::normalize::Relations;
use crate::schema::{summary_view_sql, DependencyResolver, TableSchema, SUMMARY_VIEW};

/// Rows written per table by one schema application
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    pub countries: u64,
    pub currencies: u64,
    pub languages: u64,
    pub countries_currencies: u64,
    pub countries_languages: u64,
}

impl LoadStats {
    pub fn total(&self) -> u64 {
        self.countries
            + self.currencies
            + self.languages
            + self.countries_currencies
            + self.countries_languages
    }
}

/// Replaces the star schema in a SQLite database.
///
/// Application runs in three steps: a drop transaction, one load
/// transaction per table, and a constrain transaction that adds keys,
/// references, checks, indexes and the summary view. A failing statement
/// rolls back its whole transaction.
pub struct SchemaBuilder {
    conn: Connection,
    resolver: DependencyResolver,
}

impl SchemaBuilder {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::with_connection(conn)
    }

    pub fn with_connection(conn: Connection) -> Result<Self> {
        // Cascades and reference checks are per-connection in SQLite
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        Ok(Self {
            conn,
            resolver: DependencyResolver::new(),
        })
    }

    pub fn into_connection(self) -> Connection {
        self.conn
    }

    /// Drop, load and constrain the schema for `relations`
    pub fn apply_schema(&mut self, relations: &Relations) -> Result<LoadStats> {
        self.drop_schema()?;

        let stats = LoadStats {
            countries: self.load_table(&relations.countries)?,
            currencies: self.load_table(&relations.currencies)?,
            languages: self.load_table(&relations.languages)?,
            countries_currencies: self.load_table(&relations.countries_currencies)?,
            countries_languages: self.load_table(&relations.countries_languages)?,
        };

        self.constrain_schema()?;
        info!(rows = stats.total(), "Schema applied");
        Ok(stats)
    }

    /// Drop every table and the summary view in one transaction
    pub fn drop_schema(&mut self) -> Result<()> {
        let tables = self.ordered(SchemaPhase::Drop, DependencyResolver::drop_order)?;
        let tx = self.conn.transaction()?;

        for schema in tables {
            debug!(table = schema.name, "Dropping table");
            execute(&tx, &generate_drop_table(schema.name), SchemaPhase::Drop, schema.name)?;
        }
        execute(&tx, &generate_drop_view(), SchemaPhase::Drop, SUMMARY_VIEW)?;

        tx.commit()?;
        Ok(())
    }

    /// Replace a staging table with `rows`
    pub fn load_table<R: TableRow>(&mut self, rows: &[R]) -> Result<u64> {
        let schema = R::schema();
        let tx = self.conn.transaction()?;

        execute(&tx, &generate_drop_table(schema.name), SchemaPhase::Load, schema.name)?;
        execute(&tx, &generate_create_staging(schema), SchemaPhase::Load, schema.name)?;

        let mut count: u64 = 0;
        {
            let mut stmt = tx
                .prepare_cached(&generate_insert(schema))
                .map_err(|e| EtlError::schema(SchemaPhase::Load, schema.name, e))?;

            for row in rows {
                for (idx, value) in row.values().iter().enumerate() {
                    value.bind_to(idx + 1, &mut stmt)?;
                }
                stmt.raw_execute()
                    .map_err(|e| EtlError::schema(SchemaPhase::Load, schema.name, e))?;
                count += 1;
            }
        }

        tx.commit()?;
        debug!(table = schema.name, rows = count, "Loaded table");
        Ok(count)
    }

    /// Add keys, references, checks, indexes and the summary view in one transaction
    pub fn constrain_schema(&mut self) -> Result<()> {
        let tables = self.ordered(SchemaPhase::Constrain, DependencyResolver::creation_order)?;
        let tx = self.conn.transaction()?;

        for schema in &tables {
            for sql in generate_rebuild(schema) {
                execute(&tx, &sql, SchemaPhase::Constrain, schema.name)?;
            }
        }

        for schema in &tables {
            for sql in generate_indexes(schema) {
                execute(&tx, &sql, SchemaPhase::Constrain, schema.name)?;
            }
        }

        execute(&tx, &generate_drop_view(), SchemaPhase::Constrain, SUMMARY_VIEW)?;
        execute(&tx, &summary_view_sql(), SchemaPhase::Constrain, SUMMARY_VIEW)?;

        tx.commit()?;
        Ok(())
    }

    /// Refresh planner statistics after a load
    pub fn finalize(self) -> Result<()> {
        self.conn.execute_batch("PRAGMA optimize;")?;
        Ok(())
    }

    fn ordered(&self, phase: SchemaPhase, order: TableOrder) -> Result<Vec<&'static TableSchema>> {
        order_tables(&self.resolver, phase, order)
    }
}

type TableOrder = fn(&DependencyResolver) -> std::result::Result<Vec<&'static TableSchema>, String>;

fn order_tables(
    resolver: &DependencyResolver,
    phase: SchemaPhase,
    order: TableOrder,
) -> Result<Vec<&'static TableSchema>> {
    order(resolver).map_err(|msg| {
        EtlError::SchemaDefinition(format!("cannot order tables for {} phase: {}", phase, msg))
    })
}

fn execute(tx: &Transaction, sql: &str, phase: SchemaPhase, table: &str) -> Result<()> {
    tx.execute_batch(sql)
        .map_err(|e| EtlError::schema(phase, table, e))
}
