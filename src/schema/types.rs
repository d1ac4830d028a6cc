use std::collections::HashSet;

/// Role of a table in the star schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Fact,
    Dimension,
    /// Many-to-many link; staged with untyped columns
    Junction,
}

/// Declared column type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    BigInt,
    Text,
    Varchar(u16),
    /// Fixed precision decimal (precision, scale)
    Numeric(u8, u8),
}

impl ColumnType {
    pub fn sql(&self) -> String {
        match self {
            ColumnType::Integer => "INTEGER".to_string(),
            ColumnType::BigInt => "BIGINT".to_string(),
            ColumnType::Text => "TEXT".to_string(),
            ColumnType::Varchar(len) => format!("VARCHAR({})", len),
            ColumnType::Numeric(precision, scale) => format!("NUMERIC({}, {})", precision, scale),
        }
    }
}

/// Column definition
#[derive(Debug, Clone)]
pub struct Column {
    pub name: &'static str,
    pub col_type: ColumnType,
    pub nullable: bool,
}

impl Column {
    /// Create an optional (nullable) column
    pub const fn new(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: true,
        }
    }

    /// Create a required (non-nullable) column
    pub const fn required(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: false,
        }
    }
}

/// Foreign key reference
#[derive(Debug, Clone)]
pub struct ForeignKey {
    pub name: &'static str,
    pub column: &'static str,
    pub references_table: &'static str,
    pub references_column: &'static str,
    pub on_delete_cascade: bool,
}

impl ForeignKey {
    /// A cascading reference to a column of the same name in the parent
    pub const fn cascade(name: &'static str, column: &'static str, references_table: &'static str) -> Self {
        Self {
            name,
            column,
            references_table,
            references_column: column,
            on_delete_cascade: true,
        }
    }
}

/// Named CHECK constraint
#[derive(Debug, Clone)]
pub struct Check {
    pub name: &'static str,
    pub expr: &'static str,
}

impl Check {
    pub const fn new(name: &'static str, expr: &'static str) -> Self {
        Self { name, expr }
    }
}

/// Secondary index definition
#[derive(Debug, Clone)]
pub struct Index {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

impl Index {
    pub const fn on(name: &'static str, columns: &'static [&'static str]) -> Self {
        Self { name, columns }
    }
}

/// Table schema definition
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: &'static str,
    pub kind: TableKind,
    pub columns: &'static [Column],
    pub primary_key: &'static [&'static str],
    pub foreign_keys: &'static [ForeignKey],
    pub checks: &'static [Check],
    pub indexes: &'static [Index],
}

impl TableSchema {
    /// Get all tables this table depends on (FK parents)
    pub fn dependencies(&self) -> HashSet<&'static str> {
        self.foreign_keys
            .iter()
            .map(|fk| fk.references_table)
            .collect()
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }
}
