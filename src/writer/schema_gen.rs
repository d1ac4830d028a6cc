use crate::schema::{ColumnType, TableKind, TableSchema, SUMMARY_VIEW};

/// Suffix of the table a staging table is rebuilt into
const REBUILD_SUFFIX: &str = "__constrained";

pub fn generate_drop_table(name: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", name)
}

pub fn generate_drop_view() -> String {
    format!("DROP VIEW IF EXISTS {}", SUMMARY_VIEW)
}

/// CREATE TABLE for the unconstrained staging table that rows are loaded into.
/// Fact and dimension columns carry their declared types; junction columns are
/// left untyped since they only hold foreign key values.
pub fn generate_create_staging(schema: &TableSchema) -> String {
    let columns: Vec<String> = schema
        .columns
        .iter()
        .map(|col| match schema.kind {
            TableKind::Junction => format!("    {}", col.name),
            TableKind::Fact | TableKind::Dimension => {
                format!("    {} {}", col.name, col.col_type.sql())
            }
        })
        .collect();

    format!("CREATE TABLE {} (\n{}\n)", schema.name, columns.join(",\n"))
}

/// CREATE TABLE for the final table with keys, references and checks
pub fn generate_create_constrained(schema: &TableSchema, table_name: &str) -> String {
    let mut lines = Vec::new();

    for col in schema.columns {
        let null_constraint = if !col.nullable { " NOT NULL" } else { "" };
        lines.push(format!(
            "    {} {}{}",
            col.name,
            col.col_type.sql(),
            null_constraint
        ));
    }

    if !schema.primary_key.is_empty() {
        lines.push(format!("    PRIMARY KEY ({})", schema.primary_key.join(", ")));
    }

    for fk in schema.foreign_keys {
        let on_delete = if fk.on_delete_cascade {
            " ON DELETE CASCADE"
        } else {
            ""
        };
        lines.push(format!(
            "    CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {}({}){}",
            fk.name, fk.column, fk.references_table, fk.references_column, on_delete
        ));
    }

    for check in schema.checks {
        lines.push(format!("    CONSTRAINT {} CHECK ({})", check.name, check.expr));
    }

    format!("CREATE TABLE {} (\n{}\n)", table_name, lines.join(",\n"))
}

/// Statements that swap a loaded staging table for its constrained form.
/// SQLite cannot add keys or constraints to an existing table, so the rows
/// are copied into a freshly declared table that then takes over the name.
pub fn generate_rebuild(schema: &TableSchema) -> Vec<String> {
    let rebuilt = format!("{}{}", schema.name, REBUILD_SUFFIX);
    let columns = schema.column_names().join(", ");
    let copied: Vec<String> = schema
        .columns
        .iter()
        .map(|col| match col.col_type {
            ColumnType::Numeric(_, scale) => format!("round({}, {})", col.name, scale),
            _ => col.name.to_string(),
        })
        .collect();

    vec![
        generate_drop_table(&rebuilt),
        generate_create_constrained(schema, &rebuilt),
        format!(
            "INSERT INTO {} ({}) SELECT {} FROM {}",
            rebuilt,
            columns,
            copied.join(", "),
            schema.name
        ),
        generate_drop_table(schema.name),
        format!("ALTER TABLE {} RENAME TO {}", rebuilt, schema.name),
    ]
}

/// Generate CREATE INDEX statements for a table's secondary indexes
pub fn generate_indexes(schema: &TableSchema) -> Vec<String> {
    schema
        .indexes
        .iter()
        .map(|index| {
            format!(
                "CREATE INDEX IF NOT EXISTS {} ON {}({})",
                index.name,
                schema.name,
                index.columns.join(", ")
            )
        })
        .collect()
}

pub fn generate_insert(schema: &TableSchema) -> String {
    let placeholders: Vec<&str> = schema.columns.iter().map(|_| "?").collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        schema.name,
        schema.column_names().join(", "),
        placeholders.join(", ")
    )
}
