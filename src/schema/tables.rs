//! Table definitions for the countries star schema

use super::types::*;

// =============================================================================
// Fact table
// =============================================================================

pub static COUNTRIES: TableSchema = TableSchema {
    name: "countries",
    kind: TableKind::Fact,
    columns: &[
        Column::required("country_code", ColumnType::Integer),
        Column::new("country_name", ColumnType::Varchar(100)),
        Column::new("official_country_name", ColumnType::Text),
        Column::new("capital", ColumnType::Varchar(100)),
        Column::new("region", ColumnType::Varchar(50)),
        Column::new("flag_url", ColumnType::Text),
        Column::new("area", ColumnType::Numeric(12, 2)),
        Column::new("population", ColumnType::BigInt),
        Column::new("gini", ColumnType::Numeric(4, 2)),
    ],
    primary_key: &["country_code"],
    foreign_keys: &[],
    checks: &[
        Check::new("chk_area_positive", "area IS NULL OR area > 0"),
        Check::new("chk_population_positive", "population IS NULL OR population >= 0"),
        Check::new("chk_gini_range", "gini IS NULL OR gini BETWEEN 0 AND 100"),
    ],
    indexes: &[
        Index::on("idx_countries_region", &["region"]),
        Index::on("idx_countries_population", &["population"]),
    ],
};

// =============================================================================
// Dimension tables
// =============================================================================

pub static CURRENCIES: TableSchema = TableSchema {
    name: "currencies",
    kind: TableKind::Dimension,
    columns: &[
        Column::required("currency_code", ColumnType::Varchar(3)),
        Column::new("currency_name", ColumnType::Varchar(50)),
        Column::new("currency_symbol", ColumnType::Varchar(15)),
    ],
    primary_key: &["currency_code"],
    foreign_keys: &[],
    checks: &[],
    indexes: &[],
};

pub static LANGUAGES: TableSchema = TableSchema {
    name: "languages",
    kind: TableKind::Dimension,
    columns: &[
        Column::required("language_code", ColumnType::Varchar(3)),
        Column::new("language_name", ColumnType::Varchar(50)),
    ],
    primary_key: &["language_code"],
    foreign_keys: &[],
    checks: &[],
    indexes: &[],
};

// =============================================================================
// Junction tables
// =============================================================================

pub static COUNTRIES_CURRENCIES: TableSchema = TableSchema {
    name: "countries_currencies",
    kind: TableKind::Junction,
    columns: &[
        Column::required("country_code", ColumnType::Integer),
        Column::required("currency_code", ColumnType::Varchar(3)),
    ],
    primary_key: &["country_code", "currency_code"],
    foreign_keys: &[
        ForeignKey::cascade("fk_countries", "country_code", "countries"),
        ForeignKey::cascade("fk_currencies", "currency_code", "currencies"),
    ],
    checks: &[],
    indexes: &[],
};

pub static COUNTRIES_LANGUAGES: TableSchema = TableSchema {
    name: "countries_languages",
    kind: TableKind::Junction,
    columns: &[
        Column::required("country_code", ColumnType::Integer),
        Column::required("language_code", ColumnType::Varchar(3)),
    ],
    primary_key: &["country_code", "language_code"],
    foreign_keys: &[
        ForeignKey::cascade("fk_countries", "country_code", "countries"),
        ForeignKey::cascade("fk_languages", "language_code", "languages"),
    ],
    checks: &[],
    indexes: &[],
};

/// All table schemas in dependency order
pub static ALL_TABLES: &[&TableSchema] = &[
    &COUNTRIES,
    &CURRENCIES,
    &LANGUAGES,
    &COUNTRIES_CURRENCIES,
    &COUNTRIES_LANGUAGES,
];

/// Get table schema by name
pub fn get_table(name: &str) -> Option<&'static TableSchema> {
    ALL_TABLES.iter().find(|t| t.name == name).copied()
}

/// Get all table names
pub fn table_names() -> Vec<&'static str> {
    ALL_TABLES.iter().map(|t| t.name).collect()
}
