use crate::normalize::{Country, CountryCurrency, CountryLanguage, Currency, Language};
use crate::schema::{TableSchema, COUNTRIES, COUNTRIES_CURRENCIES, COUNTRIES_LANGUAGES, CURRENCIES, LANGUAGES};

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    pub fn bind_to(&self, idx: usize, stmt: &mut rusqlite::Statement) -> rusqlite::Result<()> {
        match self {
            SqlValue::Null => stmt.raw_bind_parameter(idx, rusqlite::types::Null)?,
            SqlValue::Integer(i) => stmt.raw_bind_parameter(idx, i)?,
            SqlValue::Real(f) => stmt.raw_bind_parameter(idx, f)?,
            SqlValue::Text(s) => stmt.raw_bind_parameter(idx, s.as_str())?,
        }
        Ok(())
    }
}

impl From<&Option<String>> for SqlValue {
    fn from(value: &Option<String>) -> Self {
        value.as_ref().map_or(SqlValue::Null, |s| SqlValue::Text(s.clone()))
    }
}

impl From<Option<f64>> for SqlValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(SqlValue::Null, SqlValue::Real)
    }
}

impl From<Option<i64>> for SqlValue {
    fn from(value: Option<i64>) -> Self {
        value.map_or(SqlValue::Null, SqlValue::Integer)
    }
}

/// A relation row that knows its table and column order
pub trait TableRow {
    fn schema() -> &'static TableSchema;

    /// Values in the column order of `schema()`
    fn values(&self) -> Vec<SqlValue>;
}

impl TableRow for Country {
    fn schema() -> &'static TableSchema {
        &COUNTRIES
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Integer(i64::from(self.country_code)),
            (&self.country_name).into(),
            (&self.official_country_name).into(),
            (&self.capital).into(),
            (&self.region).into(),
            (&self.flag_url).into(),
            self.area.into(),
            self.population.into(),
            self.gini.into(),
        ]
    }
}

impl TableRow for Currency {
    fn schema() -> &'static TableSchema {
        &CURRENCIES
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Text(self.currency_code.clone()),
            (&self.currency_name).into(),
            (&self.currency_symbol).into(),
        ]
    }
}

impl TableRow for Language {
    fn schema() -> &'static TableSchema {
        &LANGUAGES
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Text(self.language_code.clone()),
            SqlValue::Text(self.language_name.clone()),
        ]
    }
}

impl TableRow for CountryCurrency {
    fn schema() -> &'static TableSchema {
        &COUNTRIES_CURRENCIES
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Integer(i64::from(self.country_code)),
            SqlValue::Text(self.currency_code.clone()),
        ]
    }
}

impl TableRow for CountryLanguage {
    fn schema() -> &'static TableSchema {
        &COUNTRIES_LANGUAGES
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Integer(i64::from(self.country_code)),
            SqlValue::Text(self.language_code.clone()),
        ]
    }
}
