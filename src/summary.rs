//! Read access to the `countries_summary` view

use rusqlite::{Connection, OpenFlags, Row};
use serde::Serialize;
use std::path::Path;

use crate::error::Result;
use crate::schema::SUMMARY_VIEW;

/// One row of the summary view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    #[serde(rename = "Country Name")]
    pub country_name: Option<String>,
    #[serde(rename = "Official Country Name")]
    pub official_country_name: Option<String>,
    #[serde(rename = "Capital")]
    pub capital: String,
    #[serde(rename = "Region")]
    pub region: Option<String>,
    #[serde(rename = "Area")]
    pub area: Option<f64>,
    #[serde(rename = "Population")]
    pub population: Option<i64>,
    #[serde(rename = "GINI")]
    pub gini: Option<f64>,
    pub flag_url: Option<String>,
    #[serde(rename = "Currencies")]
    pub currencies: String,
    #[serde(rename = "Languages")]
    pub languages: String,
}

impl SummaryRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            country_name: row.get("Country Name")?,
            official_country_name: row.get("Official Country Name")?,
            capital: row.get("Capital")?,
            region: row.get("Region")?,
            area: row.get("Area")?,
            population: row.get("Population")?,
            gini: row.get("GINI")?,
            flag_url: row.get("flag_url")?,
            currencies: row.get("Currencies")?,
            languages: row.get("Languages")?,
        })
    }
}

/// Open an existing database for reading; a missing file is an error
pub fn open_read_only(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    Ok(conn)
}

/// Summary rows ordered by country name, optionally limited to one region
pub fn load_summary(conn: &Connection, region: Option<&str>) -> Result<Vec<SummaryRow>> {
    let rows = match region {
        Some(region) => {
            let sql = format!(
                "SELECT * FROM {} WHERE \"Region\" = ?1 ORDER BY \"Country Name\"",
                SUMMARY_VIEW
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([region], SummaryRow::from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        }
        None => {
            let sql = format!("SELECT * FROM {} ORDER BY \"Country Name\"", SUMMARY_VIEW);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], SummaryRow::from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        }
    };
    Ok(rows)
}

/// Distinct non-null regions, sorted
pub fn regions(conn: &Connection) -> Result<Vec<String>> {
    let sql = format!(
        "SELECT DISTINCT \"Region\" FROM {} WHERE \"Region\" IS NOT NULL ORDER BY \"Region\"",
        SUMMARY_VIEW
    );
    let mut stmt = conn.prepare(&sql)?;
    let regions = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(regions)
}
