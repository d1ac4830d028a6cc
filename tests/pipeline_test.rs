//! End-to-end tests: raw JSON records through normalization into SQLite.

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rusqlite::Connection;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use countries_etl::error::{EtlError, SchemaPhase};
use countries_etl::normalize::normalize_countries;
use countries_etl::pipeline::{run_pipeline, FileSource, RecordSource};
use countries_etl::schema::table_names;
use countries_etl::normalize::DropReason;
use countries_etl::summary::{load_summary, open_read_only, regions};
use countries_etl::writer::SchemaBuilder;

// =============================================================================
// Fixtures
// =============================================================================

static FRANCE: Lazy<Value> = Lazy::new(|| {
    json!({
        "ccn3": "250",
        "name": {"common": "France", "official": "French Republic"},
        "population": 67000000,
        "region": "Europe",
        "currencies": {"EUR": {"name": "Euro", "symbol": "€"}},
        "languages": {"fra": "French"},
        "capital": ["Paris"],
        "area": 551695,
        "flags": {"png": "fr.png"}
    })
});

static SAMPLE: Lazy<Vec<Value>> = Lazy::new(|| {
    vec![
        (*FRANCE).clone(),
        json!({
            "ccn3": "124",
            "name": {"common": "Canada", "official": "Canada"},
            "population": 38005238,
            "region": "Americas",
            "currencies": {"CAD": {"name": "Canadian dollar", "symbol": "$"}},
            "languages": {"eng": "English", "fra": "French"},
            "capital": ["Ottawa"],
            "area": 9984670,
            "gini": {"2017": 33.3},
            "flags": {"png": "ca.png"}
        }),
        json!({
            "ccn3": "010",
            "name": {"common": "Antarctica", "official": "Antarctica"},
            "population": 1000,
            "region": "Antarctic",
            "currencies": {},
            "languages": {},
            "capital": [],
            "area": 14000000,
            "flags": {"png": "aq.png"}
        }),
        json!({
            "ccn3": "840",
            "name": {"common": "United States", "official": "United States of America"},
            "population": 329484123,
            "region": "Americas",
            "currencies": {"USD": {"name": "United States dollar", "symbol": "$"}},
            "languages": {"eng": "English"},
            "capital": ["Washington, D.C."],
            "area": 9372610,
            "gini": {"2018": 41.4},
            "flags": {"png": "us.png"}
        }),
        json!({
            "ccn3": "218",
            "name": {"common": "Ecuador", "official": "Republic of Ecuador"},
            "population": 17643060,
            "region": "Americas",
            "currencies": {"USD": {"name": "US Dollar", "symbol": "$"}},
            "languages": {"spa": "Spanish"},
            "capital": ["Quito"],
            "area": 276841,
            "gini": {"2019": 45.7},
            "flags": {"png": "ec.png"}
        }),
        json!({"name": {"common": "Kosovo"}, "region": "Europe"}),
        json!({"ccn3": "250", "name": {"common": "France again"}}),
    ]
});

fn write_records(dir: &TempDir, records: &[Value]) -> PathBuf {
    let path = dir.path().join("countries.json");
    std::fs::write(&path, serde_json::to_string(records).unwrap()).unwrap();
    path
}

fn load(dir: &TempDir, records: &[Value]) -> PathBuf {
    let input = write_records(dir, records);
    let db = dir.path().join("countries.db");
    run_pipeline(&FileSource::new(input), &db).expect("pipeline run failed");
    db
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
        .unwrap()
}

fn object_exists(conn: &Connection, kind: &str, name: &str) -> bool {
    conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = ?1 AND name = ?2",
        [kind, name],
        |row| row.get::<_, i64>(0),
    )
    .unwrap()
        > 0
}

/// Every table's rows plus the schema objects, as comparable text
fn dump(db: &Path) -> Vec<String> {
    let conn = Connection::open(db).unwrap();
    let mut out = Vec::new();

    for table in table_names() {
        let mut stmt = conn
            .prepare(&format!("SELECT * FROM {} ORDER BY 1, 2", table))
            .unwrap();
        let columns = stmt.column_count();
        let rows = stmt
            .query_map([], |row| {
                (0..columns)
                    .map(|i| row.get::<_, rusqlite::types::Value>(i))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })
            .unwrap();
        for row in rows {
            out.push(format!("{}: {:?}", table, row.unwrap()));
        }
    }

    let mut stmt = conn
        .prepare("SELECT type, name, sql FROM sqlite_master ORDER BY type, name")
        .unwrap();
    let objects = stmt
        .query_map([], |row| {
            Ok(format!(
                "{} {} {:?}",
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?
            ))
        })
        .unwrap();
    for object in objects {
        out.push(object.unwrap());
    }
    out
}

struct FailingSource;

impl RecordSource for FailingSource {
    fn fetch(&self) -> countries_etl::Result<Vec<Value>> {
        Err(EtlError::Status {
            status: 503,
            url: "https://example.invalid/all".to_string(),
        })
    }
}

// =============================================================================
// Pipeline
// =============================================================================

#[test]
fn test_single_country_end_to_end() {
    let dir = TempDir::new().unwrap();
    let db = load(&dir, &[(*FRANCE).clone()]);
    let conn = Connection::open(&db).unwrap();

    assert_eq!(count(&conn, "countries"), 1);
    assert_eq!(count(&conn, "currencies"), 1);
    assert_eq!(count(&conn, "languages"), 1);
    assert_eq!(count(&conn, "countries_currencies"), 1);
    assert_eq!(count(&conn, "countries_languages"), 1);

    let link: (i64, String) = conn
        .query_row("SELECT country_code, currency_code FROM countries_currencies", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .unwrap();
    assert_eq!(link, (250, "EUR".to_string()));

    let rows = load_summary(&conn, None).unwrap();
    assert_eq!(rows.len(), 1);
    let fr = &rows[0];
    assert_eq!(fr.country_name.as_deref(), Some("France"));
    assert_eq!(fr.official_country_name.as_deref(), Some("French Republic"));
    assert_eq!(fr.capital, "Paris");
    assert_eq!(fr.currencies, "Euro");
    assert_eq!(fr.languages, "French");
    assert_eq!(fr.flag_url.as_deref(), Some("fr.png"));
    assert_eq!(fr.area, Some(551695.0));
    assert_eq!(fr.population, Some(67_000_000));
    assert_eq!(fr.gini, None);
}

#[test]
fn test_sample_batch() {
    let dir = TempDir::new().unwrap();
    let db = load(&dir, &SAMPLE);
    let conn = Connection::open(&db).unwrap();

    // Kosovo has no ccn3 and the second France is a duplicate
    assert_eq!(count(&conn, "countries"), 5);
    assert_eq!(count(&conn, "currencies"), 3);
    assert_eq!(count(&conn, "countries_currencies"), 4);
    assert_eq!(count(&conn, "languages"), 3);
    assert_eq!(count(&conn, "countries_languages"), 5);

    let usd: String = conn
        .query_row(
            "SELECT currency_name FROM currencies WHERE currency_code = 'USD'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(usd, "United States dollar");

    let france: String = conn
        .query_row("SELECT country_name FROM countries WHERE country_code = 250", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(france, "France");

    let rows = load_summary(&conn, None).unwrap();
    let antarctica = rows
        .iter()
        .find(|r| r.country_name.as_deref() == Some("Antarctica"))
        .unwrap();
    assert_eq!(antarctica.capital, "N/A");
    assert_eq!(antarctica.currencies, "N/A");
    assert_eq!(antarctica.languages, "N/A");

    let canada = rows
        .iter()
        .find(|r| r.country_name.as_deref() == Some("Canada"))
        .unwrap();
    assert_eq!(canada.languages, "English, French");
    assert_eq!(canada.gini, Some(33.3));
}

#[test]
fn test_summary_region_filter() {
    let dir = TempDir::new().unwrap();
    let db = load(&dir, &SAMPLE);
    let conn = Connection::open(&db).unwrap();

    assert_eq!(
        regions(&conn).unwrap(),
        vec!["Americas", "Antarctic", "Europe"]
    );

    let americas: Vec<_> = load_summary(&conn, Some("Americas"))
        .unwrap()
        .into_iter()
        .filter_map(|r| r.country_name)
        .collect();
    assert_eq!(americas, vec!["Canada", "Ecuador", "United States"]);
    assert!(load_summary(&conn, Some("Oceania")).unwrap().is_empty());
}

#[test]
fn test_rerun_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let db = load(&dir, &SAMPLE);
    let first = dump(&db);

    let db_again = load(&dir, &SAMPLE);
    assert_eq!(db, db_again);
    assert_eq!(first, dump(&db));
}

#[test]
fn test_run_summary_reports_skipped_records() {
    let dir = TempDir::new().unwrap();
    let input = write_records(&dir, &SAMPLE);
    let db = dir.path().join("countries.db");
    let summary = run_pipeline(&FileSource::new(input), &db).unwrap();

    assert_eq!(summary.records, 7);
    assert_eq!(summary.dropped(), 2);
    assert_eq!(summary.diagnostics[0].index, 5);
    assert_eq!(summary.diagnostics[0].name.as_deref(), Some("Kosovo"));
    assert_eq!(summary.diagnostics[0].reason, DropReason::MissingCode);
    assert_eq!(summary.diagnostics[1].index, 6);
    assert_eq!(summary.diagnostics[1].reason, DropReason::DuplicateCode(250));
    assert_eq!(summary.stats.countries, 5);

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["records"], 7);
    assert_eq!(json["stats"]["countries_currencies"], 4);
    assert_eq!(json["diagnostics"][1]["reason"]["DuplicateCode"], 250);
    assert_eq!(json["diagnostics"][0]["name"], "Kosovo");
    assert!(json["elapsed_secs"].is_f64());
}

#[test]
fn test_failed_fetch_keeps_previous_load() {
    let dir = TempDir::new().unwrap();
    let db = load(&dir, &SAMPLE);
    let before = dump(&db);

    let err = run_pipeline(&FailingSource, &db).unwrap_err();
    assert!(matches!(err, EtlError::Status { status: 503, .. }));
    assert_eq!(before, dump(&db));
}

#[test]
fn test_missing_input_file_fails() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("countries.db");
    let result = run_pipeline(&FileSource::new(dir.path().join("absent.json")), &db);

    assert!(matches!(result, Err(EtlError::Io(_))));
    assert!(!db.exists());
}

// =============================================================================
// Persisted schema
// =============================================================================

#[test]
fn test_schema_objects_exist() {
    let dir = TempDir::new().unwrap();
    let db = load(&dir, &SAMPLE);
    let conn = Connection::open(&db).unwrap();

    for table in table_names() {
        assert!(object_exists(&conn, "table", table), "missing table {}", table);
    }
    assert!(object_exists(&conn, "view", "countries_summary"));
    assert!(object_exists(&conn, "index", "idx_countries_region"));
    assert!(object_exists(&conn, "index", "idx_countries_population"));
    assert!(!object_exists(&conn, "table", "countries__constrained"));

    let fk_parents: HashSet<String> = conn
        .prepare("SELECT \"table\" FROM pragma_foreign_key_list('countries_languages')")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<rusqlite::Result<_>>()
        .unwrap();
    assert_eq!(
        fk_parents,
        HashSet::from(["countries".to_string(), "languages".to_string()])
    );
}

#[test]
fn test_keys_and_checks_enforced() {
    let dir = TempDir::new().unwrap();
    let db = load(&dir, &SAMPLE);
    let conn = Connection::open(&db).unwrap();
    conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();

    let duplicate = conn.execute(
        "INSERT INTO countries (country_code, country_name) VALUES (250, 'Duplicate')",
        [],
    );
    assert!(duplicate.is_err());

    let dangling = conn.execute(
        "INSERT INTO countries_currencies (country_code, currency_code) VALUES (999, 'EUR')",
        [],
    );
    assert!(dangling.is_err());

    for sql in [
        "INSERT INTO countries (country_code, area) VALUES (1, 0)",
        "INSERT INTO countries (country_code, population) VALUES (2, -1)",
        "INSERT INTO countries (country_code, gini) VALUES (3, 100.5)",
    ] {
        assert!(conn.execute(sql, []).is_err(), "accepted: {}", sql);
    }

    conn.execute(
        "INSERT INTO countries (country_code, area, population, gini) VALUES (4, NULL, 0, 100)",
        [],
    )
    .unwrap();
}

#[test]
fn test_delete_cascades_to_junctions() {
    let dir = TempDir::new().unwrap();
    let db = load(&dir, &SAMPLE);
    let conn = Connection::open(&db).unwrap();
    conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();

    conn.execute("DELETE FROM countries WHERE country_code = 124", [])
        .unwrap();
    let canada_links: i64 = conn
        .query_row(
            "SELECT (SELECT COUNT(*) FROM countries_languages WHERE country_code = 124)
                  + (SELECT COUNT(*) FROM countries_currencies WHERE country_code = 124)",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(canada_links, 0);

    conn.execute("DELETE FROM currencies WHERE currency_code = 'USD'", [])
        .unwrap();
    assert_eq!(count(&conn, "countries_currencies"), 1);
}

#[test]
fn test_failed_drop_rolls_back_whole_phase() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("countries.db");
    {
        let conn = Connection::open(&db).unwrap();
        conn.execute_batch(
            "CREATE TABLE countries_currencies (country_code, currency_code);
             CREATE TABLE countries_languages (country_code, language_code);
             CREATE VIEW countries AS SELECT 250 AS country_code;",
        )
        .unwrap();
    }

    // Junctions drop first; `DROP TABLE countries` then fails on the view
    let mut builder = SchemaBuilder::open(&db).unwrap();
    match builder.drop_schema().unwrap_err() {
        EtlError::Schema { phase, table, .. } => {
            assert_eq!(phase, SchemaPhase::Drop);
            assert_eq!(table, "countries");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let conn = builder.into_connection();
    assert!(object_exists(&conn, "table", "countries_currencies"));
    assert!(object_exists(&conn, "table", "countries_languages"));
    assert!(object_exists(&conn, "view", "countries"));
}

#[test]
fn test_summary_requires_existing_database() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("typo.db");

    assert!(open_read_only(&missing).is_err());
    assert!(!missing.exists());

    let db = load(&dir, &SAMPLE);
    let conn = open_read_only(&db).unwrap();
    assert_eq!(load_summary(&conn, None).unwrap().len(), 5);
    assert!(conn
        .execute("DELETE FROM countries WHERE country_code = 250", [])
        .is_err());
}

#[test]
fn test_constraint_violation_rolls_back_constrain_phase() {
    let dir = TempDir::new().unwrap();
    let mut bad = (*FRANCE).clone();
    bad["population"] = json!(-5);
    let relations = normalize_countries(&[bad]).relations;

    let db = dir.path().join("countries.db");
    let mut builder = SchemaBuilder::open(&db).unwrap();
    let err = builder.apply_schema(&relations).unwrap_err();

    match err {
        EtlError::Schema { phase, table, .. } => {
            assert_eq!(phase, SchemaPhase::Constrain);
            assert_eq!(table, "countries");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let conn = builder.into_connection();
    assert!(!object_exists(&conn, "view", "countries_summary"));
    assert!(!object_exists(&conn, "index", "idx_countries_region"));
    assert!(!object_exists(&conn, "table", "countries__constrained"));
    let fks: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM pragma_foreign_key_list('countries_currencies')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(fks, 0);
}

// =============================================================================
// Normalization properties
// =============================================================================

#[test]
fn test_order_insensitive_without_conflicts() {
    // Drop the conflicting records so first-seen order cannot matter
    let records: Vec<Value> = SAMPLE
        .iter()
        .filter(|r| r["ccn3"] != "218" && r["name"]["common"] != "France again")
        .cloned()
        .collect();
    let baseline = normalize_countries(&records).relations;

    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    for _ in 0..5 {
        let mut shuffled = records.clone();
        shuffled.shuffle(&mut rng);
        let relations = normalize_countries(&shuffled).relations;

        let codes = |r: &countries_etl::Relations| -> HashSet<u32> {
            r.countries.iter().map(|c| c.country_code).collect()
        };
        assert_eq!(codes(&baseline), codes(&relations));

        let links: HashSet<_> = relations.countries_languages.iter().cloned().collect();
        let expected: HashSet<_> = baseline.countries_languages.iter().cloned().collect();
        assert_eq!(links, expected);

        let currencies: HashSet<_> = relations
            .currencies
            .iter()
            .map(|c| (c.currency_code.clone(), c.currency_name.clone()))
            .collect();
        let expected: HashSet<_> = baseline
            .currencies
            .iter()
            .map(|c| (c.currency_code.clone(), c.currency_name.clone()))
            .collect();
        assert_eq!(currencies, expected);
    }
}

#[test]
fn test_country_codes_unique() {
    let mut records = SAMPLE.to_vec();
    records.extend(SAMPLE.iter().cloned());
    let normalized = normalize_countries(&records);

    let codes: Vec<u32> = normalized
        .relations
        .countries
        .iter()
        .map(|c| c.country_code)
        .collect();
    let unique: HashSet<u32> = codes.iter().copied().collect();
    assert_eq!(codes.len(), unique.len());
    assert_eq!(codes.len(), 5);
}
