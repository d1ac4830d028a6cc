use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::model::*;
use super::value::{path, path_array, path_f64, path_i64, path_object, path_str};

/// Keeps the first row registered under each code
struct DimensionAccumulator<T> {
    seen: HashSet<String>,
    rows: Vec<T>,
}

impl<T> DimensionAccumulator<T> {
    fn new() -> Self {
        Self {
            seen: HashSet::new(),
            rows: Vec::new(),
        }
    }

    fn register(&mut self, code: &str, row: impl FnOnce() -> T) {
        if self.seen.insert(code.to_string()) {
            self.rows.push(row());
        }
    }

    fn into_rows(self) -> Vec<T> {
        self.rows
    }
}

/// Everything one raw record contributes, held back until the record is accepted
struct StagedRecord {
    country: Country,
    currencies: Vec<Currency>,
    languages: Vec<Language>,
}

/// Per-run accumulator state
struct Normalizer {
    accepted_codes: HashSet<CountryCode>,
    countries: Vec<Country>,
    currencies: DimensionAccumulator<Currency>,
    languages: DimensionAccumulator<Language>,
    countries_currencies: Vec<CountryCurrency>,
    countries_languages: Vec<CountryLanguage>,
    diagnostics: Vec<Diagnostic>,
}

impl Normalizer {
    fn new() -> Self {
        Self {
            accepted_codes: HashSet::new(),
            countries: Vec::new(),
            currencies: DimensionAccumulator::new(),
            languages: DimensionAccumulator::new(),
            countries_currencies: Vec::new(),
            countries_languages: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn process(&mut self, index: usize, record: &Value) {
        match self.stage(record) {
            Ok(staged) => self.commit(staged),
            Err(reason) => {
                let name = path_str(record, "name.common");
                warn!(index, name = ?name, %reason, "Skipping country record");
                self.diagnostics.push(Diagnostic {
                    index,
                    name,
                    reason,
                });
            }
        }
    }

    fn stage(&self, record: &Value) -> Result<StagedRecord, DropReason> {
        if !record.is_object() {
            return Err(DropReason::NotAnObject);
        }

        let country_code = parse_country_code(path(record, "ccn3"))?;
        if self.accepted_codes.contains(&country_code) {
            return Err(DropReason::DuplicateCode(country_code));
        }

        let country = Country {
            country_code,
            country_name: path_str(record, "name.common"),
            official_country_name: path_str(record, "name.official"),
            capital: first_capital(record),
            region: path_str(record, "region"),
            flag_url: path_str(record, "flags.png"),
            area: path_f64(record, "area"),
            population: path_i64(record, "population"),
            gini: latest_gini(record),
        };

        Ok(StagedRecord {
            country,
            currencies: extract_currencies(record, country_code),
            languages: extract_languages(record, country_code),
        })
    }

    fn commit(&mut self, staged: StagedRecord) {
        let code = staged.country.country_code;
        self.accepted_codes.insert(code);
        self.countries.push(staged.country);

        for currency in staged.currencies {
            self.countries_currencies.push(CountryCurrency {
                country_code: code,
                currency_code: currency.currency_code.clone(),
            });
            let key = currency.currency_code.clone();
            self.currencies.register(&key, || currency);
        }

        for language in staged.languages {
            self.countries_languages.push(CountryLanguage {
                country_code: code,
                language_code: language.language_code.clone(),
            });
            let key = language.language_code.clone();
            self.languages.register(&key, || language);
        }
    }

    fn finish(self) -> Normalized {
        Normalized {
            relations: Relations {
                countries: self.countries,
                currencies: self.currencies.into_rows(),
                languages: self.languages.into_rows(),
                countries_currencies: self.countries_currencies,
                countries_languages: self.countries_languages,
            },
            diagnostics: self.diagnostics,
        }
    }
}

/// Normalize raw country records into the five star-schema relations.
///
/// Malformed records are dropped and reported in `diagnostics`; nothing
/// here fails for row-level problems. The first record seen for a
/// country code wins, as does the first currency/language definition
/// seen for a dimension code.
pub fn normalize_countries(records: &[Value]) -> Normalized {
    let mut normalizer = Normalizer::new();

    for (index, record) in records.iter().enumerate() {
        normalizer.process(index, record);
    }

    let normalized = normalizer.finish();
    info!(
        records = records.len(),
        countries = normalized.relations.countries.len(),
        currencies = normalized.relations.currencies.len(),
        languages = normalized.relations.languages.len(),
        dropped = normalized.diagnostics.len(),
        "Normalized country records"
    );
    normalized
}

/// Accepts a string of ASCII digits or a non-negative JSON integer
fn parse_country_code(raw: Option<&Value>) -> Result<CountryCode, DropReason> {
    match raw {
        None => Err(DropReason::MissingCode),
        Some(Value::String(s)) if s.is_empty() => Err(DropReason::MissingCode),
        Some(Value::String(s)) => {
            if !s.bytes().all(|b| b.is_ascii_digit()) {
                return Err(DropReason::InvalidCode(s.clone()));
            }
            s.parse::<CountryCode>()
                .map_err(|_| DropReason::InvalidCode(s.clone()))
        }
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| CountryCode::try_from(n).ok())
            .ok_or_else(|| DropReason::InvalidCode(n.to_string())),
        Some(other) => Err(DropReason::InvalidCode(other.to_string())),
    }
}

/// Only the first listed capital is kept
fn first_capital(record: &Value) -> Option<String> {
    path_array(record, "capital")?
        .first()
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// GINI is keyed by survey year; the most recent numeric year wins
fn latest_gini(record: &Value) -> Option<f64> {
    path_object(record, "gini")?
        .iter()
        .filter_map(|(year, value)| value.as_f64().map(|v| (year, v)))
        .max_by_key(|(year, _)| (year.parse::<i64>().ok(), year.to_string()))
        .map(|(_, value)| value)
}

fn extract_currencies(record: &Value, country_code: CountryCode) -> Vec<Currency> {
    let Some(currencies) = path_object(record, "currencies") else {
        return Vec::new();
    };

    currencies
        .iter()
        .filter_map(|(code, data)| {
            if !data.is_object() {
                debug!(country_code, currency = %code, "Skipping malformed currency entry");
                return None;
            }
            Some(Currency {
                currency_code: code.clone(),
                currency_name: path_str(data, "name"),
                currency_symbol: path_str(data, "symbol"),
            })
        })
        .collect()
}

fn extract_languages(record: &Value, country_code: CountryCode) -> Vec<Language> {
    let Some(languages) = path_object(record, "languages") else {
        return Vec::new();
    };

    languages
        .iter()
        .filter_map(|(code, name)| match name.as_str() {
            Some(name) => Some(Language {
                language_code: code.clone(),
                language_name: name.to_string(),
            }),
            None => {
                debug!(country_code, language = %code, "Skipping malformed language entry");
                None
            }
        })
        .collect()
}
