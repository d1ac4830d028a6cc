use serde::Serialize;

/// Numeric ISO 3166-1 code (`ccn3`)
pub type CountryCode = u32;

/// Fact row
#[derive(Debug, Clone, PartialEq)]
pub struct Country {
    pub country_code: CountryCode,
    pub country_name: Option<String>,
    pub official_country_name: Option<String>,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub flag_url: Option<String>,
    pub area: Option<f64>,
    pub population: Option<i64>,
    pub gini: Option<f64>,
}

/// Currency dimension row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Currency {
    pub currency_code: String,
    pub currency_name: Option<String>,
    pub currency_symbol: Option<String>,
}

/// Language dimension row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    pub language_code: String,
    pub language_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CountryCurrency {
    pub country_code: CountryCode,
    pub currency_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CountryLanguage {
    pub country_code: CountryCode,
    pub language_code: String,
}

/// The five relations of the star schema, each in first-seen order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relations {
    pub countries: Vec<Country>,
    pub currencies: Vec<Currency>,
    pub languages: Vec<Language>,
    pub countries_currencies: Vec<CountryCurrency>,
    pub countries_languages: Vec<CountryLanguage>,
}

/// Why a raw record was dropped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DropReason {
    NotAnObject,
    MissingCode,
    InvalidCode(String),
    DuplicateCode(CountryCode),
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::NotAnObject => write!(f, "record is not an object"),
            DropReason::MissingCode => write!(f, "missing ccn3"),
            DropReason::InvalidCode(raw) => write!(f, "invalid ccn3 {:?}", raw),
            DropReason::DuplicateCode(code) => write!(f, "duplicate ccn3 {}", code),
        }
    }
}

/// A record that was skipped during normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Position of the record in the raw batch
    pub index: usize,
    /// Common name, when the record carried one
    pub name: Option<String>,
    pub reason: DropReason,
}

/// Normalizer output
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub relations: Relations,
    pub diagnostics: Vec<Diagnostic>,
}
