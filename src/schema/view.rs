//! The `countries_summary` view read by downstream consumers

/// View name
pub const SUMMARY_VIEW: &str = "countries_summary";

/// Placeholder shown for a missing capital or an empty currency/language list
pub const NOT_AVAILABLE: &str = "N/A";

/// Separator for the aggregated currency and language name lists
pub const LIST_SEPARATOR: &str = ", ";

/// View columns, in order
pub const SUMMARY_COLUMNS: &[&str] = &[
    "Country Name",
    "Official Country Name",
    "Capital",
    "Region",
    "Area",
    "Population",
    "GINI",
    "flag_url",
    "Currencies",
    "Languages",
];

/// Distinct, name-ordered list of one dimension's names for the current country,
/// or the placeholder when there are none
fn aggregated_names(junction: &str, dimension: &str, code: &str, name: &str) -> String {
    format!(
        "COALESCE(
            (SELECT group_concat({name}, '{sep}' ORDER BY {name})
             FROM (SELECT DISTINCT d.{name} AS {name}
                   FROM {junction} j
                   JOIN {dimension} d ON d.{code} = j.{code}
                   WHERE j.country_code = c.country_code AND d.{name} IS NOT NULL)),
            '{na}')",
        name = name,
        code = code,
        junction = junction,
        dimension = dimension,
        sep = LIST_SEPARATOR,
        na = NOT_AVAILABLE,
    )
}

/// CREATE VIEW statement for the summary view
pub fn summary_view_sql() -> String {
    format!(
        "CREATE VIEW {view} AS
SELECT
    c.country_name                         AS \"Country Name\",
    c.official_country_name                AS \"Official Country Name\",
    COALESCE(c.capital, '{na}')            AS \"Capital\",
    c.region                               AS \"Region\",
    c.area                                 AS \"Area\",
    c.population                           AS \"Population\",
    c.gini                                 AS \"GINI\",
    c.flag_url                             AS flag_url,
    {currencies} AS \"Currencies\",
    {languages} AS \"Languages\"
FROM countries c",
        view = SUMMARY_VIEW,
        na = NOT_AVAILABLE,
        currencies = aggregated_names(
            "countries_currencies",
            "currencies",
            "currency_code",
            "currency_name"
        ),
        languages = aggregated_names(
            "countries_languages",
            "languages",
            "language_code",
            "language_name"
        ),
    )
}
