use anyhow::{bail, Context, Result};
use countries_etl::{
    cli::{Cli, Commands, SourceArgs},
    config::Settings,
    download::{CacheManager, CountriesClient},
    logging::init_logging,
    pipeline::{run_once, run_pipeline, FileSource, RunSummary},
    schema::table_names,
    summary::{load_summary, open_read_only, regions, SummaryRow},
};
use std::path::PathBuf;

fn settings_for(output_db: Option<PathBuf>, source: SourceArgs) -> Result<Settings> {
    Settings::builder()
        .database(output_db)
        .api_url(source.api_url)
        .timeout_secs(source.timeout)
        .cache_dir(source.cache_dir)
        .build()
        .context("Invalid configuration")
}

fn print_run(summary: &RunSummary, output_db: &std::path::Path, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    for diagnostic in &summary.diagnostics {
        println!(
            "Skipped record {} ({}): {}",
            diagnostic.index,
            diagnostic.name.as_deref().unwrap_or("unnamed"),
            diagnostic.reason
        );
    }
    println!(
        "\nCreated {:?} ({} countries, {} currencies, {} languages, {} dropped records) in {:.1}s",
        output_db,
        summary.stats.countries,
        summary.stats.currencies,
        summary.stats.languages,
        summary.dropped(),
        summary.elapsed.as_secs_f64()
    );
    Ok(())
}

fn print_summary(rows: &[SummaryRow]) {
    println!(
        "{:<32} {:<20} {:<10} {:>14} {:<24} {}",
        "Country Name", "Capital", "Region", "Population", "Currencies", "Languages"
    );
    for row in rows {
        println!(
            "{:<32} {:<20} {:<10} {:>14} {:<24} {}",
            row.country_name.as_deref().unwrap_or(""),
            row.capital,
            row.region.as_deref().unwrap_or(""),
            row.population.map(|p| p.to_string()).unwrap_or_default(),
            row.currencies,
            row.languages
        );
    }
    println!("\n{} countries", rows.len());
}

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(&cli.log_level);

    match cli.command {
        Commands::Sync {
            output_db,
            source,
            json,
        } => {
            let settings = settings_for(output_db, source)?;
            let summary = run_once(&settings).context("Sync failed")?;
            print_run(&summary, &settings.database, json)?;
        }

        Commands::Fetch { output, source } => {
            let settings = settings_for(None, source)?;
            let client = CountriesClient::new(settings.api_url.clone(), settings.timeout)?;
            let body = client.fetch_text().context("Failed to fetch country records")?;

            let path = match output {
                Some(path) => {
                    std::fs::write(&path, &body)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    path
                }
                None => CacheManager::new(settings.cache_dir)?.store_snapshot(&body)?,
            };
            println!("Country records saved to {:?}", path);
        }

        Commands::Load {
            output_db,
            input,
            cache_dir,
            json,
        } => {
            let input = match input {
                Some(path) => path,
                None => {
                    let cache = CacheManager::new(cache_dir)?;
                    if !cache.has_snapshot() {
                        bail!("No cached snapshot in {:?}; run `fetch` first or pass an input file", cache.cache_dir());
                    }
                    cache.snapshot_path()
                }
            };

            let source = FileSource::new(&input);
            let summary = run_pipeline(&source, &output_db)
                .with_context(|| format!("Failed to load {:?}", input))?;
            print_run(&summary, &output_db, json)?;
        }

        Commands::Summary {
            db,
            region,
            regions: list_regions,
            json,
        } => {
            let conn = open_read_only(&db).with_context(|| format!("Failed to open {:?}", db))?;

            if list_regions {
                for name in regions(&conn)? {
                    println!("{}", name);
                }
                return Ok(());
            }

            let rows = load_summary(&conn, region.as_deref())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print_summary(&rows);
            }
        }

        Commands::ListTables => {
            println!("Available tables:\n");
            for name in table_names() {
                println!("  {}", name);
            }
        }
    }

    Ok(())
}
