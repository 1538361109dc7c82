use clap::{Parser, Subcommand};
use fhir::dates::current_year;
use fhir::{build_registry, ClassificationOverrides, Classifier, ResourceMapper};
use pulse_core::{load_overrides, Ingested, Ingester};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "pulse")]
#[command(about = "Map FHIR resources into the Pulse canonical clinical model")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Map one file and print the aggregates as JSON
    Map {
        /// Resource, Bundle or array of either
        path: PathBuf,
        /// Classification override table (YAML)
        #[arg(long)]
        overrides: Option<PathBuf>,
        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
    /// Map one file and print a one-line summary per aggregate
    Summary {
        path: PathBuf,
        #[arg(long)]
        overrides: Option<PathBuf>,
    },
    /// List registered mappers in dispatch order
    Mappers,
}

fn ingester(overrides: Option<PathBuf>) -> Result<Ingester, Box<dyn std::error::Error>> {
    let overrides = match overrides {
        Some(path) => load_overrides(&path)?,
        None => ClassificationOverrides::default(),
    };
    let registry = build_registry(Classifier::new(overrides));
    Ok(Ingester::new(Arc::new(registry)))
}

fn ingest(
    path: &Path,
    overrides: Option<PathBuf>,
) -> Result<Ingested, Box<dyn std::error::Error>> {
    let raw = pulse_core::files::read_input(path)?;
    let ingested = ingester(overrides)?.parse(&raw)?;
    if let Ingested::Batch { failures, .. } = &ingested {
        for failure in failures {
            eprintln!(
                "Item {} ({}) failed: {}",
                failure.index,
                failure.resource_type.as_deref().unwrap_or("unknown"),
                failure.error
            );
        }
    }
    Ok(ingested)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("pulse=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Map {
            path,
            overrides,
            pretty,
        }) => {
            let contents: Vec<_> = ingest(&path, overrides)?
                .into_documents()
                .into_iter()
                .map(|document| document.content)
                .collect();
            let json = if pretty {
                serde_json::to_string_pretty(&contents)?
            } else {
                serde_json::to_string(&contents)?
            };
            println!("{json}");
        }
        Some(Commands::Summary { path, overrides }) => {
            let year = current_year();
            for document in ingest(&path, overrides)?.into_documents() {
                println!(
                    "{} [{}]: {}",
                    document.record_id,
                    document.source_type,
                    document.content.summary(year)
                );
            }
        }
        Some(Commands::Mappers) => {
            let registry = build_registry(Classifier::default());
            for mapper in registry.mappers() {
                println!("{:<24} {}", mapper.name(), mapper.resource_types().join(", "));
            }
        }
        None => {
            println!("Use 'pulse --help' for commands");
        }
    }

    Ok(())
}
