use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fhir::build_registry;
use pulse_core::constants::{INPUT_DIR_ENV, OUTPUT_DIR_ENV, OVERRIDES_ENV};
use pulse_core::files::{input_files, read_input, write_aggregate};
use pulse_core::{
    CoreConfig, CoreResult, Ingested, Ingester, IngestionStage, MemoryTracker, OutcomeTracker,
};

/// Batch entry point for Pulse
///
/// Maps every `.json` document in the input directory and writes one aggregate per mapped
/// document to the output directory. The registry is built once and shared; each file is mapped
/// on the blocking pool with its own aggregate and cache.
///
/// # Environment Variables
/// - `PULSE_INPUT_DIR`: directory of input documents (default: "input")
/// - `PULSE_OUTPUT_DIR`: directory for mapped aggregates (default: "output")
/// - `PULSE_OVERRIDES`: optional classification override table (YAML)
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("pulse=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CoreConfig::from_env_values(
        std::env::var(INPUT_DIR_ENV).ok(),
        std::env::var(OUTPUT_DIR_ENV).ok(),
        std::env::var(OVERRIDES_ENV).ok(),
    )?;
    let ingester = Ingester::new(Arc::new(build_registry(config.classifier()?)));
    let files = input_files(config.input_dir())?;

    tracing::info!(
        "++ Mapping {} files from {} into {}",
        files.len(),
        config.input_dir().display(),
        config.output_dir().display()
    );

    let mut handles = Vec::with_capacity(files.len());
    for path in files {
        let ingester = ingester.clone();
        let output_dir = config.output_dir().to_path_buf();
        let task_path = path.clone();
        let handle =
            tokio::task::spawn_blocking(move || map_file(&ingester, &task_path, &output_dir));
        handles.push((path, handle));
    }

    let mut tracker = MemoryTracker::new();
    for (path, handle) in handles {
        let stem = file_stem(&path);
        match handle.await? {
            Ok(Ingested::Single(document)) => tracker.record_document(&document),
            Ok(Ingested::Batch {
                documents,
                failures,
            }) => {
                for document in &documents {
                    tracker.record_document(document);
                }
                for failure in &failures {
                    tracker.record_failure(
                        &format!("{stem}#{}", failure.index),
                        &failure.error,
                        IngestionStage::for_category(failure.error.category()),
                    );
                }
            }
            Err(error) => {
                tracing::error!("Mapping {} failed: {}", path.display(), error);
                tracker.record_failure(
                    &stem,
                    &error,
                    IngestionStage::for_category(error.category()),
                );
            }
        }
    }

    let summary = tracker.summary();
    tracing::info!(
        total = summary.total,
        succeeded = summary.succeeded,
        failed = summary.failed,
        skipped = summary.skipped,
        "++ Run complete ({:.0}% succeeded)",
        summary.success_rate() * 100.0
    );

    Ok(())
}

/// Map one file and write its aggregates as `<stem>.json`, or `<stem>-<n>.json` for arrays.
/// Documents with nothing mapped are not written.
fn map_file(ingester: &Ingester, path: &Path, output_dir: &Path) -> CoreResult<Ingested> {
    let raw = read_input(path)?;
    let ingested = ingester.parse(&raw)?;
    let stem = file_stem(path);

    match &ingested {
        Ingested::Single(document) => {
            if !document.content.is_empty() {
                write_aggregate(output_dir, &stem, &document.content, true)?;
            }
        }
        Ingested::Batch { documents, .. } => {
            for (index, document) in documents.iter().enumerate() {
                if document.content.is_empty() {
                    tracing::debug!("Nothing mapped from {}[{}]", path.display(), index);
                    continue;
                }
                write_aggregate(output_dir, &format!("{stem}-{index}"), &document.content, true)?;
            }
        }
    }

    Ok(ingested)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_owned)
        .unwrap_or_else(|| path.display().to_string())
}
