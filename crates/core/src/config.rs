//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the runner. Nothing
//! in this crate reads environment variables itself: binaries read them (after `.env` loading)
//! and hand the raw values to [`CoreConfig::from_env_values`].

use crate::constants::{DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR};
use crate::{CoreError, CoreResult};
use fhir::{ClassificationOverrides, Classifier};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    input_dir: PathBuf,
    output_dir: PathBuf,
    overrides_path: Option<PathBuf>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] when either directory is empty or both name the
    /// same path.
    pub fn new(
        input_dir: PathBuf,
        output_dir: PathBuf,
        overrides_path: Option<PathBuf>,
    ) -> CoreResult<Self> {
        if input_dir.as_os_str().is_empty() || output_dir.as_os_str().is_empty() {
            return Err(CoreError::InvalidConfig(
                "input and output directories cannot be empty".into(),
            ));
        }
        if input_dir == output_dir {
            return Err(CoreError::InvalidConfig(
                "output directory must differ from the input directory".into(),
            ));
        }

        Ok(Self {
            input_dir,
            output_dir,
            overrides_path,
        })
    }

    /// Resolve configuration from raw environment values.
    ///
    /// Missing or blank values fall back to the defaults in [`crate::constants`]; a blank
    /// override path means no override table.
    pub fn from_env_values(
        input_dir: Option<String>,
        output_dir: Option<String>,
        overrides: Option<String>,
    ) -> CoreResult<Self> {
        fn non_blank(value: Option<String>) -> Option<PathBuf> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        }

        Self::new(
            non_blank(input_dir).unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_DIR)),
            non_blank(output_dir).unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            non_blank(overrides),
        )
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn overrides_path(&self) -> Option<&Path> {
        self.overrides_path.as_deref()
    }

    /// Build the classifier, loading the override table when one is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the override file cannot be read or does not parse.
    pub fn classifier(&self) -> CoreResult<Classifier> {
        let overrides = match self.overrides_path() {
            Some(path) => load_overrides(path)?,
            None => ClassificationOverrides::default(),
        };
        Ok(Classifier::new(overrides))
    }
}

/// Load a classification override table from a YAML file.
///
/// # Errors
///
/// - [`CoreError::FileRead`] if the file cannot be read
/// - [`CoreError::Overrides`] if the YAML is malformed or names an unknown family; the message
///   carries the failing path
pub fn load_overrides(path: &Path) -> CoreResult<ClassificationOverrides> {
    let text = std::fs::read_to_string(path).map_err(|source| CoreError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let overrides = ClassificationOverrides::from_yaml_str(&text)?;
    tracing::info!(
        path = %path.display(),
        category = overrides.category.len(),
        loinc = overrides.loinc.len(),
        "classification overrides loaded"
    );
    Ok(overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhir::ClinicalFamily;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("create temp file");
        file.write_all(contents.as_bytes()).expect("write temp file");
        file
    }

    #[test]
    fn blank_env_values_fall_back_to_defaults() {
        let config = CoreConfig::from_env_values(None, Some("  ".into()), Some(String::new()))
            .expect("default config");

        assert_eq!(config.input_dir(), Path::new(DEFAULT_INPUT_DIR));
        assert_eq!(config.output_dir(), Path::new(DEFAULT_OUTPUT_DIR));
        assert!(config.overrides_path().is_none());
    }

    #[test]
    fn same_input_and_output_directory_is_rejected() {
        let err = CoreConfig::from_env_values(Some("data".into()), Some("data".into()), None)
            .expect_err("same directory");
        assert!(matches!(err, CoreError::InvalidConfig(_)));
    }

    #[test]
    fn loads_override_table_from_file() {
        let file = write_temp("overrides:\n  category:\n    PANEL: lab\n  loinc:\n    8867-4: vital_signs\n");

        let overrides = load_overrides(file.path()).expect("valid overrides");

        assert_eq!(
            overrides.category.get("PANEL"),
            Some(&ClinicalFamily::Laboratory)
        );
        assert_eq!(
            overrides.loinc.get("8867-4"),
            Some(&ClinicalFamily::VitalSigns)
        );
    }

    #[test]
    fn unknown_family_is_rejected_with_path() {
        let file = write_temp("overrides:\n  loinc:\n    8867-4: astrology\n");

        let err = load_overrides(file.path()).expect_err("unknown family");

        assert!(matches!(err, CoreError::Overrides(_)));
        assert!(err.to_string().contains("overrides.loinc"), "{err}");
    }

    #[test]
    fn missing_override_file_is_a_read_error() {
        let config = CoreConfig::new(
            PathBuf::from("in"),
            PathBuf::from("out"),
            Some(PathBuf::from("/nonexistent/pulse-overrides.yaml")),
        )
        .expect("config");

        let err = config.classifier().expect_err("missing file");
        assert!(matches!(err, CoreError::FileRead { .. }));
    }
}
