//! Constants used throughout the Pulse core crate.

/// Default directory scanned for input documents when none is configured.
pub const DEFAULT_INPUT_DIR: &str = "input";

/// Default directory mapped aggregates are written to when none is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Environment variable naming the input directory.
pub const INPUT_DIR_ENV: &str = "PULSE_INPUT_DIR";

/// Environment variable naming the output directory.
pub const OUTPUT_DIR_ENV: &str = "PULSE_OUTPUT_DIR";

/// Environment variable naming the classification override table.
pub const OVERRIDES_ENV: &str = "PULSE_OVERRIDES";

/// Extension of input documents and of written aggregates.
pub const JSON_EXTENSION: &str = "json";

/// Resource type of a FHIR bundle.
pub const BUNDLE_RESOURCE_TYPE: &str = "Bundle";

/// Length of the input excerpt carried by parse errors.
pub const SNIPPET_LEN: usize = 100;
