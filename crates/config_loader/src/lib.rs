//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Produce a `DispatchPlan`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let plan = ConfigLoader::load_from_path(Path::new("dispatch.toml")).unwrap();
//! println!("Dispatchers: {}", plan.dispatchers.len());
//! ```

mod parser;
mod validator;

pub use contracts::DispatchPlan;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<DispatchPlan, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<DispatchPlan, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// Serialize DispatchPlan to TOML string
    pub fn to_toml(plan: &DispatchPlan) -> Result<String, ContractError> {
        toml::to_string_pretty(plan)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize DispatchPlan to JSON string
    pub fn to_json(plan: &DispatchPlan) -> Result<String, ContractError> {
        serde_json::to_string_pretty(plan)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate configuration content
    fn parse_and_validate(content: &str, format: ConfigFormat) -> Result<DispatchPlan, ContractError> {
        let plan = parser::parse(content, format)?;
        validator::validate(&plan)?;
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_TOML: &str = r#"
default_channel = "robot"

[[dispatchers]]
channel = "telemetry"
name = "joint_state"
sink = "console"

[[dispatchers]]
channel = "audit"
level = "warning"
name = "operations"
max_batch_age_ms = 250
max_batch_size = 32
sink = "archive"

[[sinks]]
name = "console"
sink_type = "log"

[[sinks]]
name = "archive"
sink_type = "file"
params = { path = "/tmp/records.jsonl" }
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let plan = result.unwrap();
        assert_eq!(plan.default_channel, "robot");
        assert_eq!(plan.dispatchers.len(), 2);
    }

    #[test]
    fn test_round_trip_toml() {
        let plan = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&plan).unwrap();
        let plan2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(plan.default_channel, plan2.default_channel);
        assert_eq!(plan.dispatchers.len(), plan2.dispatchers.len());
        assert_eq!(plan.dispatchers[0].name, plan2.dispatchers[0].name);
    }

    #[test]
    fn test_round_trip_json() {
        let plan = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&plan).unwrap();
        let plan2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(plan.default_channel, plan2.default_channel);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        // Dispatcher referencing an undeclared sink should fail validation
        let content = r#"
[[dispatchers]]
channel = "telemetry"
name = "joint_state"
sink = "nowhere"
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(matches!(
            result,
            Err(ContractError::ConfigValidation { .. })
        ));
    }

    #[test]
    fn test_load_from_path() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dispatch.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(MINIMAL_TOML.as_bytes()).unwrap();

        let plan = ConfigLoader::load_from_path(&path).unwrap();
        assert_eq!(plan.dispatchers.len(), 2);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = ConfigLoader::load_from_path(Path::new("dispatch.yaml"));
        assert!(matches!(result, Err(ContractError::ConfigParse { .. })));
    }
}
