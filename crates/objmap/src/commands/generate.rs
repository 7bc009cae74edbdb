//! Generate command implementation

use std::path::PathBuf;
use std::str::FromStr;

use objmap_core::GeneratorConfig;
use objmap_core::generator::{describe_str, render_rust, to_schema};
use tracing::info;

use super::read_input;
use crate::error::CliError;
use crate::output::write_output;

/// What the `generate` command emits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateTarget {
    /// Mapping schema as YAML
    Yaml,
    /// Mapping schema as JSON
    Json,
    /// Rust structs, `Mappable` impls and descriptor registration
    Rust,
}

impl FromStr for GenerateTarget {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(GenerateTarget::Yaml),
            "json" => Ok(GenerateTarget::Json),
            "rust" | "rs" => Ok(GenerateTarget::Rust),
            other => Err(CliError::InvalidArgument(format!(
                "Unknown generate format: {} (expected yaml, json or rust)",
                other
            ))),
        }
    }
}

/// Arguments for the `generate` command
pub struct GenerateArgs {
    /// Sample JSON document, or `-` for stdin
    pub input: String,
    pub root_name: String,
    pub prefix: String,
    pub detect_dates: bool,
    pub target: GenerateTarget,
    /// Output file; stdout when not given
    pub output: Option<PathBuf>,
}

/// Describe the sample and render it in the requested form
pub fn generate(sample: &str, config: &GeneratorConfig, target: GenerateTarget) -> Result<String, CliError> {
    let types = describe_str(sample, config)?;
    info!(types = types.len(), "Generated type descriptions");

    let rendered = match target {
        GenerateTarget::Yaml => to_schema(&types).to_yaml_string()?,
        GenerateTarget::Json => {
            let mut json = to_schema(&types).to_json_string()?;
            json.push('\n');
            json
        }
        GenerateTarget::Rust => render_rust(&types),
    };
    Ok(rendered)
}

/// Handle the `generate` command
pub fn handle_generate(args: &GenerateArgs) -> Result<(), CliError> {
    let sample = read_input(&args.input)?;
    let config = GeneratorConfig::new()
        .with_root_name(args.root_name.as_str())
        .with_prefix(args.prefix.as_str())
        .with_detect_dates(args.detect_dates);

    let rendered = generate(&sample, &config, args.target)?;
    write_output(&rendered, args.output.as_deref())?;

    if let Some(path) = &args.output {
        eprintln!("Wrote {}", path.display());
    }
    Ok(())
}
