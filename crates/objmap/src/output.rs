//! Output formatting for CLI

use std::path::Path;
use std::str::FromStr;

use serde_json::Value;

use crate::error::CliError;

/// Serialization format for command output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            other => Err(CliError::InvalidArgument(format!(
                "Unknown output format: {} (expected json or yaml)",
                other
            ))),
        }
    }
}

/// Render a value as pretty JSON or YAML
pub fn render_value(value: &Value, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| CliError::ParseError(e.to_string())),
        OutputFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| CliError::ParseError(e.to_string()))
        }
    }
}

/// Write `content` to `path`, or to stdout when no path is given
pub fn write_output(content: &str, path: Option<&Path>) -> Result<(), CliError> {
    match path {
        Some(path) => std::fs::write(path, content)
            .map_err(|e| CliError::FileWriteError(path.to_path_buf(), e.to_string())),
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}

/// Indent every line of a multi-line report
pub fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| format!("{}{}\n", prefix, line))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("yml".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert!(matches!(
            "xml".parse::<OutputFormat>(),
            Err(CliError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_render_value() {
        let value = json!({"name": "Ada"});
        let rendered = render_value(&value, OutputFormat::Json).unwrap();
        assert!(rendered.ends_with("}\n"));
        assert_eq!(serde_json::from_str::<Value>(&rendered).unwrap(), value);

        let rendered = render_value(&value, OutputFormat::Yaml).unwrap();
        assert_eq!(rendered.trim(), "name: Ada");
    }

    #[test]
    fn test_indent() {
        assert_eq!(indent("a\nb", "  "), "  a\n  b\n");
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        write_output("{}\n", Some(&path)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}\n");

        let missing = dir.path().join("no/such/dir/out.json");
        assert!(matches!(
            write_output("{}", Some(&missing)),
            Err(CliError::FileWriteError(_, _))
        ));
    }
}
