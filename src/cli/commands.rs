//! CLI command implementations

use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};

use crate::schema::{Schema, SchemaDefinition, SchemaLoader};

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{read_document, write_error, write_response, Output};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Loads configuration, starts logging, and runs `cmd`.
pub fn run_command(cmd: Command) -> CliResult<()> {
    let config = Config::load_or_default(cmd.config_path().map(|p| p.as_path()))?;
    init_logging(&config);
    let output = cmd.output();

    match cmd {
        Command::Check {
            schema, document, ..
        } => check(&config, &schema, &document, output),
        Command::Describe { schema, .. } => describe(&config, &schema, output),
    }
}

/// Logs go to stderr; stdout carries only result lines.
fn init_logging(config: &Config) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(config.env_filter())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Checks one document against a schema.
///
/// Writes an `ok` line on success. On mismatch, writes an `error` line with
/// the decode error code and path, and returns a `DocumentMismatch` error.
pub fn check(config: &Config, schema: &str, document: &Path, output: Output) -> CliResult<()> {
    let schema = resolve_schema(config, schema)?;
    let bytes = read_document(document)?;

    match config.decoder().validate(&bytes, &schema) {
        Ok(()) => {
            info!(schema = schema.name(), "document accepted");
            let result = json!({
                "schema": schema.name(),
                "valid": true
            });
            write_response(result, output)
        }
        Err(err) => {
            info!(schema = schema.name(), code = %err.code(), path = %err.path(), "document rejected");
            let cli_err = CliError::mismatch(&err);
            write_error(err.code().code(), cli_err.message(), output)?;
            Err(cli_err)
        }
    }
}

/// Prints a schema's key tree in definition-file form.
pub fn describe(config: &Config, schema: &str, output: Output) -> CliResult<()> {
    let schema = resolve_schema(config, schema)?;
    let definition = SchemaDefinition::from(schema.as_ref());
    write_response(serde_json::to_value(definition)?, output)
}

/// An existing file is read directly; anything else is a schema name
/// looked up in `schema_dir`.
pub fn resolve_schema(config: &Config, schema: &str) -> CliResult<Arc<Schema>> {
    let path = Path::new(schema);
    if path.is_file() {
        debug!(path = %path.display(), "reading schema file");
        return Ok(SchemaLoader::read_file(path)?);
    }

    let mut loader = SchemaLoader::new(&config.schema_dir);
    loader.load_all()?;
    loader.get(schema).ok_or_else(|| {
        CliError::schema_error(format!(
            "schema '{}' is neither a file nor defined in {}",
            schema,
            config.schema_dir.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    use crate::cli::errors::CliErrorCode;

    const ORDER: &str = r#"{
        "name": "Order",
        "fields": [
            { "key": "order_id", "kind": "scalar" },
            { "key": "lines", "kind": "sequence_of_record",
              "schema": { "name": "Line", "fields": [ { "key": "sku", "kind": "scalar" } ] } }
        ]
    }"#;

    fn setup() -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        let schema_dir = dir.path().join("schemas");
        fs::create_dir(&schema_dir).unwrap();
        fs::write(schema_dir.join("order.json"), ORDER).unwrap();

        let config = Config {
            schema_dir,
            ..Config::default()
        };
        (dir, config)
    }

    fn document(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("doc.json");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_resolve_by_name_and_by_path() {
        let (_dir, config) = setup();

        let by_name = resolve_schema(&config, "Order").unwrap();
        assert_eq!(by_name.name(), "Order");

        let file = config.schema_dir.join("order.json");
        let by_path = resolve_schema(&config, file.to_str().unwrap()).unwrap();
        assert_eq!(by_path.keys().collect::<Vec<_>>(), vec!["order_id", "lines"]);
    }

    #[test]
    fn test_resolve_unknown_schema() {
        let (_dir, config) = setup();
        let err = resolve_schema(&config, "Invoice").unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::SchemaError);
    }

    #[test]
    fn test_check_accepts_exact_document() {
        let (dir, config) = setup();
        let doc = document(&dir, r#"{"order_id": 7, "lines": [{"sku": "A-1"}]}"#);
        assert!(check(&config, "Order", &doc, Output::Compact).is_ok());
    }

    #[test]
    fn test_check_rejects_nested_extra_key() {
        let (dir, config) = setup();
        let doc = document(
            &dir,
            r#"{"order_id": 7, "lines": [{"sku": "A-1", "qty": 2}]}"#,
        );

        let err = check(&config, "Order", &doc, Output::Compact).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::DocumentMismatch);
        assert!(err.message().ends_with("at lines[0].qty"));
    }

    #[test]
    fn test_check_honours_size_limit() {
        let (dir, mut config) = setup();
        config.max_document_bytes = 8;
        let doc = document(&dir, r#"{"order_id": 7, "lines": []}"#);

        let err = check(&config, "Order", &doc, Output::Compact).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::DocumentMismatch);
    }

    #[test]
    fn test_describe_known_schema() {
        let (_dir, config) = setup();
        assert!(describe(&config, "Order", Output::Compact).is_ok());
        assert!(describe(&config, "Order", Output::Pretty).is_ok());
    }
}
