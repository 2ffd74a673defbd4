//! JSON I/O handling for CLI
//!
//! Results are written to stdout as one JSON object, compact on a single line
//! or indented with `--pretty`.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Result formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Output {
    #[default]
    Compact,
    Pretty,
}

impl Output {
    pub fn from_flag(pretty: bool) -> Self {
        if pretty {
            Output::Pretty
        } else {
            Output::Compact
        }
    }
}

/// Reads a document from a file, or from stdin when the path is `-`.
pub fn read_document(path: &Path) -> CliResult<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        io::stdin().lock().read_to_end(&mut buf)?;
        return Ok(buf);
    }

    fs::read(path)
        .map_err(|e| CliError::io_error(format!("Failed to read {}: {}", path.display(), e)))
}

/// Write a success response to stdout
pub fn write_response(data: Value, output: Output) -> CliResult<()> {
    write_stdout(&success(data), output)
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str, output: Output) -> CliResult<()> {
    write_stdout(&failure(code, message), output)
}

fn success(data: Value) -> Value {
    serde_json::json!({
        "status": "ok",
        "data": data
    })
}

fn failure(code: &str, message: &str) -> Value {
    serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    })
}

fn write_stdout(response: &Value, output: Output) -> CliResult<()> {
    let mut stdout = io::stdout();
    write_to(&mut stdout, response, output)?;
    stdout.flush()?;

    Ok(())
}

/// Writes `response` followed by a newline.
pub fn write_to<W: Write>(writer: &mut W, response: &Value, output: Output) -> CliResult<()> {
    match output {
        Output::Compact => serde_json::to_writer(&mut *writer, response)?,
        Output::Pretty => serde_json::to_writer_pretty(&mut *writer, response)?,
    }
    writeln!(writer)?;

    Ok(())
}
