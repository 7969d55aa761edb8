use std::fmt;
use std::fs;
use std::path::Path;

use super::ProgramDescription;

use crate::kernel::Instruction;

#[derive(Debug)]
pub enum LoadError {
    Io(std::io::Error),
    InvalidValue { line: usize, text: String },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(err) => write!(f, "failed to read program file: {err}"),
            LoadError::InvalidValue { line, text } => {
                write!(f, "line {line}: expected an integer value in {text:?}")
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(err) => Some(err),
            LoadError::InvalidValue { .. } => None,
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        LoadError::Io(err)
    }
}

/// Reads and parses one program file.
pub fn load_program(path: impl AsRef<Path>) -> Result<ProgramDescription, LoadError> {
    let text = fs::read_to_string(path)?;
    parse_program(&text)
}

/// Parses the line-oriented program format. Parsing stops at `EXE`; lines
/// that match no known prefix are skipped.
pub fn parse_program(text: &str) -> Result<ProgramDescription, LoadError> {
    let mut program = ProgramDescription::default();

    for (idx, line) in text.lines().enumerate() {
        let line_num = idx + 1;
        let line = line.trim();

        if line.len() < 3 {
            continue;
        }

        if line.starts_with("Name") {
            program.name = Some(field_value(line).to_string());
        } else if line.starts_with("Total") {
            program.total_runtime = Some(field_value(line).to_string());
        } else if line.starts_with("Memory") {
            program.memory_mb = Some(parse_value(leading_token(field_value(line)), line_num, line)?);
        } else if line.starts_with("Priority") {
            program.priority = Some(parse_value(leading_token(field_value(line)), line_num, line)?);
        } else if let Some(rest) = line.strip_prefix("I/O") {
            let duration = parse_value(rest.trim(), line_num, line)?;
            program.instructions.push(Instruction::Io { duration });
        } else if line.starts_with("CALC") {
            let burst = line.split_whitespace().last().unwrap_or_default();
            let remaining_burst = parse_value(burst, line_num, line)?;
            program.instructions.push(Instruction::Compute { remaining_burst });
        } else if line.starts_with("YIELD") {
            program.instructions.push(Instruction::Yield);
        } else if line.starts_with("OUT") {
            program.instructions.push(Instruction::Print);
        } else if line.starts_with("EXE") {
            break;
        } else {
            log::trace!("skipping line {}: {:?}", line_num, line);
        }
    }

    Ok(program)
}

fn field_value(line: &str) -> &str {
    match line.split_once(':') {
        Some((_, value)) => value.trim(),
        None => "",
    }
}

/// The number at the start of a value, ignoring trailing units such as `MB`.
fn leading_token(value: &str) -> &str {
    value.split_whitespace().next().unwrap_or_default()
}

fn parse_value<T: std::str::FromStr>(value: &str, line: usize, text: &str) -> Result<T, LoadError> {
    value.parse().map_err(|_| LoadError::InvalidValue {
        line,
        text: text.to_string(),
    })
}
