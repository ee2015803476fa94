//! Parsing of draw histories.
//!
//! A history file holds one draw per line, formatted as `<id>. <dd.mm.yyyy> <n,n,...>`, e.g.
//!
//! ```text
//! 6543. 02.03.2024 3,11,23,27,34,41
//! ```

use std::fs;
use std::io;
use std::path::Path;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

use crate::draw::{validate_numbers, DrawResult, DrawShape, InvalidDraw};

const DATE_FORMAT: &str = "%d.%m.%Y";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty line")]
    EmptyLine,

    #[error("expected 3 components, got {0}")]
    MissingComponent(usize),

    #[error("malformed component '{0}'")]
    WrongComponent(String),

    #[error("{0}")]
    InvalidDraw(#[from] InvalidDraw),
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: {error}")]
    Parse { line: usize, error: ParseError },
}

/// Parses a comma-separated combination, checking it against `shape`.
pub fn numbers_from_str(s: &str, shape: &DrawShape) -> Result<Vec<u8>, ParseError> {
    let numbers = s
        .split(',')
        .map(|number| {
            let number = number.trim();
            number
                .parse::<u8>()
                .map_err(|_| ParseError::WrongComponent(number.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    validate_numbers(&numbers, shape)?;
    Ok(numbers)
}

pub fn parse_line(line: &str, shape: &DrawShape) -> Result<DrawResult, ParseError> {
    if line.trim().is_empty() {
        return Err(ParseError::EmptyLine);
    }
    let components: Vec<_> = line.split_whitespace().collect();
    let [id, date, numbers] = components.as_slice() else {
        return Err(ParseError::MissingComponent(components.len()));
    };
    let index = id
        .trim_end_matches('.')
        .parse()
        .map_err(|_| ParseError::WrongComponent(id.to_string()))?;
    let date = NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|_| ParseError::WrongComponent(date.to_string()))?;
    let numbers = numbers_from_str(numbers, shape)?;
    Ok(DrawResult {
        index,
        date,
        numbers,
    })
}

/// Parses a whole history, returning it ordered oldest first. Blank lines are skipped.
pub fn parse_history(text: &str, shape: &DrawShape) -> Result<Vec<DrawResult>, HistoryError> {
    let mut history = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            parse_line(line, shape).map_err(|error| HistoryError::Parse {
                line: idx + 1,
                error,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    history.sort_by_key(|result| result.index);
    Ok(history)
}

pub fn read_history(path: impl AsRef<Path>, shape: &DrawShape) -> Result<Vec<DrawResult>, HistoryError> {
    let path = path.as_ref();
    let history = parse_history(&fs::read_to_string(path)?, shape)?;
    debug!("read {} results from {path:?}", history.len());
    Ok(history)
}
