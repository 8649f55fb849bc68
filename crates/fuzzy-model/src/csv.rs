// SPDX-License-Identifier: AGPL-3.0-only

//! Minimal comma-separated reader for vector and capture files.
//!
//! Header-keyed, no quoting. Blank lines and lines starting with `#` are
//! skipped. Columns are looked up by exact (trimmed) name; extra columns are
//! ignored.

use crate::error::{checked_s8, FuzzyError, Result};
use std::io::BufRead;

/// One data row: 1-based line number and the requested fields in order.
pub(crate) struct Row {
    pub line: usize,
    pub fields: Vec<String>,
}

/// Read every data row, keeping only the `columns` named.
pub(crate) fn read_table<R: BufRead>(reader: R, columns: &[&str]) -> Result<Vec<Row>> {
    let mut lines = reader.lines().enumerate();

    let (header_line, header) = loop {
        match lines.next() {
            Some((i, line)) => {
                let line = line?;
                if !is_skipped(&line) {
                    break (i + 1, line);
                }
            }
            None => return Err(FuzzyError::parse(1, "missing header")),
        }
    };

    let names: Vec<&str> = header
        .trim_start_matches('\u{feff}')
        .split(',')
        .map(str::trim)
        .collect();
    let index = columns
        .iter()
        .map(|col| {
            names
                .iter()
                .position(|n| n == col)
                .ok_or_else(|| FuzzyError::parse(header_line, format!("missing column `{col}`")))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut rows = Vec::new();
    for (i, line) in lines {
        let line = line?;
        if is_skipped(&line) {
            continue;
        }
        let cells: Vec<&str> = line.split(',').map(str::trim).collect();
        let fields = index
            .iter()
            .zip(columns)
            .map(|(&k, col)| {
                cells
                    .get(k)
                    .map(|c| (*c).to_string())
                    .ok_or_else(|| FuzzyError::parse(i + 1, format!("missing value for `{col}`")))
            })
            .collect::<Result<Vec<_>>>()?;
        rows.push(Row { line: i + 1, fields });
    }
    Ok(rows)
}

fn is_skipped(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || line.starts_with('#')
}

/// Parse a decimal or `0x` hex integer with at most one leading sign.
pub(crate) fn parse_int(text: &str, line: usize) -> Result<i64> {
    let bad = |reason: String| FuzzyError::parse(line, format!("`{text}`: {reason}"));
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (radix, digits) = match rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        Some(hex) => (16, hex),
        None => (10, rest),
    };
    // one sign only; from_str_radix would accept a second
    if digits.starts_with(['+', '-']) {
        return Err(bad("unexpected sign".to_string()));
    }
    let magnitude = u64::from_str_radix(digits, radix).map_err(|e| bad(e.to_string()))?;
    let value = if negative {
        -i128::from(magnitude)
    } else {
        i128::from(magnitude)
    };
    i64::try_from(value).map_err(|_| bad("out of range".to_string()))
}

/// Parse a signed 8-bit field.
pub(crate) fn parse_s8(name: &'static str, text: &str, line: usize) -> Result<i8> {
    checked_s8(name, parse_int(text, line)?)
}
