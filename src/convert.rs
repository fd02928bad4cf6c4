//! CSV roll-table conversion
//!
//! Turns a CSV of roll tables into the JSON record array the importer
//! consumes. A CSV file holds any number of tables: blank rows separate
//! them, a row with a single leading cell titles the next table, a row
//! with no roll range in any cell carries column headers, and every
//! other row is one table entry of the form `range, text...`.
//!
//! Multi-column tables (`range, item1, item2, ...`) either split into
//! one table per column or merge their item columns into a single
//! entry, depending on [`ConvertOptions::combined`].

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{json, Value};

use crate::error::{ImportError, Result};

/// Options for one conversion pass
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Merge multi-column tables into one table instead of one table
    /// per column
    pub combined: bool,
}

/// Roll range of one table row: `3`, `5-8` (en/em dashes accepted,
/// `00` reads as 100), a lone dash for an unrollable filler row, or
/// the literal `Coins` marker some treasure tables carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowRange {
    Span(u32, u32),
    Empty,
    Coins,
}

fn range_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:(\d{1,4})(?:[\x{2013}\x{2014}-](\d{1,4}))?|([\x{2013}\x{2014}-])|(Coins))")
            .expect("range pattern compiles")
    })
}

fn dice_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{1,4}d\d{1,4}").expect("dice pattern compiles"))
}

fn parse_range(text: &str) -> Option<RowRange> {
    let caps = range_re().captures(text)?;

    if caps.get(3).is_some() {
        return Some(RowRange::Empty);
    }
    if caps.get(4).is_some() {
        return Some(RowRange::Coins);
    }

    let low: u32 = caps.get(1)?.as_str().parse().ok()?;
    match caps.get(2) {
        Some(high) => {
            // d100 tables write the top row as '99-00'
            let high: u32 = if high.as_str() == "00" {
                100
            } else {
                high.as_str().parse().ok()?
            };
            Some(RowRange::Span(low, high))
        }
        None => Some(RowRange::Span(low, low)),
    }
}

/// Wrap roll formulas in `[[...]]` so the host evaluates them inline.
/// A run of dice, number, and operator tokens is wrapped as one
/// formula if it contains at least one dice term; runs of bare numbers
/// stay as they are.
fn wrap_rolls(text: &str) -> String {
    fn flush(run: &mut Vec<&str>, has_dice: &mut bool, out: &mut Vec<String>) {
        if run.is_empty() {
            return;
        }
        let joined = run.join(" ");
        if *has_dice {
            out.push(format!("[[{joined}]]"));
        } else {
            out.push(joined);
        }
        run.clear();
        *has_dice = false;
    }

    let mut out: Vec<String> = Vec::new();
    let mut run: Vec<&str> = Vec::new();
    let mut has_dice = false;

    for token in text.split(' ').filter(|t| !t.is_empty()) {
        let numeric = token.chars().all(|c| c.is_ascii_digit());
        let operator = matches!(token, "+" | "-" | "*" | "/");

        if numeric || operator || dice_re().is_match(token) {
            has_dice |= dice_re().is_match(token);
            run.push(token);
            continue;
        }

        flush(&mut run, &mut has_dice, &mut out);
        out.push(token.to_string());
    }

    flush(&mut run, &mut has_dice, &mut out);
    out.join(" ")
}

/// Build one table entry. `Ok(None)` marks a `Coins` row, which is
/// skipped rather than imported.
fn make_entry(table: &str, range_text: &str, text: &str) -> Result<Option<Value>> {
    let Some(range) = parse_range(range_text) else {
        return Err(ImportError::BadTableRow {
            table: table.to_string(),
            row: format!("{range_text},{text}"),
        });
    };

    let (range_data, weight) = match range {
        RowRange::Coins => return Ok(None),
        RowRange::Empty => (vec![1u32, 0], 0u32),
        RowRange::Span(low, high) => (vec![low, high], (high + 1).saturating_sub(low)),
    };

    Ok(Some(json!({
        "flags": {},
        "type": 0,
        "resultId": "",
        "text": wrap_rolls(text),
        "img": "icons/svg/d20-black.svg",
        "weight": weight,
        "range": range_data,
        "drawn": false
    })))
}

/// Join the item columns of one row with ` | `, dropping empty cells
/// and dash placeholders.
fn merge_columns(cells: &[String]) -> String {
    cells
        .iter()
        .map(|c| c.as_str())
        .filter(|c| !c.is_empty() && !matches!(*c, "-" | "\u{2013}" | "\u{2014}"))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Build the roll table(s) for one CSV block. Multi-column blocks may
/// expand into several tables, one per item column.
fn build_tables(
    title: &str,
    headers: &[String],
    mut rows: Vec<Vec<String>>,
    options: &ConvertOptions,
    counter: &mut usize,
) -> Result<Vec<Value>> {
    // Strip the BOM that spreadsheet exports like to prepend
    let mut title = title.replace('\u{feff}', "").trim().to_string();
    if title.is_empty() {
        title = format!("Table {}", counter);
        *counter += 1;
    }

    tracing::info!("building table {}", title);

    if rows[0].len() > 2 {
        if options.combined {
            for row in &mut rows {
                let merged = merge_columns(&row[1..]);
                row.truncate(1);
                row.push(merged);
            }
        } else {
            return split_columns(&title, headers, &rows, options, counter);
        }
    }

    let mut results: Vec<Value> = Vec::new();
    for row in &rows {
        if row.len() < 2 {
            return Err(ImportError::BadTableRow {
                table: title.clone(),
                row: row.join(","),
            });
        }
        if let Some(entry) = make_entry(&title, &row[0], &row[1])? {
            results.push(entry);
        }
    }

    let weight_sum: u64 = results
        .iter()
        .map(|r| r["weight"].as_u64().unwrap_or(0))
        .sum();
    tracing::debug!("table {} holds {} roll outcomes", title, weight_sum);

    Ok(vec![json!({
        "name": title,
        "description": "",
        "results": results,
        "displayRoll": true,
        "formula": format!("1d{weight_sum}")
    })])
}

/// Expand a `range, item1, item2, ...` block (or its transposed
/// `item, range1, range2, ...` form) into one table per item column,
/// titled from the headers when they line up.
fn split_columns(
    title: &str,
    headers: &[String],
    rows: &[Vec<String>],
    options: &ConvertOptions,
    counter: &mut usize,
) -> Result<Vec<Value>> {
    let sample = &rows[2.min(rows.len() - 1)][0];
    let range_first = parse_range(sample).is_some();

    let columns = rows[0].len() - 1;
    let mut sets: Vec<Vec<Vec<String>>> = vec![Vec::new(); columns];
    for row in rows {
        for (i, set) in sets.iter_mut().enumerate() {
            if let Some(cell) = row.get(i + 1) {
                if range_first {
                    set.push(vec![row[0].clone(), cell.clone()]);
                } else {
                    set.push(vec![cell.clone(), row[0].clone()]);
                }
            }
        }
    }

    let mut tables = Vec::new();
    for (i, set) in sets.into_iter().enumerate() {
        let sub_title = match headers.get(i) {
            Some(header) if headers.len() == columns => format!("{title} - {header}"),
            _ => format!("{title} - {i}"),
        };
        tables.extend(build_tables(&sub_title, &[], set, options, counter)?);
    }

    Ok(tables)
}

/// Convert CSV content into the record array the import expects.
pub fn convert_csv(content: &str, separator: u8, options: &ConvertOptions) -> Result<Vec<Value>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(separator)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut tables: Vec<Value> = Vec::new();
    let mut counter = 1usize;
    let mut title = String::new();
    let mut headers: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<String>> = Vec::new();

    for record in reader.records() {
        let record = record?;
        let non_empty = record.iter().filter(|c| !c.trim().is_empty()).count();

        // Blank row: the current table is complete
        if non_empty == 0 {
            if !rows.is_empty() {
                tables.extend(build_tables(&title, &headers, rows, options, &mut counter)?);
                rows = Vec::new();
                headers.clear();
                title.clear();
            }
            continue;
        }

        // A single leading cell titles the next table
        if non_empty == 1 && !record.get(0).unwrap_or("").trim().is_empty() {
            if !rows.is_empty() {
                tables.extend(build_tables(&title, &headers, rows, options, &mut counter)?);
                rows = Vec::new();
                headers.clear();
            }
            title = record.get(0).unwrap_or("").trim().to_string();
            continue;
        }

        let cells: Vec<String> = record
            .iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        // A row with no roll range anywhere carries the column headers
        if !cells.iter().any(|c| parse_range(c).is_some()) {
            headers = record
                .iter()
                .skip(1)
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
        } else {
            rows.push(cells);
        }
    }

    if !rows.is_empty() {
        tables.extend(build_tables(&title, &headers, rows, options, &mut counter)?);
    }

    Ok(tables)
}
