use serde::Serialize;
use std::collections::BTreeMap;

use keyline::config::active::{ActiveConfig, ScopedValue};
use keyline::error::Result;

/// Print `rows` under `headers` with left-aligned columns.
pub fn table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let header: Vec<String> = headers.iter().map(|h| h.to_uppercase()).collect();
    println!("{}", format_row(&header, &widths));
    for row in rows {
        println!("{}", format_row(row, &widths));
    }
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect();
    line.join("  ").trim_end().to_string()
}

pub fn json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// The active configuration as name/value/scope/source.
pub fn active_config(active: &ActiveConfig, as_json: bool) -> Result<()> {
    if as_json {
        let map: BTreeMap<&str, &ScopedValue> =
            active.entries().map(|(opt, v)| (opt.key(), v)).collect();
        return json(&map);
    }

    let rows: Vec<Vec<String>> = active
        .entries()
        .map(|(opt, v)| {
            vec![
                opt.key().to_string(),
                v.value.clone(),
                v.scope.clone(),
                v.source.to_string(),
            ]
        })
        .collect();
    table(&["name", "value", "scope", "source"], &rows);
    Ok(())
}
