//! `refs` and `load` commands.

use std::collections::BTreeMap;

use fieldscope::index_pattern::IndexPattern;
use fieldscope::index_pattern::{IndexPatternMap, IndexPatternRef};

use super::common::{ConsoleEvents, ServerArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// List data views sorted by title.
pub fn run_refs(server: &ServerArgs, json: bool) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("refs");
    let app = runner.app(server)?;

    let refs = runner.block_on(app.index_pattern_refs())?;

    if json {
        println!("{}", to_json(&refs)?);
    } else {
        print!("{}", format_refs(&refs));
    }
    Ok(())
}

/// Load patterns and report what was resolved.
pub fn run_load(
    server: &ServerArgs,
    ids: Vec<String>,
    fallback: Vec<String>,
    json: bool,
) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("load");
    let app = runner.app(server)?;

    let loaded = runner.block_on(app.load(&ids, &fallback, &ConsoleEvents));
    if loaded.is_empty() {
        return Err(CliError::MissingPattern(ids.join(", ")));
    }

    if json {
        println!("{}", loaded_json(&loaded)?);
    } else {
        print!("{}", format_loaded(&ids, &loaded));
    }
    Ok(())
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CliError::InvalidArgument(format!("Failed to encode JSON: {}", e)))
}

/// JSON object of id to pattern, in id order.
fn loaded_json(loaded: &IndexPatternMap) -> Result<String, CliError> {
    let view: BTreeMap<&str, &IndexPattern> = loaded
        .iter()
        .map(|(id, pattern)| (id.as_str(), pattern.as_ref()))
        .collect();
    to_json(&view)
}

fn format_refs(refs: &[IndexPatternRef]) -> String {
    if refs.is_empty() {
        return "No data views found.\n".to_string();
    }

    let width = refs.iter().map(|r| r.id.len()).max().unwrap_or(0);
    refs.iter()
        .map(|r| format!("{:<width$}  {}\n", r.id, r.title, width = width))
        .collect()
}

fn format_loaded(requested: &[String], loaded: &IndexPatternMap) -> String {
    let mut out = String::new();
    for (id, pattern) in loaded {
        let marker = if requested.contains(id) { "" } else { " (fallback)" };
        out.push_str(&format!(
            "{} - {}{}: {} fields",
            id,
            pattern.title,
            marker,
            pattern.fields.len()
        ));
        if pattern.has_restrictions {
            out.push_str(", restricted");
        }
        if let Some(time_field) = &pattern.time_field_name {
            out.push_str(&format!(", time field {}", time_field));
        }
        out.push('\n');
    }
    for id in requested.iter().filter(|id| !loaded.contains_key(*id)) {
        out.push_str(&format!("{} - not loaded\n", id));
    }
    out
}
