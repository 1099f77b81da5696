//! `existence` command.

use fieldscope::app::FieldscopeApp;
use fieldscope::existence::{DateRange, ExistenceState};
use fieldscope::index_pattern::IndexPattern;

use super::common::{ConsoleEvents, ServerArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the existence command.
pub struct ExistenceArgs {
    pub id: String,
    pub with: Vec<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub query: Option<String>,
    pub json: bool,
}

/// Run the existence command.
pub fn run(server: &ServerArgs, args: ExistenceArgs) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("existence");

    let mut app_config = runner.app_config(server);
    app_config.date_range = DateRange::new(
        args.from.unwrap_or(app_config.date_range.from_date),
        args.to.unwrap_or(app_config.date_range.to_date),
    );
    if let Some(query) = &args.query {
        app_config = app_config.with_dsl_query(parse_query(query)?);
    }
    let app = FieldscopeApp::new(app_config)?;

    let mut ids = vec![args.id.clone()];
    ids.extend(args.with.iter().filter(|id| **id != args.id).cloned());

    let events = ConsoleEvents;
    let state = runner.block_on(async {
        let loaded = app.load(&ids, &[], &events).await;
        if !loaded.contains_key(&args.id) {
            return Err(CliError::MissingPattern(args.id.clone()));
        }
        Ok(app.sync_existence(&args.id, &events).await?)
    })?;

    if args.json {
        let json = serde_json::json!({
            "existingFields": state.existing_fields,
            "existenceFetchFailed": state.existence_fetch_failed,
            "existenceFetchTimeout": state.existence_fetch_timeout,
        });
        println!("{}", json);
        return Ok(());
    }

    let patterns = app.state().index_patterns();
    for id in &ids {
        if let Some(pattern) = patterns.get(id) {
            print!("{}", format_existence(pattern, &state));
        }
    }
    Ok(())
}

fn parse_query(query: &str) -> Result<serde_json::Value, CliError> {
    let value: serde_json::Value = serde_json::from_str(query)
        .map_err(|e| CliError::InvalidArgument(format!("--query is not valid JSON: {}", e)))?;
    if !value.is_object() {
        return Err(CliError::InvalidArgument(
            "--query must be a JSON object".to_string(),
        ));
    }
    Ok(value)
}

fn format_existence(pattern: &IndexPattern, state: &ExistenceState) -> String {
    let mut out = format!("{} ({})\n", pattern.title, pattern.id);

    if state.existence_fetch_timeout {
        out.push_str("  Field existence timed out; showing all fields.\n");
    } else if state.existence_fetch_failed {
        out.push_str("  Field existence could not be fetched; showing all fields.\n");
    }

    let mut with_data = 0;
    for field in pattern.fields.iter().filter(|f| !f.is_document()) {
        let exists = state.field_exists(&pattern.id, &field.name);
        if exists {
            with_data += 1;
        }
        out.push_str(&format!(
            "  [{}] {} ({})\n",
            if exists { "x" } else { " " },
            field.display_name,
            field.field_type
        ));
    }

    if with_data == 0 {
        out.push_str("  No fields have data in the selected range.\n");
    }
    out
}
