//! `folio show`: section overview table and field listing.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use folio_core::draft::DraftSummary;
use folio_types::section::SectionData;

use super::render::{section_label, sync_line};
use crate::state::AppState;

pub async fn show(state: &AppState, section: Option<&str>, json: bool) -> Result<()> {
    let (draft, _) = state.open_draft().await?;
    let summary = draft.summary();
    let detail = section
        .map(|raw| -> Result<(usize, SectionData)> {
            let index = super::resolve_section(&state.registry, raw)?;
            Ok((index, draft.section_data(index)?))
        })
        .transpose();
    draft.close().await;
    let detail = detail?;

    if json {
        let output = serde_json::json!({
            "summary": summary,
            "section": detail.as_ref().map(|(index, data)| serde_json::json!({
                "index": index,
                "data": data,
            })),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_summary(&summary);
    if let Some((index, data)) = detail {
        let title = state
            .registry
            .get(index)
            .map(|def| def.title.as_str())
            .unwrap_or_default();
        print_fields(&section_label(index, summary.sections.len(), title), &data)?;
    }
    Ok(())
}

fn print_summary(summary: &DraftSummary) {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("Section").fg(Color::White),
        Cell::new("Filled").fg(Color::White),
        Cell::new("Confirmed").fg(Color::White),
    ]);

    for section in &summary.sections {
        let marker = if section.index == summary.current_section { "▶ " } else { "  " };
        let confirmed = if section.confirmed {
            Cell::new("✓").fg(Color::Green)
        } else {
            Cell::new("·").fg(Color::DarkGrey)
        };
        table.add_row(vec![
            Cell::new(format!("{marker}{}", section.index + 1)),
            Cell::new(&section.title).fg(Color::Cyan),
            Cell::new(format!("{}%", section.completion_percent)),
            confirmed,
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} overall  {}  {}",
        style(format!("{}%", summary.overall_progress)).bold(),
        style(summary.status).dim(),
        sync_line(summary.sync.as_ref())
    );
    println!();
}

fn print_fields(label: &str, data: &SectionData) -> Result<()> {
    println!("  {}", style(label).bold());
    let value = serde_json::to_value(data)?;
    if let Some(fields) = value.as_object() {
        for (name, value) in fields.iter().filter(|(name, _)| name.as_str() != "section") {
            let shown = match value {
                serde_json::Value::Null => style("-".to_string()).dim().to_string(),
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            println!("    {:<24} {}", name, shown);
        }
    }
    println!();
    Ok(())
}
