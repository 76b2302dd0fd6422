//! `folio edit`: set fields of a section.

use anyhow::Result;
use console::style;
use tracing::warn;

use folio_core::draft::LoadOutcome;

use super::render::{section_label, sync_line};
use crate::state::{AppState, ConcreteController};

/// Apply `field=value` assignments to one section, then give the
/// background save a chance to run before the sitting ends. A confirmed
/// section is re-confirmed instead, so the edit passes validation.
pub async fn edit(state: &AppState, section: &str, fields: &[String], json: bool) -> Result<()> {
    let index = super::resolve_section(&state.registry, section)?;
    let assignments = fields
        .iter()
        .map(|raw| super::parse_assignment(raw))
        .collect::<Result<Vec<_>>>()?;

    let (mut draft, outcome) = state.open_draft().await?;
    let result = apply(&mut draft, index, &assignments).await;
    let summary = draft.summary();
    draft.close().await;
    let reconfirmed = result?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "section": index,
                "fields": assignments.iter().map(|(f, _)| *f).collect::<Vec<_>>(),
                "restored_local_edits": restored(&outcome),
                "reconfirmed": reconfirmed,
                "sync": summary.sync,
            })
        );
        return Ok(());
    }

    let title = summary
        .sections
        .get(index)
        .map(|s| s.title.as_str())
        .unwrap_or_default();
    if restored(&outcome) {
        println!(
            "  {} Restored unsynced edits from the local cache",
            style("i").blue().bold()
        );
    }
    println!(
        "  {} Updated {} field{} in {} ({}% filled)",
        style("✓").green().bold(),
        assignments.len(),
        if assignments.len() == 1 { "" } else { "s" },
        style(section_label(index, summary.sections.len(), title)).cyan(),
        summary
            .sections
            .get(index)
            .map_or(0, |s| s.completion_percent)
    );
    if reconfirmed {
        println!("  {} Section re-confirmed", style("✓").green().bold());
    }
    println!("  {}", sync_line(summary.sync.as_ref()));
    Ok(())
}

/// Returns whether the section was re-confirmed.
async fn apply(draft: &mut ConcreteController, index: usize, assignments: &[(&str, &str)]) -> Result<bool> {
    draft.go_to(index)?;
    for (field, value) in assignments {
        draft.set_field(index, field, value)?;
    }
    if draft.progress().is_complete(index) {
        draft.save_section().await?;
        return Ok(true);
    }
    if let Err(err) = draft.save_now().await {
        warn!(error = %err, "background save failed; edits kept locally");
    }
    Ok(false)
}

fn restored(outcome: &LoadOutcome) -> bool {
    match outcome {
        LoadOutcome::NoDraft { restored_local_edits } => *restored_local_edits,
        LoadOutcome::Resumed { restored_local_edits, .. } => *restored_local_edits,
        LoadOutcome::ViewingSubmitted { .. } => false,
    }
}
