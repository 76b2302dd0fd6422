//! `folio save` and `folio finalize`.

use anyhow::Result;
use console::style;

use folio_core::draft::SaveOutcome;

use super::render::section_label;
use crate::state::AppState;

/// Confirm the current section with the server and move forward.
pub async fn save(state: &AppState, json: bool) -> Result<()> {
    let (mut draft, _) = state.open_draft().await?;
    let saved = draft.current_section();
    let outcome = draft.save_section().await;
    draft.close().await;
    let outcome = outcome?;

    if json {
        let body = match &outcome {
            SaveOutcome::Advanced { next_section } => {
                serde_json::json!({"saved": saved, "outcome": "advanced", "next_section": next_section})
            }
            SaveOutcome::Incomplete { missing } => {
                serde_json::json!({"saved": saved, "outcome": "incomplete", "missing": missing})
            }
            SaveOutcome::Submitted => serde_json::json!({"saved": saved, "outcome": "submitted"}),
        };
        println!("{body}");
        return Ok(());
    }

    let count = state.registry.len();
    let title = |index: usize| {
        state
            .registry
            .get(index)
            .map(|def| def.title.clone())
            .unwrap_or_default()
    };
    println!(
        "  {} Saved {}",
        style("✓").green().bold(),
        style(section_label(saved, count, &title(saved))).cyan()
    );
    match outcome {
        SaveOutcome::Advanced { next_section } => {
            println!("  Next: {}", section_label(next_section, count, &title(next_section)));
        }
        SaveOutcome::Incomplete { missing } => {
            let numbers: Vec<String> = missing.iter().map(|i| (i + 1).to_string()).collect();
            println!(
                "  {} Sections {} still need to be saved before submitting",
                style("!").yellow().bold(),
                numbers.join(", ")
            );
        }
        SaveOutcome::Submitted => {
            println!("  {} Report submitted", style("✓").green().bold());
        }
    }
    Ok(())
}

/// Submit the report, or retry a submission that failed.
pub async fn finalize(state: &AppState, json: bool) -> Result<()> {
    let (mut draft, _) = state.open_draft().await?;
    let result = draft.finalize().await;
    draft.close().await;
    result?;

    if json {
        println!("{}", serde_json::json!({"submitted": true}));
    } else {
        println!("  {} Report submitted", style("✓").green().bold());
    }
    Ok(())
}
