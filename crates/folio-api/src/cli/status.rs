//! `folio status`: the resume contract.

use anyhow::Result;
use console::style;

use folio_types::draft::DraftStatus;

use crate::state::AppState;

/// Report whether the owner has a draft and which section it resumes at.
pub async fn status(state: &AppState, json: bool) -> Result<()> {
    let target = state.resume_target().await?;

    if json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "owner": state.owner.as_str(),
            "status": target.status,
            "report_key": target.report_key,
            "resume_section": target.section,
            "unsynced_local_edits": target.unsynced_local_edits,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let count = state.registry.len();
    println!();
    println!(
        "  {} folio v{}  {}",
        style("▤").bold(),
        env!("CARGO_PKG_VERSION"),
        style(format!("owner: {}", state.owner)).dim()
    );
    println!();

    match target.status {
        DraftStatus::None => {
            println!("  No report started yet.");
            println!(
                "  Start with: {}",
                style("folio edit 1 organisation_name=\"...\"").yellow()
            );
        }
        DraftStatus::InProgress => {
            let section = target.section.unwrap_or(0);
            let title = state
                .registry
                .get(section)
                .map(|def| def.title.as_str())
                .unwrap_or_default();
            println!("  {} Report in progress", style("●").yellow());
            println!(
                "  Resumes at section {}",
                style(super::render::section_label(section, count, title)).cyan()
            );
        }
        DraftStatus::Submitted => {
            println!("  {} Report submitted (read-only)", style("✓").green().bold());
        }
    }
    if target.unsynced_local_edits {
        println!(
            "  {} Local edits not yet confirmed by the server",
            style("!").yellow().bold()
        );
    }
    println!();
    Ok(())
}
