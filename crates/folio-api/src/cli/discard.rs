//! `folio discard`: drop local unsynced edits.

use anyhow::Result;
use console::style;
use dialoguer::Confirm;

use crate::state::AppState;

pub async fn discard(state: &AppState, yes: bool, json: bool) -> Result<()> {
    if !yes && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Discard edits for '{}' that the server has not confirmed?",
                style(&state.owner).bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let (mut draft, _) = state.open_draft().await?;
    let result = draft.discard().await;
    draft.close().await;
    result?;

    if json {
        println!("{}", serde_json::json!({"discarded": true}));
    } else {
        println!("  {} Local edits discarded", style("✓").green().bold());
    }
    Ok(())
}
