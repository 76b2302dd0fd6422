//! `folio next`, `folio prev` and `folio goto`.

use anyhow::Result;
use console::style;

use super::render::section_label;
use crate::state::{AppState, ConcreteController};

#[derive(Debug, Clone, Copy)]
pub enum Move<'a> {
    Next,
    Prev,
    To(&'a str),
}

/// Change the current section. Never touches the server.
pub async fn navigate(state: &AppState, movement: Move<'_>, json: bool) -> Result<()> {
    let target = match movement {
        Move::To(raw) => Some(super::resolve_section(&state.registry, raw)?),
        _ => None,
    };

    let (mut draft, _) = state.open_draft().await?;
    let result = step(&mut draft, movement, target);
    draft.close().await;
    let current = result?;

    if json {
        println!("{}", serde_json::json!({"current_section": current}));
        return Ok(());
    }
    let title = state
        .registry
        .get(current)
        .map(|def| def.title.as_str())
        .unwrap_or_default();
    println!(
        "  {} {}",
        style("▶").cyan(),
        section_label(current, state.registry.len(), title)
    );
    Ok(())
}

fn step(draft: &mut ConcreteController, movement: Move<'_>, target: Option<usize>) -> Result<usize> {
    let current = match (movement, target) {
        (Move::Next, _) => draft.next_section()?,
        (Move::Prev, _) => draft.prev_section()?,
        (Move::To(_), Some(index)) => draft.go_to(index)?,
        (Move::To(raw), None) => anyhow::bail!("unknown section '{raw}'"),
    };
    Ok(current)
}
