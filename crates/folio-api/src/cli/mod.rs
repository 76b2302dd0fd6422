//! CLI command definitions for the `folio` binary.
//!
//! Every command is one sitting: load the owner's draft, run one engine
//! operation, then close the controller so pending saves are written.

pub mod discard;
pub mod edit;
pub mod navigate;
pub mod render;
pub mod save;
pub mod show;
pub mod status;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use clap_complete::Shell;

use folio_core::section::registry::SectionRegistry;

/// Fill in the annual school report, one section at a time.
#[derive(Parser)]
#[command(name = "folio", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Whose draft to work on. Defaults to the login name.
    #[arg(long, env = "FOLIO_OWNER", global = true)]
    pub owner: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show whether a draft exists and where it would resume.
    Status,

    /// Show every section with its completion and confirmation.
    #[command(alias = "ls")]
    Show {
        /// Also print the fields of this section (number or name).
        section: Option<String>,
    },

    /// Set fields of a section. Changes are auto-saved in the background;
    /// a confirmed section is validated and re-confirmed.
    Edit {
        /// Section number (1-based) or name, e.g. `2` or `enrollment`.
        section: String,

        /// Assignments like `total_enrolled=10`. An empty value clears the field.
        #[arg(required = true, value_name = "FIELD=VALUE")]
        fields: Vec<String>,
    },

    /// Confirm the current section and move on. Submits after the last one.
    Save,

    /// Move to the next section.
    Next,

    /// Move to the previous section.
    Prev,

    /// Jump to a section.
    Goto {
        /// Section number (1-based) or name.
        section: String,
    },

    /// Submit the report. Retries a finalization that failed earlier.
    Finalize,

    /// Throw away local edits the remote store has not confirmed.
    Discard {
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

/// Resolve a 1-based section number or a section kind name to an index.
pub fn resolve_section(registry: &SectionRegistry, raw: &str) -> Result<usize> {
    if let Ok(number) = raw.parse::<usize>() {
        if number == 0 || number > registry.len() {
            bail!("section {number} does not exist (1-{})", registry.len());
        }
        return Ok(number - 1);
    }
    let wanted = raw.trim().to_ascii_lowercase().replace('-', "_");
    registry
        .iter()
        .find(|(_, def)| def.kind.as_str() == wanted)
        .map(|(index, _)| index)
        .ok_or_else(|| anyhow::anyhow!("unknown section '{raw}'"))
}

/// Split `field=value`.
pub fn parse_assignment(raw: &str) -> Result<(&str, &str)> {
    match raw.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => Ok((field.trim(), value)),
        _ => bail!("expected FIELD=VALUE, got '{raw}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(parse_assignment("total_enrolled=10").unwrap(), ("total_enrolled", "10"));
        assert_eq!(parse_assignment("notes=").unwrap(), ("notes", ""));
        assert_eq!(parse_assignment("a=b=c").unwrap(), ("a", "b=c"));
        assert!(parse_assignment("=10").is_err());
        assert!(parse_assignment("total_enrolled").is_err());
    }

    #[test]
    fn test_cli_parses_edit() {
        let cli = Cli::try_parse_from(["folio", "--owner", "alice", "edit", "2", "total_enrolled=10"]).unwrap();
        assert_eq!(cli.owner.as_deref(), Some("alice"));
        match cli.command {
            Commands::Edit { section, fields } => {
                assert_eq!(section, "2");
                assert_eq!(fields, vec!["total_enrolled=10".to_string()]);
            }
            _ => panic!("expected edit"),
        }
    }

    #[test]
    fn test_edit_requires_assignments() {
        assert!(Cli::try_parse_from(["folio", "edit", "2"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }
}
