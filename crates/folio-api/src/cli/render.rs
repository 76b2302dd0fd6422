//! Shared terminal rendering helpers.

use console::style;

use folio_types::autosave::{SaveStatus, SyncIndicator};

/// One-line sync indicator, e.g. `● all changes saved`.
pub fn sync_line(status: Option<&SaveStatus>) -> String {
    let Some(status) = status else {
        return format!("{}", style("○ not yet saved remotely").dim());
    };
    match status.indicator {
        SyncIndicator::Clean => format!("{} {}", style("●").green(), status.indicator),
        SyncIndicator::Dirty | SyncIndicator::Saving => {
            format!("{} {}", style("●").yellow(), status.indicator)
        }
        SyncIndicator::SavedLocally => format!("{} {}", style("●").red(), status.indicator),
    }
}

/// `2/5 Enrollment`.
pub fn section_label(index: usize, count: usize, title: &str) -> String {
    format!("{}/{} {}", index + 1, count, title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_label_is_one_based() {
        assert_eq!(section_label(0, 5, "Basic information"), "1/5 Basic information");
        assert_eq!(section_label(4, 5, "Declaration"), "5/5 Declaration");
    }

    #[test]
    fn test_sync_line_mentions_indicator() {
        let status = SaveStatus {
            indicator: SyncIndicator::SavedLocally,
            ..Default::default()
        };
        assert!(sync_line(Some(&status)).contains("saved locally, not synced"));
        assert!(sync_line(None).contains("not yet saved"));
    }
}
