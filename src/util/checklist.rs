//! Checklist extraction from issue bodies.
//!
//! Recognizes markdown task-list markers line by line:
//! - `- [ ] text` (also `* [ ]`) — unchecked, extracted
//! - `- [x] text` / `- [X] text` — checked, recognized but excluded
//!
//! Non-matching lines are ignored; a body with no markers yields an empty
//! result, not an error. Output order matches first appearance in the body.

use once_cell::sync::Lazy;
use regex::Regex;

static TASK_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[-*]\s+\[( |x|X)\]\s*(.*)$").unwrap());

/// Extract unchecked checklist item titles from free text.
#[must_use]
pub fn extract_tasks(body: &str) -> Vec<String> {
    body.lines()
        .filter_map(|line| {
            let caps = TASK_LINE.captures(line)?;
            if &caps[1] != " " {
                return None;
            }
            let title = caps[2].trim();
            if title.is_empty() {
                return None;
            }
            Some(title.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_unchecked_skips_checked() {
        let body = "- [ ] A\n- [x] B\n- [ ] C";
        assert_eq!(extract_tasks(body), vec!["A", "C"]);
    }

    #[test]
    fn test_uppercase_checked_marker_excluded() {
        let body = "- [X] done\n- [ ] todo";
        assert_eq!(extract_tasks(body), vec!["todo"]);
    }

    #[test]
    fn test_no_markers_yields_empty() {
        let body = "Just plain text without any items.\nAnother line.";
        assert!(extract_tasks(body).is_empty());
        assert!(extract_tasks("").is_empty());
    }

    #[test]
    fn test_ignores_non_matching_lines() {
        let body = "# Tasks\n\nintro text\n- [ ] First sub-task\nnot a task\n- [ ] Second sub-task";
        assert_eq!(extract_tasks(body), vec!["First sub-task", "Second sub-task"]);
    }

    #[test]
    fn test_asterisk_marker_and_indent() {
        let body = "* [ ] starred\n  - [ ] indented";
        assert_eq!(extract_tasks(body), vec!["starred", "indented"]);
    }

    #[test]
    fn test_trims_titles_and_drops_empty() {
        let body = "- [ ]    padded   \n- [ ] ";
        assert_eq!(extract_tasks(body), vec!["padded"]);
    }

    #[test]
    fn test_order_matches_first_appearance() {
        let body = "- [ ] one\ntext\n- [x] skipped\n- [ ] two\n- [ ] three";
        assert_eq!(extract_tasks(body), vec!["one", "two", "three"]);
    }
}
