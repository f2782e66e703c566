//! Shared utilities: issue reference parsing and checklist extraction.

pub mod checklist;
pub mod issue_ref;
