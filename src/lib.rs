//! `pmu` - project board and sub-issue management for GitHub Projects v2.
//!
//! The crate is a thin stateless layer over the remote GraphQL API:
//! - [`api`] - typed client, transport seam, pagination, field values
//! - [`hierarchy`] - parent/child link operations and traversal
//! - [`bulk`] - plan/apply bulk field updates
//! - [`config`] - `.pmu.yml` discovery and alias tables
//! - [`cli`] - command definitions and implementations

pub mod api;
pub mod bulk;
pub mod cli;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod logging;
pub mod model;
pub mod util;

pub use error::{PmuError, Result};
