//! Comparison operations exposed to the CLI.
//!
//! Each comparator is a pure function from environments to a report
//! struct; rendering and has-differences handling belong to the caller.
//! Covered surfaces:
//! - table schemas (canonical signatures)
//! - role permissions
//! - service endpoints
//! - custom API keys

mod api_keys;
mod endpoints;
mod permissions;
mod tables;

pub use api_keys::{ApiKeyReport, ApiKeyRow, compare_api_keys};
pub use endpoints::{EndpointReport, EndpointRow, compare_endpoints};
pub use permissions::{PermissionReport, PermissionRow, compare_role_permissions};
pub use tables::{CompareOptions, compare_tables};
