//! Deterministic artifact file names and storage keys.
//!
//! `{address}_{owner-last-name}_{identifier}_v{version}.pdf`, where the
//! address is reduced to `[A-Za-z0-9_]` and cut to 50 characters. Surname
//! and identifier keep their characters apart from path separators.

use crate::models::{populated, CertificationType, ProjectRecord};

pub const MAX_ADDRESS_CHARS: usize = 50;
pub const FILE_EXTENSION: &str = ".pdf";
pub const CONTENT_TYPE: &str = "application/pdf";
const UNKNOWN: &str = "Unknown";

/// Inputs to a file name, already resolved from project and extraction data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameParts<'a> {
    pub address: Option<&'a str>,
    pub owner_name: Option<&'a str>,
    pub identifier: &'a str,
}

impl<'a> NameParts<'a> {
    /// Identifier preference: customer number, project number, project id.
    pub fn for_project(project: &'a ProjectRecord) -> Self {
        let identifier = populated(&project.customer_number)
            .or_else(|| populated(&project.project_number))
            .unwrap_or(project.id.as_str());
        Self {
            address: populated(&project.address),
            owner_name: populated(&project.owner_name),
            identifier,
        }
    }

    /// Fill a missing address or owner from another source.
    pub fn or_else(self, address: Option<&'a str>, owner_name: Option<&'a str>) -> Self {
        Self {
            address: self.address.or(address),
            owner_name: self.owner_name.or(owner_name),
            identifier: self.identifier,
        }
    }
}

/// Replace every non-alphanumeric character with `_`.
pub fn sanitize_file_component(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Replace path separators so a name part cannot add key segments.
/// Empty values become "Unknown".
pub fn key_safe_component(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        return UNKNOWN.to_string();
    }
    value.replace(['/', '\\'], "_")
}

/// Last whitespace-delimited token of the owner's name, or "Unknown".
pub fn owner_surname(owner_name: Option<&str>) -> &str {
    owner_name
        .and_then(|name| name.split_whitespace().last())
        .unwrap_or(UNKNOWN)
}

pub fn certificate_file_name(parts: &NameParts<'_>, version: u32) -> String {
    let address: String = sanitize_file_component(parts.address.unwrap_or(UNKNOWN))
        .chars()
        .take(MAX_ADDRESS_CHARS)
        .collect();
    format!(
        "{}_{}_{}_v{}{}",
        address,
        key_safe_component(owner_surname(parts.owner_name)),
        key_safe_component(parts.identifier),
        version,
        FILE_EXTENSION
    )
}

/// `{prefix}/{certification_type}/{file_name}`
pub fn storage_key(prefix: &str, certification_type: CertificationType, file_name: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("{}/{}", certification_type.as_str(), file_name)
    } else {
        format!("{}/{}/{}", prefix, certification_type.as_str(), file_name)
    }
}
