use serde::{Deserialize, Serialize};

/// Catalog entry for a product that extraction can detect on plans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    pub manufacturer: Option<String>,
    pub approval_number: Option<String>,
}

impl ProductRecord {
    /// "Name (Manufacturer, approval)" with absent parts omitted.
    pub fn display_name(&self) -> String {
        let extras: Vec<&str> = [self.manufacturer.as_deref(), self.approval_number.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect();
        if extras.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, extras.join(", "))
        }
    }
}
