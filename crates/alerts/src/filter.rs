//! Location/program scoping of product collections.

use serde::{Deserialize, Serialize};

use crate::product::Product;

/// Optional location and program constraints of a configuration.
///
/// An absent or blank field is a wildcard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_id: Option<String>,
}

impl ScopeFilter {
    /// True when no field constrains anything.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.constraints().iter().all(|(_, wanted)| wanted.is_none())
    }

    fn constraints(&self) -> [(fn(&Product) -> &str, Option<&str>); 5] {
        [
            (|p| p.plant_id.as_str(), populated(self.plant_id.as_ref())),
            (|p| p.line_id.as_str(), populated(self.line_id.as_ref())),
            (|p| p.station_id.as_str(), populated(self.station_id.as_ref())),
            (|p| p.program_id.as_str(), populated(self.program_id.as_ref())),
            (|p| p.part_id.as_str(), populated(self.part_id.as_ref())),
        ]
    }

    /// Whether `product` satisfies every populated constraint.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.constraints()
            .iter()
            .all(|(get, wanted)| wanted.map_or(true, |w| get(product) == w))
    }
}

fn populated(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.trim().is_empty())
}

/// Products retained by `scope`, in input order.
#[must_use]
pub fn filter_products<'a>(products: &'a [Product], scope: &ScopeFilter) -> Vec<&'a Product> {
    products.iter().filter(|p| scope.matches(p)).collect()
}
