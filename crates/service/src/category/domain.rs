use serde::{Deserialize, Serialize};

fn default_active() -> bool { true }

/// Create input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl NewCategory {
    pub fn new(name: impl Into<String>, description: Option<&str>) -> Self {
        Self { name: name.into(), description: description.map(str::to_string), active: true }
    }
}

/// Replacement values for the mutable fields of an existing category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryChanges {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}
