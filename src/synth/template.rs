//! The synthesized document shape.
//!
//! These types only describe structure. They implement `Serialize` with the
//! conventional PascalCase section and field names and skip empty sections;
//! choosing a text encoding (JSON, YAML, ...) is up to the driver.

use indexmap::IndexMap;
use serde::Serialize;

use crate::tree::RemovalPolicy;

/// One stack's template.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    /// Parameters keyed by logical ID, in tree order.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, ParameterDefinition>,

    /// Resources keyed by logical ID, in tree order.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub resources: IndexMap<String, ResourceDefinition>,

    /// Outputs keyed by name, in registration order.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub outputs: IndexMap<String, OutputDefinition>,
}

impl Template {
    /// Logical IDs of all resources.
    pub fn resource_ids(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    /// Resources of the given kind.
    pub fn resources_of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a ResourceDefinition)> {
        self.resources
            .iter()
            .filter(move |(_, r)| r.resource_type == resource_type)
            .map(|(k, r)| (k.as_str(), r))
    }
}

/// A resource entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceDefinition {
    /// The kind tag.
    #[serde(rename = "Type")]
    pub resource_type: String,

    /// Resolved properties in insertion order.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, serde_json::Value>,

    /// Logical IDs of prerequisites, explicit first, then implicit.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    /// What to do with the physical resource on removal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<RemovalPolicy>,

    /// What to do with the old physical resource on replacement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<RemovalPolicy>,
}

/// A parameter entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParameterDefinition {
    /// Parameter type.
    #[serde(rename = "Type")]
    pub parameter_type: String,

    /// Resolved default value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,

    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Masked in consoles and logs.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub no_echo: bool,
}

/// An output entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutputDefinition {
    /// Resolved value.
    pub value: serde_json::Value,

    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Export declaration, for exported values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportDefinition>,
}

/// The `Export` block of an output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExportDefinition {
    /// The export name.
    pub name: String,
}

/// Templates of every stack, in stack dependency order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Assembly {
    /// Templates keyed by stack name.
    pub templates: IndexMap<String, Template>,
}

impl Assembly {
    /// The template of the named stack.
    pub fn template(&self, stack_name: &str) -> Option<&Template> {
        self.templates.get(stack_name)
    }

    /// Stack names in dependency order.
    pub fn stack_names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}
