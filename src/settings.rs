//! Generation Settings
//!
//! Policy flags consulted throughout mapping. Loaded once per run from JSON
//! (kebab-case keys, every field optional) and shared read-only by all mappers.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::mapper::{MapperError, Result};

/// Which sequence type array schemas map to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SequenceContainer {
    #[default]
    List,
    Iterable,
}

/// Management-plane (fluent) generation mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FluentMode {
    #[default]
    None,
    Lite,
    Premium,
}

/// Which synchronous methods are generated next to the async ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncMethods {
    None,
    #[default]
    Essential,
    All,
}

/// How union (`or`) schemas are represented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnionPolicy {
    /// Synthesize one tagged-variant type per union schema.
    #[default]
    Variant,
    /// Collapse every union to the opaque `BinaryData` type.
    BinaryData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Settings {
    /// Root package of the generated library
    pub namespace: String,
    pub models_subpackage: String,
    pub implementation_subpackage: String,
    /// Model and enum names generated into the custom-types package
    pub custom_types: HashSet<String>,
    pub custom_types_subpackage: String,
    pub sequence_container: SequenceContainer,
    /// Data-plane (protocol) client; keeps empty models and adds service versions
    pub data_plane: bool,
    pub fluent: FluentMode,
    pub sync_methods: SyncMethods,
    pub generate_client_as_impl: bool,
    pub generate_client_interfaces: bool,
    pub required_parameter_client_methods: bool,
    pub generic_response_types: bool,
    pub disable_typed_headers_methods: bool,
    pub union_policy: UnionPolicy,
    pub branded: bool,
    pub client_builder_disabled: bool,
    /// Overrides the service client name taken from the code model
    pub service_name: Option<String>,
    pub generate_tests: bool,
    pub generate_samples: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            models_subpackage: "models".to_string(),
            implementation_subpackage: "implementation".to_string(),
            custom_types: HashSet::new(),
            custom_types_subpackage: String::new(),
            sequence_container: SequenceContainer::List,
            data_plane: false,
            fluent: FluentMode::None,
            sync_methods: SyncMethods::Essential,
            generate_client_as_impl: false,
            generate_client_interfaces: false,
            required_parameter_client_methods: false,
            generic_response_types: false,
            disable_typed_headers_methods: false,
            union_policy: UnionPolicy::Variant,
            branded: true,
            client_builder_disabled: false,
            service_name: None,
            generate_tests: false,
            generate_samples: false,
        }
    }
}

impl Settings {
    /// Settings rooted at `namespace`, everything else default.
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    pub fn from_json(source: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings no run can succeed with.
    pub fn validate(&self) -> Result<()> {
        if self.namespace.trim().is_empty() {
            return Err(MapperError::MissingSetting {
                setting: "namespace".to_string(),
                context: "settings".to_string(),
            });
        }
        Ok(())
    }

    pub fn is_fluent(&self) -> bool {
        self.fluent != FluentMode::None
    }

    pub fn is_fluent_premium(&self) -> bool {
        self.fluent == FluentMode::Premium
    }

    pub fn is_custom_type(&self, name: &str) -> bool {
        self.custom_types.contains(name)
    }

    /// Join the root namespace with non-empty subpackages.
    pub fn package(&self, subpackages: &[&str]) -> String {
        let mut package = self.namespace.clone();
        for sub in subpackages.iter().filter(|s| !s.is_empty()) {
            if !package.is_empty() {
                package.push('.');
            }
            package.push_str(sub);
        }
        package
    }

    pub fn model_package(&self) -> String {
        self.package(&[&self.models_subpackage])
    }

    pub fn implementation_package(&self) -> String {
        self.package(&[&self.implementation_subpackage])
    }

    /// Package for a model or enum named `name`, honoring custom types.
    pub fn type_package(&self, name: &str) -> String {
        if self.is_custom_type(name) {
            self.package(&[&self.custom_types_subpackage])
        } else {
            self.model_package()
        }
    }

    pub fn generate_sync_methods(&self) -> bool {
        self.sync_methods != SyncMethods::None
    }
}
