//! Code Model
//!
//! Language-agnostic input IR: schemas, operations, parameters and responses.
//! Schemas live in an arena on [`CodeModel`] and refer to each other through
//! [`SchemaId`] handles, so cyclic graphs (self-referential and mutually
//! recursive objects) are plain data. A handle is the schema's identity.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::mapper::{MapperError, Result};

/// Handle of a schema in [`CodeModel::schemas`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaId(pub usize);

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Root of a code model document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CodeModel {
    pub name: String,
    pub description: Option<String>,
    pub schemas: Vec<Schema>,
    pub operation_groups: Vec<OperationGroup>,
    /// Service API versions, oldest first
    pub api_versions: Vec<String>,
    pub security: Vec<SecurityScheme>,
}

impl CodeModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn from_json(source: &str) -> Result<Self> {
        let model: CodeModel = serde_json::from_str(source)?;
        model.check_references()?;
        Ok(model)
    }

    /// Resolve a handle.
    pub fn schema(&self, id: SchemaId) -> Result<&Schema> {
        self.schemas
            .get(id.0)
            .ok_or(MapperError::DanglingReference { id })
    }

    /// Append a schema and return its handle.
    pub fn push_schema(&mut self, schema: Schema) -> SchemaId {
        self.schemas.push(schema);
        SchemaId(self.schemas.len() - 1)
    }

    /// Replace the schema behind `id`; used to close cycles while building graphs.
    pub fn set_schema(&mut self, id: SchemaId, schema: Schema) -> Result<()> {
        let slot = self
            .schemas
            .get_mut(id.0)
            .ok_or(MapperError::DanglingReference { id })?;
        *slot = schema;
        Ok(())
    }

    pub fn schema_ids(&self) -> impl Iterator<Item = SchemaId> {
        (0..self.schemas.len()).map(SchemaId)
    }

    /// All object schemas with their handles.
    pub fn objects(&self) -> impl Iterator<Item = (SchemaId, &ObjectSchema)> {
        self.schemas.iter().enumerate().filter_map(|(i, s)| match &s.kind {
            SchemaKind::Object(o) => Some((SchemaId(i), o)),
            _ => None,
        })
    }

    pub fn choices(&self) -> impl Iterator<Item = SchemaId> + '_ {
        self.schemas.iter().enumerate().filter_map(|(i, s)| match &s.kind {
            SchemaKind::Choice(_) => Some(SchemaId(i)),
            _ => None,
        })
    }

    pub fn sealed_choices(&self) -> impl Iterator<Item = SchemaId> + '_ {
        self.schemas.iter().enumerate().filter_map(|(i, s)| match &s.kind {
            SchemaKind::SealedChoice(_) => Some(SchemaId(i)),
            _ => None,
        })
    }

    pub fn unions(&self) -> impl Iterator<Item = SchemaId> + '_ {
        self.schemas.iter().enumerate().filter_map(|(i, s)| match &s.kind {
            SchemaKind::Or(_) => Some(SchemaId(i)),
            _ => None,
        })
    }

    pub fn all_operations(&self) -> impl Iterator<Item = (&OperationGroup, &Operation)> {
        self.operation_groups
            .iter()
            .flat_map(|g| g.operations.iter().map(move |o| (g, o)))
    }

    /// Every handle stored anywhere in the model must resolve.
    pub fn check_references(&self) -> Result<()> {
        let check = |id: SchemaId| self.schema(id).map(|_| ());
        for schema in &self.schemas {
            for id in schema.kind.references() {
                check(id)?;
            }
        }
        for (_, operation) in self.all_operations() {
            for parameter in &operation.parameters {
                if let Some(id) = parameter.schema {
                    check(id)?;
                }
                if let Some(id) = parameter.owner_schema {
                    check(id)?;
                }
            }
            for response in operation.responses.iter().chain(&operation.exceptions) {
                if let Some(id) = response.schema {
                    check(id)?;
                }
                for header in &response.headers {
                    check(header.schema)?;
                }
            }
        }
        self.check_container_cycles()
    }

    /// Handles a schema resolves before it is cached. Objects and unions are
    /// cached (or guarded) first, so walks stop there.
    fn resolved_first(&self, id: SchemaId) -> Result<Vec<SchemaId>> {
        Ok(match &self.schema(id)?.kind {
            SchemaKind::Object(_) | SchemaKind::Or(_) => Vec::new(),
            other => other.references(),
        })
    }

    /// Reject cycles made only of arrays, dictionaries, constants and enums;
    /// mapping one would never terminate.
    fn check_container_cycles(&self) -> Result<()> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Unvisited,
            Active,
            Done,
        }

        let mut marks = vec![Mark::Unvisited; self.schemas.len()];
        for start in self.schema_ids() {
            if marks[start.0] != Mark::Unvisited {
                continue;
            }
            marks[start.0] = Mark::Active;
            let mut stack = vec![(start, self.resolved_first(start)?, 0usize)];
            while let Some((id, inner, next)) = stack.last_mut() {
                let Some(&child) = inner.get(*next) else {
                    marks[id.0] = Mark::Done;
                    stack.pop();
                    continue;
                };
                *next += 1;
                match marks[child.0] {
                    Mark::Active => {
                        return Err(MapperError::InvalidInput(format!(
                            "{} refers to itself without passing through an object or union",
                            self.schema(child)?.key()
                        )))
                    }
                    Mark::Unvisited => {
                        marks[child.0] = Mark::Active;
                        let inner = self.resolved_first(child)?;
                        stack.push((child, inner, 0));
                    }
                    Mark::Done => {}
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Schemas
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(flatten)]
    pub kind: SchemaKind,
}

impl Schema {
    pub fn new(name: impl Into<String>, kind: SchemaKind) -> Self {
        Self {
            name: name.into(),
            description: None,
            summary: None,
            kind,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Diagnostic key used in error messages.
    pub fn key(&self) -> String {
        format!("{} ({})", self.name, self.kind.kind_name())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SchemaKind {
    Primitive(PrimitiveSchema),
    Array(ArraySchema),
    Dictionary(DictionarySchema),
    Choice(ChoiceSchema),
    SealedChoice(ChoiceSchema),
    Object(ObjectSchema),
    Constant(ConstantSchema),
    #[default]
    Any,
    Binary,
    Or(OrSchema),
    /// Any tag this generator does not know.
    #[serde(other)]
    Unknown,
}

impl SchemaKind {
    pub fn kind_name(&self) -> &'static str {
        match self {
            SchemaKind::Primitive(_) => "primitive",
            SchemaKind::Array(_) => "array",
            SchemaKind::Dictionary(_) => "dictionary",
            SchemaKind::Choice(_) => "choice",
            SchemaKind::SealedChoice(_) => "sealed-choice",
            SchemaKind::Object(_) => "object",
            SchemaKind::Constant(_) => "constant",
            SchemaKind::Any => "any",
            SchemaKind::Binary => "binary",
            SchemaKind::Or(_) => "or",
            SchemaKind::Unknown => "unknown",
        }
    }

    /// Handles this schema refers to directly.
    pub fn references(&self) -> Vec<SchemaId> {
        match self {
            SchemaKind::Array(a) => vec![a.element],
            SchemaKind::Dictionary(d) => vec![d.element],
            SchemaKind::Choice(c) | SchemaKind::SealedChoice(c) => c.value_type.into_iter().collect(),
            SchemaKind::Object(o) => o
                .properties
                .iter()
                .map(|p| p.schema)
                .chain(o.parents.iter().copied())
                .chain(o.children.iter().copied())
                .collect(),
            SchemaKind::Constant(c) => vec![c.value_type],
            SchemaKind::Or(o) => o.any_of.clone(),
            SchemaKind::Primitive(_) | SchemaKind::Any | SchemaKind::Binary | SchemaKind::Unknown => {
                Vec::new()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrimitiveKind {
    Boolean,
    Int32,
    Int64,
    Float32,
    Float64,
    Decimal,
    String,
    Char,
    DateTime,
    Date,
    Time,
    Duration,
    Uuid,
    Url,
    UnixTime,
    ByteArray,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimitiveSchema {
    pub primitive: PrimitiveKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArraySchema {
    pub element: SchemaId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictionarySchema {
    pub element: SchemaId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ChoiceSchema {
    /// Underlying value type; string when absent
    pub value_type: Option<SchemaId>,
    pub choices: Vec<ChoiceValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceValue {
    pub value: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConstantSchema {
    pub value_type: SchemaId,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct OrSchema {
    pub any_of: Vec<SchemaId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Usage {
    Input,
    Output,
    Exception,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ObjectSchema {
    pub properties: Vec<Property>,
    /// Immediate parents; the first one is the class parent
    pub parents: Vec<SchemaId>,
    /// Immediate children
    pub children: Vec<SchemaId>,
    pub discriminator: Option<Discriminator>,
    pub discriminator_value: Option<String>,
    /// The object is really an enum in disguise
    pub enum_extension: bool,
    pub usage: Vec<Usage>,
}

impl ObjectSchema {
    pub fn is_plain(&self) -> bool {
        self.properties.is_empty()
            && self.discriminator.is_none()
            && self.parents.is_empty()
            && self.children.is_empty()
            && !self.enum_extension
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Discriminator {
    /// Serialized name of the discriminator property
    pub property: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    Create,
    Read,
    Update,
    Delete,
    Query,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Property {
    pub name: String,
    #[serde(default)]
    pub serialized_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub schema: SchemaId,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub visibility: Option<Vec<Visibility>>,
    #[serde(default)]
    pub client_default: Option<serde_json::Value>,
    #[serde(default)]
    pub is_discriminator: bool,
}

impl Property {
    pub fn new(name: impl Into<String>, schema: SchemaId) -> Self {
        Self {
            name: name.into(),
            serialized_name: None,
            description: None,
            schema,
            required: false,
            nullable: false,
            read_only: false,
            visibility: None,
            client_default: None,
            is_discriminator: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_visibility(mut self, visibility: &[Visibility]) -> Self {
        self.visibility = Some(visibility.to_vec());
        self
    }

    pub fn serialized_name(&self) -> &str {
        self.serialized_name.as_deref().unwrap_or(&self.name)
    }
}

// ============================================================================
// Operations
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationGroup {
    /// Empty for operations that live on the service client itself
    pub name: String,
    pub description: Option<String>,
    pub operations: Vec<Operation>,
}

impl OperationGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    #[default]
    Get,
    Put,
    Post,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Operation {
    pub name: String,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub method: HttpMethod,
    pub path: String,
    pub parameters: Vec<Parameter>,
    pub responses: Vec<Response>,
    pub exceptions: Vec<Response>,
    pub paging: Option<Paging>,
    pub long_running: bool,
    pub api_versions: Vec<String>,
}

impl Operation {
    pub fn new(name: impl Into<String>, method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            path: path.into(),
            ..Self::default()
        }
    }

    /// Summary and description merged the way doc comments want them.
    pub fn merged_description(&self) -> Option<String> {
        let summary = self.summary.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let description = self.description.as_deref().map(str::trim).filter(|s| !s.is_empty());
        match (summary, description) {
            (Some(s), Some(d)) if s == d => Some(s.to_string()),
            (Some(s), Some(d)) => Some(format!("{s}\n\n{d}")),
            (Some(s), None) => Some(s.to_string()),
            (None, Some(d)) => Some(d.to_string()),
            (None, None) => None,
        }
    }

    pub fn is_pageable(&self) -> bool {
        self.paging.is_some()
    }

    /// Schema of the first response carrying a body.
    pub fn response_schema(&self) -> Option<SchemaId> {
        self.responses.iter().find_map(|r| r.schema)
    }

    /// Status codes the service may answer with on success.
    pub fn expected_status_codes(&self) -> Vec<u16> {
        let mut codes: Vec<u16> = self
            .responses
            .iter()
            .flat_map(|r| r.status_codes.iter())
            .filter_map(|c| c.parse().ok())
            .collect();
        codes.sort_unstable();
        codes.dedup();
        codes
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Paging {
    /// Serialized name of the item collection in a page
    pub item_name: Option<String>,
    pub next_link_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Response {
    pub status_codes: Vec<String>,
    pub schema: Option<SchemaId>,
    pub headers: Vec<Header>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub schema: SchemaId,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParameterLocation {
    Path,
    #[default]
    Query,
    Header,
    Body,
    /// Part of the host template
    Uri,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImplementationLocation {
    #[default]
    Method,
    Client,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParameterOrigin {
    ApiVersion,
    Endpoint,
    ContentType,
    Accept,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Parameter {
    pub name: String,
    pub serialized_name: Option<String>,
    /// Set when the parameter was explicitly renamed upstream
    pub client_name: Option<String>,
    pub description: Option<String>,
    pub schema: Option<SchemaId>,
    pub required: bool,
    pub nullable: bool,
    pub location: ParameterLocation,
    pub implementation: ImplementationLocation,
    pub origin: Option<ParameterOrigin>,
    /// API versions the parameter exists in; absent for unversioned parameters
    pub added: Option<Vec<String>>,
    pub explode: bool,
    /// Schema the parameter was flattened out of
    pub owner_schema: Option<SchemaId>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, schema: SchemaId, location: ParameterLocation) -> Self {
        Self {
            name: name.into(),
            schema: Some(schema),
            location,
            ..Self::default()
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn on_client(mut self) -> Self {
        self.implementation = ImplementationLocation::Client;
        self
    }

    pub fn added_in(mut self, versions: &[&str]) -> Self {
        self.added = Some(versions.iter().map(|v| v.to_string()).collect());
        self
    }

    pub fn serialized_name(&self) -> &str {
        self.serialized_name.as_deref().unwrap_or(&self.name)
    }

    pub fn is_client(&self) -> bool {
        self.implementation == ImplementationLocation::Client
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SecurityScheme {
    #[serde(rename = "oauth2")]
    OAuth2 {
        #[serde(default)]
        scopes: Vec<String>,
    },
    #[serde(rename_all = "kebab-case")]
    Key { header_name: String },
}
