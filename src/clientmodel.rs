//! Client Model
//!
//! The resolved, target-ready object graph produced by mapping: types, models,
//! methods, method groups, service clients and builders. Everything here is
//! immutable once handed to the emission layer.
//!
//! Types are shared through `Arc` so that a schema maps to one instance for
//! the whole run; models are addressed by [`ModelId`] so cyclic model graphs
//! need no reference cycles.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ModelId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PrimitiveType {
    Void,
    Boolean,
    Byte,
    Int,
    Long,
    Float,
    Double,
    Char,
}

impl PrimitiveType {
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveType::Void => "void",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::Char => "char",
        }
    }

    /// The boxed class used when the value may be absent.
    pub fn boxed(&self) -> ClassType {
        let name = match self {
            PrimitiveType::Void => "Void",
            PrimitiveType::Boolean => "Boolean",
            PrimitiveType::Byte => "Byte",
            PrimitiveType::Int => "Integer",
            PrimitiveType::Long => "Long",
            PrimitiveType::Float => "Float",
            PrimitiveType::Double => "Double",
            PrimitiveType::Char => "Character",
        };
        ClassType::builtin("java.lang", name)
    }
}

/// A named class: either a library type or a generated model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ClassType {
    pub package: String,
    pub name: String,
    /// Set for generated models
    pub model: Option<ModelId>,
}

impl ClassType {
    pub fn builtin(package: &str, name: &str) -> Self {
        Self {
            package: package.to_string(),
            name: name.to_string(),
            model: None,
        }
    }

    pub fn model(package: impl Into<String>, name: impl Into<String>, id: ModelId) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            model: Some(id),
        }
    }

    pub fn full_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenericType {
    pub package: String,
    pub name: String,
    pub type_arguments: Vec<Arc<ClientType>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumValue {
    pub name: String,
    pub value: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumType {
    pub name: String,
    pub package: String,
    pub description: Option<String>,
    pub element_type: Arc<ClientType>,
    pub values: Vec<EnumValue>,
    /// Open enum: unknown values are accepted at runtime
    pub expandable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstantType {
    pub value_type: Arc<ClientType>,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnionVariant {
    pub name: String,
    pub client_type: Arc<ClientType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnionType {
    pub name: String,
    pub package: String,
    pub description: Option<String>,
    pub variants: Vec<UnionVariant>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ClientType {
    Primitive { primitive: PrimitiveType },
    Class(ClassType),
    List { element: Arc<ClientType> },
    Iterable { element: Arc<ClientType> },
    Map { value: Arc<ClientType> },
    Enum(EnumType),
    Constant(ConstantType),
    Generic(GenericType),
    Union(UnionType),
}

impl ClientType {
    pub fn primitive(primitive: PrimitiveType) -> Self {
        ClientType::Primitive { primitive }
    }

    pub fn void() -> Self {
        Self::primitive(PrimitiveType::Void)
    }

    pub fn boolean() -> Self {
        Self::primitive(PrimitiveType::Boolean)
    }

    pub fn string() -> Self {
        ClientType::Class(ClassType::builtin("java.lang", "String"))
    }

    /// The generic "object" type used for `any` and elided plain objects.
    pub fn object() -> Self {
        ClientType::Class(ClassType::builtin("java.lang", "Object"))
    }

    pub fn binary_data() -> Self {
        ClientType::Class(ClassType::builtin("com.azure.core.util", "BinaryData"))
    }

    pub fn class(package: &str, name: &str) -> Self {
        ClientType::Class(ClassType::builtin(package, name))
    }

    pub fn generic(package: &str, name: &str, type_arguments: Vec<Arc<ClientType>>) -> Self {
        ClientType::Generic(GenericType {
            package: package.to_string(),
            name: name.to_string(),
            type_arguments,
        })
    }

    pub fn mono(inner: Arc<ClientType>) -> Self {
        Self::generic("reactor.core.publisher", "Mono", vec![inner])
    }

    pub fn response(inner: Arc<ClientType>) -> Self {
        Self::generic("com.azure.core.http.rest", "Response", vec![inner])
    }

    pub fn name(&self) -> String {
        match self {
            ClientType::Primitive { primitive } => primitive.name().to_string(),
            ClientType::Class(c) => c.name.clone(),
            ClientType::List { .. } => "List".to_string(),
            ClientType::Iterable { .. } => "IterableStream".to_string(),
            ClientType::Map { .. } => "Map".to_string(),
            ClientType::Enum(e) => e.name.clone(),
            ClientType::Constant(c) => c.value_type.name(),
            ClientType::Generic(g) => g.name.clone(),
            ClientType::Union(u) => u.name.clone(),
        }
    }

    pub fn is_void(&self) -> bool {
        match self {
            ClientType::Primitive { primitive } => *primitive == PrimitiveType::Void,
            ClientType::Class(c) => c.package == "java.lang" && c.name == "Void",
            _ => false,
        }
    }

    pub fn is_boolean(&self) -> bool {
        match self {
            ClientType::Primitive { primitive } => *primitive == PrimitiveType::Boolean,
            ClientType::Class(c) => c.package == "java.lang" && c.name == "Boolean",
            _ => false,
        }
    }

    /// Whether this is the generic type named `name` (e.g. `Mono`, `Response`).
    pub fn is_generic_named(&self, name: &str) -> bool {
        matches!(self, ClientType::Generic(g) if g.name == name)
    }

    pub fn first_type_argument(&self) -> Option<&Arc<ClientType>> {
        match self {
            ClientType::Generic(g) => g.type_arguments.first(),
            _ => None,
        }
    }

    /// Same type, boxed when it is a primitive.
    pub fn as_nullable(&self) -> ClientType {
        match self {
            ClientType::Primitive { primitive } => ClientType::Class(primitive.boxed()),
            other => other.clone(),
        }
    }

    /// The generated model behind this type, if any.
    pub fn model_id(&self) -> Option<ModelId> {
        match self {
            ClientType::Class(c) => c.model,
            _ => None,
        }
    }
}

impl fmt::Display for ClientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientType::List { element } => write!(f, "List<{}>", element),
            ClientType::Iterable { element } => write!(f, "IterableStream<{}>", element),
            ClientType::Map { value } => write!(f, "Map<String, {}>", value),
            ClientType::Generic(g) => {
                write!(f, "{}<", g.name)?;
                for (i, arg) in g.type_arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ">")
            }
            other => write!(f, "{}", other.name()),
        }
    }
}

// ============================================================================
// Models
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Mutability {
    Create,
    Read,
    Update,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientModelProperty {
    pub name: String,
    pub serialized_name: String,
    pub description: String,
    pub client_type: Arc<ClientType>,
    pub wire_type: Arc<ClientType>,
    pub required: bool,
    pub read_only: bool,
    pub constant: bool,
    pub default_value: Option<String>,
    pub polymorphic_discriminator: bool,
    pub additional_properties: bool,
    pub mutabilities: Vec<Mutability>,
}

impl ClientModelProperty {
    pub fn is_read_only_for_create(&self) -> bool {
        self.read_only || (!self.mutabilities.is_empty() && !self.mutabilities.contains(&Mutability::Create))
    }

    pub fn is_read_only_for_update(&self) -> bool {
        self.read_only || (!self.mutabilities.is_empty() && !self.mutabilities.contains(&Mutability::Update))
    }

    pub fn is_required_for_create(&self) -> bool {
        self.required && !self.is_read_only_for_create()
    }

    /// Required, client-settable and not fixed: goes into the constructor.
    pub fn in_constructor(&self) -> bool {
        self.required && !self.read_only && !self.constant && !self.polymorphic_discriminator
    }

    /// Settable after construction.
    pub fn has_setter(&self) -> bool {
        !self.read_only && !self.constant && !self.polymorphic_discriminator && !self.in_constructor()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientModel {
    pub id: ModelId,
    pub name: String,
    pub package: String,
    pub description: String,
    pub parent_model_name: Option<String>,
    pub derived_models: Vec<ModelId>,
    /// Serialized name of the discriminator, when the hierarchy is polymorphic
    pub polymorphic_discriminator: Option<String>,
    /// Discriminator value identifying this model on the wire
    pub serialized_name: String,
    pub properties: Vec<ClientModelProperty>,
    /// Parent properties flattened in from non-class parents
    pub flattened_parent_properties: Vec<ClientModelProperty>,
    pub is_input: bool,
    pub is_output: bool,
    pub is_exception_error: bool,
}

impl ClientModel {
    pub fn is_polymorphic(&self) -> bool {
        self.polymorphic_discriminator.is_some()
    }

    pub fn property(&self, name: &str) -> Option<&ClientModelProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn constructor_properties(&self) -> impl Iterator<Item = &ClientModelProperty> {
        self.properties.iter().filter(|p| p.in_constructor())
    }

    pub fn settable_properties(&self) -> impl Iterator<Item = &ClientModelProperty> {
        self.properties.iter().filter(|p| p.has_setter())
    }
}

// ============================================================================
// Methods
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ClientMethodType {
    SimpleAsync,
    SimpleSync,
    SimpleAsyncRestResponse,
    SimpleSyncRestResponse,
    PagingAsync,
    PagingSync,
    PagingAsyncSinglePage,
    PagingSyncSinglePage,
    LongRunningBeginAsync,
    LongRunningBeginSync,
    LongRunningAsync,
    LongRunningSync,
}

impl ClientMethodType {
    pub fn is_sync(&self) -> bool {
        matches!(
            self,
            ClientMethodType::SimpleSync
                | ClientMethodType::SimpleSyncRestResponse
                | ClientMethodType::PagingSync
                | ClientMethodType::PagingSyncSinglePage
                | ClientMethodType::LongRunningBeginSync
                | ClientMethodType::LongRunningSync
        )
    }

    /// The coarse return-shape classification.
    pub fn shape(&self) -> ReturnShape {
        match self {
            ClientMethodType::SimpleAsync
            | ClientMethodType::SimpleSync
            | ClientMethodType::SimpleAsyncRestResponse
            | ClientMethodType::SimpleSyncRestResponse => ReturnShape::Single,
            ClientMethodType::PagingAsync
            | ClientMethodType::PagingSync
            | ClientMethodType::PagingAsyncSinglePage
            | ClientMethodType::PagingSyncSinglePage => ReturnShape::Paged,
            _ => ReturnShape::LongRunning,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReturnShape {
    Void,
    Single,
    Paged,
    LongRunning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RequestParameterLocation {
    Path,
    Query,
    Header,
    Body,
    Uri,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientMethodParameter {
    pub name: String,
    pub description: String,
    pub client_type: Arc<ClientType>,
    pub wire_type: Arc<ClientType>,
    pub location: RequestParameterLocation,
    pub required: bool,
    pub constant: bool,
    pub default_value: Option<String>,
    /// Supplied by the client instead of the caller
    pub from_client: bool,
    /// API versions the parameter exists in
    pub versioning: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CollectionFormat {
    Csv,
    Multi,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProxyMethodParameter {
    pub name: String,
    pub request_parameter_name: String,
    pub description: String,
    pub client_type: Arc<ClientType>,
    pub wire_type: Arc<ClientType>,
    pub location: RequestParameterLocation,
    pub required: bool,
    pub constant: bool,
    pub default_value: Option<String>,
    pub from_client: bool,
    /// Expression the client method passes for this parameter
    pub parameter_reference: String,
    pub collection_format: Option<CollectionFormat>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProxyMethod {
    pub name: String,
    pub http_method: String,
    pub path: String,
    pub expected_status_codes: Vec<u16>,
    pub unexpected_response_exception: Arc<ClientType>,
    pub parameters: Vec<ProxyMethodParameter>,
    pub return_type: Arc<ClientType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnValue {
    /// Absent for methods that return nothing
    pub description: Option<String>,
    pub client_type: Arc<ClientType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientMethod {
    pub name: String,
    pub description: String,
    pub method_type: ClientMethodType,
    /// Every parameter the caller can supply
    pub parameters: Vec<ClientMethodParameter>,
    /// Additional signatures for version-gated parameters, shortest first
    pub overloads: Vec<Vec<ClientMethodParameter>>,
    pub return_value: ReturnValue,
    pub proxy_method: String,
}

impl ClientMethod {
    pub fn return_shape(&self) -> ReturnShape {
        let shape = self.method_type.shape();
        if shape != ReturnShape::Single {
            return shape;
        }
        let mut ty = self.return_value.client_type.as_ref();
        while let Some(inner) = ty
            .first_type_argument()
            .filter(|_| ty.is_generic_named("Mono") || ty.is_generic_named("Response"))
        {
            ty = inner.as_ref();
        }
        if ty.is_void() {
            ReturnShape::Void
        } else {
            ReturnShape::Single
        }
    }
}

// ============================================================================
// Clients
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Proxy {
    pub name: String,
    pub client_type_name: String,
    pub base_url: String,
    pub methods: Vec<ProxyMethod>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceClientProperty {
    pub name: String,
    pub description: String,
    pub client_type: Arc<ClientType>,
    pub read_only: bool,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodGroupClient {
    pub name: String,
    pub package: String,
    pub class_name: String,
    pub interface_name: String,
    pub variable_name: String,
    pub variable_type: String,
    pub description: Option<String>,
    pub proxy: Proxy,
    pub client_methods: Vec<ClientMethod>,
    pub properties: Vec<ServiceClientProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceVersion {
    pub name: String,
    pub package: String,
    /// Oldest first; the last one is the latest
    pub versions: Vec<String>,
}

impl ServiceVersion {
    pub fn latest(&self) -> Option<&str> {
        self.versions.last().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SecurityInfo {
    TokenCredential { scopes: Vec<String> },
    KeyCredential { header_name: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceClient {
    pub package: String,
    pub class_name: String,
    pub interface_name: String,
    pub description: Option<String>,
    pub properties: Vec<ServiceClientProperty>,
    pub method_groups: Vec<MethodGroupClient>,
    pub client_methods: Vec<ClientMethod>,
    pub proxy: Option<Proxy>,
    pub service_version: Option<ServiceVersion>,
    pub security: Vec<SecurityInfo>,
    pub context_type: Arc<ClientType>,
}

impl ServiceClient {
    pub fn property(&self, name: &str) -> Option<&ServiceClientProperty> {
        self.properties.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ClientBuilderTrait {
    Http,
    Proxy,
    Configuration,
    TokenCredential,
    KeyCredential,
    Endpoint,
}

impl ClientBuilderTrait {
    pub fn interface_name(&self) -> &'static str {
        match self {
            ClientBuilderTrait::Http => "HttpTrait",
            ClientBuilderTrait::Proxy => "ProxyTrait",
            ClientBuilderTrait::Configuration => "ConfigurationTrait",
            ClientBuilderTrait::TokenCredential => "TokenCredentialTrait",
            ClientBuilderTrait::KeyCredential => "KeyCredentialTrait",
            ClientBuilderTrait::Endpoint => "EndpointTrait",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AsyncSyncClient {
    pub name: String,
    pub package: String,
    /// Wrapped method group; `None` wraps the service client's own methods
    pub method_group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientBuilder {
    pub name: String,
    pub package: String,
    pub service_client_name: String,
    pub builder_traits: Vec<ClientBuilderTrait>,
    pub async_clients: Vec<AsyncSyncClient>,
    pub sync_clients: Vec<AsyncSyncClient>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientException {
    pub name: String,
    pub package: String,
    pub error_type: Arc<ClientType>,
    pub parent_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientResponse {
    pub name: String,
    pub package: String,
    pub description: String,
    pub headers_type: Arc<ClientType>,
    pub body_type: Arc<ClientType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Manager {
    pub name: String,
    pub package: String,
    pub service_name: String,
}

/// Everything the emission layer renders for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Client {
    pub client_name: String,
    pub client_description: Option<String>,
    pub enums: Vec<EnumType>,
    pub models: Vec<ClientModel>,
    pub union_types: Vec<UnionType>,
    pub response_models: Vec<ClientResponse>,
    pub exceptions: Vec<ClientException>,
    pub service_clients: Vec<ServiceClient>,
    pub builders: Vec<ClientBuilder>,
    pub manager: Option<Manager>,
}

impl Client {
    pub fn model(&self, id: ModelId) -> Option<&ClientModel> {
        self.models.iter().find(|m| m.id == id)
    }

    pub fn model_by_name(&self, name: &str) -> Option<&ClientModel> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn service_client(&self) -> Option<&ServiceClient> {
        self.service_clients.first()
    }
}
