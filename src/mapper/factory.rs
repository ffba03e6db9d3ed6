//! Mapper Factory
//!
//! One method per mapper role. Every method defaults to the standard mapper,
//! so a flavor overrides only the roles it changes and the rest of the
//! pipeline runs unchanged. The factory is passed into
//! [`map_code_model`](super::map_code_model); there is no global registry.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{client, method, method_group, model, parameter, schema, service_client, MappingContext, Result};
use crate::clientmodel::{
    ClassType, Client, ClientBuilder, ClientException, ClientMethod, ClientMethodParameter, ClientModel,
    ClientModelProperty, ClientType, MethodGroupClient, ProxyMethod, ProxyMethodParameter, RequestParameterLocation,
    ReturnValue, ServiceClient,
};
use crate::codemodel::{
    ArraySchema, ChoiceSchema, ConstantSchema, DictionarySchema, ObjectSchema, Operation, OperationGroup, OrSchema,
    Parameter, PrimitiveSchema, Property, Schema, Usage,
};
use crate::naming;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Flavor {
    #[default]
    Default,
    /// Management-plane libraries
    Fluent,
    /// Constrained platform with callback-based async methods
    Android,
}

pub trait MapperFactory: Send + Sync {
    fn flavor(&self) -> Flavor;

    // ------------------------------------------------------------------------
    // Schema kinds
    // ------------------------------------------------------------------------

    fn map_primitive(&self, ctx: &MappingContext<'_>, schema: &Schema, primitive: &PrimitiveSchema) -> Result<ClientType> {
        schema::map_primitive(ctx, schema, primitive)
    }

    fn map_array(&self, ctx: &MappingContext<'_>, schema: &Schema, array: &ArraySchema) -> Result<ClientType> {
        schema::map_array(ctx, schema, array)
    }

    fn map_dictionary(&self, ctx: &MappingContext<'_>, schema: &Schema, dictionary: &DictionarySchema) -> Result<ClientType> {
        schema::map_dictionary(ctx, schema, dictionary)
    }

    fn map_choice(&self, ctx: &MappingContext<'_>, schema: &Schema, choice: &ChoiceSchema) -> Result<ClientType> {
        schema::map_choice(ctx, schema, choice)
    }

    fn map_sealed_choice(&self, ctx: &MappingContext<'_>, schema: &Schema, choice: &ChoiceSchema) -> Result<ClientType> {
        schema::map_sealed_choice(ctx, schema, choice)
    }

    fn map_constant(&self, ctx: &MappingContext<'_>, schema: &Schema, constant: &ConstantSchema) -> Result<ClientType> {
        schema::map_constant(ctx, schema, constant)
    }

    fn map_any(&self, ctx: &MappingContext<'_>, schema: &Schema) -> Result<ClientType> {
        schema::map_any(ctx, schema)
    }

    fn map_binary(&self, ctx: &MappingContext<'_>, schema: &Schema) -> Result<ClientType> {
        schema::map_binary(ctx, schema)
    }

    fn map_union(&self, ctx: &MappingContext<'_>, schema: &Schema, or: &OrSchema) -> Result<ClientType> {
        schema::map_union(ctx, schema, or)
    }

    // ------------------------------------------------------------------------
    // Models
    // ------------------------------------------------------------------------

    fn model_name(&self, _ctx: &MappingContext<'_>, schema: &Schema, _object: &ObjectSchema) -> String {
        naming::get_type_name(&schema.name)
    }

    fn map_model(
        &self,
        ctx: &MappingContext<'_>,
        schema: &Schema,
        object: &ObjectSchema,
        class: &ClassType,
    ) -> Result<ClientModel> {
        model::map_model(ctx, schema, object, class)
    }

    fn map_model_property(&self, ctx: &MappingContext<'_>, property: &Property) -> Result<ClientModelProperty> {
        model::map_model_property(ctx, property)
    }

    fn map_exception(&self, ctx: &MappingContext<'_>, error_type: &Arc<ClientType>) -> ClientException {
        client::map_exception(ctx, error_type)
    }

    // ------------------------------------------------------------------------
    // Parameters and methods
    // ------------------------------------------------------------------------

    fn map_client_parameter(
        &self,
        ctx: &MappingContext<'_>,
        operation: &Operation,
        parameter: &Parameter,
    ) -> Result<ClientMethodParameter> {
        parameter::map_client_parameter(ctx, operation, parameter)
    }

    fn map_proxy_parameter(
        &self,
        ctx: &MappingContext<'_>,
        group: &OperationGroup,
        operation: &Operation,
        parameter: &Parameter,
    ) -> Result<ProxyMethodParameter> {
        parameter::map_proxy_parameter(ctx, group, operation, parameter)
    }

    fn map_client_methods(
        &self,
        ctx: &MappingContext<'_>,
        group: &OperationGroup,
        operation: &Operation,
    ) -> Result<Vec<ClientMethod>> {
        method::map_client_methods(ctx, group, operation)
    }

    fn map_proxy_method(&self, ctx: &MappingContext<'_>, group: &OperationGroup, operation: &Operation) -> Result<ProxyMethod> {
        method::map_proxy_method(ctx, group, operation)
    }

    // ------------------------------------------------------------------------
    // Client structure
    // ------------------------------------------------------------------------

    fn map_method_group(&self, ctx: &MappingContext<'_>, group: &OperationGroup) -> Result<MethodGroupClient> {
        method_group::map_method_group(ctx, group)
    }

    fn map_service_client(&self, ctx: &MappingContext<'_>) -> Result<ServiceClient> {
        service_client::map_service_client(ctx)
    }

    fn map_client_builder(&self, ctx: &MappingContext<'_>, service_client: &ServiceClient) -> Result<Option<ClientBuilder>> {
        service_client::map_client_builder(ctx, service_client)
    }

    fn map_client(&self, ctx: &MappingContext<'_>) -> Result<Client> {
        client::map_client(ctx)
    }

    // ------------------------------------------------------------------------
    // Platform types
    // ------------------------------------------------------------------------

    /// Type of the per-call context parameter.
    fn context_type(&self) -> ClientType {
        ClientType::class("com.azure.core.util", "Context")
    }

    /// Base class of generated exceptions and of unexpected-response errors.
    fn exception_base_type(&self) -> ClientType {
        ClientType::class("com.azure.core.exception", "HttpResponseException")
    }
}

/// The standard pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMapperFactory;

impl MapperFactory for DefaultMapperFactory {
    fn flavor(&self) -> Flavor {
        Flavor::Default
    }
}

/// Management-plane flavor: response models get an `Inner` suffix, errors
/// derive from `ManagementException`, and premium libraries get a manager.
#[derive(Debug, Clone, Copy, Default)]
pub struct FluentMapperFactory;

impl MapperFactory for FluentMapperFactory {
    fn flavor(&self) -> Flavor {
        Flavor::Fluent
    }

    fn model_name(&self, _ctx: &MappingContext<'_>, schema: &Schema, object: &ObjectSchema) -> String {
        let name = naming::get_type_name(&schema.name);
        if object.usage.contains(&Usage::Output) && !object.usage.contains(&Usage::Exception) {
            format!("{name}Inner")
        } else {
            name
        }
    }

    fn exception_base_type(&self) -> ClientType {
        ClientType::class("com.azure.core.management.exception", "ManagementException")
    }

    fn map_client(&self, ctx: &MappingContext<'_>) -> Result<Client> {
        let mut mapped = client::map_client(ctx)?;
        if ctx.settings.is_fluent_premium() {
            mapped.manager = Some(client::map_manager(ctx)?);
        }
        Ok(mapped)
    }
}

/// Constrained-platform flavor: Android core types, and async methods that
/// report through a callback instead of returning a publisher.
#[derive(Debug, Clone, Copy, Default)]
pub struct AndroidMapperFactory;

impl MapperFactory for AndroidMapperFactory {
    fn flavor(&self) -> Flavor {
        Flavor::Android
    }

    fn context_type(&self) -> ClientType {
        ClientType::class("com.azure.android.core.util", "Context")
    }

    fn exception_base_type(&self) -> ClientType {
        ClientType::class("com.azure.android.core.http.exception", "HttpResponseException")
    }

    fn map_client_methods(
        &self,
        ctx: &MappingContext<'_>,
        group: &OperationGroup,
        operation: &Operation,
    ) -> Result<Vec<ClientMethod>> {
        let methods = method::map_client_methods(ctx, group, operation)?;
        Ok(methods.into_iter().map(into_callback_method).collect())
    }
}

/// Rewrite an async method as `void name(..., Callback<T> callback)`.
fn into_callback_method(mut method: ClientMethod) -> ClientMethod {
    if method.method_type.is_sync() {
        return method;
    }
    let result = if method.return_value.client_type.is_generic_named("Mono") {
        method
            .return_value
            .client_type
            .first_type_argument()
            .cloned()
            .unwrap_or_else(|| method.return_value.client_type.clone())
    } else {
        method.return_value.client_type.clone()
    };
    let callback_type = Arc::new(ClientType::generic("com.azure.android.core.rest", "Callback", vec![result]));
    let callback = ClientMethodParameter {
        name: "callback".to_string(),
        description: "The callback notified when the operation completes.".to_string(),
        client_type: callback_type.clone(),
        wire_type: callback_type,
        location: RequestParameterLocation::Query,
        required: true,
        constant: false,
        default_value: None,
        from_client: false,
        versioning: None,
    };
    method.parameters.push(callback.clone());
    for overload in &mut method.overloads {
        overload.push(callback.clone());
    }
    method.return_value = ReturnValue {
        description: None,
        client_type: Arc::new(ClientType::void()),
    };
    method
}

/// Factory for a flavor.
pub fn factory_for(flavor: Flavor) -> Box<dyn MapperFactory> {
    match flavor {
        Flavor::Default => Box::new(DefaultMapperFactory),
        Flavor::Fluent => Box::new(FluentMapperFactory),
        Flavor::Android => Box::new(AndroidMapperFactory),
    }
}
