//! Parameter Mappers
//!
//! Operation parameters become client-method parameters (what callers pass)
//! and proxy parameters (what goes on the wire, and where the value comes from).

use std::sync::Arc;

use super::model::nullable_type;
use super::{MapperError, MappingContext, Result};
use crate::clientmodel::{
    ClientMethodParameter, ClientType, CollectionFormat, ProxyMethodParameter, RequestParameterLocation,
};
use crate::codemodel::{Operation, OperationGroup, Parameter, ParameterLocation, ParameterOrigin};
use crate::naming;

pub fn request_location(location: ParameterLocation) -> RequestParameterLocation {
    match location {
        ParameterLocation::Path => RequestParameterLocation::Path,
        ParameterLocation::Query => RequestParameterLocation::Query,
        ParameterLocation::Header => RequestParameterLocation::Header,
        ParameterLocation::Body => RequestParameterLocation::Body,
        ParameterLocation::Uri => RequestParameterLocation::Uri,
    }
}

/// Mapped type of a parameter, split into (type, is-constant, literal default).
fn parameter_type(
    ctx: &MappingContext<'_>,
    operation: &Operation,
    parameter: &Parameter,
) -> Result<(Arc<ClientType>, bool, Option<String>)> {
    let id = parameter.schema.ok_or_else(|| {
        MapperError::InvalidInput(format!(
            "parameter '{}' of operation '{}' has no schema",
            parameter.name, operation.name
        ))
    })?;
    let mapped = ctx.map_type(id)?;
    Ok(match mapped.as_ref() {
        ClientType::Constant(c) => (c.value_type.clone(), true, Some(c.value.clone())),
        _ => (mapped, false, None),
    })
}

/// Caller-facing name of a parameter.
///
/// A method parameter whose name collides with a client property is prefixed
/// with its owner's name, unless it was already renamed upstream.
pub fn client_parameter_name(ctx: &MappingContext<'_>, operation: &Operation, parameter: &Parameter) -> Result<String> {
    if let Some(client_name) = &parameter.client_name {
        return Ok(naming::get_property_name(client_name));
    }
    let name = naming::get_property_name(&parameter.name);
    if parameter.is_client() || !ctx.client_property_names().contains(&name) {
        return Ok(name);
    }
    let owner = match parameter.owner_schema {
        Some(id) => ctx.code_model.schema(id)?.name.clone(),
        None => operation.name.clone(),
    };
    Ok(format!(
        "{}{}",
        naming::to_camel_case(&naming::remove_invalid_characters(&owner)),
        naming::to_pascal_case(&name)
    ))
}

/// Standard client-method parameter mapper.
pub fn map_client_parameter(
    ctx: &MappingContext<'_>,
    operation: &Operation,
    parameter: &Parameter,
) -> Result<ClientMethodParameter> {
    let (client_type, constant, default_value) = parameter_type(ctx, operation, parameter)?;
    let client_type = if parameter.required && !parameter.nullable {
        client_type
    } else {
        nullable_type(&client_type)
    };
    let name = client_parameter_name(ctx, operation, parameter)?;
    let description = parameter
        .description
        .clone()
        .unwrap_or_else(|| format!("The {name} parameter."));

    Ok(ClientMethodParameter {
        name,
        description,
        wire_type: client_type.clone(),
        client_type,
        location: request_location(parameter.location),
        required: parameter.required,
        constant,
        default_value,
        from_client: parameter.is_client(),
        versioning: parameter.added.clone(),
    })
}

/// Standard proxy parameter mapper.
pub fn map_proxy_parameter(
    ctx: &MappingContext<'_>,
    group: &OperationGroup,
    operation: &Operation,
    parameter: &Parameter,
) -> Result<ProxyMethodParameter> {
    let (mapped, constant, default_value) = parameter_type(ctx, operation, parameter)?;
    let client_type = if parameter.required { mapped } else { nullable_type(&mapped) };

    let is_sequence = matches!(
        client_type.as_ref(),
        ClientType::List { .. } | ClientType::Iterable { .. }
    );
    let (wire_type, collection_format) = if is_sequence && parameter.location != ParameterLocation::Body {
        if parameter.explode {
            (client_type.clone(), Some(CollectionFormat::Multi))
        } else {
            (Arc::new(ClientType::string()), Some(CollectionFormat::Csv))
        }
    } else {
        (client_type.clone(), None)
    };

    let name = naming::get_escaped_reserved_client_method_parameter_name(&naming::get_property_name(&parameter.name));
    let parameter_reference = if parameter.is_client() {
        client_reference(ctx, group, parameter, &client_type)
    } else {
        name.clone()
    };

    Ok(ProxyMethodParameter {
        description: parameter
            .description
            .clone()
            .unwrap_or_else(|| format!("The {name} parameter.")),
        name,
        request_parameter_name: parameter.serialized_name().to_string(),
        client_type,
        wire_type,
        location: request_location(parameter.location),
        required: parameter.required,
        constant,
        default_value,
        from_client: parameter.is_client(),
        parameter_reference,
        collection_format,
    })
}

/// Expression reading a client-level parameter from the owning client.
fn client_reference(
    ctx: &MappingContext<'_>,
    group: &OperationGroup,
    parameter: &Parameter,
    client_type: &ClientType,
) -> String {
    let caller = if group.name.is_empty() { "this" } else { "this.client" };
    if ctx.settings.data_plane && parameter.origin == Some(ParameterOrigin::ApiVersion) {
        return format!("{caller}.getServiceVersion().getVersion()");
    }

    let mut property = naming::to_pascal_case(&naming::remove_invalid_characters(&parameter.name));
    let mut prefix = "get";
    if client_type.is_boolean() {
        prefix = "is";
        if naming::to_camel_case(&parameter.name).starts_with(prefix) {
            prefix = "";
            property = naming::to_camel_case(&property);
        }
    }
    format!("{caller}.{prefix}{property}()")
}
