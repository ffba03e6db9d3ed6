//! Client-Method and Proxy-Method Mappers
//!
//! Each operation yields one proxy method (the wire-level call) and a family
//! of client methods, one per [`ClientMethodType`] the settings enable. Methods
//! whose parameters are gated by API version carry the overload set computed by
//! [`find_overloaded_signatures`].

use std::sync::Arc;

use tracing::debug;

use super::model::nullable_type;
use super::{MapperError, MappingContext, Result};
use crate::clientmodel::{
    ClientMethod, ClientMethodParameter, ClientMethodType, ClientType, ProxyMethod, RequestParameterLocation,
    ReturnValue,
};
use crate::codemodel::{CodeModel, HttpMethod, Operation, OperationGroup, SchemaKind};
use crate::naming;
use crate::settings::SyncMethods;

// ============================================================================
// Overloads
// ============================================================================

/// Signatures between the required-only and the full parameter list.
///
/// One candidate per distinct API version (plus one for "no version"): the
/// unversioned parameters and those present in that version, in declaration
/// order. Candidates equal to the full list, the required-only list, or an
/// earlier candidate are dropped.
pub fn find_overloaded_signatures(parameters: &[ClientMethodParameter]) -> Vec<Vec<ClientMethodParameter>> {
    let required: Vec<ClientMethodParameter> = parameters.iter().filter(|p| p.required).cloned().collect();

    let mut versions: Vec<Option<&str>> = vec![None];
    for version in parameters.iter().filter_map(|p| p.versioning.as_ref()).flatten() {
        if !versions.contains(&Some(version.as_str())) {
            versions.push(Some(version.as_str()));
        }
    }

    let mut signatures: Vec<Vec<ClientMethodParameter>> = Vec::new();
    for version in versions {
        let candidate: Vec<ClientMethodParameter> = parameters
            .iter()
            .filter(|p| match (&p.versioning, version) {
                (None, _) => true,
                (Some(added), Some(v)) => added.iter().any(|a| a == v),
                (Some(_), None) => false,
            })
            .cloned()
            .collect();

        if candidate.as_slice() != parameters && candidate != required && !signatures.contains(&candidate) {
            signatures.push(candidate);
        }
    }
    signatures
}

// ============================================================================
// Return descriptions
// ============================================================================

/// Human-readable description of a method's return value.
///
/// Precedence: an operation description of the form "Get(s) ...", then the
/// response schema's summary or description, then "whether resource exists"
/// for boolean HEAD operations, then a phrase for the wrapping shape alone.
/// Plain `void` methods have no return description.
pub fn return_type_description(
    code_model: &CodeModel,
    operation: &Operation,
    return_type: &ClientType,
    base_type: &ClientType,
) -> Option<String> {
    if matches!(return_type, ClientType::Primitive { .. }) && return_type.is_void() {
        return None;
    }

    let mut doc = operation.merged_description().and_then(|description| {
        let lower = description.to_lowercase();
        if lower.starts_with("get ") || lower.starts_with("gets ") {
            description
                .split_once(' ')
                .map(|(_, rest)| naming::to_description_fragment(rest))
                .filter(|d| !d.is_empty())
        } else {
            None
        }
    });

    if doc.is_none() {
        doc = operation
            .response_schema()
            .and_then(|id| code_model.schema(id).ok())
            .and_then(|schema| {
                schema
                    .summary
                    .as_deref()
                    .filter(|s| !s.trim().is_empty())
                    .or_else(|| schema.description.as_deref().filter(|d| !d.trim().is_empty()))
                    .map(naming::to_description_fragment)
            });
    }

    if doc.is_none() && base_type.is_boolean() && operation.method == HttpMethod::Head {
        doc = Some("whether resource exists".to_string());
    }

    Some(assemble_return_description(doc.as_deref(), return_type, base_type))
}

/// Combine a description fragment with a suffix for the wrapping shape.
pub fn assemble_return_description(doc: Option<&str>, return_type: &ClientType, base_type: &ClientType) -> String {
    let body = doc.unwrap_or("the response body");
    let ClientType::Generic(generic) = return_type else {
        return doc.unwrap_or("the response").to_string();
    };
    let inner = return_type.first_type_argument();

    match generic.name.as_str() {
        "Mono" => match inner {
            Some(inner) if inner.is_generic_named("Response") || inner.is_generic_named("PagedResponse") => {
                let wrapper = inner.name();
                if doc.is_none() && base_type.is_void() {
                    format!("the {{@link {wrapper}}} on successful completion of {{@link Mono}}")
                } else {
                    format!("{body} along with {{@link {wrapper}}} on successful completion of {{@link Mono}}")
                }
            }
            _ if base_type.is_void() => match doc {
                Some(doc) => format!("{doc} on successful completion of {{@link Mono}}"),
                None => "A {@link Mono} that completes when a successful response is received".to_string(),
            },
            _ => format!("{body} on successful completion of {{@link Mono}}"),
        },
        "Response" | "PagedResponse" => {
            let wrapper = &generic.name;
            match doc {
                None if base_type.is_void() => format!("the {{@link {wrapper}}}"),
                _ => format!("{body} along with {{@link {wrapper}}}"),
            }
        }
        "PagedFlux" | "PagedIterable" => format!(
            "{} with {{@link {}}}",
            doc.unwrap_or("the paginated response"),
            generic.name
        ),
        "PollerFlux" | "SyncPoller" => format!(
            "the {{@link {}}} for polling of {}",
            generic.name,
            doc.unwrap_or("long-running operation")
        ),
        _ => doc.unwrap_or("the response").to_string(),
    }
}

// ============================================================================
// Types
// ============================================================================

/// Body type of an operation: the first response schema, `boolean` for HEAD
/// without a body, `void` otherwise.
pub fn response_body_type(ctx: &MappingContext<'_>, operation: &Operation) -> Result<Arc<ClientType>> {
    if let Some(body) = ctx.map_schema(operation.response_schema())? {
        return Ok(body);
    }
    Ok(Arc::new(if operation.method == HttpMethod::Head {
        ClientType::boolean()
    } else {
        ClientType::void()
    }))
}

/// Element type of the page collection of a pageable operation.
fn page_item_type(ctx: &MappingContext<'_>, operation: &Operation) -> Result<Arc<ClientType>> {
    let item_name = operation
        .paging
        .as_ref()
        .and_then(|p| p.item_name.as_deref())
        .unwrap_or("value");
    let not_found = || {
        MapperError::InvalidInput(format!(
            "pageable operation '{}' has no '{}' collection in its response",
            operation.name, item_name
        ))
    };

    let schema_id = operation.response_schema().ok_or_else(not_found)?;
    let SchemaKind::Object(object) = &ctx.code_model.schema(schema_id)?.kind else {
        return Err(not_found());
    };
    let property = object
        .properties
        .iter()
        .find(|p| p.serialized_name() == item_name)
        .ok_or_else(not_found)?;
    match ctx.map_type(property.schema)?.as_ref() {
        ClientType::List { element } | ClientType::Iterable { element } => Ok(element.clone()),
        _ => Err(not_found()),
    }
}

fn generic(package: &str, name: &str, arguments: Vec<Arc<ClientType>>) -> Arc<ClientType> {
    Arc::new(ClientType::generic(package, name, arguments))
}

/// Type arguments use boxed types; `void` becomes `Void`.
fn boxed(ty: &Arc<ClientType>) -> Arc<ClientType> {
    nullable_type(ty)
}

/// Return type and the unwrapped base type for one method type.
fn return_types(
    method_type: ClientMethodType,
    body: &Arc<ClientType>,
    item: Option<&Arc<ClientType>>,
) -> (Arc<ClientType>, Arc<ClientType>) {
    const CORE_REST: &str = "com.azure.core.http.rest";
    const POLLING: &str = "com.azure.core.util.polling";
    let mono = |inner| Arc::new(ClientType::mono(inner));
    let response = |inner| Arc::new(ClientType::response(inner));
    let item = item.cloned().unwrap_or_else(|| body.clone());

    match method_type {
        ClientMethodType::SimpleAsync | ClientMethodType::LongRunningAsync => (mono(boxed(body)), body.clone()),
        ClientMethodType::SimpleAsyncRestResponse => (mono(response(boxed(body))), body.clone()),
        ClientMethodType::SimpleSync | ClientMethodType::LongRunningSync => (body.clone(), body.clone()),
        ClientMethodType::SimpleSyncRestResponse => (response(boxed(body)), body.clone()),
        ClientMethodType::PagingAsync => (generic(CORE_REST, "PagedFlux", vec![item.clone()]), item),
        ClientMethodType::PagingSync => (generic(CORE_REST, "PagedIterable", vec![item.clone()]), item),
        ClientMethodType::PagingAsyncSinglePage => (
            mono(generic(CORE_REST, "PagedResponse", vec![item.clone()])),
            item,
        ),
        ClientMethodType::PagingSyncSinglePage => (generic(CORE_REST, "PagedResponse", vec![item.clone()]), item),
        ClientMethodType::LongRunningBeginAsync | ClientMethodType::LongRunningBeginSync => {
            let poller = if method_type == ClientMethodType::LongRunningBeginAsync {
                "PollerFlux"
            } else {
                "SyncPoller"
            };
            let result = boxed(body);
            let poll_result = generic(POLLING, "PollResult", vec![result.clone()]);
            (generic(POLLING, poller, vec![poll_result, result]), body.clone())
        }
    }
}

// ============================================================================
// Client methods
// ============================================================================

/// Method types generated for an operation under the given sync policy.
pub fn method_types(operation: &Operation, sync_methods: SyncMethods) -> Vec<ClientMethodType> {
    use ClientMethodType::*;

    let (async_types, essential_sync, extra_sync) = if operation.is_pageable() {
        (
            vec![PagingAsync, PagingAsyncSinglePage],
            vec![PagingSync],
            vec![PagingSyncSinglePage],
        )
    } else if operation.long_running {
        (
            vec![LongRunningBeginAsync, LongRunningAsync],
            vec![LongRunningBeginSync, LongRunningSync],
            vec![],
        )
    } else {
        (
            vec![SimpleAsyncRestResponse, SimpleAsync],
            vec![SimpleSyncRestResponse, SimpleSync],
            vec![],
        )
    };

    let mut types = async_types;
    match sync_methods {
        SyncMethods::None => {}
        SyncMethods::Essential => types.extend(essential_sync),
        SyncMethods::All => {
            types.extend(essential_sync);
            types.extend(extra_sync);
        }
    }
    types
}

pub fn method_name(operation: &Operation, method_type: ClientMethodType) -> String {
    let name = naming::to_camel_case(&operation.name);
    let pascal = naming::to_pascal_case(&operation.name);
    match method_type {
        ClientMethodType::SimpleAsync | ClientMethodType::PagingAsync | ClientMethodType::LongRunningAsync => {
            format!("{name}Async")
        }
        ClientMethodType::SimpleSync | ClientMethodType::PagingSync | ClientMethodType::LongRunningSync => name,
        ClientMethodType::SimpleAsyncRestResponse => format!("{name}WithResponseAsync"),
        ClientMethodType::SimpleSyncRestResponse => format!("{name}WithResponse"),
        ClientMethodType::PagingAsyncSinglePage => format!("{name}SinglePageAsync"),
        ClientMethodType::PagingSyncSinglePage => format!("{name}SinglePage"),
        ClientMethodType::LongRunningBeginAsync => format!("begin{pascal}Async"),
        ClientMethodType::LongRunningBeginSync => format!("begin{pascal}"),
    }
}

/// Sync methods returning the raw response also take the request context.
fn takes_context(method_type: ClientMethodType) -> bool {
    matches!(
        method_type,
        ClientMethodType::SimpleSyncRestResponse | ClientMethodType::PagingSyncSinglePage
    )
}

fn context_parameter(ctx: &MappingContext<'_>) -> ClientMethodParameter {
    let context_type = Arc::new(ctx.factory.context_type());
    ClientMethodParameter {
        name: "context".to_string(),
        description: "The context to associate with this operation.".to_string(),
        client_type: context_type.clone(),
        wire_type: context_type,
        location: RequestParameterLocation::Query,
        required: true,
        constant: false,
        default_value: None,
        from_client: false,
        versioning: None,
    }
}

/// Standard client-method mapper.
pub fn map_client_methods(
    ctx: &MappingContext<'_>,
    group: &OperationGroup,
    operation: &Operation,
) -> Result<Vec<ClientMethod>> {
    let mut parameters = Vec::new();
    for parameter in &operation.parameters {
        let mapped = ctx.factory.map_client_parameter(ctx, operation, parameter)?;
        if !mapped.from_client && !mapped.constant {
            parameters.push(mapped);
        }
    }

    let mut overloads = Vec::new();
    if ctx.settings.required_parameter_client_methods {
        let required: Vec<_> = parameters.iter().filter(|p| p.required).cloned().collect();
        if required.len() != parameters.len() {
            overloads.push(required);
        }
    }
    for signature in find_overloaded_signatures(&parameters) {
        if !overloads.contains(&signature) {
            overloads.push(signature);
        }
    }

    let body = response_body_type(ctx, operation)?;
    let item = if operation.is_pageable() {
        Some(page_item_type(ctx, operation)?)
    } else {
        None
    };
    let description = operation
        .merged_description()
        .unwrap_or_else(|| format!("The {} operation.", operation.name));
    let proxy_method = naming::to_camel_case(&operation.name);

    let methods: Vec<ClientMethod> = method_types(operation, ctx.settings.sync_methods)
        .into_iter()
        .map(|method_type| {
            let (return_type, base_type) = return_types(method_type, &body, item.as_ref());
            let mut method_parameters = parameters.clone();
            let method_overloads = if takes_context(method_type) {
                method_parameters.push(context_parameter(ctx));
                Vec::new()
            } else {
                overloads.clone()
            };
            ClientMethod {
                name: method_name(operation, method_type),
                description: description.clone(),
                method_type,
                parameters: method_parameters,
                overloads: method_overloads,
                return_value: ReturnValue {
                    description: return_type_description(ctx.code_model, operation, &return_type, &base_type),
                    client_type: return_type,
                },
                proxy_method: proxy_method.clone(),
            }
        })
        .collect();

    debug!(
        group = %group.name,
        operation = %operation.name,
        methods = methods.len(),
        "mapped client methods"
    );
    Ok(methods)
}

// ============================================================================
// Proxy methods
// ============================================================================

/// Exception class thrown for an error model.
pub fn exception_type(ctx: &MappingContext<'_>, error_type: &ClientType) -> ClientType {
    ClientType::class(&ctx.settings.model_package(), &format!("{}Exception", error_type.name()))
}

/// Standard proxy-method mapper.
pub fn map_proxy_method(ctx: &MappingContext<'_>, group: &OperationGroup, operation: &Operation) -> Result<ProxyMethod> {
    let mut parameters = Vec::with_capacity(operation.parameters.len());
    for parameter in &operation.parameters {
        parameters.push(ctx.factory.map_proxy_parameter(ctx, group, operation, parameter)?);
    }

    let error_schema = operation.exceptions.iter().find_map(|r| r.schema);
    let unexpected_response_exception = match ctx.map_schema(error_schema)? {
        Some(error_type) if error_type.model_id().is_some() => exception_type(ctx, &error_type),
        _ => ctx.factory.exception_base_type(),
    };

    let body = response_body_type(ctx, operation)?;
    let mut expected_status_codes = operation.expected_status_codes();
    if expected_status_codes.is_empty() {
        expected_status_codes.push(200);
    }

    Ok(ProxyMethod {
        name: naming::to_camel_case(&operation.name),
        http_method: operation.method.as_str().to_string(),
        path: operation.path.clone(),
        expected_status_codes,
        unexpected_response_exception: Arc::new(unexpected_response_exception),
        parameters,
        return_type: Arc::new(ClientType::mono(Arc::new(ClientType::response(boxed(&body))))),
    })
}
