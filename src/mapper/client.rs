//! Client Mapper
//!
//! Top-level assembly of a run: maps every schema, the service client and
//! its builder, then gathers enums, unions, models, exceptions and typed
//! response models into one [`Client`].

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use super::method::{exception_type, response_body_type};
use super::model::{self, nullable_type};
use super::{MapperError, MappingContext, Result};
use crate::clientmodel::{
    ClassType, Client, ClientException, ClientResponse, ClientType, EnumType, Manager, UnionType,
};
use crate::codemodel::{Operation, OperationGroup};
use crate::naming;

const RESOURCE_MANAGER_PACKAGE_PREFIX: &str = "com.azure.resourcemanager.";

/// Standard exception mapper.
pub fn map_exception(ctx: &MappingContext<'_>, error_type: &Arc<ClientType>) -> ClientException {
    let exception = exception_type(ctx, error_type);
    ClientException {
        name: exception.name(),
        package: ctx.settings.model_package(),
        error_type: error_type.clone(),
        parent_type: match ctx.factory.exception_base_type() {
            ClientType::Class(base) => base.full_name(),
            other => other.name(),
        },
    }
}

fn response_model_name(group: &OperationGroup, operation: &Operation) -> String {
    format!(
        "{}{}Response",
        naming::get_type_name(&naming::get_plural(&group.name)),
        naming::to_pascal_case(&operation.name)
    )
}

/// Manager entry point of a premium management library.
///
/// Only packages under `com.azure.resourcemanager.` have a well-defined
/// service name to derive the manager from.
pub fn map_manager(ctx: &MappingContext<'_>) -> Result<Manager> {
    let namespace = &ctx.settings.namespace;
    if !namespace.starts_with(RESOURCE_MANAGER_PACKAGE_PREFIX) {
        return Err(MapperError::AmbiguousFlavor {
            package: namespace.clone(),
        });
    }
    let package = namespace.strip_suffix(".generated").unwrap_or(namespace);
    let last = package.rsplit('.').next().unwrap_or(package);
    let service_name = naming::to_pascal_case(last);
    if service_name.is_empty() {
        return Err(MapperError::AmbiguousFlavor {
            package: namespace.clone(),
        });
    }
    Ok(Manager {
        name: format!("{service_name}Manager"),
        package: package.to_string(),
        service_name,
    })
}

/// Standard client mapper.
pub fn map_client(ctx: &MappingContext<'_>) -> Result<Client> {
    let code_model = ctx.code_model;
    let settings = ctx.settings;

    // Everything the emission layer sees is resolved up front, in arena order.
    for id in code_model.schema_ids() {
        ctx.map_type(id)?;
    }

    let service_client = ctx.factory.map_service_client(ctx)?;

    let mut exceptions = Vec::new();
    let mut exception_names = HashSet::new();
    for (_, operation) in code_model.all_operations() {
        for error_schema in operation.exceptions.iter().filter_map(|r| r.schema) {
            let error_type = ctx.map_type(error_schema)?;
            if error_type.model_id().is_none() {
                continue;
            }
            let exception = ctx.factory.map_exception(ctx, &error_type);
            if exception_names.insert(exception.name.clone()) {
                exceptions.push(exception);
            }
        }
    }

    let mut response_models = Vec::new();
    if !settings.disable_typed_headers_methods {
        for (group, operation) in code_model.all_operations() {
            let Some(headers) = model::map_headers_model(ctx, group, operation)? else {
                continue;
            };
            // Generic responses carry the headers model as a type argument instead.
            if settings.generic_response_types {
                continue;
            }
            let body_type = nullable_type(&response_body_type(ctx, operation)?);
            response_models.push(ClientResponse {
                name: response_model_name(group, operation),
                package: settings.model_package(),
                description: format!("Contains all response data for the {} operation.", operation.name),
                headers_type: Arc::new(ClientType::Class(ClassType::model(
                    headers.package.clone(),
                    headers.name.clone(),
                    headers.id,
                ))),
                body_type,
            });
        }
    }

    let enums: Vec<EnumType> = code_model
        .choices()
        .filter_map(|id| ctx.caches.choice.get(id))
        .chain(code_model.sealed_choices().filter_map(|id| ctx.caches.sealed_choice.get(id)))
        .filter_map(|ty| match ty.as_ref() {
            ClientType::Enum(e) => Some(e.clone()),
            _ => None,
        })
        .collect();

    let union_types: Vec<UnionType> = code_model
        .unions()
        .filter_map(|id| ctx.caches.union.get(id))
        .filter_map(|ty| match ty.as_ref() {
            ClientType::Union(u) => Some(u.clone()),
            _ => None,
        })
        .collect();

    let models = ctx.finished_models()?;
    let builders = ctx
        .factory
        .map_client_builder(ctx, &service_client)?
        .into_iter()
        .collect();

    info!(
        models = models.len(),
        enums = enums.len(),
        unions = union_types.len(),
        responses = response_models.len(),
        "assembled client"
    );
    debug!(exceptions = ?exception_names, "mapped exceptions");

    Ok(Client {
        client_name: service_client.interface_name.clone(),
        client_description: code_model.description.clone(),
        enums,
        models,
        union_types,
        response_models,
        exceptions,
        service_clients: vec![service_client],
        builders,
        manager: None,
    })
}
