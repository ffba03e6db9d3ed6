//! Service-Client and Builder Mappers
//!
//! The service client owns the client-level properties (pipeline, endpoint,
//! credentials, service version), the method groups, and the methods of
//! operations that belong to no group. The builder describes how callers
//! configure and construct it.

use std::collections::HashSet;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info};

use super::{method_group, MapperError, MappingContext, Result};
use crate::clientmodel::{
    AsyncSyncClient, ClientBuilder, ClientBuilderTrait, ClientType, MethodGroupClient, Proxy, SecurityInfo,
    ServiceClient, ServiceClientProperty, ServiceVersion,
};
use crate::codemodel::{Parameter, ParameterLocation, ParameterOrigin, SecurityScheme};
use crate::naming;

/// Interface name of the service client.
pub fn interface_name(ctx: &MappingContext<'_>) -> Result<String> {
    let raw = ctx
        .settings
        .service_name
        .as_deref()
        .unwrap_or(ctx.code_model.name.as_str());
    let name = naming::get_type_name(raw);
    if name.is_empty() {
        return Err(MapperError::MissingSetting {
            setting: "service-name".to_string(),
            context: "service client (the code model has no name)".to_string(),
        });
    }
    Ok(name)
}

/// Service name: the interface name without its `Client` suffix.
pub fn service_name(ctx: &MappingContext<'_>) -> Result<String> {
    let interface = interface_name(ctx)?;
    Ok(match interface.strip_suffix("Client") {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => interface,
    })
}

pub fn service_version_name(ctx: &MappingContext<'_>) -> Result<String> {
    Ok(format!("{}ServiceVersion", service_name(ctx)?))
}

/// The client-level parameter that carries the service endpoint.
pub fn endpoint_parameter<'m>(ctx: &MappingContext<'m>) -> Option<&'m Parameter> {
    ctx.code_model
        .all_operations()
        .flat_map(|(_, operation)| operation.parameters.iter())
        .filter(|p| p.is_client())
        .find(|p| {
            p.origin == Some(ParameterOrigin::Endpoint)
                || p.location == ParameterLocation::Uri
                || p.name.eq_ignore_ascii_case("endpoint")
        })
}

/// Host template of the proxy, e.g. `{endpoint}`.
pub fn base_url(ctx: &MappingContext<'_>) -> String {
    endpoint_parameter(ctx)
        .map(|p| format!("{{{}}}", p.serialized_name()))
        .unwrap_or_default()
}

fn client_properties(ctx: &MappingContext<'_>) -> Result<Vec<ServiceClientProperty>> {
    let settings = ctx.settings;
    let mut seen = HashSet::new();
    let mut properties = Vec::new();

    for parameter in ctx
        .code_model
        .all_operations()
        .flat_map(|(_, operation)| operation.parameters.iter())
        .filter(|p| p.is_client())
    {
        if settings.data_plane && parameter.origin == Some(ParameterOrigin::ApiVersion) {
            continue;
        }
        let name = naming::get_property_name(&parameter.name);
        if !seen.insert(name.clone()) {
            continue;
        }
        let mapped = ctx.map_schema(parameter.schema)?.ok_or_else(|| {
            MapperError::InvalidInput(format!("client parameter '{}' has no schema", parameter.name))
        })?;
        let (client_type, default_value) = match mapped.as_ref() {
            ClientType::Constant(c) => (c.value_type.clone(), Some(c.value.clone())),
            _ => (mapped.clone(), None),
        };
        properties.push(ServiceClientProperty {
            description: parameter
                .description
                .clone()
                .unwrap_or_else(|| format!("The {name} parameter.")),
            name,
            client_type,
            read_only: true,
            default_value,
        });
    }

    if settings.data_plane {
        properties.push(ServiceClientProperty {
            name: "serviceVersion".to_string(),
            description: "Service version".to_string(),
            client_type: Arc::new(ClientType::class(&settings.package(&[]), &service_version_name(ctx)?)),
            read_only: true,
            default_value: None,
        });
    }

    properties.push(ServiceClientProperty {
        name: "httpPipeline".to_string(),
        description: "The HTTP pipeline to send requests through.".to_string(),
        client_type: Arc::new(ClientType::class("com.azure.core.http", "HttpPipeline")),
        read_only: true,
        default_value: None,
    });
    if settings.branded {
        properties.push(ServiceClientProperty {
            name: "serializerAdapter".to_string(),
            description: "The serializer to serialize an object into a string.".to_string(),
            client_type: Arc::new(ClientType::class("com.azure.core.util.serializer", "SerializerAdapter")),
            read_only: true,
            default_value: None,
        });
    }
    if settings.is_fluent() {
        properties.push(ServiceClientProperty {
            name: "defaultPollInterval".to_string(),
            description: "The default poll interval for long-running operation.".to_string(),
            client_type: Arc::new(ClientType::class("java.time", "Duration")),
            read_only: true,
            default_value: Some("Duration.ofSeconds(30)".to_string()),
        });
    }
    Ok(properties)
}

fn security(ctx: &MappingContext<'_>) -> Vec<SecurityInfo> {
    ctx.code_model
        .security
        .iter()
        .map(|scheme| match scheme {
            SecurityScheme::OAuth2 { scopes } => SecurityInfo::TokenCredential { scopes: scopes.clone() },
            SecurityScheme::Key { header_name } => SecurityInfo::KeyCredential {
                header_name: header_name.clone(),
            },
        })
        .collect()
}

/// Standard service-client mapper.
pub fn map_service_client(ctx: &MappingContext<'_>) -> Result<ServiceClient> {
    let settings = ctx.settings;
    let interface_name = interface_name(ctx)?;

    let as_impl = settings.generate_client_as_impl || (settings.is_fluent() && settings.generate_client_interfaces);
    let class_name = if as_impl {
        format!("{interface_name}Impl")
    } else {
        interface_name.clone()
    };
    let package = if as_impl {
        settings.implementation_package()
    } else {
        settings.package(&[])
    };

    let service_version = if settings.data_plane {
        if ctx.code_model.api_versions.is_empty() {
            return Err(MapperError::MissingSetting {
                setting: "api-versions".to_string(),
                context: format!("service client '{interface_name}'"),
            });
        }
        Some(ServiceVersion {
            name: service_version_name(ctx)?,
            package: settings.package(&[]),
            versions: ctx.code_model.api_versions.clone(),
        })
    } else {
        None
    };

    let properties = client_properties(ctx)?;

    let method_groups: Vec<MethodGroupClient> = ctx
        .code_model
        .operation_groups
        .par_iter()
        .filter(|group| !group.name.is_empty())
        .map(|group| method_group::map_cached(ctx, group).map(|mapped| mapped.as_ref().clone()))
        .collect::<Result<Vec<_>>>()?;

    let mut client_methods = Vec::new();
    let mut proxy_methods = Vec::new();
    for group in ctx.code_model.operation_groups.iter().filter(|g| g.name.is_empty()) {
        for operation in &group.operations {
            proxy_methods.push(ctx.factory.map_proxy_method(ctx, group, operation)?);
            client_methods.extend(ctx.factory.map_client_methods(ctx, group, operation)?);
        }
    }
    let proxy = (!proxy_methods.is_empty()).then(|| Proxy {
        name: format!("{interface_name}Service"),
        client_type_name: class_name.clone(),
        base_url: base_url(ctx),
        methods: proxy_methods,
    });

    info!(
        client = %interface_name,
        groups = method_groups.len(),
        methods = client_methods.len(),
        "mapped service client"
    );
    Ok(ServiceClient {
        package,
        class_name,
        interface_name,
        description: ctx.code_model.description.clone(),
        properties,
        method_groups,
        client_methods,
        proxy,
        service_version,
        security: security(ctx),
        context_type: Arc::new(ctx.factory.context_type()),
    })
}

/// Standard builder mapper; `None` when builders are disabled.
pub fn map_client_builder(ctx: &MappingContext<'_>, service_client: &ServiceClient) -> Result<Option<ClientBuilder>> {
    let settings = ctx.settings;
    if settings.client_builder_disabled {
        return Ok(None);
    }

    let name = format!("{}Builder", service_client.interface_name);
    let has_endpoint = service_client.property("endpoint").is_some() || endpoint_parameter(ctx).is_some();
    // Builders fall back to the newest service version when none is configured.
    let default_version = service_client.service_version.as_ref().and_then(ServiceVersion::latest);
    if settings.data_plane {
        if default_version.is_none() {
            return Err(MapperError::MissingSetting {
                setting: "api-versions".to_string(),
                context: format!("builder '{name}'"),
            });
        }
        if !has_endpoint {
            return Err(MapperError::MissingSetting {
                setting: "endpoint".to_string(),
                context: format!("builder '{name}'"),
            });
        }
    }

    let mut builder_traits = vec![if settings.branded {
        ClientBuilderTrait::Http
    } else {
        ClientBuilderTrait::Proxy
    }];
    builder_traits.push(ClientBuilderTrait::Configuration);
    for info in &service_client.security {
        let builder_trait = match info {
            SecurityInfo::TokenCredential { .. } => ClientBuilderTrait::TokenCredential,
            SecurityInfo::KeyCredential { .. } => ClientBuilderTrait::KeyCredential,
        };
        if !builder_traits.contains(&builder_trait) {
            builder_traits.push(builder_trait);
        }
    }
    if has_endpoint {
        builder_traits.push(ClientBuilderTrait::Endpoint);
    }

    let service = match service_client.interface_name.strip_suffix("Client") {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => service_client.interface_name.clone(),
    };
    let package = settings.package(&[]);
    let mut wrapped: Vec<(String, Option<String>)> = Vec::new();
    if !service_client.client_methods.is_empty() {
        wrapped.push((service.clone(), None));
    }
    for group in &service_client.method_groups {
        wrapped.push((group.interface_name.clone(), Some(group.name.clone())));
    }

    let async_clients = wrapped
        .iter()
        .map(|(base, group)| AsyncSyncClient {
            name: format!("{base}AsyncClient"),
            package: package.clone(),
            method_group: group.clone(),
        })
        .collect();
    let sync_clients = if settings.generate_sync_methods() {
        wrapped
            .iter()
            .map(|(base, group)| AsyncSyncClient {
                name: format!("{base}Client"),
                package: package.clone(),
                method_group: group.clone(),
            })
            .collect()
    } else {
        Vec::new()
    };

    debug!(builder = %name, traits = builder_traits.len(), default_version = ?default_version, "mapped client builder");
    Ok(Some(ClientBuilder {
        name,
        package,
        service_client_name: service_client.class_name.clone(),
        builder_traits,
        async_clients,
        sync_clients,
    }))
}
