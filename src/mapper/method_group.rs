//! Method-Group Mapper
//!
//! A named operation group becomes a method-group client with its own proxy
//! interface. Results are memoized per group name.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use super::{service_client, MappingContext, Result};
use crate::clientmodel::{ClientType, MethodGroupClient, Proxy, ServiceClientProperty};
use crate::codemodel::OperationGroup;
use crate::naming;

/// Memoizing entry point used by the client mapper.
pub fn map_cached(ctx: &MappingContext<'_>, group: &OperationGroup) -> Result<Arc<MethodGroupClient>> {
    if let Some(cached) = ctx.cached_method_group(&group.name) {
        return Ok(cached);
    }
    let mapped = Arc::new(ctx.factory.map_method_group(ctx, group)?);
    Ok(ctx.cache_method_group(&group.name, mapped))
}

/// Type names already taken by models, enums and unions.
fn reserved_type_names(ctx: &MappingContext<'_>) -> HashSet<String> {
    let code_model = ctx.code_model;
    code_model
        .objects()
        .map(|(id, _)| id)
        .chain(code_model.choices())
        .chain(code_model.sealed_choices())
        .chain(code_model.unions())
        .filter_map(|id| code_model.schema(id).ok())
        .map(|s| naming::get_type_name(&s.name))
        .collect()
}

/// Name of the proxy service interface for a group (or the client itself).
pub fn proxy_name(name: &str) -> String {
    format!("{}Service", naming::to_pascal_case(&naming::get_plural(name)))
}

/// Standard method-group mapper.
pub fn map_method_group(ctx: &MappingContext<'_>, group: &OperationGroup) -> Result<MethodGroupClient> {
    let settings = ctx.settings;

    let mut interface_name = naming::get_plural(&naming::get_type_name(&group.name));
    let collides_with_group = ctx
        .code_model
        .operation_groups
        .iter()
        .filter(|g| g.name != group.name)
        .any(|g| naming::get_type_name(&g.name) == interface_name);
    if collides_with_group || reserved_type_names(ctx).contains(&interface_name) {
        interface_name.push_str("Operations");
    }

    let class_name = if settings.is_fluent() {
        if settings.generate_client_interfaces {
            format!("{interface_name}ClientImpl")
        } else {
            format!("{interface_name}Client")
        }
    } else if settings.generate_client_as_impl || settings.generate_client_interfaces {
        format!("{interface_name}Impl")
    } else {
        interface_name.clone()
    };

    let package = if settings.generate_client_as_impl || settings.is_fluent() {
        settings.implementation_package()
    } else {
        settings.package(&[])
    };

    let mut client_methods = Vec::new();
    let mut proxy_methods = Vec::with_capacity(group.operations.len());
    for operation in &group.operations {
        proxy_methods.push(ctx.factory.map_proxy_method(ctx, group, operation)?);
        client_methods.extend(ctx.factory.map_client_methods(ctx, group, operation)?);
    }

    let mut properties = Vec::new();
    if settings.data_plane {
        properties.push(ServiceClientProperty {
            name: "serviceVersion".to_string(),
            description: "Service version".to_string(),
            client_type: Arc::new(ClientType::class(
                &settings.package(&[]),
                &service_client::service_version_name(ctx)?,
            )),
            read_only: true,
            default_value: None,
        });
    }

    let variable_type = if settings.generate_client_interfaces {
        interface_name.clone()
    } else {
        class_name.clone()
    };

    debug!(group = %group.name, class = %class_name, methods = client_methods.len(), "mapped method group");
    Ok(MethodGroupClient {
        name: group.name.clone(),
        package,
        variable_name: naming::to_camel_case(&interface_name),
        variable_type,
        description: group.description.clone(),
        proxy: Proxy {
            name: proxy_name(&group.name),
            client_type_name: class_name.clone(),
            base_url: service_client::base_url(ctx),
            methods: proxy_methods,
        },
        class_name,
        interface_name,
        client_methods,
        properties,
    })
}
