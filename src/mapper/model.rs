//! Object and Model Mappers
//!
//! Object schemas become class types backed by a [`ClientModel`] in the
//! context's model arena. The class type is cached before the model's
//! properties, parents and children are resolved, so recursive references
//! see the placeholder and terminate.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use super::{schema, MapperError, MappingContext, Result};
use crate::clientmodel::{ClassType, ClientModel, ClientModelProperty, ClientType, Mutability};
use crate::codemodel::{
    DictionarySchema, ObjectSchema, Operation, OperationGroup, Property, Schema, SchemaId, SchemaKind, Usage,
    Visibility,
};
use crate::naming;

const ADDITIONAL_PROPERTIES: &str = "additionalProperties";

/// Resolve an object schema to its (memoized) class type.
pub fn map_object(
    ctx: &MappingContext<'_>,
    id: SchemaId,
    schema: &Schema,
    object: &ObjectSchema,
) -> Result<Arc<ClientType>> {
    if let Some(cached) = ctx.caches.object.get(id) {
        return Ok(cached);
    }

    if object.is_plain() && !ctx.settings.data_plane {
        debug!(schema = %schema.name, "plain object mapped to Object");
        return Ok(ctx.caches.object.insert(id, Arc::new(ClientType::object())));
    }

    let name = ctx.factory.model_name(ctx, schema, object);
    let package = ctx.settings.type_package(&name);
    let (class_type, inserted) = ctx.caches.object.get_or_insert_with(id, || {
        ClientType::Class(ClassType::model(package, name, ctx.allocate_model()))
    });
    if !inserted {
        return Ok(class_type);
    }

    let ClientType::Class(class) = class_type.as_ref() else {
        return Err(MapperError::InvalidInput(format!("{} did not map to a class", schema.key())));
    };
    let model = ctx.factory.map_model(ctx, schema, object, class)?;
    ctx.store_model(model);
    Ok(class_type)
}

/// Build the model behind a class placeholder.
pub fn map_model(
    ctx: &MappingContext<'_>,
    schema: &Schema,
    object: &ObjectSchema,
    class: &ClassType,
) -> Result<ClientModel> {
    let id = class
        .model
        .ok_or_else(|| MapperError::InvalidInput(format!("{} has no model slot", class.full_name())))?;

    let mut parent_model_name = None;
    let mut flattened_parent_properties = Vec::new();
    let mut additional_properties = None;
    for parent_id in &object.parents {
        let parent = ctx.code_model.schema(*parent_id)?;
        match &parent.kind {
            SchemaKind::Object(parent_object) => {
                if parent_model_name.is_none() {
                    parent_model_name = Some(ctx.map_type(*parent_id)?.name());
                } else {
                    let mut visited = HashSet::new();
                    collect_properties(ctx, *parent_id, parent_object, &mut visited, &mut flattened_parent_properties)?;
                }
            }
            SchemaKind::Dictionary(dictionary) => {
                additional_properties = Some(additional_properties_property(ctx, dictionary)?);
            }
            _ => {
                return Err(MapperError::InvalidInput(format!(
                    "{} cannot be a parent of {}",
                    parent.key(),
                    schema.key()
                )))
            }
        }
    }

    let discriminator = polymorphic_discriminator(ctx, object)?;
    let serialized_name = object
        .discriminator_value
        .clone()
        .unwrap_or_else(|| schema.name.clone());

    let mut properties = Vec::with_capacity(object.properties.len() + 1);
    if let Some(discriminator) = &discriminator {
        properties.push(discriminator_property(discriminator, &serialized_name));
    }
    for property in &object.properties {
        let replaced_by_discriminator = discriminator
            .as_deref()
            .is_some_and(|d| property.is_discriminator || property.serialized_name() == d);
        if replaced_by_discriminator {
            continue;
        }
        let mut mapped = ctx.factory.map_model_property(ctx, property)?;
        if additional_properties.is_some() && mapped.name == ADDITIONAL_PROPERTIES {
            mapped.name = format!("{ADDITIONAL_PROPERTIES}Property");
        }
        properties.push(mapped);
    }
    properties.extend(additional_properties);

    let mut derived_models = Vec::with_capacity(object.children.len());
    for child in &object.children {
        if let Some(model_id) = ctx.map_type(*child)?.model_id() {
            derived_models.push(model_id);
        }
    }

    let description = schema
        .description
        .clone()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| format!("The {} model.", class.name));

    debug!(model = %class.name, properties = properties.len(), "mapped model");
    Ok(ClientModel {
        id,
        name: class.name.clone(),
        package: class.package.clone(),
        description,
        parent_model_name,
        derived_models,
        polymorphic_discriminator: discriminator,
        serialized_name,
        properties,
        flattened_parent_properties,
        is_input: object.usage.contains(&Usage::Input),
        is_output: object.usage.contains(&Usage::Output),
        is_exception_error: object.usage.contains(&Usage::Exception),
    })
}

/// Properties of a non-class parent and its ancestors.
fn collect_properties(
    ctx: &MappingContext<'_>,
    id: SchemaId,
    object: &ObjectSchema,
    visited: &mut HashSet<SchemaId>,
    out: &mut Vec<ClientModelProperty>,
) -> Result<()> {
    if !visited.insert(id) {
        return Ok(());
    }
    for parent_id in &object.parents {
        if let SchemaKind::Object(parent) = &ctx.code_model.schema(*parent_id)?.kind {
            collect_properties(ctx, *parent_id, parent, visited, out)?;
        }
    }
    for property in &object.properties {
        out.push(ctx.factory.map_model_property(ctx, property)?);
    }
    Ok(())
}

/// Discriminator declared by the object or inherited through its class parents.
fn polymorphic_discriminator(ctx: &MappingContext<'_>, object: &ObjectSchema) -> Result<Option<String>> {
    let mut current = object;
    let mut visited = HashSet::new();
    loop {
        if let Some(discriminator) = &current.discriminator {
            return Ok(Some(discriminator.property.clone()));
        }
        let mut next = None;
        for parent_id in &current.parents {
            if let SchemaKind::Object(parent) = &ctx.code_model.schema(*parent_id)?.kind {
                if visited.insert(*parent_id) {
                    next = Some(parent);
                }
                break;
            }
        }
        match next {
            Some(parent) => current = parent,
            None => return Ok(None),
        }
    }
}

fn discriminator_property(discriminator: &str, value: &str) -> ClientModelProperty {
    let string = Arc::new(ClientType::string());
    ClientModelProperty {
        name: naming::get_property_name(discriminator),
        serialized_name: discriminator.to_string(),
        description: format!("The {discriminator} property."),
        client_type: string.clone(),
        wire_type: string,
        required: false,
        read_only: true,
        constant: false,
        default_value: Some(value.to_string()),
        polymorphic_discriminator: true,
        additional_properties: false,
        mutabilities: vec![Mutability::Read],
    }
}

fn additional_properties_property(
    ctx: &MappingContext<'_>,
    dictionary: &DictionarySchema,
) -> Result<ClientModelProperty> {
    let value = ctx.map_type(dictionary.element)?;
    let map = Arc::new(ClientType::Map { value });
    Ok(ClientModelProperty {
        name: ADDITIONAL_PROPERTIES.to_string(),
        serialized_name: String::new(),
        description: "Additional properties".to_string(),
        client_type: map.clone(),
        wire_type: map,
        required: false,
        read_only: false,
        constant: false,
        default_value: None,
        polymorphic_discriminator: false,
        additional_properties: true,
        mutabilities: Vec::new(),
    })
}

/// Boxed variant of a type when it is a primitive; otherwise the same `Arc`.
pub fn nullable_type(ty: &Arc<ClientType>) -> Arc<ClientType> {
    match ty.as_ref() {
        ClientType::Primitive { .. } => Arc::new(ty.as_nullable()),
        _ => ty.clone(),
    }
}

/// Standard model-property mapper.
pub fn map_model_property(ctx: &MappingContext<'_>, property: &Property) -> Result<ClientModelProperty> {
    let mapped = ctx.map_type(property.schema)?;
    let (client_type, constant, default_value) = match mapped.as_ref() {
        ClientType::Constant(c) => (c.value_type.clone(), true, Some(c.value.clone())),
        _ => (
            mapped.clone(),
            false,
            property.client_default.as_ref().map(schema::constant_value),
        ),
    };

    let nullable = property.nullable || !property.required;
    let wire_type = if nullable { nullable_type(&client_type) } else { client_type.clone() };
    let client_type = if nullable { wire_type.clone() } else { client_type };

    let mutabilities = property
        .visibility
        .as_deref()
        .map(|visibility| {
            visibility
                .iter()
                .filter_map(|v| match v {
                    Visibility::Create => Some(Mutability::Create),
                    Visibility::Read => Some(Mutability::Read),
                    Visibility::Update => Some(Mutability::Update),
                    Visibility::Delete | Visibility::Query => None,
                })
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    let read_only = property.read_only || mutabilities == [Mutability::Read];

    let serialized_name = property.serialized_name().to_string();
    let description = property
        .description
        .clone()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| format!("The {serialized_name} property."));

    Ok(ClientModelProperty {
        name: naming::get_property_name(&property.name),
        serialized_name,
        description,
        client_type,
        wire_type,
        required: property.required,
        read_only,
        constant,
        default_value,
        polymorphic_discriminator: false,
        additional_properties: false,
        mutabilities,
    })
}

/// Name of the typed-headers model of an operation.
pub fn headers_model_name(group: &OperationGroup, operation: &Operation) -> String {
    format!(
        "{}{}Headers",
        naming::get_type_name(&naming::get_plural(&group.name)),
        naming::to_pascal_case(&operation.name)
    )
}

/// Typed-headers model of an operation: one property per variable header.
/// Constant headers never produce a property; with none left there is no model.
pub fn map_headers_model(
    ctx: &MappingContext<'_>,
    group: &OperationGroup,
    operation: &Operation,
) -> Result<Option<ClientModel>> {
    let mut seen = HashSet::new();
    let mut properties = Vec::new();
    for header in operation.responses.iter().flat_map(|r| r.headers.iter()) {
        if !seen.insert(header.name.to_lowercase()) {
            continue;
        }
        if matches!(ctx.code_model.schema(header.schema)?.kind, SchemaKind::Constant(_)) {
            continue;
        }
        let wire_type = nullable_type(&ctx.map_type(header.schema)?);
        properties.push(ClientModelProperty {
            name: naming::get_property_name(&header.name),
            serialized_name: header.name.clone(),
            description: header
                .description
                .clone()
                .unwrap_or_else(|| format!("The {} property.", header.name)),
            client_type: wire_type.clone(),
            wire_type,
            required: false,
            read_only: false,
            constant: false,
            default_value: None,
            polymorphic_discriminator: false,
            additional_properties: false,
            mutabilities: Vec::new(),
        });
    }

    if properties.is_empty() {
        return Ok(None);
    }

    let name = headers_model_name(group, operation);
    let model = ClientModel {
        id: ctx.allocate_model(),
        package: ctx.settings.model_package(),
        description: format!("The {name} model."),
        serialized_name: name.clone(),
        name,
        parent_model_name: None,
        derived_models: Vec::new(),
        polymorphic_discriminator: None,
        properties,
        flattened_parent_properties: Vec::new(),
        is_input: false,
        is_output: true,
        is_exception_error: false,
    };
    ctx.store_model(model.clone());
    Ok(Some(model))
}
