//! Schema Mappers
//!
//! The dispatching mapper routes a schema handle to the mapper for its kind
//! and memoizes the result in that kind's cache. The per-kind mappers below
//! are the standard implementations; flavors reach them through
//! [`MapperFactory`](super::MapperFactory) and may replace any of them.

use std::sync::Arc;

use tracing::{debug, warn};

use super::{model, MapperError, MappingContext, Result};
use crate::clientmodel::{ClientType, ConstantType, EnumType, EnumValue, PrimitiveType, UnionType, UnionVariant};
use crate::codemodel::{
    ArraySchema, ChoiceSchema, ConstantSchema, DictionarySchema, OrSchema, PrimitiveKind, PrimitiveSchema,
    Schema, SchemaId, SchemaKind,
};
use crate::naming;
use crate::settings::{SequenceContainer, UnionPolicy};

/// Map an optional schema slot. An absent schema maps to an absent type.
pub fn map(ctx: &MappingContext<'_>, schema: Option<SchemaId>) -> Result<Option<Arc<ClientType>>> {
    match schema {
        Some(id) => map_required(ctx, id).map(Some),
        None => Ok(None),
    }
}

/// Map a schema; repeated calls for the same handle return the same `Arc`.
pub fn map_required(ctx: &MappingContext<'_>, id: SchemaId) -> Result<Arc<ClientType>> {
    let schema = ctx.code_model.schema(id)?;
    let factory = ctx.factory;
    let caches = &ctx.caches;

    match &schema.kind {
        SchemaKind::Primitive(p) => caches
            .primitive
            .get_or_compute(id, || factory.map_primitive(ctx, schema, p)),
        SchemaKind::Array(a) => caches.array.get_or_compute(id, || factory.map_array(ctx, schema, a)),
        SchemaKind::Dictionary(d) => caches
            .dictionary
            .get_or_compute(id, || factory.map_dictionary(ctx, schema, d)),
        SchemaKind::Choice(c) => caches.choice.get_or_compute(id, || factory.map_choice(ctx, schema, c)),
        SchemaKind::SealedChoice(c) => caches
            .sealed_choice
            .get_or_compute(id, || factory.map_sealed_choice(ctx, schema, c)),
        SchemaKind::Object(o) => model::map_object(ctx, id, schema, o),
        SchemaKind::Constant(c) => caches
            .constant
            .get_or_compute(id, || factory.map_constant(ctx, schema, c)),
        SchemaKind::Any => caches.any.get_or_compute(id, || factory.map_any(ctx, schema)),
        SchemaKind::Binary => caches.binary.get_or_compute(id, || factory.map_binary(ctx, schema)),
        SchemaKind::Or(o) => map_union_cached(ctx, id, schema, o),
        SchemaKind::Unknown => Err(MapperError::UnsupportedSchema { key: schema.key() }),
    }
}

fn map_union_cached(ctx: &MappingContext<'_>, id: SchemaId, schema: &Schema, or: &OrSchema) -> Result<Arc<ClientType>> {
    if let Some(cached) = ctx.caches.union.get(id) {
        return Ok(cached);
    }
    if !ctx.enter_union(id) {
        warn!(schema = %schema.name, "union refers to itself, collapsing inner reference to BinaryData");
        return Ok(Arc::new(ClientType::binary_data()));
    }
    let mapped = ctx.factory.map_union(ctx, schema, or);
    ctx.leave_union(id);
    Ok(ctx.caches.union.insert(id, Arc::new(mapped?)))
}

// ============================================================================
// Standard mappers
// ============================================================================

pub fn map_primitive(_ctx: &MappingContext<'_>, _schema: &Schema, primitive: &PrimitiveSchema) -> Result<ClientType> {
    let ty = match primitive.primitive {
        PrimitiveKind::Boolean => ClientType::boolean(),
        PrimitiveKind::Int32 => ClientType::primitive(PrimitiveType::Int),
        PrimitiveKind::Int64 => ClientType::primitive(PrimitiveType::Long),
        PrimitiveKind::Float32 => ClientType::primitive(PrimitiveType::Float),
        PrimitiveKind::Float64 => ClientType::primitive(PrimitiveType::Double),
        PrimitiveKind::Char => ClientType::primitive(PrimitiveType::Char),
        PrimitiveKind::Decimal => ClientType::class("java.math", "BigDecimal"),
        PrimitiveKind::String | PrimitiveKind::Time | PrimitiveKind::Url => ClientType::string(),
        PrimitiveKind::DateTime | PrimitiveKind::UnixTime => ClientType::class("java.time", "OffsetDateTime"),
        PrimitiveKind::Date => ClientType::class("java.time", "LocalDate"),
        PrimitiveKind::Duration => ClientType::class("java.time", "Duration"),
        PrimitiveKind::Uuid => ClientType::class("java.util", "UUID"),
        PrimitiveKind::ByteArray => ClientType::class("", "byte[]"),
    };
    Ok(ty)
}

pub fn map_array(ctx: &MappingContext<'_>, _schema: &Schema, array: &ArraySchema) -> Result<ClientType> {
    let element = ctx.map_type(array.element)?;
    Ok(match ctx.settings.sequence_container {
        SequenceContainer::List => ClientType::List { element },
        SequenceContainer::Iterable => ClientType::Iterable { element },
    })
}

pub fn map_dictionary(ctx: &MappingContext<'_>, _schema: &Schema, dictionary: &DictionarySchema) -> Result<ClientType> {
    let value = ctx.map_type(dictionary.element)?;
    Ok(ClientType::Map { value })
}

pub fn map_choice(ctx: &MappingContext<'_>, schema: &Schema, choice: &ChoiceSchema) -> Result<ClientType> {
    build_enum(ctx, schema, choice, true)
}

pub fn map_sealed_choice(ctx: &MappingContext<'_>, schema: &Schema, choice: &ChoiceSchema) -> Result<ClientType> {
    build_enum(ctx, schema, choice, false)
}

fn build_enum(ctx: &MappingContext<'_>, schema: &Schema, choice: &ChoiceSchema, expandable: bool) -> Result<ClientType> {
    let name = naming::get_type_name(&schema.name);
    let element_type = match choice.value_type {
        Some(id) => ctx.map_type(id)?,
        None => Arc::new(ClientType::string()),
    };
    let values = choice
        .choices
        .iter()
        .map(|c| EnumValue {
            name: naming::get_enum_member_name(c.name.as_deref().unwrap_or(&c.value)),
            value: c.value.clone(),
            description: c.description.clone(),
        })
        .collect();

    debug!(name = %name, expandable, "mapped enum");
    Ok(ClientType::Enum(EnumType {
        package: ctx.settings.type_package(&name),
        name,
        description: schema.description.clone(),
        element_type,
        values,
        expandable,
    }))
}

pub fn map_constant(ctx: &MappingContext<'_>, _schema: &Schema, constant: &ConstantSchema) -> Result<ClientType> {
    let value_type = ctx.map_type(constant.value_type)?;
    Ok(ClientType::Constant(ConstantType {
        value_type,
        value: constant_value(&constant.value),
    }))
}

/// Literal text of a constant value.
pub fn constant_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn map_any(_ctx: &MappingContext<'_>, _schema: &Schema) -> Result<ClientType> {
    Ok(ClientType::object())
}

pub fn map_binary(_ctx: &MappingContext<'_>, _schema: &Schema) -> Result<ClientType> {
    Ok(ClientType::binary_data())
}

pub fn map_union(ctx: &MappingContext<'_>, schema: &Schema, or: &OrSchema) -> Result<ClientType> {
    if ctx.settings.union_policy == UnionPolicy::BinaryData {
        return Ok(ClientType::binary_data());
    }

    let name = naming::get_type_name(&schema.name);
    let mut variants: Vec<UnionVariant> = Vec::with_capacity(or.any_of.len());
    for (index, id) in or.any_of.iter().enumerate() {
        let client_type = ctx.map_type(*id)?;
        let variant_schema = ctx.code_model.schema(*id)?;
        let mut variant_name = naming::get_type_name(&variant_schema.name);
        if variant_name.is_empty() || variants.iter().any(|v| v.name == variant_name) {
            variant_name = format!("Option{}", index + 1);
        }
        variants.push(UnionVariant {
            name: variant_name,
            client_type,
        });
    }

    Ok(ClientType::Union(UnionType {
        package: ctx.settings.type_package(&name),
        name,
        description: schema.description.clone(),
        variants,
    }))
}
