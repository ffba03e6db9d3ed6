//! Example Data
//!
//! Random but reproducible JSON payloads for resolved models, used by mock
//! tests. Every call seeds its own generator, so the same model always yields
//! the same document.

use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Value};
use tracing::warn;

use crate::clientmodel::{Client, ClientModel, ClientModelProperty, ClientType, EnumType, PrimitiveType};

const SEED: u64 = 3;
const MAX_DEPTH: usize = 5;
const MAX_STRING_LEN: usize = 16;
const MAX_COLLECTION_LEN: usize = 4;

/// Value substituted for properties whose names look like credentials.
pub const SECRET_PLACEHOLDER: &str = "fakeSecretPlaceholder";

const SECRET_KEYS: &[&str] = &["key", "password", "secret", "token", "credential", "authorization", "code"];

/// Whether a serialized property name looks like it holds a credential.
pub fn is_secret_key(name: &str) -> bool {
    let lower = name.to_lowercase();
    SECRET_KEYS.iter().any(|key| lower.contains(key))
}

/// Generate an example document for one model.
///
/// With `for_request` set, properties a caller cannot send on create
/// (constants and read-only ones) are left out.
pub fn json_from_model(client: &Client, model: &ClientModel, for_request: bool) -> Value {
    ExampleGenerator::new(client, for_request).model(0, model)
}

/// Example documents for every model of a client, keyed by model name.
pub fn examples_for_client(client: &Client, for_request: bool) -> Map<String, Value> {
    client
        .models
        .iter()
        .map(|model| (model.name.clone(), json_from_model(client, model, for_request)))
        .collect()
}

struct ExampleGenerator<'c> {
    client: &'c Client,
    rng: StdRng,
    for_request: bool,
}

impl<'c> ExampleGenerator<'c> {
    fn new(client: &'c Client, for_request: bool) -> Self {
        Self {
            client,
            rng: StdRng::seed_from_u64(SEED),
            for_request,
        }
    }

    fn model(&mut self, depth: usize, model: &ClientModel) -> Value {
        let mut object = Map::new();

        if let Some(discriminator) = &model.polymorphic_discriminator {
            object.insert(discriminator.clone(), Value::String(model.serialized_name.clone()));
        }

        // Own properties first, then each ancestor's, nearest first.
        let mut chain = vec![model];
        let mut parent = model.parent_model_name.as_deref();
        while let Some(name) = parent {
            match self.client.model_by_name(name) {
                Some(parent_model) if !chain.iter().any(|m| m.id == parent_model.id) => {
                    chain.push(parent_model);
                    parent = parent_model.parent_model_name.as_deref();
                }
                _ => break,
            }
        }

        for current in chain {
            for property in current
                .properties
                .iter()
                .chain(current.flattened_parent_properties.iter())
            {
                if object.contains_key(&property.serialized_name) {
                    continue;
                }
                if let Some(value) = self.property(depth, property) {
                    object.insert(property.serialized_name.clone(), value);
                }
            }
        }
        Value::Object(object)
    }

    fn property(&mut self, depth: usize, property: &ClientModelProperty) -> Option<Value> {
        if property.polymorphic_discriminator || property.constant || property.additional_properties {
            return None;
        }
        if self.for_request && property.is_read_only_for_create() {
            return None;
        }
        if !property.required && depth > MAX_DEPTH {
            return None;
        }
        if is_secret_key(&property.serialized_name) {
            warn!(property = %property.serialized_name, "redacted credential-like property in example");
            return Some(Value::String(SECRET_PLACEHOLDER.to_string()));
        }
        let value = self.value(depth, &property.wire_type);
        (!value.is_null()).then_some(value)
    }

    fn value(&mut self, depth: usize, ty: &ClientType) -> Value {
        match ty {
            ClientType::Primitive { primitive } => self.primitive(*primitive),
            ClientType::Class(class) => {
                if let Some(id) = class.model {
                    return match self.client.model(id) {
                        Some(_) if depth > MAX_DEPTH => Value::Object(Map::new()),
                        Some(model) => self.model(depth + 1, model),
                        None => Value::Null,
                    };
                }
                self.builtin(&class.package, &class.name)
            }
            ClientType::List { element } | ClientType::Iterable { element } => {
                if depth > MAX_DEPTH {
                    return Value::Array(Vec::new());
                }
                let count = self.rng.gen_range(1..=MAX_COLLECTION_LEN);
                let items = (0..count)
                    .map(|_| self.value(depth + 1, element))
                    .filter(|v| !v.is_null())
                    .collect();
                Value::Array(items)
            }
            ClientType::Map { value } => {
                let mut map = Map::new();
                if depth > MAX_DEPTH {
                    return Value::Object(map);
                }
                let count = self.rng.gen_range(1..=MAX_COLLECTION_LEN);
                for _ in 0..count {
                    let entry = self.value(depth + 1, value);
                    if !entry.is_null() {
                        let key = self.string();
                        map.insert(key, entry);
                    }
                }
                Value::Object(map)
            }
            ClientType::Enum(e) => self.enum_value(e),
            ClientType::Constant(c) => literal(&c.value_type, &c.value),
            ClientType::Union(u) => match u.variants.first() {
                Some(variant) => self.value(depth, &variant.client_type),
                None => Value::Null,
            },
            ClientType::Generic(_) => Value::Null,
        }
    }

    fn primitive(&mut self, primitive: PrimitiveType) -> Value {
        match primitive {
            PrimitiveType::Void => Value::Null,
            PrimitiveType::Boolean => Value::Bool(self.rng.gen()),
            PrimitiveType::Byte => Value::from(self.rng.gen::<u8>()),
            PrimitiveType::Int => Value::from(self.rng.gen_range(0..i32::MAX)),
            PrimitiveType::Long => Value::from(self.rng.gen_range(0..i64::MAX)),
            PrimitiveType::Float | PrimitiveType::Double => Value::from(self.rng.gen::<f64>() * 100.0),
            PrimitiveType::Char => Value::String(self.letter().to_string()),
        }
    }

    fn builtin(&mut self, package: &str, name: &str) -> Value {
        match (package, name) {
            ("java.lang", "String") => Value::String(self.string()),
            ("java.lang", "Boolean") => self.primitive(PrimitiveType::Boolean),
            ("java.lang", "Integer") => self.primitive(PrimitiveType::Int),
            ("java.lang", "Long") => self.primitive(PrimitiveType::Long),
            ("java.lang", "Float") | ("java.lang", "Double") => self.primitive(PrimitiveType::Double),
            ("java.lang", "Object") | ("com.azure.core.util", "BinaryData") => {
                Value::String(format!("data{}", self.string()))
            }
            ("java.math", "BigDecimal") => Value::from(self.rng.gen::<f64>() * 100.0),
            ("java.time", "OffsetDateTime") => {
                Value::String(self.date_time().to_rfc3339_opts(SecondsFormat::Secs, true))
            }
            ("java.time", "LocalDate") => Value::String(self.date_time().format("%Y-%m-%d").to_string()),
            ("java.time", "Duration") => {
                let seconds = self.rng.gen_range(0..10 * 24 * 60 * 60);
                Value::String(format!("PT{seconds}S"))
            }
            ("java.util", "UUID") => Value::String(self.uuid()),
            ("", "byte[]") => Value::String(self.string()),
            _ => Value::Null,
        }
    }

    fn enum_value(&mut self, e: &EnumType) -> Value {
        let Some(value) = e.values.choose(&mut self.rng) else {
            return Value::Null;
        };
        literal(&e.element_type, &value.value)
    }

    fn letter(&mut self) -> char {
        char::from(self.rng.gen_range(b'a'..=b'z'))
    }

    fn string(&mut self) -> String {
        let len = self.rng.gen_range(1..=MAX_STRING_LEN);
        (0..len).map(|_| self.letter()).collect()
    }

    fn date_time(&mut self) -> DateTime<Utc> {
        let base = Utc
            .with_ymd_and_hms(2020, 12, 20, 0, 0, 0)
            .single()
            .unwrap_or_default();
        base + Duration::seconds(self.rng.gen_range(0..356 * 24 * 60 * 60))
    }

    fn uuid(&mut self) -> String {
        uuid::Builder::from_random_bytes(self.rng.gen()).into_uuid().to_string()
    }
}

/// A literal in the JSON form of its value type.
fn literal(value_type: &ClientType, raw: &str) -> Value {
    let numeric = match value_type {
        ClientType::Primitive { primitive } => !matches!(
            primitive,
            PrimitiveType::Void | PrimitiveType::Boolean | PrimitiveType::Char
        ),
        ClientType::Class(c) => {
            c.package == "java.lang" && matches!(c.name.as_str(), "Integer" | "Long" | "Float" | "Double")
        }
        _ => false,
    };
    if numeric || value_type.is_boolean() {
        if let Ok(parsed) = serde_json::from_str::<Value>(raw) {
            return parsed;
        }
    }
    Value::String(raw.to_string())
}
