//! TypeSpec Client Model Mapper
//!
//! Pure Rust mapping engine that:
//! - Reads a language-agnostic code model (schemas and operations) from JSON
//! - Resolves it into a client model: types, models, methods, method groups,
//!   service clients and builders, ready for template rendering
//! - Supports flavors (default, fluent, android) through a mapper factory
//! - Produces reproducible example payloads for mock tests

pub mod codemodel;
pub mod clientmodel;
pub mod settings;
pub mod naming;
pub mod mapper;
pub mod example;

pub use clientmodel::Client;
pub use codemodel::CodeModel;
pub use mapper::{
    factory_for, map_code_model, DefaultMapperFactory, Flavor, MapperError, MapperFactory, MappingContext, Result,
};
pub use settings::Settings;
