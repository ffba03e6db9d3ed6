//! End-to-end mapping tests over a JSON code model

use serde_json::json;
use typespec_clientgen::clientmodel::{
    ClientBuilderTrait, ClientMethod, ClientMethodType, ClientType, CollectionFormat, ReturnShape,
};
use typespec_clientgen::codemodel::{Operation, Schema};
use typespec_clientgen::settings::{FluentMode, SyncMethods};
use typespec_clientgen::{
    factory_for, map_code_model, Client, CodeModel, DefaultMapperFactory, Flavor, MapperError, Settings,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn endpoint() -> serde_json::Value {
    json!({
        "name": "endpoint",
        "schema": 0,
        "required": true,
        "location": "uri",
        "implementation": "client",
        "origin": "endpoint"
    })
}

fn api_version() -> serde_json::Value {
    json!({
        "name": "apiVersion",
        "serialized-name": "api-version",
        "schema": 0,
        "required": true,
        "location": "query",
        "implementation": "client",
        "origin": "api-version"
    })
}

fn pet_store() -> CodeModel {
    let source = json!({
        "name": "PetStoreClient",
        "description": "Pet store service.",
        "api-versions": ["2023-01-01", "2024-01-01"],
        "security": [{ "type": "key", "header-name": "x-api-key" }],
        "schemas": [
            { "name": "string", "type": "primitive", "primitive": "string" },
            { "name": "int32", "type": "primitive", "primitive": "int32" },
            {
                "name": "Pet",
                "type": "object",
                "description": "A pet.",
                "usage": ["input", "output"],
                "properties": [
                    { "name": "name", "schema": 0, "required": true },
                    { "name": "age", "schema": 1 }
                ]
            },
            {
                "name": "PetList",
                "type": "object",
                "usage": ["output"],
                "properties": [
                    { "name": "value", "schema": 4, "required": true },
                    { "name": "nextLink", "schema": 0 }
                ]
            },
            { "name": "pets", "type": "array", "element": 2 },
            {
                "name": "Error",
                "type": "object",
                "usage": ["exception"],
                "properties": [
                    { "name": "code", "schema": 0, "required": true },
                    { "name": "message", "schema": 0 }
                ]
            }
        ],
        "operation-groups": [
            {
                "name": "pets",
                "operations": [
                    {
                        "name": "get",
                        "method": "get",
                        "path": "/pets/{name}",
                        "description": "Gets a pet by name.",
                        "parameters": [
                            endpoint(),
                            api_version(),
                            { "name": "name", "schema": 0, "required": true, "location": "path" }
                        ],
                        "responses": [{
                            "status-codes": ["200"],
                            "schema": 2,
                            "headers": [{ "name": "etag", "schema": 0 }]
                        }],
                        "exceptions": [{ "schema": 5 }]
                    },
                    {
                        "name": "list",
                        "method": "get",
                        "path": "/pets",
                        "paging": { "item-name": "value", "next-link-name": "nextLink" },
                        "parameters": [
                            endpoint(),
                            { "name": "tags", "schema": 4, "location": "query" }
                        ],
                        "responses": [{ "status-codes": ["200"], "schema": 3 }]
                    },
                    {
                        "name": "exists",
                        "method": "head",
                        "path": "/pets/{name}",
                        "parameters": [
                            endpoint(),
                            { "name": "name", "schema": 0, "required": true, "location": "path" }
                        ],
                        "responses": [{ "status-codes": ["200", "404"] }]
                    }
                ]
            }
        ]
    });
    CodeModel::from_json(&source.to_string()).unwrap()
}

fn settings() -> Settings {
    Settings::with_namespace("com.example.petstore")
}

fn map_default(code_model: &CodeModel, settings: &Settings) -> Client {
    map_code_model(code_model, settings, &DefaultMapperFactory).unwrap()
}

// ============================================================================
// Client Structure Tests
// ============================================================================

#[test]
fn test_service_client_structure() {
    let code_model = pet_store();
    let client = map_default(&code_model, &settings());

    assert_eq!(client.client_name, "PetStoreClient");
    assert_eq!(client.client_description.as_deref(), Some("Pet store service."));

    let service = client.service_client().unwrap();
    assert_eq!(service.class_name, "PetStoreClient");
    assert_eq!(service.package, "com.example.petstore");
    assert!(service.service_version.is_none());
    assert!(service.proxy.is_none());

    let properties: Vec<_> = service.properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(properties, vec!["endpoint", "apiVersion", "httpPipeline", "serializerAdapter"]);
}

#[test]
fn test_models_and_exceptions() {
    let code_model = pet_store();
    let client = map_default(&code_model, &settings());

    let names: Vec<_> = client.models.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Pet", "PetList", "Error", "PetsGetHeaders"]);

    let pet = client.model_by_name("Pet").unwrap();
    assert_eq!(pet.package, "com.example.petstore.models");
    assert_eq!(pet.description, "A pet.");
    assert!(pet.is_input && pet.is_output);
    let age = pet.property("age").unwrap();
    assert_eq!(age.client_type.to_string(), "Integer");

    let error = client.model_by_name("Error").unwrap();
    assert!(error.is_exception_error);
    assert_eq!(client.exceptions.len(), 1);
    assert_eq!(client.exceptions[0].name, "ErrorException");
    assert_eq!(client.exceptions[0].parent_type, "com.azure.core.exception.HttpResponseException");
}

#[test]
fn test_response_models() {
    let code_model = pet_store();
    let client = map_default(&code_model, &settings());

    assert_eq!(client.response_models.len(), 1);
    let response = &client.response_models[0];
    assert_eq!(response.name, "PetsGetResponse");
    assert_eq!(response.description, "Contains all response data for the get operation.");
    assert_eq!(response.headers_type.name(), "PetsGetHeaders");
    assert_eq!(response.body_type.name(), "Pet");

    let disabled = Settings {
        disable_typed_headers_methods: true,
        ..settings()
    };
    let client = map_default(&code_model, &disabled);
    assert!(client.response_models.is_empty());
    assert!(client.model_by_name("PetsGetHeaders").is_none());

    let generic = Settings {
        generic_response_types: true,
        ..settings()
    };
    let client = map_default(&code_model, &generic);
    assert!(client.response_models.is_empty());
    assert!(client.model_by_name("PetsGetHeaders").is_some());
}

#[test]
fn test_enums_and_unions_follow_schema_order() {
    let mut code_model = pet_store();
    let extra: Vec<Schema> = serde_json::from_value(json!([
        { "name": "Sizes", "type": "sealed-choice", "choices": [{ "value": "small" }, { "value": "large" }] },
        { "name": "Color", "type": "choice", "choices": [{ "value": "red" }, { "value": "blue" }] },
        { "name": "NameOrAge", "type": "or", "any-of": [0, 1] }
    ]))
    .unwrap();
    code_model.schemas.extend(extra);
    let mut sizes = code_model.operation_groups[0].clone();
    sizes.name = "sizes".to_string();
    code_model.operation_groups.push(sizes);

    let client = map_default(&code_model, &settings());
    // Open choices come before sealed ones.
    let enums: Vec<_> = client.enums.iter().map(|e| (e.name.as_str(), e.expandable)).collect();
    assert_eq!(enums, vec![("Color", true), ("Sizes", false)]);
    let unions: Vec<_> = client.union_types.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(unions, vec!["NameOrAge"]);

    // A group whose interface would shadow a generated type is suffixed.
    let groups: Vec<_> = client
        .service_client()
        .unwrap()
        .method_groups
        .iter()
        .map(|g| g.interface_name.as_str())
        .collect();
    assert_eq!(groups, vec!["Pets", "SizesOperations"]);
}

// ============================================================================
// Method Group Tests
// ============================================================================

#[test]
fn test_method_group() {
    let code_model = pet_store();
    let client = map_default(&code_model, &settings());
    let group = &client.service_client().unwrap().method_groups[0];

    assert_eq!(group.name, "pets");
    assert_eq!(group.interface_name, "Pets");
    assert_eq!(group.class_name, "Pets");
    assert_eq!(group.variable_name, "pets");
    assert_eq!(group.proxy.name, "PetsService");
    assert_eq!(group.proxy.base_url, "{endpoint}");
    assert_eq!(group.proxy.methods.len(), 3);
}

#[test]
fn test_simple_operation_methods() {
    let code_model = pet_store();
    let client = map_default(&code_model, &settings());
    let group = &client.service_client().unwrap().method_groups[0];

    let get: Vec<_> = group
        .client_methods
        .iter()
        .filter(|m| m.proxy_method == "get")
        .collect();
    let names: Vec<_> = get.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["getWithResponseAsync", "getAsync", "getWithResponse", "get"]);

    let get_async = get[1];
    assert_eq!(get_async.method_type, ClientMethodType::SimpleAsync);
    assert_eq!(get_async.return_value.client_type.to_string(), "Mono<Pet>");
    assert_eq!(
        get_async.return_value.description.as_deref(),
        Some("a pet by name on successful completion of {@link Mono}")
    );
    // Client-level parameters come from the client, not the caller.
    let parameters: Vec<_> = get_async.parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(parameters, vec!["name"]);

    let with_response = get[2];
    assert_eq!(with_response.return_value.client_type.to_string(), "Response<Pet>");
    let last = with_response.parameters.last().unwrap();
    assert_eq!(last.name, "context");
    assert_eq!(last.client_type.name(), "Context");

    let sync = get[3];
    assert_eq!(sync.return_value.client_type.name(), "Pet");
    assert_eq!(sync.return_value.description.as_deref(), Some("a pet by name"));
    assert_eq!(sync.return_shape(), ReturnShape::Single);
}

#[test]
fn test_head_operation_returns_boolean() {
    let code_model = pet_store();
    let client = map_default(&code_model, &settings());
    let group = &client.service_client().unwrap().method_groups[0];

    let exists = group.client_methods.iter().find(|m| m.name == "exists").unwrap();
    assert!(exists.return_value.client_type.is_boolean());
    assert_eq!(exists.return_value.description.as_deref(), Some("whether resource exists"));

    let proxy = group.proxy.methods.iter().find(|m| m.name == "exists").unwrap();
    assert_eq!(proxy.http_method, "HEAD");
    assert_eq!(proxy.expected_status_codes, vec![200, 404]);
    assert_eq!(proxy.return_type.to_string(), "Mono<Response<Boolean>>");
}

#[test]
fn test_paging_operation_methods() {
    let code_model = pet_store();
    let client = map_default(&code_model, &settings());
    let group = &client.service_client().unwrap().method_groups[0];

    let list: Vec<_> = group
        .client_methods
        .iter()
        .filter(|m| m.proxy_method == "list")
        .map(|m| (m.name.as_str(), m.return_value.client_type.to_string()))
        .collect();
    assert_eq!(
        list,
        vec![
            ("listAsync", "PagedFlux<Pet>".to_string()),
            ("listSinglePageAsync", "Mono<PagedResponse<Pet>>".to_string()),
            ("list", "PagedIterable<Pet>".to_string()),
        ]
    );

    let all = Settings {
        sync_methods: SyncMethods::All,
        ..settings()
    };
    let client = map_default(&code_model, &all);
    let group = &client.service_client().unwrap().method_groups[0];
    assert!(group.client_methods.iter().any(|m| m.name == "listSinglePage"));
}

#[test]
fn test_sync_methods_policy() {
    let code_model = pet_store();
    let method_names = |sync_methods: SyncMethods, operation: &str| -> Vec<String> {
        let settings = Settings {
            sync_methods,
            ..settings()
        };
        let client = map_default(&code_model, &settings);
        client.service_client().unwrap().method_groups[0]
            .client_methods
            .iter()
            .filter(|m| m.proxy_method == operation)
            .map(|m| m.name.clone())
            .collect()
    };

    assert_eq!(method_names(SyncMethods::None, "get"), vec!["getWithResponseAsync", "getAsync"]);
    assert_eq!(method_names(SyncMethods::None, "list"), vec!["listAsync", "listSinglePageAsync"]);
    assert_eq!(
        method_names(SyncMethods::All, "get"),
        vec!["getWithResponseAsync", "getAsync", "getWithResponse", "get"]
    );
    assert_eq!(
        method_names(SyncMethods::All, "list"),
        vec!["listAsync", "listSinglePageAsync", "list", "listSinglePage"]
    );
}

#[test]
fn test_long_running_operation_methods() {
    let mut code_model = pet_store();
    let create: Operation = serde_json::from_value(json!({
        "name": "create",
        "method": "put",
        "path": "/pets/{name}",
        "long-running": true,
        "parameters": [
            endpoint(),
            { "name": "name", "schema": 0, "required": true, "location": "path" }
        ],
        "responses": [{ "status-codes": ["200", "201"], "schema": 2 }]
    }))
    .unwrap();
    code_model.operation_groups[0].operations.push(create);

    let client = map_default(&code_model, &settings());
    let group = &client.service_client().unwrap().method_groups[0];
    let create: Vec<_> = group
        .client_methods
        .iter()
        .filter(|m| m.proxy_method == "create")
        .collect();

    let signatures: Vec<_> = create
        .iter()
        .map(|m| (m.name.as_str(), m.method_type, m.return_value.client_type.to_string()))
        .collect();
    assert_eq!(
        signatures,
        vec![
            (
                "beginCreateAsync",
                ClientMethodType::LongRunningBeginAsync,
                "PollerFlux<PollResult<Pet>, Pet>".to_string()
            ),
            ("createAsync", ClientMethodType::LongRunningAsync, "Mono<Pet>".to_string()),
            (
                "beginCreate",
                ClientMethodType::LongRunningBeginSync,
                "SyncPoller<PollResult<Pet>, Pet>".to_string()
            ),
            ("create", ClientMethodType::LongRunningSync, "Pet".to_string()),
        ]
    );

    assert_eq!(
        create[0].return_value.description.as_deref(),
        Some("the {@link PollerFlux} for polling of a pet")
    );
    assert_eq!(
        create[2].return_value.description.as_deref(),
        Some("the {@link SyncPoller} for polling of a pet")
    );
    assert_eq!(
        create[1].return_value.description.as_deref(),
        Some("a pet on successful completion of {@link Mono}")
    );
    // Pollers never take a request context.
    assert!(create.iter().all(|m| m.parameters.iter().all(|p| p.name != "context")));

    let proxy = group.proxy.methods.iter().find(|m| m.name == "create").unwrap();
    assert_eq!(proxy.http_method, "PUT");
    assert_eq!(proxy.expected_status_codes, vec![200, 201]);
}

#[test]
fn test_versioned_parameter_overloads() {
    let mut code_model = pet_store();
    let search: Operation = serde_json::from_value(json!({
        "name": "search",
        "method": "get",
        "path": "/pets/{name}/search",
        "parameters": [
            endpoint(),
            { "name": "name", "schema": 0, "required": true, "location": "path" },
            { "name": "tag", "schema": 0, "location": "query" },
            { "name": "color", "schema": 0, "location": "query", "added": ["2023-01-01", "2024-01-01"] },
            { "name": "owner", "schema": 0, "location": "query", "added": ["2024-01-01"] }
        ],
        "responses": [{ "status-codes": ["200"], "schema": 2 }]
    }))
    .unwrap();
    code_model.operation_groups[0].operations.push(search);

    let overload_names = |method: &ClientMethod| -> Vec<Vec<String>> {
        method
            .overloads
            .iter()
            .map(|signature| signature.iter().map(|p| p.name.clone()).collect())
            .collect()
    };

    let client = map_default(&code_model, &settings());
    let group = &client.service_client().unwrap().method_groups[0];
    let search_async = group.client_methods.iter().find(|m| m.name == "searchAsync").unwrap();
    let parameters: Vec<_> = search_async.parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(parameters, vec!["name", "tag", "color", "owner"]);
    assert_eq!(
        overload_names(search_async),
        vec![vec!["name", "tag"], vec!["name", "tag", "color"]]
    );

    let required_first = Settings {
        required_parameter_client_methods: true,
        ..settings()
    };
    let client = map_default(&code_model, &required_first);
    let group = &client.service_client().unwrap().method_groups[0];
    let search: Vec<_> = group
        .client_methods
        .iter()
        .filter(|m| m.proxy_method == "search")
        .collect();
    for method in search {
        if method.method_type == ClientMethodType::SimpleSyncRestResponse {
            assert_eq!(method.parameters.last().unwrap().name, "context");
            assert!(method.overloads.is_empty());
        } else {
            assert_eq!(
                overload_names(method),
                vec![vec!["name"], vec!["name", "tag"], vec!["name", "tag", "color"]],
                "{}",
                method.name
            );
        }
    }
}

#[test]
fn test_proxy_method_parameters() {
    let code_model = pet_store();
    let client = map_default(&code_model, &settings());
    let group = &client.service_client().unwrap().method_groups[0];

    let get = group.proxy.methods.iter().find(|m| m.name == "get").unwrap();
    assert_eq!(get.path, "/pets/{name}");
    assert_eq!(get.unexpected_response_exception.name(), "ErrorException");
    assert_eq!(get.return_type.to_string(), "Mono<Response<Pet>>");

    let references: Vec<_> = get
        .parameters
        .iter()
        .map(|p| (p.request_parameter_name.as_str(), p.parameter_reference.as_str()))
        .collect();
    assert_eq!(
        references,
        vec![
            ("endpoint", "this.client.getEndpoint()"),
            ("api-version", "this.client.getApiVersion()"),
            ("name", "name"),
        ]
    );

    let list = group.proxy.methods.iter().find(|m| m.name == "list").unwrap();
    assert_eq!(
        list.unexpected_response_exception.to_string(),
        "HttpResponseException"
    );
    let tags = list.parameters.iter().find(|p| p.name == "tags").unwrap();
    assert_eq!(tags.collection_format, Some(CollectionFormat::Csv));
    assert_eq!(*tags.wire_type, ClientType::string());
}

#[test]
fn test_parameter_colliding_with_client_property() {
    let mut code_model = pet_store();
    let update: Operation = serde_json::from_value(json!({
        "name": "update",
        "method": "put",
        "path": "/pets/{name}",
        "parameters": [
            endpoint(),
            { "name": "endpoint", "schema": 0, "required": true, "location": "query" },
            { "name": "apiVersion", "schema": 0, "location": "query", "owner-schema": 2 },
            { "name": "endpoint", "client-name": "target", "schema": 0, "location": "header" }
        ],
        "responses": [{ "status-codes": ["204"] }]
    }))
    .unwrap();
    code_model.operation_groups[0].operations.push(update);

    let client = map_default(&code_model, &settings());
    let group = &client.service_client().unwrap().method_groups[0];
    let update = group.client_methods.iter().find(|m| m.name == "update").unwrap();

    let names: Vec<_> = update.parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["updateEndpoint", "petApiVersion", "target"]);
    assert!(update.return_value.client_type.is_void());
    assert!(update.return_value.description.is_none());
}

#[test]
fn test_method_groups_keep_input_order() {
    let mut code_model = pet_store();
    let template = code_model.operation_groups[0].clone();
    for name in ["owners", "vets", "clinics"] {
        let mut group = template.clone();
        group.name = name.to_string();
        code_model.operation_groups.push(group);
    }

    let client = map_default(&code_model, &settings());
    let names: Vec<_> = client.service_client().unwrap().method_groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["pets", "owners", "vets", "clinics"]);
}

// ============================================================================
// Builder Tests
// ============================================================================

#[test]
fn test_client_builder() {
    let code_model = pet_store();
    let client = map_default(&code_model, &settings());

    assert_eq!(client.builders.len(), 1);
    let builder = &client.builders[0];
    assert_eq!(builder.name, "PetStoreClientBuilder");
    assert_eq!(
        builder.builder_traits,
        vec![
            ClientBuilderTrait::Http,
            ClientBuilderTrait::Configuration,
            ClientBuilderTrait::KeyCredential,
            ClientBuilderTrait::Endpoint,
        ]
    );
    let async_clients: Vec<_> = builder.async_clients.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(async_clients, vec!["PetsAsyncClient"]);
    let sync_clients: Vec<_> = builder.sync_clients.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(sync_clients, vec!["PetsClient"]);

    let async_only = Settings {
        sync_methods: SyncMethods::None,
        ..settings()
    };
    let client = map_default(&code_model, &async_only);
    assert!(client.builders[0].sync_clients.is_empty());
    let group = &client.service_client().unwrap().method_groups[0];
    assert!(group.client_methods.iter().all(|m| !m.method_type.is_sync()));

    let disabled = Settings {
        client_builder_disabled: true,
        ..settings()
    };
    assert!(map_default(&code_model, &disabled).builders.is_empty());
}

// ============================================================================
// Data-Plane Tests
// ============================================================================

#[test]
fn test_data_plane_service_version() {
    let code_model = pet_store();
    let data_plane = Settings {
        data_plane: true,
        ..settings()
    };
    let client = map_default(&code_model, &data_plane);
    let service = client.service_client().unwrap();

    let version = service.service_version.as_ref().unwrap();
    assert_eq!(version.name, "PetStoreServiceVersion");
    assert_eq!(version.latest(), Some("2024-01-01"));
    assert!(service.property("apiVersion").is_none());
    assert!(service.property("serviceVersion").is_some());

    let group = &service.method_groups[0];
    assert!(group.properties.iter().any(|p| p.name == "serviceVersion"));
    let get = group.proxy.methods.iter().find(|m| m.name == "get").unwrap();
    let api_version = get
        .parameters
        .iter()
        .find(|p| p.request_parameter_name == "api-version")
        .unwrap();
    assert_eq!(api_version.parameter_reference, "this.client.getServiceVersion().getVersion()");
}

#[test]
fn test_data_plane_requires_api_versions() {
    let mut code_model = pet_store();
    code_model.api_versions.clear();
    let data_plane = Settings {
        data_plane: true,
        ..settings()
    };

    match map_code_model(&code_model, &data_plane, &DefaultMapperFactory) {
        Err(MapperError::MissingSetting { setting, .. }) => assert_eq!(setting, "api-versions"),
        other => panic!("expected missing api-versions, got {:?}", other.map(|c| c.client_name)),
    }
}

#[test]
fn test_data_plane_builder_requires_endpoint() {
    let mut code_model = pet_store();
    for group in &mut code_model.operation_groups {
        for operation in &mut group.operations {
            operation.parameters.retain(|p| p.name != "endpoint");
        }
    }
    let data_plane = Settings {
        data_plane: true,
        ..settings()
    };

    match map_code_model(&code_model, &data_plane, &DefaultMapperFactory) {
        Err(MapperError::MissingSetting { setting, context }) => {
            assert_eq!(setting, "endpoint");
            assert!(context.contains("PetStoreClientBuilder"));
        }
        other => panic!("expected missing endpoint, got {:?}", other.map(|c| c.client_name)),
    }
}

#[test]
fn test_missing_namespace() {
    let code_model = pet_store();
    let result = map_code_model(&code_model, &Settings::default(), &DefaultMapperFactory);
    assert!(matches!(result, Err(MapperError::MissingSetting { setting, .. }) if setting == "namespace"));
}

// ============================================================================
// Flavor Tests
// ============================================================================

#[test]
fn test_fluent_flavor() {
    let code_model = pet_store();
    let fluent = Settings {
        fluent: FluentMode::Lite,
        ..settings()
    };
    let factory = factory_for(Flavor::Fluent);
    let client = map_code_model(&code_model, &fluent, factory.as_ref()).unwrap();

    assert!(client.model_by_name("PetInner").is_some());
    assert!(client.model_by_name("PetListInner").is_some());
    assert!(client.model_by_name("Error").is_some());
    assert_eq!(
        client.exceptions[0].parent_type,
        "com.azure.core.management.exception.ManagementException"
    );

    let service = client.service_client().unwrap();
    assert!(service.property("defaultPollInterval").is_some());
    let group = &service.method_groups[0];
    assert_eq!(group.class_name, "PetsClient");
    assert_eq!(group.package, "com.example.petstore.implementation");
    assert!(client.manager.is_none());
}

#[test]
fn test_fluent_premium_manager() {
    let code_model = pet_store();
    let premium = Settings {
        fluent: FluentMode::Premium,
        ..Settings::with_namespace("com.azure.resourcemanager.petstore.generated")
    };
    let factory = factory_for(Flavor::Fluent);
    let client = map_code_model(&code_model, &premium, factory.as_ref()).unwrap();

    let manager = client.manager.unwrap();
    assert_eq!(manager.name, "PetstoreManager");
    assert_eq!(manager.package, "com.azure.resourcemanager.petstore");
    assert_eq!(manager.service_name, "Petstore");
}

#[test]
fn test_fluent_premium_outside_resource_manager_namespace() {
    let code_model = pet_store();
    let premium = Settings {
        fluent: FluentMode::Premium,
        ..settings()
    };
    let factory = factory_for(Flavor::Fluent);

    match map_code_model(&code_model, &premium, factory.as_ref()) {
        Err(MapperError::AmbiguousFlavor { package }) => assert_eq!(package, "com.example.petstore"),
        other => panic!("expected ambiguous flavor, got {:?}", other.map(|c| c.client_name)),
    }
}

#[test]
fn test_android_flavor() {
    let code_model = pet_store();
    let factory = factory_for(Flavor::Android);
    assert_eq!(factory.flavor(), Flavor::Android);
    let client = map_code_model(&code_model, &settings(), factory.as_ref()).unwrap();
    let group = &client.service_client().unwrap().method_groups[0];

    let get_async = group.client_methods.iter().find(|m| m.name == "getAsync").unwrap();
    assert!(get_async.return_value.client_type.is_void());
    assert!(get_async.return_value.description.is_none());
    let callback = get_async.parameters.last().unwrap();
    assert_eq!(callback.name, "callback");
    assert_eq!(callback.client_type.to_string(), "Callback<Pet>");

    let with_response = group.client_methods.iter().find(|m| m.name == "getWithResponse").unwrap();
    let context = with_response.parameters.last().unwrap();
    assert_eq!(
        context.client_type.as_ref(),
        &ClientType::class("com.azure.android.core.util", "Context")
    );
    assert_eq!(
        client.exceptions[0].parent_type,
        "com.azure.android.core.http.exception.HttpResponseException"
    );
}
