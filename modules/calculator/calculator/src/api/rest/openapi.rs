//! Route registration that keeps the axum router and the OpenAPI document in step.
//!
//! Every endpoint is declared once through [`OperationBuilder`]; `register`
//! adds the handler to the router and the operation to the [`OpenApiRegistry`].

use std::collections::BTreeMap;

use axum::Router;
use axum::handler::Handler;
use axum::routing::{MethodFilter, MethodRouter, on};
use calc_errors::{APPLICATION_PROBLEM_JSON, Problem};
use http::{Method, StatusCode};
use utoipa::openapi::{
    OpenApi, OpenApiBuilder, Ref, RefOr, Required,
    content::ContentBuilder,
    info::InfoBuilder,
    path::{HttpMethod, OperationBuilder as UOperationBuilder, ParameterBuilder, ParameterIn},
    path::{PathItemBuilder, PathsBuilder},
    response::{ResponseBuilder, ResponsesBuilder},
    schema::{Array, ComponentsBuilder, ObjectBuilder, Schema, SchemaType, Type},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    Path,
    Query,
}

#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub location: ParamLocation,
    pub param_type: Type,
    pub required: bool,
    pub description: &'static str,
}

#[derive(Debug, Clone)]
pub struct ResponseSpec {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub description: &'static str,
    pub schema_name: Option<String>,
    /// Body is a JSON array of `schema_name`.
    pub is_array: bool,
}

#[derive(Debug, Clone)]
pub struct OperationSpec {
    pub method: Method,
    pub path: &'static str,
    pub operation_id: &'static str,
    pub summary: &'static str,
    pub tag: &'static str,
    pub params: Vec<ParamSpec>,
    pub responses: Vec<ResponseSpec>,
}

/// Collects operations and component schemas for the OpenAPI document.
#[derive(Default)]
pub struct OpenApiRegistry {
    operations: Vec<OperationSpec>,
    schemas: BTreeMap<String, RefOr<Schema>>,
}

impl OpenApiRegistry {
    /// Register `T` and everything it references; returns the component name.
    pub fn ensure_schema<T: utoipa::ToSchema + 'static>(&mut self) -> String {
        use utoipa::PartialSchema;

        let root_name = T::name().into_owned();
        let mut collected = vec![(root_name.clone(), <T as PartialSchema>::schema())];
        T::schemas(&mut collected);
        for (name, schema) in collected {
            self.schemas.entry(name).or_insert(schema);
        }
        root_name
    }

    #[must_use]
    pub fn operations(&self) -> &[OperationSpec] {
        &self.operations
    }

    fn register_operation(&mut self, spec: OperationSpec) {
        self.operations.push(spec);
    }

    /// Aggregate the registered operations and schemas into one document.
    #[must_use]
    pub fn build_openapi(&self, title: &str, version: &str) -> OpenApi {
        tracing::debug!(
            operations = self.operations.len(),
            "building OpenAPI document"
        );

        let mut items: BTreeMap<&str, PathItemBuilder> = BTreeMap::new();
        for spec in &self.operations {
            let item = items
                .remove(spec.path)
                .unwrap_or_else(PathItemBuilder::new)
                .operation(http_method(&spec.method), build_operation(spec));
            items.insert(spec.path, item);
        }

        let mut paths = PathsBuilder::new();
        for (path, item) in items {
            paths = paths.path(path, item.build());
        }

        let mut components = ComponentsBuilder::new();
        for (name, schema) in &self.schemas {
            components = components.schema(name.clone(), schema.clone());
        }

        OpenApiBuilder::new()
            .info(
                InfoBuilder::new()
                    .title(title)
                    .version(version)
                    .description(Some("Scientific calculator operations and history"))
                    .build(),
            )
            .paths(paths.build())
            .components(Some(components.build()))
            .build()
    }
}

fn http_method(method: &Method) -> HttpMethod {
    match *method {
        Method::POST => HttpMethod::Post,
        Method::PUT => HttpMethod::Put,
        Method::DELETE => HttpMethod::Delete,
        Method::PATCH => HttpMethod::Patch,
        _ => HttpMethod::Get,
    }
}

fn build_operation(spec: &OperationSpec) -> utoipa::openapi::path::Operation {
    let mut op = UOperationBuilder::new()
        .operation_id(Some(spec.operation_id))
        .summary(Some(spec.summary))
        .tag(spec.tag);

    for p in &spec.params {
        let (parameter_in, required) = match p.location {
            ParamLocation::Path => (ParameterIn::Path, Required::True),
            ParamLocation::Query if p.required => (ParameterIn::Query, Required::True),
            ParamLocation::Query => (ParameterIn::Query, Required::False),
        };
        let schema = Schema::Object(
            ObjectBuilder::new()
                .schema_type(SchemaType::Type(p.param_type.clone()))
                .build(),
        );
        op = op.parameter(
            ParameterBuilder::new()
                .name(p.name)
                .parameter_in(parameter_in)
                .required(required)
                .description(Some(p.description))
                .schema(Some(schema))
                .build(),
        );
    }

    let mut responses = ResponsesBuilder::new();
    for r in &spec.responses {
        let mut resp = ResponseBuilder::new().description(r.description);
        if let Some(name) = &r.schema_name {
            let reference = RefOr::Ref(Ref::from_schema_name(name.clone()));
            let schema = if r.is_array {
                RefOr::T(Schema::Array(Array::new(reference)))
            } else {
                reference
            };
            let content = ContentBuilder::new().schema(Some(schema)).build();
            resp = resp.content(r.content_type, content);
        }
        responses = responses.response(r.status.as_u16().to_string(), resp.build());
    }
    op.responses(responses.build()).build()
}

fn method_filter(method: &Method) -> MethodFilter {
    match *method {
        Method::POST => MethodFilter::POST,
        Method::PUT => MethodFilter::PUT,
        Method::DELETE => MethodFilter::DELETE,
        Method::PATCH => MethodFilter::PATCH,
        _ => MethodFilter::GET,
    }
}

/// Fluent declaration of one endpoint.
#[must_use]
pub struct OperationBuilder {
    spec: OperationSpec,
    method_router: Option<MethodRouter>,
}

impl OperationBuilder {
    fn new(method: Method, path: &'static str) -> Self {
        Self {
            spec: OperationSpec {
                method,
                path,
                operation_id: path,
                summary: "",
                tag: "Calculator",
                params: Vec::new(),
                responses: Vec::new(),
            },
            method_router: None,
        }
    }

    pub fn get(path: &'static str) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: &'static str) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn delete(path: &'static str) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn operation_id(mut self, id: &'static str) -> Self {
        self.spec.operation_id = id;
        self
    }

    pub fn summary(mut self, summary: &'static str) -> Self {
        self.spec.summary = summary;
        self
    }

    pub fn tag(mut self, tag: &'static str) -> Self {
        self.spec.tag = tag;
        self
    }

    pub fn path_param(
        mut self,
        name: &'static str,
        param_type: Type,
        description: &'static str,
    ) -> Self {
        self.spec.params.push(ParamSpec {
            name,
            location: ParamLocation::Path,
            param_type,
            required: true,
            description,
        });
        self
    }

    pub fn query_param(
        mut self,
        name: &'static str,
        param_type: Type,
        required: bool,
        description: &'static str,
    ) -> Self {
        self.spec.params.push(ParamSpec {
            name,
            location: ParamLocation::Query,
            param_type,
            required,
            description,
        });
        self
    }

    pub fn handler<H, T>(mut self, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.method_router = Some(on(method_filter(&self.spec.method), handler));
        self
    }

    pub fn json_response<T: utoipa::ToSchema + 'static>(
        mut self,
        registry: &mut OpenApiRegistry,
        status: StatusCode,
        description: &'static str,
    ) -> Self {
        let name = registry.ensure_schema::<T>();
        self.spec.responses.push(ResponseSpec {
            status,
            content_type: "application/json",
            description,
            schema_name: Some(name),
            is_array: false,
        });
        self
    }

    pub fn json_array_response<T: utoipa::ToSchema + 'static>(
        mut self,
        registry: &mut OpenApiRegistry,
        status: StatusCode,
        description: &'static str,
    ) -> Self {
        let name = registry.ensure_schema::<T>();
        self.spec.responses.push(ResponseSpec {
            status,
            content_type: "application/json",
            description,
            schema_name: Some(name),
            is_array: true,
        });
        self
    }

    pub fn empty_response(mut self, status: StatusCode, description: &'static str) -> Self {
        self.spec.responses.push(ResponseSpec {
            status,
            content_type: "",
            description,
            schema_name: None,
            is_array: false,
        });
        self
    }

    pub fn problem_response(
        mut self,
        registry: &mut OpenApiRegistry,
        status: StatusCode,
        description: &'static str,
    ) -> Self {
        let name = registry.ensure_schema::<Problem>();
        self.spec.responses.push(ResponseSpec {
            status,
            content_type: APPLICATION_PROBLEM_JSON,
            description,
            schema_name: Some(name),
            is_array: false,
        });
        self
    }

    /// Add the handler to `router` and the operation to `registry`.
    ///
    /// Operations without a handler are documented but not routed.
    pub fn register(self, router: Router, registry: &mut OpenApiRegistry) -> Router {
        let path = self.spec.path;
        registry.register_operation(self.spec);
        match self.method_router {
            Some(method_router) => router.route(path, method_router),
            None => {
                tracing::warn!(path, "operation registered without a handler");
                router
            }
        }
    }
}
