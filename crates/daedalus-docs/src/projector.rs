//! Route table to OpenAPI document projection.
//!
//! The projector walks declared routes without executing anything. Every
//! call uses a fresh [`SchemaRegistry`], so projecting the same routes twice
//! yields identical documents.

use daedalus_core::{Location, Route, Schema as Descriptor, Tag as RouteTag};
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::error::{DocsError, DocsResult};
use crate::model::{
    Info, MediaType, OpenApi, Operation, Parameter, ParameterIn, PathItem, RefOr, Reference,
    RequestBody, Response, SecurityRequirement, SecurityScheme, Server, Tag,
};
use crate::registry::SchemaRegistry;
use crate::translate::translate;

/// Default `openapi` field.
pub const DEFAULT_OPENAPI_VERSION: &str = "3.0.0";

const JSON_CONTENT_TYPE: &str = "application/json";

/// Parameter locations in the order they appear on an operation.
const PARAMETER_LOCATIONS: [(Location, ParameterIn); 3] = [
    (Location::PathParameters, ParameterIn::Path),
    (Location::QueryStringParameters, ParameterIn::Query),
    (Location::Headers, ParameterIn::Header),
];

/// Builds OpenAPI documents from routes.
///
/// # Example
///
/// ```
/// use daedalus_core::fixtures;
/// use daedalus_docs::SpecProjector;
///
/// let projector = SpecProjector::new()
///     .title("Example pet API")
///     .version("1.0.0")
///     .base_url("https://api.example.com")
///     .api_key_auth("ApiKeyAuth", "x-api-key");
///
/// let doc = projector.project(&fixtures::pet_routes()).unwrap();
/// assert_eq!(doc.openapi, "3.0.0");
/// assert!(doc.paths.contains_key("/pets/{id}"));
/// ```
#[derive(Debug, Clone)]
pub struct SpecProjector {
    title: String,
    version: String,
    description: Option<String>,
    base_url: Option<String>,
    openapi_version: String,
    security_schemes: IndexMap<String, SecurityScheme>,
}

impl Default for SpecProjector {
    fn default() -> Self {
        Self::new()
    }
}

impl SpecProjector {
    /// Create a projector with placeholder metadata.
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: "API".to_string(),
            version: "1.0.0".to_string(),
            description: None,
            base_url: None,
            openapi_version: DEFAULT_OPENAPI_VERSION.to_string(),
            security_schemes: IndexMap::new(),
        }
    }

    /// Set the API title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the API version.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the API description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the single server URL. Defaults to `/`.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Override the `openapi` field.
    #[must_use]
    pub fn openapi_version(mut self, version: impl Into<String>) -> Self {
        self.openapi_version = version.into();
        self
    }

    /// Add an API key security scheme read from `header`.
    #[must_use]
    pub fn api_key_auth(self, name: impl Into<String>, header: impl Into<String>) -> Self {
        self.security_scheme(name, SecurityScheme::api_key_header(header))
    }

    /// Add a bearer token security scheme.
    #[must_use]
    pub fn bearer_auth(self, name: impl Into<String>, format: Option<String>) -> Self {
        self.security_scheme(name, SecurityScheme::bearer(format))
    }

    /// Add a security scheme. Every scheme gates every operation.
    #[must_use]
    pub fn security_scheme(mut self, name: impl Into<String>, scheme: SecurityScheme) -> Self {
        self.security_schemes.insert(name.into(), scheme);
        self
    }

    /// Project `routes` into a document.
    ///
    /// When two routes share a path and method, the first one is documented.
    pub fn project(&self, routes: &[Route]) -> DocsResult<OpenApi> {
        let mut registry = SchemaRegistry::new();
        let mut paths: IndexMap<String, PathItem> = IndexMap::new();

        for route in routes {
            let method = route.method().as_str().to_ascii_lowercase();

            let item = paths.entry(route.path().to_string()).or_default();
            let slot = item
                .slot_mut(&method)
                .ok_or_else(|| DocsError::InvalidOperation {
                    operation_id: route.operation_id_str().to_string(),
                    reason: format!("unsupported method {}", route.method()),
                })?;

            if slot.is_some() {
                warn!(
                    path = route.path(),
                    method = %route.method(),
                    operation_id = route.operation_id_str(),
                    "Route shadowed by an earlier route, not documented"
                );
                continue;
            }
            // Shadowed routes never reach the registry.
            *slot = Some(build_operation(route, &mut registry)?);
        }

        let security = if self.security_schemes.is_empty() {
            Vec::new()
        } else {
            let requirement: SecurityRequirement = self
                .security_schemes
                .keys()
                .map(|name| (name.clone(), Vec::new()))
                .collect();
            vec![requirement]
        };

        debug!(
            routes = routes.len(),
            paths = paths.len(),
            schemas = registry.schema_count(),
            "Projected OpenAPI document"
        );

        Ok(OpenApi {
            openapi: self.openapi_version.clone(),
            info: Info {
                title: self.title.clone(),
                description: self.description.clone(),
                version: self.version.clone(),
            },
            servers: vec![Server {
                url: self.base_url.clone().unwrap_or_else(|| "/".to_string()),
                description: None,
            }],
            security,
            tags: collect_tags(routes),
            paths,
            components: registry.into_components(self.security_schemes.clone()),
        })
    }

    /// Project `routes` and serialize the document.
    pub fn project_json(&self, routes: &[Route]) -> DocsResult<String> {
        let doc = self.project(routes)?;
        Ok(serde_json::to_string(&doc)?)
    }
}

fn build_operation(route: &Route, registry: &mut SchemaRegistry) -> DocsResult<Operation> {
    let operation_id = route.operation_id_str();
    let mut parameters = Vec::new();
    let mut request_body = None;

    if let Some(validation) = route.validation_rules() {
        for (location, param_in) in PARAMETER_LOCATIONS {
            let Some(declared) = validation.parameters(location) else {
                continue;
            };
            for (field, descriptor) in declared {
                let name = descriptor.label_str().map_or_else(
                    || format!("{operation_id}{}{}", location.name_segment(), upper_camel(field)),
                    ToString::to_string,
                );
                let schema = registry.register_schema(&name, translate(descriptor))?;
                parameters.push(Parameter {
                    name: field.clone(),
                    location: param_in,
                    description: descriptor.meta().description.clone(),
                    required: location == Location::PathParameters || descriptor.is_required(),
                    schema,
                });
            }
        }

        if let Some(payload) = &validation.payload {
            request_body = Some(register_payload(operation_id, payload, registry)?);
        }
    }

    Ok(Operation {
        operation_id: operation_id.to_string(),
        summary: route.summary_str().map(ToString::to_string),
        description: route.description_str().map(ToString::to_string),
        tags: route.tags().iter().map(|t| t.name.clone()).collect(),
        parameters,
        request_body,
        responses: build_responses(route),
    })
}

fn register_payload(
    operation_id: &str,
    payload: &Descriptor,
    registry: &mut SchemaRegistry,
) -> DocsResult<RefOr<RequestBody>> {
    let name = format!("{operation_id}{}", Location::Payload.name_segment());
    let schema = registry.register_schema(&name, translate(payload))?;

    let description = payload
        .meta()
        .description
        .clone()
        .unwrap_or_else(|| format!("Request payload for {operation_id}"));

    let mut content = IndexMap::new();
    content.insert(
        JSON_CONTENT_TYPE.to_string(),
        MediaType {
            schema: Some(schema),
            example: payload.meta().example.clone(),
        },
    );

    let reference = registry.register_request_body(
        &name,
        RequestBody {
            description: Some(description),
            required: payload.is_required(),
            content,
        },
    )?;

    Ok(RefOr::Ref(Reference { reference }))
}

fn build_responses(route: &Route) -> IndexMap<String, Response> {
    if route.responses().is_empty() {
        let mut responses = IndexMap::new();
        responses.insert(
            "200".to_string(),
            Response {
                description: "Success".to_string(),
                content: None,
            },
        );
        return responses;
    }

    route
        .responses()
        .iter()
        .map(|(status, doc)| {
            (
                status.as_str().to_string(),
                Response {
                    description: doc.description.clone(),
                    content: doc.content.clone(),
                },
            )
        })
        .collect()
}

/// Tags from every route, one per name, described entries preferred.
fn collect_tags(routes: &[Route]) -> Vec<Tag> {
    let mut by_name: IndexMap<&str, &RouteTag> = IndexMap::new();
    for tag in routes.iter().flat_map(Route::tags) {
        by_name
            .entry(tag.name.as_str())
            .and_modify(|existing| {
                if existing.description.is_none() && tag.description.is_some() {
                    *existing = tag;
                }
            })
            .or_insert(tag);
    }

    let mut tags: Vec<Tag> = by_name
        .into_values()
        .map(|tag| Tag {
            name: tag.name.clone(),
            description: tag.description.clone(),
        })
        .collect();
    tags.sort_by(|a, b| {
        (a.description.is_none(), &a.description, &a.name)
            .cmp(&(b.description.is_none(), &b.description, &b.name))
    });
    tags
}

/// `x-api-key` becomes `XApiKey`, `page_size` becomes `PageSize`.
fn upper_camel(field: &str) -> String {
    field
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + chars.as_str()
            })
        })
        .collect()
}
