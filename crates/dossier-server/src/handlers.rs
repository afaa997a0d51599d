//! Request handlers for the REST API.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use dossier_core::{
    AccessLevel, Agent, AgentFilter, AgentForm, AgentStore, CodenameGenerator, StoreError,
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Upper bound on the `attempts` query parameter of the codename endpoint.
const MAX_GENERATE_ATTEMPTS: usize = 1000;

type HandlerError = (StatusCode, Json<ErrorResponse>);

// --- Auth helper ---

fn extract_api_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn check_auth(state: &AppState, headers: &HeaderMap) -> Result<(), HandlerError> {
    if !state.check_auth(extract_api_key(headers)) {
        return Err(error(
            StatusCode::UNAUTHORIZED,
            "Unauthorized",
            Some("Invalid or missing API key".to_string()),
        ));
    }
    Ok(())
}

// --- Store helpers ---

/// Run a store call on the blocking pool.
async fn with_store<T, F>(state: &AppState, f: F) -> Result<Result<T, StoreError>, HandlerError>
where
    T: Send + 'static,
    F: FnOnce(&AgentStore) -> Result<T, StoreError> + Send + 'static,
{
    let store = Arc::clone(state.store());
    tokio::task::spawn_blocking(move || f(&*store))
        .await
        .map_err(|e| {
            tracing::error!("Store task failed: {}", e);
            error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error",
                Some(e.to_string()),
            )
        })
}

/// Map a store error to a response, echoing the submitted form where the
/// client is expected to correct and resubmit it.
fn store_error(err: StoreError, form: Option<AgentForm>) -> HandlerError {
    match err {
        StoreError::NotFound(id) => error(
            StatusCode::NOT_FOUND,
            "Agent not found",
            Some(format!("No agent with id {}", id)),
        ),
        StoreError::Validation(invalid) => {
            let detail = invalid.to_string();
            let fields = serde_json::to_value(&invalid).ok();
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse {
                    error: "Validation failed".to_string(),
                    detail: Some(detail),
                    form,
                    fields,
                }),
            )
        }
        StoreError::Constraint { field } => {
            let detail = format!("An agent with this {} already exists", field);
            (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: "Conflict".to_string(),
                    detail: Some(detail),
                    form,
                    fields: Some(serde_json::json!([{ "field": field, "issue": "duplicate" }])),
                }),
            )
        }
        other => {
            tracing::error!("Store failure: {}", other);
            error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Storage error",
                Some(other.to_string()),
            )
        }
    }
}

fn error(status: StatusCode, error: &str, detail: Option<String>) -> HandlerError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            detail,
            form: None,
            fields: None,
        }),
    )
}

// --- Response types ---

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub detail: Option<String>,
    /// The rejected submission, returned unchanged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<AgentForm>,
    /// Which fields were rejected and why.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<serde_json::Value>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub uptime_secs: u64,
    pub agents: usize,
    pub codename_attempts: usize,
}

#[derive(Serialize)]
pub struct AccessLevelOption {
    pub value: &'static str,
    pub label: &'static str,
}

fn access_level_options() -> Vec<AccessLevelOption> {
    AccessLevel::ALL
        .iter()
        .map(|level| AccessLevelOption {
            value: level.as_str(),
            label: level.localized_label(),
        })
        .collect()
}

#[derive(Serialize)]
pub struct FormResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub form: AgentForm,
    pub access_levels: Vec<AccessLevelOption>,
}

#[derive(Serialize)]
pub struct CodenameResponse {
    pub codename: String,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub id: i64,
    pub deleted: bool,
}

#[derive(Serialize)]
pub struct NukeResponse {
    pub deleted: usize,
}

// --- Request types ---

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
}

impl ListQuery {
    fn into_filter(self) -> Result<AgentFilter, HandlerError> {
        let access_level = match self.level.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<AccessLevel>().map_err(|e| {
                error(StatusCode::BAD_REQUEST, "Invalid level", Some(e.to_string()))
            })?),
        };
        Ok(AgentFilter {
            codename: self.q,
            access_level,
        })
    }
}

#[derive(Deserialize)]
pub struct GenerateQuery {
    #[serde(default)]
    pub attempts: Option<usize>,
}

// --- Handlers ---

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Lightweight liveness check: the process is running.
pub async fn health_live() -> StatusCode {
    StatusCode::OK
}

/// Readiness check: the agent store answers queries.
pub async fn health_ready(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, HandlerError> {
    match tokio::time::timeout(Duration::from_secs(5), with_store(&state, |s| s.count())).await {
        Ok(Ok(Ok(agents))) => Ok(Json(serde_json::json!({
            "status": "ready",
            "agents": agents,
        }))),
        Ok(Ok(Err(e))) => Err(error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Not ready",
            Some(format!("Store check failed: {}", e)),
        )),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Not ready",
            Some("Health check timed out after 5s".to_string()),
        )),
    }
}

pub async fn status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StatusResponse>, HandlerError> {
    check_auth(&state, &headers)?;

    let agents = with_store(&state, |s| s.count())
        .await?
        .map_err(|e| store_error(e, None))?;

    Ok(Json(StatusResponse {
        uptime_secs: state.uptime_secs(),
        agents,
        codename_attempts: state.generator().max_attempts(),
    }))
}

pub async fn list_agents(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<Agent>>, HandlerError> {
    check_auth(&state, &headers)?;

    let filter = params.into_filter()?;
    let agents = with_store(&state, move |s| s.list(&filter))
        .await?
        .map_err(|e| store_error(e, None))?;
    Ok(Json(agents))
}

/// Blank add form with the default access level preselected.
pub async fn new_agent_form(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<FormResponse>, HandlerError> {
    check_auth(&state, &headers)?;

    Ok(Json(FormResponse {
        id: None,
        form: AgentForm {
            access_level: Some(AccessLevel::default().as_str().to_string()),
            ..AgentForm::default()
        },
        access_levels: access_level_options(),
    }))
}

pub async fn create_agent(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<AgentForm>,
) -> Result<(StatusCode, Json<Agent>), HandlerError> {
    check_auth(&state, &headers)?;

    let fields = form
        .to_fields()
        .map_err(|e| store_error(e.into(), Some(form.clone())))?;

    let agent = with_store(&state, move |s| s.create(fields))
        .await?
        .map_err(|e| store_error(e, Some(form)))?;
    tracing::info!("Agent {} created ({})", agent.id, agent.codename);
    Ok((StatusCode::CREATED, Json(agent)))
}

pub async fn generate_codename(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<GenerateQuery>,
) -> Result<Json<CodenameResponse>, HandlerError> {
    check_auth(&state, &headers)?;

    let generator = params
        .attempts
        .map(|n| CodenameGenerator::new(n.min(MAX_GENERATE_ATTEMPTS)))
        .unwrap_or_else(|| state.generator());

    let codename = with_store(&state, move |s| generator.generate_unique(s))
        .await?
        .map_err(|e| store_error(e, None))?;
    Ok(Json(CodenameResponse { codename }))
}

/// An agent's dossier.
pub async fn get_agent(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Agent>, HandlerError> {
    check_auth(&state, &headers)?;

    let agent = with_store(&state, move |s| s.get(id))
        .await?
        .map_err(|e| store_error(e, None))?;
    Ok(Json(agent))
}

/// Edit form prefilled with the agent's current values.
pub async fn edit_agent_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<FormResponse>, HandlerError> {
    check_auth(&state, &headers)?;

    let agent = with_store(&state, move |s| s.get(id))
        .await?
        .map_err(|e| store_error(e, None))?;
    Ok(Json(FormResponse {
        id: Some(agent.id),
        form: AgentForm::from_agent(&agent),
        access_levels: access_level_options(),
    }))
}

pub async fn update_agent(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(form): Json<AgentForm>,
) -> Result<Json<Agent>, HandlerError> {
    check_auth(&state, &headers)?;

    let fields = match form.to_fields() {
        Ok(fields) => fields,
        Err(invalid) => {
            // A missing agent is reported ahead of bad input.
            with_store(&state, move |s| s.get(id))
                .await?
                .map_err(|e| store_error(e, None))?;
            return Err(store_error(invalid.into(), Some(form)));
        }
    };

    let agent = with_store(&state, move |s| s.update(id, fields))
        .await?
        .map_err(|e| store_error(e, Some(form)))?;
    tracing::info!("Agent {} updated ({})", agent.id, agent.codename);
    Ok(Json(agent))
}

pub async fn delete_agent(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, HandlerError> {
    check_auth(&state, &headers)?;

    with_store(&state, move |s| s.delete(id))
        .await?
        .map_err(|e| store_error(e, None))?;
    tracing::info!("Agent {} deleted", id);
    Ok(Json(DeleteResponse { id, deleted: true }))
}

/// Delete every agent. No confirmation step.
pub async fn nuke(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<NukeResponse>, HandlerError> {
    check_auth(&state, &headers)?;

    let deleted = with_store(&state, |s| s.delete_all())
        .await?
        .map_err(|e| store_error(e, None))?;
    Ok(Json(NukeResponse { deleted }))
}

pub async fn openapi() -> Json<serde_json::Value> {
    let agent_ref = serde_json::json!({ "$ref": "#/components/schemas/Agent" });
    let form_ref = serde_json::json!({ "$ref": "#/components/schemas/AgentForm" });
    let error_ref = serde_json::json!({ "$ref": "#/components/schemas/ErrorResponse" });
    let id_param = serde_json::json!({ "name": "id", "in": "path", "required": true, "schema": { "type": "integer", "format": "int64" } });
    let json_body = |schema: &serde_json::Value| serde_json::json!({ "application/json": { "schema": schema } });

    Json(serde_json::json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Dossier Agent Registry API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "REST API for listing, searching, and editing agent dossiers."
        },
        "paths": {
            "/health": {
                "get": {
                    "summary": "Health check",
                    "operationId": "health",
                    "responses": { "200": { "description": "Server is healthy", "content": json_body(&serde_json::json!({ "$ref": "#/components/schemas/HealthResponse" })) } }
                }
            },
            "/status": {
                "get": {
                    "summary": "Server status",
                    "operationId": "status",
                    "security": [{ "bearerAuth": [] }],
                    "responses": { "200": { "description": "Uptime and record count" } }
                }
            },
            "/agents": {
                "get": {
                    "summary": "List agents",
                    "operationId": "listAgents",
                    "security": [{ "bearerAuth": [] }],
                    "parameters": [
                        { "name": "q", "in": "query", "required": false, "description": "Case-insensitive codename substring", "schema": { "type": "string" } },
                        { "name": "level", "in": "query", "required": false, "schema": { "$ref": "#/components/schemas/AccessLevel" } }
                    ],
                    "responses": {
                        "200": { "description": "Matching agents ordered by id", "content": json_body(&serde_json::json!({ "type": "array", "items": agent_ref })) },
                        "400": { "description": "Unknown access level", "content": json_body(&error_ref) }
                    }
                },
                "post": {
                    "summary": "Create an agent",
                    "operationId": "createAgent",
                    "security": [{ "bearerAuth": [] }],
                    "requestBody": { "required": true, "content": json_body(&form_ref) },
                    "responses": {
                        "201": { "description": "Agent created", "content": json_body(&agent_ref) },
                        "409": { "description": "Codename or email already in use", "content": json_body(&error_ref) },
                        "422": { "description": "Blank, overlong, or unknown field values", "content": json_body(&error_ref) }
                    }
                }
            },
            "/agents/new": {
                "description": "Static path; it shadows /agents/{id} for the literal id `new`, so methods other than GET return 405.",
                "get": {
                    "summary": "Blank add form",
                    "operationId": "newAgentForm",
                    "security": [{ "bearerAuth": [] }],
                    "responses": { "200": { "description": "Form defaults and access levels" } }
                }
            },
            "/agents/{id}": {
                "get": {
                    "summary": "Agent dossier",
                    "operationId": "getAgent",
                    "security": [{ "bearerAuth": [] }],
                    "parameters": [id_param],
                    "responses": {
                        "200": { "description": "The agent", "content": json_body(&agent_ref) },
                        "404": { "description": "No such agent", "content": json_body(&error_ref) }
                    }
                },
                "put": {
                    "summary": "Replace an agent's fields",
                    "operationId": "updateAgent",
                    "security": [{ "bearerAuth": [] }],
                    "parameters": [id_param],
                    "requestBody": { "required": true, "content": json_body(&form_ref) },
                    "responses": {
                        "200": { "description": "Agent updated", "content": json_body(&agent_ref) },
                        "404": { "description": "No such agent", "content": json_body(&error_ref) },
                        "409": { "description": "Codename or email already in use", "content": json_body(&error_ref) },
                        "422": { "description": "Blank, overlong, or unknown field values", "content": json_body(&error_ref) }
                    }
                },
                "delete": {
                    "summary": "Delete an agent",
                    "operationId": "deleteAgent",
                    "security": [{ "bearerAuth": [] }],
                    "parameters": [id_param],
                    "responses": {
                        "200": { "description": "Agent deleted" },
                        "404": { "description": "No such agent", "content": json_body(&error_ref) }
                    }
                }
            },
            "/agents/{id}/edit": {
                "get": {
                    "summary": "Prefilled edit form",
                    "operationId": "editAgentForm",
                    "security": [{ "bearerAuth": [] }],
                    "parameters": [id_param],
                    "responses": {
                        "200": { "description": "Current values and access levels" },
                        "404": { "description": "No such agent", "content": json_body(&error_ref) }
                    }
                }
            },
            "/api/generate_codename": {
                "get": {
                    "summary": "Generate a random codename not yet in use (best effort)",
                    "operationId": "generateCodename",
                    "security": [{ "bearerAuth": [] }],
                    "parameters": [
                        { "name": "attempts", "in": "query", "required": false, "schema": { "type": "integer", "minimum": 0, "maximum": MAX_GENERATE_ATTEMPTS } }
                    ],
                    "responses": { "200": { "description": "A codename", "content": json_body(&serde_json::json!({ "type": "object", "properties": { "codename": { "type": "string" } } })) } }
                }
            },
            "/nuke": {
                "post": {
                    "summary": "Delete every agent",
                    "operationId": "deleteAllAgents",
                    "security": [{ "bearerAuth": [] }],
                    "responses": { "200": { "description": "Number of agents deleted" } }
                }
            }
        },
        "components": {
            "securitySchemes": {
                "bearerAuth": { "type": "http", "scheme": "bearer" }
            },
            "schemas": {
                "AccessLevel": { "type": "string", "enum": ["Secret", "Top Secret", "Most Secret"] },
                "Agent": {
                    "type": "object",
                    "required": ["id", "codename", "contact_number", "email", "access_level"],
                    "properties": {
                        "id": { "type": "integer", "format": "int64" },
                        "codename": { "type": "string", "maxLength": dossier_core::MAX_CODENAME_LEN },
                        "contact_number": { "type": "string", "maxLength": dossier_core::MAX_CONTACT_NUMBER_LEN },
                        "email": { "type": "string", "maxLength": dossier_core::MAX_EMAIL_LEN },
                        "access_level": { "$ref": "#/components/schemas/AccessLevel" }
                    }
                },
                "AgentForm": {
                    "type": "object",
                    "properties": {
                        "codename": { "type": "string" },
                        "contact_number": { "type": "string" },
                        "email": { "type": "string" },
                        "access_level": { "type": "string", "description": "Defaults to Secret when omitted" }
                    }
                },
                "HealthResponse": {
                    "type": "object",
                    "properties": { "status": { "type": "string" }, "version": { "type": "string" } }
                },
                "ErrorResponse": {
                    "type": "object",
                    "properties": {
                        "error": { "type": "string" },
                        "detail": { "type": "string", "nullable": true },
                        "form": { "$ref": "#/components/schemas/AgentForm" },
                        "fields": { "type": "array", "items": { "type": "object" } }
                    }
                }
            }
        }
    }))
}
