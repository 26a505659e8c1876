//! HTTP routes, independent of the socket layer.

use bp_core::BlueprintError;
use bp_parser::{ParseOptions, parse_with_options};
use bp_store::{DocumentStore, StoreError, list_blueprints, save_blueprint};
use serde::Deserialize;
use serde_json::{Value, json};
use tiny_http::Method;
use tracing::{debug, error};

pub const HEALTH_MESSAGE: &str = "Blueprint Imperium Backend running";

const PROBE_RUNNING: &str = "✅ Running";
const PROBE_CONNECTED: &str = "✅ Connected";
const PROBE_NOT_CONNECTED: &str = "❌ Not Connected";

#[derive(Debug, Deserialize)]
struct ParseRequest {
    message: String,
}

#[derive(Debug, Deserialize)]
struct CreateBlueprintRequest {
    title: String,
    message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// `None` for bodiless replies such as CORS preflight.
    pub body: Option<Value>,
}

impl ApiResponse {
    fn ok(body: Value) -> Self {
        Self {
            status: 200,
            body: Some(body),
        }
    }

    fn empty(status: u16) -> Self {
        Self { status, body: None }
    }
}

#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    Unprocessable(String),
    NotFound,
    MethodNotAllowed,
    Internal(String),
}

impl ApiError {
    const fn status(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::NotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::Unprocessable(_) => 422,
            Self::Internal(_) => 500,
        }
    }

    fn detail(&self) -> &str {
        match self {
            Self::BadRequest(detail) | Self::Unprocessable(detail) | Self::Internal(detail) => {
                detail
            }
            Self::NotFound => "Not Found",
            Self::MethodNotAllowed => "Method Not Allowed",
        }
    }

    fn into_response(self) -> ApiResponse {
        ApiResponse {
            status: self.status(),
            body: Some(json!({ "detail": self.detail() })),
        }
    }
}

impl From<BlueprintError> for ApiError {
    fn from(error: BlueprintError) -> Self {
        debug!("Rejected input ({}): {error}", error.code().as_str());
        if error.is_client_error() {
            Self::BadRequest(error.to_string())
        } else {
            Self::Internal(error.to_string())
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(source: StoreError) -> Self {
        error!("Store operation failed: {source}");
        Self::Internal(source.to_string())
    }
}

/// JSON body for the storage probe, shared with `blueprint check`.
#[must_use]
pub fn store_probe(store: &dyn DocumentStore) -> Value {
    let database = match store.ping() {
        Ok(()) => PROBE_CONNECTED,
        Err(error) => {
            error!("Store probe failed: {error}");
            PROBE_NOT_CONNECTED
        }
    };
    json!({
        "backend": PROBE_RUNNING,
        "database": database,
        "store": store.backend(),
    })
}

pub struct Api<'a> {
    store: &'a dyn DocumentStore,
    options: &'a ParseOptions,
}

impl<'a> Api<'a> {
    #[must_use]
    pub fn new(store: &'a dyn DocumentStore, options: &'a ParseOptions) -> Self {
        Self { store, options }
    }

    pub fn handle(&self, method: &Method, url: &str, body: &str) -> ApiResponse {
        let path = url.split_once('?').map_or(url, |(path, _)| path);
        debug!("{method} {path}");

        let result = match (method, path) {
            (Method::Options, _) => return ApiResponse::empty(204),
            (Method::Get, "/") => Ok(json!({ "message": HEALTH_MESSAGE })),
            (Method::Get, "/test") => Ok(store_probe(self.store)),
            (Method::Post, "/api/parse") => self.parse(body),
            (Method::Post, "/api/blueprints") => self.create(body),
            (Method::Get, "/api/blueprints") => self.list(),
            (_, "/" | "/test" | "/api/parse" | "/api/blueprints") => Err(ApiError::MethodNotAllowed),
            _ => Err(ApiError::NotFound),
        };

        match result {
            Ok(body) => ApiResponse::ok(body),
            Err(error) => error.into_response(),
        }
    }

    fn parse(&self, body: &str) -> Result<Value, ApiError> {
        let request: ParseRequest = decode_body(body)?;
        let blueprint = parse_with_options(&request.message, self.options)?;
        to_json(&blueprint)
    }

    fn create(&self, body: &str) -> Result<Value, ApiError> {
        let request: CreateBlueprintRequest = decode_body(body)?;
        let blueprint = parse_with_options(&request.message, self.options)?.with_title(request.title);
        let id = save_blueprint(self.store, &blueprint)?;
        Ok(Value::String(id))
    }

    fn list(&self) -> Result<Value, ApiError> {
        let blueprints = list_blueprints(self.store)?;
        to_json(&blueprints)
    }
}

fn decode_body<T: for<'de> Deserialize<'de>>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|error| ApiError::Unprocessable(error.to_string()))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|error| ApiError::Internal(error.to_string()))
}
