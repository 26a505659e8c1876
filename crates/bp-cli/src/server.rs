use std::io::{Cursor, Read};

use anyhow::{Result, anyhow};
use bp_parser::ParseOptions;
use bp_store::DocumentStore;
use tiny_http::{Header, Request, Response, Server};
use tracing::{info, warn};

use crate::api::{Api, ApiResponse};

const CORS_HEADERS: [(&str, &str); 4] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Credentials", "true"),
    ("Access-Control-Allow-Methods", "*"),
    ("Access-Control-Allow-Headers", "*"),
];

/// Serve requests one at a time until the process is stopped.
pub fn serve(addr: &str, store: &dyn DocumentStore, options: &ParseOptions) -> Result<()> {
    let server = Server::http(addr).map_err(|e| anyhow!("Failed to start server: {e}"))?;
    let api = Api::new(store, options);

    println!("Blueprint API listening on http://{addr} ({} store)", store.backend());
    println!("Press Ctrl+C to stop");
    info!("Serving on {addr}");

    for mut request in server.incoming_requests() {
        let response = match read_body(&mut request) {
            Ok(body) => api.handle(request.method(), request.url(), &body),
            Err(e) => ApiResponse {
                status: 400,
                body: Some(serde_json::json!({ "detail": format!("Failed to read body: {e}") })),
            },
        };

        info!("{} {} -> {}", request.method(), request.url(), response.status);
        if let Err(e) = request.respond(into_http(response)) {
            warn!("Failed to send response: {e}");
        }
    }

    Ok(())
}

fn read_body(request: &mut Request) -> std::io::Result<String> {
    let mut body = String::new();
    request.as_reader().read_to_string(&mut body)?;
    Ok(body)
}

fn into_http(response: ApiResponse) -> Response<Cursor<Vec<u8>>> {
    let bytes = response
        .body
        .map(|body| body.to_string().into_bytes())
        .unwrap_or_default();
    let mut http = Response::from_data(bytes).with_status_code(response.status);

    let content_type = std::iter::once(("Content-Type", "application/json"));
    for (name, value) in content_type.chain(CORS_HEADERS) {
        match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
            Ok(header) => http.add_header(header),
            Err(()) => warn!("Skipping invalid header {name}"),
        }
    }
    http
}
