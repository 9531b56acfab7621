//! Passthrough proxy: forwards everything under the configured prefix to the upstream origin.

use crate::startup::AppState;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, Uri},
    response::Response,
};
use http_body_util::LengthLimitError;
use reqwest::Url;
use service_core::error::AppError;
use tracing::{debug, trace, warn};

pub async fn proxy_request(
    State(state): State<AppState>,
    req: Request,
) -> Result<Response, AppError> {
    let (parts, body) = req.into_parts();
    let method = parts.method;
    let req_uri = parts.uri.to_string();
    let url = upstream_url(&state.config.proxy.upstream, &parts.uri);

    trace!(req_uri = %req_uri, method = %method, upstream_uri = %url, "Proxying request");

    let body = axum::body::to_bytes(body, state.config.proxy.max_body_bytes)
        .await
        .map_err(|e| {
            if exceeds_limit(&e) {
                AppError::PayloadTooLarge(format!(
                    "Request body exceeds {} bytes",
                    state.config.proxy.max_body_bytes
                ))
            } else {
                AppError::BadRequest(anyhow::anyhow!("Failed to read request body: {}", e))
            }
        })?;

    // Host is re-derived from the upstream URL; the body is re-framed after buffering.
    let mut headers = parts.headers;
    headers.remove(header::HOST);
    headers.remove(header::TRANSFER_ENCODING);

    let res = state
        .http
        .request(method.clone(), url)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|err| {
            warn!(
                method = %method,
                req_uri = %req_uri,
                err = %err,
                "Unable to proxy request to upstream server",
            );
            AppError::BadGateway(err.to_string())
        })?;

    if res.status().is_server_error() {
        warn!(
            method = %method,
            req_uri = %req_uri,
            upstream_uri = %res.url(),
            status_code = %res.status(),
            "Response from the upstream source returned a server error status code",
        );
    } else if res.status().is_client_error() {
        debug!(
            method = %method,
            req_uri = %req_uri,
            upstream_uri = %res.url(),
            status_code = %res.status(),
            "Response from the upstream source returned a client error status code",
        );
    } else {
        trace!(
            method = %method,
            req_uri = %req_uri,
            upstream_uri = %res.url(),
            status_code = %res.status(),
            "Response from the upstream source",
        );
    }

    convert_response(res)
}

/// Appends the inbound path and query to the upstream base, keeping any base path.
pub fn upstream_url(base: &Url, uri: &Uri) -> Url {
    let mut url = base.clone();
    let base_path = base.path().trim_end_matches('/');
    url.set_path(&format!("{}{}", base_path, uri.path()));
    url.set_query(uri.query());
    url
}

/// Relays status, headers and a streamed body from the upstream response.
fn convert_response(res: reqwest::Response) -> Result<Response, AppError> {
    let mut builder = axum::http::Response::builder().status(res.status());

    if let Some(headers) = builder.headers_mut() {
        for (name, value) in res.headers() {
            headers.append(name, value.clone());
        }
    }

    builder
        .body(Body::from_stream(res.bytes_stream()))
        .map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Error converting upstream response: {}", e))
        })
}

fn exceeds_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}
