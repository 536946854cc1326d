//! `Accept` / `Content-Type` enforcement for JSON endpoints.
//!
//! The checks are plain functions over header values; [`accept_json`] and
//! [`require_json`] wrap them as axum middleware and [`JsonGuard`] stacks them
//! on a route so the accept check always runs first.

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};

use crate::error::AppError;

pub const APPLICATION_JSON: &str = "application/json";

/// Media ranges that admit an `application/json` response.
const JSON_RANGES: &[&str] = &[APPLICATION_JSON, "application/*", "*/*"];

/// Decide whether a client accepting `accept` can receive JSON.
///
/// No header (or a blank one) accepts everything. Ranges weighted `q=0`
/// are refusals and never match.
pub fn check_accept(accept: Option<&str>) -> Result<(), AppError> {
    let Some(accept) = accept.filter(|value| !value.trim().is_empty()) else {
        return Ok(());
    };

    let accepted = accept.split(',').any(|range| {
        let mut parts = range.split(';');
        let essence = parts.next().unwrap_or_default().trim();

        let refused = parts.any(|param| match param.split_once('=') {
            Some((name, value)) if name.trim().eq_ignore_ascii_case("q") => {
                value.trim().parse::<f32>().map(|q| q <= 0.0).unwrap_or(false)
            }
            _ => false,
        });

        !refused
            && JSON_RANGES
                .iter()
                .any(|candidate| essence.eq_ignore_ascii_case(candidate))
    });

    if accepted {
        Ok(())
    } else {
        Err(AppError::NotAcceptable)
    }
}

/// Require the declared body type to be `application/json`.
///
/// Parameters such as `charset` are ignored; a missing header fails.
pub fn check_content_type(content_type: Option<&str>) -> Result<(), AppError> {
    let essence = content_type
        .and_then(|value| value.split(';').next())
        .map(str::trim);

    match essence {
        Some(essence) if essence.eq_ignore_ascii_case(APPLICATION_JSON) => Ok(()),
        _ => Err(AppError::UnsupportedMediaType),
    }
}

/// All `Accept` values folded into one list.
fn accept_header(headers: &HeaderMap) -> Option<String> {
    let values: Vec<String> = headers
        .get_all(header::ACCEPT)
        .iter()
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .collect();

    (!values.is_empty()).then(|| values.join(", "))
}

fn content_type_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
}

/// Middleware: reject clients that cannot take a JSON response.
pub async fn accept_json(request: Request, next: Next) -> Result<Response, AppError> {
    check_accept(accept_header(request.headers()).as_deref())?;
    Ok(next.run(request).await)
}

/// Middleware: reject bodies not declared as JSON.
pub async fn require_json(request: Request, next: Next) -> Result<Response, AppError> {
    check_content_type(content_type_header(request.headers()))?;
    Ok(next.run(request).await)
}

/// Negotiation applied to a single route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonGuard {
    /// Response must be JSON.
    Accept,
    /// Response must be JSON and the request body must be declared JSON.
    AcceptAndContent,
}

impl JsonGuard {
    /// Wrap `route`; the outermost layer runs first, so accept is added last.
    pub fn apply<S>(self, route: MethodRouter<S>) -> MethodRouter<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let route = match self {
            JsonGuard::Accept => route,
            JsonGuard::AcceptAndContent => route.route_layer(middleware::from_fn(require_json)),
        };
        route.route_layer(middleware::from_fn(accept_json))
    }
}
