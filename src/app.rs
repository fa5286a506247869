use axum::{
    extract::Request,
    http::{uri::PathAndQuery, Uri},
    routing::get,
    Json, Router, ServiceExt,
};
use tower::util::MapRequest;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::error::handle_panic;
use crate::state::AppState;
use crate::users::{self, handlers::endpoint_not_found};

pub type App = MapRequest<Router, fn(Request) -> Request>;

/// Full service: `/api/users[/{id}]` plus a health probe. Empty path segments
/// are dropped before routing, so `//api//users/{id}/` reaches the same
/// handler as `/api/users/{id}`.
pub fn build_app(state: AppState) -> App {
    let router = Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(users::router())
                .route("/health", get(|| async { Json("ok") })),
        )
        .fallback(endpoint_not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, ?latency, "response");
                        } else {
                            tracing::info!(%status, ?latency, "response");
                        }
                    },
                ),
        );

    MapRequest::new(router, normalize_path as fn(Request) -> Request)
}

/// Rewrites the request path without empty segments. The query is kept.
pub fn normalize_path(mut req: Request) -> Request {
    if let Some(uri) = collapse_empty_segments(req.uri()) {
        *req.uri_mut() = uri;
    }
    req
}

fn collapse_empty_segments(uri: &Uri) -> Option<Uri> {
    let path = uri.path();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let collapsed = format!("/{}", segments.join("/"));
    if collapsed == path {
        return None;
    }

    let path_and_query = match uri.query() {
        Some(query) => format!("{collapsed}?{query}"),
        None => collapsed,
    };
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query.parse::<PathAndQuery>().ok()?);
    Uri::from_parts(parts).ok()
}

pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.socket_addr()?;
    let app = build_app(state);

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collapse(raw: &str) -> String {
        let uri: Uri = raw.parse().unwrap();
        collapse_empty_segments(&uri)
            .map(|u| u.to_string())
            .unwrap_or_else(|| raw.to_string())
    }

    #[test]
    fn clean_paths_are_left_alone() {
        let uri: Uri = "/api/users".parse().unwrap();
        assert!(collapse_empty_segments(&uri).is_none());
        let root: Uri = "/".parse().unwrap();
        assert!(collapse_empty_segments(&root).is_none());
    }

    #[test]
    fn repeated_and_trailing_slashes_are_dropped() {
        assert_eq!(collapse("//api//users"), "/api/users");
        assert_eq!(collapse("/api/users/abc/"), "/api/users/abc");
        assert_eq!(collapse("/api/users///"), "/api/users");
    }

    #[test]
    fn query_survives_collapsing() {
        assert_eq!(collapse("/api//users/?x=1"), "/api/users?x=1");
    }
}
