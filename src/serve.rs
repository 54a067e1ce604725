//! HTTP front end: `/` index page, `/<name>.json` catalog documents projected
//! and encoded per request, `/<name>` raw files from the served root.
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::State;
use axum::http::{StatusCode, Uri, header};
use axum::response::{Html, IntoResponse, Response};
use axum::{Json, Router};
use serde::Serialize;
use tracing::{debug, info, warn};

use json_si::route::Route;
use json_si::{Node, Project, json, model};

/// Names served under `/<name>.json`.
const CATALOG: [&str; 2] = ["person", "address"];

#[derive(Clone, Debug)]
pub struct ServeConfig {
    pub bind: SocketAddr,
    pub root: PathBuf,
    pub pretty: bool,
}

#[derive(Debug)]
struct AppState {
    root: PathBuf,
    pretty: bool,
}

#[derive(Serialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    kind: String,
    message: String,
}

pub async fn serve(config: ServeConfig) -> anyhow::Result<()> {
    let state = Arc::new(AppState {
        root: config.root.clone(),
        pretty: config.pretty,
    });

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!(addr = %config.bind, root = %config.root.display(), "serving");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")?;
    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new().fallback(dispatch).with_state(state)
}

async fn dispatch(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    let path = uri.path();
    let route = Route::resolve(path);
    debug!(path, ?route, "request");
    match route {
        Route::Index => Html(index_page()).into_response(),
        Route::Document(name) => document(&state, &name),
        Route::Raw(name) => raw(&state, &name).await,
        Route::NotFound => not_found(path),
    }
}

fn catalog(name: &str) -> Option<Node> {
    let person = model::john_smith();
    match name {
        "person" => Some(person.project()),
        "address" => Some(person.base.address.project()),
        _ => None,
    }
}

fn document(state: &AppState, name: &str) -> Response {
    let Some(node) = catalog(name) else {
        return not_found(&format!("/{name}.json"));
    };
    match json::encode(&node, state.pretty) {
        Ok(text) => ([(header::CONTENT_TYPE, "application/json")], text).into_response(),
        Err(err) => {
            warn!(document = name, error = %err, "failed to encode document");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("{:?}", err.kind()),
                err.to_string(),
            )
        }
    }
}

async fn raw(state: &AppState, name: &str) -> Response {
    let path = state.root.join(name);
    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type(name))], bytes).into_response(),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => not_found(&format!("/{name}")),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to read raw content");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Io".into(),
                "failed to read content".into(),
            )
        }
    }
}

fn content_type(name: &str) -> &'static str {
    match name.rsplit_once('.').map(|(_, ext)| ext) {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

fn index_page() -> String {
    let items: String = CATALOG
        .iter()
        .map(|name| format!("<li><a href=\"/{name}.json\">{name}.json</a></li>"))
        .collect();
    format!(
        "<!DOCTYPE html>\n<html><head><title>json-si</title></head>\
         <body><h1>Documents</h1><ul>{items}</ul></body></html>\n"
    )
}

fn not_found(path: &str) -> Response {
    error_response(StatusCode::NOT_FOUND, "NotFound".into(), format!("no route for {path}"))
}

fn error_response(status: StatusCode, kind: String, message: String) -> Response {
    let body = ErrorEnvelope {
        error: ErrorBody { kind, message },
    };
    (status, Json(body)).into_response()
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use json_si::model::Person;

    fn state(root: PathBuf) -> Arc<AppState> {
        Arc::new(AppState { root, pretty: true })
    }

    async fn get(state: Arc<AppState>, path: &'static str) -> (StatusCode, String) {
        let response = dispatch(State(state), Uri::from_static(path)).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, String::from_utf8(bytes.to_vec()).expect("utf8 body"))
    }

    #[tokio::test]
    async fn person_document_round_trips() {
        let (status, body) = get(state(PathBuf::from(".")), "/person.json").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("{\n    \"firstName\": \"John\""));
        let person: Person = json_si::from_json(&body).expect("person");
        assert_eq!(person, model::john_smith());
    }

    #[tokio::test]
    async fn index_links_the_catalog() {
        let (status, body) = get(state(PathBuf::from(".")), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("/person.json"));
        assert!(body.contains("/address.json"));
    }

    #[tokio::test]
    async fn raw_files_come_from_the_root() {
        let temp = tempfile::tempdir().expect("tempdir");
        std::fs::write(temp.path().join("hello.txt"), "hi").expect("write");
        let (status, body) = get(state(temp.path().to_path_buf()), "/hello.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "hi");

        let (status, _) = get(state(temp.path().to_path_buf()), "/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_documents_and_traversal_are_not_found() {
        let (status, body) = get(state(PathBuf::from(".")), "/nobody.json").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let envelope = json_si::json::decode(&body).expect("envelope");
        let kind = envelope.get_member("error").and_then(|e| e.get_member("kind")).expect("kind");
        assert_eq!(kind.as_str().expect("string"), "NotFound");

        let (status, _) = get(state(PathBuf::from(".")), "/../Cargo.toml").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn content_types_follow_extension() {
        assert_eq!(content_type("a.css"), "text/css");
        assert_eq!(content_type("dir/page.html"), "text/html; charset=utf-8");
        assert_eq!(content_type("blob"), "application/octet-stream");
    }
}
