use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Path as AxumPath, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use clap::Parser;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::GameConfig;
use crate::geometry::Point;
use crate::puzzle::{Puzzle, PuzzleSnapshot};
use crate::render::render_svg;

/// Arguments for running the untangle sync API server
#[derive(Debug, Clone, Parser)]
#[command(name = "untangle serve", about = "Serve a puzzle session over a JSON API.")]
pub struct ServeArgs {
    /// Address to bind the HTTP server to (defaults to UNTANGLE_HOST or 127.0.0.1).
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (defaults to UNTANGLE_PORT or 5252).
    #[arg(long)]
    pub port: Option<u16>,

    /// Level to start the session at.
    #[arg(short = 'l', long = "level")]
    pub level: Option<u32>,

    /// Seed for reproducible level layouts.
    #[arg(short = 'S', long = "seed")]
    pub seed: Option<u64>,

    /// Width of the playable area.
    #[arg(long)]
    pub width: Option<f32>,

    /// Height of the playable area.
    #[arg(long)]
    pub height: Option<f32>,

    /// Background color for rendered SVG previews.
    #[arg(long = "background-color", default_value = "white")]
    pub background_color: String,
}

struct ServeState {
    puzzle: Mutex<Puzzle>,
    background: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct NodeMove {
    x: f32,
    y: f32,
}

/// Builds the API routes around a puzzle. Requests are applied one at a
/// time through the mutex.
pub fn router(puzzle: Puzzle, background: impl Into<String>) -> Router {
    let state = Arc::new(ServeState {
        puzzle: Mutex::new(puzzle),
        background: background.into(),
    });

    Router::new()
        .route("/api/level", get(get_level))
        .route("/api/svg", get(get_svg))
        .route("/api/nodes/:index", put(put_node))
        .route("/api/release", post(post_release))
        .route("/api/advance", post(post_advance))
        .with_state(state)
}

pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = GameConfig::default();
    let bounds = config
        .bounds(args.width, args.height)
        .context("invalid playable area")?;
    let level = args.level.unwrap_or(config.start_level);
    if level == 0 {
        anyhow::bail!("--level must be at least 1");
    }

    let puzzle = Puzzle::starting_at(level, bounds, args.seed);
    let app = router(puzzle, args.background_color.clone()).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let host = args.host.clone().unwrap_or(config.host);
    let port = args.port.unwrap_or(config.port);
    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind HTTP server to {addr}"))?;

    info!(%addr, level, "serving puzzle");
    println!("untangle server listening on http://{addr}");
    println!("Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("HTTP server error")?;

    Ok(())
}

async fn get_level(State(state): State<Arc<ServeState>>) -> Json<PuzzleSnapshot> {
    let puzzle = state.puzzle.lock().await;
    Json(puzzle.snapshot())
}

async fn get_svg(State(state): State<Arc<ServeState>>) -> Result<Response, (StatusCode, String)> {
    let puzzle = state.puzzle.lock().await;
    let svg = render_svg(puzzle.level(), puzzle.bounds(), &state.background)
        .map_err(internal_error)?;

    let mut response = svg.into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("image/svg+xml"),
    );
    Ok(response)
}

async fn put_node(
    State(state): State<Arc<ServeState>>,
    AxumPath(index): AxumPath<usize>,
    Json(update): Json<NodeMove>,
) -> Result<Json<PuzzleSnapshot>, (StatusCode, String)> {
    let target = Point::new(update.x, update.y);
    let mut puzzle = state.puzzle.lock().await;
    puzzle
        .level()
        .check_move(index, target)
        .map_err(|err| (StatusCode::BAD_REQUEST, err.to_string()))?;

    puzzle.set_position(index, target);
    Ok(Json(puzzle.snapshot()))
}

async fn post_release(State(state): State<Arc<ServeState>>) -> Json<PuzzleSnapshot> {
    let mut puzzle = state.puzzle.lock().await;
    puzzle.release();
    Json(puzzle.snapshot())
}

async fn post_advance(State(state): State<Arc<ServeState>>) -> Json<PuzzleSnapshot> {
    let mut puzzle = state.puzzle.lock().await;
    puzzle.advance_level();
    Json(puzzle.snapshot())
}

fn internal_error(err: anyhow::Error) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Bounds;
    use crate::level::{Cycle, Level};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    fn bow_tie_router() -> Router {
        let level = Level::new(
            1,
            Cycle::natural(4).unwrap(),
            vec![
                Point::new(100.0, 100.0),
                Point::new(300.0, 100.0),
                Point::new(100.0, 300.0),
                Point::new(300.0, 300.0),
            ],
        )
        .unwrap();
        let bounds = Bounds::new(400.0, 400.0).unwrap();
        router(Puzzle::from_level(level, bounds, 9), "white")
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    fn move_node(index: usize, x: f32, y: f32) -> Request<Body> {
        Request::put(format!("/api/nodes/{index}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(format!(r#"{{"x":{x},"y":{y}}}"#)))
            .unwrap()
    }

    fn post(path: &str) -> Request<Body> {
        Request::post(path).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn level_snapshot_reports_crossings() {
        let app = bow_tie_router();
        let (status, body) = send(&app, Request::get("/api/level").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);

        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["level"], 1);
        assert_eq!(json["crossings"], 1);
        assert_eq!(json["phase"], "playing");
        assert_eq!(json["edges"][1]["crossing"], true);
    }

    #[tokio::test]
    async fn untangle_and_release_clears_the_level() {
        let app = bow_tie_router();
        let (status, _) = send(&app, move_node(2, 300.0, 300.0)).await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = send(&app, move_node(3, 100.0, 300.0)).await;
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["cleared"], true);
        assert_eq!(json["phase"], "playing");

        let (_, body) = send(&app, post("/api/release")).await;
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["phase"], "cleared");

        let (_, body) = send(&app, post("/api/advance")).await;
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["level"], 2);
        assert_eq!(json["nodeCount"], 6);
        assert_eq!(json["cleared"], false);
    }

    #[tokio::test]
    async fn unknown_node_is_a_bad_request() {
        let app = bow_tie_router();
        let (status, body) = send(&app, move_node(99, 1.0, 1.0)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(String::from_utf8(body).unwrap().contains("node 99"));
    }

    #[tokio::test]
    async fn overflowing_coordinates_are_a_bad_request() {
        let app = bow_tie_router();
        let request = Request::put("/api/nodes/0")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"x":1e39,"y":10}"#))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(String::from_utf8(body).unwrap().contains("not a finite point"));

        let (_, body) = send(&app, Request::get("/api/level").body(Body::empty()).unwrap()).await;
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["nodes"][0]["x"], 100.0);
    }

    #[tokio::test]
    async fn svg_preview_has_svg_content_type() {
        let app = bow_tie_router();
        let response = app
            .clone()
            .oneshot(Request::get("/api/svg").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            HeaderValue::from_static("image/svg+xml")
        );
    }
}
