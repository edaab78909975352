use std::net::SocketAddr;
use std::path::PathBuf;

use axum::routing::{get, post};
use axum::Router;
use clap::Parser;
use tower_http::services::ServeDir;

mod handlers;
mod state;

use crate::handlers::{calculate_handler, ping_handler};
use crate::state::AppState;

const DEFAULT_RECOGNIZER_URL: &str = "http://localhost:8900/calculate";

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Directory with the built client bundle.
    #[arg(long)]
    public_dir: Option<PathBuf>,
    /// Upstream recognizer endpoint; RECOGNIZER_URL overrides the default.
    #[arg(long)]
    recognizer_url: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let recognizer_url = args
        .recognizer_url
        .or_else(|| std::env::var("RECOGNIZER_URL").ok())
        .unwrap_or_else(|| DEFAULT_RECOGNIZER_URL.to_string());
    let public_dir = args
        .public_dir
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../public"));

    let state = AppState {
        recognizer_url,
        http: reqwest::Client::new(),
    };

    let app = Router::new()
        .route("/ping", get(ping_handler))
        .route("/api/calculate", post(calculate_handler))
        .fallback_service(ServeDir::new(public_dir).append_index_html_on_directories(true))
        .with_state(state.clone());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!(
        "inkmath running at http://localhost:{port} (recognizer: {})",
        state.recognizer_url
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server");
    axum::serve(listener, app).await.expect("Server crashed");
}
