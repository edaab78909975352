#[derive(Clone)]
pub struct AppState {
    pub recognizer_url: String,
    pub http: reqwest::Client,
}
