mod config;
mod error;
mod form;
mod llm;
mod prompt;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use llm::LlmChat;

#[tokio::main]
async fn main() {
    // A local `.env` is optional; real deployments set the environment directly.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let settings = config::Settings::from_env().expect("invalid LLM configuration");

    // Missing credential is non-fatal: every submit reports it instead.
    let llm: Option<Arc<dyn LlmChat>> = match settings.llm.api_key.clone() {
        Some(api_key) => {
            let client = llm::LlmClient::from_config(&settings.llm, api_key).expect("LLM client init failed");
            tracing::info!(
                provider = settings.llm.provider.as_str(),
                model = client.model(),
                "LLM client initialized"
            );
            Some(Arc::new(client) as Arc<dyn LlmChat>)
        }
        None => {
            tracing::warn!(var = %settings.llm.api_key_var, "API key not set — troubleshooting requests will fail");
            None
        }
    };

    let addr = format!("{}:{}", settings.bind_addr, settings.port);
    let state = state::AppState::new(settings, llm);

    let _sweeper = services::sweeper::spawn_session_sweeper(state.clone());

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    tracing::info!(%addr, "troubleshooter listening");
    axum::serve(listener, app).await.expect("server failed");
}
