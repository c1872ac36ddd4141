use std::sync::Arc;

use anyhow::Result;
use paubra_core::{
    store, ChatSession, CompletionClient, Config, CredentialPool, GeminiClient, JsonFileStore,
};
use tracing::{info, warn};

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[tokio::main]
async fn main() -> Result<()> {
    let data_dir = store::default_data_dir()?;
    logging::configure_logging(&data_dir)?;

    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "unreadable config, using defaults");
        Config::new()
    });

    let credentials = Arc::new(CredentialPool::new(config.api_keys()));
    if credentials.is_empty() {
        warn!("no API keys configured; set GEMINI_API_KEY_1..GEMINI_API_KEY_5");
    }
    info!(keys = credentials.len(), model = %config.model, "starting chat");

    let client = CompletionClient::new(Arc::new(GeminiClient::new(&config.base_url)), credentials)
        .with_model(config.model.clone())
        .with_timeout(config.request_timeout());
    let session = ChatSession::load(Box::new(JsonFileStore::new(&data_dir)));

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(
        session,
        Arc::new(client),
        config,
        Config::default_path().ok(),
        events.sender(),
    );

    let result = run(&mut terminal, &mut app, &mut events).await;
    tui::restore()?;
    result
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}
