mod audio;
mod catalog;
mod config;
mod controller;
mod error;
mod logging;
mod model;
mod view;

use std::io;
use std::sync::Arc;
use std::time::Duration;
use anyhow::Result;
use tokio::sync::Mutex;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::audio::{AudioBackend, AudioEngine};
use crate::catalog::DeezerCatalog;
use crate::config::Settings;
use crate::controller::AppController;
use crate::model::{AppModel, ClickCounter};
use crate::view::AppView;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load configuration, using defaults: {}", e);
        Settings::default()
    });
    settings.validate().map_err(anyhow::Error::msg)?;

    if let Err(e) = logging::init_logging(&settings.logging) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== tunepeek starting ===");

    let audio_backend = match AudioBackend::new(settings.playback.completion_poll()) {
        Ok(backend) => backend,
        Err(e) => {
            tracing::warn!(error = %e, "Audio output unavailable, previews are disabled");
            AudioBackend::unavailable()
        }
    };
    let audio_backend = Arc::new(audio_backend);

    // One store for the whole process; every screen gets a handle to it.
    let counter = ClickCounter::new();

    let model = Arc::new(Mutex::new(AppModel::new(settings.ui.display_name.clone())));
    let mut controller = AppController::new(model.clone(), audio_backend, counter);

    let catalog = DeezerCatalog::new(&settings.catalog)?;
    controller.spawn_catalog_fetch(Arc::new(catalog));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut controller, settings.ui.error_ttl()).await;

    controller.shutdown().await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("tunepeek shutting down");
    Ok(())
}

async fn run_app<E: AudioEngine>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    controller: &mut AppController<E>,
    error_ttl: Duration,
) -> io::Result<()> {
    loop {
        controller.pump_engine_events().await;

        let (ui_state, content_state, should_quit) = {
            let mut model_guard = controller.model.lock().await;
            model_guard.auto_clear_old_errors(error_ttl);
            (
                model_guard.get_ui_state(),
                model_guard.get_content_state(),
                model_guard.should_quit(),
            )
        };
        let playback = controller.playback_info();

        terminal.draw(|f| {
            AppView::render(f, &playback, &ui_state, &content_state);
        })?;

        if should_quit {
            break;
        }

        // Short poll so engine events are picked up promptly
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                controller.handle_key_event(key).await;
            }
        }
    }

    Ok(())
}
