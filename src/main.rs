use anyhow::Result;

use mentor_cli::api::MentorApi;
use mentor_cli::app::App;
use mentor_cli::config::ClientConfig;
use mentor_cli::tui::{self, EventHandler, Tui};
use mentor_cli::{handler, ui};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ClientConfig::load().unwrap_or_else(|_| ClientConfig::new());
    let api = MentorApi::new(&config.server_url());
    let mut app = App::new(api);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let result = run(&mut terminal, &mut events, &mut app).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut Tui, events: &mut EventHandler, app: &mut App) -> Result<()> {
    while !app.should_quit {
        // Pick up a finished proxy call before drawing; the tick event
        // guarantees this runs at least every 300ms.
        app.poll_reply().await;
        app.follow_conversation();

        terminal.draw(|frame| ui::render(app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(app, event)?;
        }
    }
    Ok(())
}
