//! Create a Request - terminal form for Request Network payment requests
//!
//! Fills in a payment request, signs it with the configured wallet and
//! follows it from the gateway until it is confirmed on-chain.

use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use tracing::{error, info};

use rn_create_request::application::{App, Connection, RequestClient, StatusUpdate, WalletConnector};
use rn_create_request::infrastructure::{AppConfig, GatewayClient, LocalWalletConnector, init_logging};
use rn_create_request::presentation::{InputAction, InputHandler, render_ui};

const TICK: Duration = Duration::from_millis(100);

/// Entry point.
///
/// Loads the configuration and reference tables, connects the wallet and
/// runs the terminal form until the user quits.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    init_logging(&config.log_file)?;
    info!(?config, "starting");

    let reference = config.load_reference_data()?;
    let client: Arc<dyn RequestClient> = Arc::new(GatewayClient::new(config.gateway.clone())?);
    let connector = LocalWalletConnector::new(config.private_key.clone());

    let mut app = App::new(reference);
    app.set_connection(connector.connect());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, client, &connector);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(error = %err, "terminal failure");
        println!("{err:?}");
    }

    info!("exiting");
    Ok(())
}

/// Main event loop.
///
/// Redraws, applies status updates from running submissions, then waits
/// up to one tick for a key press.
fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    client: Arc<dyn RequestClient>,
    connector: &dyn WalletConnector,
) -> io::Result<()> {
    let (tx, rx): (Sender<StatusUpdate>, Receiver<StatusUpdate>) = mpsc::channel();

    loop {
        while let Ok(update) = rx.try_recv() {
            app.handle_status_update(update);
        }

        terminal.draw(|f| render_ui(f, app))?;

        if !event::poll(TICK)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match InputHandler::handle_key_event(app, key.code, key.modifiers) {
            InputAction::None => {}
            InputAction::Quit => return Ok(()),
            InputAction::Reconnect => {
                app.set_connection(Connection::Connecting);
                terminal.draw(|f| render_ui(f, app))?;
                app.set_connection(connector.connect());
            }
            InputAction::Submit(job) => {
                let client = Arc::clone(&client);
                let tx = tx.clone();
                thread::spawn(move || {
                    job.run(client.as_ref(), |update| {
                        // The receiver is gone only once the UI has quit.
                        let _ = tx.send(update);
                    });
                });
            }
        }
    }
}
