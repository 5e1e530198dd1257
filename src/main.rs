// ============================================================================
// Comptes - Liste des comptes dans le terminal
// ============================================================================
// Programme TUI qui affiche les comptes renvoyés par GET {API_BASE_URL}/comptes
//
// - Chargement au démarrage, rafraîchissement manuel avec [r]
// - Rechargement automatique quand un compte est ajouté (SIGUSR1 sur Unix)
// - Logs dans un fichier (le terminal est occupé par l'interface)
// ============================================================================

use std::io;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info, warn};

use comptes::api::{AccountSource, HttpAccountSource};
use comptes::app::App;
use comptes::config::Config;
use comptes::loader::AccountLoader;
use comptes::notify::AccountNotifier;
use comptes::ui::{events::EventHandler, render};

// ============================================================================
// Initialisation du logging
// ============================================================================
// Les println! ne fonctionnent pas une fois le TUI lancé : on log vers un
// fichier avec rotation quotidienne.
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// # Utilisation
/// ```bash
/// tail -f ~/.local/share/comptes/logs/comptes.log.*
/// RUST_LOG=comptes=trace cargo run
/// ```
fn init_logging(config: &Config) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = config.log_dir.clone();
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "comptes.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            // Par défaut : debug pour comptes, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "comptes=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================
// main() reste synchrone (boucle TUI) ; les requêtes HTTP tournent sur un
// runtime tokio dont le Handle est confié au loader.
// ============================================================================

fn main() -> Result<()> {
    let config = Config::from_env();

    init_logging(&config).unwrap_or_else(|e| {
        eprintln!("Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!(api_base_url = %config.api_base_url, "Comptes starting up");

    let runtime = tokio::runtime::Runtime::new().context("Échec de la création du runtime tokio")?;
    let source = HttpAccountSource::new(&config)?;

    // Le propriétaire de la vue crée l'émetteur et le lui passe
    let notifier = AccountNotifier::new();
    #[cfg(unix)]
    spawn_signal_bridge(&runtime, notifier.clone());

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let mut app = App::new(source.endpoint());
    let mut loader = AccountLoader::mount(source, runtime.handle().clone(), &notifier, &mut app.view);
    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &mut loader, &events);

    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    // Démontage : l'abonnement aux notifications est libéré ici
    drop(loader);

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

/// Relaie SIGUSR1 vers la notification "compte ajouté"
///
/// `kill -USR1 <pid>` recharge la liste, comme après l'ajout d'un compte.
#[cfg(unix)]
fn spawn_signal_bridge(runtime: &tokio::runtime::Runtime, notifier: AccountNotifier) {
    runtime.spawn(async move {
        use tokio::signal::unix::{signal, SignalKind};

        let mut usr1 = match signal(SignalKind::user_defined1()) {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = ?e, "Cannot listen for SIGUSR1, account-added reload disabled");
                return;
            }
        };

        while usr1.recv().await.is_some() {
            let delivered = notifier.notify_account_added();
            info!(delivered, "SIGUSR1 received, account added");
        }
    });
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération :
//   0. applique les réponses HTTP et les notifications en attente
//   1. dessine l'interface
//   2. traite l'événement clavier (ou Tick après timeout)
// ============================================================================

fn run<S: AccountSource>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    loader: &mut AccountLoader<S>,
    events: &EventHandler,
) -> Result<()> {
    while app.is_running() {
        if loader.poll(&mut app.view) {
            app.clamp_selection();
        }

        terminal.draw(|frame| render(frame, app))?;

        match events.next() {
            Ok(event) => handle_event(app, loader, event),
            Err(e) => warn!(error = ?e, "Failed to read terminal event"),
        }
    }

    Ok(())
}

/// Traite un événement et met à jour l'état de l'application
fn handle_event<S: AccountSource>(app: &mut App, loader: &mut AccountLoader<S>, event: comptes::ui::events::Event) {
    use comptes::ui::events::{is_down_event, is_quit_event, is_refresh_event, is_up_event, Event};

    match event {
        Event::Key(_) if is_quit_event(&event) => {
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        Event::Key(_) if is_refresh_event(&event) => {
            app.cancel_quit();
            loader.refresh(&mut app.view);
        }

        Event::Key(_) if is_up_event(&event) => {
            app.cancel_quit();
            app.navigate_up();
        }

        Event::Key(_) if is_down_event(&event) => {
            app.cancel_quit();
            app.navigate_down();
        }

        Event::Key(_) => {
            // Toute autre touche annule la confirmation de quit
            app.cancel_quit();
        }

        Event::Tick => {}
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================

/// Configure le terminal en mode TUI (raw mode + alternate screen)
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal, même si la boucle a échoué
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}
