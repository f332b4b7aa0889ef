mod app;
mod engine;
mod model;
mod msg;
mod vault;

use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use app::App;
use model::config::AppConfig;
use msg::Msg;

const REFRESH_TICK: Duration = Duration::from_millis(50);

fn main() -> Result<()> {
    // Initialize logging to file (never stdout)
    let log_dir = directories::ProjectDirs::from("", "", "daybook")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| std::path::PathBuf::from("/tmp"));
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "daybook.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter("daybook=info")
        .init();

    tracing::info!("daybook starting");

    let vault_override = std::env::args_os().nth(1).map(PathBuf::from);
    let config = AppConfig::load(vault_override)?;
    tracing::info!(
        vault = %config.vault_path().display(),
        folder = %config.notes.folder,
        heading = %config.notes.parent_heading,
        "configuration loaded"
    );

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, config);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        tracing::error!("fatal: {e:?}");
        eprintln!("daybook error: {e:?}");
    }

    Ok(())
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, config: AppConfig) -> Result<()> {
    let (tx, rx) = mpsc::channel::<Msg>();
    let vault_path = config.vault_path();
    let mut app = App::new(config)?;

    spawn_key_reader(tx.clone());
    spawn_refresh_ticker(tx.clone());
    spawn_file_watcher(vault_path, tx);

    terminal.draw(|f| app.view(f))?;

    // ── Main event loop ──
    loop {
        // Batch-drain all pending messages
        let first = rx.recv()?;
        app.update(first)?;

        while let Ok(msg) = rx.try_recv() {
            app.update(msg)?;
        }

        if app.should_quit {
            break;
        }

        terminal.draw(|f| app.view(f))?;
    }

    tracing::info!("daybook exiting");
    Ok(())
}

/// Forwards key presses and resizes to the panel.
fn spawn_key_reader(tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        while let Ok(event) = event::read() {
            let msg = match event {
                Event::Key(key) if key.kind == KeyEventKind::Press => Msg::Key(key),
                Event::Resize(..) => Msg::Resize,
                _ => continue,
            };
            if tx.send(msg).is_err() {
                break;
            }
        }
    });
}

/// Clock for the pending-rescan deadline set when a vault file changes.
fn spawn_refresh_ticker(tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        while tx.send(Msg::Tick).is_ok() {
            thread::sleep(REFRESH_TICK);
        }
    });
}

/// Emits `FileChanged` for every created, modified or removed vault path.
fn spawn_file_watcher(vault_path: PathBuf, tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        let tx_watch = tx.clone();
        let mut watcher: RecommendedWatcher =
            match notify::recommended_watcher(move |res: notify::Result<notify::Event>| match res {
                Ok(event) => {
                    if matches!(
                        event.kind,
                        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                    ) {
                        for path in event.paths {
                            if tx_watch.send(Msg::FileChanged(path)).is_err() {
                                return;
                            }
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!("file watcher error: {err}");
                }
            }) {
                Ok(w) => w,
                Err(err) => {
                    tracing::warn!("failed to initialize file watcher: {err}");
                    return;
                }
            };

        if let Err(err) = watcher.watch(&vault_path, RecursiveMode::Recursive) {
            tracing::warn!("failed to watch vault path {}: {err}", vault_path.display());
            return;
        }

        loop {
            thread::park();
        }
    });
}
