mod app;
mod ui;

use std::io;
use std::time::{Duration, Instant};

use anyhow::Context;
use chores_core::cli::{GlobalCli, init_tracing};
use chores_core::config::{self, Config};
use chores_core::store::TaskStore;
use clap::Parser;
use crossterm::event;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::info;

use crate::app::App;
use crate::ui::Theme;

/// Poll interval: short enough for the cosmetic shake / ghost timers to
/// expire promptly, long enough to stay idle-friendly.
const TICK: Duration = Duration::from_millis(60);

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = GlobalCli::parse();
    init_tracing(cli.verbose, cli.quiet)?;

    info!(verbose = cli.verbose, quiet = cli.quiet, "starting chores");

    let mut cfg = Config::load(cli.config.as_deref())?;
    cfg.apply_overrides(cli.rc_overrides.into_iter().map(|kv| (kv.key, kv.value)));

    let data_dir = config::resolve_data_dir(&cfg, cli.data.as_deref())
        .context("failed to resolve data directory")?;

    let store = TaskStore::open(&data_dir)
        .with_context(|| format!("failed to open task store at {}", data_dir.display()))?;
    let theme = Theme::from_config(&cfg)?;
    let app = App::new(store);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, app, &theme);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("done");
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    theme: &Theme,
) -> anyhow::Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::draw(frame, &mut app, theme))?;

        if event::poll(TICK)? {
            app.handle_event(event::read()?);
        }
        app.tick(Instant::now());
    }

    Ok(())
}
