mod actions;
mod app;
mod ui;

use actions::Action;
use app::{App, Effect};
use clap::{Parser, Subcommand};
use commentdesk::config::{default_overlay_path, Config, ConfigFile, StorageBackend};
use commentdesk::overlay::{OverlayStore, SaveOutcome};
use commentdesk::view::ViewModel;
use commentdesk::{CommentField, Dashboard, HttpFetcher, LoadState};
use crossterm::event::{self, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use itertools::Itertools;
use log::info;
use ratatui::{prelude::*, Terminal};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

const TUI_LOG_FILE: &str = "commentdesk.log";

#[derive(Parser, Debug)]
#[command(name = "commentdesk", version, about = "Search, page through and edit comments from a JSON API")]
struct Cli {
    /// Optional TOML file; flags given here take precedence over it
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Base URL serving /comments and /posts
    #[arg(long, global = true)]
    api_base: Option<String>,
    /// Overlay backend: file or sled
    #[arg(long, global = true)]
    storage: Option<StorageBackend>,
    #[arg(long, global = true)]
    overlay_path: Option<PathBuf>,
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Option<CliCmd>,
}

#[derive(Subcommand, Debug)]
enum CliCmd {
    /// Interactive dashboard (default)
    Tui,
    /// Print one page of the filtered comments
    List {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Store an override for a comment's name or body
    Edit { id: u64, field: CommentField, value: String },
}

impl Cli {
    fn resolve_config(&self) -> Result<Config, Box<dyn Error>> {
        let mut cfg = Config::default();
        if let Some(path) = &self.config {
            cfg = ConfigFile::read(path)?.merge_into_config(cfg);
        }
        if let Some(v) = &self.api_base {
            cfg.api_base = v.clone();
        }
        if let Some(v) = self.storage {
            if v != cfg.storage && self.overlay_path.is_none() {
                cfg.overlay_path = default_overlay_path(v);
            }
            cfg.storage = v;
        }
        if let Some(v) = &self.overlay_path {
            cfg.overlay_path = v.clone();
        }
        if let Some(v) = self.timeout_secs {
            cfg.request_timeout_secs = Some(v);
        }
        if let Some(v) = &self.log_level {
            cfg.log_level = v.clone();
        }
        Ok(cfg)
    }
}

fn init_logging(cfg: &Config, to_file: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cfg.log_level.as_str()));
    if to_file {
        // Anything written to stderr would tear the alternate screen.
        match std::fs::OpenOptions::new().create(true).append(true).open(TUI_LOG_FILE) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(_) => {
                builder.filter_level(log::LevelFilter::Off);
            }
        }
    }
    let _ = builder.try_init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let cfg = cli.resolve_config()?;
    let command = cli.command.unwrap_or(CliCmd::Tui);
    init_logging(&cfg, matches!(command, CliCmd::Tui));
    info!("api base {} ({} overlay at {})", cfg.api_base, cfg.storage, cfg.overlay_path.display());

    match command {
        CliCmd::Tui => run_tui(cfg).await,
        CliCmd::List { search, page } => list(cfg, &search, page).await,
        CliCmd::Edit { id, field, value } => edit(cfg, id, field, &value),
    }
}

async fn list(cfg: Config, search: &str, page: usize) -> Result<(), Box<dyn Error>> {
    let fetcher = HttpFetcher::with_timeout(cfg.endpoints(), cfg.request_timeout())?;
    let mut dashboard = Dashboard::new(cfg.open_repository()?);
    dashboard.apply_fetch(fetcher.fetch_all().await);
    if let LoadState::Failed(err) = dashboard.state() {
        return Err(err.clone().into());
    }
    dashboard.set_search(search);
    dashboard.go_to_page(page);
    print!("{}", format_page(&dashboard.view(), search));
    Ok(())
}

fn format_page(view: &ViewModel, search: &str) -> String {
    if view.is_empty() {
        return format!("No comments match \"{}\".\n", search.trim());
    }
    let mut out = String::new();
    for row in &view.rows {
        let c = &row.comment;
        out.push_str(&format!("#{} [{}] {} <{}>\n    {}\n", c.id, row.post_title, c.name, c.email, c.body.lines().join(" ")));
    }
    let window = view.page_window.iter().map(|p| if *p == view.page { format!("[{p}]") } else { p.to_string() }).join(" ");
    out.push_str(&format!(
        "Showing {}-{} of {} · page {}/{} · {}\n",
        view.first_index(),
        view.last_index(),
        view.filtered_count,
        view.page,
        view.total_pages,
        window
    ));
    out
}

fn edit(cfg: Config, id: u64, field: CommentField, value: &str) -> Result<(), Box<dyn Error>> {
    let mut store = OverlayStore::load(cfg.open_repository()?);
    match store.save(id, field, value)? {
        SaveOutcome::Saved(v) => println!("saved {field} of comment #{id}: {v}"),
        SaveOutcome::Rejected => println!("rejected: {field} cannot be blank"),
    }
    Ok(())
}

fn spawn_fetch(app: Arc<Mutex<App>>, fetcher: HttpFetcher, generation: u64) {
    tokio::spawn(async move {
        let result = fetcher.fetch_all().await;
        let mut app = app.lock().await;
        app.apply_fetch(generation, result);
    });
}

async fn run_tui(cfg: Config) -> Result<(), Box<dyn Error>> {
    let fetcher = HttpFetcher::with_timeout(cfg.endpoints(), cfg.request_timeout())?;
    let app = Arc::new(Mutex::new(App::new(cfg.open_repository()?, cfg.api_base.clone())));
    let generation = app.lock().await.generation();
    spawn_fetch(Arc::clone(&app), fetcher.clone(), generation);

    // setup terminal
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app, fetcher).await;

    // restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: Arc<Mutex<App>>, fetcher: HttpFetcher) -> Result<(), Box<dyn Error>> {
    loop {
        {
            let mut app = app.lock().await;
            app.tick();
            terminal.draw(|f| ui::draw(f, &app))?;
        }
        if event::poll(Duration::from_millis(100))? {
            if let event::Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let effect = {
                    let mut guard = app.lock().await;
                    let action = Action::from_key(key, guard.mode);
                    guard.handle(action)
                };
                match effect {
                    Effect::Quit => return Ok(()),
                    Effect::Fetch(generation) => spawn_fetch(Arc::clone(&app), fetcher.clone(), generation),
                    Effect::None => {}
                }
            }
        }
    }
}
