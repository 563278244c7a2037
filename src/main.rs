use std::io::stdout;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use crossterm::event::KeyEventKind;

use proctop::app::App;
use proctop::config::{Config, load_config, load_config_from_path};
use proctop::event::{Event, EventHandler};
use proctop::system::process::SortMode;
use proctop::system::refresh::Refresher;
use proctop::{headless, logging, ui};

#[derive(Parser)]
#[command(
    name = "proctop",
    about = "Top processes by memory, CPU or name with system CPU and memory load"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum number of process ids considered per refresh
    #[arg(long)]
    capacity: Option<usize>,

    /// Number of processes shown (at most 10)
    #[arg(long)]
    top: Option<usize>,

    /// Ranking metric: memory, cpu or name
    #[arg(long, value_parser = ["memory", "cpu", "name"])]
    sort: Option<String>,

    /// Refresh once, print the result and exit. CPU usage needs two samples,
    /// so it always reads 0.00% here.
    #[arg(long, default_value_t = false)]
    once: bool,

    /// With --once, print the report as JSON.
    #[arg(long, default_value_t = false, requires = "once")]
    json: bool,

    /// Write logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli);

    if cli.once {
        logging::init_stderr(&config.general.log_level)?;
        return run_once(&config, cli.json);
    }

    if let Some(path) = &config.general.log_file {
        logging::init_file(path, &config.general.log_level)?;
    }

    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    let result = run(&mut terminal, &config).await;

    ratatui::restore();

    result
}

async fn run(terminal: &mut ratatui::DefaultTerminal, config: &Config) -> Result<()> {
    let mut app = App::new(config);
    let mut events = EventHandler::new();

    terminal.draw(|frame| ui::draw(frame, &app))?;

    while app.running {
        let Some(event) = events.next().await else {
            break;
        };
        match event {
            Event::Key(key) => {
                if key.kind == KeyEventKind::Press {
                    let action = app.map_key(key);
                    app.dispatch(action);
                }
            }
            Event::Resize => {}
        }
        terminal.draw(|frame| ui::draw(frame, &app))?;
    }

    Ok(())
}

fn load_config_for_cli(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(capacity) = cli.capacity {
        config.general.process_capacity = capacity;
    }
    if let Some(top) = cli.top {
        config.general.top_n = top;
    }
    if let Some(ref sort) = cli.sort {
        config.general.default_sort = sort.clone();
    }
    if let Some(ref path) = cli.log_file {
        config.general.log_file = Some(path.clone());
    }

    config.normalized()
}

fn run_once(config: &Config, json: bool) -> Result<()> {
    let mut refresher = Refresher::system(config.general.process_capacity, config.general.top_n)
        .with_sort_mode(SortMode::from_str_config(&config.general.default_sort));
    headless::run_once(&mut refresher, &mut stdout().lock(), json)
}
