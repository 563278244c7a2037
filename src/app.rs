use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::action::Action;
use crate::config::{Config, KeybindsConfig, parse_key};
use crate::format::{cpu_label, memory_label};
use crate::system::process::SortMode;
use crate::system::refresh::{RefreshReport, Refresher};
use crate::system::sampler::{ProcessTable, SysinfoTable};
use crate::system::utilization::{OsCounters, SystemCounters};
use crate::ui::theme::Theme;

#[derive(Debug, Clone)]
pub struct ResolvedKeybinds {
    pub quit: KeyCode,
    pub refresh: KeyCode,
    pub cycle_sort: KeyCode,
}

impl ResolvedKeybinds {
    pub fn from_config(kb: &KeybindsConfig) -> Self {
        Self {
            quit: parse_key(&kb.quit).unwrap_or(KeyCode::Char('q')),
            refresh: parse_key(&kb.refresh).unwrap_or(KeyCode::Char('r')),
            cycle_sort: parse_key(&kb.cycle_sort).unwrap_or(KeyCode::Char('s')),
        }
    }

    /// (key_label, description) pairs shown in the status bar.
    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        vec![
            (key_label(self.refresh), "Refresh"),
            (key_label(self.cycle_sort), "Sort"),
            (key_label(self.quit), "Quit"),
            ("\u{2191}\u{2193}".to_string(), "Select"),
        ]
    }
}

fn key_label(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::F(n) => format!("F{n}"),
        _ => "?".to_string(),
    }
}

pub struct App<T = SysinfoTable, C = OsCounters> {
    pub running: bool,
    pub refresher: Refresher<T, C>,
    pub report: RefreshReport,
    pub refresh_count: u64,
    pub selected_index: usize,
    pub title: String,
    pub theme: Theme,
    pub keybinds: ResolvedKeybinds,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let refresher = Refresher::system(config.general.process_capacity, config.general.top_n)
            .with_sort_mode(SortMode::from_str_config(&config.general.default_sort));
        App::with_refresher(refresher, config)
    }
}

impl<T, C> App<T, C> {
    pub fn map_key(&self, key: KeyEvent) -> Action {
        // Ctrl+C always quits (hardwired safety)
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        let code = key.code;
        let kb = &self.keybinds;

        match code {
            KeyCode::F(5) => return Action::Refresh,
            KeyCode::Down => return Action::SelectNext,
            KeyCode::Up => return Action::SelectPrevious,
            _ => {}
        }

        if code == kb.quit {
            return Action::Quit;
        }
        if code == kb.refresh {
            return Action::Refresh;
        }
        if code == kb.cycle_sort {
            return Action::CycleSort;
        }

        Action::None
    }

    pub fn cpu_label(&self) -> String {
        cpu_label(self.report.utilization.cpu_percent)
    }

    pub fn memory_label(&self) -> String {
        memory_label(self.report.utilization.memory_load_percent)
    }

    /// The mode the visible list was ranked by.
    pub fn sort_mode(&self) -> SortMode {
        self.report.sort_mode
    }

    /// Problems from the last refresh, process errors first.
    pub fn status_message(&self) -> Option<String> {
        if let Some(err) = &self.report.process_error {
            return Some(format!("Process list unavailable: {err}"));
        }
        self.report
            .utilization_error
            .as_ref()
            .map(|err| format!("Showing last good usage ({err})"))
    }

    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        self.keybinds.help_entries()
    }
}

impl<T: ProcessTable, C: SystemCounters> App<T, C> {
    /// Builds the app and runs the startup refresh.
    pub fn with_refresher(refresher: Refresher<T, C>, config: &Config) -> Self {
        let mut app = App {
            running: true,
            refresher,
            report: RefreshReport::default(),
            refresh_count: 0,
            selected_index: 0,
            title: config.ui.title.clone(),
            theme: Theme::from_config(&config.ui.theme),
            keybinds: ResolvedKeybinds::from_config(&config.keybinds),
        };
        app.refresh_data();
        app
    }

    pub fn refresh_data(&mut self) {
        self.report = self.refresher.refresh();
        self.refresh_count += 1;
        if self.selected_index >= self.report.processes.len() {
            self.selected_index = 0;
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::Refresh => self.refresh_data(),
            Action::CycleSort => {
                let next = self.refresher.sort_mode().next();
                self.refresher.set_sort_mode(next);
                self.refresh_data();
            }
            Action::SelectNext => {
                let len = self.report.processes.len();
                if len > 0 {
                    self.selected_index = (self.selected_index + 1) % len;
                }
            }
            Action::SelectPrevious => {
                let len = self.report.processes.len();
                if len > 0 {
                    self.selected_index = (self.selected_index + len - 1) % len;
                }
            }
            Action::None => {}
        }
    }
}
