pub mod header;
pub mod process_table;
pub mod statusbar;
pub mod theme;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};

use crate::app::App;

pub fn draw<T, C>(frame: &mut Frame, app: &App<T, C>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    header::render(
        frame,
        chunks[0],
        &app.title,
        app.report.sampled,
        &app.theme,
    );

    let selected = (!app.report.processes.is_empty()).then_some(app.selected_index);
    process_table::render(
        frame,
        chunks[1],
        &app.report.processes,
        selected,
        app.sort_mode(),
        &app.theme,
    );

    statusbar::render_usage(
        frame,
        chunks[2],
        &app.cpu_label(),
        &app.memory_label(),
        &app.theme,
    );
    statusbar::render(
        frame,
        chunks[3],
        app.status_message().as_deref(),
        &app.help_entries(),
        &app.theme,
    );
}
