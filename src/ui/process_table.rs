use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, BorderType, Borders, Cell, Row, Table, TableState};

use crate::format::{cpu_cell, memory_share_cell, truncate_unicode};
use crate::system::process::{ProcessSnapshot, SortMode};
use crate::ui::theme::Theme;

const NAME_WIDTH: u16 = 20;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    processes: &[ProcessSnapshot],
    selected: Option<usize>,
    sort_mode: SortMode,
    theme: &Theme,
) {
    let header = Row::new([
        "PID",
        "Name",
        "Memory Usage (KB)",
        "Memory (%)",
        "CPU Usage (%)",
    ])
    .style(
        Style::default()
            .fg(theme.table_header_fg)
            .add_modifier(Modifier::BOLD),
    );

    let rows = processes.iter().map(|p| {
        Row::new([
            Cell::from(p.process_id.to_string()),
            Cell::from(truncate_unicode(&p.name, NAME_WIDTH as usize)),
            Cell::from(p.memory_usage_kb.to_string()),
            Cell::from(memory_share_cell(p.memory_percent)),
            Cell::from(cpu_cell(p.cpu_usage_percent)),
        ])
        .style(Style::default().fg(theme.text_primary))
    });

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border))
        .title(Span::styled(
            format!(" Top processes by {} ", sort_mode.label()),
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ));

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Length(NAME_WIDTH),
            Constraint::Length(18),
            Constraint::Length(11),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(block)
    .row_highlight_style(
        Style::default()
            .fg(theme.selection_fg)
            .bg(theme.selection_bg)
            .add_modifier(Modifier::BOLD),
    );

    let mut state = TableState::default().with_selected(selected);
    frame.render_stateful_widget(table, area, &mut state);
}
