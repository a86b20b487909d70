//! Stateless rendering of a session snapshot.

use crate::session::{LogEntry, Origin, Snapshot};
use ollama_tictactoe::{Cell, Mark};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

/// Draws the board, the game log and the status line.
pub fn draw(frame: &mut Frame, snapshot: &Snapshot, cursor: usize, status: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(11),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let title = Paragraph::new("Ollama Games - Tic Tac Toe")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(40), Constraint::Min(30)])
        .split(chunks[1]);

    draw_board(frame, body[0], snapshot, cursor);
    draw_log(frame, body[1], &snapshot.log);

    let status = Paragraph::new(status)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, chunks[2]);
}

fn draw_board(frame: &mut Frame, area: Rect, snapshot: &Snapshot, cursor: usize) {
    let block = Block::default().title("Board").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(inner);

    for (row, row_area) in rows.iter().enumerate() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(*row_area);

        for (col, cell_area) in cols.iter().enumerate() {
            draw_cell(frame, *cell_area, snapshot, cursor, row * 3 + col);
        }
    }
}

fn draw_cell(frame: &mut Frame, area: Rect, snapshot: &Snapshot, cursor: usize, index: usize) {
    let state = &snapshot.state;
    let cell = state.board().get(index).unwrap_or_default();

    let (symbol, mut style) = match cell {
        Cell::Empty => (
            (index + 1).to_string(),
            Style::default().fg(Color::DarkGray),
        ),
        Cell::Marked(Mark::X) => (
            "X".to_string(),
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        ),
        Cell::Marked(Mark::O) => (
            "O".to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
    };

    if state.winning_line().is_some_and(|line| line.contains(index)) {
        style = style.bg(Color::Green).fg(Color::Black);
    } else if state.last_move() == Some(index) {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    if index == cursor {
        style = style.add_modifier(Modifier::REVERSED);
    }

    let cell = Paragraph::new(Line::from(Span::styled(symbol, style)))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(cell, area);
}

fn draw_log(frame: &mut Frame, area: Rect, log: &[LogEntry]) {
    let visible = area.height.saturating_sub(2) as usize;
    let items: Vec<ListItem> = log
        .iter()
        .skip(log.len().saturating_sub(visible))
        .map(|entry| {
            let color = match entry.origin {
                Origin::Human => Color::Blue,
                Origin::AutomatedPlayer => Color::Red,
                Origin::System => Color::Gray,
            };
            ListItem::new(Line::from(Span::styled(
                entry.text.clone(),
                Style::default().fg(color),
            )))
        })
        .collect();

    let list = List::new(items).block(Block::default().title("Game log").borders(Borders::ALL));
    frame.render_widget(list, area);
}
