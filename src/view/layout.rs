//! Layout rendering (greeting header, search bar)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Padding, Paragraph},
    Frame,
};

use crate::model::UiState;

const ACCENT: Color = Color::Magenta;

pub fn render_header(frame: &mut Frame, area: Rect, ui_state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Greeting
            Constraint::Length(44), // Key hints
        ])
        .split(area);

    let greeting = Paragraph::new(format!("Hi {}", ui_state.display_name))
        .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .padding(Padding::horizontal(1))
                .border_style(Style::default().fg(ACCENT)),
        );
    frame.render_widget(greeting, chunks[0]);

    let hints = Paragraph::new("Enter play/pause · ^L logout · ^Q quit")
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).padding(Padding::horizontal(1)));
    frame.render_widget(hints, chunks[1]);
}

pub fn render_search_bar(frame: &mut Frame, area: Rect, ui_state: &UiState) {
    let (text, style) = if ui_state.search_query.is_empty() {
        ("Type to search...", Style::default().fg(Color::DarkGray))
    } else {
        (ui_state.search_query.as_str(), Style::default().fg(Color::Green))
    };

    let search = Paragraph::new(text).style(style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Search ")
            .padding(Padding::horizontal(1))
            .border_style(Style::default().fg(Color::Green)),
    );
    frame.render_widget(search, area);
}
