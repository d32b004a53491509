//! Track card rendering

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, ListItem, Padding, Paragraph},
    Frame,
};

use crate::model::{ContentState, PlaybackInfo, PlaybackState, Track, UiState};
use super::utils::{render_scrollable_list, truncate_string};

pub fn render_track_list(
    frame: &mut Frame,
    area: Rect,
    ui_state: &UiState,
    content_state: &ContentState,
    playback: &PlaybackInfo,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Charts ({}) ", content_state.tracks.len()))
        .padding(Padding::horizontal(1));

    if content_state.is_loading {
        let loading = Paragraph::new("Loading tracks...")
            .style(Style::default().fg(Color::Yellow))
            .block(block);
        frame.render_widget(loading, area);
        return;
    }

    if content_state.tracks.is_empty() {
        let empty = Paragraph::new("No tracks available")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let inner_width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = content_state
        .tracks
        .iter()
        .enumerate()
        .map(|(i, track)| track_card(track, i == ui_state.selected, playback.state, inner_width))
        .collect();

    render_scrollable_list(frame, area, items, ui_state.selected, block);
}

fn track_card(track: &Track, selected: bool, state: PlaybackState, width: usize) -> ListItem<'static> {
    let playing = state.is_playing(track.id);
    let button = match state {
        PlaybackState::Loading(id) if id == track.id => "[ ... ]",
        _ if playing => "[Pause]",
        _ => "[Play ]",
    };

    // title line: "<title> <button>", title padded to push the button right
    let title_width = width.saturating_sub(button.len() + 1).max(4);
    let title_style = if selected {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    };
    let button_style = if playing {
        Style::default().fg(Color::Black).bg(Color::Blue)
    } else {
        Style::default().fg(Color::White).bg(Color::Magenta)
    };

    let title_line = Line::from(vec![
        Span::styled(truncate_string(&track.title, title_width), title_style),
        Span::raw(" "),
        Span::styled(button, button_style),
    ]);
    let artist_line = Line::from(vec![
        Span::styled(
            truncate_string(&track.artist_name, title_width),
            Style::default().fg(Color::Gray),
        ),
        Span::raw(" "),
        Span::styled(track.rank_label(), Style::default().fg(Color::Magenta)),
    ]);

    ListItem::new(vec![title_line, artist_line, Line::raw("")])
}
