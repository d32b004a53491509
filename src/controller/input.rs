//! Key event handling

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::audio::AudioEngine;

use super::AppController;

impl<E: AudioEngine> AppController<E> {
    pub async fn handle_key_event(&mut self, key: KeyEvent) {
        // Only handle key press events, not release or repeat
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Char('c') => {
                    self.model.lock().await.set_should_quit(true);
                }
                KeyCode::Char('l') | KeyCode::Char('L') => {
                    self.logout().await;
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Enter => self.play_selected().await,
            KeyCode::Up => self.model.lock().await.move_selection_up(),
            KeyCode::Down => self.model.lock().await.move_selection_down(),
            KeyCode::Esc => self.model.lock().await.clear_search(),
            KeyCode::Backspace => self.model.lock().await.backspace_search(),
            KeyCode::Char(c) => self.model.lock().await.append_to_search(c),
            _ => {}
        }
    }
}
