use std::time::Duration;

use ratatui::crossterm::event::{self, Event, KeyCode, MouseButton, MouseEvent, MouseEventKind};
use tracing::trace;

use crate::domain::{Message, RowedConfig, RowedError};
use crate::model::Model;

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &RowedConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, RowedError> {
        if event::poll(Duration::from_millis(self.event_poll_time))? {
            match event::read()? {
                Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                    // While the command line collects input, keys go to the
                    // model unmapped.
                    if model.raw_keyevents() {
                        return Ok(Some(Message::RawKey(key)));
                    }
                    return Ok(self.handle_key(key));
                }
                Event::Mouse(mouse) => return Ok(Self::handle_mouse(mouse)),
                Event::Resize(width, height) => {
                    return Ok(Some(Message::Resize(width as usize, height as usize)));
                }
                _ => {}
            }
        }
        Ok(None)
    }

    fn handle_key(&self, key: event::KeyEvent) -> Option<Message> {
        let message = match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Up | KeyCode::Char('k') => Some(Message::MoveUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Message::MoveDown),
            KeyCode::Left | KeyCode::Char('h') => Some(Message::MoveLeft),
            KeyCode::Right | KeyCode::Char('l') => Some(Message::MoveRight),
            KeyCode::Char('n') | KeyCode::PageDown => Some(Message::NextPage),
            KeyCode::Char('p') | KeyCode::PageUp => Some(Message::PrevPage),
            KeyCode::Char('g') | KeyCode::Home => Some(Message::FirstPage),
            KeyCode::Char('G') | KeyCode::End => Some(Message::LastPage),
            KeyCode::Char('r') => Some(Message::CycleRowsPerPage),
            KeyCode::Char('/') => Some(Message::Search),
            KeyCode::Enter | KeyCode::Char('e') => Some(Message::Enter),
            KeyCode::Char('b') => Some(Message::BulkEdit),
            KeyCode::Char(' ') => Some(Message::ToggleSelect),
            KeyCode::Char('K') => Some(Message::ShiftUp),
            KeyCode::Char('J') => Some(Message::ShiftDown),
            KeyCode::Char('s') => Some(Message::Save),
            KeyCode::Char('c') => Some(Message::Cancel),
            KeyCode::Char('o') => Some(Message::ColumnPrefs),
            KeyCode::Char('y') => Some(Message::CopyCell),
            KeyCode::Char('Y') => Some(Message::CopyRow),
            KeyCode::Char('?') => Some(Message::Help),
            KeyCode::Esc => Some(Message::Exit),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }

    fn handle_mouse(mouse: MouseEvent) -> Option<Message> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                Some(Message::MouseDown(mouse.column, mouse.row))
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                Some(Message::MouseDrag(mouse.column, mouse.row))
            }
            MouseEventKind::Up(MouseButton::Left) => {
                Some(Message::MouseUp(mouse.column, mouse.row))
            }
            MouseEventKind::ScrollUp => Some(Message::MoveUp),
            MouseEventKind::ScrollDown => Some(Message::MoveDown),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::{KeyEvent, KeyModifiers};

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn keys_map_to_messages() {
        let controller = Controller::new(&RowedConfig::default());
        assert_eq!(
            controller.handle_key(KeyEvent::from(KeyCode::Char('q'))),
            Some(Message::Quit)
        );
        assert_eq!(
            controller.handle_key(KeyEvent::from(KeyCode::Char('/'))),
            Some(Message::Search)
        );
        assert_eq!(
            controller.handle_key(KeyEvent::from(KeyCode::Char('J'))),
            Some(Message::ShiftDown)
        );
        assert_eq!(controller.handle_key(KeyEvent::from(KeyCode::F(5))), None);
    }

    #[test]
    fn left_button_events_become_drag_messages() {
        assert_eq!(
            Controller::handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 2, 5)),
            Some(Message::MouseDown(2, 5))
        );
        assert_eq!(
            Controller::handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 2, 6)),
            Some(Message::MouseDrag(2, 6))
        );
        assert_eq!(
            Controller::handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 2, 6)),
            Some(Message::MouseUp(2, 6))
        );
        assert_eq!(
            Controller::handle_mouse(mouse(MouseEventKind::Down(MouseButton::Right), 2, 6)),
            None
        );
    }
}
