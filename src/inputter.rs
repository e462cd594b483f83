use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};

/// Collects a line of input on the status line: search terms, cell values
/// and bulk edit values. Edits happen at the curser, which counts chars.
#[derive(Default)]
pub struct Inputter {
    current_input: String,
    curser_pos: usize,
    finished: bool,
    canceled: bool,
}

#[derive(Default, Clone)]
pub struct InputResult {
    pub input: String,
    pub finished: bool,
    pub canceled: bool,
    pub curser_pos: usize,
}

impl Inputter {
    pub fn read(&mut self, key: event::KeyEvent) -> InputResult {
        match (key.code, key.modifiers) {
            (KeyCode::Enter, KeyModifiers::NONE) => self.enter(),
            (KeyCode::Esc, KeyModifiers::NONE) => self.escape(),
            (KeyCode::Backspace, KeyModifiers::NONE) => self.backspace(),
            (KeyCode::Delete, KeyModifiers::NONE) => self.delete(),
            (KeyCode::Left, KeyModifiers::NONE) => self.left(),
            (KeyCode::Right, KeyModifiers::NONE) => self.right(),
            (KeyCode::Home, KeyModifiers::NONE) => self.home(),
            (KeyCode::End, KeyModifiers::NONE) => self.end(),
            (kc, km) => self.key(kc, km),
        }
    }

    /// Prefills the input, e.g. with the current cell value when editing,
    /// and puts the curser behind it.
    pub fn set(&mut self, s: &str) {
        self.current_input = s.to_string();
        self.curser_pos = s.chars().count();
    }

    pub fn get(&self) -> InputResult {
        InputResult {
            canceled: self.canceled,
            finished: self.finished,
            input: self.current_input.clone(),
            curser_pos: self.curser_pos,
        }
    }

    pub fn clear(&mut self) {
        self.canceled = false;
        self.finished = false;
        self.current_input.clear();
        self.curser_pos = 0;
    }

    fn enter(&mut self) -> InputResult {
        self.finished = true;
        self.get()
    }

    fn escape(&mut self) -> InputResult {
        self.clear();
        self.canceled = true;
        self.finished = true;
        self.get()
    }

    fn backspace(&mut self) -> InputResult {
        if self.curser_pos > 0 {
            self.curser_pos -= 1;
            let byte_pos = self.getbytepos();
            self.current_input.remove(byte_pos);
        }
        self.get()
    }

    fn delete(&mut self) -> InputResult {
        let byte_pos = self.getbytepos();
        if byte_pos < self.current_input.len() {
            self.current_input.remove(byte_pos);
        }
        self.get()
    }

    fn left(&mut self) -> InputResult {
        self.curser_pos = self.curser_pos.saturating_sub(1);
        self.get()
    }

    fn right(&mut self) -> InputResult {
        if self.curser_pos < self.current_input.chars().count() {
            self.curser_pos += 1;
        }
        self.get()
    }

    fn home(&mut self) -> InputResult {
        self.curser_pos = 0;
        self.get()
    }

    fn end(&mut self) -> InputResult {
        self.curser_pos = self.current_input.chars().count();
        self.get()
    }

    fn key(&mut self, code: KeyCode, _modifier: KeyModifiers) -> InputResult {
        if let Some(chr) = code.as_char() {
            let byte_pos = self.getbytepos();
            self.current_input.insert(byte_pos, chr);
            self.curser_pos += 1;
        }
        self.get()
    }

    fn getbytepos(&self) -> usize {
        self.current_input
            .char_indices()
            .nth(self.curser_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.current_input.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyEvent;

    fn press(inputter: &mut Inputter, code: KeyCode) -> InputResult {
        inputter.read(KeyEvent::from(code))
    }

    #[test]
    fn typing_appends_and_enter_finishes() {
        let mut inputter = Inputter::default();
        press(&mut inputter, KeyCode::Char('h'));
        press(&mut inputter, KeyCode::Char('i'));
        let result = press(&mut inputter, KeyCode::Enter);
        assert!(result.finished);
        assert!(!result.canceled);
        assert_eq!(result.input, "hi");
    }

    #[test]
    fn escape_cancels_and_clears() {
        let mut inputter = Inputter::default();
        press(&mut inputter, KeyCode::Char('x'));
        let result = press(&mut inputter, KeyCode::Esc);
        assert!(result.finished);
        assert!(result.canceled);
        assert_eq!(result.input, "");
    }

    #[test]
    fn set_prefills_with_curser_at_the_end() {
        let mut inputter = Inputter::default();
        inputter.set("München");
        assert_eq!(inputter.get().curser_pos, 7);
        press(&mut inputter, KeyCode::Char('!'));
        assert_eq!(inputter.get().input, "München!");
    }

    #[test]
    fn backspace_removes_before_the_curser() {
        let mut inputter = Inputter::default();
        inputter.set("aöc");
        press(&mut inputter, KeyCode::Left);
        let result = press(&mut inputter, KeyCode::Backspace);
        assert_eq!(result.input, "ac");
        assert_eq!(result.curser_pos, 1);
    }
}
