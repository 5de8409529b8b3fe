use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::Mode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Reload,
    FocusSearch,
    ClearSearch,
    LeaveInput,
    SelectNext,
    SelectPrev,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    /// Jump to the nth numbered page button (0-based).
    JumpWindow(usize),
    EditName,
    EditBody,
    Commit,
    Cancel,
    Input(char),
    Backspace,
    None,
}

impl Action {
    pub fn from_key(key: KeyEvent, mode: Mode) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }
        match mode {
            Mode::Normal => match key.code {
                KeyCode::Char('q') => Action::Quit,
                KeyCode::Char('r') => Action::Reload,
                KeyCode::Char('/') => Action::FocusSearch,
                KeyCode::Esc => Action::ClearSearch,
                KeyCode::Up | KeyCode::Char('k') => Action::SelectPrev,
                KeyCode::Down | KeyCode::Char('j') => Action::SelectNext,
                KeyCode::Left | KeyCode::Char('h') => Action::PrevPage,
                KeyCode::Right | KeyCode::Char('l') => Action::NextPage,
                KeyCode::Home => Action::FirstPage,
                KeyCode::End => Action::LastPage,
                KeyCode::Char(c @ '1'..='5') => Action::JumpWindow(c as usize - '1' as usize),
                KeyCode::Char('n') => Action::EditName,
                KeyCode::Char('b') | KeyCode::Enter => Action::EditBody,
                _ => Action::None,
            },
            Mode::Search => match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Down => Action::LeaveInput,
                KeyCode::Backspace => Action::Backspace,
                KeyCode::Char(c) => Action::Input(c),
                _ => Action::None,
            },
            Mode::Editing => match key.code {
                KeyCode::Enter => Action::Commit,
                KeyCode::Esc => Action::Cancel,
                KeyCode::Backspace => Action::Backspace,
                KeyCode::Char(c) => Action::Input(c),
                _ => Action::None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn digits_jump_within_window() {
        assert_eq!(Action::from_key(key(KeyCode::Char('1')), Mode::Normal), Action::JumpWindow(0));
        assert_eq!(Action::from_key(key(KeyCode::Char('5')), Mode::Normal), Action::JumpWindow(4));
        assert_eq!(Action::from_key(key(KeyCode::Char('6')), Mode::Normal), Action::None);
    }

    #[test]
    fn typing_modes_capture_characters() {
        assert_eq!(Action::from_key(key(KeyCode::Char('q')), Mode::Search), Action::Input('q'));
        assert_eq!(Action::from_key(key(KeyCode::Char('n')), Mode::Editing), Action::Input('n'));
        assert_eq!(Action::from_key(key(KeyCode::Enter), Mode::Editing), Action::Commit);
        assert_eq!(Action::from_key(key(KeyCode::Esc), Mode::Editing), Action::Cancel);
    }

    #[test]
    fn ctrl_c_always_quits() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        for mode in [Mode::Normal, Mode::Search, Mode::Editing] {
            assert_eq!(Action::from_key(ctrl_c, mode), Action::Quit);
        }
    }
}
