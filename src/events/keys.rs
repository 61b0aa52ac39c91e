//! Key binding definitions.
//!
//! Navigation predicates shared by the views. With vim mode enabled the
//! usual hjkl-style movement keys work alongside the arrow keys; with it
//! disabled only the arrow keys move the cursor.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Key binding configuration.
#[derive(Debug, Clone, Copy)]
pub struct KeyBindings {
    /// Whether vim-style bindings are enabled.
    vim_mode: bool,
}

impl KeyBindings {
    /// Create new key bindings.
    pub fn new(vim_mode: bool) -> Self {
        Self { vim_mode }
    }

    /// Check whether vim-style bindings are enabled.
    pub fn vim_mode(&self) -> bool {
        self.vim_mode
    }

    /// Move the cursor down one row.
    pub fn is_down(&self, key: KeyEvent) -> bool {
        key.code == KeyCode::Down
            || (self.vim_mode
                && key.code == KeyCode::Char('j')
                && key.modifiers == KeyModifiers::NONE)
    }

    /// Move the cursor up one row.
    pub fn is_up(&self, key: KeyEvent) -> bool {
        key.code == KeyCode::Up
            || (self.vim_mode
                && key.code == KeyCode::Char('k')
                && key.modifiers == KeyModifiers::NONE)
    }

    /// Jump to the first row.
    pub fn is_top(&self, key: KeyEvent) -> bool {
        key.code == KeyCode::Home
            || (self.vim_mode
                && key.code == KeyCode::Char('g')
                && key.modifiers == KeyModifiers::NONE)
    }

    /// Jump to the last row.
    pub fn is_bottom(&self, key: KeyEvent) -> bool {
        key.code == KeyCode::End
            || (self.vim_mode
                && key.code == KeyCode::Char('G')
                && key.modifiers == KeyModifiers::SHIFT)
    }

    /// Move a page down.
    pub fn is_page_down(&self, key: KeyEvent) -> bool {
        key.code == KeyCode::PageDown
            || (key.code == KeyCode::Char('d') && key.modifiers == KeyModifiers::CONTROL)
    }

    /// Move a page up.
    pub fn is_page_up(&self, key: KeyEvent) -> bool {
        key.code == KeyCode::PageUp
            || (key.code == KeyCode::Char('u') && key.modifiers == KeyModifiers::CONTROL)
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_arrow_keys_always_navigate() {
        let bindings = KeyBindings::new(false);
        assert!(bindings.is_down(key(KeyCode::Down)));
        assert!(bindings.is_up(key(KeyCode::Up)));
    }

    #[test]
    fn test_vim_keys_enabled() {
        let bindings = KeyBindings::new(true);
        assert!(bindings.is_down(key(KeyCode::Char('j'))));
        assert!(bindings.is_up(key(KeyCode::Char('k'))));
        assert!(bindings.is_top(key(KeyCode::Char('g'))));
        assert!(bindings.is_bottom(KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT)));
    }

    #[test]
    fn test_vim_keys_disabled() {
        let bindings = KeyBindings::new(false);
        assert!(!bindings.is_down(key(KeyCode::Char('j'))));
        assert!(!bindings.is_up(key(KeyCode::Char('k'))));
    }

    #[test]
    fn test_page_navigation() {
        let bindings = KeyBindings::default();
        assert!(bindings.is_page_down(KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL)));
        assert!(bindings.is_page_up(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL)));
        assert!(bindings.is_page_down(key(KeyCode::PageDown)));
    }
}
