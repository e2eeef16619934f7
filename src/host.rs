//! Host session capability interface
//!
//! The pause layer couples to the host game loop through this one explicit
//! trait instead of probing duck-typed globals. Every member has a default
//! so hosts implement only what they support.

/// A selectable UI language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageOption {
    pub value: String,
    pub label: String,
}

/// Capabilities the pause layer calls on the host game/session object
pub trait HostSession {
    /// Stop the external play clock
    fn on_pause(&mut self) {}
    /// Resume the external play clock
    fn on_resume(&mut self) {}
    /// Ask the host whether quitting is allowed. `Some(false)` vetoes the
    /// quit and keeps the pause menu open; `None` means "no opinion".
    fn confirm_quit(&mut self) -> Option<bool> {
        None
    }
    fn wave(&self) -> u32 {
        0
    }
    fn score(&self) -> u64 {
        0
    }
    fn is_paused(&self) -> bool {
        false
    }
    fn set_paused(&mut self, _paused: bool) {}
    fn language(&self) -> String {
        "en".to_string()
    }
    fn set_language(&mut self, _code: &str) {}
    fn languages(&self) -> Vec<LanguageOption> {
        vec![LanguageOption {
            value: "en".to_string(),
            label: "English".to_string(),
        }]
    }
}

/// Minimal in-memory host used by tests and the demo binary
#[derive(Debug, Default)]
pub struct StubSession {
    pub paused: bool,
    pub wave: u32,
    pub score: u64,
    pub language: String,
    pub quit_allowed: Option<bool>,
    pub pause_calls: u32,
    pub resume_calls: u32,
}

impl HostSession for StubSession {
    fn on_pause(&mut self) {
        self.pause_calls += 1;
        self.paused = true;
    }

    fn on_resume(&mut self) {
        self.resume_calls += 1;
        self.paused = false;
    }

    fn confirm_quit(&mut self) -> Option<bool> {
        self.quit_allowed
    }

    fn wave(&self) -> u32 {
        self.wave
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    fn language(&self) -> String {
        if self.language.is_empty() {
            "en".to_string()
        } else {
            self.language.clone()
        }
    }

    fn set_language(&mut self, code: &str) {
        self.language = code.to_string();
    }
}
