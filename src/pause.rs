//! Pause menu and resume countdown controller
//!
//! Owns the pause-menu session state: menu visibility, the 3-2-1-GO resume
//! countdown, keyboard focus trapping, and the 1 Hz stat refresh while the
//! menu is open. The controller talks to the host game exclusively through
//! the [`HostSession`] capability trait and publishes typed [`PauseEvent`]s
//! on an internal queue the UI drains each frame.
//!
//! Timers are deadlines against an injected monotonic clock, advanced by
//! `update(now)`. Every scheduled entry carries a generation tag; cancelling
//! bumps the generation and clears the whole list in one sweep, so a stale
//! step can never fire into a newer countdown.

use std::collections::VecDeque;

use crate::host::HostSession;

/// Countdown step labels and their offsets from countdown start, seconds
const COUNTDOWN_STEPS: [(&str, f64); 4] = [("3", 0.0), ("2", 1.0), ("1", 2.0), ("GO", 3.0)];
/// Hold after "GO" before play resumes
const COUNTDOWN_FINISH_AT: f64 = 3.75;
/// Stat refresh cadence while the menu is open
const STAT_POLL_INTERVAL: f64 = 1.0;

/// Keys the pause layer handles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseKey {
    Escape,
    Tab,
    ShiftTab,
    ArrowLeft,
    ArrowRight,
    Enter,
    Space,
}

/// Who initiated a toggle. Host-originated toggles are echoes of the
/// controller's own signaling and are dropped by the re-entrancy guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleTrigger {
    User,
    Host,
}

/// Typed events published for external listeners
#[derive(Debug, Clone, PartialEq)]
pub enum PauseEvent {
    MenuOpened,
    MenuClosed,
    CountdownStep(&'static str),
    CountdownCancelled,
    StatsRefreshed { wave: u32, score: u64 },
    TabChanged(usize),
    ControlActivated(String),
    RestoreFocus(String),
    LanguageChanged(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum TimerKind {
    CountdownStep(usize),
    CountdownFinish,
    StatPoll,
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    deadline: f64,
    generation: u64,
    kind: TimerKind,
}

/// Pause-menu session state. One per UI mount; lives for the app lifetime.
pub struct PauseController<H: HostSession> {
    host: H,
    menu_open: bool,
    countdown_active: bool,
    /// Pause-menu tab names (wrapping left/right cycle)
    tabs: Vec<String>,
    active_tab: usize,
    /// Focusable control ids inside the menu (the focus trap)
    controls: Vec<String>,
    focused: usize,
    /// Focusable ids on the underlying page, for focus restore
    page_controls: Vec<String>,
    /// Control focused before the menu opened
    remembered_focus: Option<String>,
    timers: Vec<Timer>,
    generation: u64,
    /// Re-entrancy guard around controller-originated host signaling
    suppress_host_toggle: bool,
    events: VecDeque<PauseEvent>,
}

impl<H: HostSession> PauseController<H> {
    pub fn new(host: H, tabs: Vec<String>, controls: Vec<String>) -> Self {
        Self {
            host,
            menu_open: false,
            countdown_active: false,
            tabs,
            active_tab: 0,
            controls,
            focused: 0,
            page_controls: Vec::new(),
            remembered_focus: None,
            timers: Vec::new(),
            generation: 0,
            suppress_host_toggle: false,
            events: VecDeque::new(),
        }
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu_open
    }

    pub fn is_countdown_active(&self) -> bool {
        self.countdown_active
    }

    pub fn active_tab(&self) -> usize {
        self.active_tab
    }

    pub fn focused_control(&self) -> Option<&str> {
        self.controls.get(self.focused).map(String::as_str)
    }

    /// Number of scheduled timers still pending (test hook)
    pub fn outstanding_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Drain published events in emission order
    pub fn drain_events(&mut self) -> Vec<PauseEvent> {
        self.events.drain(..).collect()
    }

    /// Track which underlying-page control currently has focus, so it can
    /// be restored when the menu closes
    pub fn note_page_focus(&mut self, id: &str) {
        if !self.menu_open && !self.countdown_active {
            self.remembered_focus = Some(id.to_string());
        }
    }

    /// Replace the set of page controls eligible for focus restore
    pub fn set_page_controls(&mut self, controls: Vec<String>) {
        self.page_controls = controls;
    }

    /// Toggle the pause state.
    ///
    /// Not paused: opens the menu. Menu open: starts the resume countdown.
    /// Countdown running: cancels it and re-opens the menu - cancellation
    /// never resumes play directly.
    pub fn toggle_pause(&mut self, now: f64, trigger: ToggleTrigger) {
        if trigger == ToggleTrigger::Host && self.suppress_host_toggle {
            // Echo of our own pause signal; swallow it
            self.suppress_host_toggle = false;
            log::debug!("suppressed host echo of pause toggle");
            return;
        }

        if self.countdown_active {
            self.cancel_countdown(now);
        } else if !self.menu_open {
            self.open_menu(now);
        } else {
            self.start_countdown(now);
        }
    }

    fn open_menu(&mut self, now: f64) {
        self.menu_open = true;
        self.focused = 0;
        self.suppress_host_toggle = true;
        self.host.on_pause();
        self.host.set_paused(true);
        self.schedule(now + STAT_POLL_INTERVAL, TimerKind::StatPoll);
        self.events.push_back(PauseEvent::MenuOpened);
    }

    fn start_countdown(&mut self, now: f64) {
        self.clear_timers();
        self.menu_open = false;
        self.countdown_active = true;
        for (index, (_, offset)) in COUNTDOWN_STEPS.iter().enumerate() {
            self.schedule(now + offset, TimerKind::CountdownStep(index));
        }
        self.schedule(now + COUNTDOWN_FINISH_AT, TimerKind::CountdownFinish);
    }

    /// Cancel a running countdown: one atomic timer sweep, then back to the
    /// open menu with stat polling restored
    pub fn cancel_countdown(&mut self, now: f64) {
        if !self.countdown_active {
            return;
        }
        self.clear_timers();
        self.countdown_active = false;
        self.menu_open = true;
        self.schedule(now + STAT_POLL_INTERVAL, TimerKind::StatPoll);
        self.events.push_back(PauseEvent::CountdownCancelled);
        self.events.push_back(PauseEvent::MenuOpened);
    }

    fn finish_countdown(&mut self) {
        self.clear_timers();
        self.countdown_active = false;
        self.suppress_host_toggle = true;
        self.host.on_resume();
        self.host.set_paused(false);
        if let Some(id) = self.remembered_focus.take() {
            // No-op if the control no longer exists
            if self.page_controls.iter().any(|c| *c == id) {
                self.events.push_back(PauseEvent::RestoreFocus(id));
            }
        }
        self.events.push_back(PauseEvent::MenuClosed);
    }

    /// Advance the injected clock; fires every due timer in deadline order
    pub fn update(&mut self, now: f64) {
        loop {
            let due = self
                .timers
                .iter()
                .enumerate()
                .filter(|(_, t)| t.deadline <= now && t.generation == self.generation)
                .min_by(|(_, a), (_, b)| a.deadline.total_cmp(&b.deadline))
                .map(|(i, t)| (i, *t));
            let Some((index, timer)) = due else {
                break;
            };
            self.timers.swap_remove(index);
            match timer.kind {
                TimerKind::CountdownStep(step) => {
                    let (label, _) = COUNTDOWN_STEPS[step];
                    self.events.push_back(PauseEvent::CountdownStep(label));
                }
                TimerKind::CountdownFinish => self.finish_countdown(),
                TimerKind::StatPoll => {
                    if self.menu_open {
                        self.events.push_back(PauseEvent::StatsRefreshed {
                            wave: self.host.wave(),
                            score: self.host.score(),
                        });
                        self.schedule(timer.deadline + STAT_POLL_INTERVAL, TimerKind::StatPoll);
                    }
                }
            }
        }
    }

    /// Handle a key while the pause layer is active. Returns true when the
    /// key was consumed. While the countdown runs everything except the
    /// toggle is suppressed; while the menu is open focus never escapes it.
    pub fn handle_key(&mut self, key: PauseKey, now: f64) -> bool {
        if key == PauseKey::Escape {
            self.toggle_pause(now, ToggleTrigger::User);
            return true;
        }

        if self.countdown_active || !self.menu_open {
            return false;
        }

        match key {
            PauseKey::Tab => {
                if !self.controls.is_empty() {
                    self.focused = (self.focused + 1) % self.controls.len();
                }
                true
            }
            PauseKey::ShiftTab => {
                if !self.controls.is_empty() {
                    self.focused = (self.focused + self.controls.len() - 1) % self.controls.len();
                }
                true
            }
            PauseKey::ArrowLeft => {
                if !self.tabs.is_empty() {
                    self.active_tab = (self.active_tab + self.tabs.len() - 1) % self.tabs.len();
                    self.events.push_back(PauseEvent::TabChanged(self.active_tab));
                }
                true
            }
            PauseKey::ArrowRight => {
                if !self.tabs.is_empty() {
                    self.active_tab = (self.active_tab + 1) % self.tabs.len();
                    self.events.push_back(PauseEvent::TabChanged(self.active_tab));
                }
                true
            }
            PauseKey::Enter | PauseKey::Space => {
                if let Some(id) = self.controls.get(self.focused) {
                    self.events.push_back(PauseEvent::ControlActivated(id.clone()));
                }
                true
            }
            PauseKey::Escape => unreachable!("handled above"),
        }
    }

    /// Ask the host to quit. A `Some(false)` veto keeps the menu open.
    pub fn request_quit(&mut self) -> bool {
        if self.host.confirm_quit() == Some(false) {
            return false;
        }
        self.clear_timers();
        self.menu_open = false;
        self.countdown_active = false;
        self.events.push_back(PauseEvent::MenuClosed);
        true
    }

    /// Change the UI language through the host and notify listeners
    pub fn select_language(&mut self, code: &str) {
        self.host.set_language(code);
        self.events.push_back(PauseEvent::LanguageChanged(code.to_string()));
    }

    fn schedule(&mut self, deadline: f64, kind: TimerKind) {
        self.timers.push(Timer {
            deadline,
            generation: self.generation,
            kind,
        });
    }

    /// Atomic sweep: no timer scheduled before this call can fire after it
    fn clear_timers(&mut self) {
        self.generation += 1;
        self.timers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::StubSession;

    fn controller() -> PauseController<StubSession> {
        PauseController::new(
            StubSession {
                wave: 4,
                score: 1200,
                ..Default::default()
            },
            vec!["stats".into(), "options".into(), "help".into()],
            vec!["resume".into(), "settings".into(), "quit".into()],
        )
    }

    #[test]
    fn test_open_menu_pauses_host_and_polls_stats() {
        let mut c = controller();
        c.toggle_pause(0.0, ToggleTrigger::User);
        assert!(c.is_menu_open());
        assert!(c.host().paused);
        assert_eq!(c.host().pause_calls, 1);

        c.update(2.05);
        let events = c.drain_events();
        assert_eq!(events[0], PauseEvent::MenuOpened);
        let polls = events
            .iter()
            .filter(|e| matches!(e, PauseEvent::StatsRefreshed { wave: 4, score: 1200 }))
            .count();
        assert_eq!(polls, 2);
    }

    #[test]
    fn test_countdown_sequence_and_finish() {
        let mut c = controller();
        c.toggle_pause(0.0, ToggleTrigger::User);
        c.drain_events();

        // Second toggle starts the countdown
        c.toggle_pause(10.0, ToggleTrigger::User);
        assert!(c.is_countdown_active());
        assert!(!c.is_menu_open());

        c.update(13.8);
        assert!(!c.is_countdown_active());
        assert!(!c.host().paused);
        assert_eq!(c.host().resume_calls, 1);
        assert_eq!(c.outstanding_timers(), 0);

        let events = c.drain_events();
        let labels: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                PauseEvent::CountdownStep(label) => Some(*label),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["3", "2", "1", "GO"]);
        assert_eq!(events.last(), Some(&PauseEvent::MenuClosed));
    }

    #[test]
    fn test_cancel_countdown_reopens_menu_with_no_stale_timers() {
        let mut c = controller();
        c.toggle_pause(0.0, ToggleTrigger::User);
        c.toggle_pause(5.0, ToggleTrigger::User);
        c.drain_events();

        // Cancel before any step fires
        c.toggle_pause(5.5, ToggleTrigger::User);
        assert!(!c.is_countdown_active());
        assert!(c.is_menu_open());
        // Only the restarted stat poll remains
        assert_eq!(c.outstanding_timers(), 1);

        // Advancing past the old step deadlines fires no labels
        c.update(20.0);
        let events = c.drain_events();
        assert!(
            events
                .iter()
                .all(|e| !matches!(e, PauseEvent::CountdownStep(_))),
            "stale countdown step fired after cancel: {events:?}"
        );
    }

    #[test]
    fn test_stale_step_never_fires_into_new_countdown() {
        let mut c = controller();
        c.toggle_pause(0.0, ToggleTrigger::User);
        c.toggle_pause(1.0, ToggleTrigger::User);
        // Cancel, then immediately start a new countdown
        c.toggle_pause(1.5, ToggleTrigger::User);
        c.toggle_pause(2.0, ToggleTrigger::User);
        c.drain_events();

        // Only the first new step ("3" at t=2.0) is due by t=2.1
        c.update(2.1);
        let labels: Vec<_> = c
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                PauseEvent::CountdownStep(label) => Some(label),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["3"]);
    }

    #[test]
    fn test_focus_trap_wraps_both_ends() {
        let mut c = controller();
        c.toggle_pause(0.0, ToggleTrigger::User);

        assert_eq!(c.focused_control(), Some("resume"));
        c.handle_key(PauseKey::ShiftTab, 0.1);
        assert_eq!(c.focused_control(), Some("quit"));
        c.handle_key(PauseKey::Tab, 0.2);
        assert_eq!(c.focused_control(), Some("resume"));
        c.handle_key(PauseKey::Tab, 0.3);
        c.handle_key(PauseKey::Tab, 0.4);
        c.handle_key(PauseKey::Tab, 0.5);
        assert_eq!(c.focused_control(), Some("resume"));
    }

    #[test]
    fn test_tab_cycling_wraps() {
        let mut c = controller();
        c.toggle_pause(0.0, ToggleTrigger::User);
        c.drain_events();

        c.handle_key(PauseKey::ArrowLeft, 0.1);
        assert_eq!(c.active_tab(), 2);
        c.handle_key(PauseKey::ArrowRight, 0.2);
        c.handle_key(PauseKey::ArrowRight, 0.3);
        assert_eq!(c.active_tab(), 1);
    }

    #[test]
    fn test_keys_suppressed_during_countdown() {
        let mut c = controller();
        c.toggle_pause(0.0, ToggleTrigger::User);
        c.toggle_pause(1.0, ToggleTrigger::User);
        c.drain_events();

        assert!(!c.handle_key(PauseKey::Tab, 1.1));
        assert!(!c.handle_key(PauseKey::Enter, 1.2));
        assert_eq!(c.drain_events(), vec![]);
    }

    #[test]
    fn test_activate_focused_control() {
        let mut c = controller();
        c.toggle_pause(0.0, ToggleTrigger::User);
        c.handle_key(PauseKey::Tab, 0.1);
        c.handle_key(PauseKey::Enter, 0.2);
        let events = c.drain_events();
        assert!(events.contains(&PauseEvent::ControlActivated("settings".into())));
    }

    #[test]
    fn test_quit_veto_keeps_menu_open() {
        let mut c = controller();
        c.host_mut().quit_allowed = Some(false);
        c.toggle_pause(0.0, ToggleTrigger::User);

        assert!(!c.request_quit());
        assert!(c.is_menu_open());

        c.host_mut().quit_allowed = Some(true);
        assert!(c.request_quit());
        assert!(!c.is_menu_open());
    }

    #[test]
    fn test_host_echo_is_suppressed_once() {
        let mut c = controller();
        c.toggle_pause(0.0, ToggleTrigger::User);
        assert!(c.is_menu_open());

        // The host echoes our pause signal back; it must not toggle
        c.toggle_pause(0.1, ToggleTrigger::Host);
        assert!(c.is_menu_open());
        assert!(!c.is_countdown_active());

        // A genuine host-side toggle afterwards is honored
        c.toggle_pause(0.2, ToggleTrigger::Host);
        assert!(c.is_countdown_active());
    }

    #[test]
    fn test_focus_restored_only_if_control_still_exists() {
        let mut c = controller();
        c.set_page_controls(vec!["fire-button".into()]);
        c.note_page_focus("fire-button");

        c.toggle_pause(0.0, ToggleTrigger::User);
        c.toggle_pause(1.0, ToggleTrigger::User);
        c.update(5.0);
        let events = c.drain_events();
        assert!(events.contains(&PauseEvent::RestoreFocus("fire-button".into())));

        // Same flow, but the control vanished while paused
        c.note_page_focus("fire-button");
        c.set_page_controls(Vec::new());
        c.toggle_pause(10.0, ToggleTrigger::User);
        c.toggle_pause(11.0, ToggleTrigger::User);
        c.update(15.0);
        let events = c.drain_events();
        assert!(!events.iter().any(|e| matches!(e, PauseEvent::RestoreFocus(_))));
    }

    #[test]
    fn test_stat_poll_stops_when_menu_closes() {
        let mut c = controller();
        c.toggle_pause(0.0, ToggleTrigger::User);
        c.update(1.0);
        c.toggle_pause(1.2, ToggleTrigger::User); // countdown
        c.update(6.0); // finish
        assert_eq!(c.outstanding_timers(), 0);

        c.drain_events();
        c.update(30.0);
        assert_eq!(c.drain_events(), vec![]);
    }
}
