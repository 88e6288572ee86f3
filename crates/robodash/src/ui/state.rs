use super::*;

/// Arrow key held on a terminal that never reports key-up.
#[derive(Debug, Clone, Copy)]
struct HeldKey {
    key: Key,
    last_seen: Instant,
}

#[derive(Debug)]
pub(super) struct UiState {
    pub(super) view: EngineView,
    pub(super) theme: Theme,
    pub(super) no_input: bool,
    key_releases: bool,
    release_grace: Duration,
    held: Option<HeldKey>,
    alerts: VecDeque<String>,
    seen_view: bool,
}

impl UiState {
    pub(super) fn new(options: &UiOptions, key_releases: bool) -> Self {
        Self {
            view: EngineView::default(),
            theme: options.theme,
            no_input: options.no_input,
            key_releases,
            release_grace: options.release_grace,
            held: None,
            alerts: VecDeque::new(),
            seen_view: false,
        }
    }

    pub(super) fn theme(&self) -> Theme {
        self.theme
    }

    pub(super) fn palette(&self) -> Palette {
        Palette::for_theme(self.theme)
    }

    pub(super) fn alerts(&self) -> &VecDeque<String> {
        &self.alerts
    }

    pub(super) fn key_releases(&self) -> bool {
        self.key_releases
    }

    pub(super) fn apply_view(&mut self, view: EngineView) {
        let first = !self.seen_view;
        if view.connected != self.view.connected && (view.connected || !first) {
            if view.connected {
                self.push_alert("CONNECTED Robot reachable.");
            } else {
                self.push_alert("DISCONNECTED Waiting for robot...");
            }
        }
        if !first && view.mode != self.view.mode {
            self.push_alert(&format!("MODE {}", mode_title(view.mode)));
        }
        self.seen_view = true;
        self.view = view;
    }

    fn push_alert(&mut self, text: &str) {
        if self.alerts.len() >= MAX_ALERTS {
            self.alerts.pop_front();
        }
        self.alerts.push_back(text.to_string());
    }

    /// Tracks an arrow press. Returns `false` when it only refreshes a key
    /// that is already held, which is how auto-repeat shows up here.
    pub(super) fn press(&mut self, key: Key, now: Instant) -> bool {
        if self.key_releases {
            return true;
        }
        match self.held.as_mut() {
            Some(held) if held.key == key => {
                held.last_seen = now;
                false
            }
            _ => {
                self.held = Some(HeldKey { key, last_seen: now });
                true
            }
        }
    }

    pub(super) fn release(&mut self, key: Key) {
        if self.held.is_some_and(|held| held.key == key) {
            self.held = None;
        }
    }

    pub(super) fn clear_held(&mut self) {
        self.held = None;
    }

    /// Synthesised key-up once a held key has gone quiet for the grace period.
    pub(super) fn expire_held_key(&mut self, now: Instant) -> Option<KeyInput> {
        let held = self.held?;
        if now.saturating_duration_since(held.last_seen) <= self.release_grace {
            return None;
        }
        self.held = None;
        Some(KeyInput::up(held.key))
    }
}
