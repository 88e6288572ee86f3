//! Terminal dashboard for robot monitoring and manual control.

#![allow(missing_docs)]

use std::collections::VecDeque;
use std::io;
use std::time::{Duration, Instant};

use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::backend::CrosstermBackend;
use ratatui::{
    layout::{Constraint, Direction as LayoutDirection, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph},
    Terminal,
};
use tracing::debug;

use crate::command::{ControlMode, Direction};
use crate::config::Theme;
use crate::engine::{EngineView, InputEvent};
use crate::mapper::{Key, KeyInput};
use crate::session::SessionHandle;
use crate::telemetry::SignalLabel;

mod input;
mod render;
mod state;

use input::UiAction;
use state::UiState;

const COLOR_TEAL: Color = Color::Rgb(0, 168, 150);
const COLOR_GREEN: Color = Color::Rgb(46, 204, 113);
const COLOR_AMBER: Color = Color::Rgb(243, 156, 18);
const COLOR_RED: Color = Color::Rgb(231, 76, 60);
const COLOR_INFO: Color = Color::Rgb(142, 142, 147);
const COLOR_BLUE: Color = Color::Rgb(52, 152, 219);

const MAX_ALERTS: usize = 4;

/// Foreground/background pair per theme.
#[derive(Debug, Clone, Copy)]
struct Palette {
    background: Color,
    text: Color,
    muted: Color,
    border: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                background: Color::Rgb(245, 246, 250),
                text: Color::Rgb(51, 51, 51),
                muted: Color::Rgb(110, 110, 115),
                border: Color::Rgb(200, 200, 205),
            },
            Theme::Dark => Self {
                background: Color::Rgb(18, 18, 18),
                text: Color::Rgb(236, 236, 236),
                muted: COLOR_INFO,
                border: Color::Rgb(70, 70, 75),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiOptions {
    pub theme: Theme,
    pub no_input: bool,
    /// Synthesised key-up delay for terminals that never report releases.
    pub release_grace: Duration,
}

pub fn run_ui(handle: SessionHandle, options: UiOptions) -> anyhow::Result<()> {
    let key_releases = supports_keyboard_enhancement().unwrap_or(false);
    debug!(key_releases, "terminal keyboard capabilities");
    let mut state = UiState::new(&options, key_releases);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    if key_releases {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result: anyhow::Result<()> = (|| {
        loop {
            while let Some(view) = handle.latest_view() {
                state.apply_view(view);
            }
            if let Some(release) = state.expire_held_key(Instant::now()) {
                handle.key(release);
            }

            terminal.draw(|frame| render::render_ui(frame.size(), frame, &state))?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    match input::handle_key(key, &mut state, Instant::now()) {
                        UiAction::Quit => break,
                        UiAction::Engine(event) => {
                            forward(&handle, event);
                        }
                        UiAction::None => {}
                    }
                }
            }
        }
        Ok(())
    })();

    if key_releases {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    handle.shutdown();
    result
}

fn forward(handle: &SessionHandle, event: InputEvent) {
    let delivered = match event {
        InputEvent::DirectiveStart(direction) => handle.directive_start(direction),
        InputEvent::DirectiveEnd => handle.directive_end(),
        InputEvent::Key(input) => handle.key(input),
        InputEvent::SwitchMode(mode) => handle.switch_mode(mode),
        InputEvent::Shutdown => false,
    };
    if !delivered {
        debug!(?event, "session gone; input dropped");
    }
}

fn signal_color(label: SignalLabel) -> Color {
    match label {
        SignalLabel::Excellent | SignalLabel::Good => COLOR_GREEN,
        SignalLabel::Fair => COLOR_AMBER,
        SignalLabel::Poor | SignalLabel::VeryPoor => COLOR_RED,
    }
}

fn direction_glyph(direction: Direction) -> &'static str {
    match direction {
        Direction::Forward => "▲",
        Direction::Backward => "▼",
        Direction::Left => "◀",
        Direction::Right => "▶",
    }
}

fn mode_title(mode: ControlMode) -> &'static str {
    match mode {
        ControlMode::Manual => "Manual Mode",
        ControlMode::Autonomous => "Autonomous Mode",
    }
}
