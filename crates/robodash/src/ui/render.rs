use super::*;

/// Minimum width at which the three status cards sit side by side.
const WIDE_LAYOUT: u16 = 90;
const DISTANCE_BAR_CM: f64 = 100.0;

pub(super) fn render_ui(area: Rect, frame: &mut ratatui::Frame<'_>, state: &UiState) {
    let palette = state.palette();
    frame.render_widget(
        Block::default().style(Style::default().bg(palette.background).fg(palette.text)),
        area,
    );

    let manual = state.view.mode == ControlMode::Manual;
    let wide = area.width >= WIDE_LAYOUT;
    let cards_height = if wide { 6 } else { 17 };
    let footer_height = (state.alerts().len() as u16 + 3).min(8);
    let mut constraints = vec![
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(cards_height),
    ];
    if manual {
        constraints.push(Constraint::Length(7));
    }
    constraints.push(Constraint::Min(footer_height));

    let rows = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints(constraints)
        .split(area);
    render_header(rows[0], frame, state);
    render_mode_selector(rows[1], frame, state);
    render_cards(rows[2], frame, state, wide);
    if manual {
        render_joystick(rows[3], frame, state);
    }
    render_footer(rows[rows.len() - 1], frame, state);
}

fn card(title: &str, palette: Palette) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.border))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(COLOR_TEAL).add_modifier(Modifier::BOLD),
        ))
}

fn render_header(area: Rect, frame: &mut ratatui::Frame<'_>, state: &UiState) {
    let palette = state.palette();
    let (badge, color) = if state.view.connected {
        ("● Connected", COLOR_GREEN)
    } else {
        ("● Disconnected", COLOR_RED)
    };
    let line = Line::from(vec![
        Span::styled(
            "Robot Control Dashboard",
            Style::default().fg(palette.text).add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        Span::styled(badge, Style::default().fg(color).add_modifier(Modifier::BOLD)),
    ]);
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(palette.border));
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_mode_selector(area: Rect, frame: &mut ratatui::Frame<'_>, state: &UiState) {
    let palette = state.palette();
    let mut spans = Vec::new();
    for mode in [ControlMode::Manual, ControlMode::Autonomous] {
        let style = if mode == state.view.mode {
            Style::default()
                .fg(Color::White)
                .bg(COLOR_BLUE)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.muted)
        };
        spans.push(Span::styled(format!(" {} ", mode_title(mode)), style));
        spans.push(Span::raw("  "));
    }
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(palette.border));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_cards(area: Rect, frame: &mut ratatui::Frame<'_>, state: &UiState, wide: bool) {
    let slots = if wide {
        Layout::default()
            .direction(LayoutDirection::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(area)
    } else {
        Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints([
                Constraint::Length(6),
                Constraint::Length(5),
                Constraint::Length(6),
            ])
            .split(area)
    };
    render_sensors(slots[0], frame, state);
    render_movement(slots[1], frame, state);
    render_wifi(slots[2], frame, state);
}

fn ir_span(clear: bool) -> Span<'static> {
    if clear {
        Span::styled("Clear", Style::default().fg(COLOR_GREEN))
    } else {
        Span::styled(
            "Blocked",
            Style::default().fg(COLOR_RED).add_modifier(Modifier::BOLD),
        )
    }
}

fn render_sensors(area: Rect, frame: &mut ratatui::Frame<'_>, state: &UiState) {
    let palette = state.palette();
    let telemetry = &state.view.telemetry;
    let label = Style::default().fg(palette.muted);
    let block = card("Sensors", palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let rows = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(inner);
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Distance  ", label),
            Span::raw(format!("{:.1} cm", telemetry.distance)),
        ])),
        rows[0],
    );
    // Bar saturates at one metre.
    let fill = (telemetry.distance / DISTANCE_BAR_CM).clamp(0.0, 1.0);
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(COLOR_TEAL).bg(palette.border))
            .ratio(fill)
            .label(""),
        rows[1],
    );
    frame.render_widget(
        Paragraph::new(vec![
            Line::from(vec![Span::styled("IR left   ", label), ir_span(telemetry.ir_left)]),
            Line::from(vec![Span::styled("IR right  ", label), ir_span(telemetry.ir_right)]),
        ]),
        rows[2],
    );
}

fn render_movement(area: Rect, frame: &mut ratatui::Frame<'_>, state: &UiState) {
    let palette = state.palette();
    let telemetry = &state.view.telemetry;
    let block = card("Movement", palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let rows = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
        .split(inner);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            telemetry.movement.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ))),
        rows[0],
    );
    let speed = telemetry.speed.min(100);
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(COLOR_BLUE).bg(palette.border))
            .percent(u16::from(speed))
            .label(format!("{speed}%")),
        rows[1],
    );
}

fn signal_bars(bars: u8) -> String {
    ["▂", "▄", "▆", "█"]
        .iter()
        .enumerate()
        .map(|(index, glyph)| if index < usize::from(bars) { *glyph } else { "·" })
        .collect()
}

fn render_wifi(area: Rect, frame: &mut ratatui::Frame<'_>, state: &UiState) {
    let palette = state.palette();
    let dbm = state.view.telemetry.wifi_strength;
    let signal = state.view.telemetry.signal();
    let color = signal_color(signal.label());
    let block = card("WiFi", palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let rows = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
        .split(inner);
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(signal_bars(signal.bars()), Style::default().fg(color)),
            Span::raw(format!("  {dbm} dBm  ")),
            Span::styled(
                signal.label().as_str(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
        ])),
        rows[0],
    );
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(color).bg(palette.border))
            .ratio(signal.percent / 100.0)
            .label(format!("{:.0}%", signal.percent)),
        rows[1],
    );
}

fn render_joystick(area: Rect, frame: &mut ratatui::Frame<'_>, state: &UiState) {
    let palette = state.palette();
    let held = state.view.active_directive;
    let pad = |direction: Direction| {
        let style = if held == Some(direction) {
            Style::default()
                .fg(Color::White)
                .bg(COLOR_TEAL)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.text)
        };
        Span::styled(format!(" {} ", direction_glyph(direction)), style)
    };
    let status = match held {
        Some(direction) => Span::styled(
            format!("Driving {direction}"),
            Style::default().fg(COLOR_TEAL).add_modifier(Modifier::BOLD),
        ),
        None => Span::styled("Idle", Style::default().fg(palette.muted)),
    };
    let lines = vec![
        Line::from(vec![Span::raw("      "), pad(Direction::Forward)]),
        Line::from(vec![
            Span::raw("   "),
            pad(Direction::Left),
            Span::raw("   "),
            pad(Direction::Right),
            Span::raw("      "),
            status,
        ]),
        Line::from(vec![Span::raw("      "), pad(Direction::Backward)]),
    ];
    frame.render_widget(
        Paragraph::new(lines).block(card("Manual Control", palette)),
        area,
    );
}

fn render_footer(area: Rect, frame: &mut ratatui::Frame<'_>, state: &UiState) {
    let palette = state.palette();
    let metrics = &state.view.metrics;
    let mut lines: Vec<Line> = state
        .alerts()
        .iter()
        .map(|alert| {
            let color = if alert.starts_with("DISCONNECTED") {
                COLOR_RED
            } else if alert.starts_with("CONNECTED") {
                COLOR_GREEN
            } else {
                COLOR_INFO
            };
            Line::from(Span::styled(alert.clone(), Style::default().fg(color)))
        })
        .collect();
    lines.push(Line::from(Span::styled(
        format!(
            "polls {} ok / {} failed ({:.0}% loss)  commands {}  overruns {}  latency {:.0} ms",
            metrics.polls_ok,
            metrics.polls_failed,
            metrics.poll_failure_ratio() * 100.0,
            metrics.commands_issued,
            metrics.overruns,
            metrics.poll_latency.last_ms,
        ),
        Style::default().fg(palette.muted),
    )));
    let hints = if state.no_input {
        "read-only  t theme  q quit".to_string()
    } else {
        let release = if state.key_releases() { "" } else { " (tap)" };
        format!("arrows drive{release}  space stop  m manual  a auto  t theme  q quit")
    };
    lines.push(Line::from(Span::styled(hints, Style::default().fg(palette.muted))));
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(palette.border));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
