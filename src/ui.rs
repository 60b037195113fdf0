//! Terminal control panel
//!
//! Draws the [`PanelView`] with ratatui and turns key presses into
//! [`ControlCommand`]s. Runs on the main thread; the simulation task is
//! reached only through the channels of a [`SimulationHandle`].

use std::io;
use std::time::Duration;

use crossterm::cursor::Show;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use log::{info, warn};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use tokio::sync::mpsc::error::TryRecvError;

use crate::commands::ControlCommand;
use crate::controller::SimulationHandle;
use crate::error::{Result, SimulatorError};
use crate::presenter::{PanelView, Readout, PANEL_TITLE};

/// How long to wait for a key before redrawing
const INPUT_POLL: Duration = Duration::from_millis(50);

const ROD_STEP: f64 = 1.0;
const ROD_COARSE_STEP: f64 = 10.0;

/// What a key press asks for
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyAction {
    Command(ControlCommand),
    Quit,
    Ignore,
}

/// Map a key to an action, honoring disabled controls
pub fn map_key(key: KeyEvent, view: Option<&PanelView>) -> KeyAction {
    let ctrl_c = key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl_c || matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
        return KeyAction::Quit;
    }

    // Nothing to control until the first snapshot arrives
    let Some(view) = view else {
        return KeyAction::Ignore;
    };

    // Steps are relative so presses between two snapshots all count
    let rods = |command: ControlCommand| {
        if view.rod_control_enabled {
            KeyAction::Command(command)
        } else {
            KeyAction::Ignore
        }
    };

    match key.code {
        KeyCode::Left => rods(ControlCommand::NudgeRods(-ROD_STEP)),
        KeyCode::Right => rods(ControlCommand::NudgeRods(ROD_STEP)),
        KeyCode::PageDown => rods(ControlCommand::NudgeRods(-ROD_COARSE_STEP)),
        KeyCode::PageUp => rods(ControlCommand::NudgeRods(ROD_COARSE_STEP)),
        KeyCode::Home => rods(ControlCommand::SetRods(0.0)),
        KeyCode::End => rods(ControlCommand::SetRods(100.0)),
        KeyCode::Char('s') => KeyAction::Command(ControlCommand::ToggleScram),
        KeyCode::Char('c') if view.circulation_enabled => {
            KeyAction::Command(ControlCommand::ToggleCirculation)
        }
        KeyCode::Char('a') if view.auto_enabled => KeyAction::Command(ControlCommand::ToggleAuto),
        KeyCode::Char('r') => KeyAction::Command(ControlCommand::Reset),
        _ => KeyAction::Ignore,
    }
}

/// Raw mode and alternate screen, restored on drop
///
/// The guard exists as soon as raw mode is on, so any later setup error
/// still leaves the terminal usable.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let guard = TerminalGuard;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            warn!("Failed to disable raw mode: {}", e);
        }
        if let Err(e) = execute!(io::stdout(), LeaveAlternateScreen, Show) {
            warn!("Failed to restore terminal: {}", e);
        }
    }
}

/// Run the interactive panel until the operator quits
pub fn run_panel(simulation: &mut SimulationHandle, operator: &str) -> Result<()> {
    let _guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    terminal.hide_cursor()?;
    let mut view: Option<PanelView> = None;

    info!("Control panel opened for {}", operator);

    loop {
        // Drain everything published since the last frame, keep the newest
        let mut latest = None;
        loop {
            match simulation.snapshots.try_recv() {
                Ok(snapshot) => latest = Some(snapshot),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Err(SimulatorError::ChannelClosed),
            }
        }
        if let Some(snapshot) = latest {
            view = Some(PanelView::from_snapshot(&snapshot));
        }

        terminal.draw(|frame| draw(frame, view.as_ref(), operator))?;

        if !event::poll(INPUT_POLL)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match map_key(key, view.as_ref()) {
            KeyAction::Quit => break,
            KeyAction::Command(command) => simulation
                .commands
                .send(command)
                .map_err(|_| SimulatorError::ChannelClosed)?,
            KeyAction::Ignore => {}
        }
    }

    info!("Control panel closed");
    Ok(())
}

/// Render one frame of the panel
pub fn draw(frame: &mut Frame, view: Option<&PanelView>, operator: &str) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // header
            Constraint::Length(7), // readouts
            Constraint::Length(3), // rods
            Constraint::Length(3), // buttons
            Constraint::Length(3), // status
            Constraint::Min(3),    // alerts
            Constraint::Length(1), // key help
        ])
        .split(frame.size());

    draw_header(frame, rows[0], operator, view.map(|v| v.tick));

    let Some(view) = view else {
        let waiting = Paragraph::new("Waiting for reactor telemetry...")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow));
        frame.render_widget(waiting, rows[1]);
        return;
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);
    frame.render_widget(readout_column(&view.left), columns[0]);
    frame.render_widget(readout_column(&view.right), columns[1]);

    draw_rod_gauge(frame, rows[2], view);
    draw_buttons(frame, rows[3], view);

    let status = Paragraph::new(format!("Status: {}", view.status))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, rows[4]);

    let alert_lines: Vec<Line> = if view.alerts.is_empty() {
        vec![Line::from(Span::styled("No active alerts", Style::default().fg(Color::DarkGray)))]
    } else {
        view.alerts
            .iter()
            .map(|alert| Line::from(Span::styled(alert.as_str(), Style::default().fg(Color::Red))))
            .collect()
    };
    let alerts = Paragraph::new(alert_lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Alerts"));
    frame.render_widget(alerts, rows[5]);

    let help = Paragraph::new("←/→ rods ±1  PgUp/PgDn ±10  Home/End 0/100  s scram  c circulation  a auto  r reset  q quit")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, rows[6]);
}

fn draw_header(frame: &mut Frame, area: Rect, operator: &str, tick: Option<u64>) {
    let rule = "#".repeat(60);
    let green = Style::default().fg(Color::Green);
    let tick_text = tick.map(|t| format!("   Tick: {}", t)).unwrap_or_default();
    let header = Paragraph::new(vec![
        Line::from(Span::styled(rule.clone(), green)),
        Line::from(Span::styled(
            format!("# {} ****", PANEL_TITLE),
            green.add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(rule, green)),
        Line::from(vec![
            Span::styled(format!("User Logged: {}", operator), Style::default().fg(Color::Cyan)),
            Span::styled(tick_text, Style::default().fg(Color::DarkGray)),
        ]),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(header, area);
}

fn readout_column(readouts: &[Readout]) -> Paragraph<'_> {
    let lines: Vec<Line> = readouts
        .iter()
        .map(|r| {
            Line::from(vec![
                Span::styled(format!("{}: ", r.label), Style::default().fg(Color::White)),
                Span::styled(
                    r.value.clone(),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!(" {}", r.unit), Style::default().fg(Color::White)),
            ])
        })
        .collect();
    Paragraph::new(lines).block(Block::default().borders(Borders::ALL))
}

fn draw_rod_gauge(frame: &mut Frame, area: Rect, view: &PanelView) {
    let color = if view.rod_control_enabled {
        Color::Gray
    } else {
        Color::DarkGray
    };
    let title = if view.rod_control_enabled {
        "Control Rods"
    } else {
        "Control Rods (locked)"
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .gauge_style(Style::default().fg(color))
        .ratio((view.rod_slider / 100.0).clamp(0.0, 1.0))
        .label(format!("{:.0}%", view.rod_slider));
    frame.render_widget(gauge, area);
}

fn draw_buttons(frame: &mut Frame, area: Rect, view: &PanelView) {
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let scram_bg = if view.scrammed {
        Color::LightRed
    } else {
        Color::Red
    };
    let auto_bg = if view.auto_active {
        Color::LightGreen
    } else {
        Color::Green
    };

    let buttons = [
        (format!("[s] {}", view.scram_label), scram_bg, true),
        ("[c] TOGGLE CIRCULATION".to_string(), Color::Blue, view.circulation_enabled),
        ("[a] AUTO MODE".to_string(), auto_bg, view.auto_enabled),
    ];

    for ((label, bg, enabled), cell) in buttons.into_iter().zip(cells.iter()) {
        let style = if enabled {
            Style::default().fg(Color::White).bg(bg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let button = Paragraph::new(label)
            .alignment(Alignment::Center)
            .style(style)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(button, *cell);
    }
}
