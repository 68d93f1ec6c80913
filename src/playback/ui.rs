//! Terminal scope display and key handling.
//!
//! Draws the trail on a ratatui canvas as a connected line strip, oldest
//! segment first, and maps key presses to playback controls.

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as Segment, Points},
        Paragraph,
    },
};
use std::io::{stdout, Stdout};
use std::time::Duration;

use super::clock::ControlEvent;
use super::trail::{Decay, TrailPoint};
use crate::config::{DisplayConfig, MarkerKind};

const BACKGROUND: Color = Color::Rgb(0, 0, 0);

/// What the frame loop should do after polling input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackCommand {
    /// No key, or a key with no binding
    Continue,
    /// Leave the scope (q, Escape or Ctrl+C)
    Quit,
    /// Apply a control to the clock before the next frame
    Control(ControlEvent),
}

/// Maps one key event to a playback command.
///
/// Pause, axis swap and quit fire on the initial press only. Scrubbing also
/// fires on key repeat, so holding an arrow keeps seeking.
pub fn command_for_key(key: KeyEvent) -> PlaybackCommand {
    let repeat = match key.kind {
        KeyEventKind::Press => false,
        KeyEventKind::Repeat => true,
        KeyEventKind::Release => return PlaybackCommand::Continue,
    };
    let shift_held = key.modifiers.contains(KeyModifiers::SHIFT);

    match key.code {
        KeyCode::Left => PlaybackCommand::Control(ControlEvent::ScrubBackward { shift_held }),
        KeyCode::Right => PlaybackCommand::Control(ControlEvent::ScrubForward { shift_held }),
        _ if repeat => PlaybackCommand::Continue,
        KeyCode::Char('q') | KeyCode::Esc => PlaybackCommand::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            PlaybackCommand::Quit
        }
        KeyCode::Char(' ') => PlaybackCommand::Control(ControlEvent::TogglePause),
        KeyCode::Char('/') => PlaybackCommand::Control(ControlEvent::ToggleAxes),
        _ => PlaybackCommand::Continue,
    }
}

/// Scope colour faded towards the black background by `alpha`.
///
/// Returns `None` when the result would be invisible.
pub fn fade_color(color: [u8; 3], alpha: f32) -> Option<Color> {
    let alpha = alpha.clamp(0.0, 1.0);
    let [r, g, b] = color.map(|c| (c as f32 * alpha).round() as u8);
    if r == 0 && g == 0 && b == 0 {
        None
    } else {
        Some(Color::Rgb(r, g, b))
    }
}

/// Per-frame values shown in the status line.
#[derive(Debug, Clone)]
pub struct FrameStatus {
    pub paused: bool,
    pub axis_inverted: bool,
    pub frame_index: usize,
    pub total_frames: usize,
    pub position_secs: f64,
    pub duration_secs: f64,
    pub decay: Decay,
}

fn format_clock(secs: f64) -> String {
    let whole = secs.max(0.0) as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

fn status_line(status: &FrameStatus) -> Line<'static> {
    let indicator = if status.paused {
        Span::styled("⏸ ", Style::default().fg(Color::Yellow))
    } else {
        Span::styled("▶ ", Style::default().fg(Color::Green))
    };
    let percent = if status.total_frames > 0 {
        status.frame_index as f64 * 100.0 / status.total_frames as f64
    } else {
        0.0
    };
    let axes = if status.axis_inverted {
        "X=R Y=L"
    } else {
        "X=L Y=R"
    };

    Line::from(vec![
        indicator,
        Span::raw(format!(
            "{} / {}",
            format_clock(status.position_secs),
            format_clock(status.duration_secs)
        )),
        Span::raw(format!(
            " / frame {}/{} ({percent:.1}%)",
            status.frame_index, status.total_frames
        )),
        Span::raw(format!(" / {} / {axes}", status.decay)),
    ])
}

/// Largest area with a 2:1 cell ratio centred in `area`, so the plot is square
/// on a typical terminal font.
fn square_area(area: Rect) -> Rect {
    let height = area.height.min(area.width / 2);
    let width = height.saturating_mul(2);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn marker_symbol(kind: MarkerKind) -> Marker {
    match kind {
        MarkerKind::Braille => Marker::Braille,
        MarkerKind::Dot => Marker::Dot,
        MarkerKind::Block => Marker::Block,
        MarkerKind::HalfBlock => Marker::HalfBlock,
    }
}

/// Full-screen terminal scope.
pub struct ScopeTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    display: DisplayConfig,
    poll_interval: Duration,
}

impl ScopeTui {
    /// Enters raw mode and the alternate screen.
    ///
    /// `poll_interval` bounds how long [`ScopeTui::handle_input`] waits for a key.
    ///
    /// # Errors
    /// - If raw mode cannot be enabled
    /// - If the alternate screen cannot be entered
    pub fn new(display: DisplayConfig, poll_interval: Duration) -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(ScopeTui {
            terminal,
            display,
            poll_interval,
        })
    }

    /// Draws one frame: the trail plus the optional status line.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render(&mut self, trail: &[TrailPoint], status: &FrameStatus) -> anyhow::Result<()> {
        let gain = f64::from(self.display.gain);
        let color = self.display.color;
        let marker = marker_symbol(self.display.marker);
        let show_footer = self.display.show_footer;

        self.terminal.draw(|frame| {
            let area = frame.area();
            let footer_height = if show_footer { 1 } else { 0 };

            let content_area = Rect {
                height: area.height.saturating_sub(footer_height),
                ..area
            };
            frame.render_widget(
                ratatui::widgets::Block::default().style(Style::default().bg(BACKGROUND)),
                content_area,
            );

            let canvas = Canvas::default()
                .background_color(BACKGROUND)
                .marker(marker)
                .x_bounds([-1.0, 1.0])
                .y_bounds([-1.0, 1.0])
                .paint(|ctx| {
                    if let [point] = trail {
                        if let Some(color) = fade_color(color, point.alpha) {
                            ctx.draw(&Points {
                                coords: &[(gain * point.x as f64, gain * point.y as f64)],
                                color,
                            });
                        }
                        return;
                    }
                    for pair in trail.windows(2) {
                        let (from, to) = (pair[0], pair[1]);
                        let Some(color) = fade_color(color, to.alpha) else {
                            continue;
                        };
                        ctx.draw(&Segment::new(
                            gain * from.x as f64,
                            gain * from.y as f64,
                            gain * to.x as f64,
                            gain * to.y as f64,
                            color,
                        ));
                    }
                });
            frame.render_widget(canvas, square_area(content_area));

            if show_footer {
                let footer_area = Rect {
                    y: area.y + area.height.saturating_sub(footer_height),
                    height: footer_height,
                    ..area
                };
                let footer = Paragraph::new(status_line(status))
                    .style(Style::default().fg(Color::Rgb(185, 207, 212)).bg(BACKGROUND));
                frame.render_widget(footer, footer_area);
            }
        })?;

        Ok(())
    }

    /// Waits up to the poll interval for one input event.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_input(&mut self) -> anyhow::Result<PlaybackCommand> {
        if event::poll(self.poll_interval)? {
            if let Event::Key(key) = event::read()? {
                let command = command_for_key(key);
                if command != PlaybackCommand::Continue {
                    tracing::debug!("Key {:?}: {:?}", key.code, command);
                }
                return Ok(command);
            }
        }
        Ok(PlaybackCommand::Continue)
    }

    /// Leaves the alternate screen and restores the terminal.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    /// - If the cursor cannot be shown
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for ScopeTui {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(
            command_for_key(press(KeyCode::Char(' '), KeyModifiers::NONE)),
            PlaybackCommand::Control(ControlEvent::TogglePause)
        );
        assert_eq!(
            command_for_key(press(KeyCode::Char('/'), KeyModifiers::NONE)),
            PlaybackCommand::Control(ControlEvent::ToggleAxes)
        );
        assert_eq!(
            command_for_key(press(KeyCode::Left, KeyModifiers::SHIFT)),
            PlaybackCommand::Control(ControlEvent::ScrubBackward { shift_held: true })
        );
        assert_eq!(
            command_for_key(press(KeyCode::Right, KeyModifiers::NONE)),
            PlaybackCommand::Control(ControlEvent::ScrubForward { shift_held: false })
        );
        assert_eq!(
            command_for_key(press(KeyCode::Esc, KeyModifiers::NONE)),
            PlaybackCommand::Quit
        );
        assert_eq!(
            command_for_key(press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            PlaybackCommand::Quit
        );
        assert_eq!(
            command_for_key(press(KeyCode::Char('x'), KeyModifiers::NONE)),
            PlaybackCommand::Continue
        );
    }

    #[test]
    fn test_repeat_only_scrubs() {
        let repeat = |code| KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Repeat);
        assert_eq!(
            command_for_key(repeat(KeyCode::Right)),
            PlaybackCommand::Control(ControlEvent::ScrubForward { shift_held: false })
        );
        assert_eq!(command_for_key(repeat(KeyCode::Char(' '))), PlaybackCommand::Continue);
        assert_eq!(command_for_key(repeat(KeyCode::Char('q'))), PlaybackCommand::Continue);
    }

    #[test]
    fn test_release_is_ignored() {
        let release = KeyEvent::new_with_kind(KeyCode::Left, KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(command_for_key(release), PlaybackCommand::Continue);
    }

    #[test]
    fn test_fade_color() {
        assert_eq!(fade_color([0, 255, 51], 1.0), Some(Color::Rgb(0, 255, 51)));
        assert_eq!(fade_color([0, 255, 51], 0.5), Some(Color::Rgb(0, 128, 26)));
        assert_eq!(fade_color([0, 255, 51], 0.0), None);
        assert_eq!(fade_color([0, 255, 51], 0.001), None);
    }

    #[test]
    fn test_square_area_is_centred() {
        let area = square_area(Rect::new(0, 0, 100, 20));
        assert_eq!(area, Rect::new(30, 0, 40, 20));

        let narrow = square_area(Rect::new(0, 0, 20, 30));
        assert_eq!(narrow, Rect::new(0, 10, 20, 10));
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(75.9), "1:15");
    }
}
