//! Full-screen error display.
//!
//! Used when something fails after the terminal has been taken over, so the
//! message is readable instead of being lost behind the alternate screen.

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Paragraph, Wrap},
};
use std::io::{self, Stdout};

const ERROR_BACKGROUND: Color = Color::Rgb(255, 0, 0);

/// Red error screen with a centred title and message, dismissed by any key.
pub struct ErrorScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl ErrorScreen {
    /// Creates a new error screen and enters alternate screen mode.
    ///
    /// # Errors
    /// - If raw mode cannot be enabled
    /// - If the alternate screen cannot be entered
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(ErrorScreen { terminal })
    }

    /// Shows `title` and `message` until a key is pressed.
    ///
    /// The message wraps to 80% of the screen width.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn show_error(&mut self, title: &str, message: &str) -> anyhow::Result<()> {
        let text_style = Style::default().fg(Color::Rgb(255, 255, 255)).bg(ERROR_BACKGROUND);

        loop {
            self.terminal.draw(|frame| {
                let area = frame.area();
                frame.render_widget(
                    Block::default().style(Style::default().bg(ERROR_BACKGROUND)),
                    area,
                );

                let text = Text::from(vec![
                    Line::from(Span::styled(title, text_style.add_modifier(Modifier::BOLD))),
                    Line::default(),
                    Line::from(Span::styled(message, text_style)),
                    Line::default(),
                    Line::from(Span::styled("Press any key to exit", text_style)),
                ]);

                let paragraph = Paragraph::new(text)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true });

                let centered_area = Rect {
                    x: area.x + area.width / 10,
                    y: area.y + area.height / 3,
                    width: area.width * 8 / 10,
                    height: area.height - area.height / 3,
                };

                frame.render_widget(paragraph, centered_area);
            })?;

            if event::poll(std::time::Duration::from_millis(100))? {
                if let Event::Key(_) = event::read()? {
                    break;
                }
            }
        }

        Ok(())
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

impl Drop for ErrorScreen {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Shows an error screen and waits for a key. Failures to draw are logged and
/// otherwise ignored, since the original error is what the caller reports.
pub fn report_error(title: &str, message: &str) {
    let result = ErrorScreen::new().and_then(|mut screen| {
        screen.show_error(title, message)?;
        screen.cleanup()
    });
    if let Err(e) = result {
        tracing::warn!("Failed to show error screen: {}", e);
    }
}
