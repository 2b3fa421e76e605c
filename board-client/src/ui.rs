// UI module - split into the theme and the post view renderer
pub mod theme;
mod post;

pub use self::render_main::render;

mod render_main {
    use ratatui::{
        layout::Alignment,
        style::{Modifier, Style},
        text::{Line, Span},
        widgets::{Block, Borders, Clear, Paragraph},
        Frame,
    };

    use super::post::render_post_view;
    use super::theme::{ThemeColors, DEFAULT_THEME};
    use crate::app::{App, Screen};

    /// Render the UI
    pub fn render(app: &App, frame: &mut Frame) {
        let area = frame.area();
        let theme = &DEFAULT_THEME;

        frame.render_widget(Clear, area);
        frame.render_widget(Block::default().style(Style::default().bg(theme.background)), area);

        const MIN_WIDTH: u16 = 40;
        const MIN_HEIGHT: u16 = 16;

        if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
            let warning = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Terminal Too Small",
                    Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("Minimum size: {}x{}", MIN_WIDTH, MIN_HEIGHT),
                    Style::default().fg(theme.text),
                )),
            ])
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(theme.error)));

            frame.render_widget(warning, area);
            return;
        }

        match (app.screen, app.view.as_ref()) {
            (Screen::PostView, Some(view)) => render_post_view(frame, area, app, view, theme),
            _ => render_board_placeholder(frame, theme),
        }
    }

    fn render_board_placeholder(frame: &mut Frame, theme: &ThemeColors) {
        let text = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("No post open", Style::default().fg(theme.text))),
            Line::from(Span::styled("q: quit", Style::default().fg(theme.text_dim))),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(theme.border)));
        frame.render_widget(text, frame.area());
    }
}
