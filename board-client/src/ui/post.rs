use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use board_types::display_date;

use super::theme::ThemeColors;
use crate::app::{App, InputMode};
use crate::notify::NoticeLevel;
use crate::post_view::{LoadState, PostView};

/// Render one open post: header, body, likes, images, comments, input
pub fn render_post_view(frame: &mut Frame, area: Rect, app: &App, view: &PostView, theme: &ThemeColors) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(6),    // Post
            Constraint::Min(5),    // Comments
            Constraint::Length(3), // Comment input
            Constraint::Length(1), // Notices / key hints
        ])
        .split(area);

    match view.store.load_state() {
        LoadState::Loading if view.store.post().is_none() => {
            render_placeholder(frame, chunks[0], "Loading post...", theme.text_dim, theme);
        }
        LoadState::Failed(message) => {
            render_placeholder(frame, chunks[0], message, theme.error, theme);
        }
        _ => render_post(frame, chunks[0], view, theme),
    }

    render_comments(frame, chunks[1], view, theme);
    render_input(frame, chunks[2], app, view, theme);
    render_footer(frame, chunks[3], app, theme);
}

fn render_placeholder(frame: &mut Frame, area: Rect, text: &str, color: ratatui::style::Color, theme: &ThemeColors) {
    let paragraph = Paragraph::new(Line::from(Span::styled(text.to_string(), Style::default().fg(color))))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(theme.border)));
    frame.render_widget(paragraph, area);
}

fn render_post(frame: &mut Frame, area: Rect, view: &PostView, theme: &ThemeColors) {
    let Some(post) = view.store.post() else {
        return;
    };

    let author = post.author.as_deref().unwrap_or("anonymous");
    let date = display_date(&post.created_at).unwrap_or_default();

    let mut lines = vec![
        Line::from(Span::styled(
            format!("{} • {}", author, date),
            Style::default().fg(theme.text_dim),
        )),
        Line::from(""),
    ];
    for line in post.content.lines() {
        lines.push(Line::from(Span::styled(line.to_string(), Style::default().fg(theme.text))));
    }

    let images: Vec<&str> = view.store.images().ordered(&post.image_ids).collect();
    if !post.image_ids.is_empty() {
        lines.push(Line::from(""));
        if images.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("[{} image(s) unavailable]", post.image_ids.len()),
                Style::default().fg(theme.text_dim),
            )));
        }
        for url in images {
            lines.push(Line::from(Span::styled(
                format!("[image] {}", url),
                Style::default().fg(theme.accent),
            )));
        }
    }

    lines.push(Line::from(""));
    lines.push(like_line(view, theme));

    let title = Span::styled(
        format!(" {} ", post.title),
        Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
    );
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(title).border_style(Style::default().fg(theme.border)));
    frame.render_widget(paragraph, area);
}

/// Like control: the count stays as confirmed while a request is pending
fn like_line(view: &PostView, theme: &ThemeColors) -> Line<'static> {
    let Some(post) = view.store.post() else {
        return Line::from("");
    };
    let (icon, color) = if post.is_liked {
        ("♥", theme.accent)
    } else {
        ("♡", theme.text_dim)
    };
    let mut spans = vec![Span::styled(format!("{} {}", icon, post.likes), Style::default().fg(color))];
    if view.like.is_in_flight() {
        spans.push(Span::styled(" ...", Style::default().fg(theme.warning)));
    }
    Line::from(spans)
}

fn render_comments(frame: &mut Frame, area: Rect, view: &PostView, theme: &ThemeColors) {
    let items: Vec<ListItem> = view
        .store
        .comments()
        .iter()
        .map(|comment| {
            let author = comment.author.as_deref().unwrap_or("anonymous");
            let mut header = vec![Span::styled(
                author.to_string(),
                Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
            )];
            if let Some(date) = display_date(&comment.created_at) {
                header.push(Span::styled(format!(" • {}", date), Style::default().fg(theme.text_dim)));
            }
            if view.editor.is_deleting(&comment.id) {
                header.push(Span::styled(" (deleting)", Style::default().fg(theme.warning)));
            }
            ListItem::new(vec![
                Line::from(header),
                Line::from(Span::styled(format!("  {}", comment.content), Style::default().fg(theme.text))),
            ])
        })
        .collect();

    let title = format!(" Comments ({}) ", view.store.comments().len());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title).border_style(Style::default().fg(theme.border)))
        .highlight_style(Style::default().bg(theme.highlight_bg));

    let mut state = ListState::default();
    state.select(view.selected_comment);
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_input(frame: &mut Frame, area: Rect, app: &App, view: &PostView, theme: &ThemeColors) {
    let typing = app.input_mode == InputMode::Typing;
    let limits = view.editor.limits();
    let count = view.editor.input().chars().count();

    let title = if view.editor.is_submitting() {
        " Posting... ".to_string()
    } else {
        format!(" Comment {}/{} ", count, limits.max_length)
    };
    let count_color = if limits.check("content", view.editor.input()).is_ok() {
        theme.success
    } else {
        theme.text_dim
    };
    let border = if typing { theme.primary } else { theme.border };

    let paragraph = Paragraph::new(view.editor.input().to_string())
        .style(Style::default().fg(theme.text))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(title, Style::default().fg(count_color)))
                .border_style(Style::default().fg(border)),
        );
    frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App, theme: &ThemeColors) {
    let line = match app.notifications.latest() {
        Some(notice) => {
            let color = match notice.level {
                NoticeLevel::Info => theme.success,
                NoticeLevel::Error => theme.error,
            };
            Line::from(Span::styled(notice.text.clone(), Style::default().fg(color)))
        }
        None if app.input_mode == InputMode::Typing => Line::from(Span::styled(
            "Enter: post | Esc: stop typing",
            Style::default().fg(theme.text_dim),
        )),
        None => Line::from(Span::styled(
            "l: like | i: comment | d: delete comment | x: delete post | s: share | r: refresh | q: close",
            Style::default().fg(theme.text_dim),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Instant;

    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use crate::app::tests::FakeApi;
    use crate::app::App;
    use crate::config::ClientConfig;
    use crate::post_view::fixtures::detail;
    use crate::share::BrowserShare;

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| crate::ui::render(app, frame)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    fn app() -> App {
        App::new(
            Arc::new(FakeApi::default()),
            ClientConfig::default(),
            Box::new(BrowserShare::new("https://share.test")),
        )
    }

    #[test]
    fn test_renders_loaded_post_and_comments() {
        let mut app = app();
        app.view = Some(crate::post_view::PostView::new("7", &app.config));
        app.screen = crate::app::Screen::PostView;
        let view = app.view.as_mut().unwrap();
        let ticket = view.store.begin_load();
        view.store.finish_load(ticket, Ok(detail("7", true, 12, &[])));

        let text = screen_text(&app);
        assert!(text.contains("Weekend meetup"));
        assert!(text.contains("hong • 2024-05-01"));
        assert!(text.contains("♥ 12"));
        assert!(text.contains("Comments (3)"));
        assert!(text.contains("I am in!"));
    }

    #[test]
    fn test_renders_loading_then_failure() {
        let mut app = app();
        app.view = Some(crate::post_view::PostView::new("7", &app.config));
        app.screen = crate::app::Screen::PostView;
        assert!(screen_text(&app).contains("Loading post..."));

        let view = app.view.as_mut().unwrap();
        let ticket = view.store.begin_load();
        view.store
            .finish_load(ticket, Err(crate::api::ApiError::from_status(404, Some("Post not found".into()))));
        app.notifications.error("Post not found", Instant::now());

        let text = screen_text(&app);
        assert!(text.contains("Post not found"));
        assert!(!text.contains("Weekend meetup"));
    }

    #[test]
    fn test_small_terminal_warning() {
        let app = app();
        let mut terminal = Terminal::new(TestBackend::new(20, 5)).unwrap();
        terminal.draw(|frame| crate::ui::render(&app, frame)).unwrap();
        let text: String = terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Terminal"));
    }
}
