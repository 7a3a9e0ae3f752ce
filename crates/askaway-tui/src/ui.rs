use chrono::{DateTime, Local};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use askaway_core::Exchange;

use crate::app::{App, InputMode};

const BOT_NAME: &str = "AskAway";

/// Wrap text to fit within a given width, breaking on word boundaries.
/// Words longer than the width are split so no line overflows.
fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: String = word.to_string();
        let mut word_len = word.chars().count();

        // Hard-split words that can never fit
        while word_len > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current_line));
                current_len = 0;
            }
            let head: String = word.chars().take(width).collect();
            word = word.chars().skip(width).collect();
            word_len -= width;
            lines.push(head);
        }

        if current_len == 0 {
            current_line = word;
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current_line.push(' ');
            current_line.push_str(&word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current_line));
            current_line = word;
            current_len = word_len;
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

fn format_time(timestamp: &str, pattern: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|t| t.with_timezone(&Local).format(pattern).to_string())
        .unwrap_or_default()
}

fn push_wrapped(lines: &mut Vec<Line<'static>>, text: &str, width: usize, style: Style) {
    for paragraph in text.lines() {
        for wrapped in wrap_text_to_width(paragraph, width) {
            lines.push(Line::from(Span::styled(wrapped, style)));
        }
    }
}

/// Lay out the session as pre-wrapped lines so the scroll math is exact
fn chat_lines(exchanges: &[Exchange], width: usize, animation_frame: u8) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    for exchange in exchanges {
        let time = format_time(&exchange.timestamp, "%H:%M");

        if exchange.is_user {
            lines.push(Line::from(vec![
                Span::styled("You", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                Span::styled(format!("  {}", time), Style::default().fg(Color::DarkGray)),
            ]));
            push_wrapped(&mut lines, &exchange.query, width, Style::default());
        } else if exchange.loading {
            lines.push(Line::from(Span::styled(
                BOT_NAME,
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        } else if exchange.error {
            lines.push(Line::from(Span::styled(
                BOT_NAME,
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )));
            push_wrapped(&mut lines, exchange.text(), width, Style::default().fg(Color::Red));
        } else {
            let mut header = vec![Span::styled(
                BOT_NAME,
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )];
            if !exchange.query.is_empty() {
                header.push(Span::styled(format!("  {}", time), Style::default().fg(Color::DarkGray)));
            }
            lines.push(Line::from(header));
            push_wrapped(&mut lines, exchange.text(), width, Style::default());

            if !exchange.sources.is_empty() {
                let sources = format!("Sources: {}", exchange.sources.join(", "));
                push_wrapped(&mut lines, &sources, width, Style::default().fg(Color::Magenta));
            }
        }

        lines.push(Line::default());
    }

    lines
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    if !app.session.has_started() {
        render_welcome(app, frame, body_area);
    } else {
        render_chat(app, frame, body_area);
    }

    render_footer(app, frame, footer_area);

    if app.show_history {
        render_history_drawer(app, frame, body_area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" AskAway ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(format!("[{}]", app.backend_label), Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(title), area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let text = if let Some(status) = &app.status {
        Line::from(Span::styled(format!(" {}", status), Style::default().fg(Color::Yellow)))
    } else {
        let hints = if app.show_history {
            " j/k: move | Enter: open | x: clear history | Esc: close"
        } else {
            match app.input_mode {
                InputMode::Editing => " Enter: send | Esc: stop typing | ↑/↓: scroll | Ctrl-C: quit",
                InputMode::Normal => " i: type | h: history | n: new chat | j/k: scroll | G: bottom | q: quit",
            }
        };
        Line::from(Span::styled(hints, Style::default().fg(Color::DarkGray)))
    };

    frame.render_widget(Paragraph::new(text), area);
}

fn render_welcome(app: &mut App, frame: &mut Frame, area: Rect) {
    let [_, title_area, input_row, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(4),
        Constraint::Length(3),
        Constraint::Fill(1),
    ])
    .areas(area);

    // A greeting, when the session opened with one, replaces the prompt line
    let subtitle = app
        .exchanges()
        .first()
        .filter(|e| e.is_bot_reply())
        .map(|e| e.text().to_string())
        .unwrap_or_else(|| "What do you want to know?".to_string());

    let title = Text::from(vec![
        Line::from(Span::styled("AskAway", Style::default().fg(Color::Cyan).bold())).centered(),
        Line::from(Span::styled(subtitle, Style::default().fg(Color::DarkGray))).centered(),
    ]);
    frame.render_widget(Paragraph::new(title).wrap(Wrap { trim: true }), title_area);

    let width = 60.min(area.width.saturating_sub(4));
    let input_area = Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        input_row.y,
        width,
        input_row.height,
    );
    render_input(app, frame, input_area, "What do you want to know?");
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let inner = chat_block.inner(chat_area);
    let lines = chat_lines(app.exchanges(), inner.width as usize, app.animation_frame);
    let total_lines = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    app.clamp_scroll(total_lines, inner.height);

    let chat = Paragraph::new(Text::from(lines))
        .block(chat_block)
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, chat_area);

    render_input(app, frame, input_area, "Ask a question about the documents...");
}

fn render_input(app: &App, frame: &mut Frame, area: Rect, placeholder: &str) {
    let editing = app.input_mode == InputMode::Editing && !app.show_history;
    let border_color = if app.is_waiting() {
        Color::DarkGray
    } else if editing {
        Color::Yellow
    } else {
        Color::Blue
    };

    let title = if app.is_waiting() { " Waiting for reply... " } else { " Ask " };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scrolling keeps the cursor visible
    let inner_width = area.width.saturating_sub(2) as usize;
    let scroll_offset = if inner_width > 0 && app.cursor >= inner_width {
        app.cursor - inner_width + 1
    } else {
        0
    };

    let input = if app.input.is_empty() && !editing {
        Paragraph::new(Span::styled(placeholder.to_string(), Style::default().fg(Color::DarkGray)))
    } else {
        let visible_text: String = app.input.chars().skip(scroll_offset).take(inner_width).collect();
        Paragraph::new(visible_text).style(Style::default().fg(Color::Cyan))
    };

    frame.render_widget(input.block(block), area);

    if editing {
        let cursor_x = (app.cursor - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_history_drawer(app: &mut App, frame: &mut Frame, area: Rect) {
    let width = (area.width * 2 / 5).max(30).min(area.width);
    let drawer_area = Rect::new(area.x, area.y, width, area.height);

    // Clear the area behind the drawer
    frame.render_widget(Clear, drawer_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" History ");

    if app.session.history().is_empty() {
        let empty = Paragraph::new(Span::styled("No history yet", Style::default().fg(Color::DarkGray)))
            .block(block);
        frame.render_widget(empty, drawer_area);
        return;
    }

    let text_width = (width as usize).saturating_sub(4);
    let items: Vec<ListItem> = app
        .session
        .history()
        .iter()
        .map(|entry| {
            let query: String = entry.query.chars().take(text_width).collect();
            ListItem::new(vec![
                Line::from(query),
                Line::from(Span::styled(
                    format_time(&entry.timestamp, "%b %d %H:%M"),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, drawer_area, &mut app.history_state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use askaway_core::FALLBACK_REPLY;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_wrap_respects_width() {
        let lines = wrap_text_to_width("the quick brown fox jumps over", 10);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps over"]);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let lines = wrap_text_to_width("a https://example.com/very/long/path", 10);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
        assert_eq!(lines[0], "a");
        assert_eq!(lines.concat(), "ahttps://example.com/very/long/path");
    }

    #[test]
    fn test_wrap_empty_is_one_line() {
        assert_eq!(wrap_text_to_width("", 10), vec![String::new()]);
    }

    #[test]
    fn test_chat_lines_show_sources_and_errors() {
        let exchanges = vec![
            Exchange::user("question"),
            Exchange::bot("question", "answer", vec!["doc1.pdf".to_string(), "example.com".to_string()]),
            Exchange::user("again"),
            Exchange::failed("again"),
        ];
        let texts: Vec<String> = chat_lines(&exchanges, 80, 0).iter().map(line_text).collect();

        assert!(texts.iter().any(|t| t == "Sources: doc1.pdf, example.com"));
        assert!(texts.iter().any(|t| t == FALLBACK_REPLY));
        assert_eq!(texts.iter().filter(|t| t.starts_with("You")).count(), 2);
    }

    #[test]
    fn test_chat_lines_loading_animation() {
        let exchanges = vec![Exchange::user("q"), Exchange::loading("q")];
        let texts: Vec<String> = chat_lines(&exchanges, 80, 2).iter().map(line_text).collect();
        assert!(texts.iter().any(|t| t == "Thinking..."));
    }
}
