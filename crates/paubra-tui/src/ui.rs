use paubra_core::{ChatRole, Theme};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::App;

const TITLE: &str = "Paubra AI Assistant";
const PLACEHOLDER: &str = "Ask something...";
const RESET_PROMPT: &str =
    "Are you sure you want to refresh the chat? This will clear the current conversation.";

/// Colors for one theme.
struct Palette {
    bg: Color,
    fg: Color,
    muted: Color,
    accent: Color,
    user: Color,
    assistant: Color,
    bar_bg: Color,
    bar_fg: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                bg: Color::White,
                fg: Color::Black,
                muted: Color::DarkGray,
                accent: Color::Blue,
                user: Color::Blue,
                assistant: Color::Magenta,
                bar_bg: Color::Blue,
                bar_fg: Color::White,
            },
            Theme::Dark => Self {
                bg: Color::Black,
                fg: Color::White,
                muted: Color::Gray,
                accent: Color::Cyan,
                user: Color::Cyan,
                assistant: Color::Yellow,
                bar_bg: Color::DarkGray,
                bar_fg: Color::White,
            },
        }
    }
}

/// Parse a line of text and convert **bold** markdown to styled spans.
/// A leading `* ` or `- ` becomes a bullet.
fn parse_markdown_line(text: &str) -> Line<'static> {
    let trimmed = text.trim_start();
    let bullet = trimmed
        .strip_prefix("* ")
        .or_else(|| trimmed.strip_prefix("- "));
    let (prefix, body) = match bullet {
        Some(rest) => {
            let indent = text.len() - trimmed.len();
            (format!("{}• ", " ".repeat(indent)), rest)
        }
        None => (String::new(), text),
    };

    let mut spans: Vec<Span<'static>> = Vec::new();
    if !prefix.is_empty() {
        spans.push(Span::raw(prefix));
    }

    let mut rest = body;
    while let Some(open) = rest.find("**") {
        let after_open = &rest[open + 2..];
        match after_open.find("**") {
            Some(close) if close > 0 => {
                if open > 0 {
                    spans.push(Span::raw(rest[..open].to_string()));
                }
                spans.push(Span::styled(
                    after_open[..close].to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ));
                rest = &after_open[close + 2..];
            }
            // No closing **, treat as literal
            _ => break,
        }
    }
    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }

    Line::from(spans)
}

/// Wrap styled spans to `width` columns at word boundaries.
///
/// Runs of whitespace collapse to one space. A word longer than the width is split
/// across lines. Always returns at least one line.
fn wrap_spans(spans: &[Span<'static>], width: usize) -> Vec<Line<'static>> {
    let width = width.max(1);

    // Words made of styled pieces; pieces glued without whitespace share a word
    let mut words: Vec<Vec<(String, Style)>> = Vec::new();
    let mut joins_previous = false;
    for span in spans {
        let content: &str = &span.content;
        if content.is_empty() {
            continue;
        }
        let mut first = true;
        for word in content.split_whitespace() {
            let glue = first && joins_previous && !content.starts_with(char::is_whitespace);
            match words.last_mut() {
                Some(last) if glue => last.push((word.to_string(), span.style)),
                _ => words.push(vec![(word.to_string(), span.style)]),
            }
            first = false;
        }
        joins_previous = !content.ends_with(char::is_whitespace) && !first;
    }

    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut current_len = 0;

    for word in words {
        let word_len: usize = word.iter().map(|(text, _)| text.chars().count()).sum();

        if current_len > 0 && current_len + 1 + word_len <= width {
            // Word fits on current line
            current.push(Span::raw(" "));
            current_len += 1;
        } else if current_len > 0 {
            lines.push(Line::from(std::mem::take(&mut current)));
            current_len = 0;
        }

        if word_len <= width {
            for (text, style) in word {
                current.push(Span::styled(text, style));
            }
            current_len += word_len;
            continue;
        }

        // Longer than a whole line: split on characters
        for (text, style) in word {
            let mut chunk = String::new();
            for c in text.chars() {
                if current_len == width {
                    if !chunk.is_empty() {
                        current.push(Span::styled(std::mem::take(&mut chunk), style));
                    }
                    lines.push(Line::from(std::mem::take(&mut current)));
                    current_len = 0;
                }
                chunk.push(c);
                current_len += 1;
            }
            if !chunk.is_empty() {
                current.push(Span::styled(chunk, style));
            }
        }
    }

    // Don't forget the last line
    if !current.is_empty() || lines.is_empty() {
        lines.push(Line::from(current));
    }

    lines
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let palette = Palette::for_theme(app.theme());

    frame.render_widget(
        Block::default().style(Style::default().bg(palette.bg).fg(palette.fg)),
        area,
    );

    // Main layout: header, messages, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, &palette, frame, header_area);
    render_messages(app, &palette, frame, chat_area);
    render_input(app, &palette, frame, input_area);
    render_footer(app, &palette, frame, footer_area);

    if app.show_reset_confirm {
        render_reset_confirm(&palette, frame, area);
    }
}

fn render_header(app: &App, palette: &Palette, frame: &mut Frame, area: Rect) {
    let theme_icon = match app.theme() {
        Theme::Light => "☾ dark",
        Theme::Dark => "☀ light",
    };

    let title = Line::from(vec![
        Span::styled(" ◉ ", Style::default().fg(palette.bar_fg)),
        Span::styled(TITLE, Style::default().fg(palette.bar_fg).bold()),
        Span::raw("  "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(palette.bar_fg),
        ),
        Span::raw("  "),
        Span::styled(theme_icon, Style::default().fg(palette.bar_fg).italic()),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(palette.bar_bg));
    frame.render_widget(header, area);
}

fn render_messages(app: &mut App, palette: &Palette, frame: &mut Frame, area: Rect) {
    let width = area.width.saturating_sub(2) as usize;

    let user_label = Style::default().fg(palette.user).add_modifier(Modifier::BOLD);
    let assistant_label = Style::default().fg(palette.assistant).add_modifier(Modifier::BOLD);

    // Lines are wrapped here so the scroll range matches what is drawn
    let mut lines: Vec<Line> = Vec::new();
    for turn in app.session.turns() {
        match turn.role {
            ChatRole::User => {
                lines.push(Line::from(Span::styled("You", user_label)).alignment(Alignment::Right));
                for line in turn.text.lines() {
                    let wrapped = wrap_spans(&[Span::raw(line.to_string())], width);
                    lines.extend(wrapped.into_iter().map(|l| l.alignment(Alignment::Right)));
                }
            }
            ChatRole::Assistant => {
                lines.push(Line::from(Span::styled("Paubra", assistant_label)));
                for line in turn.text.lines() {
                    lines.extend(wrap_spans(&parse_markdown_line(line).spans, width));
                }
            }
        }
        lines.push(Line::default());
    }

    if app.is_sending() {
        lines.push(Line::from(Span::styled("Paubra", assistant_label)));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        let typing = Span::styled(
            format!("Paubra's Assistant is typing{}", dots),
            Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC),
        );
        lines.extend(wrap_spans(&[typing], width));
    }

    app.chat_area = Some(area);
    app.chat_height = area.height.saturating_sub(2);
    app.chat_total_lines = lines.len().min(u16::MAX as usize) as u16;
    if app.follow_tail {
        app.scroll_to_bottom();
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent));

    let chat = Paragraph::new(Text::from(lines))
        .block(block)
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, palette: &Palette, frame: &mut Frame, area: Rect) {
    let sending = app.is_sending();
    let border_color = if sending { palette.muted } else { palette.accent };
    let title = if sending { " Waiting for reply " } else { " Message " };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Keep the cursor visible with horizontal scrolling
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;
    let scroll_offset = if inner_width == 0 || cursor_pos < inner_width {
        0
    } else {
        cursor_pos - inner_width + 1
    };

    let content = if app.input.is_empty() {
        Span::styled(PLACEHOLDER, Style::default().fg(palette.muted))
    } else {
        let visible: String = app.input.chars().skip(scroll_offset).take(inner_width).collect();
        Span::styled(visible, Style::default().fg(palette.fg))
    };

    frame.render_widget(Paragraph::new(Line::from(content)).block(input_block), area);

    if !sending && !app.show_reset_confirm {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, palette: &Palette, frame: &mut Frame, area: Rect) {
    let key_style = Style::default().bg(palette.bar_bg).fg(palette.bar_fg);
    let label_style = Style::default().fg(palette.fg);

    let hints = if app.show_reset_confirm {
        vec![
            Span::styled(" y ", key_style),
            Span::styled(" refresh ", label_style),
            Span::styled(" n ", key_style),
            Span::styled(" cancel ", label_style),
        ]
    } else {
        vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" PgUp/PgDn ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" ^R ", key_style),
            Span::styled(" refresh ", label_style),
            Span::styled(" ^T ", key_style),
            Span::styled(" theme ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" quit ", label_style),
        ]
    };

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}

fn render_reset_confirm(palette: &Palette, frame: &mut Frame, area: Rect) {
    // Calculate popup size and position (centered)
    let popup_width = 50.min(area.width.saturating_sub(4));
    let popup_height = 7.min(area.height);
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent))
        .title(" Refresh chat ")
        .style(Style::default().bg(palette.bg).fg(palette.fg));

    let text = Text::from(vec![
        Line::from(RESET_PROMPT),
        Line::default(),
        Line::from(vec![
            Span::styled(" [y] Yes, Refresh ", Style::default().fg(palette.bar_fg).bg(palette.accent).bold()),
            Span::raw("  "),
            Span::styled(" [n] Cancel ", Style::default().fg(palette.muted)),
        ])
        .alignment(Alignment::Center),
    ]);

    let popup = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    frame.render_widget(popup, popup_area);
}
