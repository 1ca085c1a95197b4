use anyhow::anyhow;
use chores_core::config::Config;
use chores_core::filter::Filter;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::{App, Focus, GhostRow, InputState};

/// Styling knobs. With `color = off` in the config, every style falls back
/// to plain modifiers.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    color: bool,
}

impl Theme {
    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self { color })
    }

    fn fg(&self, color: Color) -> Style {
        if self.color {
            Style::default().fg(color)
        } else {
            Style::default()
        }
    }

    fn dim(&self) -> Style {
        if self.color {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        }
    }

    fn active_tab(&self) -> Style {
        if self.color {
            Style::default()
                .fg(Color::White)
                .bg(Color::Magenta)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        }
    }

    fn highlight(&self) -> Style {
        if self.color {
            Style::default()
                .bg(Color::Indexed(236))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::REVERSED)
        }
    }
}

pub fn draw(frame: &mut Frame, app: &mut App, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title + count
            Constraint::Length(3), // add input
            Constraint::Length(1), // filter tabs
            Constraint::Min(3),    // task list
            Constraint::Length(1), // status line
            Constraint::Length(1), // key hints
        ])
        .split(frame.area());

    draw_header(frame, app, theme, chunks[0]);
    draw_add_input(frame, app, theme, chunks[1]);
    draw_tabs(frame, app, theme, chunks[2]);
    draw_list(frame, app, theme, chunks[3]);
    draw_status(frame, app, theme, chunks[4]);
    draw_hints(frame, app, theme, chunks[5]);

    if app.edit.is_some() {
        draw_edit_dialog(frame, app, theme);
    }
}

fn draw_header(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            " chores ",
            theme.fg(Color::Magenta).add_modifier(Modifier::BOLD),
        ),
        Span::styled(app.view.count_line(), theme.dim()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_add_input(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let shaking = app.shake_until.is_some() && app.edit.is_none();

    let (border_style, title) = if shaking {
        (theme.fg(Color::Red), " Task text is required ")
    } else if app.focus == Focus::Input && app.edit.is_none() {
        (theme.fg(Color::Magenta), " New task ")
    } else {
        (theme.dim(), " New task ")
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);
    let inner_width = area.width.saturating_sub(2) as usize;
    let show_cursor = app.focus == Focus::Input && app.edit.is_none();
    let line = input_line(&app.input, inner_width, show_cursor, theme);

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_tabs(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let mut spans: Vec<Span> = vec![Span::raw(" ")];
    for (idx, filter) in Filter::TABS.iter().enumerate() {
        let style = if *filter == app.filter {
            theme.active_tab()
        } else {
            theme.dim()
        };
        spans.push(Span::styled(
            format!(" {} {} ", idx + 1, filter.label()),
            style,
        ));
        spans.push(Span::raw(" "));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_list(frame: &mut Frame, app: &mut App, theme: &Theme, area: Rect) {
    let title = format!(" {} ", app.view.filter.label());

    if app.view.is_empty() && app.ghost.is_none() {
        let placeholder = Paragraph::new("No tasks here yet.")
            .style(theme.dim())
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(placeholder, area);
        return;
    }

    let mut items: Vec<ListItem> = app
        .view
        .rows
        .iter()
        .map(|row| {
            let checkbox = if row.completed { "[x] " } else { "[ ] " };
            let text_style = if row.completed {
                theme.dim().add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };

            ListItem::new(Line::from(vec![
                Span::styled(checkbox, theme.fg(Color::Magenta)),
                Span::styled(row.text.clone(), text_style),
                Span::styled(format!("  {}", row.created_label), theme.dim()),
            ]))
        })
        .collect();

    let list_block = Block::default().borders(Borders::ALL).title(title);

    if let Some(ghost) = app.ghost.clone() {
        let index = ghost.index.min(items.len());
        items.insert(index, ghost_item(&ghost, theme));

        // The ghost shifts later rows down by one; keep the highlight on the
        // row the user actually has selected.
        let mut display_state = app.list_state.clone();
        if let Some(selected) = display_state.selected()
            && index <= selected
        {
            display_state.select(Some(selected + 1));
        }

        let list = List::new(items)
            .block(list_block)
            .highlight_style(theme.highlight())
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, area, &mut display_state);
        return;
    }

    let list = List::new(items)
        .block(list_block)
        .highlight_style(theme.highlight())
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn ghost_item<'a>(ghost: &GhostRow, theme: &Theme) -> ListItem<'a> {
    ListItem::new(Line::from(vec![Span::styled(
        format!("    {}", ghost.row.text),
        theme.dim().add_modifier(Modifier::CROSSED_OUT | Modifier::DIM),
    )]))
}

fn draw_status(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let Some(status) = app.status.as_ref() else {
        return;
    };

    let style = if status.is_error {
        theme.fg(Color::Red)
    } else {
        theme.dim()
    };
    frame.render_widget(
        Paragraph::new(Span::styled(format!(" {}", status.text), style)),
        area,
    );
}

fn draw_hints(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let hint = if app.edit.is_some() {
        " Enter save · Esc cancel"
    } else if app.focus == Focus::Input {
        " Enter add · Tab list · Ctrl-C quit"
    } else {
        " Space toggle · e edit · d delete · 1/2/3 filter · Tab cycle · a add · q quit"
    };
    frame.render_widget(Paragraph::new(Span::styled(hint, theme.dim())), area);
}

fn draw_edit_dialog(frame: &mut Frame, app: &App, theme: &Theme) {
    let Some(dialog) = app.edit.as_ref() else {
        return;
    };

    let area = centered_rect(60, 3, frame.area());
    frame.render_widget(Clear, area);

    let shaking = app.shake_until.is_some();
    let (border_style, title) = if shaking {
        (theme.fg(Color::Red), " Task text is required ")
    } else {
        (theme.fg(Color::Magenta), " Edit task ")
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);
    let inner_width = area.width.saturating_sub(2) as usize;
    let line = input_line(&dialog.input, inner_width, true, theme);

    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// One-line input rendering with a block cursor and horizontal scrolling so
/// the cursor stays visible in a narrow field.
fn input_line<'a>(
    input: &'a InputState,
    width: usize,
    show_cursor: bool,
    theme: &Theme,
) -> Line<'a> {
    let (shown, cursor) = visible_window(&input.text, input.cursor, width.max(1));

    if !show_cursor {
        return Line::from(Span::raw(shown));
    }

    let before = &shown[..cursor];
    let mut rest = shown[cursor..].chars();
    let under = rest.next();
    let after: String = rest.collect();

    let cursor_style = theme.fg(Color::Magenta).add_modifier(Modifier::REVERSED);
    Line::from(vec![
        Span::raw(before),
        Span::styled(under.map_or(" ".to_string(), String::from), cursor_style),
        Span::raw(after),
    ])
}

/// Drop leading characters until the cursor fits inside `width` cells.
/// Returns the visible tail and the cursor's byte offset within it.
fn visible_window(text: &str, cursor: usize, width: usize) -> (&str, usize) {
    let mut start = 0;
    let mut lead = UnicodeWidthStr::width(&text[..cursor]);

    let mut chars = text.char_indices();
    while lead >= width {
        let Some((idx, ch)) = chars.next() else {
            break;
        };
        start = idx + ch.len_utf8();
        lead = lead.saturating_sub(UnicodeWidthChar::width(ch).unwrap_or(0));
    }

    (&text[start..], cursor - start)
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect {
        x,
        y,
        width,
        height: height.min(area.height),
    }
}

#[cfg(test)]
mod tests {
    use super::visible_window;

    #[test]
    fn window_keeps_short_text_intact() {
        let (shown, cursor) = visible_window("milk", 2, 20);
        assert_eq!(shown, "milk");
        assert_eq!(cursor, 2);
    }

    #[test]
    fn window_scrolls_to_keep_cursor_visible() {
        let text = "a long shopping errand";
        let (shown, cursor) = visible_window(text, text.len(), 8);
        assert!(shown.len() < text.len());
        assert_eq!(cursor, shown.len());
        assert!(text.ends_with(shown));
    }

    #[test]
    fn window_never_drops_past_the_cursor() {
        let (shown, cursor) = visible_window("abcdef", 3, 1);
        assert_eq!(cursor, 0);
        assert!(shown.starts_with("def"));
    }
}
