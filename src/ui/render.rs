//! Render functions for the TUI.
//!
//! One draw pass flattens the [`FeedView`](super::model::FeedView) into
//! rows and paints banners, the post/comment list, and the status bar.
//! Layout is deliberately plain; the interesting state lives in the model.

use chrono::Utc;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use super::model::Row;
use crate::api::{FeedType, Item};
use crate::app::App;
use crate::util::{clean_html, truncate_to_width};

pub(super) fn render(f: &mut Frame, app: &mut App) {
    let live = app.view.live_count();
    let error = app.view.error_message();

    let mut constraints = Vec::new();
    if live.is_some() {
        constraints.push(Constraint::Length(1));
    }
    if error.is_some() {
        constraints.push(Constraint::Length(1));
    }
    if app.search_mode {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Min(1));
    constraints.push(Constraint::Length(1));

    let areas = Layout::vertical(constraints).split(f.area());
    let mut next = 0;

    if let Some(count) = live {
        let noun = if count == 1 { "post" } else { "posts" };
        let banner = Paragraph::new(format!(" {count} new {noun} available. Press u to refresh."))
            .style(Style::default().fg(Color::Black).bg(Color::Yellow));
        f.render_widget(banner, areas[next]);
        next += 1;
    }

    if let Some(message) = error {
        let banner = Paragraph::new(format!(" {message}"))
            .style(Style::default().fg(Color::White).bg(Color::Red));
        f.render_widget(banner, areas[next]);
        next += 1;
    }

    if app.search_mode {
        let input = Paragraph::new(format!(" Search: {}▌", app.search_input))
            .style(Style::default().add_modifier(Modifier::BOLD));
        f.render_widget(input, areas[next]);
        next += 1;
    }

    render_list(f, app, areas[next]);
    render_status_bar(f, app, areas[next + 1]);
}

fn render_list(f: &mut Frame, app: &mut App, area: Rect) {
    let width = area.width.saturating_sub(2) as usize;
    let now = Utc::now().timestamp();
    let rows = app.view.rows();

    if rows.is_empty() {
        let hint = if app.view.search_active() {
            "No results."
        } else {
            "Loading..."
        };
        f.render_widget(
            Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
            area,
        );
        return;
    }

    app.selected = app.selected.min(rows.len() - 1);

    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| row_to_item(row, width, now))
        .collect();
    let list = List::new(items)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("");

    let mut state = ListState::default();
    state.select(Some(app.selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn row_to_item<'a>(row: &Row, width: usize, now: i64) -> ListItem<'a> {
    match row {
        Row::Post(item) => post_item(item, width, now),
        Row::PollOption(option) => {
            let text = option.text.as_deref().map(clean_html).unwrap_or_default();
            let score = option.score.unwrap_or(0);
            let line = truncate_to_width(&format!("    ◦ {text} ({score})"), width);
            ListItem::new(Line::from(line))
        }
        Row::Comment { depth, item } => comment_item(item, *depth, width, now),
        Row::Hit(hit) => {
            let title = hit.title.as_deref().unwrap_or("(untitled)");
            let header = Line::from(Span::styled(
                truncate_to_width(&format!("● {title}"), width),
                Style::default().add_modifier(Modifier::BOLD),
            ));
            let meta = Line::from(Span::styled(
                format!("  {}", format_age(now, hit.created_at)),
                Style::default().fg(Color::DarkGray),
            ));
            ListItem::new(vec![header, meta])
        }
        Row::Notice(text) => ListItem::new(Line::from(Span::styled(
            format!("  {text}"),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ))),
    }
}

fn post_item<'a>(item: &Item, width: usize, now: i64) -> ListItem<'a> {
    let title = item.title.as_deref().unwrap_or("(untitled)");
    let header = Line::from(Span::styled(
        truncate_to_width(&format!("● {title}"), width),
        Style::default().add_modifier(Modifier::BOLD),
    ));

    let mut meta = String::from("  ");
    if let Some(score) = item.score {
        meta.push_str(&format!("{score} points "));
    }
    if let Some(by) = &item.by {
        meta.push_str(&format!("by {by} "));
    }
    meta.push_str(&format!("· {}", format_age(now, item.time)));
    if let Some(descendants) = item.descendants {
        meta.push_str(&format!(" · {descendants} comments"));
    }
    let meta = Line::from(Span::styled(
        truncate_to_width(&meta, width),
        Style::default().fg(Color::DarkGray),
    ));

    ListItem::new(vec![header, meta])
}

fn comment_item<'a>(item: &Item, depth: usize, width: usize, now: i64) -> ListItem<'a> {
    let indent = "  ".repeat(depth + 1);
    let by = item.by.as_deref().unwrap_or("[unknown]");
    let reply_hint = match item.kids.as_deref() {
        Some(kids) if !kids.is_empty() => format!(" [{} replies]", kids.len()),
        _ => String::new(),
    };
    let header = Line::from(Span::styled(
        truncate_to_width(
            &format!("{indent}{by} · {}{reply_hint}", format_age(now, item.time)),
            width,
        ),
        Style::default().fg(Color::Cyan),
    ));

    let text = item.text.as_deref().map(clean_html).unwrap_or_default();
    let first_line = text.lines().next().unwrap_or("");
    let body = Line::from(truncate_to_width(
        &format!("{indent}{first_line}"),
        width,
    ));

    ListItem::new(vec![header, body])
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = Vec::new();
    for feed in [FeedType::Stories, FeedType::Jobs, FeedType::Polls] {
        let style = if feed == app.feed && !app.view.search_active() {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {feed} "), style));
    }
    if app.view.search_active() {
        spans.push(Span::styled(
            " search ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
    }

    spans.push(Span::raw("  "));
    let right = match app.status() {
        Some(message) => message.to_string(),
        None => "q quit · / search · ⏎ comments · m more · o open".to_string(),
    };
    spans.push(Span::styled(right, Style::default().fg(Color::DarkGray)));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Compact relative age, newest-reader style.
fn format_age(now: i64, time: i64) -> String {
    let delta = (now - time).max(0);
    if delta < 60 {
        "just now".to_string()
    } else if delta < 3600 {
        format!("{}m ago", delta / 60)
    } else if delta < 86_400 {
        format!("{}h ago", delta / 3600)
    } else {
        format!("{}d ago", delta / 86_400)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_age_buckets() {
        assert_eq!(format_age(1000, 990), "just now");
        assert_eq!(format_age(1000, 1000 - 120), "2m ago");
        assert_eq!(format_age(100_000, 100_000 - 7200), "2h ago");
        assert_eq!(format_age(1_000_000, 1_000_000 - 172_800), "2d ago");
    }

    #[test]
    fn test_format_age_future_clock_skew() {
        assert_eq!(format_age(100, 200), "just now");
    }
}
