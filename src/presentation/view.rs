use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::field::FieldView;
use crate::overlay::{OverlayRequest, TriggerKind};

use super::field::{FieldTriggers, field_height, render_field};
use super::layout::popup_rect;
use super::popout::render_popout;

/// Everything one frame of a form needs.
pub struct FormFrame<'a> {
    pub title: &'a str,
    pub views: &'a [FieldView],
    pub focused: usize,
    pub status: &'a str,
    pub help: Option<&'a str>,
    /// Popout of the focused field to draw on top.
    pub popout: Option<&'a OverlayRequest>,
}

pub fn draw(frame: &mut Frame<'_>, ctx: FormFrame<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(frame.area());

    let triggers = render_form(frame, chunks[0], ctx.title, ctx.views, ctx.focused);
    render_footer(frame, chunks[1], ctx.status, ctx.help);

    if let Some(request) = ctx.popout {
        let anchor = triggers.get(ctx.focused).and_then(|triggers| match request.trigger {
            TriggerKind::Help => triggers.help,
            TriggerKind::Error => triggers.error,
        });
        let bounds = frame.area();
        let anchor = anchor.unwrap_or_else(|| popup_rect(bounds, 1, 1));
        render_popout(frame, bounds, anchor, request);
    }
}

/// Stack the fields top to bottom inside a bordered block. Returns the
/// trigger cells of every view, index-aligned with `views`.
pub fn render_form(
    frame: &mut Frame<'_>,
    area: Rect,
    title: &str,
    views: &[FieldView],
    focused: usize,
) -> Vec<FieldTriggers> {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut triggers = Vec::with_capacity(views.len());
    let mut y = inner.y;
    for (index, view) in views.iter().enumerate() {
        let height = field_height(view, inner.width);
        let remaining = inner.bottom().saturating_sub(y);
        if height == 0 || remaining == 0 {
            triggers.push(FieldTriggers::default());
            continue;
        }
        let field_area = Rect::new(inner.x, y, inner.width, height.min(remaining));
        triggers.push(render_field(frame, field_area, view, index == focused));
        y = y.saturating_add(height);
    }
    triggers
}

fn render_footer(frame: &mut Frame<'_>, area: Rect, status: &str, help: Option<&str>) {
    let mut spans = vec![Span::styled(status.to_string(), Style::default().fg(Color::Green))];
    if let Some(help) = help {
        spans.push(Span::styled(
            format!("  {help}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    let footer = Paragraph::new(Line::from(spans))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}
