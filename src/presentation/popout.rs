use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use textwrap::wrap;
use unicode_width::UnicodeWidthStr;

use crate::overlay::{OverlayRequest, PanelContent};

use super::layout::anchored_rect;

const MAX_WIDTH: u16 = 48;

pub fn popout_title(request: &OverlayRequest) -> &'static str {
    match request.panel {
        PanelContent::Tooltip(_) => "Help",
        PanelContent::Errors(_) => "Errors",
    }
}

/// Panel body: the tooltip text, or one bullet per error.
pub fn popout_lines(request: &OverlayRequest, max_width: u16) -> Vec<Line<'static>> {
    let width = max_width.max(8) as usize;
    match &request.panel {
        PanelContent::Tooltip(tooltip) => wrap(tooltip.text(), width)
            .into_iter()
            .map(|line| Line::from(line.into_owned()))
            .collect(),
        PanelContent::Errors(errors) => {
            let messages = errors.messages();
            if messages.is_empty() {
                return vec![Line::from(Span::styled(
                    "No errors",
                    Style::default().fg(Color::DarkGray),
                ))];
            }
            let style = Style::default().fg(Color::Red);
            let mut lines = Vec::new();
            for message in messages {
                for (index, segment) in wrap(&message, width.saturating_sub(2).max(4))
                    .into_iter()
                    .enumerate()
                {
                    let bullet = if index == 0 { "• " } else { "  " };
                    lines.push(Line::from(vec![
                        Span::styled(bullet, style.add_modifier(Modifier::BOLD)),
                        Span::styled(segment.into_owned(), style),
                    ]));
                }
            }
            lines
        }
    }
}

/// Draw the panel of `request` next to `trigger`, kept within `bounds`.
pub fn render_popout(frame: &mut Frame<'_>, bounds: Rect, trigger: Rect, request: &OverlayRequest) -> Rect {
    let text_width = MAX_WIDTH.min(bounds.width).saturating_sub(4);
    let lines = popout_lines(request, text_width);
    let content_width = lines
        .iter()
        .map(|line| {
            line.spans
                .iter()
                .map(|span| UnicodeWidthStr::width(span.content.as_ref()))
                .sum::<usize>()
        })
        .max()
        .unwrap_or(0) as u16;
    let title = popout_title(request);
    let width = content_width.max(title.len() as u16).saturating_add(4);
    let height = (lines.len() as u16).saturating_add(2);
    let area = anchored_rect(bounds, trigger, request.flow, width, height);

    frame.render_widget(Clear, area);
    let border = match request.panel {
        PanelContent::Tooltip(_) => Style::default().fg(Color::Blue),
        PanelContent::Errors(_) => Style::default().fg(Color::Red),
    };
    let panel = Paragraph::new(lines).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border),
    );
    frame.render_widget(panel, area);
    area
}
