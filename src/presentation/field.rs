use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use textwrap::wrap;
use unicode_width::UnicodeWidthStr;

use crate::field::FieldView;

pub const HELP_GLYPH: &str = "?";
pub const ERROR_GLYPH: &str = "!";

/// Screen cells of the help and error glyphs, used to anchor popouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldTriggers {
    pub help: Option<Rect>,
    pub error: Option<Rect>,
}

fn label_text(view: &FieldView) -> String {
    let mut label = view.label.clone();
    if view.flags.required {
        label.push_str(" *");
    }
    label
}

/// Lines drawn for one field: label with trigger glyphs, the wrapped value
/// and a meta line. Hidden fields draw nothing.
pub fn field_lines(view: &FieldView, focused: bool, max_width: u16) -> Vec<Line<'static>> {
    if view.hidden {
        return Vec::new();
    }
    let mut lines = Vec::new();

    let label_style = if focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    };
    let mut label = vec![Span::styled(label_text(view), label_style)];
    if view.help_text.is_some() {
        label.push(Span::raw(" "));
        label.push(Span::styled(HELP_GLYPH, Style::default().fg(Color::Blue)));
    }
    if view.flags.error {
        label.push(Span::raw(" "));
        label.push(Span::styled(
            ERROR_GLYPH,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }
    lines.push(Line::from(label));

    let mut value_style = if view.flags.disabled {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    };
    if view.flags.error {
        value_style = value_style.fg(Color::Red);
    }
    let width = max_width.saturating_sub(2).max(4) as usize;
    let mut wrapped: Vec<String> = wrap(&view.display_value, width)
        .into_iter()
        .map(|segment| segment.into_owned())
        .collect();
    if wrapped.is_empty() {
        wrapped.push(String::new());
    }
    for segment in wrapped {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(segment, value_style),
        ]));
    }

    let mut meta = vec![Span::styled(
        format!("  type: {}", view.widget_kind),
        Style::default().fg(Color::DarkGray),
    )];
    if view.flags.readonly {
        meta.push(Span::styled("  • readonly", Style::default().fg(Color::Gray)));
    } else if view.flags.disabled {
        meta.push(Span::styled("  • disabled", Style::default().fg(Color::Gray)));
    }
    lines.push(Line::from(meta));
    lines
}

/// Draw one field into `area` and report where its glyphs landed.
pub fn render_field(frame: &mut Frame<'_>, area: Rect, view: &FieldView, focused: bool) -> FieldTriggers {
    let lines = field_lines(view, focused, area.width);
    if lines.is_empty() || area.height == 0 {
        return FieldTriggers::default();
    }
    frame.render_widget(Paragraph::new(lines), area);

    let mut triggers = FieldTriggers::default();
    let mut column = UnicodeWidthStr::width(label_text(view).as_str()) as u16;
    let glyph = |column: &mut u16| {
        let x = area.x.saturating_add(*column).saturating_add(1);
        *column = column.saturating_add(2);
        (x < area.right()).then(|| Rect::new(x, area.y, 1, 1))
    };
    if view.help_text.is_some() {
        triggers.help = glyph(&mut column);
    }
    if view.flags.error {
        triggers.error = glyph(&mut column);
    }
    triggers
}

pub fn field_height(view: &FieldView, max_width: u16) -> u16 {
    field_lines(view, false, max_width).len() as u16
}
