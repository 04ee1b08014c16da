use ratatui::{
    Terminal,
    backend::TestBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier},
};
use serde_json::json;

use crate::field::{DisplayFlags, FieldView};
use crate::overlay::{ErrorSet, OverlayRequest, PopoutFlow};
use crate::presentation::{
    ERROR_GLYPH, HELP_GLYPH, anchored_rect, field_height, field_lines, popout_lines, popout_title,
    render_field, render_popout,
};
use crate::validation::ErrorDescriptor;

fn view(flags: DisplayFlags) -> FieldView {
    FieldView {
        key: "name".into(),
        label: "Name".into(),
        widget_kind: "text".into(),
        value: json!("Ada"),
        display_value: "Ada".into(),
        flags,
        hidden: false,
        help_text: None,
        errors: Vec::new(),
    }
}

fn line_text(line: &ratatui::text::Line<'_>) -> String {
    line.spans.iter().map(|span| span.content.as_ref()).collect()
}

fn row(buffer: &Buffer, y: u16) -> String {
    let width = buffer.area.width as usize;
    let start = y as usize * width;
    buffer.content[start..start + width]
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}

#[test]
fn label_carries_required_marker_and_glyphs() {
    let mut field = view(DisplayFlags {
        required: true,
        error: true,
        ..DisplayFlags::default()
    });
    field.help_text = Some("Full name".into());
    let lines = field_lines(&field, false, 40);
    assert_eq!(line_text(&lines[0]), format!("Name * {HELP_GLYPH} {ERROR_GLYPH}"));

    let error_span = lines[0].spans.last().expect("error glyph");
    assert_eq!(error_span.style.fg, Some(Color::Red));
    let value_span = &lines[1].spans[1];
    assert_eq!(value_span.content, "Ada");
    assert_eq!(value_span.style.fg, Some(Color::Red));
}

#[test]
fn focused_label_is_highlighted() {
    let lines = field_lines(&view(DisplayFlags::default()), true, 40);
    let label = &lines[0].spans[0];
    assert_eq!(label.style.fg, Some(Color::Yellow));
    assert!(label.style.add_modifier.contains(Modifier::BOLD));
    assert_eq!(line_text(&lines[0]), "Name");
}

#[test]
fn disabled_and_readonly_fields_are_dimmed() {
    let disabled = field_lines(
        &view(DisplayFlags {
            disabled: true,
            ..DisplayFlags::default()
        }),
        false,
        40,
    );
    assert_eq!(disabled[1].spans[1].style.fg, Some(Color::DarkGray));
    assert_eq!(line_text(&disabled[2]), "  type: text  • disabled");

    let readonly = field_lines(
        &view(DisplayFlags {
            readonly: true,
            disabled: true,
            ..DisplayFlags::default()
        }),
        false,
        40,
    );
    assert_eq!(line_text(&readonly[2]), "  type: text  • readonly");
}

#[test]
fn long_values_wrap_and_hidden_fields_vanish() {
    let mut field = view(DisplayFlags::default());
    field.display_value = "alpha beta gamma delta".into();
    assert_eq!(field_height(&field, 14), 4);

    field.hidden = true;
    assert!(field_lines(&field, false, 40).is_empty());
    assert_eq!(field_height(&field, 40), 0);
}

#[test]
fn render_field_reports_glyph_cells() {
    let mut field = view(DisplayFlags {
        error: true,
        ..DisplayFlags::default()
    });
    field.help_text = Some("Full name".into());
    let mut terminal = Terminal::new(TestBackend::new(30, 4)).unwrap();
    let mut triggers = None;
    terminal
        .draw(|frame| {
            triggers = Some(render_field(frame, Rect::new(0, 0, 30, 3), &field, false));
        })
        .unwrap();
    let triggers = triggers.unwrap();
    assert_eq!(triggers.help, Some(Rect::new(5, 0, 1, 1)));
    assert_eq!(triggers.error, Some(Rect::new(7, 0, 1, 1)));

    let buffer = terminal.backend().buffer();
    assert!(row(buffer, 0).starts_with("Name ? !"));
    assert!(row(buffer, 1).starts_with("  Ada"));
}

#[test]
fn anchored_panels_stay_inside_bounds() {
    let bounds = Rect::new(0, 0, 40, 10);
    let trigger = Rect::new(10, 2, 1, 1);
    assert_eq!(
        anchored_rect(bounds, trigger, PopoutFlow::Right, 8, 3),
        Rect::new(11, 2, 8, 3)
    );
    assert_eq!(
        anchored_rect(bounds, trigger, PopoutFlow::Left, 8, 3),
        Rect::new(2, 2, 8, 3)
    );
    assert_eq!(
        anchored_rect(bounds, trigger, PopoutFlow::Down, 8, 3),
        Rect::new(10, 3, 8, 3)
    );

    let edge = Rect::new(38, 9, 1, 1);
    assert_eq!(
        anchored_rect(bounds, edge, PopoutFlow::Right, 12, 4),
        Rect::new(28, 6, 12, 4)
    );
    assert_eq!(
        anchored_rect(bounds, Rect::new(1, 0, 1, 1), PopoutFlow::Up, 60, 20),
        Rect::new(0, 0, 40, 10)
    );
}

#[test]
fn error_popout_lists_live_messages() {
    let errors = ErrorSet::default();
    let request = OverlayRequest::errors(errors.clone());
    assert_eq!(popout_title(&request), "Errors");
    assert_eq!(line_text(&popout_lines(&request, 30)[0]), "No errors");

    errors.reset(vec![
        ErrorDescriptor::new("required", "Required"),
        ErrorDescriptor::new("length", "Too short"),
    ]);
    let lines: Vec<_> = popout_lines(&request, 30).iter().map(line_text).collect();
    assert_eq!(lines, ["• Required", "• Too short"]);
}

#[test]
fn help_popout_draws_next_to_its_trigger() {
    let request = OverlayRequest::help("Your legal name");
    assert_eq!(popout_title(&request), "Help");

    let mut terminal = Terminal::new(TestBackend::new(40, 8)).unwrap();
    let mut area = Rect::default();
    terminal
        .draw(|frame| {
            let bounds = frame.area();
            area = render_popout(frame, bounds, Rect::new(5, 0, 1, 1), &request);
        })
        .unwrap();
    assert_eq!(area, Rect::new(6, 0, 19, 3));

    let buffer = terminal.backend().buffer();
    assert!(row(buffer, 0).contains("Help"));
    assert!(row(buffer, 1).contains("Your legal name"));
}
