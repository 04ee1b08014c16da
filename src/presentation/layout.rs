use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::overlay::PopoutFlow;

/// Centre a `width` x `height` box inside `area`.
pub fn popup_rect(area: Rect, width: u16, height: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);
    let inner = vertical[1];
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(inner.width.saturating_sub(width) / 2),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(inner);
    horizontal[1]
}

/// Place a panel next to `trigger` in the direction of `flow`, shifted back
/// inside `bounds` when it would overflow.
pub fn anchored_rect(bounds: Rect, trigger: Rect, flow: PopoutFlow, width: u16, height: u16) -> Rect {
    let width = width.min(bounds.width);
    let height = height.min(bounds.height);
    let (x, y) = match flow {
        PopoutFlow::Right => (trigger.right(), trigger.y),
        PopoutFlow::Left => (trigger.x.saturating_sub(width), trigger.y),
        PopoutFlow::Down => (trigger.x, trigger.bottom()),
        PopoutFlow::Up => (trigger.x, trigger.y.saturating_sub(height)),
    };
    let x = x.clamp(bounds.x, bounds.right().saturating_sub(width));
    let y = y.clamp(bounds.y, bounds.bottom().saturating_sub(height));
    Rect::new(x, y, width, height)
}
