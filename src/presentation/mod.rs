//! Terminal rendering of field snapshots and their popouts.

mod field;
mod layout;
mod popout;
mod view;

pub use field::{ERROR_GLYPH, FieldTriggers, HELP_GLYPH, field_height, field_lines, render_field};
pub use layout::{anchored_rect, popup_rect};
pub use popout::{popout_lines, popout_title, render_popout};
pub use view::{FormFrame, draw, render_form};
