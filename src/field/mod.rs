//! One field: a widget bound to one model attribute, its display flags and
//! its error overlay.

mod controller;
mod error;
mod options;
mod state;

pub use controller::FieldController;
pub use error::FieldError;
pub use options::FieldOptions;
pub use state::{ControllerPhase, DisplayFlags, FieldView};
