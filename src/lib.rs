#![deny(rust_2018_idioms)]

//! Schema-driven form fields.
//!
//! A [`FieldController`] builds the widget named by a [`FieldSchema`],
//! binds it to one attribute of a [`Model`], keeps its display flags in step
//! with model changes and shows validation errors through an
//! [`OverlayFactory`]. Validators are resolved by a [`ValidatorRegistry`]
//! from a name, a pattern, a configuration object or a function.

pub mod domain;
pub mod field;
pub mod form;
pub mod io;
pub mod model;
pub mod overlay;
pub mod validation;
pub mod widget;

#[cfg(feature = "tui")]
pub mod app;
#[cfg(feature = "tui")]
pub mod presentation;

#[cfg(test)]
mod tests;

pub use domain::{FieldEntry, FieldSchema, SchemaPatch, WidgetType, parse_field_document, parse_form_document};
pub use field::{ControllerPhase, DisplayFlags, FieldController, FieldError, FieldOptions, FieldView};
pub use form::{FieldIssue, Form, FormOutcome};
pub use io::{
    DocumentFormat, OutputDestination, OutputOptions, emit, load_document, load_form_document,
    parse_document_str,
};
pub use model::{Model, ModelEvent, ModelStore, Subscription};
pub use overlay::{ErrorSet, OverlayFactory, OverlayHandle, OverlayRequest, PopoutStack};
pub use validation::{ErrorDescriptor, RegistryError, ValidatorFn, ValidatorRegistry, ValidatorSpec};
pub use widget::{Widget, WidgetContext, WidgetEvent, WidgetRegistry};

#[cfg(feature = "tui")]
pub use app::{FormSession, SessionOutcome};

pub mod prelude {
    pub use super::{
        ErrorDescriptor, FieldController, FieldOptions, FieldSchema, Form, FormOutcome, Model,
        ModelStore, PopoutStack, ValidatorSpec,
    };
}
