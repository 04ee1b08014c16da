//! Anchored popout panels (help tooltip, error list).
//!
//! The field controller only asks an [`OverlayFactory`] for a panel and keeps
//! the returned handle; how the panel is drawn belongs to the factory.

mod stack;

use std::cell::RefCell;
use std::rc::Rc;

use crate::validation::ErrorDescriptor;

pub use stack::{Popout, PopoutStack};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    Help,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PopoutFlow {
    Left,
    #[default]
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnchorMode {
    /// Anchor to the trigger glyph itself.
    Trigger,
    /// Anchor to a region supplied by the host.
    #[default]
    Custom,
}

/// Transient view-model behind the help tooltip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TooltipModel {
    pub help_text: String,
    pub error_text: Option<String>,
    /// Which attribute the panel displays: `helpText` or `errorText`.
    pub text_attribute: &'static str,
}

impl TooltipModel {
    pub fn help(text: impl Into<String>) -> Self {
        Self {
            help_text: text.into(),
            error_text: None,
            text_attribute: "helpText",
        }
    }

    pub fn text(&self) -> &str {
        match self.text_attribute {
            "errorText" => self.error_text.as_deref().unwrap_or_default(),
            _ => &self.help_text,
        }
    }
}

/// Ordered error list shared between a controller and its error panel.
///
/// Cloning shares the same list, so the controller updates what the panel
/// shows in place. Each `reset` replaces the whole list.
#[derive(Debug, Clone, Default)]
pub struct ErrorSet {
    items: Rc<RefCell<Vec<ErrorDescriptor>>>,
}

impl ErrorSet {
    pub fn new(errors: Vec<ErrorDescriptor>) -> Self {
        Self {
            items: Rc::new(RefCell::new(errors)),
        }
    }

    pub fn reset(&self, errors: Vec<ErrorDescriptor>) {
        *self.items.borrow_mut() = errors;
    }

    pub fn clear(&self) {
        self.items.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn to_vec(&self) -> Vec<ErrorDescriptor> {
        self.items.borrow().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.items
            .borrow()
            .iter()
            .map(|error| error.message.clone())
            .collect()
    }

    /// Whether both handles point at the same list.
    pub fn shares_with(&self, other: &ErrorSet) -> bool {
        Rc::ptr_eq(&self.items, &other.items)
    }
}

#[derive(Debug, Clone)]
pub enum PanelContent {
    Tooltip(TooltipModel),
    Errors(ErrorSet),
}

#[derive(Debug, Clone)]
pub struct OverlayRequest {
    pub trigger: TriggerKind,
    pub panel: PanelContent,
    pub flow: PopoutFlow,
    pub anchor: AnchorMode,
}

impl OverlayRequest {
    /// Info trigger plus tooltip bound to `text`.
    pub fn help(text: impl Into<String>) -> Self {
        Self {
            trigger: TriggerKind::Help,
            panel: PanelContent::Tooltip(TooltipModel::help(text)),
            flow: PopoutFlow::Right,
            anchor: AnchorMode::Custom,
        }
    }

    /// Error trigger plus a list panel bound to `errors`.
    pub fn errors(errors: ErrorSet) -> Self {
        Self {
            trigger: TriggerKind::Error,
            panel: PanelContent::Errors(errors),
            flow: PopoutFlow::Right,
            anchor: AnchorMode::Custom,
        }
    }
}

/// Opaque reference to a panel created by an [`OverlayFactory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayHandle(u64);

impl OverlayHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

pub trait OverlayFactory {
    fn create_overlay(&self, request: OverlayRequest) -> OverlayHandle;
}
