use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossterm::event::KeyEvent;
use tracing::{debug, error, trace, warn};

use crate::domain::{FieldSchema, WidgetType};
use crate::model::{CHANGE_EVENT, EventHandler, ModelEvent, Subscription};
use crate::overlay::{ErrorSet, OverlayHandle, OverlayRequest};
use crate::validation::{self, ErrorDescriptor, ValidatorRegistry};
use crate::widget::{self, Widget, WidgetContext, WidgetEvent, WidgetRegistry};

use super::{ControllerPhase, DisplayFlags, FieldError, FieldOptions, FieldView};

static NEXT_FIELD_ID: AtomicU64 = AtomicU64::new(1);

/// Model notifications the controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModelTrigger {
    /// Generic `change`: re-derive readonly/hidden.
    ExternalChange,
    /// `change:<key>`: the bound value moved, recompute the required flag.
    ValueChanged,
    /// One of the schema's `update_editor_events`.
    Rebuild,
}

/// Owns one widget bound to one model attribute.
///
/// Everything runs on the caller's thread. Model notifications that arrive
/// while an operation is in progress (a widget writing to the model, a
/// rebuild) are queued and handled in delivery order once that operation
/// returns, so a controller never holds two widgets at once.
pub struct FieldController {
    shared: Rc<Shared>,
}

struct Shared {
    key: String,
    phase: Rc<Cell<ControllerPhase>>,
    core: RefCell<Core>,
    pending: RefCell<VecDeque<ModelTrigger>>,
}

struct Core {
    options: FieldOptions,
    widgets: Arc<WidgetRegistry>,
    validators: Arc<ValidatorRegistry>,
    field_id: String,
    editor_id: String,
    /// Effective schema of the current widget.
    schema: FieldSchema,
    widget: Option<Box<dyn Widget>>,
    /// Shared with the controller handle so it stays readable mid-operation.
    phase: Rc<Cell<ControllerPhase>>,
    flags: DisplayFlags,
    attached: bool,
    errors: Option<ErrorSet>,
    error_overlay: Option<OverlayHandle>,
    help_overlay: Option<OverlayHandle>,
    subscriptions: Vec<Subscription>,
}

impl FieldController {
    /// Build the widget and subscribe to the model.
    ///
    /// Display flags stay at their defaults until [`render`](Self::render)
    /// attaches the widget: a required field reports `required` only after
    /// the first render.
    ///
    /// Fails on an empty key, an unknown widget type or a validator spec the
    /// registry cannot resolve.
    pub fn new(options: FieldOptions) -> Result<Self, FieldError> {
        if options.key.trim().is_empty() {
            return Err(FieldError::MissingKey);
        }
        let widgets = options.widgets.clone().unwrap_or_else(widget::global);
        let validators = options.validators.clone().unwrap_or_else(validation::global);
        let field_id = format!("field-{}", NEXT_FIELD_ID.fetch_add(1, Ordering::Relaxed));
        let editor_id = format!("{}_{}", options.model.cid(), options.key);

        let mut core = Core {
            schema: options.schema.clone(),
            options,
            widgets,
            validators,
            field_id,
            editor_id,
            widget: None,
            phase: Rc::new(Cell::new(ControllerPhase::Unbuilt)),
            flags: DisplayFlags::default(),
            attached: false,
            errors: None,
            error_overlay: None,
            help_overlay: None,
            subscriptions: Vec::new(),
        };
        let (schema, widget) = core.build_widget()?;
        core.schema = schema;
        core.widget = Some(widget);
        core.phase.set(ControllerPhase::Built);
        debug!(field = %core.options.key, id = %core.field_id, widget = ?core.schema.widget, "field constructed");

        let shared = Rc::new(Shared {
            key: core.options.key.clone(),
            phase: Rc::clone(&core.phase),
            core: RefCell::new(core),
            pending: RefCell::new(VecDeque::new()),
        });
        let subscriptions = Shared::subscribe(&shared);
        shared.core.borrow_mut().subscriptions = subscriptions;
        Ok(Self { shared })
    }

    /// Attach the widget, create the help overlay when the schema has help
    /// text, and apply the combined display state.
    pub fn render(&self) {
        self.shared.with_core("render", Core::render);
    }

    /// Run the widget's validation and show or clear the error accordingly.
    pub fn validate(&self) -> Option<ErrorDescriptor> {
        self.shared.with_core("validate", Core::validate)
    }

    /// Replace the shown errors. Returns `false` when the widget is not
    /// rendered or already destroyed and nothing changed.
    pub fn set_error(&self, errors: Vec<ErrorDescriptor>) -> bool {
        self.shared.with_core("set_error", |core| core.set_error(errors))
    }

    /// Empty the error set and drop the error flag. Returns `false` when the
    /// widget is not ready; clearing with no error shown is still `true`.
    pub fn clear_error(&self) -> bool {
        self.shared.with_core("clear_error", Core::clear_error)
    }

    /// Update `required` on the current schema (default: keep its value)
    /// and recompute the required flag.
    pub fn set_required(&self, required: Option<bool>) {
        self.shared
            .with_core("set_required", |core| core.set_required(required));
    }

    /// Discard the widget and build a fresh one from the original options.
    pub fn rebuild(&self) -> Result<(), FieldError> {
        self.shared
            .try_with_core("rebuild", Core::rebuild)
            .unwrap_or_else(|| {
                Err(FieldError::Busy {
                    key: self.shared.key.clone(),
                })
            })
    }

    pub fn destroy(&self) {
        self.shared.with_core("destroy", Core::destroy);
        self.shared.pending.borrow_mut().clear();
    }

    /// Route a key press to the widget. Returns whether it was consumed.
    pub fn handle_key(&self, key: &KeyEvent) -> bool {
        self.shared.with_core("handle_key", |core| {
            if core.phase.get() == ControllerPhase::Destroyed {
                return false;
            }
            let handled = core
                .widget
                .as_mut()
                .is_some_and(|widget| widget.handle_key(key));
            core.flush_widget_events();
            handled
        })
    }

    pub fn set_readonly_state(&self, readonly: bool) {
        self.with_widget_mut(|widget| widget.set_readonly(readonly));
    }

    pub fn set_enabled_state(&self, enabled: bool) {
        self.with_widget_mut(|widget| widget.set_enabled(enabled));
    }

    /// Read access to the current widget.
    pub fn with_widget<R>(&self, f: impl FnOnce(&dyn Widget) -> R) -> Option<R> {
        let core = self.shared.core.try_borrow().ok()?;
        core.widget.as_ref().map(|widget| f(&**widget))
    }

    /// Mutable access to the current widget. Notifications the widget
    /// queues are handled before this returns.
    pub fn with_widget_mut<R>(&self, f: impl FnOnce(&mut dyn Widget) -> R) -> Option<R> {
        self.shared
            .try_with_core("with_widget_mut", |core| {
                let widget = core.widget.as_mut()?;
                let result = f(&mut **widget);
                core.flush_widget_events();
                Some(result)
            })
            .flatten()
    }

    pub fn phase(&self) -> ControllerPhase {
        self.shared.phase.get()
    }

    pub fn flags(&self) -> DisplayFlags {
        self.read(|core| core.flags).unwrap_or_default()
    }

    pub fn is_error_shown(&self) -> bool {
        self.flags().error
    }

    /// Errors currently bound to the error overlay.
    pub fn errors(&self) -> Vec<ErrorDescriptor> {
        self.read(|core| core.errors.as_ref().map(ErrorSet::to_vec).unwrap_or_default())
            .unwrap_or_default()
    }

    pub fn error_set(&self) -> Option<ErrorSet> {
        self.read(|core| core.errors.clone()).flatten()
    }

    pub fn error_overlay(&self) -> Option<OverlayHandle> {
        self.read(|core| core.error_overlay).flatten()
    }

    pub fn help_overlay(&self) -> Option<OverlayHandle> {
        self.read(|core| core.help_overlay).flatten()
    }

    /// Effective schema of the current widget.
    pub fn schema(&self) -> Option<FieldSchema> {
        self.read(|core| core.schema.clone())
    }

    pub fn key(&self) -> &str {
        &self.shared.key
    }

    pub fn field_id(&self) -> String {
        self.read(|core| core.field_id.clone()).unwrap_or_default()
    }

    pub fn editor_id(&self) -> String {
        self.read(|core| core.editor_id.clone()).unwrap_or_default()
    }

    /// Rendered, not destroyed: guarded operations take effect.
    pub fn is_ready(&self) -> bool {
        self.read(Core::ui_ready).unwrap_or(false)
    }

    pub fn view(&self) -> Option<FieldView> {
        self.read(Core::view).flatten()
    }

    fn read<R>(&self, f: impl FnOnce(&Core) -> R) -> Option<R> {
        self.shared.core.try_borrow().ok().map(|core| f(&core))
    }
}

impl std::fmt::Debug for FieldController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.shared.core.try_borrow() {
            Ok(core) => f
                .debug_struct("FieldController")
                .field("key", &core.options.key)
                .field("field_id", &core.field_id)
                .field("phase", &core.phase.get())
                .field("flags", &core.flags)
                .field("widget", &core.widget)
                .finish(),
            Err(_) => f.write_str("FieldController { <busy> }"),
        }
    }
}

impl Shared {
    fn subscribe(shared: &Rc<Shared>) -> Vec<Subscription> {
        let core = shared.core.borrow();
        let model = Rc::clone(&core.options.model);
        let mut subscriptions = vec![model.subscribe(
            &ModelEvent::attribute_changed(&core.options.key).name,
            Shared::handler(shared, ModelTrigger::ValueChanged),
        )];
        if core.schema.get_readonly.is_some() || core.schema.get_hidden.is_some() {
            subscriptions.push(model.subscribe(
                CHANGE_EVENT,
                Shared::handler(shared, ModelTrigger::ExternalChange),
            ));
        }
        for event in &core.schema.update_editor_events {
            subscriptions.push(model.subscribe(event, Shared::handler(shared, ModelTrigger::Rebuild)));
        }
        subscriptions
    }

    fn handler(shared: &Rc<Shared>, trigger: ModelTrigger) -> EventHandler {
        let weak: Weak<Shared> = Rc::downgrade(shared);
        Rc::new(move |event: &ModelEvent| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            trace!(event = %event.name, ?trigger, "model notification");
            shared.pending.borrow_mut().push_back(trigger);
            shared.drain();
        })
    }

    fn try_with_core<R>(&self, op: &'static str, f: impl FnOnce(&mut Core) -> R) -> Option<R> {
        let result = match self.core.try_borrow_mut() {
            Ok(mut core) => f(&mut core),
            Err(_) => {
                warn!(op, "field controller is busy; call ignored");
                return None;
            }
        };
        self.drain();
        Some(result)
    }

    fn with_core<R: Default>(&self, op: &'static str, f: impl FnOnce(&mut Core) -> R) -> R {
        self.try_with_core(op, f).unwrap_or_default()
    }

    /// Handle queued notifications unless an operation is still running; that
    /// operation drains the queue when it returns.
    fn drain(&self) {
        loop {
            let Ok(mut core) = self.core.try_borrow_mut() else {
                return;
            };
            let Some(trigger) = self.next_pending() else {
                return;
            };
            core.dispatch(trigger);
        }
    }

    fn next_pending(&self) -> Option<ModelTrigger> {
        self.pending.borrow_mut().pop_front()
    }
}

impl Core {
    fn build_widget(&self) -> Result<(FieldSchema, Box<dyn Widget>), FieldError> {
        let model = &*self.options.model;
        let schema = self.options.schema.effective(model);
        let factory = match &schema.widget {
            WidgetType::Named(name) => {
                self.widgets
                    .get(name)
                    .ok_or_else(|| FieldError::UnknownWidget { name: name.clone() })?
            }
            WidgetType::Factory(factory) => Arc::clone(factory),
        };
        let validators = self.validators.resolve_all(&schema.validators)?;
        let context = WidgetContext {
            schema: schema.clone(),
            model: Rc::clone(&self.options.model),
            key: self.options.key.clone(),
            id: self.editor_id.clone(),
            field_id: self.field_id.clone(),
            form: self.options.form.clone(),
            class: self.options.class.clone(),
            tag_name: self.options.tag_name.clone(),
            value: self.options.value.clone(),
            validators,
        };
        let mut widget = factory(context);
        if let Some(get_readonly) = &schema.get_readonly {
            widget.set_readonly(get_readonly(model));
        }
        if let Some(get_hidden) = &schema.get_hidden {
            widget.set_hidden(get_hidden(model));
        }
        // Nothing is attached yet; the initial state is applied on render.
        widget.drain_events();
        Ok((schema, widget))
    }

    fn ui_ready(&self) -> bool {
        self.phase.get() != ControllerPhase::Destroyed
            && self
                .widget
                .as_ref()
                .is_some_and(|widget| widget.is_rendered() && !widget.is_destroyed())
    }

    fn render(&mut self) {
        if self.phase.get() == ControllerPhase::Destroyed {
            return;
        }
        if self.help_overlay.is_none()
            && let Some(text) = self.schema.help_text.clone()
        {
            let handle = self.options.overlays.create_overlay(OverlayRequest::help(text));
            self.help_overlay = Some(handle);
        }
        self.attached = true;
        self.attach_widget();
    }

    fn attach_widget(&mut self) {
        let Some(widget) = self.widget.as_mut() else {
            return;
        };
        widget.render();
        let (readonly, enabled) = (widget.readonly(), widget.enabled());
        self.update_editor_state(readonly, enabled);
        self.update_empty(None);
        self.flush_widget_events();
    }

    fn validate(&mut self) -> Option<ErrorDescriptor> {
        if self.phase.get() == ControllerPhase::Destroyed {
            return None;
        }
        let result = self.widget.as_ref().and_then(|widget| widget.validate());
        self.flush_widget_events();
        match &result {
            Some(error) => {
                self.set_error(vec![error.clone()]);
            }
            None => {
                self.clear_error();
            }
        }
        result
    }

    fn set_error(&mut self, errors: Vec<ErrorDescriptor>) -> bool {
        if !self.ui_ready() {
            debug!(field = %self.options.key, "set_error ignored: widget not ready");
            return false;
        }
        self.flags.error = true;
        let set = match &self.errors {
            Some(set) => {
                set.reset(errors);
                set.clone()
            }
            None => {
                let set = ErrorSet::new(errors);
                self.errors = Some(set.clone());
                set
            }
        };
        if self.error_overlay.is_none() {
            let handle = self.options.overlays.create_overlay(OverlayRequest::errors(set));
            self.error_overlay = Some(handle);
        }
        true
    }

    fn clear_error(&mut self) -> bool {
        if !self.ui_ready() {
            debug!(field = %self.options.key, "clear_error ignored: widget not ready");
            return false;
        }
        self.flags.error = false;
        if let Some(set) = &self.errors {
            set.clear();
        }
        true
    }

    fn set_required(&mut self, required: Option<bool>) {
        if self.phase.get() == ControllerPhase::Destroyed {
            return;
        }
        self.schema.required = required.unwrap_or(self.schema.required);
        self.update_empty(None);
    }

    fn update_empty(&mut self, is_empty: Option<bool>) {
        let is_empty = is_empty.unwrap_or_else(|| {
            self.widget
                .as_ref()
                .is_none_or(|widget| widget.is_empty_value())
        });
        self.toggle_required(self.schema.required && is_empty);
    }

    fn toggle_required(&mut self, required: bool) {
        if self.ui_ready() {
            self.flags.required = required;
        }
    }

    fn update_editor_state(&mut self, readonly: bool, enabled: bool) {
        if self.ui_ready() {
            self.flags.readonly = readonly;
            self.flags.disabled = readonly || !enabled;
        }
    }

    fn flush_widget_events(&mut self) {
        loop {
            let events = match self.widget.as_mut() {
                Some(widget) => widget.drain_events(),
                None => return,
            };
            if events.is_empty() {
                return;
            }
            for event in events {
                self.apply_widget_event(event);
            }
        }
    }

    fn apply_widget_event(&mut self, event: WidgetEvent) {
        trace!(field = %self.options.key, ?event, "widget event");
        match event {
            WidgetEvent::ReadonlyChanged(readonly) => {
                let enabled = self.widget.as_ref().is_none_or(|widget| widget.enabled());
                self.update_editor_state(readonly, enabled);
            }
            WidgetEvent::EnabledChanged(enabled) => {
                let readonly = self.widget.as_ref().is_some_and(|widget| widget.readonly());
                self.update_editor_state(readonly, enabled);
            }
            WidgetEvent::RequiredRequested(required) => self.set_required(required),
            WidgetEvent::EmptinessChanged(is_empty) => self.update_empty(is_empty),
        }
    }

    fn dispatch(&mut self, trigger: ModelTrigger) {
        if self.phase.get() == ControllerPhase::Destroyed {
            return;
        }
        match trigger {
            ModelTrigger::ExternalChange => self.push_external_state(),
            ModelTrigger::ValueChanged => self.update_empty(None),
            ModelTrigger::Rebuild => {
                if let Err(err) = self.rebuild() {
                    error!(field = %self.options.key, error = %err, "rebuild failed; keeping the previous widget");
                }
            }
        }
    }

    fn push_external_state(&mut self) {
        let get_readonly = self.schema.get_readonly.clone();
        let get_hidden = self.schema.get_hidden.clone();
        let model = Rc::clone(&self.options.model);
        let Some(widget) = self.widget.as_mut() else {
            return;
        };
        if let Some(get_readonly) = get_readonly {
            widget.set_readonly(get_readonly(&*model));
        }
        if let Some(get_hidden) = get_hidden {
            widget.set_hidden(get_hidden(&*model));
        }
        self.flush_widget_events();
    }

    fn rebuild(&mut self) -> Result<(), FieldError> {
        if self.phase.get() == ControllerPhase::Destroyed {
            return Ok(());
        }
        let previous = self.phase.replace(ControllerPhase::Rebuilding);
        let (schema, widget) = match self.build_widget() {
            Ok(built) => built,
            Err(err) => {
                self.phase.set(previous);
                return Err(err);
            }
        };
        if let Some(mut old) = self.widget.replace(widget) {
            old.destroy();
        }
        self.schema = schema;
        self.flags = DisplayFlags::default();
        if let Some(set) = &self.errors {
            set.clear();
        }
        self.phase.set(ControllerPhase::Built);
        debug!(field = %self.options.key, widget = ?self.schema.widget, "field rebuilt");
        if self.attached {
            self.attach_widget();
        }
        Ok(())
    }

    fn destroy(&mut self) {
        if self.phase.get() == ControllerPhase::Destroyed {
            return;
        }
        self.phase.set(ControllerPhase::Destroyed);
        if let Some(widget) = self.widget.as_mut() {
            widget.destroy();
        }
        for subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
        debug!(field = %self.options.key, "field destroyed");
    }

    fn view(&self) -> Option<FieldView> {
        let widget = self.widget.as_ref()?;
        Some(FieldView {
            key: self.options.key.clone(),
            label: self.schema.display_label(&self.options.key),
            widget_kind: widget.kind().to_string(),
            value: widget.value(),
            display_value: widget.display_value(),
            flags: self.flags,
            hidden: widget.hidden(),
            help_text: self.schema.help_text.clone(),
            errors: self
                .errors
                .as_ref()
                .map(ErrorSet::messages)
                .unwrap_or_default(),
        })
    }
}
