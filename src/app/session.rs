use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::Frame;
use serde_json::Value;
use tracing::debug;

use crate::field::FieldController;
use crate::form::{Form, FormOutcome};
use crate::overlay::{OverlayRequest, PopoutStack, TriggerKind};
use crate::presentation::{self, FormFrame};
use crate::widget::helpers::cycle_index;

use super::input::{KeyCommand, classify};
use super::status::StatusLine;
use super::terminal::TerminalGuard;

const HELP_TEXT: &str = "Tab/Shift+Tab move • F1 help • F2 errors • Ctrl+S submit • Ctrl+Q quit";

#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// Validation passed; the model's values.
    Submitted(Value),
    Cancelled,
}

/// Interactive terminal editing of a [`Form`].
///
/// Popout panels come from the same [`PopoutStack`] the form's controllers
/// create their overlays in.
pub struct FormSession {
    form: Form,
    popouts: Rc<PopoutStack>,
    title: String,
    focus: usize,
    open: Option<TriggerKind>,
    status: StatusLine,
    outcome: Option<SessionOutcome>,
    tick_rate: Duration,
}

impl FormSession {
    /// Renders every field of `form`.
    pub fn new(form: Form, popouts: Rc<PopoutStack>) -> Self {
        form.render_all();
        let mut session = Self {
            title: form.id().to_string(),
            form,
            popouts,
            focus: 0,
            open: None,
            status: StatusLine::new(),
            outcome: None,
            tick_rate: Duration::from_millis(250),
        };
        if session.is_hidden(0) {
            session.step_focus(1);
        }
        session
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_tick_rate(mut self, tick_rate: Duration) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn status(&self) -> &str {
        self.status.message()
    }

    pub fn outcome(&self) -> Option<&SessionOutcome> {
        self.outcome.as_ref()
    }

    pub fn focused_key(&self) -> Option<&str> {
        self.form.keys().nth(self.focus)
    }

    pub fn open_popout_kind(&self) -> Option<TriggerKind> {
        self.open
    }

    fn focused(&self) -> Option<&FieldController> {
        self.form.controllers().nth(self.focus)
    }

    fn is_hidden(&self, index: usize) -> bool {
        self.form
            .controllers()
            .nth(index)
            .and_then(|controller| controller.with_widget(|widget| widget.hidden()))
            .unwrap_or(false)
    }

    /// Move focus by `delta`, skipping hidden fields.
    fn step_focus(&mut self, delta: i32) {
        let len = self.form.len();
        let mut next = self.focus;
        for _ in 0..len {
            next = cycle_index(next, len, delta);
            if !self.is_hidden(next) {
                self.focus = next;
                break;
            }
        }
        self.open = None;
        if let Some(key) = self.focused_key() {
            let label = key.to_string();
            self.status.editing(&label);
        }
    }

    /// Request of the popout currently open on the focused field.
    pub fn open_popout(&self) -> Option<OverlayRequest> {
        let kind = self.open?;
        let controller = self.focused()?;
        let handle = match kind {
            TriggerKind::Help => controller.help_overlay(),
            TriggerKind::Error => controller.error_overlay(),
        }?;
        self.popouts.get(handle).map(|popout| popout.request)
    }

    fn toggle(&mut self, kind: TriggerKind) {
        if self.open == Some(kind) {
            self.open = None;
            return;
        }
        let available = self.focused().is_some_and(|controller| match kind {
            TriggerKind::Help => controller.help_overlay().is_some(),
            TriggerKind::Error => controller.is_error_shown(),
        });
        if available {
            self.open = Some(kind);
        } else {
            self.status.no_popout(match kind {
                TriggerKind::Help => "help",
                TriggerKind::Error => "errors",
            });
        }
    }

    fn submit(&mut self) {
        match self.form.validate() {
            FormOutcome::Valid { values } => {
                self.status.validation_passed();
                self.outcome = Some(SessionOutcome::Submitted(values));
            }
            FormOutcome::Invalid { issues } => {
                self.status.issues_remaining(issues.len());
                if let Some(first) = issues.first()
                    && let Some(index) = self.form.keys().position(|key| key == first.key)
                {
                    self.focus = index;
                    self.open = Some(TriggerKind::Error);
                }
            }
        }
    }

    /// Apply one key press. Returns `true` once the session is finished.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return self.outcome.is_some();
        }
        match classify(&key) {
            KeyCommand::Submit => self.submit(),
            KeyCommand::Quit => self.outcome = Some(SessionOutcome::Cancelled),
            KeyCommand::NextField => self.step_focus(1),
            KeyCommand::PrevField => self.step_focus(-1),
            KeyCommand::ToggleHelp => self.toggle(TriggerKind::Help),
            KeyCommand::ToggleErrors => self.toggle(TriggerKind::Error),
            KeyCommand::Dismiss => {
                self.open = None;
                self.status.ready();
            }
            KeyCommand::Edit(key) => {
                let Some(controller) = self.focused() else {
                    return false;
                };
                if controller.handle_key(&key) {
                    // Keep a shown error in step with the new value.
                    if controller.is_error_shown() {
                        controller.validate();
                    }
                    self.status.value_updated();
                }
            }
        }
        self.outcome.is_some()
    }

    pub fn draw(&self, frame: &mut Frame<'_>) {
        let views = self.form.views();
        let popout = self.open_popout();
        presentation::draw(
            frame,
            FormFrame {
                title: &self.title,
                views: &views,
                focused: self.focus,
                status: self.status.message(),
                help: Some(HELP_TEXT),
                popout: popout.as_ref(),
            },
        );
    }

    /// Run until the form is submitted or the user quits.
    pub fn run(mut self) -> Result<SessionOutcome> {
        let mut terminal = TerminalGuard::enter()?;
        debug!(form = %self.form.id(), fields = self.form.len(), "session started");
        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if !event::poll(self.tick_rate)? {
                continue;
            }
            if let Event::Key(key) = event::read()?
                && self.handle_key(key)
            {
                break;
            }
        }
        drop(terminal);
        self.form.destroy();
        Ok(self.outcome.unwrap_or(SessionOutcome::Cancelled))
    }
}
