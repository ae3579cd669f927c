use crate::PriceListPrinter;
use crate::actions::{ActionKind, ActionTable};
use crate::canvas::PrintedDocument;
use crate::document::{Document, Navigation, Prompt};
use crate::error::PriceListError;
use crate::events::EventQueue;
use crate::model::PriceListId;
use crate::view_state::ViewState;

/// What a triggered action did.
#[derive(Debug)]
pub enum ActionOutcome {
    Added(PriceListId),
    EditStarted,
    Deleted(PriceListId),
    DeleteDeclined,
    NothingSelected,
    Selected(PriceListId),
    Reverted,
    Saved,
    Printed(PrintedDocument),
    /// Search, Tutor and Exit belong to the host UI.
    Host(ActionKind),
}

/// Controller tying the document to its action table, view flags and printer.
/// The manager subscribes to the document and drains what it hears after
/// every operation so the derived state never lags behind the tree.
pub struct PriceListManager {
    document: Document,
    inbox: EventQueue,
    actions: ActionTable,
    view: ViewState,
    printer: PriceListPrinter,
}

impl PriceListManager {
    pub fn new(printer: PriceListPrinter) -> Self {
        Self::with_document(Document::new(), printer)
    }

    pub fn with_document(mut document: Document, printer: PriceListPrinter) -> Self {
        if let Some(debug) = printer.debug() {
            document.set_debug(debug);
        }
        let inbox = EventQueue::default();
        document.subscribe(inbox.sink());
        let mut manager = Self {
            document,
            inbox,
            actions: ActionTable::default(),
            view: ViewState::default(),
            printer,
        };
        manager.actions.set_edit_mode(manager.document.is_editing());
        manager.sync();
        manager
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn actions(&self) -> &ActionTable {
        &self.actions
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn view_state_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    pub fn printer(&self) -> &PriceListPrinter {
        &self.printer
    }

    /// Runs form-level edits against the document, then refreshes derived state.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut Document) -> R) -> R {
        let result = f(&mut self.document);
        self.sync();
        result
    }

    fn sync(&mut self) {
        for event in self.inbox.drain() {
            self.view.observe(&event);
            self.actions.observe(&event);
        }
    }

    pub fn trigger(
        &mut self,
        action: ActionKind,
        prompt: &mut dyn Prompt,
    ) -> Result<ActionOutcome, PriceListError> {
        if !self.actions.is_enabled(action) {
            return Err(PriceListError::ActionDisabled(action));
        }
        let outcome = match action {
            ActionKind::New => {
                let id = self.document.add_price_list("");
                self.document.select(id)?;
                ActionOutcome::Added(id)
            }
            ActionKind::Modify => {
                self.document.begin_edit();
                ActionOutcome::EditStarted
            }
            ActionKind::Delete => match self.document.selected() {
                None => ActionOutcome::NothingSelected,
                Some(id) => {
                    if self.document.delete_price_list(id, prompt)? {
                        ActionOutcome::Deleted(id)
                    } else {
                        ActionOutcome::DeleteDeclined
                    }
                }
            },
            ActionKind::Top => self.navigate(Navigation::Top),
            ActionKind::Back => self.navigate(Navigation::Back),
            ActionKind::Next => self.navigate(Navigation::Next),
            ActionKind::Last => self.navigate(Navigation::Last),
            ActionKind::Undo => {
                self.document.discard();
                ActionOutcome::Reverted
            }
            ActionKind::Save => {
                self.document.save();
                ActionOutcome::Saved
            }
            ActionKind::Print => ActionOutcome::Printed(self.printer.print(&self.document)),
            ActionKind::Search | ActionKind::Tutor | ActionKind::Exit => {
                ActionOutcome::Host(action)
            }
        };
        self.sync();
        Ok(outcome)
    }

    /// Resolves a keyboard shortcut and triggers its action, if any.
    pub fn trigger_shortcut(
        &mut self,
        shortcut: &str,
        prompt: &mut dyn Prompt,
    ) -> Option<Result<ActionOutcome, PriceListError>> {
        let action = self.actions.action_for_shortcut(shortcut)?;
        Some(self.trigger(action, prompt))
    }

    fn navigate(&mut self, to: Navigation) -> ActionOutcome {
        match self.document.navigate(to) {
            Some(id) => ActionOutcome::Selected(id),
            None => ActionOutcome::NothingSelected,
        }
    }
}
