use std::cell::RefCell;
use std::rc::Rc;
use crate::frontend::action::Action;
use crate::frontend::query::Backend;
use crate::util::error::{self, ErrorReporter};

/// Executes actions against the store and keeps the undo/redo timeline.
///
/// The timeline is linear: executing an action discards everything that was undone before it.
/// Entries are recorded optimistically and stay recorded when the store rejects them; what
/// undoing an action means is decided by the store.
pub struct History<B: Backend> {
    backend: Rc<B>,
    reporter: Rc<dyn ErrorReporter>,
    undo_stack: RefCell<Vec<Action>>,
    redo_stack: RefCell<Vec<Action>>,
}

impl<B: Backend> History<B> {
    pub fn new(backend: Rc<B>, reporter: Rc<dyn ErrorReporter>) -> Self {
        History {
            backend,
            reporter,
            undo_stack: RefCell::new(Vec::new()),
            redo_stack: RefCell::new(Vec::new()),
        }
    }

    /// Records an action and sends it to the store.
    pub async fn execute(&self, action: Action) -> Result<(), error::Error> {
        let title = action.error_title();
        tracing::info!(action = action.description(), table_oid = action.table_oid(), "executing action");

        // Record the action, which ends any redo branch
        self.undo_stack.borrow_mut().push(action.clone());
        self.redo_stack.borrow_mut().clear();

        match self.backend.execute(action).await {
            Ok(_) => { return Ok(()); },
            Err(e) => {
                error::report(self.reporter.as_ref(), &title, &e);
                return Err(e);
            }
        }
    }

    /// Moves the most recent action onto the redo stack and asks the store to revert it.
    /// Returns whether there was anything to undo.
    pub async fn undo(&self) -> Result<bool, error::Error> {
        let action = match self.undo_stack.borrow_mut().pop() {
            Some(a) => a,
            None => { return Ok(false); }
        };
        tracing::info!(action = action.description(), table_oid = action.table_oid(), "undoing action");
        self.redo_stack.borrow_mut().push(action);

        match self.backend.undo().await {
            Ok(_) => { return Ok(true); },
            Err(e) => {
                error::report(self.reporter.as_ref(), "Error while undoing.", &e);
                return Err(e);
            }
        }
    }

    /// Executes the most recently undone action again.
    /// Returns whether there was anything to redo.
    pub async fn redo(&self) -> Result<bool, error::Error> {
        let action = match self.redo_stack.borrow_mut().pop() {
            Some(a) => a,
            None => { return Ok(false); }
        };
        tracing::info!(action = action.description(), discarded = self.redo_len(), "redoing action");

        // A redo is executed like a fresh action, so it also ends the rest of the redo branch
        self.execute(action).await?;
        return Ok(true);
    }

    pub fn can_undo(&self) -> bool {
        return !self.undo_stack.borrow().is_empty();
    }

    pub fn can_redo(&self) -> bool {
        return !self.redo_stack.borrow().is_empty();
    }

    pub fn history_len(&self) -> usize {
        return self.undo_stack.borrow().len();
    }

    pub fn redo_len(&self) -> usize {
        return self.redo_stack.borrow().len();
    }

    /// The recorded actions, oldest first.
    pub fn history(&self) -> Vec<Action> {
        return self.undo_stack.borrow().clone();
    }

    /// Forgets both stacks.
    pub fn clear(&self) {
        self.undo_stack.borrow_mut().clear();
        self.redo_stack.borrow_mut().clear();
    }
}
