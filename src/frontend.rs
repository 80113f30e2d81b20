pub mod column_type;
pub mod channel;
pub mod query;
pub mod cell;
pub mod action;
pub mod history;
pub mod view;
pub mod refresh;
pub mod dialog;
use std::cell::RefCell;
use std::rc::Rc;
use crate::frontend::action::Action;
use crate::frontend::cell::{Cell, EditEvent};
use crate::frontend::column_type::MetadataColumnType;
use crate::frontend::dialog::{ColumnForm, DialogKind, DialogRequest, DropdownForm, TableForm};
use crate::frontend::history::History;
use crate::frontend::query::{Backend, QueryGateway};
use crate::frontend::refresh::{ListScope, Notification, RefreshController, Sidebar};
use crate::frontend::view::{Renderer, TableView};
use crate::util::config::ViewConfig;
use crate::util::error::{self, ErrorReporter};


/// An editing session on one store.
///
/// Every user intent enters here. Failures are shown on the reporter with a title and
/// returned to the caller; nothing is retried.
pub struct Editor<B: Backend> {
    backend: Rc<B>,
    gateway: QueryGateway<B>,
    history: History<B>,
    refresh: RefreshController<B>,
    reporter: Rc<dyn ErrorReporter>,
}

impl<B: Backend> Editor<B> {
    pub fn new(backend: Rc<B>, renderer: Box<dyn Renderer>, reporter: Rc<dyn ErrorReporter>, config: &ViewConfig) -> Self {
        let gateway = QueryGateway::new(backend.clone());
        let view = Rc::new(RefCell::new(TableView::new(renderer)));
        return Editor {
            backend: backend.clone(),
            gateway: gateway.clone(),
            history: History::new(backend, reporter.clone()),
            refresh: RefreshController::new(gateway, view, config.page_size, config.first_page),
            reporter,
        };
    }

    pub fn view(&self) -> &Rc<RefCell<TableView>> {
        return self.refresh.view();
    }

    pub fn sidebar(&self) -> &Rc<RefCell<Sidebar>> {
        return self.refresh.sidebar();
    }

    pub fn history(&self) -> &History<B> {
        return &self.history;
    }

    /// Shows a failed result on the reporter.
    fn reported<T>(&self, title: &str, result: Result<T, error::Error>) -> Result<T, error::Error> {
        if let Err(e) = &result {
            error::report(self.reporter.as_ref(), title, e);
        }
        return result;
    }

    fn displayed_table(&self, title: &str) -> Result<i64, error::Error> {
        let table_oid = self.view().borrow().table_oid();
        return self.reported(title, table_oid.ok_or_else(|| error::Error::MissingContextError("No table is displayed.".into())));
    }

    /// Loads the lists of tables, reports and object types.
    pub async fn load_sidebar(&self) -> Result<(), error::Error> {
        let result = self.refresh.reload_list(ListScope::TableList).await;
        self.reported("Error while loading the list of tables.", result)?;
        let result = self.refresh.reload_list(ListScope::ReportList).await;
        self.reported("Error while loading the list of reports.", result)?;
        let result = self.refresh.reload_list(ListScope::ObjectTypeList).await;
        return self.reported("Error while loading the list of object types.", result);
    }

    /// Displays a table.
    pub async fn open_table(&self, table_oid: i64) -> Result<(), error::Error> {
        let result = self.refresh.open_table(table_oid).await;
        return self.reported("Error while loading table data.", result);
    }

    /// Displays another page of the current table.
    pub async fn set_page(&self, page_num: i64) -> Result<(), error::Error> {
        let result = self.refresh.set_page(page_num).await;
        return self.reported("Error while loading table data.", result);
    }

    /// Reacts to an event emitted by the store host.
    pub async fn handle_event(&self, event: &str, payload: &str) -> Result<(), error::Error> {
        let notification = match self.reported("Error while refreshing the view.", Notification::from_event(event, payload))? {
            Some(n) => n,
            None => { return Ok(()); }
        };
        let result = self.refresh.handle(notification).await;
        return self.reported("Error while refreshing the view.", result);
    }

    /// Commits an edit made in a rendered cell.
    /// Returns whether an action was executed.
    ///
    /// The edit is compared against the cell as the view shows it now, which may be newer
    /// than the caller's snapshot. The snapshot is used when its row has left the view.
    pub async fn commit_edit(&self, cell: &Cell, event: EditEvent) -> Result<bool, error::Error> {
        let mut current: Option<Cell> = None;
        {
            let view = self.view().borrow();
            if view.table_oid() == Some(cell.table_oid) {
                current = view.row(cell.row_oid)
                    .and_then(|r| r.cell(cell.column_oid))
                    .map(|r| r.cell.clone());
            }
        }
        match cell::commit(current.as_ref().unwrap_or(cell), event) {
            Some(action) => {
                self.history.execute(action).await?;
                return Ok(true);
            },
            None => { return Ok(false); }
        }
    }

    /// Adds a blank row at the end of the displayed table.
    pub async fn push_row(&self) -> Result<(), error::Error> {
        let table_oid = self.displayed_table("Error while adding row.")?;
        return self.history.execute(Action::PushTableRow { table_oid }).await;
    }

    /// Adds a blank row before the given row of the displayed table.
    pub async fn insert_row(&self, row_oid: i64) -> Result<(), error::Error> {
        let table_oid = self.displayed_table("Error while inserting row.")?;
        return self.history.execute(Action::InsertTableRow { table_oid, row_oid }).await;
    }

    pub async fn delete_row(&self, row_oid: i64) -> Result<(), error::Error> {
        let table_oid = self.displayed_table("Error while deleting row.")?;
        return self.history.execute(Action::DeleteTableRow { table_oid, row_oid }).await;
    }

    pub async fn delete_column(&self, column_oid: i64) -> Result<(), error::Error> {
        let table_oid = self.displayed_table("Error while deleting column.")?;
        return self.history.execute(Action::DeleteTableColumn { table_oid, column_oid }).await;
    }

    pub async fn delete_table(&self, table_oid: i64) -> Result<(), error::Error> {
        return self.history.execute(Action::DeleteTable { table_oid }).await;
    }

    /// Reads the request a dialog window was opened with from its URL query string.
    pub fn dialog_request(&self, kind: DialogKind, query: &str) -> Result<DialogRequest, error::Error> {
        return self.reported("Error while opening dialog.", DialogRequest::from_query(kind, query));
    }

    /// Asks the host to open a dialog window.
    pub async fn open_dialog(&self, request: DialogRequest) -> Result<(), error::Error> {
        let title = format!("Error while opening the \"{}\" dialog.", request.title());
        let result = self.backend.dialog_open(request).await;
        return self.reported(&title, result);
    }

    /// Builds the form of a create or edit column dialog.
    pub async fn load_column_form(&self, request: &DialogRequest) -> Result<ColumnForm, error::Error> {
        let result = match *request {
            DialogRequest::CreateTableColumn { table_oid, column_ordering } => {
                Ok(ColumnForm::create(table_oid, column_ordering))
            },
            DialogRequest::EditTableColumn { table_oid, column_oid } => {
                self.gateway.column(column_oid).await.map(|metadata| ColumnForm::edit(table_oid, &metadata))
            },
            DialogRequest::CreateTable
            | DialogRequest::EditDropdownValues { .. } => {
                Err(error::Error::MissingContextError("The dialog does not edit a column.".into()))
            }
        };
        return self.reported("Error while loading column.", result);
    }

    /// Builds the form of a dropdown values dialog.
    pub async fn load_dropdown_form(&self, request: &DialogRequest) -> Result<DropdownForm, error::Error> {
        let result = match *request {
            DialogRequest::EditDropdownValues { table_oid, column_oid } => {
                self.dropdown_form(table_oid, column_oid).await
            },
            DialogRequest::CreateTable
            | DialogRequest::CreateTableColumn { .. }
            | DialogRequest::EditTableColumn { .. } => {
                Err(error::Error::MissingContextError("The dialog does not edit dropdown values.".into()))
            }
        };
        return self.reported("Error while loading dropdown values.", result);
    }

    async fn dropdown_form(&self, table_oid: i64, column_oid: i64) -> Result<DropdownForm, error::Error> {
        let metadata = self.gateway.column(column_oid).await?;
        match metadata.column_type {
            MetadataColumnType::SingleSelectDropdown(_)
            | MetadataColumnType::MultiSelectDropdown(_) => {
                let values = self.gateway.dropdown_values(column_oid).await?;
                return Ok(DropdownForm::new(table_oid, column_oid, values));
            },
            MetadataColumnType::Primitive(_)
            | MetadataColumnType::Reference(_)
            | MetadataColumnType::ChildObject(_)
            | MetadataColumnType::ChildTable(_) => {
                return Err(error::Error::MissingContextError(format!("Column {column_oid} is not a dropdown column.")));
            }
        }
    }

    pub async fn submit_table_form(&self, form: &TableForm) -> Result<(), error::Error> {
        return self.submit(form.to_action()).await;
    }

    pub async fn submit_column_form(&self, form: &ColumnForm) -> Result<(), error::Error> {
        return self.submit(form.to_action()).await;
    }

    pub async fn submit_dropdown_form(&self, form: &DropdownForm) -> Result<(), error::Error> {
        return self.submit(Ok(form.to_action())).await;
    }

    /// Executes the action built by a dialog, then closes the dialog.
    /// Invalid input is reported and nothing is sent, so the form can be corrected.
    async fn submit(&self, action: Result<Action, error::Error>) -> Result<(), error::Error> {
        let action = self.reported("Invalid input.", action)?;
        self.history.execute(action).await?;
        let result = self.backend.dialog_close().await;
        return self.reported("Error while closing dialog.", result);
    }

    /// Undoes the most recent action. Returns whether there was one.
    pub async fn undo(&self) -> Result<bool, error::Error> {
        return self.history.undo().await;
    }

    /// Redoes the most recently undone action. Returns whether there was one.
    pub async fn redo(&self) -> Result<bool, error::Error> {
        return self.history.redo().await;
    }
}
