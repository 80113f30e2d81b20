use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use serde::Deserialize;
use tokio::sync::Mutex;
use crate::frontend::cell::Cell;
use crate::frontend::column_type::EditAffordance;
use crate::frontend::query::{Backend, BasicMetadata, DropdownValue, GridConsumer, QueryGateway, RowConsumer};
use crate::frontend::view::TableView;
use crate::util::error;


/// A change in the store that the view may need to reflect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    TableListChanged,
    ReportListChanged,
    ObjectTypeListChanged,
    TableDataChanged { table_oid: i64 },
    TableRowChanged { table_oid: i64, row_oid: i64 },
}

impl Notification {
    /// Decodes an event emitted by the store host.
    /// Returns `None` for events that do not concern the view.
    pub fn from_event(event: &str, payload: &str) -> Result<Option<Self>, error::Error> {
        match event {
            "update-table-list" => { return Ok(Some(Self::TableListChanged)); },
            "update-report-list" => { return Ok(Some(Self::ReportListChanged)); },
            "update-object-type-list" => { return Ok(Some(Self::ObjectTypeListChanged)); },
            "update-table-data" => {
                let table_oid: i64 = serde_json::from_str(payload)?;
                return Ok(Some(Self::TableDataChanged { table_oid }));
            },
            "update-table-row" => {
                #[derive(Deserialize)]
                struct RowPayload(i64, i64);

                let RowPayload(table_oid, row_oid) = serde_json::from_str(payload)?;
                return Ok(Some(Self::TableRowChanged { table_oid, row_oid }));
            },
            _ => {
                tracing::debug!(event, "ignored event");
                return Ok(None);
            }
        }
    }
}

/// A part of the view whose reloads are serialized against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReloadScope {
    TableList,
    ReportList,
    ObjectTypeList,
    TableView,
}

/// A sidebar list, reloaded independently of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListScope {
    TableList,
    ReportList,
    ObjectTypeList,
}

impl From<ListScope> for ReloadScope {
    fn from(scope: ListScope) -> ReloadScope {
        match scope {
            ListScope::TableList => ReloadScope::TableList,
            ListScope::ReportList => ReloadScope::ReportList,
            ListScope::ObjectTypeList => ReloadScope::ObjectTypeList,
        }
    }
}

/// The lists of tables, reports and object types shown next to the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sidebar {
    pub tables: Vec<BasicMetadata>,
    pub reports: Vec<BasicMetadata>,
    pub object_types: Vec<BasicMetadata>,
}


/// Streams grid rows into the table view.
struct GridLoader {
    view: Rc<RefCell<TableView>>,
}

impl GridConsumer for GridLoader {
    fn begin_row(&mut self, row_oid: i64, row_index: i64) -> Result<(), error::Error> {
        let mut view = self.view.try_borrow_mut().map_err(|_| error::Error::AdhocError("The table view is busy."))?;
        view.append_row(row_oid, row_index);
        return Ok(());
    }

    fn cell(&mut self, cell: Cell) -> Result<(), error::Error> {
        let mut view = self.view.try_borrow_mut().map_err(|_| error::Error::AdhocError("The table view is busy."))?;
        view.put_cell(cell);
        return Ok(());
    }
}

/// Streams a single row into the table view, adding, refilling or removing its node.
struct RowLoader {
    view: Rc<RefCell<TableView>>,
    row_oid: i64,
}

impl RowConsumer for RowLoader {
    fn row_exists(&mut self, exists: bool) -> Result<(), error::Error> {
        let mut view = self.view.try_borrow_mut().map_err(|_| error::Error::AdhocError("The table view is busy."))?;
        if exists {
            if !view.clear_row(self.row_oid) {
                view.push_row(self.row_oid);
            }
        } else {
            view.remove_row(self.row_oid);
        }
        return Ok(());
    }

    fn cell(&mut self, cell: Cell) -> Result<(), error::Error> {
        let mut view = self.view.try_borrow_mut().map_err(|_| error::Error::AdhocError("The table view is busy."))?;
        view.put_cell(cell);
        return Ok(());
    }
}


/// Keeps the view in step with the store.
///
/// Each reload holds the lock of its [`ReloadScope`] until its stream has been consumed, so a
/// second reload of the same scope waits for the first instead of interleaving with it.
/// Reloads are never cancelled; the one that runs last wins.
pub struct RefreshController<B: Backend> {
    gateway: QueryGateway<B>,
    view: Rc<RefCell<TableView>>,
    sidebar: Rc<RefCell<Sidebar>>,
    locks: RefCell<HashMap<ReloadScope, Rc<Mutex<()>>>>,
    page_size: i64,
    first_page: i64,
}

impl<B: Backend> RefreshController<B> {
    pub fn new(gateway: QueryGateway<B>, view: Rc<RefCell<TableView>>, page_size: i64, first_page: i64) -> Self {
        RefreshController {
            gateway,
            view,
            sidebar: Rc::new(RefCell::new(Sidebar::default())),
            locks: RefCell::new(HashMap::new()),
            page_size,
            first_page,
        }
    }

    pub fn view(&self) -> &Rc<RefCell<TableView>> {
        return &self.view;
    }

    pub fn sidebar(&self) -> &Rc<RefCell<Sidebar>> {
        return &self.sidebar;
    }

    fn lock_for(&self, scope: ReloadScope) -> Rc<Mutex<()>> {
        return self.locks
            .borrow_mut()
            .entry(scope)
            .or_insert_with(|| Rc::new(Mutex::new(())))
            .clone();
    }

    fn displayed_table(&self) -> Option<i64> {
        return self.view.borrow().table_oid();
    }

    /// Reacts to a change notification.
    pub async fn handle(&self, notification: Notification) -> Result<(), error::Error> {
        match notification {
            Notification::TableListChanged => {
                return self.reload_list(ListScope::TableList).await;
            },
            Notification::ReportListChanged => {
                return self.reload_list(ListScope::ReportList).await;
            },
            Notification::ObjectTypeListChanged => {
                return self.reload_list(ListScope::ObjectTypeList).await;
            },
            Notification::TableDataChanged { table_oid } => {
                return self.reload_table(table_oid).await;
            },
            Notification::TableRowChanged { table_oid, row_oid } => {
                return self.reload_row(table_oid, row_oid).await;
            }
        }
    }

    /// Reloads one of the sidebar lists.
    pub async fn reload_list(&self, scope: ListScope) -> Result<(), error::Error> {
        let lock = self.lock_for(scope.into());
        let _guard = lock.lock().await;

        match scope {
            ListScope::TableList => {
                let tables = self.gateway.table_list().await?;
                self.sidebar.borrow_mut().tables = tables;
            },
            ListScope::ReportList => {
                let reports = self.gateway.report_list().await?;
                self.sidebar.borrow_mut().reports = reports;
            },
            ListScope::ObjectTypeList => {
                let object_types = self.gateway.object_type_list().await?;
                self.sidebar.borrow_mut().object_types = object_types;
            }
        }
        return Ok(());
    }

    /// Displays a table from its first page.
    pub async fn open_table(&self, table_oid: i64) -> Result<(), error::Error> {
        let lock = self.lock_for(ReloadScope::TableView);
        let _guard = lock.lock().await;

        self.view.borrow_mut().show_table(table_oid, self.first_page);
        return self.load_table(table_oid).await;
    }

    /// Displays another page of the current table.
    pub async fn set_page(&self, page_num: i64) -> Result<(), error::Error> {
        if page_num < 1 {
            return Err(error::Error::InputError(format!("Page {page_num} does not exist.")));
        }

        let lock = self.lock_for(ReloadScope::TableView);
        let _guard = lock.lock().await;

        let table_oid = match self.displayed_table() {
            Some(t) => t,
            None => { return Err(error::Error::MissingContextError("No table is displayed.".into())); }
        };
        self.view.borrow_mut().set_page_num(page_num);
        return self.load_table(table_oid).await;
    }

    /// Rebuilds the whole grid if the table is the one displayed.
    pub async fn reload_table(&self, table_oid: i64) -> Result<(), error::Error> {
        let lock = self.lock_for(ReloadScope::TableView);
        let _guard = lock.lock().await;

        if self.displayed_table() != Some(table_oid) {
            tracing::debug!(table_oid, "change to a table that is not displayed ignored");
            return Ok(());
        }
        return self.load_table(table_oid).await;
    }

    /// Refreshes a single row of the grid if its table is the one displayed.
    pub async fn reload_row(&self, table_oid: i64, row_oid: i64) -> Result<(), error::Error> {
        let lock = self.lock_for(ReloadScope::TableView);
        let _guard = lock.lock().await;

        if self.displayed_table() != Some(table_oid) {
            tracing::debug!(table_oid, row_oid, "change to a row of a table that is not displayed ignored");
            return Ok(());
        }

        tracing::debug!(table_oid, row_oid, "reloading row");
        let loader = RowLoader {
            view: self.view.clone(),
            row_oid
        };
        return self.gateway.table_row(table_oid, row_oid, loader).await;
    }

    /// Queries columns, dropdown options and the current page, replacing the grid's contents.
    /// Must be called with the table view lock held.
    async fn load_table(&self, table_oid: i64) -> Result<(), error::Error> {
        let page_num = self.view.borrow().page_num();
        tracing::debug!(table_oid, page_num, page_size = self.page_size, "reloading table");

        // Columns are fetched before the grid is touched, so a failure leaves the old contents
        let columns = self.gateway.column_list(table_oid).await?;
        let mut dropdown_options: HashMap<i64, Vec<DropdownValue>> = HashMap::new();
        for column in columns.iter() {
            if column.column_type.edit_affordance() == EditAffordance::Selector {
                let values = self.gateway.dropdown_values(column.oid).await?;
                dropdown_options.insert(column.oid, values);
            }
        }

        {
            let mut view = self.view.borrow_mut();
            view.clear(table_oid);
            view.set_columns(columns, dropdown_options);
        }

        let loader = GridLoader { view: self.view.clone() };
        self.gateway.table_data(table_oid, page_num, self.page_size, loader).await?;
        tracing::debug!(table_oid, rows = self.view.borrow().rows().len(), "table reloaded");
        return Ok(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_decode_to_notifications() {
        assert_eq!(Notification::from_event("update-table-list", "null").unwrap(), Some(Notification::TableListChanged));
        assert_eq!(Notification::from_event("update-table-data", "4").unwrap(), Some(Notification::TableDataChanged { table_oid: 4 }));
        assert_eq!(
            Notification::from_event("update-table-row", "[4, 19]").unwrap(),
            Some(Notification::TableRowChanged { table_oid: 4, row_oid: 19 })
        );
        assert_eq!(Notification::from_event("window-focus", "").unwrap(), None);
        assert!(Notification::from_event("update-table-data", "\"four\"").is_err());
    }

    #[test]
    fn list_scopes_lock_apart_from_the_grid() {
        for scope in [ListScope::TableList, ListScope::ReportList, ListScope::ObjectTypeList] {
            assert_ne!(ReloadScope::from(scope), ReloadScope::TableView);
        }
    }
}
