#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use async_trait::async_trait;
use dungeon_db_frontend::frontend::action::Action;
use dungeon_db_frontend::frontend::channel::Channel;
use dungeon_db_frontend::frontend::column_type::{MetadataColumnType, Primitive};
use dungeon_db_frontend::frontend::dialog::DialogRequest;
use dungeon_db_frontend::frontend::query::{Backend, BasicMetadata, CellValue, ColumnMetadata, DropdownValue, GridItem, RowItem};
use dungeon_db_frontend::frontend::view::{Renderer, ViewEvent};
use dungeon_db_frontend::util::error::{Error, ErrorReporter};


/// Requests the fake store has received, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Execute(Action),
    Undo,
    DialogOpen(DialogRequest),
    DialogClose,
}

/// In-memory store whose responses are scripted by the test.
///
/// Streamed reads yield to the scheduler after every item, so concurrent reloads get a
/// chance to interleave if nothing keeps them apart.
#[derive(Default)]
pub struct FakeBackend {
    pub tables: RefCell<Vec<BasicMetadata>>,
    pub reports: RefCell<Vec<BasicMetadata>>,
    pub object_types: RefCell<Vec<BasicMetadata>>,
    pub columns: RefCell<HashMap<i64, Vec<ColumnMetadata>>>,
    pub dropdown_values: RefCell<HashMap<i64, Vec<DropdownValue>>>,
    pub grid: RefCell<HashMap<i64, Vec<GridItem>>>,
    pub rows: RefCell<HashMap<(i64, i64), Vec<RowItem>>>,
    pub requests: RefCell<Vec<Request>>,
    /// Page numbers of every grid query, in order
    pub pages: RefCell<Vec<i64>>,
    /// When set, every mutating request is rejected with this message
    pub reject_with: RefCell<Option<String>>,
    /// When set, grid queries fail with this message after streaming their items
    pub fail_reads_with: RefCell<Option<String>>,
}

impl FakeBackend {
    pub fn new() -> Rc<Self> {
        return Rc::new(Self::default());
    }

    pub fn executed(&self) -> Vec<Action> {
        return self.requests
            .borrow()
            .iter()
            .filter_map(|r| match r {
                Request::Execute(a) => Some(a.clone()),
                _ => None
            })
            .collect();
    }

    pub fn undo_count(&self) -> usize {
        return self.requests.borrow().iter().filter(|r| **r == Request::Undo).count();
    }

    pub fn reject(&self, message: &str) {
        *self.reject_with.borrow_mut() = Some(message.to_string());
    }

    pub fn fail_reads(&self, message: &str) {
        *self.fail_reads_with.borrow_mut() = Some(message.to_string());
    }

    fn record(&self, request: Request) -> Result<(), Error> {
        self.requests.borrow_mut().push(request);
        match self.reject_with.borrow().as_ref() {
            Some(message) => { return Err(Error::StoreError(message.clone())); },
            None => { return Ok(()); }
        }
    }

    async fn stream<T: Clone>(items: Vec<T>, channel: Channel<T>) {
        for item in items {
            channel.send(item);
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait(?Send)]
impl Backend for FakeBackend {
    async fn get_table_list(&self, table_channel: Channel<BasicMetadata>) -> Result<(), Error> {
        let items = self.tables.borrow().clone();
        Self::stream(items, table_channel).await;
        return Ok(());
    }

    async fn get_report_list(&self, report_channel: Channel<BasicMetadata>) -> Result<(), Error> {
        let items = self.reports.borrow().clone();
        Self::stream(items, report_channel).await;
        return Ok(());
    }

    async fn get_object_type_list(&self, obj_type_channel: Channel<BasicMetadata>) -> Result<(), Error> {
        let items = self.object_types.borrow().clone();
        Self::stream(items, obj_type_channel).await;
        return Ok(());
    }

    async fn get_table_column_list(&self, table_oid: i64, column_channel: Channel<ColumnMetadata>) -> Result<(), Error> {
        let items = self.columns.borrow().get(&table_oid).cloned().unwrap_or_default();
        Self::stream(items, column_channel).await;
        return Ok(());
    }

    async fn get_table_column(&self, column_oid: i64) -> Result<Option<ColumnMetadata>, Error> {
        return Ok(self.columns
            .borrow()
            .values()
            .flatten()
            .find(|c| c.oid == column_oid)
            .cloned());
    }

    async fn get_table_column_dropdown_values(&self, column_oid: i64, dropdown_value_channel: Channel<DropdownValue>) -> Result<(), Error> {
        let items = self.dropdown_values.borrow().get(&column_oid).cloned().unwrap_or_default();
        Self::stream(items, dropdown_value_channel).await;
        return Ok(());
    }

    async fn get_table_data(&self, table_oid: i64, page_num: i64, _page_size: i64, cell_channel: Channel<GridItem>) -> Result<(), Error> {
        self.pages.borrow_mut().push(page_num);
        let items = self.grid.borrow().get(&table_oid).cloned().unwrap_or_default();
        Self::stream(items, cell_channel).await;
        let failure = self.fail_reads_with.borrow().clone();
        match failure {
            Some(message) => { return Err(Error::StoreError(message)); },
            None => { return Ok(()); }
        }
    }

    async fn get_table_row(&self, table_oid: i64, row_oid: i64, cell_channel: Channel<RowItem>) -> Result<(), Error> {
        let items = self.rows
            .borrow()
            .get(&(table_oid, row_oid))
            .cloned()
            .unwrap_or_else(|| vec![RowItem::RowExists { row_exists: false }]);
        Self::stream(items, cell_channel).await;
        return Ok(());
    }

    async fn execute(&self, action: Action) -> Result<(), Error> {
        return self.record(Request::Execute(action));
    }

    async fn undo(&self) -> Result<(), Error> {
        return self.record(Request::Undo);
    }

    async fn dialog_open(&self, dialog: DialogRequest) -> Result<(), Error> {
        self.requests.borrow_mut().push(Request::DialogOpen(dialog));
        return Ok(());
    }

    async fn dialog_close(&self) -> Result<(), Error> {
        self.requests.borrow_mut().push(Request::DialogClose);
        return Ok(());
    }
}


/// Renderer that keeps every view event.
#[derive(Clone, Default)]
pub struct Recorder {
    pub events: Rc<RefCell<Vec<ViewEvent>>>,
}

impl Renderer for Recorder {
    fn apply(&mut self, event: &ViewEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

/// Reporter that keeps every (title, message) it is shown.
#[derive(Default)]
pub struct Reports {
    pub shown: RefCell<Vec<(String, String)>>,
}

impl ErrorReporter for Reports {
    fn report(&self, title: &str, error: &Error) {
        self.shown.borrow_mut().push((title.to_string(), error.to_string()));
    }
}


pub fn text_column(oid: i64, name: &str, column_ordering: i64) -> ColumnMetadata {
    return column(oid, name, column_ordering, MetadataColumnType::Primitive(Primitive::Text));
}

pub fn column(oid: i64, name: &str, column_ordering: i64, column_type: MetadataColumnType) -> ColumnMetadata {
    return ColumnMetadata {
        oid,
        name: name.to_string(),
        column_ordering,
        column_style: String::from("width: 100px;"),
        column_type,
        is_nullable: true,
        is_unique: false,
        is_primary_key: false,
    };
}

pub fn text_value(column_oid: i64, value: &str) -> CellValue {
    return CellValue {
        column_oid,
        column_type: MetadataColumnType::Primitive(Primitive::Text),
        true_value: Some(value.to_string()),
        display_value: Some(value.to_string()),
        failed_validations: Vec::new(),
    };
}

pub fn row_start(row_oid: i64, row_index: i64) -> GridItem {
    return GridItem::RowStart { row_oid, row_index };
}

pub fn grid_cell(column_oid: i64, value: &str) -> GridItem {
    return GridItem::ColumnValue(text_value(column_oid, value));
}

pub fn row_cell(column_oid: i64, value: &str) -> RowItem {
    return RowItem::ColumnValue(text_value(column_oid, value));
}
