use std::cell::RefCell;
use std::rc::Rc;
use async_trait::async_trait;
use serde::{Serialize, Deserialize};
use crate::frontend::action::Action;
use crate::frontend::cell::Cell;
use crate::frontend::channel::Channel;
use crate::frontend::column_type::MetadataColumnType;
use crate::frontend::dialog::DialogRequest;
use crate::util::error;


#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
/// Identity and name of a table, report or object type.
pub struct BasicMetadata {
    pub oid: i64,
    pub name: String
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMetadata {
    pub oid: i64,
    pub name: String,
    pub column_ordering: i64,
    pub column_style: String,
    pub column_type: MetadataColumnType,
    pub is_nullable: bool,
    pub is_unique: bool,
    pub is_primary_key: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
/// A value for a dropdown (i.e. single-select dropdown, multi-select dropdown, reference).
pub struct DropdownValue {
    pub true_value: Option<String>,
    pub display_value: Option<String>
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
/// The value of one column in a streamed row.
pub struct CellValue {
    pub column_oid: i64,
    pub column_type: MetadataColumnType,
    pub true_value: Option<String>,
    pub display_value: Option<String>,
    #[serde(default)]
    pub failed_validations: Vec<error::FailedValidation>
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", untagged)]
/// Item streamed by a paged table data query.
pub enum GridItem {
    RowStart {
        row_oid: i64,
        row_index: i64
    },
    ColumnValue(CellValue)
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", untagged)]
/// Item streamed by a single-row query.
pub enum RowItem {
    RowExists {
        row_exists: bool
    },
    ColumnValue(CellValue)
}


/// The request boundary to the store that holds the tables.
///
/// List-shaped reads push their results through the channel they are given and resolve once
/// everything has been sent. Rejections carry the store's message in [`error::Error::StoreError`].
#[async_trait(?Send)]
pub trait Backend {
    async fn get_table_list(&self, table_channel: Channel<BasicMetadata>) -> Result<(), error::Error>;
    async fn get_report_list(&self, report_channel: Channel<BasicMetadata>) -> Result<(), error::Error>;
    async fn get_object_type_list(&self, obj_type_channel: Channel<BasicMetadata>) -> Result<(), error::Error>;
    async fn get_table_column_list(&self, table_oid: i64, column_channel: Channel<ColumnMetadata>) -> Result<(), error::Error>;
    async fn get_table_column(&self, column_oid: i64) -> Result<Option<ColumnMetadata>, error::Error>;
    async fn get_table_column_dropdown_values(&self, column_oid: i64, dropdown_value_channel: Channel<DropdownValue>) -> Result<(), error::Error>;
    async fn get_table_data(&self, table_oid: i64, page_num: i64, page_size: i64, cell_channel: Channel<GridItem>) -> Result<(), error::Error>;
    async fn get_table_row(&self, table_oid: i64, row_oid: i64, cell_channel: Channel<RowItem>) -> Result<(), error::Error>;
    async fn execute(&self, action: Action) -> Result<(), error::Error>;
    async fn undo(&self) -> Result<(), error::Error>;
    async fn dialog_open(&self, dialog: DialogRequest) -> Result<(), error::Error>;
    async fn dialog_close(&self) -> Result<(), error::Error>;
}

/// Receives the rows of a paged table data query as they stream in.
pub trait GridConsumer {
    fn begin_row(&mut self, row_oid: i64, row_index: i64) -> Result<(), error::Error>;
    fn cell(&mut self, cell: Cell) -> Result<(), error::Error>;
}

/// Receives the result of a single-row query as it streams in.
pub trait RowConsumer {
    fn row_exists(&mut self, exists: bool) -> Result<(), error::Error>;
    fn cell(&mut self, cell: Cell) -> Result<(), error::Error>;
}


/// Read-only requests to the store.
pub struct QueryGateway<B: Backend> {
    backend: Rc<B>
}

impl<B: Backend> Clone for QueryGateway<B> {
    fn clone(&self) -> Self {
        QueryGateway { backend: self.backend.clone() }
    }
}

/// Creates a channel that appends every item to a shared list.
fn collector<T: 'static>() -> (Channel<T>, Rc<RefCell<Vec<T>>>) {
    let items: Rc<RefCell<Vec<T>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = items.clone();
    let channel = Channel::with_handler(move |item| {
        sink.borrow_mut().push(item);
        return Ok(());
    });
    return (channel, items);
}

fn take<T>(items: &Rc<RefCell<Vec<T>>>) -> Vec<T> {
    return std::mem::take(&mut *items.borrow_mut());
}

impl<B: Backend> QueryGateway<B> {
    pub fn new(backend: Rc<B>) -> Self {
        QueryGateway { backend }
    }

    /// Gets the list of tables.
    pub async fn table_list(&self) -> Result<Vec<BasicMetadata>, error::Error> {
        let (channel, items) = collector();
        self.backend.get_table_list(channel).await?;
        return Ok(take(&items));
    }

    /// Gets the list of reports.
    pub async fn report_list(&self) -> Result<Vec<BasicMetadata>, error::Error> {
        let (channel, items) = collector();
        self.backend.get_report_list(channel).await?;
        return Ok(take(&items));
    }

    /// Gets the list of object types.
    pub async fn object_type_list(&self) -> Result<Vec<BasicMetadata>, error::Error> {
        let (channel, items) = collector();
        self.backend.get_object_type_list(channel).await?;
        return Ok(take(&items));
    }

    /// Gets the columns of a table, left to right.
    pub async fn column_list(&self, table_oid: i64) -> Result<Vec<ColumnMetadata>, error::Error> {
        let (channel, items) = collector();
        self.backend.get_table_column_list(table_oid, channel).await?;

        // Columns are not guaranteed to arrive in display order
        let mut columns: Vec<ColumnMetadata> = take(&items);
        columns.sort_by_key(|c| (c.column_ordering, c.oid));
        return Ok(columns);
    }

    /// Gets the metadata of a single column.
    pub async fn column(&self, column_oid: i64) -> Result<ColumnMetadata, error::Error> {
        match self.backend.get_table_column(column_oid).await? {
            Some(metadata) => { return Ok(metadata); },
            None => { return Err(error::Error::MissingContextError(format!("Column {column_oid} does not exist."))); }
        }
    }

    /// Gets the allowed values of a dropdown or reference column.
    pub async fn dropdown_values(&self, column_oid: i64) -> Result<Vec<DropdownValue>, error::Error> {
        let (channel, items) = collector();
        self.backend.get_table_column_dropdown_values(column_oid, channel).await?;
        return Ok(take(&items));
    }

    /// Streams one page of a table's data into a consumer.
    ///
    /// A cell only belongs to the row most recently started in this stream; cells that arrive
    /// before any row has started are dropped.
    pub async fn table_data<C>(&self, table_oid: i64, page_num: i64, page_size: i64, mut consumer: C) -> Result<(), error::Error>
    where
        C: GridConsumer + 'static
    {
        let mut current_row_oid: Option<i64> = None;
        let cell_channel = Channel::with_handler(move |item: GridItem| {
            match item {
                GridItem::RowStart { row_oid, row_index } => {
                    current_row_oid = Some(row_oid);
                    return consumer.begin_row(row_oid, row_index);
                },
                GridItem::ColumnValue(value) => {
                    match current_row_oid {
                        Some(row_oid) => {
                            return consumer.cell(Cell::from_value(table_oid, row_oid, value));
                        },
                        None => {
                            tracing::debug!(table_oid, column_oid = value.column_oid, "cell received before any row start was dropped");
                            return Ok(());
                        }
                    }
                }
            }
        });
        return self.backend.get_table_data(table_oid, page_num, page_size, cell_channel).await;
    }

    /// Streams a single row into a consumer.
    ///
    /// The first item tells whether the row exists. Cells are only passed on after the row
    /// has been reported to exist.
    pub async fn table_row<C>(&self, table_oid: i64, row_oid: i64, mut consumer: C) -> Result<(), error::Error>
    where
        C: RowConsumer + 'static
    {
        let mut row_exists: Option<bool> = None;
        let cell_channel = Channel::with_handler(move |item: RowItem| {
            match item {
                RowItem::RowExists { row_exists: exists } => {
                    if row_exists.is_some() {
                        tracing::debug!(table_oid, row_oid, "repeated row existence item was dropped");
                        return Ok(());
                    }
                    row_exists = Some(exists);
                    return consumer.row_exists(exists);
                },
                RowItem::ColumnValue(value) => {
                    if row_exists == Some(true) {
                        return consumer.cell(Cell::from_value(table_oid, row_oid, value));
                    }
                    tracing::debug!(table_oid, row_oid, column_oid = value.column_oid, "cell of a row not known to exist was dropped");
                    return Ok(());
                }
            }
        });
        return self.backend.get_table_row(table_oid, row_oid, cell_channel).await;
    }
}
