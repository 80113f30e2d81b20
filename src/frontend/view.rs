use std::collections::HashMap;
use crate::frontend::cell::{self, Cell, RenderedCell};
use crate::frontend::query::{ColumnMetadata, DropdownValue};


/// A mutation of the table view, as reported to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// All rows and columns were removed and the view now shows this table.
    Cleared { table_oid: i64 },
    ColumnsSet { column_oids: Vec<i64> },
    RowAppended { row_oid: i64, row_index: i64 },
    RowCleared { row_oid: i64 },
    CellRendered { row_oid: i64, column_oid: i64 },
    RowRemoved { row_oid: i64 },
}

/// Draws the view tree. It is told about every mutation of the view, in order.
pub trait Renderer {
    fn apply(&mut self, event: &ViewEvent);
}

/// Renderer for a view that is not displayed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn apply(&mut self, _event: &ViewEvent) {}
}


/// One displayed row of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct RowNode {
    pub row_oid: i64,
    /// 1-based position shown to the user
    pub row_index: i64,
    cells: Vec<RenderedCell>,
    cell_positions: HashMap<i64, usize>,
}

impl RowNode {
    fn new(row_oid: i64, row_index: i64) -> Self {
        RowNode {
            row_oid,
            row_index,
            cells: Vec::new(),
            cell_positions: HashMap::new(),
        }
    }

    /// The row's cells in the order they were streamed.
    pub fn cells(&self) -> &[RenderedCell] {
        return &self.cells;
    }

    pub fn cell(&self, column_oid: i64) -> Option<&RenderedCell> {
        return self.cell_positions.get(&column_oid).map(|&i| &self.cells[i]);
    }

    fn clear(&mut self) {
        self.cells.clear();
        self.cell_positions.clear();
    }

    fn put(&mut self, rendered: RenderedCell) {
        let column_oid = rendered.cell.column_oid;
        match self.cell_positions.get(&column_oid) {
            Some(&i) => {
                self.cells[i] = rendered;
            },
            None => {
                self.cell_positions.insert(column_oid, self.cells.len());
                self.cells.push(rendered);
            }
        }
    }
}


/// The data grid of the currently displayed table.
///
/// Rows, columns and cells are looked up through id → position indexes.
pub struct TableView {
    table_oid: Option<i64>,
    page_num: i64,
    columns: Vec<ColumnMetadata>,
    column_positions: HashMap<i64, usize>,
    dropdown_options: HashMap<i64, Vec<DropdownValue>>,
    rows: Vec<RowNode>,
    row_positions: HashMap<i64, usize>,
    renderer: Box<dyn Renderer>,
}

impl TableView {
    pub fn new(renderer: Box<dyn Renderer>) -> Self {
        TableView {
            table_oid: None,
            page_num: 1,
            columns: Vec::new(),
            column_positions: HashMap::new(),
            dropdown_options: HashMap::new(),
            rows: Vec::new(),
            row_positions: HashMap::new(),
            renderer,
        }
    }

    /// The table being displayed, if any.
    pub fn table_oid(&self) -> Option<i64> {
        return self.table_oid;
    }

    pub fn page_num(&self) -> i64 {
        return self.page_num;
    }

    pub fn set_page_num(&mut self, page_num: i64) {
        self.page_num = page_num;
    }

    /// Displays a different table. The view is emptied; its contents come from the next reload.
    pub fn show_table(&mut self, table_oid: i64, page_num: i64) {
        self.page_num = page_num;
        self.clear(table_oid);
    }

    pub fn columns(&self) -> &[ColumnMetadata] {
        return &self.columns;
    }

    pub fn column(&self, column_oid: i64) -> Option<&ColumnMetadata> {
        return self.column_positions.get(&column_oid).map(|&i| &self.columns[i]);
    }

    pub fn rows(&self) -> &[RowNode] {
        return &self.rows;
    }

    pub fn row(&self, row_oid: i64) -> Option<&RowNode> {
        return self.row_positions.get(&row_oid).map(|&i| &self.rows[i]);
    }

    pub fn dropdown_options(&self, column_oid: i64) -> Option<&[DropdownValue]> {
        return self.dropdown_options.get(&column_oid).map(|v| v.as_slice());
    }

    /// Removes every row and column.
    pub fn clear(&mut self, table_oid: i64) {
        self.table_oid = Some(table_oid);
        self.columns.clear();
        self.column_positions.clear();
        self.dropdown_options.clear();
        self.rows.clear();
        self.row_positions.clear();
        self.renderer.apply(&ViewEvent::Cleared { table_oid });
    }

    /// Replaces the columns, which must already be in display order.
    pub fn set_columns(&mut self, columns: Vec<ColumnMetadata>, dropdown_options: HashMap<i64, Vec<DropdownValue>>) {
        self.column_positions = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.oid, i))
            .collect();
        self.columns = columns;
        self.dropdown_options = dropdown_options;
        self.renderer.apply(&ViewEvent::ColumnsSet {
            column_oids: self.columns.iter().map(|c| c.oid).collect()
        });
    }

    /// Adds an empty row after the last one.
    pub fn append_row(&mut self, row_oid: i64, row_index: i64) {
        if let Some(&i) = self.row_positions.get(&row_oid) {
            // A row appears once; a repeated start replaces its contents
            self.rows[i].row_index = row_index;
            self.clear_row(row_oid);
            return;
        }
        self.row_positions.insert(row_oid, self.rows.len());
        self.rows.push(RowNode::new(row_oid, row_index));
        self.renderer.apply(&ViewEvent::RowAppended { row_oid, row_index });
    }

    /// Adds an empty row after the last one, numbered after it.
    pub fn push_row(&mut self, row_oid: i64) {
        let row_index = self.rows.last().map(|r| r.row_index + 1).unwrap_or(1);
        self.append_row(row_oid, row_index);
    }

    /// Removes a row's cells, keeping the row in place.
    pub fn clear_row(&mut self, row_oid: i64) -> bool {
        match self.row_positions.get(&row_oid) {
            Some(&i) => {
                self.rows[i].clear();
                self.renderer.apply(&ViewEvent::RowCleared { row_oid });
                return true;
            },
            None => {
                return false;
            }
        }
    }

    pub fn remove_row(&mut self, row_oid: i64) -> bool {
        match self.row_positions.remove(&row_oid) {
            Some(i) => {
                self.rows.remove(i);
                for (j, row) in self.rows.iter().enumerate().skip(i) {
                    self.row_positions.insert(row.row_oid, j);
                }
                self.renderer.apply(&ViewEvent::RowRemoved { row_oid });
                return true;
            },
            None => {
                return false;
            }
        }
    }

    /// Renders a streamed cell into its row.
    pub fn put_cell(&mut self, cell: Cell) -> bool {
        let i = match self.row_positions.get(&cell.row_oid) {
            Some(&i) => i,
            None => {
                tracing::debug!(row_oid = cell.row_oid, column_oid = cell.column_oid, "cell for a row not in the view was dropped");
                return false;
            }
        };

        let (row_oid, column_oid) = (cell.row_oid, cell.column_oid);
        let rendered = cell::render_cell(cell, self.dropdown_options(column_oid));
        self.rows[i].put(rendered);
        self.renderer.apply(&ViewEvent::CellRendered { row_oid, column_oid });
        return true;
    }
}
