use std::collections::HashMap;
use serde::{Serialize, Deserialize};
use crate::frontend::action::Action;
use crate::frontend::column_type::{MetadataColumnType, Primitive};
use crate::frontend::query::{ColumnMetadata, DropdownValue};
use crate::util::error;


/// The kinds of dialog window the editor opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    CreateTable,
    CreateTableColumn,
    EditTableColumn,
    EditDropdownValues,
}

/// A request to open a dialog, with the parameters that identify what the dialog acts on.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DialogRequest {
    CreateTable,
    CreateTableColumn {
        table_oid: i64,
        column_ordering: Option<i64>
    },
    EditTableColumn {
        table_oid: i64,
        column_oid: i64
    },
    EditDropdownValues {
        table_oid: i64,
        column_oid: i64
    },
}

/// Reads a required integer parameter.
fn required_param(params: &HashMap<&str, &str>, name: &str) -> Result<i64, error::Error> {
    match params.get(name) {
        Some(value) => {
            match value.parse::<i64>() {
                Ok(v) => { return Ok(v); },
                Err(_) => { return Err(error::Error::MissingContextError(format!("Parameter {name} is not an integer."))); }
            }
        },
        None => {
            return Err(error::Error::MissingContextError(format!("Parameter {name} is missing.")));
        }
    }
}

impl DialogRequest {
    /// Rebuilds the request a dialog window was opened with from its URL query string,
    /// e.g. `table_oid=3&column_oid=12`.
    pub fn from_query(kind: DialogKind, query: &str) -> Result<Self, error::Error> {
        let params: HashMap<&str, &str> = query
            .trim_start_matches('?')
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .collect();

        return match kind {
            DialogKind::CreateTable => Ok(Self::CreateTable),
            DialogKind::CreateTableColumn => Ok(Self::CreateTableColumn {
                table_oid: required_param(&params, "table_oid")?,
                column_ordering: match params.get("column_ordering") {
                    Some(_) => Some(required_param(&params, "column_ordering")?),
                    None => None
                }
            }),
            DialogKind::EditTableColumn => Ok(Self::EditTableColumn {
                table_oid: required_param(&params, "table_oid")?,
                column_oid: required_param(&params, "column_oid")?
            }),
            DialogKind::EditDropdownValues => Ok(Self::EditDropdownValues {
                table_oid: required_param(&params, "table_oid")?,
                column_oid: required_param(&params, "column_oid")?
            }),
        };
    }

    pub fn title(&self) -> &'static str {
        return match self {
            Self::CreateTable => "Create New Table",
            Self::CreateTableColumn { .. } => "Add New Column",
            Self::EditTableColumn { .. } => "Edit Column",
            Self::EditDropdownValues { .. } => "Edit Dropdown Values",
        };
    }
}


/// Input of the create-table dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableForm {
    pub table_name: String,
}

impl TableForm {
    pub fn to_action(&self) -> Result<Action, error::Error> {
        let table_name = self.table_name.trim();
        if table_name.is_empty() {
            return Err(error::Error::InputError("Table name cannot be empty.".into()));
        }
        return Ok(Action::CreateTable { table_name: table_name.to_string() });
    }
}


/// Input of the create/edit column dialog.
///
/// The unique and primary key modifiers are kept consistent with the selected type at all times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnForm {
    table_oid: i64,
    column_oid: Option<i64>,
    column_ordering: Option<i64>,
    pub column_name: String,
    pub column_style: String,
    type_mode: i64,
    type_oid: Option<i64>,
    pub is_nullable: bool,
    is_unique: bool,
    is_primary_key: bool,
}

impl ColumnForm {
    /// A blank form for adding a column at the given position (or at the end).
    pub fn create(table_oid: i64, column_ordering: Option<i64>) -> Self {
        let text = MetadataColumnType::Primitive(Primitive::Text);
        return ColumnForm {
            table_oid,
            column_oid: None,
            column_ordering,
            column_name: String::new(),
            column_style: String::from("width: 100px;"),
            type_mode: text.get_type_mode(),
            type_oid: Some(text.get_type_oid()),
            is_nullable: true,
            is_unique: false,
            is_primary_key: false,
        };
    }

    /// A form populated from an existing column.
    pub fn edit(table_oid: i64, metadata: &ColumnMetadata) -> Self {
        let mut form = ColumnForm {
            table_oid,
            column_oid: Some(metadata.oid),
            column_ordering: Some(metadata.column_ordering),
            column_name: metadata.name.clone(),
            column_style: metadata.column_style.clone(),
            type_mode: metadata.column_type.get_type_mode(),
            type_oid: Some(metadata.column_type.get_type_oid()),
            is_nullable: metadata.is_nullable,
            is_unique: false,
            is_primary_key: false,
        };
        form.set_unique(metadata.is_unique);
        form.set_primary_key(metadata.is_primary_key);
        return form;
    }

    pub fn is_edit(&self) -> bool {
        return self.column_oid.is_some();
    }

    /// Selects a type by mode and, where one is needed, the OID of the target table or type.
    ///
    /// Dropdown and child table types get their OID from the store when created, so `None`
    /// is acceptable for them.
    pub fn select_type(&mut self, type_mode: i64, type_oid: Option<i64>) {
        self.type_mode = type_mode;
        self.type_oid = type_oid;

        let (is_unique, is_primary_key) = self.column_type().constraints().apply(self.is_unique, self.is_primary_key);
        self.is_unique = is_unique;
        self.is_primary_key = is_primary_key;
    }

    pub fn set_column_type(&mut self, column_type: MetadataColumnType) {
        self.select_type(column_type.get_type_mode(), Some(column_type.get_type_oid()));
    }

    /// The selected type. A missing target OID reads as 0.
    pub fn column_type(&self) -> MetadataColumnType {
        return MetadataColumnType::from_parts(self.type_oid.unwrap_or(0), self.type_mode);
    }

    pub fn set_unique(&mut self, is_unique: bool) {
        self.is_unique = is_unique && self.unique_enabled();
    }

    pub fn set_primary_key(&mut self, is_primary_key: bool) {
        self.is_primary_key = is_primary_key && self.primary_key_enabled();
    }

    pub fn is_unique(&self) -> bool {
        return self.is_unique;
    }

    pub fn is_primary_key(&self) -> bool {
        return self.is_primary_key;
    }

    /// Whether the unique checkbox can be ticked for the selected type.
    pub fn unique_enabled(&self) -> bool {
        return self.column_type().constraints().allows_unique;
    }

    /// Whether the primary key checkbox can be ticked for the selected type.
    pub fn primary_key_enabled(&self) -> bool {
        return self.column_type().constraints().allows_primary_key;
    }

    /// Checks the input and builds the action that creates or edits the column.
    pub fn to_action(&self) -> Result<Action, error::Error> {
        let column_name = self.column_name.trim();
        if column_name.is_empty() {
            return Err(error::Error::InputError("Column name cannot be empty.".into()));
        }

        let column_type = self.column_type();
        if column_type.requires_target() && self.type_oid.is_none() {
            return Err(error::Error::InputError(match column_type {
                MetadataColumnType::ChildObject(_) => "An object type must be selected.".into(),
                _ => "A table must be selected for the reference.".into()
            }));
        }

        let (is_unique, is_primary_key) = column_type.constraints().apply(self.is_unique, self.is_primary_key);
        match self.column_oid {
            Some(column_oid) => {
                return Ok(Action::EditTableColumnMetadata {
                    table_oid: self.table_oid,
                    column_oid,
                    column_name: column_name.to_string(),
                    column_type,
                    column_style: self.column_style.clone(),
                    is_nullable: self.is_nullable,
                    is_unique,
                    is_primary_key
                });
            },
            None => {
                return Ok(Action::CreateTableColumn {
                    table_oid: self.table_oid,
                    column_name: column_name.to_string(),
                    column_type,
                    column_style: self.column_style.clone(),
                    column_ordering: self.column_ordering,
                    is_nullable: self.is_nullable,
                    is_unique,
                    is_primary_key
                });
            }
        }
    }
}


/// Input of the dialog that edits the allowed values of a dropdown column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownForm {
    table_oid: i64,
    column_oid: i64,
    pub values: Vec<DropdownValue>,
}

impl DropdownForm {
    pub fn new(table_oid: i64, column_oid: i64, values: Vec<DropdownValue>) -> Self {
        return DropdownForm { table_oid, column_oid, values };
    }

    /// Adds a new value; the store assigns its stored value.
    pub fn push_value(&mut self, display_value: &str) {
        self.values.push(DropdownValue {
            true_value: None,
            display_value: Some(display_value.to_string())
        });
    }

    pub fn remove_value(&mut self, index: usize) -> Option<DropdownValue> {
        if index < self.values.len() {
            return Some(self.values.remove(index));
        }
        return None;
    }

    /// Builds the action replacing the column's values. Blank entries are left out.
    pub fn to_action(&self) -> Action {
        let dropdown_values: Vec<DropdownValue> = self.values
            .iter()
            .filter(|v| v.display_value.as_deref().map(|d| !d.trim().is_empty()).unwrap_or(false))
            .cloned()
            .collect();
        return Action::EditTableColumnDropdownValues {
            table_oid: self.table_oid,
            column_oid: self.column_oid,
            dropdown_values
        };
    }
}
