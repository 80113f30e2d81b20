use serde::{Serialize, Deserialize};
use crate::frontend::column_type::MetadataColumnType;
use crate::frontend::query::DropdownValue;

/// A complete, replayable description of one mutation of the store.
///
/// Actions carry every identifier they need; none of them refers back to view state.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Action {
    CreateTable {
        table_name: String
    },
    DeleteTable {
        table_oid: i64
    },
    CreateTableColumn {
        table_oid: i64,
        column_name: String,
        column_type: MetadataColumnType,
        column_style: String,
        /// `None` appends the column after the last one
        column_ordering: Option<i64>,
        is_nullable: bool,
        is_unique: bool,
        is_primary_key: bool
    },
    EditTableColumnMetadata {
        table_oid: i64,
        column_oid: i64,
        column_name: String,
        column_type: MetadataColumnType,
        column_style: String,
        is_nullable: bool,
        is_unique: bool,
        is_primary_key: bool
    },
    DeleteTableColumn {
        table_oid: i64,
        column_oid: i64
    },
    EditTableColumnDropdownValues {
        table_oid: i64,
        column_oid: i64,
        dropdown_values: Vec<DropdownValue>
    },
    PushTableRow {
        table_oid: i64
    },
    InsertTableRow {
        table_oid: i64,
        row_oid: i64
    },
    DeleteTableRow {
        table_oid: i64,
        row_oid: i64
    },
    UpdateTableCellStoredAsPrimitiveValue {
        table_oid: i64,
        row_oid: i64,
        column_oid: i64,
        value: Option<String>
    },
}

impl Action {
    /// The table the action mutates, if it targets an existing one.
    pub fn table_oid(&self) -> Option<i64> {
        return match self {
            Self::CreateTable { .. } => None,
            Self::DeleteTable { table_oid }
            | Self::CreateTableColumn { table_oid, .. }
            | Self::EditTableColumnMetadata { table_oid, .. }
            | Self::DeleteTableColumn { table_oid, .. }
            | Self::EditTableColumnDropdownValues { table_oid, .. }
            | Self::PushTableRow { table_oid }
            | Self::InsertTableRow { table_oid, .. }
            | Self::DeleteTableRow { table_oid, .. }
            | Self::UpdateTableCellStoredAsPrimitiveValue { table_oid, .. } => Some(*table_oid),
        }
    }

    /// What the action does, phrased to follow "while".
    pub fn description(&self) -> &'static str {
        return match self {
            Self::CreateTable { .. } => "creating table",
            Self::DeleteTable { .. } => "deleting table",
            Self::CreateTableColumn { .. } => "creating column",
            Self::EditTableColumnMetadata { .. } => "editing column",
            Self::DeleteTableColumn { .. } => "deleting column",
            Self::EditTableColumnDropdownValues { .. } => "editing dropdown values",
            Self::PushTableRow { .. } => "adding row",
            Self::InsertTableRow { .. } => "inserting row",
            Self::DeleteTableRow { .. } => "deleting row",
            Self::UpdateTableCellStoredAsPrimitiveValue { .. } => "updating cell",
        }
    }

    /// Title of the message shown when the store rejects the action.
    pub fn error_title(&self) -> String {
        return format!("Error while {}.", self.description());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_is_camel_case() {
        let action = Action::UpdateTableCellStoredAsPrimitiveValue {
            table_oid: 1,
            row_oid: 2,
            column_oid: 3,
            value: None
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json, serde_json::json!({
            "updateTableCellStoredAsPrimitiveValue": {
                "tableOid": 1,
                "rowOid": 2,
                "columnOid": 3,
                "value": null
            }
        }));
    }

    #[test]
    fn titles() {
        let action = Action::DeleteTableRow { table_oid: 4, row_oid: 9 };
        assert_eq!(action.error_title(), "Error while deleting row.");
        assert_eq!(action.table_oid(), Some(4));
        assert_eq!(Action::CreateTable { table_name: "Monsters".into() }.table_oid(), None);
    }
}
