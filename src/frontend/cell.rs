use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use crate::frontend::action::Action;
use crate::frontend::column_type::{EditAffordance, MetadataColumnType, Primitive};
use crate::frontend::query::{CellValue, DropdownValue};
use crate::util::error;


/// One cell of a table as last streamed from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub table_oid: i64,
    pub row_oid: i64,
    pub column_oid: i64,
    /// Type of the column at the time the cell was streamed
    pub column_type: MetadataColumnType,
    pub true_value: Option<String>,
    pub display_value: Option<String>,
    pub failed_validations: Vec<error::FailedValidation>,
}

impl Cell {
    pub fn from_value(table_oid: i64, row_oid: i64, value: CellValue) -> Self {
        return Cell {
            table_oid,
            row_oid,
            column_oid: value.column_oid,
            column_type: value.column_type,
            true_value: value.true_value,
            display_value: value.display_value,
            failed_validations: value.failed_validations,
        };
    }
}

/// The surface through which a cell is shown and edited.
#[derive(Debug, Clone, PartialEq)]
pub enum CellWidget {
    /// Inline text input, committed when it loses focus.
    TextInput {
        value: String,
        /// Dates and timestamps are canonicalized on commit
        temporal: bool
    },
    /// Checkbox, committed when toggled.
    Toggle {
        checked: bool
    },
    /// Single choice, committed when changed. The first option is always the empty one.
    Selector {
        options: Vec<DropdownValue>,
        selected: Option<String>
    },
    /// Read-only display for types that cannot be edited inline yet.
    Placeholder {
        label: Option<String>
    },
}

/// A cell together with the widget generated for it.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedCell {
    pub cell: Cell,
    pub widget: CellWidget,
    /// Descriptions of failed validations, one per line
    pub failure_tooltip: Option<String>,
}

impl RenderedCell {
    /// Whether the cell carries the failed-validation marker.
    pub fn has_failures(&self) -> bool {
        return !self.cell.failed_validations.is_empty();
    }
}

/// Generates the widget for a cell.
///
/// `dropdown_options` are the values of the cell's column, used by selector widgets.
pub fn render_cell(cell: Cell, dropdown_options: Option<&[DropdownValue]>) -> RenderedCell {
    let widget = match cell.column_type.edit_affordance() {
        EditAffordance::Text => {
            let temporal = match cell.column_type {
                MetadataColumnType::Primitive(prim) => prim.is_temporal(),
                _ => false
            };
            CellWidget::TextInput {
                value: cell.display_value.clone().unwrap_or_default(),
                temporal
            }
        },
        EditAffordance::Toggle => {
            CellWidget::Toggle {
                checked: cell.true_value.as_deref() == Some("1")
            }
        },
        EditAffordance::Selector => {
            // The empty option is always offered
            let mut options: Vec<DropdownValue> = vec![DropdownValue::default()];
            options.extend(
                dropdown_options
                    .unwrap_or_default()
                    .iter()
                    .filter(|o| o.true_value.is_some())
                    .cloned()
            );
            CellWidget::Selector {
                options,
                selected: cell.true_value.clone()
            }
        },
        EditAffordance::Placeholder => {
            CellWidget::Placeholder {
                label: cell.display_value.clone()
            }
        }
    };

    let failure_tooltip = if cell.failed_validations.is_empty() {
        None
    } else {
        Some(cell.failed_validations
            .iter()
            .map(|f| f.description.as_str())
            .collect::<Vec<&str>>()
            .join("\n"))
    };

    return RenderedCell { cell, widget, failure_tooltip };
}


/// A user interaction that may commit a new cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum EditEvent {
    /// A text input lost focus with this content.
    Blur(String),
    /// A checkbox changed state.
    Toggled(bool),
    /// A selector changed to the option with this stored value.
    Selected(Option<String>),
}

/// Turns an edit of a rendered cell into the action that stores it.
///
/// Returns `None` when the event does not commit anything: events that do not match the
/// cell's widget, edits of placeholder cells, and text inputs left unchanged. A text input
/// is unchanged when it equals the display value of `cell`, so `cell` should be the one
/// currently rendered.
pub fn commit(cell: &Cell, event: EditEvent) -> Option<Action> {
    let value: Option<String> = match (cell.column_type.edit_affordance(), event) {
        (EditAffordance::Text, EditEvent::Blur(input)) => {
            if cell.display_value.as_deref().unwrap_or_default() == input {
                return None;
            }
            match cell.column_type {
                MetadataColumnType::Primitive(Primitive::Date)
                | MetadataColumnType::Primitive(Primitive::Timestamp) => {
                    Some(normalize_timestamp(&input).unwrap_or(input))
                },
                _ => Some(input)
            }
        },
        (EditAffordance::Toggle, EditEvent::Toggled(checked)) => {
            Some(String::from(if checked { "1" } else { "0" }))
        },
        (EditAffordance::Selector, EditEvent::Selected(selected)) => selected,
        (EditAffordance::Placeholder, _) => {
            tracing::debug!(column_oid = cell.column_oid, "edit of a read-only cell ignored");
            return None;
        },
        (affordance, event) => {
            tracing::debug!(column_oid = cell.column_oid, ?affordance, ?event, "edit event does not match the cell widget");
            return None;
        }
    };

    return Some(Action::UpdateTableCellStoredAsPrimitiveValue {
        table_oid: cell.table_oid,
        row_oid: cell.row_oid,
        column_oid: cell.column_oid,
        value: value.filter(|v| !v.is_empty())
    });
}

/// Canonicalizes a date or timestamp to an RFC 3339 UTC timestamp.
///
/// Accepts RFC 3339, `YYYY-MM-DD`, and `YYYY-MM-DD HH:MM[:SS]` with either a space or `T`
/// between date and time. Returns `None` for anything else.
pub fn normalize_timestamp(input: &str) -> Option<String> {
    let trimmed = input.trim();

    if let Ok(timestamp) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return timestamp.to_offset(UtcOffset::UTC).format(&Rfc3339).ok();
    }

    let datetime_formats = [
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    ];
    for format in datetime_formats {
        if let Ok(timestamp) = PrimitiveDateTime::parse(trimmed, format) {
            return timestamp.assume_utc().format(&Rfc3339).ok();
        }
    }

    if let Ok(date) = Date::parse(trimmed, format_description!("[year]-[month]-[day]")) {
        return date.midnight().assume_utc().format(&Rfc3339).ok();
    }
    return None;
}
