use serde::{Serialize, Deserialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Any,        // Mode = 0 && OID = 0
    Boolean,    // Mode = 0 && OID = 1
    Integer,    // Mode = 0 && OID = 2
    Number,     // Mode = 0 && OID = 3
    Date,       // Mode = 0 && OID = 4
    Timestamp,  // Mode = 0 && OID = 5
    Text,       // Mode = 0 && OID = 6
    JSON,       // Mode = 0 && OID = 7
    File,       // Mode = 0 && OID = 8
    Image,      // Mode = 0 && OID = 9
}

impl Primitive {
    /// Gets the corresponding type OID of a given primitive type.
    pub fn get_type_oid(&self) -> i64 {
        match self {
            Self::Any => 0,
            Self::Boolean => 1,
            Self::Integer => 2,
            Self::Number => 3,
            Self::Date => 4,
            Self::Timestamp => 5,
            Self::Text => 6,
            Self::JSON => 7,
            Self::File => 8,
            Self::Image => 9,
        }
    }

    /// Whether values of this type are dates or timestamps, which get canonicalized before being committed.
    pub fn is_temporal(&self) -> bool {
        return matches!(self, Self::Date | Self::Timestamp);
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all="camelCase", rename_all_fields="camelCase")]
pub enum MetadataColumnType {
    Primitive(Primitive),          // Mode = 0
    SingleSelectDropdown(i64),     // Mode = 1
    MultiSelectDropdown(i64),      // Mode = 2
    Reference(i64),                // Mode = 3
    ChildObject(i64),              // Mode = 4
    ChildTable(i64),               // Mode = 5
}

/// Which of a column's modifiers its type permits to be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeConstraints {
    pub allows_unique: bool,
    pub allows_primary_key: bool,
}

impl TypeConstraints {
    /// Clamps requested (unique, primary key) flags to what the type permits.
    pub fn apply(&self, is_unique: bool, is_primary_key: bool) -> (bool, bool) {
        return (
            is_unique && self.allows_unique,
            is_primary_key && self.allows_primary_key
        );
    }
}

/// The only way a user may edit a cell of a given column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAffordance {
    /// Inline text, committed on loss of focus.
    Text,
    /// Checkbox, committed on change.
    Toggle,
    /// Single choice among the column's dropdown values, committed on change.
    Selector,
    /// Displayed only; editing is not supported yet.
    Placeholder,
}

impl MetadataColumnType {
    /// Converts a type from its type OID and mode.
    pub fn from_parts(type_oid: i64, type_mode: i64) -> MetadataColumnType {
        match type_mode {
            0 => {
                match type_oid {
                    1 => { return Self::Primitive(Primitive::Boolean); },
                    2 => { return Self::Primitive(Primitive::Integer); },
                    3 => { return Self::Primitive(Primitive::Number); },
                    4 => { return Self::Primitive(Primitive::Date); },
                    5 => { return Self::Primitive(Primitive::Timestamp); },
                    6 => { return Self::Primitive(Primitive::Text); },
                    7 => { return Self::Primitive(Primitive::JSON); },
                    8 => { return Self::Primitive(Primitive::File); },
                    9 => { return Self::Primitive(Primitive::Image); },
                    _ => {
                        return Self::Primitive(Primitive::Any);
                    }
                }
            },
            1 => { return Self::SingleSelectDropdown(type_oid); },
            2 => { return Self::MultiSelectDropdown(type_oid); },
            3 => { return Self::Reference(type_oid); },
            4 => { return Self::ChildObject(type_oid); },
            5 => { return Self::ChildTable(type_oid); },
            _ => {
                return Self::Primitive(Primitive::Any);
            }
        }
    }

    /// Gets the corresponding type OID of a column type.
    pub fn get_type_oid(&self) -> i64 {
        return match self {
            Self::Primitive(prim) => prim.get_type_oid(),
            Self::SingleSelectDropdown(type_oid)
            | Self::MultiSelectDropdown(type_oid)
            | Self::Reference(type_oid)
            | Self::ChildObject(type_oid)
            | Self::ChildTable(type_oid) => *type_oid
        }
    }

    /// Gets the corresponding type mode of a column type.
    pub fn get_type_mode(&self) -> i64 {
        return match self {
            Self::Primitive(_) => 0,
            Self::SingleSelectDropdown(_) => 1,
            Self::MultiSelectDropdown(_) => 2,
            Self::Reference(_) => 3,
            Self::ChildObject(_) => 4,
            Self::ChildTable(_) => 5
        }
    }

    /// The modifiers a column of this type may carry.
    /// Every site that sets `is_unique` or `is_primary_key` goes through this table.
    pub fn constraints(&self) -> TypeConstraints {
        return match self {
            Self::Primitive(Primitive::Boolean) => TypeConstraints {
                allows_unique: false,
                allows_primary_key: true
            },
            Self::Primitive(Primitive::File)
            | Self::Primitive(Primitive::Image)
            | Self::ChildObject(_)
            | Self::ChildTable(_) => TypeConstraints {
                allows_unique: false,
                allows_primary_key: false
            },
            Self::Primitive(Primitive::Any)
            | Self::Primitive(Primitive::Integer)
            | Self::Primitive(Primitive::Number)
            | Self::Primitive(Primitive::Date)
            | Self::Primitive(Primitive::Timestamp)
            | Self::Primitive(Primitive::Text)
            | Self::Primitive(Primitive::JSON)
            | Self::SingleSelectDropdown(_)
            | Self::MultiSelectDropdown(_)
            | Self::Reference(_) => TypeConstraints {
                allows_unique: true,
                allows_primary_key: true
            }
        }
    }

    /// How cells of this type are edited.
    pub fn edit_affordance(&self) -> EditAffordance {
        return match self {
            Self::Primitive(prim) => {
                match prim {
                    Primitive::Any
                    | Primitive::Integer
                    | Primitive::Number
                    | Primitive::Date
                    | Primitive::Timestamp
                    | Primitive::Text
                    | Primitive::JSON => EditAffordance::Text,
                    Primitive::Boolean => EditAffordance::Toggle,
                    Primitive::File
                    | Primitive::Image => EditAffordance::Placeholder,
                }
            },
            Self::SingleSelectDropdown(_)
            | Self::Reference(_) => EditAffordance::Selector,
            Self::MultiSelectDropdown(_)
            | Self::ChildObject(_)
            | Self::ChildTable(_) => EditAffordance::Placeholder,
        }
    }

    /// Whether the type needs a target (table or object type) chosen by the user.
    pub fn requires_target(&self) -> bool {
        return matches!(self, Self::Reference(_) | Self::ChildObject(_));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_PRIMITIVES: [Primitive; 10] = [
        Primitive::Any,
        Primitive::Boolean,
        Primitive::Integer,
        Primitive::Number,
        Primitive::Date,
        Primitive::Timestamp,
        Primitive::Text,
        Primitive::JSON,
        Primitive::File,
        Primitive::Image,
    ];

    #[test]
    fn type_parts_are_inverse() {
        for prim in ALL_PRIMITIVES {
            let t = MetadataColumnType::Primitive(prim);
            assert_eq!(MetadataColumnType::from_parts(t.get_type_oid(), t.get_type_mode()), t);
        }
        for t in [
            MetadataColumnType::SingleSelectDropdown(11),
            MetadataColumnType::MultiSelectDropdown(12),
            MetadataColumnType::Reference(13),
            MetadataColumnType::ChildObject(14),
            MetadataColumnType::ChildTable(15),
        ] {
            assert_eq!(MetadataColumnType::from_parts(t.get_type_oid(), t.get_type_mode()), t);
        }
    }

    #[test]
    fn unknown_parts_fall_back_to_any() {
        assert_eq!(MetadataColumnType::from_parts(42, 0), MetadataColumnType::Primitive(Primitive::Any));
        assert_eq!(MetadataColumnType::from_parts(3, 9), MetadataColumnType::Primitive(Primitive::Any));
    }

    #[test]
    fn forced_modifiers() {
        let never_unique = [
            MetadataColumnType::Primitive(Primitive::Boolean),
            MetadataColumnType::Primitive(Primitive::File),
            MetadataColumnType::Primitive(Primitive::Image),
            MetadataColumnType::ChildObject(1),
            MetadataColumnType::ChildTable(1),
        ];
        for t in never_unique {
            assert_eq!(t.constraints().apply(true, false), (false, false));
        }

        let never_primary_key = [
            MetadataColumnType::Primitive(Primitive::File),
            MetadataColumnType::Primitive(Primitive::Image),
            MetadataColumnType::ChildObject(1),
            MetadataColumnType::ChildTable(1),
        ];
        for t in never_primary_key {
            assert!(!t.constraints().apply(true, true).1);
        }

        let boolean = MetadataColumnType::Primitive(Primitive::Boolean);
        assert_eq!(boolean.constraints().apply(true, true), (false, true));

        let text = MetadataColumnType::Primitive(Primitive::Text);
        assert_eq!(text.constraints().apply(true, true), (true, true));
    }

    #[test]
    fn affordances() {
        assert_eq!(MetadataColumnType::Primitive(Primitive::Date).edit_affordance(), EditAffordance::Text);
        assert_eq!(MetadataColumnType::Primitive(Primitive::Boolean).edit_affordance(), EditAffordance::Toggle);
        assert_eq!(MetadataColumnType::Reference(3).edit_affordance(), EditAffordance::Selector);
        assert_eq!(MetadataColumnType::SingleSelectDropdown(3).edit_affordance(), EditAffordance::Selector);
        assert_eq!(MetadataColumnType::MultiSelectDropdown(3).edit_affordance(), EditAffordance::Placeholder);
        assert_eq!(MetadataColumnType::Primitive(Primitive::Image).edit_affordance(), EditAffordance::Placeholder);
    }

    #[test]
    fn wire_format() {
        let json = serde_json::to_string(&MetadataColumnType::Primitive(Primitive::Boolean)).unwrap();
        assert_eq!(json, r#"{"primitive":"Boolean"}"#);

        let t: MetadataColumnType = serde_json::from_str(r#"{"singleSelectDropdown":4}"#).unwrap();
        assert_eq!(t, MetadataColumnType::SingleSelectDropdown(4));
    }
}
