use serde::Serialize;
use std::fmt;

/// Closed set of asset classes a classifier can predict.
///
/// Declaration order is the model's output order and must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ClassLabel {
    Chair,
    Table,
    Computer,
    Vehicle,
    Equipment,
}

impl ClassLabel {
    pub const ALL: [ClassLabel; 5] = [
        ClassLabel::Chair,
        ClassLabel::Table,
        ClassLabel::Computer,
        ClassLabel::Vehicle,
        ClassLabel::Equipment,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClassLabel::Chair => "Chair",
            ClassLabel::Table => "Table",
            ClassLabel::Computer => "Computer",
            ClassLabel::Vehicle => "Vehicle",
            ClassLabel::Equipment => "Equipment",
        }
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
