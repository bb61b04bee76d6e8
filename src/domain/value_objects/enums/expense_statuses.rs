use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExpenseStatus {
    Pending,
    Paid,
    Overdue,
}

impl ExpenseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseStatus::Pending => "pending",
            ExpenseStatus::Paid => "paid",
            ExpenseStatus::Overdue => "overdue",
        }
    }

    pub fn from_str(value: &str) -> Self {
        match value {
            "pending" => ExpenseStatus::Pending,
            "paid" => ExpenseStatus::Paid,
            _ => ExpenseStatus::Overdue,
        }
    }
}

impl Display for ExpenseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
