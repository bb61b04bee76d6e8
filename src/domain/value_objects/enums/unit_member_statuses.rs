use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UnitMemberStatus {
    Pending,
    Confirmed,
    Rejected,
}

impl UnitMemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitMemberStatus::Pending => "pending",
            UnitMemberStatus::Confirmed => "confirmed",
            UnitMemberStatus::Rejected => "rejected",
        }
    }
}

impl Display for UnitMemberStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
