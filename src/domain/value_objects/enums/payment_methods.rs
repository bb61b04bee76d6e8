use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The only gateway this service integrates with. Kept as an enum so the
/// `payments.method` column stays constrained to known values.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentMethod {
    #[default]
    Flow,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Flow => "flow",
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
