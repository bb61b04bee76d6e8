use std::fmt::Display;

/// Numeric order status reported by the gateway's `getStatus` endpoint.
/// This is the only place the wire codes are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayOrderStatus {
    Pending,
    Paid,
    Rejected,
    Voided,
    Unknown,
}

impl GatewayOrderStatus {
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => GatewayOrderStatus::Pending,
            2 => GatewayOrderStatus::Paid,
            3 => GatewayOrderStatus::Rejected,
            4 => GatewayOrderStatus::Voided,
            _ => GatewayOrderStatus::Unknown,
        }
    }

    pub fn status_text(&self) -> &'static str {
        match self {
            GatewayOrderStatus::Pending => "Pendiente",
            GatewayOrderStatus::Paid => "Pagado",
            GatewayOrderStatus::Rejected => "Rechazado",
            GatewayOrderStatus::Voided => "Anulado",
            GatewayOrderStatus::Unknown => "Desconocido",
        }
    }
}

impl Display for GatewayOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.status_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_codes() {
        assert_eq!(GatewayOrderStatus::from_code(1), GatewayOrderStatus::Pending);
        assert_eq!(GatewayOrderStatus::from_code(2), GatewayOrderStatus::Paid);
        assert_eq!(GatewayOrderStatus::from_code(3), GatewayOrderStatus::Rejected);
        assert_eq!(GatewayOrderStatus::from_code(4), GatewayOrderStatus::Voided);
    }

    #[test]
    fn unknown_codes_fall_through() {
        assert_eq!(GatewayOrderStatus::from_code(0), GatewayOrderStatus::Unknown);
        assert_eq!(GatewayOrderStatus::from_code(99), GatewayOrderStatus::Unknown);
    }

    #[test]
    fn paid_status_text_is_pagado() {
        assert_eq!(GatewayOrderStatus::Paid.status_text(), "Pagado");
    }
}
