//! Invoice (order) entities and the delivery-status state machine
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Delivery lifecycle: `pending` may move to any other state;
/// `delivered`, `return` and `cancelled` are terminal with respect to
/// stock effects. Re-entering a terminal state never re-fires its
/// side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "delivery_status", rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Delivered,
    Return,
    Cancelled,
}

impl DeliveryStatus {
    /// A sale record is synthesized only on the first transition into
    /// `delivered`.
    pub fn fires_sale(prev: DeliveryStatus, next: DeliveryStatus) -> bool {
        next == DeliveryStatus::Delivered && prev != DeliveryStatus::Delivered
    }

    /// Stock is restored only on the first transition into
    /// `return`/`cancelled`; an invoice already in either of those
    /// states was restored once and must not be restored again.
    pub fn fires_restore(prev: DeliveryStatus, next: DeliveryStatus) -> bool {
        matches!(next, DeliveryStatus::Return | DeliveryStatus::Cancelled)
            && prev != next
            && !matches!(prev, DeliveryStatus::Return | DeliveryStatus::Cancelled)
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Return => "return",
            DeliveryStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DeliveryStatus::Pending),
            "delivered" => Ok(DeliveryStatus::Delivered),
            "return" => Ok(DeliveryStatus::Return),
            "cancelled" => Ok(DeliveryStatus::Cancelled),
            other => Err(format!("unknown delivery status: {}", other)),
        }
    }
}

/// One ordered line of an invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub product_id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub quantity: i32,
    pub price: f64,
    pub color: Option<String>,
    pub size: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Invoice {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub guest_id: Option<String>,
    pub sub_total: f64,
    pub shipping_cost: f64,
    pub payable: f64,
    pub ship_area: String,
    pub ship_details: String,
    pub tran_id: String,
    pub val_id: String,
    pub payment_status: String,
    pub delivery_status: DeliveryStatus,
    pub payment_method: String,
    pub products: Json<Vec<InvoiceLine>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sale_fires_once() {
        use DeliveryStatus::*;
        assert!(DeliveryStatus::fires_sale(Pending, Delivered));
        assert!(!DeliveryStatus::fires_sale(Delivered, Delivered));
        assert!(!DeliveryStatus::fires_sale(Pending, Cancelled));
    }

    #[test]
    fn restore_fires_once() {
        use DeliveryStatus::*;
        assert!(DeliveryStatus::fires_restore(Pending, Return));
        assert!(DeliveryStatus::fires_restore(Delivered, Cancelled));
        // No double restore: already-terminal states are inert
        assert!(!DeliveryStatus::fires_restore(Return, Return));
        assert!(!DeliveryStatus::fires_restore(Return, Cancelled));
        assert!(!DeliveryStatus::fires_restore(Cancelled, Return));
        assert!(!DeliveryStatus::fires_restore(Pending, Delivered));
    }

    #[test]
    fn status_round_trip() {
        for s in ["pending", "delivered", "return", "cancelled"] {
            let parsed: DeliveryStatus = s.parse().unwrap();
            assert_eq!(parsed.to_string(), s);
        }
        assert!("shipped".parse::<DeliveryStatus>().is_err());
    }
}
