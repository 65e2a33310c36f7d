//! Point-of-sale hand-off models.

use serde::{Deserialize, Serialize};

use crate::lifecycle::PricedSummary;

/// Whether the point of sale has picked up a sale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Pending,
    Exported,
}

impl SaleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SaleStatus::Pending => "pending",
            SaleStatus::Exported => "exported",
        }
    }
}

/// Priced summary of a completed appointment awaiting payment capture.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingSale {
    pub id: String,
    pub appointment_id: String,
    pub summary: PricedSummary,
    pub status: SaleStatus,
    pub created_at: String,
    pub exported_at: Option<String>,
}

impl PendingSale {
    /// Create a pending sale for a completed appointment's summary.
    pub fn new(summary: PricedSummary) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            appointment_id: summary.appointment_id.clone(),
            summary,
            status: SaleStatus::Pending,
            created_at: chrono::Utc::now().to_rfc3339(),
            exported_at: None,
        }
    }

    pub fn subtotal(&self) -> f64 {
        self.summary.subtotal
    }
}
