//! Pending sale export for the point of sale.

use serde::{Deserialize, Serialize};

use crate::db::{Database, DbResult};
use crate::lifecycle::PricedItem;
use crate::models::PendingSale;

/// Export of a single pending sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleExport {
    /// Export metadata
    pub metadata: SaleMetadata,
    /// Charged lines, service first
    pub line_items: Vec<PricedItem>,
}

/// Sale export metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleMetadata {
    pub sale_id: String,
    pub appointment_id: String,
    pub animal_id: String,
    pub subtotal: f64,
    /// When the sale was recorded
    pub created_at: String,
    /// Export timestamp
    pub exported_at: String,
}

impl SaleExport {
    /// Create an export from a stored sale.
    pub fn from_sale(sale: &PendingSale) -> Self {
        Self {
            metadata: SaleMetadata {
                sale_id: sale.id.clone(),
                appointment_id: sale.appointment_id.clone(),
                animal_id: sale.summary.animal_id.clone(),
                subtotal: sale.subtotal(),
                created_at: sale.created_at.clone(),
                exported_at: chrono::Utc::now().to_rfc3339(),
            },
            line_items: sale.summary.items.clone(),
        }
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV format.
    pub fn to_csv(&self) -> String {
        let mut csv = String::from(CSV_HEADER);
        self.push_csv_lines(&mut csv);
        csv
    }

    fn push_csv_lines(&self, csv: &mut String) {
        for item in &self.line_items {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{:.2},{:.2}\n",
                escape_csv(&self.metadata.sale_id),
                escape_csv(&self.metadata.appointment_id),
                escape_csv(&self.metadata.animal_id),
                item.kind.as_str(),
                escape_csv(&item.id),
                escape_csv(&item.name),
                item.quantity,
                item.unit_price,
                item.total,
            ));
        }
    }
}

const CSV_HEADER: &str =
    "sale_id,appointment_id,animal_id,kind,item_id,description,quantity,unit_price,total\n";

/// Batch export of every pending sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSaleExport {
    /// Export timestamp
    pub exported_at: String,
    /// Individual sale exports
    pub sales: Vec<SaleExport>,
    /// Sum of all sale subtotals
    pub grand_total: f64,
}

impl BatchSaleExport {
    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV format.
    pub fn to_csv(&self) -> String {
        let mut csv = String::from(CSV_HEADER);
        for sale in &self.sales {
            sale.push_csv_lines(&mut csv);
        }
        csv
    }

    /// IDs of the exported sales, for marking them afterwards.
    pub fn sale_ids(&self) -> Vec<&str> {
        self.sales
            .iter()
            .map(|sale| sale.metadata.sale_id.as_str())
            .collect()
    }
}

/// Point-of-sale exporter.
pub struct SaleExporter<'a> {
    db: &'a Database,
}

impl<'a> SaleExporter<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Export every sale still pending, oldest first.
    pub fn export_pending(&self) -> DbResult<BatchSaleExport> {
        let sales: Vec<SaleExport> = self
            .db
            .list_pending_sales()?
            .iter()
            .map(SaleExport::from_sale)
            .collect();
        let grand_total =
            crate::lifecycle::round_cents(sales.iter().map(|s| s.metadata.subtotal).sum());

        Ok(BatchSaleExport {
            exported_at: chrono::Utc::now().to_rfc3339(),
            sales,
            grand_total,
        })
    }
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
