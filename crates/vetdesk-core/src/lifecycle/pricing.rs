//! Priced summary produced when an appointment is paid.

use serde::{Deserialize, Serialize};

use crate::models::{Appointment, ServiceType};

/// What a summary line charges for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Service,
    Product,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Service => "service",
            ItemKind::Product => "product",
        }
    }
}

/// Single charged line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricedItem {
    /// Service or product ID
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub total: f64,
    pub kind: ItemKind,
}

/// Line items and subtotal for a completed appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricedSummary {
    pub appointment_id: String,
    pub animal_id: String,
    pub items: Vec<PricedItem>,
    pub subtotal: f64,
}

impl PricedSummary {
    /// Service price first, then every attached product line.
    pub fn for_appointment(appointment: &Appointment, service: &ServiceType) -> Self {
        let mut items = Vec::with_capacity(appointment.products.len() + 1);
        items.push(PricedItem {
            id: service.id.clone(),
            name: service.name.clone(),
            quantity: 1,
            unit_price: service.price,
            total: round_cents(service.price),
            kind: ItemKind::Service,
        });
        items.extend(appointment.products.iter().map(|line| PricedItem {
            id: line.product_id.clone(),
            name: line.name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            total: round_cents(line.line_total()),
            kind: ItemKind::Product,
        }));

        let subtotal = round_cents(items.iter().map(|item| item.total).sum());

        Self {
            appointment_id: appointment.id.clone(),
            animal_id: appointment.animal_id.clone(),
            items,
            subtotal,
        }
    }

    /// Number of product lines.
    pub fn product_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.kind == ItemKind::Product)
            .count()
    }
}

/// Round a currency amount to two decimals.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
