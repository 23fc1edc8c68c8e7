//! # Draft Commands
//!
//! Edits to the checkout at the counter. Every command returns the full
//! [`DraftResponse`] so the caller can redraw without a second query.
//!
//! Lines are addressed by their 1-based display position; ids never reach
//! the operator.

use serde::Serialize;
use tracing::debug;

use duka_core::validation::parse_lenient_number;
use duka_core::{DraftField, LineAmount, LineId};

use crate::error::ApiError;
use crate::state::{Checkout, DraftState};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftLineView {
    /// 1-based position shown to the operator
    pub position: usize,
    pub id: LineId,
    pub item_name: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub line_total: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftResponse {
    pub lines: Vec<DraftLineView>,
    pub customer_name: String,
    pub customer_email: String,
    pub total: f64,
    pub tendered: f64,
    pub change_given: f64,
    pub credit_due: f64,
}

impl From<&Checkout> for DraftResponse {
    fn from(checkout: &Checkout) -> Self {
        let settlement = checkout.settlement();
        let buyer = checkout.draft.buyer();

        DraftResponse {
            lines: checkout
                .draft
                .lines()
                .iter()
                .enumerate()
                .map(|(index, line)| DraftLineView {
                    position: index + 1,
                    id: line.id,
                    item_name: line.item_name.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    line_total: line.line_total(),
                })
                .collect(),
            customer_name: buyer.customer_name.clone(),
            customer_email: buyer.customer_email.clone(),
            total: checkout.total(),
            tendered: checkout.tendered,
            change_given: settlement.change_given,
            credit_due: settlement.credit_due,
        }
    }
}

pub fn get_draft(draft: &DraftState) -> DraftResponse {
    draft.with_checkout(|checkout| DraftResponse::from(checkout))
}

/// Appends a line. Missing values give the blank line (empty name,
/// quantity 1, price 0); unparseable numbers become 0.
pub fn add_line(
    draft: &DraftState,
    item_name: Option<&str>,
    quantity: Option<&str>,
    unit_price: Option<&str>,
) -> DraftResponse {
    let quantity = quantity.map(parse_lenient_number).unwrap_or(1.0);
    let unit_price = unit_price.map(parse_lenient_number).unwrap_or(0.0);

    debug!(item = ?item_name, quantity, unit_price, "add_line command");

    draft.with_checkout_mut(|checkout| {
        checkout.draft.add_line(item_name, quantity, unit_price);
        DraftResponse::from(&*checkout)
    })
}

/// Sets one field of the line at `position`.
///
/// `field` accepts `name`, `qty`, `price` and their long spellings.
pub fn update_line(
    draft: &DraftState,
    position: usize,
    field: &str,
    value: &str,
) -> Result<DraftResponse, ApiError> {
    let field: DraftField = field.parse()?;

    debug!(position, ?field, value, "update_line command");

    draft.with_checkout_mut(|checkout| -> Result<DraftResponse, ApiError> {
        let id = checkout.draft.line_id_at(position)?;
        checkout.draft.update_line(&id, field, value);
        Ok(DraftResponse::from(&*checkout))
    })
}

pub fn remove_line(draft: &DraftState, position: usize) -> Result<DraftResponse, ApiError> {
    debug!(position, "remove_line command");

    draft.with_checkout_mut(|checkout| -> Result<DraftResponse, ApiError> {
        let id = checkout.draft.line_id_at(position)?;
        checkout.draft.remove_line(&id);
        Ok(DraftResponse::from(&*checkout))
    })
}

/// Updates whichever buyer fields are given.
pub fn set_customer(draft: &DraftState, name: Option<&str>, email: Option<&str>) -> DraftResponse {
    draft.with_checkout_mut(|checkout| {
        if let Some(name) = name {
            checkout.draft.set_customer_name(name.trim());
        }
        if let Some(email) = email {
            checkout.draft.set_customer_email(email.trim());
        }
        DraftResponse::from(&*checkout)
    })
}

/// Records the cash handed over; unparseable input counts as 0.
pub fn set_tendered(draft: &DraftState, raw: &str) -> DraftResponse {
    let tendered = parse_lenient_number(raw);
    debug!(tendered, "set_tendered command");

    draft.with_checkout_mut(|checkout| {
        checkout.tendered = tendered;
        DraftResponse::from(&*checkout)
    })
}

pub fn clear_draft(draft: &DraftState) -> DraftResponse {
    debug!("clear_draft command");

    draft.with_checkout_mut(|checkout| {
        checkout.clear();
        DraftResponse::from(&*checkout)
    })
}
