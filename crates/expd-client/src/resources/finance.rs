//! Invoices issued for expertise work and the payments settling them.

use chrono::NaiveDate;
use expd_core::{Amount, AuditStamps, EnvelopeShape, Identified, RecordId, StatusRef};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::resource::{Resource, ResourceService};

// -- Invoices -----------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: RecordId,
    #[serde(alias = "reference")]
    pub number: String,
    #[serde(default)]
    pub assignment_id: Option<RecordId>,
    #[serde(default)]
    pub insurer_id: Option<RecordId>,
    #[serde(default)]
    pub amount_excl_tax: Option<Amount>,
    #[serde(default)]
    pub tax_amount: Option<Amount>,
    #[serde(default)]
    pub amount_incl_tax: Option<Amount>,
    #[serde(default)]
    pub issued_at: Option<NaiveDate>,
    #[serde(default)]
    pub due_at: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<StatusRef>,
    #[serde(flatten)]
    pub stamps: AuditStamps,
}

impl Identified for Invoice {
    fn id(&self) -> RecordId {
        self.id
    }

    fn display_label(&self) -> String {
        match &self.amount_incl_tax {
            Some(total) => format!("{} ({total})", self.number),
            None => self.number.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoiceInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurer_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_excl_tax: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<NaiveDate>,
}

/// `invoices` resource.
#[derive(Debug)]
pub enum Invoices {}

impl Resource for Invoices {
    const NAME: &'static str = "invoice";
    const PATH: &'static str = "invoices";
    const ENTITY_SHAPE: EnvelopeShape = EnvelopeShape::Wrapped;
    type Record = Invoice;
    type Create = InvoiceInput;
    type Update = InvoiceInput;
}

impl ResourceService<Invoices> {
    /// Cancel an unpaid invoice.
    ///
    /// Calls `POST {base}/invoices/{id}/cancel`.
    pub async fn cancel(&self, id: RecordId) -> Result<Invoice, ApiError> {
        self.action(id, "cancel").await
    }
}

// -- Payments -----------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: RecordId,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub invoice_id: Option<RecordId>,
    #[serde(default)]
    pub assignment_id: Option<RecordId>,
    pub amount: Amount,
    #[serde(default, alias = "payment_method")]
    pub method: Option<String>,
    #[serde(default)]
    pub paid_at: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<StatusRef>,
    #[serde(flatten)]
    pub stamps: AuditStamps,
}

impl Identified for Payment {
    fn id(&self) -> RecordId {
        self.id
    }

    fn display_label(&self) -> String {
        match &self.reference {
            Some(reference) => format!("{reference} ({})", self.amount),
            None => format!("#{} ({})", self.id, self.amount),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<NaiveDate>,
}

/// `payments` resource.
#[derive(Debug)]
pub enum Payments {}

impl Resource for Payments {
    const NAME: &'static str = "payment";
    const PATH: &'static str = "payments";
    const ENTITY_SHAPE: EnvelopeShape = EnvelopeShape::Wrapped;
    type Record = Payment;
    type Create = PaymentInput;
    type Update = PaymentInput;
}

impl ResourceService<Payments> {
    /// Cancel a recorded payment.
    ///
    /// Calls `POST {base}/payments/{id}/cancel`.
    pub async fn cancel(&self, id: RecordId) -> Result<Payment, ApiError> {
        self.action(id, "cancel").await
    }
}
