use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::BillingError;
use crate::month::Month;

/// unique identifier for a payment record
pub type PaymentId = Uuid;

/// payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// settled by an administrator; survives regeneration verbatim
    Paid,
    /// due today or in the future
    Pending,
    /// past due and not settled
    Overdue,
}

/// how a settled payment was collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    Transfer,
    Card,
}

/// one month's billing obligation for one player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub player_id: String,
    /// name snapshot taken at generation time, not a live join
    pub player_name: String,
    pub category_id: String,
    /// category name snapshot taken at generation time
    pub category_name: String,
    pub month: Month,
    /// post-discount amount
    pub amount: Money,
    pub due_date: NaiveDate,
    pub payment_date: Option<NaiveDate>,
    pub status: PaymentStatus,
    pub method: Option<PaymentMethod>,
    pub notes: Option<String>,
}

impl Payment {
    /// settled payments are never touched by the generator
    pub fn is_settled(&self) -> bool {
        self.status == PaymentStatus::Paid
    }
}

/// player record served by the externally-owned player directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: String,
    pub full_name: String,
    pub category_id: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// category record served by the externally-owned category directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: String,
    pub name: String,
    pub active: bool,
}

/// outcome of a single player's regeneration
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegenerationSummary {
    pub player_id: String,
    /// non-settled records written this run
    pub generated: usize,
    /// settled months left untouched
    pub retained_paid: usize,
    /// true when a missing or inactive player made the run a no-op
    pub skipped: bool,
}

/// per-player failure captured during a category sweep
#[derive(Debug)]
pub struct PlayerFailure {
    pub player_id: String,
    pub error: BillingError,
}

/// aggregate result of a save-time category sweep; failures are
/// reported here rather than aborting the remaining players
#[derive(Debug, Default)]
pub struct SweepReport {
    pub succeeded: Vec<RegenerationSummary>,
    pub failed: Vec<PlayerFailure>,
}

impl SweepReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}
