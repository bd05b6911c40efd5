pub mod config;
pub mod decimal;
pub mod discounts;
pub mod errors;
pub mod events;
pub mod generator;
pub mod memory;
pub mod month;
pub mod service;
pub mod store;
pub mod types;

// re-export key types
pub use config::{
    CategoryFeeConfig, CustomDiscount, DiscountConfig, MonthlyFee, PlayerBilling,
    SiblingDiscount, DEFAULT_DUE_DAY,
};
pub use decimal::Money;
pub use discounts::apply_discounts;
pub use errors::{BillingError, Result};
pub use events::{BillingEvent, EventStore};
pub use generator::BillableMonth;
pub use memory::{MemoryDirectory, MemoryStore};
pub use month::Month;
pub use service::{BillingService, StatusUpdate, DEFAULT_SWEEP_FAN_OUT};
pub use store::{BillingStore, CategoryDirectory, PlayerDirectory};
pub use types::{
    CategoryRecord, Payment, PaymentId, PaymentMethod, PaymentStatus, PlayerFailure,
    PlayerRecord, RegenerationSummary, SweepReport,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
