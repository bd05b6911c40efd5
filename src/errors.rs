use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("category not found: {category_id}")]
    CategoryNotFound {
        category_id: String,
    },

    #[error("payment not found: {payment_id}")]
    PaymentNotFound {
        payment_id: Uuid,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfig {
        message: String,
    },

    #[error("invalid month: {value}")]
    InvalidMonth {
        value: String,
    },

    #[error("invalid due day: {day}")]
    InvalidDueDay {
        day: u8,
    },

    #[error("storage error: {message}")]
    Storage {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, BillingError>;
