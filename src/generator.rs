use chrono::NaiveDate;
use uuid::Uuid;

use crate::config::CategoryFeeConfig;
use crate::decimal::Money;
use crate::discounts::apply_discounts;
use crate::month::Month;
use crate::types::{Payment, PaymentStatus, PlayerRecord};

/// one month the generator must bill, with its effective base terms
#[derive(Debug, Clone, PartialEq)]
pub struct BillableMonth {
    pub month: Month,
    pub base_amount: Money,
    pub due_day: u8,
}

/// compute the months to bill for a player under the given config.
///
/// variable mode bills exactly the scheduled months, each with its own
/// amount and due day; unlisted months never fall back to the base
/// amount. fixed mode bills every month from the player's registration
/// month through today's month inclusive.
pub fn billable_months(
    config: &CategoryFeeConfig,
    player: &PlayerRecord,
    today: NaiveDate,
) -> Vec<BillableMonth> {
    if config.is_variable_amount {
        config
            .monthly_fees
            .iter()
            .map(|fee| BillableMonth {
                month: fee.month,
                base_amount: fee.amount,
                due_day: fee.due_day,
            })
            .collect()
    } else {
        let seed = config.seed_amount(&player.id);
        let start = Month::from_date(player.created_at.date_naive());
        let end = Month::from_date(today);
        Month::range_inclusive(start, end)
            .into_iter()
            .map(|month| BillableMonth {
                month,
                base_amount: seed,
                due_day: config.due_day,
            })
            .collect()
    }
}

/// overdue when the due date has passed; settlement is a separate,
/// human act recorded through the status service
pub fn derive_status(due_date: NaiveDate, today: NaiveDate) -> PaymentStatus {
    if due_date < today {
        PaymentStatus::Overdue
    } else {
        PaymentStatus::Pending
    }
}

/// build one payment record, snapshotting player and category names at
/// generation time
pub fn build_payment(
    player: &PlayerRecord,
    config: &CategoryFeeConfig,
    billable: &BillableMonth,
    today: NaiveDate,
) -> Payment {
    let due_date = billable.month.due_date(billable.due_day);

    Payment {
        id: Uuid::new_v4(),
        player_id: player.id.clone(),
        player_name: player.full_name.clone(),
        category_id: config.category_id.clone(),
        category_name: config.name.clone(),
        month: billable.month,
        amount: apply_discounts(billable.base_amount, &config.discounts, billable.month),
        due_date,
        payment_date: None,
        status: derive_status(due_date, today),
        method: None,
        notes: None,
    }
}
