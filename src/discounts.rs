use crate::config::DiscountConfig;
use crate::decimal::Money;
use crate::month::Month;

/// apply the configured discounts to one month's base amount.
///
/// the sibling discount comes off the original base; the first custom
/// discount listing the month then comes off the sibling-discounted
/// amount. at most one custom discount applies, first match in list
/// order. the order must not change: historical records were generated
/// with exactly this arithmetic.
///
/// the result is intentionally not clamped at zero; callers flag
/// negative amounts at the UI boundary.
pub fn apply_discounts(base: Money, discounts: &DiscountConfig, month: Month) -> Money {
    let mut amount = base;

    let siblings = &discounts.siblings;
    if siblings.enabled {
        let reduction = if siblings.is_percentage {
            base.percentage(siblings.amount)
        } else {
            Money::from_decimal(siblings.amount)
        };
        amount = amount - reduction;
    }

    if let Some(custom) = discounts
        .custom
        .iter()
        .find(|discount| discount.months.contains(&month))
    {
        let reduction = if custom.is_percentage {
            amount.percentage(custom.amount)
        } else {
            Money::from_decimal(custom.amount)
        };
        amount = amount - reduction;
    }

    amount
}
