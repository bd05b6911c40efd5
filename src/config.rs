use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{BillingError, Result};
use crate::month::Month;

/// due day used when a configuration does not set one
pub const DEFAULT_DUE_DAY: u8 = 10;

/// per-category fee configuration, the billing unit of configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryFeeConfig {
    pub category_id: String,
    /// category display name, snapshotted into generated payments
    pub name: String,
    /// default monthly fee when not in variable-amount mode
    #[serde(default)]
    pub base_amount: Money,
    #[serde(default = "default_due_day")]
    pub due_day: u8,
    /// fixed-recurring vs explicit-schedule billing
    #[serde(default)]
    pub is_variable_amount: bool,
    /// explicit per-month overrides, used only in variable-amount mode
    #[serde(default)]
    pub monthly_fees: Vec<MonthlyFee>,
    #[serde(default)]
    pub discounts: DiscountConfig,
    /// per-player inclusion switch; absent means not billed
    #[serde(default)]
    pub players: HashMap<String, PlayerBilling>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_due_day() -> u8 {
    DEFAULT_DUE_DAY
}

/// explicit fee for one month of the schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyFee {
    pub month: Month,
    pub amount: Money,
    #[serde(default = "default_due_day")]
    pub due_day: u8,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DiscountConfig {
    #[serde(default)]
    pub siblings: SiblingDiscount,
    #[serde(default)]
    pub custom: Vec<CustomDiscount>,
}

/// category-wide named discount; despite the name it is not scoped to
/// family relationships anywhere in the engine
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SiblingDiscount {
    #[serde(default)]
    pub enabled: bool,
    /// flat amount, or percent of the base when `is_percentage`
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub is_percentage: bool,
}

/// discount applied only to the months it lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomDiscount {
    pub id: Uuid,
    pub name: String,
    pub amount: Decimal,
    #[serde(default)]
    pub is_percentage: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub months: Vec<Month>,
}

/// per-player billing switch within a category
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerBilling {
    pub active: bool,
    /// overrides the category base amount in fixed-recurring mode
    #[serde(default)]
    pub custom_amount: Option<Money>,
}

impl CategoryFeeConfig {
    /// default configuration created lazily on first read for a category
    pub fn default_for(category_id: &str, name: &str) -> Self {
        Self {
            category_id: category_id.to_string(),
            name: name.to_string(),
            base_amount: Money::ZERO,
            due_day: DEFAULT_DUE_DAY,
            is_variable_amount: false,
            monthly_fees: Vec::new(),
            discounts: DiscountConfig::default(),
            players: HashMap::new(),
            updated_at: None,
        }
    }

    /// reject configurations that cannot be keyed or displayed
    pub fn validate(&self) -> Result<()> {
        if self.category_id.trim().is_empty() {
            return Err(BillingError::InvalidConfig {
                message: "category id is empty".to_string(),
            });
        }
        if self.name.trim().is_empty() {
            return Err(BillingError::InvalidConfig {
                message: "category name is empty".to_string(),
            });
        }
        if !(1..=31).contains(&self.due_day) {
            return Err(BillingError::InvalidDueDay { day: self.due_day });
        }
        for fee in &self.monthly_fees {
            if !(1..=31).contains(&fee.due_day) {
                return Err(BillingError::InvalidDueDay { day: fee.due_day });
            }
        }
        Ok(())
    }

    /// normalize before persistence: duplicate schedule months collapse
    /// last-write-wins, the schedule sorts ascending, and an unset due
    /// day falls back to the default
    pub fn normalize(&mut self) {
        if self.due_day == 0 {
            self.due_day = DEFAULT_DUE_DAY;
        }

        let mut by_month: HashMap<Month, MonthlyFee> = HashMap::new();
        for mut fee in self.monthly_fees.drain(..) {
            if fee.due_day == 0 {
                fee.due_day = DEFAULT_DUE_DAY;
            }
            by_month.insert(fee.month, fee);
        }
        let mut fees: Vec<MonthlyFee> = by_month.into_values().collect();
        fees.sort_by_key(|fee| fee.month);
        self.monthly_fees = fees;
    }

    /// fixed-mode base amount for one player; a custom amount wins over
    /// the category default
    pub fn seed_amount(&self, player_id: &str) -> Money {
        self.players
            .get(player_id)
            .and_then(|billing| billing.custom_amount)
            .unwrap_or(self.base_amount)
    }

    /// whether this player is switched on for billing
    pub fn billing_active(&self, player_id: &str) -> bool {
        self.players
            .get(player_id)
            .map(|billing| billing.active)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn month(s: &str) -> Month {
        s.parse().unwrap()
    }

    fn fee(m: &str, amount: i64, due_day: u8) -> MonthlyFee {
        MonthlyFee {
            month: month(m),
            amount: Money::from_major(amount),
            due_day,
            description: None,
        }
    }

    #[test]
    fn test_normalize_dedups_last_write_wins_and_sorts() {
        let mut config = CategoryFeeConfig::default_for("cat-1", "Sub 15");
        config.monthly_fees = vec![
            fee("2024-03", 50, 10),
            fee("2024-01", 40, 10),
            fee("2024-03", 60, 15), // later entry wins
        ];
        config.normalize();

        assert_eq!(config.monthly_fees.len(), 2);
        assert_eq!(config.monthly_fees[0].month, month("2024-01"));
        assert_eq!(config.monthly_fees[1].month, month("2024-03"));
        assert_eq!(config.monthly_fees[1].amount, Money::from_major(60));
        assert_eq!(config.monthly_fees[1].due_day, 15);
    }

    #[test]
    fn test_normalize_defaults_zero_due_day() {
        let mut config = CategoryFeeConfig::default_for("cat-1", "Sub 15");
        config.due_day = 0;
        config.monthly_fees = vec![fee("2024-01", 40, 0)];
        config.normalize();

        assert_eq!(config.due_day, DEFAULT_DUE_DAY);
        assert_eq!(config.monthly_fees[0].due_day, DEFAULT_DUE_DAY);
    }

    #[test]
    fn test_validate_rejects_empty_identity() {
        let config = CategoryFeeConfig::default_for("", "Sub 15");
        assert!(matches!(
            config.validate(),
            Err(BillingError::InvalidConfig { .. })
        ));

        let config = CategoryFeeConfig::default_for("cat-1", "  ");
        assert!(matches!(
            config.validate(),
            Err(BillingError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_out_of_range_due_day() {
        let mut config = CategoryFeeConfig::default_for("cat-1", "Sub 15");
        config.due_day = 32;
        assert!(matches!(
            config.validate(),
            Err(BillingError::InvalidDueDay { day: 32 })
        ));
    }

    #[test]
    fn test_seed_amount_prefers_custom() {
        let mut config = CategoryFeeConfig::default_for("cat-1", "Sub 15");
        config.base_amount = Money::from_major(50);
        config.players.insert(
            "p1".to_string(),
            PlayerBilling {
                active: true,
                custom_amount: Some(Money::from_major(35)),
            },
        );
        config.players.insert(
            "p2".to_string(),
            PlayerBilling {
                active: true,
                custom_amount: None,
            },
        );

        assert_eq!(config.seed_amount("p1"), Money::from_major(35));
        assert_eq!(config.seed_amount("p2"), Money::from_major(50));
        assert_eq!(config.seed_amount("absent"), Money::from_major(50));
    }

    #[test]
    fn test_billing_active_defaults_false() {
        let mut config = CategoryFeeConfig::default_for("cat-1", "Sub 15");
        config.players.insert(
            "p1".to_string(),
            PlayerBilling {
                active: false,
                custom_amount: None,
            },
        );

        assert!(!config.billing_active("p1"));
        assert!(!config.billing_active("absent"));
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        // a document written before discounts existed still loads
        let json = r#"{"category_id":"cat-1","name":"Sub 15"}"#;
        let config: CategoryFeeConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.base_amount, Money::ZERO);
        assert_eq!(config.due_day, DEFAULT_DUE_DAY);
        assert!(!config.is_variable_amount);
        assert!(config.monthly_fees.is_empty());
        assert!(!config.discounts.siblings.enabled);
        assert!(config.players.is_empty());
    }

    #[test]
    fn test_serde_round_trip() {
        let mut config = CategoryFeeConfig::default_for("cat-1", "Sub 15");
        config.base_amount = Money::from_decimal(dec!(50.50));
        config.is_variable_amount = true;
        config.monthly_fees = vec![fee("2024-01", 40, 5)];
        config.discounts.siblings = SiblingDiscount {
            enabled: true,
            amount: dec!(10),
            is_percentage: true,
        };
        config.discounts.custom.push(CustomDiscount {
            id: Uuid::new_v4(),
            name: "summer promo".to_string(),
            amount: dec!(5),
            is_percentage: false,
            description: None,
            months: vec![month("2024-01")],
        });

        let json = serde_json::to_string(&config).unwrap();
        let back: CategoryFeeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
