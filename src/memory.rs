use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::config::CategoryFeeConfig;
use crate::errors::{BillingError, Result};
use crate::month::Month;
use crate::store::{BillingStore, CategoryDirectory, PlayerDirectory};
use crate::types::{CategoryRecord, Payment, PlayerRecord};

/// in-memory reference backend for the billing store. interior
/// mutability keeps it usable from sweep worker threads; the single
/// mutex makes `replace_open_payments` naturally transactional.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<String, ClubDocuments>>,
}

#[derive(Debug, Default)]
struct ClubDocuments {
    configs: HashMap<String, CategoryFeeConfig>,
    payments: Vec<Payment>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> Result<MutexGuard<'_, HashMap<String, ClubDocuments>>> {
        self.inner.lock().map_err(|_| BillingError::Storage {
            message: "memory store mutex poisoned".to_string(),
        })
    }
}

impl BillingStore for MemoryStore {
    fn load_config(&self, club_id: &str, category_id: &str) -> Result<Option<CategoryFeeConfig>> {
        let clubs = self.guard()?;
        Ok(clubs
            .get(club_id)
            .and_then(|club| club.configs.get(category_id))
            .cloned())
    }

    fn save_config(&self, club_id: &str, config: &CategoryFeeConfig) -> Result<()> {
        let mut clubs = self.guard()?;
        clubs
            .entry(club_id.to_string())
            .or_default()
            .configs
            .insert(config.category_id.clone(), config.clone());
        Ok(())
    }

    fn payments_for_player(&self, club_id: &str, player_id: &str) -> Result<Vec<Payment>> {
        let clubs = self.guard()?;
        Ok(clubs
            .get(club_id)
            .map(|club| {
                club.payments
                    .iter()
                    .filter(|payment| payment.player_id == player_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn payments_for_month(&self, club_id: &str, month: Month) -> Result<Vec<Payment>> {
        let clubs = self.guard()?;
        Ok(clubs
            .get(club_id)
            .map(|club| {
                club.payments
                    .iter()
                    .filter(|payment| payment.month == month)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn find_payment(&self, club_id: &str, payment_id: Uuid) -> Result<Option<Payment>> {
        let clubs = self.guard()?;
        Ok(clubs.get(club_id).and_then(|club| {
            club.payments
                .iter()
                .find(|payment| payment.id == payment_id)
                .cloned()
        }))
    }

    fn update_payment(&self, club_id: &str, payment: &Payment) -> Result<()> {
        let mut clubs = self.guard()?;
        let club = clubs.get_mut(club_id).ok_or(BillingError::PaymentNotFound {
            payment_id: payment.id,
        })?;
        let stored = club
            .payments
            .iter_mut()
            .find(|stored| stored.id == payment.id)
            .ok_or(BillingError::PaymentNotFound {
                payment_id: payment.id,
            })?;
        *stored = payment.clone();
        Ok(())
    }

    fn replace_open_payments(
        &self,
        club_id: &str,
        player_id: &str,
        replacements: &[Payment],
    ) -> Result<usize> {
        let mut clubs = self.guard()?;
        let club = clubs.entry(club_id.to_string()).or_default();

        let before = club.payments.len();
        club.payments
            .retain(|payment| payment.player_id != player_id || payment.is_settled());
        let deleted = before - club.payments.len();

        club.payments.extend_from_slice(replacements);
        Ok(deleted)
    }
}

/// in-memory player and category directory, the test double for the
/// externally-owned directories
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    players: Mutex<HashMap<(String, String), PlayerRecord>>,
    categories: Mutex<HashMap<(String, String), CategoryRecord>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_player(&self, club_id: &str, player: PlayerRecord) {
        if let Ok(mut players) = self.players.lock() {
            players.insert((club_id.to_string(), player.id.clone()), player);
        }
    }

    pub fn put_category(&self, club_id: &str, category: CategoryRecord) {
        if let Ok(mut categories) = self.categories.lock() {
            categories.insert((club_id.to_string(), category.id.clone()), category);
        }
    }
}

impl PlayerDirectory for MemoryDirectory {
    fn get_player(&self, club_id: &str, player_id: &str) -> Result<Option<PlayerRecord>> {
        let players = self.players.lock().map_err(|_| BillingError::Storage {
            message: "player directory mutex poisoned".to_string(),
        })?;
        Ok(players
            .get(&(club_id.to_string(), player_id.to_string()))
            .cloned())
    }
}

impl CategoryDirectory for MemoryDirectory {
    fn get_category(&self, club_id: &str, category_id: &str) -> Result<Option<CategoryRecord>> {
        let categories = self.categories.lock().map_err(|_| BillingError::Storage {
            message: "category directory mutex poisoned".to_string(),
        })?;
        Ok(categories
            .get(&(club_id.to_string(), category_id.to_string()))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Money;
    use crate::types::PaymentStatus;
    use chrono::NaiveDate;

    fn month(s: &str) -> Month {
        s.parse().unwrap()
    }

    fn payment(player_id: &str, m: &str, status: PaymentStatus) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            player_id: player_id.to_string(),
            player_name: "Lucia Perez".to_string(),
            category_id: "cat-1".to_string(),
            category_name: "Sub 15".to_string(),
            month: month(m),
            amount: Money::from_major(50),
            due_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            payment_date: None,
            status,
            method: None,
            notes: None,
        }
    }

    #[test]
    fn test_clubs_are_isolated() {
        let store = MemoryStore::new();
        store
            .replace_open_payments("club-a", "p1", &[payment("p1", "2024-01", PaymentStatus::Pending)])
            .unwrap();

        assert_eq!(store.payments_for_player("club-a", "p1").unwrap().len(), 1);
        assert!(store.payments_for_player("club-b", "p1").unwrap().is_empty());
    }

    #[test]
    fn test_replace_keeps_settled_records() {
        let store = MemoryStore::new();
        let paid = payment("p1", "2024-01", PaymentStatus::Paid);
        let paid_id = paid.id;
        store
            .replace_open_payments(
                "club-a",
                "p1",
                &[paid, payment("p1", "2024-02", PaymentStatus::Overdue)],
            )
            .unwrap();

        let deleted = store
            .replace_open_payments("club-a", "p1", &[payment("p1", "2024-02", PaymentStatus::Pending)])
            .unwrap();

        assert_eq!(deleted, 1);
        let payments = store.payments_for_player("club-a", "p1").unwrap();
        assert_eq!(payments.len(), 2);
        assert!(payments.iter().any(|p| p.id == paid_id));
    }

    #[test]
    fn test_replace_does_not_touch_other_players() {
        let store = MemoryStore::new();
        store
            .replace_open_payments("club-a", "p1", &[payment("p1", "2024-01", PaymentStatus::Pending)])
            .unwrap();
        store
            .replace_open_payments("club-a", "p2", &[payment("p2", "2024-01", PaymentStatus::Pending)])
            .unwrap();

        store.replace_open_payments("club-a", "p1", &[]).unwrap();

        assert!(store.payments_for_player("club-a", "p1").unwrap().is_empty());
        assert_eq!(store.payments_for_player("club-a", "p2").unwrap().len(), 1);
    }

    #[test]
    fn test_update_payment_missing_record() {
        let store = MemoryStore::new();
        let err = store
            .update_payment("club-a", &payment("p1", "2024-01", PaymentStatus::Pending))
            .unwrap_err();
        assert!(matches!(err, BillingError::PaymentNotFound { .. }));
    }

    #[test]
    fn test_payments_for_month_spans_players() {
        let store = MemoryStore::new();
        store
            .replace_open_payments("club-a", "p1", &[payment("p1", "2024-01", PaymentStatus::Pending)])
            .unwrap();
        store
            .replace_open_payments(
                "club-a",
                "p2",
                &[
                    payment("p2", "2024-01", PaymentStatus::Pending),
                    payment("p2", "2024-02", PaymentStatus::Pending),
                ],
            )
            .unwrap();

        assert_eq!(store.payments_for_month("club-a", month("2024-01")).unwrap().len(), 2);
        assert_eq!(store.payments_for_month("club-a", month("2024-02")).unwrap().len(), 1);
    }
}
