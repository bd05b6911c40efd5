use std::sync::Arc;
use uuid::Uuid;

use crate::config::CategoryFeeConfig;
use crate::errors::Result;
use crate::month::Month;
use crate::types::{CategoryRecord, Payment, PlayerRecord};

/// externally-owned player directory
pub trait PlayerDirectory {
    fn get_player(&self, club_id: &str, player_id: &str) -> Result<Option<PlayerRecord>>;
}

/// externally-owned category directory
pub trait CategoryDirectory {
    fn get_category(&self, club_id: &str, category_id: &str) -> Result<Option<CategoryRecord>>;
}

/// document-store seam for billing documents, keyed per club
pub trait BillingStore {
    fn load_config(&self, club_id: &str, category_id: &str) -> Result<Option<CategoryFeeConfig>>;

    fn save_config(&self, club_id: &str, config: &CategoryFeeConfig) -> Result<()>;

    fn payments_for_player(&self, club_id: &str, player_id: &str) -> Result<Vec<Payment>>;

    fn payments_for_month(&self, club_id: &str, month: Month) -> Result<Vec<Payment>>;

    fn find_payment(&self, club_id: &str, payment_id: Uuid) -> Result<Option<Payment>>;

    fn update_payment(&self, club_id: &str, payment: &Payment) -> Result<()>;

    /// atomically delete the player's non-settled payments and insert
    /// the replacement set; settled records are left untouched. a single
    /// transaction so concurrent regenerations cannot observe a player
    /// with zero or duplicate records for a month. returns the number of
    /// records deleted.
    fn replace_open_payments(
        &self,
        club_id: &str,
        player_id: &str,
        replacements: &[Payment],
    ) -> Result<usize>;
}

// shared handles delegate, so one backend can serve several seams

impl<T: PlayerDirectory + ?Sized> PlayerDirectory for Arc<T> {
    fn get_player(&self, club_id: &str, player_id: &str) -> Result<Option<PlayerRecord>> {
        (**self).get_player(club_id, player_id)
    }
}

impl<T: CategoryDirectory + ?Sized> CategoryDirectory for Arc<T> {
    fn get_category(&self, club_id: &str, category_id: &str) -> Result<Option<CategoryRecord>> {
        (**self).get_category(club_id, category_id)
    }
}

impl<T: BillingStore + ?Sized> BillingStore for Arc<T> {
    fn load_config(&self, club_id: &str, category_id: &str) -> Result<Option<CategoryFeeConfig>> {
        (**self).load_config(club_id, category_id)
    }

    fn save_config(&self, club_id: &str, config: &CategoryFeeConfig) -> Result<()> {
        (**self).save_config(club_id, config)
    }

    fn payments_for_player(&self, club_id: &str, player_id: &str) -> Result<Vec<Payment>> {
        (**self).payments_for_player(club_id, player_id)
    }

    fn payments_for_month(&self, club_id: &str, month: Month) -> Result<Vec<Payment>> {
        (**self).payments_for_month(club_id, month)
    }

    fn find_payment(&self, club_id: &str, payment_id: Uuid) -> Result<Option<Payment>> {
        (**self).find_payment(club_id, payment_id)
    }

    fn update_payment(&self, club_id: &str, payment: &Payment) -> Result<()> {
        (**self).update_payment(club_id, payment)
    }

    fn replace_open_payments(
        &self,
        club_id: &str,
        player_id: &str,
        replacements: &[Payment],
    ) -> Result<usize> {
        (**self).replace_open_payments(club_id, player_id, replacements)
    }
}
