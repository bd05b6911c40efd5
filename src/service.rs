use chrono::{DateTime, NaiveDate, Utc};
use hourglass_rs::SafeTimeProvider;
use std::collections::HashSet;
use std::sync::Mutex;
use std::thread;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::CategoryFeeConfig;
use crate::errors::{BillingError, Result};
use crate::events::{BillingEvent, EventStore};
use crate::generator;
use crate::month::Month;
use crate::store::{BillingStore, CategoryDirectory, PlayerDirectory};
use crate::types::{
    Payment, PaymentMethod, PaymentStatus, PlayerFailure, RegenerationSummary, SweepReport,
};

/// number of players regenerated concurrently during a save-time sweep
pub const DEFAULT_SWEEP_FAN_OUT: usize = 4;

/// optional settlement details accompanying a manual status change
#[derive(Debug, Clone, Default)]
pub struct StatusUpdate {
    pub payment_date: Option<NaiveDate>,
    pub method: Option<PaymentMethod>,
    pub notes: Option<String>,
}

/// billing engine facade. stateless apart from the event buffer; all
/// document-store access goes through the injected seams, and every
/// operation that reads the clock takes a time provider.
pub struct BillingService<S, P, C> {
    store: S,
    players: P,
    categories: C,
    fan_out: usize,
    pub events: EventStore,
}

impl<S, P, C> BillingService<S, P, C>
where
    S: BillingStore,
    P: PlayerDirectory,
    C: CategoryDirectory,
{
    pub fn new(store: S, players: P, categories: C) -> Self {
        Self {
            store,
            players,
            categories,
            fan_out: DEFAULT_SWEEP_FAN_OUT,
            events: EventStore::new(),
        }
    }

    /// bound the sweep worker pool (minimum 1)
    pub fn with_fan_out(mut self, fan_out: usize) -> Self {
        self.fan_out = fan_out.max(1);
        self
    }

    /// read a category's fee configuration, creating and persisting the
    /// default the first time the category is billed
    pub fn get_config(&self, club_id: &str, category_id: &str) -> Result<CategoryFeeConfig> {
        if let Some(config) = self.store.load_config(club_id, category_id)? {
            return Ok(config);
        }

        let category = self
            .categories
            .get_category(club_id, category_id)?
            .ok_or_else(|| BillingError::CategoryNotFound {
                category_id: category_id.to_string(),
            })?;

        let config = CategoryFeeConfig::default_for(category_id, &category.name);
        self.store.save_config(club_id, &config)?;
        debug!(club_id, category_id, "created default fee configuration");
        Ok(config)
    }

    /// validate, normalize and persist a configuration, then sweep every
    /// player switched on in it. saving is the sole trigger for bulk
    /// regeneration. per-player failures land in the report instead of
    /// aborting the batch; the save itself can still fail.
    pub fn save_config(
        &self,
        club_id: &str,
        mut config: CategoryFeeConfig,
        time: &SafeTimeProvider,
    ) -> Result<SweepReport>
    where
        S: Sync,
        P: Sync,
        C: Sync,
    {
        let now = time.now();
        config.normalize();
        config.validate()?;
        config.updated_at = Some(now);
        self.store.save_config(club_id, &config)?;
        debug!(club_id, category_id = %config.category_id, "fee configuration saved");
        self.events.emit(BillingEvent::ConfigSaved {
            category_id: config.category_id.clone(),
            timestamp: now,
        });

        let mut targets: Vec<String> = config
            .players
            .iter()
            .filter(|(_, billing)| billing.active)
            .map(|(player_id, _)| player_id.clone())
            .collect();
        targets.sort();

        let report = self.sweep(club_id, &targets, now);
        if !report.is_clean() {
            warn!(
                club_id,
                category_id = %config.category_id,
                failed = report.failed.len(),
                "sweep finished with per-player failures"
            );
        }
        self.events.emit(BillingEvent::SweepCompleted {
            category_id: config.category_id,
            players_swept: report.succeeded.len(),
            players_failed: report.failed.len(),
            timestamp: now,
        });
        Ok(report)
    }

    /// regenerate one player's non-settled payments from the current
    /// configuration. destructive by design: manual edits to pending or
    /// overdue records are discarded, settled records survive verbatim.
    /// re-running with an unchanged configuration and clock produces the
    /// same non-settled set.
    pub fn regenerate(
        &self,
        club_id: &str,
        player_id: &str,
        time: &SafeTimeProvider,
    ) -> Result<RegenerationSummary> {
        self.regenerate_at(club_id, player_id, time.now())
    }

    fn regenerate_at(
        &self,
        club_id: &str,
        player_id: &str,
        now: DateTime<Utc>,
    ) -> Result<RegenerationSummary> {
        let mut summary = RegenerationSummary {
            player_id: player_id.to_string(),
            ..RegenerationSummary::default()
        };

        // missing or inactive players degrade to a no-op so ui flows
        // stay non-blocking
        let Some(player) = self.players.get_player(club_id, player_id)? else {
            debug!(club_id, player_id, "player not found, skipping regeneration");
            summary.skipped = true;
            return Ok(summary);
        };
        if !player.active {
            debug!(club_id, player_id, "player inactive, skipping regeneration");
            summary.skipped = true;
            return Ok(summary);
        }

        let config = match self.get_config(club_id, &player.category_id) {
            Ok(config) => config,
            Err(BillingError::CategoryNotFound { .. }) => {
                debug!(club_id, player_id, "category gone, skipping regeneration");
                summary.skipped = true;
                return Ok(summary);
            }
            Err(error) => return Err(error),
        };
        if !config.billing_active(player_id) {
            summary.skipped = true;
            return Ok(summary);
        }

        let today = now.date_naive();
        let existing = self.store.payments_for_player(club_id, player_id)?;
        let settled: HashSet<Month> = existing
            .iter()
            .filter(|payment| payment.is_settled())
            .map(|payment| payment.month)
            .collect();
        summary.retained_paid = settled.len();

        let replacements: Vec<Payment> = generator::billable_months(&config, &player, today)
            .iter()
            .filter(|billable| !settled.contains(&billable.month))
            .map(|billable| generator::build_payment(&player, &config, billable, today))
            .collect();
        summary.generated = replacements.len();

        self.store
            .replace_open_payments(club_id, player_id, &replacements)?;

        self.events.emit(BillingEvent::PaymentsRegenerated {
            player_id: player_id.to_string(),
            generated: summary.generated,
            retained_paid: summary.retained_paid,
            timestamp: now,
        });
        Ok(summary)
    }

    /// club-wide view for one month. intentionally does not regenerate:
    /// that is the save-time sweep's job, and a club-wide recompute per
    /// read would hammer the store.
    pub fn get_monthly_payments(&self, club_id: &str, month: Month) -> Result<Vec<Payment>> {
        let mut payments = self.store.payments_for_month(club_id, month)?;
        payments.sort_by(|a, b| {
            a.player_name
                .cmp(&b.player_name)
                .then_with(|| a.player_id.cmp(&b.player_id))
        });
        Ok(payments)
    }

    /// per-player account view. always regenerates first so the view is
    /// current even when the configuration changed without this player
    /// being swept.
    pub fn get_player_payments(
        &self,
        club_id: &str,
        player_id: &str,
        time: &SafeTimeProvider,
    ) -> Result<Vec<Payment>> {
        self.regenerate(club_id, player_id, time)?;
        let mut payments = self.store.payments_for_player(club_id, player_id)?;
        payments.sort_by_key(|payment| payment.month);
        Ok(payments)
    }

    /// manual status toggle on a single record; no regeneration.
    /// marking a payment paid settles it against future regeneration;
    /// moving it away from paid clears the settlement fields.
    pub fn set_payment_status(
        &self,
        club_id: &str,
        payment_id: Uuid,
        status: PaymentStatus,
        update: StatusUpdate,
        time: &SafeTimeProvider,
    ) -> Result<Payment> {
        let Some(mut payment) = self.store.find_payment(club_id, payment_id)? else {
            return Err(BillingError::PaymentNotFound { payment_id });
        };

        let old_status = payment.status;
        payment.status = status;
        match status {
            PaymentStatus::Paid => {
                payment.payment_date = update
                    .payment_date
                    .or_else(|| Some(time.now().date_naive()));
                if update.method.is_some() {
                    payment.method = update.method;
                }
            }
            PaymentStatus::Pending | PaymentStatus::Overdue => {
                payment.payment_date = None;
                payment.method = None;
            }
        }
        if update.notes.is_some() {
            payment.notes = update.notes;
        }

        self.store.update_payment(club_id, &payment)?;
        self.events.emit(BillingEvent::PaymentStatusChanged {
            payment_id,
            old_status,
            new_status: status,
            amount: payment.amount,
            timestamp: time.now(),
        });
        Ok(payment)
    }

    /// regenerate a batch of players through a bounded worker pool,
    /// isolating failures per player
    fn sweep(&self, club_id: &str, player_ids: &[String], now: DateTime<Utc>) -> SweepReport
    where
        S: Sync,
        P: Sync,
        C: Sync,
    {
        let report = Mutex::new(SweepReport::default());

        for chunk in player_ids.chunks(self.fan_out) {
            thread::scope(|scope| {
                for player_id in chunk {
                    let report = &report;
                    scope.spawn(move || {
                        let outcome = self.regenerate_at(club_id, player_id, now);
                        if let Ok(mut report) = report.lock() {
                            match outcome {
                                Ok(summary) => report.succeeded.push(summary),
                                Err(error) => report.failed.push(PlayerFailure {
                                    player_id: player_id.clone(),
                                    error,
                                }),
                            }
                        }
                    });
                }
            });
        }

        let mut report = report.into_inner().unwrap_or_default();
        report.succeeded.sort_by(|a, b| a.player_id.cmp(&b.player_id));
        report.failed.sort_by(|a, b| a.player_id.cmp(&b.player_id));
        report
    }
}
