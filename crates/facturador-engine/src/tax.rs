//! # Tax Calculator
//!
//! IGV and totals from the current tax configuration, kept in step across
//! every calculator attached to the same [`TaxConfigBus`].
//!
//! ## Rate Change Propagation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  calculator A                                                           │
//! │  update_tax_config({ igv_rate: 0.10 })                                  │
//! │       │                                                                 │
//! │       ├── validate rate                                                 │
//! │       ├── take the bus update lock                                      │
//! │       ├── billing_config.igv = 10   (persisted first)                   │
//! │       ├── apply locally                                                 │
//! │       └── bus.publish({ origin: A, igv_rate: 0.10 })                    │
//! │                         │                                               │
//! │            ┌────────────┴────────────┐                                  │
//! │            ▼                         ▼                                  │
//! │     receiver A (skipped,      receiver B: applied before B's next       │
//! │     own origin)               calculate_igv / tax_config read           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::{broadcast, Mutex as AsyncMutex, MutexGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

use facturador_core::tax::{self, percent_from_rate, rate_from_percent, DocumentTotals};
use facturador_core::validation::{validate_igv_percent, validate_igv_rate};
use facturador_core::{LineItem, TaxConfig, TaxConfigUpdate};
use facturador_store::{BillingConfigRepository, StoreError};

use crate::error::EngineResult;

const BUS_CAPACITY: usize = 64;

// =============================================================================
// Tax Config Bus
// =============================================================================

/// A rate change announced on the bus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxRateChanged {
    /// The calculator that made the change.
    pub origin: Uuid,
    pub igv_rate: f64,
}

/// Publish/subscribe channel for tax rate changes.
///
/// Also carries the lock that orders rate updates, so the last rate
/// persisted is the last rate published.
#[derive(Debug, Clone)]
pub struct TaxConfigBus {
    sender: broadcast::Sender<TaxRateChanged>,
    update_lock: Arc<AsyncMutex<()>>,
}

impl TaxConfigBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        TaxConfigBus {
            sender,
            update_lock: Arc::new(AsyncMutex::new(())),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TaxRateChanged> {
        self.sender.subscribe()
    }

    /// Announces `event`. Returns how many subscribers will see it.
    pub fn publish(&self, event: TaxRateChanged) -> usize {
        // No subscribers is not an error.
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    async fn lock_updates(&self) -> MutexGuard<'_, ()> {
        self.update_lock.lock().await
    }
}

impl Default for TaxConfigBus {
    fn default() -> Self {
        TaxConfigBus::new(BUS_CAPACITY)
    }
}

// =============================================================================
// Tax Calculator
// =============================================================================

/// Holds the current [`TaxConfig`] and derives IGV and totals from it.
pub struct TaxCalculator {
    id: Uuid,
    config: RwLock<TaxConfig>,
    billing: BillingConfigRepository,
    bus: TaxConfigBus,
    inbox: Mutex<broadcast::Receiver<TaxRateChanged>>,
}

impl TaxCalculator {
    /// Creates a calculator starting from `config` and subscribes it to `bus`.
    pub fn new(config: TaxConfig, billing: BillingConfigRepository, bus: &TaxConfigBus) -> Self {
        TaxCalculator {
            id: Uuid::new_v4(),
            config: RwLock::new(config),
            billing,
            inbox: Mutex::new(bus.subscribe()),
            bus: bus.clone(),
        }
    }

    /// Creates a calculator whose rate comes from the persisted billing
    /// configuration, falling back to `defaults` when none is stored.
    pub async fn load(
        defaults: TaxConfig,
        billing: BillingConfigRepository,
        bus: &TaxConfigBus,
    ) -> EngineResult<Self> {
        let calculator = TaxCalculator::new(defaults, billing, bus);
        calculator.reload().await?;
        Ok(calculator)
    }

    /// Re-reads the rate from the billing configuration.
    ///
    /// A missing, unreadable or out-of-range stored percentage leaves the
    /// rate as is. Only storage failures are errors.
    pub async fn reload(&self) -> EngineResult<TaxConfig> {
        let stored = match self.billing.igv_percent().await {
            Ok(stored) => stored,
            Err(StoreError::InvalidDocument { reason, .. }) => {
                warn!(reason = %reason, "Ignoring unreadable stored IGV percentage");
                None
            }
            Err(e) => return Err(e.into()),
        };

        match stored {
            Some(percent) if validate_igv_percent(percent).is_ok() => {
                let rate = rate_from_percent(percent);
                self.write_config(|config| config.igv_rate = rate);
                info!(igv_percent = percent, "Tax rate loaded from billing configuration");
            }
            Some(percent) => {
                warn!(igv_percent = percent, "Ignoring out-of-range stored IGV percentage");
            }
            None => debug!("No stored IGV percentage, keeping current rate"),
        }
        Ok(self.tax_config())
    }

    /// `amount × igv_rate`, unrounded.
    pub fn calculate_igv(&self, amount: f64) -> f64 {
        tax::igv(amount, self.current_rate())
    }

    /// `subtotal + calculate_igv(subtotal)`, unrounded.
    pub fn calculate_total(&self, subtotal: f64) -> f64 {
        tax::total(subtotal, self.current_rate())
    }

    /// Rounded document totals for `items` at the current rate.
    pub fn document_totals(&self, items: &[LineItem]) -> DocumentTotals {
        DocumentTotals::from_lines(items, self.current_rate())
    }

    /// Snapshot of the current configuration.
    pub fn tax_config(&self) -> TaxConfig {
        self.drain_inbox();
        self.read_config(TaxConfig::clone)
    }

    /// Shallow-merges `update` into the configuration.
    ///
    /// A new rate is validated, persisted as a percentage and announced on
    /// the bus. Nothing changes if validation or persistence fails. Updates
    /// from calculators sharing a bus run one at a time.
    pub async fn update_tax_config(&self, update: TaxConfigUpdate) -> EngineResult<TaxConfig> {
        if let Some(rate) = update.igv_rate {
            validate_igv_rate(rate)?;
        }

        let _guard = self.bus.lock_updates().await;

        if let Some(rate) = update.igv_rate {
            self.billing.set_igv_percent(percent_from_rate(rate)).await?;
        }

        self.drain_inbox();
        let merged = self.read_config(|config| config.merged(&update));
        self.write_config(|config| *config = merged.clone());

        if let Some(rate) = update.igv_rate {
            let receivers = self.bus.publish(TaxRateChanged {
                origin: self.id,
                igv_rate: rate,
            });
            info!(igv_rate = rate, receivers = receivers, "Tax rate updated");
        }

        Ok(merged)
    }

    /// This calculator's bus identity.
    pub fn id(&self) -> Uuid {
        self.id
    }

    fn current_rate(&self) -> f64 {
        self.drain_inbox();
        self.read_config(|config| config.igv_rate)
    }

    /// Applies every rate change other calculators published since the
    /// last read.
    fn drain_inbox(&self) {
        let mut inbox = self.inbox.lock().unwrap_or_else(|e| e.into_inner());

        loop {
            match inbox.try_recv() {
                Ok(event) if event.origin == self.id => continue,
                Ok(event) => {
                    debug!(igv_rate = event.igv_rate, origin = %event.origin, "Applying broadcast tax rate");
                    self.write_config(|config| config.igv_rate = event.igv_rate);
                }
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped = skipped, "Tax rate updates were dropped, catching up");
                }
                Err(broadcast::error::TryRecvError::Empty)
                | Err(broadcast::error::TryRecvError::Closed) => break,
            }
        }
    }

    fn read_config<T>(&self, f: impl FnOnce(&TaxConfig) -> T) -> T {
        let config = self.config.read().unwrap_or_else(|e| e.into_inner());
        f(&config)
    }

    fn write_config(&self, f: impl FnOnce(&mut TaxConfig)) {
        let mut config = self.config.write().unwrap_or_else(|e| e.into_inner());
        f(&mut config);
    }
}

impl std::fmt::Debug for TaxCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaxCalculator")
            .field("id", &self.id)
            .field("config", &self.read_config(TaxConfig::clone))
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
