//! In-app token purchases.
//!
//! The platform payment queue is abstracted behind [`PaymentQueue`]; it
//! reports transaction updates which [`PurchaseFlow`] reduces to a
//! [`PurchaseOutcome`]. Crediting the balance is left to the caller.

#![allow(missing_docs)]

use std::fmt;

use crate::core::errors::Result;

// ──────────────────── catalog ────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    pub id: &'static str,
    pub title: &'static str,
    pub tokens: u64,
    pub price_label: &'static str,
}

/// Products offered in the token store, cheapest first.
pub const CATALOG: [Product; 3] = [
    Product {
        id: "nightlight.tokens.small",
        title: "Handful of tokens",
        tokens: 10,
        price_label: "$0.99",
    },
    Product {
        id: "nightlight.tokens.medium",
        title: "Pocket of tokens",
        tokens: 50,
        price_label: "$3.99",
    },
    Product {
        id: "nightlight.tokens.large",
        title: "Jar of tokens",
        tokens: 120,
        price_label: "$7.99",
    },
];

pub fn product(id: &str) -> Option<&'static Product> {
    CATALOG.iter().find(|product| product.id == id)
}

// ──────────────────── transactions ────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionState {
    Purchasing,
    Purchased,
    Restored,
    Failed { cancelled: bool, reason: String },
    /// Waiting on outside approval (e.g. a parent).
    Deferred,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionUpdate {
    pub transaction_id: String,
    pub product_id: String,
    pub state: TransactionState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Success { product_id: String, tokens: u64 },
    Cancelled,
    Failed(String),
}

impl fmt::Display for PurchaseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { tokens, .. } => write!(f, "purchased {tokens} tokens"),
            Self::Cancelled => write!(f, "purchase cancelled"),
            Self::Failed(reason) => write!(f, "purchase failed: {reason}"),
        }
    }
}

/// The platform payment queue.
pub trait PaymentQueue {
    fn add_payment(&mut self, product_id: &str) -> Result<()>;

    /// Acknowledge a terminal transaction so it is not redelivered.
    fn finish_transaction(&mut self, transaction_id: &str);
}

// ──────────────────── flow ────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PurchaseState {
    #[default]
    Idle,
    Purchasing { product_id: String },
    Deferred { product_id: String },
}

/// Tracks one purchase at a time.
#[derive(Debug, Default)]
pub struct PurchaseFlow {
    state: PurchaseState,
}

impl PurchaseFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PurchaseState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        !matches!(self.state, PurchaseState::Idle)
    }

    /// Queue a payment for `product_id`.
    ///
    /// Unknown products fail immediately; a second purchase while one is
    /// pending is refused.
    pub fn begin(
        &mut self,
        product_id: &str,
        queue: &mut dyn PaymentQueue,
    ) -> std::result::Result<(), PurchaseOutcome> {
        if product(product_id).is_none() {
            return Err(PurchaseOutcome::Failed(format!("unknown product {product_id}")));
        }
        if self.is_busy() {
            return Err(PurchaseOutcome::Failed("another purchase is in progress".into()));
        }
        queue
            .add_payment(product_id)
            .map_err(|e| PurchaseOutcome::Failed(e.to_string()))?;
        self.state = PurchaseState::Purchasing {
            product_id: product_id.to_string(),
        };
        Ok(())
    }

    /// Reduce a transaction update. Returns an outcome for terminal states.
    ///
    /// Completed transactions for catalog products are credited even when
    /// they were not started by this flow (e.g. delivered after a restart).
    /// A deferral only parks the flow when it names the pending product.
    pub fn handle_update(
        &mut self,
        update: &TransactionUpdate,
        queue: &mut dyn PaymentQueue,
    ) -> Option<PurchaseOutcome> {
        match &update.state {
            TransactionState::Purchasing => None,
            TransactionState::Deferred => {
                if self.pending() == Some(update.product_id.as_str()) {
                    self.state = PurchaseState::Deferred {
                        product_id: update.product_id.clone(),
                    };
                }
                None
            }
            TransactionState::Purchased | TransactionState::Restored => {
                queue.finish_transaction(&update.transaction_id);
                self.settle(&update.product_id);
                Some(match product(&update.product_id) {
                    Some(product) => PurchaseOutcome::Success {
                        product_id: product.id.to_string(),
                        tokens: product.tokens,
                    },
                    None => PurchaseOutcome::Failed(format!(
                        "unknown product {}",
                        update.product_id
                    )),
                })
            }
            TransactionState::Failed { cancelled, reason } => {
                queue.finish_transaction(&update.transaction_id);
                self.settle(&update.product_id);
                Some(if *cancelled {
                    PurchaseOutcome::Cancelled
                } else {
                    PurchaseOutcome::Failed(reason.clone())
                })
            }
        }
    }

    fn pending(&self) -> Option<&str> {
        match &self.state {
            PurchaseState::Purchasing { product_id }
            | PurchaseState::Deferred { product_id } => Some(product_id.as_str()),
            PurchaseState::Idle => None,
        }
    }

    fn settle(&mut self, product_id: &str) {
        if self.pending() == Some(product_id) {
            self.state = PurchaseState::Idle;
        }
    }
}
