use crate::models::{ScheduledProduct, Slot};
use crate::scheduler::RecurrenceRule;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: &'static str,
    pub action: &'static str,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot {} while {}", self.action, self.from)
    }
}

impl std::error::Error for InvalidTransition {}

/// A fully configured schedule action, ready for `scheduler::expand`.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSchedule {
    pub product: ScheduledProduct,
    pub date: NaiveDate,
    pub slot: Slot,
    pub rule: RecurrenceRule,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ScheduleFlow {
    #[default]
    Idle,
    ProductSelected {
        product: ScheduledProduct,
        date: NaiveDate,
        slot: Slot,
    },
    RuleConfigured {
        product: ScheduledProduct,
        date: NaiveDate,
        slot: Slot,
        rule: RecurrenceRule,
    },
}

impl ScheduleFlow {
    fn name(&self) -> &'static str {
        match self {
            ScheduleFlow::Idle => "idle",
            ScheduleFlow::ProductSelected { .. } => "product_selected",
            ScheduleFlow::RuleConfigured { .. } => "rule_configured",
        }
    }

    fn invalid(&self, action: &'static str) -> InvalidTransition {
        InvalidTransition {
            from: self.name(),
            action,
        }
    }

    /// Picking a product is allowed until a rule is configured; picking again
    /// replaces the earlier choice.
    pub fn select_product(
        &mut self,
        product: ScheduledProduct,
        date: NaiveDate,
        slot: Slot,
    ) -> Result<(), InvalidTransition> {
        match self {
            ScheduleFlow::Idle | ScheduleFlow::ProductSelected { .. } => {
                *self = ScheduleFlow::ProductSelected { product, date, slot };
                Ok(())
            }
            ScheduleFlow::RuleConfigured { .. } => Err(self.invalid("select a product")),
        }
    }

    pub fn configure_rule(&mut self, rule: RecurrenceRule) -> Result<(), InvalidTransition> {
        match std::mem::take(self) {
            ScheduleFlow::ProductSelected { product, date, slot }
            | ScheduleFlow::RuleConfigured { product, date, slot, .. } => {
                *self = ScheduleFlow::RuleConfigured { product, date, slot, rule };
                Ok(())
            }
            ScheduleFlow::Idle => Err(ScheduleFlow::Idle.invalid("configure a rule")),
        }
    }

    /// Drops the rule and keeps the chosen product.
    pub fn back(&mut self) -> Result<(), InvalidTransition> {
        match std::mem::take(self) {
            ScheduleFlow::RuleConfigured { product, date, slot, .. } => {
                *self = ScheduleFlow::ProductSelected { product, date, slot };
                Ok(())
            }
            other => {
                let err = other.invalid("go back");
                *self = other;
                Err(err)
            }
        }
    }

    pub fn commit(&mut self) -> Result<PendingSchedule, InvalidTransition> {
        match std::mem::take(self) {
            ScheduleFlow::RuleConfigured { product, date, slot, rule } => Ok(PendingSchedule {
                product,
                date,
                slot,
                rule,
            }),
            other => {
                let err = other.invalid("commit");
                *self = other;
                Err(err)
            }
        }
    }

    pub fn cancel(&mut self) {
        *self = ScheduleFlow::Idle;
    }
}

/// Puts an uncommitted schedule back into the configured state.
impl From<PendingSchedule> for ScheduleFlow {
    fn from(pending: PendingSchedule) -> Self {
        ScheduleFlow::RuleConfigured {
            product: pending.product,
            date: pending.date,
            slot: pending.slot,
            rule: pending.rule,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingDeletion {
    pub product: ScheduledProduct,
    pub date: NaiveDate,
    pub slot: Slot,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DeletionFlow {
    #[default]
    NoPendingDeletion,
    PendingDeletion(PendingDeletion),
}

impl DeletionFlow {
    /// A new request replaces any unconfirmed one.
    pub fn request(&mut self, product: ScheduledProduct, date: NaiveDate, slot: Slot) {
        *self = DeletionFlow::PendingDeletion(PendingDeletion { product, date, slot });
    }

    /// Resolves the pending deletion; the caller applies `remove_scoped`.
    pub fn confirm(&mut self) -> Result<PendingDeletion, InvalidTransition> {
        match std::mem::take(self) {
            DeletionFlow::PendingDeletion(pending) => Ok(pending),
            DeletionFlow::NoPendingDeletion => Err(InvalidTransition {
                from: "no_pending_deletion",
                action: "confirm a deletion",
            }),
        }
    }

    pub fn cancel(&mut self) {
        *self = DeletionFlow::NoPendingDeletion;
    }
}
