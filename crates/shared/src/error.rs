use time::Time;

use crate::{PlanType, Slot, SubscriptionStatus};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{slot} is closed, orders stop at {:02}:{:02}", .cutoff.hour(), .cutoff.minute())]
    CutoffViolation { slot: Slot, cutoff: Time },

    #[error("a {plan_type} plan needs at least {minimum} meals, {selected} selected")]
    MinimumNotMet {
        plan_type: PlanType,
        minimum: u32,
        selected: u64,
    },

    #[error("{}", no_eligible_message(.expired))]
    NoCutoffEligibleSelections { expired: Vec<Slot> },

    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    InvalidDateKey(String),

    #[error("subscription cannot move from {from} to {to}")]
    InvalidTransition {
        from: SubscriptionStatus,
        to: SubscriptionStatus,
    },

    #[error("{0}")]
    Unknown(#[from] anyhow::Error),
}

impl Error {
    /// Validation outcomes the customer can fix by changing the selection.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::CutoffViolation { .. }
                | Error::MinimumNotMet { .. }
                | Error::NoCutoffEligibleSelections { .. }
                | Error::InvalidDateKey(_)
        )
    }
}

fn no_eligible_message(expired: &[Slot]) -> String {
    if expired.is_empty() {
        return "nothing to subscribe to, select at least one meal".to_owned();
    }

    let slots = expired
        .iter()
        .map(|slot| slot.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    format!("every selected meal has passed its cutoff ({slots}), select again")
}

pub type Result<T> = std::result::Result<T, Error>;
