//! # Conditions
//!
//! `Ready` and `Synced` conditions of managed resources.
//!
//! `Ready` follows the remote status string of the cloud resource; `Synced`
//! records whether the last reconciliation pass succeeded.

use crate::crd::Condition;

pub const TYPE_READY: &str = "Ready";
pub const TYPE_SYNCED: &str = "Synced";

const REASON_RECONCILE_SUCCESS: &str = "ReconcileSuccess";
const REASON_RECONCILE_ERROR: &str = "ReconcileError";

/// Availability of the cloud resource as reflected by the `Ready` condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Available,
    Creating,
    Deleting,
    Unavailable,
}

impl ReadyState {
    #[must_use]
    pub fn reason(self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Creating => "Creating",
            Self::Deleting => "Deleting",
            Self::Unavailable => "Unavailable",
        }
    }

    fn status(self) -> &'static str {
        if self == Self::Available {
            "True"
        } else {
            "False"
        }
    }
}

/// Remote status strings of one kind, grouped by [`ReadyState`]
///
/// Strings not listed anywhere map to [`ReadyState::Unavailable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusMap {
    pub available: &'static [&'static str],
    pub creating: &'static [&'static str],
    pub deleting: &'static [&'static str],
}

impl StatusMap {
    /// For kinds without a lifecycle status: existing means available
    pub const EXISTS_ONLY: Self = Self {
        available: &[],
        creating: &[],
        deleting: &[],
    };

    #[must_use]
    pub fn ready_state(&self, status: &str) -> ReadyState {
        if self.available.contains(&status) {
            ReadyState::Available
        } else if self.creating.contains(&status) {
            ReadyState::Creating
        } else if self.deleting.contains(&status) {
            ReadyState::Deleting
        } else {
            ReadyState::Unavailable
        }
    }

    #[must_use]
    pub fn is_creating(&self, status: &str) -> bool {
        self.creating.contains(&status)
    }

    #[must_use]
    pub fn is_deleting(&self, status: &str) -> bool {
        self.deleting.contains(&status)
    }
}

fn condition(r#type: &str, status: &str, reason: &str, message: Option<String>) -> Condition {
    Condition {
        r#type: r#type.to_string(),
        status: status.to_string(),
        last_transition_time: Some(chrono::Utc::now().to_rfc3339()),
        reason: Some(reason.to_string()),
        message,
    }
}

#[must_use]
pub fn ready(state: ReadyState) -> Condition {
    condition(TYPE_READY, state.status(), state.reason(), None)
}

#[must_use]
pub fn reconcile_success() -> Condition {
    condition(TYPE_SYNCED, "True", REASON_RECONCILE_SUCCESS, None)
}

#[must_use]
pub fn reconcile_error(message: impl Into<String>) -> Condition {
    condition(TYPE_SYNCED, "False", REASON_RECONCILE_ERROR, Some(message.into()))
}

/// Insert or replace the condition of the same type
///
/// The previous transition time is kept when status and reason did not change,
/// so periodic observes do not churn the object.
pub fn set_condition(conditions: &mut Vec<Condition>, mut new: Condition) {
    match conditions.iter_mut().find(|c| c.r#type == new.r#type) {
        Some(existing) => {
            if existing.status == new.status && existing.reason == new.reason {
                new.last_transition_time = existing.last_transition_time.take();
            }
            *existing = new;
        }
        None => conditions.push(new),
    }
}

#[must_use]
pub fn find<'a>(conditions: &'a [Condition], r#type: &str) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.r#type == r#type)
}
