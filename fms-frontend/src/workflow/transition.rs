//! Status state machine shared by every stage.
//!
//! ```text
//! Pending  --approve-->  Approved --pay--> Paid --tally--> Processed
//! Pending  --reject--->  Rejected
//! Rejected | Rectify --resubmit--> Pending
//! ```
//!
//! `Rectify` is only ever set by the backend.

use std::fmt;

use crate::error::WorkflowError;
use crate::models::{Decision, PaymentStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Approve,
    Reject,
    Pay,
    Tally,
    Resubmit,
}

impl Transition {
    pub fn as_str(self) -> &'static str {
        match self {
            Transition::Approve => "approve",
            Transition::Reject => "reject",
            Transition::Pay => "pay",
            Transition::Tally => "tally",
            Transition::Resubmit => "resubmit",
        }
    }

    pub fn target(self) -> PaymentStatus {
        match self {
            Transition::Approve => PaymentStatus::Approved,
            Transition::Reject => PaymentStatus::Rejected,
            Transition::Pay => PaymentStatus::Paid,
            Transition::Tally => PaymentStatus::Processed,
            Transition::Resubmit => PaymentStatus::Pending,
        }
    }

    fn allowed_from(self, status: PaymentStatus) -> bool {
        use PaymentStatus::*;

        matches!(
            (self, status),
            (Transition::Approve | Transition::Reject, Pending)
                | (Transition::Pay, Approved)
                | (Transition::Tally, Paid)
                | (Transition::Resubmit, Rejected | Rectify)
        )
    }
}

impl From<Decision> for Transition {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => Transition::Approve,
            Decision::Rejected => Transition::Reject,
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PaymentStatus {
    /// Status after `transition`, or an error when the pipeline forbids it.
    pub fn apply(self, transition: Transition) -> Result<PaymentStatus, WorkflowError> {
        if transition.allowed_from(self) {
            Ok(transition.target())
        } else {
            Err(WorkflowError::IllegalTransition {
                from: self,
                transition,
            })
        }
    }

    /// Only records that have not yet been reviewed may be deleted.
    pub fn is_deletable(self) -> bool {
        self == PaymentStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATUSES: [PaymentStatus; 6] = [
        PaymentStatus::Pending,
        PaymentStatus::Approved,
        PaymentStatus::Rejected,
        PaymentStatus::Paid,
        PaymentStatus::Processed,
        PaymentStatus::Rectify,
    ];

    const ALL_TRANSITIONS: [Transition; 5] = [
        Transition::Approve,
        Transition::Reject,
        Transition::Pay,
        Transition::Tally,
        Transition::Resubmit,
    ];

    #[test]
    fn happy_path_walks_the_pipeline() {
        let status = PaymentStatus::Pending
            .apply(Transition::Approve)
            .and_then(|s| s.apply(Transition::Pay))
            .and_then(|s| s.apply(Transition::Tally))
            .unwrap();

        assert_eq!(status, PaymentStatus::Processed);
    }

    #[test]
    fn rejection_loops_back_through_resubmit() {
        let status = PaymentStatus::Pending
            .apply(Transition::Reject)
            .and_then(|s| s.apply(Transition::Resubmit))
            .unwrap();

        assert_eq!(status, PaymentStatus::Pending);
        assert_eq!(
            PaymentStatus::Rectify.apply(Transition::Resubmit).unwrap(),
            PaymentStatus::Pending
        );
    }

    #[test]
    fn stages_cannot_be_skipped() {
        assert!(PaymentStatus::Pending.apply(Transition::Pay).is_err());
        assert!(PaymentStatus::Approved.apply(Transition::Tally).is_err());
        assert!(PaymentStatus::Rejected.apply(Transition::Pay).is_err());
        assert!(PaymentStatus::Paid.apply(Transition::Approve).is_err());
    }

    #[test]
    fn processed_has_no_outgoing_transition() {
        for transition in ALL_TRANSITIONS {
            assert!(PaymentStatus::Processed.apply(transition).is_err());
        }
    }

    #[test]
    fn only_resubmit_moves_backwards() {
        fn rank(status: PaymentStatus) -> u8 {
            match status {
                PaymentStatus::Pending => 0,
                PaymentStatus::Approved | PaymentStatus::Rejected => 1,
                PaymentStatus::Rectify => 2,
                PaymentStatus::Paid => 2,
                PaymentStatus::Processed => 3,
            }
        }

        for status in ALL_STATUSES {
            for transition in ALL_TRANSITIONS {
                if let Ok(next) = status.apply(transition) {
                    assert!(
                        rank(next) > rank(status) || transition == Transition::Resubmit,
                        "{status} --{transition}--> {next} moves backwards"
                    );
                }
            }
        }
    }

    #[test]
    fn only_pending_records_are_deletable() {
        for status in ALL_STATUSES {
            assert_eq!(status.is_deletable(), status == PaymentStatus::Pending);
        }
    }
}
