//! Lifecycle tables.
//!
//! Appointments and invoices are guarded: each named action has a fixed set
//! of source states and anything else is a `Conflict` naming the current
//! state. Patient ward status and prescription status are assigned freely.

use database_layer::models::{AppointmentStatus, InvoiceStatus, PatientStatus};
use serde::{Deserialize, Serialize};

use crate::error::{PolicyError, PolicyResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentAction {
    Approve,
    Decline,
    Complete,
    Cancel,
}

impl AppointmentAction {
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Decline => "decline",
            Self::Complete => "complete",
            Self::Cancel => "cancel",
        }
    }

    pub const fn sources(self) -> &'static [AppointmentStatus] {
        use AppointmentStatus as S;
        match self {
            Self::Approve | Self::Decline => &[S::Requested, S::Pending],
            Self::Complete => &[S::Accepted, S::Approved],
            Self::Cancel => &[S::Requested, S::Pending, S::Accepted, S::Approved],
        }
    }

    pub const fn target(self) -> AppointmentStatus {
        match self {
            Self::Approve => AppointmentStatus::Accepted,
            Self::Decline => AppointmentStatus::Declined,
            Self::Complete => AppointmentStatus::Completed,
            Self::Cancel => AppointmentStatus::Cancelled,
        }
    }

    /// Approve, decline and complete belong to the attending doctor alone.
    pub const fn doctor_only(self) -> bool {
        !matches!(self, Self::Cancel)
    }

    pub fn apply(self, current: AppointmentStatus) -> PolicyResult<AppointmentStatus> {
        if self.sources().contains(&current) {
            Ok(self.target())
        } else {
            Err(PolicyError::Conflict(format!(
                "Cannot {} an appointment in {} state",
                self.verb(),
                current.label()
            )))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceAction {
    MarkPaid,
    Cancel,
}

impl InvoiceAction {
    pub const fn verb(self) -> &'static str {
        match self {
            Self::MarkPaid => "mark as paid",
            Self::Cancel => "cancel",
        }
    }

    pub fn apply(self, current: InvoiceStatus) -> PolicyResult<InvoiceStatus> {
        match (self, current) {
            (Self::MarkPaid, InvoiceStatus::Unpaid) => Ok(InvoiceStatus::Paid),
            (Self::Cancel, InvoiceStatus::Unpaid) => Ok(InvoiceStatus::Cancelled),
            (Self::MarkPaid, InvoiceStatus::Paid) => Err(PolicyError::Conflict(
                "Invoice is already marked as paid.".to_string(),
            )),
            (action, status) => Err(PolicyError::Conflict(format!(
                "Cannot {} an invoice in {} state",
                action.verb(),
                status.label()
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatientWardAction {
    Admit,
    Attend,
    Discharge,
}

impl PatientWardAction {
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Admit => "admit",
            Self::Attend => "attend",
            Self::Discharge => "discharge",
        }
    }

    /// Unguarded: any current status may move to the action's target.
    pub const fn target(self) -> PatientStatus {
        match self {
            Self::Admit => PatientStatus::Admitted,
            Self::Attend => PatientStatus::Attended,
            Self::Discharge => PatientStatus::Discharged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AppointmentStatus as S;

    #[test]
    fn approve_and_decline_only_from_open_requests() {
        assert_eq!(AppointmentAction::Approve.apply(S::Requested), Ok(S::Accepted));
        assert_eq!(AppointmentAction::Approve.apply(S::Pending), Ok(S::Accepted));
        assert_eq!(AppointmentAction::Decline.apply(S::Pending), Ok(S::Declined));
        assert!(AppointmentAction::Approve.apply(S::Accepted).is_err());
    }

    #[test]
    fn approving_a_declined_appointment_names_the_state() {
        let err = AppointmentAction::Approve.apply(S::Declined).unwrap_err();
        match err {
            PolicyError::Conflict(message) => assert!(message.contains("Declined"), "{message}"),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn complete_requires_an_accepted_visit() {
        assert_eq!(AppointmentAction::Complete.apply(S::Accepted), Ok(S::Completed));
        assert_eq!(AppointmentAction::Complete.apply(S::Approved), Ok(S::Completed));
        for state in [S::Requested, S::Pending, S::Declined, S::Cancelled, S::Completed] {
            assert!(AppointmentAction::Complete.apply(state).is_err(), "{state}");
        }
    }

    #[test]
    fn terminal_appointment_states_reject_every_action() {
        let actions = [
            AppointmentAction::Approve,
            AppointmentAction::Decline,
            AppointmentAction::Complete,
            AppointmentAction::Cancel,
        ];
        for state in [S::Declined, S::Cancelled, S::Completed] {
            for action in actions {
                assert!(action.apply(state).is_err(), "{} from {state}", action.verb());
            }
        }
    }

    #[test]
    fn invoices_are_paid_once() {
        assert_eq!(InvoiceAction::MarkPaid.apply(InvoiceStatus::Unpaid), Ok(InvoiceStatus::Paid));
        assert_eq!(
            InvoiceAction::MarkPaid.apply(InvoiceStatus::Paid),
            Err(PolicyError::Conflict("Invoice is already marked as paid.".into()))
        );
        assert!(InvoiceAction::MarkPaid.apply(InvoiceStatus::Cancelled).is_err());
    }

    #[test]
    fn there_is_no_way_back_to_unpaid() {
        for action in [InvoiceAction::MarkPaid, InvoiceAction::Cancel] {
            for state in [InvoiceStatus::Paid, InvoiceStatus::Cancelled] {
                assert_ne!(action.apply(state), Ok(InvoiceStatus::Unpaid));
            }
        }
    }

    #[test]
    fn ward_actions_ignore_current_status() {
        assert_eq!(PatientWardAction::Admit.target(), PatientStatus::Admitted);
        assert_eq!(PatientWardAction::Discharge.target(), PatientStatus::Discharged);
    }
}
