use database_layer::models::{
    Appointment, AppointmentStatus, Invoice, InvoiceStatus, Patient, PatientStatus, Role,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{PolicyError, PolicyResult};
use crate::models::{Identity, Operation, ResourceKind};
use crate::mutation::{ownership_rule, role_may};
use crate::transitions::{AppointmentAction, InvoiceAction, PatientWardAction};
use crate::visibility::{RowFacts, Visibility, VisibilityTable};

/// Outcome of one authorization check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Allowed,
    Forbidden(String),
    /// The row exists but lies outside the caller's visible set.
    NotFound,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    pub fn into_result(self, kind: ResourceKind) -> PolicyResult<()> {
        match self {
            Self::Allowed => Ok(()),
            Self::Forbidden(reason) => Err(PolicyError::Forbidden(reason)),
            Self::NotFound => Err(PolicyError::NotFound(kind)),
        }
    }
}

/// How an appointment came to be, decided at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentOrigin {
    /// Booked by the patient for themselves; the patient id is forced.
    Patient { patient_id: Uuid },
    /// Booked at the desk for any patient.
    Staff,
}

impl AppointmentOrigin {
    pub const fn requested_by_patient(self) -> bool {
        matches!(self, Self::Patient { .. })
    }
}

/// Single entry point for every role-scoped decision.
///
/// Checks run in a fixed order: role, explicit ownership rules, then
/// visibility. A role refusal on a row the caller can see is `Forbidden`;
/// on a row outside the caller's visible set it is `NotFound`, the same
/// answer an unknown id gets.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyEngine;

impl PolicyEngine {
    pub const fn new() -> Self {
        Self
    }

    // =========================================================================
    // Visibility
    // =========================================================================

    /// Readable subset for a role; a role with no defined access is refused.
    pub fn visibility(&self, identity: &Identity, kind: ResourceKind) -> PolicyResult<Visibility> {
        match VisibilityTable::lookup(identity.role, kind) {
            Some(visibility) => {
                debug!(role = %identity.role, kind = %kind, ?visibility, "Visibility resolved");
                Ok(visibility)
            }
            None => {
                warn!(user_id = %identity.user_id, role = %identity.role, kind = %kind, "Read refused");
                Err(PolicyError::Forbidden(format!(
                    "{} has no access to {kind} records",
                    identity.role.label()
                )))
            }
        }
    }

    pub fn check_visible(&self, identity: &Identity, kind: ResourceKind, row: &RowFacts) -> Decision {
        match VisibilityTable::lookup(identity.role, kind) {
            None => Decision::Forbidden(format!(
                "{} has no access to {kind} records",
                identity.role.label()
            )),
            Some(visibility) if visibility.admits(identity, row) => Decision::Allowed,
            Some(_) => Decision::NotFound,
        }
    }

    /// Refuse a role with no access to `kind` before any row is loaded, so
    /// the answer is the same for existing and unknown ids.
    pub fn authorize_kind(&self, identity: &Identity, kind: ResourceKind) -> Decision {
        match VisibilityTable::lookup(identity.role, kind) {
            Some(_) => Decision::Allowed,
            None => {
                warn!(user_id = %identity.user_id, role = %identity.role, kind = %kind, "Access refused");
                Decision::Forbidden(format!("{} has no access to {kind} records", identity.role.label()))
            }
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Creation never consults visibility: a lab technician may attach a
    /// result to any patient even though it cannot list patients.
    pub fn authorize_create(&self, identity: &Identity, kind: ResourceKind, row: &RowFacts) -> Decision {
        self.gate(identity, kind, Operation::Create, row, false)
    }

    pub fn authorize_update(&self, identity: &Identity, kind: ResourceKind, row: &RowFacts) -> Decision {
        self.gate(identity, kind, Operation::Update, row, true)
    }

    pub fn authorize_delete(&self, identity: &Identity, kind: ResourceKind, row: &RowFacts) -> Decision {
        self.gate(identity, kind, Operation::Delete, row, true)
    }

    /// Decide who books an appointment and for whom.
    ///
    /// `own_profile` is the caller's patient profile when the caller is a patient.
    pub fn authorize_create_appointment(
        &self,
        identity: &Identity,
        own_profile: Option<&Patient>,
    ) -> PolicyResult<AppointmentOrigin> {
        match identity.role {
            Role::Patient => own_profile
                .map(|profile| AppointmentOrigin::Patient {
                    patient_id: profile.id,
                })
                .ok_or_else(|| {
                    PolicyError::validation("patient", "No patient profile is linked to this account.")
                }),
            Role::Receptionist | Role::Admin => Ok(AppointmentOrigin::Staff),
            _ => {
                self.refuse(identity, ResourceKind::Appointment, Operation::Create);
                Err(PolicyError::Forbidden(
                    "You are not allowed to create appointments.".to_string(),
                ))
            }
        }
    }

    /// Reassigning a patient's doctor is a desk operation.
    pub fn authorize_doctor_assignment(&self, identity: &Identity) -> Decision {
        if identity.is_staff_desk() {
            Decision::Allowed
        } else {
            Decision::Forbidden("Only receptionists and admins can assign doctors.".to_string())
        }
    }

    /// Pharmacists may only move a prescription's status.
    pub fn authorize_prescription_update(
        &self,
        identity: &Identity,
        row: &RowFacts,
        changes_clinical_fields: bool,
    ) -> Decision {
        let decision = self.authorize_update(identity, ResourceKind::Prescription, row);
        if decision.is_allowed() && identity.is(Role::Pharmacist) && changes_clinical_fields {
            return Decision::Forbidden("Pharmacists may only change prescription status.".to_string());
        }
        decision
    }

    // =========================================================================
    // Status transitions
    // =========================================================================

    /// Approve, decline and complete are for the attending doctor; cancel is
    /// for the patient who owns the appointment or the desk.
    pub fn authorize_appointment_transition(
        &self,
        identity: &Identity,
        appointment: &Appointment,
        row: &RowFacts,
        action: AppointmentAction,
    ) -> PolicyResult<AppointmentStatus> {
        let role_ok = if action.doctor_only() {
            identity.is(Role::Doctor)
        } else {
            identity.is_any(&[Role::Patient, Role::Receptionist, Role::Admin])
        };
        if !role_ok {
            self.refuse(identity, ResourceKind::Appointment, Operation::Transition);
            let reason = format!("{} may not {} appointments", identity.role.label(), action.verb());
            return Err(self.conceal(identity, ResourceKind::Appointment, row, reason));
        }

        self.check_visible(identity, ResourceKind::Appointment, row)
            .into_result(ResourceKind::Appointment)?;

        if action.doctor_only() && appointment.doctor_id != identity.user_id {
            return Err(PolicyError::Forbidden(
                "Only the assigned doctor can change this appointment.".to_string(),
            ));
        }

        action.apply(appointment.status)
    }

    pub fn authorize_invoice_transition(
        &self,
        identity: &Identity,
        invoice: &Invoice,
        row: &RowFacts,
        action: InvoiceAction,
    ) -> PolicyResult<InvoiceStatus> {
        self.gate(identity, ResourceKind::Invoice, Operation::Transition, row, true)
            .into_result(ResourceKind::Invoice)?;
        action.apply(invoice.status)
    }

    /// Admit, attend and discharge. No ordering guard between them.
    pub fn authorize_ward_action(
        &self,
        identity: &Identity,
        row: &RowFacts,
        action: PatientWardAction,
    ) -> PolicyResult<PatientStatus> {
        self.gate(identity, ResourceKind::Patient, Operation::Transition, row, true)
            .into_result(ResourceKind::Patient)?;
        Ok(action.target())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn gate(
        &self,
        identity: &Identity,
        kind: ResourceKind,
        operation: Operation,
        row: &RowFacts,
        scoped: bool,
    ) -> Decision {
        if !role_may(identity.role, kind, operation) {
            self.refuse(identity, kind, operation);
            let reason = format!("{} may not {operation} {kind} records", identity.role.label());
            if scoped {
                return match self.check_visible(identity, kind, row) {
                    Decision::Allowed => Decision::Forbidden(reason),
                    hidden => hidden,
                };
            }
            return Decision::Forbidden(reason);
        }

        if let Some(reason) = ownership_rule(identity, kind, operation, row) {
            self.refuse(identity, kind, operation);
            return Decision::Forbidden(reason.to_string());
        }

        if scoped {
            return self.check_visible(identity, kind, row);
        }
        Decision::Allowed
    }

    /// Error for a role refusal; a row the caller cannot see reads as `NotFound`.
    fn conceal(&self, identity: &Identity, kind: ResourceKind, row: &RowFacts, reason: String) -> PolicyError {
        match self.check_visible(identity, kind, row) {
            Decision::NotFound => PolicyError::NotFound(kind),
            Decision::Forbidden(denied) => PolicyError::Forbidden(denied),
            Decision::Allowed => PolicyError::Forbidden(reason),
        }
    }

    fn refuse(&self, identity: &Identity, kind: ResourceKind, operation: Operation) {
        warn!(
            user_id = %identity.user_id,
            role = %identity.role,
            kind = %kind,
            operation = %operation,
            "Authorization denied"
        );
    }
}
