use database_layer::models::{Role, Specialization, User};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{PolicyError, PolicyResult};

/// The authenticated caller every decision is made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
    pub specialization: Option<Specialization>,
}

impl Identity {
    pub const fn new(user_id: Uuid, role: Role) -> Self {
        Self {
            user_id,
            role,
            specialization: None,
        }
    }

    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
            specialization: user.specialization,
        }
    }

    pub fn is(&self, role: Role) -> bool {
        self.role == role
    }

    pub fn is_any(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }

    pub fn is_staff_desk(&self) -> bool {
        self.is_any(&[Role::Receptionist, Role::Admin])
    }

    /// Write-time invariant: doctors carry a specialization, nobody else does.
    pub fn validate_specialization(
        role: Role,
        specialization: Option<Specialization>,
    ) -> PolicyResult<()> {
        match (role, specialization) {
            (Role::Doctor, None) => Err(PolicyError::validation(
                "specialization",
                "Doctors must have a specialization.",
            )),
            (Role::Doctor, Some(_)) | (_, None) => Ok(()),
            (_, Some(_)) => Err(PolicyError::validation(
                "specialization",
                "Only doctors can have a specialization.",
            )),
        }
    }
}

/// Every resource type the policy knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Patient,
    Appointment,
    MedicalRecord,
    Prescription,
    LabResult,
    Invoice,
    NurseTask,
    WardAlert,
    BedStatus,
    MedicationSchedule,
    HandoverLog,
    PendingAdmission,
    PlannedDischarge,
    User,
    /// The doctor directory (users with the Doctor role).
    Doctor,
}

impl ResourceKind {
    pub const ALL: &'static [ResourceKind] = &[
        Self::Patient,
        Self::Appointment,
        Self::MedicalRecord,
        Self::Prescription,
        Self::LabResult,
        Self::Invoice,
        Self::NurseTask,
        Self::WardAlert,
        Self::BedStatus,
        Self::MedicationSchedule,
        Self::HandoverLog,
        Self::PendingAdmission,
        Self::PlannedDischarge,
        Self::User,
        Self::Doctor,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Patient => "Patient",
            Self::Appointment => "Appointment",
            Self::MedicalRecord => "Medical record",
            Self::Prescription => "Prescription",
            Self::LabResult => "Lab result",
            Self::Invoice => "Invoice",
            Self::NurseTask => "Task",
            Self::WardAlert => "Alert",
            Self::BedStatus => "Bed",
            Self::MedicationSchedule => "Medication",
            Self::HandoverLog => "Handover log",
            Self::PendingAdmission => "Pending admission",
            Self::PlannedDischarge => "Planned discharge",
            Self::User => "User",
            Self::Doctor => "Doctor",
        }
    }

    pub const fn is_ward(self) -> bool {
        matches!(
            self,
            Self::NurseTask
                | Self::WardAlert
                | Self::BedStatus
                | Self::MedicationSchedule
                | Self::HandoverLog
                | Self::PendingAdmission
                | Self::PlannedDischarge
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
    Transition,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Read => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Transition => "transition",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specialization_required_iff_doctor() {
        assert!(Identity::validate_specialization(Role::Doctor, Some(Specialization::Pediatrician)).is_ok());
        assert!(Identity::validate_specialization(Role::Nurse, None).is_ok());

        let missing = Identity::validate_specialization(Role::Doctor, None).unwrap_err();
        assert_eq!(
            missing,
            PolicyError::validation("specialization", "Doctors must have a specialization.")
        );

        let extra = Identity::validate_specialization(Role::Lab, Some(Specialization::Other));
        assert!(matches!(extra, Err(PolicyError::Validation { .. })));
    }
}
