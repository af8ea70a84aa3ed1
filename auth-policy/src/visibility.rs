//! Which rows a role may read, per resource kind.
//!
//! `VisibilityTable::lookup` is the single source of truth. A `None` entry
//! means the role has no defined access and the request is refused outright;
//! `Some(Visibility::Nothing)` is a deliberate empty result.

use database_layer::models::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Identity, ResourceKind};

/// Predicate over rows, relative to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    All,
    Nothing,
    /// Rows describing the caller's own patient profile.
    OwnProfile,
    /// Rows describing a patient whose assigned doctor is the caller.
    AssignedPatients,
    /// Rows whose doctor is the caller.
    AttendingDoctor,
    /// Rows the caller created.
    CreatedBy,
    /// Rows owned by the caller (a nurse's task, the caller's own user row).
    OwnedBy,
}

/// Relationship facts about one row, as far as visibility is concerned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowFacts {
    /// User id of the patient the row describes.
    pub patient_user_id: Option<Uuid>,
    pub assigned_doctor_id: Option<Uuid>,
    pub attending_doctor_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub owner_id: Option<Uuid>,
}

impl Visibility {
    pub fn admits(self, identity: &Identity, row: &RowFacts) -> bool {
        let me = Some(identity.user_id);
        match self {
            Self::All => true,
            Self::Nothing => false,
            Self::OwnProfile => row.patient_user_id == me,
            Self::AssignedPatients => row.assigned_doctor_id == me,
            Self::AttendingDoctor => row.attending_doctor_id == me,
            Self::CreatedBy => row.created_by == me,
            Self::OwnedBy => row.owner_id == me,
        }
    }
}

pub struct VisibilityTable;

impl VisibilityTable {
    pub const fn lookup(role: Role, kind: ResourceKind) -> Option<Visibility> {
        use ResourceKind as K;
        use Visibility as V;

        match role {
            Role::Admin => Some(V::All),

            Role::Receptionist => match kind {
                K::Patient | K::Appointment | K::Invoice | K::Doctor => Some(V::All),
                K::MedicalRecord | K::LabResult => Some(V::Nothing),
                _ => None,
            },

            Role::Doctor => match kind {
                K::Patient | K::MedicalRecord | K::Prescription | K::LabResult => {
                    Some(V::AssignedPatients)
                }
                K::Appointment | K::Invoice => Some(V::AttendingDoctor),
                K::Doctor => Some(V::OwnedBy),
                _ => None,
            },

            Role::Nurse => match kind {
                K::Patient
                | K::Appointment
                | K::MedicalRecord
                | K::Prescription
                | K::LabResult
                | K::WardAlert
                | K::BedStatus
                | K::MedicationSchedule
                | K::HandoverLog
                | K::PendingAdmission
                | K::PlannedDischarge => Some(V::All),
                K::NurseTask => Some(V::OwnedBy),
                K::Doctor => Some(V::Nothing),
                K::Invoice | K::User => None,
            },

            Role::Patient => match kind {
                K::Patient
                | K::Appointment
                | K::MedicalRecord
                | K::Prescription
                | K::LabResult
                | K::Invoice => Some(V::OwnProfile),
                K::Doctor => Some(V::Nothing),
                _ => None,
            },

            Role::Lab => match kind {
                K::MedicalRecord | K::LabResult => Some(V::CreatedBy),
                K::Doctor => Some(V::Nothing),
                _ => None,
            },

            Role::Pharmacist => match kind {
                K::Prescription | K::Patient => Some(V::All),
                K::Doctor => Some(V::Nothing),
                _ => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_sees_everything() {
        for kind in ResourceKind::ALL {
            assert_eq!(VisibilityTable::lookup(Role::Admin, *kind), Some(Visibility::All));
        }
    }

    #[test]
    fn receptionist_knows_clinical_notes_exist_but_reads_none() {
        assert_eq!(
            VisibilityTable::lookup(Role::Receptionist, ResourceKind::MedicalRecord),
            Some(Visibility::Nothing)
        );
        assert_eq!(
            VisibilityTable::lookup(Role::Receptionist, ResourceKind::LabResult),
            Some(Visibility::Nothing)
        );
        assert_eq!(VisibilityTable::lookup(Role::Receptionist, ResourceKind::Prescription), None);
    }

    #[test]
    fn doctor_rows_follow_assignment() {
        use ResourceKind as K;
        for kind in [K::Patient, K::MedicalRecord, K::Prescription, K::LabResult] {
            assert_eq!(
                VisibilityTable::lookup(Role::Doctor, kind),
                Some(Visibility::AssignedPatients)
            );
        }
        assert_eq!(
            VisibilityTable::lookup(Role::Doctor, K::Invoice),
            Some(Visibility::AttendingDoctor)
        );
    }

    #[test]
    fn ward_records_are_nurse_and_admin_only() {
        for kind in ResourceKind::ALL.iter().filter(|k| k.is_ward()) {
            for role in [Role::Doctor, Role::Receptionist, Role::Patient, Role::Lab, Role::Pharmacist] {
                assert_eq!(VisibilityTable::lookup(role, *kind), None, "{role} on {kind}");
            }
            assert!(VisibilityTable::lookup(Role::Nurse, *kind).is_some());
        }
    }

    #[test]
    fn nurse_tasks_are_private() {
        let nurse = Identity::new(Uuid::new_v4(), Role::Nurse);
        let rule = VisibilityTable::lookup(Role::Nurse, ResourceKind::NurseTask).unwrap();

        let mine = RowFacts {
            owner_id: Some(nurse.user_id),
            ..RowFacts::default()
        };
        let theirs = RowFacts {
            owner_id: Some(Uuid::new_v4()),
            ..RowFacts::default()
        };
        assert!(rule.admits(&nurse, &mine));
        assert!(!rule.admits(&nurse, &theirs));
    }

    #[test]
    fn nothing_admits_no_row() {
        let me = Identity::new(Uuid::new_v4(), Role::Receptionist);
        let related = RowFacts {
            patient_user_id: Some(me.user_id),
            assigned_doctor_id: Some(me.user_id),
            attending_doctor_id: Some(me.user_id),
            created_by: Some(me.user_id),
            owner_id: Some(me.user_id),
        };
        assert!(!Visibility::Nothing.admits(&me, &related));
    }
}
