//! Who may create, update, delete or transition each resource kind.

use database_layer::models::Role;

use crate::models::{Identity, Operation, ResourceKind};
use crate::visibility::RowFacts;

const DESK: &[Role] = &[Role::Receptionist, Role::Admin];
const ADMIN: &[Role] = &[Role::Admin];
const WARD: &[Role] = &[Role::Nurse, Role::Admin];
const CLINICAL_WRITERS: &[Role] = &[Role::Doctor, Role::Lab, Role::Nurse, Role::Admin];

/// Roles permitted to attempt an operation, before any row is considered.
pub const fn allowed_roles(kind: ResourceKind, operation: Operation) -> &'static [Role] {
    use Operation as Op;
    use ResourceKind as K;

    match (kind, operation) {
        (_, Op::Read) => &[
            Role::Admin,
            Role::Doctor,
            Role::Nurse,
            Role::Receptionist,
            Role::Patient,
            Role::Lab,
            Role::Pharmacist,
        ],

        (K::Patient, Op::Create | Op::Delete) => DESK,
        (K::Patient, Op::Update) => &[
            Role::Receptionist,
            Role::Admin,
            Role::Nurse,
            Role::Doctor,
            Role::Patient,
        ],
        (K::Patient, Op::Transition) => &[Role::Nurse, Role::Admin, Role::Doctor],

        (K::Appointment, Op::Create) => &[Role::Patient, Role::Receptionist, Role::Admin],
        (K::Appointment, Op::Update | Op::Delete) => DESK,
        (K::Appointment, Op::Transition) => &[
            Role::Doctor,
            Role::Patient,
            Role::Receptionist,
            Role::Admin,
        ],

        (K::MedicalRecord, Op::Create | Op::Update) => CLINICAL_WRITERS,
        (K::MedicalRecord, Op::Delete | Op::Transition) => ADMIN,

        (K::Prescription, Op::Create) => &[Role::Doctor],
        (K::Prescription, Op::Update) => &[Role::Doctor, Role::Pharmacist, Role::Admin],
        (K::Prescription, Op::Delete) => &[Role::Doctor, Role::Admin],
        (K::Prescription, Op::Transition) => &[],

        (K::LabResult, Op::Create) => &[Role::Lab],
        (K::LabResult, Op::Update | Op::Delete) => &[Role::Lab, Role::Admin],
        (K::LabResult, Op::Transition) => &[],

        (K::Invoice, Op::Create | Op::Update | Op::Transition) => DESK,
        (K::Invoice, Op::Delete) => ADMIN,

        (
            K::NurseTask
            | K::WardAlert
            | K::BedStatus
            | K::MedicationSchedule
            | K::HandoverLog
            | K::PendingAdmission
            | K::PlannedDischarge,
            _,
        ) => WARD,

        (K::User | K::Doctor, _) => ADMIN,
    }
}

pub fn role_may(role: Role, kind: ResourceKind, operation: Operation) -> bool {
    allowed_roles(kind, operation).contains(&role)
}

/// Ownership rules that refuse with `Forbidden` even when the row is visible.
///
/// Returns the reason when a rule applies.
pub fn ownership_rule(
    identity: &Identity,
    kind: ResourceKind,
    operation: Operation,
    row: &RowFacts,
) -> Option<&'static str> {
    let me = Some(identity.user_id);
    match (identity.role, kind, operation) {
        (Role::Doctor, ResourceKind::MedicalRecord, Operation::Create)
            if row.assigned_doctor_id != me =>
        {
            Some("You can only add records for your assigned patients.")
        }
        (Role::Doctor, ResourceKind::MedicalRecord, Operation::Update)
            if row.assigned_doctor_id != me =>
        {
            Some("You cannot update records for patients not assigned to you.")
        }
        (Role::Nurse, ResourceKind::HandoverLog, Operation::Update | Operation::Delete)
            if row.owner_id != me =>
        {
            Some("Handover logs can only be changed by their author.")
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn only_doctors_write_prescriptions() {
        for role in Role::ALL {
            assert_eq!(
                role_may(*role, ResourceKind::Prescription, Operation::Create),
                *role == Role::Doctor
            );
        }
    }

    #[test]
    fn invoices_are_issued_at_the_desk() {
        assert!(role_may(Role::Receptionist, ResourceKind::Invoice, Operation::Create));
        assert!(role_may(Role::Admin, ResourceKind::Invoice, Operation::Create));
        assert!(!role_may(Role::Doctor, ResourceKind::Invoice, Operation::Create));
        assert!(!role_may(Role::Receptionist, ResourceKind::Invoice, Operation::Delete));
    }

    #[test]
    fn doctor_record_writes_require_assignment() {
        let doctor = Identity::new(Uuid::new_v4(), Role::Doctor);
        let assigned = RowFacts {
            assigned_doctor_id: Some(doctor.user_id),
            ..RowFacts::default()
        };
        let elsewhere = RowFacts {
            assigned_doctor_id: Some(Uuid::new_v4()),
            ..RowFacts::default()
        };

        assert_eq!(
            ownership_rule(&doctor, ResourceKind::MedicalRecord, Operation::Update, &assigned),
            None
        );
        assert!(
            ownership_rule(&doctor, ResourceKind::MedicalRecord, Operation::Update, &elsewhere)
                .is_some()
        );

        let lab = Identity::new(Uuid::new_v4(), Role::Lab);
        assert_eq!(
            ownership_rule(&lab, ResourceKind::MedicalRecord, Operation::Create, &elsewhere),
            None
        );
    }
}
