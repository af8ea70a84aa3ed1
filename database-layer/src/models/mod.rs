//! Persisted clinic records.

pub mod accounts;
pub mod billing;
pub mod clinical;
pub mod enums;
pub mod ward;

pub use accounts::{Patient, User, UserSettings};
pub use billing::Invoice;
pub use clinical::{Appointment, LabResult, MedicalRecord, Prescription};
pub use enums::{
    AlertSeverity, AppointmentStatus, Gender, InvoiceStatus, Layout, PatientStatus,
    PrescriptionStatus, Role, Specialization, Theme, UnknownVariant,
};
pub use ward::{
    BedStatus, HandoverLog, MedicationSchedule, NurseTask, PendingAdmission, PlannedDischarge,
    WardAlert,
};
