//! Route path constants.
//!
//! Everything except health and docs is nested under [`API_V1`]. utoipa
//! `#[utoipa::path(...)]` attributes need string literals, so handlers repeat
//! the full path (`/api/v1/...`, with `{id}` in place of `:id`); keep the two
//! in step when a route changes.

pub const API_V1: &str = "/api/v1";

pub mod health {
    pub const HEALTH: &str = "/health";
    pub const VERSION: &str = "/version";
}

pub mod auth {
    pub const SIGNUP: &str = "/auth/signup";
}

pub mod users {
    pub const USERS: &str = "/users";
    pub const ME: &str = "/users/me";
    pub const USER_BY_ID: &str = "/users/:id";
    pub const SETTINGS: &str = "/settings";
}

pub mod doctors {
    pub const DOCTORS: &str = "/doctors";
    pub const DASHBOARD: &str = "/doctors/dashboard";
    pub const MY_PATIENTS: &str = "/doctors/patients";
    pub const MY_APPOINTMENTS: &str = "/doctors/appointments";
    pub const DOCTOR_BY_ID: &str = "/doctors/:id";
}

pub mod patients {
    pub const PATIENTS: &str = "/patients";
    pub const PATIENT_BY_ID: &str = "/patients/:id";
    pub const ADMIT: &str = "/patients/:id/admit";
    pub const ATTEND: &str = "/patients/:id/attend";
    pub const DISCHARGE: &str = "/patients/:id/discharge";
    pub const MEDICAL_RECORDS: &str = "/patients/:id/medical-records";
}

pub mod appointments {
    pub const APPOINTMENTS: &str = "/appointments";
    pub const APPOINTMENT_BY_ID: &str = "/appointments/:id";
    pub const APPROVE: &str = "/appointments/:id/approve";
    pub const DECLINE: &str = "/appointments/:id/decline";
    pub const COMPLETE: &str = "/appointments/:id/complete";
    pub const CANCEL: &str = "/appointments/:id/cancel";
}

pub mod clinical {
    pub const MEDICAL_RECORDS: &str = "/medical-records";
    pub const MEDICAL_RECORD_BY_ID: &str = "/medical-records/:id";
    pub const PRESCRIPTIONS: &str = "/prescriptions";
    pub const PRESCRIPTION_BY_ID: &str = "/prescriptions/:id";
    pub const LAB_RESULTS: &str = "/lab-results";
    pub const LAB_RESULT_BY_ID: &str = "/lab-results/:id";
}

pub mod invoices {
    pub const INVOICES: &str = "/invoices";
    pub const UNPAID: &str = "/invoices/unpaid";
    pub const INVOICE_BY_ID: &str = "/invoices/:id";
    pub const MARK_PAID: &str = "/invoices/:id/mark-paid";
    pub const CANCEL: &str = "/invoices/:id/cancel";
    pub const DOWNLOAD: &str = "/invoices/:id/download";
}

pub mod ward {
    pub const TASKS: &str = "/ward/tasks";
    pub const TASK_BY_ID: &str = "/ward/tasks/:id";
    pub const TASK_COMPLETE: &str = "/ward/tasks/:id/complete";
    pub const ALERTS: &str = "/ward/alerts";
    pub const ALERT_BY_ID: &str = "/ward/alerts/:id";
    pub const ALERT_ACKNOWLEDGE: &str = "/ward/alerts/:id/acknowledge";
    pub const BEDS: &str = "/ward/beds";
    pub const BED_BY_ID: &str = "/ward/beds/:id";
    pub const BED_ASSIGN: &str = "/ward/beds/:id/assign";
    pub const BED_RELEASE: &str = "/ward/beds/:id/release";
    pub const MEDICATIONS: &str = "/ward/medications";
    pub const MEDICATION_BY_ID: &str = "/ward/medications/:id";
    pub const MEDICATION_ADMINISTER: &str = "/ward/medications/:id/administer";
    pub const HANDOVERS: &str = "/ward/handovers";
    pub const HANDOVER_BY_ID: &str = "/ward/handovers/:id";
    pub const ADMISSIONS: &str = "/ward/admissions";
    pub const ADMISSION_BY_ID: &str = "/ward/admissions/:id";
    pub const ADMISSION_RESOLVE: &str = "/ward/admissions/:id/resolve";
    pub const DISCHARGES: &str = "/ward/discharges";
    pub const DISCHARGE_BY_ID: &str = "/ward/discharges/:id";
    pub const DISCHARGE_COMPLETE: &str = "/ward/discharges/:id/complete";
}
