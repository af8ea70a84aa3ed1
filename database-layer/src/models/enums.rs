//! Text-backed enumerations shared by every record type.
//!
//! Each enum is stored as `TEXT` in PostgreSQL and serialized with the same
//! literal on the wire, so `as_str`, serde and sqlx always agree.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;

/// Raised when a string does not name any variant of a text enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($kind:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
        #[sqlx(type_name = "text")]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $text)]
                #[sqlx(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

text_enum! {
    /// The fixed, mutually exclusive role of an identity.
    Role ("role") {
        Admin => "ADMIN",
        Doctor => "DOCTOR",
        Nurse => "NURSE",
        Receptionist => "RECEPTIONIST",
        Patient => "PATIENT",
        /// Lab technician.
        Lab => "LAB",
        Pharmacist => "PHARMACIST",
    }
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Doctor => "Doctor",
            Self::Nurse => "Nurse",
            Self::Receptionist => "Receptionist",
            Self::Patient => "Patient",
            Self::Lab => "Lab Technician",
            Self::Pharmacist => "Pharmacist",
        }
    }
}

text_enum! {
    /// Medical specialization. Only doctors carry one.
    Specialization ("specialization") {
        GeneralPractitioner => "GENERAL_PRACTITIONER",
        Neurosurgeon => "NEUROSURGEON",
        Pediatrician => "PEDIATRICIAN",
        Cardiologist => "CARDIOLOGIST",
        Dermatologist => "DERMATOLOGIST",
        Other => "OTHER",
    }
}

impl Specialization {
    pub const fn label(self) -> &'static str {
        match self {
            Self::GeneralPractitioner => "General Practitioner",
            Self::Neurosurgeon => "Neurosurgeon",
            Self::Pediatrician => "Pediatrician",
            Self::Cardiologist => "Cardiologist",
            Self::Dermatologist => "Dermatologist",
            Self::Other => "Other",
        }
    }

    /// Accepts either the stored literal or the display label
    /// ("General Practitioner", "general practitioner", "GENERAL_PRACTITIONER").
    pub fn parse_lenient(value: &str) -> Result<Self, UnknownVariant> {
        let trimmed = value.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.label().eq_ignore_ascii_case(trimmed))
            .map_or_else(|| trimmed.replace(' ', "_").parse(), Ok)
            .map_err(|_| UnknownVariant {
                kind: "specialization",
                value: value.to_string(),
            })
    }
}

text_enum! {
    Gender ("gender") {
        Male => "M",
        Female => "F",
    }
}

text_enum! {
    /// Ward lifecycle of a patient profile.
    PatientStatus ("patient status") {
        Pending => "PENDING",
        Admitted => "ADMITTED",
        Attended => "ATTENDED",
        Discharged => "DISCHARGED",
    }
}

text_enum! {
    AppointmentStatus ("appointment status") {
        Requested => "REQUESTED",
        Pending => "PENDING",
        Accepted => "ACCEPTED",
        Approved => "APPROVED",
        Declined => "DECLINED",
        Cancelled => "CANCELLED",
        Completed => "COMPLETED",
    }
}

impl AppointmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Requested => "Requested",
            Self::Pending => "Pending",
            Self::Accepted => "Accepted",
            Self::Approved => "Approved",
            Self::Declined => "Declined",
            Self::Cancelled => "Cancelled",
            Self::Completed => "Completed",
        }
    }
}

text_enum! {
    PrescriptionStatus ("prescription status") {
        Pending => "PENDING",
        Dispensed => "DISPENSED",
        Cancelled => "CANCELLED",
    }
}

text_enum! {
    /// Billing lifecycle. Stored lower case.
    InvoiceStatus ("invoice status") {
        Unpaid => "unpaid",
        Paid => "paid",
        Cancelled => "cancelled",
    }
}

impl InvoiceStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unpaid => "Unpaid",
            Self::Paid => "Paid",
            Self::Cancelled => "Cancelled",
        }
    }
}

text_enum! {
    AlertSeverity ("alert severity") {
        Low => "LOW",
        Medium => "MEDIUM",
        High => "HIGH",
        Critical => "CRITICAL",
    }
}

text_enum! {
    Theme ("theme") {
        Light => "light",
        Dark => "dark",
    }
}

text_enum! {
    Layout ("layout") {
        Compact => "compact",
        Detailed => "detailed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsing_is_case_insensitive() {
        assert_eq!("doctor".parse::<Role>(), Ok(Role::Doctor));
        assert_eq!("PAID".parse::<InvoiceStatus>(), Ok(InvoiceStatus::Paid));
        assert_eq!(" declined ".parse::<AppointmentStatus>(), Ok(AppointmentStatus::Declined));
    }

    #[test]
    fn unknown_values_name_the_kind() {
        let err = "surgeon".parse::<Role>().unwrap_err();
        assert_eq!(err.to_string(), "invalid role: surgeon");
    }

    #[test]
    fn specialization_accepts_labels_and_literals() {
        assert_eq!(
            Specialization::parse_lenient("General Practitioner"),
            Ok(Specialization::GeneralPractitioner)
        );
        assert_eq!(
            Specialization::parse_lenient("general practitioner"),
            Ok(Specialization::GeneralPractitioner)
        );
        assert_eq!(Specialization::parse_lenient("CARDIOLOGIST"), Ok(Specialization::Cardiologist));
        assert!(Specialization::parse_lenient("Astrologer").is_err());
    }

    #[test]
    fn invoice_status_serializes_lower_case() {
        let json = serde_json::to_string(&InvoiceStatus::Unpaid).unwrap();
        assert_eq!(json, "\"unpaid\"");
        let json = serde_json::to_string(&Role::Lab).unwrap();
        assert_eq!(json, "\"LAB\"");
    }
}
