//! HTTP handlers. Each extracts the request parts, calls into
//! [`crate::services`] and wraps the result in the response envelope.

pub mod appointments;
pub mod clinical;
pub mod health;
pub mod invoices;
pub mod patients;
pub mod users;
pub mod ward;
