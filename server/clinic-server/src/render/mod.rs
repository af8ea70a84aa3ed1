//! Documents rendered for download.

pub mod invoice_pdf;
