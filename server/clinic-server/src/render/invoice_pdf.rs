//! Single-page Letter invoice.
//!
//! Coordinates are PDF points from the bottom-left corner: a bold title,
//! a column of detail lines 20pt apart, and an italic footer.

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use database_layer::models::{Invoice, User};
use printpdf::{BuiltinFont, Mm, PdfDocument, Pt};
use std::io::BufWriter;

const PAGE_WIDTH: Mm = Mm(215.9);
const PAGE_HEIGHT: Mm = Mm(279.4);

const LEFT: f32 = 200.0;
const TITLE_Y: f32 = 750.0;
const FIRST_LINE_Y: f32 = 700.0;
const LINE_STEP: f32 = 20.0;
const FOOTER_Y: f32 = 50.0;

/// Everything printed on an invoice.
#[derive(Debug)]
pub struct InvoiceDocument<'a> {
    pub clinic_name: &'a str,
    pub invoice: &'a Invoice,
    pub patient_name: &'a str,
    pub doctor: Option<&'a User>,
    pub appointment_date: Option<NaiveDate>,
}

impl InvoiceDocument<'_> {
    fn title(&self) -> String {
        format!("{} Invoice", self.clinic_name)
    }

    fn footer(&self) -> String {
        format!("Thank you for choosing {}", self.clinic_name)
    }

    /// Detail lines, top to bottom.
    fn lines(&self) -> Vec<String> {
        let invoice = self.invoice;
        let mut lines = vec![
            format!("Invoice ID: {}", invoice.id),
            format!("Patient: {}", self.patient_name),
        ];
        if let Some(doctor) = self.doctor {
            lines.push(format!("Doctor: Dr. {} {}", doctor.first_name, doctor.last_name));
        }
        if let Some(date) = self.appointment_date {
            lines.push(format!("Appointment: {date}"));
        }
        lines.push(format!("Amount: Ksh {}", invoice.amount));
        lines.push(format!("Status: {}", invoice.status.label()));
        lines.push(format!("Issued Date: {}", invoice.created_at.format("%Y-%m-%d %H:%M")));
        lines
    }
}

fn at(points: f32) -> Mm {
    Mm::from(Pt(points))
}

/// Render the invoice to PDF bytes.
pub fn render(document: &InvoiceDocument<'_>) -> Result<Vec<u8>> {
    let title = document.title();
    let (doc, page, layer) = PdfDocument::new(&title, PAGE_WIDTH, PAGE_HEIGHT, "Invoice");
    let layer = doc.get_page(page).get_layer(layer);

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| anyhow!("PDF font error: {e}"))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| anyhow!("PDF font error: {e}"))?;
    let italic = doc
        .add_builtin_font(BuiltinFont::HelveticaOblique)
        .map_err(|e| anyhow!("PDF font error: {e}"))?;

    layer.use_text(title, 16.0, at(LEFT), at(TITLE_Y), &bold);

    let mut y = FIRST_LINE_Y;
    for line in document.lines() {
        layer.use_text(line, 12.0, at(LEFT), at(y), &regular);
        y -= LINE_STEP;
    }

    layer.use_text(document.footer(), 10.0, at(LEFT), at(FOOTER_Y), &italic);

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf).map_err(|e| anyhow!("PDF save error: {e}"))?;
    buf.into_inner().map_err(|e| anyhow!("PDF buffer error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use database_layer::models::{InvoiceStatus, Role};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn invoice() -> Invoice {
        let now = Utc::now();
        Invoice {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            doctor_id: None,
            appointment_id: None,
            issued_by: None,
            amount: Decimal::new(150_000, 2),
            description: "Consultation".to_string(),
            status: InvoiceStatus::Unpaid,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn optional_lines_are_skipped() {
        let invoice = invoice();
        let document = InvoiceDocument {
            clinic_name: "AfyaCare",
            invoice: &invoice,
            patient_name: "Achieng Otieno",
            doctor: None,
            appointment_date: None,
        };
        let lines = document.lines();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1], "Patient: Achieng Otieno");
        assert_eq!(lines[2], "Amount: Ksh 1500.00");
        assert_eq!(lines[3], "Status: Unpaid");
    }

    #[test]
    fn doctor_and_appointment_follow_the_patient() {
        let invoice = invoice();
        let mut doctor = User::new("dr-kamau", Role::Doctor);
        doctor.first_name = "Wanjiru".to_string();
        doctor.last_name = "Kamau".to_string();
        let document = InvoiceDocument {
            clinic_name: "AfyaCare",
            invoice: &invoice,
            patient_name: "Achieng Otieno",
            doctor: Some(&doctor),
            appointment_date: NaiveDate::from_ymd_opt(2025, 3, 14),
        };
        let lines = document.lines();
        assert_eq!(lines[2], "Doctor: Dr. Wanjiru Kamau");
        assert_eq!(lines[3], "Appointment: 2025-03-14");
        assert_eq!(document.footer(), "Thank you for choosing AfyaCare");
    }

    #[test]
    fn renders_a_pdf() {
        let invoice = invoice();
        let document = InvoiceDocument {
            clinic_name: "AfyaCare",
            invoice: &invoice,
            patient_name: "Achieng Otieno",
            doctor: None,
            appointment_date: None,
        };
        let bytes = render(&document).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
