//! Query-string filters for list endpoints that have them.
//!
//! Each carries its own `page`/`page_size`; see [`PaginationParams`].
//!
//! [`PaginationParams`]: super::pagination::PaginationParams

use database_layer::Page;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

/// `?patient=<id>`
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PatientFilter {
    /// Only rows about this patient profile
    pub patient: Option<Uuid>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PatientFilter {
    pub fn page(&self) -> Page {
        Page::new(self.page, self.page_size)
    }
}

/// `?status=<literal>`, matched case-insensitively
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct StatusFilter {
    pub status: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl StatusFilter {
    pub fn page(&self) -> Page {
        Page::new(self.page, self.page_size)
    }
}

/// `?role=<literal>`
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RoleFilter {
    #[param(example = "DOCTOR")]
    pub role: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl RoleFilter {
    pub fn page(&self) -> Page {
        Page::new(self.page, self.page_size)
    }
}
