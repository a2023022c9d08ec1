// Customer profile domain model
use chrono::NaiveDate;
use serde::Serialize;

use super::record::Record;

/// Fixed compliance areas tracked on every customer, with the record fields
/// carrying each area's status and expiry.
pub const COMPLIANCE_AREAS: [(&str, &str, &str); 4] = [
    ("Tender", "tender_compliance_status", "tender_compliance_expiry"),
    ("Land", "land_compliance_status", "land_compliance_expiry"),
    (
        "Work Permit",
        "work_permit_compliance_status",
        "work_permit_compliance_expiry",
    ),
    ("Firearm", "firearm_compliance_status", "firearm_compliance_expiry"),
];

#[derive(Debug, Clone, Serialize)]
pub struct ComplianceArea {
    pub label: String,
    pub status: String,
    pub expiry: Option<NaiveDate>,
}

/// Read-only projection of the externally owned Customer record.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerProfile {
    pub customer_id: String,
    pub customer_name: String,
    pub business_registration_number: Option<String>,
    pub tin: Option<String>,
    pub nis: Option<String>,
    pub business_type: Option<String>,
    pub business_sector: Option<String>,
    pub assigned_staff: Option<String>,
    // feeds the health calculator; the wire profile stays flat
    #[serde(skip)]
    pub areas: Vec<ComplianceArea>,
}

impl CustomerProfile {
    pub fn from_record(customer_id: &str, record: &Record) -> Self {
        let owned = |field: &str| record.str_field(field).map(str::to_string);

        let areas = COMPLIANCE_AREAS
            .iter()
            .map(|(label, status_field, expiry_field)| ComplianceArea {
                label: (*label).to_string(),
                status: record.str_field(status_field).unwrap_or("").to_string(),
                expiry: record.date_field(expiry_field),
            })
            .collect();

        Self {
            customer_id: customer_id.to_string(),
            customer_name: record
                .str_field("customer_name")
                .unwrap_or(customer_id)
                .to_string(),
            business_registration_number: owned("business_registration_number"),
            tin: owned("tax_id").or_else(|| owned("tin")),
            nis: owned("nis").or_else(|| owned("nis_number")),
            business_type: owned("customer_group").or_else(|| owned("business_type")),
            business_sector: owned("industry").or_else(|| owned("business_sector")),
            assigned_staff: owned("account_manager").or_else(|| owned("assigned_staff")),
            areas,
        }
    }
}
