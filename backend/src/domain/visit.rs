//! Visits (treatment records) and the per-patient visit summary.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{FieldErrors, optional_text};
use super::{ClinicId, PatientId, StaffId, VisitId};

const MENU_MAX: usize = 100;

/// A completed treatment visit.
///
/// `revenue` is a non-negative amount in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub id: VisitId,
    pub clinic_id: ClinicId,
    pub patient_id: PatientId,
    pub staff_id: Option<StaffId>,
    pub visit_date: NaiveDate,
    pub treatment_menu: Option<String>,
    pub revenue: i64,
    pub created_at: DateTime<Utc>,
}

/// Flat per-patient aggregate read from the `patient_visit_summary` view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientVisitSummary {
    pub patient_id: PatientId,
    pub clinic_id: ClinicId,
    pub patient_name: String,
    pub visit_count: i64,
    pub total_revenue: i64,
    pub first_visit_date: Option<NaiveDate>,
    pub last_visit_date: Option<NaiveDate>,
}

/// Raw visit payload as received from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitDraft {
    pub patient_id: String,
    pub staff_id: Option<String>,
    pub visit_date: String,
    pub treatment_menu: Option<String>,
    pub revenue: i64,
}

/// Validated visit fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitFields {
    pub patient_id: PatientId,
    pub staff_id: Option<StaffId>,
    pub visit_date: NaiveDate,
    pub treatment_menu: Option<String>,
    pub revenue: i64,
}

impl VisitDraft {
    /// Validate every field.
    pub fn validate(self) -> Result<VisitFields, FieldErrors> {
        let mut errors = FieldErrors::default();
        let patient_id = errors.check("patientId", PatientId::new(self.patient_id.trim()));
        let staff_id = errors.check(
            "staffId",
            self.staff_id
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(StaffId::new)
                .transpose(),
        );
        let visit_date = errors.check(
            "visitDate",
            NaiveDate::parse_from_str(self.visit_date.trim(), "%Y-%m-%d")
                .map_err(|_| "visit date must be a date in YYYY-MM-DD format"),
        );
        let treatment_menu = errors.check(
            "treatmentMenu",
            optional_text(self.treatment_menu.as_deref(), "treatment menu", MENU_MAX),
        );
        if self.revenue < 0 {
            errors.add("revenue", "revenue must not be negative");
        }

        match (patient_id, staff_id, visit_date, treatment_menu) {
            (Some(patient_id), Some(staff_id), Some(visit_date), Some(treatment_menu))
                if errors.is_empty() =>
            {
                Ok(VisitFields {
                    patient_id,
                    staff_id,
                    visit_date,
                    treatment_menu,
                    revenue: self.revenue,
                })
            }
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn draft() -> VisitDraft {
        VisitDraft {
            patient_id: PatientId::random().to_string(),
            staff_id: None,
            visit_date: "2026-03-14".to_owned(),
            treatment_menu: Some("Acupuncture 60".to_owned()),
            revenue: 6_600,
        }
    }

    #[rstest]
    fn valid_draft_passes() {
        let fields = draft().validate().expect("valid");
        assert_eq!(fields.revenue, 6_600);
        assert!(fields.staff_id.is_none());
    }

    #[rstest]
    fn negative_revenue_is_rejected() {
        let mut d = draft();
        d.revenue = -1;
        let errors = d.validate().expect_err("negative");
        assert_eq!(errors.get("revenue"), Some("revenue must not be negative"));
    }

    #[rstest]
    fn zero_revenue_is_allowed() {
        let mut d = draft();
        d.revenue = 0;
        assert!(d.validate().is_ok());
    }

    #[rstest]
    fn malformed_ids_and_dates_are_reported() {
        let mut d = draft();
        d.patient_id = "p-1".to_owned();
        d.staff_id = Some("s-1".to_owned());
        d.visit_date = "14/03/2026".to_owned();
        let errors = d.validate().expect_err("invalid");
        assert!(errors.get("patientId").is_some());
        assert!(errors.get("staffId").is_some());
        assert!(errors.get("visitDate").is_some());
    }
}
