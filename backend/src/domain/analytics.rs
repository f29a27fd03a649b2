//! Derived analytics over visits, reservations and database procedures.
//!
//! Rankings load the flat `patient_visit_summary` rows for a clinic and call
//! one stored procedure per row. Calls run concurrently with no width limit;
//! the first failure aborts the whole report and drops the calls still in
//! flight.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;
use futures_util::future::try_join_all;
use serde::Serialize;
use tracing::debug;

use super::ports::{AnalyticsRpc, ReservationRepository, StaffRepository, VisitRepository};
use super::validation::FieldErrors;
use super::{
    ClinicId, DateRange, Error, PatientId, PatientVisitSummary, ReservationStatus, StaffId,
};

pub const DEFAULT_LTV_LIMIT: u32 = 10;
pub const MAX_LTV_LIMIT: u32 = 100;
pub const DEFAULT_CHURN_THRESHOLD: i32 = 70;

/// Lifetime value of one patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientLtv {
    pub patient_id: PatientId,
    pub patient_name: String,
    pub visit_count: i64,
    pub total_revenue: i64,
    pub ltv: i64,
}

/// Churn-risk score of one patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChurnRisk {
    pub patient_id: PatientId,
    pub patient_name: String,
    pub last_visit_date: Option<NaiveDate>,
    pub score: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FunnelStageKind {
    /// Every reservation starting in the range.
    Reserved,
    /// Reservations that reached `arrived` or `completed`.
    Arrived,
    /// Reservations that reached `completed`.
    Completed,
    /// Distinct completed patients with two or more recorded visits.
    Returning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelStage {
    pub stage: FunnelStageKind,
    pub count: u64,
    /// `count` divided by the previous stage's count; 0 when that is empty.
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionFunnel {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub stages: Vec<FunnelStage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueDay {
    pub date: NaiveDate,
    pub visit_count: u64,
    pub revenue: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSummary {
    pub days: Vec<RevenueDay>,
    pub total_visits: u64,
    pub total_revenue: i64,
}

/// Visit totals for one staff member; `staff_id` is `None` for visits
/// recorded without staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffPerformance {
    pub staff_id: Option<StaffId>,
    pub staff_name: Option<String>,
    pub visit_count: u64,
    pub revenue: i64,
}

/// Analytics use-cases.
#[derive(Clone)]
pub struct AnalyticsService {
    visits: Arc<dyn VisitRepository>,
    reservations: Arc<dyn ReservationRepository>,
    staff: Arc<dyn StaffRepository>,
    rpc: Arc<dyn AnalyticsRpc>,
}

impl AnalyticsService {
    pub fn new(
        visits: Arc<dyn VisitRepository>,
        reservations: Arc<dyn ReservationRepository>,
        staff: Arc<dyn StaffRepository>,
        rpc: Arc<dyn AnalyticsRpc>,
    ) -> Self {
        Self {
            visits,
            reservations,
            staff,
            rpc,
        }
    }

    /// Top patients by lifetime value, highest first.
    ///
    /// Ties are broken by patient id so the ranking is deterministic.
    ///
    /// # Errors
    /// `invalid_request` when `limit` is outside 1..=100; the first RPC or
    /// repository failure otherwise.
    pub async fn top_patients_by_ltv(
        &self,
        clinic_id: &ClinicId,
        limit: Option<u32>,
    ) -> Result<Vec<PatientLtv>, Error> {
        let limit = ltv_limit(limit)?;
        let summaries = self.visits.summaries(clinic_id).await?;
        debug!(clinic_id = %clinic_id, rows = summaries.len(), "scoring patient ltv");

        let values = try_join_all(
            summaries
                .iter()
                .map(|summary| self.rpc.patient_ltv(&summary.patient_id)),
        )
        .await?;

        let mut ranked: Vec<PatientLtv> = summaries
            .into_iter()
            .zip(values)
            .map(|(summary, ltv)| PatientLtv {
                patient_id: summary.patient_id,
                patient_name: summary.patient_name,
                visit_count: summary.visit_count,
                total_revenue: summary.total_revenue,
                ltv,
            })
            .collect();
        ranked.sort_by_key(|row| (Reverse(row.ltv), row.patient_id));
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// Patients whose churn score is at least `threshold`, highest first.
    ///
    /// # Errors
    /// `invalid_request` when `threshold` is outside 0..=100; the first RPC or
    /// repository failure otherwise.
    pub async fn churn_risk(
        &self,
        clinic_id: &ClinicId,
        threshold: Option<i32>,
    ) -> Result<Vec<ChurnRisk>, Error> {
        let threshold = churn_threshold(threshold)?;
        let summaries = self.visits.summaries(clinic_id).await?;
        debug!(clinic_id = %clinic_id, rows = summaries.len(), "scoring churn risk");

        let scores = try_join_all(
            summaries
                .iter()
                .map(|summary| self.rpc.churn_risk(&summary.patient_id)),
        )
        .await?;

        let mut at_risk: Vec<ChurnRisk> = summaries
            .into_iter()
            .zip(scores)
            .filter(|(_, score)| *score >= threshold)
            .map(|(summary, score)| ChurnRisk {
                patient_id: summary.patient_id,
                patient_name: summary.patient_name,
                last_visit_date: summary.last_visit_date,
                score,
            })
            .collect();
        at_risk.sort_by_key(|row| (Reverse(row.score), row.patient_id));
        Ok(at_risk)
    }

    /// Reservation-to-return funnel for reservations starting in `range`.
    pub async fn conversion_funnel(
        &self,
        clinic_id: &ClinicId,
        range: DateRange,
    ) -> Result<ConversionFunnel, Error> {
        let reservations = self.reservations.list(clinic_id, Some(range)).await?;
        let summaries = self.visits.summaries(clinic_id).await?;
        Ok(build_funnel(range, &reservations, &summaries))
    }

    /// Per-day visit counts and revenue for `range`.
    pub async fn revenue_summary(
        &self,
        clinic_id: &ClinicId,
        range: DateRange,
    ) -> Result<RevenueSummary, Error> {
        let visits = self.visits.list(clinic_id, &range).await?;
        let mut days: BTreeMap<NaiveDate, (u64, i64)> = BTreeMap::new();
        for visit in &visits {
            let entry = days.entry(visit.visit_date).or_default();
            entry.0 += 1;
            entry.1 += visit.revenue;
        }
        let days: Vec<RevenueDay> = days
            .into_iter()
            .map(|(date, (visit_count, revenue))| RevenueDay {
                date,
                visit_count,
                revenue,
            })
            .collect();
        Ok(RevenueSummary {
            total_visits: days.iter().map(|d| d.visit_count).sum(),
            total_revenue: days.iter().map(|d| d.revenue).sum(),
            days,
        })
    }

    /// Visit totals per staff member for `range`, highest revenue first.
    pub async fn staff_performance(
        &self,
        clinic_id: &ClinicId,
        range: DateRange,
    ) -> Result<Vec<StaffPerformance>, Error> {
        let visits = self.visits.list(clinic_id, &range).await?;
        let names: HashMap<StaffId, String> = self
            .staff
            .list(clinic_id)
            .await?
            .into_iter()
            .map(|staff| (staff.id, staff.name))
            .collect();

        let mut totals: HashMap<Option<StaffId>, (u64, i64)> = HashMap::new();
        for visit in &visits {
            let entry = totals.entry(visit.staff_id).or_default();
            entry.0 += 1;
            entry.1 += visit.revenue;
        }
        let mut rows: Vec<StaffPerformance> = totals
            .into_iter()
            .map(|(staff_id, (visit_count, revenue))| StaffPerformance {
                staff_name: staff_id.and_then(|id| names.get(&id).cloned()),
                staff_id,
                visit_count,
                revenue,
            })
            .collect();
        rows.sort_by_key(|row| (Reverse(row.revenue), Reverse(row.visit_count), row.staff_id));
        Ok(rows)
    }
}

fn ltv_limit(limit: Option<u32>) -> Result<usize, Error> {
    let limit = limit.unwrap_or(DEFAULT_LTV_LIMIT);
    if (1..=MAX_LTV_LIMIT).contains(&limit) {
        Ok(limit as usize)
    } else {
        let mut fields = FieldErrors::default();
        fields.add("limit", format!("limit must be between 1 and {MAX_LTV_LIMIT}"));
        Err(Error::validation(fields))
    }
}

fn churn_threshold(threshold: Option<i32>) -> Result<i32, Error> {
    let threshold = threshold.unwrap_or(DEFAULT_CHURN_THRESHOLD);
    if (0..=100).contains(&threshold) {
        Ok(threshold)
    } else {
        let mut fields = FieldErrors::default();
        fields.add("threshold", "threshold must be between 0 and 100");
        Err(Error::validation(fields))
    }
}

fn build_funnel(
    range: DateRange,
    reservations: &[super::Reservation],
    summaries: &[PatientVisitSummary],
) -> ConversionFunnel {
    let reserved = reservations.len() as u64;
    let arrived = reservations
        .iter()
        .filter(|r| {
            matches!(
                r.status,
                ReservationStatus::Arrived | ReservationStatus::Completed
            )
        })
        .count() as u64;
    let completed_patients: Vec<PatientId> = reservations
        .iter()
        .filter(|r| r.status == ReservationStatus::Completed)
        .map(|r| r.patient_id)
        .collect();
    let completed = completed_patients.len() as u64;
    let repeat_visitors: HashSet<PatientId> = summaries
        .iter()
        .filter(|s| s.visit_count >= 2)
        .map(|s| s.patient_id)
        .collect();
    let returning = completed_patients
        .iter()
        .filter(|id| repeat_visitors.contains(id))
        .collect::<HashSet<_>>()
        .len() as u64;

    let counts = [
        (FunnelStageKind::Reserved, reserved),
        (FunnelStageKind::Arrived, arrived),
        (FunnelStageKind::Completed, completed),
        (FunnelStageKind::Returning, returning),
    ];
    let mut previous: Option<u64> = None;
    let stages = counts
        .into_iter()
        .map(|(stage, count)| {
            let base = previous.unwrap_or(count);
            previous = Some(count);
            FunnelStage {
                stage,
                count,
                conversion_rate: ratio(count, base),
            }
        })
        .collect();

    ConversionFunnel {
        from: range.from(),
        to: range.to(),
        stages,
    }
}

fn ratio(count: u64, base: u64) -> f64 {
    if base == 0 {
        0.0
    } else {
        count as f64 / base as f64
    }
}
