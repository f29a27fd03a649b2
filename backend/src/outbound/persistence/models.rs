//! Internal Diesel row structs and their conversions into domain types.
//!
//! Rows never leave the persistence layer. Conversions that can fail (unknown
//! enum text, out-of-range integers) return a message which adapters map to
//! their port's query error.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    AuditRecord, Clinic, ClinicId, ClinicSettings, Gender, Notification, NotificationId, Patient,
    PatientId, PatientVisitSummary, Reservation, ReservationId, ReservationStatus, Role, Staff,
    StaffId, UserId, UserPermission, Visit, VisitId,
};

use super::schema::{
    access_audit_logs, auth_users, clinic_settings, clinics, notifications, patient_visit_summary,
    patients, reservations, staff, user_permissions, visits,
};

// ---------------------------------------------------------------------------
// Clinics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = clinics)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ClinicRow {
    pub id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub is_active: bool,
}

impl From<ClinicRow> for Clinic {
    fn from(row: ClinicRow) -> Self {
        Self {
            id: ClinicId::from_uuid(row.id),
            name: row.name,
            parent_id: row.parent_id.map(ClinicId::from_uuid),
            is_active: row.is_active,
        }
    }
}

/// Read and write shape of `clinic_settings`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = clinic_settings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ClinicSettingsRow {
    pub clinic_id: Uuid,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
    pub slot_minutes: i32,
    pub reservation_buffer_minutes: i32,
    pub allow_online_booking: bool,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ClinicSettingsRow> for ClinicSettings {
    type Error = String;

    fn try_from(row: ClinicSettingsRow) -> Result<Self, Self::Error> {
        let minutes = |value: i32, column: &str| {
            u16::try_from(value).map_err(|_| format!("{column} out of range: {value}"))
        };
        Ok(Self {
            clinic_id: ClinicId::from_uuid(row.clinic_id),
            opening_time: row.opening_time,
            closing_time: row.closing_time,
            slot_minutes: minutes(row.slot_minutes, "slot_minutes")?,
            reservation_buffer_minutes: minutes(
                row.reservation_buffer_minutes,
                "reservation_buffer_minutes",
            )?,
            allow_online_booking: row.allow_online_booking,
            updated_at: row.updated_at,
        })
    }
}

impl From<&ClinicSettings> for ClinicSettingsRow {
    fn from(settings: &ClinicSettings) -> Self {
        Self {
            clinic_id: *settings.clinic_id.as_uuid(),
            opening_time: settings.opening_time,
            closing_time: settings.closing_time,
            slot_minutes: i32::from(settings.slot_minutes),
            reservation_buffer_minutes: i32::from(settings.reservation_buffer_minutes),
            allow_online_booking: settings.allow_online_booking,
            updated_at: settings.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Staff
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = staff)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StaffRow {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub name: String,
    pub role: String,
    pub is_active: bool,
}

impl From<StaffRow> for Staff {
    fn from(row: StaffRow) -> Self {
        Self {
            id: StaffId::from_uuid(row.id),
            clinic_id: ClinicId::from_uuid(row.clinic_id),
            name: row.name,
            role: Role::normalize(&row.role),
            is_active: row.is_active,
        }
    }
}

// ---------------------------------------------------------------------------
// Patients
// ---------------------------------------------------------------------------

/// Read and write shape of `patients`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = patients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PatientRow {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub name: String,
    pub name_kana: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Editable columns of `patients`; `None` clears the column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = patients)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct PatientChangeset<'a> {
    pub name: &'a str,
    pub name_kana: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub email: Option<&'a str>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<&'static str>,
    pub notes: Option<&'a str>,
}

impl TryFrom<PatientRow> for Patient {
    type Error = String;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        let gender = row
            .gender
            .as_deref()
            .map(|raw| Gender::parse(raw).ok_or_else(|| format!("unknown gender '{raw}'")))
            .transpose()?;
        Ok(Self {
            id: PatientId::from_uuid(row.id),
            clinic_id: ClinicId::from_uuid(row.clinic_id),
            name: row.name,
            name_kana: row.name_kana,
            phone: row.phone,
            email: row.email,
            birth_date: row.birth_date,
            gender,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}

impl From<&Patient> for PatientRow {
    fn from(patient: &Patient) -> Self {
        Self {
            id: *patient.id.as_uuid(),
            clinic_id: *patient.clinic_id.as_uuid(),
            name: patient.name.clone(),
            name_kana: patient.name_kana.clone(),
            phone: patient.phone.clone(),
            email: patient.email.clone(),
            birth_date: patient.birth_date,
            gender: patient.gender.map(|g| g.as_str().to_owned()),
            notes: patient.notes.clone(),
            created_at: patient.created_at,
        }
    }
}

impl<'a> From<&'a Patient> for PatientChangeset<'a> {
    fn from(patient: &'a Patient) -> Self {
        Self {
            name: &patient.name,
            name_kana: patient.name_kana.as_deref(),
            phone: patient.phone.as_deref(),
            email: patient.email.as_deref(),
            birth_date: patient.birth_date,
            gender: patient.gender.map(Gender::as_str),
            notes: patient.notes.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Visits
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = visits)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VisitRow {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub patient_id: Uuid,
    pub staff_id: Option<Uuid>,
    pub visit_date: NaiveDate,
    pub treatment_menu: Option<String>,
    pub revenue: i64,
    pub created_at: DateTime<Utc>,
}

impl From<VisitRow> for Visit {
    fn from(row: VisitRow) -> Self {
        Self {
            id: VisitId::from_uuid(row.id),
            clinic_id: ClinicId::from_uuid(row.clinic_id),
            patient_id: PatientId::from_uuid(row.patient_id),
            staff_id: row.staff_id.map(StaffId::from_uuid),
            visit_date: row.visit_date,
            treatment_menu: row.treatment_menu,
            revenue: row.revenue,
            created_at: row.created_at,
        }
    }
}

impl From<&Visit> for VisitRow {
    fn from(visit: &Visit) -> Self {
        Self {
            id: *visit.id.as_uuid(),
            clinic_id: *visit.clinic_id.as_uuid(),
            patient_id: *visit.patient_id.as_uuid(),
            staff_id: visit.staff_id.map(|id| *id.as_uuid()),
            visit_date: visit.visit_date,
            treatment_menu: visit.treatment_menu.clone(),
            revenue: visit.revenue,
            created_at: visit.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = patient_visit_summary)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VisitSummaryRow {
    pub patient_id: Uuid,
    pub clinic_id: Uuid,
    pub patient_name: String,
    pub visit_count: i64,
    pub total_revenue: i64,
    pub first_visit_date: Option<NaiveDate>,
    pub last_visit_date: Option<NaiveDate>,
}

impl From<VisitSummaryRow> for PatientVisitSummary {
    fn from(row: VisitSummaryRow) -> Self {
        Self {
            patient_id: PatientId::from_uuid(row.patient_id),
            clinic_id: ClinicId::from_uuid(row.clinic_id),
            patient_name: row.patient_name,
            visit_count: row.visit_count,
            total_revenue: row.total_revenue,
            first_visit_date: row.first_visit_date,
            last_visit_date: row.last_visit_date,
        }
    }
}

// ---------------------------------------------------------------------------
// Reservations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = reservations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReservationRow {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub patient_id: Uuid,
    pub staff_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub menu: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = String;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        let status = ReservationStatus::parse(&row.status)
            .ok_or_else(|| format!("unknown reservation status '{}'", row.status))?;
        Ok(Self {
            id: ReservationId::from_uuid(row.id),
            clinic_id: ClinicId::from_uuid(row.clinic_id),
            patient_id: PatientId::from_uuid(row.patient_id),
            staff_id: row.staff_id.map(StaffId::from_uuid),
            start_time: row.start_time,
            end_time: row.end_time,
            menu: row.menu,
            notes: row.notes,
            status,
            created_at: row.created_at,
        })
    }
}

impl From<&Reservation> for ReservationRow {
    fn from(reservation: &Reservation) -> Self {
        Self {
            id: *reservation.id.as_uuid(),
            clinic_id: *reservation.clinic_id.as_uuid(),
            patient_id: *reservation.patient_id.as_uuid(),
            staff_id: reservation.staff_id.map(|id| *id.as_uuid()),
            start_time: reservation.start_time,
            end_time: reservation.end_time,
            menu: reservation.menu.clone(),
            notes: reservation.notes.clone(),
            status: reservation.status.as_str().to_owned(),
            created_at: reservation.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub clinic_id: Option<Uuid>,
    pub title: String,
    pub body: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: NotificationId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            clinic_id: row.clinic_id.map(ClinicId::from_uuid),
            title: row.title,
            body: row.body,
            is_read: row.is_read,
            created_at: row.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Permissions, audit and login
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = user_permissions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserPermissionRow {
    pub user_id: Uuid,
    pub role: String,
    pub clinic_id: Option<Uuid>,
    pub clinic_scope_ids: Option<Vec<Uuid>>,
}

impl From<UserPermissionRow> for UserPermission {
    fn from(row: UserPermissionRow) -> Self {
        Self::from_raw_role(
            UserId::from_uuid(row.user_id),
            &row.role,
            row.clinic_id.map(ClinicId::from_uuid),
            row.clinic_scope_ids
                .map(|ids| ids.into_iter().map(ClinicId::from_uuid).collect()),
        )
    }
}

impl From<&UserPermission> for UserPermissionRow {
    fn from(permission: &UserPermission) -> Self {
        Self {
            user_id: *permission.user_id.as_uuid(),
            role: permission.role.as_str().to_owned(),
            clinic_id: permission.clinic_id.map(|id| *id.as_uuid()),
            clinic_scope_ids: permission
                .clinic_scope_ids
                .as_ref()
                .map(|ids| ids.iter().map(|id| *id.as_uuid()).collect()),
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = access_audit_logs)]
pub(crate) struct NewAuditLogRow<'a> {
    pub endpoint: &'a str,
    pub reason: &'static str,
    pub user_id: Option<Uuid>,
    pub user_email: Option<&'a str>,
    pub ip_address: Option<&'a str>,
    pub user_agent: Option<&'a str>,
    pub occurred_at: DateTime<Utc>,
}

impl<'a> From<&'a AuditRecord> for NewAuditLogRow<'a> {
    fn from(record: &'a AuditRecord) -> Self {
        Self {
            endpoint: &record.endpoint,
            reason: record.reason.as_str(),
            user_id: record.user_id.map(|id| *id.as_uuid()),
            user_email: record.user_email.as_deref(),
            ip_address: record.ip_address.as_deref(),
            user_agent: record.user_agent.as_deref(),
            occurred_at: record.occurred_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = auth_users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AuthUserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn reservation_row(status: &str) -> ReservationRow {
        let now = Utc::now();
        ReservationRow {
            id: Uuid::new_v4(),
            clinic_id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            staff_id: None,
            start_time: now,
            end_time: now,
            menu: None,
            notes: None,
            status: status.to_owned(),
            created_at: now,
        }
    }

    #[rstest]
    fn unknown_reservation_status_is_rejected() {
        let err = Reservation::try_from(reservation_row("pending")).expect_err("unknown status");
        assert!(err.contains("pending"));
    }

    #[rstest]
    fn stored_status_text_round_trips() {
        let reservation = Reservation::try_from(reservation_row("no_show")).expect("valid row");
        assert_eq!(reservation.status, ReservationStatus::NoShow);
        assert_eq!(ReservationRow::from(&reservation).status, "no_show");
    }

    #[rstest]
    fn deprecated_role_names_are_normalised_on_read() {
        let row = UserPermissionRow {
            user_id: Uuid::new_v4(),
            role: "clinic_manager".to_owned(),
            clinic_id: None,
            clinic_scope_ids: Some(vec![Uuid::new_v4()]),
        };
        let permission = UserPermission::from(row);
        assert_eq!(permission.role, Role::ClinicAdmin);
        assert_eq!(permission.scope().clinic_ids().len(), 1);
    }

    #[rstest]
    fn negative_slot_minutes_fail_conversion() {
        let row = ClinicSettingsRow {
            clinic_id: Uuid::new_v4(),
            opening_time: NaiveTime::from_hms_opt(9, 0, 0).expect("time"),
            closing_time: NaiveTime::from_hms_opt(18, 0, 0).expect("time"),
            slot_minutes: -15,
            reservation_buffer_minutes: 0,
            allow_online_booking: false,
            updated_at: Utc::now(),
        };
        assert!(ClinicSettings::try_from(row).is_err());
    }
}
