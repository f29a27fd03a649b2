//! In-memory port doubles for handler and integration tests.
//!
//! [`InMemoryStore`] implements every driven port over a shared set of
//! tables so a test can seed data, drive the HTTP surface and then inspect
//! what was written (audit records in particular). Compiled for unit tests
//! and behind the `test-support` feature for `tests/`.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::{
    AnalyticsRpc, AnalyticsRpcError, AuditLog, AuditLogError, ClinicRepository,
    ClinicRepositoryError, LoginService, NotificationRepository, NotificationRepositoryError,
    PatientListQuery, PatientRepository, PatientRepositoryError, PermissionRepository,
    PermissionRepositoryError, ReservationRepository, ReservationRepositoryError,
    StaffRepository, StaffRepositoryError, VisitRepository, VisitRepositoryError,
};
use crate::domain::{
    AuditRecord, Clinic, ClinicId, ClinicSettings, DateRange, Error, LoginCredentials,
    Notification, NotificationId, Patient, PatientId, PatientVisitSummary, Principal,
    Reservation, ReservationId, ReservationStatus, Staff, UserId, UserPermission, Visit,
};
use crate::inbound::http::state::HttpStatePorts;

/// Clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixtureClock(DateTime<Utc>);

impl FixtureClock {
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }
}

impl Default for FixtureClock {
    /// 2026-04-15 09:00 UTC.
    fn default() -> Self {
        Self(
            Utc.with_ymd_and_hms(2026, 4, 15, 9, 0, 0)
                .single()
                .unwrap_or_default(),
        )
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Login account known to the in-memory login service.
#[derive(Debug, Clone)]
pub struct Account {
    pub email: String,
    pub password: String,
    pub user_id: UserId,
}

/// Rows held by [`InMemoryStore`].
#[derive(Debug, Default)]
pub struct Tables {
    pub accounts: Vec<Account>,
    pub permissions: Vec<UserPermission>,
    pub audit: Vec<AuditRecord>,
    pub clinics: Vec<Clinic>,
    pub settings: Vec<ClinicSettings>,
    pub patients: Vec<Patient>,
    pub visits: Vec<Visit>,
    pub reservations: Vec<Reservation>,
    pub staff: Vec<Staff>,
    pub notifications: Vec<Notification>,
    /// Lifetime value returned by the analytics RPC; missing patients score 0.
    pub ltv: HashMap<PatientId, i64>,
    /// Churn score returned by the analytics RPC; missing patients score 0.
    pub churn: HashMap<PatientId, i32>,
    /// Analytics RPC calls for this patient fail.
    pub failing_rpc_patient: Option<PatientId>,
    /// Audit writes fail with a connection error.
    pub audit_unavailable: bool,
    /// Every repository call fails with a connection error.
    pub database_unavailable: bool,
}

/// Shared in-memory implementation of every port.
#[derive(Clone)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
    clock: Arc<FixtureClock>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::with_clock(FixtureClock::default())
    }
}

impl InMemoryStore {
    pub fn with_clock(clock: FixtureClock) -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
            clock: Arc::new(clock),
        }
    }

    pub fn clock(&self) -> FixtureClock {
        *self.clock
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutate the tables, typically to seed fixtures.
    pub fn write<R>(&self, f: impl FnOnce(&mut Tables) -> R) -> R {
        f(&mut self.lock())
    }

    /// Read the tables.
    pub fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> R {
        f(&self.lock())
    }

    /// Audit records written so far.
    pub fn audit_records(&self) -> Vec<AuditRecord> {
        self.read(|tables| tables.audit.clone())
    }

    /// Port bundle for [`HttpState`](crate::inbound::http::state::HttpState).
    pub fn ports(&self) -> HttpStatePorts {
        let store = Arc::new(self.clone());
        HttpStatePorts {
            login: store.clone(),
            permissions: store.clone(),
            audit: store.clone(),
            clinics: store.clone(),
            patients: store.clone(),
            visits: store.clone(),
            reservations: store.clone(),
            staff: store.clone(),
            notifications: store,
            analytics: Arc::new(self.clone()),
            clock: self.clock.clone(),
        }
    }

    fn offline(&self) -> bool {
        self.read(|tables| tables.database_unavailable)
    }
}

const OFFLINE: &str = "in-memory database offline";

#[async_trait]
impl LoginService for InMemoryStore {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Principal, Error> {
        self.read(|tables| {
            tables
                .accounts
                .iter()
                .find(|account| {
                    account.email == credentials.email()
                        && account.password == credentials.password()
                })
                .map(|account| Principal::new(account.user_id, Some(account.email.clone())))
                .ok_or_else(|| Error::unauthorized("invalid credentials"))
        })
    }
}

#[async_trait]
impl PermissionRepository for InMemoryStore {
    async fn find_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserPermission>, PermissionRepositoryError> {
        if self.offline() {
            return Err(PermissionRepositoryError::connection(OFFLINE));
        }
        Ok(self.read(|tables| {
            tables
                .permissions
                .iter()
                .find(|p| p.user_id == *user_id)
                .cloned()
        }))
    }

    async fn list_for_clinic(
        &self,
        clinic_id: &ClinicId,
    ) -> Result<Vec<UserPermission>, PermissionRepositoryError> {
        Ok(self.read(|tables| {
            tables
                .permissions
                .iter()
                .filter(|p| p.clinic_id == Some(*clinic_id))
                .cloned()
                .collect()
        }))
    }

    async fn upsert(&self, permission: &UserPermission) -> Result<(), PermissionRepositoryError> {
        self.write(|tables| {
            tables.permissions.retain(|p| p.user_id != permission.user_id);
            tables.permissions.push(permission.clone());
        });
        Ok(())
    }
}

#[async_trait]
impl AuditLog for InMemoryStore {
    async fn record(&self, record: &AuditRecord) -> Result<(), AuditLogError> {
        self.write(|tables| {
            if tables.audit_unavailable {
                return Err(AuditLogError::connection("audit sink offline"));
            }
            tables.audit.push(record.clone());
            Ok(())
        })
    }
}

#[async_trait]
impl ClinicRepository for InMemoryStore {
    async fn list_by_ids(&self, ids: &[ClinicId]) -> Result<Vec<Clinic>, ClinicRepositoryError> {
        Ok(self.read(|tables| {
            let mut clinics: Vec<Clinic> = tables
                .clinics
                .iter()
                .filter(|c| ids.contains(&c.id))
                .cloned()
                .collect();
            clinics.sort_by(|a, b| a.name.cmp(&b.name));
            clinics
        }))
    }

    async fn find(&self, id: &ClinicId) -> Result<Option<Clinic>, ClinicRepositoryError> {
        Ok(self.read(|tables| tables.clinics.iter().find(|c| c.id == *id).cloned()))
    }

    async fn settings(
        &self,
        clinic_id: &ClinicId,
    ) -> Result<Option<ClinicSettings>, ClinicRepositoryError> {
        Ok(self.read(|tables| {
            tables
                .settings
                .iter()
                .find(|s| s.clinic_id == *clinic_id)
                .cloned()
        }))
    }

    async fn save_settings(&self, settings: &ClinicSettings) -> Result<(), ClinicRepositoryError> {
        self.write(|tables| {
            tables.settings.retain(|s| s.clinic_id != settings.clinic_id);
            tables.settings.push(settings.clone());
        });
        Ok(())
    }
}

#[async_trait]
impl PatientRepository for InMemoryStore {
    async fn list(&self, query: &PatientListQuery) -> Result<Vec<Patient>, PatientRepositoryError> {
        if self.offline() {
            return Err(PatientRepositoryError::connection(OFFLINE));
        }
        let needle = query.search.as_ref().map(|s| s.to_lowercase());
        Ok(self.read(|tables| {
            let mut rows: Vec<Patient> = tables
                .patients
                .iter()
                .filter(|p| p.clinic_id == query.clinic_id)
                .filter(|p| match &needle {
                    Some(needle) => {
                        p.name.to_lowercase().contains(needle.as_str())
                            || p.name_kana
                                .as_ref()
                                .is_some_and(|kana| kana.to_lowercase().contains(needle.as_str()))
                    }
                    None => true,
                })
                .filter(|p| query.after.is_none_or(|after| p.page_key() > after))
                .cloned()
                .collect();
            rows.sort_by_key(Patient::page_key);
            rows.truncate(query.limit);
            rows
        }))
    }

    async fn find(&self, id: &PatientId) -> Result<Option<Patient>, PatientRepositoryError> {
        if self.offline() {
            return Err(PatientRepositoryError::connection(OFFLINE));
        }
        Ok(self.read(|tables| tables.patients.iter().find(|p| p.id == *id).cloned()))
    }

    async fn insert(&self, patient: &Patient) -> Result<(), PatientRepositoryError> {
        self.write(|tables| tables.patients.push(patient.clone()));
        Ok(())
    }

    async fn update(&self, patient: &Patient) -> Result<bool, PatientRepositoryError> {
        Ok(self.write(|tables| {
            match tables.patients.iter_mut().find(|p| p.id == patient.id) {
                Some(row) => {
                    *row = patient.clone();
                    true
                }
                None => false,
            }
        }))
    }
}

#[async_trait]
impl VisitRepository for InMemoryStore {
    async fn insert(&self, visit: &Visit) -> Result<(), VisitRepositoryError> {
        self.write(|tables| tables.visits.push(visit.clone()));
        Ok(())
    }

    async fn list(
        &self,
        clinic_id: &ClinicId,
        range: &DateRange,
    ) -> Result<Vec<Visit>, VisitRepositoryError> {
        Ok(self.read(|tables| {
            let mut rows: Vec<Visit> = tables
                .visits
                .iter()
                .filter(|v| v.clinic_id == *clinic_id && range.contains(v.visit_date))
                .cloned()
                .collect();
            rows.sort_by_key(|v| (v.visit_date, v.created_at));
            rows
        }))
    }

    async fn summaries(
        &self,
        clinic_id: &ClinicId,
    ) -> Result<Vec<PatientVisitSummary>, VisitRepositoryError> {
        if self.offline() {
            return Err(VisitRepositoryError::connection(OFFLINE));
        }
        Ok(self.read(|tables| {
            let mut grouped: BTreeMap<PatientId, PatientVisitSummary> = BTreeMap::new();
            for visit in tables.visits.iter().filter(|v| v.clinic_id == *clinic_id) {
                let name = tables
                    .patients
                    .iter()
                    .find(|p| p.id == visit.patient_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_default();
                let row = grouped
                    .entry(visit.patient_id)
                    .or_insert_with(|| PatientVisitSummary {
                        patient_id: visit.patient_id,
                        clinic_id: *clinic_id,
                        patient_name: name,
                        visit_count: 0,
                        total_revenue: 0,
                        first_visit_date: None,
                        last_visit_date: None,
                    });
                row.visit_count += 1;
                row.total_revenue += visit.revenue;
                row.first_visit_date = Some(
                    row.first_visit_date
                        .map_or(visit.visit_date, |d| d.min(visit.visit_date)),
                );
                row.last_visit_date = Some(
                    row.last_visit_date
                        .map_or(visit.visit_date, |d| d.max(visit.visit_date)),
                );
            }
            grouped.into_values().collect()
        }))
    }
}

#[async_trait]
impl ReservationRepository for InMemoryStore {
    async fn insert(&self, reservation: &Reservation) -> Result<(), ReservationRepositoryError> {
        self.write(|tables| tables.reservations.push(reservation.clone()));
        Ok(())
    }

    async fn find(
        &self,
        id: &ReservationId,
    ) -> Result<Option<Reservation>, ReservationRepositoryError> {
        Ok(self.read(|tables| tables.reservations.iter().find(|r| r.id == *id).cloned()))
    }

    async fn list(
        &self,
        clinic_id: &ClinicId,
        range: Option<DateRange>,
    ) -> Result<Vec<Reservation>, ReservationRepositoryError> {
        Ok(self.read(|tables| {
            let mut rows: Vec<Reservation> = tables
                .reservations
                .iter()
                .filter(|r| r.clinic_id == *clinic_id)
                .filter(|r| {
                    range.is_none_or(|range| {
                        r.start_time >= range.start_instant()
                            && r.start_time < range.end_instant_exclusive()
                    })
                })
                .cloned()
                .collect();
            rows.sort_by_key(|r| (r.start_time, r.id));
            rows
        }))
    }

    async fn update_status(
        &self,
        id: &ReservationId,
        expected: ReservationStatus,
        next: ReservationStatus,
    ) -> Result<bool, ReservationRepositoryError> {
        Ok(self.write(|tables| {
            match tables
                .reservations
                .iter_mut()
                .find(|r| r.id == *id && r.status == expected)
            {
                Some(row) => {
                    row.status = next;
                    true
                }
                None => false,
            }
        }))
    }
}

#[async_trait]
impl StaffRepository for InMemoryStore {
    async fn list(&self, clinic_id: &ClinicId) -> Result<Vec<Staff>, StaffRepositoryError> {
        Ok(self.read(|tables| {
            tables
                .staff
                .iter()
                .filter(|s| s.clinic_id == *clinic_id)
                .cloned()
                .collect()
        }))
    }
}

#[async_trait]
impl NotificationRepository for InMemoryStore {
    async fn list_for_user(
        &self,
        user_id: &UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        Ok(self.read(|tables| {
            let mut rows: Vec<Notification> = tables
                .notifications
                .iter()
                .filter(|n| n.user_id == *user_id && (!unread_only || !n.is_read))
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            rows
        }))
    }

    async fn mark_read(
        &self,
        user_id: &UserId,
        id: &NotificationId,
    ) -> Result<bool, NotificationRepositoryError> {
        Ok(self.write(|tables| {
            match tables
                .notifications
                .iter_mut()
                .find(|n| n.id == *id && n.user_id == *user_id)
            {
                Some(row) => {
                    row.is_read = true;
                    true
                }
                None => false,
            }
        }))
    }
}

#[async_trait]
impl AnalyticsRpc for InMemoryStore {
    async fn patient_ltv(&self, patient_id: &PatientId) -> Result<i64, AnalyticsRpcError> {
        self.read(|tables| {
            if tables.failing_rpc_patient == Some(*patient_id) {
                return Err(AnalyticsRpcError::procedure(
                    "calculate_patient_ltv",
                    "division by zero",
                ));
            }
            Ok(tables.ltv.get(patient_id).copied().unwrap_or_default())
        })
    }

    async fn churn_risk(&self, patient_id: &PatientId) -> Result<i32, AnalyticsRpcError> {
        self.read(|tables| {
            if tables.failing_rpc_patient == Some(*patient_id) {
                return Err(AnalyticsRpcError::procedure(
                    "calculate_churn_risk",
                    "division by zero",
                ));
            }
            Ok(tables.churn.get(patient_id).copied().unwrap_or_default())
        })
    }
}
