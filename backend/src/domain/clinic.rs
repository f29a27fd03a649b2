//! Clinics (tenants) and their administrative settings.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::ClinicId;
use super::validation::FieldErrors;

pub const SLOT_MINUTES_MIN: i64 = 5;
pub const SLOT_MINUTES_MAX: i64 = 240;
pub const BUFFER_MINUTES_MAX: i64 = 120;

/// A clinic, optionally belonging to a parent organisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clinic {
    pub id: ClinicId,
    pub name: String,
    pub parent_id: Option<ClinicId>,
    pub is_active: bool,
}

/// Opening hours and booking policy for one clinic.
///
/// ## Invariants
/// - `opening_time < closing_time`.
/// - `slot_minutes` lies in 5..=240 and `reservation_buffer_minutes` in 0..=120.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicSettings {
    pub clinic_id: ClinicId,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
    pub slot_minutes: u16,
    pub reservation_buffer_minutes: u16,
    pub allow_online_booking: bool,
    pub updated_at: DateTime<Utc>,
}

/// Unvalidated settings update as received from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinicSettingsDraft {
    pub opening_time: String,
    pub closing_time: String,
    pub slot_minutes: i64,
    pub reservation_buffer_minutes: i64,
    pub allow_online_booking: bool,
}

fn parse_time(raw: &str, label: &str) -> Result<NaiveTime, String> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| format!("{label} must be a time in HH:MM format"))
}

fn bounded_minutes(value: i64, label: &str, min: i64, max: i64) -> Result<u16, String> {
    if (min..=max).contains(&value) {
        u16::try_from(value).map_err(|_| format!("{label} is out of range"))
    } else {
        Err(format!("{label} must be between {min} and {max}"))
    }
}

impl ClinicSettingsDraft {
    /// Validate every field and produce settings stamped with `now`.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use clinic_backend::domain::{ClinicId, ClinicSettingsDraft};
    ///
    /// let draft = ClinicSettingsDraft {
    ///     opening_time: "09:00".into(),
    ///     closing_time: "18:30".into(),
    ///     slot_minutes: 30,
    ///     reservation_buffer_minutes: 10,
    ///     allow_online_booking: true,
    /// };
    /// let settings = draft.validate(ClinicId::random(), Utc::now()).unwrap();
    /// assert_eq!(settings.slot_minutes, 30);
    /// ```
    pub fn validate(
        self,
        clinic_id: ClinicId,
        now: DateTime<Utc>,
    ) -> Result<ClinicSettings, FieldErrors> {
        let mut errors = FieldErrors::default();
        let opening = errors.check("openingTime", parse_time(&self.opening_time, "opening time"));
        let closing = errors.check("closingTime", parse_time(&self.closing_time, "closing time"));
        let slot = errors.check(
            "slotMinutes",
            bounded_minutes(
                self.slot_minutes,
                "slot minutes",
                SLOT_MINUTES_MIN,
                SLOT_MINUTES_MAX,
            ),
        );
        let buffer = errors.check(
            "reservationBufferMinutes",
            bounded_minutes(
                self.reservation_buffer_minutes,
                "reservation buffer",
                0,
                BUFFER_MINUTES_MAX,
            ),
        );
        if matches!((opening, closing), (Some(open), Some(close)) if open >= close) {
            errors.add("closingTime", "closing time must be after opening time");
        }

        match (opening, closing, slot, buffer) {
            (Some(opening_time), Some(closing_time), Some(slot_minutes), Some(buffer_minutes))
                if errors.is_empty() =>
            {
                Ok(ClinicSettings {
                    clinic_id,
                    opening_time,
                    closing_time,
                    slot_minutes,
                    reservation_buffer_minutes: buffer_minutes,
                    allow_online_booking: self.allow_online_booking,
                    updated_at: now,
                })
            }
            _ => Err(errors),
        }
    }
}
