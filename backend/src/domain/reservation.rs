//! Reservations and their status lifecycle.
//!
//! ```text
//! tentative ──► confirmed ──► arrived ──► completed
//!     │             │
//!     └► cancelled ◄┘──► no_show
//! ```

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{FieldErrors, optional_text};
use super::{ClinicId, Error, PatientId, ReservationId, StaffId};

/// Longest bookable reservation.
pub const MAX_RESERVATION_HOURS: i64 = 8;
const MENU_MAX: usize = 100;
const NOTES_MAX: usize = 1000;

/// Booking lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Tentative,
    Confirmed,
    Arrived,
    Completed,
    Cancelled,
    NoShow,
}

impl ReservationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tentative => "tentative",
            Self::Confirmed => "confirmed",
            Self::Arrived => "arrived",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::NoShow => "no_show",
        }
    }

    /// Parse a stored or wire value.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "tentative" => Some(Self::Tentative),
            "confirmed" => Some(Self::Confirmed),
            "arrived" => Some(Self::Arrived),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            "no_show" => Some(Self::NoShow),
            _ => None,
        }
    }

    /// Whether the lifecycle permits moving from `self` to `next`.
    ///
    /// # Examples
    /// ```
    /// use clinic_backend::domain::ReservationStatus::*;
    ///
    /// assert!(Tentative.can_transition_to(Confirmed));
    /// assert!(!Completed.can_transition_to(Cancelled));
    /// ```
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Tentative, Self::Confirmed | Self::Cancelled)
                | (Self::Confirmed, Self::Arrived | Self::Cancelled | Self::NoShow)
                | (Self::Arrived, Self::Completed)
        )
    }

    /// No further transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::NoShow)
    }

    /// Checked transition; illegal moves are a conflict.
    pub fn transition(self, next: Self) -> Result<Self, Error> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(Error::conflict(format!(
                "cannot change reservation status from {self} to {next}"
            ))
            .with_details(serde_json::json!({
                "currentStatus": self.as_str(),
                "requestedStatus": next.as_str(),
            })))
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A booked time slot for a patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: ReservationId,
    pub clinic_id: ClinicId,
    pub patient_id: PatientId,
    pub staff_id: Option<StaffId>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub menu: Option<String>,
    pub notes: Option<String>,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
}

/// Raw reservation payload as received from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationDraft {
    pub patient_id: String,
    pub staff_id: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub menu: Option<String>,
    pub notes: Option<String>,
    /// Book directly as confirmed instead of tentative.
    pub confirmed: bool,
}

/// Validated reservation fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationFields {
    pub patient_id: PatientId,
    pub staff_id: Option<StaffId>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub menu: Option<String>,
    pub notes: Option<String>,
    pub status: ReservationStatus,
}

impl ReservationDraft {
    /// Validate the time window and free-text fields.
    pub fn validate(self) -> Result<ReservationFields, FieldErrors> {
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
        if self.start_time >= self.end_time {
            errors.add("endTime", "end time must be after start time");
        } else if self.end_time - self.start_time > Duration::hours(MAX_RESERVATION_HOURS) {
            errors.add(
                "endTime",
                format!("reservation must not exceed {MAX_RESERVATION_HOURS} hours"),
            );
        }
        let menu = errors.check("menu", optional_text(self.menu.as_deref(), "menu", MENU_MAX));
        let notes = errors.check(
            "notes",
            optional_text(self.notes.as_deref(), "notes", NOTES_MAX),
        );

        match (patient_id, staff_id, menu, notes) {
            (Some(patient_id), Some(staff_id), Some(menu), Some(notes)) if errors.is_empty() => {
                Ok(ReservationFields {
                    patient_id,
                    staff_id,
                    start_time: self.start_time,
                    end_time: self.end_time,
                    menu,
                    notes,
                    status: if self.confirmed {
                        ReservationStatus::Confirmed
                    } else {
                        ReservationStatus::Tentative
                    },
                })
            }
            _ => Err(errors),
        }
    }
}
