//! Patient records and their validation rules.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::auth::is_plausible_email;
use super::validation::{FieldErrors, optional_text, required_text};
use super::{ClinicId, PatientId};

const NAME_MAX: usize = 100;
const KANA_MAX: usize = 100;
const PHONE_MAX: usize = 20;
const EMAIL_MAX: usize = 254;
const NOTES_MAX: usize = 2000;

/// Self-reported gender recorded on intake forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
    Unspecified,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
            Self::Unspecified => "unspecified",
        }
    }

    /// Parse a wire value; unknown values return `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            "other" => Some(Self::Other),
            "unspecified" => Some(Self::Unspecified),
            _ => None,
        }
    }
}

/// A patient registered at one clinic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: PatientId,
    pub clinic_id: ClinicId,
    pub name: String,
    pub name_kana: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Patient {
    /// Build a new record from validated fields.
    pub fn create(
        id: PatientId,
        clinic_id: ClinicId,
        fields: PatientFields,
        created_at: DateTime<Utc>,
    ) -> Self {
        let mut patient = Self {
            id,
            clinic_id,
            name: String::new(),
            name_kana: None,
            phone: None,
            email: None,
            birth_date: None,
            gender: None,
            notes: None,
            created_at,
        };
        patient.apply(fields);
        patient
    }

    /// Replace the editable fields, keeping identity and creation time.
    pub fn apply(&mut self, fields: PatientFields) {
        self.name = fields.name;
        self.name_kana = fields.name_kana;
        self.phone = fields.phone;
        self.email = fields.email;
        self.birth_date = fields.birth_date;
        self.gender = fields.gender;
        self.notes = fields.notes;
    }

    /// Keyset pagination key: creation time then id.
    pub fn page_key(&self) -> PatientPageKey {
        PatientPageKey {
            created_at: self.created_at,
            id: self.id,
        }
    }
}

/// Ordering key for patient listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientPageKey {
    pub created_at: DateTime<Utc>,
    pub id: PatientId,
}

/// Editable patient fields after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientFields {
    pub name: String,
    pub name_kana: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub notes: Option<String>,
}

/// Raw patient payload as received from a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientDraft {
    pub name: String,
    pub name_kana: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// ISO-8601 calendar date.
    pub birth_date: Option<String>,
    pub gender: Option<String>,
    pub notes: Option<String>,
}

fn validate_phone(raw: Option<&str>) -> Result<Option<String>, String> {
    let Some(phone) = optional_text(raw, "phone", PHONE_MAX)? else {
        return Ok(None);
    };
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, '-' | '+' | '(' | ')');
    if phone.chars().all(allowed) && phone.chars().any(|c| c.is_ascii_digit()) {
        Ok(Some(phone))
    } else {
        Err("phone may only contain digits and - + ( )".to_owned())
    }
}

fn validate_email(raw: Option<&str>) -> Result<Option<String>, String> {
    let Some(email) = optional_text(raw, "email", EMAIL_MAX)? else {
        return Ok(None);
    };
    if is_plausible_email(&email) {
        Ok(Some(email))
    } else {
        Err("email must be a valid address".to_owned())
    }
}

fn validate_birth_date(raw: Option<&str>, today: NaiveDate) -> Result<Option<NaiveDate>, String> {
    let Some(text) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|_| "birth date must be a date in YYYY-MM-DD format".to_owned())?;
    if date > today {
        return Err("birth date must not be in the future".to_owned());
    }
    Ok(Some(date))
}

fn validate_gender(raw: Option<&str>) -> Result<Option<Gender>, String> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(text) => Gender::parse(text)
            .map(Some)
            .ok_or_else(|| "gender must be one of male, female, other, unspecified".to_owned()),
    }
}

impl PatientDraft {
    /// Validate every field, reporting all failures together.
    ///
    /// `today` is the reference date for the birth-date check.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use clinic_backend::domain::PatientDraft;
    ///
    /// let draft = PatientDraft {
    ///     name: "Yamada Hanako".into(),
    ///     phone: Some("03-1234-5678".into()),
    ///     ..PatientDraft::default()
    /// };
    /// let today = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
    /// let fields = draft.validate(today).unwrap();
    /// assert_eq!(fields.phone.as_deref(), Some("03-1234-5678"));
    /// ```
    pub fn validate(self, today: NaiveDate) -> Result<PatientFields, FieldErrors> {
        let mut errors = FieldErrors::default();
        let name = errors.check("name", required_text(&self.name, "name", NAME_MAX));
        let name_kana = errors.check(
            "nameKana",
            optional_text(self.name_kana.as_deref(), "name kana", KANA_MAX),
        );
        let phone = errors.check("phone", validate_phone(self.phone.as_deref()));
        let email = errors.check("email", validate_email(self.email.as_deref()));
        let birth_date = errors.check(
            "birthDate",
            validate_birth_date(self.birth_date.as_deref(), today),
        );
        let gender = errors.check("gender", validate_gender(self.gender.as_deref()));
        let notes = errors.check(
            "notes",
            optional_text(self.notes.as_deref(), "notes", NOTES_MAX),
        );

        match (name, name_kana, phone, email, birth_date, gender, notes) {
            (
                Some(name),
                Some(name_kana),
                Some(phone),
                Some(email),
                Some(birth_date),
                Some(gender),
                Some(notes),
            ) => Ok(PatientFields {
                name,
                name_kana,
                phone,
                email: email.map(|e| e.to_lowercase()),
                birth_date,
                gender,
                notes,
            }),
            _ => Err(errors),
        }
    }
}
