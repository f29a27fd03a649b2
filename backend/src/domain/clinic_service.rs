//! Clinic listing and administrative settings.

use std::sync::Arc;

use mockable::Clock;

use super::ports::ClinicRepository;
use super::{Clinic, ClinicId, ClinicScope, ClinicSettings, ClinicSettingsDraft, Error};

#[derive(Clone)]
pub struct ClinicService {
    clinics: Arc<dyn ClinicRepository>,
    clock: Arc<dyn Clock>,
}

impl ClinicService {
    pub fn new(clinics: Arc<dyn ClinicRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { clinics, clock }
    }

    /// Every clinic inside `scope`.
    pub async fn list_visible(&self, scope: &ClinicScope) -> Result<Vec<Clinic>, Error> {
        if scope.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.clinics.list_by_ids(scope.clinic_ids()).await?)
    }

    pub async fn get(&self, clinic_id: &ClinicId) -> Result<Clinic, Error> {
        self.clinics
            .find(clinic_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("clinic {clinic_id} not found")))
    }

    pub async fn settings(&self, clinic_id: &ClinicId) -> Result<ClinicSettings, Error> {
        self.clinics
            .settings(clinic_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("settings for clinic {clinic_id} not found")))
    }

    /// Validate and store new settings.
    pub async fn update_settings(
        &self,
        clinic_id: &ClinicId,
        draft: ClinicSettingsDraft,
    ) -> Result<ClinicSettings, Error> {
        let settings = draft
            .validate(*clinic_id, self.clock.utc())
            .map_err(Error::validation)?;
        self.get(clinic_id).await?;
        self.clinics.save_settings(&settings).await?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockClinicRepository;
    use crate::domain::{ErrorCode, Role, UserId, UserPermission};
    use mockable::DefaultClock;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn empty_scope_lists_nothing_without_query() {
        let mut repo = MockClinicRepository::new();
        repo.expect_list_by_ids().times(0);
        let service = ClinicService::new(Arc::new(repo), Arc::new(DefaultClock));
        let permission = UserPermission {
            user_id: UserId::random(),
            role: Role::Staff,
            clinic_id: None,
            clinic_scope_ids: None,
        };

        let clinics = service
            .list_visible(&permission.scope())
            .await
            .expect("list");

        assert!(clinics.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn invalid_settings_are_not_saved() {
        let mut repo = MockClinicRepository::new();
        repo.expect_save_settings().times(0);
        let service = ClinicService::new(Arc::new(repo), Arc::new(DefaultClock));
        let draft = ClinicSettingsDraft {
            opening_time: "18:00".to_owned(),
            closing_time: "09:00".to_owned(),
            slot_minutes: 30,
            reservation_buffer_minutes: 0,
            allow_online_booking: true,
        };

        let err = service
            .update_settings(&ClinicId::random(), draft)
            .await
            .expect_err("invalid");

        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_settings_are_not_found() {
        let mut repo = MockClinicRepository::new();
        repo.expect_settings().returning(|_| Ok(None));
        let service = ClinicService::new(Arc::new(repo), Arc::new(DefaultClock));

        let err = service
            .settings(&ClinicId::random())
            .await
            .expect_err("missing");

        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
