use admitdesk_core::errors::AppError;
use admitdesk_db::SettingsRepository;
use admitdesk_models::settings::{Settings, UpdateSettingsDto};
use anyhow::anyhow;
use admitdesk_core::dates::parse_iso_date;
use tracing::instrument;

pub struct SettingsService;

impl SettingsService {
    #[instrument(skip(settings))]
    pub async fn get(settings: &dyn SettingsRepository) -> Result<Settings, AppError> {
        Ok(settings.get_or_create().await?)
    }

    /// Applies a partial update. Dates must be `YYYY-MM-DD` or an RFC 3339
    /// timestamp (stored as its date), or empty to clear.
    #[instrument(skip(settings))]
    pub async fn update(
        settings: &dyn SettingsRepository,
        mut dto: UpdateSettingsDto,
    ) -> Result<Settings, AppError> {
        dto.exam_date = normalize_date("examDate", dto.exam_date)?;
        dto.last_date_to_register = normalize_date("lastDateToRegister", dto.last_date_to_register)?;
        dto.result_date = normalize_date("resultDate", dto.result_date)?;

        Ok(settings.update(dto).await?)
    }
}

fn normalize_date(field: &str, value: Option<String>) -> Result<Option<String>, AppError> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Some(String::new()));
    }

    parse_iso_date(raw)
        .map(|d| Some(d.format("%Y-%m-%d").to_string()))
        .ok_or_else(|| AppError::unprocessable(anyhow!("{} must be a YYYY-MM-DD date", field)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use admitdesk_db::repos::memory::InMemorySettingsRepository;

    #[tokio::test]
    async fn test_get_creates_defaults() {
        let repo = InMemorySettingsRepository::new();
        let settings = SettingsService::get(&repo).await.unwrap();
        assert!(settings.registration_open);
        assert!(settings.exam_date.is_none());
    }

    #[tokio::test]
    async fn test_update_normalizes_iso_timestamp() {
        let repo = InMemorySettingsRepository::new();
        let dto = UpdateSettingsDto {
            exam_date: Some("2025-03-09T00:00:00.000Z".to_string()),
            ..Default::default()
        };
        let settings = SettingsService::update(&repo, dto).await.unwrap();
        assert_eq!(settings.exam_date.as_deref(), Some("2025-03-09"));
    }

    #[tokio::test]
    async fn test_empty_date_clears() {
        let repo = InMemorySettingsRepository::new();
        let set = UpdateSettingsDto {
            exam_date: Some("2025-03-09".to_string()),
            ..Default::default()
        };
        SettingsService::update(&repo, set).await.unwrap();

        let clear = UpdateSettingsDto {
            exam_date: Some(String::new()),
            ..Default::default()
        };
        let settings = SettingsService::update(&repo, clear).await.unwrap();
        assert!(settings.exam_date.is_none());
    }

    #[tokio::test]
    async fn test_invalid_date_is_rejected() {
        let repo = InMemorySettingsRepository::new();
        let dto = UpdateSettingsDto {
            exam_date: Some("09/03/2025".to_string()),
            ..Default::default()
        };
        let err = SettingsService::update(&repo, dto).await.unwrap_err();
        assert_eq!(err.status.as_u16(), 422);
    }

    #[tokio::test]
    async fn test_trailing_text_after_date_is_rejected() {
        let repo = InMemorySettingsRepository::new();
        let dto = UpdateSettingsDto {
            result_date: Some("2025-03-09garbage".to_string()),
            ..Default::default()
        };
        let err = SettingsService::update(&repo, dto).await.unwrap_err();
        assert_eq!(err.error.to_string(), "resultDate must be a YYYY-MM-DD date");

        let settings = SettingsService::get(&repo).await.unwrap();
        assert!(settings.result_date.is_none());
    }
}
