use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use sqlx::types::Json as JsonColumn;
use tracing::{info, instrument, warn};

use super::{
    dto::{CsvSettingsBody, ImportResponse},
    repo_types::CsvImportSetting,
    services::{plan_import, FormatChoice, ImportOptions},
    MAX_UPLOAD_BYTES,
};
use crate::{
    auth::AuthUser, calendar::today, error::ApiError, extract::{ValidJson, ValidMultipart}, state::AppState,
};

pub fn csv_settings_routes() -> Router<AppState> {
    Router::new().route("/csv-settings", get(get_csv_settings).put(put_csv_settings))
}

fn parse_flag(field: &str, raw: &str) -> Result<bool, ApiError> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        _ => Err(ApiError::BadRequest(format!("{field} must be true or false"))),
    }
}

/// POST /transactions/import (multipart)
/// Fields: file, csvFormat, skipHeader, categorize
#[instrument(skip(state, mp))]
pub async fn import_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidMultipart(mut mp): ValidMultipart,
) -> Result<Json<ImportResponse>, ApiError> {
    let mut opts = ImportOptions::default();
    let mut file = None;
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        match name.as_str() {
            "file" => file = Some(data),
            "csvFormat" => opts.format = FormatChoice::parse(&String::from_utf8_lossy(&data))?,
            "skipHeader" => opts.skip_header = parse_flag(&name, &String::from_utf8_lossy(&data))?,
            "categorize" => opts.categorize = parse_flag(&name, &String::from_utf8_lossy(&data))?,
            _ => {}
        }
    }

    let file = file.ok_or_else(|| ApiError::bad_request("No file uploaded"))?;
    if file.len() > MAX_UPLOAD_BYTES {
        return Err(ApiError::bad_request("File is larger than 5 MB"));
    }
    let text = std::str::from_utf8(&file)
        .map_err(|_| ApiError::bad_request("File must be UTF-8 text"))?
        .trim_start_matches('\u{feff}');

    let categories = state.store.list_categories(auth.user_id).await?;
    let saved = state.store.get_csv_settings(auth.user_id).await?;
    let plan = plan_import(text, opts, &categories, saved.as_ref(), today())?;
    if plan.skipped > 0 {
        warn!(user_id = %auth.user_id, skipped = plan.skipped, "csv rows without a readable amount skipped");
    }

    let imported = state
        .store
        .insert_transactions(auth.user_id, plan.rows)
        .await?
        .len();

    let mut setting = saved.unwrap_or_else(|| CsvImportSetting::empty(auth.user_id));
    setting.bank_name = Some(plan.format.to_string());
    setting.skip_header = opts.skip_header;
    state.store.upsert_csv_settings(&setting).await?;
    info!(user_id = %auth.user_id, imported, format = plan.format, "csv imported");

    Ok(Json(ImportResponse {
        success: true,
        imported,
        skipped: plan.skipped,
        format: plan.format,
        message: format!("Successfully imported {imported} transactions"),
    }))
}

/// Saved settings, or the defaults when the user has none.
#[instrument(skip(state))]
pub async fn get_csv_settings(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<CsvImportSetting>, ApiError> {
    let setting = state
        .store
        .get_csv_settings(auth.user_id)
        .await?
        .unwrap_or_else(|| CsvImportSetting::empty(auth.user_id));
    Ok(Json(setting))
}

#[instrument(skip(state, payload))]
pub async fn put_csv_settings(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(payload): ValidJson<CsvSettingsBody>,
) -> Result<Json<CsvImportSetting>, ApiError> {
    let body = payload.validate()?;
    let id = state
        .store
        .get_csv_settings(auth.user_id)
        .await?
        .map(|s| s.id)
        .unwrap_or_else(uuid::Uuid::new_v4);
    let setting = CsvImportSetting {
        id,
        user_id: auth.user_id,
        bank_name: body.bank_name,
        column_mapping: body.column_mapping.map(JsonColumn),
        skip_header: body.skip_header,
        auto_categories: body.auto_categories.map(JsonColumn),
    };
    let saved = state.store.upsert_csv_settings(&setting).await?;
    Ok(Json(saved))
}

#[cfg(test)]
mod tests {
    use super::parse_flag;

    #[test]
    fn flags() {
        assert!(parse_flag("skipHeader", "true").unwrap());
        assert!(!parse_flag("skipHeader", " FALSE ").unwrap());
        assert!(parse_flag("skipHeader", "maybe").is_err());
    }
}
