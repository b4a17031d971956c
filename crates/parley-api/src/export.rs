use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};
use chrono::SecondsFormat;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use tracing::info;

use parley_core::CoreError;
use parley_types::models::User;

use crate::auth::AppState;
use crate::error::ApiError;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const SHEET_NAME: &str = "Users";
const HEADERS: [&str; 4] = ["ID", "Email", "Created_at", "Updated_at"];

/// Download every account as a spreadsheet. Password hashes are not exported.
pub async fn export_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let users = state.accounts.get_all().await?;
    let bytes = build_workbook(&users)
        .map_err(|e| CoreError::Internal(format!("user export failed: {}", e)))?;

    info!("Exported {} users ({} bytes)", users.len(), bytes.len());
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE),
            (header::CONTENT_DISPOSITION, "attachment; filename=data.xlsx"),
        ],
        bytes,
    ))
}

fn export_row(user: &User) -> [String; 4] {
    [
        user.id.clone(),
        user.email.clone(),
        user.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
        user.updated_at.to_rfc3339_opts(SecondsFormat::Micros, true),
    ]
}

fn build_workbook(users: &[User]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, title) in (0u16..).zip(HEADERS) {
        sheet.write_string_with_format(0, col, title, &bold)?;
    }
    for (row, user) in (1u32..).zip(users) {
        for (col, value) in (0u16..).zip(export_row(user)) {
            sheet.write_string(row, col, value)?;
        }
    }

    workbook.save_to_buffer()
}
