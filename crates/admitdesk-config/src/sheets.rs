use crate::env::{optional, string_or};

/// Google Sheets export settings.
///
/// The mirror is enabled only when the sheet id and both service account
/// credentials are present.
#[derive(Clone, Debug)]
pub struct SheetsConfig {
    pub sheet_id: Option<String>,
    pub sheet_name: String,
    pub service_account_email: Option<String>,
    /// PEM private key; literal `\n` sequences are expanded.
    pub private_key: Option<String>,
    pub token_uri: String,
    pub api_base: String,
}

impl SheetsConfig {
    pub fn from_env() -> Self {
        Self {
            sheet_id: optional("GOOGLE_SHEET_ID"),
            sheet_name: string_or("GOOGLE_SHEET_NAME", "Sheet1"),
            service_account_email: optional("GOOGLE_SERVICE_ACCOUNT_EMAIL"),
            private_key: optional("GOOGLE_PRIVATE_KEY").map(|k| k.replace("\\n", "\n")),
            token_uri: string_or("GOOGLE_TOKEN_URI", "https://oauth2.googleapis.com/token"),
            api_base: string_or(
                "GOOGLE_SHEETS_API_BASE",
                "https://sheets.googleapis.com/v4/spreadsheets",
            ),
        }
    }
}
