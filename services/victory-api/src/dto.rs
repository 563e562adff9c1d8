//! Request and response bodies for the HTTP API.
//!
//! Field names follow the existing web client (`pub`, `isAlias`).

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use victory_identity::{
    AppliedUpdate, Identity, IdentityField, RegistrationRequest, RequestKind, SubmissionReceipt,
    UpdateRequest, VerificationCode, VerifyError,
};

#[derive(Debug, Clone, Deserialize)]
pub struct ValidateDto {
    #[serde(rename = "pub")]
    pub public_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterDto {
    #[serde(rename = "pub")]
    pub public_key: String,
    pub alias: String,
    pub email: String,
}

impl From<RegisterDto> for RegistrationRequest {
    fn from(dto: RegisterDto) -> Self {
        RegistrationRequest {
            public_key: dto.public_key,
            alias: dto.alias,
            email: dto.email,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDto {
    #[serde(rename = "pub")]
    pub public_key: String,
    #[serde(rename = "isAlias")]
    pub is_alias: bool,
    pub value: String,
}

impl From<UpdateDto> for UpdateRequest {
    fn from(dto: UpdateDto) -> Self {
        UpdateRequest {
            public_key: dto.public_key,
            field: IdentityField::from_is_alias(dto.is_alias),
            value: dto.value,
        }
    }
}

/// Body of the two redeem endpoints. `code` may be a string or a number.
#[derive(Debug, Clone, Deserialize)]
pub struct RedeemDto {
    pub code: CodeInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CodeInput {
    Number(i64),
    Text(String),
}

impl RedeemDto {
    /// Resolve the submitted code.
    ///
    /// Anything that is not a whole number is `InvalidInput`. A number outside
    /// the code space can never have been issued and reads as
    /// `InvalidOrExpiredCode`, the same as an unissued code.
    pub fn verification_code(&self) -> Result<VerificationCode, VerifyError> {
        match &self.code {
            CodeInput::Number(n) => u16::try_from(*n)
                .ok()
                .and_then(|v| VerificationCode::new(v).ok())
                .ok_or(VerifyError::InvalidOrExpiredCode),
            CodeInput::Text(raw) => {
                let digits = raw.trim().strip_prefix('-').unwrap_or(raw.trim());
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(VerifyError::InvalidInput(format!(
                        "'{}' is not a verification code",
                        raw
                    )));
                }
                raw.parse::<VerificationCode>()
                    .map_err(|_| VerifyError::InvalidOrExpiredCode)
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserQuery {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidateResponse {
    pub registered: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingResponse {
    pub status: &'static str,
    pub kind: RequestKind,
    /// RFC 3339 expiry of the issued code
    pub expires_at: String,
}

impl From<SubmissionReceipt> for PendingResponse {
    fn from(receipt: SubmissionReceipt) -> Self {
        PendingResponse {
            status: "pending",
            kind: receipt.kind,
            expires_at: rfc3339(receipt.expires_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IdentityResponse {
    #[serde(rename = "pub")]
    pub public_key: String,
    pub alias: String,
    pub email: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl From<Identity> for IdentityResponse {
    fn from(identity: Identity) -> Self {
        IdentityResponse {
            public_key: identity.public_key,
            alias: identity.alias,
            email: identity.email,
            created_at: rfc3339(identity.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateResponse {
    #[serde(rename = "pub")]
    pub public_key: String,
    #[serde(rename = "isAlias")]
    pub is_alias: bool,
    pub value: String,
}

impl From<AppliedUpdate> for UpdateResponse {
    fn from(applied: AppliedUpdate) -> Self {
        UpdateResponse {
            public_key: applied.public_key,
            is_alias: applied.field.is_alias(),
            value: applied.value,
        }
    }
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub kind: String,
}

impl ApiError {
    pub fn new(kind: &str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            kind: kind.to_string(),
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new("bad_request", error)
    }
}

fn rfc3339(unix_ms: u64) -> String {
    Utc.timestamp_millis_opt(unix_ms as i64)
        .single()
        .map(|t| t.to_rfc3339())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_dto_maps_flag() {
        let dto: UpdateDto =
            serde_json::from_str(r#"{"pub":"abc","isAlias":true,"value":"nova2"}"#).unwrap();
        let request = UpdateRequest::from(dto);
        assert_eq!(request.field, IdentityField::Alias);
        assert_eq!(request.public_key, "abc");
    }

    fn redeem(body: &str) -> Result<VerificationCode, VerifyError> {
        serde_json::from_str::<RedeemDto>(body)
            .unwrap()
            .verification_code()
    }

    #[test]
    fn test_redeem_accepts_number_and_string() {
        let a = redeem(r#"{"code":482}"#).unwrap();
        let b = redeem(r#"{"code":"0482"}"#).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "0482");
    }

    #[test]
    fn test_out_of_range_code_reads_as_unissued() {
        for body in [
            r#"{"code":12345}"#,
            r#"{"code":-1}"#,
            r#"{"code":"12345"}"#,
            r#"{"code":"-7"}"#,
        ] {
            assert!(
                matches!(redeem(body), Err(VerifyError::InvalidOrExpiredCode)),
                "{}",
                body
            );
        }
    }

    #[test]
    fn test_non_numeric_code_is_invalid_input() {
        for body in [r#"{"code":"abcd"}"#, r#"{"code":"12ab"}"#, r#"{"code":""}"#] {
            assert!(
                matches!(redeem(body), Err(VerifyError::InvalidInput(_))),
                "{}",
                body
            );
        }
    }

    #[test]
    fn test_pending_response_formats_expiry() {
        let response = PendingResponse::from(SubmissionReceipt {
            kind: RequestKind::Registration,
            expires_at: 0,
        });
        assert_eq!(response.expires_at, "1970-01-01T00:00:00+00:00");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["kind"], "registration");
    }
}
