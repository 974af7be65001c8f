//! `POST /consents/validate`: the validation engine endpoint.
//!
//! Always answers HTTP 200 with a body-level verdict — the only exception
//! is a missing `consentId`, which is a genuine 400.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::handlers::consents::ConsentResponse;
use crate::middleware::error_handler::ApiResult;
use crate::middleware::headers::OrgId;
use crate::services::{ValidationRequest, ValidationService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ConsentValidateRequest {
    #[serde(rename = "consentId")]
    pub consent_id: String,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "clientId")]
    pub client_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    #[serde(rename = "isValid")]
    pub is_valid: bool,
    #[serde(rename = "errorCode", skip_serializing_if = "Option::is_none")]
    pub error_code: Option<u16>,
    #[serde(rename = "errorMessage", skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(rename = "errorDescription", skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
    #[serde(rename = "consentInformation", skip_serializing_if = "Option::is_none")]
    pub consent_information: Option<ConsentResponse>,
}

/// `POST /consents/validate`
pub async fn validate_consent(
    data: web::Data<AppState>,
    org_id: OrgId,
    body: web::Json<ConsentValidateRequest>,
) -> ApiResult<HttpResponse> {
    let service = ValidationService::new(&data.store);
    let body = body.into_inner();

    let verdict = service
        .validate(
            &org_id.0,
            ValidationRequest {
                consent_id: body.consent_id,
                client_id: body.client_id,
                user_id: body.user_id,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(ValidateResponse {
        is_valid: verdict.is_valid,
        error_code: verdict.error_code,
        error_message: verdict.error_message,
        error_description: verdict.error_description,
        consent_information: verdict.consent_information.map(ConsentResponse::from),
    }))
}
