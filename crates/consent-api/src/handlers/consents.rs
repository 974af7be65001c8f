//! `/api/v1/consents` handlers: create, get, list, update, revoke.
//!
//! Wire timestamps are epoch-millis per §3.2/§3.4; domain `Timestamp`s are
//! RFC3339 internally, so every boundary here goes through
//! [`consent_core::entities::common::Timestamp::from_epoch_millis`] /
//! `to_epoch_millis`.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use consent_core::entities::authorization::{Authorization, AuthorizationStatus};
use consent_core::entities::common::Timestamp;
use consent_core::entities::consent::ConsentStatus;
use consent_core::entities::purpose_link::ConsentPurposeLink;
use consent_core::errors::CoreError;

use crate::middleware::error_handler::ApiResult;
use crate::middleware::headers::{ClientId, OrgId};
use crate::services::{ConsentListFilter, ConsentService, ConsentView, NewAuthorization, NewPurposeLink};
use crate::state::AppState;

/// Split a comma-separated multi-valued filter parameter into its OR-within
/// members, dropping empty segments (e.g. a trailing comma or `""`).
fn split_csv(value: &Option<String>) -> Vec<String> {
    value
        .as_deref()
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_consent_status(s: &str) -> ApiResult<ConsentStatus> {
    match s {
        "CREATED" => Ok(ConsentStatus::Created),
        "ACTIVE" => Ok(ConsentStatus::Active),
        "REJECTED" => Ok(ConsentStatus::Rejected),
        "REVOKED" => Ok(ConsentStatus::Revoked),
        "EXPIRED" => Ok(ConsentStatus::Expired),
        other => Err(CoreError::bad_request(format!("unrecognized consentStatus '{other}'")).into()),
    }
}

/// A consent with no `validityTime` is modeled as expiring far in the
/// future rather than as a nullable field, since [`Timestamp`] always
/// carries a concrete instant.
const NO_EXPIRY_YEARS_FROM_NOW_MILLIS: i64 = 100 * 365 * 24 * 60 * 60 * 1000;

#[derive(Debug, Deserialize)]
pub struct PurposeLinkRequest {
    #[serde(rename = "purposeId")]
    pub purpose_id: Uuid,
    #[serde(default = "default_mandatory")]
    pub mandatory: bool,
    #[serde(default)]
    pub approved: bool,
}

fn default_mandatory() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct AuthorizationRequest {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "type")]
    pub auth_type: String,
    pub status: AuthorizationStatus,
}

#[derive(Debug, Deserialize)]
pub struct ConsentCreateRequest {
    #[serde(rename = "type")]
    pub consent_type: String,
    #[serde(rename = "subjectId")]
    pub subject_id: String,
    #[serde(rename = "validityTime")]
    pub validity_time: Option<i64>,
    #[serde(rename = "consentPurpose", default)]
    pub consent_purpose: Vec<PurposeLinkRequest>,
    #[serde(default)]
    pub authorizations: Vec<AuthorizationRequest>,
}

/// `PUT /consents/{id}` body (§4.3.1 Update). Each section is full-replace
/// when present; a key absent from the JSON body (not just `null`) leaves
/// that section untouched, which is why these are `Option<Vec<_>>` with
/// `#[serde(default)]` rather than plain `Vec<_>`.
#[derive(Debug, Deserialize)]
pub struct ConsentUpdateRequest {
    #[serde(rename = "validityTime", default)]
    pub validity_time: Option<i64>,
    #[serde(rename = "consentPurpose", default)]
    pub consent_purpose: Option<Vec<PurposeLinkRequest>>,
    #[serde(default)]
    pub authorizations: Option<Vec<AuthorizationRequest>>,
}

#[derive(Debug, Serialize)]
pub struct PurposeLinkResponse {
    #[serde(rename = "purposeId")]
    pub purpose_id: String,
    pub mandatory: bool,
    pub approved: bool,
}

impl From<ConsentPurposeLink> for PurposeLinkResponse {
    fn from(link: ConsentPurposeLink) -> Self {
        Self {
            purpose_id: link.purpose_id.to_string(),
            mandatory: link.mandatory,
            approved: link.approved,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthorizationResponse {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "type")]
    pub auth_type: String,
    pub status: AuthorizationStatus,
    #[serde(rename = "updatedTime")]
    pub updated_time: i64,
}

impl From<Authorization> for AuthorizationResponse {
    fn from(auth: Authorization) -> Self {
        Self {
            id: auth.id.to_string(),
            user_id: auth.user_id,
            auth_type: auth.auth_type,
            status: auth.status,
            updated_time: auth.updated_time.to_epoch_millis(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConsentResponse {
    pub id: String,
    #[serde(rename = "orgId")]
    pub org_id: String,
    #[serde(rename = "clientId")]
    pub client_id: String,
    #[serde(rename = "subjectId")]
    pub subject_id: String,
    #[serde(rename = "type")]
    pub consent_type: String,
    pub status: ConsentStatus,
    #[serde(rename = "validityTime")]
    pub validity_time: i64,
    #[serde(rename = "consentPurpose")]
    pub consent_purpose: Vec<PurposeLinkResponse>,
    pub authorizations: Vec<AuthorizationResponse>,
    #[serde(rename = "createdTime")]
    pub created_time: i64,
    #[serde(rename = "updatedTime")]
    pub updated_time: i64,
    /// Opaque passthrough with no documented purpose upstream; always
    /// absent here. See `consentInformation` in the validate response,
    /// which omits it entirely.
    #[serde(rename = "modifiedResponse", skip_serializing_if = "Option::is_none")]
    pub modified_response: Option<serde_json::Value>,
}

impl From<ConsentView> for ConsentResponse {
    fn from(view: ConsentView) -> Self {
        Self {
            id: view.consent.id.to_string(),
            org_id: view.consent.org_id,
            client_id: view.consent.client_id,
            subject_id: view.consent.subject_id,
            consent_type: view.consent.consent_type,
            status: view.status,
            validity_time: view.consent.validity_time.to_epoch_millis(),
            consent_purpose: view.purpose_links.into_iter().map(PurposeLinkResponse::from).collect(),
            authorizations: view.authorizations.into_iter().map(AuthorizationResponse::from).collect(),
            created_time: view.consent.created_time.to_epoch_millis(),
            updated_time: view.consent.updated_time.to_epoch_millis(),
            modified_response: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListMeta {
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

#[derive(Debug, Serialize)]
pub struct ListConsentsResponse {
    pub data: Vec<ConsentResponse>,
    pub meta: ListMeta,
}

/// `GET /consents` query string (§4.3.1 List consents). Multi-valued
/// filters are comma-separated; every field is optional and AND-combined.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    #[serde(rename = "consentTypes")]
    pub consent_types: Option<String>,
    #[serde(rename = "consentStatuses")]
    pub consent_statuses: Option<String>,
    #[serde(rename = "clientIds")]
    pub client_ids: Option<String>,
    #[serde(rename = "userIds")]
    pub user_ids: Option<String>,
    #[serde(rename = "fromTime")]
    pub from_time: Option<i64>,
    #[serde(rename = "toTime")]
    pub to_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RevokeRequest {
    #[allow(dead_code)]
    pub reason: Option<String>,
    #[allow(dead_code)]
    #[serde(rename = "actionBy")]
    pub action_by: Option<String>,
}

/// `POST /consents`
pub async fn create_consent(
    data: web::Data<AppState>,
    org_id: OrgId,
    client_id: ClientId,
    body: web::Json<ConsentCreateRequest>,
) -> ApiResult<HttpResponse> {
    let service = ConsentService::new(&data.store);
    let body = body.into_inner();

    let validity_time = match body.validity_time {
        Some(millis) => Timestamp::from_epoch_millis(millis)
            .ok_or_else(|| CoreError::bad_request("validityTime is not a valid epoch-millis timestamp"))?,
        None => Timestamp::from_epoch_millis(
            Timestamp::now().to_epoch_millis() + NO_EXPIRY_YEARS_FROM_NOW_MILLIS,
        )
        .ok_or_else(|| CoreError::internal("failed to compute default validityTime"))?,
    };

    let links = body
        .consent_purpose
        .into_iter()
        .map(|l| NewPurposeLink {
            purpose_id: l.purpose_id,
            mandatory: l.mandatory,
            approved: l.approved,
        })
        .collect();

    let authorizations = body
        .authorizations
        .into_iter()
        .map(|a| NewAuthorization {
            user_id: a.user_id,
            auth_type: a.auth_type,
            status: a.status,
        })
        .collect();

    let view = service
        .create(
            &org_id.0,
            &client_id.0,
            &body.subject_id,
            &body.consent_type,
            validity_time,
            links,
            authorizations,
        )
        .await?;

    Ok(HttpResponse::Created().json(ConsentResponse::from(view)))
}

/// `GET /consents/{id}`
pub async fn get_consent(data: web::Data<AppState>, org_id: OrgId, path: web::Path<Uuid>) -> ApiResult<HttpResponse> {
    let service = ConsentService::new(&data.store);
    let view = service.get(&org_id.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ConsentResponse::from(view)))
}

/// `GET /consents`
pub async fn list_consents(
    data: web::Data<AppState>,
    org_id: OrgId,
    query: web::Query<ListQuery>,
) -> ApiResult<HttpResponse> {
    let service = ConsentService::new(&data.store);
    let limit = query.limit.unwrap_or(10);
    let offset = query.offset.unwrap_or(0);

    let consent_statuses = split_csv(&query.consent_statuses)
        .iter()
        .map(|s| parse_consent_status(s))
        .collect::<ApiResult<Vec<_>>>()?;

    let from_time = query
        .from_time
        .map(|millis| {
            Timestamp::from_epoch_millis(millis).ok_or_else(|| CoreError::bad_request("fromTime is not a valid epoch-millis timestamp"))
        })
        .transpose()?;
    let to_time = query
        .to_time
        .map(|millis| {
            Timestamp::from_epoch_millis(millis).ok_or_else(|| CoreError::bad_request("toTime is not a valid epoch-millis timestamp"))
        })
        .transpose()?;

    let filter = ConsentListFilter {
        consent_types: split_csv(&query.consent_types),
        consent_statuses,
        client_ids: split_csv(&query.client_ids),
        user_ids: split_csv(&query.user_ids),
        from_time,
        to_time,
    };

    let (views, total) = service.list(&org_id.0, &filter, limit, offset).await?;

    Ok(HttpResponse::Ok().json(ListConsentsResponse {
        data: views.into_iter().map(ConsentResponse::from).collect(),
        meta: ListMeta { total, offset, limit },
    }))
}

/// `PUT /consents/{id}`
pub async fn update_consent(
    data: web::Data<AppState>,
    org_id: OrgId,
    path: web::Path<Uuid>,
    body: web::Json<ConsentUpdateRequest>,
) -> ApiResult<HttpResponse> {
    let service = ConsentService::new(&data.store);
    let body = body.into_inner();

    let validity_time = body
        .validity_time
        .map(|millis| {
            Timestamp::from_epoch_millis(millis)
                .ok_or_else(|| CoreError::bad_request("validityTime is not a valid epoch-millis timestamp"))
        })
        .transpose()?;

    let links = body.consent_purpose.map(|links| {
        links
            .into_iter()
            .map(|l| NewPurposeLink {
                purpose_id: l.purpose_id,
                mandatory: l.mandatory,
                approved: l.approved,
            })
            .collect()
    });

    let authorizations = body.authorizations.map(|auths| {
        auths
            .into_iter()
            .map(|a| NewAuthorization {
                user_id: a.user_id,
                auth_type: a.auth_type,
                status: a.status,
            })
            .collect()
    });

    let view = service
        .update(&org_id.0, path.into_inner(), validity_time, links, authorizations)
        .await?;

    Ok(HttpResponse::Ok().json(ConsentResponse::from(view)))
}

/// `PUT /consents/{id}/revoke`
pub async fn revoke_consent(
    data: web::Data<AppState>,
    org_id: OrgId,
    path: web::Path<Uuid>,
    _body: web::Json<RevokeRequest>,
) -> ApiResult<HttpResponse> {
    let service = ConsentService::new(&data.store);
    let view = service.revoke(&org_id.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ConsentResponse::from(view)))
}
