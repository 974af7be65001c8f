//! `/api/v1/consent-purposes` handlers: batch create, get, list, update,
//! delete, and the validate-names lookup.

use std::collections::HashMap;

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use consent_core::entities::purpose::{Purpose, PurposeType};

use crate::middleware::error_handler::ApiResult;
use crate::middleware::headers::OrgId;
use crate::services::{NewPurpose, PurposeService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PurposeCreate {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub purpose_type: PurposeType,
    #[serde(default)]
    pub attributes: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct PurposeUpdate {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub purpose_type: PurposeType,
    #[serde(default)]
    pub attributes: HashMap<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct PurposeResponse {
    pub id: String,
    #[serde(rename = "orgId")]
    pub org_id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub purpose_type: PurposeType,
    pub attributes: HashMap<String, Value>,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Purpose> for PurposeResponse {
    fn from(p: Purpose) -> Self {
        Self {
            id: p.id.to_string(),
            org_id: p.org_id,
            name: p.name,
            description: p.description,
            purpose_type: p.purpose_type,
            attributes: p.attributes,
            created_at: p.created_time.as_datetime(),
            updated_at: p.updated_time.as_datetime(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateBatchResponse {
    pub data: Vec<PurposeResponse>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ListMetadata {
    pub total: u64,
    pub offset: u64,
    pub count: u64,
    pub limit: u64,
}

#[derive(Debug, Serialize)]
pub struct ListPurposesResponse {
    pub data: Vec<PurposeResponse>,
    pub metadata: ListMetadata,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub name: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// `POST /consent-purposes` - create a batch of purposes, all-or-nothing.
pub async fn create_purposes(
    data: web::Data<AppState>,
    org_id: OrgId,
    body: web::Json<Vec<PurposeCreate>>,
) -> ApiResult<HttpResponse> {
    let service = PurposeService::new(&data.store);
    let batch = body
        .into_inner()
        .into_iter()
        .map(|p| NewPurpose {
            name: p.name,
            description: p.description,
            purpose_type: p.purpose_type,
            attributes: p.attributes,
        })
        .collect();

    let created = service.create_batch(&org_id.0, batch).await?;

    Ok(HttpResponse::Created().json(CreateBatchResponse {
        data: created.into_iter().map(PurposeResponse::from).collect(),
        message: "purposes created".to_string(),
    }))
}

/// `GET /consent-purposes/{id}`
pub async fn get_purpose(
    data: web::Data<AppState>,
    org_id: OrgId,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let service = PurposeService::new(&data.store);
    let purpose = service.get(&org_id.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(PurposeResponse::from(purpose)))
}

/// `GET /consent-purposes`
pub async fn list_purposes(
    data: web::Data<AppState>,
    org_id: OrgId,
    query: web::Query<ListQuery>,
) -> ApiResult<HttpResponse> {
    let service = PurposeService::new(&data.store);
    let limit = query.limit.unwrap_or(100);
    let offset = query.offset.unwrap_or(0);
    let (items, total) = service
        .list(&org_id.0, query.name.as_deref(), limit, offset)
        .await?;

    let count = items.len() as u64;
    Ok(HttpResponse::Ok().json(ListPurposesResponse {
        data: items.into_iter().map(PurposeResponse::from).collect(),
        metadata: ListMetadata {
            total,
            offset,
            count,
            limit,
        },
    }))
}

/// `PUT /consent-purposes/{id}`
pub async fn update_purpose(
    data: web::Data<AppState>,
    org_id: OrgId,
    path: web::Path<Uuid>,
    body: web::Json<PurposeUpdate>,
) -> ApiResult<HttpResponse> {
    let service = PurposeService::new(&data.store);
    let body = body.into_inner();
    let purpose = service
        .update(
            &org_id.0,
            path.into_inner(),
            body.name,
            body.description,
            body.purpose_type,
            body.attributes,
        )
        .await?;
    Ok(HttpResponse::Ok().json(PurposeResponse::from(purpose)))
}

/// `DELETE /consent-purposes/{id}`
pub async fn delete_purpose(
    data: web::Data<AppState>,
    org_id: OrgId,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let service = PurposeService::new(&data.store);
    service.delete(&org_id.0, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// `POST /consent-purposes/validate`
pub async fn validate_purpose_names(
    data: web::Data<AppState>,
    org_id: OrgId,
    body: web::Json<Vec<String>>,
) -> ApiResult<HttpResponse> {
    let service = PurposeService::new(&data.store);
    let valid = service.validate_names(&org_id.0, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(valid))
}
