//! Service catalog handlers.
//!
//! ```text
//! POST   /api/service            vendor publishes a listing
//! PUT    /api/service            {"id", ...sparse fields}
//! DELETE /api/service            {"serviceId"}
//! GET    /api/service            search: page, limit, q|query, category, minPrice, maxPrice, city
//!                                 (array body, `Link` header with self/next/prev)
//! GET    /api/services           legacy alias of the search route
//! GET    /api/service/account    caller's own listings
//! GET    /api/service/{id}       one listing with vendor contact
//! ```

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use pagination::{PageRequest, PageRequestError};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Error, PriceType, Service, ServiceCategory, ServiceDetail, ServiceDraft, ServiceId,
    ServiceListing, ServicePatch, ServiceSearch, ServiceValidationError, Title,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, ValidationCode, field_error, parse_amount, parse_id, parse_label,
    parse_optional_amount,
};

/// Listing fields supplied on creation.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceRequest {
    pub title: String,
    #[schema(example = "venue")]
    pub category: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    pub price: f64,
    #[schema(example = "per_head")]
    pub price_type: Option<String>,
    #[serde(default)]
    pub availability: Vec<String>,
    #[serde(default)]
    pub perks: Vec<String>,
}

/// Sparse listing update. `id` (or the older `serviceId`) selects the
/// listing; `id` wins when both are sent.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceRequest {
    pub id: Option<String>,
    pub service_id: Option<String>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub photos: Option<Vec<String>>,
    pub price: Option<f64>,
    pub price_type: Option<String>,
    pub availability: Option<Vec<String>>,
    pub perks: Option<Vec<String>>,
}

/// Delete body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteServiceRequest {
    pub service_id: String,
}

/// Search query parameters. Every filter is optional and they combine with AND.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// One-based page number; defaults to 1.
    pub page: Option<u32>,
    /// Page size; defaults to 8, at most 100.
    pub limit: Option<u32>,
    /// Case-insensitive fragment of the title or description.
    pub q: Option<String>,
    /// Older spelling of `q`; ignored when `q` is present.
    pub query: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Vendor city, matched case-insensitively.
    pub city: Option<String>,
}

fn map_service_validation_error(err: ServiceValidationError) -> Error {
    let field = match &err {
        ServiceValidationError::EmptyTitle | ServiceValidationError::TitleTooLong { .. } => {
            "title"
        }
        ServiceValidationError::UnknownCategory(_) => "category",
        ServiceValidationError::UnknownPriceType(_) => "priceType",
        ServiceValidationError::InvertedPriceRange => "minPrice",
    };
    field_error(FieldName::new(field), ValidationCode::InvalidValue, err)
}

fn map_page_error(err: PageRequestError) -> Error {
    let field = match err {
        PageRequestError::ZeroPage => "page",
        PageRequestError::ZeroLimit | PageRequestError::LimitTooLarge { .. } => "limit",
    };
    field_error(FieldName::new(field), ValidationCode::InvalidValue, err)
}

fn parse_title(raw: &str) -> Result<Title, Error> {
    Title::new(raw).map_err(map_service_validation_error)
}

impl CreateServiceRequest {
    fn into_draft(self) -> Result<ServiceDraft, Error> {
        let mut draft = ServiceDraft::new(
            parse_title(&self.title)?,
            parse_amount(self.price, FieldName::new("price"))?,
        );
        if let Some(category) =
            parse_label::<ServiceCategory>(self.category.as_deref(), FieldName::new("category"))?
        {
            draft.category = category;
        }
        if let Some(price_type) =
            parse_label::<PriceType>(self.price_type.as_deref(), FieldName::new("priceType"))?
        {
            draft.price_type = price_type;
        }
        draft.description = self.description.unwrap_or_default();
        draft.photos = self.photos;
        draft.availability = self.availability;
        draft.perks = self.perks;
        Ok(draft)
    }
}

impl UpdateServiceRequest {
    fn into_parts(self) -> Result<(ServiceId, ServicePatch), Error> {
        let raw_id = self.id.or(self.service_id).ok_or_else(|| {
            field_error(
                FieldName::new("id"),
                ValidationCode::MissingField,
                "listing id is required",
            )
        })?;
        let id = parse_id(&raw_id, FieldName::new("id"))?;
        let patch = ServicePatch {
            title: self.title.as_deref().map(parse_title).transpose()?,
            category: parse_label(self.category.as_deref(), FieldName::new("category"))?,
            description: self.description,
            photos: self.photos,
            price: parse_optional_amount(self.price, FieldName::new("price"))?,
            price_type: parse_label(self.price_type.as_deref(), FieldName::new("priceType"))?,
            availability: self.availability,
            perks: self.perks,
        };
        Ok((id, patch))
    }
}

impl SearchParams {
    fn into_parts(self) -> Result<(ServiceSearch, PageRequest), Error> {
        let page = PageRequest::from_optional(self.page, self.limit).map_err(map_page_error)?;
        let search = ServiceSearch::try_new(
            self.q.or(self.query),
            parse_label(self.category.as_deref(), FieldName::new("category"))?,
            parse_optional_amount(self.min_price, FieldName::new("minPrice"))?,
            parse_optional_amount(self.max_price, FieldName::new("maxPrice"))?,
            self.city,
        )
        .map_err(map_service_validation_error)?;
        Ok((search, page))
    }
}

fn request_url(req: &HttpRequest) -> Result<Url, Error> {
    let info = req.connection_info();
    let raw = format!("{}://{}{}", info.scheme(), info.host(), req.uri());
    Url::parse(&raw).map_err(|err| Error::internal(format!("request url unparsable: {err}")))
}

/// Publish a listing owned by the calling vendor.
#[utoipa::path(
    post,
    path = "/api/service",
    request_body = CreateServiceRequest,
    responses(
        (status = 201, description = "Listing created", body = Service),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Caller is not a vendor", body = Error)
    ),
    tags = ["services"],
    operation_id = "createService"
)]
#[post("/service")]
pub async fn create_service(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateServiceRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.clock.utc())?;
    let draft = payload.into_inner().into_draft()?;
    let service = state.catalog.create_service(&actor, draft).await?;
    Ok(HttpResponse::Created().json(service))
}

/// Sparse-update a listing. Owner or admin only.
#[utoipa::path(
    put,
    path = "/api/service",
    request_body = UpdateServiceRequest,
    responses(
        (status = 200, description = "Updated listing", body = Service),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Not the owner", body = Error),
        (status = 404, description = "Unknown listing", body = Error)
    ),
    tags = ["services"],
    operation_id = "updateService"
)]
#[put("/service")]
pub async fn update_service(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UpdateServiceRequest>,
) -> ApiResult<web::Json<Service>> {
    let actor = session.require_actor(state.clock.utc())?;
    let (id, patch) = payload.into_inner().into_parts()?;
    let service = state.catalog.update_service(&actor, &id, patch).await?;
    Ok(web::Json(service))
}

/// Delete a listing. Owner or admin only.
#[utoipa::path(
    delete,
    path = "/api/service",
    request_body = DeleteServiceRequest,
    responses(
        (status = 200, description = "Listing deleted", body = String),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Not the owner", body = Error),
        (status = 404, description = "Unknown listing", body = Error)
    ),
    tags = ["services"],
    operation_id = "deleteService"
)]
#[delete("/service")]
pub async fn delete_service(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<DeleteServiceRequest>,
) -> ApiResult<web::Json<&'static str>> {
    let actor = session.require_actor(state.clock.utc())?;
    let id: ServiceId = parse_id(&payload.service_id, FieldName::new("serviceId"))?;
    state.catalog.delete_service(&actor, &id).await?;
    Ok(web::Json("Service deleted"))
}

/// Listings owned by the caller, newest first.
#[utoipa::path(
    get,
    path = "/api/service/account",
    responses(
        (status = 200, description = "Caller's listings", body = [Service]),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["services"],
    operation_id = "listOwnServices"
)]
#[get("/service/account")]
pub async fn list_own_services(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Service>>> {
    let identity = session.require_identity(state.clock.utc())?;
    let services = state
        .catalog_query
        .list_by_vendor(&identity.user_id)
        .await?;
    Ok(web::Json(services))
}

/// One listing with its vendor's contact details.
#[utoipa::path(
    get,
    path = "/api/service/{id}",
    params(("id" = String, Path, description = "Service identifier")),
    responses(
        (status = 200, description = "Listing", body = ServiceDetail),
        (status = 400, description = "Malformed identifier", body = Error),
        (status = 404, description = "Unknown listing", body = Error)
    ),
    tags = ["services"],
    operation_id = "getService",
    security([])
)]
#[get("/service/{id}")]
pub async fn get_service(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ServiceDetail>> {
    let id: ServiceId = parse_id(&path, FieldName::new("id"))?;
    let detail = state.catalog_query.get_service(&id).await?;
    Ok(web::Json(detail))
}

async fn run_search(
    state: &HttpState,
    req: &HttpRequest,
    params: SearchParams,
) -> ApiResult<HttpResponse> {
    let (search, page) = params.into_parts()?;
    debug!(?search, page = page.page(), limit = page.limit(), "catalog search");
    let base = request_url(req)?;
    let (listings, links) = state
        .catalog_query
        .search(&search, page)
        .await?
        .with_links(&base)
        .into_parts();
    let mut response = HttpResponse::Ok();
    if let Some(links) = links {
        response.insert_header((header::LINK, links.to_link_header()));
    }
    Ok(response.json(listings))
}

/// Public catalog search.
#[utoipa::path(
    get,
    path = "/api/service",
    params(SearchParams),
    responses(
        (
            status = 200,
            description = "One page of listings",
            body = [ServiceListing],
            headers(("Link" = String, description = "RFC 8288 self, next and prev page links"))
        ),
        (status = 400, description = "Invalid filter", body = Error)
    ),
    tags = ["services"],
    operation_id = "searchServices",
    security([])
)]
#[get("/service")]
pub async fn search_services(
    state: web::Data<HttpState>,
    req: HttpRequest,
    params: web::Query<SearchParams>,
) -> ApiResult<HttpResponse> {
    run_search(&state, &req, params.into_inner()).await
}

/// Search under the plural path kept for older clients.
pub async fn search_services_legacy(
    state: web::Data<HttpState>,
    req: HttpRequest,
    params: web::Query<SearchParams>,
) -> ApiResult<HttpResponse> {
    run_search(&state, &req, params.into_inner()).await
}

#[cfg(test)]
#[path = "services_tests.rs"]
mod tests;
