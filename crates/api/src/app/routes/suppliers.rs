use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};

use stockroom_core::{Page, SupplierId};
use stockroom_infra::services::{ProductView, SupplierView};
use stockroom_suppliers::SupplierDraft;

use crate::app::dto::{NameQuery, PageParams, SupplierSearchParams};
use crate::app::errors::ApiError;
use crate::app::extract::{ApiJson, ApiPath, ApiQuery};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_supplier).get(list_suppliers))
        .route("/search", get(search_suppliers))
        .route("/active", get(active_suppliers))
        .route("/inactive", get(inactive_suppliers))
        .route("/dropdown", get(dropdown))
        .route("/exists", get(exists_by_name))
        .route(
            "/:id",
            get(get_supplier).put(update_supplier).delete(delete_supplier),
        )
        .route("/:id/activate", put(activate_supplier))
        .route("/:id/deactivate", put(deactivate_supplier))
        .route("/:id/with-products", get(get_supplier_with_products))
        .route("/:id/products", get(supplier_products))
}

pub async fn create_supplier(
    Extension(app): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<SupplierDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let created = app.services.suppliers.create(body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_supplier(
    Extension(app): Extension<Arc<AppServices>>,
    ApiPath(id): ApiPath<SupplierId>,
) -> Result<Json<SupplierView>, ApiError> {
    Ok(Json(app.services.suppliers.get(id).await?))
}

pub async fn get_supplier_with_products(
    Extension(app): Extension<Arc<AppServices>>,
    ApiPath(id): ApiPath<SupplierId>,
) -> Result<Json<SupplierView>, ApiError> {
    Ok(Json(app.services.suppliers.get_with_products(id).await?))
}

pub async fn list_suppliers(
    Extension(app): Extension<Arc<AppServices>>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Json<Page<SupplierView>>, ApiError> {
    let request = params.request(&app.page_limits)?;
    Ok(Json(app.services.suppliers.list(request).await?))
}

pub async fn update_supplier(
    Extension(app): Extension<Arc<AppServices>>,
    ApiPath(id): ApiPath<SupplierId>,
    ApiJson(body): ApiJson<SupplierDraft>,
) -> Result<Json<SupplierView>, ApiError> {
    Ok(Json(app.services.suppliers.update(id, body).await?))
}

pub async fn delete_supplier(
    Extension(app): Extension<Arc<AppServices>>,
    ApiPath(id): ApiPath<SupplierId>,
) -> Result<StatusCode, ApiError> {
    app.services.suppliers.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn search_suppliers(
    Extension(app): Extension<Arc<AppServices>>,
    ApiQuery(params): ApiQuery<SupplierSearchParams>,
) -> Result<Json<Page<SupplierView>>, ApiError> {
    let request = params.paging().request(&app.page_limits)?;
    Ok(Json(
        app.services
            .suppliers
            .search(params.criteria(), request)
            .await?,
    ))
}

pub async fn active_suppliers(
    Extension(app): Extension<Arc<AppServices>>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Json<Page<SupplierView>>, ApiError> {
    let request = params.request(&app.page_limits)?;
    Ok(Json(app.services.suppliers.list_active(request).await?))
}

pub async fn inactive_suppliers(
    Extension(app): Extension<Arc<AppServices>>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Json<Page<SupplierView>>, ApiError> {
    let request = params.request(&app.page_limits)?;
    Ok(Json(app.services.suppliers.list_inactive(request).await?))
}

pub async fn dropdown(
    Extension(app): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<SupplierView>>, ApiError> {
    Ok(Json(app.services.suppliers.dropdown().await?))
}

pub async fn activate_supplier(
    Extension(app): Extension<Arc<AppServices>>,
    ApiPath(id): ApiPath<SupplierId>,
) -> Result<Json<SupplierView>, ApiError> {
    Ok(Json(app.services.suppliers.activate(id).await?))
}

pub async fn deactivate_supplier(
    Extension(app): Extension<Arc<AppServices>>,
    ApiPath(id): ApiPath<SupplierId>,
) -> Result<Json<SupplierView>, ApiError> {
    Ok(Json(app.services.suppliers.deactivate(id).await?))
}

pub async fn exists_by_name(
    Extension(app): Extension<Arc<AppServices>>,
    ApiQuery(query): ApiQuery<NameQuery>,
) -> Result<Json<bool>, ApiError> {
    Ok(Json(app.services.suppliers.exists_by_name(&query.name).await?))
}

pub async fn supplier_products(
    Extension(app): Extension<Arc<AppServices>>,
    ApiPath(id): ApiPath<SupplierId>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Json<Page<ProductView>>, ApiError> {
    let request = params.request(&app.page_limits)?;
    Ok(Json(
        app.services
            .products
            .list_by_supplier(id, request)
            .await?,
    ))
}
