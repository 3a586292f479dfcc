use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};

use stockroom_core::{Page, ProductId};
use stockroom_infra::services::ProductView;
use stockroom_products::ProductDraft;

use crate::app::dto::{
    CategoryAssignment, InventoryUpdateRequest, PageParams, ProductSearchParams,
    SupplierAssignment,
};
use crate::app::errors::ApiError;
use crate::app::extract::{ApiJson, ApiPath, ApiQuery};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route("/search", get(search_products))
        .route("/low-stock", get(low_stock_products))
        .route("/sku/:sku", get(get_product_by_sku))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/:id/inventory", get(get_inventory).put(set_inventory))
        .route("/:id/inventory/increase", post(increase_inventory))
        .route("/:id/inventory/decrease", post(decrease_inventory))
        .route("/:id/category", put(assign_category))
        .route("/:id/supplier", put(assign_supplier))
}

pub async fn create_product(
    Extension(app): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<ProductDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let created = app.services.products.create(body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_product(
    Extension(app): Extension<Arc<AppServices>>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<ProductView>, ApiError> {
    Ok(Json(app.services.products.get(id).await?))
}

pub async fn get_product_by_sku(
    Extension(app): Extension<Arc<AppServices>>,
    ApiPath(sku): ApiPath<String>,
) -> Result<Json<ProductView>, ApiError> {
    Ok(Json(app.services.products.get_by_sku(&sku).await?))
}

pub async fn list_products(
    Extension(app): Extension<Arc<AppServices>>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Json<Page<ProductView>>, ApiError> {
    let request = params.request(&app.page_limits)?;
    Ok(Json(app.services.products.list(request).await?))
}

pub async fn update_product(
    Extension(app): Extension<Arc<AppServices>>,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(body): ApiJson<ProductDraft>,
) -> Result<Json<ProductView>, ApiError> {
    Ok(Json(app.services.products.update(id, body).await?))
}

pub async fn delete_product(
    Extension(app): Extension<Arc<AppServices>>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<StatusCode, ApiError> {
    app.services.products.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn search_products(
    Extension(app): Extension<Arc<AppServices>>,
    ApiQuery(params): ApiQuery<ProductSearchParams>,
) -> Result<Json<Page<ProductView>>, ApiError> {
    let request = params.paging().request(&app.page_limits)?;
    Ok(Json(
        app.services
            .products
            .search(params.criteria(), request)
            .await?,
    ))
}

pub async fn low_stock_products(
    Extension(app): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<ProductView>>, ApiError> {
    Ok(Json(app.services.products.list_low_stock().await?))
}

pub async fn get_inventory(
    Extension(app): Extension<Arc<AppServices>>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<i64>, ApiError> {
    Ok(Json(app.services.products.get_quantity(id).await?))
}

pub async fn set_inventory(
    Extension(app): Extension<Arc<AppServices>>,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(body): ApiJson<InventoryUpdateRequest>,
) -> Result<Json<ProductView>, ApiError> {
    let quantity = body.quantity()?;
    Ok(Json(app.services.products.set_quantity(id, quantity).await?))
}

pub async fn increase_inventory(
    Extension(app): Extension<Arc<AppServices>>,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(body): ApiJson<InventoryUpdateRequest>,
) -> Result<Json<ProductView>, ApiError> {
    let quantity = body.quantity()?;
    Ok(Json(app.services.products.increase(id, quantity).await?))
}

pub async fn decrease_inventory(
    Extension(app): Extension<Arc<AppServices>>,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(body): ApiJson<InventoryUpdateRequest>,
) -> Result<Json<ProductView>, ApiError> {
    let quantity = body.quantity()?;
    Ok(Json(app.services.products.decrease(id, quantity).await?))
}

pub async fn assign_category(
    Extension(app): Extension<Arc<AppServices>>,
    ApiPath(id): ApiPath<ProductId>,
    ApiQuery(query): ApiQuery<CategoryAssignment>,
) -> Result<Json<ProductView>, ApiError> {
    Ok(Json(
        app.services
            .products
            .assign_category(id, query.category_id)
            .await?,
    ))
}

pub async fn assign_supplier(
    Extension(app): Extension<Arc<AppServices>>,
    ApiPath(id): ApiPath<ProductId>,
    ApiQuery(query): ApiQuery<SupplierAssignment>,
) -> Result<Json<ProductView>, ApiError> {
    Ok(Json(
        app.services
            .products
            .assign_supplier(id, query.supplier_id)
            .await?,
    ))
}
