use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use stockroom_core::{CategoryId, Page};
use stockroom_infra::services::{CategoryView, ProductView};
use stockroom_products::CategoryDraft;

use crate::app::dto::PageParams;
use crate::app::errors::ApiError;
use crate::app::extract::{ApiJson, ApiPath, ApiQuery};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_category).get(list_categories))
        .route(
            "/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route("/:id/products", get(category_products))
}

pub async fn create_category(
    Extension(app): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<CategoryDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let created = app.services.categories.create(body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_categories(
    Extension(app): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<CategoryView>>, ApiError> {
    Ok(Json(app.services.categories.list().await?))
}

pub async fn get_category(
    Extension(app): Extension<Arc<AppServices>>,
    ApiPath(id): ApiPath<CategoryId>,
) -> Result<Json<CategoryView>, ApiError> {
    Ok(Json(app.services.categories.get(id).await?))
}

pub async fn update_category(
    Extension(app): Extension<Arc<AppServices>>,
    ApiPath(id): ApiPath<CategoryId>,
    ApiJson(body): ApiJson<CategoryDraft>,
) -> Result<Json<CategoryView>, ApiError> {
    Ok(Json(app.services.categories.update(id, body).await?))
}

pub async fn delete_category(
    Extension(app): Extension<Arc<AppServices>>,
    ApiPath(id): ApiPath<CategoryId>,
) -> Result<StatusCode, ApiError> {
    app.services.categories.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn category_products(
    Extension(app): Extension<Arc<AppServices>>,
    ApiPath(id): ApiPath<CategoryId>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Json<Page<ProductView>>, ApiError> {
    let request = params.request(&app.page_limits)?;
    Ok(Json(
        app.services
            .products
            .list_by_category(id, request)
            .await?,
    ))
}
