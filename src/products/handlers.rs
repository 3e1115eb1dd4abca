use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::ProductRequest,
    repo_types::{NewProduct, Product, ProductChanges},
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

fn check_amounts(price: Option<f64>, quantity: Option<i32>) -> AppResult<()> {
    if let Some(price) = price {
        if !price.is_finite() || price < 0.0 {
            return Err(AppError::Validation("price must be a non-negative number".into()));
        }
    }
    if matches!(quantity, Some(q) if q < 0) {
        return Err(AppError::Validation("quantity must be non-negative".into()));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[instrument(skip(state))]
pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(state.products.get_all().await?))
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Product>> {
    let Path(id) = path?;
    state
        .products
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product not found".into()))
}

#[instrument(skip(state, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<ProductRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let Json(payload) = payload?;
    let name = non_blank(payload.name)
        .ok_or_else(|| AppError::Validation("name is required".into()))?;
    check_amounts(payload.price, payload.quantity)?;

    let product = state
        .products
        .create(NewProduct {
            name: name.trim().to_string(),
            description: payload.description.unwrap_or_default(),
            price: payload.price.unwrap_or(0.0),
            quantity: payload.quantity.unwrap_or(0),
            image: non_blank(payload.image),
        })
        .await?;

    info!(product_id = product.id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

#[instrument(skip(state, payload))]
pub async fn update_product(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ProductRequest>, JsonRejection>,
) -> AppResult<Json<Product>> {
    let Path(id) = path?;
    let Json(payload) = payload?;

    if matches!(&payload.name, Some(n) if n.trim().is_empty()) {
        return Err(AppError::Validation("name must not be empty".into()));
    }
    check_amounts(payload.price, payload.quantity)?;

    let changes = ProductChanges {
        name: payload.name.map(|n| n.trim().to_string()),
        description: payload.description,
        price: payload.price,
        quantity: payload.quantity,
        image: non_blank(payload.image),
    };

    match state.products.update(id, changes).await? {
        Some(product) => {
            info!(product_id = id, "product updated");
            Ok(Json(product))
        }
        None => Err(AppError::NotFound("Product not found".into())),
    }
}

#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = path?;
    if state.products.delete(id).await? {
        info!(product_id = id, "product deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Product not found".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_must_be_non_negative() {
        assert!(check_amounts(Some(0.0), Some(0)).is_ok());
        assert!(check_amounts(None, None).is_ok());
        assert!(check_amounts(Some(-0.01), None).is_err());
        assert!(check_amounts(Some(f64::NAN), None).is_err());
        assert!(check_amounts(None, Some(-1)).is_err());
    }

    #[test]
    fn blank_image_means_unchanged() {
        assert_eq!(non_blank(Some("".into())), None);
        assert_eq!(non_blank(Some("/uploads/products/a.png".into())).as_deref(), Some("/uploads/products/a.png"));
    }
}
