use serde::Deserialize;

/// Body for `POST /products` and `PUT /products/:id`. Unknown fields such as
/// a client-side `id` are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i32>,
    pub image: Option<String>,
}
