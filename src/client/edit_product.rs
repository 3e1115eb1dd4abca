use tracing::warn;

use super::{ClientError, ProductDraft, ProductsContext};
use crate::{products::Product, uploads::UploadKind};

/// A file picked in the form, not yet uploaded.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// State of the product edit dialog. `submit` consumes the form: the dialog
/// closes whether or not the update succeeded.
#[derive(Debug, Clone)]
pub struct EditProductForm {
    product_id: i64,
    draft: ProductDraft,
    image: Option<ImageFile>,
}

impl EditProductForm {
    /// Seeds from `existing` when given, otherwise blank defaults.
    pub fn seeded(product_id: i64, existing: Option<&Product>) -> Self {
        Self {
            product_id,
            draft: existing.map(ProductDraft::from).unwrap_or_default(),
            image: None,
        }
    }

    pub async fn open(ctx: &ProductsContext, product_id: i64) -> Self {
        let existing = match ctx.find(product_id).await {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, product_id, "could not load products for edit form");
                None
            }
        };
        Self::seeded(product_id, existing.as_ref())
    }

    /// Re-seeds the draft when the cached product changed while the form was open.
    pub async fn resync(&mut self, ctx: &ProductsContext) {
        if let Some(p) = ctx.cached(self.product_id).await {
            self.draft = ProductDraft::from(&p);
        }
    }

    pub fn product_id(&self) -> i64 {
        self.product_id
    }

    pub fn draft(&self) -> &ProductDraft {
        &self.draft
    }

    pub fn pending_image(&self) -> Option<&ImageFile> {
        self.image.as_ref()
    }

    /// Existing image path, shown while no new file has been picked.
    pub fn current_image(&self) -> Option<&str> {
        match self.image {
            Some(_) => None,
            None => self.draft.image.as_deref(),
        }
    }

    pub fn set_field(&mut self, name: &str, value: &str) -> Result<(), ClientError> {
        let invalid = |reason: &str| ClientError::InvalidField {
            field: name.to_string(),
            reason: reason.to_string(),
        };
        match name {
            "name" => self.draft.name = value.to_string(),
            "description" => self.draft.description = value.to_string(),
            "price" => {
                let price: f64 = value.trim().parse().map_err(|_| invalid("not a number"))?;
                if !price.is_finite() || price < 0.0 {
                    return Err(invalid("must be a non-negative number"));
                }
                self.draft.price = price;
            }
            "quantity" => {
                let quantity: i32 = value
                    .trim()
                    .parse()
                    .map_err(|_| invalid("not a whole number"))?;
                if quantity < 0 {
                    return Err(invalid("must be non-negative"));
                }
                self.draft.quantity = quantity;
            }
            _ => return Err(invalid("unknown field")),
        }
        Ok(())
    }

    /// Only the first picked file is kept; returns `false` if one was already chosen.
    pub fn choose_image(&mut self, file: ImageFile) -> bool {
        if self.image.is_some() {
            return false;
        }
        self.image = Some(file);
        true
    }

    /// Uploads the picked image (if any), then sends the full product payload.
    pub async fn submit(self, ctx: &ProductsContext) -> Result<Product, ClientError> {
        let Self {
            product_id,
            mut draft,
            image,
        } = self;

        if let Some(file) = image {
            match ctx.api().upload_image(UploadKind::Products, &file).await {
                Ok(path) => draft.image = Some(path),
                Err(e) => {
                    warn!(error = %e, product_id, "image upload failed");
                    return Err(e);
                }
            }
        }

        ctx.update(product_id, &draft).await.map_err(|e| {
            warn!(error = %e, product_id, "product update failed");
            e
        })
    }
}
