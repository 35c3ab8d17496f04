//! Product create/edit form.

use backoffice_core::{Price, ProductId, Tags};
use serde::Deserialize;

use super::{FieldError, FieldErrors, FieldView, InputKind, required};
use crate::backend::{Product, ProductPayload};

/// Editable fields of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProductField {
    Name,
    Description,
    Price,
    Category,
    Tags,
    InStock,
}

/// Raw form body as posted by the browser.
///
/// An unchecked checkbox is absent from the body, so `in_stock` is only
/// `Some` when ticked.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub tags: String,
    pub in_stock: Option<String>,
}

/// A validated product form, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductSubmission {
    Create(ProductPayload),
    Update(ProductId, ProductPayload),
}

/// Draft state of the product modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductForm {
    target: Option<ProductId>,
    name: String,
    description: String,
    price: String,
    category: String,
    tags: String,
    in_stock: bool,
    errors: FieldErrors<ProductField>,
}

impl Default for ProductForm {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductForm {
    /// Empty form in create mode: price `0`, in stock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            target: None,
            name: String::new(),
            description: String::new(),
            price: Price::ZERO.to_string(),
            category: String::new(),
            tags: String::new(),
            in_stock: true,
            errors: FieldErrors::new(),
        }
    }

    /// Form in edit mode, pre-filled from `product`.
    #[must_use]
    pub fn edit(product: &Product) -> Self {
        Self {
            target: Some(product.id),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            category: product.category.clone(),
            tags: product.tags.to_string(),
            in_stock: product.in_stock,
            errors: FieldErrors::new(),
        }
    }

    /// Form holding a posted body. `target` selects edit mode.
    #[must_use]
    pub fn from_input(target: Option<ProductId>, input: ProductInput) -> Self {
        Self {
            target,
            name: input.name,
            description: input.description,
            price: input.price,
            category: input.category,
            tags: input.tags,
            in_stock: input.in_stock.is_some(),
            errors: FieldErrors::new(),
        }
    }

    #[must_use]
    pub const fn target(&self) -> Option<ProductId> {
        self.target
    }

    #[must_use]
    pub const fn is_edit(&self) -> bool {
        self.target.is_some()
    }

    /// Current draft text of a text field.
    ///
    /// `InStock` reads as `"true"` or `"false"`.
    #[must_use]
    pub fn value(&self, field: ProductField) -> &str {
        match field {
            ProductField::Name => &self.name,
            ProductField::Description => &self.description,
            ProductField::Price => &self.price,
            ProductField::Category => &self.category,
            ProductField::Tags => &self.tags,
            ProductField::InStock => {
                if self.in_stock {
                    "true"
                } else {
                    "false"
                }
            }
        }
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.in_stock
    }

    /// Replace a text field's draft and clear that field's error.
    ///
    /// Tags stay raw text here; they are split only on submit.
    pub fn set(&mut self, field: ProductField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ProductField::Name => self.name = value,
            ProductField::Description => self.description = value,
            ProductField::Price => self.price = value,
            ProductField::Category => self.category = value,
            ProductField::Tags => self.tags = value,
            ProductField::InStock => self.in_stock = matches!(value.as_str(), "true" | "on"),
        }
        self.errors.clear(field);
    }

    pub fn set_in_stock(&mut self, in_stock: bool) {
        self.in_stock = in_stock;
        self.errors.clear(ProductField::InStock);
    }

    #[must_use]
    pub const fn errors(&self) -> &FieldErrors<ProductField> {
        &self.errors
    }

    /// Check every field without touching the draft.
    ///
    /// # Errors
    ///
    /// Returns all failing fields at once.
    pub fn validate(&self) -> Result<ProductSubmission, FieldErrors<ProductField>> {
        let mut errors = FieldErrors::new();

        let mut text = |field: ProductField, value: &str| {
            required(value)
                .map(str::to_string)
                .map_err(|e| errors.insert(field, e))
                .ok()
        };
        let name = text(ProductField::Name, &self.name);
        let description = text(ProductField::Description, &self.description);
        let category = text(ProductField::Category, &self.category);

        let price = required(&self.price)
            .and_then(|price| Price::parse(price).map_err(FieldError::from))
            .map_err(|e| errors.insert(ProductField::Price, e))
            .ok();

        match (name, description, price, category) {
            (Some(name), Some(description), Some(price), Some(category)) => {
                let payload = ProductPayload {
                    name,
                    description,
                    price,
                    category,
                    tags: Tags::parse(&self.tags),
                    in_stock: self.in_stock,
                };
                Ok(match self.target {
                    Some(id) => ProductSubmission::Update(id, payload),
                    None => ProductSubmission::Create(payload),
                })
            }
            _ => Err(errors),
        }
    }

    /// Validate and record the outcome; `None` means nothing may be sent.
    pub fn submit(&mut self) -> Option<ProductSubmission> {
        match self.validate() {
            Ok(submission) => {
                self.errors = FieldErrors::new();
                Some(submission)
            }
            Err(errors) => {
                self.errors = errors;
                None
            }
        }
    }

    /// Fields in display order for the modal template.
    #[must_use]
    pub fn fields(&self) -> Vec<FieldView> {
        let error = |field| self.errors.message(field);
        vec![
            FieldView::text("name", "Name", InputKind::Text, &self.name)
                .with_error(error(ProductField::Name)),
            FieldView::text(
                "description",
                "Description",
                InputKind::TextArea,
                &self.description,
            )
            .with_error(error(ProductField::Description)),
            FieldView::text("price", "Price", InputKind::Number, &self.price)
                .with_error(error(ProductField::Price)),
            FieldView::text("category", "Category", InputKind::Text, &self.category)
                .with_error(error(ProductField::Category)),
            FieldView::text("tags", "Tags", InputKind::Text, &self.tags)
                .with_hint("Comma-separated, e.g. summer, sale")
                .with_error(error(ProductField::Tags)),
            FieldView::checkbox("in_stock", "In stock", self.in_stock)
                .with_error(error(ProductField::InStock)),
        ]
    }
}
