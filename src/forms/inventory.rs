use serde::Deserialize;
use validator::Validate;

use crate::domain::money::{MAX_AMOUNT, MAX_QUANTITY, cents_from_amount};
use crate::domain::product::NewProduct;
use crate::forms::{
    FormResult, empty_string_as_none, finite_number, optional_multiline, optional_text,
    required_text,
};

/// Maximum allowed length for a product name.
const NAME_MAX_LEN: u64 = 128;
const SKU_MAX_LEN: u64 = 64;
const CATEGORY_MAX_LEN: u64 = 64;

/// Form payload emitted when submitting the "New product" form.
#[derive(Debug, Deserialize, Validate)]
pub struct AddProductForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    #[validate(length(min = 1, max = SKU_MAX_LEN))]
    pub sku: String,
    #[validate(length(min = 1, max = CATEGORY_MAX_LEN))]
    pub category: String,
    /// List price as a decimal amount.
    #[validate(range(min = 0.0, max = MAX_AMOUNT, message = "price is out of range"))]
    pub base_price: f64,
    #[serde(default)]
    #[validate(range(min = 0, max = MAX_QUANTITY, message = "stock is out of range"))]
    pub current_stock: i32,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(url)]
    pub image_url: Option<String>,
}

impl AddProductForm {
    /// Validates and sanitizes the payload into a domain `NewProduct`.
    pub fn into_new_product(self) -> FormResult<NewProduct> {
        self.validate()?;

        let name = required_text(&self.name, "name")?;
        let sku = required_text(&self.sku, "sku")?;
        let category = required_text(&self.category, "category")?;

        let base_price = finite_number(self.base_price, "base_price")?;
        let mut product = NewProduct::new(name, sku, category, cents_from_amount(base_price))
            .with_stock(self.current_stock);

        if let Some(description) = optional_multiline(self.description.as_deref()) {
            product = product.with_description(description);
        }

        if let Some(image_url) = optional_text(self.image_url.as_deref()) {
            product = product.with_image_url(image_url);
        }

        Ok(product)
    }
}

/// Form payload for the stock level editor.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStockForm {
    /// New absolute stock level; replaces the current value.
    #[validate(range(min = 0, max = MAX_QUANTITY, message = "stock is out of range"))]
    pub current_stock: i32,
}

impl UpdateStockForm {
    pub fn into_stock_level(self) -> FormResult<i32> {
        self.validate()?;
        Ok(self.current_stock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::FormError;

    fn form() -> AddProductForm {
        AddProductForm {
            name: "  Bath   towel ".to_string(),
            sku: "BT-001".to_string(),
            category: "Bath".to_string(),
            base_price: 12.5,
            current_stock: 40,
            description: Some("\n Soft cotton \n".to_string()),
            image_url: None,
        }
    }

    #[test]
    fn add_product_form_converts_price_to_cents() {
        let product = match form().into_new_product() {
            Ok(product) => product,
            Err(err) => panic!("expected product, got {err}"),
        };

        assert_eq!(product.name, "Bath towel");
        assert_eq!(product.base_price_cents, 1250);
        assert_eq!(product.current_stock, 40);
        assert_eq!(product.description.as_deref(), Some("Soft cotton"));
    }

    #[test]
    fn add_product_form_rejects_negative_stock() {
        let mut payload = form();
        payload.current_stock = -1;

        let result = payload.into_new_product();

        assert!(matches!(result, Err(FormError::Validation(_))));
    }

    #[test]
    fn add_product_form_rejects_unbounded_prices() {
        for price in [f64::INFINITY, f64::NAN, 1e15] {
            let mut payload = form();
            payload.base_price = price;

            assert!(payload.into_new_product().is_err(), "price {price} was accepted");
        }
    }

    #[test]
    fn add_product_form_rejects_whitespace_name() {
        let mut payload = form();
        payload.name = "   ".to_string();

        let result = payload.into_new_product();

        assert!(matches!(result, Err(FormError::Blank { field: "name" })));
    }

    #[test]
    fn stock_form_accepts_zero_and_rejects_negative() {
        let zero = UpdateStockForm { current_stock: 0 }.into_stock_level();
        assert!(matches!(zero, Ok(0)));

        let negative = UpdateStockForm { current_stock: -5 }.into_stock_level();
        assert!(matches!(negative, Err(FormError::Validation(_))));
    }
}
