use rust_decimal::Decimal;
use thiserror::Error;

use crate::database::models::{ProductDraft, ProductInput};

/// Prices and discounts are stored as NUMERIC(12, 2)
pub const PRICE_SCALE: u32 = 2;
const PRICE_LIMIT: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0); // 10^10

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_CATEGORY_LENGTH: usize = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("original_price must be greater than zero")]
    NonPositiveOriginalPrice,

    #[error("{0} must have at most 2 decimal places")]
    TooManyDecimals(&'static str),

    #[error("{0} is out of range")]
    PriceOutOfRange(&'static str),

    #[error("{field} must be between 1 and {max} characters")]
    InvalidText { field: &'static str, max: usize },
}

/// `(original - new) / original * 100`, rounded to two decimal places.
pub fn percentage_discount(original_price: Decimal, new_price: Decimal) -> Result<Decimal, CatalogError> {
    if original_price <= Decimal::ZERO {
        return Err(CatalogError::NonPositiveOriginalPrice);
    }

    let discount = original_price
        .checked_sub(new_price)
        .and_then(|diff| diff.checked_div(original_price))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|pct| pct.round_dp(PRICE_SCALE))
        .ok_or(CatalogError::PriceOutOfRange("new_price"))?;

    if discount.abs() >= PRICE_LIMIT {
        return Err(CatalogError::PriceOutOfRange("new_price"));
    }
    Ok(discount)
}

/// A price must fit the stored column exactly, so nothing is rounded on write
fn check_price(field: &'static str, price: Decimal) -> Result<(), CatalogError> {
    if price.normalize().scale() > PRICE_SCALE {
        return Err(CatalogError::TooManyDecimals(field));
    }
    if price.abs() >= PRICE_LIMIT {
        return Err(CatalogError::PriceOutOfRange(field));
    }
    Ok(())
}

fn check_text(field: &'static str, value: &str, max: usize) -> Result<(), CatalogError> {
    let len = value.trim().chars().count();
    if len == 0 || len > max {
        return Err(CatalogError::InvalidText { field, max });
    }
    Ok(())
}

/// Validate client input and attach the derived discount
pub fn draft_product(input: ProductInput) -> Result<ProductDraft, CatalogError> {
    check_text("name", &input.name, MAX_NAME_LENGTH)?;
    check_text("category", &input.category, MAX_CATEGORY_LENGTH)?;
    check_price("original_price", input.original_price)?;
    check_price("new_price", input.new_price)?;

    let percentage_discount = percentage_discount(input.original_price, input.new_price)?;
    Ok(ProductDraft {
        name: input.name,
        category: input.category,
        original_price: input.original_price,
        new_price: input.new_price,
        percentage_discount,
        offer_expiration_date: input.offer_expiration_date,
    })
}
