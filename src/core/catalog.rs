//! Product lookups: product type, share size and basket equivalence.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::cache::DecisionCache;
use super::error::{CapacityError, CapacityResult};
use super::model::{Product, ProductPrice};
use super::source::CommitmentSource;
use crate::util::ids::{BasketSizeName, ProductId, ProductTypeId};

/// Fetch a product, failing with [`CapacityError::UnknownProduct`] if it does not exist.
///
/// # Errors
/// Unknown product or a failing source.
pub fn product<S>(source: &S, cache: &mut DecisionCache, id: &ProductId) -> CapacityResult<Product>
where
    S: CommitmentSource + ?Sized,
{
    if let Some(hit) = cache.products.get(id) {
        return Ok(hit.clone());
    }
    let found = source
        .product(id)?
        .ok_or_else(|| CapacityError::UnknownProduct(id.clone()))?;
    cache.products.insert(id.clone(), found.clone());
    Ok(found)
}

/// Product type a product belongs to.
///
/// # Errors
/// Unknown product or a failing source.
pub fn product_type_of<S>(source: &S, cache: &mut DecisionCache, id: &ProductId) -> CapacityResult<ProductTypeId>
where
    S: CommitmentSource + ?Sized,
{
    Ok(product(source, cache, id)?.product_type)
}

/// Share size of a product from the most recent price effective at `date`.
///
/// A product without any effective price is an error, never zero.
///
/// # Errors
/// [`CapacityError::MissingProductSize`] or a failing source.
pub fn size_at<S>(source: &S, cache: &mut DecisionCache, id: &ProductId, date: NaiveDate) -> CapacityResult<Decimal>
where
    S: CommitmentSource + ?Sized,
{
    let prices = match cache.prices.get(id) {
        Some(hit) => Arc::clone(hit),
        None => {
            let mut loaded = source.product_prices(id)?;
            loaded.sort_by_key(|price| price.valid_from);
            let loaded: Arc<[ProductPrice]> = loaded.into();
            cache.prices.insert(id.clone(), Arc::clone(&loaded));
            loaded
        }
    };
    let effective = prices.partition_point(|price| price.valid_from <= date);
    effective
        .checked_sub(1)
        .and_then(|idx| prices.get(idx))
        .map(|price| price.size)
        .ok_or_else(|| CapacityError::MissingProductSize { product: id.clone(), date })
}

/// Baskets of `basket_size` filled by one unit of a product; 0 without a record.
///
/// # Errors
/// A failing source.
pub fn equivalence<S>(
    source: &S,
    cache: &mut DecisionCache,
    id: &ProductId,
    basket_size: &BasketSizeName,
) -> CapacityResult<u32>
where
    S: CommitmentSource + ?Sized,
{
    let table = match cache.equivalences.get(id) {
        Some(hit) => Arc::clone(hit),
        None => {
            let table: HashMap<BasketSizeName, u32> = source
                .basket_size_equivalences(id)?
                .into_iter()
                .map(|record| (record.basket_size, record.quantity))
                .collect();
            let table = Arc::new(table);
            cache.equivalences.insert(id.clone(), Arc::clone(&table));
            table
        }
    };
    Ok(table.get(basket_size).copied().unwrap_or(0))
}
