//! The candidate order being admitted and who is placing it.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::cache::DecisionCache;
use super::catalog::product_type_of;
use super::error::CapacityResult;
use super::model::CandidateOrder;
use super::source::CommitmentSource;
use crate::util::ids::{MemberId, ProductTypeId};

/// Inputs shared by every checker for one decision.
#[derive(Debug, Clone, Copy)]
pub struct OrderContext<'r> {
    /// Products and quantities the member wants.
    pub order: &'r CandidateOrder,
    /// Member placing the order; `None` for a brand-new signup.
    pub member: Option<&'r MemberId>,
    /// First day the order would apply.
    pub start_date: NaiveDate,
    /// Whether waiting-list reservations must also be respected.
    pub check_waiting_list: bool,
}

impl<'r> OrderContext<'r> {
    /// Context for a brand-new member without waiting-list checks.
    #[must_use]
    pub const fn new(order: &'r CandidateOrder, start_date: NaiveDate) -> Self {
        Self {
            order,
            member: None,
            start_date,
            check_waiting_list: false,
        }
    }

    /// Attribute the order to an existing member.
    #[must_use]
    pub const fn for_member(mut self, member: Option<&'r MemberId>) -> Self {
        self.member = member;
        self
    }

    /// Toggle waiting-list reservations.
    #[must_use]
    pub const fn with_waiting_list(mut self, check_waiting_list: bool) -> Self {
        self.check_waiting_list = check_waiting_list;
        self
    }
}

/// Split an order by the product type of each product. Zero quantities are kept.
///
/// # Errors
/// Unknown products or a failing source.
pub fn partition_by_product_type<S>(
    source: &S,
    cache: &mut DecisionCache,
    order: &CandidateOrder,
) -> CapacityResult<BTreeMap<ProductTypeId, CandidateOrder>>
where
    S: CommitmentSource + ?Sized,
{
    let mut partitions: BTreeMap<ProductTypeId, CandidateOrder> = BTreeMap::new();
    for (product, quantity) in order {
        let product_type = product_type_of(source, cache, product)?;
        partitions
            .entry(product_type)
            .or_default()
            .insert(product.clone(), *quantity);
    }
    Ok(partitions)
}
