//! Sums expenses per category for the category distribution chart.

use serde::Serialize;

use crate::{
    category::Category,
    expense::{Expense, UNKNOWN_CATEGORY_COLOR, UNKNOWN_CATEGORY_NAME},
};

/// The total amount spent in one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    /// The ID of the matched category, or the expense's own reference if
    /// no category matched.
    pub category_id: String,
    pub name: String,
    pub color: String,
    pub amount: f64,
}

/// Find the category whose ID is exactly `reference`.
pub fn find_exact<'a>(reference: &str, categories: &'a [Category]) -> Option<&'a Category> {
    categories.iter().find(|category| category.id == reference)
}

/// Find the category whose ID equals `reference` ignoring case.
pub fn find_case_insensitive<'a>(
    reference: &str,
    categories: &'a [Category],
) -> Option<&'a Category> {
    let reference = reference.to_lowercase();

    categories
        .iter()
        .find(|category| category.id.to_lowercase() == reference)
}

/// Find the category an expense refers to.
///
/// An exact match wins over a case-insensitive one.
pub fn resolve_category<'a>(reference: &str, categories: &'a [Category]) -> Option<&'a Category> {
    find_exact(reference, categories).or_else(|| find_case_insensitive(reference, categories))
}

/// Total `expenses` per category, largest total first.
///
/// Expenses are grouped by the ID of the category they resolve to, so
/// references that only differ in case share a total. Each reference that
/// matches no category gets its own "Unknown" total. Equal totals keep the
/// order in which their categories first appear in `expenses`.
pub fn total_by_category(expenses: &[Expense], categories: &[Category]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();

    for expense in expenses {
        let (category_id, name, color) = match resolve_category(&expense.category, categories) {
            Some(category) => (
                category.id.as_str(),
                category.name.as_ref(),
                category.color.as_str(),
            ),
            None => (
                expense.category.as_str(),
                UNKNOWN_CATEGORY_NAME,
                UNKNOWN_CATEGORY_COLOR,
            ),
        };

        match totals
            .iter_mut()
            .find(|total| total.category_id == category_id)
        {
            Some(total) => total.amount += expense.amount,
            None => totals.push(CategoryTotal {
                category_id: category_id.to_owned(),
                name: name.to_owned(),
                color: color.to_owned(),
                amount: expense.amount,
            }),
        }
    }

    // `sort_by` is stable, so ties keep their first-seen order.
    totals.sort_by(|a, b| b.amount.total_cmp(&a.amount));

    totals
}
