//! SQL compilation for normalized filter groups.
//!
//! Conditions are rendered with numbered `$n` placeholders and the values
//! collected in bind order, then bound by the calling repository. Field
//! names come from the normalizer's allow-lists, never raw client input, so
//! interpolating them into the statement is safe.

use cityfix_core::query::{FieldFilter, FieldMatch, FilterGroup};

/// Compiled WHERE fragments plus their bind values, all text.
pub(crate) struct CompiledFilters {
    pub conditions: Vec<String>,
    pub values: Vec<String>,
}

impl CompiledFilters {
    /// Render as a `WHERE ...` clause, or an empty string when there is
    /// nothing to filter on.
    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    /// Render as `AND ...` fragments for appending to an existing WHERE.
    pub fn and_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("AND {}", self.conditions.join(" AND "))
        }
    }
}

/// Escape LIKE metacharacters so user text matches literally.
pub(crate) fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Render `filters` as SQL conditions with placeholders starting at
/// `first_idx`.
///
/// Each `all` fragment becomes one AND-ed condition; the `any` fragments
/// collapse into a single parenthesized OR condition conjoined with the
/// rest, matching the normalizer's `role AND (search-or-group)` semantics.
pub(crate) fn compile_filters(filters: &FilterGroup, first_idx: usize) -> CompiledFilters {
    let mut conditions = Vec::new();
    let mut values = Vec::new();
    let mut idx = first_idx;

    for filter in &filters.all {
        let condition = render(filter, &mut values, &mut idx);
        conditions.push(condition);
    }

    if !filters.any.is_empty() {
        let ors: Vec<String> = filters
            .any
            .iter()
            .map(|filter| render(filter, &mut values, &mut idx))
            .collect();
        conditions.push(format!("({})", ors.join(" OR ")));
    }

    CompiledFilters { conditions, values }
}

/// Render one filter as a condition, pushing its bind value and advancing
/// the placeholder index.
fn render(filter: &FieldFilter, values: &mut Vec<String>, idx: &mut usize) -> String {
    let condition = match &filter.matcher {
        FieldMatch::Equals(v) => {
            values.push(v.clone());
            format!("{} = ${idx}", filter.field)
        }
        FieldMatch::Contains(v) => {
            values.push(format!("%{}%", escape_like(v)));
            format!("{} ILIKE ${idx}", filter.field)
        }
    };
    *idx += 1;
    condition
}
