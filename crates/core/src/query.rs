//! Query normalization: loosely-typed client filter input is converted into
//! a validated, bounded [`QuerySpec`] before anything touches the store.
//!
//! The tuning constants (page bounds, match distance ceiling) live in one
//! immutable [`QueryConfig`] injected into the [`QueryNormalizer`] at
//! construction, so the API layer decides the limits exactly once.

use std::collections::HashMap;

use crate::error::CoreError;
use crate::geo::GeoPoint;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Default number of results per page.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Hard upper bound on the page size. Larger requests are clamped, not
/// rejected.
pub const MAX_PAGE_SIZE: i64 = 50;

/// Hard ceiling on the geo-matching scan radius, in meters. Fixed by design
/// so a client-supplied radius can never force an unbounded scan.
pub const MAX_MATCH_DISTANCE_METERS: f64 = 16_000_000.0;

/// Immutable query tuning shared by the normalizer and the geo-matcher.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    pub default_limit: i64,
    pub max_limit: i64,
    pub max_match_distance_meters: f64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_PAGE_SIZE,
            max_limit: MAX_PAGE_SIZE,
            max_match_distance_meters: MAX_MATCH_DISTANCE_METERS,
        }
    }
}

// ---------------------------------------------------------------------------
// Filter model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn sql(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// How a single field is matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldMatch {
    /// Exact equality.
    Equals(String),
    /// Case-insensitive substring match.
    Contains(String),
}

/// One field predicate. The field name always comes from an allow-list,
/// never from raw client input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: &'static str,
    pub matcher: FieldMatch,
}

/// Composable predicate set: `all` fragments are AND-ed together, `any`
/// fragments collapse into a single OR group conjoined with the rest.
///
/// Free-text search becomes an `any` group over the entity's searchable
/// fields; a role filter alongside it lands in `all`, giving
/// `role AND (f1 ~ s OR f2 ~ s OR ...)` without ad-hoc branching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterGroup {
    pub all: Vec<FieldFilter>,
    pub any: Vec<FieldFilter>,
}

impl FilterGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, field: &'static str, matcher: FieldMatch) -> Self {
        self.all.push(FieldFilter { field, matcher });
        self
    }

    pub fn or(mut self, field: &'static str, matcher: FieldMatch) -> Self {
        self.any.push(FieldFilter { field, matcher });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty() && self.any.is_empty()
    }
}

/// A validated, bounded query descriptor ready for execution.
#[derive(Debug, Clone)]
pub struct QuerySpec {
    pub filters: FilterGroup,
    pub limit: i64,
    pub skip: i64,
    pub sort_field: &'static str,
    pub sort_direction: SortDirection,
}

/// Extends [`QuerySpec`] with a validated origin and boost flag for the
/// geo-matching path.
#[derive(Debug, Clone)]
pub struct GeoQuery {
    pub origin: GeoPoint,
    /// Scan ceiling from [`QueryConfig`], never client input.
    pub max_distance_meters: f64,
    /// Restrict results to providers with an unexpired subscription.
    pub boost: bool,
    pub spec: QuerySpec,
}

// ---------------------------------------------------------------------------
// Per-entity allow-lists
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum FilterKind {
    Exact,
    Substring,
}

/// Entities that accept client-supplied query input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryEntity {
    Users,
    Conversations,
}

/// Fields free-text `search` fans out over for users.
const USER_SEARCH_FIELDS: &[&str] = &["profession", "location", "first_name", "last_name", "email"];

const USER_SORT_FIELDS: &[&str] = &["created_at", "first_name", "last_name", "profession", "state"];

const USER_FILTER_FIELDS: &[(&str, FilterKind)] = &[
    ("account_type", FilterKind::Exact),
    ("status", FilterKind::Exact),
    ("state", FilterKind::Exact),
    ("locality", FilterKind::Exact),
    ("profession", FilterKind::Substring),
    ("location", FilterKind::Substring),
];

const CONVERSATION_SORT_FIELDS: &[&str] = &["last_activity_at", "created_at"];

const CONVERSATION_FILTER_FIELDS: &[(&str, FilterKind)] = &[("status", FilterKind::Exact)];

/// Keys consumed by the normalizer itself; everything else must be an
/// allow-listed filter field.
const RESERVED_KEYS: &[&str] = &["limit", "skip", "sort", "order", "search", "lat", "lng", "boost"];

impl QueryEntity {
    fn sortable_fields(self) -> &'static [&'static str] {
        match self {
            QueryEntity::Users => USER_SORT_FIELDS,
            QueryEntity::Conversations => CONVERSATION_SORT_FIELDS,
        }
    }

    fn default_sort(self) -> (&'static str, SortDirection) {
        match self {
            QueryEntity::Users => ("created_at", SortDirection::Descending),
            QueryEntity::Conversations => ("last_activity_at", SortDirection::Descending),
        }
    }

    fn filterable_fields(self) -> &'static [(&'static str, FilterKind)] {
        match self {
            QueryEntity::Users => USER_FILTER_FIELDS,
            QueryEntity::Conversations => CONVERSATION_FILTER_FIELDS,
        }
    }

    pub fn searchable_fields(self) -> &'static [&'static str] {
        match self {
            QueryEntity::Users => USER_SEARCH_FIELDS,
            QueryEntity::Conversations => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// Turns raw `key=value` client input into a [`QuerySpec`].
///
/// Pure: either a complete descriptor or an error, never both.
#[derive(Debug, Clone)]
pub struct QueryNormalizer {
    config: QueryConfig,
}

impl QueryNormalizer {
    pub fn new(config: QueryConfig) -> Self {
        Self { config }
    }

    /// Normalize raw filter input for `entity`.
    ///
    /// - `limit` is clamped into `[1, max_limit]`; a non-integer is an error.
    /// - `skip` defaults to 0; negative values are rejected.
    /// - `sort`/`order` must name an allow-listed field; absent means the
    ///   entity default.
    /// - `search` compiles to an OR group of case-insensitive substring
    ///   matches over the entity's searchable fields.
    /// - Any remaining key must be in the entity's filter allow-list, else
    ///   the whole request is rejected with the offending key named.
    pub fn normalize(
        &self,
        raw: &HashMap<String, String>,
        entity: QueryEntity,
    ) -> Result<QuerySpec, CoreError> {
        let limit = match raw.get("limit") {
            Some(v) => v.parse::<i64>().map_err(|_| {
                CoreError::Validation(format!("limit must be an integer, got '{v}'"))
            })?,
            None => self.config.default_limit,
        };
        let limit = limit.clamp(1, self.config.max_limit);

        let skip = match raw.get("skip") {
            Some(v) => v.parse::<i64>().map_err(|_| {
                CoreError::Validation(format!("skip must be an integer, got '{v}'"))
            })?,
            None => 0,
        };
        if skip < 0 {
            return Err(CoreError::Validation(format!(
                "skip must not be negative, got {skip}"
            )));
        }

        let (default_field, default_direction) = entity.default_sort();
        let sort_field = match raw.get("sort") {
            Some(requested) => entity
                .sortable_fields()
                .iter()
                .find(|f| **f == requested.as_str())
                .copied()
                .ok_or_else(|| {
                    CoreError::Validation(format!("Cannot sort by '{requested}'"))
                })?,
            None => default_field,
        };

        let sort_direction = match raw.get("order").map(String::as_str) {
            Some("asc") => SortDirection::Ascending,
            Some("desc") => SortDirection::Descending,
            Some(other) => {
                return Err(CoreError::Validation(format!(
                    "order must be 'asc' or 'desc', got '{other}'"
                )))
            }
            None => default_direction,
        };

        let mut filters = FilterGroup::new();

        if let Some(search) = raw.get("search").map(|s| s.trim()).filter(|s| !s.is_empty()) {
            for field in entity.searchable_fields().iter().copied() {
                filters = filters.or(field, FieldMatch::Contains(search.to_string()));
            }
        }

        // Sort the remaining keys so rejection messages are deterministic.
        let mut keys: Vec<&String> = raw.keys().collect();
        keys.sort();

        for key in keys {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            let value = &raw[key];
            let (field, kind) = entity
                .filterable_fields()
                .iter()
                .find(|(f, _)| *f == key.as_str())
                .copied()
                .ok_or_else(|| {
                    CoreError::Validation(format!("Unknown filter field '{key}'"))
                })?;

            filters = match kind {
                FilterKind::Exact => filters.and(field, FieldMatch::Equals(value.clone())),
                FilterKind::Substring => filters.and(field, FieldMatch::Contains(value.clone())),
            };
        }

        Ok(QuerySpec {
            filters,
            limit,
            skip,
            sort_field,
            sort_direction,
        })
    }

    /// Normalize raw input for the geo-matching path.
    ///
    /// Requires `lat`/`lng`; a missing or invalid origin is a validation
    /// error, never a silent zero-result. The distance ceiling comes from
    /// the injected [`QueryConfig`].
    pub fn normalize_match(&self, raw: &HashMap<String, String>) -> Result<GeoQuery, CoreError> {
        let lat = parse_coordinate(raw, "lat")?;
        let lng = parse_coordinate(raw, "lng")?;
        let origin = GeoPoint::validate(lat, lng)?;

        let boost = match raw.get("boost").map(String::as_str) {
            None => false,
            Some("true") | Some("1") => true,
            Some("false") | Some("0") => false,
            Some(other) => {
                return Err(CoreError::Validation(format!(
                    "boost must be a boolean, got '{other}'"
                )))
            }
        };

        let spec = self.normalize(raw, QueryEntity::Users)?;

        Ok(GeoQuery {
            origin,
            max_distance_meters: self.config.max_match_distance_meters,
            boost,
            spec,
        })
    }
}

fn parse_coordinate(raw: &HashMap<String, String>, key: &str) -> Result<f64, CoreError> {
    let value = raw
        .get(key)
        .ok_or_else(|| CoreError::Validation(format!("{key} is required")))?;
    value
        .parse::<f64>()
        .map_err(|_| CoreError::Validation(format!("{key} must be a number, got '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> QueryNormalizer {
        QueryNormalizer::new(QueryConfig::default())
    }

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    // -- limit ---------------------------------------------------------------

    #[test]
    fn limit_defaults_when_absent() {
        let spec = normalizer().normalize(&raw(&[]), QueryEntity::Users).unwrap();
        assert_eq!(spec.limit, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn limit_above_max_is_clamped_not_rejected() {
        let spec = normalizer()
            .normalize(&raw(&[("limit", "500")]), QueryEntity::Users)
            .unwrap();
        assert_eq!(spec.limit, MAX_PAGE_SIZE);
    }

    #[test]
    fn limit_below_one_is_clamped_to_one() {
        let spec = normalizer()
            .normalize(&raw(&[("limit", "0")]), QueryEntity::Users)
            .unwrap();
        assert_eq!(spec.limit, 1);

        let spec = normalizer()
            .normalize(&raw(&[("limit", "-3")]), QueryEntity::Users)
            .unwrap();
        assert_eq!(spec.limit, 1);
    }

    #[test]
    fn limit_clamping_is_idempotent() {
        let n = normalizer();
        for requested in ["1", "25", "50", "51", "10000"] {
            let spec = n
                .normalize(&raw(&[("limit", requested)]), QueryEntity::Users)
                .unwrap();
            assert!((1..=MAX_PAGE_SIZE).contains(&spec.limit), "limit {requested}");
            assert_eq!(spec.limit.clamp(1, MAX_PAGE_SIZE), spec.limit);
        }
    }

    #[test]
    fn non_numeric_limit_is_rejected() {
        let err = normalizer()
            .normalize(&raw(&[("limit", "lots")]), QueryEntity::Users)
            .unwrap_err();
        assert!(err.to_string().contains("limit"));
    }

    // -- skip ----------------------------------------------------------------

    #[test]
    fn skip_defaults_to_zero() {
        let spec = normalizer().normalize(&raw(&[]), QueryEntity::Users).unwrap();
        assert_eq!(spec.skip, 0);
    }

    #[test]
    fn negative_skip_is_rejected() {
        let err = normalizer()
            .normalize(&raw(&[("skip", "-1")]), QueryEntity::Users)
            .unwrap_err();
        assert!(err.to_string().contains("skip"));
    }

    // -- sort ----------------------------------------------------------------

    #[test]
    fn sort_defaults_per_entity() {
        let users = normalizer().normalize(&raw(&[]), QueryEntity::Users).unwrap();
        assert_eq!(users.sort_field, "created_at");
        assert_eq!(users.sort_direction, SortDirection::Descending);

        let convos = normalizer()
            .normalize(&raw(&[]), QueryEntity::Conversations)
            .unwrap();
        assert_eq!(convos.sort_field, "last_activity_at");
        assert_eq!(convos.sort_direction, SortDirection::Descending);
    }

    #[test]
    fn sort_field_outside_allow_list_is_rejected() {
        let err = normalizer()
            .normalize(&raw(&[("sort", "password_hash")]), QueryEntity::Users)
            .unwrap_err();
        assert!(err.to_string().contains("password_hash"));
    }

    #[test]
    fn explicit_sort_and_order_are_honored() {
        let spec = normalizer()
            .normalize(
                &raw(&[("sort", "first_name"), ("order", "asc")]),
                QueryEntity::Users,
            )
            .unwrap();
        assert_eq!(spec.sort_field, "first_name");
        assert_eq!(spec.sort_direction, SortDirection::Ascending);
    }

    #[test]
    fn bad_order_value_is_rejected() {
        let err = normalizer()
            .normalize(&raw(&[("order", "upward")]), QueryEntity::Users)
            .unwrap_err();
        assert!(err.to_string().contains("order"));
    }

    // -- search and filters --------------------------------------------------

    #[test]
    fn search_compiles_to_or_group_over_searchable_fields() {
        let spec = normalizer()
            .normalize(&raw(&[("search", "plumber")]), QueryEntity::Users)
            .unwrap();
        assert_eq!(spec.filters.any.len(), USER_SEARCH_FIELDS.len());
        assert!(spec
            .filters
            .any
            .iter()
            .all(|f| f.matcher == FieldMatch::Contains("plumber".into())));
        assert!(spec.filters.all.is_empty());
    }

    #[test]
    fn role_filter_is_conjoined_with_search_group() {
        let spec = normalizer()
            .normalize(
                &raw(&[("search", "plumber"), ("account_type", "CityBuilder")]),
                QueryEntity::Users,
            )
            .unwrap();
        assert_eq!(spec.filters.any.len(), USER_SEARCH_FIELDS.len());
        assert_eq!(
            spec.filters.all,
            vec![FieldFilter {
                field: "account_type",
                matcher: FieldMatch::Equals("CityBuilder".into()),
            }]
        );
    }

    #[test]
    fn blank_search_is_ignored() {
        let spec = normalizer()
            .normalize(&raw(&[("search", "   ")]), QueryEntity::Users)
            .unwrap();
        assert!(spec.filters.is_empty());
    }

    #[test]
    fn substring_fields_compile_to_contains() {
        let spec = normalizer()
            .normalize(&raw(&[("profession", "plumb")]), QueryEntity::Users)
            .unwrap();
        assert_eq!(
            spec.filters.all,
            vec![FieldFilter {
                field: "profession",
                matcher: FieldMatch::Contains("plumb".into()),
            }]
        );
    }

    #[test]
    fn unknown_filter_key_is_rejected_with_key_named() {
        let err = normalizer()
            .normalize(&raw(&[("favourite_colour", "red")]), QueryEntity::Users)
            .unwrap_err();
        assert!(err.to_string().contains("favourite_colour"));
    }

    #[test]
    fn conversations_reject_user_only_filters() {
        let err = normalizer()
            .normalize(&raw(&[("account_type", "User")]), QueryEntity::Conversations)
            .unwrap_err();
        assert!(err.to_string().contains("account_type"));
    }

    // -- normalize_match -----------------------------------------------------

    #[test]
    fn match_requires_origin() {
        let err = normalizer().normalize_match(&raw(&[])).unwrap_err();
        assert!(err.to_string().contains("lat"));
    }

    #[test]
    fn match_rejects_out_of_range_origin() {
        let err = normalizer()
            .normalize_match(&raw(&[("lat", "91.0"), ("lng", "3.3")]))
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn match_ceiling_comes_from_config_not_client() {
        let geo = normalizer()
            .normalize_match(&raw(&[("lat", "6.5"), ("lng", "3.3")]))
            .unwrap();
        assert_eq!(geo.max_distance_meters, MAX_MATCH_DISTANCE_METERS);
        assert!(!geo.boost);
    }

    #[test]
    fn match_parses_boost_flag() {
        let geo = normalizer()
            .normalize_match(&raw(&[("lat", "6.5"), ("lng", "3.3"), ("boost", "true")]))
            .unwrap();
        assert!(geo.boost);

        let err = normalizer()
            .normalize_match(&raw(&[("lat", "6.5"), ("lng", "3.3"), ("boost", "maybe")]))
            .unwrap_err();
        assert!(err.to_string().contains("boost"));
    }

    #[test]
    fn match_carries_search_and_role_filters() {
        let geo = normalizer()
            .normalize_match(&raw(&[
                ("lat", "6.5"),
                ("lng", "3.3"),
                ("search", "plumber"),
                ("account_type", "CityBuilder"),
            ]))
            .unwrap();
        assert_eq!(geo.spec.filters.any.len(), USER_SEARCH_FIELDS.len());
        assert_eq!(geo.spec.filters.all.len(), 1);
    }
}
