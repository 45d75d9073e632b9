//! Geo-proximity matching of providers.
//!
//! The serving hot path. The bounding box computed in core restricts the
//! scan to the candidate set reachable through the composite
//! `(latitude, longitude)` index; the exact spherical distance is then
//! evaluated in SQL over those candidates only, never the full table.

use sqlx::PgPool;

use cityfix_core::geo::BoundingBox;
use cityfix_core::query::GeoQuery;
use cityfix_core::roles::ACCOUNT_PROVIDER;

use crate::models::page::Page;
use crate::models::user::MatchedProvider;

use super::filter_sql::compile_filters;
use super::user_repo::COLUMNS;

/// Haversine great-circle distance in meters from the origin (`$1` = lat,
/// `$2` = lng) to each row's stored point, on a spherical Earth model.
/// `least(1.0, ...)` guards the asin domain against floating-point slop on
/// near-antipodal candidates.
const DISTANCE_EXPR: &str = "2.0 * 6371000.0 * asin(least(1.0, sqrt( \
    power(sin(radians(latitude - $1) / 2.0), 2) + \
    cos(radians($1)) * cos(radians(latitude)) * \
    power(sin(radians(longitude - $2) / 2.0), 2))))";

/// Provides the distance-ranked provider matching query.
pub struct MatchRepo;

impl MatchRepo {
    /// Return providers within the distance ceiling, nearest first.
    ///
    /// Eligibility is `(attribute filters) AND provider AND profile
    /// complete AND (unexpired subscription when boost)`. Boost is a hard
    /// filter, checked against the database clock. Ordering is distance
    /// first, then the spec's requested sort, then `id`.
    pub async fn match_providers(
        pool: &PgPool,
        geo: &GeoQuery,
    ) -> Result<Page<MatchedProvider>, sqlx::Error> {
        let bbox = BoundingBox::around(geo.origin, geo.max_distance_meters);

        // Fixed leading binds: $1 lat, $2 lng, $3..$6 box, $7 ceiling,
        // $8 account type. Attribute filters start at $9.
        let compiled = compile_filters(&geo.spec.filters, 9);
        let limit_idx = 9 + compiled.values.len();
        let offset_idx = limit_idx + 1;

        let boost_clause = if geo.boost {
            "AND sub_expires_at IS NOT NULL AND sub_expires_at >= NOW()"
        } else {
            ""
        };

        let query = format!(
            "SELECT {COLUMNS}, distance_meters FROM ( \
                 SELECT {COLUMNS}, {DISTANCE_EXPR} AS distance_meters \
                 FROM users \
                 WHERE latitude BETWEEN $3 AND $4 \
                   AND longitude BETWEEN $5 AND $6 \
             ) candidates \
             WHERE distance_meters <= $7 \
               AND account_type = $8 \
               AND profile_complete = TRUE \
               {boost_clause} \
               {filter_clause} \
             ORDER BY distance_meters ASC, {sort} {dir}, id ASC \
             LIMIT ${limit_idx} OFFSET ${offset_idx}",
            filter_clause = compiled.and_clause(),
            sort = geo.spec.sort_field,
            dir = geo.spec.sort_direction.sql(),
        );

        let mut q = sqlx::query_as::<_, MatchedProvider>(&query)
            .bind(geo.origin.lat)
            .bind(geo.origin.lng)
            .bind(bbox.min_lat)
            .bind(bbox.max_lat)
            .bind(bbox.min_lng)
            .bind(bbox.max_lng)
            .bind(geo.max_distance_meters)
            .bind(ACCOUNT_PROVIDER);
        for value in &compiled.values {
            q = q.bind(value.as_str());
        }
        let rows = q
            .bind(geo.spec.limit + 1)
            .bind(geo.spec.skip)
            .fetch_all(pool)
            .await?;

        Ok(Page::from_overfetch(rows, geo.spec.limit))
    }
}
