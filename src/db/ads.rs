//! Ad inventory helpers.

use diesel::{prelude::*, result::QueryResult};
use diesel_async::RunQueryDsl;

use super::connection::DbConnection;

/// Optional column updates for an existing ad.
#[derive(AsChangeset, Default)]
#[diesel(table_name = crate::schema::ads)]
pub struct AdChanges<'a> {
    /// New display title.
    pub title: Option<&'a str>,
    /// New per-view reward, minor units.
    pub price: Option<i64>,
    /// New serving state.
    pub active: Option<bool>,
}

impl AdChanges<'_> {
    /// Whether the changeset carries no updates.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.price.is_none() && self.active.is_none()
    }
}

/// Insert a new ad, returning its id.
///
/// # Errors
/// Returns any error produced by the insertion query.
#[must_use = "handle the result"]
pub async fn create_ad(conn: &mut DbConnection, ad: &crate::models::NewAd<'_>) -> QueryResult<i32> {
    use crate::schema::ads::dsl::{ads, id};
    diesel::insert_into(ads)
        .values(ad)
        .returning(id)
        .get_result(conn)
        .await
}

/// Look up an ad by id.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn get_ad(conn: &mut DbConnection, ad_id: i32) -> QueryResult<Option<crate::models::Ad>> {
    use crate::schema::ads::dsl::ads;
    ads.find(ad_id)
        .first::<crate::models::Ad>(conn)
        .await
        .optional()
}

/// List ads currently served to users, newest first.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn list_active_ads(conn: &mut DbConnection) -> QueryResult<Vec<crate::models::Ad>> {
    use crate::schema::ads::dsl::{active, ads, created_at};
    ads.filter(active.eq(true))
        .order(created_at.desc())
        .load::<crate::models::Ad>(conn)
        .await
}

/// List every ad, newest first.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn list_ads(conn: &mut DbConnection) -> QueryResult<Vec<crate::models::Ad>> {
    use crate::schema::ads::dsl::{ads, created_at};
    ads.order(created_at.desc())
        .load::<crate::models::Ad>(conn)
        .await
}

/// Apply column updates to an ad, returning the number of rows touched.
///
/// # Errors
/// Returns any error produced by the update query.
#[must_use = "handle the result"]
pub async fn update_ad(
    conn: &mut DbConnection,
    ad_id: i32,
    changes: &AdChanges<'_>,
) -> QueryResult<usize> {
    use crate::schema::ads::dsl::ads;
    diesel::update(ads.find(ad_id))
        .set(changes)
        .execute(conn)
        .await
}
