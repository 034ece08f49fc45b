//! PostgreSQL-backed `RegistryStore` implementation using Diesel ORM.
//!
//! Every mutation runs inside its own transaction. Puts are upserts keyed by
//! primary key, so replaying a mutation is harmless.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::{debug, warn};

use crate::domain::ports::{RegistryMutation, RegistrySnapshot, RegistryStore, RegistryStoreError};
use crate::domain::{SegmentId, User};

use super::models::{ConfigurationTypeRow, DetailRow, HighwayRow, OfficeRow, SegmentRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{configuration_details, configuration_types, highways, offices, segments, users};

/// Diesel-backed implementation of the [`RegistryStore`] port.
#[derive(Clone)]
pub struct DieselRegistryStore {
    pool: DbPool,
}

impl DieselRegistryStore {
    /// Create a store over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RegistryStoreError {
    RegistryStoreError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> RegistryStoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    let message = error.to_string();
    debug!(%message, "registry diesel operation failed");
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _)
        | DieselError::BrokenTransactionManager => RegistryStoreError::connection(message),
        _ => RegistryStoreError::query(message),
    }
}

type SnapshotRows = (
    Vec<HighwayRow>,
    Vec<OfficeRow>,
    Vec<ConfigurationTypeRow>,
    Vec<UserRow>,
    Vec<SegmentRow>,
    Vec<DetailRow>,
);

async fn load_rows(conn: &mut AsyncPgConnection) -> Result<SnapshotRows, diesel::result::Error> {
    conn.transaction(|conn| {
        async move {
            let highway_rows = highways::table
                .select(HighwayRow::as_select())
                .load(conn)
                .await?;
            let office_rows = offices::table
                .select(OfficeRow::as_select())
                .load(conn)
                .await?;
            let type_rows = configuration_types::table
                .select(ConfigurationTypeRow::as_select())
                .load(conn)
                .await?;
            let user_rows = users::table.select(UserRow::as_select()).load(conn).await?;
            let segment_rows = segments::table
                .select(SegmentRow::as_select())
                .load(conn)
                .await?;
            let detail_rows = configuration_details::table
                .select(DetailRow::as_select())
                .load(conn)
                .await?;
            Ok((
                highway_rows,
                office_rows,
                type_rows,
                user_rows,
                segment_rows,
                detail_rows,
            ))
        }
        .scope_boxed()
    })
    .await
}

fn into_snapshot(rows: SnapshotRows) -> Result<RegistrySnapshot, RegistryStoreError> {
    let (highway_rows, office_rows, type_rows, user_rows, segment_rows, detail_rows) = rows;
    Ok(RegistrySnapshot {
        highways: highway_rows.into_iter().map(Into::into).collect(),
        offices: office_rows.into_iter().map(Into::into).collect(),
        configuration_types: type_rows.into_iter().map(Into::into).collect(),
        users: user_rows
            .into_iter()
            .map(User::try_from)
            .collect::<Result<_, _>>()?,
        segments: segment_rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<_, _>>()?,
        details: detail_rows.into_iter().map(Into::into).collect(),
    })
}

async fn delete_segment(
    conn: &mut AsyncPgConnection,
    segment_id: SegmentId,
    expected_details: usize,
) -> Result<(), diesel::result::Error> {
    let id = *segment_id.as_uuid();
    let removed = diesel::delete(
        configuration_details::table.filter(configuration_details::segment_id.eq(id)),
    )
    .execute(conn)
    .await?;
    if removed != expected_details {
        warn!(
            %segment_id,
            removed,
            expected_details,
            "stored detail count differed from registry view during cascade"
        );
    }
    diesel::delete(segments::table.filter(segments::id.eq(id)))
        .execute(conn)
        .await?;
    Ok(())
}

async fn apply(
    conn: &mut AsyncPgConnection,
    mutation: &RegistryMutation,
) -> Result<(), diesel::result::Error> {
    match mutation {
        RegistryMutation::PutHighway(highway) => {
            let row = HighwayRow::from(highway);
            diesel::insert_into(highways::table)
                .values(&row)
                .on_conflict(highways::id)
                .do_update()
                .set(&row)
                .execute(conn)
                .await?;
        }
        RegistryMutation::PutOffice(office) => {
            let row = OfficeRow::from(office);
            diesel::insert_into(offices::table)
                .values(&row)
                .on_conflict(offices::id)
                .do_update()
                .set(&row)
                .execute(conn)
                .await?;
        }
        RegistryMutation::PutConfigurationType(kind) => {
            let row = ConfigurationTypeRow::from(kind);
            diesel::insert_into(configuration_types::table)
                .values(&row)
                .on_conflict(configuration_types::id)
                .do_update()
                .set(&row)
                .execute(conn)
                .await?;
        }
        RegistryMutation::PutUser(user) => {
            let row = UserRow::from(user);
            diesel::insert_into(users::table)
                .values(&row)
                .on_conflict(users::id)
                .do_update()
                .set(&row)
                .execute(conn)
                .await?;
        }
        RegistryMutation::PutSegment(segment) => {
            let row = SegmentRow::from(segment);
            diesel::insert_into(segments::table)
                .values(&row)
                .on_conflict(segments::id)
                .do_update()
                .set(&row)
                .execute(conn)
                .await?;
        }
        RegistryMutation::DeleteSegment {
            segment_id,
            detail_ids,
        } => delete_segment(conn, *segment_id, detail_ids.len()).await?,
        RegistryMutation::PutDetail(detail) => {
            let row = DetailRow::from(detail);
            diesel::insert_into(configuration_details::table)
                .values(&row)
                .on_conflict(configuration_details::id)
                .do_update()
                .set(&row)
                .execute(conn)
                .await?;
        }
        RegistryMutation::DeleteDetail(detail_id) => {
            diesel::delete(
                configuration_details::table
                    .filter(configuration_details::id.eq(*detail_id.as_uuid())),
            )
            .execute(conn)
            .await?;
        }
        RegistryMutation::RecordLogin { user_id, at } => {
            diesel::update(users::table.filter(users::id.eq(*user_id.as_uuid())))
                .set(users::last_login_at.eq(Some(*at)))
                .execute(conn)
                .await?;
        }
    }
    Ok(())
}

#[async_trait]
impl RegistryStore for DieselRegistryStore {
    async fn load_snapshot(&self) -> Result<RegistrySnapshot, RegistryStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = load_rows(&mut conn).await.map_err(map_diesel_error)?;
        into_snapshot(rows)
    }

    async fn persist(&self, mutation: &RegistryMutation) -> Result<(), RegistryStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| async move { apply(conn, mutation).await }.scope_boxed())
            .await
            .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    //! Error mapping checks; row round-trips need a live database.
    use super::*;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    #[rstest]
    fn closed_connections_are_connection_errors() {
        let err = map_diesel_error(DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new("server closed the connection".to_owned()),
        ));
        assert!(matches!(err, RegistryStoreError::Connection { .. }));
    }

    #[rstest]
    fn other_failures_are_query_errors() {
        let err = map_diesel_error(DieselError::NotFound);
        assert!(matches!(err, RegistryStoreError::Query { .. }));
    }

    #[rstest]
    fn pool_errors_keep_their_message() {
        let err = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(err, RegistryStoreError::connection("timed out"));
    }

    #[rstest]
    fn empty_rows_make_an_empty_snapshot() {
        let snapshot = into_snapshot(Default::default()).expect("empty rows");
        assert_eq!(snapshot, RegistrySnapshot::default());
    }
}
