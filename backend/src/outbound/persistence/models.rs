//! Internal Diesel row structs and their domain conversions.
//!
//! These types never leave the persistence layer. Every row struct is used
//! for both reads and upserts, so `Option` columns are written as `NULL`
//! rather than skipped.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::ports::RegistryStoreError;
use crate::domain::{
    ChainageRange, ConfigurationDetail, ConfigurationType, ConfigurationTypeId, DetailId,
    GeoPoint, Highway, HighwayId, Office, OfficeId, Role, Segment, SegmentId, SegmentStatus, User,
    UserId,
};

use super::schema::{configuration_details, configuration_types, highways, offices, segments, users};

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = highways)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct HighwayRow {
    pub id: Uuid,
    pub number: String,
    pub name: String,
}

impl From<HighwayRow> for Highway {
    fn from(row: HighwayRow) -> Self {
        Self {
            id: HighwayId::from_uuid(row.id),
            number: row.number,
            name: row.name,
        }
    }
}

impl From<&Highway> for HighwayRow {
    fn from(highway: &Highway) -> Self {
        Self {
            id: *highway.id.as_uuid(),
            number: highway.number.clone(),
            name: highway.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = offices)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OfficeRow {
    pub id: Uuid,
    pub division_name: String,
    pub office_name: String,
}

impl From<OfficeRow> for Office {
    fn from(row: OfficeRow) -> Self {
        Self {
            id: OfficeId::from_uuid(row.id),
            division_name: row.division_name,
            office_name: row.office_name,
        }
    }
}

impl From<&Office> for OfficeRow {
    fn from(office: &Office) -> Self {
        Self {
            id: *office.id.as_uuid(),
            division_name: office.division_name.clone(),
            office_name: office.office_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = configuration_types)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ConfigurationTypeRow {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub display_order: i32,
    pub active: bool,
}

impl From<ConfigurationTypeRow> for ConfigurationType {
    fn from(row: ConfigurationTypeRow) -> Self {
        Self {
            id: ConfigurationTypeId::from_uuid(row.id),
            code: row.code,
            name: row.name,
            display_order: row.display_order,
            active: row.active,
        }
    }
}

impl From<&ConfigurationType> for ConfigurationTypeRow {
    fn from(kind: &ConfigurationType) -> Self {
        Self {
            id: *kind.id.as_uuid(),
            code: kind.code.clone(),
            name: kind.name.clone(),
            display_order: kind.display_order,
            active: kind.active,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    pub role: String,
    pub office_id: Option<Uuid>,
    pub secret_hash: String,
    pub active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RegistryStoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::from_parts(&row.role, row.office_id.map(OfficeId::from_uuid))
            .map_err(|err| RegistryStoreError::corrupt(format!("user {}: {err}", row.id)))?;
        Ok(Self::from_record(
            UserId::from_uuid(row.id),
            row.username,
            row.full_name,
            row.email,
            role,
            row.active,
            row.last_login_at,
            row.created_at,
            row.secret_hash,
        ))
    }
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id.as_uuid(),
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            role: user.role.as_str().to_owned(),
            office_id: user.role.office_id().map(|id| *id.as_uuid()),
            secret_hash: user.secret_hash().to_owned(),
            active: user.active,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = segments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct SegmentRow {
    pub id: Uuid,
    pub highway_id: Uuid,
    pub office_id: Uuid,
    pub name: String,
    pub start_km: f64,
    pub end_km: f64,
    pub start_latitude: Option<f64>,
    pub start_longitude: Option<f64>,
    pub end_latitude: Option<f64>,
    pub end_longitude: Option<f64>,
    pub status: String,
    pub remarks: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn point(latitude: Option<f64>, longitude: Option<f64>) -> Option<GeoPoint> {
    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(GeoPoint {
            latitude,
            longitude,
        }),
        _ => None,
    }
}

impl TryFrom<SegmentRow> for Segment {
    type Error = RegistryStoreError;

    fn try_from(row: SegmentRow) -> Result<Self, Self::Error> {
        let status = SegmentStatus::parse(&row.status).ok_or_else(|| {
            RegistryStoreError::corrupt(format!(
                "segment {}: unknown status `{}`",
                row.id, row.status
            ))
        })?;
        Ok(Self {
            id: SegmentId::from_uuid(row.id),
            highway_id: HighwayId::from_uuid(row.highway_id),
            office_id: OfficeId::from_uuid(row.office_id),
            name: row.name,
            range: ChainageRange::unchecked(row.start_km, row.end_km),
            start_point: point(row.start_latitude, row.start_longitude),
            end_point: point(row.end_latitude, row.end_longitude),
            status,
            remarks: row.remarks,
            created_by: row.created_by.map(UserId::from_uuid),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl From<&Segment> for SegmentRow {
    fn from(segment: &Segment) -> Self {
        Self {
            id: *segment.id.as_uuid(),
            highway_id: *segment.highway_id.as_uuid(),
            office_id: *segment.office_id.as_uuid(),
            name: segment.name.clone(),
            start_km: segment.range.start,
            end_km: segment.range.end,
            start_latitude: segment.start_point.map(|p| p.latitude),
            start_longitude: segment.start_point.map(|p| p.longitude),
            end_latitude: segment.end_point.map(|p| p.latitude),
            end_longitude: segment.end_point.map(|p| p.longitude),
            status: segment.status.as_str().to_owned(),
            remarks: segment.remarks.clone(),
            created_by: segment.created_by.map(|id| *id.as_uuid()),
            created_at: segment.created_at,
            updated_at: segment.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = configuration_details)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct DetailRow {
    pub id: Uuid,
    pub segment_id: Uuid,
    pub configuration_type_id: Uuid,
    pub start_km: f64,
    pub end_km: f64,
    pub remarks: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DetailRow> for ConfigurationDetail {
    fn from(row: DetailRow) -> Self {
        Self {
            id: DetailId::from_uuid(row.id),
            segment_id: SegmentId::from_uuid(row.segment_id),
            configuration_type_id: ConfigurationTypeId::from_uuid(row.configuration_type_id),
            range: ChainageRange::unchecked(row.start_km, row.end_km),
            remarks: row.remarks,
            created_by: row.created_by.map(UserId::from_uuid),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<&ConfigurationDetail> for DetailRow {
    fn from(detail: &ConfigurationDetail) -> Self {
        Self {
            id: *detail.id.as_uuid(),
            segment_id: *detail.segment_id.as_uuid(),
            configuration_type_id: *detail.configuration_type_id.as_uuid(),
            start_km: detail.range.start,
            end_km: detail.range.end,
            remarks: detail.remarks.clone(),
            created_by: detail.created_by.map(|id| *id.as_uuid()),
            created_at: detail.created_at,
            updated_at: detail.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion checks that need no database.
    use super::*;
    use rstest::rstest;

    fn timestamp() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).expect("valid timestamp")
    }

    fn user_row(role: &str, office_id: Option<Uuid>) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            username: "asha".to_owned(),
            full_name: "Asha Rao".to_owned(),
            email: None,
            role: role.to_owned(),
            office_id,
            secret_hash: "sha256$00$00".to_owned(),
            active: true,
            last_login_at: None,
            created_at: timestamp(),
        }
    }

    #[rstest]
    #[case("central", Some(Uuid::new_v4()))]
    #[case("division", None)]
    #[case("auditor", None)]
    fn users_with_inconsistent_roles_are_corrupt(
        #[case] role: &str,
        #[case] office_id: Option<Uuid>,
    ) {
        let err = User::try_from(user_row(role, office_id)).expect_err("corrupt row");
        assert!(matches!(err, RegistryStoreError::Corrupt { .. }));
    }

    #[rstest]
    fn division_users_keep_their_office() {
        let office = Uuid::new_v4();
        let user = User::try_from(user_row("division", Some(office))).expect("valid row");
        assert_eq!(user.role.office_id(), Some(OfficeId::from_uuid(office)));
        assert_eq!(UserRow::from(&user).office_id, Some(office));
    }

    #[rstest]
    fn half_recorded_endpoints_are_dropped() {
        assert_eq!(point(Some(17.3), None), None);
        assert_eq!(
            point(Some(17.3), Some(78.4)),
            Some(GeoPoint {
                latitude: 17.3,
                longitude: 78.4,
            })
        );
    }

    #[rstest]
    fn unknown_segment_status_is_corrupt() {
        let row = SegmentRow {
            id: Uuid::new_v4(),
            highway_id: Uuid::new_v4(),
            office_id: Uuid::new_v4(),
            name: "bypass".to_owned(),
            start_km: 0.0,
            end_km: 10.0,
            start_latitude: None,
            start_longitude: None,
            end_latitude: None,
            end_longitude: None,
            status: "archived".to_owned(),
            remarks: None,
            created_by: None,
            created_at: timestamp(),
            updated_at: timestamp(),
        };
        let err = Segment::try_from(row).expect_err("unknown status");
        assert!(matches!(err, RegistryStoreError::Corrupt { .. }));
    }
}
