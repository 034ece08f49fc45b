//! Road network reference data: highways and the offices that own segments.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::text::{BlankFieldError, required};
use super::{HighwayId, OfficeId};

/// A named national highway, identified by its route number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Highway {
    /// Stable identifier.
    pub id: HighwayId,
    /// Route number such as `NH-44`; unique across the registry.
    #[schema(example = "NH-44")]
    pub number: String,
    /// Display name; the only field mutable after creation.
    #[schema(example = "Srinagar to Kanyakumari")]
    pub name: String,
}

/// Validated input for creating a [`Highway`].
///
/// # Examples
/// ```
/// use corridor::domain::HighwayDraft;
///
/// let draft = HighwayDraft::new(" NH-44 ", "North-South Corridor").unwrap();
/// assert_eq!(draft.number(), "NH-44");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighwayDraft {
    number: String,
    name: String,
}

impl HighwayDraft {
    /// Trim and validate the route number and display name.
    pub fn new(number: &str, name: &str) -> Result<Self, BlankFieldError> {
        Ok(Self {
            number: required("number", number)?,
            name: required("name", name)?,
        })
    }

    /// Route number.
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Materialise the highway under a fresh identifier.
    pub(crate) fn into_highway(self, id: HighwayId) -> Highway {
        Highway {
            id,
            number: self.number,
            name: self.name,
        }
    }
}

/// An administrative office that owns corridor segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Office {
    /// Stable identifier.
    pub id: OfficeId,
    /// Division the office reports to.
    #[schema(example = "Northern Division")]
    pub division_name: String,
    /// Office name within the division.
    #[schema(example = "Ambala Project Office")]
    pub office_name: String,
}

/// Validated input for creating an [`Office`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfficeDraft {
    division_name: String,
    office_name: String,
}

impl OfficeDraft {
    /// Trim and validate both names.
    pub fn new(division_name: &str, office_name: &str) -> Result<Self, BlankFieldError> {
        Ok(Self {
            division_name: required("divisionName", division_name)?,
            office_name: required("officeName", office_name)?,
        })
    }

    pub(crate) fn into_office(self, id: OfficeId) -> Office {
        Office {
            id,
            division_name: self.division_name,
            office_name: self.office_name,
        }
    }
}
