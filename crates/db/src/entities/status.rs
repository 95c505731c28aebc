//! Office presence status entity (one row per user).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Office presence.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum PresenceStatus {
    #[sea_orm(string_value = "In Office")]
    #[serde(rename = "In Office")]
    InOffice,
    #[default]
    #[sea_orm(string_value = "Out of Office")]
    #[serde(rename = "Out of Office")]
    OutOfOffice,
}

impl PresenceStatus {
    /// The wire and storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InOffice => "In Office",
            Self::OutOfOffice => "Out of Office",
        }
    }

    /// Parse the wire representation. Matching is exact.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "In Office" => Some(Self::InOffice),
            "Out of Office" => Some(Self::OutOfOffice),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "status")]
pub struct Model {
    /// Same as user.id (1:1 relationship)
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,

    pub status: PresenceStatus,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
