//! User entity.
//!
//! Every row is a staff account: users are created on first external-identity
//! login with the lowest role and promoted from there.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Staff role. The declaration order is the authorization lattice
/// (support < moderator < admin < owner); policy functions over it live in
/// `reportd-core`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum Role {
    #[sea_orm(string_value = "support")]
    #[default]
    Support,
    #[sea_orm(string_value = "moderator")]
    Moderator,
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "owner")]
    Owner,
}

impl Role {
    /// Stable wire name, matching the stored column value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Support => "support",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
            Self::Owner => "owner",
        }
    }
}

/// User model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Opaque external-platform identity. Unique; users only exist after a
    /// first external-identity login.
    #[sea_orm(unique)]
    pub external_id: String,

    pub username: String,

    /// Avatar URL from the external platform.
    #[sea_orm(nullable)]
    pub avatar_url: Option<String>,

    #[sea_orm(nullable)]
    pub email: Option<String>,

    pub role: Role,

    /// Current bearer session token. Rotated on login, cleared on logout.
    #[sea_orm(unique, nullable)]
    pub token: Option<String>,

    #[sea_orm(nullable)]
    pub last_login_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::report::Entity")]
    HandledReports,
}

impl Related<super::report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HandledReports.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
