use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "points_ledger")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// User whose point total changed.
    pub user_id: i32,
    pub delta: i32,
    pub reason: String,
    pub ref_type: String,
    pub ref_id: i32,
    /// User whose action caused the change (self for submissions).
    pub actor_user_id: i32,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
