use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "movie")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub year_of_release: i32,
    pub date_added: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Review }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Review => Entity::has_many(super::review::Entity).into(),
        }
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef { Relation::Review.def() }
}

impl ActiveModelBehavior for ActiveModel {}
