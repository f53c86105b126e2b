use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::movie;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "review")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub movie_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Movie }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Movie => Entity::belongs_to(movie::Entity)
                .from(Column::MovieId)
                .to(movie::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
        }
    }
}

impl Related<movie::Entity> for Entity {
    fn to() -> RelationDef { Relation::Movie.def() }
}

impl ActiveModelBehavior for ActiveModel {}
