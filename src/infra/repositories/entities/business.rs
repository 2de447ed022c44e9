//! Shop and warehouse database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{Business, DomainError};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "businesses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub kind: String,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub status: String,
    pub admin_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    /// Soft delete timestamp (NULL = live, set = deleted)
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Business {
    type Error = DomainError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Business {
            id: model.id,
            owner_id: model.owner_id,
            kind: model.kind.parse()?,
            name: model.name,
            category: model.category,
            description: model.description,
            status: model.status.parse()?,
            admin_id: model.admin_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        })
    }
}

impl From<Business> for ActiveModel {
    fn from(business: Business) -> Self {
        use sea_orm::Set;

        ActiveModel {
            id: Set(business.id),
            owner_id: Set(business.owner_id),
            kind: Set(business.kind.as_str().to_string()),
            name: Set(business.name),
            category: Set(business.category),
            description: Set(business.description),
            status: Set(business.status.as_str().to_string()),
            admin_id: Set(business.admin_id),
            created_at: Set(business.created_at),
            updated_at: Set(business.updated_at),
            deleted_at: Set(business.deleted_at),
        }
    }
}
