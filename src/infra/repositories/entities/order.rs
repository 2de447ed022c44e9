//! Order database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{DomainError, Order};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub total: i64,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Order {
    type Error = DomainError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Order {
            id: model.id,
            user_id: model.user_id,
            product_id: model.product_id,
            quantity: model.quantity,
            total: model.total,
            status: model.status.parse()?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl From<Order> for ActiveModel {
    fn from(order: Order) -> Self {
        use sea_orm::Set;

        ActiveModel {
            id: Set(order.id),
            user_id: Set(order.user_id),
            product_id: Set(order.product_id),
            quantity: Set(order.quantity),
            total: Set(order.total),
            status: Set(order.status.as_str().to_string()),
            created_at: Set(order.created_at),
            updated_at: Set(order.updated_at),
        }
    }
}
