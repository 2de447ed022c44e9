//! Role request database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{DomainError, RoleId, RoleRequest};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "role_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub requested_role: i16,
    pub status: String,
    pub admin_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for RoleRequest {
    type Error = DomainError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(RoleRequest {
            id: model.id,
            user_id: model.user_id,
            requested_role: RoleId::try_from(model.requested_role)?,
            status: model.status.parse()?,
            admin_id: model.admin_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl From<RoleRequest> for ActiveModel {
    fn from(request: RoleRequest) -> Self {
        use sea_orm::Set;

        ActiveModel {
            id: Set(request.id),
            user_id: Set(request.user_id),
            requested_role: Set(request.requested_role.id()),
            status: Set(request.status.as_str().to_string()),
            admin_id: Set(request.admin_id),
            created_at: Set(request.created_at),
            updated_at: Set(request.updated_at),
        }
    }
}
