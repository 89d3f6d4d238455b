use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::db::repositories::base::SqlRepository;
use crate::entities::products;

pub type ProductRepository = SqlRepository<products::Entity>;

impl SqlRepository<products::Entity> {
    /// Look up a product by exact name.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<products::Model>, DbErr> {
        products::Entity::find()
            .filter(products::Column::Name.eq(name))
            .one(self.conn())
            .await
    }

    /// Mark a product inactive instead of removing the row, so existing
    /// order items keep a valid product reference. Missing rows yield
    /// `false`, mirroring the hard-delete semantics.
    pub async fn soft_delete(&self, id: Uuid) -> Result<bool, DbErr> {
        let Some(product) = products::Entity::find_by_id(id).one(self.conn()).await? else {
            return Ok(false);
        };

        let mut active: products::ActiveModel = product.into();
        active.is_active = Set(false);
        active.update(self.conn()).await?;

        Ok(true)
    }
}
