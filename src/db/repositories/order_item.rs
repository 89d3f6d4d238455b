use sea_orm::{ColumnTrait, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::db::repositories::base::SqlRepository;
use crate::entities::order_items;

pub type OrderItemRepository = SqlRepository<order_items::Entity>;

impl SqlRepository<order_items::Entity> {
    /// All line items belonging to one order.
    pub async fn get_for_order(&self, order_id: Uuid) -> Result<Vec<order_items::Model>, DbErr> {
        order_items::Entity::find()
            .filter(order_items::Column::OrderId.eq(order_id))
            .all(self.conn())
            .await
    }
}
