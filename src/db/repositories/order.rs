use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::db::repositories::base::SqlRepository;
use crate::entities::{order_items, orders, prelude::*};

pub type OrderRepository = SqlRepository<orders::Entity>;

/// One requested line of a new order. The unit price is deliberately
/// absent: it is always read from the product at creation time.
#[derive(Debug, Clone)]
pub struct OrderItemInput {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("product {0} does not exist or is inactive")]
    ProductUnavailable(Uuid),

    #[error(transparent)]
    Database(#[from] DbErr),
}

impl SqlRepository<orders::Entity> {
    /// All orders placed by one user.
    pub async fn get_by_user_id(&self, user_id: Uuid) -> Result<Vec<orders::Model>, DbErr> {
        Orders::find()
            .filter(orders::Column::UserId.eq(user_id))
            .all(self.conn())
            .await
    }

    /// Create an order together with its items in a single transaction.
    ///
    /// Each requested product is validated inside the transaction: it must
    /// exist and be active, otherwise the whole order is rejected with
    /// `OrderError::ProductUnavailable` naming the offending product and
    /// nothing is persisted. The product's current price is snapshotted
    /// into the item and summed into the order total; later price changes
    /// never affect a placed order.
    pub async fn create_with_items(
        &self,
        user_id: Uuid,
        items: Vec<OrderItemInput>,
    ) -> Result<orders::Model, OrderError> {
        let txn = self.conn().begin().await?;

        let mut total_amount = 0.0_f64;
        let mut item_models = Vec::with_capacity(items.len());

        for item in items {
            let product = Products::find_by_id(item.product_id)
                .one(&txn)
                .await?
                .filter(|p| p.is_active)
                .ok_or(OrderError::ProductUnavailable(item.product_id))?;

            total_amount += product.price * f64::from(item.quantity);

            // insert_many skips the before_save hook, so ids are assigned
            // here rather than left to the entity.
            item_models.push(order_items::ActiveModel {
                id: Set(Uuid::new_v4()),
                product_id: Set(item.product_id),
                quantity: Set(item.quantity),
                price_at_purchase: Set(product.price),
                ..Default::default()
            });
        }

        let order = orders::ActiveModel {
            user_id: Set(user_id),
            total_amount: Set(total_amount),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if !item_models.is_empty() {
            for item in &mut item_models {
                item.order_id = Set(order.id);
            }
            OrderItems::insert_many(item_models).exec(&txn).await?;
        }

        txn.commit().await?;
        Ok(order)
    }
}
