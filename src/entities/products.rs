use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(indexed)]
    pub name: String,

    pub description: Option<String>,

    /// Current unit price. Order items snapshot this at purchase time.
    pub price: f64,

    pub stock: i32,

    pub category: Option<String>,

    /// Soft delete flag: inactive products stay referenceable by past
    /// order items but cannot be ordered.
    pub is_active: bool,

    pub created_at: DateTimeUtc,

    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_items::Entity")]
    OrderItems,
}

impl Related<super::order_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert {
            if matches!(self.id, ActiveValue::NotSet) {
                self.id = Set(Uuid::new_v4());
            }
            if matches!(self.created_at, ActiveValue::NotSet) {
                self.created_at = Set(Utc::now());
            }
        } else {
            self.updated_at = Set(Some(Utc::now()));
        }
        Ok(self)
    }
}
