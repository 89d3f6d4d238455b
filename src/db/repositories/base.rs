//! Generic CRUD repository shared by every entity repository.
//!
//! Works against any entity with a UUID primary key; entity-specific
//! repositories compose this and add their filtered lookups.

use std::marker::PhantomData;

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, PrimaryKeyTrait,
};
use uuid::Uuid;

use crate::entities::{order_items, orders, products, users};

/// Ties an entity to its active model so the repository can be generic
/// over both. Implemented for every table the store manages.
pub trait StoreEntity: EntityTrait {
    type Active: ActiveModelTrait<Entity = Self> + ActiveModelBehavior + Send;
}

impl StoreEntity for users::Entity {
    type Active = users::ActiveModel;
}

impl StoreEntity for products::Entity {
    type Active = products::ActiveModel;
}

impl StoreEntity for orders::Entity {
    type Active = orders::ActiveModel;
}

impl StoreEntity for order_items::Entity {
    type Active = order_items::ActiveModel;
}

#[derive(Clone)]
pub struct SqlRepository<E: StoreEntity> {
    conn: DatabaseConnection,
    entity: PhantomData<E>,
}

impl<E> SqlRepository<E>
where
    E: StoreEntity,
    E::Model: IntoActiveModel<E::Active> + Send + Sync,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<Uuid>,
{
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self {
            conn,
            entity: PhantomData,
        }
    }

    #[must_use]
    pub const fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Fetch a row by primary key. Absence is `None`, not an error.
    pub async fn get(&self, id: Uuid) -> Result<Option<E::Model>, DbErr> {
        E::find_by_id(id).one(&self.conn).await
    }

    /// All rows of the table, in storage order.
    pub async fn get_all(&self) -> Result<Vec<E::Model>, DbErr> {
        E::find().all(&self.conn).await
    }

    /// Insert a new row. Storage-assigned fields (id, created_at) are
    /// filled by the entity's `before_save` hook when not supplied, and
    /// the persisted model is returned. Constraint violations surface as
    /// the store's error, uninterpreted.
    pub async fn create(&self, model: E::Active) -> Result<E::Model, DbErr> {
        model.insert(&self.conn).await
    }

    /// Sparse patch: only `Set` fields of `patch` are written, `NotSet`
    /// fields are left untouched. The patch must carry the primary key.
    /// Fails with `DbErr::RecordNotUpdated` if the row no longer exists.
    pub async fn update(&self, patch: E::Active) -> Result<E::Model, DbErr> {
        patch.update(&self.conn).await
    }

    /// Read-then-delete with idempotent semantics: a missing row yields
    /// `false` rather than an error. Under concurrent deletion of the
    /// same id at most one caller observes `true`.
    pub async fn delete(&self, id: Uuid) -> Result<bool, DbErr> {
        let Some(model) = E::find_by_id(id).one(&self.conn).await? else {
            return Ok(false);
        };

        model.into_active_model().delete(&self.conn).await?;
        Ok(true)
    }
}
