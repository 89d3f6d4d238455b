use sea_orm_migration::prelude::*;
use uuid::Uuid;

use crate::entities::users;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Hash the default password using Argon2id
fn hash_default_password() -> String {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    let password = b"changeme1234";
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password, &salt)
        .expect("Failed to hash default password")
        .to_string()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let now = chrono::Utc::now();
        let password = hash_default_password();

        let insert = Query::insert()
            .into_table(users::Entity)
            .columns([
                users::Column::Id,
                users::Column::Username,
                users::Column::Email,
                users::Column::FirstName,
                users::Column::LastName,
                users::Column::Password,
                users::Column::IsActive,
                users::Column::IsSuperuser,
                users::Column::CreatedAt,
            ])
            .values_panic([
                Uuid::new_v4().into(),
                "admin".into(),
                "admin@storefront.local".into(),
                "Admin".into(),
                "User".into(),
                password.into(),
                true.into(),
                true.into(),
                now.into(),
            ])
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = Query::delete()
            .from_table(users::Entity)
            .and_where(Expr::col(users::Column::Username).eq("admin"))
            .to_owned();

        manager.exec_stmt(delete).await?;

        Ok(())
    }
}
