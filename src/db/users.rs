//! User (login profile) queries

use super::Db;
use crate::error::AppError;
use crate::models::User;
use tracing::info;

impl Db {
    /// Find a user matching both profile and password (plaintext comparison,
    /// as in the original service)
    pub async fn find_user(
        &self,
        perfil: &str,
        contrasena: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT perfil, contrasena FROM users WHERE perfil = ? AND contrasena = ?",
        )
        .bind(perfil)
        .bind(contrasena)
        .fetch_optional(self.pool())
        .await?;

        Ok(user)
    }

    /// Seed the default login profiles if they are missing
    pub async fn seed_default_users(&self) -> Result<(), AppError> {
        let defaults = [("administrador", "admin123"), ("usuario", "user123")];

        for (perfil, contrasena) in defaults {
            let inserted =
                sqlx::query("INSERT OR IGNORE INTO users (perfil, contrasena) VALUES (?, ?)")
                    .bind(perfil)
                    .bind(contrasena)
                    .execute(self.pool())
                    .await?;

            if inserted.rows_affected() > 0 {
                info!("Seeded default user: {}", perfil);
            }
        }

        Ok(())
    }
}
