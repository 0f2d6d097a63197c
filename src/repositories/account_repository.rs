use std::str::FromStr;

use sqlx::PgConnection;

use super::map_db_error;
use crate::models::{Account, Role};
use crate::utils::errors::{AppError, AppResult};

pub struct AccountRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> AccountRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&mut self, username: &str, password_hash: &str) -> AppResult<Account> {
        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (username, password_hash)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| map_db_error(e, "Error creating account"))
    }

    pub async fn find_by_id(&mut self, id: i32) -> AppResult<Option<Account>> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(|e| map_db_error(e, "Error finding account"))
    }

    pub async fn find_by_username(&mut self, username: &str) -> AppResult<Option<Account>> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE lower(username) = lower($1)")
            .bind(username)
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(|e| map_db_error(e, "Error finding account by username"))
    }

    pub async fn add_role(&mut self, account_id: i32, role: Role) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO account_roles (account_id, role) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(account_id)
        .bind(role.as_str())
        .execute(&mut *self.conn)
        .await
        .map_err(|e| map_db_error(e, "Error assigning role"))?;

        Ok(())
    }

    pub async fn roles(&mut self, account_id: i32) -> AppResult<Vec<Role>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT role FROM account_roles WHERE account_id = $1 ORDER BY role")
                .bind(account_id)
                .fetch_all(&mut *self.conn)
                .await
                .map_err(|e| map_db_error(e, "Error loading account roles"))?;

        rows.into_iter()
            .map(|(role,)| Role::from_str(&role).map_err(AppError::Internal))
            .collect()
    }

    pub async fn delete(&mut self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await
            .map_err(|e| map_db_error(e, "Error deleting account"))?;

        Ok(result.rows_affected() > 0)
    }
}
