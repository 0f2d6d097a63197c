use sqlx::PgConnection;

use super::map_db_error;
use crate::models::{Driver, NewDriver};
use crate::utils::errors::{conflict_error, not_found_error, AppResult};

pub struct DriverRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> DriverRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&mut self) -> AppResult<Vec<Driver>> {
        sqlx::query_as::<_, Driver>("SELECT * FROM drivers ORDER BY last_name, first_name, id")
            .fetch_all(&mut *self.conn)
            .await
            .map_err(|e| map_db_error(e, "Error listing drivers"))
    }

    pub async fn find_by_id(&mut self, id: i32) -> AppResult<Option<Driver>> {
        sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(|e| map_db_error(e, "Error finding driver"))
    }

    pub async fn lock_by_id(&mut self, id: i32) -> AppResult<Option<Driver>> {
        sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(|e| map_db_error(e, "Error locking driver"))
    }

    pub async fn find_by_account(&mut self, account_id: i32) -> AppResult<Option<Driver>> {
        sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE account_id = $1")
            .bind(account_id)
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(|e| map_db_error(e, "Error finding driver by account"))
    }

    pub async fn create(&mut self, driver: NewDriver) -> AppResult<Driver> {
        sqlx::query_as::<_, Driver>(
            r#"
            INSERT INTO drivers (first_name, last_name, license_number, status, assigned_vehicle_id, account_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(driver.first_name)
        .bind(driver.last_name)
        .bind(driver.license_number)
        .bind(driver.status)
        .bind(driver.assigned_vehicle_id)
        .bind(driver.account_id)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| map_db_error(e, "Error creating driver"))
    }

    pub async fn update(&mut self, driver: &Driver) -> AppResult<Driver> {
        let updated = sqlx::query_as::<_, Driver>(
            r#"
            UPDATE drivers
            SET first_name = $2, last_name = $3, license_number = $4, status = $5,
                assigned_vehicle_id = $6, version = version + 1
            WHERE id = $1 AND version = $7
            RETURNING *
            "#,
        )
        .bind(driver.id)
        .bind(&driver.first_name)
        .bind(&driver.last_name)
        .bind(&driver.license_number)
        .bind(&driver.status)
        .bind(driver.assigned_vehicle_id)
        .bind(driver.version)
        .fetch_optional(&mut *self.conn)
        .await
        .map_err(|e| map_db_error(e, "Error updating driver"))?;

        match updated {
            Some(d) => Ok(d),
            None if self.find_by_id(driver.id).await?.is_some() => {
                Err(conflict_error("Driver", driver.id))
            }
            None => Err(not_found_error("Driver", driver.id)),
        }
    }

    pub async fn delete(&mut self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM drivers WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await
            .map_err(|e| map_db_error(e, "Error deleting driver"))?;

        Ok(result.rows_affected() > 0)
    }
}
