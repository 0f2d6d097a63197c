use sqlx::PgConnection;

use super::map_db_error;
use crate::models::{NewVehicle, Vehicle};
use crate::utils::errors::{conflict_error, not_found_error, AppResult};

pub struct VehicleRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> VehicleRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&mut self) -> AppResult<Vec<Vehicle>> {
        sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles ORDER BY id")
            .fetch_all(&mut *self.conn)
            .await
            .map_err(|e| map_db_error(e, "Error listing vehicles"))
    }

    pub async fn find_by_id(&mut self, id: i32) -> AppResult<Option<Vehicle>> {
        sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(|e| map_db_error(e, "Error finding vehicle"))
    }

    pub async fn lock_by_id(&mut self, id: i32) -> AppResult<Option<Vehicle>> {
        sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(|e| map_db_error(e, "Error locking vehicle"))
    }

    pub async fn create(&mut self, vehicle: NewVehicle) -> AppResult<Vehicle> {
        sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (brand, model, license_plate, vehicle_type)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(vehicle.brand)
        .bind(vehicle.model)
        .bind(vehicle.license_plate)
        .bind(vehicle.vehicle_type)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| map_db_error(e, "Error creating vehicle"))
    }

    pub async fn update(&mut self, vehicle: &Vehicle) -> AppResult<Vehicle> {
        let updated = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET brand = $2, model = $3, license_plate = $4, vehicle_type = $5, version = version + 1
            WHERE id = $1 AND version = $6
            RETURNING *
            "#,
        )
        .bind(vehicle.id)
        .bind(&vehicle.brand)
        .bind(&vehicle.model)
        .bind(&vehicle.license_plate)
        .bind(&vehicle.vehicle_type)
        .bind(vehicle.version)
        .fetch_optional(&mut *self.conn)
        .await
        .map_err(|e| map_db_error(e, "Error updating vehicle"))?;

        match updated {
            Some(v) => Ok(v),
            None if self.find_by_id(vehicle.id).await?.is_some() => {
                Err(conflict_error("Vehicle", vehicle.id))
            }
            None => Err(not_found_error("Vehicle", vehicle.id)),
        }
    }

    pub async fn set_operational(&mut self, id: i32, operational: bool) -> AppResult<()> {
        sqlx::query("UPDATE vehicles SET is_operational = $2 WHERE id = $1")
            .bind(id)
            .bind(operational)
            .execute(&mut *self.conn)
            .await
            .map_err(|e| map_db_error(e, "Error updating vehicle operational flag"))?;

        Ok(())
    }

    pub async fn delete(&mut self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await
            .map_err(|e| map_db_error(e, "Error deleting vehicle"))?;

        Ok(result.rows_affected() > 0)
    }
}
