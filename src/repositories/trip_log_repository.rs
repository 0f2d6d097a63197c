use sqlx::PgConnection;

use super::map_db_error;
use crate::models::{NewTripLog, TripLog};
use crate::utils::errors::{conflict_error, not_found_error, AppResult};

pub struct TripLogRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> TripLogRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&mut self) -> AppResult<Vec<TripLog>> {
        sqlx::query_as::<_, TripLog>("SELECT * FROM trip_logs ORDER BY date DESC, id DESC")
            .fetch_all(&mut *self.conn)
            .await
            .map_err(|e| map_db_error(e, "Error listing trip logs"))
    }

    pub async fn find_by_id(&mut self, id: i32) -> AppResult<Option<TripLog>> {
        sqlx::query_as::<_, TripLog>("SELECT * FROM trip_logs WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(|e| map_db_error(e, "Error finding trip log"))
    }

    pub async fn create(&mut self, log: NewTripLog) -> AppResult<TripLog> {
        sqlx::query_as::<_, TripLog>(
            r#"
            INSERT INTO trip_logs (date, route_from, route_to, distance_km, duration_minutes, driver_id, vehicle_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(log.date)
        .bind(log.route_from)
        .bind(log.route_to)
        .bind(log.distance_km)
        .bind(log.duration_minutes)
        .bind(log.driver_id)
        .bind(log.vehicle_id)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| map_db_error(e, "Error creating trip log"))
    }

    pub async fn update(&mut self, log: &TripLog) -> AppResult<TripLog> {
        let updated = sqlx::query_as::<_, TripLog>(
            r#"
            UPDATE trip_logs
            SET date = $2, route_from = $3, route_to = $4, distance_km = $5, duration_minutes = $6,
                driver_id = $7, vehicle_id = $8, version = version + 1
            WHERE id = $1 AND version = $9
            RETURNING *
            "#,
        )
        .bind(log.id)
        .bind(log.date)
        .bind(&log.route_from)
        .bind(&log.route_to)
        .bind(log.distance_km)
        .bind(log.duration_minutes)
        .bind(log.driver_id)
        .bind(log.vehicle_id)
        .bind(log.version)
        .fetch_optional(&mut *self.conn)
        .await
        .map_err(|e| map_db_error(e, "Error updating trip log"))?;

        match updated {
            Some(l) => Ok(l),
            None if self.find_by_id(log.id).await?.is_some() => Err(conflict_error("Log", log.id)),
            None => Err(not_found_error("Log", log.id)),
        }
    }

    pub async fn delete(&mut self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM trip_logs WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await
            .map_err(|e| map_db_error(e, "Error deleting trip log"))?;

        Ok(result.rows_affected() > 0)
    }
}
