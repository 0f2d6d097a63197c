use sqlx::PgConnection;

use super::map_db_error;
use crate::models::{Issue, IssueDetails, IssueStatus, NewIssue};
use crate::utils::errors::AppResult;

pub struct IssueRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> IssueRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn list_with_details(&mut self) -> AppResult<Vec<IssueDetails>> {
        sqlx::query_as::<_, IssueDetails>(
            r#"
            SELECT i.*, v.license_plate AS vehicle_license_plate, d.last_name AS driver_last_name
            FROM issues i
            LEFT JOIN vehicles v ON v.id = i.vehicle_id
            LEFT JOIN drivers d ON d.id = i.driver_id
            ORDER BY i.created_at DESC, i.id DESC
            "#,
        )
        .fetch_all(&mut *self.conn)
        .await
        .map_err(|e| map_db_error(e, "Error listing issues"))
    }

    pub async fn find_by_id(&mut self, id: i32) -> AppResult<Option<Issue>> {
        sqlx::query_as::<_, Issue>("SELECT * FROM issues WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(|e| map_db_error(e, "Error finding issue"))
    }

    pub async fn lock_by_id(&mut self, id: i32) -> AppResult<Option<Issue>> {
        sqlx::query_as::<_, Issue>("SELECT * FROM issues WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(|e| map_db_error(e, "Error locking issue"))
    }

    pub async fn create(&mut self, issue: NewIssue) -> AppResult<Issue> {
        sqlx::query_as::<_, Issue>(
            r#"
            INSERT INTO issues (title, description, priority, status, vehicle_id, driver_id)
            VALUES ($1, $2, $3, 'reported', $4, $5)
            RETURNING *
            "#,
        )
        .bind(issue.title)
        .bind(issue.description)
        .bind(issue.priority)
        .bind(issue.vehicle_id)
        .bind(issue.driver_id)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| map_db_error(e, "Error creating issue"))
    }

    pub async fn update_status(&mut self, id: i32, status: IssueStatus) -> AppResult<()> {
        sqlx::query("UPDATE issues SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&mut *self.conn)
            .await
            .map_err(|e| map_db_error(e, "Error updating issue status"))?;

        Ok(())
    }

    pub async fn find_by_driver(&mut self, driver_id: i32) -> AppResult<Vec<Issue>> {
        sqlx::query_as::<_, Issue>("SELECT * FROM issues WHERE driver_id = $1 ORDER BY id")
            .bind(driver_id)
            .fetch_all(&mut *self.conn)
            .await
            .map_err(|e| map_db_error(e, "Error listing driver issues"))
    }

    pub async fn count_by_vehicle_and_status(
        &mut self,
        vehicle_id: i32,
        status: IssueStatus,
    ) -> AppResult<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM issues WHERE vehicle_id = $1 AND status = $2")
                .bind(vehicle_id)
                .bind(status)
                .fetch_one(&mut *self.conn)
                .await
                .map_err(|e| map_db_error(e, "Error counting vehicle issues"))?;

        Ok(count)
    }
}
