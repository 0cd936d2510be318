//! Database queries for the `ticketing_config` table.

use alertbridge_core::db::unix_timestamp;

use super::db::{Database, DatabaseError};
use super::models::{TicketingConfig, TicketingConfigParams};

impl Database {
    // =========================================================================
    // Ticketing config queries
    // =========================================================================

    /// Get the active ticketing configuration (most recently updated row).
    pub async fn get_ticketing_config(&self) -> Result<Option<TicketingConfig>, DatabaseError> {
        let config = sqlx::query_as::<_, TicketingConfig>(
            "SELECT * FROM ticketing_config ORDER BY updated_at DESC, id DESC LIMIT 1",
        )
        .fetch_optional(self.pool())
        .await?;

        Ok(config)
    }

    /// Save a new ticketing configuration, which becomes the active one.
    pub async fn save_ticketing_config(
        &self,
        params: &TicketingConfigParams,
    ) -> Result<TicketingConfig, DatabaseError> {
        let now = unix_timestamp();

        let result = sqlx::query(
            "INSERT INTO ticketing_config (board_id, board_name, status_id, status_name, \
             priority_id, priority_name, type_id, type_name, ticket_summary, ticket_template, \
             auto_assign_tech, technician_id, technician_name, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(params.board_id)
        .bind(&params.board_name)
        .bind(params.status_id)
        .bind(&params.status_name)
        .bind(params.priority_id)
        .bind(&params.priority_name)
        .bind(params.type_id)
        .bind(&params.type_name)
        .bind(params.summary_or_default())
        .bind(params.template_or_default())
        .bind(params.auto_assign_tech)
        .bind(params.technician_id)
        .bind(params.technician_name.as_deref())
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        let id = result.last_insert_rowid();
        sqlx::query_as::<_, TicketingConfig>("SELECT * FROM ticketing_config WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("TicketingConfig {id}")))
    }

    /// Delete every stored ticketing configuration.
    pub async fn delete_ticketing_config(&self) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM ticketing_config")
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected())
    }
}
