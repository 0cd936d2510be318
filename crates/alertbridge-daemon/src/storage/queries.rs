//! Mapping queries for the alertbridge daemon.

use alertbridge_core::db::unix_timestamp;

use super::db::{Database, DatabaseError};
use super::models::{AlertTicketMapping, ClientMapping, NewClientMapping};

impl Database {
    // =========================================================================
    // Client mapping queries
    // =========================================================================

    /// Get the mapping for a source organization, if any.
    pub async fn get_client_mapping(
        &self,
        source_org_id: &str,
    ) -> Result<Option<ClientMapping>, DatabaseError> {
        let mapping = sqlx::query_as::<_, ClientMapping>(
            "SELECT * FROM client_mappings WHERE source_org_id = ?",
        )
        .bind(source_org_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(mapping)
    }

    /// Create or fully replace the mapping for a source organization.
    pub async fn save_client_mapping(
        &self,
        mapping: &NewClientMapping,
    ) -> Result<ClientMapping, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO client_mappings (source_org_id, source_org_name, target_org_id, target_org_name, created_at) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT(source_org_id) DO UPDATE SET source_org_name = excluded.source_org_name, \
             target_org_id = excluded.target_org_id, target_org_name = excluded.target_org_name, \
             created_at = excluded.created_at",
        )
        .bind(&mapping.source_org_id)
        .bind(&mapping.source_org_name)
        .bind(mapping.target_org_id)
        .bind(&mapping.target_org_name)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_client_mapping(&mapping.source_org_id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("ClientMapping {}", mapping.source_org_id)))
    }

    /// Delete the mapping for a source organization.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete_client_mapping(&self, source_org_id: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM client_mappings WHERE source_org_id = ?")
            .bind(source_org_id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete every client mapping. Returns the number of rows removed.
    pub async fn clear_client_mappings(&self) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM client_mappings")
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected())
    }

    /// List all client mappings ordered by source organization name.
    pub async fn list_client_mappings(&self) -> Result<Vec<ClientMapping>, DatabaseError> {
        let mappings = sqlx::query_as::<_, ClientMapping>(
            "SELECT * FROM client_mappings ORDER BY source_org_name ASC",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(mappings)
    }

    // =========================================================================
    // Alert-ticket mapping queries
    // =========================================================================

    /// Get the ticket mapping for an alert, if any.
    pub async fn get_alert_ticket_mapping(
        &self,
        alert_id: &str,
    ) -> Result<Option<AlertTicketMapping>, DatabaseError> {
        let mapping = sqlx::query_as::<_, AlertTicketMapping>(
            "SELECT * FROM alert_ticket_mappings WHERE alert_id = ?",
        )
        .bind(alert_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(mapping)
    }

    /// Record the ticket opened for an alert.
    ///
    /// Fails with [`DatabaseError::Duplicate`] if the alert already has a mapping.
    pub async fn save_alert_ticket_mapping(
        &self,
        alert_id: &str,
        ticket_id: i64,
    ) -> Result<AlertTicketMapping, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO alert_ticket_mappings (alert_id, ticket_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(alert_id)
        .bind(ticket_id)
        .bind(now)
        .execute(self.pool())
        .await?;

        Ok(AlertTicketMapping {
            alert_id: alert_id.to_string(),
            ticket_id,
            created_at: now,
            closed_at: None,
        })
    }

    /// Stamp `closed_at` on an alert's mapping. An existing stamp is kept.
    ///
    /// Returns `true` if the alert has a mapping.
    pub async fn mark_alert_ticket_mapping_closed(
        &self,
        alert_id: &str,
    ) -> Result<bool, DatabaseError> {
        let now = unix_timestamp();

        let result = sqlx::query(
            "UPDATE alert_ticket_mappings SET closed_at = COALESCE(closed_at, ?) WHERE alert_id = ?",
        )
        .bind(now)
        .bind(alert_id)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Clear `closed_at` so the closure sync looks at the ticket again.
    ///
    /// Returns `true` if the alert has a mapping.
    pub async fn reset_alert_ticket_mapping(&self, alert_id: &str) -> Result<bool, DatabaseError> {
        let result =
            sqlx::query("UPDATE alert_ticket_mappings SET closed_at = NULL WHERE alert_id = ?")
                .bind(alert_id)
                .execute(self.pool())
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List mappings whose ticket is still considered open, oldest first.
    pub async fn list_open_alert_ticket_mappings(
        &self,
    ) -> Result<Vec<AlertTicketMapping>, DatabaseError> {
        let mappings = sqlx::query_as::<_, AlertTicketMapping>(
            "SELECT * FROM alert_ticket_mappings WHERE closed_at IS NULL ORDER BY created_at ASC, alert_id ASC",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(mappings)
    }

    /// List the most recent mappings, newest first.
    pub async fn list_alert_ticket_mappings(
        &self,
        limit: u32,
    ) -> Result<Vec<AlertTicketMapping>, DatabaseError> {
        let mappings = sqlx::query_as::<_, AlertTicketMapping>(
            "SELECT * FROM alert_ticket_mappings ORDER BY created_at DESC, alert_id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(mappings)
    }

    /// Count mappings with no `closed_at` stamp.
    pub async fn count_open_alert_ticket_mappings(&self) -> Result<i64, DatabaseError> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM alert_ticket_mappings WHERE closed_at IS NULL")
                .fetch_one(self.pool())
                .await?;

        Ok(row.0)
    }
}
