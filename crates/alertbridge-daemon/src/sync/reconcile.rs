//! Client reconciliation between source and target organizations.

use alertbridge_core::match_organization;
use serde::Serialize;
use tracing::{debug, info};

use super::error::SyncError;
use crate::connectwise::Company;
use crate::slide::Client;
use crate::storage::{ClientMapping, Database, DatabaseError, NewClientMapping};

/// Result of a bulk reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub created: usize,
    pub already_mapped: usize,
    pub unmatched: usize,
}

/// A source organization and its mapping, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingOverview {
    pub source: Client,
    pub mapping: Option<ClientMapping>,
}

/// Maps source organizations to target organizations.
#[derive(Clone)]
pub struct ClientReconciler {
    db: Database,
}

impl ClientReconciler {
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Map every unmapped source organization that has a confident name
    /// match. Existing mappings are never touched.
    pub async fn reconcile_all(
        &self,
        source_orgs: &[Client],
        target_orgs: &[Company],
    ) -> Result<ReconcileSummary, DatabaseError> {
        let mut summary = ReconcileSummary::default();

        for source in source_orgs {
            if self.db.get_client_mapping(&source.id).await?.is_some() {
                summary.already_mapped += 1;
                continue;
            }
            let Some(target) = match_organization(&source.name, target_orgs) else {
                debug!(source_org = %source.name, "No confident match");
                summary.unmatched += 1;
                continue;
            };

            self.db
                .save_client_mapping(&NewClientMapping {
                    source_org_id: source.id.clone(),
                    source_org_name: source.name.clone(),
                    target_org_id: target.id,
                    target_org_name: target.name.clone(),
                })
                .await?;
            info!(
                source_org = %source.name,
                target_org = %target.name,
                target_org_id = target.id,
                "Mapped client"
            );
            summary.created += 1;
        }

        Ok(summary)
    }

    /// Target organization id for a source organization.
    pub async fn get_target_org_id(&self, source_org_id: &str) -> Result<i64, SyncError> {
        self.db
            .get_client_mapping(source_org_id)
            .await?
            .map(|m| m.target_org_id)
            .ok_or_else(|| SyncError::NotMapped(source_org_id.to_string()))
    }

    /// Create or replace a mapping by hand.
    pub async fn create_mapping(
        &self,
        mapping: &NewClientMapping,
    ) -> Result<ClientMapping, DatabaseError> {
        let saved = self.db.save_client_mapping(mapping).await?;
        info!(
            source_org_id = %saved.source_org_id,
            target_org_id = saved.target_org_id,
            "Client mapping saved"
        );
        Ok(saved)
    }

    pub async fn delete_mapping(&self, source_org_id: &str) -> Result<bool, DatabaseError> {
        self.db.delete_client_mapping(source_org_id).await
    }

    pub async fn clear_mappings(&self) -> Result<u64, DatabaseError> {
        let removed = self.db.clear_client_mappings().await?;
        info!(removed, "Client mappings cleared");
        Ok(removed)
    }

    pub async fn list_mappings(&self) -> Result<Vec<ClientMapping>, DatabaseError> {
        self.db.list_client_mappings().await
    }

    /// Pair each source organization with its mapping.
    pub async fn mapping_overview(
        &self,
        source_orgs: &[Client],
    ) -> Result<Vec<MappingOverview>, DatabaseError> {
        let mut overview = Vec::with_capacity(source_orgs.len());
        for source in source_orgs {
            overview.push(MappingOverview {
                mapping: self.db.get_client_mapping(&source.id).await?,
                source: source.clone(),
            });
        }
        Ok(overview)
    }
}
