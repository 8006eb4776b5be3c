//! Memory entry entity - one persisted conversational turn
//!
//! Rows are append-only: the pipeline inserts them after a successful
//! generation and never updates or deletes them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Who produced a conversational turn
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryRole {
    User,
    Assistant,
    System,
}

impl From<String> for MemoryRole {
    fn from(s: String) -> Self {
        match s.as_str() {
            "user" => MemoryRole::User,
            "assistant" => MemoryRole::Assistant,
            "system" => MemoryRole::System,
            _ => MemoryRole::User,
        }
    }
}

impl From<MemoryRole> for String {
    fn from(role: MemoryRole) -> Self {
        match role {
            MemoryRole::User => "user".to_string(),
            MemoryRole::Assistant => "assistant".to_string(),
            MemoryRole::System => "system".to_string(),
        }
    }
}

/// Memory tier - always `short` in practice, reserved for future tiering
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryTier {
    #[default]
    Short,
    Long,
}

impl From<String> for MemoryTier {
    fn from(s: String) -> Self {
        match s.as_str() {
            "long" => MemoryTier::Long,
            _ => MemoryTier::Short,
        }
    }
}

impl From<MemoryTier> for String {
    fn from(tier: MemoryTier) -> Self {
        match tier {
            MemoryTier::Short => "short".to_string(),
            MemoryTier::Long => "long".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "memories")]
pub struct Model {
    /// UUIDv7, assigned at creation. Time-ordered ids break created_at
    /// ties in insertion order.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Absent means anonymous/global scope
    pub user_id: Option<Uuid>,

    #[sea_orm(column_type = "Text")]
    pub role: String,

    #[sea_orm(column_type = "Text")]
    pub memory_type: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    pub created_at: DateTimeWithTimeZone,

    /// Unused by any read path; reserved
    pub last_accessed: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Get the role as an enum
    pub fn memory_role(&self) -> MemoryRole {
        MemoryRole::from(self.role.clone())
    }

    /// Get the tier as an enum
    pub fn memory_tier(&self) -> MemoryTier {
        MemoryTier::from(self.memory_type.clone())
    }
}
