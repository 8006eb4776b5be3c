//! Passage entity - an immutable chunk of source-document text
//!
//! Owned entirely by the offline ingestion job and the vector index; the
//! pipeline reads passages through the similarity-search query only.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "passages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Source document identifier
    #[sea_orm(column_type = "Text")]
    pub source: String,

    /// Position within the source document
    pub page: i32,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// pgvector embedding stored as text for SeaORM compatibility.
    /// Actual vector operations run via raw SQL.
    #[sea_orm(column_type = "Text", nullable)]
    pub embedding: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Parse embedding from stored text format to Vec<f32>
    pub fn parse_embedding(&self) -> Option<Vec<f32>> {
        self.embedding.as_ref().and_then(|s| {
            // Format: "[1.0,2.0,3.0,...]"
            let inner = s.trim_start_matches('[').trim_end_matches(']');
            inner
                .split(',')
                .map(|v| v.trim().parse::<f32>().ok())
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_embedding() {
        let passage = Model {
            id: Uuid::new_v4(),
            source: "guide.pdf".to_string(),
            page: 3,
            content: "text".to_string(),
            embedding: Some("[0.5, -1.25, 2.0]".to_string()),
            created_at: chrono::Utc::now().into(),
        };

        assert_eq!(passage.parse_embedding(), Some(vec![0.5, -1.25, 2.0]));
    }

    #[test]
    fn test_parse_embedding_missing() {
        let passage = Model {
            id: Uuid::new_v4(),
            source: "guide.pdf".to_string(),
            page: 0,
            content: "text".to_string(),
            embedding: None,
            created_at: chrono::Utc::now().into(),
        };

        assert_eq!(passage.parse_embedding(), None);
    }
}
