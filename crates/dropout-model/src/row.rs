use serde::{Deserialize, Serialize};

use crate::features::StudyFeatures;
use crate::ids::StudyId;
use crate::response::StudyResponse;
use crate::schema::TableSchema;
use crate::vocabulary::Vocabularies;

/// One study's features joined with its response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelingRow {
    pub study_id: StudyId,
    pub features: StudyFeatures,
    pub response: StudyResponse,
}

/// The assembled output of a pipeline run, ordered by study id.
///
/// Built once per run and not mutated afterwards. An empty table is a valid
/// outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelingTable {
    pub schema: TableSchema,
    pub vocabularies: Vocabularies,
    pub rows: Vec<ModelingRow>,
}

impl ModelingTable {
    pub fn new(vocabularies: Vocabularies, rows: Vec<ModelingRow>) -> Self {
        Self {
            schema: TableSchema::for_vocabularies(&vocabularies),
            vocabularies,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, study_id: &str) -> Option<&ModelingRow> {
        self.rows
            .iter()
            .find(|row| row.study_id.as_str() == study_id)
    }
}
