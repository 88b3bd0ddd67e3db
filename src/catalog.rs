//! Centers, students and profiles derived from the directory sheet. Every
//! lookup re-reads the whole directory; nothing is cached between calls.

use crate::model::DirectoryRow;
use crate::store::{DirectorySource, StoreError};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(#[from] StoreError),
}

#[derive(Clone)]
pub struct Catalog {
    source: Arc<dyn DirectorySource>,
}

impl Catalog {
    pub fn new(source: Arc<dyn DirectorySource>) -> Self {
        Self { source }
    }

    pub async fn list_centers(&self) -> Result<Vec<String>, CatalogError> {
        let rows = self.source.rows().await?;
        let centers = centers_of(&rows);
        debug!(rows = rows.len(), centers = centers.len(), "centers resolved");
        Ok(centers)
    }

    pub async fn list_students(&self, center: &str) -> Result<Vec<String>, CatalogError> {
        let rows = self.source.rows().await?;
        Ok(students_of(&rows, center))
    }

    pub async fn get_profile(
        &self,
        center: &str,
        student: &str,
    ) -> Result<Option<DirectoryRow>, CatalogError> {
        let rows = self.source.rows().await?;
        Ok(profile_of(&rows, center, student).cloned())
    }
}

/// Distinct center names in first-appearance order.
pub fn centers_of(rows: &[DirectoryRow]) -> Vec<String> {
    let mut centers: Vec<String> = Vec::new();
    for row in rows {
        if !centers.iter().any(|c| *c == row.center_name) {
            centers.push(row.center_name.clone());
        }
    }
    centers
}

/// Students of `center` in sheet order. Duplicates are kept.
pub fn students_of(rows: &[DirectoryRow], center: &str) -> Vec<String> {
    rows.iter()
        .filter(|r| r.center_name == center)
        .map(|r| r.student_name.clone())
        .collect()
}

pub fn profile_of<'a>(
    rows: &'a [DirectoryRow],
    center: &str,
    student: &str,
) -> Option<&'a DirectoryRow> {
    rows.iter()
        .find(|r| r.center_name == center && r.student_name == student)
}
