use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// One parsed manifest row. Immutable once built; the orchestrator only
/// reads these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    pub patient_id: u64,
    pub last_name: String,
    pub first_name: String,
    pub document_id: String,
    pub description: String,
    pub remote_path: String,
    pub is_active: String,
}

// Raw CSV row keyed by the manifest's exact header names. `Internal ID` is
// read as text so a bad value can be reported with its row number instead of
// as an opaque deserialize error.
#[derive(Debug, Deserialize)]
struct ManifestRow {
    #[serde(rename = "Internal ID")]
    internal_id: String,
    #[serde(rename = "Patient Last Name")]
    last_name: String,
    #[serde(rename = "Patient First Name")]
    first_name: String,
    #[serde(rename = "Document ID")]
    document_id: String,
    #[serde(rename = "Description")]
    description: String,
    #[serde(rename = "Path")]
    path: String,
    #[serde(rename = "IsActive")]
    is_active: String,
}

/// Parse the document manifest, preserving row order.
///
/// When `patient_ids` is given, only rows whose `Internal ID` is in the set
/// are kept; `None` keeps every row. The existence check runs before any
/// parsing so a missing manifest surfaces as `ManifestNotFound` rather than
/// a CSV error.
pub fn parse_manifest(
    path: &Path,
    patient_ids: Option<&HashSet<u64>>,
) -> Result<Vec<DocumentRecord>> {
    if !path.exists() {
        return Err(crate::ExtractError::ManifestNotFound(path.to_path_buf()).into());
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("cannot open manifest: {}", path.display()))?;

    let mut documents = Vec::new();
    for (idx, row) in reader.deserialize::<ManifestRow>().enumerate() {
        // Row numbers are 1-based and count the header line.
        let row_no = idx + 2;
        let row = row.with_context(|| format!("manifest row {} is malformed", row_no))?;

        let patient_id: u64 = row.internal_id.trim().parse().map_err(|_| -> anyhow::Error {
            crate::ExtractError::InvalidPatientId { row: row_no, value: row.internal_id.clone() }
                .into()
        })?;

        if let Some(ids) = patient_ids
            && !ids.contains(&patient_id)
        {
            continue;
        }

        documents.push(DocumentRecord {
            patient_id,
            last_name: row.last_name.trim().to_string(),
            first_name: row.first_name.trim().to_string(),
            document_id: row.document_id,
            description: row.description,
            remote_path: row.path,
            is_active: row.is_active,
        });
    }

    Ok(documents)
}
