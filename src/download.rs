use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::manifest::DocumentRecord;
use crate::report::RunReport;
use crate::session::RemoteStore;

/// Structured capture of one per-file failure, reported at end of run and
/// written to the failure ledger. Carries enough context to re-fetch the
/// item manually.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub patient: String,
    pub file: String,
    pub remote_path: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct DownloadOutcome {
    pub success_count: u64,
    pub error_count: u64,
    pub errors: Vec<ErrorRecord>,
}

/// All documents sharing one (last name, first name) pair, in first-seen
/// manifest order.
pub struct PatientGroup<'a> {
    pub last_name: &'a str,
    pub first_name: &'a str,
    pub documents: Vec<&'a DocumentRecord>,
}

impl PatientGroup<'_> {
    pub fn folder_name(&self) -> String {
        folder_name(self.last_name, self.first_name)
    }
}

/// Destination folder for a patient: `"<last>, <first>"` with the separator
/// trimmed away when either part is empty.
pub fn folder_name(last_name: &str, first_name: &str) -> String {
    format!("{}, {}", last_name, first_name)
        .trim_matches(|c| c == ',' || c == ' ')
        .to_string()
}

/// Local file name for a remote path: the final `/`-separated segment. A
/// path with no directory component is returned whole.
pub fn local_file_name(remote_path: &str) -> &str {
    remote_path.rsplit('/').next().unwrap_or(remote_path)
}

/// Partition records into patient groups, preserving the first-seen order
/// of each group and manifest order within a group.
pub fn group_by_patient(documents: &[DocumentRecord]) -> Vec<PatientGroup<'_>> {
    let mut groups: Vec<PatientGroup<'_>> = Vec::new();
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    for doc in documents {
        let key = (doc.last_name.as_str(), doc.first_name.as_str());
        match index.get(&key) {
            Some(&i) => groups[i].documents.push(doc),
            None => {
                index.insert(key, groups.len());
                groups.push(PatientGroup {
                    last_name: &doc.last_name,
                    first_name: &doc.first_name,
                    documents: vec![doc],
                });
            }
        }
    }
    groups
}

/// Copy every document into `<output_root>/<Last>, <First>/<file>`.
///
/// A failed fetch is isolated to its file: it is counted, reported inline
/// and recorded, and the run continues with the next file. Directory
/// creation failures are propagated — without the folder nothing in the
/// group can be written.
pub fn download_documents(
    store: &dyn RemoteStore,
    documents: &[DocumentRecord],
    output_root: &Path,
    report: &RunReport,
) -> Result<DownloadOutcome> {
    std::fs::create_dir_all(output_root)
        .with_context(|| format!("cannot create output directory: {}", output_root.display()))?;

    let mut outcome = DownloadOutcome::default();

    for group in group_by_patient(documents) {
        let folder = group.folder_name();
        let patient_dir = output_root.join(&folder);
        std::fs::create_dir_all(&patient_dir).with_context(|| {
            format!("cannot create patient directory: {}", patient_dir.display())
        })?;

        report.patient_started(&folder, group.documents.len());

        for doc in &group.documents {
            let file_name = local_file_name(&doc.remote_path);
            let local_path = patient_dir.join(file_name);

            match store.fetch(&doc.remote_path, &local_path) {
                Ok(()) => {
                    outcome.success_count += 1;
                    report.file_downloaded(file_name);
                }
                Err(err) => {
                    outcome.error_count += 1;
                    report.file_failed(file_name, &err);
                    outcome.errors.push(ErrorRecord {
                        patient: folder.clone(),
                        file: file_name.to_string(),
                        remote_path: doc.remote_path.clone(),
                        error: err,
                    });
                }
            }
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, last: &str, first: &str, path: &str) -> DocumentRecord {
        DocumentRecord {
            patient_id: id,
            last_name: last.to_string(),
            first_name: first.to_string(),
            document_id: format!("D{}", id),
            description: String::new(),
            remote_path: path.to_string(),
            is_active: "1".to_string(),
        }
    }

    #[test]
    fn folder_name_trims_missing_parts() {
        assert_eq!(folder_name("Smith", "Jane"), "Smith, Jane");
        assert_eq!(folder_name("", "Jane"), "Jane");
        assert_eq!(folder_name("Smith", ""), "Smith");
        assert_eq!(folder_name("", ""), "");
    }

    #[test]
    fn local_file_name_takes_final_segment() {
        assert_eq!(local_file_name("/docs/2024/report.pdf"), "report.pdf");
        assert_eq!(local_file_name("report.pdf"), "report.pdf");
        assert_eq!(local_file_name("/report.pdf"), "report.pdf");
    }

    #[test]
    fn grouping_preserves_first_seen_and_row_order() {
        let docs = vec![
            record(1, "Smith", "Jane", "/a/1.pdf"),
            record(2, "Doe", "John", "/a/2.pdf"),
            record(1, "Smith", "Jane", "/a/3.pdf"),
        ];
        let groups = group_by_patient(&docs);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].last_name, "Smith");
        assert_eq!(groups[0].documents.len(), 2);
        assert_eq!(groups[0].documents[0].remote_path, "/a/1.pdf");
        assert_eq!(groups[0].documents[1].remote_path, "/a/3.pdf");
        assert_eq!(groups[1].last_name, "Doe");
    }
}
