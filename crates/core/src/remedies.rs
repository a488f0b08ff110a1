//! Disease/remedy dataset types and loading.
//!
//! Each row maps a free-text disease/symptom description to a herbal
//! treatment. Records are immutable once loaded; the symptom matcher scans
//! them in dataset order.

use crate::catalog::{HeaderIndex, Row};
use crate::error::{StoreError, StoreResult};
use std::path::Path;

/// One disease/symptom-to-herbal-treatment mapping entry.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RemedyRecord {
    pub id: String,
    /// Free-text symptom description; the haystack the matcher scans.
    pub disease_label: String,
    pub herbal_plant: String,
    pub preparation_method: String,
    pub dosage: String,
    pub possible_reactions: String,
}

const COL_ID: &str = "Plant ID";
const COL_DISEASE: &str = "Disease/Symptomes";
const COL_PLANT: &str = "Herbal plant";
const COL_PREPARATION: &str = "Preparation method";
const COL_DOSAGE: &str = "Dosage";
const COL_REACTIONS: &str = "Possible Reactions";

/// Loads the disease/remedy dataset from a CSV file.
///
/// # Errors
///
/// Returns a dataset `StoreError` if the file cannot be read, a required
/// column is missing, any row is malformed (reported with its line number),
/// or the file contains no data rows. The batch is rejected as a whole;
/// no partial record list is ever returned.
pub fn load_remedy_records(path: &Path) -> StoreResult<Vec<RemedyRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| StoreError::DatasetRead {
            path: path.to_path_buf(),
            source,
        })?;

    let headers = reader
        .headers()
        .map_err(|source| StoreError::DatasetRead {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    let fields = HeaderIndex::new(path, &headers);

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| StoreError::DatasetRead {
            path: path.to_path_buf(),
            source,
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row = Row {
            path,
            line,
            record: &record,
            fields: &fields,
        };

        records.push(RemedyRecord {
            id: row.required(COL_ID)?.to_owned(),
            disease_label: row.required(COL_DISEASE)?.to_owned(),
            herbal_plant: row.required(COL_PLANT)?.to_owned(),
            preparation_method: row.required(COL_PREPARATION)?.to_owned(),
            dosage: row.required(COL_DOSAGE)?.to_owned(),
            possible_reactions: row.required(COL_REACTIONS)?.to_owned(),
        });
    }

    if records.is_empty() {
        return Err(StoreError::DatasetEmpty {
            path: path.to_path_buf(),
        });
    }

    tracing::debug!(count = records.len(), "loaded remedy dataset");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const REMEDIES_CSV: &str = "\
Plant ID,Disease/Symptomes,Herbal plant,Preparation method,Dosage,Possible Reactions,Image URL
R1,cough and cold,Tulsi,Boil leaves in water,Twice daily,None known,https://img/r1
R2,fever,Giloy,Crush stem and boil,Once daily,Mild nausea,
";

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_remedy_records() {
        let file = write_csv(REMEDIES_CSV);
        let records = load_remedy_records(file.path()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].disease_label, "cough and cold");
        assert_eq!(records[1].herbal_plant, "Giloy");
    }

    #[test]
    fn test_blank_disease_cell_rejects_batch() {
        let csv = "\
Plant ID,Disease/Symptomes,Herbal plant,Preparation method,Dosage,Possible Reactions
R1,,Tulsi,Boil,Twice daily,None
";
        let file = write_csv(csv);
        match load_remedy_records(file.path()).unwrap_err() {
            StoreError::DatasetRow { line, reason, .. } => {
                assert_eq!(line, 2);
                assert!(reason.contains("Disease/Symptomes"));
            }
            other => panic!("expected DatasetRow, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_file_rejected() {
        let csv = "Plant ID,Disease/Symptomes,Herbal plant,Preparation method,Dosage,Possible Reactions\n";
        let file = write_csv(csv);
        assert!(matches!(
            load_remedy_records(file.path()),
            Err(StoreError::DatasetEmpty { .. })
        ));
    }
}
