//! Data file discovery and loading.
//!
//! A data directory holds:
//!
//! | file                   | format                        |
//! |------------------------|-------------------------------|
//! | `symptom_list.txt`     | one symptom code per line     |
//! | `symptom_mapping.csv`  | `code,phrase`                 |
//! | `symptom_variants.csv` | `phrase,variant`              |
//! | `disease_names.csv`    | `disease,display_name`        |
//! | `model.json`           | random-forest artifact        |

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use symptom_types::SymptomCode;

use crate::synonym::CuratedVariants;
use crate::types::{DataFiles, SymptomError, SymptomResult};

/// File name of the ordered vocabulary.
pub const VOCABULARY_FILE: &str = "symptom_list.txt";
/// File name of the symptom phrase mapping.
pub const MAPPING_FILE: &str = "symptom_mapping.csv";
/// File name of the curated variants.
pub const VARIANTS_FILE: &str = "symptom_variants.csv";
/// File name of the disease display names.
pub const DISEASE_NAMES_FILE: &str = "disease_names.csv";
/// File name of the classifier artifact.
pub const MODEL_FILE: &str = "model.json";

/// Discovers data files in a directory.
///
/// Files that are absent are left as `None`; only a missing directory is an
/// error.
pub fn discover_data_files<P: AsRef<Path>>(path: P) -> SymptomResult<DataFiles> {
    let path = path.as_ref();

    if !path.is_dir() {
        return Err(SymptomError::DirectoryNotFound {
            path: path.display().to_string(),
        });
    }

    let mut files = DataFiles::new();

    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let filename = entry.file_name();
        let slot = match filename.to_string_lossy().as_ref() {
            VOCABULARY_FILE => &mut files.vocabulary_file,
            MAPPING_FILE => &mut files.mapping_file,
            VARIANTS_FILE => &mut files.variants_file,
            DISEASE_NAMES_FILE => &mut files.disease_names_file,
            MODEL_FILE => &mut files.model_file,
            _ => continue,
        };
        *slot = Some(entry.path());
    }

    Ok(files)
}

/// Reads the ordered vocabulary: one code per non-blank line.
pub fn load_vocabulary<P: AsRef<Path>>(path: P) -> SymptomResult<Vec<SymptomCode>> {
    let reader = BufReader::new(open(path.as_ref())?);
    let mut codes = Vec::new();

    for line in reader.lines() {
        let line = line?;
        // Handle UTF-8 BOM at start of file
        let code = line.trim().trim_start_matches('\u{feff}');
        if !code.is_empty() {
            codes.push(SymptomCode::new(code));
        }
    }

    Ok(codes)
}

/// Reads `code,phrase` rows in file order.
pub fn load_symptom_mapping<P: AsRef<Path>>(path: P) -> SymptomResult<Vec<(SymptomCode, String)>> {
    let rows = read_pairs(path.as_ref(), "code", "phrase")?;
    Ok(rows
        .into_iter()
        .map(|(code, phrase)| (SymptomCode::new(code), phrase))
        .collect())
}

/// Reads `phrase,variant` rows into curated variants.
pub fn load_curated_variants<P: AsRef<Path>>(path: P) -> SymptomResult<CuratedVariants> {
    let mut curated = CuratedVariants::new();
    for (phrase, variant) in read_pairs(path.as_ref(), "phrase", "variant")? {
        curated.insert(&phrase, &variant);
    }
    Ok(curated)
}

/// Reads `disease,display_name` rows.
pub fn load_disease_names<P: AsRef<Path>>(path: P) -> SymptomResult<Vec<(String, String)>> {
    read_pairs(path.as_ref(), "disease", "display_name")
}

fn open(path: &Path) -> SymptomResult<File> {
    if !path.exists() {
        return Err(SymptomError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    Ok(File::open(path)?)
}

/// Reads two named columns from a headed CSV file, skipping blank rows.
fn read_pairs(path: &Path, first: &str, second: &str) -> SymptomResult<Vec<(String, String)>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(open(path)?);

    let headers = reader.headers()?.clone();
    let first_col = column_position(&headers, first, path)?;
    let second_col = column_position(&headers, second, path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let a = record.get(first_col).unwrap_or("");
        let b = record.get(second_col).unwrap_or("");
        if a.is_empty() || b.is_empty() {
            continue;
        }
        rows.push((a.to_string(), b.to_string()));
    }

    Ok(rows)
}

fn column_position(headers: &StringRecord, column: &str, path: &Path) -> SymptomResult<usize> {
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}') == column)
        .ok_or_else(|| SymptomError::MissingColumn {
            column: column.to_string(),
            path: path.display().to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        let mut file = File::create(dir.join(name)).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn test_discover_data_files() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), VOCABULARY_FILE, "a\n");
        write_file(dir.path(), MAPPING_FILE, "code,phrase\n");
        write_file(dir.path(), "notes.md", "ignored");

        let files = discover_data_files(dir.path()).unwrap();
        assert!(files.has_required_files());
        assert!(files.model_file.is_none());
        assert!(files.variants_file.is_none());
    }

    #[test]
    fn test_discover_missing_directory() {
        let err = discover_data_files("/definitely/not/here").unwrap_err();
        assert!(matches!(err, SymptomError::DirectoryNotFound { .. }));
    }

    #[test]
    fn test_load_vocabulary_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), VOCABULARY_FILE, "\u{feff}sot\n\n  ho \ndau_dau\n");

        let codes = load_vocabulary(dir.path().join(VOCABULARY_FILE)).unwrap();
        let codes: Vec<&str> = codes.iter().map(SymptomCode::as_str).collect();
        assert_eq!(codes, vec!["sot", "ho", "dau_dau"]);
    }

    #[test]
    fn test_load_symptom_mapping() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            MAPPING_FILE,
            "code,phrase\nHEAD_PAIN,đau đầu\nFEVER, sốt \nFEVER,\n",
        );

        let rows = load_symptom_mapping(dir.path().join(MAPPING_FILE)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], (SymptomCode::new("FEVER"), "sốt".to_string()));
    }

    #[test]
    fn test_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), DISEASE_NAMES_FILE, "disease,name\nflu,Cúm\n");

        let err = load_disease_names(dir.path().join(DISEASE_NAMES_FILE)).unwrap_err();
        assert!(matches!(err, SymptomError::MissingColumn { ref column, .. } if column == "display_name"));
    }

    #[test]
    fn test_load_curated_variants() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), VARIANTS_FILE, "phrase,variant\nĐau đầu,nhức đầu\nđau đầu,dau dau\n");

        let curated = load_curated_variants(dir.path().join(VARIANTS_FILE)).unwrap();
        assert_eq!(curated.get("đau đầu").unwrap().len(), 2);
    }

    #[test]
    fn test_file_not_found() {
        let err = load_vocabulary("/no/such/symptom_list.txt").unwrap_err();
        assert!(matches!(err, SymptomError::FileNotFound { .. }));
    }
}
