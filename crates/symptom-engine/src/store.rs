//! In-memory symptom vocabulary and mapping store.
//!
//! Holds the read-only data loaded at process start and the lazily built
//! [`SynonymTable`]. The table is built on first access, at most once, and
//! cached for the lifetime of the store.
//!
//! ```ignore
//! let files = discover_data_files("data")?;
//! let store = SymptomStore::load(&files);
//!
//! // First call builds the table, later calls return the cached one
//! let table = store.synonym_table();
//! ```

use std::collections::HashMap;
use std::sync::OnceLock;

use symptom_types::{SymptomCode, Vocabulary};

use crate::loader::{
    load_curated_variants, load_disease_names, load_symptom_mapping, load_vocabulary,
};
use crate::normalize::normalize;
use crate::synonym::{build_table, CuratedVariants, SynonymTable};
use crate::types::{DataFiles, SymptomResult};

/// Association between symptom codes, their phrases and disease names.
///
/// The first phrase registered for a code is its display phrase; later
/// phrases are curated synonyms. Codes iterate in first-registration order.
#[derive(Debug, Clone, Default)]
pub struct SymptomMapping {
    entries: Vec<(SymptomCode, Vec<String>)>,
    entry_index: HashMap<SymptomCode, usize>,
    /// Normalized display phrase → code.
    by_phrase: HashMap<String, SymptomCode>,
    /// Disease code → localized display name.
    disease_names: HashMap<String, String>,
}

impl SymptomMapping {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a phrase for a code. Blank phrases are ignored.
    pub fn add_phrase(&mut self, code: SymptomCode, phrase: &str) {
        let phrase = phrase.trim();
        if phrase.is_empty() {
            return;
        }

        self.by_phrase
            .entry(normalize(phrase))
            .or_insert_with(|| code.clone());

        match self.entry_index.get(&code) {
            Some(&i) => self.entries[i].1.push(phrase.to_string()),
            None => {
                self.entry_index.insert(code.clone(), self.entries.len());
                self.entries.push((code, vec![phrase.to_string()]));
            }
        }
    }

    /// Sets the localized display name of a disease code.
    pub fn add_disease_name(&mut self, disease: &str, display_name: &str) {
        self.disease_names
            .insert(disease.trim().to_string(), display_name.trim().to_string());
    }

    /// Returns the display phrase of a code.
    pub fn display_phrase(&self, code: &SymptomCode) -> Option<&str> {
        let &i = self.entry_index.get(code)?;
        self.entries[i].1.first().map(String::as_str)
    }

    /// Returns every phrase of a code, display phrase first.
    pub fn phrases(&self, code: &SymptomCode) -> Option<&[String]> {
        let &i = self.entry_index.get(code)?;
        Some(&self.entries[i].1)
    }

    /// Returns the code whose phrase matches `phrase` after normalization.
    pub fn code_for_phrase(&self, phrase: &str) -> Option<&SymptomCode> {
        self.by_phrase.get(&normalize(phrase))
    }

    /// Returns the display name of a disease, or `disease` itself when unknown.
    pub fn disease_display_name<'a>(&'a self, disease: &'a str) -> &'a str {
        self.disease_names
            .get(disease)
            .map(String::as_str)
            .unwrap_or(disease)
    }

    /// Iterates `(code, phrases)` in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&SymptomCode, &[String])> {
        self.entries
            .iter()
            .map(|(code, phrases)| (code, phrases.as_slice()))
    }

    /// Returns the number of mapped codes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no code has a phrase.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of known disease display names.
    pub fn disease_name_count(&self) -> usize {
        self.disease_names.len()
    }
}

/// Read-only symptom data shared by all requests.
pub struct SymptomStore {
    vocabulary: Vocabulary,
    mapping: SymptomMapping,
    curated: CuratedVariants,
    synonym_table: OnceLock<SynonymTable>,
    display_phrases: OnceLock<Vec<String>>,
}

impl std::fmt::Debug for SymptomStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymptomStore")
            .field("vocabulary", &self.vocabulary.len())
            .field("mapping", &self.mapping.len())
            .field("curated", &self.curated.len())
            .field("synonym_table", &self.synonym_table.get().map(SynonymTable::len))
            .finish()
    }
}

impl Default for SymptomStore {
    fn default() -> Self {
        Self::new(Vocabulary::default(), SymptomMapping::new(), CuratedVariants::new())
    }
}

impl SymptomStore {
    /// Creates a store from already-loaded data.
    pub fn new(vocabulary: Vocabulary, mapping: SymptomMapping, curated: CuratedVariants) -> Self {
        Self {
            vocabulary,
            mapping,
            curated,
            synonym_table: OnceLock::new(),
            display_phrases: OnceLock::new(),
        }
    }

    /// Loads every data file of a discovered file set.
    ///
    /// A missing or unreadable file is logged and replaced by an empty
    /// container; check [`is_ready`](Self::is_ready) afterwards.
    pub fn load(files: &DataFiles) -> Self {
        let codes = load_or_empty("vocabulary", files.vocabulary_file.as_deref(), |p| load_vocabulary(p));
        let vocabulary = Vocabulary::from_codes(codes);

        let mut mapping = SymptomMapping::new();
        let rows = load_or_empty("symptom mapping", files.mapping_file.as_deref(), |p| load_symptom_mapping(p));
        for (code, phrase) in rows {
            mapping.add_phrase(code, &phrase);
        }

        let names = load_or_empty(
            "disease names",
            files.disease_names_file.as_deref(),
            |p| load_disease_names(p),
        );
        for (disease, name) in names {
            mapping.add_disease_name(&disease, &name);
        }

        let curated = load_or_empty(
            "curated variants",
            files.variants_file.as_deref(),
            |p| load_curated_variants(p),
        );

        tracing::info!(
            "Loaded {} vocabulary codes, {} mapped symptoms, {} disease names, {} curated phrases",
            vocabulary.len(),
            mapping.len(),
            mapping.disease_name_count(),
            curated.len()
        );

        Self::new(vocabulary, mapping, curated)
    }

    /// Returns true when both the vocabulary and the mapping are non-empty.
    pub fn is_ready(&self) -> bool {
        !self.vocabulary.is_empty() && !self.mapping.is_empty()
    }

    /// Returns the vocabulary.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Returns the symptom mapping.
    pub fn mapping(&self) -> &SymptomMapping {
        &self.mapping
    }

    /// Returns the synonym table, building it on first use.
    ///
    /// Concurrent first callers block until the single build finishes.
    pub fn synonym_table(&self) -> &SynonymTable {
        self.synonym_table
            .get_or_init(|| build_table(&self.vocabulary, &self.mapping, &self.curated))
    }

    /// Returns true once the synonym table has been built.
    pub fn has_synonym_table(&self) -> bool {
        self.synonym_table.get().is_some()
    }

    /// Display phrases of the vocabulary, in vocabulary order.
    ///
    /// Codes without a phrase fall back to the raw code. Computed on first
    /// use and cached.
    pub fn display_phrases(&self) -> &[String] {
        self.display_phrases.get_or_init(|| {
            self.vocabulary
                .iter()
                .map(|code| {
                    self.mapping
                        .display_phrase(code)
                        .map(str::to_string)
                        .unwrap_or_else(|| code.to_string())
                })
                .collect()
        })
    }
}

fn load_or_empty<T, F>(what: &str, path: Option<&std::path::Path>, load: F) -> T
where
    T: Default,
    F: FnOnce(&std::path::Path) -> SymptomResult<T>,
{
    let Some(path) = path else {
        tracing::warn!("No {} file found, continuing with an empty {}", what, what);
        return T::default();
    };

    match load(path) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Could not load {} from {}: {}", what, path.display(), e);
            T::default()
        }
    }
}
