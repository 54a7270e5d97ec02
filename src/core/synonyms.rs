use std::collections::BTreeMap;

use crate::core::normalize::normalize;

/// Bumped whenever an entry of [`BUILTIN_SYNONYMS`] changes
pub const SYNONYM_TABLE_VERSION: u32 = 1;

/// Canonical clinical concept keys and the name variants accepted for them.
///
/// Order matters: keys are tried top to bottom and, within a key, variants
/// left to right. The first variant found in a product wins.
pub const BUILTIN_SYNONYMS: &[(&str, &[&str])] = &[
    ("hba1c", &["hemoglobin a1c", "a1c", "glycated hemoglobin"]),
    ("lipid panel", &["cholesterol", "lipids", "ldl", "hdl", "triglycerides"]),
    ("thyroid", &["tsh", "t3", "t4", "thyroid stimulating hormone"]),
    ("vitamin d", &["25-oh vitamin d", "vitamin d3", "cholecalciferol"]),
    ("vitamin b12", &["cobalamin", "b12"]),
    ("iron", &["ferritin", "iron panel", "iron studies"]),
    ("cortisol", &["stress hormone", "cortisol"]),
    ("testosterone", &["testosterone", "male hormone"]),
    ("estrogen", &["estradiol", "female hormone"]),
    ("inflammation", &["crp", "c-reactive protein", "inflammatory markers"]),
    ("liver", &["liver function", "alt", "ast", "liver enzymes"]),
    ("kidney", &["creatinine", "kidney function", "egfr"]),
    ("diabetes", &["glucose", "insulin", "diabetes screening"]),
    ("heart", &["cardiovascular", "heart health", "cardiac"]),
    ("hormone", &["hormonal", "endocrine", "hormone panel"]),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymEntry {
    pub key: String,
    pub variants: Vec<String>,
}

/// Lookup table from concept keys to accepted variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymDictionary {
    entries: Vec<SynonymEntry>,
}

impl SynonymDictionary {
    pub fn builtin() -> Self {
        let entries = BUILTIN_SYNONYMS
            .iter()
            .map(|(key, variants)| SynonymEntry {
                key: (*key).to_string(),
                variants: variants.iter().map(|v| (*v).to_string()).collect(),
            })
            .collect();

        Self { entries }
    }

    /// Built-in table plus configured additions
    ///
    /// Variants for an existing key are appended after the built-in ones,
    /// unknown keys become new entries after all built-in keys. Keys and
    /// variants are normalized; empty strings and duplicates are ignored.
    pub fn with_extensions(extra: &BTreeMap<String, Vec<String>>) -> Self {
        let mut dictionary = Self::builtin();

        for (key, variants) in extra {
            let key = normalize(key);
            if key.is_empty() {
                continue;
            }

            let index = match dictionary.entries.iter().position(|e| e.key == key) {
                Some(index) => index,
                None => {
                    dictionary.entries.push(SynonymEntry {
                        key,
                        variants: Vec::new(),
                    });
                    dictionary.entries.len() - 1
                }
            };

            let entry = &mut dictionary.entries[index];
            for variant in variants.iter().map(|v| normalize(v)) {
                if !variant.is_empty() && !entry.variants.contains(&variant) {
                    entry.variants.push(variant);
                }
            }
        }

        dictionary
    }

    /// Entries whose key occurs inside the normalized recommendation name
    pub fn lookup<'a>(&'a self, normalized_name: &'a str) -> impl Iterator<Item = &'a SynonymEntry> + 'a {
        self.entries
            .iter()
            .filter(move |entry| normalized_name.contains(entry.key.as_str()))
    }

    pub fn entries(&self) -> &[SynonymEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SynonymDictionary {
    fn default() -> Self {
        Self::builtin()
    }
}
