//! Lesson path resolver
//!
//! Maps a `(lessonId, moduleId)` pair to the storage path of its JSON document.
//! Resolution is pure and total: some combination of tables always yields a
//! path, and a path that points nowhere surfaces later as a load failure.
//!
//! **Algorithm:**
//! 1. Direct lessonId override (exact match wins unconditionally)
//! 2. Module folder from the module table, falling back to the default folder
//!    when the result does not carry the module prefix
//! 3. Verbatim folders: `<prefix>/<folder>/<lessonId>.json`
//! 4. File name from the slug alias table, else `lesson-<NN>-<slug>.json`
//! 5. `module-03` folders route into a sub-category folder when the slug
//!    matches one
//! 6. Default: `<prefix>/<folder>/<file name>`

use std::collections::{BTreeMap, BTreeSet};
use vlp_common::config::PathsConfig;

/// Folder prefix of the module tree with sub-category routing
const CATEGORIZED_MODULE: &str = "module-03";

const PATHOLOGY_CATEGORY: &str = "pathology-protocols";
const PROTECTIVE_CATEGORY: &str = "protective-strategies";
const WEANING_CATEGORY: &str = "weaning";

/// Keyword tables checked in order; the first category with a hit wins
const CATEGORY_KEYWORDS: [(&str, &[&str]); 3] = [
    (
        PATHOLOGY_CATEGORY,
        &[
            "ards",
            "copd",
            "asthma",
            "pneumonia",
            "fibrosis",
            "pathology",
            "obstructive",
            "restrictive",
        ],
    ),
    (
        PROTECTIVE_CATEGORY,
        &[
            "protective",
            "peep",
            "recruitment",
            "prone",
            "driving-pressure",
            "low-tidal",
        ],
    ),
    (
        WEANING_CATEGORY,
        &[
            "weaning",
            "extubation",
            "sbt",
            "liberation",
            "spontaneous-breathing",
        ],
    ),
];

/// Resolution tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTables {
    pub prefix: String,
    pub module_prefix: String,
    pub default_module_folder: String,
    pub lesson_overrides: BTreeMap<String, String>,
    pub slug_aliases: BTreeMap<String, String>,
    pub module_folders: BTreeMap<String, String>,
    pub verbatim_folders: BTreeSet<String>,
    pub category_overrides: BTreeMap<String, String>,
}

fn table(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl PathTables {
    /// Compiled snapshot of the curriculum tables
    pub fn snapshot() -> Self {
        Self {
            prefix: "lessons".to_string(),
            module_prefix: "module-".to_string(),
            default_module_folder: "module-01-fundamentals".to_string(),
            lesson_overrides: table(&[
                (
                    "anatomy-overview",
                    "lessons/module-01-fundamentals/lesson-01-respiratory-anatomy.json",
                ),
                (
                    "respiratory-physiology",
                    "lessons/module-01-fundamentals/lesson-02-respiratory-mechanics.json",
                ),
                (
                    "ventilator-components",
                    "lessons/module-02-ventilation-principles/lesson-01-ventilator-components.json",
                ),
            ]),
            slug_aliases: table(&[
                ("gas-exchange", "lesson-03-gas-exchange.json"),
                ("respiratory-mechanics", "lesson-02-respiratory-mechanics.json"),
                ("volume-control", "lesson-02-volume-controlled-ventilation.json"),
                ("pressure-control", "lesson-03-pressure-controlled-ventilation.json"),
                ("basic-modes", "lesson-01-ventilation-modes.json"),
            ]),
            module_folders: table(&[
                ("module-01", "module-01-fundamentals"),
                ("fundamentals", "module-01-fundamentals"),
                ("module-02", "module-02-ventilation-principles"),
                ("ventilation-principles", "module-02-ventilation-principles"),
                ("module-03", "module-03-configuration"),
                ("clinical-configuration", "module-03-configuration"),
                ("module-04", "module-04-monitoring"),
                ("module-05", "module-05-clinical-cases"),
            ]),
            verbatim_folders: ["module-05-clinical-cases".to_string()].into_iter().collect(),
            category_overrides: table(&[
                ("ards-protocol", PATHOLOGY_CATEGORY),
                ("copd-management", PATHOLOGY_CATEGORY),
                ("open-lung-approach", PROTECTIVE_CATEGORY),
                ("sbt-protocol", WEANING_CATEGORY),
            ]),
        }
    }

    /// Merge configured tables over these
    pub fn with_overrides(mut self, config: &PathsConfig) -> Self {
        if let Some(prefix) = &config.prefix {
            self.prefix = prefix.clone();
        }
        if let Some(module_prefix) = &config.module_prefix {
            self.module_prefix = module_prefix.clone();
        }
        if let Some(folder) = &config.default_module_folder {
            self.default_module_folder = folder.clone();
        }
        self.lesson_overrides
            .extend(config.lesson_overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.slug_aliases
            .extend(config.slug_aliases.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.module_folders
            .extend(config.module_folders.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.verbatim_folders
            .extend(config.verbatim_folders.iter().cloned());
        self.category_overrides
            .extend(config.category_overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }
}

impl Default for PathTables {
    fn default() -> Self {
        Self::snapshot()
    }
}

/// Split `lesson-<NN>-<slug>` into its number and slug
///
/// Ids without the numeric prefix come back whole as the slug.
pub fn split_lesson_id(lesson_id: &str) -> (Option<&str>, &str) {
    if let Some(rest) = lesson_id.strip_prefix("lesson-") {
        if let Some((number, slug)) = rest.split_once('-') {
            if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) {
                return (Some(number), slug);
            }
        }
    }
    (None, lesson_id)
}

/// Lesson path resolver
#[derive(Debug, Clone, Default)]
pub struct LessonPathResolver {
    tables: PathTables,
}

impl LessonPathResolver {
    pub fn new(tables: PathTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &PathTables {
        &self.tables
    }

    /// Resolve the storage path of a lesson document
    pub fn resolve(&self, lesson_id: &str, module_id: &str) -> String {
        let tables = &self.tables;

        // Step 1: Direct override
        if let Some(path) = tables.lesson_overrides.get(lesson_id) {
            return path.clone();
        }

        let (number, slug) = split_lesson_id(lesson_id);
        let folder = self.module_folder(module_id);

        // Step 2: Folders named after the lessonId verbatim
        if tables.verbatim_folders.contains(folder) {
            return format!("{}/{}/{}.json", tables.prefix, folder, lesson_id);
        }

        // Step 3: File name
        let file_name = match (tables.slug_aliases.get(slug), number) {
            (Some(alias), _) => alias.clone(),
            (None, Some(number)) => format!("lesson-{}-{}.json", number, slug),
            (None, None) => format!("{}.json", slug),
        };

        // Step 4: Sub-category routing
        if folder.starts_with(CATEGORIZED_MODULE) {
            if let Some(category) = self.category_for(slug) {
                return format!("{}/{}/{}/{}", tables.prefix, folder, category, file_name);
            }
        }

        format!("{}/{}/{}", tables.prefix, folder, file_name)
    }

    /// Folder of a module, with fallback to the default folder
    pub fn module_folder<'a>(&'a self, module_id: &'a str) -> &'a str {
        let folder = self
            .tables
            .module_folders
            .get(module_id)
            .map(String::as_str)
            .unwrap_or(module_id);

        if folder.starts_with(&self.tables.module_prefix) {
            folder
        } else {
            &self.tables.default_module_folder
        }
    }

    /// Sub-category folder for a slug: exact match first, then keywords
    fn category_for(&self, slug: &str) -> Option<&str> {
        if let Some(category) = self.tables.category_overrides.get(slug) {
            return Some(category.as_str());
        }

        CATEGORY_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| slug.contains(k)))
            .map(|(category, _)| *category)
    }
}
