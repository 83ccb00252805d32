//! Static workout presets and the Yo-Yo roster.
//!
//! A catalog is compiled into the crate; `catalog_path` in the config points
//! at a TOML file with the same layout to replace it.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::interval::WorkoutPreset;
use crate::storage::Config;

const BUNDLED: &str = include_str!("../data/catalog.toml");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub team: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub presets: Vec<WorkoutPreset>,
    #[serde(default)]
    pub players: Vec<Player>,
}

impl Catalog {
    /// The catalog shipped with the crate.
    pub fn bundled() -> Result<Self> {
        Self::from_toml(BUNDLED)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let catalog: Catalog =
            toml::from_str(content).map_err(|e| CatalogError::ParseFailed(e.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::ParseFailed(format!("{}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// `config.catalog_path` if set, the bundled catalog otherwise.
    pub fn for_config(config: &Config) -> Result<Self> {
        match &config.catalog_path {
            Some(path) => Self::load_from(Path::new(path)),
            None => Self::bundled(),
        }
    }

    fn validate(&self) -> std::result::Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for preset in &self.presets {
            if !seen.insert(preset.id.as_str()) {
                return Err(CatalogError::DuplicatePreset(preset.id.clone()));
            }
            if let Some(exercise) = preset.exercises.iter().find(|e| e.sets == 0) {
                return Err(CatalogError::ParseFailed(format!(
                    "preset '{}': exercise '{}' has no sets",
                    preset.id, exercise.name
                )));
            }
        }
        Ok(())
    }

    pub fn preset(&self, id: &str) -> Result<&WorkoutPreset> {
        self.presets
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| CatalogError::UnknownPreset(id.to_string()).into())
    }

    pub fn player(&self, id: &str) -> Result<&Player> {
        self.players
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| CatalogError::UnknownPlayer(id.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::{ExerciseType, PhaseSchedule};

    #[test]
    fn bundled_catalog_loads() {
        let catalog = Catalog::bundled().unwrap();
        let ids: Vec<_> = catalog.presets.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "full-body-stretch",
                "stability-core",
                "drill-1",
                "hiit-basic",
                "tabata",
                "sprint-intervals"
            ]
        );
        assert_eq!(catalog.players.len(), 14);
        assert_eq!(catalog.player("lennox").unwrap().name, "Lennox");
    }

    #[test]
    fn stability_core_details() {
        let catalog = Catalog::bundled().unwrap();
        let preset = catalog.preset("stability-core").unwrap();
        assert_eq!(preset.total_sets(), 13);
        let hamstrings = &preset.exercises[2];
        assert_eq!(hamstrings.exercise_type, ExerciseType::Reps);
        assert_eq!(hamstrings.reps, Some(5));
        assert!(preset.exercises[1].side_specific);
        assert!(!preset.exercises[0].side_specific);
    }

    #[test]
    fn tabata_total_time_includes_prepare() {
        let catalog = Catalog::bundled().unwrap();
        let schedule = PhaseSchedule::from_preset(catalog.preset("tabata").unwrap(), 10);
        assert_eq!(schedule.total_secs(), 10 + 8 * (20 + 10));
    }

    #[test]
    fn unknown_ids_are_errors() {
        let catalog = Catalog::bundled().unwrap();
        assert!(catalog.preset("yoga").is_err());
        assert!(catalog.player("nobody").is_err());
    }

    #[test]
    fn duplicate_presets_rejected() {
        let toml = r#"
            [[presets]]
            id = "a"
            name = "A"

            [[presets]]
            id = "a"
            name = "Again"
        "#;
        assert!(matches!(
            Catalog::from_toml(toml),
            Err(crate::error::CoreError::Catalog(CatalogError::DuplicatePreset(_)))
        ));
    }

    #[test]
    fn zero_set_exercise_rejected() {
        let toml = r#"
            [[presets]]
            id = "a"
            name = "A"

            [[presets.exercises]]
            name = "Nothing"
            type = "work"
            sets = 0
            duration = 10
        "#;
        assert!(Catalog::from_toml(toml).is_err());
    }
}
