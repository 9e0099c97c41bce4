use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::answer::normalize_answer;

const DEFAULT_MISSION_DATA: &str = include_str!("../data/missions.json");

pub type MissionId = u32;

/// One static riddle unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    pub id: MissionId,
    pub title: String,
    pub prompt: String,
    #[serde(default)]
    pub evidence: Vec<String>,
    /// Accepted answers, already trimmed and lowercase.
    #[serde(rename = "answer")]
    pub answers: Vec<String>,
    /// Literal accepted answer -> bonus mission spliced in when it is given.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bonus_on: BTreeMap<String, MissionId>,
    pub hint: String,
}

impl Mission {
    /// Whether an already-normalized answer is in the accepted set.
    #[must_use]
    pub fn accepts(&self, normalized: &str) -> bool {
        self.answers.iter().any(|answer| answer == normalized)
    }

    /// Bonus mission keyed on the exact accepted answer string, if any.
    #[must_use]
    pub fn bonus_for(&self, normalized: &str) -> Option<MissionId> {
        self.bonus_on.get(normalized).copied()
    }
}

/// Dossier entry shown for every mission in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseFile {
    pub id: MissionId,
    pub title: String,
    pub prompt: String,
    pub signal_count: usize,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate mission id {0}")]
    DuplicateId(MissionId),
    #[error("base queue is empty")]
    EmptyQueue,
    #[error("base queue references unknown mission {0}")]
    UnknownQueueEntry(MissionId),
    #[error("mission {0} has no accepted answers")]
    NoAnswers(MissionId),
    #[error("mission {id} answer {answer:?} is not normalized")]
    UnnormalizedAnswer { id: MissionId, answer: String },
    #[error("mission {id} bonus key {key:?} is not an accepted answer")]
    BonusKeyNotAnswer { id: MissionId, key: String },
    #[error("mission {id} unlocks unknown bonus mission {bonus}")]
    UnknownBonus { id: MissionId, bonus: MissionId },
}

#[derive(Debug, Deserialize)]
struct CatalogDoc {
    base_queue: Vec<MissionId>,
    missions: Vec<Mission>,
}

/// Validated mission table plus the queue a fresh session starts with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionCatalog {
    missions: Vec<Mission>,
    index: HashMap<MissionId, usize>,
    base_queue: Vec<MissionId>,
}

impl MissionCatalog {
    /// Load the catalog from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or the catalog is inconsistent.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDoc = serde_json::from_str(json)?;
        Self::from_parts(doc.missions, doc.base_queue)
    }

    /// Build a catalog from pre-parsed missions.
    ///
    /// # Errors
    ///
    /// Returns an error if ids collide, the queue or a bonus references an
    /// unknown mission, or an answer could never match a normalized submission.
    pub fn from_parts(
        missions: Vec<Mission>,
        base_queue: Vec<MissionId>,
    ) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(missions.len());
        for (pos, mission) in missions.iter().enumerate() {
            if index.insert(mission.id, pos).is_some() {
                return Err(CatalogError::DuplicateId(mission.id));
            }
        }

        for mission in &missions {
            validate_answers(mission)?;
            for (key, &bonus) in &mission.bonus_on {
                if !mission.accepts(key) {
                    return Err(CatalogError::BonusKeyNotAnswer {
                        id: mission.id,
                        key: key.clone(),
                    });
                }
                if !index.contains_key(&bonus) {
                    return Err(CatalogError::UnknownBonus {
                        id: mission.id,
                        bonus,
                    });
                }
            }
        }

        if base_queue.is_empty() {
            return Err(CatalogError::EmptyQueue);
        }
        if let Some(&unknown) = base_queue.iter().find(|id| !index.contains_key(id)) {
            return Err(CatalogError::UnknownQueueEntry(unknown));
        }

        Ok(Self {
            missions,
            index,
            base_queue,
        })
    }

    /// The catalog embedded in the crate.
    ///
    /// # Errors
    ///
    /// Returns an error only if the embedded asset is inconsistent.
    pub fn load_from_static() -> Result<Self, CatalogError> {
        Self::from_json(DEFAULT_MISSION_DATA)
    }

    #[must_use]
    pub fn get(&self, id: MissionId) -> Option<&Mission> {
        self.index.get(&id).map(|&pos| &self.missions[pos])
    }

    #[must_use]
    pub fn contains(&self, id: MissionId) -> bool {
        self.index.contains_key(&id)
    }

    #[must_use]
    pub fn base_queue(&self) -> &[MissionId] {
        &self.base_queue
    }

    #[must_use]
    pub fn missions(&self) -> &[Mission] {
        &self.missions
    }

    /// Dossier listing in catalog order.
    #[must_use]
    pub fn case_files(&self) -> Vec<CaseFile> {
        self.missions
            .iter()
            .map(|mission| CaseFile {
                id: mission.id,
                title: mission.title.clone(),
                prompt: mission.prompt.clone(),
                signal_count: mission.evidence.len(),
            })
            .collect()
    }
}

fn validate_answers(mission: &Mission) -> Result<(), CatalogError> {
    if mission.answers.is_empty() {
        return Err(CatalogError::NoAnswers(mission.id));
    }
    for answer in &mission.answers {
        if answer.is_empty() || normalize_answer(answer) != *answer {
            return Err(CatalogError::UnnormalizedAnswer {
                id: mission.id,
                answer: answer.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mission(id: MissionId, answers: &[&str]) -> Mission {
        Mission {
            id,
            title: format!("Mission {id}"),
            prompt: "prompt".to_string(),
            evidence: vec!["a".to_string(), "b".to_string()],
            answers: answers.iter().map(ToString::to_string).collect(),
            bonus_on: BTreeMap::new(),
            hint: "hint".to_string(),
        }
    }

    #[test]
    fn static_catalog_loads() {
        let catalog = MissionCatalog::load_from_static().unwrap();
        assert_eq!(catalog.base_queue(), &[1, 2, 3, 4]);
        assert_eq!(catalog.missions().len(), 6);
        let alias = catalog.get(2).unwrap();
        assert_eq!(alias.bonus_for("github"), Some(5));
        assert_eq!(alias.bonus_for("git"), None);
        let infra = catalog.get(3).unwrap();
        assert_eq!(infra.bonus_for("digital ocean"), Some(6));
        assert_eq!(infra.bonus_for("digitalocean"), Some(6));
    }

    #[test]
    fn case_files_follow_catalog_order() {
        let catalog = MissionCatalog::load_from_static().unwrap();
        let files = catalog.case_files();
        let ids: Vec<_> = files.iter().map(|file| file.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(files[1].signal_count, 4);
        assert_eq!(files[3].title, "Mission 04: Transit Signal");
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = MissionCatalog::from_parts(vec![mission(1, &["a"]), mission(1, &["b"])], vec![1])
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId(1)));
    }

    #[test]
    fn rejects_bad_queues() {
        assert!(matches!(
            MissionCatalog::from_parts(vec![mission(1, &["a"])], vec![]),
            Err(CatalogError::EmptyQueue)
        ));
        assert!(matches!(
            MissionCatalog::from_parts(vec![mission(1, &["a"])], vec![1, 9]),
            Err(CatalogError::UnknownQueueEntry(9))
        ));
    }

    #[test]
    fn rejects_unmatchable_answers() {
        assert!(matches!(
            MissionCatalog::from_parts(vec![mission(1, &[])], vec![1]),
            Err(CatalogError::NoAnswers(1))
        ));
        assert!(matches!(
            MissionCatalog::from_parts(vec![mission(1, &["Stockholm"])], vec![1]),
            Err(CatalogError::UnnormalizedAnswer { id: 1, .. })
        ));
        assert!(matches!(
            MissionCatalog::from_parts(vec![mission(1, &[" vpn"])], vec![1]),
            Err(CatalogError::UnnormalizedAnswer { id: 1, .. })
        ));
    }

    #[test]
    fn rejects_dangling_bonus_entries() {
        let mut first = mission(1, &["github"]);
        first.bonus_on.insert("gitlab".to_string(), 2);
        assert!(matches!(
            MissionCatalog::from_parts(vec![first.clone(), mission(2, &["x"])], vec![1]),
            Err(CatalogError::BonusKeyNotAnswer { id: 1, .. })
        ));

        first.bonus_on.clear();
        first.bonus_on.insert("github".to_string(), 7);
        assert!(matches!(
            MissionCatalog::from_parts(vec![first], vec![1]),
            Err(CatalogError::UnknownBonus { id: 1, bonus: 7 })
        ));
    }
}
