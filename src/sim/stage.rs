//! Stage definitions and the read-only stage catalog
//!
//! The catalog is validated once on construction. The engine trusts a
//! validated catalog and never re-checks it per command.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Object variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Normal,
    Golden,
    Bomb,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Normal => "normal",
            ObjectKind::Golden => "golden",
            ObjectKind::Bomb => "bomb",
        }
    }
}

/// Opaque reference to a renderable asset, resolved by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisualKey(pub String);

impl VisualKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }
}

/// A spawnable object template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectTemplate {
    pub visual: VisualKey,
    pub points: i64,
    pub kind: ObjectKind,
}

impl ObjectTemplate {
    pub fn new(visual: &str, points: i64, kind: ObjectKind) -> Self {
        Self {
            visual: VisualKey::new(visual),
            points,
            kind,
        }
    }
}

/// Objects a stage can spawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectPool {
    pub normal: Vec<ObjectTemplate>,
    pub golden: ObjectTemplate,
    pub bomb: ObjectTemplate,
}

/// A difficulty tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageDefinition {
    pub level: u32,
    pub name: String,
    /// Minimum high score to unlock this stage
    pub score_threshold: u64,
    /// Reaching this score on the final stage completes the game
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_score: Option<u64>,
    pub speed_modifier: f32,
    pub spawn_rate_modifier: f32,
    pub object_pool: ObjectPool,
}

/// Catalog validation failures
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("stage catalog is empty")]
    Empty,
    #[error("stage {0}: level must be positive")]
    ZeroLevel(u32),
    #[error("stage {level}: levels must be strictly ascending (previous {previous})")]
    LevelOrder { level: u32, previous: u32 },
    #[error("stage {0}: first stage must have a score threshold of 0")]
    FirstThreshold(u32),
    #[error("stage {level}: threshold {threshold} is below the previous stage's")]
    ThresholdOrder { level: u32, threshold: u64 },
    #[error("stage {0}: normal object pool is empty")]
    EmptyNormalPool(u32),
    #[error("stage {level}: {slot} slot holds a {found} template")]
    KindMismatch {
        level: u32,
        slot: &'static str,
        found: &'static str,
    },
    #[error("stage {level}: {kind} template has invalid points {points}")]
    PointSign {
        level: u32,
        kind: &'static str,
        points: i64,
    },
    #[error("stage {0}: speed and spawn modifiers must be positive")]
    Modifier(u32),
    #[error("stage {0}: final stage has no completion score")]
    MissingCompletion(u32),
    #[error("stage {0}: completion score is only allowed on the final stage")]
    UnexpectedCompletion(u32),
    #[error("failed to parse stage catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Ordered, validated stage table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StageCatalog {
    stages: Vec<StageDefinition>,
}

impl StageCatalog {
    /// Validate and wrap a stage list (must already be sorted by level)
    pub fn new(stages: Vec<StageDefinition>) -> Result<Self, CatalogError> {
        validate(&stages)?;
        Ok(Self { stages })
    }

    /// Parse a JSON array of stage definitions
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let stages: Vec<StageDefinition> = serde_json::from_str(json)?;
        Self::new(stages)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.stages)
    }

    pub fn by_level(&self, level: u32) -> Option<&StageDefinition> {
        self.stages.iter().find(|s| s.level == level)
    }

    pub fn first(&self) -> &StageDefinition {
        // Non-empty is checked in `new`
        &self.stages[0]
    }

    /// Stage following `level`, if any
    pub fn next(&self, level: u32) -> Option<&StageDefinition> {
        self.stages.iter().find(|s| s.level > level)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StageDefinition> {
        self.stages.iter()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// The bundled five-stage table
    pub fn default_stages() -> Self {
        use ObjectKind::*;

        let t = ObjectTemplate::new;
        let stages = vec![
            StageDefinition {
                level: 1,
                name: "Gastronomy".into(),
                score_threshold: 0,
                completion_score: None,
                speed_modifier: 1.0,
                spawn_rate_modifier: 1.0,
                object_pool: ObjectPool {
                    normal: vec![
                        t("stage1/cake", 20, Normal),
                        t("stage1/meat", 15, Normal),
                        t("stage1/pasta", 10, Normal),
                        t("stage1/fried-egg", 10, Normal),
                        t("stage1/bread", 5, Normal),
                    ],
                    golden: t("stage1/hamburger", 80, Golden),
                    bomb: t("stage1/rotten-food", -50, Bomb),
                },
            },
            StageDefinition {
                level: 2,
                name: "Administration".into(),
                score_threshold: 800,
                completion_score: None,
                speed_modifier: 1.15,
                spawn_rate_modifier: 1.2,
                object_pool: ObjectPool {
                    normal: vec![
                        t("stage2/hourglass", 25, Normal),
                        t("stage2/spreadsheet", 20, Normal),
                        t("stage2/chart", 15, Normal),
                        t("stage2/clipboard", 15, Normal),
                        t("stage2/book", 10, Normal),
                    ],
                    golden: t("stage2/idea", 100, Golden),
                    bomb: t("stage2/falling-chart", -60, Bomb),
                },
            },
            StageDefinition {
                level: 3,
                name: "Nursing".into(),
                score_threshold: 2000,
                completion_score: None,
                speed_modifier: 1.25,
                spawn_rate_modifier: 1.3,
                object_pool: ObjectPool {
                    normal: vec![
                        t("stage1/hamburger", 35, Normal),
                        t("stage1/hamburger", 30, Normal),
                    ],
                    golden: t("stage1/hamburger", 120, Golden),
                    bomb: t("stage1/rotten-food", -75, Bomb),
                },
            },
            StageDefinition {
                level: 4,
                name: "Systems Development".into(),
                score_threshold: 3500,
                completion_score: None,
                speed_modifier: 1.35,
                spawn_rate_modifier: 1.4,
                object_pool: ObjectPool {
                    normal: vec![
                        t("stage1/hamburger", 40, Normal),
                        t("stage1/hamburger", 35, Normal),
                    ],
                    golden: t("stage1/hamburger", 150, Golden),
                    bomb: t("stage1/rotten-food", -90, Bomb),
                },
            },
            StageDefinition {
                level: 5,
                name: "Tech Hub".into(),
                score_threshold: 5500,
                completion_score: Some(8000),
                speed_modifier: 1.45,
                spawn_rate_modifier: 1.5,
                object_pool: ObjectPool {
                    normal: vec![
                        t("stage1/hamburger", 50, Normal),
                        t("stage1/hamburger", 45, Normal),
                    ],
                    golden: t("stage1/hamburger", 200, Golden),
                    bomb: t("stage1/rotten-food", -100, Bomb),
                },
            },
        ];

        Self::new(stages).expect("bundled stage table is valid")
    }
}

fn validate(stages: &[StageDefinition]) -> Result<(), CatalogError> {
    let first = stages.first().ok_or(CatalogError::Empty)?;
    if first.score_threshold != 0 {
        return Err(CatalogError::FirstThreshold(first.level));
    }

    let last_index = stages.len() - 1;
    for (i, stage) in stages.iter().enumerate() {
        let level = stage.level;
        if level == 0 {
            return Err(CatalogError::ZeroLevel(level));
        }
        if i > 0 {
            let prev = &stages[i - 1];
            if level <= prev.level {
                return Err(CatalogError::LevelOrder {
                    level,
                    previous: prev.level,
                });
            }
            if stage.score_threshold < prev.score_threshold {
                return Err(CatalogError::ThresholdOrder {
                    level,
                    threshold: stage.score_threshold,
                });
            }
        }
        if !(stage.speed_modifier > 0.0 && stage.spawn_rate_modifier > 0.0) {
            return Err(CatalogError::Modifier(level));
        }

        let pool = &stage.object_pool;
        if pool.normal.is_empty() {
            return Err(CatalogError::EmptyNormalPool(level));
        }
        for template in &pool.normal {
            check_template(level, "normal", ObjectKind::Normal, template)?;
        }
        check_template(level, "golden", ObjectKind::Golden, &pool.golden)?;
        check_template(level, "bomb", ObjectKind::Bomb, &pool.bomb)?;

        match (i == last_index, stage.completion_score) {
            (true, None) => return Err(CatalogError::MissingCompletion(level)),
            (false, Some(_)) => return Err(CatalogError::UnexpectedCompletion(level)),
            _ => {}
        }
    }

    Ok(())
}

fn check_template(
    level: u32,
    slot: &'static str,
    expected: ObjectKind,
    template: &ObjectTemplate,
) -> Result<(), CatalogError> {
    if template.kind != expected {
        return Err(CatalogError::KindMismatch {
            level,
            slot,
            found: template.kind.as_str(),
        });
    }
    let sign_ok = match expected {
        ObjectKind::Bomb => template.points < 0,
        ObjectKind::Normal | ObjectKind::Golden => template.points > 0,
    };
    if !sign_ok {
        return Err(CatalogError::PointSign {
            level,
            kind: expected.as_str(),
            points: template.points,
        });
    }
    Ok(())
}
