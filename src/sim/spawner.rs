//! Random object creation from a stage's object pool

use glam::Vec2;
use rand::Rng;

use super::stage::{ObjectTemplate, StageDefinition};
use super::state::{FallingObject, ObjectId};
use crate::settings::SpawnOdds;

/// Creates falling objects for a stage
#[derive(Debug, Clone)]
pub struct ObjectFactory {
    odds: SpawnOdds,
    screen_width: f32,
    object_diameter: f32,
}

impl ObjectFactory {
    pub fn new(odds: SpawnOdds, screen_width: f32, object_diameter: f32) -> Self {
        Self {
            odds,
            screen_width,
            object_diameter,
        }
    }

    /// Pick a template: golden, then bomb, otherwise a uniform normal
    pub fn pick_template<'a, R: Rng>(
        &self,
        stage: &'a StageDefinition,
        rng: &mut R,
    ) -> &'a ObjectTemplate {
        let pool = &stage.object_pool;
        let roll: f64 = rng.random();

        if roll < self.odds.golden {
            &pool.golden
        } else if roll < self.odds.golden + self.odds.bomb {
            &pool.bomb
        } else {
            &pool.normal[rng.random_range(0..pool.normal.len())]
        }
    }

    /// Create an object at the top of the screen with a random x
    pub fn create_random<R: Rng>(
        &self,
        stage: &StageDefinition,
        id: ObjectId,
        rng: &mut R,
    ) -> FallingObject {
        let template = self.pick_template(stage, rng);
        let max_x = (self.screen_width - self.object_diameter).max(0.0);
        let x = if max_x > 0.0 {
            rng.random_range(0.0..=max_x)
        } else {
            0.0
        };

        FallingObject {
            id,
            pos: Vec2::new(x, 0.0),
            kind: template.kind,
            points: template.points,
            visual: template.visual.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::stage::{ObjectKind, StageCatalog};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_spawn_position_in_bounds() {
        let catalog = StageCatalog::default_stages();
        let factory = ObjectFactory::new(SpawnOdds::default(), 375.0, 60.0);
        let mut rng = Pcg32::seed_from_u64(7);

        for i in 0..500 {
            let obj = factory.create_random(catalog.first(), ObjectId(i), &mut rng);
            assert_eq!(obj.y(), 0.0);
            assert!(obj.x() >= 0.0 && obj.x() <= 315.0);
        }
    }

    #[test]
    fn test_narrow_screen_pins_to_left() {
        let catalog = StageCatalog::default_stages();
        let factory = ObjectFactory::new(SpawnOdds::default(), 40.0, 60.0);
        let mut rng = Pcg32::seed_from_u64(7);
        let obj = factory.create_random(catalog.first(), ObjectId(1), &mut rng);
        assert_eq!(obj.x(), 0.0);
    }

    #[test]
    fn test_odds_extremes() {
        let catalog = StageCatalog::default_stages();
        let stage = catalog.first();
        let mut rng = Pcg32::seed_from_u64(3);

        let all_golden = ObjectFactory::new(SpawnOdds { golden: 1.0, bomb: 0.0 }, 375.0, 60.0);
        let all_bomb = ObjectFactory::new(SpawnOdds { golden: 0.0, bomb: 1.0 }, 375.0, 60.0);
        let all_normal = ObjectFactory::new(SpawnOdds { golden: 0.0, bomb: 0.0 }, 375.0, 60.0);

        for i in 0..50 {
            assert_eq!(all_golden.create_random(stage, ObjectId(i), &mut rng).kind, ObjectKind::Golden);
            assert_eq!(all_bomb.create_random(stage, ObjectId(i), &mut rng).kind, ObjectKind::Bomb);
            let normal = all_normal.create_random(stage, ObjectId(i), &mut rng);
            assert_eq!(normal.kind, ObjectKind::Normal);
            assert!(stage.object_pool.normal.iter().any(|t| t.points == normal.points));
        }
    }

    #[test]
    fn test_default_odds_distribution() {
        let catalog = StageCatalog::default_stages();
        let factory = ObjectFactory::new(SpawnOdds::default(), 375.0, 60.0);
        let mut rng = Pcg32::seed_from_u64(12345);

        let n = 10_000;
        let bombs = (0..n)
            .filter(|&i| {
                factory.create_random(catalog.first(), ObjectId(i), &mut rng).kind == ObjectKind::Bomb
            })
            .count();
        let ratio = bombs as f64 / n as f64;
        assert!((ratio - 0.30).abs() < 0.03, "bomb ratio {}", ratio);
    }
}
