//! The nutrient field: an id-keyed store of nutrients on the arena.
//!
//! Iteration order is creation order (handles are monotonic), which makes
//! [`NutrientField::nearest`] deterministic: among equidistant nutrients the
//! earliest created wins.

use std::collections::BTreeMap;

use abyss_types::{NutrientId, NutrientSnapshot, Position};

use crate::error::WorldError;
use crate::nutrient::Nutrient;

/// All nutrients currently on the field.
#[derive(Debug, Clone, Default)]
pub struct NutrientField {
    nutrients: BTreeMap<NutrientId, Nutrient>,
}

impl NutrientField {
    /// Create an empty field.
    pub const fn new() -> Self {
        Self {
            nutrients: BTreeMap::new(),
        }
    }

    /// Place a nutrient on the field.
    pub fn insert(&mut self, nutrient: Nutrient) {
        self.nutrients.insert(nutrient.id, nutrient);
    }

    /// Remove a nutrient.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NutrientNotFound`] if no such nutrient exists.
    pub fn remove(&mut self, id: NutrientId) -> Result<Nutrient, WorldError> {
        self.nutrients
            .remove(&id)
            .ok_or(WorldError::NutrientNotFound(id))
    }

    /// Look up a nutrient.
    pub fn get(&self, id: NutrientId) -> Option<&Nutrient> {
        self.nutrients.get(&id)
    }

    /// Number of nutrients on the field.
    pub fn len(&self) -> usize {
        self.nutrients.len()
    }

    /// Whether the field is empty.
    pub fn is_empty(&self) -> bool {
        self.nutrients.is_empty()
    }

    /// Nutrients in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Nutrient> {
        self.nutrients.values()
    }

    /// Apply `dt_seconds` of decay to every nutrient, then drop the depleted
    /// ones. Returns how many were removed.
    pub fn decay(&mut self, dt_seconds: f64) -> usize {
        let before = self.nutrients.len();
        self.nutrients.retain(|_, nutrient| {
            nutrient.update(dt_seconds);
            !nutrient.is_depleted()
        });
        let removed = before.saturating_sub(self.nutrients.len());
        if removed > 0 {
            tracing::trace!(removed, remaining = self.nutrients.len(), "nutrients depleted");
        }
        removed
    }

    /// The nutrient closest to `from`. Ties go to the earliest created.
    pub fn nearest(&self, from: Position) -> Option<&Nutrient> {
        let mut best: Option<(&Nutrient, f64)> = None;
        for nutrient in self.nutrients.values() {
            let distance = from.distance_to(nutrient.position);
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((nutrient, distance)),
            }
        }
        best.map(|(nutrient, _)| nutrient)
    }

    /// Exported state of every nutrient, in creation order.
    pub fn snapshot(&self) -> Vec<NutrientSnapshot> {
        self.nutrients.values().map(Nutrient::snapshot).collect()
    }
}

#[cfg(test)]
mod tests {
    use abyss_types::NutrientKind;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::nutrient::{SpawnWeights, create_nutrient};

    fn field_with(points: &[(u64, f64, f64, NutrientKind)]) -> NutrientField {
        let mut rng = StdRng::seed_from_u64(13);
        let mut field = NutrientField::new();
        for &(id, x, y, kind) in points {
            field.insert(create_nutrient(
                NutrientId(id),
                Position::new(x, y),
                Some(kind),
                &SpawnWeights::default(),
                0,
                &mut rng,
            ));
        }
        field
    }

    #[test]
    fn nearest_picks_closest() {
        let field = field_with(&[
            (1, 100.0, 0.0, NutrientKind::Common),
            (2, 10.0, 0.0, NutrientKind::Rich),
            (3, 50.0, 0.0, NutrientKind::Golden),
        ]);
        let nearest = field.nearest(Position::new(0.0, 0.0)).map(|n| n.id);
        assert_eq!(nearest, Some(NutrientId(2)));
    }

    #[test]
    fn nearest_tie_goes_to_earliest() {
        let field = field_with(&[
            (1, 10.0, 0.0, NutrientKind::Common),
            (2, -10.0, 0.0, NutrientKind::Common),
        ]);
        for _ in 0..5 {
            let nearest = field.nearest(Position::new(0.0, 0.0)).map(|n| n.id);
            assert_eq!(nearest, Some(NutrientId(1)));
        }
    }

    #[test]
    fn nearest_on_empty_field_is_none() {
        assert!(NutrientField::new().nearest(Position::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn decay_prunes_depleted_but_keeps_toxic() {
        let mut field = field_with(&[(2, 0.0, 0.0, NutrientKind::Toxic)]);
        let mut rng = StdRng::seed_from_u64(14);
        let mut golden = create_nutrient(
            NutrientId(1),
            Position::new(0.0, 0.0),
            Some(NutrientKind::Golden),
            &SpawnWeights::default(),
            0,
            &mut rng,
        );
        golden.energy = 1.02;
        field.insert(golden);

        let removed = field.decay(1.0);
        assert_eq!(removed, 1);
        assert!(field.get(NutrientId(2)).is_some());
        assert!(field.get(NutrientId(1)).is_none());
    }

    #[test]
    fn remove_missing_is_an_error() {
        let mut field = NutrientField::new();
        assert_eq!(
            field.remove(NutrientId(4)).err(),
            Some(WorldError::NutrientNotFound(NutrientId(4)))
        );
    }
}
