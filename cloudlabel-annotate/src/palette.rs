//! Per-class display colors

use cloudlabel_core::{ClassId, Rgb};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, PartialEq)]
pub struct ClassPalette {
    colors: [Rgb; ClassId::COUNT],
}

impl ClassPalette {
    /// Uniformly random color per class; differs between runs
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut colors = [[0.0; 3]; ClassId::COUNT];
        for color in &mut colors {
            *color = [rng.gen(), rng.gen(), rng.gen()];
        }
        Self { colors }
    }

    /// Reproducible palette; each class color depends only on `seed` and the class id
    pub fn seeded(seed: u64) -> Self {
        let mut colors = [[0.0; 3]; ClassId::COUNT];
        for class in ClassId::all() {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(class.value() as u64));
            colors[class.index()] = [rng.gen(), rng.gen(), rng.gen()];
        }
        Self { colors }
    }

    pub fn from_colors(colors: [Rgb; ClassId::COUNT]) -> Self {
        Self { colors }
    }

    pub fn color(&self, class: ClassId) -> Rgb {
        self.colors[class.index()]
    }
}
