/// A closed span of ray parameters `[min, max]`.
///
/// Solids are reduced to the spans a ray spends inside them; boolean
/// operators then work on these spans instead of on geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// The whole line.
    pub const UNIVERSE: Interval = Interval {
        min: f32::NEG_INFINITY,
        max: f32::INFINITY,
    };

    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn length(&self) -> f32 {
        self.max - self.min
    }

    /// The shared part of two spans. Disjoint spans give a negative length.
    pub fn overlap(&self, other: &Interval) -> Interval {
        Interval::new(self.min.max(other.min), self.max.min(other.max))
    }

    /// True if the spans share a stretch of nonzero length.
    ///
    /// Spans that only touch at an endpoint do not overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.overlap(other).length() > 0.0
    }
}
