/// Tunable parameters controlling foothold-chain shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeneratorKnobs {
    /// Number of footholds to place, including the start and goal.
    pub target_foothold_count: i32,
    /// Narrowest a platform may be sampled.
    pub min_foothold_width: i32,
    /// Widest a platform may be sampled.
    pub max_foothold_width: i32,
    /// `0.0` = flat, `1.0` = full vertical range. Scales permitted `dy`.
    pub verticality: f64,
    /// `0.0` = easy (wide, close), `1.0` = hard (narrow, far). Tightens the
    /// minimum horizontal gap and narrows the maximum platform width.
    pub difficulty: f64,
}

impl Default for GeneratorKnobs {
    fn default() -> Self {
        GeneratorKnobs {
            target_foothold_count: 8,
            min_foothold_width: 2,
            max_foothold_width: 6,
            verticality: 0.5,
            difficulty: 0.3,
        }
    }
}
