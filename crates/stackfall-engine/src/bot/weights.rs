use serde::{Deserialize, Serialize};

use super::analysis::PlacementAnalysis;

/// Linear weights combining placement metrics into one score.
///
/// The values are hand-tuned; they are configuration, not derived constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotWeights {
    /// Per completed line.
    pub lines: f64,
    /// Per hole.
    pub holes: f64,
    /// Added to the hole weight, scaled by how low the piece lands.
    pub hole_low_landing_bonus: f64,
    /// Per unit of adjacent column height difference.
    pub bumpiness: f64,
    /// Per column of distance from the center.
    pub center_distance: f64,
    /// Distances below this count as this.
    pub min_center_distance: f64,
    /// Per row between the floor and the landed piece.
    pub drop_height: f64,
}

impl Default for BotWeights {
    fn default() -> Self {
        Self {
            lines: 8.0,
            holes: -6.0,
            hole_low_landing_bonus: 2.0,
            bumpiness: -0.4,
            center_distance: -0.15,
            min_center_distance: 1.0,
            drop_height: -0.6,
        }
    }
}

impl BotWeights {
    #[must_use]
    pub fn score(&self, analysis: &PlacementAnalysis) -> f64 {
        #[expect(clippy::cast_precision_loss)]
        let (lines, holes, bumpiness, drop_height, rows) = (
            analysis.cleared_lines() as f64,
            analysis.holes() as f64,
            analysis.bumpiness() as f64,
            analysis.drop_height() as f64,
            analysis.rows().max(1) as f64,
        );
        let lowness = 1.0 - (drop_height / rows).clamp(0.0, 1.0);
        let center = analysis.center_distance().max(self.min_center_distance);

        lines * self.lines
            + holes * (self.holes + self.hole_low_landing_bonus * lowness)
            + bumpiness * self.bumpiness
            + center * self.center_distance
            + drop_height * self.drop_height
    }
}
