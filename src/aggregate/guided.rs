//! Edge-aware aggregation with a guided filter on the target luma.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use super::Aggregator;
use crate::filter::GuidedFilter;
use crate::plane::Plane;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

pub struct GuidedAggregator {
    filter: GuidedFilter,
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl GuidedAggregator {
    pub fn new(guide: &Plane, radius_x: usize, radius_y: usize, eps: f32) -> Self {
        Self {
            filter: GuidedFilter::new(guide, radius_x, radius_y, eps),
        }
    }
}

impl Aggregator for GuidedAggregator {
    fn name(&self) -> String {
        "Guided".into()
    }

    fn aggregate(&self, src: &Plane, dest: &mut Plane) {
        self.filter.filter(src, dest);
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn does_not_bleed_across_guide_edge() {
        // Guide has a hard edge at column 4, cost is high only on the left side.
        let guide = Plane::from_shape_fn((6, 8), |(_, x)| if x < 4 { 0.0 } else { 200.0 });
        let cost = Plane::from_shape_fn((6, 8), |(_, x)| if x < 4 { 30.0 } else { 0.0 });

        let mut guided = Plane::zeros(cost.dim());
        GuidedAggregator::new(&guide, 2, 2, 1.0).aggregate(&cost, &mut guided);

        let mut boxed = Plane::zeros(cost.dim());
        crate::aggregate::BoxAggregator::new(2, 2).aggregate(&cost, &mut boxed);

        // Right next to the edge the guided result stays close to the true cost.
        assert!(guided[[3, 4]] < 1.0);
        assert!(boxed[[3, 4]] > 10.0);
    }
}
