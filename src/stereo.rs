//! # Local stereo matching
//!
//! [`StereoBase`] runs the complete local matching pipeline on a rectified pair:
//!
//! 1. prefilter both views,
//! 2. build the disparity space image (DSI), computing and aggregating one cost plane per
//!    candidate disparity,
//! 3. winner-take-all and subpixel refinement,
//! 4. uniqueness, left border, left-right, minimum cost and speckle filtering,
//! 5. optional weighted mode refinement, occlusion fill and boundary correction,
//! 6. crop the border and emit the map.
//!
//! The intermediate planes are owned by a [`MatchingState`] which is kept between calls, so
//! matching a stream of same sized frames only allocates on the first frame.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use log::{debug, trace};
use ndarray::{s, Zip};

use crate::aggregate::{build_aggregator, Aggregator};
use crate::cost::{build_metric, CostMetric};
use crate::disparity::{DisparityAlgorithm, DisparityMap};
use crate::error::*;
use crate::frame::{check_pair, StereoFrame};
use crate::params::{LrCheckMethod, Params};
use crate::plane::{ensure_shape, ensure_volume, Plane};
use crate::postfilter::{
    correct_boundary, fill_occlusion, invalidate_left_border, lr_check_geometric,
    lr_check_with_cost, min_cost_filter, uniqueness_filter, ModeBuffer, ModeWindow,
    SpeckleBuffer,
};
use crate::prefilter::{prefilter_pair, MatchingView};
use crate::subpixel::{subpixel_interpolation, RangeFilter};
use crate::wta::winner_take_all;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Local block matching stereo with configurable cost, aggregation and post filtering.
pub struct StereoBase {
    params: Params,
    state: MatchingState,
}

/// Working buffers of one [`StereoBase`]. All planes are full image size.
#[derive(Default)]
pub struct MatchingState {
    /// Aggregated cost volume, one plane per candidate disparity.
    dsi: Vec<Plane>,
    /// Raw cost volume, only populated when cost computation and aggregation run as two passes.
    raw: Vec<Plane>,
    /// Raw cost of one disparity when the two run interleaved.
    cost: Plane,
    disparity: Plane,
    min_cost: Plane,
    cost_map: Plane,
    weight: Plane,
    speckle: SpeckleBuffer,
    mode: ModeBuffer,
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl StereoBase {
    /// Create a new matcher, failing if the parameters are unusable.
    pub fn new(params: Params) -> Result<Self> {
        params.validate()?;

        Ok(Self {
            params,
            state: MatchingState::default(),
        })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Replace the parameters. Buffers are kept and resized on the next call if needed.
    pub fn set_params(&mut self, params: Params) -> Result<()> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    /// Compute the disparity of every `target` pixel against `reference`.
    ///
    /// The returned map excludes `params.border` pixels on every side. Rejected pixels hold
    /// `params.invalid_disparity()`.
    pub fn matching(
        &mut self,
        target: &DynamicImage,
        reference: &DynamicImage,
    ) -> Result<DisparityMap> {
        check_pair(target, reference)?;

        let (width, height) = target.dimensions();
        let (rows, cols) = (height as usize, width as usize);
        let params = &self.params;
        let border = params.border;

        if 2 * border >= rows || 2 * border >= cols {
            return Err(Error::InvalidParams(format!(
                "border of {} leaves nothing of a {}x{} image",
                border, width, height
            )));
        }

        let state = &mut self.state;
        let invalid = params.invalid_disparity();
        let min_disparity = params.min_disparity;
        let start = Instant::now();

        // ---- PRE FILTER ----

        let (target_view, reference_view) =
            prefilter_pair(target, reference, params.pre_filter_cap);
        debug!("Prefilter: {:?}", start.elapsed());

        // ---- COST AND AGGREGATION ----

        let stage = Instant::now();
        let metric = build_metric(params, &target_view, &reference_view);
        let aggregator = build_aggregator(params, &target_view.luma);

        if state.prepare(
            params.number_of_disparities,
            (rows, cols),
            !params.schedule_cost_computation_and_aggregation,
        ) {
            trace!(
                "Allocated matching buffers for {}x{} with {} disparities",
                width,
                height,
                params.number_of_disparities
            );
        }

        if params.schedule_cost_computation_and_aggregation {
            state.compute_interleaved(
                &*metric,
                &*aggregator,
                &target_view,
                &reference_view,
                min_disparity,
            );
        } else {
            state.compute_two_pass(
                &*metric,
                &*aggregator,
                &target_view,
                &reference_view,
                min_disparity,
            );
        }
        debug!(
            "{} cost with {} aggregation over {} disparities: {:?}",
            metric.name(),
            aggregator.name(),
            params.number_of_disparities,
            stage.elapsed()
        );

        // ---- DISPARITY SELECTION ----

        let stage = Instant::now();
        winner_take_all(
            &state.dsi,
            min_disparity,
            &mut state.disparity,
            &mut state.min_cost,
        );

        let range_filter = match params.is_range_filter_subpix {
            true => Some(RangeFilter {
                cap: params.subpixel_range_filter_cap,
                window: params.subpixel_range_filter_window,
            }),
            false => None,
        };
        subpixel_interpolation(
            &state.dsi,
            min_disparity,
            params.subpixel_interpolation_method,
            range_filter,
            &mut state.disparity,
        );
        debug!(
            "Winner-take-all with {} interpolation: {:?}",
            params.subpixel_interpolation_method,
            stage.elapsed()
        );

        // ---- POST FILTER ----

        let stage = Instant::now();

        state.weight.fill(0.0);
        if params.is_uniqueness_filter {
            let count = uniqueness_filter(
                &state.dsi,
                min_disparity,
                params.uniqueness_ratio,
                &state.min_cost,
                &mut state.disparity,
                &mut state.weight,
                invalid,
            );
            debug!("Uniqueness filter rejected {} pixels", count);
        }

        if !params.is_process_l_border {
            let count =
                invalidate_left_border(&mut state.disparity, params.max_disparity(), invalid);
            debug!("Left border strip rejected {} pixels", count);
        }

        if params.is_lr_check {
            let count = match params.lr_check_method {
                LrCheckMethod::CostMap => lr_check_with_cost(
                    &mut state.disparity,
                    &state.min_cost,
                    params.disp12diff,
                    invalid,
                ),
                LrCheckMethod::Geometric => {
                    lr_check_geometric(&mut state.disparity, params.disp12diff, invalid)
                }
            };
            debug!("Left-right check rejected {} pixels", count);
        }

        if params.is_min_cost_filter {
            let count = min_cost_filter(
                &state.min_cost,
                params.aggregation_radius_h,
                params.aggregation_radius_v,
                params.min_cost_filter_ratio,
                &mut state.disparity,
                invalid,
            );
            debug!("Minimum cost filter rejected {} pixels", count);
        }

        if params.is_speckle_filter {
            let count = state.speckle.filter(
                &mut state.disparity,
                params.speckle_window_size,
                params.speckle_range,
                params.speckle_connectivity,
                invalid,
            );
            debug!("Speckle filter rejected {} pixels", count);
        }

        if params.is_weighted_mode_filter {
            let window = ModeWindow {
                radius: params.weighted_mode_filter_radius,
                sigma_range: params.weighted_mode_filter_sigma_range,
            };
            let count = state.mode.filter(
                &mut state.disparity,
                &state.weight,
                &target_view.luma,
                window,
                min_disparity,
                params.number_of_disparities,
                invalid,
            );
            debug!("Weighted mode filter moved {} pixels", count);
        }

        if params.is_occlusion_fill {
            let count = fill_occlusion(&mut state.disparity, invalid);
            debug!("Occlusion fill filled {} pixels", count);
        }

        if params.is_boundary_correction {
            let count = correct_boundary(
                &mut state.disparity,
                &target_view.luma,
                params.boundary_correction_radius,
                params.boundary_correction_edge_threshold,
                invalid,
            );
            debug!("Boundary correction moved {} pixels", count);
        }

        state.cost_map.assign(&state.min_cost);
        Zip::from(&mut state.cost_map)
            .and(&state.disparity)
            .for_each(|c, &d| {
                if d == invalid {
                    *c = f32::INFINITY;
                }
            });
        debug!("Post filters: {:?}", stage.elapsed());

        // ---- OUTPUT ----

        let cropped = state
            .disparity
            .slice(s![border..rows - border, border..cols - border])
            .to_owned();
        let mut disp_map = DisparityMap::from_array(cropped, invalid);

        let (min_disp, max_disp) = disp_map
            .data()
            .iter()
            .filter(|&&d| d != invalid)
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &d| {
                (lo.min(d), hi.max(d))
            });
        if min_disp <= max_disp {
            disp_map.min_disp = Some(min_disp);
            disp_map.max_disp = Some(max_disp);
        }

        debug!(
            "Matched {}x{}, {} valid pixels in {:?}",
            width,
            height,
            disp_map.valid_count(),
            start.elapsed()
        );

        Ok(disp_map)
    }

    /// Minimum aggregated cost of every pixel of the last call, infinite where the disparity
    /// was rejected. Pixels written by the occlusion fill carry their own winner's cost.
    pub fn cost_map(&self) -> &Plane {
        &self.state.cost_map
    }

    /// Minimum aggregated cost of every pixel of the last call, before any filtering.
    pub fn min_cost_map(&self) -> &Plane {
        &self.state.min_cost
    }

    /// Uniqueness confidence `1 - best / second best` of the last call, the vote weight of the
    /// weighted mode filter. All zero when the uniqueness filter is disabled.
    pub fn weight_map(&self) -> &Plane {
        &self.state.weight
    }

    /// Aggregated cost volume of the last call, one plane per candidate disparity.
    pub fn dsi(&self) -> &[Plane] {
        &self.state.dsi
    }
}

impl DisparityAlgorithm for StereoBase {
    /// Compute the disparity map of the left view against the right view.
    fn compute(&mut self, frame: &StereoFrame) -> Result<DisparityMap> {
        self.matching(&frame.left, &frame.right)
    }
}

impl MatchingState {
    /// Size every buffer for `count` disparities over a `shape` image. Returns `true` if
    /// anything had to be reallocated.
    fn prepare(&mut self, count: usize, shape: (usize, usize), two_pass: bool) -> bool {
        let mut reallocated = ensure_volume(&mut self.dsi, count, shape);
        reallocated |= ensure_volume(&mut self.raw, if two_pass { count } else { 0 }, shape);
        reallocated |= ensure_shape(&mut self.cost, shape);
        reallocated |= ensure_shape(&mut self.disparity, shape);
        reallocated |= ensure_shape(&mut self.min_cost, shape);
        reallocated |= ensure_shape(&mut self.cost_map, shape);
        reallocated |= ensure_shape(&mut self.weight, shape);
        reallocated
    }

    /// Compute and aggregate disparity by disparity through a single scratch plane.
    fn compute_interleaved(
        &mut self,
        metric: &dyn CostMetric,
        aggregator: &dyn Aggregator,
        target: &MatchingView,
        reference: &MatchingView,
        min_disparity: i32,
    ) {
        for (k, plane) in self.dsi.iter_mut().enumerate() {
            metric.compute(target, reference, min_disparity + k as i32, &mut self.cost);
            aggregator.aggregate(&self.cost, plane);
        }
    }

    /// Compute the whole raw volume, then aggregate it.
    fn compute_two_pass(
        &mut self,
        metric: &dyn CostMetric,
        aggregator: &dyn Aggregator,
        target: &MatchingView,
        reference: &MatchingView,
        min_disparity: i32,
    ) {
        for (k, raw) in self.raw.iter_mut().enumerate() {
            metric.compute(target, reference, min_disparity + k as i32, raw);
        }
        for (raw, plane) in self.raw.iter().zip(self.dsi.iter_mut()) {
            aggregator.aggregate(raw, plane);
        }
    }
}
