//! # Matching parameters
//!
//! This module provides the configuration bundle consumed by [`StereoBase`], together with the
//! enumerations selecting the pixel matching cost, the aggregation strategy and the subpixel
//! interpolation method.
//!
//! [`StereoBase`]: crate::stereo::StereoBase

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::convert::TryFrom;
use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::error::*;

// -----------------------------------------------------------------------------------------------
// ENUMERATIONS
// -----------------------------------------------------------------------------------------------

/// Per-pixel matching cost. Index order follows the historical numbering so that integer codes
/// stored in old parameter sets still select the same metric.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PixelMatchingMethod {
    Sd,
    SdSobel,
    SdSobelBlend,
    Ad,
    AdSobel,
    AdSobelBlend,
    Bt,
    BtSobel,
    BtSobelBlend,
    BtFull,
    BtFullSobel,
    BtFullSobelBlend,
    Census3x3,
    Census5x5,
    Census7x5,
    Census9x1,
    /// Absolute difference blended with the gradient cost by local texture strength.
    AdTextureBlend,
    /// Birchfield-Tomasi blended with the gradient cost by local texture strength.
    BtTextureBlend,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMethod {
    Box,
    BoxShiftable,
    Gauss,
    GaussShiftable,
    Guided,
    CrossBasedBox,
    Bilateral,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubpixelMethod {
    None,
    Quad,
    Linear,
}

/// How the reference-view disparity is rebuilt for the left-right consistency check.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LrCheckMethod {
    /// The candidate with the lowest aggregated cost claims each reference pixel.
    CostMap,
    /// The nearest (largest) disparity claims each reference pixel.
    Geometric,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SpeckleConnectivity {
    Four,
    Eight,
}

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Full parameter set of the local stereo pipeline.
///
/// Every stage past winner-take-all has its own `is_*` switch; a disabled stage is a plain
/// pass-through.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Params {
    pub pixel_matching_method: PixelMatchingMethod,
    pub aggregation_method: AggregationMethod,
    pub subpixel_interpolation_method: SubpixelMethod,

    /// Number of disparity candidates, must be positive.
    pub number_of_disparities: usize,
    /// Smallest disparity candidate, may be negative.
    pub min_disparity: i32,
    /// Margin on every side of the image that is never emitted.
    pub border: usize,

    /// Cap of the prefiltered horizontal derivative.
    pub pre_filter_cap: i32,
    /// Ceiling of the raw per-pixel matching cost.
    pub pixel_match_error_cap: i32,
    /// Blend weight in percent: `alpha * image_cost + (1 - alpha) * sobel_cost`.
    pub cost_alpha_image_sobel: i32,
    /// Texture window radius of the texture-blend metrics.
    pub sobel_blend_map_param_size: usize,
    /// Texture strength at or below which only the image cost is used.
    pub sobel_blend_map_param1: i32,
    /// Texture strength at or above which the image cost weight drops to
    /// `cost_alpha_image_sobel`, the rest going to the gradient cost.
    pub sobel_blend_map_param2: i32,

    pub aggregation_radius_h: usize,
    pub aggregation_radius_v: usize,
    /// Number of candidate windows per axis for the shiftable strategies, odd.
    pub aggregation_shiftable_kernel: (usize, usize),
    pub aggregation_guided_filter_eps: f64,
    pub aggregation_sigma_space: f64,
    pub aggregation_sigma_range: f64,
    /// Intensity difference at which a cross arm stops growing.
    pub cross_based_threshold: f32,

    pub is_uniqueness_filter: bool,
    /// Percentage margin the second best cost must clear to keep a pixel.
    pub uniqueness_ratio: i32,

    pub is_range_filter_subpix: bool,
    pub subpixel_range_filter_cap: i32,
    pub subpixel_range_filter_window: usize,

    pub is_lr_check: bool,
    pub lr_check_method: LrCheckMethod,
    pub is_process_l_border: bool,
    pub disp12diff: i32,

    pub is_speckle_filter: bool,
    pub speckle_window_size: usize,
    pub speckle_range: f32,
    pub speckle_connectivity: SpeckleConnectivity,

    pub is_min_cost_filter: bool,
    pub min_cost_filter_ratio: f32,

    /// Weighted mode refinement driven by the uniqueness confidence, requires
    /// `is_uniqueness_filter`.
    pub is_weighted_mode_filter: bool,
    pub weighted_mode_filter_radius: usize,
    pub weighted_mode_filter_sigma_range: f32,

    /// Fill invalid pixels from the farther of their valid row neighbours.
    pub is_occlusion_fill: bool,
    /// Align disparity discontinuities with intensity edges of the target view.
    pub is_boundary_correction: bool,
    pub boundary_correction_radius: usize,
    /// Smallest intensity step accepted as an edge.
    pub boundary_correction_edge_threshold: f32,

    /// Interleave cost computation and aggregation per disparity. When unset the raw cost
    /// volume is built in full before aggregation starts.
    pub schedule_cost_computation_and_aggregation: bool,
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl Params {
    /// Parameters for a given matching block size and disparity search range.
    pub fn new(block_size: usize, min_disparity: i32, number_of_disparities: usize) -> Self {
        let radius = block_size / 2;

        Self {
            pixel_matching_method: PixelMatchingMethod::Bt,
            aggregation_method: AggregationMethod::Box,
            subpixel_interpolation_method: SubpixelMethod::Quad,
            number_of_disparities,
            min_disparity,
            border: radius,
            pre_filter_cap: 31,
            pixel_match_error_cap: 31,
            cost_alpha_image_sobel: 10,
            sobel_blend_map_param_size: 4,
            sobel_blend_map_param1: 16,
            sobel_blend_map_param2: 32,
            aggregation_radius_h: radius,
            aggregation_radius_v: radius,
            aggregation_shiftable_kernel: (3, 3),
            aggregation_guided_filter_eps: 100.0,
            aggregation_sigma_space: (radius.max(1)) as f64,
            aggregation_sigma_range: 20.0,
            cross_based_threshold: 20.0,
            is_uniqueness_filter: true,
            uniqueness_ratio: 10,
            is_range_filter_subpix: true,
            subpixel_range_filter_cap: 1,
            subpixel_range_filter_window: 2,
            is_lr_check: true,
            lr_check_method: LrCheckMethod::CostMap,
            is_process_l_border: false,
            disp12diff: 1,
            is_speckle_filter: true,
            speckle_window_size: 20,
            speckle_range: 1.0,
            speckle_connectivity: SpeckleConnectivity::Four,
            is_min_cost_filter: false,
            min_cost_filter_ratio: 2.0,
            is_weighted_mode_filter: false,
            weighted_mode_filter_radius: 2,
            weighted_mode_filter_sigma_range: 16.0,
            is_occlusion_fill: false,
            is_boundary_correction: false,
            boundary_correction_radius: 2,
            boundary_correction_edge_threshold: 16.0,
            schedule_cost_computation_and_aggregation: true,
        }
    }

    /// Parse parameters from a JSON document. Missing keys take their default values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let params: Params = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Load parameters from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Largest disparity candidate.
    pub fn max_disparity(&self) -> i32 {
        self.min_disparity + self.number_of_disparities as i32 - 1
    }

    /// Value written to pixels rejected by any stage.
    pub fn invalid_disparity(&self) -> f32 {
        (self.min_disparity - 1) as f32
    }

    /// Check the parameters for values no stage can work with.
    pub fn validate(&self) -> Result<()> {
        if self.number_of_disparities == 0 {
            return Err(Error::InvalidParams(
                "number_of_disparities must be positive".into(),
            ));
        }
        if !(0..=100).contains(&self.cost_alpha_image_sobel) {
            return Err(Error::InvalidParams(format!(
                "cost_alpha_image_sobel must be within 0..=100, got {}",
                self.cost_alpha_image_sobel
            )));
        }
        if self.pre_filter_cap <= 0 || self.pre_filter_cap > 255 {
            return Err(Error::InvalidParams(format!(
                "pre_filter_cap must be within 1..=255, got {}",
                self.pre_filter_cap
            )));
        }
        if self.pixel_match_error_cap <= 0 {
            return Err(Error::InvalidParams(
                "pixel_match_error_cap must be positive".into(),
            ));
        }
        if self.uniqueness_ratio < 0 {
            return Err(Error::InvalidParams(
                "uniqueness_ratio must not be negative".into(),
            ));
        }
        if self.disp12diff < 0 {
            return Err(Error::InvalidParams("disp12diff must not be negative".into()));
        }
        if self.speckle_range < 0.0 {
            return Err(Error::InvalidParams(
                "speckle_range must not be negative".into(),
            ));
        }
        let (kw, kh) = self.aggregation_shiftable_kernel;
        if kw % 2 == 0 || kh % 2 == 0 {
            return Err(Error::InvalidParams(format!(
                "aggregation_shiftable_kernel must be odd, got {}x{}",
                kw, kh
            )));
        }
        if self.aggregation_sigma_space <= 0.0 || self.aggregation_sigma_range <= 0.0 {
            return Err(Error::InvalidParams(
                "aggregation sigmas must be positive".into(),
            ));
        }
        if self.aggregation_guided_filter_eps < 0.0 {
            return Err(Error::InvalidParams(
                "aggregation_guided_filter_eps must not be negative".into(),
            ));
        }
        if self.sobel_blend_map_param2 <= self.sobel_blend_map_param1 {
            return Err(Error::InvalidParams(
                "sobel_blend_map_param2 must exceed sobel_blend_map_param1".into(),
            ));
        }
        if self.is_weighted_mode_filter && !self.is_uniqueness_filter {
            return Err(Error::InvalidParams(
                "is_weighted_mode_filter needs the weights of is_uniqueness_filter".into(),
            ));
        }
        if self.weighted_mode_filter_sigma_range <= 0.0 {
            return Err(Error::InvalidParams(
                "weighted_mode_filter_sigma_range must be positive".into(),
            ));
        }
        if self.boundary_correction_edge_threshold < 0.0 {
            return Err(Error::InvalidParams(
                "boundary_correction_edge_threshold must not be negative".into(),
            ));
        }

        Ok(())
    }
}

impl Default for Params {
    fn default() -> Self {
        Self::new(5, 0, 64)
    }
}

impl PixelMatchingMethod {
    pub const ALL: [PixelMatchingMethod; 18] = [
        Self::Sd,
        Self::SdSobel,
        Self::SdSobelBlend,
        Self::Ad,
        Self::AdSobel,
        Self::AdSobelBlend,
        Self::Bt,
        Self::BtSobel,
        Self::BtSobelBlend,
        Self::BtFull,
        Self::BtFullSobel,
        Self::BtFullSobelBlend,
        Self::Census3x3,
        Self::Census5x5,
        Self::Census7x5,
        Self::Census9x1,
        Self::AdTextureBlend,
        Self::BtTextureBlend,
    ];
}

impl AggregationMethod {
    pub const ALL: [AggregationMethod; 7] = [
        Self::Box,
        Self::BoxShiftable,
        Self::Gauss,
        Self::GaussShiftable,
        Self::Guided,
        Self::CrossBasedBox,
        Self::Bilateral,
    ];
}

impl SubpixelMethod {
    pub const ALL: [SubpixelMethod; 3] = [Self::None, Self::Quad, Self::Linear];
}

/// Index lookup shared by the method enumerations.
fn method_from_index<T: Copy>(all: &[T], kind: &'static str, index: i32) -> Result<T> {
    if index < 0 {
        return Err(Error::UnknownMethod { kind, index });
    }
    all.get(index as usize)
        .copied()
        .ok_or(Error::UnknownMethod { kind, index })
}

impl TryFrom<i32> for PixelMatchingMethod {
    type Error = Error;

    fn try_from(index: i32) -> Result<Self> {
        method_from_index(&Self::ALL, "pixel matching", index)
    }
}

impl TryFrom<i32> for AggregationMethod {
    type Error = Error;

    fn try_from(index: i32) -> Result<Self> {
        method_from_index(&Self::ALL, "aggregation", index)
    }
}

impl TryFrom<i32> for SubpixelMethod {
    type Error = Error;

    fn try_from(index: i32) -> Result<Self> {
        method_from_index(&Self::ALL, "subpixel interpolation", index)
    }
}

impl fmt::Display for PixelMatchingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sd => "SD",
            Self::SdSobel => "SDSobel",
            Self::SdSobelBlend => "SDSobelBlend",
            Self::Ad => "AD",
            Self::AdSobel => "ADSobel",
            Self::AdSobelBlend => "ADSobelBlend",
            Self::Bt => "BT",
            Self::BtSobel => "BTSobel",
            Self::BtSobelBlend => "BTSobelBlend",
            Self::BtFull => "BTFull",
            Self::BtFullSobel => "BTFullSobel",
            Self::BtFullSobelBlend => "BTFullSobelBlend",
            Self::Census3x3 => "CENSUS3x3",
            Self::Census5x5 => "CENSUS5x5",
            Self::Census7x5 => "CENSUS7x5",
            Self::Census9x1 => "CENSUS9x1",
            Self::AdTextureBlend => "ADTextureBlend",
            Self::BtTextureBlend => "BTTextureBlend",
        };
        f.write_str(name)
    }
}

impl fmt::Display for AggregationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Box => "Box",
            Self::BoxShiftable => "BoxShiftable",
            Self::Gauss => "Gauss",
            Self::GaussShiftable => "GaussShiftable",
            Self::Guided => "Guided",
            Self::CrossBasedBox => "CrossBasedBox",
            Self::Bilateral => "Bilateral",
        };
        f.write_str(name)
    }
}

impl fmt::Display for SubpixelMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "NONE",
            Self::Quad => "QUAD",
            Self::Linear => "LINEAR",
        };
        f.write_str(name)
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_lookup_matches_enum_order() {
        assert_eq!(
            PixelMatchingMethod::try_from(6).unwrap(),
            PixelMatchingMethod::Bt
        );
        assert_eq!(
            PixelMatchingMethod::try_from(15).unwrap(),
            PixelMatchingMethod::Census9x1
        );
        assert_eq!(
            AggregationMethod::try_from(5).unwrap(),
            AggregationMethod::CrossBasedBox
        );
        assert_eq!(SubpixelMethod::try_from(2).unwrap(), SubpixelMethod::Linear);
    }

    #[test]
    fn unknown_index_is_a_config_error() {
        for index in &[-1, 18, 100] {
            match PixelMatchingMethod::try_from(*index) {
                Err(Error::UnknownMethod { kind, index: i }) => {
                    assert_eq!(kind, "pixel matching");
                    assert_eq!(i, *index);
                }
                other => panic!("expected UnknownMethod, got {:?}", other),
            }
        }
        assert!(AggregationMethod::try_from(7).is_err());
        assert!(SubpixelMethod::try_from(3).is_err());
    }

    #[test]
    fn json_overrides_defaults() {
        let params = Params::from_json_str(
            r#"{
                "pixel_matching_method": "census5x5",
                "aggregation_method": "gauss_shiftable",
                "number_of_disparities": 32,
                "min_disparity": -4
            }"#,
        )
        .unwrap();

        assert_eq!(params.pixel_matching_method, PixelMatchingMethod::Census5x5);
        assert_eq!(params.aggregation_method, AggregationMethod::GaussShiftable);
        assert_eq!(params.number_of_disparities, 32);
        assert_eq!(params.max_disparity(), 27);
        assert_eq!(params.invalid_disparity(), -5.0);
        assert!(params.is_lr_check);
    }

    #[test]
    fn unknown_method_name_fails_to_parse() {
        let res = Params::from_json_str(r#"{ "pixel_matching_method": "ncc" }"#);
        assert!(matches!(res, Err(Error::Config(_))));
    }

    #[test]
    fn zero_disparities_rejected() {
        let mut params = Params::default();
        params.number_of_disparities = 0;
        assert!(matches!(params.validate(), Err(Error::InvalidParams(_))));
    }

    #[test]
    fn weighted_mode_needs_uniqueness_weights() {
        let mut params = Params::default();
        params.is_weighted_mode_filter = true;
        assert!(params.validate().is_ok());

        params.is_uniqueness_filter = false;
        assert!(matches!(params.validate(), Err(Error::InvalidParams(_))));
    }

    #[test]
    fn names() {
        assert_eq!(PixelMatchingMethod::Census7x5.to_string(), "CENSUS7x5");
        assert_eq!(AggregationMethod::Guided.to_string(), "Guided");
        assert_eq!(SubpixelMethod::None.to_string(), "NONE");
    }
}
