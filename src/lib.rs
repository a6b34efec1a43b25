//! # Disparity Computation
//!
//! This crate provides disparity map computation for stereo computer vision.
//!
//! Matching is done by [`stereo::StereoBase`], a local block matcher: a pixel matching cost is
//! computed for every candidate disparity, aggregated over a support window, and the cheapest
//! disparity selected, refined and validated. Every stage is selected through
//! [`params::Params`].

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod aggregate;
pub mod cost;
mod disparity;
mod error;
mod filter;
mod frame;
pub mod params;
pub mod plane;
pub mod postfilter;
pub mod prefilter;
pub mod stereo;
pub mod subpixel;
pub mod wta;

#[cfg(feature = "statistics")]
pub mod statistics;

// -----------------------------------------------------------------------------------------------
// EXPORTS
// -----------------------------------------------------------------------------------------------

pub use error::{Error, Result};

pub mod prelude {
    pub use crate::disparity::{DisparityAlgorithm, DisparityMap};
    pub use crate::error::{Error, Result};
    pub use crate::frame::StereoFrame;
    pub use crate::params::{
        AggregationMethod, LrCheckMethod, Params, PixelMatchingMethod, SpeckleConnectivity,
        SubpixelMethod,
    };
    pub use crate::stereo::StereoBase;
}
