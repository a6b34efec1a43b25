//! # Cost planes
//!
//! Every per-pixel buffer of the pipeline (cost planes, cost maps, disparity) is a single
//! precision `ndarray` plane indexed `[row, column]`.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use ndarray::Array2;

// -----------------------------------------------------------------------------------------------
// TYPES
// -----------------------------------------------------------------------------------------------

/// A single precision plane indexed `[row, column]`.
pub type Plane = Array2<f32>;

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Make sure `plane` has the given `(rows, cols)` shape, reallocating only if it differs.
///
/// Returns `true` when the plane was reallocated. The contents are unspecified afterwards either
/// way, callers must overwrite every element before reading.
pub(crate) fn ensure_shape(plane: &mut Plane, shape: (usize, usize)) -> bool {
    if plane.dim() == shape {
        false
    } else {
        *plane = Plane::zeros(shape);
        true
    }
}

/// Make sure `planes` holds `count` planes of the given shape.
pub(crate) fn ensure_volume(planes: &mut Vec<Plane>, count: usize, shape: (usize, usize)) -> bool {
    let mut reallocated = planes.len() != count;
    planes.resize_with(count, || Plane::zeros(shape));
    for plane in planes.iter_mut() {
        reallocated |= ensure_shape(plane, shape);
    }
    reallocated
}

/// Clamp a signed coordinate into `0..len` (replicated border).
#[inline]
pub(crate) fn clamp_coord(v: isize, len: usize) -> usize {
    if v < 0 {
        0
    } else if v as usize >= len {
        len - 1
    } else {
        v as usize
    }
}
