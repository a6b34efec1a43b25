//! # Disparity statistics
//!
//! Histogram of a disparity map and a plot of it, for inspecting the distribution of
//! disparities a parameter set produces.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::path::Path;

use plotters::prelude::*;

use crate::disparity::DisparityMap;
use crate::error::*;

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Count the valid pixels of `map` per integer disparity, in increasing disparity order.
pub fn disparity_histogram(map: &DisparityMap) -> Vec<(i32, usize)> {
    let (min, max) = match (map.min_disp, map.max_disp) {
        (Some(min), Some(max)) => (min.round() as i32, max.round() as i32),
        _ => return Vec::new(),
    };

    let mut bins = vec![0usize; (max - min + 1) as usize];
    for &d in map.data().iter().filter(|&&d| d != map.invalid()) {
        let bin = (d.round() as i32 - min).max(0).min(max - min) as usize;
        bins[bin] += 1;
    }

    bins.into_iter()
        .enumerate()
        .map(|(i, count)| (min + i as i32, count))
        .collect()
}

/// Plot the disparity histogram of `map` into a PNG at `path`.
pub fn plot_disparity_histogram<P: AsRef<Path>>(map: &DisparityMap, path: P) -> Result<()> {
    let histogram = disparity_histogram(map);
    let (first, last) = match (histogram.first(), histogram.last()) {
        (Some(first), Some(last)) => (first.0, last.0),
        _ => return Err(Error::Plot("no valid disparities to plot".into())),
    };
    let peak = histogram.iter().map(|(_, c)| *c).max().unwrap_or(0);

    let root = BitMapBackend::new(path.as_ref(), (800, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Disparity histogram", ("sans-serif", 20).into_font())
        .margin(5)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_ranged(first..last + 1, 0..peak + 1)
        .map_err(plot_error)?;

    chart.configure_mesh().draw().map_err(plot_error)?;

    chart
        .draw_series(LineSeries::new(histogram, &BLUE))
        .map_err(plot_error)?
        .label("Valid pixels")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(plot_error)?;

    Ok(())
}

fn plot_error<E: std::fmt::Debug>(e: E) -> Error {
    Error::Plot(format!("{:?}", e))
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_counts_valid_pixels() {
        let mut map = DisparityMap::new(4, 1, -1.0);
        map.put(0, 0, 2.2);
        map.put(1, 0, 1.9);
        map.put(2, 0, 4.0);
        map.min_disp = Some(1.9);
        map.max_disp = Some(4.0);

        assert_eq!(
            disparity_histogram(&map),
            vec![(2, 2), (3, 0), (4, 1)]
        );
    }

    #[test]
    fn empty_map_has_no_histogram() {
        let map = DisparityMap::new(3, 3, -1.0);
        assert!(disparity_histogram(&map).is_empty());
    }
}
