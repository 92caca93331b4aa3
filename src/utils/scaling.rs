// src/utils/scaling.rs

/// Median of the finite values in `values`, NaN if there are none.
/// Reorders `values`.
pub fn median(values: &mut [f32]) -> f32 {
    let mut n = 0;
    for i in 0..values.len() {
        if values[i].is_finite() {
            values.swap(n, i);
            n += 1;
        }
    }
    let finite = &mut values[..n];
    if finite.is_empty() {
        return f32::NAN;
    }
    finite.sort_unstable_by(f32::total_cmp);
    let mid = finite.len() / 2;
    if finite.len() % 2 == 0 {
        (finite[mid - 1] + finite[mid]) / 2.0
    } else {
        finite[mid]
    }
}

/// Convert digital numbers to physical units: `value * scale + offset`.
/// NaN (nodata) stays NaN.
pub fn rescale(data: &mut [f32], scale: f64, offset: f64) {
    if (scale - 1.0).abs() <= f64::EPSILON && offset == 0.0 {
        return;
    }
    for value in data.iter_mut() {
        if value.is_finite() {
            *value = (f64::from(*value) * scale + offset) as f32;
        }
    }
}

/// Replace a sentinel nodata value with NaN.
pub fn mask_nodata(data: &mut [f32], nodata: Option<f64>) {
    if let Some(nodata) = nodata {
        let nodata = nodata as f32;
        for value in data.iter_mut() {
            if *value == nodata {
                *value = f32::NAN;
            }
        }
    }
}
