//! Utility functions.

/// Returns `num` evenly spaced values over the closed interval [`start`, `stop`].
///
/// The first value is exactly `start` and the last exactly `stop`. With `num` of
/// one, only `start` is returned; with zero, the result is empty.
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            (0..num)
                .map(|i| {
                    if i == num - 1 {
                        stop
                    } else {
                        step.mul_add(i as f64, start)
                    }
                })
                .collect()
        }
    }
}
