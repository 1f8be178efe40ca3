use std::f64;

/// Determinant threshold below which the graph is treated as singular.
pub const DEFAULT_SINGULAR_EPSILON: f64 = 1e-10;

/// Multiplies `gains` together, returning `None` once the running product
/// leaves the finite range.
pub fn finite_product<I>(gains: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut product = 1.0f64;
    for gain in gains {
        product *= gain;
        if !product.is_finite() {
            return None;
        }
    }
    Some(product)
}

/// Sums `values` with Neumaier's compensated summation.
///
/// Group gains at one order can differ by many magnitudes (a large loop gain
/// next to a product of several small ones); naive accumulation drops the
/// small terms once the running sum grows.
pub fn compensated_sum<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let mut sum = 0.0f64;
    let mut compensation = 0.0f64;

    for v in values {
        let t = sum + v;
        if sum.abs() >= v.abs() {
            compensation += (sum - t) + v;
        } else {
            compensation += (v - t) + sum;
        }
        sum = t;
    }

    sum + compensation
}

/// Sign of the order-`k` term in the determinant: negative for odd orders.
pub fn alternating_sign(order: usize) -> f64 {
    if order % 2 == 1 { -1.0 } else { 1.0 }
}

/// True when `value` is closer to zero than `eps`.
pub fn is_negligible(value: f64, eps: f64) -> bool {
    value.abs() < eps
}
