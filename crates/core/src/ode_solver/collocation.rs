/// Highest supported collocation polynomial degree.
pub const MAX_POLYNOMIAL_DEGREE: usize = 9;

const SCAN_INTERVALS: usize = 1000;
const BISECTION_ITERS: usize = 200;

/// Placement of the collocation points inside an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub enum CollocationMethod {
    /// Gauss-Legendre points, all strictly inside the interval.
    #[default]
    Legendre,
    /// Gauss-Radau points, the last one on the interval end.
    Radau,
}

impl CollocationMethod {
    /// Returns the `degree` collocation points on `[0, 1]`, in increasing order.
    #[must_use]
    pub fn points(self, degree: usize) -> Vec<f64> {
        match self {
            CollocationMethod::Legendre => interior_roots(|x| shifted_legendre(degree, x)),
            CollocationMethod::Radau => {
                let mut points = interior_roots(|x| {
                    shifted_legendre(degree, x) - shifted_legendre(degree.saturating_sub(1), x)
                });
                points.push(1.0);
                points
            }
        }
    }
}

/// Evaluates the Legendre polynomial of degree `n` at `2x - 1`.
fn shifted_legendre(n: usize, x: f64) -> f64 {
    let t = 2.0 * x - 1.0;
    let (mut previous, mut current) = (1.0, t);
    if n == 0 {
        return previous;
    }
    for k in 1..n {
        #[allow(clippy::cast_precision_loss)]
        let k = k as f64;
        let next = ((2.0 * k + 1.0) * t * current - k * previous) / (k + 1.0);
        previous = current;
        current = next;
    }
    current
}

/// Finds the roots of `f` in `[0, 1)` by sign-change scan and bisection.
fn interior_roots(f: impl Fn(f64) -> f64) -> Vec<f64> {
    #[allow(clippy::cast_precision_loss)]
    let grid = |i: usize| i as f64 / SCAN_INTERVALS as f64;

    let mut roots = Vec::new();
    for i in 0..SCAN_INTERVALS {
        let (a, b) = (grid(i), grid(i + 1));
        let (fa, fb) = (f(a), f(b));
        if fa == 0.0 {
            roots.push(a);
        } else if fa * fb < 0.0 {
            roots.push(bisect(&f, a, b, fa));
        }
    }
    roots
}

fn bisect(f: &impl Fn(f64) -> f64, mut a: f64, mut b: f64, mut fa: f64) -> f64 {
    for _ in 0..BISECTION_ITERS {
        let mid = 0.5 * (a + b);
        let fm = f(mid);
        if fm == 0.0 || b - a <= f64::EPSILON {
            return mid;
        }
        if fa * fm < 0.0 {
            b = mid;
        } else {
            a = mid;
            fa = fm;
        }
    }
    0.5 * (a + b)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn legendre_points_of_degree_two() {
        let points = CollocationMethod::Legendre.points(2);

        assert_eq!(points.len(), 2);
        assert_relative_eq!(points[0], 0.211_324_865_4, epsilon = 1e-9);
        assert_relative_eq!(points[1], 0.788_675_134_6, epsilon = 1e-9);
    }

    #[test]
    fn radau_points_of_degree_three() {
        let points = CollocationMethod::Radau.points(3);

        assert_eq!(points.len(), 3);
        assert_relative_eq!(points[0], 0.155_051_025_7, epsilon = 1e-9);
        assert_relative_eq!(points[1], 0.644_948_974_3, epsilon = 1e-9);
        assert_relative_eq!(points[2], 1.0);
    }

    #[test]
    fn every_degree_yields_sorted_points_inside_interval() {
        for degree in 1..=MAX_POLYNOMIAL_DEGREE {
            for method in [CollocationMethod::Legendre, CollocationMethod::Radau] {
                let points = method.points(degree);

                assert_eq!(points.len(), degree, "{method:?} degree {degree}");
                assert!(points.windows(2).all(|w| w[0] < w[1]));
                assert!(points.iter().all(|p| *p > 0.0 && *p <= 1.0));
            }
        }
    }

    #[test]
    fn legendre_degree_one_is_midpoint() {
        let points = CollocationMethod::Legendre.points(1);
        assert_relative_eq!(points[0], 0.5, epsilon = 1e-12);
    }
}
