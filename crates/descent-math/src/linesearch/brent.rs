//! Brent-style refinement of a bracketed minimum.

use log::trace;

use crate::error::{MathError, MathResult};
use crate::linesearch::{
    bracket_minimum, tolerance_floor, Bracket, LineSearchConfig, LineSearchResult, CPHI,
};

/// Refines a bracketed minimum with golden-section and parabolic steps.
///
/// Maintains the classical Brent line-search state: the best point `x`, the
/// second-best `w`, the previous second-best `v`, and the last two step sizes
/// `d` and `e`. Each iteration fits an inverse parabola through
/// `(x, w, v)` when the steps have been shrinking fast enough
/// (`|p| < |q·e/2|`) and the candidate stays inside the bracket; otherwise it
/// takes a golden-section step into the larger half of the bracket. Steps
/// smaller than the numerical tolerance floor are pushed out to it, so the
/// search cannot stall on a vanishing step.
///
/// Requires: `bracket.lower <= bracket.mid <= bracket.upper`
///
/// # Arguments
///
/// * `f` - Scalar function of the step length
/// * `bracket` - A bracket of the minimum, typically from [`bracket_minimum`]
/// * `config` - Line-search configuration
///
/// # Returns
///
/// The best step and value found. When the iteration budget runs out before
/// the tolerance test fires, the result carries `converged = false` and the
/// best point seen so far; this is routine, not an error.
///
/// # Example
///
/// ```rust
/// use descent_math::linesearch::{brent_refine, Bracket, LineSearchConfig};
///
/// let mut f = |t: f64| (t - 3.0) * (t - 3.0);
/// let bracket = Bracket::normalized(2.0, 2.8, 4.0);
///
/// let result = brent_refine(&mut f, bracket, &LineSearchConfig::default()).unwrap();
/// assert!((result.step - 3.0).abs() < 1e-3);
/// ```
#[allow(clippy::many_single_char_names)]
pub fn brent_refine<F>(
    mut f: F,
    bracket: Bracket,
    config: &LineSearchConfig,
) -> MathResult<LineSearchResult>
where
    F: FnMut(f64) -> f64,
{
    if bracket.mid < bracket.lower || bracket.mid > bracket.upper {
        return Err(MathError::InvalidBracket {
            lower: bracket.lower,
            mid: bracket.mid,
            upper: bracket.upper,
        });
    }

    let mut br_min = bracket.lower;
    let mut br_max = bracket.upper;
    let tol = config.parameter_tolerance;

    let mut x = bracket.mid;
    let mut w = x;
    let mut v = x;
    let mut e = 0.0_f64;
    let mut d = 0.0_f64;

    let mut fx = f(x);
    let mut fw = fx;
    let mut fv = fx;

    for n in 1..=config.max_iterations {
        let xm = 0.5 * (br_min + br_max);
        let tol1 = tolerance_floor(x);

        if (x - xm).abs() <= tol && (br_max - br_min) < 4.0 * tol {
            trace!("line search converged after {n} cycles: step {x:.6e}, value {fx:.6e}");
            return Ok(LineSearchResult {
                step: x,
                value: fx,
                iterations: n,
                converged: true,
            });
        }

        if e.abs() > tol1 {
            // Inverse-parabolic fit through (x, fx), (w, fw), (v, fv).
            let r = (fx - fv) * (x - w);
            let mut q = (fx - fw) * (x - v);
            let mut p = (x - v) * q - (x - w) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();

            if p.abs() >= (0.5 * q * e).abs() || p <= q * (br_min - x) || p >= q * (br_max - x) {
                // Interpolation unsafe: golden-section step into the larger half.
                e = if x >= xm { br_min - x } else { br_max - x };
                d = CPHI * e;
            } else {
                e = d;
                d = p / q;
                let u = x + d;
                if (u - br_min) < 2.0 * tol1 || (br_max - u) < 2.0 * tol1 {
                    d = (xm - x).signum() * tol1;
                }
            }
        } else {
            e = if x >= xm { br_min - x } else { br_max - x };
            d = CPHI * e;
        }

        // Never step by less than the tolerance floor.
        let u = if d.abs() >= tol1 {
            x + d
        } else {
            x + d.signum() * tol1
        };
        let fu = f(u);

        if fu <= fx {
            // Improvement: shrink the bracket on the side the old best came
            // from and rotate the bookkeeping points.
            if u >= x {
                br_min = x;
            } else {
                br_max = x;
            }
            v = w;
            w = x;
            x = u;
            fv = fw;
            fw = fx;
            fx = fu;
        } else {
            // No improvement: the trial point caps its side of the bracket.
            if u < x {
                br_min = u;
            } else {
                br_max = u;
            }
            if fu <= fw || w == x {
                v = w;
                w = u;
                fv = fw;
                fw = fu;
            } else if fu <= fv || v == x || v == w {
                v = u;
                fv = fu;
            }
        }

        trace!("line search cycle {n}: step {x:.6e}, value {fx:.6e}");
    }

    trace!(
        "line search budget exhausted after {} cycles: step {x:.6e}, value {fx:.6e}",
        config.max_iterations
    );
    Ok(LineSearchResult {
        step: x,
        value: fx,
        iterations: config.max_iterations,
        converged: false,
    })
}

/// Minimizes `f` along the line, bracketing first and then refining.
///
/// This is the combined entry point: a bracket is grown from the base step
/// `0.0` with trial step `config.initial_step`, then handed to
/// [`brent_refine`].
///
/// # Arguments
///
/// * `f` - Scalar function of the step length
/// * `fa` - Value of `f` at step `0.0`, supplied by the caller
/// * `config` - Line-search configuration
///
/// # Example
///
/// ```rust
/// use descent_math::linesearch::{brent_minimize, LineSearchConfig};
///
/// let mut f = |t: f64| (t - 3.0) * (t - 3.0);
/// let fa = f(0.0);
///
/// let result = brent_minimize(&mut f, fa, &LineSearchConfig::default()).unwrap();
/// assert!((result.step - 3.0).abs() < 1e-3);
/// assert!(result.value < 1e-6);
/// ```
pub fn brent_minimize<F>(
    mut f: F,
    fa: f64,
    config: &LineSearchConfig,
) -> MathResult<LineSearchResult>
where
    F: FnMut(f64) -> f64,
{
    if !config.initial_step.is_finite() || config.initial_step == 0.0 {
        return Err(MathError::invalid_input(format!(
            "initial step must be finite and nonzero, got {}",
            config.initial_step
        )));
    }

    let bracket = bracket_minimum(&mut f, 0.0, config.initial_step, fa);
    brent_refine(f, bracket, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_refine_quadratic() {
        let f = |t: f64| (t - 3.0) * (t - 3.0);
        let bracket = Bracket::normalized(2.0, 2.8, 4.0);

        let config = LineSearchConfig::default().with_max_iterations(50);
        let result = brent_refine(f, bracket, &config).unwrap();

        assert!(result.converged);
        assert_relative_eq!(result.step, 3.0, epsilon = 1e-3);
        assert!(result.value < 1e-6);
    }

    #[test]
    fn test_minimize_quadratic_from_origin() {
        let f = |t: f64| (t - 3.0) * (t - 3.0);

        let config = LineSearchConfig::default().with_max_iterations(50);
        let result = brent_minimize(f, f(0.0), &config).unwrap();

        assert!(result.converged);
        assert_relative_eq!(result.step, 3.0, epsilon = 1e-3);
        assert!(result.value < 1e-6);
    }

    #[test]
    fn test_default_budget_still_lands_on_the_minimum() {
        // The original ten-iteration default may run out before the bracket
        // collapses, but the best point itself is accurate long before that.
        let f = |t: f64| (t - 3.0) * (t - 3.0);

        let result = brent_minimize(f, f(0.0), &LineSearchConfig::default()).unwrap();

        assert_relative_eq!(result.step, 3.0, epsilon = 1e-3);
        assert!(result.value < 1e-6);
    }

    #[test]
    fn test_minimize_nearby_minimum() {
        // Minimum inside the initial step: exercises the shrink bracket.
        let f = |t: f64| (t - 0.2) * (t - 0.2) + 1.0;

        let result = brent_minimize(f, f(0.0), &LineSearchConfig::default()).unwrap();

        assert_relative_eq!(result.step, 0.2, epsilon = 1e-3);
        assert_relative_eq!(result.value, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_minimize_distant_minimum() {
        let f = |t: f64| (t - 40.0) * (t - 40.0);

        let config = LineSearchConfig::default().with_max_iterations(50);
        let result = brent_minimize(f, f(0.0), &config).unwrap();

        assert_relative_eq!(result.step, 40.0, epsilon = 1e-2);
    }

    #[test]
    fn test_minimize_negative_direction() {
        let f = |t: f64| (t + 5.0) * (t + 5.0);

        let config = LineSearchConfig::default().with_initial_step(-1.0);
        let result = brent_minimize(f, f(0.0), &config).unwrap();

        assert_relative_eq!(result.step, -5.0, epsilon = 1e-3);
    }

    #[test]
    fn test_exhausted_budget_reports_not_converged() {
        let f = |t: f64| (t - 3.0) * (t - 3.0);

        let config = LineSearchConfig::default().with_max_iterations(1);
        let result = brent_minimize(f, f(0.0), &config).unwrap();

        assert!(!result.converged);
        assert_eq!(result.iterations, 1);
        // Best-effort point is still inside the bracket around the minimum.
        assert!(result.step > 0.0);
    }

    #[test]
    fn test_nonquadratic_minimum() {
        // f(t) = cos(t) has a minimum at pi.
        let f = |t: f64| t.cos();

        let config = LineSearchConfig::default().with_max_iterations(50);
        let result = brent_minimize(f, f(0.0), &config).unwrap();

        assert_relative_eq!(result.step, std::f64::consts::PI, epsilon = 1e-3);
        assert_relative_eq!(result.value, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_invalid_bracket_rejected() {
        let f = |t: f64| t * t;
        let bracket = Bracket {
            lower: 1.0,
            mid: 5.0,
            upper: 2.0,
        };

        let result = brent_refine(f, bracket, &LineSearchConfig::default());

        assert!(matches!(result, Err(MathError::InvalidBracket { .. })));
    }

    #[test]
    fn test_zero_initial_step_rejected() {
        let f = |t: f64| t * t;

        let config = LineSearchConfig::default().with_initial_step(0.0);
        let result = brent_minimize(f, 0.0, &config);

        assert!(matches!(result, Err(MathError::InvalidInput { .. })));
    }

    #[test]
    fn test_tighter_tolerance_converges_closer() {
        let f = |t: f64| (t - 3.0) * (t - 3.0);

        let config = LineSearchConfig::default()
            .with_parameter_tolerance(1e-7)
            .with_max_iterations(100);
        let result = brent_minimize(f, f(0.0), &config).unwrap();

        assert!(result.converged);
        assert_relative_eq!(result.step, 3.0, epsilon = 1e-5);
    }
}
