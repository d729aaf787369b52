//! Golden-ratio bracketing of a one-dimensional minimum.

use log::trace;

use crate::linesearch::{Bracket, MAX_STEP, PHI, TINY};

/// Denominator clamp for the parabolic extrapolation.
///
/// Keeps the magnitude at least `TINY` while preserving the sign of `q - r`,
/// so near-collinear points cannot blow the jump up to infinity.
fn clamped(q_minus_r: f64) -> f64 {
    q_minus_r.signum() * q_minus_r.abs().max(TINY)
}

/// Brackets a local minimum of `f` along a one-dimensional direction.
///
/// Starting from the base step `a` (with known value `fa = f(a)`) and a trial
/// step `b`, searches for a triple of steps `(lower, mid, upper)` such that
/// `f(mid)` is no larger than the value at either end:
///
/// - If `f(b) > fa`, the minimum already lies between `a` and `b`; the trial
///   point is pulled back toward `a` by the golden ratio until the function
///   value drops to at most `fa`.
/// - Otherwise the interval grows outward geometrically
///   (`c = b + φ(b - a)`), with a parabolic jump through the last three
///   points whenever they suggest one. The jump is limited to `MAX_STEP`
///   times the current interval, and a jump that already encloses a minimum
///   returns immediately.
///
/// Degenerate parabolic denominators are clamped, never surfaced as errors,
/// and each iteration either returns a bracket or grows the interval, so the
/// search terminates.
///
/// # Arguments
///
/// * `f` - Scalar function of the step length
/// * `a` - Base step (usually `0.0`)
/// * `b` - Initial trial step (usually `1.0`)
/// * `fa` - Value of `f` at `a`, supplied by the caller to avoid recomputing
///
/// # Returns
///
/// A [`Bracket`] normalized so `lower < upper` regardless of the direction
/// the search grew in.
///
/// # Example
///
/// ```rust
/// use descent_math::linesearch::bracket_minimum;
///
/// let mut f = |t: f64| (t - 3.0) * (t - 3.0);
/// let fa = f(0.0);
///
/// let bracket = bracket_minimum(&mut f, 0.0, 1.0, fa);
/// assert!(bracket.lower < 3.0 && 3.0 < bracket.upper);
/// ```
#[allow(clippy::many_single_char_names)]
pub fn bracket_minimum<F>(mut f: F, a: f64, b: f64, fa: f64) -> Bracket
where
    F: FnMut(f64) -> f64,
{
    let mut a = a;
    let mut b = b;
    let mut fa = fa;
    let mut fb = f(b);

    if fb > fa {
        // The function rises at the trial step: a minimum sits between the
        // base point and b. Pull the trial point back by the golden ratio
        // until its value drops to at most fa.
        let mut c = b;
        b = a + (c - a) / PHI;
        fb = f(b);
        while fb > fa {
            c = b;
            b = a + (c - a) / PHI;
            fb = f(b);
        }
        let bracket = Bracket::normalized(a, b, c);
        trace!("bracket (shrink): {bracket:?}");
        return bracket;
    }

    // Still descending: grow outward geometrically, jumping ahead through
    // the parabola fitted to (a, b, c) when it points somewhere useful.
    let mut c = b + PHI * (b - a);
    let mut fc = f(c);

    while fb > fc {
        let r = (b - a) * (fb - fc);
        let q = (b - c) * (fb - fa);
        let mut u = b - ((b - c) * q - (b - a) * r) / (2.0 * clamped(q - r));
        let ulimit = b + MAX_STEP * (c - b);
        let mut fu;

        if (b - u) * (u - c) > 0.0 {
            // Parabolic candidate lies between b and c.
            fu = f(u);
            if fu < fc {
                let bracket = Bracket::normalized(b, u, c);
                trace!("bracket (parabolic, interior): {bracket:?}");
                return bracket;
            } else if fu > fb {
                let bracket = Bracket::normalized(a, b, u);
                trace!("bracket (parabolic, rise): {bracket:?}");
                return bracket;
            }
            // No decision between b and c: default growth past c.
            u = c + PHI * (c - b);
            fu = f(u);
        } else if (c - u) * (u - ulimit) > 0.0 {
            // Candidate between c and the extrapolation limit.
            fu = f(u);
            if fu < fc {
                b = c;
                c = u;
                u = c + PHI * (c - b);
                fb = fc;
                fc = fu;
                fu = f(u);
            }
        } else if (u - ulimit) * (ulimit - c) >= 0.0 {
            // Candidate beyond the limit: clamp to it.
            u = ulimit;
            fu = f(u);
        } else {
            // Candidate behind the interval: default growth.
            u = c + PHI * (c - b);
            fu = f(u);
        }

        a = b;
        b = c;
        c = u;
        fa = fb;
        fb = fc;
        fc = fu;
    }

    let bracket = Bracket::normalized(a, b, c);
    trace!("bracket (growth): {bracket:?}");
    bracket
}
