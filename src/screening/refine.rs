use std::collections::HashMap;

use chrono::Duration;
use log::warn;

use crate::conjunction::Conjunction;

use super::cluster::Event;
use super::propagation::{probe_pair_distance_km, probe_pair_speed_m_s, Propagator};

/// Absolute time tolerance on the refined TCA, in seconds.
const TCA_TOLERANCE_S: f64 = 0.1;

/// Hard cap on distance evaluations per event.
const MAX_EVALUATIONS: u32 = 100;

/// (3 - sqrt(5)) / 2, the golden-section step fraction.
const GOLDEN_SECTION: f64 = 0.381_966_011_250_105;

/// Locate the within-event minimum of the pair distance and report it as a
/// conjunction candidate.
///
/// The bracket is the event span inflated by one sweep step on each side,
/// since the true minimum can fall just outside the discrete sample window.
/// Probes that fail to propagate evaluate to +inf, steering the minimizer
/// away; if the refined point itself cannot be evaluated the event is
/// dropped. Threshold filtering happens in the orchestrator, not here.
pub fn refine_event(
    event: &Event,
    propagators: &HashMap<u32, Propagator>,
    step_seconds: u32,
) -> Option<Conjunction> {
    let pair = event.pair;
    let bracket_start = event.start() - Duration::seconds(step_seconds as i64);
    let bracket_end = event.end() + Duration::seconds(step_seconds as i64);
    let span_s = (bracket_end - bracket_start).num_milliseconds() as f64 / 1000.0;

    let time_at = |offset_s: f64| {
        bracket_start + Duration::milliseconds((offset_s * 1000.0).round() as i64)
    };

    let (best_offset, miss_km) = brent_minimize(
        |offset_s| probe_pair_distance_km(pair, propagators, time_at(offset_s)),
        0.0,
        span_s,
        TCA_TOLERANCE_S,
        MAX_EVALUATIONS,
    );

    if !miss_km.is_finite() {
        warn!(
            "Dropping event for pair {}:{}: refined sample failed to propagate",
            pair.a, pair.b
        );
        return None;
    }

    let tca = time_at(best_offset);
    let Some(relative_velocity_m_s) = probe_pair_speed_m_s(pair, propagators, tca) else {
        warn!(
            "Dropping event for pair {}:{}: velocity propagation failed at TCA",
            pair.a, pair.b
        );
        return None;
    };

    Some(Conjunction {
        id: None,
        object1_norad_id: pair.a,
        object2_norad_id: pair.b,
        miss_distance_km: miss_km,
        time_of_closest_approach: tca,
        relative_velocity_m_s,
    })
}

/// Bracketed 1-D minimization by Brent's method: parabolic interpolation
/// where the fit is trustworthy, golden-section bisection otherwise.
/// Derivative-free, guaranteed interval reduction, absolute tolerance
/// `xatol` on the abscissa. Returns `(x_min, f(x_min))`.
///
/// Infinite or NaN objective values are tolerated: the parabolic step is
/// only taken from finite fit coefficients, and an infinite probe simply
/// shrinks the interval away from that side.
pub fn brent_minimize<F: FnMut(f64) -> f64>(
    mut f: F,
    lower: f64,
    upper: f64,
    xatol: f64,
    max_evaluations: u32,
) -> (f64, f64) {
    let (mut a, mut b) = (lower, upper);

    let mut x = a + GOLDEN_SECTION * (b - a);
    let mut w = x;
    let mut v = x;
    let mut fx = f(x);
    let mut fw = fx;
    let mut fv = fx;
    let mut evaluations = 1u32;

    // d: current step; e: step taken two iterations ago
    let mut d: f64 = 0.0;
    let mut e: f64 = 0.0;

    while evaluations < max_evaluations {
        let midpoint = 0.5 * (a + b);
        let tol = xatol;
        let tol2 = 2.0 * tol;
        if (x - midpoint).abs() <= tol2 - 0.5 * (b - a) {
            break;
        }

        let mut use_golden = true;
        if e.abs() > tol {
            // Parabola through (x, fx), (w, fw), (v, fv)
            let r = (x - w) * (fx - fv);
            let mut q = (x - v) * (fx - fw);
            let mut p = (x - v) * q - (x - w) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();
            let e_prev = e;
            e = d;

            if p.is_finite()
                && q.is_finite()
                && q != 0.0
                && p.abs() < (0.5 * q * e_prev).abs()
                && p > q * (a - x)
                && p < q * (b - x)
            {
                d = p / q;
                let u = x + d;
                // keep probes a full tolerance away from the bounds
                if u - a < tol2 || b - u < tol2 {
                    d = if x < midpoint { tol } else { -tol };
                }
                use_golden = false;
            }
        }
        if use_golden {
            e = if x < midpoint { b - x } else { a - x };
            d = GOLDEN_SECTION * e;
        }

        let u = if d.abs() >= tol {
            x + d
        } else if d >= 0.0 {
            x + tol
        } else {
            x - tol
        };
        let fu = f(u);
        evaluations += 1;

        if fu <= fx {
            if u < x {
                b = x;
            } else {
                a = x;
            }
            v = w;
            fv = fw;
            w = x;
            fw = fx;
            x = u;
            fx = fu;
        } else {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if fu <= fw || w == x {
                v = w;
                fv = fw;
                w = u;
                fw = fu;
            } else if fu <= fv || v == x || v == w {
                v = u;
                fv = fu;
            }
        }
    }

    (x, fx)
}
