//! Bounded derivative-free minimization for smoothing parameter estimation.

/// Outcome of a bounded simplex search.
#[derive(Debug, Clone)]
pub struct Minimum {
    /// Best point found, inside the bounds.
    pub point: Vec<f64>,
    /// Objective value at `point`.
    pub value: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the simplex collapsed below the tolerance.
    pub converged: bool,
}

/// Configuration for the simplex search.
#[derive(Debug, Clone)]
pub struct SimplexConfig {
    /// Hard iteration cap; the search always terminates.
    pub max_iter: usize,
    /// Spread of objective values below which the search stops.
    pub tolerance: f64,
    /// Initial step along each axis, relative to the bound width.
    pub initial_step: f64,
}

impl Default for SimplexConfig {
    fn default() -> Self {
        Self {
            max_iter: 500,
            tolerance: 1e-8,
            initial_step: 0.1,
        }
    }
}

const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Minimize `objective` over the box `bounds` with the Nelder-Mead method.
///
/// Every candidate is projected back into the box before evaluation, so the
/// objective never sees out-of-range parameters. Non-finite objective values
/// are treated as `f64::MAX`.
///
/// # Example
/// ```
/// use claims_forecast::utils::optimization::{minimize_bounded, SimplexConfig};
///
/// let best = minimize_bounded(
///     |p| (p[0] - 0.3).powi(2) + (p[1] - 0.7).powi(2),
///     &[0.5, 0.5],
///     &[(0.0, 1.0), (0.0, 1.0)],
///     &SimplexConfig::default(),
/// );
/// assert!((best.point[0] - 0.3).abs() < 1e-3);
/// assert!((best.point[1] - 0.7).abs() < 1e-3);
/// ```
pub fn minimize_bounded<F>(
    objective: F,
    initial: &[f64],
    bounds: &[(f64, f64)],
    config: &SimplexConfig,
) -> Minimum
where
    F: Fn(&[f64]) -> f64,
{
    let dim = initial.len();
    let eval = |p: &[f64]| {
        let v = objective(p);
        if v.is_finite() {
            v
        } else {
            f64::MAX
        }
    };
    let project = |p: Vec<f64>| -> Vec<f64> {
        p.into_iter()
            .enumerate()
            .map(|(i, x)| match bounds.get(i) {
                Some(&(lo, hi)) => x.clamp(lo, hi),
                None => x,
            })
            .collect()
    };

    if dim == 0 {
        return Minimum {
            point: Vec::new(),
            value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }

    let start = project(initial.to_vec());
    let mut simplex = vec![start.clone()];
    for i in 0..dim {
        let width = bounds.get(i).map(|&(lo, hi)| hi - lo).unwrap_or(1.0);
        let mut vertex = start.clone();
        let step = config.initial_step * width;
        // Step inward when the start sits on the upper bound.
        vertex[i] = match bounds.get(i) {
            Some(&(_, hi)) if vertex[i] + step > hi => vertex[i] - step,
            _ => vertex[i] + step,
        };
        simplex.push(project(vertex));
    }
    let mut values: Vec<f64> = simplex.iter().map(|v| eval(v)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;

        let mut order: Vec<usize> = (0..=dim).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        simplex = order.iter().map(|&i| simplex[i].clone()).collect();
        values = order.iter().map(|&i| values[i]).collect();

        if (values[dim] - values[0]).abs() < config.tolerance {
            converged = true;
            break;
        }

        let centroid: Vec<f64> = (0..dim)
            .map(|j| simplex[..dim].iter().map(|v| v[j]).sum::<f64>() / dim as f64)
            .collect();
        let toward = |from: &[f64], coef: f64| -> Vec<f64> {
            centroid
                .iter()
                .zip(from)
                .map(|(c, x)| c + coef * (x - c))
                .collect()
        };

        let reflected = project(toward(&simplex[dim], -REFLECT));
        let f_reflected = eval(&reflected);

        if f_reflected < values[0] {
            let expanded = project(toward(&reflected, EXPAND));
            let f_expanded = eval(&expanded);
            if f_expanded < f_reflected {
                simplex[dim] = expanded;
                values[dim] = f_expanded;
            } else {
                simplex[dim] = reflected;
                values[dim] = f_reflected;
            }
            continue;
        }

        if f_reflected < values[dim - 1] {
            simplex[dim] = reflected;
            values[dim] = f_reflected;
            continue;
        }

        let (candidate, limit) = if f_reflected < values[dim] {
            (project(toward(&reflected, CONTRACT)), f_reflected)
        } else {
            (project(toward(&simplex[dim], CONTRACT)), values[dim])
        };
        let f_candidate = eval(&candidate);
        if f_candidate < limit {
            simplex[dim] = candidate;
            values[dim] = f_candidate;
            continue;
        }

        let best = simplex[0].clone();
        for k in 1..=dim {
            let shrunk: Vec<f64> = best
                .iter()
                .zip(&simplex[k])
                .map(|(b, x)| b + SHRINK * (x - b))
                .collect();
            simplex[k] = project(shrunk);
            values[k] = eval(&simplex[k]);
        }
    }

    let best = values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i)
        .unwrap_or(0);

    Minimum {
        point: simplex[best].clone(),
        value: values[best],
        iterations,
        converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn finds_interior_minimum() {
        let best = minimize_bounded(
            |p| (p[0] - 0.25).powi(2) + (p[1] - 0.6).powi(2),
            &[0.5, 0.5],
            &[(0.0, 1.0), (0.0, 1.0)],
            &SimplexConfig::default(),
        );
        assert!(best.converged);
        assert_relative_eq!(best.point[0], 0.25, epsilon = 1e-3);
        assert_relative_eq!(best.point[1], 0.6, epsilon = 1e-3);
    }

    #[test]
    fn respects_bounds() {
        let best = minimize_bounded(
            |p| (p[0] - 5.0).powi(2),
            &[0.5],
            &[(0.0, 1.0)],
            &SimplexConfig::default(),
        );
        assert_relative_eq!(best.point[0], 1.0, epsilon = 1e-4);
    }

    #[test]
    fn start_on_upper_bound() {
        let best = minimize_bounded(
            |p| (p[0] - 0.2).powi(2),
            &[1.0],
            &[(0.0, 1.0)],
            &SimplexConfig::default(),
        );
        assert_relative_eq!(best.point[0], 0.2, epsilon = 1e-3);
    }

    #[test]
    fn non_finite_objective_is_avoided() {
        let best = minimize_bounded(
            |p| if p[0] > 0.5 { f64::NAN } else { (p[0] - 0.3).powi(2) },
            &[0.4],
            &[(0.0, 1.0)],
            &SimplexConfig::default(),
        );
        assert!(best.point[0] <= 0.5);
        assert!(best.value.is_finite());
    }

    #[test]
    fn iteration_cap_terminates() {
        let config = SimplexConfig {
            max_iter: 3,
            ..Default::default()
        };
        let best = minimize_bounded(
            |p| p.iter().map(|x| x * x).sum(),
            &[0.9, 0.9, 0.9],
            &[(-1.0, 1.0); 3],
            &config,
        );
        assert_eq!(best.iterations, 3);
        assert!(!best.converged);
    }

    #[test]
    fn empty_initial() {
        let best = minimize_bounded(|_| 0.0, &[], &[], &SimplexConfig::default());
        assert!(!best.converged);
        assert!(best.value.is_nan());
    }
}
