use crate::config::NaturalChange;
use crate::util::std_normal::std_normal_cdf;

/// Regression-to-the-mean drift for one subject.
///
/// `u` is a uniform draw choosing the direction, `eps` a standard normal draw
/// setting the raw magnitude. Subjects further from `center` are more likely
/// to drift back toward it. The magnitude `|eps| * sd` is divided by
/// `damping` and then capped at `cap_fraction * |baseline|`.
pub(crate) fn natural_change(
    baseline: f64,
    center: f64,
    sd: f64,
    params: &NaturalChange,
    u: f64,
    eps: f64,
) -> f64 {
    let deviation = baseline - center;
    let p_regress = std_normal_cdf((deviation / sd).abs());
    let toward_center = if deviation > 0.0 { -1.0 } else { 1.0 };
    let direction = if u < p_regress {
        toward_center
    } else {
        -toward_center
    };
    let magnitude = (eps.abs() * sd / params.damping).min(params.cap_fraction * baseline.abs());
    direction * magnitude
}
