//! Main-axis distribution.

use super::{SizeKind, SizeSpec};

/// Distributes `container` extent among children described by `specs`,
/// writing each child's main-axis extent to `out`.
///
/// Steps:
/// 1. Available extent = container - 2 * padding - gaps (never below zero).
/// 2. FIXED and PERCENT children take their clamped size first. PERCENT is a
///    fraction of the full `container` extent.
/// 3. GROW children split what is left by weight.
/// 4. Each GROW child is clamped; the clamped-off remainder is carried to the
///    next GROW child. One pass, front to back; a remainder left after the
///    last GROW child is dropped.
///
/// `gap` and `padding` are used as given; callers snap them first.
/// `out` must be at least `specs.len()` long.
pub fn distribute(container: f32, specs: &[SizeSpec], gap: f32, padding: f32, out: &mut [f32]) {
    distribute_by(container, specs.len(), |i| specs[i], gap, padding, out);
}

/// Same as [`distribute`], reading the `count` specs through `spec_at`.
pub(crate) fn distribute_by(
    container: f32,
    count: usize,
    spec_at: impl Fn(usize) -> SizeSpec,
    gap: f32,
    padding: f32,
    out: &mut [f32],
) {
    if count == 0 {
        return;
    }

    #[allow(clippy::cast_precision_loss)]
    let gaps = gap * (count - 1) as f32;
    let available = (container - padding * 2.0 - gaps).max(0.0);

    let mut claimed = 0.0;
    let mut total_weight = 0.0;
    for (i, size) in out.iter_mut().take(count).enumerate() {
        let spec = spec_at(i);
        match spec.kind {
            SizeKind::Fixed => {
                *size = spec.clamp(spec.value);
                claimed += *size;
            }
            SizeKind::Percent => {
                *size = spec.clamp(spec.value * container);
                claimed += *size;
            }
            SizeKind::Grow => {
                *size = 0.0;
                total_weight += spec.value.max(0.0);
            }
        }
    }

    let remaining = (available - claimed).max(0.0);
    let mut carry = 0.0;
    for (i, size) in out.iter_mut().take(count).enumerate() {
        let spec = spec_at(i);
        if spec.kind != SizeKind::Grow {
            continue;
        }
        let share = if total_weight > 0.0 {
            remaining * spec.value.max(0.0) / total_weight
        } else {
            0.0
        };
        let wanted = (share + carry).max(0.0);
        let clamped = spec.clamp(wanted);
        carry = wanted - clamped;
        *size = clamped;
    }
}
