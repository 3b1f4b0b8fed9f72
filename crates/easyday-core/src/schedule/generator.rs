//! The schedule generator: formula in, time-stamped day out.

use crate::clock::ClockTime;
use crate::formula::{CyclePhase, PhaseLabels};

use super::{ItemKind, ScheduleItem};

/// Generate one day's schedule from a wake time and an ordered phase list.
///
/// Emits an Eat, Activity, and Sleep item per phase, advancing a running
/// clock by each duration, then one trailing Your-Time item of duration
/// zero. Zero-duration phases still emit their item. Wall-clock starts
/// wrap at midnight; downstream consumers track absolute elapsed minutes
/// from the wake time to disambiguate same-looking times on different
/// days.
///
/// Pure function of its input: same arguments, same output, no I/O.
pub fn generate(wake: ClockTime, phases: &[CyclePhase], labels: &PhaseLabels) -> Vec<ScheduleItem> {
    let mut items = Vec::with_capacity(phases.len() * 3 + 1);
    let mut clock = wake;
    let mut order = 0u32;

    let mut push = |items: &mut Vec<ScheduleItem>, clock: &mut ClockTime, order: &mut u32, kind, label, duration_min| {
        items.push(ScheduleItem {
            order: *order,
            kind,
            label,
            start: *clock,
            duration_min,
        });
        *clock = clock.wrapping_add(duration_min);
        *order += 1;
    };

    for (cycle, phase) in phases.iter().enumerate() {
        let n = cycle + 1;
        push(
            &mut items,
            &mut clock,
            &mut order,
            ItemKind::Eat,
            format!("{} {}", labels.eat, n),
            phase.eat_min,
        );
        push(
            &mut items,
            &mut clock,
            &mut order,
            ItemKind::Activity,
            format!("{} {}", labels.activity, n),
            phase.activity_min,
        );
        push(
            &mut items,
            &mut clock,
            &mut order,
            ItemKind::Sleep,
            format!("{} {}", labels.sleep, n),
            phase.sleep_min,
        );
    }

    push(
        &mut items,
        &mut clock,
        &mut order,
        ItemKind::YourTime,
        labels.your_time.clone(),
        0,
    );

    items
}
