//! Periodic sampler: one invocation per control cycle
//!
//! The host's fixed-period scheduler calls [`run_cycle`] once per cycle.
//! The call is bounded and non-blocking, and it cannot fail: a directory
//! read error on the sample path skips that channel rather than disturb
//! the control cycle.

use crate::codec;
use crate::directory::ProcessDirectory;
use crate::types::{Sample, TriggerMode};

use super::AcquisitionContext;

/// Advance the acquisition state by one control cycle
///
/// - Capturing: one sample per active channel in index order, stopping
///   mid-iteration once the ring is full; the trigger moves to Complete
///   in the same cycle the final sample lands.
/// - Armed: read the trigger source, evaluate the edge, re-baseline.
///   When the edge fires, capture begins on the following cycle.
/// - Idle / Complete: nothing to do.
pub fn run_cycle(ctx: &mut AcquisitionContext, directory: &mut dyn ProcessDirectory) {
    match ctx.trigger.mode() {
        TriggerMode::Capturing => capture_cycle(ctx, directory),
        TriggerMode::ArmedHigh | TriggerMode::ArmedLow | TriggerMode::ArmedChange => {
            evaluate_edge(ctx, directory)
        }
        TriggerMode::Idle | TriggerMode::Complete => {}
    }
}

fn capture_cycle(ctx: &mut AcquisitionContext, directory: &mut dyn ProcessDirectory) {
    let AcquisitionContext {
        channels,
        trigger,
        ring,
    } = ctx;

    if ring.is_full() {
        trigger.complete();
        return;
    }

    for (index, binding) in channels.active() {
        if ring.is_full() {
            break;
        }
        match directory.read_cell(binding.handle, binding.kind) {
            Ok(cell) => match codec::decode(cell) {
                Some(value) => {
                    ring.push(Sample {
                        channel: index,
                        value,
                    });
                }
                None => {
                    tracing::trace!(channel = index, code = cell.type_code, "unrecognized type code, sample skipped");
                }
            },
            Err(e) => {
                tracing::trace!(channel = index, error = %e, "channel read failed, sample skipped");
            }
        }
    }

    if ring.is_full() {
        trigger.complete();
    }
}

fn evaluate_edge(ctx: &mut AcquisitionContext, directory: &mut dyn ProcessDirectory) {
    let Some(source) = ctx.trigger.source() else {
        return;
    };
    match directory.read_cell(source.handle, source.kind) {
        Ok(cell) => {
            if let Some(value) = codec::decode(cell) {
                if ctx.trigger.evaluate(value.as_f64()) {
                    tracing::debug!(value = value.as_f64(), threshold = ctx.trigger.threshold(), "trigger fired");
                }
            }
        }
        Err(e) => {
            tracing::trace!(error = %e, "trigger source read failed");
        }
    }
}
