//= IMPORTS ==================================================================

use glam::Vec3;

//= TYPES ====================================================================

pub(crate) type Color = Vec3;

//= CONSTANTS ================================================================

// Fixed constants of the hue walk. Deliberately not configurable per
// instance, and the 0.5 vs 0.25 asymmetry is kept as-is.
const WALK_FLOOR: f32 = 0.0;
const WALK_CEILING: f32 = 5.0;
const FULL_RATE: f32 = 0.5;
const EBB_RATE: f32 = 0.25;

//= PULSATE ==================================================================

/// Phase of the 2-state oscillator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum PulsePhase {
    #[default]
    Rising,
    Falling,
}

/// Advance the oscillator by one frame. All three channels move together by
/// `step * 0.5`. The comparisons are strict and nothing is clamped, so the
/// colour overshoots the band before the direction flips.
pub(crate) fn pulsate(
    phase: PulsePhase,
    colour: &mut Color,
    min: Color,
    max: Color,
    step: f32,
) -> PulsePhase {
    match phase {
        PulsePhase::Rising => {
            *colour += Vec3::splat(FULL_RATE * step);
            if colour.x > max.x && colour.y > max.y && colour.z > max.z {
                return PulsePhase::Falling;
            }
        }
        PulsePhase::Falling => {
            *colour -= Vec3::splat(FULL_RATE * step);
            if colour.x < min.x && colour.y < min.y && colour.z < min.z {
                return PulsePhase::Rising;
            }
        }
    }
    phase
}

//= HUE WALK =================================================================

/// Phase of the 6-state hue walk. Each state moves one or two channels in a
/// fixed direction; the walk cycles forever.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum WalkPhase {
    #[default]
    RedFade,
    RedFlare,
    GreenFade,
    GreenFlare,
    BlueFade,
    BlueFlare,
}

/// Advance the hue walk by one frame.
pub(crate) fn change_colour(phase: WalkPhase, colour: &mut Color, step: f32) -> WalkPhase {
    match phase {
        WalkPhase::RedFade => {
            colour.x -= FULL_RATE * step;
            if colour.x < WALK_FLOOR {
                return WalkPhase::RedFlare;
            }
        }
        WalkPhase::RedFlare => {
            colour.x += FULL_RATE * step;
            if colour.x > WALK_CEILING {
                return WalkPhase::GreenFade;
            }
        }
        WalkPhase::GreenFade => {
            colour.y -= FULL_RATE * step;
            if colour.y < WALK_FLOOR {
                return WalkPhase::GreenFlare;
            }
        }
        WalkPhase::GreenFlare => {
            colour.x -= EBB_RATE * step;
            colour.y += FULL_RATE * step;
            if colour.y > WALK_CEILING {
                return WalkPhase::BlueFade;
            }
        }
        WalkPhase::BlueFade => {
            colour.z -= FULL_RATE * step;
            if colour.z < WALK_FLOOR {
                return WalkPhase::BlueFlare;
            }
        }
        WalkPhase::BlueFlare => {
            colour.y -= EBB_RATE * step;
            colour.z += FULL_RATE * step;
            if colour.z > WALK_CEILING {
                return WalkPhase::RedFade;
            }
        }
    }
    phase
}

//= COLOR CYCLE ==============================================================

/// The cycling effect attached to a light, if any. The phase lives here, next
/// to the parameters of the variant that uses it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum ColorCycle {
    Steady,
    Pulse {
        min: Color,
        max: Color,
        phase: PulsePhase,
    },
    HueWalk {
        rate: f32,
        phase: WalkPhase,
    },
}

impl ColorCycle {
    /// Advance the cycle by one frame, mutating `colour` in place.
    /// `step` is the elapsed-time-scaled value computed by the caller.
    pub(crate) fn advance(&mut self, colour: &mut Color, step: f32) {
        match self {
            ColorCycle::Steady => {}
            ColorCycle::Pulse { min, max, phase } => {
                *phase = pulsate(*phase, colour, *min, *max, step);
            }
            ColorCycle::HueWalk { rate, phase } => {
                *phase = change_colour(*phase, colour, step * *rate);
            }
        }
    }
}

//= TESTS ====================================================================
