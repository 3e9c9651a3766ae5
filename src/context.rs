//! Shared frame context
//!
//! Explicit cross-component state handed to every stage of the tick: the frame
//! clock, the exclusive-input owner (with its release grace window) and the
//! broadcast camera mode. Components check ownership here before acting on a
//! pointer gesture.

use crate::camera::CameraMode;
use std::time::{Duration, Instant};

/// Which gesture recognizer currently owns pointer input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOwner {
    Gizmo,
    CameraDrag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipState {
    Free,
    Held(InputOwner),
    /// Owner let go but the claim lingers until the deadline
    Releasing { owner: InputOwner, until: Instant },
}

#[derive(Debug, Clone)]
pub struct FrameContext {
    pub now: Instant,
    pub delta_time: f32,
    pub frame_number: u64,
    pub ownership: OwnershipState,
    pub camera_mode: CameraMode,
}

impl FrameContext {
    pub fn new(now: Instant) -> Self {
        Self {
            now,
            delta_time: 0.0,
            frame_number: 0,
            ownership: OwnershipState::Free,
            camera_mode: CameraMode::Orbit,
        }
    }
}

/// Move the clock forward and expire a finished release grace window
pub fn advance_context(ctx: &mut FrameContext, now: Instant, delta_time: f32) {
    ctx.now = now;
    ctx.delta_time = if delta_time.is_finite() && delta_time > 0.0 {
        delta_time
    } else {
        0.0
    };
    ctx.frame_number += 1;

    if let OwnershipState::Releasing { owner, until } = ctx.ownership {
        if now >= until {
            log::trace!("[Context] {:?} input grace expired", owner);
            ctx.ownership = OwnershipState::Free;
        }
    }
}

/// True while any owner holds input, including during a release grace window
pub fn is_input_exclusive(ctx: &FrameContext) -> bool {
    !matches!(ctx.ownership, OwnershipState::Free)
}

pub fn input_owner(ctx: &FrameContext) -> Option<InputOwner> {
    match ctx.ownership {
        OwnershipState::Free => None,
        OwnershipState::Held(owner) | OwnershipState::Releasing { owner, .. } => Some(owner),
    }
}

/// True only while the owner is actively holding (not in its grace window)
pub fn is_held_by(ctx: &FrameContext, owner: InputOwner) -> bool {
    ctx.ownership == OwnershipState::Held(owner)
}

/// Claim exclusive input. Succeeds when free or when the same owner re-claims.
pub fn claim_exclusive_input(ctx: &mut FrameContext, owner: InputOwner) -> bool {
    match ctx.ownership {
        OwnershipState::Free => {
            ctx.ownership = OwnershipState::Held(owner);
            true
        }
        OwnershipState::Held(current) | OwnershipState::Releasing { owner: current, .. }
            if current == owner =>
        {
            ctx.ownership = OwnershipState::Held(owner);
            true
        }
        _ => false,
    }
}

/// Start the grace window for `owner`. No-op if someone else holds input.
pub fn release_exclusive_input(ctx: &mut FrameContext, owner: InputOwner, grace: Duration) {
    if ctx.ownership != OwnershipState::Held(owner) {
        return;
    }
    ctx.ownership = if grace.is_zero() {
        OwnershipState::Free
    } else {
        OwnershipState::Releasing {
            owner,
            until: ctx.now + grace,
        }
    };
}
