//! Scroll-to-bottom tracking for the message list.
//!
//! A scroll request is armed when the caller hands over a new message slice.
//! The first frame after the request only lets layout catch up with the new
//! rows; later frames ease the offset toward the bottom edge using a velocity
//! that ramps up quickly and decays slowly, independent of frame rate.

use std::time::Instant;

#[cfg(test)]
use gpui::Point;
use gpui::{ScrollHandle, point, px};

/// Slowest approach speed, reached when the bottom is within a few pixels.
const MIN_SCROLL_SPEED_PX_PER_SEC: f32 = 120.0;
/// Fastest approach speed, reached at `FULL_SPEED_DISTANCE` or further.
const MAX_SCROLL_SPEED_PX_PER_SEC: f32 = 2400.0;
const FULL_SPEED_DISTANCE: f32 = 600.0;
/// Time constant used while speeding up.
const VELOCITY_ATTACK_TIME: f32 = 0.05;
/// Time constant used while slowing down.
const VELOCITY_DECAY_TIME: f32 = 0.12;
/// Frame deltas above this are clamped so a stalled frame cannot jump the list.
const MAX_FRAME_DELTA_SECS: f32 = 0.05;
/// Remaining distance that is closed in a single snap.
const SNAP_DISTANCE: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ScrollPhase {
    #[default]
    Idle,
    AwaitingLayout,
    Animating,
}

/// Pure easing state for one scroll-to-bottom animation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmoothScroll {
    phase: ScrollPhase,
    velocity: f32,
}

impl SmoothScroll {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a new animation. Velocity carries over so back-to-back updates coast.
    pub fn request(&mut self) {
        self.phase = ScrollPhase::AwaitingLayout;
    }

    pub fn is_active(&self) -> bool {
        self.phase != ScrollPhase::Idle
    }

    #[cfg(test)]
    fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Advances the animation by one frame and returns the next offset, if any.
    ///
    /// `current_y` and `target_y` use the list's offset convention, where the
    /// bottom edge is the most negative value.
    pub fn step(&mut self, current_y: f32, target_y: f32, delta_secs: f32) -> Option<f32> {
        match self.phase {
            ScrollPhase::Idle => None,
            ScrollPhase::AwaitingLayout => {
                self.phase = ScrollPhase::Animating;
                None
            }
            ScrollPhase::Animating => self.advance(current_y, target_y, delta_secs),
        }
    }

    fn advance(&mut self, current_y: f32, target_y: f32, delta_secs: f32) -> Option<f32> {
        let delta_secs = delta_secs.clamp(0.0, MAX_FRAME_DELTA_SECS);
        let remaining = target_y - current_y;
        let distance = remaining.abs();

        if distance <= SNAP_DISTANCE {
            self.phase = ScrollPhase::Idle;
            self.velocity = 0.0;
            return (distance > 0.0).then_some(target_y);
        }

        let speed_factor = (distance / FULL_SPEED_DISTANCE).min(1.0);
        let target_speed = MIN_SCROLL_SPEED_PX_PER_SEC
            + (MAX_SCROLL_SPEED_PX_PER_SEC - MIN_SCROLL_SPEED_PX_PER_SEC) * speed_factor;
        let time_constant = if target_speed > self.velocity {
            VELOCITY_ATTACK_TIME
        } else {
            VELOCITY_DECAY_TIME
        };
        let alpha = 1.0 - (-delta_secs / time_constant).exp();
        self.velocity += (target_speed - self.velocity) * alpha;

        let travel = (self.velocity * delta_secs).min(distance);
        if travel <= 0.0 {
            return None;
        }

        Some(current_y + travel * remaining.signum())
    }
}

/// Owns the list scroll handle and drives bottom-follow animation from render.
pub struct ScrollManager {
    scroll_handle: ScrollHandle,
    animation: SmoothScroll,
    last_tick: Instant,
}

impl ScrollManager {
    pub fn new() -> Self {
        Self {
            scroll_handle: ScrollHandle::new(),
            animation: SmoothScroll::new(),
            last_tick: Instant::now(),
        }
    }

    pub fn handle(&self) -> &ScrollHandle {
        &self.scroll_handle
    }

    #[cfg(test)]
    pub(crate) fn is_scrolling(&self) -> bool {
        self.animation.is_active()
    }

    pub fn request_scroll_to_bottom(&mut self) {
        if !self.animation.is_active() {
            self.last_tick = Instant::now();
        }
        self.animation.request();
    }

    /// Runs one animation frame. Returns true while more frames are needed.
    pub fn apply_pending_scroll(&mut self) -> bool {
        let now = Instant::now();
        let delta_secs = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;

        if !self.animation.is_active() {
            return false;
        }

        let offset = self.scroll_handle.offset();
        let target_y = bottom_offset(f32::from(self.scroll_handle.max_offset().height));
        if let Some(next_y) = self.animation.step(f32::from(offset.y), target_y, delta_secs) {
            self.scroll_handle.set_offset(point(offset.x, px(next_y)));
        }

        self.animation.is_active()
    }

    #[cfg(test)]
    fn offset(&self) -> Point<gpui::Pixels> {
        self.scroll_handle.offset()
    }
}

impl Default for ScrollManager {
    fn default() -> Self {
        Self::new()
    }
}

// Scrolling down moves the offset negative, so the tail sits at `-max_offset`.
fn bottom_offset(max_offset: f32) -> f32 {
    if max_offset > 0.0 { -max_offset } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    fn run_to_completion(
        animation: &mut SmoothScroll,
        mut current_y: f32,
        target_y: f32,
    ) -> (f32, usize) {
        let mut frames = 0;
        while animation.is_active() && frames < 1_000 {
            if let Some(next_y) = animation.step(current_y, target_y, FRAME) {
                current_y = next_y;
            }
            frames += 1;
        }
        (current_y, frames)
    }

    #[test]
    fn idle_animation_never_moves() {
        let mut animation = SmoothScroll::new();

        assert!(!animation.is_active());
        assert_eq!(animation.step(0.0, -500.0, FRAME), None);
    }

    #[test]
    fn first_frame_after_request_waits_for_layout() {
        let mut animation = SmoothScroll::new();
        animation.request();

        assert_eq!(animation.step(0.0, -500.0, FRAME), None);
        assert!(animation.is_active());

        let next_y = animation.step(0.0, -500.0, FRAME);
        assert!(next_y.is_some_and(|y| y < 0.0 && y > -500.0));
    }

    #[test]
    fn animation_settles_exactly_on_bottom_edge() {
        let mut animation = SmoothScroll::new();
        animation.request();

        let (final_y, frames) = run_to_completion(&mut animation, 0.0, -1_800.0);

        assert_eq!(final_y, -1_800.0);
        assert!(frames > 2, "smooth scroll should take several frames");
        assert!(frames < 1_000);
        assert!(!animation.is_active());
        assert_eq!(animation.velocity(), 0.0);
    }

    #[test]
    fn target_moving_mid_animation_is_followed() {
        let mut animation = SmoothScroll::new();
        animation.request();

        let mut current_y = 0.0;
        for _ in 0..5 {
            if let Some(next_y) = animation.step(current_y, -400.0, FRAME) {
                current_y = next_y;
            }
        }

        // A new message grows the list while the animation is still running.
        animation.request();
        let (final_y, _) = run_to_completion(&mut animation, current_y, -900.0);

        assert_eq!(final_y, -900.0);
    }

    #[test]
    fn stalled_frames_are_clamped() {
        let mut animation = SmoothScroll::new();
        animation.request();
        animation.step(0.0, -10_000.0, FRAME);

        let next_y = animation.step(0.0, -10_000.0, 5.0).unwrap_or_default();

        assert!(next_y >= -MAX_SCROLL_SPEED_PX_PER_SEC * MAX_FRAME_DELTA_SECS);
    }

    #[test]
    fn bottom_offset_is_zero_for_short_content() {
        assert_eq!(bottom_offset(0.0), 0.0);
        assert_eq!(bottom_offset(-3.0), 0.0);
        assert_eq!(bottom_offset(250.0), -250.0);
    }

    #[test]
    fn manager_completes_request_when_list_fits_viewport() {
        let mut manager = ScrollManager::new();
        assert!(!manager.apply_pending_scroll());

        manager.request_scroll_to_bottom();
        assert!(manager.is_scrolling());

        // Layout frame, then the offset is already at the bottom of an unscrollable list.
        assert!(manager.apply_pending_scroll());
        assert!(!manager.apply_pending_scroll());
        assert!(!manager.is_scrolling());
        assert_eq!(f32::from(manager.offset().y), 0.0);
    }
}
