//! d3-blueprint animation system
//!
//! Time-bounded attribute transitions for the scene.
//!
//! # Features
//!
//! - **Easing**: the common polynomial, sine, exponential and back curves plus
//!   CSS-style cubic beziers
//! - **Interpolation**: numbers, and the numbers embedded in strings such as
//!   `translate(10,20)`
//! - **Scheduler**: a frame-driven clock that starts, advances, interrupts and
//!   completes transitions
//! - **Completion**: every scheduled transition yields a future that resolves
//!   when it ends, interrupted or not

pub mod easing;
pub mod end;
pub mod interpolate;
pub mod scheduler;

pub use easing::Easing;
pub use end::{Completion, TransitionEnd};
pub use interpolate::{interpolate, lerp, Interpolator};
pub use scheduler::{Animation, AnimationScheduler, Timing, TransitionId};
