// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Ultrasonic ranging core: edge capture, echo timing, and distance conversion.

pub mod capture;
pub mod distance;
pub mod echo_timer;
pub mod ranger;
pub mod shared;
pub mod trigger;

pub use capture::{CaptureDriver, CaptureEvent, Edge, EdgeHandler, EdgeSelect};
pub use distance::{compute, OutOfRange};
pub use echo_timer::{EchoTimer, EdgePair, MeasurementState, Transition};
pub use ranger::{CancelToken, Measurement, Ranger, ReadError};
pub use shared::{CaptureCell, SharedCapture};
pub use trigger::PulseTrigger;
