// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! STM32F7 register-level collaborators for the ranging core.

pub mod capture;
pub mod delay;
pub mod pins;
pub mod trigger;
pub mod usart;

pub use capture::{EchoCapture, InputCapture};
pub use delay::SysDelay;
pub use pins::BoardPins;
pub use trigger::{ActiveLevel, TriggerLine};
pub use usart::Terminal;
