// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # echorange
//!
//! Ultrasonic distance measurement for HC-SR04 style sensors, timed with a hardware input capture
//! unit, written in Rust, targeting an STM32F767 MCU.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`config`] | Tick source, speed of sound, valid range and wait limits |
//! | [`ranging`] | Edge-capture state machine, distance conversion, trigger pulse, orchestrator |
//! | [`display`] | Character display service and the distance readout |
//! | `hw` | STM32F7 register-level collaborators (feature `stm32f7`) |
//!
//! The library builds without hardware so the ranging core can be unit tested on the host:
//!
//! ```bash
//! cargo test
//! ```
//!
//! Flash the board:
//!
//! ```bash
//! cargo run --release --features stm32f7 --target thumbv7em-none-eabihf
//! ```
//!
//! Add `--features defmt` for RTT logging.
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod config;
pub mod display;
pub mod ranging;

#[cfg(feature = "stm32f7")]
pub mod hw;
