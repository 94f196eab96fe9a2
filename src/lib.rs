//! Rust driver for the arduino myRotator controller as of firmware 125.
//! Older firmware versions are rejected during the connection handshake since
//! they predate the current command set.
//!
//! The controller speaks a compact ASCII protocol over a serial line (9600
//! baud by default): every command is a two-digit opcode plus an optional
//! numeric argument, terminated by `#`, and every reply is `$<payload>#`.
//!
//! # Usage
//! A connection is established with [`Rotator::connect`], which performs the
//! identification handshake and verifies the firmware is recent enough. The
//! returned [`Rotator`] exposes the motion commands (move, sync, home,
//! reverse, abort) and typed getters/setters for the motor settings.
//!
//! The controller never announces when a motion finishes. While a move or
//! homing run is in progress, [`Rotator::poll`] has to be called periodically
//! (the reference setup polls every 2 seconds); it re-reads the device status
//! and drops back to [`MotionState::Idle`] once the motor reports that it
//! stopped.
//!
//! Exactly one command can be in flight at a time. All methods take `&mut
//! self`, so in a multi-threaded setup the [`Rotator`] has to live behind a
//! mutex or inside a single owning task.
//!
//! # Examples
//! ```no_run
//! # use myrotator_driver::{MotionState, Rotator};
//! use std::time::Duration;
//!
//! let port = serialport::new("/dev/ttyUSB0", 9600)
//!     .timeout(Duration::from_secs(3))
//!     .open()
//!     .unwrap();
//! let mut rotator = Rotator::connect(port).unwrap();
//! println!("connected to {}", rotator.identity().name);
//!
//! rotator.move_absolute(90.0).unwrap();
//! while rotator.poll().unwrap() != MotionState::Idle {
//!     std::thread::sleep(Duration::from_millis(2000));
//! }
//! ```

mod driver;
pub(crate) mod util;

pub use driver::{
    cmd::*, parse::ParseError, parse::Response, transport::Transport, DriverError, Identity,
    MotionState, Rotator, StepperChip, Telemetry, DEFAULT_POLL_INTERVAL, EXPECTED_PROGRAM_NAME,
    MIN_FIRMWARE_VERSION,
};
