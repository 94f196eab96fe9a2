mod channel;
pub mod cmd;
pub mod parse;
pub mod transport;

use self::{
    channel::Channel,
    cmd::{Command, Direction, MotorSpeed, StepMode},
    parse::{ParseError, Response},
    transport::Transport,
};
use crate::util::ensure;
use std::{io, time::Duration};
use thiserror::Error;

/// Program name the firmware has to report during the handshake. Only this
/// many leading characters of the reported name are compared, the rest names
/// the stepper chip.
pub const EXPECTED_PROGRAM_NAME: &str = "myRotator";

/// Oldest firmware version this driver works with.
pub const MIN_FIRMWARE_VERSION: i32 = 125;

/// Polling period of the reference setup. [`Rotator::poll`] itself doesn't
/// sleep, the caller owns the schedule.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

const HANDSHAKE_ATTEMPTS: u32 = 3;

//

/// Errors returned by any part of the driver
#[derive(Error, Debug)]
pub enum DriverError {
    /// The transport accepted only part of an encoded command.
    #[error("transport accepted only {written} of {expected} command bytes")]
    IncompleteWrite { written: usize, expected: usize },
    /// No reply arrived within the reply timeout.
    #[error("no reply from the controller within the reply timeout")]
    Timeout,
    /// The reply didn't match the grammar the issued command expects.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// A decoded reply didn't have the variant the issued command produces.
    /// Can't happen through [`Rotator`]; kept for direct channel misuse.
    #[error("reply did not match the issued command, response was {0:?}")]
    UnexpectedResponse(Response),
    /// The device on the other end isn't a myRotator controller.
    #[error("controller identified itself as {0:?}, expected a myRotator")]
    IdentityMismatch(String),
    /// The controller runs firmware older than [`MIN_FIRMWARE_VERSION`].
    /// Update it from <https://sourceforge.net/projects/arduino-myrotator/>.
    #[error("firmware version {version} is older than the required {min}, please update the controller firmware")]
    FirmwareTooOld { version: i32, min: i32 },
    /// A motion command was rejected because a motion is already in progress.
    /// Not an I/O failure; nothing was sent to the controller.
    #[error("rotator is moving, wait for the current motion to finish")]
    Busy,
    /// Thrown by a setter if the argument isn't valid for this controller,
    /// for example a microstepping mode the stepper chip doesn't have.
    #[error("invalid value for command argument")]
    InvalidArgument,
    /// Wrapper around [`io::Error`]
    #[error(transparent)]
    IoError(#[from] io::Error),
}

//

/// Whether the rotator is free to take a new motion command.
///
/// Owned exclusively by [`Rotator`]: motion commands move it away from
/// `Idle`, and only [`Rotator::poll`] observing a stopped motor moves it
/// back. There is no completion acknowledgement on the wire.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum MotionState {
    Idle,
    Moving,
    Homing,
    Aborting,
}

impl MotionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, MotionState::Idle)
    }
}

/// Stepper chip the firmware was built for, taken from the suffix of the
/// reported program name (e.g. `myRotator-DRV8825`).
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum StepperChip {
    Drv8825,
    Uln2003,
}

/// Name and firmware version the controller reported during the handshake.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Identity {
    pub name: String,
    pub version: i32,
}

impl Identity {
    /// The stepper chip named after the dash in the program name, if it is
    /// one this driver knows about.
    pub fn chip(&self) -> Option<StepperChip> {
        match self.name.split_once('-')?.1 {
            "DRV8825" => Some(StepperChip::Drv8825),
            "ULN2003" => Some(StepperChip::Uln2003),
            _ => None,
        }
    }
}

/// Last known angle, travel direction and moving flag.
///
/// Refreshed as a whole by [`Rotator::read_main_values`]; stale between
/// polls, but never partially updated.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Telemetry {
    pub angle: i32,
    pub direction: Direction,
    pub moving: bool,
}

//

/// A connected myRotator controller.
///
/// Created by [`connect`][Rotator::connect], which only succeeds once the
/// controller identified itself with the right program name and a recent
/// enough firmware. All communication runs through one internal channel, so
/// at most one command is on the wire at any time.
///
/// Motion commands ([`move_absolute`][Rotator::move_absolute],
/// [`home`][Rotator::home], ...) are rejected with [`DriverError::Busy`]
/// while a motion is believed to be in progress;
/// [`abort`][Rotator::abort] is always allowed. Completion is detected by
/// calling [`poll`][Rotator::poll] periodically.
#[derive(Debug)]
pub struct Rotator<T: Transport> {
    channel: Channel<T>,
    identity: Identity,
    state: MotionState,
    telemetry: Option<Telemetry>,
}

impl<T: Transport> Rotator<T> {
    /// Performs the identification handshake on `transport` and returns the
    /// connected rotator.
    ///
    /// The whole handshake is retried up to 3 times before the last error is
    /// returned.
    ///
    /// # Errors
    /// [`DriverError::IdentityMismatch`] if the device doesn't report the
    /// `myRotator` program name (or the reply doesn't parse as a
    /// name/version pair at all), [`DriverError::FirmwareTooOld`] if the
    /// firmware predates [`MIN_FIRMWARE_VERSION`], otherwise the underlying
    /// transport error.
    pub fn connect(transport: T) -> Result<Self, DriverError> {
        let mut channel = Channel::new(transport);
        let mut tries = HANDSHAKE_ATTEMPTS;
        let identity = loop {
            match Self::identify(&mut channel) {
                Ok(identity) => break identity,
                Err(e) => {
                    tries -= 1;
                    ensure!(tries > 0, e);
                    log::warn!("handshake failed ({}), trying resync", e);
                }
            }
        };
        log::info!(
            "myRotator is online: {} (firmware {})",
            identity.name,
            identity.version
        );
        Ok(Rotator {
            channel,
            identity,
            state: MotionState::Idle,
            telemetry: None,
        })
    }

    fn identify(channel: &mut Channel<T>) -> Result<Identity, DriverError> {
        let response = channel.execute(&Command::Identify).map_err(|e| match e {
            // a reply that doesn't parse as a name/version pair means this
            // isn't (or doesn't behave like) a myRotator
            DriverError::Parse(ParseError::Malformed(raw))
            | DriverError::Parse(ParseError::TrailingBytes(raw)) => {
                DriverError::IdentityMismatch(String::from_utf8_lossy(&raw).into_owned())
            }
            e => e,
        })?;
        let (name, version) = match response {
            Response::Identity { name, version } => (name, version),
            other => return Err(DriverError::UnexpectedResponse(other)),
        };
        ensure!(
            name.as_bytes().get(..EXPECTED_PROGRAM_NAME.len())
                == Some(EXPECTED_PROGRAM_NAME.as_bytes()),
            DriverError::IdentityMismatch(name)
        );
        ensure!(
            version >= MIN_FIRMWARE_VERSION,
            DriverError::FirmwareTooOld {
                version,
                min: MIN_FIRMWARE_VERSION,
            }
        );
        Ok(Identity { name, version })
    }

    /// What the controller reported during the handshake.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Whether a motion is believed to be in progress.
    pub fn state(&self) -> MotionState {
        self.state
    }

    /// Last telemetry readout, `None` until the first successful read.
    pub fn telemetry(&self) -> Option<Telemetry> {
        self.telemetry
    }

    //

    /// Moves to an absolute angle.
    ///
    /// The angle is truncated toward zero to whole degrees, that is what the
    /// firmware interface takes. Returns once the command was sent; the
    /// motion itself finishes asynchronously, see [`poll`][Rotator::poll].
    ///
    /// # Errors
    /// [`DriverError::Busy`] without any traffic if a motion is already in
    /// progress.
    pub fn move_absolute(&mut self, angle: f64) -> Result<(), DriverError> {
        ensure!(self.state.is_idle(), DriverError::Busy);
        self.send(Command::MoveAbsolute(angle as i32))?;
        self.state = MotionState::Moving;
        Ok(())
    }

    /// Moves by a relative angle, truncated toward zero to whole degrees.
    ///
    /// # Errors
    /// [`DriverError::Busy`] without any traffic if a motion is already in
    /// progress.
    pub fn move_relative(&mut self, angle: f64) -> Result<(), DriverError> {
        ensure!(self.state.is_idle(), DriverError::Busy);
        self.send(Command::MoveRelative(angle as i32))?;
        self.state = MotionState::Moving;
        Ok(())
    }

    /// Moves the motor by raw steps.
    ///
    /// # Errors
    /// [`DriverError::Busy`] without any traffic if a motion is already in
    /// progress.
    pub fn move_steps(&mut self, steps: i32) -> Result<(), DriverError> {
        ensure!(self.state.is_idle(), DriverError::Busy);
        self.send(Command::MoveSteps(steps))?;
        self.state = MotionState::Moving;
        Ok(())
    }

    /// Turns the motor shaft one full revolution in the given direction.
    ///
    /// # Errors
    /// [`DriverError::Busy`] without any traffic if a motion is already in
    /// progress.
    pub fn move_one_revolution(&mut self, direction: Direction) -> Result<(), DriverError> {
        ensure!(self.state.is_idle(), DriverError::Busy);
        self.send(Command::MoveOneRevolution(direction))?;
        self.state = MotionState::Moving;
        Ok(())
    }

    /// Declares the current position to be `angle` without moving, then
    /// re-reads the telemetry so the cache reflects the new reference.
    ///
    /// # Errors
    /// [`DriverError::Busy`] without any traffic if a motion is in progress.
    /// If the command or the follow-up read fails, the cached telemetry is
    /// left untouched.
    pub fn sync(&mut self, angle: f64) -> Result<(), DriverError> {
        ensure!(self.state.is_idle(), DriverError::Busy);
        self.send(Command::SetAngle(angle as u32))?;
        self.read_main_values()?;
        Ok(())
    }

    /// Starts the homing-sensor search.
    ///
    /// # Errors
    /// [`DriverError::Busy`] without any traffic if a motion is already in
    /// progress.
    pub fn home(&mut self) -> Result<(), DriverError> {
        ensure!(self.state.is_idle(), DriverError::Busy);
        self.send(Command::FindHome)?;
        self.state = MotionState::Homing;
        Ok(())
    }

    /// Sets the direction sense of the rotator and re-reads the telemetry.
    /// Allowed while moving, this doesn't start a motion.
    pub fn reverse(&mut self, enabled: bool) -> Result<(), DriverError> {
        self.send(Command::SetReverse(enabled))?;
        self.read_main_values()?;
        Ok(())
    }

    /// Halts any motion. Always allowed, never [`DriverError::Busy`].
    ///
    /// The state only drops back to [`MotionState::Idle`] once a poll sees
    /// the motor report that it stopped; the device's own status is the
    /// authority, not the halt command. A failing telemetry refresh after
    /// the halt is logged but doesn't fail the abort.
    pub fn abort(&mut self) -> Result<(), DriverError> {
        self.send(Command::Halt)?;
        if !self.state.is_idle() {
            self.state = MotionState::Aborting;
        }
        if let Err(e) = self.read_main_values() {
            log::warn!("telemetry refresh after abort failed: {}", e);
        }
        Ok(())
    }

    /// Reconciles the motion state with the device while a motion is in
    /// progress. Call this once per polling period.
    ///
    /// Does nothing while idle. Otherwise the main values are re-read, and
    /// once the motor reports that it stopped the state drops back to
    /// [`MotionState::Idle`] -- this is the only way a motion ends.
    ///
    /// # Errors
    /// A failed read leaves the state and the cached telemetry untouched: a
    /// rotator that can't be read stays "busy" rather than falsely reporting
    /// completion.
    pub fn poll(&mut self) -> Result<MotionState, DriverError> {
        if self.state.is_idle() {
            return Ok(self.state);
        }
        let telemetry = self.read_main_values()?;
        if !telemetry.moving {
            self.state = MotionState::Idle;
        }
        Ok(self.state)
    }

    /// Reads angle, travel direction and moving flag, committing the cache
    /// only when all three reads succeed.
    pub fn read_main_values(&mut self) -> Result<Telemetry, DriverError> {
        let angle = self.get_int(Command::GetAngle)?;
        let direction = self.direction()?;
        let moving = self.get_int(Command::GetMotorStatus)? == 1;
        let telemetry = Telemetry {
            angle,
            direction,
            moving,
        };
        self.telemetry = Some(telemetry);
        Ok(telemetry)
    }

    //

    /// Current rotator angle in whole degrees.
    pub fn angle(&mut self) -> Result<i32, DriverError> {
        self.get_int(Command::GetAngle)
    }

    /// Whether the motor reports that it is currently moving.
    pub fn motor_moving(&mut self) -> Result<bool, DriverError> {
        Ok(self.get_int(Command::GetMotorStatus)? == 1)
    }

    /// Current travel direction.
    pub fn direction(&mut self) -> Result<Direction, DriverError> {
        let value = self.get_int(Command::GetDirection)?;
        num_traits::FromPrimitive::from_i32(value)
            .ok_or(DriverError::Parse(ParseError::InvalidValue))
    }

    /// Whether the motor coils stay powered while idle.
    pub fn coil_power(&mut self) -> Result<bool, DriverError> {
        Ok(self.get_int(Command::GetCoilPower)? != 0)
    }

    pub fn set_coil_power(&mut self, on: bool) -> Result<(), DriverError> {
        self.send(Command::SetCoilPower(on))
    }

    /// Whether the direction sense is reversed.
    pub fn reverse_enabled(&mut self) -> Result<bool, DriverError> {
        Ok(self.get_int(Command::GetReverse)? != 0)
    }

    pub fn speed(&mut self) -> Result<MotorSpeed, DriverError> {
        let value = self.get_int(Command::GetSpeed)?;
        num_traits::FromPrimitive::from_i32(value)
            .ok_or(DriverError::Parse(ParseError::InvalidValue))
    }

    pub fn set_speed(&mut self, speed: MotorSpeed) -> Result<(), DriverError> {
        self.send(Command::SetSpeed(speed))
    }

    /// Delay between motor steps in microseconds.
    pub fn speed_delay(&mut self) -> Result<i64, DriverError> {
        self.get_long(Command::GetSpeedDelay)
    }

    pub fn set_speed_delay(&mut self, delay: i64) -> Result<(), DriverError> {
        self.send(Command::SetSpeedDelay(delay))
    }

    pub fn steps_per_rotator_360(&mut self) -> Result<i64, DriverError> {
        self.get_long(Command::GetStepsPerRotator360)
    }

    pub fn set_steps_per_rotator_360(&mut self, steps: i64) -> Result<(), DriverError> {
        self.send(Command::SetStepsPerRotator360(steps))
    }

    /// Full steps of the motor shaft per revolution, before microstepping.
    pub fn steps_per_motor_360(&mut self) -> Result<i32, DriverError> {
        self.get_int(Command::GetStepsPerMotor360)
    }

    pub fn set_steps_per_motor_360(&mut self, steps: u32) -> Result<(), DriverError> {
        self.send(Command::SetStepsPerMotor360(steps))
    }

    /// Effective motor steps per rotator degree, as computed by the firmware.
    pub fn steps_per_degree(&mut self) -> Result<f64, DriverError> {
        match self.channel.execute(&Command::GetStepsPerDegree)? {
            Response::Float(v) => Ok(v),
            other => Err(DriverError::UnexpectedResponse(other)),
        }
    }

    pub fn position_counter(&mut self) -> Result<i64, DriverError> {
        self.get_long(Command::GetPositionCounter)
    }

    pub fn set_position_counter(&mut self, steps: i64) -> Result<(), DriverError> {
        self.send(Command::SetPositionCounter(steps))
    }

    pub fn step_mode(&mut self) -> Result<StepMode, DriverError> {
        let value = self.get_int(Command::GetStepMode)?;
        num_traits::FromPrimitive::from_i32(value)
            .ok_or(DriverError::Parse(ParseError::InvalidValue))
    }

    /// Sets the microstepping mode.
    ///
    /// # Errors
    /// [`DriverError::InvalidArgument`] without any traffic if the stepper
    /// chip reported in the handshake doesn't implement `mode`.
    pub fn set_step_mode(&mut self, mode: StepMode) -> Result<(), DriverError> {
        if let Some(chip) = self.identity.chip() {
            ensure!(mode.supported_by(chip), DriverError::InvalidArgument);
        }
        self.send(Command::SetStepMode(mode))
    }

    pub fn backlash_cw_enabled(&mut self) -> Result<bool, DriverError> {
        Ok(self.get_int(Command::GetBacklashCwEnabled)? != 0)
    }

    pub fn set_backlash_cw_enabled(&mut self, on: bool) -> Result<(), DriverError> {
        self.send(Command::SetBacklashCwEnabled(on))
    }

    pub fn backlash_ccw_enabled(&mut self) -> Result<bool, DriverError> {
        Ok(self.get_int(Command::GetBacklashCcwEnabled)? != 0)
    }

    pub fn set_backlash_ccw_enabled(&mut self, on: bool) -> Result<(), DriverError> {
        self.send(Command::SetBacklashCcwEnabled(on))
    }

    pub fn backlash_cw_steps(&mut self) -> Result<i32, DriverError> {
        self.get_int(Command::GetBacklashCwSteps)
    }

    pub fn set_backlash_cw_steps(&mut self, steps: u32) -> Result<(), DriverError> {
        self.send(Command::SetBacklashCwSteps(steps))
    }

    pub fn backlash_ccw_steps(&mut self) -> Result<i32, DriverError> {
        self.get_int(Command::GetBacklashCcwSteps)
    }

    pub fn set_backlash_ccw_steps(&mut self, steps: u32) -> Result<(), DriverError> {
        self.send(Command::SetBacklashCcwSteps(steps))
    }

    /// Asks the controller for its `$EOK#` liveness acknowledgement.
    pub fn ping(&mut self) -> Result<(), DriverError> {
        match self.channel.execute(&Command::Ping)? {
            Response::Ack => Ok(()),
            other => Err(DriverError::UnexpectedResponse(other)),
        }
    }

    /// Persists the current settings to the controller's EEPROM. Opaque to
    /// the driver, the controller doesn't acknowledge it.
    pub fn save_eeprom(&mut self) -> Result<(), DriverError> {
        self.send(Command::SaveEeprom)
    }

    /// Restores the controller's default settings.
    pub fn restore_defaults(&mut self) -> Result<(), DriverError> {
        self.send(Command::RestoreDefaults)
    }

    /// Resets the microcontroller.
    pub fn reset_mcu(&mut self) -> Result<(), DriverError> {
        self.send(Command::ResetMcu)
    }

    //

    fn send(&mut self, cmd: Command) -> Result<(), DriverError> {
        match self.channel.execute(&cmd)? {
            Response::None => Ok(()),
            other => Err(DriverError::UnexpectedResponse(other)),
        }
    }

    fn get_int(&mut self, cmd: Command) -> Result<i32, DriverError> {
        match self.channel.execute(&cmd)? {
            Response::Int(v) => Ok(v),
            other => Err(DriverError::UnexpectedResponse(other)),
        }
    }

    fn get_long(&mut self, cmd: Command) -> Result<i64, DriverError> {
        match self.channel.execute(&cmd)? {
            Response::Long(v) => Ok(v),
            other => Err(DriverError::UnexpectedResponse(other)),
        }
    }
}
