//! Bindings for the raw commands of the rotator controller.
//!
//! You usually don't have to build these yourself, the methods on
//! [`Rotator`][super::Rotator] cover every command. Range checks on values
//! aren't performed in this module; if a value is out of range for the
//! firmware, the controller simply ignores it.

#[cfg(test)]
mod tests;

use num_derive::FromPrimitive;
use std::fmt::{self, Display};

/// Upper bound for an encoded command, including the terminator.
///
/// Exceeding it is a programming error in this crate (a template/argument
/// mismatch), not something that can happen at runtime for values the
/// firmware accepts.
pub const CMD_LEN: usize = 12;

/// Direction of travel as reported by the controller.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, FromPrimitive)]
pub enum Direction {
    Ccw = 0,
    Cw = 1,
}

impl Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

/// Preset motor speeds of the firmware.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, FromPrimitive)]
pub enum MotorSpeed {
    Slow = 0,
    Medium = 1,
    Fast = 2,
}

impl Display for MotorSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

/// Microstepping mode.
///
/// Which modes are usable depends on the stepper chip the firmware was built
/// for: the DRV8825 supports all of them, the ULN2003 only [`Full`][StepMode::Full]
/// and [`Half`][StepMode::Half]. See [`StepMode::supported_by`].
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, FromPrimitive)]
pub enum StepMode {
    Full = 0,
    Half = 1,
    Quarter = 2,
    Eighth = 3,
    Sixteenth = 4,
    ThirtySecond = 5,
}

impl StepMode {
    /// Whether the given stepper chip implements this mode.
    pub fn supported_by(&self, chip: super::StepperChip) -> bool {
        match chip {
            super::StepperChip::Drv8825 => true,
            super::StepperChip::Uln2003 => matches!(self, StepMode::Full | StepMode::Half),
        }
    }
}

impl Display for StepMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

/// The payload grammar a command's reply has to match.
///
/// [`None`][ReplyShape::None] means the controller stays quiet, everything
/// else is a `$<payload>#` frame.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum ReplyShape {
    None,
    Int,
    Long,
    Float,
    Identity,
    Ack,
}

/// A single command of the wire protocol.
///
/// Encoding is template substitution: the two-digit opcode, the formatted
/// argument if the command carries one, and the `#` terminator.
#[derive(Debug, PartialEq, Clone)]
pub enum Command {
    GetAngle,
    GetMotorStatus,
    Identify,
    GetCoilPower,
    SetCoilPower(bool),
    GetReverse,
    SetReverse(bool),
    SetSpeed(MotorSpeed),
    Halt,
    ResetMcu,
    GetSpeed,
    SetAngle(u32),
    MoveRelative(i32),
    MoveAbsolute(i32),
    Ping,
    FindHome,
    GetSpeedDelay,
    SetSpeedDelay(i64),
    GetStepsPerRotator360,
    SetStepsPerRotator360(i64),
    MoveSteps(i32),
    MoveOneRevolution(Direction),
    GetStepsPerMotor360,
    GetStepsPerDegree,
    SetStepsPerMotor360(u32),
    GetPositionCounter,
    SetPositionCounter(i64),
    GetDirection,
    GetBacklashCwEnabled,
    SetBacklashCwEnabled(bool),
    GetBacklashCcwEnabled,
    SetBacklashCcwEnabled(bool),
    GetBacklashCwSteps,
    SetBacklashCwSteps(u32),
    GetBacklashCcwSteps,
    SetBacklashCcwSteps(u32),
    GetStepMode,
    SetStepMode(StepMode),
    SaveEeprom,
    RestoreDefaults,
}

impl Command {
    /// Returns the wire form of this command.
    pub fn encode(&self) -> Vec<u8> {
        let encoded = self.to_string().into_bytes();
        debug_assert!(encoded.len() <= CMD_LEN, "command template overflow: {:?}", encoded);
        encoded
    }

    /// The grammar the reply to this command has to match. Setters and motion
    /// commands aren't acknowledged at all.
    pub fn reply_shape(&self) -> ReplyShape {
        match self {
            Command::GetAngle
            | Command::GetMotorStatus
            | Command::GetCoilPower
            | Command::GetReverse
            | Command::GetSpeed
            | Command::GetStepsPerMotor360
            | Command::GetDirection
            | Command::GetBacklashCwEnabled
            | Command::GetBacklashCcwEnabled
            | Command::GetBacklashCwSteps
            | Command::GetBacklashCcwSteps
            | Command::GetStepMode => ReplyShape::Int,
            Command::GetSpeedDelay
            | Command::GetStepsPerRotator360
            | Command::GetPositionCounter => ReplyShape::Long,
            Command::GetStepsPerDegree => ReplyShape::Float,
            Command::Identify => ReplyShape::Identity,
            Command::Ping => ReplyShape::Ack,
            _ => ReplyShape::None,
        }
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::GetAngle => write!(f, "00#"),
            Command::GetMotorStatus => write!(f, "01#"),
            Command::Identify => write!(f, "03#"),
            Command::GetCoilPower => write!(f, "04#"),
            Command::SetCoilPower(on) => write!(f, "05{}#", *on as u8),
            Command::GetReverse => write!(f, "06#"),
            Command::SetReverse(on) => write!(f, "07{}#", *on as u8),
            Command::SetSpeed(speed) => write!(f, "08{}#", speed),
            Command::Halt => write!(f, "09#"),
            Command::ResetMcu => write!(f, "10#"),
            Command::GetSpeed => write!(f, "11#"),
            Command::SetAngle(angle) => write!(f, "12{}#", angle),
            Command::MoveRelative(degrees) => write!(f, "13{}#", degrees),
            Command::MoveAbsolute(degrees) => write!(f, "14{}#", degrees),
            Command::Ping => write!(f, "15#"),
            Command::FindHome => write!(f, "16#"),
            Command::GetSpeedDelay => write!(f, "17#"),
            Command::SetSpeedDelay(delay) => write!(f, "18{}#", delay),
            Command::GetStepsPerRotator360 => write!(f, "19#"),
            Command::SetStepsPerRotator360(steps) => write!(f, "20{}#", steps),
            Command::MoveSteps(steps) => write!(f, "21{}#", steps),
            Command::MoveOneRevolution(Direction::Cw) => write!(f, "22#"),
            Command::MoveOneRevolution(Direction::Ccw) => write!(f, "23#"),
            Command::GetStepsPerMotor360 => write!(f, "24#"),
            Command::GetStepsPerDegree => write!(f, "25#"),
            Command::SetStepsPerMotor360(steps) => write!(f, "26{}#", steps),
            Command::GetPositionCounter => write!(f, "27#"),
            Command::SetPositionCounter(steps) => write!(f, "28{}#", steps),
            Command::GetDirection => write!(f, "29#"),
            Command::GetBacklashCwEnabled => write!(f, "30#"),
            Command::SetBacklashCwEnabled(on) => write!(f, "31{}#", *on as u8),
            Command::GetBacklashCcwEnabled => write!(f, "32#"),
            Command::SetBacklashCcwEnabled(on) => write!(f, "33{}#", *on as u8),
            Command::GetBacklashCwSteps => write!(f, "34#"),
            Command::SetBacklashCwSteps(steps) => write!(f, "35{}#", steps),
            Command::GetBacklashCcwSteps => write!(f, "36#"),
            Command::SetBacklashCcwSteps(steps) => write!(f, "37{}#", steps),
            Command::GetStepMode => write!(f, "38#"),
            Command::SetStepMode(mode) => write!(f, "39{}#", mode),
            Command::SaveEeprom => write!(f, "40#"),
            Command::RestoreDefaults => write!(f, "41#"),
        }
    }
}
