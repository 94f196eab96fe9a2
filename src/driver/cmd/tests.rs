use super::{Command, Direction, MotorSpeed, ReplyShape, StepMode, CMD_LEN};
use crate::driver::StepperChip;

#[test]
fn encode_queries() {
    assert_eq!(Command::GetAngle.encode(), b"00#");
    assert_eq!(Command::GetMotorStatus.encode(), b"01#");
    assert_eq!(Command::Identify.encode(), b"03#");
    assert_eq!(Command::GetCoilPower.encode(), b"04#");
    assert_eq!(Command::GetReverse.encode(), b"06#");
    assert_eq!(Command::GetSpeed.encode(), b"11#");
    assert_eq!(Command::Ping.encode(), b"15#");
    assert_eq!(Command::GetSpeedDelay.encode(), b"17#");
    assert_eq!(Command::GetStepsPerRotator360.encode(), b"19#");
    assert_eq!(Command::GetStepsPerMotor360.encode(), b"24#");
    assert_eq!(Command::GetStepsPerDegree.encode(), b"25#");
    assert_eq!(Command::GetPositionCounter.encode(), b"27#");
    assert_eq!(Command::GetDirection.encode(), b"29#");
    assert_eq!(Command::GetBacklashCwEnabled.encode(), b"30#");
    assert_eq!(Command::GetBacklashCcwEnabled.encode(), b"32#");
    assert_eq!(Command::GetBacklashCwSteps.encode(), b"34#");
    assert_eq!(Command::GetBacklashCcwSteps.encode(), b"36#");
    assert_eq!(Command::GetStepMode.encode(), b"38#");
}

#[test]
fn encode_setters() {
    assert_eq!(Command::SetCoilPower(true).encode(), b"051#");
    assert_eq!(Command::SetCoilPower(false).encode(), b"050#");
    assert_eq!(Command::SetReverse(true).encode(), b"071#");
    assert_eq!(Command::SetSpeed(MotorSpeed::Fast).encode(), b"082#");
    assert_eq!(Command::SetAngle(90).encode(), b"1290#");
    assert_eq!(Command::SetSpeedDelay(15000).encode(), b"1815000#");
    assert_eq!(Command::SetStepsPerRotator360(500000).encode(), b"20500000#");
    assert_eq!(Command::SetStepsPerMotor360(200).encode(), b"26200#");
    assert_eq!(Command::SetPositionCounter(-100000).encode(), b"28-100000#");
    assert_eq!(Command::SetBacklashCwEnabled(true).encode(), b"311#");
    assert_eq!(Command::SetBacklashCcwEnabled(false).encode(), b"330#");
    assert_eq!(Command::SetBacklashCwSteps(120).encode(), b"35120#");
    assert_eq!(Command::SetBacklashCcwSteps(50).encode(), b"3750#");
    assert_eq!(Command::SetStepMode(StepMode::Half).encode(), b"391#");
}

#[test]
fn encode_motion_and_misc() {
    assert_eq!(Command::Halt.encode(), b"09#");
    assert_eq!(Command::ResetMcu.encode(), b"10#");
    assert_eq!(Command::MoveRelative(-45).encode(), b"13-45#");
    assert_eq!(Command::MoveAbsolute(180).encode(), b"14180#");
    assert_eq!(Command::FindHome.encode(), b"16#");
    assert_eq!(Command::MoveSteps(-3000).encode(), b"21-3000#");
    assert_eq!(Command::MoveOneRevolution(Direction::Cw).encode(), b"22#");
    assert_eq!(Command::MoveOneRevolution(Direction::Ccw).encode(), b"23#");
    assert_eq!(Command::SaveEeprom.encode(), b"40#");
    assert_eq!(Command::RestoreDefaults.encode(), b"41#");
}

#[test]
fn reply_shapes() {
    assert_eq!(Command::GetAngle.reply_shape(), ReplyShape::Int);
    assert_eq!(Command::GetMotorStatus.reply_shape(), ReplyShape::Int);
    assert_eq!(Command::Identify.reply_shape(), ReplyShape::Identity);
    assert_eq!(Command::GetSpeedDelay.reply_shape(), ReplyShape::Long);
    assert_eq!(Command::GetStepsPerRotator360.reply_shape(), ReplyShape::Long);
    assert_eq!(Command::GetPositionCounter.reply_shape(), ReplyShape::Long);
    assert_eq!(Command::GetStepsPerDegree.reply_shape(), ReplyShape::Float);
    assert_eq!(Command::Ping.reply_shape(), ReplyShape::Ack);
    assert_eq!(Command::MoveAbsolute(45).reply_shape(), ReplyShape::None);
    assert_eq!(Command::Halt.reply_shape(), ReplyShape::None);
    assert_eq!(Command::SetAngle(45).reply_shape(), ReplyShape::None);
    assert_eq!(Command::SaveEeprom.reply_shape(), ReplyShape::None);
}

// the worst cases of every template, at the value ranges the firmware accepts
#[test]
fn encoded_length_within_buffer() {
    let worst = [
        Command::SetSpeedDelay(15000),
        Command::SetStepsPerRotator360(500000),
        Command::SetPositionCounter(-100000),
        Command::MoveSteps(-30000),
        Command::MoveAbsolute(-360),
        Command::SetAngle(360),
        Command::SetBacklashCwSteps(400),
    ];
    for cmd in worst {
        assert!(cmd.encode().len() <= CMD_LEN, "{:?} too long", cmd);
    }
}

#[test]
fn step_mode_support() {
    assert!(StepMode::ThirtySecond.supported_by(StepperChip::Drv8825));
    assert!(StepMode::Half.supported_by(StepperChip::Uln2003));
    assert!(StepMode::Full.supported_by(StepperChip::Uln2003));
    assert!(!StepMode::Quarter.supported_by(StepperChip::Uln2003));
}
