use super::{ParseError, Response};
use crate::driver::cmd::ReplyShape;

#[test]
fn parse_int() {
    let r = Response::parse(ReplyShape::Int, b"$45#").unwrap();
    assert_eq!(r, Response::Int(45));
}

#[test]
fn parse_int_negative() {
    let r = Response::parse(ReplyShape::Int, b"$-45#").unwrap();
    assert_eq!(r, Response::Int(-45));
}

#[test]
fn parse_int_plus_sign() {
    let r = Response::parse(ReplyShape::Int, b"$+45#").unwrap();
    assert_eq!(r, Response::Int(45));
}

#[test]
fn parse_long() {
    let r = Response::parse(ReplyShape::Long, b"$-100000#").unwrap();
    assert_eq!(r, Response::Long(-100000));
}

#[test]
fn parse_float() {
    let r = Response::parse(ReplyShape::Float, b"$2.35#").unwrap();
    assert_eq!(r, Response::Float(2.35));
}

#[test]
fn parse_float_without_fraction() {
    let r = Response::parse(ReplyShape::Float, b"$130#").unwrap();
    assert_eq!(r, Response::Float(130.0));
}

#[test]
fn parse_ack() {
    let r = Response::parse(ReplyShape::Ack, b"$EOK#").unwrap();
    assert_eq!(r, Response::Ack);
}

#[test]
fn parse_identity() {
    let r = Response::parse(ReplyShape::Identity, b"$myRotator-DRV8825,130#").unwrap();
    assert_eq!(
        r,
        Response::Identity {
            name: "myRotator-DRV8825".to_owned(),
            version: 130,
        }
    );
}

#[test]
fn parse_identity_numeric_suffix() {
    let r = Response::parse(ReplyShape::Identity, b"$myRotator-123,130#").unwrap();
    assert_eq!(
        r,
        Response::Identity {
            name: "myRotator-123".to_owned(),
            version: 130,
        }
    );
}

#[test]
fn parse_identity_name_too_long() {
    let mut raw = b"$".to_vec();
    raw.extend_from_slice(&[b'x'; 31]);
    raw.extend_from_slice(b",130#");
    let e = Response::parse(ReplyShape::Identity, &raw).unwrap_err();
    assert!(matches!(e, ParseError::Malformed(_)));
}

#[test]
fn parse_none_reads_nothing() {
    let r = Response::parse(ReplyShape::None, b"").unwrap();
    assert_eq!(r, Response::None);
}

#[test]
fn parse_missing_dollar() {
    let e = Response::parse(ReplyShape::Int, b"45#").unwrap_err();
    assert!(matches!(e, ParseError::Malformed(_)));
}

#[test]
fn parse_missing_terminator() {
    let e = Response::parse(ReplyShape::Int, b"$45").unwrap_err();
    assert!(matches!(e, ParseError::Malformed(_)));
}

#[test]
fn parse_wrong_payload() {
    let e = Response::parse(ReplyShape::Int, b"$abc#").unwrap_err();
    assert!(matches!(e, ParseError::Malformed(_)));
}

#[test]
fn parse_trailing_bytes() {
    let e = Response::parse(ReplyShape::Int, b"$45#junk").unwrap_err();
    assert!(matches!(e, ParseError::TrailingBytes(_)));
}

#[test]
fn parse_garbage() {
    let e = Response::parse(ReplyShape::Identity, b"gsrceitng").unwrap_err();
    assert!(matches!(e, ParseError::Malformed(_)));
}
