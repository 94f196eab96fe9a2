//! Parsers for the `$<payload>#` reply frames of the controller.

#[cfg(test)]
mod tests;

use super::cmd::ReplyShape;
use crate::util::ensure;
use nom::{
    bytes::complete::{tag, take_until1},
    character::complete::{i32 as parse_i32, i64 as parse_i64},
    combinator::{map_res, verify},
    number::complete::double,
    sequence::{delimited, separated_pair},
    Finish, IResult, Parser,
};
use thiserror::Error;

// the firmware formats the name field with %30[^,]
const MAX_NAME_LEN: usize = 30;

/// Gets thrown when a reply doesn't match the grammar the issued command
/// expects. Distinct from an I/O failure on the transport.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum ParseError {
    /// The reply wasn't a well-formed frame for the expected grammar.
    #[error("reply did not match the expected grammar: {0:?}")]
    Malformed(Vec<u8>),
    /// The reply frame was well-formed but bytes followed the terminator.
    #[error("unexpected bytes after the reply terminator: {0:?}")]
    TrailingBytes(Vec<u8>),
    /// A numeric field doesn't map to a value of the typed enum it belongs to.
    #[error("value out of range for this field")]
    InvalidValue,
}

/// A decoded reply.
///
/// The variant is determined by the [`ReplyShape`] of the command that was
/// issued, never guessed from the payload itself.
#[derive(Debug, PartialEq, Clone)]
pub enum Response {
    /// The command doesn't get acknowledged by the controller.
    None,
    Int(i32),
    Long(i64),
    Float(f64),
    /// Program name and firmware version from the identify command.
    Identity { name: String, version: i32 },
    /// The `$EOK#` acknowledgement of the query command.
    Ack,
}

fn frame<'a, O, P>(payload: P) -> impl FnMut(&'a [u8]) -> IResult<&'a [u8], O>
where
    P: Parser<&'a [u8], O, nom::error::Error<&'a [u8]>>,
{
    delimited(tag("$"), payload, tag("#"))
}

fn identity(s: &[u8]) -> IResult<&[u8], (String, i32)> {
    separated_pair(
        map_res(
            verify(take_until1(","), |name: &[u8]| name.len() <= MAX_NAME_LEN),
            |name: &[u8]| std::str::from_utf8(name).map(str::to_owned),
        ),
        tag(","),
        parse_i32,
    )(s)
}

impl Response {
    /// Decodes raw reply bytes against the grammar for `shape`. Pure, no I/O.
    pub fn parse(shape: ReplyShape, raw: &[u8]) -> Result<Self, ParseError> {
        let (remainder, response) = match shape {
            ReplyShape::None => return Ok(Response::None),
            ReplyShape::Int => frame(parse_i32).map(Response::Int).parse(raw).finish(),
            ReplyShape::Long => frame(parse_i64).map(Response::Long).parse(raw).finish(),
            ReplyShape::Float => frame(double).map(Response::Float).parse(raw).finish(),
            ReplyShape::Ack => frame(tag("EOK")).map(|_| Response::Ack).parse(raw).finish(),
            ReplyShape::Identity => frame(identity)
                .map(|(name, version)| Response::Identity { name, version })
                .parse(raw)
                .finish(),
        }
        .map_err(|_: nom::error::Error<&[u8]>| ParseError::Malformed(raw.to_vec()))?;
        ensure!(
            remainder.is_empty(),
            ParseError::TrailingBytes(remainder.to_vec())
        );
        Ok(response)
    }
}
