use super::{
    cmd::{Command, ReplyShape},
    parse::Response,
    transport::Transport,
    DriverError,
};
use crate::util::ensure;
use std::{io, time::Duration};

/// Replies longer than this are cut off by the controller's own buffer.
pub(super) const MAX_REPLY_LEN: usize = 80;
/// How long to wait for a reply before giving up on it.
pub(super) const REPLY_TIMEOUT: Duration = Duration::from_secs(3);

/// Sequences commands over the transport, one at a time.
///
/// `&mut self` on [`execute`][Channel::execute] is what enforces the
/// one-in-flight rule; there is no queueing and no retry in here.
#[derive(Debug)]
pub(super) struct Channel<T> {
    transport: T,
}

impl<T: Transport> Channel<T> {
    pub fn new(transport: T) -> Self {
        Channel { transport }
    }

    /// Sends `cmd` and, if it expects one, reads and decodes the reply.
    ///
    /// Stale input is discarded before the write so that a late reply to an
    /// earlier, timed-out command can't be misread as this command's reply.
    pub fn execute(&mut self, cmd: &Command) -> Result<Response, DriverError> {
        self.transport.clear_input()?;
        let encoded = cmd.encode();
        log::debug!("CMD: {}", cmd);
        let written = self.transport.write(&encoded)?;
        ensure!(
            written == encoded.len(),
            DriverError::IncompleteWrite {
                written,
                expected: encoded.len(),
            }
        );
        let shape = cmd.reply_shape();
        if shape == ReplyShape::None {
            return Ok(Response::None);
        }
        let raw = match self.transport.read_until(b'#', MAX_REPLY_LEN, REPLY_TIMEOUT) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                log::debug!("no reply for {}", cmd);
                return Err(DriverError::Timeout);
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Response::parse(shape, &raw)?)
    }
}
