//! Byte-level connection to the controller.
//!
//! The driver only needs three primitives from the underlying connection:
//! write, read-until-delimiter with a deadline, and discarding buffered
//! input. [`Transport`] captures that contract; the implementation for
//! serial ports is what real deployments use, tests script a mock instead.

use serialport::{ClearBuffer, SerialPort};
use std::{
    io::{self, Read},
    time::{Duration, Instant},
};

/// Duplex byte stream to the controller.
pub trait Transport {
    /// Writes `buf`, returning how many bytes the connection accepted.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Reads until `delim` was received (inclusive), `max_len` bytes arrived,
    /// or `timeout` elapsed. Expiry of the timeout is reported as
    /// [`io::ErrorKind::TimedOut`].
    fn read_until(&mut self, delim: u8, max_len: usize, timeout: Duration)
        -> io::Result<Vec<u8>>;

    /// Discards everything currently buffered on the receive side.
    fn clear_input(&mut self) -> io::Result<()>;
}

impl Transport for Box<dyn SerialPort> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = io::Write::write(self, buf)?;
        io::Write::flush(self)?;
        Ok(written)
    }

    fn read_until(
        &mut self,
        delim: u8,
        max_len: usize,
        timeout: Duration,
    ) -> io::Result<Vec<u8>> {
        let deadline = Instant::now() + timeout;
        let mut buf = Vec::with_capacity(max_len);
        let mut byte = [0u8; 1];
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(io::ErrorKind::TimedOut.into());
            }
            self.set_timeout(remaining).map_err(io::Error::from)?;
            match self.read(&mut byte) {
                Ok(0) => return Err(io::ErrorKind::TimedOut.into()),
                Ok(_) => {
                    buf.push(byte[0]);
                    if byte[0] == delim || buf.len() >= max_len {
                        return Ok(buf);
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn clear_input(&mut self) -> io::Result<()> {
        self.clear(ClearBuffer::Input).map_err(io::Error::from)
    }
}
