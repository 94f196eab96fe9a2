
use myrotator_driver::Transport;
use std::{cell::RefCell, collections::VecDeque, io, rc::Rc, time::Duration};

// used to mock a transport to test the rotator driver
// writes are checked against expectations queued with expect_write; replies
// queued with add_read are served one per read_until call, add_timeout makes
// the next read_until time out instead. add_stale puts bytes into the receive
// buffer directly, where clear_input can discard them.
//
// don't be alarmed if you think it's slow or inefficient or anything, it
// doesn't need to be fast nor pretty nor efficient, its just for testing.
// it needs to be easy
#[derive(Debug)]
pub struct Interface {
    // bytes that already "arrived", clear_input wipes these
    pending: Rc<RefCell<Vec<u8>>>,
    // future replies, one entry per read_until call; None simulates a timeout
    script: Rc<RefCell<VecDeque<Option<Vec<u8>>>>>,
    expected_writes: Rc<RefCell<Vec<u8>>>,
    writes: Rc<RefCell<usize>>,
}

impl Transport for Interface {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut q = self.expected_writes.borrow_mut();
        if q.is_empty() {
            panic!("unexpected write of {:?}", buf)
        } else if q.starts_with(buf) {
            q.drain(..buf.len());
            *self.writes.borrow_mut() += 1;
            Ok(buf.len())
        } else {
            panic!("write didn't start with {:?}, expected write was {:?}", buf, q)
        }
    }

    fn read_until(
        &mut self,
        delim: u8,
        max_len: usize,
        _timeout: Duration,
    ) -> io::Result<Vec<u8>> {
        let mut pending = self.pending.borrow_mut();
        if pending.is_empty() {
            match self.script.borrow_mut().pop_front() {
                Some(Some(bytes)) => pending.extend_from_slice(&bytes),
                Some(None) | None => return Err(io::ErrorKind::TimedOut.into()),
            }
        }
        let end = pending
            .iter()
            .position(|&b| b == delim)
            .map(|p| p + 1)
            .unwrap_or(pending.len())
            .min(max_len);
        Ok(pending.drain(..end).collect())
    }

    fn clear_input(&mut self) -> io::Result<()> {
        self.pending.borrow_mut().clear();
        Ok(())
    }
}

impl Clone for Interface {
    fn clone(&self) -> Self {
        Interface {
            pending: self.pending.clone(),
            script: self.script.clone(),
            expected_writes: self.expected_writes.clone(),
            writes: self.writes.clone(),
        }
    }
}

impl Interface {
    pub fn new() -> Self {
        Interface {
            pending: Rc::new(RefCell::new(Vec::new())),
            script: Rc::new(RefCell::new(VecDeque::new())),
            expected_writes: Rc::new(RefCell::new(Vec::new())),
            writes: Rc::new(RefCell::new(0)),
        }
    }

    /// Queues a reply, delivered by the next unanswered read_until call.
    pub fn add_read(&mut self, buf: &[u8]) {
        self.script.borrow_mut().push_back(Some(buf.to_vec()))
    }

    /// Makes the next unanswered read_until call time out.
    pub fn add_timeout(&mut self) {
        self.script.borrow_mut().push_back(None)
    }

    /// Puts bytes into the receive buffer as if they had already arrived,
    /// e.g. a late reply to an earlier command. clear_input discards them.
    pub fn add_stale(&mut self, buf: &[u8]) {
        self.pending.borrow_mut().extend_from_slice(buf)
    }

    /// Expects the given bytes to be written next.
    pub fn expect_write(&mut self, buf: &[u8]) {
        self.expected_writes.borrow_mut().extend_from_slice(buf)
    }

    /// How many write calls the transport has seen.
    pub fn write_count(&self) -> usize {
        *self.writes.borrow()
    }

    /// True once every expected write happened and every scripted reply
    /// (and stale byte) was consumed.
    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
            && self.script.borrow().is_empty()
            && self.expected_writes.borrow().is_empty()
    }
}

impl Default for Interface {
    fn default() -> Self {
        Self::new()
    }
}
