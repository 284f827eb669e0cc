//! Scripted block transport for driver tests

extern crate std;

use std::collections::VecDeque;
use std::vec::Vec;

use cfa779_hal::BlockTransport;
use cfa779_protocol::frame::encode_reply;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

/// One recorded block write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Write {
    pub address: u8,
    pub command: u8,
    pub body: Vec<u8>,
}

impl Write {
    pub fn payload(&self) -> &[u8] {
        &self.body[..self.body.len() - 2]
    }
}

/// Records writes and replays queued replies in order
#[derive(Debug, Default)]
pub struct MockTransport {
    pub writes: Vec<Write>,
    pub reads: Vec<u8>,
    replies: VecDeque<Result<Vec<u8>, MockError>>,
    pub fail_writes: bool,
    /// Every write attempt, failed ones included
    pub attempts: usize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a well-formed reply
    pub fn reply(&mut self, echo: u8, data: &[u8]) -> &mut Self {
        let raw = encode_reply(echo, data).unwrap();
        self.replies.push_back(Ok(raw.to_vec()));
        self
    }

    /// Queue raw reply bytes as-is
    pub fn reply_raw(&mut self, raw: &[u8]) -> &mut Self {
        self.replies.push_back(Ok(raw.to_vec()));
        self
    }

    /// Queue a failing read
    pub fn reply_error(&mut self) -> &mut Self {
        self.replies.push_back(Err(MockError));
        self
    }

    pub fn pending_replies(&self) -> usize {
        self.replies.len()
    }

    pub fn last_write(&self) -> &Write {
        self.writes.last().unwrap()
    }
}

impl BlockTransport for MockTransport {
    type Error = MockError;

    fn write_block(&mut self, address: u8, command: u8, body: &[u8]) -> Result<(), MockError> {
        self.attempts += 1;
        if self.fail_writes {
            return Err(MockError);
        }
        self.writes.push(Write {
            address,
            command,
            body: body.to_vec(),
        });
        Ok(())
    }

    fn read_block(&mut self, _address: u8, command: u8, buf: &mut [u8]) -> Result<usize, MockError> {
        self.reads.push(command);
        match self.replies.pop_front() {
            Some(Ok(raw)) => {
                let n = raw.len().min(buf.len());
                buf[..n].copy_from_slice(&raw[..n]);
                Ok(raw.len())
            }
            Some(Err(e)) => Err(e),
            // Nothing queued: the panel stayed silent
            None => Ok(0),
        }
    }
}
