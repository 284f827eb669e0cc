//! CFA-779 command API
//!
//! Every operation follows the same exchange: build the frame, block-write
//! it, then (for queries, or for every command under strict validation)
//! block-read the reply and validate it.
//!
//! # Reply handling
//!
//! - CRC failures and missing replies abort the operation with a soft
//!   error; nothing is retried.
//! - A wrong echo code or reply length is logged and otherwise ignored,
//!   unless [`ValidationPolicy::Strict`] is configured.
//! - Setters update the shadow [`DeviceState`] once the value passed its
//!   range check (lenient, even if the write then fails) or once the reply
//!   validated (strict).

use heapless::{String, Vec};

use cfa779_hal::{BlockTransport, DEFAULT_ADDRESS};
use cfa779_protocol::commands::{NUM_COLUMNS, USER_CHAR_LEN};
use cfa779_protocol::frame::Packet;
use cfa779_protocol::reply::{validate, Reply, ReplyError, MAX_REPLY_SIZE};
use cfa779_protocol::{Command, KeypadStatus, Line};

use crate::config::DriverConfig;
use crate::error::Error;
use crate::state::DeviceState;

/// Banner written on line 1 after a successful probe
const PROBE_BANNER: &[u8] = b"cfa779 driver OK";

/// Prefix of the version banner on line 2
const VERSION_PREFIX: &[u8] = b"LCD ";

/// Scratch buffer for one reply block
type ReplyBuffer = [u8; MAX_REPLY_SIZE];

/// CFA-779 device session
///
/// Owns the transport and the shadow state for one panel. Callers must
/// serialize access; see [`crate::poller::KeypadPoller::run`] for sharing
/// a session with the keypad poller.
pub struct Cfa779<T> {
    transport: T,
    address: u8,
    config: DriverConfig,
    state: DeviceState,
}

impl<T: BlockTransport> Cfa779<T> {
    /// Start a session at the default address
    pub fn new(transport: T, config: DriverConfig) -> Self {
        Self::with_address(transport, DEFAULT_ADDRESS, config)
    }

    /// Start a session at a custom address
    pub fn with_address(transport: T, address: u8, config: DriverConfig) -> Self {
        Self {
            transport,
            address,
            config,
            state: DeviceState::new(),
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Shadow values of the last accepted setters
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// End the session and hand back the transport
    pub fn release(self) -> T {
        self.transport
    }

    /// Check that a panel answers at this address
    pub fn identify(&mut self) -> Result<(), Error<T::Error>> {
        let mut buf = [0u8; MAX_REPLY_SIZE];
        self.execute(&Command::Identify, &mut buf)?;
        Ok(())
    }

    /// Probe the panel and show the startup banner
    ///
    /// Only the identify exchange decides success; banner writes that fail
    /// are logged and skipped.
    pub fn probe(&mut self) -> Result<(), Error<T::Error>> {
        if let Err(e) = self.identify() {
            warn!("cfa779: no panel at address {=u8:#x}", self.address);
            return Err(e);
        }
        info!("cfa779: panel found at address {=u8:#x}", self.address);

        if self.set_line1(PROBE_BANNER).is_err() {
            warn!("cfa779: failed to write probe banner");
        }

        let mut banner = [b' '; NUM_COLUMNS];
        banner[..VERSION_PREFIX.len()].copy_from_slice(VERSION_PREFIX);
        let mut version = [0u8; NUM_COLUMNS - VERSION_PREFIX.len() + 1];
        let len = self.version_into(&mut version).unwrap_or(0);
        let end = VERSION_PREFIX.len() + len;
        banner[VERSION_PREFIX.len()..end].copy_from_slice(&version[..len]);

        if self.set_line2(&banner[..end]).is_err() {
            warn!("cfa779: failed to write version banner");
        }
        Ok(())
    }

    /// Show the shutdown banner before the session ends
    ///
    /// Both lines are always attempted; the first failure is returned.
    pub fn shutdown(&mut self) -> Result<(), Error<T::Error>> {
        let first = self.set_line1(b"Shutdown");
        let second = self.set_line2(b"Finished");
        first.and(second)
    }

    /// Move the cursor to `col` (0-16) on `row` (0-1)
    pub fn set_cursor_position(&mut self, col: u8, row: u8) -> Result<(), Error<T::Error>> {
        self.apply_setting(Command::CursorPosition { col, row }, |state| {
            state.set_cursor_position(col, row)
        })
    }

    /// Set the cursor style (0-3)
    pub fn set_cursor_style(&mut self, style: u8) -> Result<(), Error<T::Error>> {
        self.apply_setting(Command::CursorStyle(style), |state| {
            state.set_cursor_style(style)
        })
    }

    /// Set the contrast (0-200)
    pub fn set_contrast(&mut self, value: u8) -> Result<(), Error<T::Error>> {
        self.apply_setting(Command::Contrast(value), |state| state.set_contrast(value))
    }

    /// Set the backlight (0-100)
    pub fn set_backlight(&mut self, value: u8) -> Result<(), Error<T::Error>> {
        self.apply_setting(Command::Backlight(value), |state| state.set_backlight(value))
    }

    /// Replace a full line; text is truncated or space-padded to 16 columns
    pub fn set_line(&mut self, line: Line, text: &[u8]) -> Result<(), Error<T::Error>> {
        self.apply(Command::Text { line, text })
    }

    pub fn set_line1(&mut self, text: &[u8]) -> Result<(), Error<T::Error>> {
        self.set_line(Line::One, text)
    }

    pub fn set_line2(&mut self, text: &[u8]) -> Result<(), Error<T::Error>> {
        self.set_line(Line::Two, text)
    }

    /// Define a user character from exactly nine values
    ///
    /// The first value is the character code, the other eight are bitmap
    /// rows. Each value is truncated to its low byte.
    pub fn define_character(&mut self, values: &[u32]) -> Result<(), Error<T::Error>> {
        if values.len() != USER_CHAR_LEN {
            return Err(Error::InvalidArgument);
        }

        let mut bitmap = [0u8; USER_CHAR_LEN - 1];
        for (row, value) in bitmap.iter_mut().zip(&values[1..]) {
            *row = (*value & 0xFF) as u8;
        }

        self.apply(Command::UserCharacter {
            code: (values[0] & 0xFF) as u8,
            bitmap,
        })
    }

    /// Copy the hardware version text into `buf`
    ///
    /// Copies at most `buf.len() - 1` bytes, always followed by a zero
    /// terminator. Returns the text length (zero on any failure).
    pub fn version_into(&mut self, buf: &mut [u8]) -> Result<usize, Error<T::Error>> {
        if let Some(first) = buf.first_mut() {
            *first = 0;
        }

        let mut raw = [0u8; MAX_REPLY_SIZE];
        let reply = match self.execute(&Command::Version, &mut raw)? {
            Some(reply) => reply,
            None => return Ok(0),
        };

        let text = reply.data();
        let len = text.len().min(buf.len().saturating_sub(1));
        buf[..len].copy_from_slice(&text[..len]);
        if let Some(terminator) = buf.get_mut(len) {
            *terminator = 0;
        }
        Ok(len)
    }

    /// Hardware version text, clipped to `N` bytes
    ///
    /// Non-ASCII bytes are replaced with `?`.
    pub fn version<const N: usize>(&mut self) -> Result<String<N>, Error<T::Error>> {
        let mut buf = [0u8; MAX_REPLY_SIZE];
        let len = self.version_into(&mut buf)?;

        let mut version = String::new();
        for &byte in &buf[..len] {
            let ch = if byte.is_ascii() { byte as char } else { '?' };
            if version.push(ch).is_err() {
                break;
            }
        }
        Ok(version)
    }

    /// Query the keypad
    ///
    /// Returns `Ok(None)` when the reply is not a 14-byte status block.
    pub fn keypad_status(&mut self) -> Result<Option<KeypadStatus>, Error<T::Error>> {
        let mut raw = [0u8; MAX_REPLY_SIZE];
        let status = self
            .execute(&Command::KeypadStatus, &mut raw)?
            .and_then(|reply| KeypadStatus::parse(reply.raw()));

        if status.is_none() {
            debug!("cfa779: keypad status has unexpected length");
        }
        Ok(status)
    }

    /// Send an arbitrary command; `input[0]` is the code, the rest payload
    ///
    /// Bypasses range checks and the validation policy. Requires
    /// [`DriverConfig::rawcmd`]. Returns the full reply block.
    pub fn raw_command(
        &mut self,
        input: &[u8],
    ) -> Result<Vec<u8, MAX_REPLY_SIZE>, Error<T::Error>> {
        if !self.config.rawcmd {
            return Err(Error::Disabled);
        }
        let command = Command::raw(input)?;

        let mut raw = [0u8; MAX_REPLY_SIZE];
        let mut result = Vec::new();
        if let Some(reply) = self.execute(&command, &mut raw)? {
            info!("Result({=usize}): {=[u8]:x}", reply.len(), reply.raw());
            result
                .extend_from_slice(reply.raw())
                .map_err(|_| Error::<T::Error>::Reply(ReplyError::Truncated { len: reply.len() }))?;
        }
        Ok(result)
    }

    /// Send a setter command and record it in the shadow state
    ///
    /// A failed write still records the value unless the policy is strict.
    fn apply_setting(
        &mut self,
        command: Command<'_>,
        update: impl FnOnce(&mut DeviceState),
    ) -> Result<(), Error<T::Error>> {
        let result = self.apply(command);
        match &result {
            Ok(()) => update(&mut self.state),
            Err(Error::Transport(_)) if !self.config.policy.is_strict() => {
                update(&mut self.state)
            }
            Err(_) => {}
        }
        result
    }

    /// Send a setter command, discarding any reply
    fn apply(&mut self, command: Command<'_>) -> Result<(), Error<T::Error>> {
        let mut buf = [0u8; MAX_REPLY_SIZE];
        self.execute(&command, &mut buf)?;
        Ok(())
    }

    /// Run one command/response exchange
    ///
    /// Returns `None` when the command does not read a reply.
    fn execute<'b>(
        &mut self,
        command: &Command<'_>,
        buf: &'b mut ReplyBuffer,
    ) -> Result<Option<Reply<'b>>, Error<T::Error>> {
        let packet = command.to_packet().map_err(|e| {
            debug!("cfa779: rejected cmd {=u8:#x}: {}", command.code(), e);
            Error::<T::Error>::from(e)
        })?;

        self.send(&packet)?;

        let raw = matches!(command, Command::Raw { .. });
        let strict = self.config.policy.is_strict() && !raw;
        if !command.is_query() && !strict {
            return Ok(None);
        }

        let reply = self.receive(packet.code, command.expected_reply_len(), buf)?;
        if strict {
            return reply.ensure_strict().map(Some).map_err(Error::Reply);
        }
        Ok(Some(reply))
    }

    fn send(&mut self, packet: &Packet) -> Result<(), Error<T::Error>> {
        let frame = packet.to_block_frame();
        if self.config.debug {
            trace!(
                "cfa779: TX cmd {=u8:#x} len {=u8}: {=[u8]:x}",
                frame.code,
                frame.length(),
                &frame.body[..]
            );
        }

        self.transport
            .write_block(self.address, frame.code, &frame.body)
            .map_err(|e| {
                warn!("cfa779: block write failed (cmd: {=u8:#x})", frame.code);
                Error::Transport(e)
            })
    }

    fn receive<'b>(
        &mut self,
        code: u8,
        expected_len: Option<usize>,
        buf: &'b mut ReplyBuffer,
    ) -> Result<Reply<'b>, Error<T::Error>> {
        let n = self
            .transport
            .read_block(self.address, code, buf)
            .map_err(|e| {
                warn!("cfa779: No reply from LCD (cmd: {=u8:#x}, bus error)", code);
                Error::Transport(e)
            })?;

        if n > buf.len() {
            warn!("cfa779: reply too long (cmd: {=u8:#x}, length: {=usize})", code, n);
            return Err(Error::Reply(ReplyError::Truncated { len: n }));
        }

        let reply = validate(code, expected_len, &buf[..n]).map_err(|e| {
            match e {
                ReplyError::NoReply { len } => warn!(
                    "cfa779: No reply from LCD (cmd: {=u8:#x}, reply length: {=usize})",
                    code,
                    len
                ),
                ReplyError::Checksum { .. } => {
                    warn!("cfa779: Received packet with invalid CRC (cmd: {=u8:#x})", code)
                }
                _ => warn!("cfa779: bad reply (cmd: {=u8:#x}): {}", code, e),
            }
            Error::<T::Error>::Reply(e)
        })?;

        if let Some((expected, actual)) = reply.length_mismatch() {
            warn!(
                "cfa779: Invalid packet length: {=usize}, expected: {=usize}",
                actual,
                expected
            );
        }
        if let Some(received) = reply.code_mismatch() {
            warn!("cfa779: cmd {=u8:#x} failed with code ({=u8:#x})", code, received);
        }
        if self.config.debug {
            trace!("cfa779: RX cmd {=u8:#x}: {=[u8]:x}", code, reply.raw());
        }

        Ok(reply)
    }
}
