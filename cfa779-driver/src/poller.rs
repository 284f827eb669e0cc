//! Keypad poller
//!
//! Turns keypad status replies into [`KeyEvent`]s on a fixed cadence.
//!
//! ```text
//!          ┌──────┐  interval elapsed   ┌─────────┐
//!   ──────►│ Idle │────────────────────►│ Polling │
//!          └──────┘◄────────────────────└─────────┘
//!              │     reply handled /         │
//!              │     soft failure            │ cmd 9 → 14-byte reply
//!              ▼                             ▼
//!         stop signal                   KeySink::send
//! ```
//!
//! In [`KeypadMode::Level`] a held key re-emits its press every cycle the
//! panel reports it. [`KeypadMode::Edge`] keeps a held flag per key and
//! only reports transitions.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Sender;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use embedded_hal_async::delay::DelayNs;

use cfa779_hal::BlockTransport;
use cfa779_protocol::commands::NUM_KEYS;
use cfa779_protocol::{Key, KeyEvent, KeypadStatus};

use crate::config::{DriverConfig, KeypadMode};
use crate::device::Cfa779;

/// Poller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollerState {
    /// Waiting for the next interval
    Idle,
    /// Status request in flight
    Polling,
}

/// Consumer of key events
pub trait KeySink {
    fn send(&mut self, event: KeyEvent);
}

impl<F: FnMut(KeyEvent)> KeySink for F {
    fn send(&mut self, event: KeyEvent) {
        self(event)
    }
}

/// Forwards events into an `embassy-sync` channel
///
/// Events are dropped when the channel is full.
pub struct ChannelSink<'ch, M: RawMutex, const N: usize> {
    sender: Sender<'ch, M, KeyEvent, N>,
}

impl<'ch, M: RawMutex, const N: usize> ChannelSink<'ch, M, N> {
    pub fn new(sender: Sender<'ch, M, KeyEvent, N>) -> Self {
        Self { sender }
    }
}

impl<M: RawMutex, const N: usize> KeySink for ChannelSink<'_, M, N> {
    fn send(&mut self, event: KeyEvent) {
        if self.sender.try_send(event).is_err() {
            warn!("cfa779: key event channel full, dropping {}", event);
        }
    }
}

/// Stop handle for [`KeypadPoller::run`]
pub struct PollerHandle<M: RawMutex> {
    signal: Signal<M, ()>,
}

impl<M: RawMutex> Default for PollerHandle<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> PollerHandle<M> {
    pub const fn new() -> Self {
        Self {
            signal: Signal::new(),
        }
    }

    /// Ask the running poller to return after its current cycle
    pub fn stop(&self) {
        self.signal.signal(());
    }

    /// Clear a pending stop request so the poller can be restarted
    pub fn reset(&self) {
        self.signal.reset();
    }

    pub fn is_stopped(&self) -> bool {
        self.signal.signaled()
    }
}

/// Keypad poller for one device session
#[derive(Debug, Clone)]
pub struct KeypadPoller {
    state: PollerState,
    mode: KeypadMode,
    keymap: [Key; NUM_KEYS],
    held: [bool; NUM_KEYS],
    interval_ms: u32,
    debug: bool,
}

impl KeypadPoller {
    pub fn new(config: &DriverConfig) -> Self {
        Self {
            state: PollerState::Idle,
            mode: config.keypad_mode,
            keymap: config.keymap,
            held: [false; NUM_KEYS],
            interval_ms: config.poll_interval_ms,
            debug: config.debug,
        }
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Run one poll cycle and return the number of events emitted
    ///
    /// Transport failures, bad CRCs and replies that are not 14 bytes end
    /// the cycle without events.
    pub fn poll<T, S>(&mut self, device: &mut Cfa779<T>, sink: &mut S) -> usize
    where
        T: BlockTransport,
        S: KeySink + ?Sized,
    {
        self.state = PollerState::Polling;
        let status = device.keypad_status();
        self.state = PollerState::Idle;

        match status {
            Ok(Some(status)) => self.dispatch(&status, sink),
            _ => 0,
        }
    }

    /// Emit the events carried by one status reply
    pub fn dispatch<S: KeySink + ?Sized>(&mut self, status: &KeypadStatus, sink: &mut S) -> usize {
        let mut count = 0;
        for event in status.events() {
            let slot = event.key.slot();
            if self.mode == KeypadMode::Edge {
                if self.held[slot] == event.pressed {
                    continue;
                }
                self.held[slot] = event.pressed;
            }

            let event = KeyEvent {
                key: self.keymap[slot],
                pressed: event.pressed,
            };
            if self.debug {
                debug!("cfa779: key {} pressed={}", event.key, event.pressed);
            }
            sink.send(event);
            count += 1;
        }
        count
    }

    /// Poll until `stop` fires
    ///
    /// Each cycle waits the configured interval, then takes the device lock
    /// for the duration of one status exchange.
    pub async fn run<M, T, D, S>(
        &mut self,
        device: &Mutex<M, Cfa779<T>>,
        delay: &mut D,
        sink: &mut S,
        stop: &PollerHandle<M>,
    ) where
        M: RawMutex,
        T: BlockTransport,
        D: DelayNs,
        S: KeySink + ?Sized,
    {
        info!("cfa779: keypad poller started ({=u32} ms)", self.interval_ms);

        loop {
            match select(delay.delay_ms(self.interval_ms), stop.signal.wait()).await {
                Either::First(()) => {
                    let mut guard = device.lock().await;
                    self.poll(&mut *guard, sink);
                }
                Either::Second(()) => break,
            }
        }

        self.state = PollerState::Idle;
        info!("cfa779: keypad poller stopped");
    }
}
