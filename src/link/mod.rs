//! The radio link: broadcast pacing on the data plane, discovery and command/OTA sessions on the
//! control plane.
//!
//! # Radio ownership
//!
//! There is exactly one shared resource, the radio, and exactly one owner at any instant.
//! While admin mode is off, [`show`] owns it and streams universe frames. Once admin mode is on
//! (or any session slot is bound), the pacer is inhibited and only the beacon emitter and the
//! session state machine transmit. All of this is cooperative: the host drives the core from its
//! event loop through [`show`] at frame rate and [`tick`] at 10 Hz or better, and nothing in here
//! blocks for longer than a single radio write.
//!
//! # Sessions
//!
//! Every admin operation starts with a BIND broadcast that assigns the target fixture a
//! dedicated return address on one of four radio pipes. What follows depends on the bind reason:
//! a single configuration request, or the SETUP → WRITE → COMMIT loop walking a firmware image
//! record by record, concluded by a whole-image AUDIT. Replies drive the per-slot state machine
//! forward; a 1-second retry clock retransmits the frame the slot is waiting on, and a session
//! that stays silent for 11 retransmissions is failed back to the caller through the
//! [`Observer`].
//!
//! [`show`]: struct.RadioLink.html#method.show
//! [`tick`]: struct.RadioLink.html#method.tick
//! [`Observer`]: trait.Observer.html

mod session;
pub mod wire;

pub use self::session::{BindReason, Context, SessionState, MAX_RETRIES, MAX_SESSIONS};

use heapless::{consts::U10, Vec};

use self::session::{Job, OtaCursor, PipeSlot};
use self::wire::Frame;
use crate::config::Config;
use crate::device::{DeviceId, DeviceInfo};
use crate::dmx::{Universe, UniverseSize};
use crate::hex;
use crate::hex::FirmwareFile;
use crate::phy::{Address, Band, CrcMode, DataRate, PaLevel};
use crate::radio::{Radio, NUM_PIPES, PAYLOAD_LEN};
use crate::scan::{self, Histogram};
use crate::time::{Duration, Instant, Timer};
use crate::utils::HexSlice;
use crate::Error;

/// Pause between discovery beacons.
const BEACON_INTERVAL: Duration = Duration::from_millis(2500);

/// Shortest pause between two batched discovery pushes.
const DEVLIST_INTERVAL: Duration = Duration::from_millis(1000);

/// Push the discovery batch immediately once it has grown this large.
const DEVLIST_HIGH_WATER: usize = 9;

/// Retransmit a pending request once it has waited this long for a reply.
const RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// Receiver of everything the core reports back to the host asynchronously.
///
/// All methods default to doing nothing, so a host only implements the callbacks it routes
/// somewhere.
pub trait Observer {
    /// A batch of fixtures discovered since the last push.
    fn device_list(&mut self, _devices: &[DeviceInfo]) {}

    /// Outcome of a [`flash`] session.
    ///
    /// [`flash`]: struct.RadioLink.html#method.flash
    fn flash_done(&mut self, _device: DeviceId, _ctx: Context, _result: Result<(), Error>) {}

    /// Outcome of a [`set_start_channel`] session.
    ///
    /// [`set_start_channel`]: struct.RadioLink.html#method.set_start_channel
    fn start_channel_done(&mut self, _device: DeviceId, _ctx: Context, _result: Result<(), Error>) {
    }

    /// Outcome of a [`set_device_id`] session.
    ///
    /// [`set_device_id`]: struct.RadioLink.html#method.set_device_id
    fn device_id_done(&mut self, _device: DeviceId, _ctx: Context, _result: Result<(), Error>) {}

    /// Outcome of a [`set_rf_channel`] session.
    ///
    /// [`set_rf_channel`]: struct.RadioLink.html#method.set_rf_channel
    fn rf_channel_done(&mut self, _device: DeviceId, _ctx: Context, _result: Result<(), Error>) {}

    /// Heartbeat LED state, toggled roughly once per second of streaming.
    fn heartbeat(&mut self, _on: bool) {}
}

/// The bridge core: one owned value per radio.
pub struct RadioLink<C: Config> {
    radio: C::Radio,
    timer: C::Timer,
    observer: C::Observer,

    universe: Universe,
    rate: DataRate,
    band: Band,
    last_frame: Instant,
    blink_countdown: u16,
    led_on: bool,

    admin: bool,
    beacons: bool,
    last_beacon: Instant,

    slots: [PipeSlot<C::Firmware>; MAX_SESSIONS],
    devices: Vec<DeviceInfo, U10>,
    last_push: Instant,
}

impl<C: Config> RadioLink<C> {
    /// Creates the core around the host's capabilities. The radio stays untouched until
    /// [`begin`] is called.
    ///
    /// [`begin`]: #method.begin
    pub fn new(radio: C::Radio, timer: C::Timer, observer: C::Observer) -> Self {
        let now = timer.now();
        RadioLink {
            radio,
            timer,
            observer,
            universe: Universe::new(UniverseSize::Legacy),
            rate: DataRate::default(),
            band: Band::Legacy,
            last_frame: now,
            blink_countdown: 1,
            led_on: true,
            admin: false,
            beacons: false,
            last_beacon: now,
            slots: [
                PipeSlot::idle(),
                PipeSlot::idle(),
                PipeSlot::idle(),
                PipeSlot::idle(),
            ],
            devices: Vec::new(),
            last_push: now,
        }
    }

    /// Brings the radio up with the given configuration and resets all link state.
    ///
    /// The configuration stays fixed until the next `begin`; nothing mutates it while sessions
    /// exist.
    pub fn begin(&mut self, rate: DataRate, band: Band, size: UniverseSize) {
        info!(
            "link up: {:?} on channel {} with {:?} universe",
            rate,
            band.rf_channel(),
            size
        );

        self.rate = rate;
        self.band = band;
        self.universe = Universe::new(size);
        self.admin = false;
        self.beacons = false;
        self.devices.clear();
        self.slots = [
            PipeSlot::idle(),
            PipeSlot::idle(),
            PipeSlot::idle(),
            PipeSlot::idle(),
        ];
        let now = self.timer.now();
        self.last_frame = now;
        self.last_beacon = now;
        self.last_push = now;
        self.blink_countdown = 1;
        self.led_on = true;

        self.radio
            .configure(rate, band.rf_channel(), self.addr_width(), CrcMode::Crc16, PaLevel::High);
        for pipe in 0..NUM_PIPES {
            self.radio.set_auto_ack(pipe, false);
        }
        match size {
            UniverseSize::Legacy => {
                self.radio.open_tx(&wire::LEGACY_BROADCAST);
            }
            UniverseSize::Full => {
                self.radio.open_tx(&wire::BROADCAST);
                self.radio.open_rx(1, &wire::CONTROL);
            }
        }
        self.radio.stop_listening();
    }

    fn addr_width(&self) -> u8 {
        match self.universe {
            Universe::Legacy { .. } => 5,
            Universe::Full { .. } => 3,
        }
    }

    /// Stores one DMX channel value for the next refresh. Out-of-range channels are ignored.
    pub fn set_channel(&mut self, channel: u16, value: u8) {
        self.universe.set_channel(channel, value);
    }

    /// Returns `true` once the inter-frame gap has elapsed and [`show`] would transmit.
    ///
    /// [`show`]: #method.show
    pub fn can_refresh(&self) -> bool {
        self.timer.now().duration_since(self.last_frame) >= self.universe.frame_gap()
    }

    /// Transmits the next universe frame, if one is due and the control plane does not own the
    /// radio. Called at high frequency from the host's loop.
    pub fn show(&mut self) {
        if self.admin || self.slots.iter().any(|s| s.in_use()) || !self.can_refresh() {
            return;
        }

        self.radio.stop_listening();
        self.radio.write(self.universe.next_frame(), true);
        self.last_frame = self.timer.now();
        self.universe.advance();

        self.blink_countdown -= 1;
        if self.blink_countdown == 0 {
            self.led_on = !self.led_on;
            self.observer.heartbeat(self.led_on);
            self.blink_countdown = self.universe.frames_per_blink();
        }

        self.radio.start_listening();
    }

    /// The raw universe buffer, for host-side visualization.
    pub fn dmx_data(&self) -> &[u8] {
        self.universe.as_bytes()
    }

    /// Switches the radio to the control plane: the pacer is silenced and discovery beacons
    /// start going out.
    pub fn enable_admin(&mut self) {
        if self.admin {
            return;
        }
        info!("admin mode on");
        self.admin = true;
        self.beacons = true;
        let now = self.timer.now();
        // Backdate so the first tick beacons right away.
        self.last_beacon = now - BEACON_INTERVAL;
        self.last_push = now;
        self.radio.start_listening();
    }

    /// Hands the radio back to the pacer. Unfinished sessions are dropped without callbacks and
    /// the pending discovery batch is discarded.
    pub fn disable_admin(&mut self) {
        if !self.admin {
            return;
        }
        info!("admin mode off");
        self.admin = false;
        self.beacons = false;
        self.devices.clear();
        for slot in &mut self.slots {
            if slot.in_use() {
                debug!("dropping {:?} session to {:?}", slot.job.reason(), slot.target);
                slot.release();
            }
        }
        self.radio.stop_listening();
    }

    /// Whether the control plane currently owns the radio.
    pub fn is_admin(&self) -> bool {
        self.admin
    }

    /// Periodic housekeeping: drains received frames, emits beacons, pushes the discovery batch,
    /// and drives session retries. Call at least every 100 ms.
    pub fn tick(&mut self) {
        self.check_rx();

        let now = self.timer.now();
        if self.admin && self.beacons && now.duration_since(self.last_beacon) >= BEACON_INTERVAL {
            trace!("beacon");
            Self::send_unacked(&mut self.radio, &wire::CONTROL, &wire::beacon());
            self.last_beacon = now;
        }

        if !self.devices.is_empty() && now.duration_since(self.last_push) >= DEVLIST_INTERVAL {
            self.push_devices(now);
        }

        for idx in 0..MAX_SESSIONS {
            if !self.slots[idx].in_use()
                || now.duration_since(self.slots[idx].wait_time) < RETRY_INTERVAL
            {
                continue;
            }
            self.slots[idx].wait_count += 1;
            if self.slots[idx].wait_count > MAX_RETRIES {
                self.fail(idx);
            } else {
                debug!(
                    "retry {} of {:?} in {:?}",
                    self.slots[idx].wait_count, self.slots[idx].target, self.slots[idx].state
                );
                self.transmit(idx);
            }
        }
    }

    /// Drains the radio's receive queue and dispatches every frame. Also called from [`tick`].
    ///
    /// [`tick`]: #method.tick
    pub fn check_rx(&mut self) {
        while let Some(pipe) = self.radio.available() {
            let mut frame = [0; PAYLOAD_LEN];
            self.radio.read(&mut frame);
            self.dispatch(pipe, &frame);
        }
    }

    /// Starts a firmware upload. The outcome arrives through [`Observer::flash_done`].
    ///
    /// Fails immediately when `image` yields no records, when `target` already has a session, or
    /// when no slot is free.
    ///
    /// [`Observer::flash_done`]: trait.Observer.html#method.flash_done
    pub fn flash(
        &mut self,
        target: DeviceId,
        mut image: C::Firmware,
        ctx: Context,
    ) -> Result<usize, Error> {
        let first = hex::read_record_at(&mut image, 0);
        if first.is_empty() {
            return Err(Error::BadImage);
        }
        let cursor = OtaCursor {
            offset: 0,
            start_addr: first.addr(),
            size_bytes: 0,
            csum16: 0,
        };
        self.bind(target, Job::Flash { file: image, cursor }, ctx)
    }

    /// Reconfigures a fixture's E1.31 start channel (1-based). The outcome arrives through
    /// [`Observer::start_channel_done`].
    ///
    /// [`Observer::start_channel_done`]: trait.Observer.html#method.start_channel_done
    pub fn set_start_channel(
        &mut self,
        target: DeviceId,
        channel: u16,
        ctx: Context,
    ) -> Result<usize, Error> {
        if channel < 1 || channel > 512 {
            return Err(Error::InvalidChannel);
        }
        // On the wire the fixture stores the zero-based offset.
        self.bind(target, Job::StartChannel(channel - 1), ctx)
    }

    /// Rewrites a fixture's device identifier. The outcome arrives through
    /// [`Observer::device_id_done`].
    ///
    /// [`Observer::device_id_done`]: trait.Observer.html#method.device_id_done
    pub fn set_device_id(
        &mut self,
        target: DeviceId,
        new_id: DeviceId,
        ctx: Context,
    ) -> Result<usize, Error> {
        self.bind(target, Job::DeviceId(new_id), ctx)
    }

    /// Moves a fixture to another RF channel. The outcome arrives through
    /// [`Observer::rf_channel_done`].
    ///
    /// [`Observer::rf_channel_done`]: trait.Observer.html#method.rf_channel_done
    pub fn set_rf_channel(
        &mut self,
        target: DeviceId,
        channel: u8,
        ctx: Context,
    ) -> Result<usize, Error> {
        self.bind(target, Job::RfChannel(channel), ctx)
    }

    /// Cancels every session belonging to `ctx`, typically because the requesting client
    /// disconnected. Cancelled sessions deliver no callbacks. Returns how many were cancelled.
    pub fn clear_context(&mut self, ctx: Context) -> usize {
        let mut cleared = 0;
        for slot in &mut self.slots {
            if slot.in_use() && slot.context == Some(ctx) {
                debug!("cancelling {:?} session to {:?}", slot.job.reason(), slot.target);
                slot.release();
                cleared += 1;
            }
        }
        if cleared > 0 && self.slots.iter().all(|s| !s.in_use()) {
            self.beacons = self.admin;
        }
        cleared
    }

    /// Sweeps the band for carriers and restores the working configuration afterwards.
    pub fn scan_channels(&mut self) -> Histogram {
        let histogram = scan::sweep(&mut self.radio, &self.timer);
        self.radio
            .configure(self.rate, self.band.rf_channel(), self.addr_width(), CrcMode::Crc16, PaLevel::High);
        if self.admin {
            self.radio.start_listening();
        } else {
            self.radio.stop_listening();
        }
        histogram
    }

    fn bind(
        &mut self,
        target: DeviceId,
        job: Job<C::Firmware>,
        ctx: Context,
    ) -> Result<usize, Error> {
        if self.slots.iter().any(|s| s.in_use() && s.target == target) {
            return Err(Error::AlreadyBound);
        }
        let idx = self
            .slots
            .iter()
            .position(|s| !s.in_use())
            .ok_or(Error::NoFreeSlot)?;

        debug!("binding {:?} for {:?} on slot {}", target, job.reason(), idx);
        let slot = &mut self.slots[idx];
        slot.state = SessionState::W4BindAck;
        slot.target = target;
        slot.job = job;
        slot.context = Some(ctx);
        slot.wait_count = 0;
        slot.nonce = slot.nonce.wrapping_add(1);

        // The pacer is already quiet (a slot is bound); beacons pause too until every slot is
        // back to idle.
        self.beacons = false;
        self.radio
            .open_rx(wire::session_pipe(idx), &wire::session_rx_addr(idx));
        self.transmit(idx);
        Ok(idx)
    }

    /// Sends the frame the slot's state calls for and restamps its retry clock.
    fn transmit(&mut self, idx: usize) {
        let now = self.timer.now();
        let frame = Self::frame_for(idx, &mut self.slots[idx]);
        self.slots[idx].arm(now);

        let frame = match frame {
            Some(frame) => frame,
            None => return,
        };
        if self.slots[idx].state == SessionState::W4BindAck {
            Self::send_unacked(&mut self.radio, &wire::CONTROL, &frame);
        } else {
            let addr = self.slots[idx].target.address();
            if !Self::send_p2p(&mut self.radio, &addr, &frame) {
                trace!("no radio-level ack from {:?}", self.slots[idx].target);
            }
        }
    }

    /// Builds the frame matching a slot's state, re-reading the record in flight for OTA states.
    ///
    /// `None` either means the state needs no (re)transmission or that the image could not be
    /// read right now; the retry clock then fires the next attempt.
    fn frame_for(idx: usize, slot: &mut PipeSlot<C::Firmware>) -> Option<Frame> {
        let state = slot.state;
        match state {
            SessionState::None => None,
            SessionState::W4BindAck => Some(wire::bind(
                slot.target,
                wire::session_rx_id(idx),
                slot.nonce,
            )),
            SessionState::W4SetupAck | SessionState::W4WriteAck | SessionState::W4CommitAck => {
                let (file, cursor) = slot.flash_job()?;
                let rec = hex::read_record_at(file, cursor.offset);
                if rec.is_empty() {
                    debug!("ota: no record at offset {}, will retry", cursor.offset);
                    return None;
                }
                Some(match state {
                    SessionState::W4SetupAck => wire::setup(rec.addr()),
                    SessionState::W4WriteAck => wire::write(&rec),
                    _ => wire::commit(&rec),
                })
            }
            SessionState::W4AuditAck => {
                let (_, cursor) = slot.flash_job()?;
                Some(wire::audit(
                    cursor.start_addr,
                    (cursor.size_bytes / 2) as u16,
                    cursor.csum16,
                ))
            }
            SessionState::W4ChanAck => match slot.job {
                Job::StartChannel(channel) => Some(wire::set_start(channel)),
                _ => None,
            },
            SessionState::W4DevIdAck => match slot.job {
                Job::DeviceId(new_id) => Some(wire::set_devid(new_id)),
                _ => None,
            },
            SessionState::W4RfAck => match slot.job {
                Job::RfChannel(channel) => Some(wire::set_rf_channel(channel)),
                _ => None,
            },
        }
    }

    fn dispatch(&mut self, pipe: u8, frame: &Frame) {
        match frame[0] {
            wire::opcode::DEVINFO => self.on_device_info(frame),
            wire::opcode::BEACON => {
                // Another bridge on the same site; nothing to do about it.
                warn!("foreign master beacon on pipe {}", pipe);
            }
            _ => {
                let slot = (pipe as usize).wrapping_sub(2);
                if slot < MAX_SESSIONS {
                    self.on_reply(slot, frame);
                } else {
                    trace!(
                        "discarding frame on pipe {}: {:?}",
                        pipe,
                        HexSlice(&frame[..8])
                    );
                }
            }
        }
    }

    fn on_device_info(&mut self, frame: &Frame) {
        if !self.admin {
            trace!("beacon reply while admin is off");
            self.devices.clear();
            return;
        }
        let info = match DeviceInfo::parse(frame) {
            Ok(info) => info,
            Err(e) => {
                debug!("unparseable beacon reply: {:?}", e);
                return;
            }
        };

        if let Some(pos) = self.devices.iter().position(|d| d.dev_id == info.dev_id) {
            self.devices[pos] = info;
        } else if self.devices.push(info).is_err() {
            warn!("discovery list full, dropping {:?}", info.dev_id);
        }

        if self.devices.len() >= DEVLIST_HIGH_WATER {
            let now = self.timer.now();
            self.push_devices(now);
        }
    }

    fn push_devices(&mut self, now: Instant) {
        debug!("pushing {} discovered devices", self.devices.len());
        self.observer.device_list(&self.devices);
        self.devices.clear();
        self.last_push = now;
    }

    fn on_reply(&mut self, idx: usize, frame: &Frame) {
        let op = frame[0];
        let result = frame[1];
        let state = self.slots[idx].state;

        match (state, op) {
            (SessionState::None, _) => {
                trace!("reply on idle slot {}: {:?}", idx, HexSlice(&frame[..8]));
            }
            (SessionState::W4BindAck, wire::opcode::BIND) => {
                if result == wire::ACK {
                    let next = match self.slots[idx].job.reason() {
                        Some(BindReason::Flash) => SessionState::W4SetupAck,
                        Some(BindReason::StartChannel) => SessionState::W4ChanAck,
                        Some(BindReason::DeviceId) => SessionState::W4DevIdAck,
                        Some(BindReason::RfChannel) => SessionState::W4RfAck,
                        None => return,
                    };
                    self.advance(idx, next);
                } else {
                    self.nack(idx);
                }
            }
            (SessionState::W4SetupAck, wire::opcode::SETUP) => {
                if result == wire::ACK {
                    self.advance(idx, SessionState::W4WriteAck);
                } else {
                    self.nack(idx);
                }
            }
            (SessionState::W4WriteAck, wire::opcode::WRITE) => {
                if result == wire::ACK {
                    self.advance(idx, SessionState::W4CommitAck);
                } else {
                    self.nack(idx);
                }
            }
            (SessionState::W4CommitAck, wire::opcode::COMMIT) => {
                if result == wire::ACK {
                    self.record_committed(idx);
                } else {
                    self.nack(idx);
                }
            }
            (SessionState::W4AuditAck, wire::opcode::AUDIT) => {
                // Whatever the verdict, let the fixture reboot into the result.
                let addr = self.slots[idx].target.address();
                Self::send_unacked(&mut self.radio, &addr, &wire::reset());
                let outcome = if result == wire::ACK {
                    Ok(())
                } else {
                    Err(Error::Refused)
                };
                self.complete(idx, outcome);
            }
            (SessionState::W4ChanAck, wire::opcode::SET_START)
            | (SessionState::W4DevIdAck, wire::opcode::SET_DEVID)
            | (SessionState::W4RfAck, wire::opcode::SET_RFCHAN) => {
                let outcome = if result == wire::ACK {
                    Ok(())
                } else {
                    Err(Error::Refused)
                };
                self.complete(idx, outcome);
            }
            _ => {
                debug!("unexpected {:02x} reply in {:?}", op, state);
            }
        }
    }

    /// Moves a slot to its next state with a fresh retry budget and transmits that state's
    /// frame.
    fn advance(&mut self, idx: usize, next: SessionState) {
        self.slots[idx].state = next;
        self.slots[idx].wait_count = 0;
        self.transmit(idx);
    }

    /// A fixture rejected the frame in flight: retransmit it, burning retry budget.
    fn nack(&mut self, idx: usize) {
        self.slots[idx].wait_count += 1;
        if self.slots[idx].wait_count > MAX_RETRIES {
            self.fail(idx);
        } else {
            debug!("nack from {:?} in {:?}", self.slots[idx].target, self.slots[idx].state);
            self.transmit(idx);
        }
    }

    /// COMMIT acknowledged: account for the record, then continue with the next one or move on
    /// to the audit.
    fn record_committed(&mut self, idx: usize) {
        let next = {
            let (file, cursor) = match self.slots[idx].flash_job() {
                Some(job) => job,
                None => return,
            };
            let rec = hex::read_record_at(file, cursor.offset);
            if rec.is_empty() {
                SessionState::W4AuditAck
            } else {
                cursor.size_bytes += rec.len() as u32;
                cursor.csum16 = wire::fold_csum16(cursor.csum16, rec.payload());
                cursor.offset = file.position();
                if hex::read_record(file).is_empty() {
                    SessionState::W4AuditAck
                } else {
                    SessionState::W4SetupAck
                }
            }
        };
        self.advance(idx, next);
    }

    /// The retry budget ran out: fail the session back to its caller.
    fn fail(&mut self, idx: usize) {
        error!(
            "session to {:?} timed out in {:?}",
            self.slots[idx].target, self.slots[idx].state
        );
        if self.slots[idx].job.reason() == Some(BindReason::StartChannel) {
            // Best effort: a reboot brings the fixture back on its old start channel.
            let addr = self.slots[idx].target.address();
            Self::send_unacked(&mut self.radio, &addr, &wire::reset());
        }
        self.complete(idx, Err(Error::Timeout));
    }

    /// Frees the slot and routes the outcome to the reason's callback.
    fn complete(&mut self, idx: usize, result: Result<(), Error>) {
        let target = self.slots[idx].target;
        let reason = self.slots[idx].job.reason();
        let ctx = self.slots[idx].release();

        if let (Some(reason), Some(ctx)) = (reason, ctx) {
            match reason {
                BindReason::Flash => self.observer.flash_done(target, ctx, result),
                BindReason::StartChannel => self.observer.start_channel_done(target, ctx, result),
                BindReason::DeviceId => self.observer.device_id_done(target, ctx, result),
                BindReason::RfChannel => self.observer.rf_channel_done(target, ctx, result),
            }
        }

        if self.slots.iter().all(|s| !s.in_use()) {
            self.beacons = self.admin;
        }
    }

    /// One acknowledged point-to-point write: auto-ack is switched on for the transmission and
    /// back off before the radio returns to listening.
    fn send_p2p(radio: &mut C::Radio, addr: &Address, frame: &Frame) -> bool {
        radio.stop_listening();
        radio.open_tx(addr);
        radio.set_auto_ack(0, true);
        let acked = radio.write(frame, false);
        radio.set_auto_ack(0, false);
        radio.open_tx(&wire::BROADCAST);
        radio.start_listening();
        acked
    }

    /// One unacknowledged write (beacons, binds, resets).
    fn send_unacked(radio: &mut C::Radio, addr: &Address, frame: &Frame) {
        radio.stop_listening();
        radio.open_tx(addr);
        radio.write(frame, true);
        radio.open_tx(&wire::BROADCAST);
        radio.start_listening();
    }
}
