//! The point-to-point session table.
//!
//! Four slots, one per spare radio pipe. Each slot tracks one in-flight admin request: which
//! fixture it is bound to, what it was bound for, the retry clock, and the request's scratch
//! data. A slot whose state is [`SessionState::None`] is free, and free slots never hold a caller
//! context.
//!
//! [`SessionState::None`]: enum.SessionState.html#variant.None

use crate::device::DeviceId;
use crate::time::Instant;

/// Number of concurrent point-to-point sessions.
pub const MAX_SESSIONS: usize = 4;

/// Retransmissions after which a silent session is declared dead.
pub const MAX_RETRIES: u8 = 10;

/// What a slot is waiting for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Slot is free.
    None,
    W4BindAck,
    W4SetupAck,
    W4WriteAck,
    W4CommitAck,
    W4AuditAck,
    W4ChanAck,
    W4DevIdAck,
    W4RfAck,
}

/// Why a session was bound; selects the post-bind request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BindReason {
    Flash,
    StartChannel,
    DeviceId,
    RfChannel,
}

/// Progress through a firmware image.
#[derive(Copy, Clone, Debug)]
pub struct OtaCursor {
    /// File offset of the record in flight, for seek-and-reread on retransmission.
    pub offset: u32,
    /// Word address of the first record, latched once for the final audit.
    pub start_addr: u16,
    /// Payload bytes confirmed written so far.
    pub size_bytes: u32,
    /// Running negated word sum over everything confirmed written.
    pub csum16: u16,
}

/// Per-reason session scratch.
pub enum Job<F> {
    Idle,
    Flash { file: F, cursor: OtaCursor },
    StartChannel(u16),
    DeviceId(DeviceId),
    RfChannel(u8),
}

impl<F> Job<F> {
    /// The bind reason this job corresponds to, or `None` when idle.
    pub fn reason(&self) -> Option<BindReason> {
        match self {
            Job::Idle => None,
            Job::Flash { .. } => Some(BindReason::Flash),
            Job::StartChannel(_) => Some(BindReason::StartChannel),
            Job::DeviceId(_) => Some(BindReason::DeviceId),
            Job::RfChannel(_) => Some(BindReason::RfChannel),
        }
    }
}

/// Opaque caller handle, echoed back through the observer so the host can route an outcome to
/// the client that asked for it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Context(pub u32);

/// One session slot.
pub struct PipeSlot<F> {
    pub state: SessionState,
    pub target: DeviceId,
    pub job: Job<F>,
    pub context: Option<Context>,
    /// When this slot last transmitted.
    pub wait_time: Instant,
    /// Retransmissions burned so far.
    pub wait_count: u8,
    /// Slot-monotonic bind nonce, so a fixture can spot a duplicated bind broadcast.
    pub nonce: u8,
}

impl<F> PipeSlot<F> {
    pub fn idle() -> Self {
        PipeSlot {
            state: SessionState::None,
            target: DeviceId::new(0),
            job: Job::Idle,
            context: None,
            wait_time: Instant::from_raw_micros(0),
            wait_count: 0,
            nonce: 0,
        }
    }

    /// Whether this slot currently carries a session.
    pub fn in_use(&self) -> bool {
        self.state != SessionState::None
    }

    /// Restamps the retry clock; called on every transmission.
    pub fn arm(&mut self, now: Instant) {
        self.wait_time = now;
    }

    /// Frees the slot, dropping its job scratch, and hands back the caller context.
    ///
    /// The nonce survives release; the next bind through this slot gets a fresh value.
    pub fn release(&mut self) -> Option<Context> {
        self.state = SessionState::None;
        self.job = Job::Idle;
        self.wait_count = 0;
        self.context.take()
    }

    /// Mutable access to the OTA scratch, if this is a flashing session.
    pub fn flash_job(&mut self) -> Option<(&mut F, &mut OtaCursor)> {
        match &mut self.job {
            Job::Flash { file, cursor } => Some((file, cursor)),
            _ => None,
        }
    }
}
