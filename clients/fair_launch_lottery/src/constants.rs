// Centralized Client Constants

// Record Store Protocol Limits
// ============================

/// Hard cap on the number of addresses a single `getMultipleAccounts`
/// round-trip accepts. Larger requests are rejected by the RPC node.
pub const MAX_FETCH_BATCH: usize = 100;

/// Maximum bitmap payload per `update_fair_launch_lottery_bitmap` call, in
/// bytes. Each byte carries 8 sequence-number decisions, so one slice covers
/// up to 8 * 1000 tickets.
pub const MAX_BITMAP_SLICE_BYTES: usize = 1000;

// Retry / Backoff Defaults
// ========================

/// Attempts per fetch batch before the batch is surfaced as a run failure.
pub const FETCH_RETRY_ATTEMPTS: u32 = 3;

/// Attempts per bitmap slice write before the run halts. Slices are
/// idempotent to re-apply, so a halted run can simply be re-run.
pub const WRITE_RETRY_ATTEMPTS: u32 = 3;

/// Base delay for the doubling backoff between retries, in milliseconds.
pub const RETRY_BASE_DELAY_MS: u64 = 500;

/// Polls for a freshly created record to become visible before the first
/// slice write. Replaces the original flat 5s sleep with bounded backoff.
pub const RECORD_VISIBILITY_ATTEMPTS: u32 = 8;

// Ticket Record Layout (must match the on-chain program exactly)
// ==============================================================

/// 8-byte account discriminator, then sale id, buyer id.
pub const TICKET_SALE_LOC: usize = 8;
pub const TICKET_BUYER_LOC: usize = TICKET_SALE_LOC + 32;
/// u64 little-endian bid amount in the smallest currency unit.
pub const TICKET_AMOUNT_LOC: usize = TICKET_BUYER_LOC + 32;
/// 1-byte lifecycle state tag.
pub const TICKET_STATE_LOC: usize = TICKET_AMOUNT_LOC + 8;
/// 1-byte PDA bump.
pub const TICKET_BUMP_LOC: usize = TICKET_STATE_LOC + 1;
/// u64 little-endian sequence number, assigned once per ticket.
pub const TICKET_SEQ_LOC: usize = TICKET_BUMP_LOC + 1;
/// Minimum decodable ticket record length.
pub const TICKET_SIZE: usize = TICKET_SEQ_LOC + 8;

// Sequence Lookup Record Layout
// =============================

/// The ticket address a sequence number resolves to lives right after the
/// discriminator.
pub const SEQ_LOOKUP_TICKET_LOC: usize = 8;
pub const SEQ_LOOKUP_SIZE: usize = SEQ_LOOKUP_TICKET_LOC + 32 + 8 + 1;

// Lottery Bitmap Record Layout
// ============================

pub const BITMAP_SALE_LOC: usize = 8;
pub const BITMAP_BUMP_LOC: usize = BITMAP_SALE_LOC + 32;
/// u64 little-endian running count of "won" bits set across all slices.
pub const BITMAP_ONES_LOC: usize = BITMAP_BUMP_LOC + 1;
/// Packed bit array starts here: one bit per sequence number, big-endian
/// within each byte (bit 7 = lowest sequence number of the byte group).
pub const BITMAP_DATA_LOC: usize = BITMAP_ONES_LOC + 8;
