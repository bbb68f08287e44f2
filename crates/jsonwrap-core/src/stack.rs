//! Stack growth for recursion driven by input nesting.
//!
//! Hydration, conversion and serialization recurse once or more per nesting
//! level of the input. Each recursive step runs through [`guard`], which
//! moves onto a fresh heap-allocated stack segment when the current one runs
//! low, so depth is bounded by [`crate::LimitsConfig::max_depth`] rather than
//! by the thread's stack size.

/// Remaining stack below which a new segment is allocated.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated segment.
const SEGMENT: usize = 2 * 1024 * 1024;

/// Upper estimate of the stack serde_json needs per nesting level.
const PARSE_FRAME: usize = 8 * 1024;

/// Run `f`, switching to a new stack segment first if the current one is
/// nearly exhausted.
#[inline]
pub(crate) fn guard<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT, f)
}

/// Run a parse of text nested `depth` levels deep with enough stack for it.
pub(crate) fn for_depth<R>(depth: usize, f: impl FnOnce() -> R) -> R {
    let need = depth.saturating_mul(PARSE_FRAME).saturating_add(RED_ZONE);
    stacker::maybe_grow(need, need.saturating_add(SEGMENT), f)
}
