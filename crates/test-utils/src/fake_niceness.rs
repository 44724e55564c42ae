use proclab::errors::{ProclabError, Result};
use proclab::scenarios::priority::NicenessAdjuster;

/// An adjuster that refuses every change the way an unprivileged `nice`
/// call refuses a negative delta, whatever the caller's uid.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyingNiceness;

impl NicenessAdjuster for DenyingNiceness {
    fn adjust(&self, _delta: i32) -> Result<i32> {
        Err(ProclabError::Permission(
            "nice: Operation not permitted".to_string(),
        ))
    }
}

/// An adjuster that reports success without touching the scheduler.
///
/// The reported niceness is `base + delta`, clamped to the kernel's range.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedNiceness {
    pub base: i32,
}

impl NicenessAdjuster for FixedNiceness {
    fn adjust(&self, delta: i32) -> Result<i32> {
        Ok((self.base + delta).clamp(-20, 19))
    }
}
