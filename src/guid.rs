use std::fmt;

/// Unique identifier of a mounted loader. Also used as the namespace of its
/// event bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Guid(u64);

impl Guid {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "infinity{}", self.0)
    }
}

pub trait IdGenerator {
    fn next_guid(&mut self) -> Guid;
}

/// Hands out `infinity1`, `infinity2`, ...
#[derive(Debug, Default)]
pub struct SequentialIds {
    last: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_guid(&mut self) -> Guid {
        self.last += 1;
        Guid(self.last)
    }
}
