/// Monotonic rule ID generator.
///
/// IDs are never reused: a rule may only reference rules created before it,
/// and that ordering is exactly the ID ordering.
#[derive(Debug, Default)]
pub(crate) struct IdGenerator {
    next: u32,
}

impl IdGenerator {
    /// Creates a new ID generator starting from ID 0.
    pub(crate) fn new() -> Self {
        Self { next: 0 }
    }

    /// Returns the next ID, or `None` once the `u32` space is exhausted.
    pub(crate) fn get(&mut self) -> Option<u32> {
        let id = self.next;
        self.next = self.next.checked_add(1)?;
        Some(id)
    }

    /// Number of IDs handed out so far.
    pub(crate) fn issued(&self) -> u32 {
        self.next
    }
}
