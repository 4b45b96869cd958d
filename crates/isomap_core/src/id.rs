//! Unique id generation for maps, layers, objects and tilesets

use uuid::Uuid;

/// Generates ids that are unique for the lifetime of the generator's session.
///
/// Ids have the form `<session>-<counter>` where the counter is monotonic and
/// rendered in base 36. The session tag is derived from a random UUID so that
/// ids from separate editor sessions do not collide when documents are merged.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    session: String,
    counter: u64,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator {
    /// Create a generator with a random session tag
    pub fn new() -> Self {
        let uuid = Uuid::new_v4().simple().to_string();
        Self {
            session: uuid[..8].to_string(),
            counter: 0,
        }
    }

    /// Create a generator with a fixed session tag
    pub fn with_session(session: impl Into<String>) -> Self {
        Self {
            session: session.into(),
            counter: 0,
        }
    }

    /// Produce the next id
    pub fn generate(&mut self) -> String {
        let id = format!("{}-{}", self.session, to_base36(self.counter));
        self.counter += 1;
        id
    }

    /// Number of ids handed out so far
    pub fn issued(&self) -> u64 {
        self.counter
    }

    /// Restart the counter so id sequences are reproducible
    #[cfg(any(test, feature = "test-utils"))]
    pub fn reset(&mut self) {
        self.counter = 0;
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while value > 0 {
        buf.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    buf.reverse();
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique() {
        let mut ids = IdGenerator::new();
        let generated: HashSet<_> = (0..1000).map(|_| ids.generate()).collect();
        assert_eq!(generated.len(), 1000);
        assert_eq!(ids.issued(), 1000);
    }

    #[test]
    fn test_fixed_session_sequence() {
        let mut ids = IdGenerator::with_session("test");
        assert_eq!(ids.generate(), "test-0");
        assert_eq!(ids.generate(), "test-1");
        for _ in 0..34 {
            ids.generate();
        }
        assert_eq!(ids.generate(), "test-10");
    }

    #[test]
    fn test_reset_restarts_sequence() {
        let mut ids = IdGenerator::with_session("test");
        ids.generate();
        ids.generate();
        ids.reset();
        assert_eq!(ids.generate(), "test-0");
    }

    #[test]
    fn test_separate_sessions_differ() {
        let mut a = IdGenerator::new();
        let mut b = IdGenerator::new();
        assert_ne!(a.generate(), b.generate());
    }
}
