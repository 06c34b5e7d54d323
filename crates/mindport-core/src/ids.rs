/// Produces identifiers that are unique for the lifetime of one import.
///
/// One generator is owned by each top-level parse or conversion and threaded through the call
/// tree, so repeated or concurrent imports never share counter state.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    counter: u64,
    mode: IdMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdMode {
    /// `prefix_<timestamp>_<counter>_<random>`
    Unique,
    /// `prefix_<counter>`
    Sequential,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator {
    /// Ids mix a millisecond timestamp, the counter and random bits.
    pub fn new() -> Self {
        Self {
            counter: 0,
            mode: IdMode::Unique,
        }
    }

    /// Ids are `prefix_<counter>` only. Output is reproducible across runs once the counter is
    /// reset.
    pub fn sequential() -> Self {
        Self {
            counter: 0,
            mode: IdMode::Sequential,
        }
    }

    pub fn reset(&mut self) {
        self.counter = 0;
    }

    pub fn next_id(&mut self, prefix: &str) -> String {
        self.counter += 1;
        match self.mode {
            IdMode::Sequential => format!("{prefix}_{}", self.counter),
            IdMode::Unique => {
                let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
                let random = uuid::Uuid::new_v4().simple().to_string();
                format!(
                    "{prefix}_{}_{}_{}",
                    to_base36(millis),
                    self.counter,
                    &random[..8]
                )
            }
        }
    }
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
