use crc32fast::Hasher;

/// Derive a short session seed from an arbitrary token using CRC32
pub fn session_seed(token: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(token.as_bytes());
    format!("{:08x}", hasher.finalize())
}

/// Sequential ID generator for steps and components within an edit session
///
/// IDs look like `step-<seed>-<n>` / `options-<seed>-<n>`. The seed is derived
/// from the session start time, so ids minted by different sessions over the
/// same stored document do not collide.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u32,
}

impl IdGenerator {
    /// Seeded from the current time (nanosecond resolution)
    pub fn new() -> Self {
        let now = chrono::Utc::now();
        let token = format!(
            "{}-{}",
            now.timestamp(),
            now.timestamp_subsec_nanos()
        );
        Self::from_seed(session_seed(&token))
    }

    pub fn from_seed(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            count: 0,
        }
    }

    /// Generate next sequential ID with the given kind prefix
    pub fn new_id(&mut self, kind: &str) -> String {
        self.count += 1;
        format!("{}-{}-{}", kind, self.seed, self.count)
    }

    /// Generate the next ID that `taken` does not already contain
    pub fn fresh_id(&mut self, kind: &str, taken: impl Fn(&str) -> bool) -> String {
        loop {
            let id = self.new_id(kind);
            if !taken(&id) {
                return id;
            }
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
