//! UCI `option`/`setoption` surface: maps GUI-facing option names onto
//! [`EngineConfig`]. `Threads` is accepted for compatibility but has no
//! effect, since parallel search is out of scope.

use crate::config::EngineConfig;

pub struct UciOptions {
    pub hash_mb: usize,
    pub threads: usize,
}

impl UciOptions {
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        UciOptions {
            hash_mb: config.tt_size_mb,
            threads: 1,
        }
    }

    /// Emits the `id`/`option`/`uciok` block for the `uci` command.
    pub fn print(&self) {
        println!("id name corvus");
        println!("id author the corvus contributors");
        println!("option name Hash type spin default {} min 1 max 65536", self.hash_mb);
        println!("option name Threads type spin default {} min 1 max 1", self.threads);
        println!("uciok");
    }

    /// Applies a parsed `setoption name <name> value <value>` pair, updating
    /// `config` and returning `true` if the hash table size changed (the
    /// caller must then reallocate the transposition table).
    pub fn apply(&mut self, name: &str, value: Option<&str>, config: &mut EngineConfig) -> bool {
        match name.trim().to_ascii_lowercase().as_str() {
            "hash" => {
                let mb = value.and_then(|v| v.parse::<usize>().ok()).unwrap_or(self.hash_mb).max(1);
                if mb != self.hash_mb {
                    self.hash_mb = mb;
                    config.tt_size_mb = mb;
                    return true;
                }
                false
            }
            "threads" => {
                // Accepted, clamped to 1: no effect, logged so a GUI request
                // for more threads doesn't vanish silently.
                if let Some(v) = value.and_then(|v| v.parse::<usize>().ok()) {
                    if v != 1 {
                        tracing::warn!(requested = v, "Threads > 1 requested but parallel search is unsupported");
                    }
                }
                false
            }
            _ => false,
        }
    }
}

/// Parses the `name <...> value <...>` portion of a `setoption` command.
#[must_use]
pub fn parse_setoption(parts: &[&str]) -> Option<(String, Option<String>)> {
    if parts.first().copied() != Some("setoption") {
        return None;
    }
    let mut name_parts = Vec::new();
    let mut value_parts = Vec::new();
    let mut mode = "";
    for &part in &parts[1..] {
        match part {
            "name" => mode = "name",
            "value" => mode = "value",
            _ => match mode {
                "name" => name_parts.push(part),
                "value" => value_parts.push(part),
                _ => {}
            },
        }
    }
    if name_parts.is_empty() {
        return None;
    }
    let name = name_parts.join(" ");
    let value = if value_parts.is_empty() { None } else { Some(value_parts.join(" ")) };
    Some((name, value))
}
