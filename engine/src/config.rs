use serde::Deserialize;
use serde::Serialize;

/// Largest nearby radius accepted by [`SearchConfig::validate`]. Each unit of
/// radius adds two concurrent requests to the fallback fan-out.
pub const MAX_NEARBY_RADIUS: u32 = 10;

/// Tunables for the search engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Row cap for exact-address and parameter searches
    #[serde(default = "default_exact_limit")]
    pub exact_limit: usize,

    /// Row cap for each nearby candidate query
    #[serde(default = "default_nearby_limit")]
    pub nearby_limit: usize,

    /// House numbers tried on each side of the original
    #[serde(default = "default_nearby_radius")]
    pub nearby_radius: u32,

    /// Longest value that can still be used as a pivot key
    #[serde(default = "default_max_pivot_value_len")]
    pub max_pivot_value_len: usize,
}

fn default_exact_limit() -> usize {
    500
}

fn default_nearby_limit() -> usize {
    50
}

fn default_nearby_radius() -> u32 {
    2
}

fn default_max_pivot_value_len() -> usize {
    75
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            exact_limit: default_exact_limit(),
            nearby_limit: default_nearby_limit(),
            nearby_radius: default_nearby_radius(),
            max_pivot_value_len: default_max_pivot_value_len(),
        }
    }
}

impl SearchConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.exact_limit == 0 {
            return Err("exact_limit must be > 0".to_string());
        }

        if self.nearby_limit == 0 {
            return Err("nearby_limit must be > 0".to_string());
        }

        if self.nearby_radius == 0 || self.nearby_radius > MAX_NEARBY_RADIUS {
            return Err(format!(
                "nearby_radius must be in [1, {MAX_NEARBY_RADIUS}], got {}",
                self.nearby_radius
            ));
        }

        if self.max_pivot_value_len == 0 {
            return Err("max_pivot_value_len must be > 0".to_string());
        }

        Ok(())
    }

    /// Config that scans twice as many neighbouring house numbers
    pub fn wide() -> Self {
        Self {
            nearby_radius: 4,
            ..Default::default()
        }
    }
}
