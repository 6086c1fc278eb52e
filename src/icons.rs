// Status line prefixes

pub const GREEN_DOT: &str = "🟢";
pub const YELLOW_DOT: &str = "🟡";
pub const RED_DOT: &str = "🔴";
pub const IN_PROGRESS: &str = "⌛";
pub const WARNING: &str = "⚠️";
