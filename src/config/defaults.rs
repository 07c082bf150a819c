use std::path::PathBuf;

pub const CONFIG_VERSION: u32 = 1;

pub fn default_version() -> u32 {
    CONFIG_VERSION
}

pub fn default_output() -> PathBuf {
    PathBuf::from("customer_support_analysis.csv")
}

pub fn default_batch_size() -> usize {
    10
}

pub fn default_delimiter() -> String {
    "-----".to_string()
}

pub fn default_batch_delay_ms() -> u64 {
    1000
}

pub fn default_timeout_sec() -> u64 {
    300
}

pub fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

pub fn default_gemini_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

pub fn default_gemini_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

pub fn default_claude_binary() -> PathBuf {
    // Check common install location first
    if let Some(home) = std::env::var_os("HOME") {
        let local_path = PathBuf::from(home).join(".claude/local/claude");
        if local_path.exists() {
            return local_path;
        }
    }
    PathBuf::from("claude")
}

pub fn default_claude_model() -> String {
    "sonnet".to_string()
}

pub fn default_max_attempts() -> u32 {
    3
}

pub fn default_backoff_base_ms() -> u64 {
    1000
}

pub fn default_true() -> bool {
    true
}
