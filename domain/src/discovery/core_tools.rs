//! Tools offered on every turn, whatever discovery returns.

/// Default core tool set
pub const CORE_TOOLS: [&str; 5] = [
    "time.current_datetime",
    "state.set",
    "state.get",
    "state.list_keys",
    "human.ask",
];

/// The default core tool set as owned names (config default)
pub fn core_tool_names() -> Vec<String> {
    CORE_TOOLS.iter().map(|s| s.to_string()).collect()
}
