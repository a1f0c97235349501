pub struct Config {
    pub api_base_url: &'static str,
    pub results_refresh_ms: u32,
    pub countdown_tick_ms: u32,
    pub countdown_choices: &'static [i32],
    pub voted_poll_key: &'static str,
    pub voted_option_key: &'static str,
}

impl Config {
    pub const fn new() -> Self {
        Self {
            api_base_url: "/api",
            results_refresh_ms: 2_000,
            countdown_tick_ms: 1_000,
            countdown_choices: &[3, 5, 10, 30],
            voted_poll_key: "votedPollId",
            voted_option_key: "votedOptionId",
        }
    }
}

pub const CONFIG: Config = Config::new();
