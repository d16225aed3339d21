use autoapply_common::StealthProfile;
use rand::Rng;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Snapshot of user agent, viewport, and locale characteristics.
pub struct UserAgentProfile {
    pub user_agent: String,
    pub viewport: (u32, u32),
    pub platform: String,
    pub languages: Vec<String>,
}

/// Plausible desktop Chrome profiles; one is picked per browser session.
pub fn desktop_profiles() -> Vec<UserAgentProfile> {
    vec![
        UserAgentProfile {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36".to_string(),
            viewport: (1920, 1080),
            platform: "Win32".to_string(),
            languages: vec!["en-US".to_string(), "en".to_string()],
        },
        UserAgentProfile {
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36".to_string(),
            viewport: (1440, 900),
            platform: "MacIntel".to_string(),
            languages: vec!["en-US".to_string(), "en".to_string()],
        },
        UserAgentProfile {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36".to_string(),
            viewport: (1600, 900),
            platform: "Linux x86_64".to_string(),
            languages: vec!["en-US".to_string(), "en".to_string()],
        },
    ]
}

/// Pick the session's fingerprint. `Lightweight` always uses the first
/// profile; other levels pick at random.
pub fn pick_session_profile(stealth: StealthProfile) -> UserAgentProfile {
    let mut pool = desktop_profiles();
    let idx = match stealth {
        StealthProfile::Lightweight => 0,
        _ => rand::thread_rng().gen_range(0..pool.len()),
    };
    pool.swap_remove(idx)
}
