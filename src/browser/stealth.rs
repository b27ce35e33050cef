use rand::seq::SliceRandom;

const DESKTOP_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36",
];

/// Picks a desktop Chrome user agent so headless sessions don't announce
/// themselves as `HeadlessChrome`.
#[derive(Debug, Clone, Default)]
pub struct UserAgentGenerator;

impl UserAgentGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn random_user_agent(&self) -> &'static str {
        DESKTOP_USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(DESKTOP_USER_AGENTS[0])
    }

    pub fn accept_language(&self) -> &'static str {
        "en-US,en;q=0.9"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_generation() {
        let generator = UserAgentGenerator::new();

        for _ in 0..20 {
            let user_agent = generator.random_user_agent();
            assert!(user_agent.starts_with("Mozilla/5.0"));
            assert!(!user_agent.contains("Headless"));
            assert!(DESKTOP_USER_AGENTS.contains(&user_agent));
        }
    }
}
