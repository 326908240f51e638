//! Browser identities rotated across render sessions.

use rand::{Rng, rng};

/// Realistic desktop and mobile user agents.
pub const USER_AGENTS: [&str; 5] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:124.0) Gecko/20100101 Firefox/124.0",
];

/// Viewport sizes, from desktop to phone.
pub const VIEWPORTS: [Viewport; 4] = [
    Viewport { width: 1280, height: 800 },
    Viewport { width: 1920, height: 1080 },
    Viewport { width: 375, height: 667 },
    Viewport { width: 1440, height: 900 },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn is_mobile(&self) -> bool {
        self.width < 768
    }
}

/// The identity a single render session presents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderProfile {
    pub user_agent: &'static str,
    pub viewport: Viewport,
}

impl RenderProfile {
    /// Pick a user agent and a viewport independently at random.
    pub fn random() -> Self {
        let mut r = rng();
        Self {
            user_agent: USER_AGENTS[r.random_range(0..USER_AGENTS.len())],
            viewport: VIEWPORTS[r.random_range(0..VIEWPORTS.len())],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_random_profile_comes_from_pools() {
        for _ in 0..50 {
            let profile = RenderProfile::random();
            assert!(USER_AGENTS.contains(&profile.user_agent));
            assert!(VIEWPORTS.contains(&profile.viewport));
        }
    }

    #[test]
    fn test_profiles_rotate() {
        let agents: HashSet<_> = (0..200).map(|_| RenderProfile::random().user_agent).collect();
        assert!(agents.len() > 1);
    }

    #[test]
    fn test_mobile_viewport() {
        assert!(VIEWPORTS[2].is_mobile());
        assert!(!VIEWPORTS[1].is_mobile());
    }
}
