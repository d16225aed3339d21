use super::fingerprint::UserAgentProfile;
use autoapply_common::StealthProfile;

/// Construct Chrome command-line arguments for a given stealth profile
/// and fingerprint.
pub fn build_stealth_arguments(
    profile: StealthProfile,
    user_profile: &UserAgentProfile,
    headless: bool,
) -> Vec<String> {
    let mut args = vec![
        "--disable-blink-features=AutomationControlled".to_string(),
        "--disable-infobars".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--no-sandbox".to_string(),
        format!("--user-agent={}", user_profile.user_agent),
        format!(
            "--window-size={},{}",
            user_profile.viewport.0, user_profile.viewport.1
        ),
        format!("--lang={}", user_profile.languages.join(",")),
    ];
    if profile != StealthProfile::Lightweight {
        args.push("--disable-extensions".to_string());
        args.push("--disable-plugins-discovery".to_string());
    }
    if headless {
        args.push("--headless=new".to_string());
    }
    if headless || profile == StealthProfile::Maximum {
        args.push("--disable-gpu".to_string());
    }
    args
}

/// JavaScript evasions applied after each navigation to reduce automation signals.
pub struct StealthScripts;

impl StealthScripts {
    pub fn core_evasions() -> &'static str {
        r#"
            Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
            Object.defineProperty(navigator, 'plugins', { get: () => [1,2,3] });
            Object.defineProperty(navigator, 'languages', {
                get: () => ['en-US', 'en']
            });
            if (!window.chrome) window.chrome = { runtime: {} };
        "#
    }

    pub fn webgl_evasions() -> &'static str {
        r#"
            const getParameter = WebGLRenderingContext.prototype.getParameter;
            WebGLRenderingContext.prototype.getParameter = function(parameter) {
                if (parameter === 37445) return 'Intel Inc.';
                if (parameter === 37446) return 'Intel Iris OpenGL Engine';
                return getParameter.call(this, parameter);
            };
        "#
    }

    pub fn canvas_evasions() -> &'static str {
        r#"
            const toDataURL = HTMLCanvasElement.prototype.toDataURL;
            HTMLCanvasElement.prototype.toDataURL = function(...args) {
                const ctx = this.getContext('2d');
                if (ctx && this.width && this.height) {
                    const img = ctx.getImageData(0, 0, this.width, this.height);
                    for (let i = 0; i < img.data.length; i += 4) {
                        if (Math.random() < 0.001) img.data[i] += Math.random() < 0.5 ? -1 : 1;
                    }
                    ctx.putImageData(img, 0, 0);
                }
                return toDataURL.apply(this, args);
            };
        "#
    }

    /// Scripts to run after navigation, in order, for `profile`.
    pub fn for_profile(profile: StealthProfile, user_profile: &UserAgentProfile) -> Vec<String> {
        let mut scripts = vec![Self::core_evasions().to_string()];
        match profile {
            StealthProfile::Lightweight => {}
            StealthProfile::Balanced => scripts.push(Self::canvas_evasions().to_string()),
            StealthProfile::Maximum => {
                scripts.push(Self::canvas_evasions().to_string());
                scripts.push(Self::webgl_evasions().to_string());
                scripts.push(format!(
                    "Object.defineProperty(navigator, 'platform', {{ get: () => '{}' }});",
                    user_profile.platform
                ));
            }
        }
        scripts
    }
}
