//! Coarse user-agent classification for the login audit trail.
//!
//! This is deliberately a substring check over the handful of families the
//! reports care about, not a full UA parser. Unknown agents classify as
//! "Unknown"/"Desktop".

/// Browser, OS and device family derived from a User-Agent header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAgent {
    pub browser: String,
    pub os: String,
    pub device: String,
}

#[must_use]
pub fn classify(user_agent: &str) -> ClientAgent {
    ClientAgent {
        browser: browser_family(user_agent).to_string(),
        os: os_family(user_agent).to_string(),
        device: device_family(user_agent).to_string(),
    }
}

fn browser_family(ua: &str) -> &'static str {
    // Order matters: Edge and Opera UAs also contain "Chrome", and Chrome
    // UAs contain "Safari".
    if ua.contains("Edg/") || ua.contains("Edge/") {
        "Edge"
    } else if ua.contains("OPR/") || ua.contains("Opera") {
        "Opera"
    } else if ua.contains("Firefox/") {
        "Firefox"
    } else if ua.contains("Chrome/") || ua.contains("CriOS/") {
        "Chrome"
    } else if ua.contains("Safari/") {
        "Safari"
    } else {
        "Unknown"
    }
}

fn os_family(ua: &str) -> &'static str {
    if ua.contains("Windows") {
        "Windows"
    } else if ua.contains("Android") {
        "Android"
    } else if ua.contains("iPhone") || ua.contains("iPad") || ua.contains("iOS") {
        "iOS"
    } else if ua.contains("Mac OS X") || ua.contains("Macintosh") {
        "macOS"
    } else if ua.contains("Linux") {
        "Linux"
    } else {
        "Unknown"
    }
}

fn device_family(ua: &str) -> &'static str {
    if ua.contains("iPad") || ua.contains("Tablet") {
        "Tablet"
    } else if ua.contains("Mobile") || ua.contains("iPhone") || ua.contains("Android") {
        "Mobile"
    } else {
        "Desktop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
        AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";
    const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_5 like Mac OS X) \
        AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Mobile/15E148 Safari/604.1";
    const FIREFOX_LINUX: &str =
        "Mozilla/5.0 (X11; Linux x86_64; rv:127.0) Gecko/20100101 Firefox/127.0";
    const EDGE_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
        AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36 Edg/126.0.0.0";

    #[test]
    fn classifies_common_agents() {
        let chrome = classify(CHROME_WINDOWS);
        assert_eq!(chrome.browser, "Chrome");
        assert_eq!(chrome.os, "Windows");
        assert_eq!(chrome.device, "Desktop");

        let iphone = classify(SAFARI_IPHONE);
        assert_eq!(iphone.browser, "Safari");
        assert_eq!(iphone.os, "iOS");
        assert_eq!(iphone.device, "Mobile");

        let firefox = classify(FIREFOX_LINUX);
        assert_eq!(firefox.browser, "Firefox");
        assert_eq!(firefox.os, "Linux");

        // Edge must win over the embedded Chrome token.
        assert_eq!(classify(EDGE_WINDOWS).browser, "Edge");
    }

    #[test]
    fn empty_agent_is_unknown_desktop() {
        let agent = classify("");
        assert_eq!(agent.browser, "Unknown");
        assert_eq!(agent.os, "Unknown");
        assert_eq!(agent.device, "Desktop");
    }
}
