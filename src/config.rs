use std::collections::HashMap;
use std::fs;

#[derive(Debug)]
pub struct Config {
    pub globals: HashMap<String, String>,
    pub sections: HashMap<String, HashMap<String, String>>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self, String> {
        let content =
            fs::read_to_string(path).map_err(|e| format!("Error reading file {path}: {e}"))?;
        Ok(Self::parse(&content))
    }

    /// Parses INI text: `[section]` headers, `key = value` pairs, `#` comments.
    /// Keys before the first section are globals.
    pub fn parse(content: &str) -> Self {
        let mut globals = HashMap::new();
        let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut current_section: Option<String> = None;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                let name = &line[1..line.len() - 1];
                current_section = Some(name.to_string());
                continue;
            }

            if let Some(pos) = line.find('=') {
                let key = line[..pos].trim().to_string();
                let value = line[pos + 1..].trim().trim_matches('"').to_string();

                match &current_section {
                    None => {
                        globals.insert(key, value);
                    }
                    Some(sec) => {
                        sections.entry(sec.clone()).or_default().insert(key, value);
                    }
                }
            }
        }
        Config { globals, sections }
    }

    pub fn empty() -> Self {
        Self {
            globals: HashMap::new(),
            sections: HashMap::new(),
        }
    }

    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|sec| sec.get(key))
            .map(|s| s.as_str())
    }

    #[must_use]
    pub fn get_non_empty(&self, section: &str, key: &str) -> Option<&str> {
        self.get(section, key).filter(|s| !s.is_empty())
    }

    /// Section names in sorted order.
    #[must_use]
    pub fn section_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sections.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn get_global(&self, key: &str) -> Option<&str> {
        self.globals.get(key).map(|s| s.as_str())
    }

    /// Non-empty value from `section`, else the non-empty global of the
    /// same name.
    #[must_use]
    pub fn lookup(&self, section: &str, key: &str) -> Option<&str> {
        self.get_non_empty(section, key)
            .or_else(|| self.get_global(key).filter(|s| !s.is_empty()))
    }

    #[must_use]
    pub fn get_non_empty_or_default<'a>(
        &'a self,
        section: &str,
        key: &str,
        default: &'a str,
    ) -> &'a str {
        self.lookup(section, key).unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    const SAMPLE: &str = r#"
# defaults for every stream
rtp_suite = aes_cm_128_hmac_sha1_80

[stream.b]
ssrc = 0x1234
key = "00ff"

[stream.a]
rtp_suite =
"#;

    #[test]
    fn parses_globals_and_sections() {
        let c = Config::parse(SAMPLE);
        assert_eq!(c.get_global("rtp_suite"), Some("aes_cm_128_hmac_sha1_80"));
        assert_eq!(c.get("stream.b", "key"), Some("00ff"));
        assert_eq!(c.get("stream.a", "ssrc"), None);
        assert_eq!(c.section_names(), vec!["stream.a", "stream.b"]);
    }

    #[test]
    fn empty_values_fall_back_to_globals() {
        let c = Config::parse(SAMPLE);
        assert_eq!(c.get("stream.a", "rtp_suite"), Some(""));
        assert_eq!(
            c.get_non_empty_or_default("stream.a", "rtp_suite", "x"),
            "aes_cm_128_hmac_sha1_80"
        );
        assert_eq!(c.lookup("stream.b", "window_size"), None);
        assert_eq!(c.lookup("stream.b", "ssrc"), Some("0x1234"));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Config::load("/nonexistent/srtp.ini").is_err());
    }
}
