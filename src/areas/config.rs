//! Repository configuration
//!
//! A two-level record of `section -> subsection -> key -> value`, serialized
//! as INI-like text:
//!
//! ```text
//! [core]
//!     bare = false
//! [remote "origin"]
//!     url = ./src
//! ```
//!
//! The engine only consumes `core.bare` and `remote.<name>.url`, but the
//! parser keeps every key it reads so round-tripping never loses data.

use anyhow::Context;
use std::collections::BTreeMap;
use std::path::Path;

type Section = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// section name -> subsection name ("" when absent) -> key -> value
    sections: BTreeMap<String, Section>,
}

impl Config {
    pub fn with_bare(bare: bool) -> Self {
        let mut config = Config::default();
        config.set_bare(bare);
        config
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        Self::parse(&text)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        std::fs::write(path, self.render())
            .with_context(|| format!("unable to write config file {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let mut config = Config::default();
        let mut current: Option<(String, String)> = None;

        for (number, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                current = Some(Self::parse_section_header(header).with_context(|| {
                    format!("invalid config section header on line {}", number + 1)
                })?);
            } else {
                let (section, subsection) = current
                    .clone()
                    .with_context(|| format!("config key outside a section on line {}", number + 1))?;
                let (key, value) = line
                    .split_once('=')
                    .with_context(|| format!("invalid config line {}", number + 1))?;
                config
                    .entry(&section, &subsection)
                    .insert(key.trim().to_string(), value.trim().to_string());
            }
        }

        Ok(config)
    }

    fn parse_section_header(header: &str) -> anyhow::Result<(String, String)> {
        match header.split_once(' ') {
            None => Ok((header.trim().to_string(), String::new())),
            Some((section, subsection)) => {
                let subsection = subsection
                    .trim()
                    .strip_prefix('"')
                    .and_then(|s| s.strip_suffix('"'))
                    .context("subsection must be double-quoted")?;
                Ok((section.trim().to_string(), subsection.to_string()))
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for (section, subsections) in &self.sections {
            for (subsection, keys) in subsections {
                if keys.is_empty() {
                    continue;
                }
                if subsection.is_empty() {
                    out.push_str(&format!("[{}]\n", section));
                } else {
                    out.push_str(&format!("[{} \"{}\"]\n", section, subsection));
                }
                for (key, value) in keys {
                    out.push_str(&format!("    {} = {}\n", key, value));
                }
            }
        }
        out
    }

    fn entry(&mut self, section: &str, subsection: &str) -> &mut BTreeMap<String, String> {
        self.sections
            .entry(section.to_string())
            .or_default()
            .entry(subsection.to_string())
            .or_default()
    }

    fn get(&self, section: &str, subsection: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)?
            .get(subsection)?
            .get(key)
            .map(String::as_str)
    }

    pub fn is_bare(&self) -> bool {
        self.get("core", "", "bare") == Some("true")
    }

    pub fn set_bare(&mut self, bare: bool) {
        self.entry("core", "")
            .insert("bare".to_string(), bare.to_string());
    }

    pub fn remote_url(&self, name: &str) -> Option<&str> {
        self.get("remote", name, "url")
    }

    pub fn has_remote(&self, name: &str) -> bool {
        self.remote_url(name).is_some()
    }

    pub fn add_remote(&mut self, name: &str, url: &str) {
        self.entry("remote", name)
            .insert("url".to_string(), url.to_string());
    }
}
