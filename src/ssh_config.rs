use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

pub(crate) fn parse_hosts(text: &str) -> Vec<String> {
    let mut hosts: Vec<String> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (keyword, rest) = match line.find(|ch: char| ch.is_whitespace() || ch == '=') {
            Some(idx) => (&line[..idx], &line[idx..]),
            None => continue,
        };
        if !keyword.eq_ignore_ascii_case("host") {
            continue;
        }
        let rest = rest.trim_start().trim_start_matches('=');
        let rest = rest.split('#').next().unwrap_or_default();
        for alias in rest.split_whitespace() {
            let alias = alias.trim_matches('"');
            if alias.is_empty() || alias.contains(['*', '?', '!']) {
                continue;
            }
            if !hosts.iter().any(|known| known == alias) {
                hosts.push(alias.to_string());
            }
        }
    }
    hosts
}

pub(crate) fn load_hosts_from(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path).context("read ssh config")?;
    Ok(parse_hosts(&content))
}

pub(crate) fn load_hosts() -> Result<Vec<String>> {
    let Some(mut path) = dirs::home_dir() else {
        return Ok(Vec::new());
    };
    path.push(".ssh");
    path.push("config");
    load_hosts_from(&path)
}
