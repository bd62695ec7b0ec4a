// SPDX-License-Identifier: GPL-3.0-only
use regex::Regex;
use serde::Serialize;
use url::Url;

use crate::links::WorkshopId;

/// Result of one non-blank input line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedLine {
    /// 1-based line number in the pasted text
    pub line: usize,

    /// The line as typed, trimmed
    pub input: String,

    /// Extracted ID, `None` when the line is not a workshop link
    pub id: Option<WorkshopId>,
}

/// Turns pasted links or bare IDs into workshop IDs
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    id_param: Regex,
    bare_id: Regex,
}

impl LinkExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            id_param: Regex::new(r"[?&]id=(\d+)(?:[&#\s]|$)")?,
            bare_id: Regex::new(r"\b\d{8,10}\b")?,
        })
    }

    /// Extract one result per non-blank line, in input order
    pub fn extract_all(&self, text: &str) -> Vec<ExtractedLine> {
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                let input = line.trim().to_string();
                let id = self.extract(&input);
                ExtractedLine { line: index + 1, input, id }
            })
            .collect()
    }

    /// Extract the workshop ID from a single line
    pub fn extract(&self, line: &str) -> Option<WorkshopId> {
        let line = line.trim();

        // A well-formed URL: trust its query string
        if let Ok(parsed_url) = Url::parse(line) {
            if let Some((_, value)) = parsed_url.query_pairs().find(|(key, _)| key == "id") {
                if let Some(id) = WorkshopId::parse(&value) {
                    return Some(id);
                }
            }
        }

        // URL-shaped text the parser rejects, e.g. without a scheme
        if let Some(caps) = self.id_param.captures(line) {
            if let Some(id) = caps.get(1).and_then(|m| WorkshopId::parse(m.as_str())) {
                return Some(id);
            }
        }

        self.bare_id
            .find(line)
            .and_then(|m| WorkshopId::parse(m.as_str()))
    }
}
