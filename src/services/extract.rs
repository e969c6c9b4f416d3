// src/services/extract.rs

//! Outage extraction from raw status-page markup.
//!
//! The page is prose in loosely nested markup, so no selector path is
//! stable. Instead the raw HTML is cut at every block-level tag boundary,
//! each piece is checked for the watched street and an interruption
//! keyword, and the surviving pieces are matched field by field. A pattern
//! that misses yields [`UNSPECIFIED`] rather than an error.

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::error::Result;
use crate::models::{Outage, ServiceType, UNSPECIFIED};
use crate::utils::text::{clean_text, fold};

/// Words that mark a block as an interruption notice (matched folded).
const INTERRUPTION_KEYWORDS: [&str; 8] = [
    "întrerupere",
    "avarie",
    "defect",
    "repara",
    "intervenție",
    "apă caldă",
    "căldură",
    "serviciu termic",
];

/// Result of one extraction pass.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub outages: Vec<Outage>,
    pub total_found: usize,
}

/// Compiled field patterns for one street.
#[derive(Debug, Clone)]
pub struct OutageExtractor {
    street: String,
    street_folded: String,
    keywords: Vec<String>,
    block_split: Regex,
    cause_patterns: Vec<Regex>,
    date_pattern: Regex,
    time_pattern: Regex,
}

impl OutageExtractor {
    /// Compile the patterns for the given street.
    pub fn new(street: &str) -> Result<Self> {
        Ok(Self {
            street: street.trim().to_string(),
            street_folded: fold(street.trim()),
            keywords: INTERRUPTION_KEYWORDS.iter().map(|k| fold(k)).collect(),
            block_split: Regex::new(r"(?i)</?(?:div|tr|p|li)")?,
            cause_patterns: vec![
                // unaccented spellings must stand alone, or "cauzat" would match
                Regex::new(r"(?i)(?:cauză|\bcauza\b|motiv)[:\s]*([^.\n]+)")?,
                Regex::new(r"(?i)(?:datorită|\bdatorita\b)\s*([^.\n]+)")?,
            ],
            date_pattern: Regex::new(r"(\d{1,2}[./]\d{1,2}[./]\d{4})")?,
            time_pattern: Regex::new(r"(\d{1,2}:\d{2})")?,
        })
    }

    /// Split raw markup into candidate blocks.
    pub fn blocks<'a>(&self, html: &'a str) -> impl Iterator<Item = &'a str> {
        self.block_split.split(html)
    }

    /// Whether a block names the street and reads like an interruption.
    pub fn is_candidate(&self, block: &str) -> bool {
        if self.street_folded.is_empty() {
            return false;
        }
        let folded = fold(block);
        folded.contains(&self.street_folded)
            && self.keywords.iter().any(|k| folded.contains(k.as_str()))
    }

    /// Run every pattern over the page.
    pub fn extract(&self, html: &str, detected_at: DateTime<Utc>) -> Extraction {
        let outages: Vec<Outage> = self
            .blocks(html)
            .filter(|block| self.is_candidate(block))
            .map(|block| self.outage_from_block(block, detected_at))
            .collect();

        log::debug!(
            "Extracted {} outage block(s) for '{}'",
            outages.len(),
            self.street
        );

        Extraction {
            total_found: outages.len(),
            outages,
        }
    }

    fn outage_from_block(&self, block: &str, detected_at: DateTime<Utc>) -> Outage {
        Outage {
            street: self.street.clone(),
            service: service_type(block),
            cause: self.cause(block),
            estimated_date: self.estimated_date(block),
            estimated_time: self.estimated_time(block),
            detected_at,
        }
    }

    /// Cause: labelled cause first, then a "due to" clause.
    pub fn cause(&self, text: &str) -> String {
        self.cause_patterns
            .iter()
            .filter_map(|pattern| pattern.captures(text))
            .filter_map(|caps| caps.get(1))
            .map(|m| clean_text(m.as_str()))
            .find(|cause| !cause.is_empty())
            .unwrap_or_else(|| UNSPECIFIED.to_string())
    }

    /// Estimated restoration date.
    pub fn estimated_date(&self, text: &str) -> String {
        first_capture(&self.date_pattern, text)
    }

    /// Estimated restoration time.
    pub fn estimated_time(&self, text: &str) -> String {
        first_capture(&self.time_pattern, text)
    }
}

/// Service type. Hot water wins over heating when both are mentioned.
pub fn service_type(text: &str) -> ServiceType {
    let folded = fold(text);
    if folded.contains("apa calda") {
        ServiceType::HotWater
    } else if folded.contains("caldura") || folded.contains("incalzire") {
        ServiceType::Heating
    } else {
        ServiceType::Unspecified
    }
}

fn first_capture(pattern: &Regex, text: &str) -> String {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNSPECIFIED.to_string())
}
