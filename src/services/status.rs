//! Status board parser.
//!
//! Reads the page the structured way: tables whose rows pair a header
//! cell with a value cell, and classed panels with `header: value` lines.
//! Only elements that mention the watched street or heat point count.

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{
    HeatPoint, STATUS_RUNNING, STATUS_STOPPED, STATUS_UNKNOWN, StatusBoard, StatusField,
};
use crate::utils::text::{fold, normalize_whitespace};

const STOP_WORDS: [&str; 5] = ["oprit", "stop", "intrerupt", "suspendat", "avarie"];
const RUN_WORDS: [&str; 4] = ["functiune", "activ", "normal", "functioneaza"];

/// Parser for the status sensors.
pub struct StatusParser {
    street: String,
    heat_point: Option<String>,
    table_sel: Selector,
    row_sel: Selector,
    cell_sel: Selector,
    panel_sel: Selector,
}

impl StatusParser {
    /// Create a parser for the given street and heat point.
    pub fn new(street: &str, heat_point: HeatPoint) -> Result<Self> {
        Ok(Self {
            street: fold(street.trim()),
            heat_point: heat_point.search_term().map(fold),
            table_sel: parse_selector("table")?,
            row_sel: parse_selector("tr")?,
            cell_sel: parse_selector("td, th")?,
            panel_sel: parse_selector("div[class]")?,
        })
    }

    /// Parse a full page into a status board.
    ///
    /// Later matches overwrite earlier ones; fields never seen keep their
    /// defaults.
    pub fn parse(&self, html: &str) -> StatusBoard {
        let document = Html::parse_document(html);
        let mut board = StatusBoard::default();

        for table in document.select(&self.table_sel) {
            if !self.is_relevant(&table) {
                continue;
            }
            log::debug!("Status table matched watched location");
            for row in table.select(&self.row_sel) {
                let cells: Vec<String> = row
                    .select(&self.cell_sel)
                    .map(|cell| normalize_whitespace(&cell.text().collect::<String>()))
                    .collect();
                if cells.len() >= 2 {
                    apply(&mut board, &cells[0], &cells[1]);
                }
            }
        }

        for panel in document.select(&self.panel_sel) {
            if !self.is_relevant(&panel) {
                continue;
            }
            log::debug!("Status panel matched watched location");
            let text: String = panel.text().collect();
            for line in text.lines() {
                if let Some((header, value)) = line.trim().split_once(':') {
                    apply(&mut board, header.trim(), value.trim());
                }
            }
        }

        board
    }

    fn is_relevant(&self, element: &ElementRef) -> bool {
        let text = fold(&element.text().collect::<String>());
        (!self.street.is_empty() && text.contains(&self.street))
            || self
                .heat_point
                .as_deref()
                .is_some_and(|term| text.contains(term))
    }
}

/// Route a header/value pair to the field its header names.
fn apply(board: &mut StatusBoard, header: &str, value: &str) {
    let Some(field) = classify_header(header) else {
        return;
    };
    let value = value.trim().to_string();
    match field {
        StatusField::HotWater => board.hot_water_status = parse_status(&value),
        StatusField::Heating => board.heating_status = parse_status(&value),
        StatusField::Cause => board.cause = value,
        StatusField::Description => board.description = value,
        StatusField::EstimatedRepair => board.estimated_repair = value,
    }
}

/// Map a header cell to a field. Groups are checked in field order.
pub fn classify_header(header: &str) -> Option<StatusField> {
    let header = fold(header);

    if contains_any(&header, &["apa calda"]) {
        Some(StatusField::HotWater)
    } else if contains_any(&header, &["caldura", "incalzire"]) {
        Some(StatusField::Heating)
    } else if contains_any(&header, &["cauz", "motiv"]) {
        Some(StatusField::Cause)
    } else if contains_any(&header, &["descriere", "detalii", "explicatie"]) {
        Some(StatusField::Description)
    } else if contains_any(&header, &["data", "estimare", "programare", "reparatie"]) {
        Some(StatusField::EstimatedRepair)
    } else {
        None
    }
}

/// Reduce a status cell to running/stopped, or keep the raw text.
pub fn parse_status(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return STATUS_UNKNOWN.to_string();
    }
    let folded = fold(text);
    if contains_any(&folded, &STOP_WORDS) {
        STATUS_STOPPED.to_string()
    } else if contains_any(&folded, &RUN_WORDS) {
        STATUS_RUNNING.to_string()
    } else {
        text.to_string()
    }
}

fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NOT_AVAILABLE;

    const TABLE_PAGE: &str = r#"
<html><body>
<table>
  <tr><th>Adresă</th><td>Str. Lizeanu</td></tr>
  <tr><th>Apă caldă</th><td>Oprită - avarie</td></tr>
  <tr><th>Căldură</th><td>În funcțiune</td></tr>
  <tr><th>Cauză</th><td>Spargere conductă</td></tr>
  <tr><th>Descriere</th><td>Intervenție echipa CMTEB</td></tr>
  <tr><th>Dată estimare</th><td>14.01.2025 20:00</td></tr>
</table>
<table>
  <tr><th>Adresă</th><td>Bd. Unirii</td></tr>
  <tr><th>Apă caldă</th><td>Funcționează</td></tr>
</table>
</body></html>
"#;

    #[test]
    fn test_parse_table() {
        let parser = StatusParser::new("Str. Lizeanu", HeatPoint::Toate).unwrap();
        let board = parser.parse(TABLE_PAGE);

        assert_eq!(board.hot_water_status, STATUS_STOPPED);
        assert_eq!(board.heating_status, STATUS_RUNNING);
        assert_eq!(board.cause, "Spargere conductă");
        assert_eq!(board.description, "Intervenție echipa CMTEB");
        assert_eq!(board.estimated_repair, "14.01.2025 20:00");
    }

    #[test]
    fn test_parse_panel_lines() {
        let page = r#"<div class="anunt">Punct termic Nord
Apa calda: suspendata temporar
Motiv: lucrari planificate
</div>"#;
        let parser = StatusParser::new("Str. Inexistenta", HeatPoint::Nord).unwrap();
        let board = parser.parse(page);

        assert_eq!(board.hot_water_status, STATUS_STOPPED);
        assert_eq!(board.cause, "lucrari planificate");
        assert_eq!(board.heating_status, STATUS_UNKNOWN);
        assert_eq!(board.description, NOT_AVAILABLE);
    }

    #[test]
    fn test_unrelated_page_keeps_defaults() {
        let parser = StatusParser::new("Calea Victoriei", HeatPoint::Toate).unwrap();
        assert_eq!(parser.parse(TABLE_PAGE), StatusBoard::default());
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status(""), STATUS_UNKNOWN);
        assert_eq!(parse_status("Întrerupt"), STATUS_STOPPED);
        assert_eq!(parse_status("funcţiune normală"), STATUS_RUNNING);
        assert_eq!(parse_status("Program redus"), "Program redus");
    }

    #[test]
    fn test_classify_header() {
        assert_eq!(classify_header("Apa calda"), Some(StatusField::HotWater));
        assert_eq!(classify_header("Încălzire"), Some(StatusField::Heating));
        assert_eq!(classify_header("Detalii"), Some(StatusField::Description));
        assert_eq!(classify_header("Programare reparație"), Some(StatusField::EstimatedRepair));
        assert_eq!(classify_header("Stradă"), None);
    }

    #[test]
    fn test_parse_selector_invalid() {
        assert!(parse_selector("[[invalid").is_err());
    }
}
