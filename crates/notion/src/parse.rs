//! Extraction of OLT and ONT address from Notion page properties.
//!
//! The inventory database is hand-maintained, so property types drift: OLT
//! is usually a select but sometimes plain text, and the ONT address column
//! is named `""` in the API response (the UI shows `</>`).

use std::collections::HashMap;

use serde::Deserialize;

use sync_core::{Error, OntLocation, Port, Result};

#[derive(Debug, Default, Deserialize)]
pub struct Property {
    #[serde(default)]
    pub title: Vec<TextFragment>,
    #[serde(default)]
    pub rich_text: Vec<TextFragment>,
    #[serde(default)]
    pub select: Option<SelectValue>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TextFragment {
    #[serde(default)]
    pub plain_text: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SelectValue {
    #[serde(default)]
    pub name: String,
}

impl Property {
    /// First non-empty text value, preferring select over rich text over
    /// title.
    fn text(&self) -> Option<&str> {
        if let Some(select) = &self.select {
            if !select.name.is_empty() {
                return Some(&select.name);
            }
        }
        if let Some(fragment) = self.rich_text.first() {
            if !fragment.plain_text.is_empty() {
                return Some(&fragment.plain_text);
            }
        }
        if let Some(fragment) = self.title.first() {
            if !fragment.plain_text.is_empty() {
                return Some(&fragment.plain_text);
            }
        }
        None
    }
}

/// Pulls the OLT host and ONT address out of a matched page's properties.
pub fn extract_location(properties: &HashMap<String, Property>) -> Result<OntLocation> {
    let olt = properties
        .get("OLT")
        .ok_or_else(|| Error::lookup(Port::NetworkInfo, "OLT property missing"))?
        .text()
        .ok_or_else(|| Error::lookup(Port::NetworkInfo, "OLT property empty"))?;

    let ont_prop = properties
        .get("")
        .or_else(|| properties.get("</>"))
        .ok_or_else(|| Error::lookup(Port::NetworkInfo, "ONT address property missing"))?;
    let ont = ont_prop
        .text()
        .ok_or_else(|| Error::lookup(Port::NetworkInfo, "ONT address property empty"))?;

    Ok(OntLocation {
        olt_host: olt.to_string(),
        ont_address: ont.to_string(),
    })
}
