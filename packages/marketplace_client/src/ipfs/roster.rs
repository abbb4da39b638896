//! CSV roster parsing for batch mints.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::UploadError;

pub const MAX_TRAITS: usize = 3;

/// One valid data row of a roster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow {
    pub name: String,
    pub image_file: String,
    pub description: Option<String>,
    /// `trait_type_i` / `trait_value_i` pairs where both are present
    pub traits: Vec<(String, String)>,
}

fn clean(cell: &str) -> String {
    cell.replace(['\r', '"'], "").trim().to_string()
}

/// Parse a roster.
///
/// The delimiter is `;` when the header line contains one, else `,`. Rows
/// missing `name` or `image_file` are skipped; at least one row must remain.
pub fn parse_roster(text: &str) -> Result<Vec<RosterRow>, UploadError> {
    let lines: Vec<&str> = text.split('\n').filter(|line| !line.trim().is_empty()).collect();
    if lines.len() < 2 {
        return Err(UploadError::InvalidRoster(
            "a header line and at least one data row are required".to_string(),
        ));
    }

    let delimiter = if lines[0].contains(';') { ';' } else { ',' };
    let headers: Vec<String> = lines[0]
        .split(delimiter)
        .map(clean)
        .filter(|header| !header.is_empty())
        .collect();
    debug!(?headers, %delimiter, "roster headers");

    if !headers.iter().any(|h| h == "name") || !headers.iter().any(|h| h == "image_file") {
        return Err(UploadError::InvalidRoster(format!(
            "missing required columns; found: {}; required: name, image_file",
            headers.join(", ")
        )));
    }

    let mut rows = Vec::new();
    for (index, line) in lines.iter().enumerate().skip(1) {
        let values: Vec<String> = line.trim().split(delimiter).map(clean).collect();
        let record: HashMap<&str, &str> = headers
            .iter()
            .enumerate()
            .map(|(i, header)| (header.as_str(), values.get(i).map(String::as_str).unwrap_or("")))
            .collect();
        let field = |key: &str| {
            record
                .get(key)
                .filter(|value| !value.is_empty())
                .map(|value| value.to_string())
        };

        let (Some(name), Some(image_file)) = (field("name"), field("image_file")) else {
            warn!(row = index + 1, "skipping roster row without name or image_file");
            continue;
        };
        let traits = (1..=MAX_TRAITS)
            .filter_map(|i| {
                Some((
                    field(&format!("trait_type_{i}"))?,
                    field(&format!("trait_value_{i}"))?,
                ))
            })
            .collect();

        rows.push(RosterRow {
            name,
            image_file,
            description: field("description"),
            traits,
        });
    }

    if rows.is_empty() {
        return Err(UploadError::InvalidRoster(
            "no valid rows; every row needs name and image_file".to_string(),
        ));
    }
    debug!(rows = rows.len(), "roster parsed");
    Ok(rows)
}

/// URL uploaded for `wanted`: exact file name first, then case-insensitive
pub fn match_image<'a>(wanted: &str, uploaded: &'a [(String, String)]) -> Result<&'a str, UploadError> {
    let wanted = wanted.trim();
    let exact = uploaded.iter().rev().find(|(file, _)| file == wanted);
    let found = exact.or_else(|| {
        let lower = wanted.to_lowercase();
        uploaded
            .iter()
            .rev()
            .find(|(file, _)| file.to_lowercase() == lower)
    });

    match found {
        Some((file, url)) => {
            if file != wanted {
                debug!(wanted, matched = %file, "case-insensitive image match");
            }
            Ok(url.as_str())
        }
        None => Err(UploadError::ImageNotFound {
            wanted: wanted.to_string(),
            available: uploaded
                .iter()
                .map(|(file, _)| file.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}
