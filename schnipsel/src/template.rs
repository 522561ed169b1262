// SPDX-FileCopyrightText: 2025 Contributors to the Schnipsel project.
// SPDX-License-Identifier: Apache-2.0

//! Filename generation from strftime-style location templates.

use std::fmt::Write;
use std::path::PathBuf;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use tracing::warn;

use crate::{Result, WriteError};

/// Longest filename (in bytes) a template may expand to. Longer names are
/// truncated.
pub const MAX_FILENAME_LEN: usize = 249;

/// Expands `template` against `now` into a segment path.
///
/// Supports the strftime specifiers understood by `chrono` (`%Y`, `%m`, `%d`,
/// `%H`, `%M`, `%S`, ...). The result is cut to [`MAX_FILENAME_LEN`] bytes at a
/// character boundary instead of failing.
///
/// # Errors
///
/// Returns [`WriteError::InvalidTemplate`] if the template contains a
/// specifier chrono cannot parse, or expands to an empty name.
///
/// # Examples
///
/// ```
/// use chrono::{Local, TimeZone};
///
/// let now = Local.with_ymd_and_hms(2014, 8, 11, 9, 30, 0).earliest().unwrap();
/// let path = schnipsel::template::render("talk_%Y%m%d-%H%M.ts", &now).unwrap();
/// assert_eq!(path.to_str(), Some("talk_20140811-0930.ts"));
/// ```
pub fn render(template: &str, now: &DateTime<Local>) -> Result<PathBuf> {
    let items: Vec<Item<'_>> = StrftimeItems::new(template).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(invalid(template));
    }

    let mut name = String::with_capacity(template.len() + 16);
    write!(name, "{}", now.format_with_items(items.iter())).map_err(|_| invalid(template))?;

    if name.len() > MAX_FILENAME_LEN {
        let cut = (0..=MAX_FILENAME_LEN)
            .rev()
            .find(|&i| name.is_char_boundary(i))
            .unwrap_or(0);
        warn!(
            "Filename from template {:?} is {} bytes long, truncating to {}",
            template,
            name.len(),
            cut
        );
        name.truncate(cut);
    }

    if name.is_empty() {
        return Err(invalid(template));
    }

    Ok(PathBuf::from(name))
}

fn invalid(template: &str) -> WriteError {
    WriteError::InvalidTemplate {
        template: template.to_owned(),
    }
}
