//! Tabular Projection
//!
//! Turns a [`Resolution`] into rows and columns for display.

use regex::Regex;
use std::borrow::Cow;

use crate::resolver::{Resolution, RESERVED_FIELDS};
use crate::utils::truncate::{display_width, truncate_middle};

const VALUE_SEPARATOR: &str = "; ";

lazy_static::lazy_static! {
    /// Knowledge-base time literal, e.g. `+2019-06-01T00:00:00Z`.
    static ref TIME_LITERAL: Option<Regex> =
        Regex::new(r"^[-+]([0-9]{4}-[0-9]{2}-[0-9]{2})T.+$").ok();
}

/// Reduce a time literal to its calendar date. Other values pass through.
pub fn clean_date(value: &str) -> Cow<'_, str> {
    match TIME_LITERAL.as_ref() {
        Some(re) => re.replace(value, "$1"),
        None => Cow::Borrowed(value),
    }
}

#[derive(Debug, Clone)]
pub struct TableOptions {
    /// Rewrite time literals as plain dates
    pub clean_dates: bool,
    /// Widest cell in rendered output, in characters
    pub max_cell_width: usize,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            clean_dates: true,
            max_cell_width: 40,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// One row per entity. Attribute columns appear in first-seen order;
    /// entities without an attribute get an empty cell.
    pub fn from_resolution(resolution: &Resolution, options: &TableOptions) -> Self {
        let mut columns: Vec<String> = RESERVED_FIELDS.iter().map(|c| c.to_string()).collect();
        for row in resolution.rows() {
            for (name, _) in &row.attributes {
                if !columns.contains(name) {
                    columns.push(name.clone());
                }
            }
        }

        let rows = resolution
            .rows()
            .iter()
            .map(|row| {
                let mut cells = vec![
                    row.entity_id.clone(),
                    row.label.clone(),
                    row.description.clone(),
                    row.aliases.iter().cloned().collect::<Vec<_>>().join(VALUE_SEPARATOR),
                ];
                for name in &columns[RESERVED_FIELDS.len()..] {
                    let cell = row
                        .attribute(name)
                        .map(|values| {
                            values
                                .iter()
                                .map(|v| {
                                    if options.clean_dates {
                                        clean_date(v).into_owned()
                                    } else {
                                        v.clone()
                                    }
                                })
                                .collect::<Vec<_>>()
                                .join(VALUE_SEPARATOR)
                        })
                        .unwrap_or_default();
                    cells.push(cell);
                }
                cells
            })
            .collect();

        Self { columns, rows }
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column(column)?;
        self.rows.get(row).and_then(|r| r.get(idx)).map(String::as_str)
    }

    /// Plain-text rendering with aligned columns.
    pub fn render(&self, max_cell_width: usize) -> String {
        let fit = |s: &str| truncate_middle(s, max_cell_width);
        let header: Vec<String> = self.columns.iter().map(|c| fit(c.as_str())).collect();
        let body: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|r| r.iter().map(|c| fit(c.as_str())).collect())
            .collect();

        let widths: Vec<usize> = (0..header.len())
            .map(|i| {
                body.iter()
                    .map(|r| display_width(&r[i]))
                    .chain(std::iter::once(display_width(&header[i])))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let line = |cells: &[String]| {
            cells
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{}{}", c, " ".repeat(w - display_width(c))))
                .collect::<Vec<_>>()
                .join(" │ ")
                .trim_end()
                .to_string()
        };

        let mut out = line(&header[..]);
        out.push('\n');
        out.push_str(
            &widths
                .iter()
                .map(|w| "─".repeat(*w))
                .collect::<Vec<_>>()
                .join("─┼─"),
        );
        for row in &body {
            out.push('\n');
            out.push_str(&line(&row[..]));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ResultRow;
    use std::collections::BTreeSet;

    fn resolution() -> Resolution {
        let rows = vec![
            ResultRow {
                entity_id: "Q1".into(),
                label: "Streamlit".into(),
                description: "Python framework".into(),
                aliases: BTreeSet::from(["streamlit.io".to_string()]),
                attributes: vec![
                    ("inception".into(), vec!["+2018-01-01T00:00:00Z".into()]),
                    ("developer".into(), vec!["Snowflake".into(), "Streamlit Inc.".into()]),
                ],
            },
            ResultRow {
                entity_id: "Q2".into(),
                label: "Streamlit Inc.".into(),
                description: String::new(),
                aliases: BTreeSet::new(),
                attributes: vec![("country".into(), vec!["United States".into()])],
            },
        ];
        let mut resolution = Resolution::default();
        for row in rows {
            resolution.push(row);
        }
        resolution
    }

    #[test]
    fn test_clean_date() {
        assert_eq!(clean_date("+2018-01-01T00:00:00Z"), "2018-01-01");
        assert_eq!(clean_date("-0500-00-00T00:00:00Z"), "0500-00-00");
        assert_eq!(clean_date("https://streamlit.io"), "https://streamlit.io");
    }

    #[test]
    fn test_columns_in_first_seen_order() {
        let table = Table::from_resolution(&resolution(), &TableOptions::default());
        assert_eq!(
            table.columns,
            vec!["id", "label", "description", "aliases", "inception", "developer", "country"]
        );
        assert_eq!(table.cell(0, "inception"), Some("2018-01-01"));
        assert_eq!(table.cell(0, "developer"), Some("Snowflake; Streamlit Inc."));
        assert_eq!(table.cell(1, "developer"), Some(""));
        assert_eq!(table.cell(1, "country"), Some("United States"));
    }

    #[test]
    fn test_raw_dates_kept_when_disabled() {
        let options = TableOptions {
            clean_dates: false,
            ..TableOptions::default()
        };
        let table = Table::from_resolution(&resolution(), &options);
        assert_eq!(table.cell(0, "inception"), Some("+2018-01-01T00:00:00Z"));
    }

    #[test]
    fn test_render_aligns_and_truncates() {
        let table = Table::from_resolution(&resolution(), &TableOptions::default());
        let text = table.render(10);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("id │ label"));
        assert!(lines[1].contains("─┼─"));
        assert!(lines[2].contains("Pytho…work"));
        assert!(lines.iter().all(|l| !l.ends_with(' ')));
    }
}
