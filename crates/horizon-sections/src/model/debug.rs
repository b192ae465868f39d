//! Debug visualization for data models.
//!
//! ```
//! use horizon_sections::model::{DataModel, DataModelDebug};
//!
//! let model = DataModel::new(vec![1u32, 2, 3]).unwrap();
//! println!("{}", DataModelDebug::new().format(&model));
//! ```

use std::fmt::Write as FmtWrite;

use super::data_model::DataModel;

/// Style options for model visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line representation.
    Compact,
}

/// Configuration for model debug output.
#[derive(Debug, Clone)]
pub struct ModelFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show the index path of each row.
    pub show_index_paths: bool,
    /// Whether to show per-section row counts.
    pub show_counts: bool,
    /// Maximum rows listed per section (None for unlimited).
    pub max_rows: Option<usize>,
}

impl Default for ModelFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_index_paths: true,
            show_counts: true,
            max_rows: None,
        }
    }
}

impl ModelFormatOptions {
    /// Create options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_index_paths: false,
            show_counts: false,
            ..Default::default()
        }
    }
}

/// Renders a data model's sections and row identifiers as a tree.
#[derive(Debug, Clone, Default)]
pub struct DataModelDebug {
    options: ModelFormatOptions,
}

impl DataModelDebug {
    /// Create a visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a visualizer with custom options.
    pub fn with_options(options: ModelFormatOptions) -> Self {
        Self { options }
    }

    /// Format a model.
    pub fn format<T>(&self, model: &DataModel<T>) -> String {
        let mut output = String::new();
        writeln!(
            output,
            "Data Model ({} sections, {} items):",
            model.section_count(),
            model.item_count()
        )
        .expect("write to String");

        if model.section_count() == 0 {
            writeln!(output, "  (empty)").expect("write to String");
            return output;
        }

        let (branch, tee, corner) = self.connectors();
        let last_section = model.section_count() - 1;
        for (section_index, section) in model.sections().iter().enumerate() {
            let is_last_section = section_index == last_section;
            output.push_str(if is_last_section { corner } else { tee });
            output.push_str(section.name());
            if self.options.show_counts {
                write!(output, " ({})", section.len()).expect("write to String");
            }
            output.push('\n');

            let indent = if is_last_section {
                " ".repeat(branch.chars().count())
            } else {
                branch.to_owned()
            };
            let shown = self.options.max_rows.unwrap_or(usize::MAX).min(section.len());
            let truncated = section.len() > shown;
            for (row, identifier) in section.identifiers().iter().take(shown).enumerate() {
                let is_last_row = row + 1 == shown && !truncated;
                output.push_str(&indent);
                output.push_str(if is_last_row { corner } else { tee });
                if self.options.show_index_paths {
                    write!(output, "({section_index}, {row}) ").expect("write to String");
                }
                writeln!(output, "{identifier}").expect("write to String");
            }
            if truncated {
                writeln!(output, "{indent}{corner}... {} more", section.len() - shown)
                    .expect("write to String");
            }
        }
        output
    }

    fn connectors(&self) -> (&'static str, &'static str, &'static str) {
        match self.options.style {
            TreeStyle::Ascii => ("|   ", "+-- ", "`-- "),
            TreeStyle::Unicode => (
                "\u{2502}   ",
                "\u{251c}\u{2500}\u{2500} ",
                "\u{2514}\u{2500}\u{2500} ",
            ),
            TreeStyle::Compact => ("  ", "- ", "- "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IdentityResolver, SectionInfo};

    fn model() -> DataModel<u32> {
        DataModel::from_sections(
            vec![
                SectionInfo::new("A", vec![1u32, 2]),
                SectionInfo::new("B", vec![3u32]),
            ],
            IdentityResolver::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_ascii_format() {
        let text = DataModelDebug::with_options(ModelFormatOptions {
            style: TreeStyle::Ascii,
            ..Default::default()
        })
        .format(&model());

        let expected = "\
Data Model (2 sections, 3 items):
+-- A (2)
|   +-- (0, 0) 1
|   `-- (0, 1) 2
`-- B (1)
    `-- (1, 0) 3
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_minimal_truncated_format() {
        let text = DataModelDebug::with_options(ModelFormatOptions {
            style: TreeStyle::Compact,
            max_rows: Some(1),
            ..ModelFormatOptions::minimal()
        })
        .format(&model());

        assert!(text.contains("- A\n"));
        assert!(text.contains("... 1 more"));
        assert!(!text.contains("(0, 0)"));
    }

    #[test]
    fn test_empty_model() {
        let text = DataModelDebug::new().format(&DataModel::<u32>::empty());
        assert!(text.ends_with("(empty)\n"));
    }
}
