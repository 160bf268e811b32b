//! Table detection settings for extraction.

use pdfplumber::{Strategy, TableSettings};

/// How the table finder locates cell boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableStrategy {
    /// Use ruling lines drawn on the page. The code list is a ruled table.
    #[default]
    Lattice,
    /// Infer columns from text alignment.
    Stream,
}

/// Settings applied to every page during extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractConfig {
    pub strategy: TableStrategy,
    /// Tolerance for aligning nearby edges.
    pub snap_tolerance: f64,
    /// Tolerance for merging collinear edges.
    pub join_tolerance: f64,
    /// Tolerance for assigning text to cells.
    pub text_tolerance: f64,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            strategy: TableStrategy::Lattice,
            snap_tolerance: 3.0,
            join_tolerance: 3.0,
            text_tolerance: 3.0,
        }
    }
}

impl ExtractConfig {
    /// Translate into the table finder's settings.
    pub fn table_settings(&self) -> TableSettings {
        let strategy = match self.strategy {
            TableStrategy::Lattice => Strategy::Lattice,
            TableStrategy::Stream => Strategy::Stream,
        };

        TableSettings {
            strategy,
            snap_tolerance: self.snap_tolerance,
            snap_x_tolerance: self.snap_tolerance,
            snap_y_tolerance: self.snap_tolerance,
            join_tolerance: self.join_tolerance,
            join_x_tolerance: self.join_tolerance,
            join_y_tolerance: self.join_tolerance,
            text_tolerance: self.text_tolerance,
            text_x_tolerance: self.text_tolerance,
            text_y_tolerance: self.text_tolerance,
            ..TableSettings::default()
        }
    }
}
