use serde::{Deserialize, Serialize};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::schema::TableDescriptor;

/// Table box estimation. Only drives layout spacing; renderers are free to
/// apply their own metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableMetrics {
    /// `BASE_TABLE_WIDTH`: every table gets the same width.
    pub table_width: f64,
    pub header_height: f64,
    pub row_height: f64,
    pub char_width: f64,
    pub padding_x: f64,
}

impl Default for TableMetrics {
    fn default() -> Self {
        Self {
            table_width: 250.0,
            header_height: 40.0,
            row_height: 28.0,
            char_width: 7.5,
            padding_x: 12.0,
        }
    }
}

impl TableMetrics {
    pub fn table_size(&self, column_count: usize) -> (f64, f64) {
        let height = self.header_height + column_count as f64 * self.row_height;
        (self.table_width, height)
    }

    pub fn size_of(&self, table: &TableDescriptor) -> (f64, f64) {
        self.table_size(table.columns.len())
    }

    pub fn text_width(&self, text: &str) -> f64 {
        UnicodeWidthStr::width(text) as f64 * self.char_width
    }

    /// Cut `text` so it fits `max_width`, appending an ellipsis when shortened.
    pub fn fit_text(&self, text: &str, max_width: f64) -> String {
        if self.text_width(text) <= max_width {
            return text.to_string();
        }

        let budget = ((max_width / self.char_width).floor() as usize).saturating_sub(1);
        let mut used = 0;
        let mut out = String::new();
        for c in text.chars() {
            let w = c.width().unwrap_or(0);
            if used + w > budget {
                break;
            }
            used += w;
            out.push(c);
        }
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnDescriptor;

    #[test]
    fn test_table_size_grows_with_columns() {
        let m = TableMetrics::default();
        let (w0, h0) = m.table_size(0);
        let (w3, h3) = m.table_size(3);

        assert_eq!(w0, w3);
        assert_eq!(h0, 40.0);
        assert_eq!(h3, 40.0 + 3.0 * 28.0);
    }

    #[test]
    fn test_size_of_descriptor() {
        let m = TableMetrics::default();
        let table = TableDescriptor::new("users")
            .with_column(ColumnDescriptor::primary("id", "int"))
            .with_column(ColumnDescriptor::new("name", "text"));

        assert_eq!(m.size_of(&table), (250.0, 96.0));
    }

    #[test]
    fn test_unicode_width() {
        let m = TableMetrics::default();
        // 全角文字は幅2
        assert_eq!(m.text_width("ユーザー"), 8.0 * 7.5);
    }

    #[test]
    fn test_fit_text() {
        let m = TableMetrics::default();
        assert_eq!(m.fit_text("id", 100.0), "id");

        let fitted = m.fit_text("a_very_long_column_name_that_overflows", 75.0);
        assert!(fitted.ends_with('…'));
        assert!(m.text_width(&fitted) <= 75.0);
    }
}
