//! Static SVG preview of a computed layout.

use crate::layout::{Handle, Layout, LayoutEdge, LayoutNode, Position, TableData};
use crate::measure::TableMetrics;
use std::collections::HashMap;
use std::fmt::Write;

#[derive(Debug, Clone, Default)]
pub struct SvgRenderer {
    metrics: TableMetrics,
}

type TableLookup<'a> = HashMap<&'a str, (&'a LayoutNode, &'a TableData)>;

impl SvgRenderer {
    /// Use the metrics the layout was computed with so rows line up.
    pub fn new(metrics: TableMetrics) -> Self {
        Self { metrics }
    }

    pub fn render(&self, layout: &Layout) -> String {
        let mut svg = String::new();

        writeln!(
            &mut svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            layout.width, layout.height, layout.width, layout.height
        )
        .unwrap();

        writeln!(
            &mut svg,
            r#"<style>
  .group-label {{ font-family: sans-serif; font-size: 16px; font-weight: bold; }}
  .table-bg {{ fill: #fff; }}
  .table-header {{ fill: #e0e0e0; }}
  .table-border {{ fill: none; stroke: #333; stroke-width: 1.5; }}
  .table-name {{ font-family: monospace; font-size: 14px; font-weight: bold; }}
  .column-text {{ font-family: monospace; font-size: 12px; }}
  .pk {{ font-weight: bold; }}
  .fk {{ font-style: italic; }}
  .edge {{ stroke-width: 1.5; fill: none; }}
  .edge-label {{ font-family: monospace; font-size: 11px; fill: #666; }}
</style>"#
        )
        .unwrap();

        for (node, group) in layout.groups() {
            self.render_group(&mut svg, node, &group.label, &group.color);
        }

        let tables: TableLookup = layout.tables().map(|(n, t)| (n.id.as_str(), (n, t))).collect();

        // Edges sit between group backgrounds and tables
        for edge in &layout.edges {
            self.render_edge(&mut svg, edge, &tables);
        }

        for (node, table) in layout.tables() {
            self.render_table(&mut svg, node, table);
        }

        writeln!(&mut svg, "</svg>").unwrap();
        svg
    }

    fn render_group(&self, svg: &mut String, node: &LayoutNode, label: &str, color: &str) {
        let Position { x, y } = node.position;
        writeln!(
            svg,
            r#"<rect x="{}" y="{}" width="{}" height="{}" rx="12" fill="{}" fill-opacity="0.08" stroke="{}" stroke-dasharray="6 4" />"#,
            x, y, node.size.width, node.size.height, color, color
        )
        .unwrap();
        writeln!(
            svg,
            r#"<text class="group-label" x="{}" y="{}" fill="{}">{}</text>"#,
            x + 16.0,
            y + 26.0,
            color,
            escape_xml(label)
        )
        .unwrap();
    }

    fn render_table(&self, svg: &mut String, node: &LayoutNode, table: &TableData) {
        let Position { x, y } = node.position;
        let w = node.size.width;
        let h = node.size.height;
        let header_h = self.metrics.header_height;
        let text_width = w - self.metrics.padding_x * 2.0;

        writeln!(
            svg,
            r#"<rect class="table-bg" x="{}" y="{}" width="{}" height="{}" rx="4" />"#,
            x, y, w, h
        )
        .unwrap();
        writeln!(
            svg,
            r#"<rect class="table-header" x="{}" y="{}" width="{}" height="{}" rx="4" />"#,
            x,
            y,
            w,
            if table.columns.is_empty() { h } else { header_h }
        )
        .unwrap();

        writeln!(
            svg,
            r#"<text class="table-name" x="{}" y="{}" text-anchor="middle">{}</text>"#,
            x + w / 2.0,
            y + header_h / 2.0 + 5.0,
            escape_xml(&self.metrics.fit_text(&table.label, text_width))
        )
        .unwrap();

        if !table.columns.is_empty() {
            writeln!(
                svg,
                r##"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="#333" stroke-width="1" />"##,
                x,
                y + header_h,
                x + w,
                y + header_h
            )
            .unwrap();
        }

        for (i, col) in table.columns.iter().enumerate() {
            let mut class = "column-text".to_string();
            if col.is_primary {
                class.push_str(" pk");
            }
            if col.is_foreign {
                class.push_str(" fk");
            }

            let prefix = if col.is_primary { "◆ " } else { "  " };
            let text = format!("{}{}: {}", prefix, col.name, col.typ);
            let row_y = y + header_h + i as f64 * self.metrics.row_height;

            writeln!(
                svg,
                r#"<text class="{}" x="{}" y="{}">{}</text>"#,
                class,
                x + self.metrics.padding_x,
                row_y + self.metrics.row_height / 2.0 + 4.0,
                escape_xml(&self.metrics.fit_text(&text, text_width))
            )
            .unwrap();
        }

        writeln!(
            svg,
            r#"<rect class="table-border" x="{}" y="{}" width="{}" height="{}" rx="4" />"#,
            x, y, w, h
        )
        .unwrap();
    }

    fn render_edge(&self, svg: &mut String, edge: &LayoutEdge, tables: &TableLookup) {
        let (Some(source), Some(target)) = (
            tables.get(edge.source_handle.table()),
            tables.get(edge.target_handle.table()),
        ) else {
            return;
        };

        // Leave from the facing sides
        let source_is_left = center_x(source.0) <= center_x(target.0);
        let (x1, y1) = self.handle_point(source, &edge.source_handle, source_is_left);
        let (x2, y2) = self.handle_point(target, &edge.target_handle, !source_is_left);

        writeln!(
            svg,
            r#"<line class="edge" x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" />"#,
            x1, y1, x2, y2, edge.color
        )
        .unwrap();
        writeln!(
            svg,
            r#"<circle cx="{}" cy="{}" r="3" fill="{}" />"#,
            x2, y2, edge.color
        )
        .unwrap();
        writeln!(
            svg,
            r#"<text class="edge-label" x="{}" y="{}" text-anchor="middle">{}</text>"#,
            (x1 + x2) / 2.0,
            (y1 + y2) / 2.0 - 5.0,
            escape_xml(&edge.label)
        )
        .unwrap();
    }

    /// Column handles sit at the row midpoint, table handles at the header.
    fn handle_point(
        &self,
        (node, table): &(&LayoutNode, &TableData),
        handle: &Handle,
        right_side: bool,
    ) -> (f64, f64) {
        let x = if right_side {
            node.position.x + node.size.width
        } else {
            node.position.x
        };

        let row = handle
            .column()
            .and_then(|name| table.columns.iter().position(|c| c.name == name));
        let y = match row {
            Some(i) => {
                node.position.y
                    + self.metrics.header_height
                    + (i as f64 + 0.5) * self.metrics.row_height
            }
            None => node.position.y + self.metrics.header_height / 2.0,
        };
        (x, y)
    }
}

fn center_x(node: &LayoutNode) -> f64 {
    node.position.x + node.size.width / 2.0
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
