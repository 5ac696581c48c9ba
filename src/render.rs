//! Snapshots of a level for the front ends: SVG, PNG and a plain-text board.
//! Edges are drawn green when clear and red when they cross another edge.

use std::fmt::Write as FmtWrite;

use anyhow::Result;

use crate::geometry::Bounds;
use crate::level::{EdgeStatus, Level};
use crate::puzzle::Phase;
use crate::utils::escape_xml;

pub const NODE_RADIUS: f32 = 22.0;
const NODE_BORDER: f32 = 2.0;
const EDGE_WIDTH: f32 = 3.0;
const CLEAR_COLOR: &str = "#16a34a";
const CROSSING_COLOR: &str = "#dc2626";
const NODE_FILL: &str = "#ffffff";
const NODE_STROKE: &str = "#1f2937";

fn edge_color(status: EdgeStatus) -> &'static str {
    match status {
        EdgeStatus::Clear => CLEAR_COLOR,
        EdgeStatus::Crossing => CROSSING_COLOR,
    }
}

pub fn render_svg(level: &Level, bounds: &Bounds, background: &str) -> Result<String> {
    let width = bounds.width();
    let height = bounds.height();

    let mut svg = String::new();
    write!(
        svg,
        r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" viewBox="0 0 {:.0} {:.0}" font-family="Inter, system-ui, sans-serif" data-level="{}">
  <rect width="100%" height="100%" fill="{}" />
"##,
        width,
        height,
        width,
        height,
        level.number(),
        escape_xml(background)
    )?;

    for (index, (segment, status)) in level.edges().zip(level.edge_statuses()).enumerate() {
        writeln!(
            svg,
            r#"  <line data-edge="{}" data-status="{}" x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{}" stroke-linecap="round" />"#,
            index,
            status.as_str(),
            segment.start.x,
            segment.start.y,
            segment.end.x,
            segment.end.y,
            edge_color(status),
            EDGE_WIDTH
        )?;
    }

    for (index, point) in level.positions().iter().enumerate() {
        writeln!(
            svg,
            r#"  <circle data-node="{}" cx="{:.2}" cy="{:.2}" r="{}" fill="{}" stroke="{}" stroke-width="{}" />"#,
            index, point.x, point.y, NODE_RADIUS, NODE_FILL, NODE_STROKE, NODE_BORDER
        )?;
        writeln!(
            svg,
            r#"  <text x="{:.2}" y="{:.2}" font-size="14" text-anchor="middle" dominant-baseline="central" fill="{}">{}</text>"#,
            point.x, point.y, NODE_STROKE, index
        )?;
    }

    svg.push_str("</svg>\n");
    Ok(svg)
}

#[cfg(feature = "png")]
pub fn render_png(level: &Level, bounds: &Bounds, background: &str, scale: f32) -> Result<Vec<u8>> {
    use anyhow::anyhow;
    use tiny_skia::{Color, FillRule, LineCap, Paint, PathBuilder, Pixmap, Stroke, Transform};

    use crate::utils::parse_color;

    let (pixel_width, pixel_height) = bounds.raster_size(scale)?;

    let mut pixmap = Pixmap::new(pixel_width, pixel_height).ok_or_else(|| {
        anyhow!("no room for a {pixel_width}x{pixel_height} pixmap")
    })?;

    let [r, g, b] = parse_color(background)?;
    pixmap.fill(Color::from_rgba8(r, g, b, 255));

    let transform = Transform::from_scale(scale, scale);
    let paint_for = |hex: &str| -> Result<Paint<'static>> {
        let [r, g, b] = parse_color(hex)?;
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, 255);
        paint.anti_alias = true;
        Ok(paint)
    };

    let edge_stroke = Stroke {
        width: EDGE_WIDTH,
        line_cap: LineCap::Round,
        ..Stroke::default()
    };
    for (segment, status) in level.edges().zip(level.edge_statuses()) {
        let mut builder = PathBuilder::new();
        builder.move_to(segment.start.x, segment.start.y);
        builder.line_to(segment.end.x, segment.end.y);
        if let Some(path) = builder.finish() {
            pixmap.stroke_path(&path, &paint_for(edge_color(status))?, &edge_stroke, transform, None);
        }
    }

    let fill = paint_for(NODE_FILL)?;
    let border = paint_for(NODE_STROKE)?;
    let border_stroke = Stroke {
        width: NODE_BORDER,
        ..Stroke::default()
    };
    for point in level.positions() {
        if let Some(circle) = PathBuilder::from_circle(point.x, point.y, NODE_RADIUS) {
            pixmap.fill_path(&circle, &fill, FillRule::Winding, transform, None);
            pixmap.stroke_path(&circle, &border, &border_stroke, transform, None);
        }
    }

    let png_data = pixmap
        .encode_png()
        .map_err(|err| anyhow!("failed to encode PNG output: {err}"))?;

    Ok(png_data)
}

/// Terminal board: node coordinates, then every edge with its status.
pub fn render_text(level: &Level, phase: Phase) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Level {} ({} nodes, {} crossing pairs) - {}",
        level.number(),
        level.node_count(),
        level.crossing_count(),
        phase.as_str()
    );
    for (index, point) in level.positions().iter().enumerate() {
        let _ = writeln!(out, "  node {index:>2}  ({:>7.1}, {:>7.1})", point.x, point.y);
    }
    for (index, status) in level.edge_statuses().into_iter().enumerate() {
        let marker = if status.is_crossing() { "x" } else { "-" };
        let _ = writeln!(
            out,
            "  edge {index:>2}  {:>2} -> {:<2} {marker} {}",
            index,
            level.cycle().next(index),
            status.as_str()
        );
    }
    out
}
