//! SVG document assembly
//!
//! One `<path>` per traced layer, in palette order, so later layers draw on
//! top of earlier ones.

use std::fmt::Write as _;

use quick_xml::escape::escape;

use super::TracedLayer;
use super::trace::GridPoint;

/// Document-level settings for the emitter
#[derive(Debug, Clone)]
pub struct DocumentOptions<'a> {
    pub scale: f64,
    pub precision: u32,
    pub view_box: bool,
    /// Title and description text, when a description is wanted
    pub description: Option<(&'a str, String)>,
}

/// Format a coordinate with at most `precision` decimals, trimming trailing
/// zeros and treating -0 as 0
pub fn format_number(n: f64, precision: u32) -> String {
    let factor = 10f64.powi(precision as i32);
    let rounded = (n * factor).round() / factor;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };

    let mut s = format!("{:.*}", precision as usize, rounded);
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    s
}

/// Declared document size: `round(original * scale)`
pub fn scaled_dimension(original: u32, scale: f64) -> u32 {
    (original as f64 * scale).round() as u32
}

/// Path data for one closed contour, `None` if it encloses no area
pub fn contour_to_path_data(points: &[GridPoint], scale: f64, precision: u32) -> Option<String> {
    let mut points = points;
    if points.len() > 1 && points.first() == points.last() {
        points = &points[..points.len() - 1];
    }
    if points.len() < 3 {
        return None;
    }

    let mut d = String::new();
    for (i, p) in points.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        if i > 0 {
            d.push(' ');
        }
        let _ = write!(
            d,
            "{}{} {}",
            cmd,
            format_number(p.x as f64 * scale, precision),
            format_number(p.y as f64 * scale, precision)
        );
    }
    d.push_str(" Z");
    Some(d)
}

/// `<path>` element for a layer, `None` when no contour is drawable
pub fn layer_to_element(layer: &TracedLayer, scale: f64, precision: u32) -> Option<String> {
    let subpaths: Vec<String> = layer
        .paths
        .iter()
        .filter_map(|p| contour_to_path_data(p, scale, precision))
        .collect();

    if subpaths.is_empty() {
        return None;
    }

    let mut el = format!("<path fill=\"{}\"", layer.color.hex());
    if layer.color.alpha < 255 {
        let opacity = layer.color.alpha as f64 / 255.0;
        let _ = write!(el, " fill-opacity=\"{}\"", format_number(opacity, 3));
    }
    let _ = write!(el, " fill-rule=\"evenodd\" d=\"{}\"/>", subpaths.join(" "));
    Some(el)
}

/// Assemble the final SVG document
pub fn assemble_svg(
    width: u32,
    height: u32,
    layers: &[TracedLayer],
    options: &DocumentOptions<'_>,
) -> String {
    let doc_width = scaled_dimension(width, options.scale);
    let doc_height = scaled_dimension(height, options.scale);

    let mut svg = String::from(r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#);
    let _ = write!(
        svg,
        "\n<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" width=\"{}\" height=\"{}\"",
        doc_width, doc_height
    );
    if options.view_box {
        let _ = write!(
            svg,
            " viewBox=\"0 0 {} {}\"",
            format_number(width as f64 * options.scale, options.precision),
            format_number(height as f64 * options.scale, options.precision)
        );
    }
    svg.push_str(">\n");

    if let Some((title, desc)) = &options.description {
        let _ = writeln!(svg, "    <title>{}</title>", escape(*title));
        let _ = writeln!(svg, "    <desc>{}</desc>", escape(desc.as_str()));
    }

    for layer in layers {
        if let Some(el) = layer_to_element(layer, options.scale, options.precision) {
            let _ = writeln!(svg, "    {}", el);
        }
    }

    svg.push_str("</svg>\n");
    svg
}
