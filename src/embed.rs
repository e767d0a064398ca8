//! Inline embedding of traced documents

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Wrap an SVG document as a `data:image/svg+xml;base64,...` URI
pub fn svg_data_uri(svg: &str) -> String {
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg.as_bytes()))
}

/// `<img>` tag that displays the document inline
pub fn svg_img_tag(svg: &str, alt: &str) -> String {
    format!(
        "<img src=\"{}\" alt=\"{}\"/>",
        svg_data_uri(svg),
        quick_xml::escape::escape(alt)
    )
}
