//! SVG serialization of a [`RenderModel`].

use crate::model::{
    NodeDescriptor, NodeShape, PregnancyDescriptor, RenderModel, Segment, Shading, ViewBox,
};
use crate::legend::LegendKey;
use std::fmt::Write as _;

const INK: &str = "#0f172a";
const TEXT: &str = "#334155";
const PAPER: &str = "#ffffff";
const DECEASED: &str = "#ef4444";
const FONT_SIZE: f64 = 11.0;
const LINE_HEIGHT: f64 = 13.0;
const LEGEND_SWATCH: f64 = 7.0;
const LEGEND_ROW: f64 = 20.0;

#[derive(Debug, Clone)]
pub struct SvgOptions {
    /// Draws the legend at the top-left corner of the viewBox.
    pub include_legend: bool,
    /// Value of the root `id` attribute.
    pub diagram_id: Option<String>,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            include_legend: true,
            diagram_id: None,
        }
    }
}

fn fmt(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }

    let mut v = if v.abs() < 1e-9 { 0.0 } else { v };
    let nearest = v.round();
    if (v - nearest).abs() < 1e-6 {
        v = nearest;
    }
    let s = v.to_string();
    if s == "-0" { "0".to_string() } else { s }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn write_segment(out: &mut String, seg: &Segment, class: &str, extra: &str) {
    let _ = write!(
        out,
        r#"<line class="{class}" x1="{}" y1="{}" x2="{}" y2="{}" stroke="{INK}" stroke-width="1.5"{extra}/>"#,
        fmt(seg.x1),
        fmt(seg.y1),
        fmt(seg.x2),
        fmt(seg.y2),
    );
}

fn diamond_points(x: f64, y: f64, r: f64) -> String {
    format!(
        "{},{} {},{} {},{} {},{}",
        fmt(x),
        fmt(y - r),
        fmt(x + r),
        fmt(y),
        fmt(x),
        fmt(y + r),
        fmt(x - r),
        fmt(y)
    )
}

fn triangle_points(x: f64, y: f64, r: f64) -> String {
    format!(
        "{},{} {},{} {},{}",
        fmt(x),
        fmt(y - r),
        fmt(x + r),
        fmt(y + r),
        fmt(x - r),
        fmt(y + r)
    )
}

fn write_shape(out: &mut String, shape: NodeShape, x: f64, y: f64, r: f64, style: &str) {
    match shape {
        NodeShape::Square => {
            let _ = write!(
                out,
                r#"<rect class="symbol" x="{}" y="{}" width="{}" height="{}" rx="4" ry="4"{style}/>"#,
                fmt(x - r),
                fmt(y - r),
                fmt(2.0 * r),
                fmt(2.0 * r),
            );
        }
        NodeShape::Circle => {
            let _ = write!(
                out,
                r#"<circle class="symbol" cx="{}" cy="{}" r="{}"{style}/>"#,
                fmt(x),
                fmt(y),
                fmt(r),
            );
        }
        NodeShape::Diamond => {
            let _ = write!(
                out,
                r#"<polygon class="symbol" points="{}"{style}/>"#,
                diamond_points(x, y, r),
            );
        }
        NodeShape::Triangle => {
            let _ = write!(
                out,
                r#"<polygon class="symbol" points="{}"{style}/>"#,
                triangle_points(x, y, r),
            );
        }
    }
}

/// Left half of the symbol, used for autosomal-recessive carriers.
fn write_half_fill(out: &mut String, shape: NodeShape, x: f64, y: f64, r: f64) {
    match shape {
        NodeShape::Square => {
            let _ = write!(
                out,
                r#"<rect class="half-fill" x="{}" y="{}" width="{}" height="{}" fill="{INK}"/>"#,
                fmt(x - r),
                fmt(y - r),
                fmt(r),
                fmt(2.0 * r),
            );
        }
        NodeShape::Circle => {
            let _ = write!(
                out,
                r#"<path class="half-fill" d="M{},{} A{},{} 0 0 0 {},{} Z" fill="{INK}"/>"#,
                fmt(x),
                fmt(y - r),
                fmt(r),
                fmt(r),
                fmt(x),
                fmt(y + r),
            );
        }
        NodeShape::Diamond => {
            let _ = write!(
                out,
                r#"<polygon class="half-fill" points="{},{} {},{} {},{}" fill="{INK}"/>"#,
                fmt(x),
                fmt(y - r),
                fmt(x - r),
                fmt(y),
                fmt(x),
                fmt(y + r),
            );
        }
        NodeShape::Triangle => {
            let _ = write!(
                out,
                r#"<polygon class="half-fill" points="{},{} {},{} {},{}" fill="{INK}"/>"#,
                fmt(x),
                fmt(y - r),
                fmt(x - r),
                fmt(y + r),
                fmt(x),
                fmt(y + r),
            );
        }
    }
}

fn write_pregnancy(out: &mut String, pregnancy: &PregnancyDescriptor) {
    let (x, y, r) = (pregnancy.x, pregnancy.y, pregnancy.r);
    let _ = write!(
        out,
        r#"<g class="pregnancy" data-id="{}">"#,
        escape_xml(pregnancy.id.as_str()),
    );
    for seg in &pregnancy.segments {
        write_segment(out, seg, "descent-line", "");
    }
    let fill = if pregnancy.filled { INK } else { PAPER };
    let style = format!(r#" fill="{fill}" stroke="{INK}" stroke-width="1""#);
    write_shape(out, pregnancy.shape, x, y, r, &style);
    if pregnancy.shape == NodeShape::Diamond {
        let ink = if pregnancy.filled { PAPER } else { INK };
        let _ = write!(
            out,
            r#"<text class="pregnancy-mark" x="{}" y="{}" text-anchor="middle" dominant-baseline="middle" font-size="{}" fill="{ink}">P</text>"#,
            fmt(x),
            fmt(y),
            fmt(FONT_SIZE),
        );
    }
    for (i, line) in pregnancy.label_lines.iter().enumerate() {
        let _ = write!(
            out,
            r#"<text class="label-bottom" x="{}" y="{}" text-anchor="middle" font-size="{}" fill="{TEXT}">{}</text>"#,
            fmt(x),
            fmt(y + r + 14.0 + i as f64 * LINE_HEIGHT),
            fmt(FONT_SIZE),
            escape_xml(line),
        );
    }
    out.push_str("</g>");
}

fn write_node(out: &mut String, node: &NodeDescriptor) {
    let (x, y, r) = (node.x, node.y, node.r);
    let _ = write!(
        out,
        r#"<g class="node shading-{}" data-id="{}">"#,
        node.shading.as_str(),
        escape_xml(node.id.as_str()),
    );

    let fill = if node.shading == Shading::Filled { INK } else { PAPER };
    let style = format!(
        r#" fill="{fill}" stroke="{}" stroke-width="{}""#,
        escape_xml(&node.stroke.color),
        fmt(node.stroke.width)
    );
    write_shape(out, node.shape, x, y, r, &style);

    match node.shading {
        Shading::Half => write_half_fill(out, node.shape, x, y, r),
        Shading::Dot => {
            let _ = write!(
                out,
                r#"<circle class="carrier-dot" cx="{}" cy="{}" r="{}" fill="{INK}"/>"#,
                fmt(x),
                fmt(y),
                fmt(r / 4.0),
            );
        }
        Shading::None | Shading::Filled => {}
    }

    if let Some(ring) = node.proband_ring {
        let dash = if ring.dashed {
            r#" stroke-dasharray="4 3""#
        } else {
            ""
        };
        let _ = write!(
            out,
            r#"<circle class="proband-ring" cx="{}" cy="{}" r="{}" fill="none" stroke="{INK}" stroke-width="1.5"{dash}/>"#,
            fmt(x),
            fmt(y),
            fmt(ring.r),
        );
    }

    if node.deceased {
        let reach = r + 6.0;
        let _ = write!(
            out,
            r#"<line class="deceased-slash" x1="{}" y1="{}" x2="{}" y2="{}" stroke="{DECEASED}" stroke-width="2"/>"#,
            fmt(x - reach),
            fmt(y + reach),
            fmt(x + reach),
            fmt(y - reach),
        );
    }

    if !node.label_top.is_empty() {
        let _ = write!(
            out,
            r#"<text class="label-top" x="{}" y="{}" text-anchor="middle" font-size="{}" fill="{TEXT}">{}</text>"#,
            fmt(x),
            fmt(y - r - 10.0),
            fmt(FONT_SIZE),
            escape_xml(&node.label_top),
        );
    }
    for (i, line) in node.label_bottom_lines.iter().enumerate() {
        let _ = write!(
            out,
            r#"<text class="label-bottom" x="{}" y="{}" text-anchor="middle" font-size="{}" fill="{TEXT}">{}</text>"#,
            fmt(x),
            fmt(y + r + 14.0 + i as f64 * LINE_HEIGHT),
            fmt(FONT_SIZE),
            escape_xml(line),
        );
    }
    out.push_str("</g>");
}

fn write_legend(out: &mut String, model: &RenderModel, view_box: &ViewBox) {
    let x0 = view_box.x + 12.0;
    let y0 = view_box.y + 16.0;
    out.push_str(r#"<g class="legend">"#);
    for (i, entry) in model.legend.iter().enumerate() {
        let cy = y0 + i as f64 * LEGEND_ROW;
        let s = LEGEND_SWATCH;
        let plain = format!(r#" fill="{PAPER}" stroke="{INK}" stroke-width="1""#);
        let _ = write!(
            out,
            r#"<g class="legend-entry" data-key="{}">"#,
            legend_key_name(entry.key)
        );
        match entry.key {
            LegendKey::Male => write_shape(out, NodeShape::Square, x0, cy, s, &plain),
            LegendKey::Female => write_shape(out, NodeShape::Circle, x0, cy, s, &plain),
            LegendKey::Unspecified => write_shape(out, NodeShape::Diamond, x0, cy, s, &plain),
            LegendKey::Filled => {
                let filled = format!(r#" fill="{INK}" stroke="{INK}" stroke-width="1""#);
                write_shape(out, NodeShape::Square, x0, cy, s, &filled);
            }
            LegendKey::Half => {
                write_shape(out, NodeShape::Square, x0, cy, s, &plain);
                write_half_fill(out, NodeShape::Square, x0, cy, s);
            }
            LegendKey::Dot => {
                write_shape(out, NodeShape::Circle, x0, cy, s, &plain);
                let _ = write!(
                    out,
                    r#"<circle cx="{}" cy="{}" r="2" fill="{INK}"/>"#,
                    fmt(x0),
                    fmt(cy),
                );
            }
            LegendKey::Triangle => write_shape(out, NodeShape::Triangle, x0, cy, s, &plain),
        }
        let _ = write!(
            out,
            r#"<text x="{}" y="{}" font-size="{}" fill="{TEXT}" dominant-baseline="middle">{}</text></g>"#,
            fmt(x0 + s + 8.0),
            fmt(cy),
            fmt(FONT_SIZE),
            escape_xml(&entry.label),
        );
    }
    out.push_str("</g>");
}

fn legend_key_name(key: LegendKey) -> &'static str {
    match key {
        LegendKey::Male => "male",
        LegendKey::Female => "female",
        LegendKey::Unspecified => "unspecified",
        LegendKey::Filled => "filled",
        LegendKey::Half => "half",
        LegendKey::Dot => "dot",
        LegendKey::Triangle => "triangle",
    }
}

/// Serializes the model with the caller's viewBox. Lines are drawn first so symbols cover
/// their endpoints.
pub fn render_svg(model: &RenderModel, view_box: &ViewBox, options: &SvgOptions) -> String {
    let diagram_id = escape_xml(options.diagram_id.as_deref().unwrap_or("pedigree"));
    let mut out = String::new();
    let _ = write!(
        &mut out,
        r#"<svg id="{diagram_id}" xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="{} {} {} {}" role="graphics-document document" aria-roledescription="pedigree">"#,
        fmt(view_box.width),
        fmt(view_box.height),
        fmt(view_box.x),
        fmt(view_box.y),
        fmt(view_box.width),
        fmt(view_box.height),
    );

    out.push_str(r#"<g class="couples">"#);
    for couple in &model.couples {
        let class = if couple.consanguinity {
            "couple consanguineous"
        } else {
            "couple"
        };
        let _ = write!(out, r#"<g class="{class}" data-id="{}">"#, escape_xml(couple.partnership.as_str()));
        for seg in &couple.segments {
            write_segment(&mut out, seg, "couple-line", "");
        }
        if let Some(slash) = &couple.ended_slash {
            write_segment(&mut out, slash, "ended-slash", "");
        }
        out.push_str("</g>");
    }
    out.push_str("</g>");

    out.push_str(r#"<g class="descents">"#);
    for descent in &model.descents {
        let (class, extra) = if descent.dashed {
            ("descent dashed", r#" stroke-dasharray="6 4""#)
        } else {
            ("descent", "")
        };
        let _ = write!(out, r#"<g class="{class}" data-child="{}">"#, escape_xml(descent.child.as_str()));
        for seg in &descent.segments {
            write_segment(&mut out, seg, "descent-line", extra);
        }
        out.push_str("</g>");
    }
    out.push_str("</g>");

    out.push_str(r#"<g class="nodes">"#);
    for node in &model.nodes {
        write_node(&mut out, node);
    }
    out.push_str("</g>");

    if !model.pregnancies.is_empty() {
        out.push_str(r#"<g class="pregnancies">"#);
        for pregnancy in &model.pregnancies {
            write_pregnancy(&mut out, pregnancy);
        }
        out.push_str("</g>");
    }

    if options.include_legend {
        write_legend(&mut out, model, view_box);
    }
    out.push_str("</svg>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fmt_trims_float_noise() {
        assert_eq!(fmt(70.0000000001), "70");
        assert_eq!(fmt(-0.0), "0");
        assert_eq!(fmt(12.5), "12.5");
        assert_eq!(fmt(f64::NAN), "0");
    }

    #[test]
    fn escape_xml_covers_markup_characters() {
        assert_eq!(escape_xml(r#"<a & "b">"#), "&lt;a &amp; &quot;b&quot;&gt;");
    }
}
