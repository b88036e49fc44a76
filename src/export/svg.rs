use std::fmt::Write;

use crate::view::scene::{Align, DrawCommand, Font, Frame};

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn font_family(font: Font) -> &'static str {
    match font {
        Font::Mono => "monospace",
        Font::Sans => "system-ui, sans-serif",
    }
}

/// Render one frame as a standalone SVG document.
///
/// A `SetTransform` opens a group that wraps every later command; each glow gets its
/// own radial gradient in `<defs>`.
pub fn render_svg(frame: &Frame) -> String {
    let mut defs = String::new();
    let mut body = String::new();
    let mut open_groups = 0usize;
    let mut glows = 0usize;

    for cmd in &frame.commands {
        match cmd {
            DrawCommand::Clear { color } => {
                writeln!(
                    body,
                    "  <rect width=\"{}\" height=\"{}\" fill=\"{}\"/>",
                    frame.width,
                    frame.height,
                    escape_xml(color)
                )
                .unwrap();
            }
            DrawCommand::SetTransform {
                scale,
                translate_x,
                translate_y,
            } => {
                writeln!(
                    body,
                    "  <g transform=\"matrix({scale} 0 0 {scale} {translate_x} {translate_y})\">"
                )
                .unwrap();
                open_groups += 1;
            }
            DrawCommand::QuadCurve {
                from,
                control,
                to,
                stroke,
                width,
            } => {
                writeln!(
                    body,
                    "  <path d=\"M {} {} Q {} {} {} {}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>",
                    from.0,
                    from.1,
                    control.0,
                    control.1,
                    to.0,
                    to.1,
                    escape_xml(stroke),
                    width
                )
                .unwrap();
            }
            DrawCommand::Glow {
                x,
                y,
                inner,
                outer,
                color,
            } => {
                let id = format!("glow{glows}");
                glows += 1;
                let start = if *outer > 0.0 { inner / outer } else { 0.0 };
                writeln!(
                    defs,
                    "    <radialGradient id=\"{id}\"><stop offset=\"{start}\" stop-color=\"{c}\"/><stop offset=\"1\" stop-color=\"{c}\" stop-opacity=\"0\"/></radialGradient>",
                    c = escape_xml(color)
                )
                .unwrap();
                writeln!(
                    body,
                    "  <circle cx=\"{x}\" cy=\"{y}\" r=\"{outer}\" fill=\"url(#{id})\"/>"
                )
                .unwrap();
            }
            DrawCommand::Circle {
                x,
                y,
                r,
                fill,
                stroke,
                stroke_width,
            } => {
                let stroke_attr = match stroke {
                    Some(s) => format!(" stroke=\"{}\" stroke-width=\"{stroke_width}\"", escape_xml(s)),
                    None => String::new(),
                };
                writeln!(
                    body,
                    "  <circle cx=\"{x}\" cy=\"{y}\" r=\"{r}\" fill=\"{}\"{stroke_attr}/>",
                    escape_xml(fill)
                )
                .unwrap();
            }
            DrawCommand::Text {
                x,
                y,
                text,
                size,
                font,
                color,
                align,
            } => {
                let anchor = match align {
                    Align::Left => "start",
                    Align::Center => "middle",
                };
                writeln!(
                    body,
                    "  <text x=\"{x}\" y=\"{y}\" font-size=\"{size}\" font-family=\"{}\" fill=\"{}\" text-anchor=\"{anchor}\">{}</text>",
                    font_family(*font),
                    escape_xml(color),
                    escape_xml(text)
                )
                .unwrap();
            }
        }
    }
    for _ in 0..open_groups {
        writeln!(body, "  </g>").unwrap();
    }

    let mut out = String::new();
    writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
        w = frame.width,
        h = frame.height
    )
    .unwrap();
    if !defs.is_empty() {
        writeln!(out, "  <defs>\n{defs}  </defs>").unwrap();
    }
    out.push_str(&body);
    writeln!(out, "</svg>").unwrap();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::demo::demo_project;
    use crate::view::{FrameDriver, ViewModel, ViewRequest, build_view};

    fn frame(view: ViewModel) -> Frame {
        FrameDriver::new(view, 800.0, 600.0)
            .tick(Some((800.0, 600.0)))
            .unwrap()
    }

    #[test]
    fn test_empty_frame_svg() {
        let svg = render_svg(&frame(ViewModel::Empty));
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"800\""));
        assert!(svg.contains(">No file selected</text>"));
        assert!(!svg.contains("<defs>"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_local_frame_svg_escapes_labels() {
        let view = build_view(
            &ViewRequest::Local {
                focus: Some("src/types/index.ts".into()),
            },
            &demo_project(),
        );
        let svg = render_svg(&frame(view));
        assert!(svg.contains("{ Message, Chat, ChatStore }"));
        assert!(svg.contains("<radialGradient id=\"glow0\">"));
        assert_eq!(svg.matches("<g ").count(), svg.matches("</g>").count());
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a<b & 'c'"), "a&lt;b &amp; &apos;c&apos;");
    }
}
