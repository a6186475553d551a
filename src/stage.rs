use anyhow::{Context, Result};
use xmltree::{Element, XMLNode};

pub trait Stage {
    fn clear(&mut self);
    fn set_fill_style(&mut self, style: &str);
    fn set_stroke_style(&mut self, style: &str);
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn fill_text(&mut self, text: &str, x: f64, y: f64);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear,
    FillStyle(String),
    StrokeStyle(String),
    FillRect { x: f64, y: f64, w: f64, h: f64 },
    StrokeRect { x: f64, y: f64, w: f64, h: f64 },
    ClearRect { x: f64, y: f64, w: f64, h: f64 },
    FillText { text: String, x: f64, y: f64 },
}

const BACKGROUND_COLOUR: &str = "#ffffff";
const DEFAULT_STYLE: &str = "#000000";

#[derive(Debug, Clone)]
pub struct RecordingStage {
    width: f64,
    height: f64,
    ops: Vec<DrawOp>,
}

impl RecordingStage {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn to_svg_string(&self) -> Result<String> {
        let mut root = Element::new("svg");
        root.attributes
            .insert("xmlns".to_string(), "http://www.w3.org/2000/svg".to_string());
        root.attributes
            .insert("width".to_string(), fmt_num(self.width));
        root.attributes
            .insert("height".to_string(), fmt_num(self.height));
        root.attributes.insert(
            "viewBox".to_string(),
            format!("0 0 {} {}", fmt_num(self.width), fmt_num(self.height)),
        );
        root.children.push(XMLNode::Element(background_rect(
            self.width,
            self.height,
        )));

        let mut fill = DEFAULT_STYLE.to_string();
        let mut stroke = DEFAULT_STYLE.to_string();
        for op in &self.ops {
            match op {
                DrawOp::Clear => {
                    // Drop everything drawn so far; styles persist.
                    root.children
                        .retain(|node| !matches!(node, XMLNode::Element(_)));
                    root.children.push(XMLNode::Element(background_rect(
                        self.width,
                        self.height,
                    )));
                }
                DrawOp::FillStyle(style) => fill = style.clone(),
                DrawOp::StrokeStyle(style) => stroke = style.clone(),
                DrawOp::FillRect { x, y, w, h } => {
                    let mut rect = rect_element(*x, *y, *w, *h);
                    rect.attributes.insert("fill".to_string(), fill.clone());
                    root.children.push(XMLNode::Element(rect));
                }
                DrawOp::StrokeRect { x, y, w, h } => {
                    let mut rect = rect_element(*x, *y, *w, *h);
                    rect.attributes.insert("fill".to_string(), "none".to_string());
                    rect.attributes.insert("stroke".to_string(), stroke.clone());
                    root.children.push(XMLNode::Element(rect));
                }
                DrawOp::ClearRect { x, y, w, h } => {
                    let mut rect = rect_element(*x, *y, *w, *h);
                    rect.attributes
                        .insert("fill".to_string(), BACKGROUND_COLOUR.to_string());
                    root.children.push(XMLNode::Element(rect));
                }
                DrawOp::FillText { text, x, y } => {
                    let mut node = Element::new("text");
                    node.attributes.insert("x".to_string(), fmt_num(*x));
                    node.attributes.insert("y".to_string(), fmt_num(*y));
                    node.attributes.insert("fill".to_string(), fill.clone());
                    node.children.push(XMLNode::Text(text.clone()));
                    root.children.push(XMLNode::Element(node));
                }
            }
        }

        let mut out = Vec::new();
        root.write(&mut out)
            .context("Failed to serialize stage SVG.")?;
        Ok(String::from_utf8(out).context("Stage SVG is not valid UTF-8.")?)
    }
}

impl Stage for RecordingStage {
    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn set_fill_style(&mut self, style: &str) {
        self.ops.push(DrawOp::FillStyle(style.to_string()));
    }

    fn set_stroke_style(&mut self, style: &str) {
        self.ops.push(DrawOp::StrokeStyle(style.to_string()));
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ops.push(DrawOp::FillRect { x, y, w, h });
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ops.push(DrawOp::StrokeRect { x, y, w, h });
    }

    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ops.push(DrawOp::ClearRect { x, y, w, h });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        self.ops.push(DrawOp::FillText {
            text: text.to_string(),
            x,
            y,
        });
    }
}

fn background_rect(width: f64, height: f64) -> Element {
    let mut rect = rect_element(0.0, 0.0, width, height);
    rect.attributes
        .insert("fill".to_string(), BACKGROUND_COLOUR.to_string());
    rect
}

fn rect_element(x: f64, y: f64, w: f64, h: f64) -> Element {
    let mut rect = Element::new("rect");
    rect.attributes.insert("x".to_string(), fmt_num(x));
    rect.attributes.insert("y".to_string(), fmt_num(y));
    rect.attributes.insert("width".to_string(), fmt_num(w));
    rect.attributes.insert("height".to_string(), fmt_num(h));
    rect
}

fn fmt_num(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
