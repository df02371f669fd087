//! Ready-made flyer layouts.

use crate::background::{Background, ColorStop, GradientAxis};
use crate::shapes::{
    Circle, ObjectStyle, Rectangle, Rgba, SceneObject, Text, TextAlign,
};
use kurbo::Point;
use std::fmt;
use std::str::FromStr;

/// A preset layout that replaces the scene contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Blank,
    Event,
    Sale,
    BusinessCard,
}

impl Template {
    pub const ALL: [Template; 4] = [
        Template::Blank,
        Template::Event,
        Template::Sale,
        Template::BusinessCard,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Template::Blank => "blank",
            Template::Event => "event",
            Template::Sale => "sale",
            Template::BusinessCard => "business",
        }
    }

    /// Objects (back to front) and background of the layout.
    pub fn build(self) -> (Vec<SceneObject>, Background) {
        match self {
            Template::Blank => (Vec::new(), Background::white()),
            Template::Event => event(),
            Template::Sale => sale(),
            Template::BusinessCard => business_card(),
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Template {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blank" => Ok(Template::Blank),
            "event" => Ok(Template::Event),
            "sale" => Ok(Template::Sale),
            "business" | "business-card" | "businesscard" => Ok(Template::BusinessCard),
            other => Err(format!("unknown template '{other}'")),
        }
    }
}

fn text(x: f64, y: f64, content: &str, family: &str, size: f64, color: Rgba) -> Text {
    Text::new(Point::new(x, y), content, size)
        .with_family(family)
        .with_color(color)
}

fn centered(y: f64, content: &str, family: &str, size: f64, color: Rgba) -> SceneObject {
    SceneObject::Text(text(400.0, y, content, family, size, color).with_align(TextAlign::Center))
}

fn event() -> (Vec<SceneObject>, Background) {
    let background = Background::gradient(
        vec![
            ColorStop::new(0.0, Rgba::from_hex(0x667eea)),
            ColorStop::new(1.0, Rgba::from_hex(0x764ba2)),
        ],
        GradientAxis::Vertical,
    );
    let badge = Circle::new(Point::new(380.0, 450.0), 80.0).with_style(ObjectStyle {
        fill: Some(Rgba::new(255, 255, 255, 51)),
        stroke: Some(Rgba::white()),
        stroke_width: 3.0,
        opacity: 1.0,
    });
    let objects = vec![
        centered(120.0, "EVENT NAME", "Impact", 60.0, Rgba::white()),
        centered(220.0, "DATE & TIME", "Arial", 30.0, Rgba::white()),
        centered(280.0, "LOCATION", "Arial", 24.0, Rgba::white()),
        SceneObject::Circle(badge),
    ];
    (objects, background)
}

fn sale() -> (Vec<SceneObject>, Background) {
    let frame = Rectangle::new(Point::new(50.0, 50.0), 700.0, 500.0).with_style(ObjectStyle {
        fill: Some(Rgba::from_hex(0xf8f9fa)),
        stroke: Some(Rgba::from_hex(0xe74c3c)),
        stroke_width: 5.0,
        opacity: 1.0,
    });
    let objects = vec![
        SceneObject::Rect(frame),
        centered(140.0, "BIG SALE!", "Impact", 80.0, Rgba::from_hex(0xe74c3c)),
        centered(250.0, "UP TO 50% OFF", "Arial", 40.0, Rgba::from_hex(0x333333)),
        centered(340.0, "Limited Time Offer", "Arial", 24.0, Rgba::from_hex(0x666666)),
    ];
    (objects, Background::white())
}

fn business_card() -> (Vec<SceneObject>, Background) {
    let accent = Rgba::from_hex(0x3498db);
    // Thin rule under the title; intentionally below the resize floor
    let rule = Rectangle::new(Point::new(100.0, 240.0), 200.0, 3.0).with_style(ObjectStyle {
        fill: Some(accent),
        stroke: Some(accent),
        stroke_width: 0.0,
        opacity: 1.0,
    });
    let objects = vec![
        SceneObject::Text(text(100.0, 170.0, "YOUR NAME", "Georgia", 36.0, Rgba::white())),
        SceneObject::Text(text(
            100.0,
            230.0,
            "Professional Title",
            "Arial",
            20.0,
            Rgba::from_hex(0xecf0f1),
        )),
        SceneObject::Rect(rule),
        SceneObject::Text(text(
            100.0,
            300.0,
            "email@example.com",
            "Arial",
            16.0,
            Rgba::from_hex(0xbdc3c7),
        )),
        SceneObject::Text(text(
            100.0,
            330.0,
            "(123) 456-7890",
            "Arial",
            16.0,
            Rgba::from_hex(0xbdc3c7),
        )),
    ];
    (objects, Background::Solid(Rgba::from_hex(0x2c3e50)))
}
