use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// Width used when neither the document nor the live node carries one
pub const DEFAULT_NODE_WIDTH: f32 = 120.0;

/// Height used when neither the document nor the live node carries one
pub const DEFAULT_NODE_HEIGHT: f32 = 40.0;

/// A point in canvas coordinates
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Rectangle representing a node's box on the canvas
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rectangle {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of the given size whose center sits on `center`
    pub fn centered_on(center: Point, width: f32, height: f32) -> Self {
        Self::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Check if this rectangle contains a point (edges inclusive)
    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }
}

/// Visual style of a live node
///
/// `x`/`y` mirror the owning node's position. They are only written through
/// [`CanvasNode::set_position`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeStyle {
    pub width: f32,
    pub height: f32,
    pub background_color: Option<String>,
    x: f32,
    y: f32,
}

impl NodeStyle {
    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }
}

/// A node of the live graph
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CanvasNode {
    /// Unique within the live graph
    pub id: String,

    /// Label shown inside the node
    pub text: String,

    x: f32,
    y: f32,

    style: NodeStyle,
}

impl CanvasNode {
    pub fn new(id: impl Into<String>, text: impl Into<String>, position: Point) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            x: position.x,
            y: position.y,
            style: NodeStyle {
                width: DEFAULT_NODE_WIDTH,
                height: DEFAULT_NODE_HEIGHT,
                background_color: None,
                x: position.x,
                y: position.y,
            },
        }
    }

    /// Override the box size
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.style.width = width;
        self.style.height = height;
        self
    }

    /// Override the fill color
    pub fn with_background(mut self, color: Option<String>) -> Self {
        self.style.background_color = color;
        self
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn style(&self) -> &NodeStyle {
        &self.style
    }

    /// Move the node, keeping the style mirror in sync
    pub fn set_position(&mut self, position: Point) {
        self.x = position.x;
        self.y = position.y;
        self.style.x = position.x;
        self.style.y = position.y;
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Replace the fill color without touching position or size
    pub fn set_background(&mut self, color: Option<String>) {
        self.style.background_color = color;
    }

    /// Box occupied on the canvas, centered on the node position
    pub fn bounds(&self) -> Rectangle {
        Rectangle::centered_on(self.position(), self.style.width, self.style.height)
    }
}
