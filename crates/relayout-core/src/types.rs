//! Core value types: box attributes, axes and relations.

use std::fmt;

/// One of the eight geometric quantities every box carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Attribute {
    Left,
    Right,
    Width,
    HCenter,
    Top,
    Bottom,
    Height,
    VCenter,
}

impl Attribute {
    /// All attributes in evaluation order.
    pub const ALL: [Attribute; 8] = [
        Attribute::Left,
        Attribute::Right,
        Attribute::Width,
        Attribute::HCenter,
        Attribute::Top,
        Attribute::Bottom,
        Attribute::Height,
        Attribute::VCenter,
    ];

    /// Slot index of this attribute (0..8), matching [`Attribute::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// The axis this attribute belongs to.
    pub fn axis(self) -> Axis {
        match self {
            Attribute::Left | Attribute::Right | Attribute::Width | Attribute::HCenter => {
                Axis::Horizontal
            }
            Attribute::Top | Attribute::Bottom | Attribute::Height | Attribute::VCenter => {
                Axis::Vertical
            }
        }
    }

    /// The arithmetic role of this attribute within its axis.
    pub fn role(self) -> AxisRole {
        match self {
            Attribute::Left | Attribute::Top => AxisRole::Low,
            Attribute::Right | Attribute::Bottom => AxisRole::High,
            Attribute::Width | Attribute::Height => AxisRole::Extent,
            Attribute::HCenter | Attribute::VCenter => AxisRole::Center,
        }
    }

    /// Lowercase name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Attribute::Left => "left",
            Attribute::Right => "right",
            Attribute::Width => "width",
            Attribute::HCenter => "hcenter",
            Attribute::Top => "top",
            Attribute::Bottom => "bottom",
            Attribute::Height => "height",
            Attribute::VCenter => "vcenter",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Layout axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// Left, Right, Width, HCenter
    Horizontal,
    /// Top, Bottom, Height, VCenter
    Vertical,
}

impl Axis {
    /// Get the attribute playing `role` on this axis.
    pub fn attribute(self, role: AxisRole) -> Attribute {
        match (self, role) {
            (Axis::Horizontal, AxisRole::Low) => Attribute::Left,
            (Axis::Horizontal, AxisRole::High) => Attribute::Right,
            (Axis::Horizontal, AxisRole::Extent) => Attribute::Width,
            (Axis::Horizontal, AxisRole::Center) => Attribute::HCenter,
            (Axis::Vertical, AxisRole::Low) => Attribute::Top,
            (Axis::Vertical, AxisRole::High) => Attribute::Bottom,
            (Axis::Vertical, AxisRole::Extent) => Attribute::Height,
            (Axis::Vertical, AxisRole::Center) => Attribute::VCenter,
        }
    }

    /// The four attributes of this axis, in role order.
    pub fn attributes(self) -> [Attribute; 4] {
        AxisRole::ALL.map(|role| self.attribute(role))
    }
}

/// Arithmetic role of an attribute within an axis group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisRole {
    /// Left or Top
    Low,
    /// Right or Bottom
    High,
    /// Width or Height
    Extent,
    /// HCenter or VCenter
    Center,
}

impl AxisRole {
    /// All roles in index order.
    pub const ALL: [AxisRole; 4] = [
        AxisRole::Low,
        AxisRole::High,
        AxisRole::Extent,
        AxisRole::Center,
    ];

    /// Index within an axis group (0..4).
    pub fn index(self) -> usize {
        self as usize
    }
}

/// How to reach another box from the box an expression is evaluated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Relation {
    /// The box itself
    This,
    /// The containing box
    Parent,
    /// The sibling immediately before this box
    PreviousSibling,
    /// The sibling immediately after this box
    NextSibling,
}

impl Relation {
    /// Lowercase name used in printed expressions and diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Relation::This => "this",
            Relation::Parent => "parent",
            Relation::PreviousSibling => "previous",
            Relation::NextSibling => "next",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Binary operators for expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Min,
    Max,
}

impl BinaryOp {
    /// Combine two operands. Division is plain IEEE-754: a zero divisor
    /// yields an infinity or NaN.
    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            BinaryOp::Add => left + right,
            BinaryOp::Sub => left - right,
            BinaryOp::Mul => left * right,
            BinaryOp::Div => left / right,
            BinaryOp::Min => left.min(right),
            BinaryOp::Max => left.max(right),
        }
    }

    /// Infix symbol, or function name for `min`/`max`.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Min => "min",
            BinaryOp::Max => "max",
        }
    }

    /// Binding strength for infix printing. Function-style operators bind tightest.
    pub(crate) fn precedence(self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Sub => 1,
            BinaryOp::Mul | BinaryOp::Div => 2,
            BinaryOp::Min | BinaryOp::Max => 3,
        }
    }
}
