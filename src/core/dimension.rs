use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use ordered_float::OrderedFloat;

use crate::core::primitives::{naive_to_unix_seconds, unix_seconds_to_naive};
use crate::core::value::{Value, ValueKind};
use crate::error::{ChartError, ChartResult};

const DATE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Value space mapping raw values onto a one-dimensional logical axis.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Dimension {
    #[default]
    Numeric,
    /// Logical coordinate is elapsed seconds since the Unix epoch.
    DateTime,
    /// Integer positions; every position owns a slot of width 1.
    Index,
    Enumerated(EnumeratedDimension),
}

impl Dimension {
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Numeric => ValueKind::Double,
            Self::DateTime => ValueKind::DateTime,
            Self::Index => ValueKind::Index,
            Self::Enumerated(_) => ValueKind::Category,
        }
    }

    #[must_use]
    pub fn as_enumerated(&self) -> Option<&EnumeratedDimension> {
        match self {
            Self::Enumerated(dimension) => Some(dimension),
            _ => None,
        }
    }

    pub fn as_enumerated_mut(&mut self) -> Option<&mut EnumeratedDimension> {
        match self {
            Self::Enumerated(dimension) => Some(dimension),
            _ => None,
        }
    }

    /// Maps a value into the logical coordinate system.
    pub fn coordinate(&self, value: &Value) -> ChartResult<f64> {
        match self {
            Self::Numeric => value.expect_f64(),
            Self::DateTime => Ok(naive_to_unix_seconds(value.expect_datetime()?)),
            Self::Index => Ok(value.expect_index()? as f64),
            Self::Enumerated(dimension) => dimension.offset_of(value.expect_category()?),
        }
    }

    /// Logical extent occupied by a value.
    pub fn width(&self, value: &Value) -> ChartResult<f64> {
        match self {
            Self::Numeric => value.expect_f64().map(|_| 0.0),
            Self::DateTime => value.expect_datetime().map(|_| 0.0),
            Self::Index => value.expect_index().map(|_| 1.0),
            Self::Enumerated(dimension) => dimension.width_of(value.expect_category()?),
        }
    }

    /// Orders two values by the dimension's intrinsic ordering.
    pub fn compare(&self, lhs: &Value, rhs: &Value) -> ChartResult<Ordering> {
        match self {
            Self::Numeric => {
                let (left, right) = (lhs.expect_f64()?, rhs.expect_f64()?);
                Ok(OrderedFloat(left).cmp(&OrderedFloat(right)))
            }
            Self::DateTime => Ok(lhs.expect_datetime()?.cmp(&rhs.expect_datetime()?)),
            Self::Index => Ok(lhs.expect_index()?.cmp(&rhs.expect_index()?)),
            Self::Enumerated(dimension) => {
                let left = OrderedFloat(dimension.offset_of(lhs.expect_category()?)?);
                let right = OrderedFloat(dimension.offset_of(rhs.expect_category()?)?);
                Ok(left.cmp(&right))
            }
        }
    }

    /// Parses a textual value into the dimension's native type.
    pub fn value_of(&self, text: &str) -> ChartResult<Value> {
        let text = text.trim();
        match self {
            Self::Numeric => text
                .parse::<f64>()
                .map(Value::Double)
                .map_err(|_| ChartError::InvalidArgument(format!("'{text}' is not a number"))),
            Self::DateTime => parse_date_time(text).map(Value::DateTime),
            Self::Index => text
                .parse::<i64>()
                .map(Value::Index)
                .map_err(|_| ChartError::InvalidArgument(format!("'{text}' is not an index"))),
            Self::Enumerated(dimension) => {
                if dimension.contains(text) {
                    Ok(Value::Category(text.to_owned()))
                } else {
                    Err(ChartError::InvalidArgument(format!(
                        "'{text}' is not a category of this dimension"
                    )))
                }
            }
        }
    }

    /// Coerces a value into the dimension's native type where a lossless
    /// conversion exists.
    pub fn convert_to_right_type(&self, value: Value) -> ChartResult<Value> {
        match (self, value) {
            (Self::Numeric, Value::Double(value)) => finite(value).map(Value::Double),
            (Self::Numeric, Value::Index(value)) => Ok(Value::Double(value as f64)),
            (Self::DateTime, Value::DateTime(value)) => Ok(Value::DateTime(value)),
            (Self::DateTime, Value::Double(seconds)) => {
                unix_seconds_to_naive(seconds).map(Value::DateTime)
            }
            (Self::Index, Value::Index(value)) => Ok(Value::Index(value)),
            (Self::Index, Value::Double(value)) if value.is_finite() && value.fract() == 0.0 => {
                Ok(Value::Index(value as i64))
            }
            (Self::Enumerated(dimension), Value::Category(name)) => {
                if dimension.contains(&name) {
                    Ok(Value::Category(name))
                } else {
                    Err(ChartError::InvalidArgument(format!(
                        "'{name}' is not a category of this dimension"
                    )))
                }
            }
            (Self::Enumerated(dimension), Value::Index(position)) => usize::try_from(position)
                .ok()
                .and_then(|position| dimension.leaf_at(position))
                .map(|name| Value::Category(name.to_owned()))
                .ok_or_else(|| {
                    ChartError::InvalidArgument(format!("no category at position {position}"))
                }),
            (dimension, value) => Err(ChartError::TypeMismatch {
                expected: dimension.kind(),
                found: value.kind(),
            }),
        }
    }

    /// Maps a logical coordinate back into a native value.
    pub fn value_at_coordinate(&self, coordinate: f64) -> ChartResult<Value> {
        let coordinate = finite(coordinate)?;
        match self {
            Self::Numeric => Ok(Value::Double(coordinate)),
            Self::DateTime => unix_seconds_to_naive(coordinate).map(Value::DateTime),
            Self::Index => Ok(Value::Index(coordinate.floor() as i64)),
            Self::Enumerated(dimension) => dimension
                .leaf_at_coordinate(coordinate)
                .map(|name| Value::Category(name.to_owned()))
                .ok_or_else(|| {
                    ChartError::InvalidData("enumerated dimension has no categories".to_owned())
                }),
        }
    }
}

fn finite(value: f64) -> ChartResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ChartError::InvalidArgument("value must be finite".to_owned()))
    }
}

fn parse_date_time(text: &str) -> ChartResult<NaiveDateTime> {
    for format in DATE_TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(parsed);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| ChartError::InvalidArgument(format!("'{text}' is not a date/time")))
}

type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Debug, Clone, PartialEq)]
struct CategoryNode {
    name: String,
    children: Vec<NodeId>,
    leaf_width: f64,
    offset: f64,
    width: f64,
}

impl CategoryNode {
    fn new(name: String, leaf_width: f64) -> Self {
        Self {
            name,
            children: Vec::new(),
            leaf_width,
            offset: 0.0,
            width: leaf_width,
        }
    }
}

/// Ordered tree of named categories.
///
/// Node 0 is a root sentinel that never participates as a value. Leaves carry
/// an explicit width; a parent spans exactly the slots of its descendants, so
/// its offset equals the offset of its first leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumeratedDimension {
    nodes: Vec<CategoryNode>,
    by_name: IndexMap<String, NodeId>,
    leaves: Vec<NodeId>,
}

impl Default for EnumeratedDimension {
    fn default() -> Self {
        Self::new()
    }
}

impl EnumeratedDimension {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![CategoryNode::new(String::new(), 0.0)],
            by_name: IndexMap::new(),
            leaves: Vec::new(),
        }
    }

    /// Builds a flat dimension with unit-width leaves.
    pub fn from_names<I, S>(names: I) -> ChartResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut dimension = Self::new();
        for name in names {
            dimension.add_leaf(name)?;
        }
        Ok(dimension)
    }

    /// Appends a unit-width category under the root.
    pub fn add_leaf(&mut self, name: impl Into<String>) -> ChartResult<()> {
        self.insert(ROOT, name.into(), 1.0)
    }

    /// Appends a category with an explicit width under the root.
    pub fn add_leaf_with_width(&mut self, name: impl Into<String>, width: f64) -> ChartResult<()> {
        self.insert(ROOT, name.into(), width)
    }

    /// Appends a unit-width category below an existing one.
    pub fn add_child(&mut self, parent: &str, name: impl Into<String>) -> ChartResult<()> {
        self.add_child_with_width(parent, name, 1.0)
    }

    pub fn add_child_with_width(
        &mut self,
        parent: &str,
        name: impl Into<String>,
        width: f64,
    ) -> ChartResult<()> {
        let parent_id = self.node_id(parent)?;
        self.insert(parent_id, name.into(), width)
    }

    fn insert(&mut self, parent: NodeId, name: String, width: f64) -> ChartResult<()> {
        if name.is_empty() {
            return Err(ChartError::InvalidArgument(
                "category name must not be empty".to_owned(),
            ));
        }
        if !width.is_finite() || width <= 0.0 {
            return Err(ChartError::InvalidArgument(
                "category width must be finite and > 0".to_owned(),
            ));
        }
        if self.by_name.contains_key(&name) {
            return Err(ChartError::InvalidArgument(format!(
                "category '{name}' already exists"
            )));
        }

        let id = self.nodes.len();
        self.nodes.push(CategoryNode::new(name.clone(), width));
        self.nodes[parent].children.push(id);
        self.by_name.insert(name, id);
        self.relayout();
        Ok(())
    }

    fn relayout(&mut self) {
        self.leaves.clear();
        let mut cursor = 0.0;
        self.layout_node(ROOT, &mut cursor);
    }

    fn layout_node(&mut self, id: NodeId, cursor: &mut f64) {
        let start = *cursor;
        if id != ROOT && self.nodes[id].children.is_empty() {
            self.leaves.push(id);
            *cursor += self.nodes[id].leaf_width;
        } else {
            let children = self.nodes[id].children.clone();
            for child in children {
                self.layout_node(child, cursor);
            }
        }
        let node = &mut self.nodes[id];
        node.offset = start;
        node.width = *cursor - start;
    }

    fn node_id(&self, name: &str) -> ChartResult<NodeId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| ChartError::InvalidArgument(format!("unknown category '{name}'")))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Leaf categories in axis order.
    pub fn leaves(&self) -> impl Iterator<Item = &str> + '_ {
        self.leaves.iter().map(|id| self.nodes[*id].name.as_str())
    }

    #[must_use]
    pub fn leaf_at(&self, position: usize) -> Option<&str> {
        self.leaves
            .get(position)
            .map(|id| self.nodes[*id].name.as_str())
    }

    /// Direct children of a category, or of the root when `parent` is `None`.
    pub fn children(&self, parent: Option<&str>) -> ChartResult<Vec<&str>> {
        let id = match parent {
            Some(name) => self.node_id(name)?,
            None => ROOT,
        };
        Ok(self.nodes[id]
            .children
            .iter()
            .map(|child| self.nodes[*child].name.as_str())
            .collect())
    }

    /// Leaf order of a category. Parents report the position of their first leaf.
    pub fn position_of(&self, name: &str) -> ChartResult<usize> {
        let offset = self.offset_of(name)?;
        self.leaves
            .iter()
            .position(|id| self.nodes[*id].offset >= offset)
            .ok_or_else(|| ChartError::InvalidData(format!("category '{name}' has no leaves")))
    }

    pub fn offset_of(&self, name: &str) -> ChartResult<f64> {
        self.node_id(name).map(|id| self.nodes[id].offset)
    }

    pub fn width_of(&self, name: &str) -> ChartResult<f64> {
        self.node_id(name).map(|id| self.nodes[id].width)
    }

    #[must_use]
    pub fn total_width(&self) -> f64 {
        self.nodes[ROOT].width
    }

    /// Finds the leaf whose slot brackets `coordinate`, clamped to the first and
    /// last leaf.
    #[must_use]
    pub fn leaf_at_coordinate(&self, coordinate: f64) -> Option<&str> {
        let first = *self.leaves.first()?;
        if coordinate < self.nodes[first].offset {
            return Some(self.nodes[first].name.as_str());
        }
        self.leaves
            .iter()
            .find(|id| {
                let node = &self.nodes[**id];
                coordinate < node.offset + node.width
            })
            .or_else(|| self.leaves.last())
            .map(|id| self.nodes[*id].name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::EnumeratedDimension;

    #[test]
    fn parent_spans_its_children() {
        let mut dimension = EnumeratedDimension::new();
        dimension.add_leaf("2023").expect("leaf");
        dimension.add_leaf("2024").expect("leaf");
        dimension.add_child("2024", "Q1").expect("child");
        dimension.add_child_with_width("2024", "Q2", 2.0).expect("child");

        assert_eq!(dimension.offset_of("2024").expect("offset"), 1.0);
        assert_eq!(dimension.width_of("2024").expect("width"), 3.0);
        assert_eq!(dimension.offset_of("Q2").expect("offset"), 2.0);
        assert_eq!(dimension.total_width(), 4.0);
        assert_eq!(dimension.leaves().collect::<Vec<_>>(), vec!["2023", "Q1", "Q2"]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut dimension = EnumeratedDimension::from_names(["A", "B"]).expect("dimension");
        assert!(dimension.add_leaf("A").is_err());
    }

    #[test]
    fn coordinate_lookup_clamps_to_edge_leaves() {
        let dimension = EnumeratedDimension::from_names(["A", "B", "C"]).expect("dimension");
        assert_eq!(dimension.leaf_at_coordinate(-4.0), Some("A"));
        assert_eq!(dimension.leaf_at_coordinate(1.5), Some("B"));
        assert_eq!(dimension.leaf_at_coordinate(99.0), Some("C"));
    }
}
