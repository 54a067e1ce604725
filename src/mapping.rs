//! Conversion protocols between typed values and [`Node`] trees.
//!
//! `Project` builds a tree from a value and never fails. `Populate` reads a
//! value back and reports missing members, wrong categories and bad scalar
//! text. Records compose both by delegating field by field.
use crate::error::{Error, Result};
use crate::node::{Category, Node};

pub trait Project {
    fn project(&self) -> Node;
}

pub trait Populate: Sized {
    fn populate(node: &Node) -> Result<Self>;

    /// Overwrites `target` only when population succeeds.
    fn populate_into(node: &Node, target: &mut Self) -> Result<()> {
        *target = Self::populate(node)?;
        Ok(())
    }
}

pub fn to_node<T: Project + ?Sized>(value: &T) -> Node {
    value.project()
}

pub fn from_node<T: Populate>(node: &Node) -> Result<T> {
    T::populate(node)
}

/// Populates a required member (last match wins).
pub fn member<T: Populate>(node: &Node, name: &str) -> Result<T> {
    T::populate(node.get_member(name)?)
}

/// Populates a member that may be `null` or left out entirely.
pub fn optional_member<T: Populate>(node: &Node, name: &str) -> Result<Option<T>> {
    match node.find_member(name) {
        Some(child) => Option::<T>::populate(child),
        None if node.category() == Category::Object => Ok(None),
        None => Err(Error::mismatch("object", node.category().as_str())),
    }
}

/// Ordered member list for projecting a record.
#[derive(Debug, Default)]
pub struct Members {
    entries: Vec<(&'static str, Node)>,
}

impl Members {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<T: Project + ?Sized>(&mut self, name: &'static str, value: &T) -> &mut Self {
        self.entries.push((name, value.project()));
        self
    }

    pub fn into_node(self) -> Node {
        Node::from_members(self.entries)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// SCALARS
// ————————————————————————————————————————————————————————————————————————————

impl Project for str {
    fn project(&self) -> Node {
        Node::scalar(self)
    }
}

impl Project for String {
    fn project(&self) -> Node {
        Node::scalar(self.as_str())
    }
}

impl Populate for String {
    fn populate(node: &Node) -> Result<Self> {
        node.to_text()
    }
}

impl Project for bool {
    fn project(&self) -> Node {
        Node::scalar(*self)
    }
}

impl Populate for bool {
    fn populate(node: &Node) -> Result<Self> {
        node.to_bool()
    }
}

impl Project for f64 {
    fn project(&self) -> Node {
        Node::scalar(*self)
    }
}

impl Populate for f64 {
    fn populate(node: &Node) -> Result<Self> {
        node.to_f64()
    }
}

impl Project for f32 {
    fn project(&self) -> Node {
        Node::scalar(*self)
    }
}

impl Populate for f32 {
    fn populate(node: &Node) -> Result<Self> {
        Ok(node.to_f64()? as f32)
    }
}

macro_rules! integer_mapping {
    ($read:ident, $expected:literal => $($t:ty),*) => {$(
        impl Project for $t {
            fn project(&self) -> Node {
                Node::scalar(*self)
            }
        }

        impl Populate for $t {
            fn populate(node: &Node) -> Result<Self> {
                let wide = node.$read()?;
                <$t>::try_from(wide)
                    .map_err(|_| Error::mismatch($expected, format!("integer {wide}")))
            }
        }
    )*};
}

integer_mapping!(to_u64, "unsigned integer in range" => u8, u16, u32, u64, usize);
integer_mapping!(to_i64, "signed integer in range" => i8, i16, i32, i64, isize);

// ————————————————————————————————————————————————————————————————————————————
// CONTAINERS
// ————————————————————————————————————————————————————————————————————————————

impl<T: Project> Project for Option<T> {
    /// `None` leaves the node Void.
    fn project(&self) -> Node {
        match self {
            Some(value) => value.project(),
            None => Node::new(),
        }
    }
}

impl<T: Populate> Populate for Option<T> {
    fn populate(node: &Node) -> Result<Self> {
        if node.is_null() {
            return Ok(None);
        }
        T::populate(node).map(Some)
    }
}

impl<T: Project> Project for Vec<T> {
    fn project(&self) -> Node {
        self.as_slice().project()
    }
}

impl<T: Project> Project for [T] {
    fn project(&self) -> Node {
        Node::from_elements(self.iter().map(Project::project))
    }
}

impl<T: Populate> Populate for Vec<T> {
    fn populate(node: &Node) -> Result<Self> {
        if node.category() != Category::Array {
            return Err(Error::mismatch("array", node.category().as_str()));
        }
        node.children().iter().map(T::populate).collect()
    }
}

impl<T: Project + ?Sized> Project for Box<T> {
    fn project(&self) -> Node {
        (**self).project()
    }
}

impl<T: Populate> Populate for Box<T> {
    fn populate(node: &Node) -> Result<Self> {
        T::populate(node).map(Box::new)
    }
}
