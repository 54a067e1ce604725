//! Generic, format-agnostic tree used as the pivot between typed values and
//! JSON text.
//!
//! A node is Void until something is written to it. Adding a member promotes
//! it to an object, adding an element promotes it to an array, assigning a
//! value makes it a scalar. After that the category only changes through
//! `set_category`, and only when the node's content allows it.
pub mod scalar;

use std::fmt;

use crate::error::{Error, Result};

pub use scalar::Scalar;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Category {
    #[default]
    Void,
    Scalar,
    Object,
    Array,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Void => "void",
            Category::Scalar => "scalar",
            Category::Object => "object",
            Category::Array => "array",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Node {
    name: Option<String>,
    category: Category,
    // Some exactly when category is Scalar.
    value: Option<Scalar>,
    children: Vec<Node>,
}

// ————————————————————————————————————————————————————————————————————————————
// CONSTRUCTION
// ————————————————————————————————————————————————————————————————————————————

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scalar(value: impl Into<Scalar>) -> Self {
        Self {
            category: Category::Scalar,
            value: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn object() -> Self {
        Self::with_children(Category::Object, Vec::new())
    }

    pub fn array() -> Self {
        Self::with_children(Category::Array, Vec::new())
    }

    pub fn from_members<I, K>(members: I) -> Self
    where
        I: IntoIterator<Item = (K, Node)>,
        K: Into<String>,
    {
        let children = members
            .into_iter()
            .map(|(name, mut node)| {
                node.name = Some(name.into());
                node
            })
            .collect();
        Self::with_children(Category::Object, children)
    }

    pub fn from_elements<I>(elements: I) -> Self
    where
        I: IntoIterator<Item = Node>,
    {
        let children = elements
            .into_iter()
            .map(|mut node| {
                node.name = None;
                node
            })
            .collect();
        Self::with_children(Category::Array, children)
    }

    /// Children must already carry names for objects and none for arrays.
    pub(crate) fn with_children(category: Category, children: Vec<Node>) -> Self {
        Self {
            name: None,
            category,
            value: None,
            children,
        }
    }

    pub(crate) fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }
}

// ————————————————————————————————————————————————————————————————————————————
// MUTATION
// ————————————————————————————————————————————————————————————————————————————

impl Node {
    pub fn set_category(&mut self, category: Category) -> Result<()> {
        if category == self.category {
            return Ok(());
        }
        let compatible = match category {
            Category::Void => self.children.is_empty() && self.value.is_none(),
            Category::Scalar => self.children.is_empty(),
            Category::Object | Category::Array => {
                self.children.is_empty() && self.value.is_none()
            }
        };
        if !compatible {
            let action = match category {
                Category::Void => "reset to void",
                Category::Scalar => "make scalar",
                Category::Object => "make object",
                Category::Array => "make array",
            };
            return Err(self.violation(action));
        }
        if category == Category::Scalar {
            self.value = Some(Scalar::Str(String::new()));
        }
        self.category = category;
        Ok(())
    }

    pub fn set_value(&mut self, value: impl Into<Scalar>) -> Result<()> {
        match self.category {
            Category::Void | Category::Scalar => {
                self.category = Category::Scalar;
                self.value = Some(value.into());
                Ok(())
            }
            Category::Object | Category::Array => Err(self.violation("assign a scalar")),
        }
    }

    /// Appends a Void child named `name` and returns it for filling.
    pub fn add_member(&mut self, name: impl Into<String>) -> Result<&mut Node> {
        let mut child = Node::new();
        child.name = Some(name.into());
        self.attach(Category::Object, child, "add a member")
    }

    /// Appends an unnamed Void child and returns it for filling.
    pub fn add_element(&mut self) -> Result<&mut Node> {
        self.attach(Category::Array, Node::new(), "add an element")
    }

    pub fn push_member(&mut self, name: impl Into<String>, mut node: Node) -> Result<()> {
        node.name = Some(name.into());
        self.attach(Category::Object, node, "add a member")?;
        Ok(())
    }

    pub fn push_element(&mut self, mut node: Node) -> Result<()> {
        node.name = None;
        self.attach(Category::Array, node, "add an element")?;
        Ok(())
    }

    fn attach(&mut self, container: Category, child: Node, action: &'static str) -> Result<&mut Node> {
        match self.category {
            Category::Void => self.category = container,
            current if current == container => {}
            _ => return Err(self.violation(action)),
        }
        self.children.push(child);
        let last = self.children.len() - 1;
        Ok(&mut self.children[last])
    }

    fn violation(&self, action: &'static str) -> Error {
        Error::Category {
            category: self.category,
            action,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// ACCESS
// ————————————————————————————————————————————————————————————————————————————

impl Node {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn is_null(&self) -> bool {
        self.category == Category::Void
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Last member named `name`. Earlier duplicates are shadowed.
    pub fn find_member(&self, name: &str) -> Option<&Node> {
        if self.category != Category::Object {
            return None;
        }
        self.children
            .iter()
            .rev()
            .find(|child| child.name.as_deref() == Some(name))
    }

    pub fn get_member(&self, name: &str) -> Result<&Node> {
        if self.category != Category::Object {
            return Err(Error::mismatch("object", self.category.as_str()));
        }
        self.find_member(name)
            .ok_or_else(|| Error::MissingMember(name.to_owned()))
    }

    pub fn value(&self) -> Result<&Scalar> {
        match (&self.value, self.category) {
            (Some(value), Category::Scalar) => Ok(value),
            _ => Err(Error::mismatch("scalar", self.category.as_str())),
        }
    }

    /// Text form of any scalar (numbers and booleans in canonical form).
    pub fn to_text(&self) -> Result<String> {
        Ok(self.value()?.to_string())
    }

    pub fn as_str(&self) -> Result<&str> {
        let value = self.value()?;
        value
            .as_str()
            .ok_or_else(|| Error::mismatch("string", value.describe()))
    }

    pub fn to_bool(&self) -> Result<bool> {
        let value = self.value()?;
        value
            .to_bool()
            .ok_or_else(|| Error::mismatch("boolean", value.describe()))
    }

    pub fn to_i64(&self) -> Result<i64> {
        let value = self.value()?;
        value
            .to_i64()
            .ok_or_else(|| Error::mismatch("signed integer", value.describe()))
    }

    pub fn to_u64(&self) -> Result<u64> {
        let value = self.value()?;
        value
            .to_u64()
            .ok_or_else(|| Error::mismatch("unsigned integer", value.describe()))
    }

    pub fn to_f64(&self) -> Result<f64> {
        let value = self.value()?;
        value
            .to_f64()
            .ok_or_else(|| Error::mismatch("number", value.describe()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adding_a_member_promotes_void_to_object() {
        let mut node = Node::new();
        assert!(node.is_null());
        node.add_member("firstName").unwrap().set_value("John").unwrap();
        assert_eq!(node.category(), Category::Object);
        assert!(!node.is_null());
        assert_eq!(node.get_member("firstName").unwrap().as_str().unwrap(), "John");
    }

    #[test]
    fn adding_an_element_promotes_void_to_array() {
        let mut node = Node::new();
        node.add_element().unwrap().set_value(1u32).unwrap();
        node.add_element().unwrap().set_value(2u32).unwrap();
        assert_eq!(node.category(), Category::Array);
        let values: Vec<u64> = node.children().iter().map(|n| n.to_u64().unwrap()).collect();
        assert_eq!(values, vec![1, 2]);
    }

    #[test]
    fn explicit_array_category_survives_without_children() {
        let mut node = Node::new();
        node.set_category(Category::Array).unwrap();
        assert_eq!(node.category(), Category::Array);
        assert!(node.is_empty());
        assert!(!node.is_null());
        node.set_category(Category::Object).unwrap();
        assert_eq!(node.category(), Category::Object);
    }

    #[test]
    fn category_is_fixed_once_content_exists() {
        let mut node = Node::new();
        node.add_member("a").unwrap();
        let err = node.set_category(Category::Scalar).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Category);
        assert!(node.set_category(Category::Array).is_err());
        assert!(node.set_value(1u8).is_err());
        assert!(node.add_element().is_err());

        let mut scalar = Node::scalar("x");
        assert!(scalar.add_member("a").is_err());
        assert!(scalar.set_category(Category::Object).is_err());
        assert!(scalar.set_category(Category::Void).is_err());
        scalar.set_value(true).unwrap();
        assert!(scalar.to_bool().unwrap());
    }

    #[test]
    fn member_lookup_is_last_match_wins() {
        let node = Node::from_members([
            ("age", Node::scalar(1u32)),
            ("name", Node::scalar("x")),
            ("age", Node::scalar(2u32)),
        ]);
        assert_eq!(node.get_member("age").unwrap().to_u64().unwrap(), 2);
        assert_eq!(node.len(), 3);
    }

    #[test]
    fn lookup_failures_are_typed() {
        let node = Node::object();
        assert_eq!(
            node.get_member("firstName").unwrap_err(),
            Error::MissingMember("firstName".into())
        );
        let err = Node::scalar(3u8).get_member("x").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::TypeMismatch);
        let err = Node::object().value().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::TypeMismatch);
        let err = Node::scalar("abc").to_u64().unwrap_err();
        assert_eq!(
            err,
            Error::TypeMismatch {
                expected: "unsigned integer",
                found: "string \"abc\"".into()
            }
        );
    }

    #[test]
    fn from_elements_drops_names() {
        let mut named = Node::scalar(1u8);
        named.set_name(Some("stray".into()));
        let array = Node::from_elements([named]);
        assert_eq!(array.children()[0].name(), None);
    }
}
