//! Person records and their tree mapping.
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::mapping::{member, optional_member, Members, Populate, Project};
use crate::node::Node;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Address {
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PhoneType {
    #[default]
    Home,
    Office,
    Mobile,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PhoneNumber {
    pub kind: PhoneType,
    pub number: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PersonBase {
    pub first_name: String,
    pub last_name: String,
    pub is_alive: bool,
    pub age: u32,
    pub address: Address,
    pub phone_numbers: Vec<PhoneNumber>,
}

/// A person with family. Serialized flat: the base fields, then `children`
/// and `spouse` at the same level.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Person {
    pub base: PersonBase,
    pub children: Vec<PersonBase>,
    pub spouse: Option<PersonBase>,
}

// ————————————————————————————————————————————————————————————————————————————
// ENUMERATION
// ————————————————————————————————————————————————————————————————————————————

impl PhoneType {
    pub const ALL: [PhoneType; 3] = [PhoneType::Home, PhoneType::Office, PhoneType::Mobile];

    pub fn as_str(self) -> &'static str {
        match self {
            PhoneType::Home => "home",
            PhoneType::Office => "office",
            PhoneType::Mobile => "mobile",
        }
    }
}

impl fmt::Display for PhoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhoneType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PhoneType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::InvalidEnumValue {
                type_name: "phone number type",
                value: s.to_owned(),
            })
    }
}

impl Project for PhoneType {
    fn project(&self) -> Node {
        Node::scalar(self.as_str())
    }
}

impl Populate for PhoneType {
    fn populate(node: &Node) -> Result<Self> {
        node.to_text()?.parse()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// RECORDS
// ————————————————————————————————————————————————————————————————————————————

impl Project for Address {
    fn project(&self) -> Node {
        let mut members = Members::new();
        members
            .add("streetAddress", &self.street_address)
            .add("city", &self.city)
            .add("state", &self.state)
            .add("postalCode", &self.postal_code);
        members.into_node()
    }
}

impl Populate for Address {
    fn populate(node: &Node) -> Result<Self> {
        Ok(Self {
            street_address: member(node, "streetAddress")?,
            city: member(node, "city")?,
            state: member(node, "state")?,
            postal_code: member(node, "postalCode")?,
        })
    }
}

impl Project for PhoneNumber {
    fn project(&self) -> Node {
        let mut members = Members::new();
        members.add("type", &self.kind).add("number", &self.number);
        members.into_node()
    }
}

impl Populate for PhoneNumber {
    fn populate(node: &Node) -> Result<Self> {
        Ok(Self {
            kind: member(node, "type")?,
            number: member(node, "number")?,
        })
    }
}

impl PersonBase {
    /// Writes the base fields, in declared order, into `members`.
    pub fn project_members(&self, members: &mut Members) {
        members
            .add("firstName", &self.first_name)
            .add("lastName", &self.last_name)
            .add("isAlive", &self.is_alive)
            .add("age", &self.age)
            .add("address", &self.address)
            .add("phoneNumbers", &self.phone_numbers);
    }
}

impl Project for PersonBase {
    fn project(&self) -> Node {
        let mut members = Members::new();
        self.project_members(&mut members);
        members.into_node()
    }
}

impl Populate for PersonBase {
    fn populate(node: &Node) -> Result<Self> {
        Ok(Self {
            first_name: member(node, "firstName")?,
            last_name: member(node, "lastName")?,
            is_alive: member(node, "isAlive")?,
            age: member(node, "age")?,
            address: member(node, "address")?,
            phone_numbers: member(node, "phoneNumbers")?,
        })
    }
}

impl Project for Person {
    fn project(&self) -> Node {
        let mut members = Members::new();
        self.base.project_members(&mut members);
        members
            .add("children", &self.children)
            .add("spouse", &self.spouse);
        members.into_node()
    }
}

impl Populate for Person {
    fn populate(node: &Node) -> Result<Self> {
        let base = PersonBase::populate(node)?;
        Ok(Self {
            base,
            children: member(node, "children")?,
            spouse: optional_member(node, "spouse")?,
        })
    }
}

/// The reference person used by the CLI, the HTTP catalog and the tests.
pub fn john_smith() -> Person {
    Person {
        base: PersonBase {
            first_name: "John".into(),
            last_name: "Smith".into(),
            is_alive: true,
            age: 27,
            address: Address {
                street_address: "21 2nd Street".into(),
                city: "New York".into(),
                state: "NY".into(),
                postal_code: "10021-3100".into(),
            },
            phone_numbers: vec![
                PhoneNumber { kind: PhoneType::Home, number: "212 555-1234".into() },
                PhoneNumber { kind: PhoneType::Office, number: "646 555-4567".into() },
                PhoneNumber { kind: PhoneType::Mobile, number: "123 456-7890".into() },
            ],
        },
        children: Vec::new(),
        spouse: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Category;

    fn names(node: &Node) -> Vec<&str> {
        node.children().iter().filter_map(Node::name).collect()
    }

    #[test]
    fn person_members_are_flat_and_ordered() {
        let node = john_smith().project();
        assert_eq!(
            names(&node),
            vec![
                "firstName",
                "lastName",
                "isAlive",
                "age",
                "address",
                "phoneNumbers",
                "children",
                "spouse"
            ]
        );
        assert_eq!(node.get_member("children").unwrap().category(), Category::Array);
        assert!(node.get_member("spouse").unwrap().is_null());
    }

    #[test]
    fn phone_type_accepts_only_known_names() {
        for kind in PhoneType::ALL {
            assert_eq!(kind.as_str().parse::<PhoneType>().unwrap(), kind);
        }
        assert_eq!(
            "Home".parse::<PhoneType>().unwrap_err(),
            Error::InvalidEnumValue {
                type_name: "phone number type",
                value: "Home".into()
            }
        );
    }

    #[test]
    fn person_round_trips_through_the_tree() {
        let mut person = john_smith();
        let mut child = person.base.clone();
        child.first_name = "Ann".into();
        child.age = 3;
        child.phone_numbers.clear();
        person.children.push(child);
        person.spouse = Some(PersonBase {
            first_name: "Jane".into(),
            ..person.base.clone()
        });

        let back = Person::populate(&person.project()).unwrap();
        assert_eq!(back, person);
    }

    #[test]
    fn omitted_spouse_populates_as_absent() {
        let mut node = john_smith().base.project();
        node.push_member("children", Node::array()).unwrap();
        let person = Person::populate(&node).unwrap();
        assert_eq!(person.spouse, None);
    }
}
