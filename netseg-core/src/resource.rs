//! Resource - Declarations handed to the orchestration engine

use std::collections::HashMap;
use std::fmt;

/// Subnet resource type
pub const SUBNET: &str = "ec2_subnet";
/// Route table resource type
pub const ROUTE_TABLE: &str = "ec2_route_table";
/// Subnet / route table association resource type
pub const SUBNET_ROUTE_TABLE_ASSOCIATION: &str = "ec2_subnet_route_table_association";
/// Individual route resource type
pub const ROUTE: &str = "ec2_route";

/// Unique identifier for a resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId {
    /// Resource type (e.g., "ec2_subnet", "ec2_route")
    pub resource_type: String,
    /// Resource name, derived from the construct name (e.g., "app.subnet")
    pub name: String,
}

impl ResourceId {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }
}

/// Displays as `type[name]`; names themselves contain dots.
impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.resource_type, self.name)
    }
}

/// Attribute value of a resource
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Bool(bool),
    List(Vec<Value>),
    Map(HashMap<String, Value>),
    /// Reference to another resource's attribute (resource name, attribute name)
    ResourceRef(String, String),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Reference to the identity of another resource
    pub fn id_of(id: &ResourceId) -> Self {
        Value::ResourceRef(id.name.clone(), "id".to_string())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn type_name(&self) -> String {
        match self {
            Value::String(_) => "String".to_string(),
            Value::Bool(_) => "Bool".to_string(),
            Value::List(_) => "List".to_string(),
            Value::Map(_) => "Map".to_string(),
            Value::ResourceRef(name, attr) => format!("ResourceRef({}.{})", name, attr),
        }
    }
}

/// Desired state of a single resource
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub id: ResourceId,
    pub attributes: HashMap<String, Value>,
}

impl Resource {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ResourceId::new(resource_type, name),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Sets the attribute only when a value is present
    pub fn with_optional_attribute(self, key: impl Into<String>, value: Option<Value>) -> Self {
        match value {
            Some(v) => self.with_attribute(key, v),
            None => self,
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}
