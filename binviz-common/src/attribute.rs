use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Value type of an attribute, used when literals are rendered into predicates
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    #[default]
    Float,
    Int,
    String,
    Boolean,
    Date,
    DateTime,
}

impl AttributeType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, AttributeType::Float | AttributeType::Int)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, AttributeType::Date | AttributeType::DateTime)
    }
}

/// Identity of an attribute. Two attributes are the same attribute
/// exactly when their ids are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeId {
    Column(String),
    Backend(String),
    Code(String),
}

/// A named, typed data column or derived field
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Attribute {
    /// Raw column of the dataset
    Column {
        raw_name: String,
        #[serde(default)]
        data_type: AttributeType,
    },
    /// Field computed by the analytics backend
    Backend {
        id: String,
        display_name: String,
        #[serde(default)]
        data_type: AttributeType,
    },
    /// Field computed from user supplied code
    Code {
        code_name: String,
        code: String,
        #[serde(default)]
        data_type: AttributeType,
    },
}

impl Attribute {
    pub fn column(raw_name: impl Into<String>, data_type: AttributeType) -> Self {
        Attribute::Column {
            raw_name: raw_name.into(),
            data_type,
        }
    }

    pub fn backend(
        id: impl Into<String>,
        display_name: impl Into<String>,
        data_type: AttributeType,
    ) -> Self {
        Attribute::Backend {
            id: id.into(),
            display_name: display_name.into(),
            data_type,
        }
    }

    pub fn code(
        code_name: impl Into<String>,
        code: impl Into<String>,
        data_type: AttributeType,
    ) -> Self {
        Attribute::Code {
            code_name: code_name.into(),
            code: code.into(),
            data_type,
        }
    }

    pub fn id(&self) -> AttributeId {
        match self {
            Attribute::Column { raw_name, .. } => AttributeId::Column(raw_name.clone()),
            Attribute::Backend { id, .. } => AttributeId::Backend(id.clone()),
            Attribute::Code { code_name, .. } => AttributeId::Code(code_name.clone()),
        }
    }

    pub fn data_type(&self) -> AttributeType {
        match self {
            Attribute::Column { data_type, .. }
            | Attribute::Backend { data_type, .. }
            | Attribute::Code { data_type, .. } => *data_type,
        }
    }

    /// Name shown in axis labels
    pub fn display_name(&self) -> &str {
        match self {
            Attribute::Column { raw_name, .. } => raw_name,
            Attribute::Backend { display_name, .. } => display_name,
            Attribute::Code { code_name, .. } => code_name,
        }
    }

    /// Identifier used when the attribute appears in a predicate expression
    pub fn expression_name(&self) -> &str {
        match self {
            Attribute::Column { raw_name, .. } => raw_name,
            Attribute::Backend { id, .. } => id,
            Attribute::Code { code_name, .. } => code_name,
        }
    }

    /// Backend and code attributes are calculated and live in the registry
    pub fn is_calculated(&self) -> bool {
        !matches!(self, Attribute::Column { .. })
    }
}

impl PartialEq for Attribute {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Attribute {}

impl Hash for Attribute {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state)
    }
}
