use crate::Value;

/// The scalar types a [`Shape`](crate::Shape) can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// `bool`
    Bool,
    /// `i64`
    I64,
    /// `f64`
    F64,
    /// `String`
    String,
}

impl ScalarType {
    /// The identifier used when rendering a shape of this scalar.
    pub const fn type_identifier(self) -> &'static str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::I64 => "i64",
            ScalarType::F64 => "f64",
            ScalarType::String => "String",
        }
    }

    /// The value a freshly allocated slot of this scalar holds.
    ///
    /// Strings have no zero value and start out as [`Value::Null`].
    pub fn default_value(self) -> Value {
        match self {
            ScalarType::Bool => Value::Bool(false),
            ScalarType::I64 => Value::Int(0),
            ScalarType::F64 => Value::Float(0.0),
            ScalarType::String => Value::Null,
        }
    }
}
