use serde_json::Value;

/// A classified claim value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// The raw value was a plain string.
    StringValue(String),
    /// The raw value referenced another entity by id.
    EntityRef(String),
    /// Anything else: dates, monolingual text and similar structures.
    StructuredLiteral {
        time: Option<String>,
        text: Option<String>,
    },
}

impl Claim {
    /// Classify a raw datavalue.
    ///
    /// Order is fixed: plain string first, then anything carrying an `id`,
    /// then the structured-literal fallback. Returns `None` when an `id`
    /// field is present but is not a string.
    pub fn classify(raw: &Value) -> Option<Self> {
        if let Value::String(s) = raw {
            return Some(Claim::StringValue(s.clone()));
        }
        if let Some(id) = raw.get("id") {
            return id.as_str().map(|id| Claim::EntityRef(id.to_string()));
        }
        let field = |name: &str| raw.get(name).and_then(Value::as_str).map(str::to_string);
        Some(Claim::StructuredLiteral {
            time: field("time"),
            text: field("text"),
        })
    }

    /// The value as shown to the user, if it needs no lookup.
    /// Structured literals prefer `time` over `text`.
    pub fn display(&self) -> Option<String> {
        match self {
            Claim::StringValue(s) => Some(s.clone()),
            Claim::EntityRef(_) => None,
            Claim::StructuredLiteral { time, text } => time.clone().or_else(|| text.clone()),
        }
    }
}
