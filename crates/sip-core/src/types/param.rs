//! URI and header parameters (`;key=value` / `;key`), RFC 3261 §25.1.

use std::fmt;

use ordered_float::NotNan;
use serde::{Deserialize, Serialize};

/// A single parameter. Named variants exist for the handful of parameters
/// this core inspects by name (`transport`, `tag`, `branch`, `q`, `expires`,
/// `lr`); everything else is `Other`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Param {
    Transport(String),
    Tag(String),
    Branch(String),
    Received(String),
    Rport(Option<u16>),
    Expires(u32),
    Q(NotNan<f32>),
    Lr,
    /// Flag parameter with no value (e.g. `;lr` spelled as a bare token
    /// the caller doesn't otherwise recognize).
    Flag(String),
    Other(String, Option<String>),
}

impl Param {
    pub fn transport(value: impl Into<String>) -> Self {
        Param::Transport(value.into())
    }

    pub fn tag(value: impl Into<String>) -> Self {
        Param::Tag(value.into())
    }

    pub fn name_value_pair(&self) -> (String, String) {
        match self {
            Param::Transport(v) => ("transport".into(), v.clone()),
            Param::Tag(v) => ("tag".into(), v.clone()),
            Param::Branch(v) => ("branch".into(), v.clone()),
            Param::Received(v) => ("received".into(), v.clone()),
            Param::Rport(Some(v)) => ("rport".into(), v.to_string()),
            Param::Rport(None) => ("rport".into(), String::new()),
            Param::Expires(v) => ("expires".into(), v.to_string()),
            Param::Q(v) => ("q".into(), format!("{:.3}", v.into_inner())),
            Param::Lr => ("lr".into(), String::new()),
            Param::Flag(name) => (name.clone(), String::new()),
            Param::Other(name, Some(v)) => (name.clone(), v.clone()),
            Param::Other(name, None) => (name.clone(), String::new()),
        }
    }

    pub fn as_transport(&self) -> Option<&str> {
        match self {
            Param::Transport(v) => Some(v.as_str()),
            Param::Other(name, Some(v)) if name.eq_ignore_ascii_case("transport") => {
                Some(v.as_str())
            }
            _ => None,
        }
    }

    pub fn named_value(&self, name: &str) -> Option<&str> {
        let (n, _) = (self.name_value_pair().0, ());
        if n.eq_ignore_ascii_case(name) {
            match self {
                Param::Other(_, v) => v.as_deref(),
                Param::Transport(v) | Param::Tag(v) | Param::Branch(v) | Param::Received(v) => {
                    Some(v.as_str())
                }
                _ => None,
            }
        } else {
            None
        }
    }

    /// Parses one `key[=value]` segment into the most specific known
    /// variant, falling back to `Other`.
    pub fn parse_one(key: &str, value: Option<&str>) -> Param {
        match key.to_ascii_lowercase().as_str() {
            "transport" => Param::Transport(value.unwrap_or_default().to_string()),
            "tag" => Param::Tag(value.unwrap_or_default().to_string()),
            "branch" => Param::Branch(value.unwrap_or_default().to_string()),
            "received" => Param::Received(value.unwrap_or_default().to_string()),
            "rport" => Param::Rport(value.and_then(|v| v.parse().ok())),
            "expires" => value
                .and_then(|v| v.parse().ok())
                .map(Param::Expires)
                .unwrap_or_else(|| Param::Other(key.to_string(), value.map(str::to_string))),
            "q" => value
                .and_then(|v| v.parse::<f32>().ok())
                .and_then(|v| NotNan::new(v).ok())
                .map(Param::Q)
                .unwrap_or_else(|| Param::Other(key.to_string(), value.map(str::to_string))),
            "lr" if value.is_none() => Param::Lr,
            _ => match value {
                Some(v) => Param::Other(key.to_string(), Some(v.to_string())),
                None => Param::Flag(key.to_string()),
            },
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, value) = self.name_value_pair();
        match self {
            Param::Lr | Param::Flag(_) => write!(f, "{name}"),
            Param::Rport(None) => write!(f, "rport"),
            _ => write!(f, "{name}={value}"),
        }
    }
}
