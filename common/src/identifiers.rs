use std::fmt;

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: String) -> Self {
                Self(id)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(ClientId);

pub const DEFAULT_CLIENT_ID: &str = "default";

impl Default for ClientId {
    fn default() -> Self {
        Self(DEFAULT_CLIENT_ID.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_id_conversions() {
        let id = ClientId::from("browser-1");

        assert_eq!(id.as_str(), "browser-1");
        assert_eq!(id.to_string(), "browser-1");
        assert_eq!(String::from(id), "browser-1");
        assert_eq!(ClientId::default().as_str(), DEFAULT_CLIENT_ID);
    }
}
