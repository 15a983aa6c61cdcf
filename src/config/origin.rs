use serde::{Deserialize, Serialize};

/// Where the current value of a configuration entry comes from.
///
/// Ordered by precedence: an input only replaces the current value when its
/// origin is strictly higher. `Error` ranks above everything, which makes it
/// sticky.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Origin {
    /// Built-in value
    #[default]
    Default = 0,
    /// Read from a configuration file
    File = 1,
    /// Restored from a json snapshot
    Load = 2,
    /// Provided by an environment variable
    Environment = 3,
    /// Set by code
    Override = 4,
    /// Built-in value that cannot be changed
    Constant = 5,
    /// Last input failed to parse
    Error = 10,
}

impl Origin {
    /// Tag shown in front of each row when printing to a terminal
    pub fn prefix(self) -> &'static str {
        match self {
            Origin::Default => "[D] ",
            Origin::File => "[F] ",
            Origin::Load => "[L] ",
            Origin::Environment => "[E] ",
            Origin::Override => "[O] ",
            Origin::Constant => "[C] ",
            Origin::Error => "[!] ",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_orders_by_precedence() {
        assert!(Origin::Default < Origin::File);
        assert!(Origin::File < Origin::Load);
        assert!(Origin::Load < Origin::Environment);
        assert!(Origin::Environment < Origin::Override);
        assert!(Origin::Override < Origin::Constant);
        assert!(Origin::Constant < Origin::Error);
    }

    #[test]
    fn it_has_same_width_prefixes() {
        assert_eq!(Origin::Default.prefix(), "[D] ");
        assert_eq!(Origin::Error.prefix(), "[!] ");
        assert_eq!(Origin::Environment.prefix().len(), 4);
    }
}
