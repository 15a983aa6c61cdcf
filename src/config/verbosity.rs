use crate::models::PrettyEnum;

crate::pretty_enum! {
    /// How much of the resolved configuration is shown during setup
    pub enum Verbosity {
        /// Nothing is printed
        Quiet,
        /// The resolved configuration is printed
        Show,
        /// The resolved configuration is printed and must be acknowledged
        Paranoid,
    }
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Quiet
    }
}

/// Help string listing the accepted verbosity names
pub fn verbosity_values() -> String {
    let names: Vec<&str> = Verbosity::values().map(|v| v.name()).collect();
    format!("Valid values are: {}", names.join(" "))
}
