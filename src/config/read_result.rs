use bitflags::bitflags;

bitflags! {
    /// Problems met while reading a configuration file. They accumulate; an
    /// empty set means the file matched the declared fields exactly.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ReadResult: u8 {
        /// Reading from a different configuration file. Fatal.
        const CONFIG_FILE_TYPE_MISMATCH = 1;
        /// Line is neither a row, a comment nor a separator
        const LINE_INVALID_FORMAT = 1 << 1;
        /// Row names a field that is not declared
        const FIELD_UNKNOWN = 1 << 2;
        /// Row value could not be parsed
        const FIELD_PARSE = 1 << 3;
        /// A subconfig file could not be read cleanly
        const SUBCONFIG_FILE = 1 << 4;
        /// A declared field has no row
        const FIELD_MISSING = 1 << 5;
    }
}

impl ReadResult {
    pub const OK: Self = Self::empty();

    pub fn is_ok(self) -> bool {
        self.is_empty()
    }

    /// Whether the file drifted from the declared fields and should be rewritten
    pub fn needs_rewrite(self) -> bool {
        self.intersects(Self::FIELD_MISSING | Self::FIELD_UNKNOWN)
    }
}
