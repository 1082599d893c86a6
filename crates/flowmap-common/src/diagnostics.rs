#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub message: &'static str,
}

pub mod diagnostic_codes {
    pub const MAPPED_TYPE_SOURCE_INCOMPATIBLE_WITH_KEY_TYPES: u32 = 4101;
    pub const MAPPED_TYPE_MULTIPLE_INDEXER_KINDS: u32 = 4102;
    pub const MAPPED_TYPE_EXPANSION_TOO_DEEP: u32 = 4103;
    pub const MAPPED_TYPE_TOO_MANY_KEYS: u32 = 4104;
}

pub mod diagnostic_messages {
    use super::{DiagnosticMessage, diagnostic_codes as dc};

    pub const MAPPED_TYPE_SOURCE_INCOMPATIBLE_WITH_KEY_TYPES: DiagnosticMessage =
        DiagnosticMessage {
            code: dc::MAPPED_TYPE_SOURCE_INCOMPATIBLE_WITH_KEY_TYPES,
            message: "`{0}` is incompatible with `string | number | symbol`.",
        };

    pub const MAPPED_TYPE_MULTIPLE_INDEXER_KINDS: DiagnosticMessage = DiagnosticMessage {
        code: dc::MAPPED_TYPE_MULTIPLE_INDEXER_KINDS,
        message: "Cannot produce a `{1}` indexer for this mapped type because it already has a `{0}` indexer.",
    };

    pub const MAPPED_TYPE_EXPANSION_TOO_DEEP: DiagnosticMessage = DiagnosticMessage {
        code: dc::MAPPED_TYPE_EXPANSION_TOO_DEEP,
        message: "Mapped type expansion is excessively deep (depth {0}) and possibly infinite.",
    };

    pub const MAPPED_TYPE_TOO_MANY_KEYS: DiagnosticMessage = DiagnosticMessage {
        code: dc::MAPPED_TYPE_TOO_MANY_KEYS,
        message: "Mapped type produces {0} keys, more than the supported maximum of {1}.",
    };
}

pub const DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    diagnostic_messages::MAPPED_TYPE_SOURCE_INCOMPATIBLE_WITH_KEY_TYPES,
    diagnostic_messages::MAPPED_TYPE_MULTIPLE_INDEXER_KINDS,
    diagnostic_messages::MAPPED_TYPE_EXPANSION_TOO_DEEP,
    diagnostic_messages::MAPPED_TYPE_TOO_MANY_KEYS,
];

pub fn get_message_template(code: u32) -> Option<&'static str> {
    DIAGNOSTIC_MESSAGES
        .iter()
        .find(|m| m.code == code)
        .map(|m| m.message)
}

pub fn format_message(message: &str, args: &[&str]) -> String {
    let mut result = message.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod tests;
