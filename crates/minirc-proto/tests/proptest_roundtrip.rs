//! Property-based tests for message parsing.
//!
//! Uses proptest to generate random message components and verify that:
//! 1. Parsing never panics on arbitrary input
//! 2. Serialized messages parse back to the same fields (roundtrip)
//! 3. Blank input never yields a command

use minirc_proto::Message;
use proptest::prelude::*;

// =============================================================================
// STRATEGIES
// =============================================================================

/// Prefix: no whitespace, not starting with a colon.
fn prefix_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        prop::string::string_regex("[a-zA-Z][a-zA-Z0-9]{0,8}![a-z]{1,8}@[a-z0-9.]{1,20}")
            .expect("valid regex"),
        prop::string::string_regex("[a-z]+(\\.[a-z]+){0,3}").expect("valid regex"),
    ]
}

/// Command word, already in the lowercased form parse produces.
fn command_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::string::string_regex("[a-z]{1,12}").expect("valid regex"),
        prop::string::string_regex("[0-9]{3}").expect("valid regex"),
    ]
}

/// Middle argument: no whitespace and no colon.
fn arg_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9#&!@*._\\-\\[\\]]{1,16}").expect("valid regex")
}

/// Trailing text: no CR/LF, no surrounding whitespace; colons and inner
/// spaces allowed.
fn trailing_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just(":".to_string()),
        Just("::".to_string()),
        Just("mixed :colon and space".to_string()),
        prop::string::string_regex("[a-zA-Z0-9:!?.,#]([a-zA-Z0-9 :!?.,#]{0,80}[a-zA-Z0-9:!?.,#])?")
            .expect("valid regex"),
    ]
}

fn message_strategy() -> impl Strategy<Value = Message> {
    (
        prefix_strategy(),
        command_strategy(),
        prop::collection::vec(arg_strategy(), 0..6),
        trailing_strategy(),
    )
        .prop_map(|(prefix, command, args, trailing)| Message {
            prefix,
            command,
            args,
            trailing,
        })
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn roundtrip_preserves_fields(msg in message_strategy()) {
        let wire = msg.to_wire();
        prop_assert!(wire.ends_with("\r\n"));
        prop_assert_eq!(Message::parse(&wire), msg);
    }

    #[test]
    fn parse_never_panics(line in "[^\r\n]{0,600}") {
        let _ = Message::parse(&line);
    }

    #[test]
    fn parsed_command_is_lowercase(line in "[A-Za-z]{1,10}( [a-z]{1,5}){0,3}") {
        let msg = Message::parse(&line);
        prop_assert_eq!(msg.command.clone(), msg.command.to_ascii_lowercase());
        prop_assert!(!msg.is_empty());
    }

    #[test]
    fn whitespace_only_is_empty(line in "[ \t]{0,20}") {
        prop_assert!(Message::parse(&line).is_empty());
    }
}
