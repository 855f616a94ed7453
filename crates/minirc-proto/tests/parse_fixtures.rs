//! Wire-level fixtures for parsing and serialization.

use minirc_proto::{Message, Response};

#[test]
fn parses_client_registration_lines() {
    let nick = Message::parse("NICK alice\r\n");
    assert_eq!(nick.command, "nick");
    assert_eq!(nick.arg(0), Some("alice"));

    let user = Message::parse("USER alice 0 * :Alice Liddell\r\n");
    assert_eq!(user.command, "user");
    assert_eq!(user.args, vec!["alice", "0", "*"]);
    assert_eq!(user.trailing, "Alice Liddell");
}

#[test]
fn parses_channel_commands() {
    let topic = Message::parse("TOPIC #rust :Ownership: the basics");
    assert_eq!(topic.command, "topic");
    assert_eq!(topic.args, vec!["#rust"]);
    assert_eq!(topic.trailing, "Ownership: the basics");

    let part = Message::parse("PART #rust");
    assert_eq!(part.args, vec!["#rust"]);
    assert!(part.trailing.is_empty());
}

#[test]
fn numeric_reply_serializes_with_three_digits() {
    let reply = Message::new(Response::RPL_WELCOME.to_string())
        .with_prefix("irc.example.net")
        .with_arg("alice")
        .with_trailing("Welcome to the Internet Relay Network alice!alice@127.0.0.1");

    assert_eq!(
        reply.to_wire(),
        ":irc.example.net 001 alice :Welcome to the Internet Relay Network alice!alice@127.0.0.1\r\n"
    );
}

#[test]
fn serialized_reply_parses_back() {
    let reply = Message::new("privmsg")
        .with_prefix("alice!alice@10.0.0.1")
        .with_arg("bob")
        .with_trailing("see http://example.com: now");

    assert_eq!(Message::parse(&reply.to_wire()), reply);
}
