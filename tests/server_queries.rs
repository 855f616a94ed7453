//! Integration tests for MOTD, LUSERS, WHOIS and private messages.

mod common;

use common::TestServer;

#[tokio::test]
async fn motd_file_is_served() {
    let server = TestServer::spawn_with_motd(Some("Welcome aboard\nBe kind\n"))
        .await
        .expect("spawn server");
    let mut client = server.connect("alice").await.unwrap();

    let burst = client.register().await.unwrap();
    let motd: Vec<&str> = burst
        .iter()
        .filter(|m| m.command == "376")
        .map(|m| m.trailing.as_str())
        .collect();
    assert_eq!(motd, vec!["- Welcome aboard", "- Be kind"]);

    client.send_raw("MOTD").await.unwrap();
    let again = client.recv_command("377").await.unwrap();
    assert_eq!(again.len(), 4);
    assert_eq!(again[0].command, "375");
}

#[tokio::test]
async fn missing_motd() {
    let server = TestServer::spawn().await.expect("spawn server");
    let mut client = server.connect_registered("alice").await.unwrap();

    client.send_raw("MOTD").await.unwrap();
    let reply = client.recv().await.unwrap();
    assert_eq!(reply.command, "422");
}

#[tokio::test]
async fn nick_collision_is_refused() {
    let server = TestServer::spawn().await.expect("spawn server");
    let _alice = server.connect_registered("alice").await.unwrap();

    let mut other = server.connect("alice").await.unwrap();
    other.send_raw("NICK alice").await.unwrap();
    let reply = other.recv().await.unwrap();
    assert_eq!(reply.command, "433");
    assert_eq!(reply.args, vec!["*", "alice"]);
}

#[tokio::test]
async fn lusers_and_whois() {
    let server = TestServer::spawn().await.expect("spawn server");
    let mut alice = server.connect_registered("alice").await.unwrap();
    let _bob = server.connect_registered("bob").await.unwrap();

    alice.send_raw("LUSERS").await.unwrap();
    let lusers = alice.recv_command("255").await.unwrap();
    assert_eq!(lusers[0].command, "251");
    assert_eq!(
        lusers[0].trailing,
        "There are 2 users and 0 services on 1 servers"
    );

    alice.send_raw("WHOIS bob").await.unwrap();
    let whois = alice.recv_command("318").await.unwrap();
    assert_eq!(whois[0].command, "311");
    assert_eq!(whois[0].args, vec!["alice", "bob", "bob", "127.0.0.1", "*"]);
    assert_eq!(whois[0].trailing, "Test User bob");
    assert_eq!(whois[1].args, vec!["alice", "bob", "test.server"]);
}

#[tokio::test]
async fn private_messages() {
    let server = TestServer::spawn().await.expect("spawn server");
    let mut alice = server.connect_registered("alice").await.unwrap();
    let mut bob = server.connect_registered("bob").await.unwrap();

    alice.privmsg("bob", "psst").await.unwrap();
    let msg = bob.recv().await.unwrap();
    assert_eq!(msg.command, "privmsg");
    assert_eq!(msg.prefix, "alice!alice@127.0.0.1");
    assert_eq!(msg.trailing, "psst");

    alice.privmsg("nobody", "hello?").await.unwrap();
    let err = alice.recv().await.unwrap();
    assert_eq!(err.command, "401");
}
