//! Integration tests for body resolution over provider and raw fixtures.

use std::path::Path;

use mailreply::parser::source::load_message;
use mailreply::preview::build_preview;
use mailreply::{resolve, resolve_required, resolve_with, BodyKind, MailError, ResolveOptions};

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

// ─── Test 1: nested mixed/alternative provider message → plain part ──

#[test]
fn test_nested_provider_message_prefers_plain() {
    let parsed = load_message(fixture("nested.json")).unwrap();
    assert_eq!(parsed.original.id, "18f3a");
    assert_eq!(parsed.original.thread_id, "18f30");

    let body = resolve_with(&parsed.root, &ResolveOptions::default()).unwrap();
    assert_eq!(body.kind, BodyKind::Plain);
    assert_eq!(body.text, "1. Budget\r\n2. Hiring\r\n");
}

// ─── Test 2: HTML-only message → last HTML rendition, unstripped ─────

#[test]
fn test_html_only_returns_last_html() {
    let parsed = load_message(fixture("html_only.json")).unwrap();
    let body = resolve_with(&parsed.root, &ResolveOptions::default()).unwrap();
    assert_eq!(body.kind, BodyKind::Html);
    assert_eq!(body.text, "<p>Digest &amp; links</p>");
}

// ─── Test 3: attachments only → empty / NoBodyFound ──────────────────

#[test]
fn test_attachment_only_has_no_body() {
    let parsed = load_message(fixture("no_body.json")).unwrap();
    assert_eq!(resolve(&parsed.root), "");

    let err = resolve_required(&parsed.root, &ResolveOptions { strict: true }).unwrap_err();
    assert!(matches!(err, MailError::NoBodyFound));
}

// ─── Test 4: raw .eml with quoted-printable Latin-1 plain part ───────

#[test]
fn test_raw_message_plain_part() {
    let parsed = load_message(fixture("thread_reply.eml")).unwrap();
    let text = resolve(&parsed.root);
    assert!(
        text.starts_with("See you at the café at noon."),
        "unexpected body: {text:?}"
    );
}

// ─── Test 5: raw .eml headers and ids ────────────────────────────────

#[test]
fn test_raw_message_headers() {
    let parsed = load_message(fixture("thread_reply.eml")).unwrap();
    assert_eq!(parsed.original.id, "msg-002@example.net");
    assert_eq!(parsed.original.thread_id, "msg-001@example.com");
    assert_eq!(parsed.original.headers.get("subject"), Some("Café plans"));
    assert_eq!(
        parsed.original.headers.get("from"),
        Some("Carol <carol@example.net>")
    );
}

// ─── Test 6: previews use placeholders when content is missing ───────

#[test]
fn test_previews() {
    let config = mailreply::config::PreviewConfig::default();
    let options = ResolveOptions::default();

    let nested = load_message(fixture("nested.json")).unwrap();
    let p = build_preview(
        &nested.original.id,
        &nested.original.headers,
        &nested.root,
        &options,
        &config,
    );
    assert_eq!(p.subject, "Agenda for Thursday");
    assert!(p.body.starts_with("1. Budget"));

    let empty = load_message(fixture("no_body.json")).unwrap();
    let p = build_preview(
        &empty.original.id,
        &empty.original.headers,
        &empty.root,
        &options,
        &config,
    );
    assert_eq!(p.subject, "Scan");
    assert_eq!(p.body, "No body content");
}
