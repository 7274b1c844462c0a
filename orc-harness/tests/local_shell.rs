//! Integration tests against a real local shell.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use orc_harness::error::ChannelError;
use orc_harness::{Error, ExpectOptions, Pattern, PingOptions, SwitchBuilder};

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn echo_round_trip_matches_index_zero() {
    let mut switch = SwitchBuilder::new().spawn().unwrap();

    switch.send_line("echo ORC IS GREAT").unwrap();
    let outcome = switch
        .expect(&[Pattern::literal("ORC IS GREAT")], ExpectOptions::new())
        .await
        .unwrap();
    assert_eq!(outcome.index(), Some(0));

    switch.close().unwrap();
}

#[tokio::test]
async fn test_channel_on_local_shell() {
    let mut switch = SwitchBuilder::new().timeout(Duration::from_secs(10)).spawn().unwrap();
    assert!(switch.is_local());
    assert_eq!(switch.name(), "local");
    assert!(switch.test_channel().await.unwrap());
    switch.close().unwrap();
}

#[tokio::test]
async fn test_channel_right_after_spawn_and_again() {
    // The first command goes in before the shell has drawn its prompt
    let mut switch = SwitchBuilder::new().timeout(Duration::from_secs(10)).spawn().unwrap();
    assert!(switch.test_channel().await.unwrap());
    assert!(switch.test_channel().await.unwrap());
    switch.close().unwrap();
}

#[tokio::test]
async fn tab_and_carriage_return_reach_literal_patterns() {
    let mut switch = SwitchBuilder::new().timeout(Duration::from_secs(10)).spawn().unwrap();

    // The terminal turns the newline into CRLF
    switch.send_line("printf 'a\\tb\\n'").unwrap();
    let outcome = switch
        .expect(&[Pattern::literal("a\tb\r\n")], ExpectOptions::new())
        .await
        .unwrap();
    assert_eq!(outcome.index(), Some(0));

    switch.close().unwrap();
}

#[tokio::test]
async fn ping_unroutable_address_fails_within_timeout() {
    let mut switch = SwitchBuilder::new().spawn().unwrap();

    let start = Instant::now();
    let options = PingOptions::default().with_timeout(Duration::from_secs(1));
    assert!(!switch.ping_with("255.255.255.0", &options).await.unwrap());
    assert!(start.elapsed() < Duration::from_secs(5));

    switch.close().unwrap();
}

#[tokio::test]
#[ignore = "needs network egress to 8.8.8.8"]
async fn ping_google_is_reachable() {
    let mut switch = SwitchBuilder::new().spawn().unwrap();
    assert!(switch.ping("8.8.8.8").await.unwrap());
    switch.close().unwrap();
}

#[tokio::test]
async fn verbose_mode_traces_without_changing_result() {
    let trace = Captured::default();
    let mut switch = SwitchBuilder::new()
        .verbose(true)
        .trace_to(Box::new(trace.clone()))
        .timeout(Duration::from_secs(10))
        .spawn()
        .unwrap();

    assert!(switch.test_channel().await.unwrap());
    switch.close().unwrap();

    let text = trace.text();
    assert!(text.contains("local << echo ORC IS GREAT"));
    assert!(text.contains("local !! echo ORC IS GREAT"));
    assert!(text.contains("local !! ORC IS GREAT"));
    assert!(text.contains("local >> echo ORC IS GREAT"));
    // Output line, possibly behind the first prompt
    assert!(text.lines().any(|line| {
        line.starts_with("local >> ") && line.ends_with("ORC IS GREAT") && !line.contains("echo")
    }));
}

#[tokio::test]
async fn transcript_sink_records_session() {
    let transcript = Captured::default();
    let mut switch = SwitchBuilder::new()
        .log_sink(Box::new(transcript.clone()))
        .timeout(Duration::from_secs(10))
        .spawn()
        .unwrap();

    assert!(switch.test_channel().await.unwrap());
    switch.close().unwrap();

    let text = transcript.text();
    assert!(text.contains("echo ORC IS GREAT\n"));
    assert!(text.matches("ORC IS GREAT").count() >= 2);
}

#[tokio::test]
async fn close_twice_then_operations_fail() {
    let mut switch = SwitchBuilder::new().spawn().unwrap();
    switch.close().unwrap();
    switch.close().unwrap();

    let err = switch.send_line("echo hi").unwrap_err();
    assert!(matches!(err, Error::Channel(ChannelError::Closed)));
}

#[tokio::test]
async fn shell_exit_reports_end_of_stream() {
    let mut switch = SwitchBuilder::new().timeout(Duration::from_secs(10)).spawn().unwrap();

    switch.send_line("exit").unwrap();
    let outcome = switch
        .expect(&[Pattern::literal("never printed"), Pattern::EndOfStream], ExpectOptions::new())
        .await
        .unwrap();
    assert_eq!(outcome.index(), Some(1));

    switch.close().unwrap();
}
