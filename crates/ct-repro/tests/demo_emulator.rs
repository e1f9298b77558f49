//! The demo script end to end. Needs Docker and the emulator image:
//! `cargo test -p ct-repro --features emulator-tests -- --test-threads=1`

#![cfg(feature = "emulator-tests")]

use clap::Parser;
use ct_repro::{Cli, InsertTimestamps, UpdateTimestamps};
use spanner_emulator::Error;

fn settings(args: &[&str]) -> ct_repro::Settings {
    let cli = Cli::try_parse_from(std::iter::once("ct-repro").chain(args.iter().copied()))
        .expect("arguments");
    cli.settings().expect("settings")
}

#[tokio::test]
async fn inline_commit_timestamp_update_succeeds() {
    let settings = settings(&["--update-timestamps", "inline", "--keep-running"]);
    assert_eq!(settings.demo.update, UpdateTimestamps::Inline);

    let machine = ct_repro::run(settings)
        .await
        .expect("bootstrap")
        .expect("demo");
    assert_eq!(machine.instance_name, "instance-name");
    assert!(machine.created_on.is_some());
}

#[tokio::test]
async fn function_text_bound_as_parameter_is_rejected() {
    let settings = settings(&["--keep-running"]);
    assert_eq!(settings.demo.insert, InsertTimestamps::Fixed);

    let outcome = ct_repro::run(settings).await.expect("bootstrap");
    match outcome {
        Err(Error::Api { .. }) => {}
        other => panic!("expected the update to be rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn commit_timestamp_insert_round_trips() {
    let settings = settings(&[
        "--insert-timestamps",
        "commit-timestamp",
        "--update-timestamps",
        "inline",
    ]);

    let machine = ct_repro::run(settings)
        .await
        .expect("bootstrap")
        .expect("demo");
    assert!(machine.created_on.is_some_and(|t| t.timestamp() > 0));
}
