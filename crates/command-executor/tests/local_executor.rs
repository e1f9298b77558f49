//! Tests for local command execution

use command_executor::{
    Command, Error, Executor, Launcher, LocalLauncher, ProcessEventType, ProcessHandle,
};
use futures::StreamExt;

#[test]
fn test_execute_captures_stdout() {
    smol::block_on(async {
        let executor = Executor::local("test-echo");
        let cmd = Command::builder("echo").arg("hello world").build();

        let result = executor.execute(cmd).await.unwrap();

        assert!(result.success());
        assert_eq!(result.output.trim(), "hello world");
    });
}

#[test]
fn test_execute_captures_stderr_and_exit_code() {
    smol::block_on(async {
        let executor = Executor::local("test-fail");
        let cmd = Command::builder("sh")
            .arg("-c")
            .arg("echo 'No such container: emu' >&2; exit 1")
            .build();

        let result = executor.execute(cmd).await.unwrap();

        assert!(!result.success());
        assert_eq!(result.status.code, Some(1));
        assert!(result.output.contains("No such container"));
    });
}

#[test]
fn test_env_and_working_directory() {
    smol::block_on(async {
        let executor = Executor::local("test-env");
        let cmd = Command::builder("sh")
            .arg("-c")
            .arg("echo $EMULATOR_NAME; pwd")
            .env("EMULATOR_NAME", "spanner-emulator")
            .current_dir("/")
            .build();

        let result = executor.execute(cmd).await.unwrap();
        let lines: Vec<&str> = result.output.lines().collect();

        assert_eq!(lines, vec!["spanner-emulator", "/"]);
    });
}

#[test]
fn test_missing_program_is_spawn_error() {
    smol::block_on(async {
        let executor = Executor::local("test-missing");
        let cmd = Command::new("definitely-not-a-real-container-runtime");

        let err = executor.execute(cmd).await.unwrap_err();

        match err {
            Error::SpawnFailed { program, .. } => {
                assert_eq!(program, "definitely-not-a-real-container-runtime")
            }
            other => panic!("expected spawn failure, got {other:?}"),
        }
    });
}

#[smol_potat::test]
async fn test_launch_emits_started_then_lines() {
    let cmd = Command::builder("printf").arg("a\\nb\\n").build();
    let (events, mut handle) = LocalLauncher.launch(cmd).await.unwrap();

    assert!(handle.pid().is_some());

    let events: Vec<_> = events.collect().await;
    assert!(matches!(
        events[0].event_type,
        ProcessEventType::Started { .. }
    ));
    let lines: Vec<_> = events[1..]
        .iter()
        .filter_map(|e| e.data.clone())
        .collect();
    assert_eq!(lines, vec!["a".to_string(), "b".to_string()]);

    let status = handle.wait().await.unwrap();
    assert!(status.success());
}
