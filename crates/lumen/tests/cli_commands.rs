use std::net::UdpSocket;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use lumen_protocol::{decode_message, MessageKind, MAX_MESSAGE_SIZE};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "lumen-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn lumen() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_lumen"));
    cmd.arg("--log-level").arg("error");
    cmd
}

fn fake_controller() -> (UdpSocket, u16) {
    let socket = UdpSocket::bind("127.0.0.1:0").expect("controller socket should bind");
    socket
        .set_read_timeout(Some(Duration::from_millis(200)))
        .expect("read timeout should apply");
    let port = socket.local_addr().expect("local addr").port();
    (socket, port)
}

fn write_config(dir: &PathBuf, port: u16, strip_extra: &str) -> PathBuf {
    let path = dir.join("config.json");
    let json = format!(
        r#"{{
  "strip": {{
    "layout": {{ "right": 2, "top": 3, "left": 2, "bottom": 3 }},
    "connection": {{ "address": "127.0.0.1", "port": {port}, "local_port": 0 }}{strip_extra}
  }}
}}"#
    );
    std::fs::write(&path, json).expect("config should be writable");
    path
}

fn drain(socket: &UdpSocket) -> Vec<MessageKind> {
    let mut buf = [0u8; MAX_MESSAGE_SIZE];
    let mut kinds = Vec::new();
    while let Ok(len) = socket.recv(&mut buf) {
        let message = decode_message(&buf[..len]).expect("runner sends valid messages");
        kinds.push(message.kind);
    }
    kinds
}

#[test]
fn version_prints_package_version() {
    let output = lumen().arg("version").output().expect("version should run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), format!("lumen {}", env!("CARGO_PKG_VERSION")));
}

#[test]
fn run_streams_configured_solid_effect() {
    let dir = unique_temp_dir("run");
    let (controller, port) = fake_controller();
    let config = write_config(
        &dir,
        port,
        r#",
    "active_effect": "solid",
    "effects": [{ "kind": "solid", "color": { "r": 255, "g": 0, "b": 0 } }]"#,
    );

    let output = lumen()
        .arg("--format")
        .arg("json")
        .arg("--config")
        .arg(&config)
        .arg("run")
        .arg("--duration")
        .arg("900ms")
        .output()
        .expect("run should start");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"effect\":\"solid\""));

    let kinds = drain(&controller);
    assert!(kinds
        .iter()
        .any(|kind| matches!(kind, MessageKind::KeepAlive { duration_ms: 1000 })));
    let frame = kinds
        .iter()
        .find_map(|kind| match kind {
            MessageKind::LedState { pixels } => Some(pixels.clone()),
            _ => None,
        })
        .expect("at least one frame should arrive");
    assert_eq!(frame.len(), 10);
    assert!(frame.iter().all(|p| (p.r, p.g, p.b) == (255, 0, 0)));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn run_falls_back_and_forgets_unbuildable_effect() {
    let dir = unique_temp_dir("fallback");
    let (controller, port) = fake_controller();
    let config = write_config(
        &dir,
        port,
        r#",
    "active_effect": "ambient",
    "effects": [
      { "kind": "ambient", "monitor": "nope", "fps": 30, "detail_level": 2, "smoothing_window": 2 },
      { "kind": "solid", "color": { "r": 1, "g": 2, "b": 3 } }
    ]"#,
    );

    let output = lumen()
        .arg("--format")
        .arg("json")
        .arg("--config")
        .arg(&config)
        .arg("run")
        .arg("--duration")
        .arg("300ms")
        .output()
        .expect("run should start");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"effect\":\"off\""));
    assert!(stdout.contains("\"fell_back\":true"));

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&config).expect("config should remain"))
            .expect("saved config should be json");
    let effects = saved["strip"]["effects"].as_array().expect("effects list");
    assert_eq!(effects.len(), 1);
    assert_eq!(effects[0]["kind"], "solid");

    let black = drain(&controller).into_iter().any(|kind| match kind {
        MessageKind::LedState { pixels } => pixels.iter().all(|p| (p.r, p.g, p.b) == (0, 0, 0)),
        _ => false,
    });
    assert!(black, "off effect should stream black frames");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn malformed_config_returns_60() {
    let dir = unique_temp_dir("malformed");
    let config = dir.join("config.json");
    std::fs::write(&config, "{ \"strip\": ").expect("config should be writable");

    let output = lumen()
        .arg("--config")
        .arg(&config)
        .arg("run")
        .arg("--duration")
        .arg("100ms")
        .output()
        .expect("run should execute");

    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid settings"));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn oversized_solid_returns_60() {
    let output = lumen()
        .arg("send")
        .arg("127.0.0.1:9")
        .arg("solid")
        .arg("--color")
        .arg("ffffff")
        .arg("--pixels")
        .arg("400")
        .output()
        .expect("send should execute");

    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn bad_target_returns_64() {
    let output = lumen()
        .arg("send")
        .arg("no-port-here")
        .arg("keepalive")
        .output()
        .expect("send should execute");

    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn listen_prints_sent_keepalive() {
    let port = {
        let reserved = UdpSocket::bind("127.0.0.1:0").expect("port reservation should bind");
        reserved.local_addr().expect("reserved addr").port()
    };
    let bind = format!("127.0.0.1:{port}");

    let child = lumen()
        .arg("--format")
        .arg("json")
        .arg("listen")
        .arg(&bind)
        .arg("--count")
        .arg("1")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("listen should start");

    let deadline = Instant::now() + Duration::from_secs(5);
    let mut child = child;
    loop {
        let status = lumen()
            .arg("--format")
            .arg("json")
            .arg("send")
            .arg(&bind)
            .arg("keepalive")
            .arg("--duration-ms")
            .arg("777")
            .status()
            .expect("send should execute");
        assert!(status.success());

        if child.try_wait().expect("listener status").is_some() {
            break;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            panic!("listener never printed a message");
        }
        thread::sleep(Duration::from_millis(50));
    }

    let output = child.wait_with_output().expect("listener output");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"kind\":\"KEEP_ALIVE\""), "stdout: {stdout}");
    assert!(stdout.contains("\"duration_ms\":777"));
}

#[test]
fn displays_skips_unreadable_sources() {
    let dir = unique_temp_dir("displays");
    let config = dir.join("config.json");
    std::fs::write(
        &config,
        r#"{ "capture": { "displays": [{ "name": "DISPLAY1", "path": "/nonexistent/screen.png" }] } }"#,
    )
    .expect("config should be writable");

    let output = lumen()
        .arg("--format")
        .arg("json")
        .arg("--config")
        .arg(&config)
        .arg("displays")
        .output()
        .expect("displays should run");

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "[]");
    let _ = std::fs::remove_dir_all(&dir);
}
