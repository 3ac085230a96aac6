use assert_cmd::Command;

fn libris() -> Command {
    let mut cmd = Command::cargo_bin("libris").unwrap();
    cmd.env_remove("LIBRIS_ENV")
        .env("LIBRIS_CONFIG_DIR", env!("CARGO_MANIFEST_DIR"));
    cmd
}

#[test]
fn help_lists_subcommands() {
    let output = libris().arg("--help").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("serve"), "{stdout}");
    assert!(stdout.contains("settings"), "{stdout}");
}

#[test]
fn settings_prints_effective_json() {
    let output = libris()
        .arg("settings")
        .env("LIBRIS_SERVER__PORT", "9191")
        .output()
        .unwrap();
    assert!(output.status.success());

    let settings: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(settings["environment"], "local");
    assert_eq!(settings["server"]["port"], 9191);
    assert_eq!(settings["database"]["backend"], "memory");
}

#[test]
fn unknown_environment_fails() {
    libris()
        .arg("settings")
        .env("LIBRIS_ENV", "moon")
        .assert()
        .failure();
}
