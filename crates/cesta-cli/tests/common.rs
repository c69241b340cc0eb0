#![allow(dead_code)]
use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestEnv {
    _dir: TempDir,
    pub db: PathBuf,
    pub cfg: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = dir.path().join("config");
        std::fs::create_dir_all(&cfg).expect("cfg dir");
        let db = dir.path().join("cesta.db");
        Self { _dir: dir, db, cfg }
    }

    pub fn bin(&self) -> Command {
        let mut cmd = Command::cargo_bin("cesta").unwrap();
        // Isolate settings so no [rest] remote leaks in from the host
        cmd.env("XDG_CONFIG_HOME", &self.cfg);
        cmd.arg("--db").arg(&self.db);
        cmd
    }

    pub fn add(&self, name: &str, category: &str) -> String {
        let out = self
            .bin()
            .args(["add", name, "--category", category])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let id = String::from_utf8(out).unwrap();
        id.trim().trim_start_matches("added ").to_string()
    }

    pub fn list_json(&self) -> serde_json::Value {
        let out = self
            .bin()
            .args(["list", "--json"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).unwrap()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
