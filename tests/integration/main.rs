//! Integration tests for envgraph

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn envgraph() -> Command {
        cargo_bin_cmd!("envgraph")
    }

    /// Workspace with an offline config pointing at a private cache
    struct Workspace {
        dir: TempDir,
    }

    impl Workspace {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let cache = dir.path().join("cache");
            let config = format!(
                "[marketplace]\ncache_dir = {:?}\noffline = true\n",
                cache.display().to_string()
            );
            fs::write(dir.path().join("config.toml"), config).unwrap();
            Self { dir }
        }

        fn config(&self) -> PathBuf {
            self.dir.path().join("config.toml")
        }

        fn write_spec(&self, content: &str) -> PathBuf {
            let path = self.dir.path().join("envgraph.toml");
            fs::write(&path, content).unwrap();
            path
        }

        fn cache_plugin(&self, plugin: &str) {
            let extension = self
                .dir
                .path()
                .join("cache")
                .join("openvsx")
                .join(plugin)
                .join("extension");
            fs::create_dir_all(&extension).unwrap();
            fs::write(extension.join("package.json"), "{}").unwrap();
        }

        fn compile(&self, spec: &Path) -> Command {
            let mut cmd = envgraph();
            cmd.arg("-c")
                .arg(self.config())
                .arg("compile")
                .arg("--spec")
                .arg(spec);
            cmd
        }
    }

    #[test]
    fn help_displays() {
        envgraph()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "Compile declarative development environments",
            ));
    }

    #[test]
    fn version_displays() {
        envgraph()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("envgraph"));
    }

    #[test]
    fn config_path_follows_flag() {
        let ws = Workspace::new();
        envgraph()
            .arg("-c")
            .arg(ws.config())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let ws = Workspace::new();
        envgraph()
            .arg("-c")
            .arg(ws.config())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[marketplace]"))
            .stdout(predicate::str::contains("offline = true"));
    }

    #[test]
    fn invalid_config_is_reported() {
        let ws = Workspace::new();
        fs::write(ws.config(), "[marketplace\n").unwrap();
        envgraph()
            .arg("-c")
            .arg(ws.config())
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Error:"));
    }

    #[test]
    fn compile_missing_spec_fails() {
        let ws = Workspace::new();
        ws.compile(&ws.dir.path().join("missing.toml"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Environment spec not found"));
    }

    #[test]
    fn compile_jupyter_without_plugins() {
        let ws = Workspace::new();
        let spec = ws.write_spec("[runtime]\nlanguage = \"python\"\n\n[jupyter]\nport = 8888\n");

        ws.compile(&spec)
            .assert()
            .success()
            .stdout(predicate::str::contains("plugins: none"))
            .stdout(predicate::str::contains("python3 -m notebook"))
            .stdout(predicate::str::contains("--port 8888"))
            .stdout(predicate::str::contains("rstudio: not requested"));
    }

    #[test]
    fn compile_working_dir_override() {
        let ws = Workspace::new();
        let spec = ws.write_spec("[jupyter]\n");

        ws.compile(&spec)
            .args(["--working-dir", "/srv/notebooks"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--notebook-dir /srv/notebooks"));
    }

    #[test]
    fn compile_jupyter_with_r_runtime_is_rejected() {
        let ws = Workspace::new();
        let spec = ws.write_spec(
            "plugins = [\"ms-python.python-2021.11.1\"]\n\n[runtime]\nlanguage = \"r\"\n\n[jupyter]\n",
        );

        // Rejected before any plugin lookup, so the empty cache never matters
        ws.compile(&spec)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Jupyter is not supported in r yet"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn compile_rstudio_with_r_runtime() {
        let ws = Workspace::new();
        let spec = ws.write_spec("[runtime]\nlanguage = \"r\"\n\n[rstudio]\n");

        ws.compile(&spec)
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "rstudio: sudo /usr/lib/rstudio-server/bin/rserver",
            ));
    }

    #[test]
    fn compile_cached_plugins_as_json() {
        let ws = Workspace::new();
        ws.cache_plugin("ms-python.python-2021.11.1");
        ws.cache_plugin("ms-toolsai.jupyter-2021.6.99");
        let spec = ws.write_spec(
            "plugins = [\"ms-python.python-2021.11.1\", \"ms-toolsai.jupyter-2021.6.99\"]\n\n[jupyter]\n",
        );

        let output = ws
            .compile(&spec)
            .args(["--format", "json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let layer = &json["plugin_layer"];
        assert_eq!(layer["op"], "merge");
        assert_eq!(layer["label"], "merging plugins for vscode");
        assert_eq!(layer["inputs"].as_array().unwrap().len(), 2);
        assert_eq!(
            layer["inputs"][0]["dest"],
            "/home/envd/.vscode-server/extensions/ms-python.python-2021.11.1"
        );
        assert_eq!(json["pypi"], serde_json::json!(["jupyter"]));
        assert_eq!(json["rstudio_command"], serde_json::Value::Null);
        assert_eq!(json["digest"].as_str().unwrap().len(), 64);
    }

    #[test]
    fn compile_uncached_plugin_offline_fails() {
        let ws = Workspace::new();
        let spec = ws.write_spec("plugins = [\"ms-python.python-2021.11.1\"]\n");

        ws.compile(&spec)
            .assert()
            .failure()
            .stderr(predicate::str::contains(
                "Failed to resolve plugin ms-python.python-2021.11.1",
            ));
    }

    #[test]
    fn compile_conflicting_plugin_versions() {
        let ws = Workspace::new();
        let spec = ws.write_spec(
            "plugins = [\"ms-python.python-2021.11.1\", \"ms-python.python-2022.1.0\"]\n",
        );

        ws.compile(&spec)
            .assert()
            .failure()
            .stderr(predicate::str::contains("conflicting versions"));
    }

    #[test]
    fn compile_rejects_malformed_plugin() {
        let ws = Workspace::new();
        let spec = ws.write_spec("plugins = [\"not-a-plugin\"]\n");

        ws.compile(&spec)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid environment spec"));
    }

    #[test]
    fn cache_list_and_clear() {
        let ws = Workspace::new();
        ws.cache_plugin("ms-python.python-2021.11.1");

        envgraph()
            .arg("-c")
            .arg(ws.config())
            .args(["cache", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("ms-python.python-2021.11.1"));

        envgraph()
            .arg("-c")
            .arg(ws.config())
            .args(["cache", "clear"])
            .assert()
            .success();

        envgraph()
            .arg("-c")
            .arg(ws.config())
            .args(["cache", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No cached plugins found"));
    }
}
