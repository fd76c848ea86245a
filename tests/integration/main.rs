//! Integration tests for the command buildpack

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;

    fn buildpack() -> Command {
        cargo_bin_cmd!("command-buildpack")
    }

    #[test]
    fn help_displays() {
        buildpack()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_DESCRIPTION")));
    }

    #[test]
    fn version_displays() {
        buildpack()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("command-buildpack"));
    }

    #[test]
    fn build_requires_arguments() {
        buildpack().arg("build").assert().failure();
    }
}

#[cfg(unix)]
mod lifecycle_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use predicates::prelude::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use tempfile::TempDir;

    const STACK: &str = "io.buildpacks.stacks.bionic";

    fn buildpack() -> Command {
        let mut cmd = cargo_bin_cmd!("command-buildpack");
        cmd.env_remove("BP_LOG_LEVEL")
            .env_remove("BP_DEBUG")
            .env_remove("CNB_APP_DIR")
            .env_remove("CNB_STACK_ID");
        cmd
    }

    fn write_invoker_archive(path: &Path) {
        let file = fs::File::create(path).unwrap();
        let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));

        let contents = b"#!/bin/sh\nexec \"$FUNCTION_URI\"\n";
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(contents.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(&mut header, "command-function-invoker", &contents[..])
            .unwrap();

        builder.into_inner().unwrap().finish().unwrap();
    }

    fn write_buildpack(temp: &TempDir) -> std::path::PathBuf {
        let dir = temp.path().join("buildpack");
        fs::create_dir_all(&dir).unwrap();

        let archive = temp.path().join("command-function-invoker-0.0.7.tgz");
        write_invoker_archive(&archive);

        fs::write(
            dir.join("buildpack.toml"),
            format!(
                r#"
[buildpack]
id = "io.projectriff.command"
name = "riff Command Function Buildpack"
version = "0.1.0"

[[stacks]]
id = "{stack}"

[[metadata.dependencies]]
id = "riff-invoker-command"
name = "riff Command Invoker"
version = "0.0.7"
uri = "file://{archive}"
stacks = ["{stack}"]
"#,
                stack = STACK,
                archive = archive.display()
            ),
        )
        .unwrap();
        dir
    }

    fn write_app(temp: &TempDir, mode: u32) -> std::path::PathBuf {
        let app = temp.path().join("app");
        fs::create_dir_all(&app).unwrap();
        fs::write(app.join("riff.toml"), "artifact = \"fn.sh\"\n").unwrap();
        fs::write(app.join("fn.sh"), "#!/bin/sh\necho hello\n").unwrap();
        fs::set_permissions(app.join("fn.sh"), fs::Permissions::from_mode(mode)).unwrap();
        app
    }

    #[test]
    fn detect_fails_without_riff_toml() {
        let temp = TempDir::new().unwrap();
        let plan = temp.path().join("plan.toml");

        buildpack()
            .args(["detect", "/platform"])
            .arg(&plan)
            .arg("--app")
            .arg(temp.path())
            .assert()
            .code(100);
        assert!(!plan.exists());
    }

    #[test]
    fn detect_fails_for_non_executable_artifact() {
        let temp = TempDir::new().unwrap();
        let app = write_app(&temp, 0o644);

        buildpack()
            .args(["detect", "/platform"])
            .arg(temp.path().join("plan.toml"))
            .arg("--app")
            .arg(&app)
            .assert()
            .code(100);
    }

    #[test]
    fn detect_passes_and_writes_plan() {
        let temp = TempDir::new().unwrap();
        let app = write_app(&temp, 0o700);
        let plan = temp.path().join("plan.toml");

        buildpack()
            .args(["detect", "/platform"])
            .arg(&plan)
            .arg("--app")
            .arg(&app)
            .assert()
            .code(0);

        let written = fs::read_to_string(&plan).unwrap();
        assert!(written.contains("riff-invoker-command"));
        assert!(written.contains("command = \"fn.sh\""));
    }

    #[test]
    fn build_contributes_layers_and_processes() {
        let temp = TempDir::new().unwrap();
        let app = write_app(&temp, 0o700);
        let dir = write_buildpack(&temp);
        let layers = temp.path().join("layers");
        let plan = temp.path().join("plan.toml");
        fs::write(
            &plan,
            "[[entries]]\nname = \"riff-invoker-command\"\nversion = \"0.0.7\"\n\n[entries.metadata]\ncommand = \"fn.sh\"\n",
        )
        .unwrap();

        buildpack()
            .arg("--buildpack-dir")
            .arg(&dir)
            .arg("build")
            .arg(&layers)
            .arg("/platform")
            .arg(&plan)
            .arg("--app")
            .arg(&app)
            .args(["--stack", STACK])
            .assert()
            .success();

        let launch = fs::read_to_string(layers.join("launch.toml")).unwrap();
        assert!(launch.contains("type = \"function\""));
        assert!(launch.contains("type = \"web\""));
        assert!(launch.contains("command-function-invoker"));

        let uri = fs::read_to_string(
            layers
                .join("command-function")
                .join("env.launch")
                .join("FUNCTION_URI.override"),
        )
        .unwrap();
        assert_eq!(Path::new(&uri), app.join("fn.sh"));

        assert!(layers
            .join("riff-invoker-command")
            .join("bin")
            .join("command-function-invoker")
            .is_file());
        assert!(layers.join("riff-invoker-command.toml").is_file());
    }

    #[test]
    fn build_with_unknown_version_is_initialization_failure() {
        let temp = TempDir::new().unwrap();
        let app = write_app(&temp, 0o700);
        let dir = write_buildpack(&temp);
        let plan = temp.path().join("plan.toml");
        fs::write(
            &plan,
            "[[entries]]\nname = \"riff-invoker-command\"\nversion = \"9.9.9\"\n\n[entries.metadata]\ncommand = \"fn.sh\"\n",
        )
        .unwrap();

        buildpack()
            .arg("--buildpack-dir")
            .arg(&dir)
            .arg("build")
            .arg(temp.path().join("layers"))
            .arg("/platform")
            .arg(&plan)
            .arg("--app")
            .arg(&app)
            .args(["--stack", STACK])
            .assert()
            .code(105)
            .stderr(predicate::str::contains("Error:"));
    }

    #[test]
    fn build_with_malformed_plan_is_initialization_failure() {
        let temp = TempDir::new().unwrap();
        let dir = write_buildpack(&temp);
        let plan = temp.path().join("plan.toml");
        fs::write(&plan, "[[entries]\n").unwrap();

        buildpack()
            .arg("--buildpack-dir")
            .arg(&dir)
            .arg("build")
            .arg(temp.path().join("layers"))
            .arg("/platform")
            .arg(&plan)
            .arg("--app")
            .arg(temp.path())
            .args(["--stack", STACK])
            .assert()
            .code(105);
    }
}
