use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use std::error::Error;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tempfile::tempdir;

// Stub executables are written and then executed; running tests one at a
// time keeps a concurrently forked child from holding a stub open for
// writing (ETXTBSY).
static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

fn mediashim_cmd() -> Command {
    let mut cmd = Command::cargo_bin("mediashim").expect("Failed to find mediashim binary");
    cmd.env_remove("MEDIASHIM_PATH");
    cmd
}

#[test]
fn top_level_help_and_version_exit_zero() {
    let _guard = serial();
    mediashim_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("list").and(contains("doctor")));
    mediashim_cmd().arg("--version").assert().success();
}

#[test]
fn missing_command_exits_one() {
    let _guard = serial();
    mediashim_cmd().assert().code(1);
    mediashim_cmd().arg("--bogus").assert().code(1);
}

#[test]
fn list_shows_every_tool() {
    let _guard = serial();
    let assert = mediashim_cmd().arg("list").assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    for tool in ["trim", "fade", "mark", "strip", "minify", "convert", "twopass", "modimg", "pdfimg"] {
        assert!(stdout.contains(tool), "{tool} missing from:\n{stdout}");
    }
}

#[test]
fn tool_help_exits_zero_even_after_bad_flags() -> Result<(), Box<dyn Error>> {
    let _guard = serial();
    let empty = tempdir()?;
    for args in [&["trim", "--help"][..], &["trim", "--bogus", "-h"][..], &["convert", "-q", "-h"][..]] {
        mediashim_cmd()
            .arg("--tool-path")
            .arg(empty.path())
            .args(args)
            .assert()
            .success()
            .stdout(contains(format!("Usage: mediashim {}", args[0])));
    }
    Ok(())
}

#[test]
fn unknown_option_exits_one() {
    let _guard = serial();
    mediashim_cmd()
        .args(["trim", "--bogus", "clip.mp4", "5"])
        .assert()
        .code(1)
        .stderr(contains("unknown option: --bogus"))
        .stderr(contains("Usage: mediashim trim"));
}

#[test]
fn missing_filename_exits_one() {
    let _guard = serial();
    mediashim_cmd()
        .args(["strip"])
        .assert()
        .code(1)
        .stderr(contains("filename must be provided"));
}

#[test]
fn missing_option_value_exits_one() {
    let _guard = serial();
    mediashim_cmd()
        .args(["fade", "clip.mp4", "-t"])
        .assert()
        .code(1)
        // -t after the filename is positional, so the filename check is not the failure
        .stderr(contains("unexpected argument: -t"));
    mediashim_cmd()
        .args(["fade", "-t"])
        .assert()
        .code(1)
        .stderr(contains("argument required for option: -t"));
}

#[test]
fn unknown_tool_exits_one() {
    let _guard = serial();
    mediashim_cmd()
        .arg("explode")
        .assert()
        .code(1)
        .stderr(contains("unknown tool: explode"));
}

#[test]
fn missing_dependency_exits_one() -> Result<(), Box<dyn Error>> {
    let _guard = serial();
    let empty = tempdir()?;
    let work = tempdir()?;
    let input = work.path().join("photo.jpg");
    std::fs::write(&input, b"jpeg")?;

    mediashim_cmd()
        .arg("--tool-path")
        .arg(empty.path())
        .arg("strip")
        .arg(&input)
        .assert()
        .code(1)
        .stderr(contains("exiftool (metadata-editor) not found"));
    assert!(!work.path().join("photo-stripped.jpg").exists());
    Ok(())
}

#[test]
fn json_mode_reports_errors_on_stderr() -> Result<(), Box<dyn Error>> {
    let _guard = serial();
    let empty = tempdir()?;
    let work = tempdir()?;

    mediashim_cmd()
        .current_dir(work.path())
        .arg("--tool-path")
        .arg(empty.path())
        .args(["--json", "strip", "missing.jpg"])
        .assert()
        .code(1)
        .stdout(contains(r#""type":"error""#).not())
        .stderr(contains(r#""type":"error""#))
        .stderr(contains("exiftool (metadata-editor) not found"));
    Ok(())
}

#[test]
fn doctor_reports_missing_executables() -> Result<(), Box<dyn Error>> {
    let _guard = serial();
    let empty = tempdir()?;
    mediashim_cmd()
        .env("MEDIASHIM_PATH", empty.path())
        .arg("doctor")
        .assert()
        .code(1)
        .stdout(contains("missing").and(contains("ffmpeg")));
    Ok(())
}

#[cfg(unix)]
mod stubs {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    const FFPROBE: &str = "#!/bin/sh\necho '{\"format\": {\"duration\": \"95.500000\"}}'\n";

    // Logs its arguments, fails for inputs named *bad*, otherwise creates the
    // last argument as the output.
    const FFMPEG: &str = r#"#!/bin/sh
echo "$@" >> "$(dirname "$0")/ffmpeg.log"
for last; do :; done
case "$*" in
  *bad*) echo "moov atom not found" >&2; exit 1 ;;
esac
: > "$last"
"#;

    // exiftool writes the file named after -o.
    const EXIFTOOL: &str = r#"#!/bin/sh
prev=""
for arg; do
  if [ "$prev" = "-o" ]; then : > "$arg"; fi
  prev="$arg"
done
"#;

    fn write_stub(dir: &Path, name: &str, body: &str) {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn stub_dir() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        write_stub(dir.path(), "ffmpeg", FFMPEG);
        write_stub(dir.path(), "ffprobe", FFPROBE);
        write_stub(dir.path(), "exiftool", EXIFTOOL);
        dir
    }

    #[test]
    fn trim_probes_then_writes_trimmed_copy() -> Result<(), Box<dyn Error>> {
        let _guard = serial();
        let bin = stub_dir();
        let work = tempdir()?;
        std::fs::write(work.path().join("clip.mp4"), b"video")?;

        mediashim_cmd()
            .current_dir(work.path())
            .arg("--tool-path")
            .arg(bin.path())
            .args(["trim", "clip.mp4", "00:01:00"])
            .assert()
            .success()
            .stdout(contains("clip-trim.mp4"));

        assert!(work.path().join("clip-trim.mp4").exists());
        let log = std::fs::read_to_string(bin.path().join("ffmpeg.log"))?;
        assert_eq!(log.lines().count(), 1);
        assert!(log.contains("-ss 60 -to 95.5 -i clip.mp4"), "{log}");
        Ok(())
    }

    #[test]
    fn input_not_found_runs_nothing() -> Result<(), Box<dyn Error>> {
        let _guard = serial();
        let bin = stub_dir();
        let work = tempdir()?;

        mediashim_cmd()
            .current_dir(work.path())
            .arg("--tool-path")
            .arg(bin.path())
            .args(["trim", "absent.mp4", "5", "10"])
            .assert()
            .code(1)
            .stderr(contains("not found: absent.mp4"));
        assert!(!bin.path().join("ffmpeg.log").exists());
        Ok(())
    }

    #[test]
    fn convert_reports_failed_item_and_continues() -> Result<(), Box<dyn Error>> {
        let _guard = serial();
        let bin = stub_dir();
        let work = tempdir()?;
        for name in ["a.wmv", "bad.wmv", "c.wmv"] {
            std::fs::write(work.path().join(name), b"video")?;
        }

        mediashim_cmd()
            .current_dir(work.path())
            .arg("--tool-path")
            .arg(bin.path())
            .args(["convert", "-q", "wmv"])
            .assert()
            .code(1)
            .stderr(contains("bad.wmv"))
            .stderr(contains("1 of 3 items failed"));

        let converted = work.path().join("converted");
        assert!(converted.join("a.mp4").exists());
        assert!(!converted.join("bad.mp4").exists());
        assert!(converted.join("c.mp4").exists());
        let log = std::fs::read_to_string(bin.path().join("ffmpeg.log"))?;
        assert_eq!(log.lines().count(), 3);
        Ok(())
    }

    #[test]
    fn delegated_failure_removes_partial_output() -> Result<(), Box<dyn Error>> {
        let _guard = serial();
        let bin = stub_dir();
        let work = tempdir()?;
        std::fs::write(work.path().join("bad.mov"), b"video")?;

        mediashim_cmd()
            .current_dir(work.path())
            .arg("--tool-path")
            .arg(bin.path())
            .args(["twopass", "bad.mov"])
            .assert()
            .code(1)
            .stderr(contains("ffmpeg exited with exit status 1"))
            .stderr(contains("moov atom not found"));
        assert!(!work.path().join("bad.mp4").exists());
        assert!(work.path().join("bad.mov").exists());
        Ok(())
    }

    #[test]
    fn json_mode_reports_completion() -> Result<(), Box<dyn Error>> {
        let _guard = serial();
        let bin = stub_dir();
        let work = tempdir()?;
        std::fs::write(work.path().join("photo.jpg"), b"jpeg")?;

        mediashim_cmd()
            .current_dir(work.path())
            .env("MEDIASHIM_PATH", bin.path())
            .args(["--json", "strip", "photo.jpg"])
            .assert()
            .success()
            .stdout(contains(r#""type":"operation_complete""#));
        assert!(work.path().join("photo-stripped.jpg").exists());
        Ok(())
    }

    #[test]
    fn log_dir_receives_run_log() -> Result<(), Box<dyn Error>> {
        let _guard = serial();
        let bin = stub_dir();
        let work = tempdir()?;
        let logs = work.path().join("logs");
        std::fs::write(work.path().join("photo.jpg"), b"jpeg")?;

        mediashim_cmd()
            .current_dir(work.path())
            .arg("--tool-path")
            .arg(bin.path())
            .arg("--log-dir")
            .arg(&logs)
            .args(["strip", "-q", "photo.jpg"])
            .assert()
            .success();

        let entries: Vec<_> = std::fs::read_dir(&logs)?.collect::<Result<_, _>>()?;
        assert_eq!(entries.len(), 1);
        let name = entries[0].file_name().to_string_lossy().into_owned();
        assert!(name.starts_with("mediashim_run_") && name.ends_with(".log"));
        let contents = std::fs::read_to_string(entries[0].path())?;
        assert!(contents.contains("exiftool"), "{contents}");
        Ok(())
    }
}
