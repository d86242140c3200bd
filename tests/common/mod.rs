//! Runs tests using actual binary, adapted from 'fd' method: https://github.com/sharkdp/fd/blob/master/tests/testenv/mod.rs
#![allow(dead_code)]
use std::env;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;
use std::process;

// if changing the dump format, update the expected outputs with `--from-json DUMP ARGS > file.txt`
/// Three devices over two buses and a device with an unreadable descriptor on bus 3
pub const SCENARIO_DUMP: &str = "./tests/data/scenario.json";
/// Device that cannot be opened with an unreadable configuration and one with blank strings
pub const EDGE_DUMP: &str = "./tests/data/edge.json";
/// Output of `--simple` for [`SCENARIO_DUMP`]
pub const COMPACT_OUTPUT: &str = "./tests/data/compact.txt";
/// Output of `--tree` for [`SCENARIO_DUMP`]
pub const TREE_OUTPUT: &str = "./tests/data/tree.txt";
/// Output of default verbose mode for [`SCENARIO_DUMP`], less the banner
pub const VERBOSE_OUTPUT: &str = "./tests/data/verbose.txt";

pub fn read_dump(file_name: &str) -> BufReader<File> {
    let f = File::open(file_name).expect("Unable to open dump file");
    BufReader::new(f)
}

pub fn read_dump_to_string(file_name: &str) -> String {
    let mut ret = String::new();
    let mut br = read_dump(file_name);
    br.read_to_string(&mut ret)
        .unwrap_or_else(|_| panic!("Failed to read {}", file_name));
    ret
}

/// Strip ANSI escape codes
pub fn strip_ansi(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_escape = false;

    for c in s.chars() {
        if c == '\x1b' {
            in_escape = true;
        } else if in_escape {
            if c == 'm' {
                in_escape = false;
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// Environment for the integration tests.
pub struct TestEnv {
    /// Path to the *listusb* executable.
    listusb_exe: PathBuf,
    /// Sort lines before comparing; off for outputs where device order matters
    sort_lines: bool,
}

/// Find the *listusb* executable.
fn find_listusb_exe() -> PathBuf {
    // Tests exe is in target/debug/deps, the *listusb* exe is in target/debug
    let root = env::current_exe()
        .expect("tests executable")
        .parent()
        .expect("tests executable directory")
        .parent()
        .expect("listusb executable directory")
        .to_path_buf();

    let exe_name = if cfg!(windows) {
        "listusb.exe"
    } else {
        "listusb"
    };

    root.join(exe_name)
}

/// Format an error message for when *listusb* did not exit successfully.
fn format_exit_error(args: &[&str], output: &process::Output) -> String {
    format!(
        "`listusb {}` did not exit successfully.\nstdout:\n---\n{}---\nstderr:\n---\n{}---",
        args.join(" "),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

/// Format an error message for when the output of *listusb* did not match the expected output.
fn format_output_error(args: &[&str], expected: &str, actual: &str) -> String {
    let diff_text = diff::lines(expected, actual)
        .into_iter()
        .map(|diff| match diff {
            diff::Result::Left(l) => format!("-{}", l),
            diff::Result::Both(l, _) => format!(" {}", l),
            diff::Result::Right(r) => format!("+{}", r),
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        concat!(
            "`listusb {}` did not produce the expected output.\n",
            "Showing diff between expected and actual:\n{}\n"
        ),
        args.join(" "),
        diff_text
    )
}

/// Normalize the output for comparison.
fn normalize_output(s: &str, sort_lines: bool) -> String {
    let mut lines = s.lines().map(|l| l.trim_end().to_string()).collect::<Vec<_>>();

    if sort_lines {
        lines.sort();
    }
    lines.join("\n")
}

/// Trim whitespace from the beginning of each line.
fn trim_lines(s: &str) -> String {
    s.lines()
        .map(|line| line.trim_start())
        .fold(String::new(), |mut str, line| {
            str.push_str(line);
            str.push('\n');
            str
        })
}

impl TestEnv {
    pub fn new() -> TestEnv {
        TestEnv {
            listusb_exe: find_listusb_exe(),
            sort_lines: false,
        }
    }

    pub fn sort_lines(self, sort_lines: bool) -> TestEnv {
        TestEnv {
            listusb_exe: self.listusb_exe,
            sort_lines,
        }
    }

    /// Get the path of the listusb executable.
    #[cfg_attr(windows, allow(unused))]
    pub fn test_exe(&self) -> &PathBuf {
        &self.listusb_exe
    }

    fn command(&self, dump_file: Option<&str>, args: &[&str]) -> process::Command {
        let mut cmd = process::Command::new(&self.listusb_exe);
        if let Some(dump) = dump_file {
            cmd.arg("--from-json").arg(dump);
        }
        cmd.args(args);
        cmd
    }

    /// Assert that calling *listusb* with `dump_file` and `args` succeeds, returning the output
    pub fn assert_success_and_get_output(
        &self,
        dump_file: Option<&str>,
        args: &[&str],
    ) -> process::Output {
        let output = self
            .command(dump_file, args)
            .output()
            .expect("listusb output");

        if !output.status.success() {
            panic!("{}", format_exit_error(args, &output));
        }

        output
    }

    pub fn assert_success_and_get_stdout(&self, dump_file: Option<&str>, args: &[&str]) -> String {
        let output = self.assert_success_and_get_output(dump_file, args);
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    /// Assert that calling *listusb* with the specified arguments produces the expected output.
    pub fn assert_output(
        &self,
        dump_file: Option<&str>,
        args: &[&str],
        expected: &str,
        contains: bool,
    ) {
        let actual = self.assert_success_and_get_stdout(dump_file, args);

        if contains {
            if !actual.contains(expected) {
                panic!("{}", format_output_error(args, expected, &actual));
            }
        } else {
            let expected = normalize_output(expected, self.sort_lines);
            let actual = normalize_output(&actual, self.sort_lines);
            if expected != actual {
                panic!("{}", format_output_error(args, &expected, &actual));
            }
        }
    }

    /// Assert `expected` JSON is included in the JSON printed by *listusb*
    pub fn assert_output_json(
        &self,
        dump_file: Option<&str>,
        args: &[&str],
        expected: serde_json::Value,
    ) {
        let actual = self.assert_success_and_get_stdout(dump_file, args);
        let actual: serde_json::Value =
            serde_json::from_str(&actual).expect("listusb output is not valid JSON");

        assert_json_diff::assert_json_include!(actual: actual, expected: expected);
    }

    /// Assert that calling *listusb* with the specified arguments produces the expected error,
    /// and does not succeed.
    pub fn assert_failure_with_error(
        &self,
        dump_file: Option<&str>,
        args: &[&str],
        expected: &str,
    ) {
        let status = self.assert_error(dump_file, args, Some(expected));
        if status.success() {
            panic!("error '{}' did not occur.", expected);
        }
    }

    /// Assert that calling *listusb* with the specified arguments does not succeed.
    pub fn assert_failure(&self, dump_file: Option<&str>, args: &[&str]) {
        let status = self.assert_error(dump_file, args, None);
        if status.success() {
            panic!("Failure did not occur as expected.");
        }
    }

    fn assert_error(
        &self,
        dump_file: Option<&str>,
        args: &[&str],
        expected: Option<&str>,
    ) -> process::ExitStatus {
        let output = self
            .command(dump_file, args)
            .output()
            .expect("listusb output");

        if let Some(expected) = expected {
            let expected_error = trim_lines(expected);
            let actual_err = trim_lines(&String::from_utf8_lossy(&output.stderr));

            if !actual_err.trim_start().starts_with(expected_error.trim_end()) {
                panic!(
                    "{}",
                    format_output_error(args, &expected_error, &actual_err)
                );
            }
        }

        output.status
    }
}
