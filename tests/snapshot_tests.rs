use cinder::parser::{self, source::Source, ParseOptions};

use std::{cmp::min, env, error, fs, path::Path, rc::Rc};

type GenericResult<T> = Result<T, Box<dyn error::Error>>;

const RECORD_ENV_VAR: &str = "RECORD";

struct TestEnv {
    errors: Vec<String>,
}

#[test]
fn js_parser_snapshot_tests() -> GenericResult<()> {
    let parser_tests_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("js_parser");
    run_snapshot_tests(&parser_tests_dir, &mut print_ast)
}

/// Parse the file and print its ESTree AST, or the location and description of the first error.
fn print_ast(path: &str) -> GenericResult<String> {
    let contents = fs::read_to_string(path)?;
    let source = Rc::new(Source::new_from_string(path, contents));

    // Only the path within the test directory selects the parse options
    let test_path = path.strip_prefix(env!("CARGO_MANIFEST_DIR")).unwrap_or(path);
    let options = ParseOptions {
        module: test_path.contains("module"),
        jsx: test_path.contains("jsx"),
        ..ParseOptions::default()
    };
    let print_options = options.print_options();

    match parser::parse(&source, options) {
        Ok(program) => {
            Ok(format!("{}\n", parser::print_program(&program, &source, print_options)))
        }
        Err(err) => Ok(format!(
            "{}:{} {}\n",
            err.line().unwrap_or(0),
            err.column().unwrap_or(0),
            err.description()
        )),
    }
}

/// Run snapshot tests for all js files under the given directory.
///
/// Individual tests are implemented as a function that takes in a path and returns the output of
/// the test.
fn run_snapshot_tests(
    root_path: &Path,
    test_fn: &mut impl FnMut(&str) -> GenericResult<String>,
) -> GenericResult<()> {
    let mut env = TestEnv { errors: vec![] };
    visit_directory(&mut env, root_path, test_fn)?;

    if !env.errors.is_empty() {
        assert_eq!("actual", "expected", "\n{}\n", env.errors.join(""))
    }

    Ok(())
}

/// Recursively visit all subdirectories under the target directory, searching for js files.
fn visit_directory(
    env: &mut TestEnv,
    path: &Path,
    test_fn: &mut impl FnMut(&str) -> GenericResult<String>,
) -> GenericResult<()> {
    let mut entries = fs::read_dir(path)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|entry| entry.path());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            visit_directory(env, &path, test_fn)?
        } else if path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("js") {
            process_snapshot_test_file(env, &path, test_fn)?
        }
    }

    Ok(())
}

/// Compare actual vs expected output for the test file with the given path.
fn process_snapshot_test_file(
    env: &mut TestEnv,
    path: &Path,
    test_fn: &mut impl FnMut(&str) -> GenericResult<String>,
) -> GenericResult<()> {
    let path_str = path.to_str().unwrap();
    let exp_path = path.with_extension("exp");

    let actual = test_fn(path_str)?;

    let expected = if exp_path.exists() {
        fs::read_to_string(&exp_path)?
    } else {
        String::new()
    };

    if actual != expected {
        if env::var(RECORD_ENV_VAR).is_ok() {
            fs::write(&exp_path, &actual)?;
        }

        env.errors.push(find_diff_snippet(path, &actual, &expected))
    }

    Ok(())
}

const RED: &str = "\u{001B}[31m";
const GREEN: &str = "\u{001B}[32m";
const RESET: &str = "\u{001B}[0m";
const BOLD: &str = "\u{001B}[1m";

/// Find and format a snippet showing the difference between the two strings.
fn find_diff_snippet(path: &Path, actual: &str, expected: &str) -> String {
    let actual_lines = actual.lines().collect::<Vec<&str>>();
    let expected_lines = expected.lines().collect::<Vec<&str>>();

    // Find the first line that differs between the strings
    let mut i = 0;
    while i < actual_lines.len() && i < expected_lines.len() && actual_lines[i] == expected_lines[i]
    {
        i += 1;
    }

    let actual_snippet = if i == actual_lines.len() {
        String::new()
    } else {
        let snippet_end = min(i + 10, actual_lines.len());
        let lines = actual_lines[i..snippet_end].join("\n+ ");
        format!("{}{}+ {}{}", RED, BOLD, lines, RESET)
    };

    let expected_snippet = if i == expected_lines.len() {
        String::new()
    } else {
        let snippet_end = min(i + 10, expected_lines.len());
        let lines = expected_lines[i..snippet_end].join("\n- ");
        format!("{}{}- {}{}", GREEN, BOLD, lines, RESET)
    };

    format!(
        "\n{}\nActual and expected differ on line {}\n{}\n{}\n",
        path.to_str().unwrap(),
        i,
        expected_snippet,
        actual_snippet
    )
}
