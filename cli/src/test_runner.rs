use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use estree::SourceType;
use serde::Deserialize;
use templates::{SessionOptions, TemplateManager};

use crate::search;

#[derive(Debug, Deserialize)]
pub struct TestConfig {
    /// Human-readable test description.
    #[serde(default)]
    pub description: Option<String>,

    /// Template with `${name}` placeholders.
    pub template: String,

    /// Placeholder names that capture a run of siblings.
    #[serde(default)]
    pub spread: Vec<String>,

    /// Placeholder names that stand for a multi-declarator `var`.
    #[serde(default)]
    pub group: Vec<String>,

    /// Parse template and source as a module.
    #[serde(default)]
    pub module: bool,

    /// Expected number of matches in the source.
    #[serde(default)]
    pub expect_matches: Option<usize>,

    /// Substring that must appear in the template error message.
    #[serde(default)]
    pub expect_template_error: Option<String>,

    /// Expected capture text per placeholder, one entry per match in traversal order.
    #[serde(default)]
    pub expect_captures: BTreeMap<String, Vec<String>>,
}

/// Parse a `.test.js` file into its TOML config and JavaScript source.
fn parse_test_file(content: &str) -> Result<(TestConfig, &str), String> {
    let content = content.trim_start_matches('\u{feff}'); // strip BOM

    let Some(after_open) = content.strip_prefix("---") else {
        return Err("missing opening --- frontmatter delimiter".into());
    };
    let after_open = after_open
        .strip_prefix('\n')
        .or_else(|| after_open.strip_prefix("\r\n"))
        .unwrap_or(after_open);

    let close_pos = after_open
        .find("\n---")
        .ok_or("missing closing --- frontmatter delimiter")?;

    let toml_str = after_open[..close_pos].trim_end_matches('\r');
    let rest = &after_open[close_pos + 4..]; // skip \n---
    let source = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    let config: TestConfig = toml::from_str(toml_str).map_err(|e| format!("TOML parse error: {}", e))?;

    Ok((config, source))
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

fn run_single_test(path: &Path, options: SessionOptions) -> TestResult {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            return TestResult {
                path: path.to_path_buf(),
                description: None,
                outcome: TestOutcome::Fail(format!("cannot read file: {}", e)),
            };
        }
    };

    let (config, source) = match parse_test_file(&content) {
        Ok(pair) => pair,
        Err(e) => {
            return TestResult {
                path: path.to_path_buf(),
                description: None,
                outcome: TestOutcome::Fail(format!("frontmatter error: {}", e)),
            };
        }
    };

    let outcome = match check(&config, source, options) {
        Ok(()) => TestOutcome::Pass,
        Err(reason) => TestOutcome::Fail(reason),
    };
    TestResult {
        path: path.to_path_buf(),
        description: config.description,
        outcome,
    }
}

/// Compile the fixture's template, search its source and compare against the
/// expectations. Returns the reason on mismatch.
fn check(config: &TestConfig, source: &str, mut options: SessionOptions) -> Result<(), String> {
    if config.module {
        options.parser.source_type = SourceType::Module;
    }
    let mut manager = TemplateManager::with_options(options);
    let expanded = search::expand(&mut manager, &config.template, &config.spread, &config.group);
    let compiled = manager.template(&expanded.source);

    let template = match (&config.expect_template_error, compiled) {
        (Some(expected), Err(err)) => {
            let message = err.to_string();
            return if message.contains(expected.as_str()) {
                Ok(())
            } else {
                Err(format!("expected template error containing \"{}\", got: {}", expected, message))
            };
        }
        (Some(expected), Ok(_)) => {
            return Err(format!(
                "expected template error containing \"{}\", but the template compiled",
                expected
            ));
        }
        (None, Err(err)) => return Err(format!("unexpected template error: {}", err)),
        (None, Ok(template)) => template,
    };

    let tree = estree::parse(source, &options.parser).map_err(|e| format!("unexpected parse error: {}", e))?;
    let found = search::find(&template, &expanded.names, &tree).map_err(|e| e.to_string())?;

    if let Some(expected) = config.expect_matches {
        if found.len() != expected {
            return Err(format!("expected {} match(es), got {}", expected, found.len()));
        }
    }

    for (name, expected) in &config.expect_captures {
        if !expanded.names.iter().any(|(known, _)| known == name) {
            return Err(format!("expect_captures names unknown placeholder `{}`", name));
        }
        let actual: Vec<&str> = found
            .iter()
            .map(|found| found.capture_text(name, source).unwrap_or(""))
            .collect();
        if actual != *expected {
            return Err(format!(
                "captures of `{}` mismatch\n  expected: {:?}\n  actual:   {:?}",
                name, expected, actual
            ));
        }
    }

    Ok(())
}

/// Discover `.test.js` files grouped by category (subfolder relative to root).
/// Files directly in `root` get category "" (uncategorized).
fn discover_categorized(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect_tests(root, root, &mut categories);
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect_tests(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_tests(&path, root, out);
        } else if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.ends_with(".test.js"))
        {
            let category = path
                .parent()
                .and_then(|p| p.strip_prefix(root).ok())
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            out.entry(category).or_default().push(path);
        }
    }
}

/// List available categories for the given test path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }

    let categories = discover_categorized(path);
    if categories.is_empty() {
        eprintln!("no .test.js files found in {}", path.display());
        return;
    }

    eprintln!("available categories:");
    for (cat, files) in &categories {
        let label = if cat.is_empty() { "(root)" } else { cat.as_str() };
        eprintln!("  {} ({} tests)", label, files.len());
    }
}

fn pass_label(no_color: bool) -> &'static str {
    if no_color { "PASS" } else { "\x1b[32mPASS\x1b[0m" }
}

fn fail_label(no_color: bool) -> &'static str {
    if no_color { "FAIL" } else { "\x1b[31mFAIL\x1b[0m" }
}

fn bold(s: &str, no_color: bool) -> String {
    if no_color {
        s.to_string()
    } else {
        format!("\x1b[1m{}\x1b[0m", s)
    }
}

fn label(result: &TestResult) -> &str {
    result
        .description
        .as_deref()
        .unwrap_or_else(|| result.path.file_stem().and_then(|s| s.to_str()).unwrap_or("?"))
}

/// Run all `.test.js` files under `path` (or a single file).
/// If `categories` is non-empty, only run tests in those categories.
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, options: SessionOptions, no_color: bool, categories: &[String]) -> i32 {
    let run_categories: BTreeMap<String, Vec<PathBuf>> = if path.is_file() {
        BTreeMap::from([(String::new(), vec![path.to_path_buf()])])
    } else {
        let all_categories = discover_categorized(path);
        if all_categories.is_empty() {
            eprintln!("no .test.js files found in {}", path.display());
            return 1;
        }
        select_categories(all_categories, categories)
    };

    if run_categories.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    let mut passed = 0usize;
    let mut failures: Vec<TestResult> = Vec::new();

    for (cat, files) in &run_categories {
        if !path.is_file() {
            let header = if cat.is_empty() { "(root)" } else { cat.as_str() };
            eprintln!();
            eprintln!("{}", bold(header, no_color));
        }

        for file in files {
            let result = run_single_test(file, options);
            match &result.outcome {
                TestOutcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", pass_label(no_color), label(&result));
                }
                TestOutcome::Fail(_) => {
                    eprintln!("  {}  {}", fail_label(no_color), label(&result));
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for f in &failures {
            eprintln!();
            eprintln!("  --- {} ---", f.path.display());
            if let TestOutcome::Fail(reason) = &f.outcome {
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    eprintln!();
    let failed = failures.len();
    if failed == 0 {
        let ok = if no_color { "ok" } else { "\x1b[32mok\x1b[0m" };
        eprintln!("test result: {}. {} passed, 0 failed", ok, passed);
        0
    } else {
        let failed_label = if no_color { "FAILED" } else { "\x1b[31mFAILED\x1b[0m" };
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            failed_label,
            passed,
            failed,
            passed + failed
        );
        1
    }
}

/// Keep the requested categories and their subcategories. An empty request
/// keeps everything.
fn select_categories(
    all_categories: BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<String, Vec<PathBuf>> {
    if requested.is_empty() {
        return all_categories;
    }
    for req in requested {
        let req = req.trim_matches('/');
        if !all_categories.keys().any(|cat| in_category(cat, req)) {
            eprintln!(
                "warning: category '{}' not found (available: {})",
                req,
                all_categories
                    .keys()
                    .map(|k| if k.is_empty() { "(root)" } else { k.as_str() })
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }
    all_categories
        .into_iter()
        .filter(|(cat, _)| requested.iter().any(|req| in_category(cat, req.trim_matches('/'))))
        .collect()
}

fn in_category(cat: &str, req: &str) -> bool {
    cat == req || cat.strip_prefix(req).is_some_and(|rest| rest.starts_with('/'))
}
