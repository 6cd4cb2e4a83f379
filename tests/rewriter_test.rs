mod common;

use common::{FakeTools, RecordingHost, code_block, document};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use shinylive_lib::extension::BlockOutcome;
use shinylive_lib::pandoc::CodeBlock;
use shinylive_lib::{BuildSession, CodeBlockRewriter, FilterConfig, FilterError, Language, PandocFilter, filter_document};

fn block(classes: &[&str], text: &str) -> CodeBlock {
    CodeBlock {
        classes: classes.iter().map(|c| c.to_string()).collect(),
        text: text.to_string(),
        ..Default::default()
    }
}

#[test]
fn test_untagged_block_makes_no_tool_calls() {
    let tools = FakeTools::new();
    let config = FilterConfig::default();
    let mut host = RecordingHost::in_project();
    let mut session = BuildSession::new(&tools, &config);
    let mut rewriter = CodeBlockRewriter::new(&mut session);

    let mut plain = block(&["python"], "print('hi')");
    let original = plain.clone();
    let outcome = rewriter.process(&mut plain, &mut host).unwrap();

    assert_eq!(outcome, BlockOutcome::Untouched);
    assert_eq!(plain, original);
    assert!(tools.calls().is_empty());
    assert!(host.attached.is_empty());
}

#[test]
fn test_python_block_is_rewritten() {
    let tools = FakeTools::new();
    let config = FilterConfig::default();
    let mut host = RecordingHost::in_project();
    let mut session = BuildSession::new(&tools, &config);
    let mut rewriter = CodeBlockRewriter::new(&mut session);

    let mut app = block(&["{shinylive-python}"], "#| standalone: true\nfrom shiny import App\n");
    let outcome = rewriter.process(&mut app, &mut host).unwrap();

    assert_eq!(
        outcome,
        BlockOutcome::Rewritten {
            language: Language::Python,
            new_dependencies: 0
        }
    );
    assert_eq!(app.classes, vec!["shinylive-python"]);
    assert_eq!(app.attribute("engine"), Some("python"));
    assert_eq!(app.text, "#| standalone: true\nfrom shiny import App\n");

    let convert = tools
        .calls()
        .into_iter()
        .find(|c| c.program == "quarto")
        .expect("conversion call");
    assert_eq!(convert.args, vec!["run", "/python/codeblock-to-json.js", "python"]);
    assert_eq!(convert.input, "#| standalone: true\nfrom shiny import App\n");
}

#[test]
fn test_shared_app_dependency_is_attached_once() {
    let tools = FakeTools::new().with_app_deps("numpy", &["numpy", "pandas"]);
    let config = FilterConfig::default();
    let mut host = RecordingHost::in_project();
    let mut session = BuildSession::new(&tools, &config);
    let mut rewriter = CodeBlockRewriter::new(&mut session);

    let mut first = block(&["{shinylive-python}"], "import numpy");
    let mut second = block(&["{shinylive-python}"], "import numpy as np");
    let first_outcome = rewriter.process(&mut first, &mut host).unwrap();
    let second_outcome = rewriter.process(&mut second, &mut host).unwrap();

    assert_eq!(
        first_outcome,
        BlockOutcome::Rewritten {
            language: Language::Python,
            new_dependencies: 2
        }
    );
    assert_eq!(
        second_outcome,
        BlockOutcome::Rewritten {
            language: Language::Python,
            new_dependencies: 0
        }
    );
    assert_eq!(tools.count("shinylive extension app-resources"), 2);
    assert_eq!(tools.count("shinylive extension base-htmldeps"), 1);
    assert_eq!(
        host.names_in("shinylive"),
        vec!["python-runtime", "numpy", "pandas"]
    );
}

#[test]
fn test_conversion_failure_is_reported() {
    let tools = FakeTools::new().failing(
        "quarto run /python/codeblock-to-json.js python",
        shinylive_lib::PipeError::Failed {
            program: "quarto".to_string(),
            exit_code: Some(1),
            stderr: "bad block header".to_string(),
        },
    );
    let config = FilterConfig::default();
    let mut host = RecordingHost::in_project();
    let mut session = BuildSession::new(&tools, &config);
    let mut rewriter = CodeBlockRewriter::new(&mut session);

    let mut app = block(&["{shinylive-python}"], "#| bogus");
    let err = rewriter.process(&mut app, &mut host).unwrap_err();

    match err {
        FilterError::Conversion { language, message } => {
            assert_eq!(language, Language::Python);
            assert!(message.contains("bad block header"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(app.classes, vec!["{shinylive-python}"]);
    assert_eq!(tools.count("shinylive extension app-resources"), 0);
}

#[test]
fn test_filter_document_rewrites_blocks_and_records_metadata() {
    let tools = FakeTools::new().with_app_deps("ggplot2", &["ggplot2"]);
    let config = FilterConfig::default();
    let mut host = PandocFilter::new(Some("..".to_string()));
    let mut doc = document(vec![
        code_block(&["python"], "print(1)"),
        json!({"t": "Div", "c": [["", [], []], [code_block(&["{shinylive-r}"], "library(ggplot2)")]]}),
    ]);

    let summary = filter_document(&mut doc, &tools, &config, &mut host).unwrap();

    assert_eq!(summary.blocks_seen, 2);
    assert_eq!(summary.blocks_rewritten, 1);
    // shinylive, shinylive-serviceworker, css, r-runtime, ggplot2
    assert_eq!(summary.dependencies, 5);

    assert_eq!(doc["blocks"][0], code_block(&["python"], "print(1)"));
    assert_eq!(
        doc["blocks"][1]["c"][1][0]["c"][0],
        json!(["", ["shinylive-r"], [["engine", "r"]]])
    );

    let names: Vec<&str> = host
        .extension_dependencies("shinylive")
        .iter()
        .map(|d| d.name())
        .collect();
    assert_eq!(names, vec!["r-runtime", "ggplot2"]);

    let meta = &doc["meta"]["shinylive-dependencies"];
    assert_eq!(meta["t"], "MetaMap");
    let document_deps = meta["c"]["document"]["c"].as_array().unwrap();
    assert_eq!(document_deps.len(), 3);
    assert_eq!(
        document_deps[2]["c"]["name"],
        json!({"t": "MetaString", "c": "shinylive-quarto-css"})
    );
}

#[test]
fn test_mixed_language_mismatch_stops_before_second_block() {
    let tools = FakeTools::new()
        .with_assets("python", "0.5.0", "0.4.1")
        .with_assets("r", "0.2.0", "0.3.0");
    let config = FilterConfig::default();
    let mut host = PandocFilter::new(Some(".".to_string()));
    let mut doc = document(vec![
        code_block(&["{shinylive-python}"], "import shiny"),
        code_block(&["{shinylive-r}"], "library(shiny)"),
    ]);

    let err = filter_document(&mut doc, &tools, &config, &mut host).unwrap_err();

    assert!(matches!(err, FilterError::AssetsVersionMismatch { .. }));
    assert_eq!(doc["blocks"][0]["c"][0][1], json!(["shinylive-python"]));
    assert_eq!(doc["blocks"][1]["c"][0][1], json!(["{shinylive-r}"]));
    assert_eq!(doc["meta"], Value::Object(Default::default()));
    assert_eq!(tools.count("Rscript"), 1);
}

#[test]
fn test_manifest_lists_dependencies_by_scope() {
    let tools = FakeTools::new().with_app_deps("numpy", &["numpy"]);
    let config = FilterConfig::default();
    let mut host = PandocFilter::new(Some("..".to_string()));
    let mut doc = document(vec![
        code_block(&["{shinylive-python}"], "import numpy"),
        code_block(&["{shinylive-python}"], "import numpy as np"),
    ]);

    filter_document(&mut doc, &tools, &config, &mut host).unwrap();

    let manifest = host.manifest();
    let names = |deps: &Value| -> Vec<String> {
        deps.as_array()
            .unwrap()
            .iter()
            .map(|d| d["name"].as_str().unwrap().to_string())
            .collect()
    };
    assert_eq!(
        names(&manifest["document"]),
        vec!["shinylive", "shinylive-serviceworker", "shinylive-quarto-css"]
    );
    assert_eq!(names(&manifest["extensions"]["shinylive"]), vec!["python-runtime", "numpy"]);
    assert_eq!(
        manifest["document"][2],
        json!({"name": "shinylive-quarto-css", "stylesheets": ["resources/css/shinylive-quarto.css"]})
    );
    assert_eq!(manifest["extensions"].as_object().unwrap().len(), 1);
}
