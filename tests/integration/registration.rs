//! Registration of single templates and directory trees.

use anyhow::Result;
use serde_json::json;
use viewreg::core::ErrorKind;
use viewreg::templating::{Helpers, View};
use viewreg::test_utils::TemplateTree;

fn render(view: &View, alias: &str, data: &serde_json::Value) -> Result<String> {
    Ok(String::from_utf8(view.render(alias, data)?)?)
}

#[test]
fn test_directory_tree_with_prefix_and_includes() -> Result<()> {
    let tree = TemplateTree::with_files(&[
        ("layout.html", "<main>{% block content %}{% endblock %}</main>"),
        (
            "pages/home.html",
            concat!(
                "{% extends \"site/layout.html\" %}",
                "{% block content %}{% include \"site/partials/nav.html\" %}{{ title }}{% endblock %}"
            ),
        ),
        ("partials/nav.html", "<nav/>"),
        ("README.md", "not a template"),
    ])?;

    let view = View::default();
    view.add_dir("site", tree.path(), [".html"], true)?;

    assert_eq!(
        view.aliases().into_iter().collect::<Vec<_>>(),
        vec!["site/layout.html", "site/pages/home.html", "site/partials/nav.html"]
    );
    assert_eq!(
        render(&view, "site/pages/home.html", &json!({"title": "Home & Away"}))?,
        "<main><nav/>Home &amp; Away</main>"
    );
    Ok(())
}

#[test]
fn test_multiple_directories_share_one_namespace() -> Result<()> {
    let mail = TemplateTree::with_files(&[("welcome.tmpl", "Welcome {{ Name }}")])?;
    let web = TemplateTree::with_files(&[("welcome.tmpl", "<h1>{{ Name }}</h1>")])?;

    let view = View::default();
    view.add_dir("mail", mail.path(), ["tmpl"], true)?;
    view.add_dir("web", web.path(), ["tmpl"], true)?;

    assert_eq!(render(&view, "mail/welcome.tmpl", &json!({"Name": "Amy"}))?, "Welcome Amy");
    assert_eq!(render(&view, "web/welcome.tmpl", &json!({"Name": "Amy"}))?, "<h1>Amy</h1>");
    Ok(())
}

#[test]
fn test_later_registration_overwrites_alias() -> Result<()> {
    let first = TemplateTree::with_files(&[("a.tmpl", "first")])?;
    let second = TemplateTree::with_files(&[("a.tmpl", "second")])?;

    let view = View::default();
    view.add_dir("", first.path(), [".tmpl"], true)?;
    view.add_dir("", second.path(), [".tmpl"], true)?;

    assert_eq!(render(&view, "a.tmpl", &json!(null))?, "second");
    assert_eq!(view.source_path("a.tmpl"), Some(second.file("a.tmpl")));
    Ok(())
}

#[test]
fn test_registration_errors_by_kind() -> Result<()> {
    let tree = TemplateTree::with_files(&[("broken.tmpl", "{% for x in %}")])?;
    tree.mkdir("folder.tmpl")?;

    let view = View::default();

    let cases = [
        ("missing", tree.file("missing.tmpl"), ErrorKind::NotFound),
        ("folder", tree.file("folder.tmpl"), ErrorKind::NotRegularFile),
        ("broken", tree.file("broken.tmpl"), ErrorKind::Parse),
    ];
    for (alias, path, kind) in cases {
        let err = view.add_template(alias, &path).unwrap_err();
        assert_eq!(err.kind(), kind, "{alias}: {err}");
    }

    assert!(view.aliases().is_empty());
    assert_eq!(view.generation(), 0);
    Ok(())
}

#[test]
fn test_parent_must_be_registered_before_child() -> Result<()> {
    let tree = TemplateTree::with_files(&[
        ("base.html", "[{% block b %}{% endblock %}]"),
        ("child.html", "{% extends \"base.html\" %}{% block b %}c{% endblock %}"),
    ])?;

    let view = View::default();
    let err = view.add_template("child.html", tree.file("child.html")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);

    view.add_template("base.html", tree.file("base.html"))?;
    view.add_template("child.html", tree.file("child.html"))?;
    assert_eq!(render(&view, "child.html", &json!(null))?, "[c]");
    Ok(())
}

#[test]
fn test_helpers_are_shared_by_all_templates() -> Result<()> {
    let tree = TemplateTree::with_files(&[
        ("a.tmpl", "{{ greet(name=Name) }}"),
        ("b.tmpl", "{{ greet(name=\"Bo\") }}!"),
    ])?;

    let helpers = Helpers::new().function(
        "greet",
        |args: &std::collections::HashMap<String, tera::Value>| -> tera::Result<tera::Value> {
            let name = args.get("name").and_then(tera::Value::as_str).unwrap_or("nobody");
            Ok(tera::Value::String(format!("Hello {name}")))
        },
    );
    let view = View::new(helpers);
    view.add_dir("", tree.path(), [".tmpl"], false)?;

    assert_eq!(render(&view, "a.tmpl", &json!({"Name": "Amy"}))?, "Hello Amy");
    assert_eq!(render(&view, "b.tmpl", &json!({}))?, "Hello Bo!");
    Ok(())
}

#[test]
fn test_preprocessor_sees_extension() -> Result<()> {
    let tree =
        TemplateTree::with_files(&[("a.tmpl", "tmpl"), ("b.txt", "txt"), ("noext", "none")])?;

    let view = View::builder()
        .preprocessor(|ext: &str, raw: Vec<u8>| -> Vec<u8> {
            let mut out = format!("<{ext}>").into_bytes();
            out.extend(raw);
            out
        })
        .autoescape_off()
        .build();
    view.add_dir("", tree.path(), Vec::<&str>::new(), false)?;

    assert_eq!(render(&view, "a.tmpl", &json!(null))?, "<.tmpl>tmpl");
    assert_eq!(render(&view, "b.txt", &json!(null))?, "<.txt>txt");
    assert_eq!(render(&view, "noext", &json!(null))?, "<>none");
    Ok(())
}
