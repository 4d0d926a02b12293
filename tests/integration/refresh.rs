//! Reloading templates from disk.

use anyhow::Result;
use serde_json::json;
use viewreg::core::ErrorKind;
use viewreg::templating::View;
use viewreg::test_utils::TemplateTree;

fn render(view: &View, alias: &str, data: &serde_json::Value) -> Result<String> {
    Ok(String::from_utf8(view.render(alias, data)?)?)
}

#[test]
fn test_deleted_template_is_dropped_then_restored() -> Result<()> {
    let tree = TemplateTree::with_files(&[
        ("templates/a.tmpl", "Hello {{ Name }}"),
        ("templates/sub/b.tmpl", "Bye {{ Name }}"),
    ])?;

    let view = View::default();
    view.add_dir("", tree.file("templates"), [".tmpl"], true)?;
    assert_eq!(
        view.aliases().into_iter().collect::<Vec<_>>(),
        vec!["a.tmpl", "sub/b.tmpl"]
    );
    assert_eq!(render(&view, "a.tmpl", &json!({"Name": "Amy"}))?, "Hello Amy");
    assert_eq!(render(&view, "sub/b.tmpl", &json!({"Name": "Bo"}))?, "Bye Bo");

    tree.remove("templates/a.tmpl")?;
    assert_eq!(view.refresh(), vec!["a.tmpl".to_string()]);

    let err = view.render("a.tmpl", &json!({"Name": "Amy"})).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TemplateNotFound);
    assert_eq!(render(&view, "sub/b.tmpl", &json!({"Name": "Bo"}))?, "Bye Bo");
    assert_eq!(view.aliases().len(), 2);

    tree.write("templates/a.tmpl", "Hi {{ Name }}")?;
    assert!(view.refresh().is_empty());
    assert_eq!(render(&view, "a.tmpl", &json!({"Name": "Amy"}))?, "Hi Amy");
    Ok(())
}

#[test]
fn test_refresh_picks_up_edits() -> Result<()> {
    let tree = TemplateTree::with_files(&[("page.tmpl", "v1")])?;

    let view = View::default();
    view.add_template("page", tree.file("page.tmpl"))?;

    tree.write("page.tmpl", "v2")?;
    assert_eq!(render(&view, "page", &json!(null))?, "v1");

    assert!(view.refresh().is_empty());
    assert_eq!(render(&view, "page", &json!(null))?, "v2");
    Ok(())
}

#[test]
fn test_broken_edit_drops_only_that_template() -> Result<()> {
    let tree = TemplateTree::with_files(&[("a.tmpl", "A"), ("b.tmpl", "B"), ("c.tmpl", "C")])?;

    let view = View::default();
    view.add_dir("", tree.path(), [".tmpl"], false)?;

    tree.write("b.tmpl", "{{ unclosed")?;
    let report = view.refresh_report();

    assert_eq!(report.dropped_aliases(), vec!["b.tmpl"]);
    assert_eq!(report.dropped[0].error.kind(), ErrorKind::Parse);
    assert_eq!(report.dropped[0].path, tree.file("b.tmpl"));
    assert_eq!(report.loaded, vec!["a.tmpl", "c.tmpl"]);
    assert_eq!(view.loaded_aliases().len(), 2);
    Ok(())
}

#[test]
fn test_refresh_orders_inheritance_independently_of_aliases() -> Result<()> {
    // "a-page" sorts before "z-layout" but extends it
    let tree = TemplateTree::with_files(&[
        ("z-layout.html", "<{% block body %}{% endblock %}>"),
        ("a-page.html", "{% extends \"z-layout.html\" %}{% block body %}{{ v }}{% endblock %}"),
    ])?;

    let view = View::default();
    view.add_template("z-layout.html", tree.file("z-layout.html"))?;
    view.add_template("a-page.html", tree.file("a-page.html"))?;

    assert!(view.refresh().is_empty());
    assert_eq!(render(&view, "a-page.html", &json!({"v": 1}))?, "<1>");
    Ok(())
}

#[test]
fn test_missing_parent_drops_dependants() -> Result<()> {
    let tree = TemplateTree::with_files(&[
        ("base.html", "[{% block b %}{% endblock %}]"),
        ("child.html", "{% extends \"base.html\" %}{% block b %}c{% endblock %}"),
        ("other.html", "other"),
    ])?;

    let view = View::default();
    view.add_dir("", tree.path(), [".html"], false)?;

    tree.remove("base.html")?;
    let report = view.refresh_report();

    assert_eq!(report.dropped_aliases(), vec!["base.html", "child.html"]);
    assert_eq!(report.dropped[0].error.kind(), ErrorKind::NotFound);
    assert_eq!(report.dropped[1].error.kind(), ErrorKind::Parse);
    assert_eq!(report.loaded, vec!["other.html"]);
    Ok(())
}

#[test]
fn test_file_replaced_by_directory_is_dropped() -> Result<()> {
    let tree = TemplateTree::with_files(&[("x.tmpl", "x")])?;

    let view = View::default();
    view.add_template("x.tmpl", tree.file("x.tmpl"))?;

    tree.remove("x.tmpl")?;
    tree.mkdir("x.tmpl")?;
    let report = view.refresh_report();

    assert_eq!(report.dropped.len(), 1);
    assert_eq!(report.dropped[0].error.kind(), ErrorKind::NotRegularFile);
    Ok(())
}

#[test]
fn test_new_files_need_registration() -> Result<()> {
    let tree = TemplateTree::with_files(&[("a.tmpl", "A")])?;

    let view = View::default();
    view.add_dir("", tree.path(), [".tmpl"], false)?;

    tree.write("b.tmpl", "B")?;
    assert!(view.refresh().is_empty());
    assert!(!view.is_loaded("b.tmpl"));

    view.add_dir("", tree.path(), [".tmpl"], false)?;
    assert!(view.is_loaded("b.tmpl"));
    Ok(())
}
