//! Renders, registration and refresh running at the same time.

use anyhow::Result;
use serde_json::json;
use std::thread;
use viewreg::templating::View;
use viewreg::test_utils::TemplateTree;

const ROUNDS: usize = 25;
const READERS: usize = 4;

/// Parse "A<n>[B<m>]" into (n, m).
fn versions(output: &str) -> Option<(usize, usize)> {
    let rest = output.strip_prefix('A')?;
    let (a, rest) = rest.split_once('[')?;
    let b = rest.strip_prefix('B')?.strip_suffix(']')?;
    Some((a.parse().ok()?, b.parse().ok()?))
}

fn write_version(tree: &TemplateTree, version: usize) -> Result<()> {
    tree.write("b.tmpl", &format!("B{version}"))?;
    tree.write("a.tmpl", &format!("A{version}[{{% include \"b.tmpl\" %}}]"))?;
    Ok(())
}

#[test]
fn test_renders_never_mix_generations() -> Result<()> {
    let tree = TemplateTree::new()?;
    write_version(&tree, 0)?;

    let view = View::default();
    view.add_dir("", tree.path(), [".tmpl"], false)?;

    thread::scope(|scope| {
        for _ in 0..READERS {
            scope.spawn(|| {
                let mut last = 0;
                for _ in 0..ROUNDS * 10 {
                    let bytes = view.render("a.tmpl", &json!(null)).unwrap();
                    let output = String::from_utf8(bytes).unwrap();
                    let (a, b) = versions(&output).unwrap();
                    assert_eq!(a, b, "render mixed two generations: {output}");
                    assert!(a >= last, "render went back in time: {a} < {last}");
                    last = a;
                }
            });
        }

        scope.spawn(|| {
            for version in 1..=ROUNDS {
                write_version(&tree, version).unwrap();
                assert!(view.refresh().is_empty());
            }
        });
    });

    let output = String::from_utf8(view.render("a.tmpl", &json!(null))?)?;
    assert_eq!(output, format!("A{ROUNDS}[B{ROUNDS}]"));
    Ok(())
}

#[test]
fn test_registration_during_refresh_is_not_lost() -> Result<()> {
    let tree = TemplateTree::new()?;
    for i in 0..ROUNDS {
        tree.write(&format!("t{i}.tmpl"), &format!("{i}"))?;
    }

    let view = View::default();

    thread::scope(|scope| {
        scope.spawn(|| {
            for i in 0..ROUNDS {
                view.add_template(&format!("t{i}"), tree.file(&format!("t{i}.tmpl"))).unwrap();
            }
        });

        scope.spawn(|| {
            for _ in 0..ROUNDS {
                assert!(view.refresh().is_empty());
            }
        });
    });

    assert_eq!(view.aliases().len(), ROUNDS);
    assert_eq!(view.loaded_aliases().len(), ROUNDS);
    for i in 0..ROUNDS {
        let output = String::from_utf8(view.render(&format!("t{i}"), &json!(null))?)?;
        assert_eq!(output, i.to_string());
    }
    Ok(())
}

#[test]
fn test_view_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<View>();
}
