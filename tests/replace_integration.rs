//! Rewriting whole trees with replace, sub, gsub and find_and_replace_all.

use sexp_path::{find_and_replace_all, gsub, replace, search, sub, Matcher, Sexp, Value};

fn example_test() -> Sexp {
    Sexp::parse(include_str!("fixtures/example_test.sexp")).unwrap()
}

fn v(text: &str) -> Value {
    Value::List(Sexp::parse(text).unwrap())
}

#[test]
fn gsub_rewrites_every_duplicate() {
    let tree = example_test();
    let sum = Sexp::parse("(call (lit 1) + (lit 2))").unwrap();
    let before = search(&tree, &Matcher::from(sum.clone())).unwrap().count();
    assert_eq!(before, 3);

    let out = gsub(tree, sum.clone(), &v("(lit 3)")).into_sexp().unwrap();
    assert_eq!(search(&out, &Matcher::from(sum)).unwrap().count(), 0);
    assert!(out.to_source().contains("(call nil assert_equal (lit 3) (lit 4))"));
}

#[test]
fn sub_rewrites_only_the_first_test() {
    let tree = example_test();
    let test_a = "(defn test_a ___)".parse::<Matcher>().unwrap();

    let out = sub(tree, test_a.clone(), &v("(defn test_c (args) (nil))"))
        .into_sexp()
        .unwrap();
    let names: Vec<_> = search(&out, &"(defn [m /^test_/] ___)".parse::<Matcher>().unwrap())
        .unwrap()
        .map(|r| r.node[1].to_source())
        .collect();
    assert_eq!(names, vec!["test_c", "test_b", "test_a"]);
}

#[test]
fn replace_sees_each_match_once_with_its_path() {
    let tree = example_test();
    let mut seen = Vec::new();
    let out = replace(tree, &Matcher::t("lit"), |r| {
        seen.push(r.path.to_string());
        match &r.node[1] {
            Value::Int(n) => Value::Int(n * 10),
            other => other.clone(),
        }
    })
    .unwrap();

    assert_eq!(seen.len(), 8);
    assert_eq!(seen[0], "/2/3/3/1");
    let source = out.to_source();
    assert!(source.contains("(defn setup (args) (call 10 + 20))"), "{source}");
    assert!(!source.contains("(lit "));
}

#[test]
fn replacing_the_root() {
    let out = replace(example_test(), &Matcher::t("block"), |_| Value::Nil).unwrap();
    assert_eq!(out, Value::Nil);
}

#[test]
fn renames_atoms_everywhere() {
    let mut tree = example_test();
    let count = find_and_replace_all(&mut tree, &Value::sym("test_a"), &Value::sym("test_x"));
    assert_eq!(count, 2);
    assert!(!tree.to_source().contains("test_a"));

    let unchanged = find_and_replace_all(&mut tree, &Value::sym("nope"), &Value::Nil);
    assert_eq!(unchanged, 0);
}
