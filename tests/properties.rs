use proptest::prelude::*;
use sexpr_plus::grammar::Grammar;
use sexpr_plus::pos::Span;
use sexpr_plus::read::{read_str, write_all};
use sexpr_plus::settings::FRAGMENT_SETTINGS;
use sexpr_plus::value::{atom, string, Node, NodeWithSpan};

/// Atoms made of ordinary characters only
fn plain_atom() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9!#$%&*+./:<=>?@^_~-]{1,20}"
}

/// Atoms that need escapes when written
fn escaped_atom() -> impl Strategy<Value = String> {
    "[#a-z]{1,3}[ ();\"'`,\\\\][#!a-z]{0,3}"
}

fn leaf() -> impl Strategy<Value = Node> {
    prop_oneof![
        plain_atom().prop_map(|s| atom(&s)),
        escaped_atom().prop_map(|s| atom(&s)),
        "#![a-z]{0,5}".prop_map(|s| atom(&s)),
        any::<String>().prop_map(|s| string(&s)),
    ]
}

fn tree() -> impl Strategy<Value = Node> {
    leaf().prop_recursive(4, 48, 6, |inner| {
        prop::collection::vec(inner, 0..6).prop_map(|items| {
            Node::List(items.into_iter().map(|n| n.at(Span::default())).collect())
        })
    })
}

/// Every node's span, cut out of `source`, reads back as that node.
/// The cut out text is not at the start of a buffer, so no shebang.
fn spans_read_back(source: &str, form: &NodeWithSpan) -> bool {
    let text = match form.span().slice(source) {
        Some(text) => text,
        None => return false,
    };
    let ok = match Grammar::with_settings(FRAGMENT_SETTINGS).read(text) {
        Ok(forms) => forms.len() == 1 && forms[0].content_eq(form),
        Err(_) => false,
    };
    ok && form.node().as_list().map_or(true, |items| {
        items.iter().all(|item| spans_read_back(source, item))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn plain_atom_reads_as_itself(s in plain_atom()) {
        let forms = Grammar::with_settings(FRAGMENT_SETTINGS).read(&s).unwrap();
        prop_assert_eq!(forms.len(), 1);
        prop_assert_eq!(forms[0].node().as_atom(), Some(s.as_str()));
        prop_assert_eq!(forms[0].span(), Span::new(0, s.len()));
    }

    #[test]
    fn written_string_reads_back(s in any::<String>()) {
        let written = string(&s).to_string();
        let forms = read_str(&written).unwrap();
        prop_assert_eq!(forms.len(), 1);
        prop_assert_eq!(forms[0].node().as_string(), Some(s.as_str()));
        prop_assert_eq!(forms[0].span(), Span::new(0, written.len()));
    }

    #[test]
    fn written_tree_reads_back(node in tree()) {
        let mut out = Vec::<u8>::new();
        write_all(&mut out, &[node.clone().at(Span::default())]).unwrap();
        let written = String::from_utf8(out).unwrap();
        let start = if written.starts_with(' ') { 1 } else { 0 };
        let forms = read_str(&written).unwrap();
        prop_assert_eq!(forms.len(), 1);
        prop_assert!(forms[0].node().content_eq(&node), "{}", written);
        prop_assert_eq!(forms[0].span(), Span::new(start, written.len() - 1));
        prop_assert!(spans_read_back(&written, &forms[0]), "{}", written);
    }

    #[test]
    fn lazy_and_eager_agree(s in "[a-c ()'\";\\\\\n]{0,30}") {
        let g = Grammar::new();
        let lazy: Result<Vec<_>, _> = g.forms(&s).collect();
        match (g.read(&s), lazy) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(a), Err(b)) => {
                prop_assert_eq!(a.offset(), b.offset());
                prop_assert!(a.offset() <= s.len());
            }
            (a, b) => prop_assert!(false, "{:?} vs {:?}", a, b),
        }
    }
}
