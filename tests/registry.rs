use anyhow::Result;
use sexpr_plus::chars::is_reserved_char;
use sexpr_plus::grammar::{self, Grammar, GrammarError, NodeHandle, Rule, SkipHandle, SlotKind};
use sexpr_plus::parse::{ParseError, Reply};
use sexpr_plus::pos::Span;
use sexpr_plus::rules::{self, skip_optional};
use sexpr_plus::value::{atom, Node};

fn bracket_atom() -> Rule {
    rules::atom_with(|c: char| is_reserved_char(c) || c == '[' || c == ']')
}

/// `[a b]` read as `(vector a b)`.
fn vector(expression: NodeHandle, trivia: SkipHandle) -> Rule {
    Rule::node(move |cur, at| {
        if !cur.rest(at).starts_with('[') {
            return Reply::fail(at, "opening bracket")
        }
        let mut pos = match skip_optional(cur, trivia, at + 1) {
            Ok(pos) => pos,
            Err(a) => return Reply::Abort(a),
        };
        let mut items = vec![atom("vector").at(Span::new(at, at + 1))];
        loop {
            match cur.node(expression, pos) {
                Reply::Ok { value, next, .. } => {
                    items.push(value);
                    pos = next;
                }
                Reply::Err(_) => break,
                Reply::Abort(a) => return Reply::Abort(a),
            }
        }
        if cur.rest(pos).starts_with(']') {
            Reply::ok(Node::List(items).at(Span::new(at, pos + 1)), pos + 1)
        } else {
            Reply::fail(pos, "closing bracket")
        }
    })
}

fn vector_dialect() -> Result<Grammar> {
    let mut g = Grammar::new();
    let b = *g.builtins();
    g.replace(grammar::ATOM, bracket_atom())?;
    g.define("vector", vector(b.expression, b.trivia))?;
    let vector = g.node_handle("vector")?;
    g.replace(grammar::EXPRESSION,
              rules::alternation(vec![b.list, vector, b.atom, b.string, b.quote],
                                 b.trivia))?;
    Ok(g)
}

#[test]
fn dialect_with_new_token_kind() -> Result<()> {
    let g = vector_dialect()?;
    let forms = g.read("(f [1 [2]] 'x) [ ]")?;
    assert_eq!(forms[0].to_string(), "(f (vector 1 (vector 2)) (quote x))");
    assert_eq!(forms[1].to_string(), "(vector)");
    assert_eq!(forms[1].span(), Span::new(15, 18));

    let e = g.read("[a").unwrap_err();
    assert!(matches!(&e.err, ParseError::Unexpected { expected }
                     if expected.iter().any(|x| x == "closing bracket")));
    Ok(())
}

#[test]
fn replace_is_seen_by_existing_rules() -> Result<()> {
    let mut g = Grammar::new();
    assert_eq!(g.read("(a (b[c]))")?[0].to_string(), "(a (b[c]))");

    g.replace(grammar::ATOM, bracket_atom())?;
    // the list rule was built before, and reaches the atom slot
    // through the expression slot
    let e = g.read("(a (b[c]))").unwrap_err();
    assert_eq!(e.offset(), 5);
    Ok(())
}

#[test]
fn cloned_rule_is_a_snapshot() -> Result<()> {
    let mut g = Grammar::new();
    let classic = g.clone_rule(grammar::ATOM)?;
    g.replace(grammar::ATOM, bracket_atom())?;
    g.define("classic-atom", classic)?;

    let n = g.parse_slot("classic-atom", " a[b] ")?;
    assert_eq!(n.node().as_atom(), Some("a[b]"));
    assert_eq!(n.span(), Span::new(1, 5));
    assert!(g.parse_slot(grammar::ATOM, "a[b]").is_err());
    assert_eq!(g.parse_slot(grammar::ATOM, "ab")?.node().as_atom(), Some("ab"));
    Ok(())
}

#[test]
fn grammars_are_independent() -> Result<()> {
    let mut g1 = Grammar::new();
    let g2 = Grammar::new();
    let g3 = g1.clone();
    g1.replace(grammar::ATOM, bracket_atom())?;
    assert!(g1.read("a[b]").is_err());
    assert_eq!(g2.read("a[b]")?.len(), 1);
    assert_eq!(g3.read("a[b]")?.len(), 1);
    Ok(())
}

#[test]
fn replace_comment_syntax() -> Result<()> {
    let mut g = Grammar::new();
    g.replace(grammar::COMMENT, Rule::skip(|cur, at| {
        let rest = cur.rest(at);
        if !rest.starts_with('#') {
            return Reply::fail(at, "comment")
        }
        let len = rest.find('\n').map_or(rest.len(), |i| i + 1);
        Reply::ok((), at + len)
    }))?;
    let forms = g.read("a # not read\nb")?;
    assert_eq!(forms.len(), 2);
    assert!(g.read("a ; no longer a comment").is_err());
    Ok(())
}

#[test]
fn registry_errors() {
    let mut g = Grammar::new();
    assert!(matches!(g.replace("nope", rules::whitespace()),
                     Err(GrammarError::UnknownSlot(name)) if name.as_str() == "nope"));
    assert!(matches!(g.replace(grammar::ATOM, rules::whitespace()),
                     Err(GrammarError::KindMismatch {
                         expected: SlotKind::Node,
                         got: SlotKind::Skip,
                         ..
                     })));
    assert!(matches!(g.define(grammar::LIST, rules::string()),
                     Err(GrammarError::DuplicateSlot(name)) if name.as_str() == "list"));
    assert!(g.skip_handle(grammar::ATOM).is_err());
    assert!(g.node_handle(grammar::TRIVIA).is_err());
    assert!(g.clone_rule("nope").is_err());
    assert!(g.parse_slot("nope", "x").is_err());
    // nothing was changed by the failed calls
    assert_eq!(g.read("(a b)").unwrap()[0].to_string(), "(a b)");
}

#[test]
fn slot_names() {
    let g = Grammar::new();
    assert_eq!(g.slot_names(),
               vec!["atom", "comment", "expression", "list", "quote",
                    "shebang", "string", "trivia", "whitespace"]);
}

#[test]
fn concurrent_reads() -> Result<()> {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Grammar>();

    let shared = Grammar::new();
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4).map(|i| {
            let shared = &shared;
            s.spawn(move || {
                let own = vector_dialect().unwrap();
                let src = format!("(n {i}) [x]");
                (shared.read(&src).unwrap()[1].to_string(),
                 own.read(&src).unwrap()[1].to_string())
            })
        }).collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), ("[x]".to_string(), "(vector x)".to_string()));
        }
    });
    Ok(())
}

#[test]
fn handles_belong_to_their_grammar() -> Result<()> {
    let mut other = Grammar::new();
    other.define("extra", rules::string())?;
    let foreign = other.node_handle("extra")?;

    let mut g = Grammar::new();
    let b = *g.builtins();
    g.replace(grammar::EXPRESSION, rules::alternation(vec![foreign], b.trivia))?;
    // no such slot here: the rule never matches and asks for nothing
    let e = g.read("\"x\"").unwrap_err();
    assert_eq!(e.offset(), 0);
    assert_eq!(e.err, ParseError::Unexpected { expected: vec!["end of input".to_string()] });
    Ok(())
}
