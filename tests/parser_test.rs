use treemaker::lexer::{tokenize, LexErrorKind, Lexer, LexerConfig};
use treemaker::parser::{parse, parse_source, ParseOutput, ViolationKind};
use treemaker::token::TokenKind;
use treemaker::tree::Tree;

fn parse_str(source: &str) -> ParseOutput {
    parse_source("test.trm", source.as_bytes(), &LexerConfig::default()).unwrap()
}

fn describe(tree: &Tree) -> Vec<String> {
    tree.pre_order()
        .map(|(depth, id)| {
            let node = tree.node(id);
            let marker = if node.is_directory() { "/" } else { "" };
            format!("{}{}{}", depth, node.name(), marker)
        })
        .collect()
}

#[test]
fn test_scenario_nested_directories() {
    let output = parse_str("a/\n    b\n    c/\n        d\n");

    let tree = &output.tree;
    let root = tree.root().unwrap();
    assert_eq!(tree.node(root).name(), "a");
    assert!(tree.node(root).is_directory());

    let children = tree.node(root).children();
    assert_eq!(children.len(), 2);
    assert_eq!(tree.node(children[0]).name(), "b");
    assert!(!tree.node(children[0]).is_directory());
    assert_eq!(tree.node(children[1]).name(), "c");
    assert!(tree.node(children[1]).is_directory());

    let grandchildren = tree.node(children[1]).children();
    assert_eq!(grandchildren.len(), 1);
    assert_eq!(tree.node(grandchildren[0]).name(), "d");
    assert!(!tree.node(grandchildren[0]).is_directory());
}

#[test]
fn test_scenario_bad_dedent() {
    let source = b"a/\n    b/\n        c\n   d\n        e\n";

    let (tokens, errors) = tokenize(source, &LexerConfig::default());
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, LexErrorKind::BadIndent);
    assert_eq!(errors[0].line, 4);
    assert!(errors[0].message.ends_with("[0, 4, 8]"));

    let names: Vec<_> = tokens.iter().filter_map(|t| t.text.clone()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));

    let (_, errors) = tokenize(source, &LexerConfig::collect_all());
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_scenario_two_roots() {
    let output = parse_str("alpha/\nbeta/\n");

    assert_eq!(describe(&output.tree), vec!["0alpha/"]);
    assert_eq!(output.violations.len(), 1);
    let violation = &output.violations[0];
    assert_eq!(violation.kind, ViolationKind::SecondRoot);
    assert_eq!((violation.line, violation.column), (2, 1));
    assert_eq!(violation.name.as_deref(), Some("beta"));
}

#[test]
fn test_scenario_comment_between_siblings() {
    let source = "a/\n    b\n# between\n    c\n";

    let mut lexer = Lexer::new(source.as_bytes(), LexerConfig::default());
    let mut structural = 0;
    let mut stacks = Vec::new();
    while let Some(token) = lexer.next() {
        match token.kind {
            TokenKind::Indent | TokenKind::Dedent => structural += 1,
            TokenKind::Name => stacks.push(lexer.indent_widths().to_vec()),
            _ => {}
        }
    }
    // One INDENT before b and one DEDENT at end of input.
    assert_eq!(structural, 2);
    assert_eq!(stacks[1], stacks[2]);

    let output = parse_str(source);
    assert_eq!(describe(&output.tree), vec!["0a/", "1b", "1c"]);
}

#[test]
fn test_recovery_after_unexpected_character() {
    let source = b"root/\n    ok\n    b@d!\n    fine\n";
    let (tokens, errors) = tokenize(source, &LexerConfig::collect_all());
    assert_eq!(errors.len(), 1);

    let output = parse(tokens).unwrap();
    assert_eq!(
        describe(&output.tree),
        vec!["0root/", "1ok", "1b@d", "1fine"]
    );
    assert!(output.violations.is_empty());
}

#[test]
fn test_teardown_twice() {
    let mut output = parse_str("a/\n    b/\n        c\n");
    assert_eq!(output.tree.clear(), 3);
    assert_eq!(output.tree.clear(), 0);
    assert!(output.tree.is_empty());
}

#[test]
fn test_reparse_of_printed_tree_with_tabs() {
    let config = LexerConfig {
        tab_width: 8,
        ..LexerConfig::default()
    };
    let source = b"top\n\tmid\n\t\tleaf\n\tother/\n";
    let output = parse_source("t.trm", source, &config).unwrap();
    let printed = output.tree.to_string();
    assert_eq!(printed, "top/\n    mid/\n        leaf\n    other/\n");

    let reparsed = parse_str(&printed);
    assert_eq!(describe(&output.tree), describe(&reparsed.tree));
}
