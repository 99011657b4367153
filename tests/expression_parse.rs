use cpeal::{fact, parse, Expr, Platform, ProductCatalog};

#[test]
fn parse_single_fact() {
    assert_eq!(parse("machine").unwrap(), fact("machine"));
    assert_eq!(parse("  rhel7-workstation  ").unwrap(), fact("rhel7-workstation"));
}

#[test]
fn parse_and_binds_tighter_than_or() {
    let expr = parse("systemd and yum or ntp").unwrap();
    assert_eq!(expr, fact("systemd").and(fact("yum")).or(fact("ntp")));

    let expr = parse("ntp or systemd and yum").unwrap();
    assert_eq!(expr, fact("ntp").or(fact("systemd").and(fact("yum"))));
}

#[test]
fn parse_chains_into_one_group() {
    let expr = parse("a and b and c").unwrap();
    assert_eq!(expr, Expr::And(vec![fact("a"), fact("b"), fact("c")]));
}

#[test]
fn parse_parentheses_override_precedence() {
    let expr = parse("systemd and (ntp or chrony)").unwrap();
    assert_eq!(expr, fact("systemd").and(fact("ntp").or(fact("chrony"))));
}

#[test]
fn parse_negation_forms() {
    assert_eq!(parse("!yum").unwrap(), !fact("yum"));
    assert_eq!(parse("not yum").unwrap(), !fact("yum"));
    assert_eq!(parse("NOT yum").unwrap(), !fact("yum"));
    assert_eq!(parse("!!yum").unwrap(), !!fact("yum"));
    assert_eq!(parse("!(a or b)").unwrap(), !(fact("a").or(fact("b"))));
}

#[test]
fn parse_keywords_are_case_insensitive() {
    assert_eq!(parse("ntp OR chrony").unwrap(), parse("ntp or chrony").unwrap());
    assert_eq!(parse("ntp And chrony").unwrap(), parse("ntp and chrony").unwrap());
}

#[test]
fn parse_keyword_prefixes_are_identifiers() {
    assert_eq!(parse("order").unwrap(), fact("order"));
    assert_eq!(parse("notify and android").unwrap(), fact("notify").and(fact("android")));
}

#[test]
fn parse_display_round_trip() {
    for text in [
        "systemd and !yum and (ntp or chrony)",
        "!(a and b) or c",
        "not not x",
        "a or (b and (c or d))",
    ] {
        let expr = parse(text).unwrap();
        assert_eq!(parse(&expr.to_string()).unwrap(), expr, "{text}");
    }
}

#[test]
fn parse_errors() {
    for text in [
        "", "   ", "()", "ntp and", "or ntp", "(ntp", "ntp)", "ntp chrony", "ntp && chrony", "!",
        "ntp or or chrony", "and",
    ] {
        let err = parse(text).unwrap_err();
        assert!(!err.message().is_empty(), "{text:?}");
        assert!(err.offset() <= text.len(), "{text:?}");
    }
}

#[test]
fn parse_error_surfaces_through_platform() {
    let catalog = ProductCatalog::builder("rhel7").package("ntp").build().unwrap();
    let err = Platform::from_text("(ntp", &catalog).unwrap_err();
    assert!(err.to_string().starts_with("syntax error at offset"));
}
