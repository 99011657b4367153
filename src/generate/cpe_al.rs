use crate::types::Node;

/// Namespace of the CPE Applicability Language.
pub const CPE_LANG_NS: &str = "http://cpe.mitre.org/language/2.0";

const XML_DECLARATION: &str = "<?xml version='1.0' encoding='utf8'?>\n";
const PREFIX: &str = "ns0";

/// Render `node` as a CPE-AL `platform` document with the given `id`.
///
/// Every fact is listed, including product identities that the shell and
/// Ansible backends fold away. Inside a logical test, nested tests precede
/// fact references, as the CPE-AL schema requires.
#[must_use]
pub fn xml_element(id: &str, node: &Node) -> Vec<u8> {
    let mut out = String::with_capacity(256);
    out.push_str(XML_DECLARATION);
    out.push_str(&format!(
        "<{PREFIX}:platform xmlns:{PREFIX}=\"{CPE_LANG_NS}\" id=\"{}\">",
        escape_attr(id)
    ));
    match node {
        // A bare fact still needs a logical test around it.
        Node::Fact(_) => logical_test(&mut out, "AND", false, std::slice::from_ref(node)),
        _ => write_test(&mut out, node),
    }
    out.push_str(&format!("</{PREFIX}:platform>"));
    out.into_bytes()
}

fn write_test(out: &mut String, node: &Node) {
    match node {
        Node::Fact(_) => fact_ref(out, node),
        Node::And(operands) => logical_test(out, "AND", false, operands),
        Node::Or(operands) => logical_test(out, "OR", false, operands),
        Node::Not(inner) => match inner.as_ref() {
            Node::And(operands) => logical_test(out, "AND", true, operands),
            Node::Or(operands) => logical_test(out, "OR", true, operands),
            Node::Fact(_) | Node::Not(_) => {
                logical_test(out, "AND", true, std::slice::from_ref(inner.as_ref()));
            }
        },
    }
}

fn logical_test(out: &mut String, operator: &str, negate: bool, children: &[Node]) {
    out.push_str(&format!(
        "<{PREFIX}:logical-test operator=\"{operator}\" negate=\"{negate}\">"
    ));
    for child in children.iter().filter(|c| !matches!(c, Node::Fact(_))) {
        write_test(out, child);
    }
    for child in children.iter().filter(|c| matches!(c, Node::Fact(_))) {
        fact_ref(out, child);
    }
    out.push_str(&format!("</{PREFIX}:logical-test>"));
}

fn fact_ref(out: &mut String, node: &Node) {
    if let Node::Fact(fact) = node {
        out.push_str(&format!(
            "<{PREFIX}:fact-ref name=\"{}\" />",
            escape_attr(fact.cpe_id())
        ));
    }
}

fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            '\t' => escaped.push_str("&#09;"),
            c => escaped.push(c),
        }
    }
    escaped
}
