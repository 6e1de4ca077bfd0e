use crate::dom::{Document, NodeData, NodeId};

use super::parser::{is_raw_text, is_void};

/// Serializes `node` and its subtree as HTML. The document node serializes
/// as its children.
pub fn render(doc: &Document, node: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, node, false, &mut out);
    out
}

/// Serializes only the children of `node`.
pub fn inner_html(doc: &Document, node: NodeId) -> String {
    let raw = doc.element(node).is_some_and(|el| is_raw_text(&el.name));
    let mut out = String::new();
    for &child in doc.children(node) {
        write_node(doc, child, raw, &mut out);
    }
    out
}

fn write_node(doc: &Document, node: NodeId, raw_parent: bool, out: &mut String) {
    match doc.data(node) {
        NodeData::Document => {
            for &child in doc.children(node) {
                write_node(doc, child, false, out);
            }
        }
        NodeData::Doctype(body) => {
            out.push_str("<!");
            out.push_str(body);
            out.push('>');
        }
        NodeData::Comment(body) => {
            out.push_str("<!--");
            out.push_str(body);
            out.push_str("-->");
        }
        NodeData::Text(text) => {
            if raw_parent {
                out.push_str(text);
            } else {
                out.push_str(&html_escape::encode_text(text));
            }
        }
        NodeData::Element(el) => {
            out.push('<');
            out.push_str(&el.name);
            for attr in &el.attrs {
                out.push(' ');
                out.push_str(&attr.name);
                out.push_str("=\"");
                out.push_str(&html_escape::encode_double_quoted_attribute(&attr.value));
                out.push('"');
            }
            out.push('>');
            if is_void(&el.name) {
                return;
            }
            out.push_str(&inner_html(doc, node));
            out.push_str("</");
            out.push_str(&el.name);
            out.push('>');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Element;
    use crate::markup::parse;
    use insta::assert_snapshot;

    #[test]
    fn render_round_trips_simple_markup() {
        let html = "<!DOCTYPE html><html><body><p class=\"x\">Hi <b>there</b></p><br><!-- c --></body></html>";
        let doc = parse(html);
        assert_eq!(render(&doc, doc.root()), html);
    }

    #[test]
    fn text_and_attributes_are_escaped() {
        let mut doc = Document::new();
        let a = doc.create_element(Element::new("a").with_attr("title", "say \"hi\" & <go>"));
        let text = doc.create_text("1 < 2 & 3 > 2");
        doc.append_child(doc.root(), a).unwrap();
        doc.append_child(a, text).unwrap();
        assert_snapshot!(render(&doc, doc.root()), @r#"<a title="say &quot;hi&quot; &amp; &lt;go&gt;">1 &lt; 2 &amp; 3 &gt; 2</a>"#);
    }

    #[test]
    fn script_text_is_not_escaped() {
        let html = "<script>if (a < b && c) {}</script>";
        let doc = parse(html);
        assert_eq!(render(&doc, doc.root()), html);
    }

    #[test]
    fn inner_html_skips_the_element_itself() {
        let doc = parse("<div><i>a</i>b</div>");
        let div = doc.children(doc.root())[0];
        assert_eq!(inner_html(&doc, div), "<i>a</i>b");
    }

    #[test]
    fn unquoted_attributes_are_normalised() {
        let doc = parse("<a href=/x target=_blank>go</a>");
        assert_eq!(
            render(&doc, doc.root()),
            "<a href=\"/x\" target=\"_blank\">go</a>"
        );
    }
}
