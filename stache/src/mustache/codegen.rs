//! Stringified render functions for the Hogan.js client runtime.
//!
//! The generated source is a `function(c,p,i){...}` body suitable for
//! `new Hogan.Template(fn)`. `c` is the context stack, `p` the partials map
//! and `i` the partial indentation.

use super::Node;

pub(super) fn generate(nodes: &[Node]) -> String {
    let mut code = String::from("var _=this;_.b(i=i||\"\");");
    walk(nodes, &mut code);
    code.push_str("return _.fl();");
    format!("function(c,p,i){{{code};}}")
}

fn walk(nodes: &[Node], code: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => {
                code.push_str(&format!("_.b(\"{}\");", escape_js(text)));
            }
            Node::Newline { last: true } => code.push_str("_.b(\"\\n\");"),
            Node::Newline { last: false } => code.push_str("_.b(\"\\n\" + i);"),
            Node::Variable { name, escape } => {
                let method = if *escape { "v" } else { "t" };
                code.push_str(&format!(
                    "_.b(_.{method}(_.{}(\"{}\",c,p,0)));",
                    find_method(name),
                    escape_js(name)
                ));
            }
            Node::Section {
                name,
                inverted: false,
                nodes,
                start,
                end,
                delimiters,
            } => {
                code.push_str(&format!(
                    "if(_.s(_.{}(\"{}\",c,p,1),c,p,0,{start},{end},\"{}\")){{_.rs(c,p,function(c,p,_){{",
                    find_method(name),
                    escape_js(name),
                    escape_js(delimiters)
                ));
                walk(nodes, code);
                code.push_str("});c.pop();}");
            }
            Node::Section {
                name,
                inverted: true,
                nodes,
                ..
            } => {
                code.push_str(&format!(
                    "if(!_.s(_.{}(\"{}\",c,p,1),c,p,1,0,0,\"\")){{",
                    find_method(name),
                    escape_js(name)
                ));
                walk(nodes, code);
                code.push_str("};");
            }
            Node::Partial { name, indent } => {
                code.push_str(&format!(
                    "_.b(_.rp(\"{}\",c,p,\"{}\"));",
                    escape_js(name),
                    escape_js(indent)
                ));
            }
        }
    }
}

/// Dotted names go through the runtime's `d` lookup, plain names through `f`
fn find_method(name: &str) -> &'static str {
    if name.contains('.') {
        "d"
    } else {
        "f"
    }
}

/// Escape text for a double-quoted JavaScript string literal
fn escape_js(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\u{2028}' => escaped.push_str("\\u2028"),
            '\u{2029}' => escaped.push_str("\\u2029"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::super::compile;
    use super::*;

    fn script(text: &str) -> String {
        compile(text).unwrap().to_script()
    }

    #[test]
    fn test_generate_text_and_variable() {
        assert_eq!(
            script("Hello {{name}}!"),
            "function(c,p,i){var _=this;_.b(i=i||\"\");_.b(\"Hello \");\
             _.b(_.v(_.f(\"name\",c,p,0)));_.b(\"!\");return _.fl();;}"
        );
    }

    #[test]
    fn test_generate_unescaped_and_dotted() {
        let code = script("{{{a.b}}}");
        assert!(code.contains("_.b(_.t(_.d(\"a.b\",c,p,0)));"));
    }

    #[test]
    fn test_generate_newlines() {
        let code = script("a\nb\n");
        assert!(code.contains("_.b(\"a\");_.b(\"\\n\" + i);_.b(\"b\");_.b(\"\\n\");"));
    }

    #[test]
    fn test_generate_section() {
        let code = script("{{#items}}x{{/items}}");
        assert!(code.contains(
            "if(_.s(_.f(\"items\",c,p,1),c,p,0,10,11,\"{{ }}\")){_.rs(c,p,function(c,p,_){_.b(\"x\");});c.pop();}"
        ));
    }

    #[test]
    fn test_generate_inverted_section() {
        let code = script("{{^empty}}none{{/empty}}");
        assert!(code.contains("if(!_.s(_.f(\"empty\",c,p,1),c,p,1,0,0,\"\")){_.b(\"none\");};"));
    }

    #[test]
    fn test_generate_partial_with_indent() {
        let code = script("  {{> row}}\n");
        assert!(code.contains("_.b(_.rp(\"row\",c,p,\"  \"));"));
    }

    #[test]
    fn test_escape_js() {
        assert_eq!(escape_js("a\"b\\c\r\u{2028}"), "a\\\"b\\\\c\\r\\u2028");
    }
}
