// 📤 Graph Exporter - DOT text of who owes whom
//
// Nodes sorted by key, labeled with display names. One edge per ordered pair
// with a positive aggregate (gross, not netted), labeled "$D.CC".

use crate::entities::MembershipStore;
use crate::graph::DebtGraph;
use crate::money::format_major;

pub struct GraphExporter;

impl GraphExporter {
    pub fn to_dot(group_name: &str, graph: &DebtGraph, members: &MembershipStore) -> String {
        let mut out = format!("digraph {} {{\n", quote(group_name));
        for key in members.keys() {
            out.push_str(&format!(
                "  {} [label={}];\n",
                quote(key),
                quote(members.display_name(key))
            ));
        }
        for ((from, to), units) in graph.pair_totals() {
            if units <= 0 {
                continue;
            }
            out.push_str(&format!(
                "  {} -> {} [label={}];\n",
                quote(&from),
                quote(&to),
                quote(&format_major(units))
            ));
        }
        out.push_str("}\n");
        out
    }
}

/// Double-quoted DOT identifier with `"` and `\` escaped
fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
