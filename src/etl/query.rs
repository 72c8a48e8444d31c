use std::sync::OnceLock;

use regex::Regex;

use crate::data::osm::ElementKind;
use crate::data::route::Coordinate;
use crate::data::rules::{Condition, Rule};
use crate::errors::{Error, Result};

const HEADER: &str = "[out:json];";
/// Pulls in the nodes of any ways found, then asks for full metadata.
const FOOTER: &str = ";\n(._;>;);\nout meta;";

/// Renders the Overpass QL for `kind` elements matching `rule` around `chunk`.
/// The text is the cache key input, so the output must be byte-stable.
pub fn compile(kind: ElementKind, rule: &Rule, chunk: &[Coordinate]) -> Result<String> {
    if chunk.is_empty() {
        return Err(Error::input("cannot compile a query for an empty route chunk"));
    }
    let mut query = String::from(HEADER);
    query.push_str(kind.as_str());
    for condition in rule.conditions() {
        query.push_str(&render_condition(condition));
    }
    query.push_str(&render_around(rule.radius_m(), chunk));
    query.push_str(FOOTER);
    Ok(query)
}

fn render_condition(condition: &Condition) -> String {
    match condition {
        Condition::OneOf { key, values } => {
            let alternation = values.iter()
                .map(|value| escape_regex(value))
                .collect::<Vec<_>>()
                .join("|");
            format!("[{}~{}]", quote(key), quote(&format!("^({})$", alternation)))
        }
        Condition::NoneOf { key, values } => values.iter()
            .map(|value| format!("[{}!={}]", quote(key), quote(value)))
            .collect(),
        Condition::Exists { key, present: true } => format!("[{}]", quote(key)),
        Condition::Exists { key, present: false } => format!("[!{}]", quote(key)),
    }
}

fn render_around(radius_m: u32, chunk: &[Coordinate]) -> String {
    let points = chunk.iter()
        .map(|c| format!("{:.6},{:.6}", c.lat, c.lon))
        .collect::<Vec<_>>()
        .join(",");
    format!("(around:{},{})", radius_m, points)
}

/// Escapes POSIX extended regex metacharacters so values match literally.
fn escape_regex(value: &str) -> String {
    static META: OnceLock<Regex> = OnceLock::new();
    let meta = META.get_or_init(|| Regex::new(r"[\\.\[\](){}*+?|^$]").expect("valid regex"));
    meta.replace_all(value, r"\$0").into_owned()
}

fn quote(literal: &str) -> String {
    format!("\"{}\"", literal.replace('\\', "\\\\").replace('"', "\\\""))
}
