/// The selector list of a style block. Declarations and nested blocks are the
/// block node's children in the tree.
#[derive(Clone, Debug, PartialEq)]
pub struct SassRule {
    pub selectors: Vec<String>,
}

impl SassRule {
    pub fn new(selectors: Vec<String>) -> SassRule {
        SassRule { selectors: selectors }
    }

    /// Prefixes every selector with every parent selector. `&` stands for the
    /// parent; without it the two are joined as descendants.
    pub fn nest_under(&mut self, parents: &[String]) {
        if parents.is_empty() {
            return
        }
        self.selectors = parents.iter().flat_map(|p| {
            self.selectors.iter().map(move |s| {
                if s.contains('&') {
                    s.replace("&", p.trim())
                } else {
                    format!("{} {}", p.trim(), s)
                }
            })
        }).collect();
    }

    /// Adds `extender` variants of every selector that mentions `target`.
    pub fn extend(&mut self, target: &str, extenders: &[String]) -> bool {
        let mut added = false;
        let mut extended = vec![];
        for s in self.selectors.iter() {
            if !mentions_simple_selector(s, target) {
                continue;
            }
            for e in extenders.iter() {
                let candidate = replace_simple_selector(s, target, e);
                if !self.selectors.contains(&candidate) && !extended.contains(&candidate) {
                    extended.push(candidate);
                }
            }
        }
        if !extended.is_empty() {
            added = true;
            self.selectors.extend(extended);
        }
        added
    }
}

fn continues_selector(c: Option<char>) -> bool {
    match c {
        Some(c) => c.is_alphanumeric() || c == '-' || c == '_',
        None => false,
    }
}

fn simple_selector_positions(selector: &str, target: &str) -> Vec<usize> {
    if target.is_empty() {
        return vec![]
    }
    selector.match_indices(target).filter(|&(i, _)| {
        let after = selector[i + target.len()..].chars().next();
        let before = selector[..i].chars().next_back();
        let starts_clean = match target.chars().next() {
            Some('.') | Some('#') | Some('[') | Some(':') => true,
            _ => !continues_selector(before),
        };
        starts_clean && !continues_selector(after)
    }).map(|(i, _)| i).collect()
}

fn mentions_simple_selector(selector: &str, target: &str) -> bool {
    !simple_selector_positions(selector, target).is_empty()
}

fn replace_simple_selector(selector: &str, target: &str, extender: &str) -> String {
    let mut output = String::new();
    let mut last = 0;
    for i in simple_selector_positions(selector, target) {
        output.push_str(&selector[last..i]);
        output.push_str(extender);
        last = i + target.len();
    }
    output.push_str(&selector[last..]);
    output
}
