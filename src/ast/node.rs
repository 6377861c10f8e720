use ast::expression::Expression;
use sass::mixin::{SassMixin, SassMixinCall};
use sass::rule::SassRule;
use sass::variable::SassVariable;

use std::fmt;

/// A property declaration, `name: value`.
#[derive(Clone, Debug, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub value: Expression,
    pub important: bool,
}

impl Declaration {
    pub fn new<S: Into<String>>(name: S, value: Expression) -> Declaration {
        Declaration { name: name.into(), value: value, important: false }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Import {
    pub uri: String,
    pub media: Option<String>,
    pub is_url: bool,
}

impl Import {
    /// Imports the engine leaves for the browser instead of inlining.
    pub fn is_plain_css(&self) -> bool {
        self.is_url ||
            self.media.is_some() ||
            self.uri.ends_with(".css") ||
            self.uri.starts_with("http://") ||
            self.uri.starts_with("https://")
    }

    pub fn to_css(&self) -> String {
        let target = if self.is_url {
            format!("url({})", self.uri)
        } else {
            format!("\"{}\"", self.uri)
        };
        match self.media {
            Some(ref media) => format!("@import {} {};", target, media),
            None => format!("@import {};", target),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Keyframes {
    /// `@keyframes` or a vendor-prefixed spelling.
    pub keyword: String,
    pub name: String,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ListOpKind {
    Append,
    Contains,
    Remove,
}

/// `$variable: <kind>($list, $items, separator)`.
#[derive(Clone, Debug, PartialEq)]
pub struct ListModify {
    pub kind: ListOpKind,
    pub variable: String,
    pub list: Expression,
    pub items: Expression,
    pub separator: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EachDef {
    pub variable: String,
    pub list: Expression,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForDef {
    pub variable: String,
    pub from: Expression,
    pub to: Expression,
    /// `through` rather than `to`.
    pub inclusive: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Root,
    Variable(SassVariable),
    Return(Expression),
    Rule(Declaration),
    Block(SassRule),
    Comment(String),
    Import(Import),
    Extend(Vec<String>),
    Content,
    FontFace,
    MicrosoftRule { name: String, value: String },
    Simple(String),
    KeyframeSelector(Vec<String>),
    Keyframes(Keyframes),
    Media(String),
    FunctionDef(SassMixin),
    Function(SassMixinCall),
    MixinDef(SassMixin),
    Mixin(SassMixinCall),
    NestProperties(String),
    ListModify(ListModify),
    EachDef(EachDef),
    For(ForDef),
    While(String),
    /// Holds `If` branches followed by at most one `Else`.
    IfElseDef,
    If(String),
    Else,
}

impl Node {
    pub fn is_block(&self) -> bool {
        match *self {
            Node::Block(..) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Node::Root => write!(f, "stylesheet"),
            Node::Variable(ref v) => v.fmt(f),
            Node::Return(ref e) => write!(f, "@return {}", e),
            Node::Rule(ref d) => {
                write!(f, "{}: {}", d.name, d.value)?;
                if d.important { write!(f, " !important")?; }
                Ok(())
            },
            Node::Block(ref r) => write!(f, "{}", r.selectors.join(", ")),
            Node::Comment(ref c) => write!(f, "{}", c),
            Node::Import(ref i) => write!(f, "{}", i.to_css()),
            Node::Extend(ref s) => write!(f, "@extend {}", s.join(", ")),
            Node::Content => write!(f, "@content"),
            Node::FontFace => write!(f, "@font-face"),
            Node::MicrosoftRule { ref name, ref value } => write!(f, "{}: {}", name, value),
            Node::Simple(ref s) => write!(f, "{}", s),
            Node::KeyframeSelector(ref s) => write!(f, "{}", s.join(", ")),
            Node::Keyframes(ref k) => write!(f, "{} {}", k.keyword, k.name),
            Node::Media(ref m) => write!(f, "@media {}", m),
            Node::FunctionDef(ref d) => write!(f, "@function {}", d.name),
            Node::Function(ref c) => write!(f, "{}({})", c.name, c.arguments),
            Node::MixinDef(ref d) => write!(f, "@mixin {}", d.name),
            Node::Mixin(ref c) => write!(f, "@include {}({})", c.name, c.arguments),
            Node::NestProperties(ref n) => write!(f, "{}:", n),
            Node::ListModify(ref l) => write!(f, "${}: {:?}({}, {})", l.variable, l.kind, l.list, l.items),
            Node::EachDef(ref e) => write!(f, "@each ${} in {}", e.variable, e.list),
            Node::For(ref d) => write!(f, "@for ${} from {} {} {}",
                                       d.variable, d.from,
                                       if d.inclusive { "through" } else { "to" },
                                       d.to),
            Node::While(ref c) => write!(f, "@while {}", c),
            Node::IfElseDef => write!(f, "@if"),
            Node::If(ref c) => write!(f, "@if {}", c),
            Node::Else => write!(f, "@else"),
        }
    }
}
