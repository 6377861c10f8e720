use ast::expression::Expression;

/// One `$name` bound to an already evaluated value.
#[derive(Clone, Debug, PartialEq)]
pub struct Binding {
    pub name: String,
    pub value: Expression,
}

impl Binding {
    pub fn new<S: Into<String>>(name: S, value: Expression) -> Binding {
        Binding { name: name.into(), value: value }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameKind {
    Global,
    /// Opened for a function or mixin body. Assignments inside never leak
    /// into the caller.
    Call,
    /// Opened for one pass of `@for`, `@each` or `@while`. Only the loop
    /// variable and fresh names live here; assignments to outer names go
    /// through.
    Loop,
}

#[derive(Clone, Debug)]
struct Frame {
    kind: FrameKind,
    bindings: Vec<Binding>,
}

/// Anything `$name` references can be resolved against.
pub trait Bindings {
    fn lookup(&self, name: &str) -> Option<&Expression>;
}

impl Bindings for [Binding] {
    fn lookup(&self, name: &str) -> Option<&Expression> {
        self.iter().find(|b| b.name == name).map(|b| &b.value)
    }
}

impl Bindings for Vec<Binding> {
    fn lookup(&self, name: &str) -> Option<&Expression> {
        self[..].lookup(name)
    }
}

/// Shadowing stack of frames. The innermost frame is searched first, and
/// the global frame outlives every other one.
#[derive(Clone, Debug)]
pub struct Scope {
    frames: Vec<Frame>,
}

impl Default for Scope {
    fn default() -> Scope {
        Scope::new()
    }
}

impl Scope {
    pub fn new() -> Scope {
        Scope {
            frames: vec![Frame { kind: FrameKind::Global, bindings: vec![] }],
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn open(&mut self, kind: FrameKind) {
        trace!("open {:?} scope at depth {}", kind, self.frames.len());
        self.frames.push(Frame { kind: kind, bindings: vec![] });
    }

    /// Drops the innermost frame with everything bound in it. The global
    /// frame is never dropped.
    pub fn close(&mut self) {
        if self.frames.len() > 1 {
            let frame = self.frames.pop();
            trace!("close {:?} scope", frame.map(|f| f.kind));
        } else {
            warn!("attempted to close the global scope");
        }
    }

    pub fn get(&self, name: &str) -> Option<&Expression> {
        self.frames.iter().rev()
            .filter_map(|f| f.bindings.lookup(name))
            .next()
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Binds `name` in the innermost frame, shadowing any outer binding.
    pub fn define<S: Into<String>>(&mut self, name: S, value: Expression) {
        let name = name.into();
        if let Some(frame) = self.frames.last_mut() {
            bind_in(frame, name, value);
        }
    }

    /// Assignment: rebinds the nearest visible `name` without crossing a
    /// call boundary, or defines it in the innermost frame.
    pub fn set<S: Into<String>>(&mut self, name: S, value: Expression) {
        let name = name.into();
        for frame in self.frames.iter_mut().rev() {
            if frame.bindings.iter().any(|b| b.name == name) {
                bind_in(frame, name, value);
                return
            }
            if frame.kind == FrameKind::Call {
                break
            }
        }
        self.define(name, value);
    }

    /// Bindings of the innermost frame, most recent first.
    pub fn innermost(&self) -> &[Binding] {
        match self.frames.last() {
            Some(frame) => &frame.bindings,
            None => &[],
        }
    }
}

impl Bindings for Scope {
    fn lookup(&self, name: &str) -> Option<&Expression> {
        self.get(name)
    }
}

fn bind_in(frame: &mut Frame, name: String, value: Expression) {
    match frame.bindings.iter().position(|b| b.name == name) {
        Some(pos) => {
            frame.bindings.remove(pos);
        },
        None => {},
    }
    frame.bindings.insert(0, Binding::new(name, value));
}
