use crate::{Context, Value};

/// Name of the current element in an `each` block
const THIS: &str = "this";
const LOOP_INDEX: &str = "@index";
const LOOP_FIRST: &str = "@first";
const LOOP_LAST: &str = "@last";

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) struct Loop {
    index0: usize,
    first: bool,
    last: bool,
}

impl Loop {
    fn new(index0: usize, length: usize) -> Self {
        Self {
            index0,
            first: index0 == 0,
            last: index0 + 1 == length,
        }
    }
}

/// What names resolve to at a given point of a render.
///
/// An `each` block pushes an iteration scope on top of its parent. It only adds
/// `this` and the loop variables: every other name is looked up in the parent,
/// so nothing is copied and nothing is ever written.
#[derive(Debug)]
pub(crate) enum Scope<'s> {
    Root {
        context: &'s Context,
        globals: &'s Context,
    },
    Iteration {
        parent: &'s Scope<'s>,
        item: &'s Value,
        loop_data: Loop,
    },
}

impl<'s> Scope<'s> {
    /// The page context wins over the global context
    pub(crate) fn root(context: &'s Context, globals: &'s Context) -> Self {
        Scope::Root { context, globals }
    }

    pub(crate) fn iteration<'a>(
        &'a self,
        item: &'a Value,
        index0: usize,
        length: usize,
    ) -> Scope<'a> {
        Scope::Iteration {
            parent: self,
            item,
            loop_data: Loop::new(index0, length),
        }
    }

    /// Loads the value of a top level name, Undefined if it's not there
    pub(crate) fn get(&self, name: &str) -> Value {
        match self {
            Scope::Iteration {
                parent,
                item,
                loop_data,
            } => match name {
                THIS => (*item).clone(),
                LOOP_INDEX => Value::from(loop_data.index0),
                LOOP_FIRST => Value::from(loop_data.first),
                LOOP_LAST => Value::from(loop_data.last),
                _ => parent.get(name),
            },
            Scope::Root { context, globals } => context
                .get(name)
                .or_else(|| globals.get(name))
                .cloned()
                .unwrap_or_default(),
        }
    }

    /// Resolves a dot path. Never fails: anything missing gives Undefined.
    pub(crate) fn get_from_path(&self, path: &str) -> Value {
        if let Some((start, rest)) = path.split_once('.') {
            self.get(start).get_from_path(rest)
        } else {
            self.get(path)
        }
    }
}
