//! Structural rendering of message arguments.
//!
//! Strings and numbers passed directly to a logger render verbatim.
//! Anything composite is walked by an [`Inspector`], which quotes nested
//! strings, collapses nesting past a depth limit into `[Object]`/`[Array]`,
//! and prints `[Circular]` when a shared pointer reappears on its own path.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt::{self, Write as _};
use std::rc::{Rc, Weak};
use std::sync::{Arc, Mutex, RwLock};

use serde_json::Value;

/// Nesting depth shown before containers collapse to a placeholder.
pub const DEFAULT_DEPTH: usize = 2;

/// A value that can be written into a log message.
pub trait Inspect {
    fn inspect(&self, inspector: &mut Inspector);
}

/// Accumulates the rendering of one argument.
pub struct Inspector {
    out: String,
    depth: usize,
    max_depth: usize,
    path: Vec<usize>,
}

impl Inspector {
    pub fn new() -> Self {
        Self::with_depth(DEFAULT_DEPTH)
    }

    pub fn with_depth(max_depth: usize) -> Self {
        Self {
            out: String::new(),
            depth: 0,
            max_depth,
            path: Vec::new(),
        }
    }

    /// True while rendering inside a container.
    pub fn is_nested(&self) -> bool {
        self.depth > 0
    }

    pub fn write_str(&mut self, s: &str) {
        self.out.push_str(s);
    }

    pub fn write_display(&mut self, value: &dyn fmt::Display) {
        let _ = write!(self.out, "{}", value);
    }

    /// Strings are bare at the top level and single-quoted inside containers.
    pub fn write_text(&mut self, s: &str) {
        if self.is_nested() {
            self.out.push('\'');
            for c in s.chars() {
                match c {
                    '\'' => self.out.push_str("\\'"),
                    '\\' => self.out.push_str("\\\\"),
                    '\n' => self.out.push_str("\\n"),
                    c => self.out.push(c),
                }
            }
            self.out.push('\'');
        } else {
            self.out.push_str(s);
        }
    }

    /// `[ a, b ]`
    pub fn seq<'a, I>(&mut self, items: I)
    where
        I: IntoIterator<Item = &'a dyn Inspect>,
    {
        if self.depth > self.max_depth {
            self.out.push_str("[Array]");
            return;
        }
        self.depth += 1;
        self.out.push('[');
        let mut empty = true;
        for item in items {
            self.out.push_str(if empty { " " } else { ", " });
            item.inspect(self);
            empty = false;
        }
        self.out.push_str(if empty { "]" } else { " ]" });
        self.depth -= 1;
    }

    /// `{ key: value, ... }`
    pub fn entries<'a, K, I>(&mut self, entries: I)
    where
        K: fmt::Display,
        I: IntoIterator<Item = (K, &'a dyn Inspect)>,
    {
        if self.depth > self.max_depth {
            self.out.push_str("[Object]");
            return;
        }
        self.write_entries(entries);
    }

    /// `Name { field: value, ... }` for user-defined structs.
    pub fn object<'a, K, I>(&mut self, name: &str, fields: I)
    where
        K: fmt::Display,
        I: IntoIterator<Item = (K, &'a dyn Inspect)>,
    {
        if self.depth > self.max_depth {
            let _ = write!(self.out, "[{}]", name);
            return;
        }
        self.out.push_str(name);
        self.out.push(' ');
        self.write_entries(fields);
    }

    fn write_entries<'a, K, I>(&mut self, entries: I)
    where
        K: fmt::Display,
        I: IntoIterator<Item = (K, &'a dyn Inspect)>,
    {
        self.depth += 1;
        self.out.push('{');
        let mut empty = true;
        for (key, value) in entries {
            self.out.push_str(if empty { " " } else { ", " });
            let _ = write!(self.out, "{}: ", key);
            value.inspect(self);
            empty = false;
        }
        self.out.push_str(if empty { "}" } else { " }" });
        self.depth -= 1;
    }

    /// Render the target of a shared pointer, unless that same allocation is
    /// already being rendered further up.
    pub fn shared(&mut self, addr: usize, f: impl FnOnce(&mut Self)) {
        if self.path.contains(&addr) {
            self.out.push_str("[Circular]");
            return;
        }
        self.path.push(addr);
        f(self);
        self.path.pop();
    }

    pub fn finish(self) -> String {
        self.out
    }
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new()
    }
}

/// Render one value with the default depth.
pub fn inspect(value: &dyn Inspect) -> String {
    let mut inspector = Inspector::new();
    value.inspect(&mut inspector);
    inspector.finish()
}

/// Render message arguments joined by single spaces.
pub fn render_args(args: &[&dyn Inspect]) -> String {
    args.iter()
        .map(|arg| inspect(*arg))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render through `Debug`.
///
/// Not cycle-safe: a derived `Debug` on a self-referencing `Rc<RefCell<_>>`
/// recurses without bound. Give cyclic graphs an [`Inspect`] impl instead,
/// which prints `[Circular]` for pointers already on the path.
pub struct Debugged<T>(pub T);

/// Render through `Display`.
pub struct Displayed<T>(pub T);

impl<T: fmt::Debug> Inspect for Debugged<T> {
    fn inspect(&self, inspector: &mut Inspector) {
        let _ = write!(inspector.out, "{:?}", self.0);
    }
}

impl<T: fmt::Display> Inspect for Displayed<T> {
    fn inspect(&self, inspector: &mut Inspector) {
        inspector.write_display(&self.0);
    }
}

impl Inspect for str {
    fn inspect(&self, inspector: &mut Inspector) {
        inspector.write_text(self);
    }
}

impl Inspect for String {
    fn inspect(&self, inspector: &mut Inspector) {
        inspector.write_text(self);
    }
}

impl Inspect for char {
    fn inspect(&self, inspector: &mut Inspector) {
        let mut buf = [0u8; 4];
        inspector.write_text(self.encode_utf8(&mut buf));
    }
}

impl Inspect for fmt::Arguments<'_> {
    fn inspect(&self, inspector: &mut Inspector) {
        inspector.write_display(self);
    }
}

macro_rules! inspect_display {
    ($($ty:ty),*) => {
        $(
            impl Inspect for $ty {
                fn inspect(&self, inspector: &mut Inspector) {
                    inspector.write_display(self);
                }
            }
        )*
    };
}

inspect_display!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool);

impl Inspect for () {
    fn inspect(&self, inspector: &mut Inspector) {
        inspector.write_str("()");
    }
}

impl<T: Inspect + ?Sized> Inspect for &T {
    fn inspect(&self, inspector: &mut Inspector) {
        (**self).inspect(inspector);
    }
}

impl<T: Inspect + ?Sized> Inspect for Box<T> {
    fn inspect(&self, inspector: &mut Inspector) {
        (**self).inspect(inspector);
    }
}

impl<T: Inspect> Inspect for Option<T> {
    fn inspect(&self, inspector: &mut Inspector) {
        match self {
            Some(value) => value.inspect(inspector),
            None => inspector.write_str("None"),
        }
    }
}

impl<T: Inspect> Inspect for [T] {
    fn inspect(&self, inspector: &mut Inspector) {
        inspector.seq(self.iter().map(|v| v as &dyn Inspect));
    }
}

impl<T: Inspect, const N: usize> Inspect for [T; N] {
    fn inspect(&self, inspector: &mut Inspector) {
        self.as_slice().inspect(inspector);
    }
}

impl<T: Inspect> Inspect for Vec<T> {
    fn inspect(&self, inspector: &mut Inspector) {
        self.as_slice().inspect(inspector);
    }
}

impl<T: Inspect> Inspect for VecDeque<T> {
    fn inspect(&self, inspector: &mut Inspector) {
        inspector.seq(self.iter().map(|v| v as &dyn Inspect));
    }
}

impl<K: fmt::Display, V: Inspect> Inspect for BTreeMap<K, V> {
    fn inspect(&self, inspector: &mut Inspector) {
        inspector.entries(self.iter().map(|(k, v)| (k, v as &dyn Inspect)));
    }
}

impl<K: fmt::Display, V: Inspect, S> Inspect for HashMap<K, V, S> {
    fn inspect(&self, inspector: &mut Inspector) {
        inspector.entries(self.iter().map(|(k, v)| (k, v as &dyn Inspect)));
    }
}

impl Inspect for Value {
    fn inspect(&self, inspector: &mut Inspector) {
        match self {
            Value::Null => inspector.write_str("null"),
            Value::Bool(b) => inspector.write_display(b),
            Value::Number(n) => inspector.write_display(n),
            Value::String(s) => inspector.write_text(s),
            Value::Array(items) => inspector.seq(items.iter().map(|v| v as &dyn Inspect)),
            Value::Object(map) => inspector.entries(map.iter().map(|(k, v)| (k, v as &dyn Inspect))),
        }
    }
}

impl<T: Inspect + ?Sized> Inspect for Rc<T> {
    fn inspect(&self, inspector: &mut Inspector) {
        let addr = Rc::as_ptr(self) as *const () as usize;
        inspector.shared(addr, |i| (**self).inspect(i));
    }
}

impl<T: Inspect + ?Sized> Inspect for Arc<T> {
    fn inspect(&self, inspector: &mut Inspector) {
        let addr = Arc::as_ptr(self) as *const () as usize;
        inspector.shared(addr, |i| (**self).inspect(i));
    }
}

impl<T: Inspect> Inspect for Weak<T> {
    fn inspect(&self, inspector: &mut Inspector) {
        match self.upgrade() {
            Some(strong) => strong.inspect(inspector),
            None => inspector.write_str("[Dropped]"),
        }
    }
}

impl<T: Inspect + ?Sized> Inspect for RefCell<T> {
    fn inspect(&self, inspector: &mut Inspector) {
        match self.try_borrow() {
            Ok(value) => value.inspect(inspector),
            Err(_) => inspector.write_str("[Borrowed]"),
        }
    }
}

impl<T: Inspect + ?Sized> Inspect for Mutex<T> {
    fn inspect(&self, inspector: &mut Inspector) {
        match self.try_lock() {
            Ok(value) => value.inspect(inspector),
            Err(_) => inspector.write_str("[Locked]"),
        }
    }
}

impl<T: Inspect + ?Sized> Inspect for RwLock<T> {
    fn inspect(&self, inspector: &mut Inspector) {
        match self.try_read() {
            Ok(value) => value.inspect(inspector),
            Err(_) => inspector.write_str("[Locked]"),
        }
    }
}
