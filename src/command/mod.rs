//! Command Module
//!
//! Registry of command handlers and the dispatch step.
//!
//! ## Responsibilities
//! - Check the shape of incoming requests
//! - Look up handlers by name (case-insensitive)
//! - Run handlers against the store
//! - Tell the caller whether the store was mutated, so only applied
//!   writes reach the append-only log
//!
//! Handlers never fail: argument problems come back as `Value::Error`
//! replies and the connection stays open.

mod request;
mod handlers;

use std::collections::HashMap;

use bytes::Bytes;

use crate::protocol::Value;
use crate::store::Store;

pub use request::Request;

/// A command handler: reads or mutates the store and builds the reply
pub type Handler = fn(&Store, &[Bytes]) -> Value;

/// One registered command
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    /// Uppercase command name
    pub name: &'static str,

    /// Function run for the command
    pub handler: Handler,

    /// Whether the command changes the store (and so gets logged)
    pub mutating: bool,
}

/// Outcome of dispatching one request
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// The command ran and produced a reply
    Reply {
        value: Value,
        /// True when a mutating command was applied to the store
        mutated: bool,
    },

    /// No handler is registered under this name
    Unknown(String),
}

/// Command name → handler registry
pub struct CommandTable {
    commands: HashMap<&'static str, CommandSpec>,
}

impl CommandTable {
    /// A table with every built-in command registered
    pub fn new() -> Self {
        let mut table = Self {
            commands: HashMap::new(),
        };
        for spec in handlers::BUILTIN {
            table.register(*spec);
        }
        table
    }

    /// Register a command, replacing any previous one of the same name
    pub fn register(&mut self, spec: CommandSpec) {
        self.commands.insert(spec.name, spec);
    }

    /// Look up a command by name (any case)
    pub fn lookup(&self, name: &str) -> Option<&CommandSpec> {
        self.commands
            .get(name)
            .or_else(|| self.commands.get(name.to_ascii_uppercase().as_str()))
    }

    /// Whether `name` is a registered mutating command
    pub fn is_mutating(&self, name: &str) -> bool {
        self.lookup(name).map(|spec| spec.mutating).unwrap_or(false)
    }

    /// Run a request against the store
    pub fn dispatch(&self, store: &Store, request: &Request) -> Dispatch {
        let Some(spec) = self.lookup(&request.name) else {
            return Dispatch::Unknown(request.name.clone());
        };

        let value = (spec.handler)(store, &request.args);
        let mutated = spec.mutating && !value.is_error();
        Dispatch::Reply { value, mutated }
    }

    /// Registered command names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::new()
    }
}
