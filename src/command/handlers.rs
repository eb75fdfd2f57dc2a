//! Built-in command handlers
//!
//! Each handler receives the arguments after the command name.

use bytes::Bytes;

use super::CommandSpec;
use crate::protocol::Value;
use crate::store::Store;

/// Every command the server understands
pub(super) const BUILTIN: &[CommandSpec] = &[
    CommandSpec { name: "PING", handler: ping, mutating: false },
    CommandSpec { name: "COMMAND", handler: command, mutating: false },
    CommandSpec { name: "SET", handler: set, mutating: true },
    CommandSpec { name: "GET", handler: get, mutating: false },
    CommandSpec { name: "DEL", handler: del, mutating: true },
    CommandSpec { name: "EXISTS", handler: exists, mutating: false },
    CommandSpec { name: "HSET", handler: hset, mutating: true },
    CommandSpec { name: "HGET", handler: hget, mutating: false },
    CommandSpec { name: "HGETALL", handler: hgetall, mutating: false },
    CommandSpec { name: "HDEL", handler: hdel, mutating: true },
    CommandSpec { name: "HEXISTS", handler: hexists, mutating: false },
];

fn wrong_arity(command: &str) -> Value {
    Value::error(format!(
        "ERR wrong number of arguments for '{}' command",
        command
    ))
}

fn count(n: usize) -> Value {
    Value::integer(n as i64)
}

// =============================================================================
// Connection / introspection
// =============================================================================

fn ping(_store: &Store, args: &[Bytes]) -> Value {
    match args {
        [] => Value::simple("PONG"),
        [message] => Value::bulk(message.clone()),
        _ => wrong_arity("ping"),
    }
}

/// Clients such as redis-cli send COMMAND on startup; reply null
fn command(_store: &Store, _args: &[Bytes]) -> Value {
    Value::NULL
}

// =============================================================================
// String commands
// =============================================================================

fn set(store: &Store, args: &[Bytes]) -> Value {
    let [key, value] = args else {
        return wrong_arity("set");
    };
    store.strings().set(key.clone(), value.clone());
    Value::ok()
}

fn get(store: &Store, args: &[Bytes]) -> Value {
    let [key] = args else {
        return wrong_arity("get");
    };
    match store.strings().get(key) {
        Some(value) => Value::bulk(value),
        None => Value::NULL,
    }
}

fn del(store: &Store, args: &[Bytes]) -> Value {
    count(store.strings().delete(args))
}

fn exists(store: &Store, args: &[Bytes]) -> Value {
    count(store.strings().exists(args))
}

// =============================================================================
// Hash commands
// =============================================================================

fn hset(store: &Store, args: &[Bytes]) -> Value {
    let [key, field, value] = args else {
        return wrong_arity("hset");
    };
    store
        .hashes()
        .set(key.clone(), field.clone(), value.clone());
    Value::ok()
}

fn hget(store: &Store, args: &[Bytes]) -> Value {
    let [key, field] = args else {
        return wrong_arity("hget");
    };
    match store.hashes().get(key, field) {
        Some(value) => Value::bulk(value),
        None => Value::NULL,
    }
}

fn hgetall(store: &Store, args: &[Bytes]) -> Value {
    let [key] = args else {
        return wrong_arity("hgetall");
    };
    match store.hashes().get_all(key) {
        Some(pairs) => Value::array(
            pairs
                .into_iter()
                .flat_map(|(field, value)| [Value::bulk(field), Value::bulk(value)])
                .collect(),
        ),
        None => Value::NULL_ARRAY,
    }
}

fn hdel(store: &Store, args: &[Bytes]) -> Value {
    let [key, fields @ ..] = args else {
        return wrong_arity("hdel");
    };
    if fields.is_empty() {
        return wrong_arity("hdel");
    }
    count(store.hashes().delete(key, fields))
}

fn hexists(store: &Store, args: &[Bytes]) -> Value {
    let [key, fields @ ..] = args else {
        return wrong_arity("hexists");
    };
    if fields.is_empty() {
        return wrong_arity("hexists");
    }
    count(store.hashes().exists(key, fields))
}
