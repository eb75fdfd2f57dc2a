//! Dispatch Tests
//!
//! Tests verify:
//! - Request shape validation
//! - Every built-in command and its arity check
//! - Case-insensitive lookup
//! - Unknown commands and the mutated flag

use emberkv::command::{CommandTable, Dispatch, Request};
use emberkv::store::Store;
use emberkv::{EmberError, Value};

// =============================================================================
// Helper Functions
// =============================================================================

struct Fixture {
    table: CommandTable,
    store: Store,
}

impl Fixture {
    fn new() -> Self {
        Self {
            table: CommandTable::new(),
            store: Store::new(),
        }
    }

    fn dispatch(&self, words: &[&str]) -> Dispatch {
        let request = Request::try_from(&Value::request(words)).unwrap();
        self.table.dispatch(&self.store, &request)
    }

    /// Dispatch and return just the reply
    fn run(&self, words: &[&str]) -> Value {
        match self.dispatch(words) {
            Dispatch::Reply { value, .. } => value,
            Dispatch::Unknown(name) => panic!("{} is not registered", name),
        }
    }
}

fn assert_arity_error(value: &Value, command: &str) {
    assert_eq!(
        value,
        &Value::error(format!(
            "ERR wrong number of arguments for '{}' command",
            command
        ))
    );
}

// =============================================================================
// Request Shape Tests
// =============================================================================

#[test]
fn test_request_uppercases_name() {
    let request = Request::try_from(&Value::request(["sEt", "k", "v"])).unwrap();
    assert_eq!(request.name, "SET");
    assert_eq!(request.args.len(), 2);
}

#[test]
fn test_request_rejects_non_array() {
    let result = Request::try_from(&Value::bulk("PING"));
    assert!(matches!(result, Err(EmberError::Protocol(_))));
}

#[test]
fn test_request_rejects_empty_and_null_arrays() {
    assert!(matches!(
        Request::try_from(&Value::array(vec![])),
        Err(EmberError::Protocol(_))
    ));
    assert!(matches!(
        Request::try_from(&Value::NULL_ARRAY),
        Err(EmberError::Protocol(_))
    ));
}

#[test]
fn test_request_rejects_non_bulk_elements() {
    let value = Value::array(vec![Value::bulk("GET"), Value::Integer(1)]);
    assert!(matches!(Request::try_from(&value), Err(EmberError::Protocol(_))));

    let value = Value::array(vec![Value::bulk("GET"), Value::NULL]);
    assert!(matches!(Request::try_from(&value), Err(EmberError::Protocol(_))));
}

// =============================================================================
// Registry Tests
// =============================================================================

#[test]
fn test_builtin_commands_registered() {
    let table = CommandTable::new();
    assert_eq!(
        table.names(),
        vec![
            "COMMAND", "DEL", "EXISTS", "GET", "HDEL", "HEXISTS", "HGET", "HGETALL", "HSET",
            "PING", "SET"
        ]
    );
}

#[test]
fn test_mutating_commands() {
    let table = CommandTable::new();
    for name in ["SET", "HSET", "DEL", "HDEL", "set", "hdel"] {
        assert!(table.is_mutating(name), "{} should be mutating", name);
    }
    for name in ["GET", "HGET", "HGETALL", "EXISTS", "HEXISTS", "PING", "COMMAND", "FOO"] {
        assert!(!table.is_mutating(name), "{} should not be mutating", name);
    }
}

#[test]
fn test_lookup_is_case_insensitive() {
    let table = CommandTable::new();
    assert_eq!(table.lookup("hgetall").map(|spec| spec.name), Some("HGETALL"));
}

#[test]
fn test_unknown_command() {
    let fx = Fixture::new();
    assert_eq!(fx.dispatch(&["FOO", "bar"]), Dispatch::Unknown("FOO".to_string()));
}

// =============================================================================
// PING / COMMAND
// =============================================================================

#[test]
fn test_ping() {
    let fx = Fixture::new();
    assert_eq!(fx.run(&["PING"]), Value::simple("PONG"));
    assert_eq!(fx.run(&["ping", "hello"]), Value::bulk("hello"));
    assert_arity_error(&fx.run(&["PING", "a", "b"]), "ping");
}

#[test]
fn test_command_stub_replies_null() {
    let fx = Fixture::new();
    assert_eq!(fx.run(&["COMMAND"]), Value::NULL);
    assert_eq!(fx.run(&["COMMAND", "DOCS"]), Value::NULL);
}

// =============================================================================
// String Commands
// =============================================================================

#[test]
fn test_set_then_get() {
    let fx = Fixture::new();
    assert_eq!(fx.run(&["SET", "name", "redis"]), Value::ok());
    assert_eq!(fx.run(&["GET", "name"]), Value::bulk("redis"));
}

#[test]
fn test_set_is_idempotent() {
    let fx = Fixture::new();
    for _ in 0..3 {
        assert_eq!(fx.run(&["SET", "k", "v"]), Value::ok());
    }
    assert_eq!(fx.run(&["GET", "k"]), Value::bulk("v"));
    assert_eq!(fx.store.strings().len(), 1);
}

#[test]
fn test_get_absent_is_null() {
    let fx = Fixture::new();
    assert_eq!(fx.run(&["GET", "nope"]), Value::NULL);
}

#[test]
fn test_set_arity_leaves_store_unchanged() {
    let fx = Fixture::new();
    let dispatch = fx.dispatch(&["SET", "k"]);
    match dispatch {
        Dispatch::Reply { value, mutated } => {
            assert_arity_error(&value, "set");
            assert!(!mutated);
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(fx.store.is_empty());
}

#[test]
fn test_get_arity() {
    let fx = Fixture::new();
    assert_arity_error(&fx.run(&["GET"]), "get");
    assert_arity_error(&fx.run(&["GET", "a", "b"]), "get");
}

#[test]
fn test_del_counts_deleted() {
    let fx = Fixture::new();
    fx.run(&["SET", "a", "1"]);
    fx.run(&["SET", "c", "3"]);

    assert_eq!(fx.run(&["DEL", "a", "b", "c"]), Value::Integer(2));
    assert_eq!(fx.run(&["EXISTS", "a", "b", "c"]), Value::Integer(0));
}

#[test]
fn test_del_and_exists_without_keys() {
    let fx = Fixture::new();
    assert_eq!(fx.run(&["DEL"]), Value::Integer(0));
    assert_eq!(fx.run(&["EXISTS"]), Value::Integer(0));
}

#[test]
fn test_exists_counts_present() {
    let fx = Fixture::new();
    fx.run(&["SET", "a", "1"]);
    assert_eq!(fx.run(&["EXISTS", "a", "b"]), Value::Integer(1));
}

// =============================================================================
// Hash Commands
// =============================================================================

#[test]
fn test_hset_then_hget() {
    let fx = Fixture::new();
    assert_eq!(fx.run(&["HSET", "user", "name", "ada"]), Value::ok());
    assert_eq!(fx.run(&["HGET", "user", "name"]), Value::bulk("ada"));
    assert_eq!(fx.run(&["HGET", "user", "age"]), Value::NULL);
}

#[test]
fn test_hash_isolation() {
    let fx = Fixture::new();
    fx.run(&["HSET", "h1", "f", "v"]);
    assert_eq!(fx.run(&["HGET", "h2", "f"]), Value::NULL);
}

#[test]
fn test_hgetall_flat_pairs() {
    let fx = Fixture::new();
    fx.run(&["HSET", "h", "f1", "v1"]);
    fx.run(&["HSET", "h", "f2", "v2"]);

    let reply = fx.run(&["HGETALL", "h"]);
    let items = reply.as_array().unwrap();
    assert_eq!(items.len(), 4);

    let mut pairs: Vec<(Value, Value)> = items
        .chunks(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect();
    pairs.sort_by_key(|(field, _)| field.as_bulk().cloned());
    assert_eq!(
        pairs,
        vec![
            (Value::bulk("f1"), Value::bulk("v1")),
            (Value::bulk("f2"), Value::bulk("v2")),
        ]
    );
}

#[test]
fn test_hgetall_absent_is_null() {
    let fx = Fixture::new();
    assert_eq!(fx.run(&["HGETALL", "nohash"]), Value::NULL_ARRAY);
}

#[test]
fn test_hdel_and_hexists() {
    let fx = Fixture::new();
    fx.run(&["HSET", "h", "f1", "v1"]);
    fx.run(&["HSET", "h", "f2", "v2"]);

    assert_eq!(fx.run(&["HEXISTS", "h", "f1", "f2", "f3"]), Value::Integer(2));
    assert_eq!(fx.run(&["HDEL", "h", "f1", "f3"]), Value::Integer(1));
    assert_eq!(fx.run(&["HEXISTS", "h", "f1"]), Value::Integer(0));
    assert_eq!(fx.run(&["HDEL", "missing", "f"]), Value::Integer(0));
}

#[test]
fn test_hash_arity_errors() {
    let fx = Fixture::new();
    assert_arity_error(&fx.run(&["HSET", "h", "f"]), "hset");
    assert_arity_error(&fx.run(&["HGET", "h"]), "hget");
    assert_arity_error(&fx.run(&["HGETALL"]), "hgetall");
    assert_arity_error(&fx.run(&["HDEL", "h"]), "hdel");
    assert_arity_error(&fx.run(&["HEXISTS", "h"]), "hexists");
    assert!(fx.store.is_empty());
}

#[test]
fn test_mutated_flag() {
    let fx = Fixture::new();
    assert!(matches!(
        fx.dispatch(&["SET", "k", "v"]),
        Dispatch::Reply { mutated: true, .. }
    ));
    assert!(matches!(
        fx.dispatch(&["DEL", "nothing"]),
        Dispatch::Reply { mutated: true, .. }
    ));
    assert!(matches!(
        fx.dispatch(&["GET", "k"]),
        Dispatch::Reply { mutated: false, .. }
    ));
}
